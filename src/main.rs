mod app;
mod data;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file holding the country records (id, name, code, neighborIds, ...).
    #[arg(long, default_value = "countries.json")]
    data: String,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "atlas-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::AtlasApp::new(cc, args.data.clone())))),
    )
}
