mod load;
mod model;

pub use load::load_countries;
pub use model::Country;
