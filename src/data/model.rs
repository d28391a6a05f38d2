use serde::Deserialize;

/// One country record as delivered by the data set. Everything beyond the
/// id/name/code triple is optional; absent neighbor lists mean "no known
/// neighbors", not an error.
#[derive(Clone, Debug, Deserialize)]
pub struct Country {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "continentId")]
    pub continent_id: Option<i64>,
    #[serde(default, rename = "continentName")]
    pub continent_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "neighborIds")]
    pub neighbor_ids: Vec<i64>,
    #[serde(default, rename = "isCapital")]
    pub is_capital: bool,
}
