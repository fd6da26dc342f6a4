use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeoConfig {
    pub enabled: bool,
    pub path: String,
}
