use serde::{Deserialize, Serialize};
use crate::store::enums::store_engine::StoreEngine;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoreConfig {
    pub engine: StoreEngine,
    pub address: String,
    pub password: String,
    pub database: u8,
    pub prefix: String,
    pub request_timeout: u64,
}
