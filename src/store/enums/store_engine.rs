use serde::{Deserialize, Serialize};
use std::fmt;

#[allow(non_camel_case_types)]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreEngine {
    redis,
    memory,
}

impl fmt::Display for StoreEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEngine::redis => write!(f, "redis"),
            StoreEngine::memory => write!(f, "memory"),
        }
    }
}

impl StoreEngine {
    pub fn url_scheme(&self) -> &'static str {
        match self {
            StoreEngine::redis => "redis://",
            StoreEngine::memory => "memory://",
        }
    }
}
