use crate::store::enums::store_engine::StoreEngine;
use crate::store::structs::memory_store::MemoryStore;
use crate::store::structs::redis_store::RedisStore;

#[derive(Clone)]
pub struct StoreConnector {
    pub(crate) redis: Option<RedisStore>,
    pub(crate) memory: Option<MemoryStore>,
    pub(crate) engine: StoreEngine,
}
