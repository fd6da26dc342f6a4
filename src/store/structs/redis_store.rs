use std::time::Duration;
use redis::aio::MultiplexedConnection;

#[derive(Clone)]
pub struct RedisStore {
    pub(crate) client: redis::Client,
    pub(crate) connection: MultiplexedConnection,
    pub(crate) prefix: String,
    pub(crate) database: u8,
    pub(crate) timeout: Duration,
}
