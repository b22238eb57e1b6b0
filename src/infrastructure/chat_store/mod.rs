mod in_memory;
mod redis;

pub use in_memory::InMemoryChatStore;
pub use redis::{create_pool, RedisChatStore, RedisPool};
