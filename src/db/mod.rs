pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::{create_pool, run_migrations, PgStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::{CommentStore, ListStore};
