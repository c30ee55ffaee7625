pub mod cache;
pub mod kv;
pub mod wishlist_store;
pub mod writer;

mod macros;

pub use cache::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, RedisKeyValueStore};
pub use wishlist_store::WishlistStore;
pub use writer::{PersistenceWriter, PersistenceWriterHandle};
