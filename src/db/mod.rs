pub mod memory;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod store;
pub mod tables;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use queries::PgStore;
pub use schema::ensure_schema;
pub use store::{RecordStore, RecordStores};
pub use tables::PgRecord;
