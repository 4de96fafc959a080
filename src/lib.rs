pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use db::{create_pool, ensure_schema, RecordStores};
pub use error::{DocumentError, ImportError, StoreError};
pub use service::{ImportService, InvoicePipeline};
