pub mod coerce;
pub mod columns;
pub mod compositor;
pub mod dates;
pub mod extractor;
pub mod importer;
pub mod invoice;
pub mod normalizer;
pub mod resolver;
pub mod sheet;
pub mod staging;

pub use coerce::Cell;
pub use columns::{InventorySchema, LedgerSchema, RowOutcome, SheetSchema, VendorSchema};
pub use dates::{DateHeuristic, DateParse};
pub use extractor::{extract_fields, sanitize, FieldExtractor};
pub use importer::{ImportService, LedgerParams};
pub use invoice::{InvoicePipeline, InvoiceUpload};
pub use normalizer::{normalize_document, normalize_text};
pub use resolver::PendingBatch;
pub use sheet::{read_sheet, SheetRow};
