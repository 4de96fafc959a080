pub mod document;
pub mod inventory;
pub mod ledger;
pub mod record;
pub mod report;
pub mod vendor;

pub use document::{ExtractedFields, FailedInvoice, InvoiceBatch, ProcessedInvoice};
pub use inventory::InventoryItem;
pub use ledger::LedgerEntry;
pub use record::{BusinessRecord, CandidateKey, CommitMode, KeyValue, RecordVariant};
pub use report::{ImportReport, SkipReason, SkippedRow};
pub use vendor::VendorClient;
