//! Localization sync: fetch source entries, translate them, write the target
//! locale variants and keep a resumable progress ledger.

pub mod error;
pub mod fetcher;
pub mod ledger;
pub mod orchestrator;
pub mod payload;
pub mod quality;
pub mod writer;

pub use error::{LedgerError, PipelineError};
pub use fetcher::{fetch_all_documents, fetch_source_entries, source_query, MAX_PAGES};
pub use ledger::{
    Checkpoint, DiscardCheckpoint, ErrorRecord, LedgerFile, LedgerSummaryRow, LocaleProgress,
    ProgressLedger,
};
pub use orchestrator::{
    LocaleTally, Orchestrator, RunOptions, RunReport, TypeOutcome, TypeReport, CHECKPOINT_EVERY,
};
pub use payload::{build_payload, WritePayload};
pub use quality::{
    build_report, fetch_quality_sets, score_set, FieldStat, QualityReport, SetScore, QUALITY_FIELDS,
};
pub use writer::Writer;
