mod aggregator;
mod discovery;

pub mod extractors;

pub use aggregator::{
    resolve_output_path, write_records, Aggregator, ExtractionRun, ExtractionSummary,
};
pub use discovery::{discover, SENTINEL_FILENAME};
pub use extractors::Extractors;
