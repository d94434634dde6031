//! fpbatch core - batch fingerprinting and JSONL collation
//!
//! Two stages composed through the filesystem: the `Extractor` runs an
//! external fingerprinting tool per audio file and writes `<uuid>.json`
//! documents, the `Collator` merges a directory of those documents into one
//! JSONL file.

pub mod collator;
pub mod config;
pub mod error;
pub mod extractor;
pub mod identifier;
pub mod input;
pub mod provider;

pub use collator::{CollationReport, Collator};
pub use config::{BatchConfig, CollatorConfig, ExtractorConfig};
pub use error::{BatchError, DecodeError, IdentifierError, ItemFailure};
pub use extractor::{ExtractionReport, Extractor, ItemOutcome};
pub use identifier::extract_identifier;
pub use provider::{FingerprintProvider, FpcalcProvider};

pub use fpbatch_record::{FingerprintPayload, FingerprintRecord};
