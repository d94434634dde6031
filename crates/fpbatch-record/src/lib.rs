//! Fingerprint document formats
//!
//! Per-file JSON documents produced by the extractor and the JSONL stream
//! produced by the collator.

pub mod atomic;
pub mod jsonl;
pub mod payload;
pub mod record;

pub use atomic::write_atomic;
pub use jsonl::JsonlWriter;
pub use payload::{FingerprintPayload, DURATION_KEY, FINGERPRINT_KEY};
pub use record::{FingerprintRecord, SOURCE_PATH_KEY, UUID_KEY};
