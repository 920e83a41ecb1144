//! blastio: streaming parsers for BLAST report output
//!
//! # Overview
//!
//! blastio extracts structured records from BLAST (Basic Local Alignment
//! Search Tool) output, turning report text into a hierarchy of immutable
//! records: query → hits → local alignments (HSPs). Parsing is streaming —
//! one line at a time, one record out at a time — so arbitrarily large
//! result files are processed in constant memory.
//!
//! ## Key Features
//!
//! - **Streaming**: pull-based iterators, no full-file buffering
//! - **Two report styles**: the human-readable text report and the stable
//!   XML output (`-outfmt 5`), each with its own dedicated parser
//! - **Exact e-values**: expectation values are kept as their verbatim
//!   tokens; values like `1e-320` that underflow `f64` stay meaningful
//!   through on-demand arbitrary-precision conversion
//! - **Drift tolerance**: unrecognized lines are skipped, truncated files
//!   still yield their final partial record
//!
//! ## Quick Start
//!
//! ```no_run
//! use blastio::TextReportStream;
//!
//! # fn main() -> blastio::Result<()> {
//! let stream = TextReportStream::from_path("blast_results.txt")?;
//!
//! for record in stream {
//!     let record = record?;
//!     if !record.has_hits() {
//!         println!("{}: no hits", record.query_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`formats`]: the two report parsers ([`TextReportStream`],
//!   [`XmlReportStream`])
//! - [`types`]: immutable record types ([`QueryResult`], [`Hit`], [`Hsp`],
//!   [`Evalue`])
//! - [`error`]: error types and the crate [`Result`] alias

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod formats;
pub mod types;

// Re-export commonly used types
pub use error::{BlastError, Result};
pub use formats::{TextReportStream, XmlReportStream};
pub use types::{Evalue, Hit, Hsp, QueryResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
