//! Streaming parsers for BLAST report output.
//!
//! Two independent parsers share one architecture (line source → state
//! machine → record assembly → record stream):
//!
//! - [`text::TextReportStream`]: the loosely structured human-readable
//!   report (`Query=` / `>` / `Length=` / `Expect=` markers).
//! - [`xml::XmlReportStream`]: line-delimited XML-style markup
//!   (`-outfmt 5`, one tag or content fragment per line).
//!
//! Both parsers implement:
//! - **Streaming architecture**: one line at a time, constant memory
//!   regardless of file size
//! - **Iterator-based API**: one [`QueryResult`](crate::QueryResult) per
//!   query, in input order
//! - **Compression support**: transparent gzip decompression
//! - **Drift tolerance**: unrecognized lines are ignored rather than
//!   rejected, since text report layout shifts between tool versions
//!
//! Neither parser validates overall document well-formedness; they trust
//! line-level structural markers. A truncated file is not an error: the final
//! partial record is finalized and emitted by the end-of-input flush.

use crate::error::{BlastError, Result};
use std::str::FromStr;

pub mod text;
pub mod xml;

// Re-export commonly used types
pub use text::TextReportStream;
pub use xml::XmlReportStream;

/// Parse a required integer field, rejecting malformed tokens.
///
/// Numeric fields are a fatal condition when malformed: silently defaulting a
/// length or coordinate would corrupt scientific data.
pub(crate) fn parse_field<T>(token: &str, field: &str, line: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    token.parse().map_err(|e| BlastError::InvalidField {
        field: field.to_string(),
        line,
        reason: format!("{}", e),
    })
}
