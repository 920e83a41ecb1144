//! Streaming parser for the human-readable BLAST report
//!
//! # Format
//!
//! The plain-text report interleaves query blocks and subject blocks:
//!
//! ```text
//! Query= Z0001 putative membrane protein
//! continued annotation text
//! Length=120
//!
//! > sp|P12345| outer membrane protein A
//! Length=55
//!
//!  Score = 98.2 bits,  Expect=1e-200
//! ```
//!
//! A query with no matches carries a literal `No hits found` line instead of
//! subject blocks.
//!
//! # Architecture
//!
//! A five-state machine drives extraction: `ScanForQuery` → `ExtendQuery` →
//! `ScanForSubject` → `ExtendSubject` → `ScanForEval`, with `ScanForEval`
//! looping back to `ScanForSubject` after each completed hit. Each consumed
//! line either populates the working draft, crosses a record boundary, or is
//! ignored. The text layout is not stable across BLAST versions, so
//! unrecognized lines are tolerated rather than rejected.
//!
//! The marker patterns are brittle by nature: they encode one exact report
//! dialect and need updating if the producing tool changes its layout.

use crate::error::{BlastError, Result};
use crate::formats::parse_field;
use crate::types::{Evalue, Hit, QueryResult};
use flate2::read::MultiGzDecoder;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

static QUERY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Query=\s+(Z\d{4})\s+(.*)").expect("query header pattern"));
static SUBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>(\S+)\s+(.*)").expect("subject header pattern"));
static LENGTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Length=(\d+)").expect("length pattern"));
static EVALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Expect\s*=\s*([^,\s]+)").expect("e-value pattern"));
static NO_HITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"No hits found").expect("no-hits pattern"));

/// Parser states for the text report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Looking for the next query header
    ScanForQuery,
    /// Accumulating query annotation until its `Length=` line
    ExtendQuery,
    /// Looking for a subject header, a `No hits found` marker, or
    /// (fallback) the next query header
    ScanForSubject,
    /// Accumulating subject annotation until its `Length=` line
    ExtendSubject,
    /// Looking for the `Expect=` line that completes the current hit
    ScanForEval,
}

/// Working state for the in-progress query record
#[derive(Debug, Default)]
struct QueryDraft {
    id: String,
    def: String,
    len: u64,
    hits: Vec<Hit>,
    message: Option<String>,
}

/// Working state for the in-progress subject block
#[derive(Debug, Default)]
struct SubjectDraft {
    id: String,
    def: String,
    len: u64,
}

/// Streaming parser for plain-text BLAST reports.
///
/// Implements `Iterator`, yielding one [`QueryResult`] per query in input
/// order with constant memory usage. At end of input any in-progress record
/// is finalized and emitted exactly once, so a truncated report still yields
/// its final partial query.
///
/// A stream is single-use per input source; parse another file by
/// constructing a new stream.
///
/// # Example
///
/// ```no_run
/// use blastio::TextReportStream;
///
/// # fn main() -> blastio::Result<()> {
/// let stream = TextReportStream::from_path("results.txt")?;
/// for record in stream {
///     let record = record?;
///     if !record.has_hits() {
///         println!("{}: no hits", record.query_id);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct TextReportStream<R: BufRead> {
    reader: R,
    line_buffer: String,
    line_number: usize,
    state: State,
    query: QueryDraft,
    subject: SubjectDraft,
    flushed: bool,
}

impl TextReportStream<BufReader<File>> {
    /// Create a stream from a report file path.
    ///
    /// # Errors
    ///
    /// Returns an error immediately if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl TextReportStream<BufReader<MultiGzDecoder<File>>> {
    /// Create a stream from a gzip-compressed report file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid gzip.
    pub fn from_gzip_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(MultiGzDecoder::new(file))))
    }
}

impl<R: BufRead> TextReportStream<R> {
    /// Create a stream from any buffered reader.
    ///
    /// Useful for testing or reading from in-memory sources.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_buffer: String::with_capacity(256),
            line_number: 0,
            state: State::ScanForQuery,
            query: QueryDraft::default(),
            subject: SubjectDraft::default(),
            flushed: false,
        }
    }

    /// Current line number (1-based), for error reporting
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Feed one trimmed line to the current state
    fn step(&mut self, line: &str) -> Result<Option<QueryResult>> {
        match self.state {
            State::ScanForQuery => Ok(self.scan_for_query(line)),
            State::ExtendQuery => {
                self.extend_query(line)?;
                Ok(None)
            }
            State::ScanForSubject => self.scan_for_subject(line),
            State::ExtendSubject => {
                self.extend_subject(line)?;
                Ok(None)
            }
            State::ScanForEval => {
                self.scan_for_eval(line);
                Ok(None)
            }
        }
    }

    fn scan_for_query(&mut self, line: &str) -> Option<QueryResult> {
        if let Some(caps) = QUERY_RE.captures(line) {
            // A new header closes out whatever query was pending
            let finished = self.finalize_query();
            self.query.id = caps[1].to_string();
            self.query.def = caps[2].to_string();
            self.state = State::ExtendQuery;
            return finished;
        }
        None
    }

    fn extend_query(&mut self, line: &str) -> Result<()> {
        if let Some(caps) = LENGTH_RE.captures(line) {
            self.query.len = parse_field(&caps[1], "query_len", self.line_number)?;
            self.state = State::ScanForSubject;
        } else {
            self.query.def.push(' ');
            self.query.def.push_str(line);
        }
        Ok(())
    }

    fn scan_for_subject(&mut self, line: &str) -> Result<Option<QueryResult>> {
        if NO_HITS_RE.is_match(line) {
            self.query.hits.clear();
            self.query.message = Some("No hits found".to_string());
            let finished = self.finalize_query();
            self.state = State::ScanForQuery;
            return Ok(finished);
        }

        if let Some(caps) = SUBJECT_RE.captures(line) {
            self.subject.id = caps[1].to_string();
            self.subject.def = caps[2].to_string();
            self.subject.len = 0;
            self.state = State::ExtendSubject;
            return Ok(None);
        }

        // Some reports omit the separator before the next query block, so an
        // unmatched line here may already be the next query header.
        Ok(self.scan_for_query(line))
    }

    fn extend_subject(&mut self, line: &str) -> Result<()> {
        if let Some(caps) = LENGTH_RE.captures(line) {
            self.subject.len = parse_field(&caps[1], "subject_len", self.line_number)?;
            self.state = State::ScanForEval;
        } else if !line.is_empty() {
            self.subject.def.push(' ');
            self.subject.def.push_str(line);
        }
        Ok(())
    }

    fn scan_for_eval(&mut self, line: &str) {
        if let Some(caps) = EVALUE_RE.captures(line) {
            let subject = std::mem::take(&mut self.subject);
            let num = self.query.hits.len() as u32 + 1;
            self.query.hits.push(Hit {
                num,
                id: subject.id,
                accession: None,
                def: subject.def,
                len: subject.len,
                evalue: Some(Evalue::new(&caps[1])),
                hsps: Vec::new(),
            });
            self.state = State::ScanForSubject;
        }
    }

    /// Convert the working state into an immutable record and reset.
    ///
    /// Returns `None` when no query identifier has been captured, including
    /// a repeated flush after the working state was already consumed.
    fn finalize_query(&mut self) -> Option<QueryResult> {
        if self.query.id.is_empty() {
            return None;
        }
        let draft = std::mem::take(&mut self.query);
        self.subject = SubjectDraft::default();
        debug!(
            "finalized query {} with {} hit(s)",
            draft.id,
            draft.hits.len()
        );
        Some(QueryResult {
            iter_num: None,
            query_id: draft.id,
            query_def: draft.def,
            query_len: draft.len,
            hits: draft.hits,
            message: draft.message,
        })
    }
}

impl<R: BufRead> Iterator for TextReportStream<R> {
    type Item = Result<QueryResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.flushed {
            return None;
        }
        loop {
            self.line_buffer.clear();
            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => {
                    // End of input: exactly one finalize-and-maybe-emit
                    self.flushed = true;
                    return self.finalize_query().map(Ok);
                }
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.line_buffer.trim().to_string();
                    match self.step(&line) {
                        Ok(Some(record)) => return Some(Ok(record)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(e) => return Some(Err(BlastError::Io(e))),
            }
        }
    }
}
