//! Streaming parser for BLAST XML output (`-outfmt 5`)
//!
//! # Format
//!
//! The XML report is line-delimited in practice: one tag or tagged content
//! fragment per line. Queries are `<Iteration>` blocks, each containing hit
//! blocks, each containing HSP blocks:
//!
//! ```text
//! <Iteration>
//!   <Iteration_query-ID>Q1</Iteration_query-ID>
//!   <Iteration_hits>
//!     <Hit>
//!       <Hit_id>sp|P12345|</Hit_id>
//!       <Hit_hsps>
//!         <Hsp>
//!           <Hsp_evalue>1e-200</Hsp_evalue>
//!         </Hsp>
//!       </Hit_hsps>
//!     </Hit>
//!   </Iteration_hits>
//! </Iteration>
//! ```
//!
//! Unlike the plain-text report, the XML layout is stable across BLAST
//! versions, which makes this the preferred input when available.
//!
//! # Architecture
//!
//! A six-state machine mirrors the block nesting: `ScanForIteration` →
//! `InIteration` → `ScanForHit` → `InHit` → `ScanForHsp` → `InHsp`, with the
//! scan states consuming the matching close tags on the way back out. This is
//! not an XML parser: tag content is simply the substring between the first
//! `>` and the last `<` on a line, and document well-formedness is never
//! checked. Lines that match nothing in the current state are ignored.

use crate::error::{BlastError, Result};
use crate::formats::parse_field;
use crate::types::{Evalue, Hit, Hsp, QueryResult};
use flate2::read::MultiGzDecoder;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parser states for the XML report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Looking for the next `<Iteration>` block
    ScanForIteration,
    /// Inside an iteration, collecting query metadata
    InIteration,
    /// Looking for the next `<Hit>` block or the end of the hit list
    ScanForHit,
    /// Inside a hit, collecting hit metadata
    InHit,
    /// Looking for the next `<Hsp>` block or the end of the HSP list
    ScanForHsp,
    /// Inside an HSP, collecting alignment data
    InHsp,
}

/// Working state for the in-progress query record
#[derive(Debug, Default)]
struct QueryDraft {
    iter_num: u32,
    id: String,
    def: String,
    len: u64,
    message: Option<String>,
    hits: Vec<Hit>,
}

/// Working state for the in-progress hit
#[derive(Debug, Default)]
struct HitDraft {
    num: u32,
    id: String,
    def: String,
    accession: String,
    len: u64,
    hsps: Vec<Hsp>,
}

/// Working state for the in-progress HSP
#[derive(Debug, Default)]
struct HspDraft {
    bit_score: String,
    score: String,
    evalue: String,
    query_from: u64,
    query_to: u64,
    hit_from: u64,
    hit_to: u64,
    identity: u64,
    positive: u64,
    gaps: u64,
    align_len: u64,
    qseq: String,
    hseq: String,
    midline: String,
}

/// Extract the content between the first `>` and the last `<` on a line.
///
/// Lines without both delimiters yield an empty string, never an error.
fn tag_content(line: &str) -> &str {
    let start = match line.find('>') {
        Some(i) => i + 1,
        None => return "",
    };
    let end = match line.rfind('<') {
        Some(i) => i,
        None => return "",
    };
    if end > start {
        &line[start..end]
    } else {
        ""
    }
}

/// Streaming parser for BLAST XML reports.
///
/// Implements `Iterator`, yielding one [`QueryResult`] per `<Iteration>`
/// block in input order with constant memory usage. At end of input any
/// in-progress record is finalized and emitted exactly once. Hits and HSPs
/// appear in the order their blocks occurred.
///
/// A stream is single-use per input source; parse another file by
/// constructing a new stream.
///
/// # Example
///
/// ```no_run
/// use blastio::XmlReportStream;
///
/// # fn main() -> blastio::Result<()> {
/// let stream = XmlReportStream::from_path("results.xml")?;
/// for record in stream {
///     let record = record?;
///     for hit in &record.hits {
///         if let Some(best) = hit.best_evalue()? {
///             println!("{} -> {}: E={}", record.query_id, hit.id, best);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct XmlReportStream<R: BufRead> {
    reader: R,
    line_buffer: String,
    line_number: usize,
    state: State,
    query: QueryDraft,
    hit: HitDraft,
    hsp: HspDraft,
    flushed: bool,
}

impl XmlReportStream<BufReader<File>> {
    /// Create a stream from an XML report file path.
    ///
    /// # Errors
    ///
    /// Returns an error immediately if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl XmlReportStream<BufReader<MultiGzDecoder<File>>> {
    /// Create a stream from a gzip-compressed XML report file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid gzip.
    pub fn from_gzip_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(MultiGzDecoder::new(file))))
    }
}

impl<R: BufRead> XmlReportStream<R> {
    /// Create a stream from any buffered reader.
    ///
    /// Useful for testing or reading from in-memory sources.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_buffer: String::with_capacity(256),
            line_number: 0,
            state: State::ScanForIteration,
            query: QueryDraft::default(),
            hit: HitDraft::default(),
            hsp: HspDraft::default(),
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
            State::ScanForIteration => Ok(self.scan_for_iteration(line)),
            State::InIteration => {
                self.in_iteration(line)?;
                Ok(None)
            }
            State::ScanForHit => Ok(self.scan_for_hit(line)),
            State::InHit => {
                self.in_hit(line)?;
                Ok(None)
            }
            State::ScanForHsp => {
                self.scan_for_hsp(line);
                Ok(None)
            }
            State::InHsp => self.in_hsp(line).map(|_| None),
        }
    }

    fn scan_for_iteration(&mut self, line: &str) -> Option<QueryResult> {
        if line.starts_with("<Iteration>") {
            // A new block closes out whatever query was pending
            let finished = self.finalize_query();
            self.state = State::InIteration;
            return finished;
        }
        None
    }

    fn in_iteration(&mut self, line: &str) -> Result<()> {
        if line.starts_with("<Iteration_iter-num>") {
            self.query.iter_num =
                parse_field(tag_content(line), "Iteration_iter-num", self.line_number)?;
        } else if line.starts_with("<Iteration_query-ID>") {
            self.query.id = tag_content(line).to_string();
        } else if line.starts_with("<Iteration_query-def>") {
            self.query.def = tag_content(line).to_string();
        } else if line.starts_with("<Iteration_query-len>") {
            self.query.len =
                parse_field(tag_content(line), "Iteration_query-len", self.line_number)?;
        } else if line.starts_with("<Iteration_hits>") {
            self.state = State::ScanForHit;
        } else if line.starts_with("<Iteration_message>") {
            self.query.message = Some(tag_content(line).to_string());
        }
        Ok(())
    }

    // The three no-hits conditions below are checked in a fixed order (open
    // tag, close tags, message text). They can disagree on malformed input;
    // first match wins.
    fn scan_for_hit(&mut self, line: &str) -> Option<QueryResult> {
        if line.starts_with("<Hit>") {
            self.hit = HitDraft::default();
            self.hsp = HspDraft::default();
            self.state = State::InHit;
            return None;
        }

        if line.starts_with("</Iteration_hits>") || line.starts_with("</Iteration>") {
            let finished = self.finalize_query();
            self.state = State::ScanForIteration;
            return finished;
        }

        if line.contains("No hits found") || self.query.message.as_deref() == Some("No hits found")
        {
            let finished = self.finalize_query();
            self.state = State::ScanForIteration;
            return finished;
        }

        None
    }

    fn in_hit(&mut self, line: &str) -> Result<()> {
        if line.starts_with("<Hit_num>") {
            self.hit.num = parse_field(tag_content(line), "Hit_num", self.line_number)?;
        } else if line.starts_with("<Hit_id>") {
            self.hit.id = tag_content(line).to_string();
        } else if line.starts_with("<Hit_def>") {
            self.hit.def = tag_content(line).to_string();
        } else if line.starts_with("<Hit_accession>") {
            self.hit.accession = tag_content(line).to_string();
        } else if line.starts_with("<Hit_len>") {
            self.hit.len = parse_field(tag_content(line), "Hit_len", self.line_number)?;
        } else if line.starts_with("<Hit_hsps>") {
            self.state = State::ScanForHsp;
        }
        Ok(())
    }

    fn scan_for_hsp(&mut self, line: &str) {
        if line.starts_with("<Hsp>") {
            self.hsp = HspDraft::default();
            self.state = State::InHsp;
        } else if line.starts_with("</Hit_hsps>") {
            self.finalize_hit();
            self.state = State::ScanForHit;
        }
    }

    fn in_hsp(&mut self, line: &str) -> Result<()> {
        if line.starts_with("<Hsp_bit-score>") {
            self.hsp.bit_score = tag_content(line).to_string();
        } else if line.starts_with("<Hsp_score>") {
            self.hsp.score = tag_content(line).to_string();
        } else if line.starts_with("<Hsp_evalue>") {
            self.hsp.evalue = tag_content(line).to_string();
        } else if line.starts_with("<Hsp_query-from>") {
            self.hsp.query_from =
                parse_field(tag_content(line), "Hsp_query-from", self.line_number)?;
        } else if line.starts_with("<Hsp_query-to>") {
            self.hsp.query_to = parse_field(tag_content(line), "Hsp_query-to", self.line_number)?;
        } else if line.starts_with("<Hsp_hit-from>") {
            self.hsp.hit_from = parse_field(tag_content(line), "Hsp_hit-from", self.line_number)?;
        } else if line.starts_with("<Hsp_hit-to>") {
            self.hsp.hit_to = parse_field(tag_content(line), "Hsp_hit-to", self.line_number)?;
        } else if line.starts_with("<Hsp_identity>") {
            self.hsp.identity = parse_field(tag_content(line), "Hsp_identity", self.line_number)?;
        } else if line.starts_with("<Hsp_positive>") {
            self.hsp.positive = parse_field(tag_content(line), "Hsp_positive", self.line_number)?;
        } else if line.starts_with("<Hsp_gaps>") {
            self.hsp.gaps = parse_field(tag_content(line), "Hsp_gaps", self.line_number)?;
        } else if line.starts_with("<Hsp_align-len>") {
            self.hsp.align_len = parse_field(tag_content(line), "Hsp_align-len", self.line_number)?;
        } else if line.starts_with("<Hsp_qseq>") {
            self.hsp.qseq = tag_content(line).to_string();
        } else if line.starts_with("<Hsp_hseq>") {
            self.hsp.hseq = tag_content(line).to_string();
        } else if line.starts_with("<Hsp_midline>") {
            self.hsp.midline = tag_content(line).to_string();
        } else if line.starts_with("</Hsp>") {
            self.finalize_hsp();
            self.state = State::ScanForHsp;
        }
        Ok(())
    }

    /// Append the completed HSP to the current hit and reset the HSP draft
    fn finalize_hsp(&mut self) {
        let draft = std::mem::take(&mut self.hsp);
        self.hit.hsps.push(Hsp {
            bit_score: draft.bit_score,
            score: draft.score,
            evalue: Evalue::new(draft.evalue),
            query_from: draft.query_from,
            query_to: draft.query_to,
            hit_from: draft.hit_from,
            hit_to: draft.hit_to,
            identity: draft.identity,
            positive: draft.positive,
            gaps: draft.gaps,
            align_len: draft.align_len,
            qseq: draft.qseq,
            hseq: draft.hseq,
            midline: draft.midline,
        });
    }

    /// Append the completed hit to the current query and reset the hit draft
    fn finalize_hit(&mut self) {
        let draft = std::mem::take(&mut self.hit);
        self.query.hits.push(Hit {
            num: draft.num,
            id: draft.id,
            accession: Some(draft.accession),
            def: draft.def,
            len: draft.len,
            evalue: None,
            hsps: draft.hsps,
        });
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
        self.hit = HitDraft::default();
        self.hsp = HspDraft::default();
        debug!(
            "finalized iteration {} ({}) with {} hit(s)",
            draft.iter_num,
            draft.id,
            draft.hits.len()
        );
        Some(QueryResult {
            iter_num: Some(draft.iter_num),
            query_id: draft.id,
            query_def: draft.def,
            query_len: draft.len,
            hits: draft.hits,
            message: draft.message,
        })
    }
}

impl<R: BufRead> Iterator for XmlReportStream<R> {
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
