//! Common record types produced by the blastio parsers
//!
//! All records are fully populated at construction time and never mutated
//! afterwards. The parsers move their working buffers into these types when a
//! record boundary is crossed, so an emitted record is independent of any
//! later parser state.

use crate::error::{BlastError, Result};
use bigdecimal::BigDecimal;
use std::fmt;
use std::str::FromStr;

/// An expectation value, stored as the verbatim token from the report.
///
/// BLAST e-values can be far smaller than the smallest positive `f64`
/// (e.g. `1e-320`), so the textual token is the source of truth. A numeric
/// view is derived on demand with arbitrary precision and never cached in
/// place of the string.
///
/// # Examples
///
/// ```
/// use blastio::Evalue;
/// use bigdecimal::BigDecimal;
///
/// let e = Evalue::new("1e-320");
/// assert_eq!(e.as_str(), "1e-320");
/// assert!(e.decimal().unwrap() > BigDecimal::from(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evalue(String);

impl Evalue {
    /// Wrap a raw e-value token. The token is kept byte-for-byte.
    pub fn new(token: impl Into<String>) -> Self {
        Evalue(token.into())
    }

    /// The stored token, unmodified (never normalized or rounded)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the arbitrary-precision numeric value of this e-value.
    ///
    /// This is a pure read-only conversion of the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`BlastError::InvalidEvalue`] if the token is not a decimal
    /// number.
    pub fn decimal(&self) -> Result<BigDecimal> {
        BigDecimal::from_str(&self.0).map_err(|e| BlastError::InvalidEvalue {
            value: self.0.clone(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Evalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One local alignment segment (High-scoring Segment Pair) within a hit.
///
/// Only the XML report carries HSP-level detail; the plain-text report stops
/// at the hit level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hsp {
    /// Bit score token (kept as reported, e.g. "245.3")
    pub bit_score: String,
    /// Raw score token
    pub score: String,
    /// Expectation value for this alignment
    pub evalue: Evalue,
    /// Alignment start on the query (1-based)
    pub query_from: u64,
    /// Alignment end on the query (1-based, inclusive)
    pub query_to: u64,
    /// Alignment start on the subject (1-based)
    pub hit_from: u64,
    /// Alignment end on the subject (1-based, inclusive)
    pub hit_to: u64,
    /// Number of identical positions
    pub identity: u64,
    /// Number of positive-scoring (similar) positions
    pub positive: u64,
    /// Number of gap positions
    pub gaps: u64,
    /// Total alignment length
    pub align_len: u64,
    /// Aligned query sequence
    pub qseq: String,
    /// Aligned subject sequence
    pub hseq: String,
    /// Midline match annotation between the two sequences
    pub midline: String,
}

impl Hsp {
    /// Percent identity of this alignment (0.0 when the alignment is empty)
    pub fn percent_identity(&self) -> f64 {
        if self.align_len > 0 {
            self.identity as f64 / self.align_len as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// One subject sequence reported as similar to a query.
///
/// The two report styles attach the e-value at different levels: the text
/// report carries one e-value per hit (`evalue`), the XML report carries one
/// per HSP (`hsps`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Ordinal position of this hit within its query (1-based)
    pub num: u32,
    /// Subject sequence identifier
    pub id: String,
    /// Subject accession (XML report only)
    pub accession: Option<String>,
    /// Free-text subject annotation/definition
    pub def: String,
    /// Declared subject sequence length
    pub len: u64,
    /// Hit-level e-value (text report only)
    pub evalue: Option<Evalue>,
    /// Local alignments in input order (XML report only)
    pub hsps: Vec<Hsp>,
}

impl Hit {
    /// The best (numerically smallest) e-value among this hit's HSPs.
    ///
    /// Returns `Ok(None)` when the hit carries no HSPs.
    ///
    /// # Errors
    ///
    /// Returns [`BlastError::InvalidEvalue`] if any HSP token fails
    /// arbitrary-precision conversion.
    pub fn best_evalue(&self) -> Result<Option<BigDecimal>> {
        let mut best: Option<BigDecimal> = None;
        for hsp in &self.hsps {
            let value = hsp.evalue.decimal()?;
            match &best {
                Some(current) if *current <= value => {}
                _ => best = Some(value),
            }
        }
        Ok(best)
    }
}

/// One query (iteration) and all of its hits.
///
/// This is the top-level record emitted by both parsers, one per query, in
/// input order. A query with no hits is a valid terminal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Iteration index from the XML report (absent for the text report)
    pub iter_num: Option<u32>,
    /// Query identifier (non-empty for every emitted record)
    pub query_id: String,
    /// Free-text query annotation/definition
    pub query_def: String,
    /// Declared query sequence length
    pub query_len: u64,
    /// Hits in input order
    pub hits: Vec<Hit>,
    /// Status message, e.g. "No hits found"
    pub message: Option<String>,
}

impl QueryResult {
    /// Whether this query matched anything
    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Number of hits for this query
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }
}
