//! Integration tests for the plain-text report parser
//!
//! These tests run the parser against a checked-in report sample that keeps
//! the surrounding noise real BLAST output carries: program banner, database
//! summary, score tables and Lambda statistics blocks.

use bigdecimal::BigDecimal;
use blastio::TextReportStream;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

fn sample_path() -> PathBuf {
    PathBuf::from("tests/data/blast/sample_report.txt")
}

#[test]
fn test_sample_report_parsing() {
    let stream = TextReportStream::from_path(sample_path()).expect("Failed to open sample report");

    let records: Vec<_> = stream
        .collect::<blastio::Result<Vec<_>>>()
        .expect("Failed to parse sample report");

    assert_eq!(records.len(), 2, "Expected 2 queries in sample report");

    // First query: no hits, wrapped annotation joined
    let first = &records[0];
    assert_eq!(first.query_id, "Z0001");
    assert_eq!(
        first.query_def,
        "thr operon leader peptide annotation continued on a second line"
    );
    assert_eq!(first.query_len, 21);
    assert!(!first.has_hits());
    assert_eq!(first.message.as_deref(), Some("No hits found"));

    // Second query: two hits, the final one completed by the end-of-input
    // flush since nothing follows it
    let second = &records[1];
    assert_eq!(second.query_id, "Z0002");
    assert_eq!(second.query_len, 820);
    assert_eq!(second.hit_count(), 2);

    let hit = &second.hits[0];
    assert_eq!(hit.id, "sp|P00561|AK1H_ECOLI");
    assert_eq!(hit.len, 820);
    assert_eq!(hit.evalue.as_ref().unwrap().as_str(), "0.0");

    let hit = &second.hits[1];
    assert_eq!(hit.id, "sp|P27725|AK2H_SALTY");
    assert_eq!(hit.len, 810);
    assert_eq!(hit.evalue.as_ref().unwrap().as_str(), "1e-250");
}

#[test]
fn test_emitted_records_hold_invariants() {
    let stream = TextReportStream::from_path(sample_path()).expect("Failed to open sample report");

    for record in stream {
        let record = record.expect("Failed to parse record");

        // Finalize never emits an identifier-less record
        assert!(!record.query_id.is_empty(), "Record ID should not be empty");

        // A no-hits message implies an empty hit list
        if record.message.as_deref() == Some("No hits found") {
            assert!(record.hits.is_empty(), "No-hits query must carry no hits");
        }

        // Hit ordinals follow input order
        for (i, hit) in record.hits.iter().enumerate() {
            assert_eq!(hit.num as usize, i + 1, "Hit ordinal out of order");
            assert!(hit.evalue.is_some(), "Text report hits carry an e-value");
        }
    }
}

#[test]
fn test_evalue_decimal_round_trip() {
    let stream = TextReportStream::from_path(sample_path()).expect("Failed to open sample report");

    let records: Vec<_> = stream
        .collect::<blastio::Result<Vec<_>>>()
        .expect("Failed to parse sample report");

    let evalue = records[1].hits[1].evalue.as_ref().unwrap();

    // Two independent conversions agree, and the token itself is untouched
    let first = evalue.decimal().expect("e-value should convert");
    let second = evalue.decimal().expect("e-value should convert");
    assert_eq!(first, second);
    assert_eq!(evalue.as_str(), "1e-250");
    assert_eq!(first, BigDecimal::from_str("1e-250").unwrap());
}

#[test]
fn test_gzip_input_parses_identically() {
    let plain = TextReportStream::from_path(sample_path())
        .expect("Failed to open sample report")
        .collect::<blastio::Result<Vec<_>>>()
        .expect("Failed to parse sample report");

    // Compress the same sample into a temp file and parse it back
    let raw = std::fs::read(sample_path()).expect("Failed to read sample report");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let gz_path = dir.path().join("sample_report.txt.gz");

    let file = std::fs::File::create(&gz_path).expect("Failed to create gzip file");
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(&raw).expect("Failed to write gzip data");
    encoder.finish().expect("Failed to finish gzip stream");

    let gzipped = TextReportStream::from_gzip_path(&gz_path)
        .expect("Failed to open gzip report")
        .collect::<blastio::Result<Vec<_>>>()
        .expect("Failed to parse gzip report");

    assert_eq!(plain, gzipped);
}

#[test]
fn test_missing_file_fails_at_open() {
    let result = TextReportStream::from_path("tests/data/blast/does_not_exist.txt");
    assert!(matches!(result, Err(blastio::BlastError::Io(_))));
}
