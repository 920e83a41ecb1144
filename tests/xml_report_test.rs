//! Integration tests for the XML report parser
//!
//! The checked-in sample mirrors real `-outfmt 5` output: a document header,
//! two iterations (one with nested hit/HSP blocks, one with no hits), and
//! the per-line tag layout BLAST emits.

use bigdecimal::BigDecimal;
use blastio::XmlReportStream;
use std::path::PathBuf;
use std::str::FromStr;

fn sample_path() -> PathBuf {
    PathBuf::from("tests/data/blast/sample_report.xml")
}

#[test]
fn test_sample_xml_parsing() {
    let stream = XmlReportStream::from_path(sample_path()).expect("Failed to open sample XML");

    let records: Vec<_> = stream
        .collect::<blastio::Result<Vec<_>>>()
        .expect("Failed to parse sample XML");

    assert_eq!(records.len(), 2, "Expected 2 iterations in sample XML");

    let first = &records[0];
    assert_eq!(first.iter_num, Some(1));
    assert_eq!(first.query_id, "Query_1");
    assert_eq!(
        first.query_def,
        "Z0002 bifunctional aspartokinase I/homoserine dehydrogenase I"
    );
    assert_eq!(first.query_len, 820);
    assert_eq!(first.hit_count(), 2);
    assert!(first.message.is_none());

    let second = &records[1];
    assert_eq!(second.iter_num, Some(2));
    assert_eq!(second.query_id, "Query_2");
    assert!(second.hits.is_empty());
    assert_eq!(second.message.as_deref(), Some("No hits found"));
}

#[test]
fn test_hit_and_hsp_detail() {
    let stream = XmlReportStream::from_path(sample_path()).expect("Failed to open sample XML");

    let records: Vec<_> = stream
        .collect::<blastio::Result<Vec<_>>>()
        .expect("Failed to parse sample XML");

    let hit = &records[0].hits[0];
    assert_eq!(hit.num, 1);
    assert_eq!(hit.id, "sp|P00561|AK1H_ECOLI");
    assert_eq!(hit.accession.as_deref(), Some("P00561"));
    assert_eq!(hit.len, 820);
    assert_eq!(hit.hsps.len(), 2, "First hit carries two HSPs");

    // HSPs appear in block order
    let hsp = &hit.hsps[0];
    assert_eq!(hsp.bit_score, "1600.1");
    assert_eq!(hsp.score, "4143");
    assert_eq!(hsp.evalue.as_str(), "0");
    assert_eq!(hsp.query_from, 1);
    assert_eq!(hsp.query_to, 820);
    assert_eq!(hsp.identity, 820);
    assert_eq!(hsp.align_len, 820);
    assert!((hsp.percent_identity() - 100.0).abs() < 1e-9);
    assert_eq!(hsp.qseq.len(), hsp.hseq.len());
    assert_eq!(hsp.qseq.len(), hsp.midline.len());

    assert_eq!(hit.hsps[1].evalue.as_str(), "2.5e-180");

    // Best e-value across HSPs is the numerically smallest
    let best = hit.best_evalue().expect("conversion").expect("non-empty");
    assert_eq!(best, BigDecimal::from(0));

    let hit = &records[0].hits[1];
    assert_eq!(hit.num, 2);
    assert_eq!(hit.hsps.len(), 1);
    let best = hit.best_evalue().expect("conversion").expect("non-empty");
    assert_eq!(best, BigDecimal::from_str("1e-250").unwrap());
}

#[test]
fn test_emitted_records_hold_invariants() {
    let stream = XmlReportStream::from_path(sample_path()).expect("Failed to open sample XML");

    for record in stream {
        let record = record.expect("Failed to parse record");

        assert!(!record.query_id.is_empty(), "Record ID should not be empty");

        if record.message.as_deref() == Some("No hits found") {
            assert!(record.hits.is_empty(), "No-hits query must carry no hits");
        }

        for hit in &record.hits {
            assert!(hit.accession.is_some(), "XML hits carry an accession");
            assert!(hit.evalue.is_none(), "XML e-values live on the HSPs");
            for hsp in &hit.hsps {
                assert!(
                    hsp.evalue.decimal().is_ok(),
                    "Stored e-value token should convert"
                );
            }
        }
    }
}

#[test]
fn test_missing_file_fails_at_open() {
    let result = XmlReportStream::from_path("tests/data/blast/does_not_exist.xml");
    assert!(matches!(result, Err(blastio::BlastError::Io(_))));
}
