//! End-to-end tests: encode a catalogue, load it through the binary
//! container, and drive full detections against it.

mod common;

use std::fs;
use std::io::Write;

use common::{browser_catalogue, browser_catalogue_bytes};
use uatrie::testing::DatasetBuilder;
use uatrie::{detect, Dataset, DetectionMethod};

// =============================================================================
// DETECTION SCENARIOS
// =============================================================================

#[test]
fn exact_detection_records_every_non_overlapping_span() {
    let dataset = browser_catalogue();
    let detection = detect(&dataset, b"AB/10 CD/20");

    assert_eq!(detection.method, DetectionMethod::Exact);
    assert_eq!(detection.difference, 0);
    assert_eq!(detection.node_offsets.len(), 2);

    // The sweep runs right to left, so the right span is recorded first.
    let first = dataset.node_at(detection.node_offsets[0]);
    let second = dataset.node_at(detection.node_offsets[1]);
    assert_eq!(first.characters(), b"CD/20");
    assert_eq!(second.characters(), b"AB/10");
}

#[test]
fn rendered_spans_sit_at_their_subject_positions() {
    let dataset = browser_catalogue();
    let detection = detect(&dataset, b"AB/10 CD/20");
    assert_eq!(detection.matched.trim_end(), "AB/10 CD/20");
}

#[test]
fn one_exact_span_suppresses_the_numeric_fallback() {
    // "AB/11" has no literal edge, but "CD/20" still matches exactly.
    // The fallback sweep only runs when the exact sweep recorded nothing,
    // so the unmatched span stays unmatched rather than approximated.
    let dataset = browser_catalogue();
    let detection = detect(&dataset, b"AB/11 CD/20");

    assert_eq!(detection.method, DetectionMethod::Exact);
    assert_eq!(detection.difference, 0);
    assert_eq!(detection.node_offsets.len(), 1);
    let node = dataset.node_at(detection.node_offsets[0]);
    assert_eq!(node.characters(), b"CD/20");
}

#[test]
fn numeric_fallback_accumulates_across_spans() {
    let dataset = browser_catalogue();
    let detection = detect(&dataset, b"AB/11 CD/21");

    assert_eq!(detection.method, DetectionMethod::Numeric);
    // |10-11| + |20-21|
    assert_eq!(detection.difference, 2);
    assert_eq!(detection.node_offsets.len(), 2);
    assert_eq!(detection.matched.trim_end(), "AB/10 CD/20");
}

#[test]
fn out_of_bucket_digit_runs_never_approximate() {
    // Numeric children {50, 52} sit in the [10,100) bucket; a four-digit
    // run at the same anchor may be arithmetically close to nothing else
    // in the catalogue, but it must not approximate across buckets.
    let mut builder = DatasetBuilder::new(32);
    let root = builder.add_node(10);
    let chrome_50 = builder.add_complete(-1, b"Chrome/50");
    let chrome_52 = builder.add_complete(-1, b"Chrome/52");
    builder.add_numeric_child(root, 50, chrome_50);
    builder.add_numeric_child(root, 52, chrome_52);
    builder.set_root(10, root);
    let dataset = Dataset::from_bytes(&builder.build()).expect("decodes");

    // Digit run ending at position 10 is "9999": no bucket overlap.
    let detection = detect(&dataset, b"Chrome/9999");
    assert_eq!(detection.method, DetectionMethod::None);
    assert!(detection.node_offsets.is_empty());
    assert_eq!(detection.difference, 0);

    // Same anchor with a two-digit run: bucket matches, 50 wins by 1.
    let detection = detect(&dataset, b"Version:Z51");
    assert_eq!(detection.method, DetectionMethod::Numeric);
    assert_eq!(detection.difference, 1);
    let node = dataset.node_at(detection.node_offsets[0]);
    assert_eq!(node.characters(), b"Chrome/50");
}

#[test]
fn empty_subject_matches_nothing() {
    let dataset = browser_catalogue();
    let detection = detect(&dataset, b"");
    assert_eq!(detection.method, DetectionMethod::None);
    assert!(detection.node_offsets.is_empty());
}

#[test]
fn oversized_subject_is_clipped_to_the_catalogue_limit() {
    let dataset = browser_catalogue();
    let mut subject = b"AB/10 CD/20".to_vec();
    subject.extend(std::iter::repeat(b'x').take(200));

    // Only the clipped prefix participates; the spans inside it still match.
    let detection = detect(&dataset, &subject);
    assert_eq!(detection.method, DetectionMethod::Exact);
    assert_eq!(detection.node_offsets.len(), 2);
}

#[test]
fn detection_serializes_to_json() {
    let dataset = browser_catalogue();
    let detection = detect(&dataset, b"AB/10 CD/20");
    let json = serde_json::to_string(&detection).expect("serializes");
    assert!(json.contains("\"method\":\"exact\""));
    assert!(json.contains("\"difference\":0"));
}

// =============================================================================
// CONTAINER ROUND-TRIP AND REJECTION
// =============================================================================

#[test]
fn dataset_round_trips_through_a_file() {
    let bytes = browser_catalogue_bytes();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&bytes).expect("write image");

    let dataset = Dataset::from_file(file.path()).expect("loads from disk");
    assert_eq!(dataset.node_count(), 6);
    let detection = detect(&dataset, b"AB/10 CD/20");
    assert_eq!(detection.method, DetectionMethod::Exact);
}

#[test]
fn missing_file_reports_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Dataset::from_file(dir.path().join("absent.uatrie"));
    assert!(err.is_err());
}

#[test]
fn truncated_image_is_rejected() {
    let bytes = browser_catalogue_bytes();
    for cut in [0, 4, 16, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            Dataset::from_bytes(&bytes[..cut]).is_err(),
            "truncation at {} must fail",
            cut
        );
    }
}

#[test]
fn trailing_garbage_is_rejected() {
    let mut bytes = browser_catalogue_bytes();
    bytes.extend_from_slice(b"junk");
    assert!(Dataset::from_bytes(&bytes).is_err());
}

#[test]
fn corrupted_magic_is_rejected() {
    let mut bytes = browser_catalogue_bytes();
    bytes[0] ^= 0xff;
    assert!(Dataset::from_bytes(&bytes).is_err());
}

#[test]
fn corrupted_content_fails_the_checksum() {
    let mut bytes = browser_catalogue_bytes();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;
    assert!(Dataset::from_bytes(&bytes).is_err());
}

#[test]
fn corrupted_footer_is_rejected() {
    let mut bytes = browser_catalogue_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(Dataset::from_bytes(&bytes).is_err());
}

#[test]
fn loaded_dataset_is_usable_after_dropping_the_source_buffer() {
    let dataset = {
        let bytes = browser_catalogue_bytes();
        Dataset::from_bytes(&bytes).expect("decodes")
    };
    let detection = detect(&dataset, b"CD/20");
    assert_eq!(detection.method, DetectionMethod::Exact);
}

#[test]
fn datasets_load_identically_from_bytes_and_disk() {
    let bytes = browser_catalogue_bytes();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("catalogue.uatrie");
    fs::write(&path, &bytes).expect("write image");

    let from_bytes = Dataset::from_bytes(&bytes).expect("decodes");
    let from_disk = Dataset::from_file(&path).expect("loads");
    let a = detect(&from_bytes, b"AB/11 CD/21");
    let b = detect(&from_disk, b"AB/11 CD/21");
    assert_eq!(a.node_offsets, b.node_offsets);
    assert_eq!(a.difference, b.difference);
}
