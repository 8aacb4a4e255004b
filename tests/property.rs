//! Property tests over generated catalogues.

use std::collections::BTreeSet;

use proptest::prelude::*;
use uatrie::testing::DatasetBuilder;
use uatrie::{detect, Dataset, DetectionMethod};

/// A chrome-style catalogue with one signature per version value: the
/// root at position 8 carries a literal and a numeric edge for each.
fn version_catalogue(values: &BTreeSet<i16>) -> Dataset {
    let mut builder = DatasetBuilder::new(32);
    let root = builder.add_node(8);
    for &value in values {
        let characters = format!("Chrome/{}", value);
        let complete = builder.add_complete(-1, characters.as_bytes());
        let mid = builder.add_node(6);
        builder.add_string_child(mid, b"Chrome/", complete);
        builder.add_inline_child(root, format!("{}", value).as_bytes(), mid);
        builder.add_numeric_child(root, value, mid);
    }
    builder.set_root(8, root);
    Dataset::from_bytes(&builder.build()).expect("generated catalogue decodes")
}

proptest! {
    /// Against any set of two-digit versions, detection finds the version
    /// minimizing the absolute difference, preferring the lower value on
    /// a tie, and charges exactly that difference.
    #[test]
    fn detection_picks_the_nearest_version(
        values in proptest::collection::btree_set(10i16..100, 1..12),
        target in 10i16..100,
    ) {
        let dataset = version_catalogue(&values);
        let subject = format!("Chrome/{}", target);
        let detection = detect(&dataset, subject.as_bytes());

        if values.contains(&target) {
            prop_assert_eq!(detection.method, DetectionMethod::Exact);
            prop_assert_eq!(detection.difference, 0);
        } else {
            let nearest = values
                .iter()
                .copied()
                .min_by_key(|&v| ((v - target).unsigned_abs(), v))
                .unwrap();
            prop_assert_eq!(detection.method, DetectionMethod::Numeric);
            prop_assert_eq!(detection.difference, u32::from((nearest - target).unsigned_abs()));
            let node = dataset.node_at(detection.node_offsets[0]);
            let expected = format!("Chrome/{}", nearest);
            prop_assert_eq!(node.characters(), expected.as_bytes());
        }
    }

    /// Child lookup is a binary search: the evaluated-candidate count
    /// stays logarithmic in the child count.
    #[test]
    fn child_lookup_is_logarithmic(subject in b'a'..=b'z') {
        let mut builder = DatasetBuilder::new(8);
        let root = builder.add_node(0);
        for key in b'a'..=b'z' {
            let complete = builder.add_complete(-1, &[key]);
            builder.add_inline_child(root, &[key], complete);
        }
        builder.set_root(0, root);
        let dataset = Dataset::from_bytes(&builder.build()).expect("decodes");

        let detection = detect(&dataset, &[subject]);
        prop_assert_eq!(detection.method, DetectionMethod::Exact);
        // ceil(log2(26 + 1)) candidates at most.
        prop_assert!(detection.nodes_evaluated <= 5);
    }

    /// Any single corrupted byte in a valid image is refused by the
    /// loader; the checksum covers everything ahead of the footer, and
    /// the footer guards itself.
    #[test]
    fn single_byte_corruption_is_always_refused(
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let values: BTreeSet<i16> = [50, 52].into_iter().collect();
        let mut builder = DatasetBuilder::new(32);
        let root = builder.add_node(8);
        for &value in &values {
            let characters = format!("Chrome/{}", value);
            let complete = builder.add_complete(-1, characters.as_bytes());
            let mid = builder.add_node(6);
            builder.add_string_child(mid, b"Chrome/", complete);
            builder.add_inline_child(root, format!("{}", value).as_bytes(), mid);
            builder.add_numeric_child(root, value, mid);
        }
        builder.set_root(8, root);
        let mut bytes = builder.build();

        let at = index.index(bytes.len());
        bytes[at] ^= mask;
        prop_assert!(Dataset::from_bytes(&bytes).is_err());
    }
}
