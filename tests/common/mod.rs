//! Shared fixtures for the integration tests.
//!
//! The browser catalogue holds two independent signature chains so the
//! sweep has more than one span to record:
//!
//! ```text
//! subject template:  A B / 1 0 _ C D / 2 0
//! positions:         0 1 2 3 4 5 6 7 8 9 10
//!
//! chain 1 (root at 4):  "AB/10", numeric version child {10}
//! chain 2 (root at 10): "CD/20", numeric version child {20}
//! ```

use uatrie::testing::DatasetBuilder;
use uatrie::Dataset;

pub fn browser_catalogue_bytes() -> Vec<u8> {
    let mut builder = DatasetBuilder::new(32);

    // Chain 1: complete span (-1, 4] reading "AB/10".
    let complete_ab = builder.add_complete(-1, b"AB/10");
    let mid_ab = builder.add_node(2);
    let root_ab = builder.add_node(4);
    builder.add_string_child(mid_ab, b"AB/", complete_ab);
    builder.add_inline_child(root_ab, b"10", mid_ab);
    builder.add_numeric_child(root_ab, 10, mid_ab);
    builder.set_root(4, root_ab);

    // Chain 2: complete span (5, 10] reading "CD/20".
    let complete_cd = builder.add_complete(5, b"CD/20");
    let mid_cd = builder.add_node(8);
    let root_cd = builder.add_node(10);
    builder.add_string_child(mid_cd, b"CD/", complete_cd);
    builder.add_inline_child(root_cd, b"20", mid_cd);
    builder.add_numeric_child(root_cd, 20, mid_cd);
    builder.set_root(10, root_cd);

    builder.build()
}

pub fn browser_catalogue() -> Dataset {
    Dataset::from_bytes(&browser_catalogue_bytes()).expect("fixture catalogue decodes")
}
