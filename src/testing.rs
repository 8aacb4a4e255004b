// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation. It
//! provides a small catalogue writer that assembles a valid dataset byte
//! image through the same record codecs the loader uses, so every test
//! fixture exercises the real decode path. This is fixture plumbing, not
//! a catalogue compiler: callers lay out nodes and edges explicitly.

#![doc(hidden)]

use std::collections::HashMap;

use crate::binary::{
    encode_node, encode_root_nodes, encode_string, DatasetFooter, DatasetHeader, NodeIndexRecord,
    NodeRecord, NumericIndexRecord, NODE_INDEX_SIZE, NODE_RECORD_HEADER_SIZE, NUMERIC_INDEX_SIZE,
    VERSION,
};
use crate::dataset::Dataset;
use crate::node::Node;
use crate::types::{NodeOffset, StringOffset};

#[derive(Debug, Clone)]
enum BuilderKey {
    Inline(Vec<u8>),
    Table(Vec<u8>),
}

impl BuilderKey {
    fn bytes(&self) -> &[u8] {
        match self {
            BuilderKey::Inline(bytes) | BuilderKey::Table(bytes) => bytes,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct BuilderNode {
    position: i16,
    next_character_position: i16,
    characters: Option<Vec<u8>>,
    children: Vec<(BuilderKey, usize)>,
    numeric_children: Vec<(i16, usize)>,
    ranked_signature_indexes: Vec<i32>,
}

fn intern(table: &mut HashMap<Vec<u8>, i32>, block: &mut Vec<u8>, entry: &[u8]) -> i32 {
    if let Some(&offset) = table.get(entry) {
        return offset;
    }
    let offset = encode_string(entry, block).expect("fixture string fits u16 prefix");
    table.insert(entry.to_vec(), offset);
    offset
}

/// Assembles a complete catalogue image from explicitly laid-out nodes.
///
/// Node handles returned by `add_node` / `add_complete` are plain indexes
/// into the builder; `build` resolves them to record byte offsets.
/// Children and numeric children are sorted here, matching the ordering
/// guarantee the real encoder gives the loader, and parent offsets are
/// derived from the edges.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    max_subject_length: u32,
    nodes: Vec<BuilderNode>,
    roots: Vec<(usize, usize)>,
}

impl DatasetBuilder {
    pub fn new(max_subject_length: u32) -> Self {
        Self {
            max_subject_length,
            ..Self::default()
        }
    }

    /// Add an incomplete node anchored at `position`.
    pub fn add_node(&mut self, position: i16) -> usize {
        self.nodes.push(BuilderNode {
            position,
            next_character_position: -1,
            ..BuilderNode::default()
        });
        self.nodes.len() - 1
    }

    /// Add a complete node anchored at `position` whose span reads
    /// `characters`.
    pub fn add_complete(&mut self, position: i16, characters: &[u8]) -> usize {
        self.nodes.push(BuilderNode {
            position,
            next_character_position: position + characters.len() as i16 + 1,
            characters: Some(characters.to_vec()),
            ..BuilderNode::default()
        });
        self.nodes.len() - 1
    }

    /// Add a literal edge with an inline key (1 to 4 bytes, no zero bytes).
    pub fn add_inline_child(&mut self, parent: usize, key: &[u8], child: usize) {
        assert!(
            (1..=4).contains(&key.len()) && !key.contains(&0),
            "inline keys are 1-4 non-zero bytes"
        );
        self.nodes[parent]
            .children
            .push((BuilderKey::Inline(key.to_vec()), child));
    }

    /// Add a literal edge whose key lives in the string table.
    pub fn add_string_child(&mut self, parent: usize, key: &[u8], child: usize) {
        self.nodes[parent]
            .children
            .push((BuilderKey::Table(key.to_vec()), child));
    }

    /// Add a numeric edge.
    pub fn add_numeric_child(&mut self, parent: usize, value: i16, child: usize) {
        self.nodes[parent].numeric_children.push((value, child));
    }

    pub fn add_ranked_signatures(&mut self, node: usize, indexes: &[i32]) {
        self.nodes[node]
            .ranked_signature_indexes
            .extend_from_slice(indexes);
    }

    /// Anchor `node` as the root for subject `position`.
    pub fn set_root(&mut self, position: usize, node: usize) {
        self.roots.push((position, node));
    }

    /// Serialize the catalogue: strings, root table, node records,
    /// header and CRC footer.
    pub fn build(&self) -> Vec<u8> {
        let mut strings = Vec::new();
        let mut interned: HashMap<Vec<u8>, i32> = HashMap::new();

        // Parents derive from the edges; the first referrer wins.
        let mut parent_of: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            for (_, child) in &node.children {
                parent_of[*child].get_or_insert(id);
            }
            for &(_, child) in &node.numeric_children {
                parent_of[child].get_or_insert(id);
            }
        }

        // Record offsets follow from the record sizes alone.
        let mut record_offsets = Vec::with_capacity(self.nodes.len());
        let mut next_offset = 0usize;
        for node in &self.nodes {
            record_offsets.push(next_offset as i32);
            next_offset += NODE_RECORD_HEADER_SIZE
                + node.children.len() * NODE_INDEX_SIZE
                + node.numeric_children.len() * NUMERIC_INDEX_SIZE
                + node.ranked_signature_indexes.len() * 4;
        }

        let mut nodes_bytes = Vec::with_capacity(next_offset);
        for (id, node) in self.nodes.iter().enumerate() {
            let mut children: Vec<&(BuilderKey, usize)> = node.children.iter().collect();
            children.sort_by(|a, b| a.0.bytes().cmp(b.0.bytes()));
            let children = children
                .into_iter()
                .map(|(key, child)| {
                    let (is_string, value) = match key {
                        BuilderKey::Inline(bytes) => {
                            let mut value = [0u8; 4];
                            value[..bytes.len()].copy_from_slice(bytes);
                            (false, value)
                        }
                        BuilderKey::Table(bytes) => {
                            let offset = intern(&mut interned, &mut strings, bytes);
                            (true, offset.to_le_bytes())
                        }
                    };
                    NodeIndexRecord {
                        is_string,
                        value,
                        child_node_offset: record_offsets[*child],
                    }
                })
                .collect();

            let mut numeric: Vec<(i16, usize)> = node.numeric_children.clone();
            numeric.sort_by_key(|&(value, _)| value);
            let numeric_children = numeric
                .into_iter()
                .map(|(value, child)| NumericIndexRecord {
                    value,
                    child_node_offset: record_offsets[child],
                })
                .collect();

            let character_string_offset = match &node.characters {
                Some(characters) => intern(&mut interned, &mut strings, characters),
                None => -1,
            };
            debug_assert_eq!(nodes_bytes.len() as i32, record_offsets[id]);
            encode_node(
                &NodeRecord {
                    position: node.position,
                    next_character_position: node.next_character_position,
                    parent_offset: parent_of[id].map_or(-1, |p| record_offsets[p]),
                    character_string_offset,
                    children,
                    numeric_children,
                    ranked_signature_indexes: node.ranked_signature_indexes.clone(),
                },
                &mut nodes_bytes,
            );
        }

        let table_len = self.roots.iter().map(|&(p, _)| p + 1).max().unwrap_or(0);
        let mut root_table = vec![-1i32; table_len];
        for &(position, node) in &self.roots {
            root_table[position] = record_offsets[node];
        }
        let mut root_bytes = Vec::new();
        encode_root_nodes(&root_table, &mut root_bytes);

        let header = DatasetHeader {
            version: VERSION,
            flags: 0,
            node_count: self.nodes.len() as u32,
            max_subject_length: self.max_subject_length,
            strings_len: strings.len() as u32,
            root_nodes_len: root_bytes.len() as u32,
            nodes_len: nodes_bytes.len() as u32,
        };

        let mut bytes = Vec::new();
        header.write(&mut bytes).expect("write to Vec cannot fail");
        bytes.extend_from_slice(&strings);
        bytes.extend_from_slice(&root_bytes);
        bytes.extend_from_slice(&nodes_bytes);
        let footer = DatasetFooter {
            crc32: DatasetFooter::compute_crc32(&bytes),
        };
        footer.write(&mut bytes).expect("write to Vec cannot fail");
        bytes
    }
}

/// The canonical small catalogue: the signature "Chrome/52" anchored at
/// subject positions 0..=8, with numeric version children {50, 52} at the
/// version node. Used by unit, integration and property tests alike.
pub fn chrome_catalogue() -> Dataset {
    Dataset::from_bytes(&chrome_catalogue_bytes()).expect("fixture image decodes")
}

/// Raw image of [`chrome_catalogue`], for tests that exercise the loader.
pub fn chrome_catalogue_bytes() -> Vec<u8> {
    let mut builder = DatasetBuilder::new(64);
    let complete_52 = builder.add_complete(-1, b"Chrome/52");
    let complete_50 = builder.add_complete(-1, b"Chrome/50");
    let version_52 = builder.add_node(6);
    let version_50 = builder.add_node(6);
    builder.add_string_child(version_52, b"Chrome/", complete_52);
    builder.add_string_child(version_50, b"Chrome/", complete_50);
    let root = builder.add_node(8);
    builder.add_inline_child(root, b"52", version_52);
    builder.add_numeric_child(root, 50, version_50);
    builder.add_numeric_child(root, 52, version_52);
    builder.add_ranked_signatures(complete_52, &[0]);
    builder.add_ranked_signatures(complete_50, &[1]);
    builder.set_root(8, root);
    builder.build()
}

/// Build a bare node for overlap and length tests: only the fields the
/// predicates read are meaningful.
pub fn span_node(offset: i32, position: i16, root_position: i16) -> Node {
    Node {
        offset: NodeOffset(offset),
        position,
        next_character_position: -1,
        parent: NodeOffset::NONE,
        character_string_offset: StringOffset::NONE,
        children: Vec::new(),
        numeric_children: Vec::new(),
        ranked_signature_indexes: Vec::new(),
        root: NodeOffset::NONE,
        root_position,
        characters: Vec::new(),
    }
}
