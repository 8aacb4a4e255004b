// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary container for uatrie device catalogues.
//!
//! A catalogue file is a handful of contiguous sections behind a
//! fixed-size header, closed by a CRC32 footer. Node records live at
//! stable byte offsets inside the NODES section; those offsets are the
//! node identities that parent links, child indexes and the root table
//! all use, so the section is never rewritten or compacted after encode.
//!
//! Everything is validated here, at load time: magic, version, section
//! bounds, CRC, every child / parent / string offset, and the ascending
//! order of numeric children. The traversal hot path trusts the loaded
//! dataset completely: a corrupt file fails `decode_dataset`, never a
//! later match.
//!
//! # Format Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (28 bytes)                                          │
//! │   magic: [u8; 4] = "UATR"                                  │
//! │   version: u8, flags: u8                                   │
//! │   node_count: u32, max_subject_length: u32                 │
//! │   strings_len: u32, root_nodes_len: u32, nodes_len: u32    │
//! │   reserved: [u8; 2]                                        │
//! ├────────────────────────────────────────────────────────────┤
//! │ 1. STRINGS    (length-prefixed byte strings, deduplicated) │
//! ├────────────────────────────────────────────────────────────┤
//! │ 2. ROOT_NODES (u32 count + i32 node offset per position)   │
//! ├────────────────────────────────────────────────────────────┤
//! │ 3. NODES      (node records at stable byte offsets)        │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "RTAU"                     │
//! └────────────────────────────────────────────────────────────┘
//! ```

// Submodules
mod header;
mod records;

// Re-export from submodules for public API
pub use header::{
    DatasetFooter, DatasetHeader, SectionOffsets, FOOTER_MAGIC, MAGIC, MAX_FILE_SIZE,
    MAX_NODE_COUNT, MAX_RANKED_SIGNATURES, MAX_SUBJECT_LENGTH, VERSION,
};
pub use records::{
    decode_node, decode_root_nodes, encode_node, encode_root_nodes, encode_string,
    NodeIndexRecord, NodeRecord, NumericIndexRecord, NODE_INDEX_SIZE, NODE_RECORD_HEADER_SIZE,
    NUMERIC_INDEX_SIZE,
};

use std::collections::HashMap;
use std::io;

use crate::dataset::{Dataset, Strings};
use crate::node::index::{NodeIndex, NodeIndexKey, NumericIndex};
use crate::node::Node;
use crate::types::{NodeOffset, StringOffset};

/// Decode a complete catalogue image into a ready-to-share [`Dataset`].
pub fn decode_dataset(bytes: &[u8]) -> io::Result<Dataset> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("File of {} bytes exceeds limit {}", bytes.len(), MAX_FILE_SIZE),
        ));
    }
    if bytes.len() < DatasetHeader::SIZE + DatasetFooter::SIZE {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "File too short for header and footer",
        ));
    }

    let header = DatasetHeader::read(&mut &bytes[..])?;
    let offsets = header.section_offsets();
    if offsets.total_size() != bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Header declares {} bytes but file has {}",
                offsets.total_size(),
                bytes.len()
            ),
        ));
    }

    let footer = DatasetFooter::read(bytes)?;
    let crc = DatasetFooter::compute_crc32(&bytes[..offsets.content_size()]);
    if crc != footer.crc32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("CRC mismatch: footer {:08x}, computed {:08x}", footer.crc32, crc),
        ));
    }

    let section = |range| {
        offsets
            .slice(bytes, range)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Section out of bounds"))
    };
    let strings = Strings::new(section(offsets.strings)?.to_vec());
    let root_offsets = decode_root_nodes(section(offsets.root_nodes)?)?;
    let nodes_bytes = section(offsets.nodes)?;

    // Walk the NODES section; each record's start offset is its identity.
    let mut nodes = Vec::with_capacity(header.node_count as usize);
    let mut index = HashMap::with_capacity(header.node_count as usize);
    let mut pos = 0usize;
    while pos < nodes_bytes.len() {
        let offset = pos as i32;
        let (record, next) = decode_node(nodes_bytes, pos)?;
        index.insert(offset, nodes.len());
        nodes.push(node_from_record(NodeOffset(offset), record));
        pos = next;
    }
    if nodes.len() != header.node_count as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Header declares {} nodes but section holds {}",
                header.node_count,
                nodes.len()
            ),
        ));
    }

    validate_references(&nodes, &index, &strings, &root_offsets)?;

    let mut dataset = Dataset {
        nodes,
        index,
        strings,
        root_nodes: root_offsets.into_iter().map(NodeOffset).collect(),
        max_subject_length: header.max_subject_length as usize,
    };
    dataset.finish_init()?;
    Ok(dataset)
}

fn node_from_record(offset: NodeOffset, record: NodeRecord) -> Node {
    let children = record
        .children
        .into_iter()
        .map(|child| {
            let key = if child.is_string {
                NodeIndexKey::Table(StringOffset(i32::from_le_bytes(child.value)))
            } else {
                NodeIndex::inline_key(child.value)
            };
            NodeIndex::new(key, NodeOffset(child.child_node_offset))
        })
        .collect();
    let numeric_children = record
        .numeric_children
        .into_iter()
        .map(|numeric| NumericIndex::new(numeric.value, NodeOffset(numeric.child_node_offset)))
        .collect();
    Node {
        offset,
        position: record.position,
        next_character_position: record.next_character_position,
        parent: NodeOffset(record.parent_offset),
        character_string_offset: StringOffset(record.character_string_offset),
        children,
        numeric_children,
        ranked_signature_indexes: record.ranked_signature_indexes,
        root: NodeOffset::NONE,
        root_position: 0,
        characters: Vec::new(),
    }
}

/// Cross-record validation: every offset a record carries must resolve,
/// and numeric children must already be sorted ascending (binary search
/// and the nearest-neighbour walk are only valid under that order; the
/// encoder guarantees it and we refuse files that break it rather than
/// re-sorting).
fn validate_references(
    nodes: &[Node],
    index: &HashMap<i32, usize>,
    strings: &Strings,
    root_offsets: &[i32],
) -> io::Result<()> {
    let check_node = |offset: NodeOffset, what: &str| -> io::Result<()> {
        if index.contains_key(&offset.get()) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} offset {} does not address a node", what, offset.get()),
            ))
        }
    };

    for node in nodes {
        for child in &node.children {
            check_node(child.child(), "child node")?;
            if let Some(string_offset) = child.table_key() {
                strings.read_at(string_offset)?;
            }
        }
        for pair in node.numeric_children.windows(2) {
            if pair[0].value() > pair[1].value() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Numeric children out of order at node {} ({} after {})",
                        node.offset.get(),
                        pair[1].value(),
                        pair[0].value()
                    ),
                ));
            }
        }
        for numeric in &node.numeric_children {
            check_node(numeric.child(), "numeric child node")?;
        }
        if !node.character_string_offset.is_none() {
            strings.read_at(node.character_string_offset)?;
        }
    }

    for &offset in root_offsets {
        if offset >= 0 {
            check_node(NodeOffset(offset), "root node")?;
        }
    }
    Ok(())
}
