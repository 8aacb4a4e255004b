// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The offset-addressed arena owning all nodes and strings.
//!
//! A `Dataset` is decoded once from a catalogue file, finished by a
//! single-threaded initialization pass, and then only ever read. The pass
//! resolves every node's root (and caches the root's position, which the
//! overlap predicate needs) and materializes the characters of complete
//! nodes, so no traversal ever synchronizes or recomputes anything.
//! After `finish_init` returns, sharing `&Dataset` across any number of
//! detection threads is safe by construction.
//!
//! Offsets are validated while decoding; the accessors used on the match
//! hot path (`node_at`, the string reads behind child keys) trust them
//! and do not re-validate.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::binary;
use crate::node::Node;
use crate::types::{NodeOffset, StringOffset};

/// The deduplicated string block: length-prefixed byte strings addressed
/// by their byte offset within the block.
#[derive(Debug, Clone)]
pub struct Strings {
    block: Vec<u8>,
}

impl Strings {
    pub(crate) fn new(block: Vec<u8>) -> Self {
        Self { block }
    }

    /// Bounds-checked read, used at load time to validate every offset
    /// the node records carry.
    pub fn read_at(&self, offset: StringOffset) -> io::Result<&[u8]> {
        if offset.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "negative string offset",
            ));
        }
        let start = offset.as_usize();
        let header_end = start.checked_add(2).filter(|&e| e <= self.block.len());
        let Some(header_end) = header_end else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("string offset {} past end of block", start),
            ));
        };
        let len = u16::from_le_bytes([self.block[start], self.block[start + 1]]) as usize;
        let end = header_end.checked_add(len).filter(|&e| e <= self.block.len());
        let Some(end) = end else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("string at offset {} truncated (expected {} bytes)", start, len),
            ));
        };
        Ok(&self.block[header_end..end])
    }

    /// Hot-path read for offsets validated at load time.
    #[inline]
    pub(crate) fn slice_at(&self, offset: StringOffset) -> &[u8] {
        let start = offset.as_usize();
        let len = u16::from_le_bytes([self.block[start], self.block[start + 1]]) as usize;
        &self.block[start + 2..start + 2 + len]
    }
}

/// One loaded device catalogue: nodes, strings, root-node table.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub(crate) nodes: Vec<Node>,
    /// Arena index: node offset → position in `nodes`.
    pub(crate) index: HashMap<i32, usize>,
    pub(crate) strings: Strings,
    /// Root node per subject character position; `NONE` where no
    /// signature character ends at that position.
    pub(crate) root_nodes: Vec<NodeOffset>,
    pub(crate) max_subject_length: usize,
}

impl Dataset {
    /// Decode a dataset from a complete catalogue image, verifying the
    /// container (magic, version, CRC) and every record offset, then run
    /// the initialization pass.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        binary::decode_dataset(bytes)
    }

    /// Read and decode a catalogue file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum subject length the catalogue was built for.
    #[inline]
    pub fn max_subject_length(&self) -> usize {
        self.max_subject_length
    }

    /// The node at `offset`. Offsets held by a loaded dataset were
    /// validated at decode time; an unknown offset is a caller bug and
    /// panics.
    #[inline]
    pub fn node_at(&self, offset: NodeOffset) -> &Node {
        &self.nodes[self.index[&offset.get()]]
    }

    /// The node at `offset`, or `None` when no record starts there.
    pub fn try_node_at(&self, offset: NodeOffset) -> Option<&Node> {
        self.index.get(&offset.get()).map(|&i| &self.nodes[i])
    }

    /// Root node anchored at subject `position`, if any.
    pub fn root_node_at(&self, position: usize) -> Option<&Node> {
        let offset = *self.root_nodes.get(position)?;
        if offset.is_none() {
            None
        } else {
            Some(self.node_at(offset))
        }
    }

    /// Bounds-checked string-table read.
    pub fn string_at(&self, offset: StringOffset) -> io::Result<&[u8]> {
        self.strings.read_at(offset)
    }

    /// Hot-path string read for offsets validated at load time.
    #[inline]
    pub(crate) fn string_bytes(&self, offset: StringOffset) -> &[u8] {
        self.strings.slice_at(offset)
    }

    /// The single-threaded post-load pass: resolve every node's root and
    /// materialize complete nodes' characters. Runs before the dataset is
    /// published, which is what lets traversal skip all synchronization.
    pub(crate) fn finish_init(&mut self) -> io::Result<()> {
        let count = self.nodes.len();

        // Roots first: walk each parent chain, bounded by the node count
        // so a corrupt cyclic chain fails the load instead of spinning.
        let mut roots = Vec::with_capacity(count);
        for i in 0..count {
            let mut current = i;
            let mut steps = 0usize;
            while !self.nodes[current].parent.is_none() {
                let parent = self.nodes[current].parent;
                let Some(&parent_index) = self.index.get(&parent.get()) else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("node parent offset {} does not exist", parent.get()),
                    ));
                };
                current = parent_index;
                steps += 1;
                if steps > count {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "cycle in node parent chain",
                    ));
                }
            }
            roots.push((self.nodes[current].offset, self.nodes[current].position));
        }
        for (node, (root, root_position)) in self.nodes.iter_mut().zip(roots) {
            node.root = root;
            node.root_position = root_position;
        }

        // Characters for complete nodes, validating the string offsets.
        let strings = &self.strings;
        for node in self.nodes.iter_mut() {
            if !node.character_string_offset.is_none() {
                node.characters = strings.read_at(node.character_string_offset)?.to_vec();
            }
        }
        Ok(())
    }
}
