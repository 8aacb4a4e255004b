// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Edge descriptors: the sorted child indexes owned by every node.
//!
//! A `NodeIndex` describes one literal edge out of a node: a key of one or
//! more bytes and the offset of the node the edge leads to. Short keys (up
//! to four bytes) are stored inline in the record; longer keys live in the
//! shared string table and are fetched on demand, which is what the
//! "strings read" diagnostic counter measures.
//!
//! A `NumericIndex` describes one approximate edge keyed by a 16-bit
//! value. A node's numeric children are sorted ascending by value; the
//! nearest-neighbour walk in `node::numeric` depends on that ordering.
//!
//! Both orderings are produced by the dataset encoder and are trusted as
//! loaded. Nothing here re-sorts.

use std::cmp::Ordering;

use crate::dataset::Dataset;
use crate::types::{NodeOffset, StringOffset};

/// Key of a literal edge: inline bytes or a string-table reference.
///
/// Inline keys come from the record's four value bytes, trimmed at the
/// first zero byte. Table keys are offsets into the shared string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeIndexKey {
    Inline { bytes: [u8; 4], len: u8 },
    Table(StringOffset),
}

/// A literal edge: key plus the child node it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIndex {
    key: NodeIndexKey,
    child: NodeOffset,
}

impl NodeIndex {
    pub(crate) fn new(key: NodeIndexKey, child: NodeOffset) -> Self {
        Self { key, child }
    }

    /// Build an inline key from raw record value bytes, trimming at the
    /// first zero byte.
    pub(crate) fn inline_key(value: [u8; 4]) -> NodeIndexKey {
        let len = value.iter().position(|&b| b == 0).unwrap_or(4) as u8;
        NodeIndexKey::Inline { bytes: value, len }
    }

    /// Offset of the child node this edge leads to.
    #[inline]
    pub fn child(&self) -> NodeOffset {
        self.child
    }

    /// Does resolving this key read the shared string table?
    #[inline]
    pub fn is_table_key(&self) -> bool {
        matches!(self.key, NodeIndexKey::Table(_))
    }

    /// The string-table offset behind a table key, `None` for inline keys.
    #[inline]
    pub fn table_key(&self) -> Option<StringOffset> {
        match self.key {
            NodeIndexKey::Table(offset) => Some(offset),
            NodeIndexKey::Inline { .. } => None,
        }
    }

    /// The key bytes, resolved against the dataset's string table when
    /// the key is not inline. Offsets were validated at load time.
    #[inline]
    pub fn key_bytes<'a>(&'a self, dataset: &'a Dataset) -> &'a [u8] {
        match &self.key {
            NodeIndexKey::Inline { bytes, len } => &bytes[..*len as usize],
            NodeIndexKey::Table(offset) => dataset.string_bytes(*offset),
        }
    }
}

/// Compare an edge key against the slice of the subject that ends at the
/// owning node's position.
///
/// `start` is `position - key.len() + 1` and may be negative when the key
/// reaches past the beginning of the subject; a missing subject byte
/// compares as smaller than any key byte. Byte-lexicographic otherwise,
/// extended so a key running past the end of the subject compares greater
/// (equivalently: a shorter subject slice that is a strict prefix of the
/// key compares less). The result is `key.cmp(slice)`, which is the
/// orientation the binary search over `children` expects.
pub(crate) fn compare_key(key: &[u8], target: &[u8], start: isize) -> Ordering {
    for (i, &kb) in key.iter().enumerate() {
        let ti = start + i as isize;
        if ti < 0 || ti as usize >= target.len() {
            return Ordering::Greater;
        }
        match kb.cmp(&target[ti as usize]) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// An approximate edge: 16-bit value plus the child node it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericIndex {
    value: i16,
    child: NodeOffset,
}

impl NumericIndex {
    pub(crate) fn new(value: i16, child: NodeOffset) -> Self {
        Self { value, child }
    }

    /// The numeric key of this edge.
    #[inline]
    pub fn value(&self) -> i16 {
        self.value
    }

    /// Offset of the child node this edge leads to.
    #[inline]
    pub fn child(&self) -> NodeOffset {
        self.child
    }
}
