// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Offset newtypes shared across the crate.
//!
//! Everything in a dataset is addressed by a signed 32-bit byte offset:
//! nodes by their offset into the NODES section, strings by their offset
//! into the STRINGS block. A negative offset is a sentinel meaning "none"
//! (no parent, not complete). Wrapping the raw `i32`s keeps a node offset
//! from being handed to the string table by accident.
//!
//! Offsets are stable identifiers for the lifetime of one loaded dataset
//! and must never be carried across to a different dataset instance.

use serde::{Deserialize, Serialize};

/// Offset of a node record within the NODES section.
///
/// `NodeOffset::NONE` (-1) marks the absence of a node, e.g. a root
/// node's parent. All non-negative offsets held by a loaded dataset have
/// been resolved against the arena at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeOffset(pub i32);

impl NodeOffset {
    /// Sentinel: no node.
    pub const NONE: NodeOffset = NodeOffset(-1);

    /// Is this the "no node" sentinel?
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 < 0
    }

    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for NodeOffset {
    fn from(offset: i32) -> Self {
        NodeOffset(offset)
    }
}

/// Offset of a length-prefixed byte string within the STRINGS block.
///
/// A negative offset on a node means the node is not complete; on a
/// child index it never occurs (inline keys are encoded differently).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StringOffset(pub i32);

impl StringOffset {
    /// Sentinel: no string (incomplete node).
    pub const NONE: StringOffset = StringOffset(-1);

    /// Is this the "no string" sentinel?
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 < 0
    }

    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }

    /// Convert to usize for block indexing. Caller must have validated
    /// the offset is non-negative.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<i32> for StringOffset {
    fn from(offset: i32) -> Self {
        StringOffset(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_none() {
        assert!(NodeOffset::NONE.is_none());
        assert!(StringOffset::NONE.is_none());
        assert!(NodeOffset(-17).is_none());
        assert!(!NodeOffset(0).is_none());
        assert!(!StringOffset(0).is_none());
    }

    #[test]
    fn from_raw_roundtrip() {
        assert_eq!(NodeOffset::from(42).get(), 42);
        assert_eq!(StringOffset::from(42).as_usize(), 42);
    }
}
