// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-operation matching state.
//!
//! One `MatchState` belongs to exactly one detection operation. It carries
//! the subject bytes being matched, the running approximation penalty, two
//! diagnostic counters, and the complete nodes recorded so far. Because it
//! is never shared between concurrent operations, nothing in here needs
//! synchronization; the dataset itself is read-only once loaded.
//!
//! The counters exist so a caller can enforce its own step budget: the
//! node logic itself never gives up early.

use crate::types::NodeOffset;

/// Mutable state threaded through every traversal call of one detection.
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Subject bytes, truncated to the dataset's maximum subject length.
    target: Vec<u8>,
    /// Accumulated absolute numeric difference from approximate edges.
    /// Zero means every edge taken was an exact match. Lower is better.
    difference: u32,
    /// Child indexes examined during binary searches.
    nodes_evaluated: u32,
    /// String-table reads performed for child index keys.
    strings_read: u32,
    /// Complete nodes recorded so far, in the order they were found.
    nodes: Vec<NodeOffset>,
}

impl MatchState {
    /// Create state for one detection over `subject`, clipped to the
    /// dataset's configured maximum subject length.
    pub fn new(subject: &[u8], max_subject_length: usize) -> Self {
        let take = subject.len().min(max_subject_length);
        Self {
            target: subject[..take].to_vec(),
            difference: 0,
            nodes_evaluated: 0,
            strings_read: 0,
            nodes: Vec::new(),
        }
    }

    /// The subject bytes being matched.
    #[inline]
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Accumulated approximation penalty.
    #[inline]
    pub fn difference(&self) -> u32 {
        self.difference
    }

    /// Charge an approximate edge: the absolute difference between the
    /// extracted subject value and the numeric child that was taken.
    #[inline]
    pub fn add_difference(&mut self, amount: u32) {
        self.difference += amount;
    }

    /// Child indexes examined so far.
    #[inline]
    pub fn nodes_evaluated(&self) -> u32 {
        self.nodes_evaluated
    }

    #[inline]
    pub(crate) fn increment_nodes_evaluated(&mut self) {
        self.nodes_evaluated += 1;
    }

    /// String-table reads performed so far.
    #[inline]
    pub fn strings_read(&self) -> u32 {
        self.strings_read
    }

    #[inline]
    pub(crate) fn increment_strings_read(&mut self) {
        self.strings_read += 1;
    }

    /// Complete nodes recorded so far.
    #[inline]
    pub fn nodes(&self) -> &[NodeOffset] {
        &self.nodes
    }

    /// Record a complete node. Callers are expected to have checked
    /// overlap against the nodes already recorded.
    pub fn record_node(&mut self, offset: NodeOffset) {
        self.nodes.push(offset);
    }
}
