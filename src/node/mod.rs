// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The trie node and its two descent algorithms.
//!
//! A node is anchored at a fixed character position of the subject. Its
//! literal children are searched with a plain binary search over keys that
//! end at that position (a key of length L covers subject positions
//! `position - L + 1 ..= position`, and the child it leads to is anchored
//! L positions further left). Descent therefore walks the subject right to
//! left, and the root of any chain is the rightmost anchor: a node's span
//! is `(position, root.position]` and its `length` is
//! `root.position - position`.
//!
//! Exact descent (`find_complete_node`) follows only literal edges and
//! never touches the approximation penalty. Numeric descent
//! (`find_complete_numeric_node`) tries the literal edge first at every
//! level and only then consults the nearest-neighbour walk in
//! [`numeric`], charging `|subject value - child value|` for each
//! approximate edge actually taken.
//!
//! Absence of a match is `None`, never an error. The dataset was
//! validated at load time; nothing on this path re-checks offsets or
//! ordering.

pub mod index;
pub mod numeric;

use std::cmp::Ordering;

use crate::dataset::Dataset;
use crate::match_state::MatchState;
use crate::node::index::{compare_key, NodeIndex, NumericIndex};
use crate::node::numeric::{digit_run_value, NumericCandidates};
use crate::types::{NodeOffset, StringOffset};

/// A trie vertex at a fixed character position, optionally complete.
///
/// Payload fields are set once when the dataset is decoded; the derived
/// fields (`root`, `root_position`, `characters`) are filled in by the
/// single-threaded initialization pass before the dataset is published,
/// so a loaded `Node` is immutable and freely shared across threads.
#[derive(Debug, Clone)]
pub struct Node {
    /// This node's own offset: its identity within the dataset.
    pub(crate) offset: NodeOffset,
    /// Anchor position: offset of the subject character just left of the
    /// first character this node's span covers.
    pub(crate) position: i16,
    /// Position of the character after this node's span in the
    /// signatures that contain it; negative for an incomplete node.
    pub(crate) next_character_position: i16,
    /// Parent node offset, `NONE` for a root.
    pub(crate) parent: NodeOffset,
    /// String-table offset of the span's characters; negative means the
    /// node is not complete. Immutable once constructed.
    pub(crate) character_string_offset: StringOffset,
    /// Literal children, sorted ascending by key bytes (encoder order,
    /// never re-sorted at load).
    pub(crate) children: Vec<NodeIndex>,
    /// Numeric children, sorted ascending by value.
    pub(crate) numeric_children: Vec<NumericIndex>,
    /// Signatures that include this node, for out-of-core ranking.
    pub(crate) ranked_signature_indexes: Vec<i32>,
    /// Derived: offset of the chain's root (this node if parentless).
    pub(crate) root: NodeOffset,
    /// Derived: the root's anchor position.
    pub(crate) root_position: i16,
    /// Derived: owned copy of the span's characters; empty when the node
    /// is not complete.
    pub(crate) characters: Vec<u8>,
}

impl Node {
    /// This node's offset within the dataset.
    #[inline]
    pub fn offset(&self) -> NodeOffset {
        self.offset
    }

    /// The anchor position of this node in the subject.
    #[inline]
    pub fn position(&self) -> i16 {
        self.position
    }

    /// Position of the next character after this node's span, negative
    /// for incomplete nodes.
    #[inline]
    pub fn next_character_position(&self) -> i16 {
        self.next_character_position
    }

    /// A node is complete iff it carries a valid string-table offset.
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.character_string_offset.is_none()
    }

    /// Parent node, `None` for a root.
    pub fn parent<'a>(&self, dataset: &'a Dataset) -> Option<&'a Node> {
        if self.parent.is_none() {
            None
        } else {
            Some(dataset.node_at(self.parent))
        }
    }

    /// Root of this node's chain: itself when parentless, otherwise the
    /// terminal node of the acyclic parent chain.
    pub fn root<'a>(&'a self, dataset: &'a Dataset) -> &'a Node {
        if self.root.is_none() {
            self
        } else {
            dataset.node_at(self.root)
        }
    }

    /// Number of subject characters this node's span covers:
    /// `root.position - position`.
    #[inline]
    pub fn length(&self) -> i32 {
        i32::from(self.root_position) - i32::from(self.position)
    }

    /// The span's characters for a complete node; empty otherwise.
    #[inline]
    pub fn characters(&self) -> &[u8] {
        &self.characters
    }

    /// Literal children count.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Numeric children count.
    #[inline]
    pub fn numeric_child_count(&self) -> usize {
        self.numeric_children.len()
    }

    /// Signatures referencing this node, consumed by out-of-core ranking.
    #[inline]
    pub fn ranked_signature_indexes(&self) -> &[i32] {
        &self.ranked_signature_indexes
    }

    /// Exact descent: follow literal edges as deep as they go and return
    /// the deepest complete node on that path, or `None` when no node on
    /// the path is complete. Only the diagnostic counters are touched,
    /// never the approximation penalty.
    pub fn find_complete_node<'a>(
        &'a self,
        dataset: &'a Dataset,
        state: &mut MatchState,
    ) -> Option<&'a Node> {
        let mut result = None;
        if let Some(next) = self.next_node(dataset, state) {
            result = next.find_complete_node(dataset, state);
        }
        if result.is_none() && self.is_complete() {
            result = Some(self);
        }
        result
    }

    /// Numeric descent: exact edges take priority at every level; when
    /// none matches, walk nearest-neighbour candidates from the digit
    /// run ending at this node's position, charging the absolute
    /// difference for the first candidate whose subtree matches. Falls
    /// back to this node itself when it is complete.
    pub fn find_complete_numeric_node<'a>(
        &'a self,
        dataset: &'a Dataset,
        state: &mut MatchState,
    ) -> Option<&'a Node> {
        let mut result = None;
        if let Some(next) = self.next_node(dataset, state) {
            result = next.find_complete_numeric_node(dataset, state);
        }
        if result.is_none() && !self.numeric_children.is_empty() {
            let target = digit_run_value(state.target(), i32::from(self.position));
            if target >= 0 {
                if let Some(candidates) = NumericCandidates::new(&self.numeric_children, target) {
                    for candidate in candidates {
                        let child = dataset.node_at(candidate.child());
                        if let Some(found) = child.find_complete_numeric_node(dataset, state) {
                            let difference = (target - i64::from(candidate.value())).unsigned_abs();
                            state.add_difference(difference as u32);
                            result = Some(found);
                            break;
                        }
                    }
                }
            }
        }
        if result.is_none() && self.is_complete() {
            result = Some(self);
        }
        result
    }

    /// Binary search the sorted literal children for the edge whose key
    /// equals the subject slice ending at this node's position. Every
    /// candidate examined bumps the nodes-evaluated counter; candidates
    /// whose key lives in the string table also bump strings-read.
    pub fn next_node<'a>(
        &self,
        dataset: &'a Dataset,
        state: &mut MatchState,
    ) -> Option<&'a Node> {
        let mut lower: isize = 0;
        let mut upper: isize = self.children.len() as isize - 1;
        while lower <= upper {
            let middle = lower + (upper - lower) / 2;
            let child = &self.children[middle as usize];
            state.increment_nodes_evaluated();
            if child.is_table_key() {
                state.increment_strings_read();
            }
            let key = child.key_bytes(dataset);
            let start = isize::from(self.position) - key.len() as isize + 1;
            match compare_key(key, state.target(), start) {
                Ordering::Equal => return Some(dataset.node_at(child.child())),
                Ordering::Greater => upper = middle - 1,
                Ordering::Less => lower = middle + 1,
            }
        }
        None
    }

    /// Do two nodes' spans overlap?
    ///
    /// With `lower` the node of smaller position: overlap holds when the
    /// positions are equal or `lower.root.position > higher.position`.
    /// This is deliberately not a symmetric interval test; adjacent spans
    /// sharing only a boundary position do not overlap.
    pub fn overlaps(&self, other: &Node) -> bool {
        let (lower, higher) = if self.position < other.position {
            (self, other)
        } else {
            (other, self)
        };
        lower.position == higher.position || lower.root_position > higher.position
    }

    /// Does this node overlap any node already recorded in `state`?
    pub fn overlaps_any(&self, dataset: &Dataset, state: &MatchState) -> bool {
        state
            .nodes()
            .iter()
            .any(|&offset| self.overlaps(dataset.node_at(offset)))
    }

    /// Fixed-width diagnostic rendering: the node's characters placed at
    /// their subject positions in a space-padded buffer of the dataset's
    /// maximum subject length.
    pub fn render(&self, dataset: &Dataset) -> String {
        let mut buf = vec![b' '; dataset.max_subject_length()];
        let start = (i32::from(self.position) + 1).max(0) as usize;
        for (i, &b) in self.characters.iter().enumerate() {
            if start + i < buf.len() {
                buf[start + i] = b;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::span_node;

    // Spans below use the (position, root.position] convention: a node
    // covering subject characters 5..=8 has position 4 and root position 8.

    #[test]
    fn adjacent_spans_sharing_a_character_overlap() {
        // 5..=8 and 8..=12 both cover character 8.
        let a = span_node(0, 4, 8);
        let b = span_node(1, 7, 12);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_spans_do_not_overlap() {
        // 5..=8 and 9..=12 share only the boundary between 8 and 9.
        let a = span_node(0, 4, 8);
        let b = span_node(1, 8, 12);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn equal_positions_always_overlap() {
        let a = span_node(0, 4, 8);
        let b = span_node(1, 4, 6);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_spans_do_not_overlap() {
        let a = span_node(0, 2, 4);
        let b = span_node(1, 9, 12);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn length_is_root_position_minus_position() {
        let node = span_node(0, 4, 8);
        assert_eq!(node.length(), 4);
        let root = span_node(1, 8, 8);
        assert_eq!(root.length(), 0);
    }
}
