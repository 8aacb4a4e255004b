// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The detection driver: a thin caller for the node entry points.
//!
//! Signature resolution and ranking live outside this crate; what a host
//! gets here is the raw node-matching layer driven end to end. The driver
//! sweeps the subject right to left, descending from the root node
//! anchored at each position. Exact descent runs first over the whole
//! subject; only when it records nothing at all does a second sweep retry
//! with numeric descent, accumulating the approximation penalty.
//!
//! A found node is recorded unless it overlaps a node already recorded
//! (double-crediting the same characters would skew any downstream
//! scoring), and the sweep resumes just left of the found node's span.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::match_state::MatchState;
use crate::types::NodeOffset;

/// How the recorded nodes were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Every node came from literal edges; the penalty is zero.
    Exact,
    /// At least the fallback sweep ran; the penalty is meaningful.
    Numeric,
    /// Nothing in the catalogue matched.
    None,
}

/// Outcome of one detection: the recorded nodes plus diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub method: DetectionMethod,
    /// Complete nodes recorded, in the order the sweep found them
    /// (right to left over the subject).
    pub node_offsets: Vec<NodeOffset>,
    /// Accumulated approximation penalty; lower is better, zero is exact.
    pub difference: u32,
    /// Child indexes examined across both sweeps.
    pub nodes_evaluated: u32,
    /// String-table reads across both sweeps.
    pub strings_read: u32,
    /// The matched spans rendered at their subject positions.
    pub matched: String,
}

/// Match `subject` against the catalogue.
pub fn detect(dataset: &Dataset, subject: &[u8]) -> Detection {
    let mut state = MatchState::new(subject, dataset.max_subject_length());

    sweep(dataset, &mut state, false);
    let method = if state.nodes().is_empty() {
        sweep(dataset, &mut state, true);
        if state.nodes().is_empty() {
            DetectionMethod::None
        } else {
            DetectionMethod::Numeric
        }
    } else {
        DetectionMethod::Exact
    };

    let matched = render_nodes(dataset, state.nodes());
    Detection {
        method,
        node_offsets: state.nodes().to_vec(),
        difference: state.difference(),
        nodes_evaluated: state.nodes_evaluated(),
        strings_read: state.strings_read(),
        matched,
    }
}

/// One right-to-left sweep over the subject positions.
fn sweep(dataset: &Dataset, state: &mut MatchState, numeric: bool) {
    let mut position = state.target().len() as isize - 1;
    while position >= 0 {
        let mut next = position - 1;
        if let Some(root) = dataset.root_node_at(position as usize) {
            let found = if numeric {
                root.find_complete_numeric_node(dataset, state)
            } else {
                root.find_complete_node(dataset, state)
            };
            if let Some(found) = found {
                if !found.overlaps_any(dataset, state) {
                    // Resume just left of the found span; the guard keeps
                    // the sweep strictly decreasing even when the root
                    // itself was the complete node.
                    next = isize::from(found.position()).min(position - 1);
                    state.record_node(found.offset());
                }
            }
        }
        position = next;
    }
}

/// Render the recorded nodes' characters at their subject positions in
/// one space-padded buffer of the dataset's maximum subject length.
pub fn render_nodes(dataset: &Dataset, offsets: &[NodeOffset]) -> String {
    let mut buf = vec![b' '; dataset.max_subject_length()];
    for &offset in offsets {
        let node = dataset.node_at(offset);
        let start = (i32::from(node.position()) + 1).max(0) as usize;
        for (i, &b) in node.characters().iter().enumerate() {
            if start + i < buf.len() {
                buf[start + i] = b;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
