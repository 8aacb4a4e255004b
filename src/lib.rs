// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Device detection via a position-anchored byte trie.
//!
//! A compiled catalogue of device signatures is matched against subject
//! byte strings (typically user-agent headers) by descending a trie whose
//! nodes are anchored at fixed character positions. Exact descent follows
//! literal byte edges with a binary search per level; when the subject
//! carries version-like digit runs the catalogue has never seen, numeric
//! descent approximates across them, bounded by magnitude buckets and
//! charged to an accumulating penalty, so a caller can still rank
//! outcomes by how approximate they were.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  binary/    │────▶│  dataset.rs  │────▶│   node/     │
//! │ (container, │     │ (arena, post-│     │ (descent,   │
//! │  records)   │     │  load init)  │     │  overlap)   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                             │                   │
//!                             ▼                   ▼
//!                     ┌──────────────────────────────────┐
//!                     │            detect.rs             │
//!                     │  (sweep driver, MatchState in    │
//!                     │   match_state.rs)                │
//!                     └──────────────────────────────────┘
//! ```
//!
//! The dataset is decoded and validated once, finished by a
//! single-threaded initialization pass, and then shared immutably: any
//! number of detections may run concurrently against one `Dataset`, each
//! with its own `MatchState`.
//!
//! # Usage
//!
//! ```ignore
//! use uatrie::{detect, Dataset};
//!
//! let dataset = Dataset::from_file("devices.uatrie")?;
//! let detection = detect(&dataset, b"Mozilla/5.0 ... Chrome/51 ...");
//! println!("{} (penalty {})", detection.matched, detection.difference);
//! ```

// Module declarations
pub mod binary;
mod dataset;
mod detect;
mod match_state;
pub mod node;
mod profile_override;
pub mod testing;
mod types;

// Re-exports for public API
pub use dataset::{Dataset, Strings};
pub use detect::{detect, render_nodes, Detection, DetectionMethod};
pub use match_state::MatchState;
pub use node::index::{NodeIndex, NodeIndexKey, NumericIndex};
pub use node::numeric::MAX_NUMERIC_VALUE;
pub use node::Node;
pub use profile_override::{
    apply_overrides, override_script, parse_override_ids, OVERRIDE_COOKIE, OVERRIDE_SEPARATOR,
};
pub use types::{NodeOffset, StringOffset};
