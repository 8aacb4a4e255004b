// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width record codecs for the NODES, ROOT_NODES and STRINGS
//! sections.
//!
//! Nothing fancy here, just little-endian fixed-width fields read with
//! explicit bounds checks. Encode and decode are paired so the writer and
//! the loader can never disagree about a layout: the test-support writer
//! and the property tests both go through these functions.
//!
//! A node record is:
//!
//! ```text
//! position: i16, next_character_position: i16,
//! parent_offset: i32 (-1 = none),
//! character_string_offset: i32 (-1 = incomplete),
//! child_count: i16, numeric_child_count: i16,
//! ranked_signature_count: i32,
//! child_count × { is_string: u8, value: [u8; 4], child_node_offset: i32 },
//! numeric_child_count × { value: i16, child_node_offset: i32 },
//! ranked_signature_count × i32
//! ```
//!
//! The record's byte offset within the NODES section is the node's
//! identity; parent and child offsets point at other records the same
//! way.

use std::io;

use super::header::MAX_RANKED_SIGNATURES;

/// Fixed part of a node record before the variable-length tails.
pub const NODE_RECORD_HEADER_SIZE: usize = 20;

/// Size of one literal child index record.
pub const NODE_INDEX_SIZE: usize = 9;

/// Size of one numeric child index record.
pub const NUMERIC_INDEX_SIZE: usize = 6;

/// Decoded literal child index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIndexRecord {
    /// When set, `value` is a string-table offset; otherwise up to four
    /// raw key bytes truncated at the first zero byte.
    pub is_string: bool,
    pub value: [u8; 4],
    pub child_node_offset: i32,
}

/// Decoded numeric child index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericIndexRecord {
    pub value: i16,
    pub child_node_offset: i32,
}

/// Decoded node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub position: i16,
    pub next_character_position: i16,
    pub parent_offset: i32,
    pub character_string_offset: i32,
    pub children: Vec<NodeIndexRecord>,
    pub numeric_children: Vec<NumericIndexRecord>,
    pub ranked_signature_indexes: Vec<i32>,
}

impl NodeRecord {
    /// Encoded size of this record in bytes.
    pub fn encoded_size(&self) -> usize {
        NODE_RECORD_HEADER_SIZE
            + self.children.len() * NODE_INDEX_SIZE
            + self.numeric_children.len() * NUMERIC_INDEX_SIZE
            + self.ranked_signature_indexes.len() * 4
    }
}

// ============================================================================
// PRIMITIVE READS
// ============================================================================

fn read_i16(bytes: &[u8], pos: usize) -> io::Result<i16> {
    let end = pos.checked_add(2).filter(|&e| e <= bytes.len());
    match end {
        Some(_) => Ok(i16::from_le_bytes([bytes[pos], bytes[pos + 1]])),
        None => Err(truncated(pos)),
    }
}

fn read_i32(bytes: &[u8], pos: usize) -> io::Result<i32> {
    let end = pos.checked_add(4).filter(|&e| e <= bytes.len());
    match end {
        Some(_) => Ok(i32::from_le_bytes([
            bytes[pos],
            bytes[pos + 1],
            bytes[pos + 2],
            bytes[pos + 3],
        ])),
        None => Err(truncated(pos)),
    }
}

fn truncated(pos: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("Truncated record at byte {}", pos),
    )
}

// ============================================================================
// NODE RECORDS
// ============================================================================

/// Encode a node record.
pub fn encode_node(record: &NodeRecord, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&record.position.to_le_bytes());
    buf.extend_from_slice(&record.next_character_position.to_le_bytes());
    buf.extend_from_slice(&record.parent_offset.to_le_bytes());
    buf.extend_from_slice(&record.character_string_offset.to_le_bytes());
    buf.extend_from_slice(&(record.children.len() as i16).to_le_bytes());
    buf.extend_from_slice(&(record.numeric_children.len() as i16).to_le_bytes());
    buf.extend_from_slice(&(record.ranked_signature_indexes.len() as i32).to_le_bytes());
    for child in &record.children {
        buf.push(u8::from(child.is_string));
        buf.extend_from_slice(&child.value);
        buf.extend_from_slice(&child.child_node_offset.to_le_bytes());
    }
    for numeric in &record.numeric_children {
        buf.extend_from_slice(&numeric.value.to_le_bytes());
        buf.extend_from_slice(&numeric.child_node_offset.to_le_bytes());
    }
    for &index in &record.ranked_signature_indexes {
        buf.extend_from_slice(&index.to_le_bytes());
    }
}

/// Decode the node record starting at `pos`, returning the record and
/// the position just past it.
pub fn decode_node(bytes: &[u8], pos: usize) -> io::Result<(NodeRecord, usize)> {
    let position = read_i16(bytes, pos)?;
    let next_character_position = read_i16(bytes, pos + 2)?;
    let parent_offset = read_i32(bytes, pos + 4)?;
    let character_string_offset = read_i32(bytes, pos + 8)?;
    let child_count = read_i16(bytes, pos + 12)?;
    let numeric_child_count = read_i16(bytes, pos + 14)?;
    let ranked_signature_count = read_i32(bytes, pos + 16)?;

    if child_count < 0 || numeric_child_count < 0 || ranked_signature_count < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Negative count in node record at byte {}", pos),
        ));
    }
    if ranked_signature_count as usize > MAX_RANKED_SIGNATURES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Node record at byte {} claims {} ranked signatures",
                pos, ranked_signature_count
            ),
        ));
    }

    let mut cursor = pos + NODE_RECORD_HEADER_SIZE;

    let mut children = Vec::with_capacity(child_count as usize);
    for _ in 0..child_count {
        let is_string = match bytes.get(cursor) {
            Some(0) => false,
            Some(1) => true,
            Some(other) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid is_string byte {} at byte {}", other, cursor),
                ));
            }
            None => return Err(truncated(cursor)),
        };
        let end = cursor
            .checked_add(5)
            .filter(|&e| e <= bytes.len())
            .ok_or_else(|| truncated(cursor))?;
        let mut value = [0u8; 4];
        value.copy_from_slice(&bytes[cursor + 1..end]);
        let child_node_offset = read_i32(bytes, cursor + 5)?;
        children.push(NodeIndexRecord {
            is_string,
            value,
            child_node_offset,
        });
        cursor += NODE_INDEX_SIZE;
    }

    let mut numeric_children = Vec::with_capacity(numeric_child_count as usize);
    for _ in 0..numeric_child_count {
        let value = read_i16(bytes, cursor)?;
        let child_node_offset = read_i32(bytes, cursor + 2)?;
        numeric_children.push(NumericIndexRecord {
            value,
            child_node_offset,
        });
        cursor += NUMERIC_INDEX_SIZE;
    }

    let mut ranked_signature_indexes = Vec::with_capacity(ranked_signature_count as usize);
    for _ in 0..ranked_signature_count {
        ranked_signature_indexes.push(read_i32(bytes, cursor)?);
        cursor += 4;
    }

    Ok((
        NodeRecord {
            position,
            next_character_position,
            parent_offset,
            character_string_offset,
            children,
            numeric_children,
            ranked_signature_indexes,
        },
        cursor,
    ))
}

// ============================================================================
// ROOT NODE TABLE
// ============================================================================

/// Encode the root-node table: `u32` count + one `i32` node offset per
/// subject position (-1 where no root is anchored).
pub fn encode_root_nodes(offsets: &[i32], buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(offsets.len() as u32).to_le_bytes());
    for &offset in offsets {
        buf.extend_from_slice(&offset.to_le_bytes());
    }
}

/// Decode the root-node table.
pub fn decode_root_nodes(bytes: &[u8]) -> io::Result<Vec<i32>> {
    if bytes.len() < 4 {
        return Err(truncated(0));
    }
    let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let expected = 4 + count * 4;
    if bytes.len() != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Root node table claims {} entries ({} bytes) but section is {} bytes",
                count,
                expected,
                bytes.len()
            ),
        ));
    }
    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        offsets.push(read_i32(bytes, 4 + i * 4)?);
    }
    Ok(offsets)
}

// ============================================================================
// STRINGS
// ============================================================================

/// Append one length-prefixed string to the block, returning its offset.
pub fn encode_string(entry: &[u8], buf: &mut Vec<u8>) -> io::Result<i32> {
    if entry.len() > usize::from(u16::MAX) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("String of {} bytes exceeds u16 length prefix", entry.len()),
        ));
    }
    let offset = buf.len() as i32;
    buf.extend_from_slice(&(entry.len() as u16).to_le_bytes());
    buf.extend_from_slice(entry);
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> NodeRecord {
        NodeRecord {
            position: 8,
            next_character_position: -1,
            parent_offset: -1,
            character_string_offset: 11,
            children: vec![
                NodeIndexRecord {
                    is_string: false,
                    value: [b'5', b'2', 0, 0],
                    child_node_offset: 64,
                },
                NodeIndexRecord {
                    is_string: true,
                    value: 24i32.to_le_bytes(),
                    child_node_offset: 128,
                },
            ],
            numeric_children: vec![
                NumericIndexRecord {
                    value: 50,
                    child_node_offset: 64,
                },
                NumericIndexRecord {
                    value: 52,
                    child_node_offset: 128,
                },
            ],
            ranked_signature_indexes: vec![3, 9, 27],
        }
    }

    #[test]
    fn node_record_roundtrip() {
        let record = sample_record();
        let mut buf = Vec::new();
        encode_node(&record, &mut buf);
        assert_eq!(buf.len(), record.encoded_size());

        let (decoded, end) = decode_node(&buf, 0).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(end, buf.len());
    }

    #[test]
    fn node_record_roundtrip_mid_buffer() {
        let record = sample_record();
        let mut buf = vec![0xAA; 7];
        encode_node(&record, &mut buf);
        let (decoded, end) = decode_node(&buf, 7).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(end, buf.len());
    }

    #[test]
    fn truncated_record_is_rejected() {
        let record = sample_record();
        let mut buf = Vec::new();
        encode_node(&record, &mut buf);
        for cut in [1, NODE_RECORD_HEADER_SIZE, buf.len() - 1] {
            assert!(decode_node(&buf[..cut], 0).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn bad_is_string_byte_is_rejected() {
        let record = sample_record();
        let mut buf = Vec::new();
        encode_node(&record, &mut buf);
        buf[NODE_RECORD_HEADER_SIZE] = 7;
        assert!(decode_node(&buf, 0).is_err());
    }

    #[test]
    fn root_nodes_roundtrip() {
        let offsets = vec![-1, -1, 0, 64, -1];
        let mut buf = Vec::new();
        encode_root_nodes(&offsets, &mut buf);
        assert_eq!(decode_root_nodes(&buf).unwrap(), offsets);
    }

    #[test]
    fn root_nodes_length_mismatch_is_rejected() {
        let mut buf = Vec::new();
        encode_root_nodes(&[1, 2, 3], &mut buf);
        assert!(decode_root_nodes(&buf[..buf.len() - 1]).is_err());
        buf.push(0);
        assert!(decode_root_nodes(&buf).is_err());
    }

    #[test]
    fn string_offsets_are_block_positions() {
        let mut buf = Vec::new();
        let a = encode_string(b"Chrome/52", &mut buf).unwrap();
        let b = encode_string(b"", &mut buf).unwrap();
        let c = encode_string(b"Firefox", &mut buf).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 11);
        assert_eq!(c, 13);
    }
}
