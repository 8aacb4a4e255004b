// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Container header and footer structures.
//!
//! The header is 28 bytes of fixed-size fields, parsed in one read before
//! anything else. It tells you exactly where every section lives, so the
//! loader can slice the file without scanning.
//!
//! The footer is 8 bytes: a CRC32 checksum over everything before it,
//! plus a magic number ("RTAU", the header magic reversed). If the footer
//! is wrong, something got corrupted or truncated. Don't trust the data.
//!
//! `SectionOffsets` is the single source of truth for the file layout.
//! Every piece of code that reads or writes sections MUST use it. This
//! prevents the "I updated the write path but forgot the read path" class
//! of bugs.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "UATR" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x55, 0x41, 0x54, 0x52];

/// Footer magic: "RTAU" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = [0x52, 0x54, 0x41, 0x55];

/// Current format version
pub const VERSION: u8 = 3;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum file size: 100 MB (prevents huge allocations)
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

/// Maximum number of nodes
pub const MAX_NODE_COUNT: u32 = 10_000_000;

/// Maximum subject length a catalogue may declare
pub const MAX_SUBJECT_LENGTH: u32 = 4096;

/// Maximum ranked-signature references per node
pub const MAX_RANKED_SIGNATURES: usize = 1_000_000;

// ============================================================================
// HEADER
// ============================================================================

/// Container header (28 bytes fixed size)
#[derive(Debug, Clone)]
pub struct DatasetHeader {
    pub version: u8,
    /// Reserved flag byte, zero in the current format.
    pub flags: u8,
    pub node_count: u32,
    pub max_subject_length: u32,
    pub strings_len: u32,
    pub root_nodes_len: u32,
    pub nodes_len: u32,
}

impl DatasetHeader {
    // 4 (magic) + 1 (version) + 1 (flags) + 5*4 (u32s) + 2 (reserved) = 28
    pub const SIZE: usize = 28;

    /// Compute section byte offsets for this header.
    /// This is the SINGLE SOURCE OF TRUTH for the file layout.
    pub fn section_offsets(&self) -> SectionOffsets {
        SectionOffsets::from_header(self)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version])?;
        w.write_all(&[self.flags])?;
        w.write_all(&self.node_count.to_le_bytes())?;
        w.write_all(&self.max_subject_length.to_le_bytes())?;
        w.write_all(&self.strings_len.to_le_bytes())?;
        w.write_all(&self.root_nodes_len.to_le_bytes())?;
        w.write_all(&self.nodes_len.to_le_bytes())?;
        w.write_all(&[0u8; 2])?; // reserved (2 bytes for alignment)
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: expected UATR, got {:?}", magic),
            ));
        }

        let mut buf = [0u8; 24]; // 28 - 4 (magic) = 24
        r.read_exact(&mut buf)?;

        let header = Self {
            version: buf[0],
            flags: buf[1],
            node_count: u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]),
            max_subject_length: u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
            strings_len: u32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]),
            root_nodes_len: u32::from_le_bytes([buf[14], buf[15], buf[16], buf[17]]),
            nodes_len: u32::from_le_bytes([buf[18], buf[19], buf[20], buf[21]]),
            // buf[22..24] is reserved
        };
        header.validate()?;
        Ok(header)
    }

    /// Sanity limits checked before any section allocation happens.
    pub fn validate(&self) -> io::Result<()> {
        if self.version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported version {} (expected {})", self.version, VERSION),
            ));
        }
        if self.node_count > MAX_NODE_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Node count {} exceeds limit {}", self.node_count, MAX_NODE_COUNT),
            ));
        }
        if self.max_subject_length > MAX_SUBJECT_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Max subject length {} exceeds limit {}",
                    self.max_subject_length, MAX_SUBJECT_LENGTH
                ),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION OFFSETS (SINGLE SOURCE OF TRUTH for the layout)
// ============================================================================

/// Section byte offsets for the file layout.
///
/// Sections are ordered so that everything a section depends on precedes
/// it: STRINGS first (node records reference it), then ROOT_NODES, then
/// the NODES section whose internal byte offsets are the node identities.
#[derive(Debug, Clone, Copy)]
pub struct SectionOffsets {
    // Start and end offsets for each section
    pub strings: (usize, usize),
    pub root_nodes: (usize, usize),
    pub nodes: (usize, usize),
    pub footer: (usize, usize),
}

impl SectionOffsets {
    /// Compute section offsets from header lengths.
    ///
    /// Layout order:
    /// 1. HEADER     [28B]            - Parse first to get section lengths
    /// 2. STRINGS    [strings_len]    - Shared string table
    /// 3. ROOT_NODES [root_nodes_len] - Root node offset per position
    /// 4. NODES      [nodes_len]      - Node records at stable offsets
    /// 5. FOOTER     [8B]             - CRC32 validation
    pub fn from_header(h: &DatasetHeader) -> Self {
        let mut pos = DatasetHeader::SIZE;

        let strings_start = pos;
        pos += h.strings_len as usize;
        let strings_end = pos;

        let root_start = pos;
        pos += h.root_nodes_len as usize;
        let root_end = pos;

        let nodes_start = pos;
        pos += h.nodes_len as usize;
        let nodes_end = pos;

        let footer_start = pos;
        let footer_end = pos + DatasetFooter::SIZE;

        Self {
            strings: (strings_start, strings_end),
            root_nodes: (root_start, root_end),
            nodes: (nodes_start, nodes_end),
            footer: (footer_start, footer_end),
        }
    }

    /// Expected content size (everything before footer)
    pub fn content_size(&self) -> usize {
        self.footer.0
    }

    /// Total file size including footer
    pub fn total_size(&self) -> usize {
        self.footer.1
    }

    /// Get a slice for a section from the bytes
    #[inline]
    pub fn slice<'a>(&self, bytes: &'a [u8], section: (usize, usize)) -> Option<&'a [u8]> {
        bytes.get(section.0..section.1)
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone)]
pub struct DatasetFooter {
    /// CRC32 checksum of header + all sections (everything before footer)
    pub crc32: u32,
}

impl DatasetFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "File too short for footer",
            ));
        }

        let footer_start = bytes.len() - Self::SIZE;

        // Verify footer magic
        let magic = &bytes[footer_start + 4..];
        if magic != FOOTER_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid footer magic: expected RTAU, got {:?}", magic),
            ));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}
