//! Base types for the structure of talk table files.

use binrw::{BinRead, BinWrite};
use derive_more::derive::{Constructor, Display, From};
use std::fmt;
use widestring::{U16Str, U16String};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Signature every talk table starts with
pub const SIGNATURE: &[u8; 20] = b"GFF V4.0PC  TLK V0.2";

/// Size of the opaque metadata block following the signature
pub const METADATA_SIZE: usize = 80;

/// Size of signature, metadata and element count
pub const HEADER_SIZE: u64 = 104;

/// Size of a single reference entry on disk
pub const ENTRY_SIZE: u64 = 8;

/// Stored offsets are relative to this position in the file
pub const OFFSET_BASE: u64 = 0x60;

/// Offset value of a reference that has no string
pub const UNUSED_OFFSET: u32 = 0xFFFF_FFFF;

/// Byte written after the last string slot
pub const END_MARKER: u8 = 0x0A;

/// Talk table header
///
/// Starts with the literal signature, followed by a metadata block we don't interpret
/// and the number of reference entries. All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"GFF V4.0PC  TLK V0.2", little)]
pub struct TlkHeader {
    /// Opaque block, written back as it was read
    pub metadata: [u8; METADATA_SIZE],

    /// The number of reference entries stored in the file
    pub element_count: u32,
}

impl Default for TlkHeader {
    fn default() -> Self {
        Self {
            metadata: [0; METADATA_SIZE],
            element_count: 0,
        }
    }
}

/// Index of a [`StringRecord`] inside a [`crate::TalkTable`]
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    /// Position of the record in the table's string list
    pub fn index(self) -> usize {
        self.0
    }
}

/// A reference entry
///
/// Maps a string id to the offset of the string it shows. Entries keep their position in the
/// file for their whole life, only the offset changes when the strings are laid out again.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ReferenceEntry {
    /// Identifier used by the game to look up the string
    pub ref_id: u32,

    /// Offset of the string slot relative to [`OFFSET_BASE`], or [`UNUSED_OFFSET`]
    pub offset: u32,

    #[brw(ignore)]
    pub(crate) record: Option<RecordId>,
}

impl ReferenceEntry {
    /// Create an entry that doesn't point at any string yet
    pub fn new(ref_id: u32, offset: u32) -> Self {
        Self {
            ref_id,
            offset,
            record: None,
        }
    }

    /// Whether this entry points at a string
    pub fn is_valid(&self) -> bool {
        self.offset != UNUSED_OFFSET
    }

    /// The record this entry resolves to
    pub fn record(&self) -> Option<RecordId> {
        self.record
    }
}

/// A string stored once in the file and shown by one or more reference entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRecord {
    pub(crate) text: U16String,
    pub(crate) references: Vec<usize>,
    pub(crate) offset: u32,
}

impl StringRecord {
    pub(crate) fn new(text: U16String, offset: u32) -> Self {
        Self {
            text,
            references: Vec::new(),
            offset,
        }
    }

    /// The text of this string
    pub fn text(&self) -> &U16Str {
        &self.text
    }

    /// Indices of the entries that show this string, in the order they were attached
    pub fn references(&self) -> &[usize] {
        &self.references
    }

    /// Offset this string was last laid out at
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

/// Something unusual that was found while reading a talk table and worked around
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A string slot had an impossible length, scanning stopped there
    #[display("corrupt string slot at byte {position} (length {length})")]
    CorruptSlot {
        /// Absolute position of the slot
        position: u64,
        /// Declared length
        length: i64,
    },

    /// Strings were read again entry by entry because a reference didn't match a slot
    #[display("string {ref_id} at offset {offset:#010X} did not match a slot, strings were rebuilt")]
    Recovered {
        /// First reference that failed to resolve
        ref_id: u32,
        /// Its stored offset
        offset: u32,
    },

    /// Strings that no reference points at were dropped
    #[display("dropped {count} unreferenced string(s)")]
    Orphaned {
        /// Number of strings dropped
        count: usize,
    },
}

/// A string id and its text, used for listing, import and export
#[derive(Constructor, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TlkItem {
    /// Identifier of the reference entry
    pub ref_id: u32,

    /// Text shown for the reference
    #[cfg_attr(feature = "serde", serde(with = "lossy_text"))]
    pub text: U16String,
}

impl TlkItem {
    /// Build an item from UTF-8 text
    pub fn from_text(ref_id: u32, text: &str) -> Self {
        Self::new(ref_id, U16String::from_str(text))
    }
}

impl fmt::Display for TlkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ref_id, self.text.display())
    }
}

/// One difference between two talk tables
///
/// `left` is missing when the string only exists on the right and vice versa.
#[derive(Constructor, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TlkItemPair {
    /// The item in the first table
    pub left: Option<TlkItem>,

    /// The item in the second table
    pub right: Option<TlkItem>,
}

impl TlkItemPair {
    /// The string id this difference is about
    pub fn ref_id(&self) -> u32 {
        self.left
            .as_ref()
            .or(self.right.as_ref())
            .map(|item| item.ref_id)
            .unwrap_or_default()
    }
}

#[cfg(feature = "serde")]
mod lossy_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use widestring::U16String;

    pub fn serialize<S: Serializer>(text: &U16String, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&text.to_string_lossy())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U16String, D::Error> {
        String::deserialize(deserializer).map(|s| U16String::from_str(&s))
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{ReferenceEntry, TlkHeader, TlkItem, METADATA_SIZE};

    #[test]
    fn read_header() -> Result<()> {
        let mut input = b"GFF V4.0PC  TLK V0.2".to_vec();
        input.extend_from_slice(&[0x11; METADATA_SIZE]);
        input.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);

        let header = TlkHeader::read(&mut Cursor::new(input))?;
        assert_eq!(header.metadata, [0x11; METADATA_SIZE]);
        assert_eq!(header.element_count, 2);

        Ok(())
    }

    #[test]
    fn write_entry() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x39, 0x30, 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF,
        ];

        let mut actual = Vec::new();
        ReferenceEntry::new(12345, 0xFFFF_FFFF).write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_entry_has_no_record() -> Result<()> {
        let input = vec![0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00];

        let entry = ReferenceEntry::read(&mut Cursor::new(input))?;
        assert_eq!(entry.ref_id, 1);
        assert_eq!(entry.offset, 16);
        assert!(entry.is_valid());
        assert!(entry.record().is_none());

        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn item_serializes_text_as_string() {
        let item = TlkItem::from_text(7, "Hello");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"ref_id":7,"text":"Hello"}"#);

        let back: TlkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
