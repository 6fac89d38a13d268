//! Layout of the string region
//!
//! Offsets stored in reference entries are relative to [`crate::types::OFFSET_BASE`]. From there
//! the element count (4 bytes, preceded by 4 bytes of header) and the entry block come first,
//! then the string slots in record order.

use std::collections::HashMap;

use crate::table::TalkTable;
use crate::types::{RecordId, ENTRY_SIZE};

/// Whether a slot holding `len` code units (without terminator) is followed by padding
///
/// Keeps every slot aligned to four bytes. Reading, writing and layout all decide through here.
pub fn needs_padding(len: usize) -> bool {
    len % 2 == 0
}

/// Bytes taken by a slot, padding included
pub fn slot_size(len: usize) -> u32 {
    let size = 4 + (len as u32 + 1) * 2;
    if needs_padding(len) {
        size + 2
    } else {
        size
    }
}

/// Stored offset of the first slot in a table with `entries` reference entries
pub fn first_slot_offset(entries: usize) -> u32 {
    8 + entries as u32 * ENTRY_SIZE as u32
}

impl TalkTable {
    /// Lay the strings out again in their current order
    ///
    /// Every string gets the offset following the previous one and all entries showing it are
    /// updated. The offset index is rebuilt from scratch.
    pub fn rebuild_offsets(&mut self) {
        let mut offset = first_slot_offset(self.entries.len());
        let mut by_offset = HashMap::with_capacity(self.records.len());

        for (index, record) in self.records.iter_mut().enumerate() {
            record.offset = offset;
            for &entry in &record.references {
                self.entries[entry].offset = offset;
            }
            by_offset.insert(offset, RecordId::from(index));
            offset += slot_size(record.text.len());
        }

        self.by_offset = by_offset;
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::layout::{first_slot_offset, needs_padding, slot_size};
    use crate::table::TalkTable;

    #[test]
    fn padding_follows_even_lengths() {
        assert!(needs_padding(0));
        assert!(!needs_padding(1));
        assert!(needs_padding(2));
        assert!(!needs_padding(5));
    }

    #[test]
    fn slot_sizes_are_aligned() {
        for len in 0..64 {
            assert_eq!(slot_size(len) % 4, 0, "length {len}");
        }
        assert_eq!(slot_size(0), 8);
        assert_eq!(slot_size(1), 8);
        assert_eq!(slot_size(5), 16);
    }

    #[test]
    fn offsets_strictly_increase() {
        let mut tlk = TalkTable::new();
        for (i, text) in ["", "a", "ab", "abc", "Hello, World"].iter().enumerate() {
            tlk.push_string(i as u32, text);
        }
        let shared = tlk.by_ref_id(2).unwrap();
        tlk.push_reference(99, shared);

        tlk.rebuild_offsets();

        let offsets = tlk.records().iter().map(|r| r.offset()).collect::<Vec<_>>();
        assert_eq!(offsets[0], first_slot_offset(6));
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));

        for entry in tlk.entries() {
            let matching = tlk
                .records()
                .iter()
                .filter(|r| r.offset() == entry.offset)
                .count();
            assert_eq!(matching, 1);
            assert_eq!(
                tlk.by_offset(entry.offset),
                entry.record(),
                "ref {}",
                entry.ref_id
            );
        }
        assert_eq!(tlk.entries()[5].offset, tlk.entries()[2].offset);
    }
}
