//! In-memory talk table
//!

use std::collections::HashMap;
use widestring::{U16Str, U16String};

use crate::types::{
    Notice, RecordId, ReferenceEntry, StringRecord, TlkHeader, METADATA_SIZE, UNUSED_OFFSET,
};

/// A decoded talk table
///
/// Reference entries keep the order they have on disk. Strings are kept in the order they are
/// laid out in and are shared by every entry showing the same record.
///
/// ```
/// use dao_tlk::TalkTable;
///
/// let mut tlk = TalkTable::new();
/// let hello = tlk.push_string(1, "Hello");
/// tlk.push_reference(2, hello);
///
/// assert_eq!(tlk.len(), 2);
/// assert_eq!(tlk.records().len(), 1);
/// assert_eq!(tlk.text_by_ref_id(2).unwrap().to_string_lossy(), "Hello");
/// ```
#[derive(Debug, Clone)]
pub struct TalkTable {
    pub(crate) metadata: [u8; METADATA_SIZE],
    pub(crate) entries: Vec<ReferenceEntry>,
    pub(crate) records: Vec<StringRecord>,
    pub(crate) by_ref_id: HashMap<u32, RecordId>,
    pub(crate) by_offset: HashMap<u32, RecordId>,
    pub(crate) name: Option<String>,
    pub(crate) notices: Vec<Notice>,
}

impl Default for TalkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TalkTable {
    /// Create an empty table with a zeroed metadata block
    pub fn new() -> Self {
        Self::with_metadata([0; METADATA_SIZE])
    }

    /// Create an empty table that will be written with the given metadata block
    pub fn with_metadata(metadata: [u8; METADATA_SIZE]) -> Self {
        Self {
            metadata,
            entries: Vec::new(),
            records: Vec::new(),
            by_ref_id: HashMap::new(),
            by_offset: HashMap::new(),
            name: None,
            notices: Vec::new(),
        }
    }

    /// Number of reference entries, used or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this table has no reference entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The reference entries in file order
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// The strings in layout order
    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    /// Get a string by its id
    pub fn record(&self, id: RecordId) -> Option<&StringRecord> {
        self.records.get(id.index())
    }

    /// Find the string shown for a reference id
    pub fn by_ref_id(&self, ref_id: u32) -> Option<RecordId> {
        self.by_ref_id.get(&ref_id).copied()
    }

    /// Find the string laid out at a stored offset
    pub fn by_offset(&self, offset: u32) -> Option<RecordId> {
        self.by_offset.get(&offset).copied()
    }

    /// Text shown for a reference id
    pub fn text_by_ref_id(&self, ref_id: u32) -> Option<&U16Str> {
        self.by_ref_id(ref_id)
            .and_then(|id| self.record(id))
            .map(|r| r.text())
    }

    /// The opaque metadata block
    pub fn metadata(&self) -> &[u8; METADATA_SIZE] {
        &self.metadata
    }

    /// Header describing this table as it would be written
    pub fn header(&self) -> TlkHeader {
        TlkHeader {
            metadata: self.metadata,
            element_count: self.entries.len() as u32,
        }
    }

    /// File name this table was opened from
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Problems that were worked around while reading this table
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Append a reference with a string of its own
    pub fn push_string(&mut self, ref_id: u32, text: impl AsRef<str>) -> RecordId {
        self.push_wide_string(ref_id, U16String::from_str(text.as_ref()))
    }

    /// Append a reference with a string of its own from UTF-16 text
    pub fn push_wide_string(&mut self, ref_id: u32, text: U16String) -> RecordId {
        let id = RecordId::from(self.records.len());
        self.records.push(StringRecord::new(text, 0));
        self.attach(ref_id, id);
        id
    }

    /// Append a reference showing an existing string
    ///
    /// # Panics
    ///
    /// Panics if `record` does not belong to this table.
    pub fn push_reference(&mut self, ref_id: u32, record: RecordId) {
        assert!(
            record.index() < self.records.len(),
            "record {record} does not belong to this table"
        );
        self.attach(ref_id, record);
    }

    /// Append a reference without a string
    pub fn push_unused(&mut self, ref_id: u32) {
        self.entries.push(ReferenceEntry::new(ref_id, UNUSED_OFFSET));
        self.rebuild_offsets();
    }

    fn attach(&mut self, ref_id: u32, record: RecordId) {
        let index = self.entries.len();
        self.entries.push(ReferenceEntry {
            ref_id,
            offset: 0,
            record: Some(record),
        });
        self.records[record.index()].references.push(index);
        self.by_ref_id.insert(ref_id, record);
        self.rebuild_offsets();
    }

    /// Rebuild the reference id index from the entry links
    pub(crate) fn rebuild_ref_index(&mut self) {
        self.by_ref_id = self
            .entries
            .iter()
            .filter(|e| e.is_valid())
            .filter_map(|e| e.record.map(|r| (e.ref_id, r)))
            .collect();
    }

    /// Drop strings without references and renumber the remaining ones
    ///
    /// Returns the number of strings dropped.
    pub(crate) fn drop_unreferenced(&mut self) -> usize {
        let before = self.records.len();
        if self.records.iter().all(|r| !r.references.is_empty()) {
            return 0;
        }

        let mut remap = vec![None; before];
        let mut kept = Vec::with_capacity(before);
        for (index, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            if !record.references.is_empty() {
                remap[index] = Some(RecordId::from(kept.len()));
                kept.push(record);
            }
        }
        self.records = kept;

        for entry in &mut self.entries {
            entry.record = entry.record.and_then(|r| remap[r.index()]);
        }
        self.rebuild_ref_index();

        before - self.records.len()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::table::TalkTable;
    use crate::types::UNUSED_OFFSET;

    #[test]
    fn push_builds_indices() {
        let mut tlk = TalkTable::new();
        let first = tlk.push_string(10, "first");
        tlk.push_unused(11);
        let second = tlk.push_string(12, "second");
        tlk.push_reference(13, first);

        assert_eq!(tlk.len(), 4);
        assert_eq!(tlk.records().len(), 2);
        assert_eq!(tlk.by_ref_id(10), Some(first));
        assert_eq!(tlk.by_ref_id(11), None);
        assert_eq!(tlk.by_ref_id(12), Some(second));
        assert_eq!(tlk.by_ref_id(13), Some(first));
        assert_eq!(tlk.entries()[1].offset, UNUSED_OFFSET);
        assert_eq!(tlk.record(first).unwrap().references(), &[0, 3]);
    }

    #[test]
    fn offsets_follow_pushes() {
        let mut tlk = TalkTable::new();
        let first = tlk.push_string(1, "a");
        let second = tlk.push_string(2, "bc");

        // 2 entries -> strings start after count and entry block
        assert_eq!(tlk.record(first).unwrap().offset(), 8 + 16);
        // "a": 4 + 2 * 2, odd length so no padding
        assert_eq!(tlk.record(second).unwrap().offset(), 8 + 16 + 8);
        assert_eq!(tlk.by_offset(8 + 16 + 8), Some(second));
        assert_eq!(tlk.entries()[1].offset, 8 + 16 + 8);
    }

    #[test]
    #[should_panic]
    fn push_reference_to_foreign_record() {
        let mut other = TalkTable::new();
        other.push_string(1, "a");
        let foreign = other.push_string(2, "b");

        let mut tlk = TalkTable::new();
        tlk.push_reference(3, foreign);
    }

    #[test]
    fn drop_unreferenced_renumbers() {
        let mut tlk = TalkTable::new();
        let first = tlk.push_string(1, "a");
        let second = tlk.push_string(2, "b");
        tlk.records[first.index()].references.clear();
        tlk.entries[0].record = None;

        assert_eq!(tlk.drop_unreferenced(), 1);
        assert_eq!(tlk.records().len(), 1);
        assert_eq!(tlk.entries()[1].record().map(|r| r.index()), Some(0));
        assert_ne!(tlk.by_ref_id(2), Some(second));
        assert_eq!(tlk.text_by_ref_id(2).unwrap().to_string_lossy(), "b");
    }
}
