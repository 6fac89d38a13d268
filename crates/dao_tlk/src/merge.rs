//! Merging of strings with identical text
//!

use std::collections::HashMap;
use tracing::{debug, info, instrument};
use widestring::U16String;

use crate::table::TalkTable;
use crate::types::{RecordId, StringRecord};

impl TalkTable {
    /// Collapse strings with identical text into one
    ///
    /// The first string with a given text survives, the references of every later copy are
    /// appended to it. Returns the number of strings that were discarded. When anything was
    /// merged the strings are laid out again.
    #[instrument(skip(self))]
    pub fn merge_duplicates(&mut self) -> usize {
        let mut survivors: HashMap<U16String, RecordId> = HashMap::with_capacity(self.records.len());
        let mut remap = Vec::with_capacity(self.records.len());
        let mut kept: Vec<StringRecord> = Vec::with_capacity(self.records.len());
        let mut merged_strings = 0;
        let mut merged_references = 0;

        for record in std::mem::take(&mut self.records) {
            match survivors.get(&record.text) {
                Some(&survivor) => {
                    merged_strings += 1;
                    merged_references += record.references.len();
                    kept[survivor.index()]
                        .references
                        .extend_from_slice(&record.references);
                    remap.push(survivor);
                }
                None => {
                    let id = RecordId::from(kept.len());
                    survivors.insert(record.text.clone(), id);
                    remap.push(id);
                    kept.push(record);
                }
            }
        }
        self.records = kept;

        if merged_strings == 0 {
            debug!("no duplicate strings");
            return 0;
        }

        for entry in &mut self.entries {
            entry.record = entry.record.map(|r| remap[r.index()]);
        }
        self.rebuild_offsets();
        self.rebuild_ref_index();

        info!(
            strings = merged_strings,
            references = merged_references,
            "merged duplicate strings"
        );

        merged_strings
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::table::TalkTable;

    fn sample() -> TalkTable {
        let mut tlk = TalkTable::new();
        tlk.push_string(1, "Hello");
        tlk.push_string(2, "World");
        tlk.push_unused(3);
        let hello = tlk.push_string(4, "Hello");
        tlk.push_reference(5, hello);
        tlk.push_string(6, "hello");
        tlk.push_string(7, "World");
        tlk
    }

    #[traced_test]
    #[test]
    fn merge_keeps_first_copy() {
        let mut tlk = sample();
        let before = tlk.records().len();

        assert_eq!(tlk.merge_duplicates(), 2);
        assert_eq!(tlk.records().len(), before - 2);
        assert!(logs_contain("merged duplicate strings"));

        let hello = tlk.by_ref_id(1).unwrap();
        assert_eq!(tlk.record(hello).unwrap().references(), &[0, 3, 4]);
        assert_eq!(tlk.by_ref_id(4), Some(hello));
        assert_eq!(tlk.by_ref_id(5), Some(hello));
        assert_ne!(tlk.by_ref_id(6), Some(hello));
        assert_eq!(tlk.by_ref_id(7), tlk.by_ref_id(2));
    }

    #[traced_test]
    #[test]
    fn merge_is_idempotent() {
        let mut tlk = sample();
        tlk.merge_duplicates();
        let records = tlk.records().len();
        let entries = tlk.entries().to_vec();

        assert_eq!(tlk.merge_duplicates(), 0);
        assert_eq!(tlk.records().len(), records);
        assert_eq!(tlk.entries(), entries.as_slice());
    }

    #[traced_test]
    #[test]
    fn merge_preserves_visible_text() {
        let mut tlk = sample();
        let before = tlk
            .entries()
            .iter()
            .map(|e| tlk.text_by_ref_id(e.ref_id).map(|t| t.to_owned()))
            .collect::<Vec<_>>();

        tlk.merge_duplicates();

        let after = tlk
            .entries()
            .iter()
            .map(|e| tlk.text_by_ref_id(e.ref_id).map(|t| t.to_owned()))
            .collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[traced_test]
    #[test]
    fn merge_relays_offsets() {
        let mut tlk = sample();
        tlk.merge_duplicates();

        let offsets = tlk.records().iter().map(|r| r.offset()).collect::<Vec<_>>();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        for entry in tlk.entries().iter().filter(|e| e.is_valid()) {
            assert_eq!(tlk.by_offset(entry.offset), entry.record());
        }
    }
}
