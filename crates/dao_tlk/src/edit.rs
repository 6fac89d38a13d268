//! Editing, importing, exporting and comparing strings
//!

use bon::Builder;
use tracing::{debug, info, instrument};
use widestring::{U16Str, U16String};

use crate::error::{Error, Result};
use crate::table::TalkTable;
use crate::types::{RecordId, StringRecord, TlkItem, TlkItemPair};

const LINE_BREAK: [u16; 2] = [b'\r' as u16, b'\n' as u16];
const ESCAPED_LINE_BREAK: [u16; 2] = [b'\\' as u16, b'n' as u16];

/// Options for [`TalkTable::export`]
#[derive(Debug, Default, Clone, Copy, Builder)]
pub struct ExportOptions {
    /// Emit one item per string instead of one per reference
    #[builder(default)]
    pub unique: bool,

    /// Replace line breaks with a literal `\n`
    #[builder(default)]
    pub escape_newlines: bool,
}

fn replace_units(text: &U16Str, from: &[u16], to: &[u16]) -> U16String {
    let haystack = text.as_slice();
    let mut out = Vec::with_capacity(haystack.len());

    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }

    U16String::from_vec(out)
}

/// Replace line breaks with the literal `\n` token
pub fn escape_newlines(text: &U16Str) -> U16String {
    replace_units(text, &LINE_BREAK, &ESCAPED_LINE_BREAK)
}

/// Replace the literal `\n` token with line breaks
pub fn unescape_newlines(text: &U16Str) -> U16String {
    replace_units(text, &ESCAPED_LINE_BREAK, &LINE_BREAK)
}

impl TalkTable {
    /// Change the text of a string
    ///
    /// Without `split`, or when only one reference shows the string, the text is replaced in
    /// place and every reference showing it changes. With `split` the reference `ref_id` is
    /// detached into a string of its own that gets a provisional offset, the other references
    /// keep the old text. Provisional offsets are replaced the next time the table is saved or
    /// [`TalkTable::rebuild_offsets`] runs.
    ///
    /// Returns the string that now holds `text`, or `None` when `ref_id` had to be detached but
    /// doesn't show `record`.
    pub fn update_text(
        &mut self,
        record: RecordId,
        ref_id: u32,
        text: U16String,
        split: bool,
    ) -> Option<RecordId> {
        let current = self.records.get_mut(record.index())?;
        if !split || current.references.len() == 1 {
            current.text = text;
            return Some(record);
        }

        let position = current
            .references
            .iter()
            .position(|&entry| self.entries[entry].ref_id == ref_id)?;
        let entry = current.references.remove(position);

        let offset = self
            .records
            .iter()
            .map(|r| r.offset)
            .max()
            .map_or(0, |max| max + 1);
        let id = RecordId::from(self.records.len());

        let mut detached = StringRecord::new(text, offset);
        detached.references.push(entry);
        self.records.push(detached);

        self.entries[entry].offset = offset;
        self.entries[entry].record = Some(id);
        self.by_offset.insert(offset, id);
        self.by_ref_id.insert(ref_id, id);

        debug!(ref_id, "split shared string");

        Some(id)
    }

    /// Change the text shown for a reference id
    ///
    /// See [`TalkTable::update_text`].
    pub fn update_by_ref_id(
        &mut self,
        ref_id: u32,
        text: U16String,
        split: bool,
    ) -> Result<RecordId> {
        let record = self.by_ref_id(ref_id).ok_or(Error::NotFound(ref_id))?;
        self.update_text(record, ref_id, text, split)
            .ok_or(Error::NotFound(ref_id))
    }

    /// Apply a list of edits
    ///
    /// A literal `\n` in the text becomes a line break. Items whose id isn't in this table are
    /// skipped. Returns the number of strings changed.
    #[instrument(skip_all, fields(items = items.len(), split))]
    pub fn import(&mut self, items: &[TlkItem], split: bool) -> usize {
        let mut changed = 0;
        let strings = self.records.len();

        for item in items {
            let Some(record) = self.by_ref_id(item.ref_id) else {
                debug!(ref_id = item.ref_id, "skipping unknown string");
                continue;
            };

            let text = unescape_newlines(&item.text);
            if self.update_text(record, item.ref_id, text, split).is_some() {
                changed += 1;
            }
        }

        if self.records.len() != strings {
            self.rebuild_offsets();
        }

        info!(changed, "imported strings");

        changed
    }

    /// List the strings of this table in entry order
    ///
    /// ```
    /// use dao_tlk::{edit::ExportOptions, TalkTable};
    ///
    /// let mut tlk = TalkTable::new();
    /// let hello = tlk.push_string(1, "Hello");
    /// tlk.push_reference(2, hello);
    ///
    /// let all = tlk.export(ExportOptions::default());
    /// assert_eq!(all.len(), 2);
    ///
    /// let unique = tlk.export(ExportOptions::builder().unique(true).build());
    /// assert_eq!(unique.len(), 1);
    /// assert_eq!(unique[0].ref_id, 1);
    /// ```
    pub fn export(&self, options: ExportOptions) -> Vec<TlkItem> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_valid())
            .filter_map(|(index, entry)| {
                let record = self.record(entry.record?)?;
                if options.unique && record.references.first() != Some(&index) {
                    return None;
                }

                let text = if options.escape_newlines {
                    escape_newlines(&record.text)
                } else {
                    record.text.clone()
                };
                Some(TlkItem::new(entry.ref_id, text))
            })
            .collect()
    }

    /// Compare the strings of two tables by reference id
    ///
    /// Returns one pair per id that only exists on one side or shows different text, in
    /// ascending id order.
    pub fn diff(&self, other: &TalkTable) -> Vec<TlkItemPair> {
        let mut left = self.export(ExportOptions::default());
        let mut right = other.export(ExportOptions::default());
        left.sort_by_key(|item| item.ref_id);
        right.sort_by_key(|item| item.ref_id);

        let mut result = Vec::new();
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();

        while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
            if l.ref_id < r.ref_id {
                result.push(TlkItemPair::new(left.next(), None));
            } else if l.ref_id > r.ref_id {
                result.push(TlkItemPair::new(None, right.next()));
            } else {
                let (l, r) = (left.next(), right.next());
                if l.as_ref().map(|i| &i.text) != r.as_ref().map(|i| &i.text) {
                    result.push(TlkItemPair::new(l, r));
                }
            }
        }

        result.extend(left.map(|l| TlkItemPair::new(Some(l), None)));
        result.extend(right.map(|r| TlkItemPair::new(None, Some(r))));

        result
    }
}
