//! Types for reading talk table files
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::{
    collections::HashMap,
    io::{self, Cursor, Read, Seek, SeekFrom},
    path::Path,
};
use tracing::{debug, instrument, warn};
use widestring::U16String;

use crate::{
    error::{Error, Result},
    io::{ReadTlkExt, Slot},
    layout::needs_padding,
    table::TalkTable,
    types::{
        Notice, RecordId, ReferenceEntry, StringRecord, TlkHeader, ENTRY_SIZE, HEADER_SIZE,
        OFFSET_BASE,
    },
};

impl TalkTable {
    /// Read a talk table from disk
    ///
    /// The whole file is loaded into memory before decoding and the handle is closed again.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>) -> Result<TalkTable> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        let mut tlk = Self::read(Cursor::new(data))?;
        tlk.name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(tlk)
    }

    /// Decode a talk table
    ///
    /// ```no_run
    /// use std::io::prelude::*;
    ///
    /// fn list_strings(reader: impl Read + Seek) -> dao_tlk::error::Result<()> {
    ///     let tlk = dao_tlk::TalkTable::read(reader)?;
    ///
    ///     for entry in tlk.entries() {
    ///         if let Some(text) = tlk.text_by_ref_id(entry.ref_id) {
    ///             println!("{}: {}", entry.ref_id, text.display());
    ///         }
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    ///
    /// Damaged string regions are worked around when every reference can still be read on its
    /// own. What was done about them is listed in [`TalkTable::notices`].
    #[instrument(skip_all, err)]
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<TalkTable> {
        let length = reader.seek(SeekFrom::End(0))?;
        reader.rewind()?;

        if length <= HEADER_SIZE {
            return Err(Error::Truncated);
        }

        let header = TlkHeader::read(&mut reader)?;
        let count = header.element_count;
        if HEADER_SIZE + count as u64 * ENTRY_SIZE > length {
            return Err(Error::ElementCountMismatch { count, length });
        }

        let mut tlk = TalkTable::with_metadata(header.metadata);
        tlk.entries = (0..count)
            .map(|_| ReferenceEntry::read(&mut reader).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        tlk.scan_slots(&mut reader, length)?;

        if let Some((ref_id, offset)) = tlk.link_entries() {
            tlk.notice(Notice::Recovered { ref_id, offset });
            tlk.recover(&mut reader, length)?;
        } else {
            let count = tlk.drop_unreferenced();
            if count > 0 {
                tlk.notice(Notice::Orphaned { count });
                tlk.rebuild_offsets();
            }
        }

        debug!(
            entries = tlk.entries.len(),
            strings = tlk.records.len(),
            "read talk table"
        );

        Ok(tlk)
    }

    fn notice(&mut self, notice: Notice) {
        warn!("{}", notice);
        self.notices.push(notice);
    }

    /// Read slots one after another until the data runs out or stops making sense
    fn scan_slots<R: Read + Seek>(&mut self, reader: &mut R, length: u64) -> Result<()> {
        let mut position = reader.stream_position()?;

        while length - position >= 4 {
            let text = match reader.read_slot() {
                Ok(Slot::Text(text)) => text,
                Ok(Slot::Corrupt(declared)) => {
                    self.notice(Notice::CorruptSlot {
                        position,
                        length: declared,
                    });
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    reader.seek(SeekFrom::Start(position))?;
                    let declared = reader.read_i32::<LittleEndian>()? as i64;
                    self.notice(Notice::CorruptSlot {
                        position,
                        length: declared,
                    });
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            let id = RecordId::from(self.records.len());
            let offset = (position - OFFSET_BASE) as u32;
            let pad = needs_padding(text.len());

            self.records.push(StringRecord::new(text, offset));
            self.by_offset.insert(offset, id);

            position = reader.stream_position()?;
            if pad && length - position >= 2 {
                position = reader.seek(SeekFrom::Current(2))?;
            }
        }

        Ok(())
    }

    /// Point every used entry at the slot found at its offset
    ///
    /// Returns the first entry that has no slot at its offset, if any.
    fn link_entries(&mut self) -> Option<(u32, u32)> {
        for index in 0..self.entries.len() {
            let entry = self.entries[index];
            if !entry.is_valid() {
                continue;
            }

            let Some(&record) = self.by_offset.get(&entry.offset) else {
                return Some((entry.ref_id, entry.offset));
            };

            self.entries[index].record = Some(record);
            self.records[record.index()].references.push(index);
            self.by_ref_id.insert(entry.ref_id, record);
        }

        None
    }

    /// Throw away the scanned strings and read them again through each entry's own offset
    fn recover<R: Read + Seek>(&mut self, reader: &mut R, length: u64) -> Result<()> {
        self.records.clear();
        self.by_offset = HashMap::new();
        self.by_ref_id = HashMap::new();

        for index in 0..self.entries.len() {
            self.entries[index].record = None;

            let entry = self.entries[index];
            if !entry.is_valid() {
                continue;
            }

            let record = match self.by_offset.get(&entry.offset) {
                Some(&record) => record,
                None => {
                    let text = read_slot_at(reader, length, &entry)?;
                    let record = RecordId::from(self.records.len());
                    self.records.push(StringRecord::new(text, entry.offset));
                    self.by_offset.insert(entry.offset, record);
                    record
                }
            };

            self.entries[index].record = Some(record);
            self.records[record.index()].references.push(index);
            self.by_ref_id.insert(entry.ref_id, record);
        }

        self.rebuild_offsets();

        Ok(())
    }
}

fn read_slot_at<R: Read + Seek>(
    reader: &mut R,
    length: u64,
    entry: &ReferenceEntry,
) -> Result<U16String> {
    let unresolved = || Error::UnresolvedOffset {
        ref_id: entry.ref_id,
        offset: entry.offset,
    };

    let position = OFFSET_BASE + entry.offset as u64;
    if position + 4 > length {
        return Err(unresolved());
    }

    reader.seek(SeekFrom::Start(position))?;
    match reader.read_slot() {
        Ok(Slot::Text(text)) => Ok(text),
        Ok(Slot::Corrupt(_)) => Err(unresolved()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(unresolved()),
        Err(e) => Err(e.into()),
    }
}
