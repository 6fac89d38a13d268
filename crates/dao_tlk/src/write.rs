//! Types for writing talk table files
//!

use binrw::BinWrite;
use byteorder::WriteBytesExt;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::instrument;

use crate::error::Result;
use crate::io::WriteTlkExt;
use crate::layout::{first_slot_offset, needs_padding, slot_size};
use crate::table::TalkTable;
use crate::types::{END_MARKER, OFFSET_BASE};

impl TalkTable {
    /// Encode this table into a new buffer
    ///
    /// Strings are laid out again first, so the offsets written are the ones the strings end up
    /// at.
    ///
    /// ```
    /// # fn doit() -> dao_tlk::error::Result<()>
    /// # {
    /// use dao_tlk::TalkTable;
    ///
    /// let mut tlk = TalkTable::new();
    /// tlk.push_string(1, "Hello");
    ///
    /// let data = tlk.to_bytes()?;
    /// let read = TalkTable::read(std::io::Cursor::new(data))?;
    /// assert_eq!(read.text_by_ref_id(1).unwrap().to_string_lossy(), "Hello");
    /// # Ok(())
    /// # }
    /// # doit().unwrap();
    /// ```
    #[instrument(skip(self), err)]
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.rebuild_offsets();

        let strings_end = self
            .records
            .last()
            .map(|r| r.offset + slot_size(r.text.len()))
            .unwrap_or_else(|| first_slot_offset(self.entries.len()));
        let mut out = Cursor::new(Vec::with_capacity(
            OFFSET_BASE as usize + strings_end as usize + 1,
        ));

        self.header().write(&mut out)?;
        for entry in &self.entries {
            entry.write(&mut out)?;
        }

        let last = self.records.len().saturating_sub(1);
        for (index, record) in self.records.iter().enumerate() {
            out.write_slot(&record.text)?;
            if index != last && needs_padding(record.text.len()) {
                out.write_padding()?;
            }
        }
        out.write_u8(END_MARKER)?;

        Ok(out.into_inner())
    }

    /// Encode this table into a writer
    pub fn write<W: Write>(&mut self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Write this table to disk
    ///
    /// The file is encoded completely and written next to the destination first, then moved over
    /// it. When anything fails the destination is left as it was.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&data)?;
        staged.flush()?;
        staged.persist(path).map_err(|e| e.error)?;

        self.name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(())
    }
}
