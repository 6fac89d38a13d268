//! Primitive reads and writes for talk table string slots
//!

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use widestring::{U16Str, U16String};

/// Largest slot (in code units, terminator included) accepted while reading
pub const MAX_SLOT_UNITS: i64 = 100_000;

/// Padding unit written after slots whose text has an even length
pub const PADDING: u16 = 0xFFFF;

/// Outcome of reading a single length prefixed slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The slot could be read completely
    Text(U16String),
    /// The slot declared a length that can't be right
    Corrupt(i64),
}

/// Talk table specific extensions to [`std::io::Read`]
pub trait ReadTlkExt: Read {
    /// Read `units` little endian UTF-16 code units into a buffer
    fn read_units(&mut self, units: usize) -> io::Result<U16String> {
        let mut raw = vec![0u8; units * 2];
        self.read_exact(&mut raw)?;

        Ok(U16String::from_vec(
            raw.chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect::<Vec<_>>(),
        ))
    }

    /// Read a slot: a length including the terminator followed by that many code units.
    ///
    /// A single trailing NUL is trimmed from the text. Declared lengths outside
    /// `0..=MAX_SLOT_UNITS` are reported as [`Slot::Corrupt`] without consuming the payload.
    fn read_slot(&mut self) -> io::Result<Slot> {
        let declared = self.read_i32::<LittleEndian>()? as i64;
        if !(0..=MAX_SLOT_UNITS).contains(&declared) {
            return Ok(Slot::Corrupt(declared));
        }

        let mut units = self.read_units(declared as usize)?.into_vec();
        if units.last() == Some(&0) {
            units.pop();
        }

        Ok(Slot::Text(U16String::from_vec(units)))
    }
}

impl<R: Read + ?Sized> ReadTlkExt for R {}

/// Talk table specific extensions to [`std::io::Write`]
pub trait WriteTlkExt: Write {
    /// Write the code units of `text` without a terminator
    fn write_units(&mut self, text: &U16Str) -> io::Result<()> {
        for unit in text.as_slice() {
            self.write_u16::<LittleEndian>(*unit)?;
        }
        Ok(())
    }

    /// Write a NUL terminated slot with its length prefix
    fn write_slot(&mut self, text: &U16Str) -> io::Result<()> {
        self.write_u32::<LittleEndian>(text.len() as u32 + 1)?;
        self.write_units(text)?;
        self.write_u16::<LittleEndian>(0)
    }

    /// Write the two byte alignment padding
    fn write_padding(&mut self) -> io::Result<()> {
        self.write_u16::<LittleEndian>(PADDING)
    }
}

impl<W: Write + ?Sized> WriteTlkExt for W {}
