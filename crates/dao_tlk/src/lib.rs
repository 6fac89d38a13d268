//! # TLK Format Documentation
//!
//! This crate provides utilities to read, edit and write the **GFF 4.0 talk table** format used
//! by the game *Dragon Age: Origins*. A talk table maps numeric string ids to localized UTF-16
//! text. Ids that show the same text may share a single copy of it. Talk tables are typically
//! identified with the `.tlk` extension.
//!
//! ## File Structure
//!
//! A TLK file consists of a signature, an opaque metadata block, a list of reference entries and
//! a region of string slots, followed by a single marker byte.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Signature              | 20 bytes: `GFF V4.0PC  TLK V0.2`                           |
//! | 0x0014         | Metadata               | 80 bytes: Preserved verbatim                               |
//! | 0x0064         | Element Count          | 4 bytes: The number of reference entries                   |
//! | 0x0068         | Entries                | 8 bytes per entry                                          |
//! | ...            | Slots                  | One slot per string                                        |
//! | end - 1        | Marker                 | 1 byte: `0x0A`                                             |
//!
//! ### Reference Entries
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | ID                     | 4 bytes: The string id                                  |
//! | 0x0004         | Offset                 | 4 bytes: Slot offset relative to `0x60`, `0xFFFFFFFF` if unused |
//!
//! Several entries may hold the same offset, in which case they share the string stored there.
//!
//! ### String Slots
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Characters             | 4 bytes: Number of UTF-16 code units, terminator included |
//! | 0x0004         | Data                   | (Characters * 2) bytes: UTF-16 text ending in `0x0000`  |
//! | ...            | Padding                | 2 bytes: `0xFFFF`, only when the text length is even    |
//!
//! The padding keeps every slot aligned to four bytes. The last slot of a file is never padded.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.tlk`
//! - **Endianness**: Little-endian for all multi-byte integers
//!
//! ```no_run
//! # fn doit() -> dao_tlk::error::Result<()>
//! # {
//! use dao_tlk::{edit::ExportOptions, TalkTable, TlkItem};
//!
//! let mut tlk = TalkTable::open("core_en-us.tlk")?;
//! for item in tlk.export(ExportOptions::builder().unique(true).build()) {
//!     println!("{item}");
//! }
//!
//! tlk.import(&[TlkItem::from_text(1, "Hello")], true);
//! tlk.save("core_en-us.tlk")?;
//! # Ok(())
//! # }
//! ```

pub mod edit;
pub mod error;
pub mod io;
pub mod layout;
pub mod merge;
pub mod read;
pub mod table;
pub mod text;
pub mod types;
pub mod write;
pub mod xml;

pub use table::TalkTable;
pub use types::{Notice, RecordId, ReferenceEntry, StringRecord, TlkItem, TlkItemPair};
