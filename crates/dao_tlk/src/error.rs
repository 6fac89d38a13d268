//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// Transparent warpper for [`quick_xml::Error`]
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),

    /// Transparent warpper for [`quick_xml::events::attributes::AttrError`]
    #[error(transparent)]
    XmlAttrError(#[from] quick_xml::events::attributes::AttrError),

    /// The file ended before a fixed size block could be read
    #[error("talk table is truncated")]
    #[diagnostic(help("the file is shorter than its header requires"))]
    Truncated,

    /// The file does not start with the talk table signature
    #[error("invalid talk table signature")]
    BadSignature,

    /// The header declares more elements than the file can hold
    #[error("element count {count} does not fit in a file of {length} bytes")]
    ElementCountMismatch {
        /// Declared number of elements
        count: u32,
        /// Length of the file in bytes
        length: u64,
    },

    /// A reference points at an offset that no string can be read from
    #[error("unable to read string {ref_id} at offset {offset:#010X}")]
    UnresolvedOffset {
        /// Identifier of the reference
        ref_id: u32,
        /// Stored offset of the reference
        offset: u32,
    },

    /// No reference with the given identifier exists
    #[error("no string with id {0}")]
    NotFound(u32),
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        match value {
            e if e.is_eof() => Error::Truncated,
            binrw::Error::BadMagic { .. } => Error::BadSignature,
            binrw::Error::Backtrace(bt) => Error::from(*bt.error),
            binrw::Error::Io(e) => Error::IOError(e),
            other => Error::BinRWError(other),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
