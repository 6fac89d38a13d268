//! Plain text listing of strings
//!
//! Every item is written as one `{ref_id} {text}` line. When reading, a line that starts with
//! an id followed by a space (or that holds nothing but an id) begins a new item, any other line
//! continues the text of the previous one. Lines in front of the first item are ignored.

use std::io::Write;
use widestring::U16String;
use winnow::ascii::digit1;
use winnow::combinator::{alt, eof, preceded};
use winnow::token::rest;
use winnow::{ModalResult, Parser};

use crate::error::Result;
use crate::types::TlkItem;

const CONTINUATION: &str = "\r\n";

fn item_start<'s>(input: &mut &'s str) -> ModalResult<(u32, &'s str)> {
    let ref_id = digit1.try_map(str::parse::<u32>).parse_next(input)?;
    let text = alt((preceded(' ', rest), eof)).parse_next(input)?;
    Ok((ref_id, text))
}

/// Parse a text listing into items
///
/// ```
/// let items = dao_tlk::text::parse_items("1 Hello\n2 first\nsecond\n");
///
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[1].text.to_string_lossy(), "first\r\nsecond");
/// ```
pub fn parse_items(input: &str) -> Vec<TlkItem> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut items: Vec<(u32, String)> = Vec::new();

    for line in input.lines() {
        match item_start.parse(line) {
            Ok((ref_id, text)) => items.push((ref_id, text.to_owned())),
            Err(_) => {
                if let Some((_, text)) = items.last_mut() {
                    text.push_str(CONTINUATION);
                    text.push_str(line);
                }
            }
        }
    }

    items
        .into_iter()
        .map(|(ref_id, text)| TlkItem::new(ref_id, U16String::from_str(&text)))
        .collect()
}

/// Write items as a text listing, one line per item
pub fn write_items<W: Write>(items: &[TlkItem], mut writer: W) -> Result<()> {
    for item in items {
        writeln!(writer, "{item}")?;
    }
    writer.flush()?;
    Ok(())
}
