use std::io::Cursor;
use std::path::PathBuf;

use dao_tlk::edit::ExportOptions;
use dao_tlk::error::Result;
use dao_tlk::{text, TalkTable, TlkItem};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{name}", env!("CARGO_MANIFEST_DIR")))
}

#[traced_test]
#[test]
fn text_listing_round_trip() -> Result<()> {
    let tlk = TalkTable::open(resource("shared.tlk"))?;

    let items = tlk.export(ExportOptions::builder().escape_newlines(true).build());
    let mut listing = Vec::new();
    text::write_items(&items, &mut listing)?;
    let listing = String::from_utf8_lossy(&listing);
    assert_eq!(listing, "1 Hello\n2 Hello\n4 line1\\nline2\n");

    let mut copy = tlk.clone();
    assert_eq!(copy.import(&text::parse_items(&listing), false), 3);
    assert_eq!(copy.export(ExportOptions::default()), tlk.export(ExportOptions::default()));

    Ok(())
}

#[traced_test]
#[test]
fn split_import_survives_save() -> Result<()> {
    let mut tlk = TalkTable::open(resource("shared.tlk"))?;

    tlk.import(&[TlkItem::from_text(2, "Goodbye")], true);
    let reread = TalkTable::read(Cursor::new(tlk.to_bytes()?))?;

    assert!(reread.notices().is_empty());
    assert_eq!(reread.records().len(), 3);
    assert_eq!(reread.text_by_ref_id(1).unwrap().to_string_lossy(), "Hello");
    assert_eq!(reread.text_by_ref_id(2).unwrap().to_string_lossy(), "Goodbye");
    assert_eq!(
        reread.text_by_ref_id(4).unwrap().to_string_lossy(),
        "line1\r\nline2"
    );

    Ok(())
}

#[traced_test]
#[test]
fn merge_then_save() -> Result<()> {
    let mut tlk = TalkTable::open(resource("duplicates.tlk"))?;

    assert_eq!(tlk.merge_duplicates(), 1);
    let reread = TalkTable::read(Cursor::new(tlk.to_bytes()?))?;

    assert_eq!(reread.records().len(), 1);
    let offsets = reread.entries().iter().map(|e| e.offset).collect::<Vec<_>>();
    assert_eq!(offsets, vec![32, 32, 32]);

    Ok(())
}

#[traced_test]
#[test]
fn diff_against_edited_copy() -> Result<()> {
    let tlk = TalkTable::open(resource("shared.tlk"))?;
    let mut edited = tlk.clone();
    edited.import(&[TlkItem::from_text(4, "changed")], false);

    let diff = tlk.diff(&edited);
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].ref_id(), 4);
    assert_eq!(diff[0].right, Some(TlkItem::from_text(4, "changed")));

    Ok(())
}

#[traced_test]
#[test]
fn xml_round_trip() -> Result<()> {
    let tlk = TalkTable::open(resource("shared.tlk"))?;
    let xml = tlk.to_xml()?;

    let mut blank = tlk.clone();
    blank.import(
        &[TlkItem::from_text(1, ""), TlkItem::from_text(4, "")],
        false,
    );
    assert_eq!(blank.import_xml(&xml, false)?, 2);
    assert!(tlk.diff(&blank).is_empty());

    Ok(())
}
