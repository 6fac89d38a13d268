use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use dao_tlk::error::Result;
use dao_tlk::TalkTable;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;
use widestring::u16str;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{name}", env!("CARGO_MANIFEST_DIR")))
}

#[traced_test]
#[test]
fn open_shared_strings() -> Result<()> {
    let tlk = TalkTable::open(resource("shared.tlk"))?;

    assert_eq!(tlk.len(), 4);
    assert_eq!(tlk.records().len(), 2);
    assert_eq!(tlk.name(), Some("shared.tlk"));
    assert!(tlk.notices().is_empty());

    assert_eq!(tlk.text_by_ref_id(1), Some(u16str!("Hello")));
    assert_eq!(tlk.text_by_ref_id(2), Some(u16str!("Hello")));
    assert_eq!(tlk.by_ref_id(1), tlk.by_ref_id(2));
    assert_eq!(tlk.text_by_ref_id(3), None);
    assert_eq!(tlk.text_by_ref_id(4), Some(u16str!("line1\r\nline2")));

    let metadata = (0..80).map(|i| 0x10 + i as u8).collect::<Vec<_>>();
    assert_eq!(tlk.metadata().as_slice(), metadata.as_slice());

    Ok(())
}

#[traced_test]
#[test]
fn read_from_reader() -> Result<()> {
    let mut data = Vec::new();
    File::open(resource("duplicates.tlk"))?.read_to_end(&mut data)?;

    let tlk = TalkTable::read(std::io::Cursor::new(data))?;

    assert_eq!(tlk.len(), 3);
    assert_eq!(tlk.records().len(), 2);
    assert_eq!(tlk.name(), None);
    assert_eq!(tlk.entries()[0].offset, 32);
    assert_eq!(tlk.entries()[1].offset, 44);
    assert_eq!(tlk.by_ref_id(10), tlk.by_ref_id(12));
    assert_ne!(tlk.by_ref_id(10), tlk.by_ref_id(11));

    Ok(())
}

#[traced_test]
#[test]
fn open_missing_file() {
    let result = TalkTable::open(resource("missing.tlk"));
    assert!(matches!(result, Err(dao_tlk::error::Error::IOError(_))));
}
