//! XML listing of strings and the references showing them
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <GffTlk FileName="core.tlk" strCount="1" refCount="2" refValidCount="2">
//!   <str value="Hello" refs="2">
//!     <ref>1</ref>
//!     <ref>2</ref>
//!   </str>
//! </GffTlk>
//! ```

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use tracing::{debug, info, instrument};
use widestring::U16String;

use crate::error::Result;
use crate::table::TalkTable;

fn escape_attribute(value: &str) -> Vec<u8> {
    let mut out = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\r' => out.push_str("&#13;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out.into_bytes()
}

impl TalkTable {
    /// Describe every string and the references showing it as an XML document
    #[instrument(skip(self), err)]
    pub fn to_xml(&self) -> Result<String> {
        let mut output = Vec::new();
        let mut writer = Writer::new_with_indent(&mut output, b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let ref_count = self.len().to_string();
        let valid_count = self
            .records
            .iter()
            .map(|r| r.references.len())
            .sum::<usize>()
            .to_string();
        let mut root = BytesStart::new("GffTlk");
        root.push_attribute(("FileName", self.name().unwrap_or_default()));
        root.push_attribute(("strCount", self.records.len().to_string().as_str()));
        root.push_attribute(("refCount", ref_count.as_str()));
        root.push_attribute(("refValidCount", valid_count.as_str()));
        writer.write_event(Event::Start(root))?;

        for record in &self.records {
            let mut element = BytesStart::new("str");
            element.push_attribute(Attribute {
                key: QName(b"value"),
                value: Cow::Owned(escape_attribute(&record.text.to_string_lossy())),
            });
            element.push_attribute(("refs", record.references.len().to_string().as_str()));
            writer.write_event(Event::Start(element))?;

            for &entry in &record.references {
                let ref_id = self.entries[entry].ref_id.to_string();
                writer.write_event(Event::Start(BytesStart::new("ref")))?;
                writer.write_event(Event::Text(BytesText::new(&ref_id)))?;
                writer.write_event(Event::End(BytesEnd::new("ref")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("str")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("GffTlk")))?;

        let mut xml = String::from_utf8_lossy(&output).into_owned();
        xml.push('\n');
        Ok(xml)
    }

    /// Apply the strings of an XML document produced by [`TalkTable::to_xml`]
    ///
    /// Every `<ref>` of a `<str>` whose id exists in this table and currently shows a different
    /// text is changed to the `value` of the `<str>`. Returns the number of changes.
    #[instrument(skip(self, content), err)]
    pub fn import_xml(&mut self, content: &str, split: bool) -> Result<usize> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut value: Option<U16String> = None;
        let mut in_ref = false;
        let mut ref_text = String::new();
        let mut changed = 0;

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().as_ref() == b"str" => {
                    value = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"value" {
                            value = Some(U16String::from_str(&attr.unescape_value()?));
                        }
                    }
                }
                Event::End(e) if e.name().as_ref() == b"str" => value = None,
                Event::Start(e) if e.name().as_ref() == b"ref" => {
                    in_ref = true;
                    ref_text.clear();
                }
                Event::Text(e) if in_ref => ref_text.push_str(&e.unescape()?),
                Event::End(e) if e.name().as_ref() == b"ref" => {
                    in_ref = false;
                    let Some(text) = value.as_ref() else {
                        continue;
                    };
                    let Ok(ref_id) = ref_text.trim().parse::<u32>() else {
                        debug!(reference = %ref_text, "skipping malformed reference");
                        continue;
                    };
                    let Some(record) = self.by_ref_id(ref_id) else {
                        debug!(ref_id, "skipping unknown string");
                        continue;
                    };
                    if self.records[record.index()].text == *text {
                        continue;
                    }
                    if self.update_text(record, ref_id, text.clone(), split).is_some() {
                        changed += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if split {
            self.rebuild_offsets();
        }

        info!(changed, "imported strings");

        Ok(changed)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::table::TalkTable;

    fn sample() -> TalkTable {
        let mut tlk = TalkTable::new();
        let hello = tlk.push_string(1, "Hello");
        tlk.push_reference(2, hello);
        tlk.push_unused(3);
        tlk.push_string(4, "a < b & \"c\"\r\nnext");
        tlk
    }

    #[traced_test]
    #[test]
    fn export_document() -> Result<()> {
        let xml = sample().to_xml()?;

        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<GffTlk FileName="" strCount="2" refCount="4" refValidCount="3">
  <str value="Hello" refs="2">
    <ref>1</ref>
    <ref>2</ref>
  </str>
  <str value="a &lt; b &amp; &quot;c&quot;&#13;&#10;next" refs="1">
    <ref>4</ref>
  </str>
</GffTlk>
"#;
        assert_str_eq!(xml, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn import_own_export_changes_nothing() -> Result<()> {
        let mut tlk = sample();
        let xml = tlk.to_xml()?;

        assert_eq!(tlk.import_xml(&xml, false)?, 0);
        assert_eq!(
            tlk.text_by_ref_id(4).unwrap().to_string_lossy(),
            "a < b & \"c\"\r\nnext"
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn import_changed_document() -> Result<()> {
        let xml = r#"<GffTlk>
  <str value="Bonjour&#13;&#10;monde" refs="2"><ref>1</ref><ref>2</ref></str>
  <str value="ignored"><ref>77</ref><ref>x</ref></str>
</GffTlk>"#;

        let mut tlk = sample();
        assert_eq!(tlk.import_xml(xml, false)?, 1);
        assert_eq!(
            tlk.text_by_ref_id(2).unwrap().to_string_lossy(),
            "Bonjour\r\nmonde"
        );
        assert!(logs_contain("skipping unknown string"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn import_with_split() -> Result<()> {
        let xml = r#"<GffTlk><str value="Hi"><ref>2</ref></str></GffTlk>"#;

        let mut tlk = sample();
        assert_eq!(tlk.import_xml(xml, true)?, 1);
        assert_eq!(tlk.text_by_ref_id(1).unwrap().to_string_lossy(), "Hello");
        assert_eq!(tlk.text_by_ref_id(2).unwrap().to_string_lossy(), "Hi");
        assert_eq!(tlk.records().len(), 3);

        Ok(())
    }

    #[test]
    fn import_malformed_document() {
        let mut tlk = sample();
        let result = tlk.import_xml("<GffTlk><str value=\"x></GffTlk>", false);
        assert!(matches!(
            result,
            Err(Error::XmlError(_)) | Err(Error::XmlAttrError(_))
        ));
    }
}
