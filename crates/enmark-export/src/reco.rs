//! Recognition-index parsing.
//!
//! A note resource may carry a `recognition` block: a standalone XML document
//! whose root `recoIndex` element names the resource's object id and pixel
//! dimensions. Only the root element's attributes matter here; the recognized
//! text candidates below it are ignored.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::ExportError;

/// Metadata from one recognition block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoIndex {
    /// Object id the note body references via `en-media hash=`.
    pub object_id: Option<String>,
    /// Document type (e.g. `unknown`, `printed`).
    pub doc_type: Option<String>,
    /// Object type (e.g. `image`).
    pub obj_type: Option<String>,
    /// Recognition language.
    pub lang: Option<String>,
    /// Pixel width; 0 when absent or malformed.
    pub width: u32,
    /// Pixel height; 0 when absent or malformed.
    pub height: u32,
}

impl RecoIndex {
    /// Parse a recognition block.
    ///
    /// A document without a `recoIndex` element parses to the default value;
    /// the caller falls back to payload-derived identity in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not well-formed XML.
    pub fn parse(xml: &str) -> Result<RecoIndex, ExportError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.name().as_ref() != b"recoIndex" {
                        continue;
                    }
                    let mut reco = RecoIndex::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = attr.unescape_value().map_or_else(
                            |_| String::from_utf8_lossy(&attr.value).into_owned(),
                            std::borrow::Cow::into_owned,
                        );
                        match attr.key.as_ref() {
                            b"objID" => reco.object_id = Some(value),
                            b"docType" => reco.doc_type = Some(value),
                            b"objType" => reco.obj_type = Some(value),
                            b"lang" => reco.lang = Some(value),
                            b"objWidth" => reco.width = value.parse().unwrap_or(0),
                            b"objHeight" => reco.height = value.parse().unwrap_or(0),
                            _ => {}
                        }
                    }
                    return Ok(reco);
                }
                Event::Eof => return Ok(RecoIndex::default()),
                _ => {}
            }
        }
    }
}
