//! Event source: XHTML fragment to element-event stream.
//!
//! Parses one fragment with a pull reader and materializes the flat
//! open/text/close event list the render engine consumes. The fragment is
//! implicitly wrapped in a root `div` so bare text and sibling elements are
//! well-formed XML.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{convert_html_entities, decode_entity};
use crate::error::RenderError;
use crate::tag::Tag;

/// One element attribute. Attributes keep their document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written in the markup.
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

/// The ordered attribute list of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrList(Vec<Attribute>);

impl AttrList {
    /// Look up an attribute by name; the first match wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether the element carries a `style` attribute with content.
    #[must_use]
    pub fn style(&self) -> Option<&str> {
        self.get("style").filter(|s| !s.is_empty())
    }
}

impl FromIterator<Attribute> for AttrList {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        AttrList(iter.into_iter().collect())
    }
}

/// One element event of a parsed fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XhtmlEvent {
    /// An opening tag with its attributes.
    Open {
        /// The element tag.
        tag: Tag,
        /// The element's attributes in document order.
        attrs: AttrList,
    },
    /// A text payload.
    Text(String),
    /// A closing tag.
    Close(Tag),
}

/// Parse an XHTML fragment into its element-event stream.
///
/// Self-closing elements produce an open event immediately followed by a
/// close event. Named HTML entities are converted to Unicode up front;
/// standard XML entities and numeric character references become text events.
///
/// # Errors
///
/// Returns an error if the fragment cannot be parsed as XML.
pub fn parse_fragment(fragment: &str) -> Result<Vec<XhtmlEvent>, RenderError> {
    let wrapped = format!("<div>{}</div>", convert_html_entities(fragment));

    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    let mut events = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let (tag, attrs) = decode_element(&reader, &e)?;
                events.push(XhtmlEvent::Open { tag, attrs });
            }
            Event::Empty(e) => {
                let (tag, attrs) = decode_element(&reader, &e)?;
                events.push(XhtmlEvent::Open {
                    tag: tag.clone(),
                    attrs,
                });
                events.push(XhtmlEvent::Close(tag));
            }
            Event::End(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                events.push(XhtmlEvent::Close(Tag::from_name(&name)));
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                events.push(XhtmlEvent::Text(text));
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                events.push(XhtmlEvent::Text(decode_entity(&entity)));
            }
            Event::CData(e) => {
                events.push(XhtmlEvent::Text(String::from_utf8_lossy(&e).into_owned()));
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
    Ok(events)
}

fn decode_element<R: BufRead>(
    reader: &Reader<R>,
    e: &BytesStart,
) -> Result<(Tag, AttrList), RenderError> {
    let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let name = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.push(Attribute { name, value });
    }
    Ok((Tag::from_name(&name), attrs.into_iter().collect()))
}
