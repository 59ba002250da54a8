//! Streaming extraction of one export container.
//!
//! The container is a single XML document holding many notes. It is streamed
//! with a pull reader; note metadata, the body fragment, and resource
//! payloads are collected per note, and each `note` close triggers the
//! convert-substitute-persist sequence. Conversion failures are contained at
//! the note boundary: the note's output becomes an error marker and the
//! batch continues.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::note::{self, NoteMeta};
use crate::reco::RecoIndex;
use crate::resource::{MediaResource, ResourceBuilder};
use crate::substitute::{DEFAULT_MAX_IMAGE_WIDTH, substitute};

/// Conversion options for one export file.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Output directory; derived from the export file name when `None`.
    pub output_dir: Option<PathBuf>,
    /// Maximum rendered image width in pixels.
    pub max_image_width: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            output_dir: None,
            max_image_width: DEFAULT_MAX_IMAGE_WIDTH,
        }
    }
}

/// Outcome of converting one export file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Notes written, error markers included.
    pub notes: usize,
    /// Notes whose body failed to convert and became error markers.
    pub failures: usize,
}

/// Convert every note in one `.enex` export file.
///
/// # Errors
///
/// Returns an error when the container itself cannot be read or parsed, or
/// when an output document cannot be written. Per-note conversion failures
/// are reported in the summary instead.
pub fn convert_file(path: &Path, options: &ExportOptions) -> Result<ExportSummary, ExportError> {
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| path.with_extension(""));
    fs::create_dir_all(&output_dir)?;
    info!(file = %path.display(), out = %output_dir.display(), "converting export");

    let mut reader = Reader::from_reader(BufReader::new(File::open(path)?));
    reader.config_mut().trim_text(false);

    let mut state = ExportReader::new(&output_dir, options.max_image_width);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                state.open_element(&name);
            }
            Event::End(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                state.close_element(&name)?;
            }
            Event::Empty(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                state.open_element(&name);
                state.close_element(&name)?;
            }
            Event::Text(e) => state.text(reader.decoder().decode(&e)?.as_ref()),
            Event::CData(e) => state.text(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                state.text(&decode_entity(&entity));
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
    Ok(state.summary)
}

/// One note being collected from the stream.
#[derive(Debug, Default)]
struct NoteState {
    meta: NoteMeta,
    content: Option<String>,
    media: HashMap<String, MediaResource>,
}

impl NoteState {
    /// Output file name; untitled notes still get a valid name.
    fn file_name(&self) -> String {
        let title = if self.meta.title.is_empty() {
            "Untitled"
        } else {
            &self.meta.title
        };
        note::note_file_name(title, self.meta.web_clip)
    }
}

/// Streaming state over one container document.
struct ExportReader<'a> {
    output_dir: &'a Path,
    max_width: u32,
    note: Option<NoteState>,
    resource: Option<ResourceBuilder>,
    current_value: String,
    summary: ExportSummary,
}

impl<'a> ExportReader<'a> {
    fn new(output_dir: &'a Path, max_width: u32) -> Self {
        ExportReader {
            output_dir,
            max_width,
            note: None,
            resource: None,
            current_value: String::new(),
            summary: ExportSummary::default(),
        }
    }

    fn open_element(&mut self, name: &str) {
        self.current_value.clear();
        match name {
            "note" => self.note = Some(NoteState::default()),
            "resource" => self.resource = Some(ResourceBuilder::default()),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        self.current_value.push_str(text);
    }

    fn close_element(&mut self, name: &str) -> Result<(), ExportError> {
        match name {
            "title" => {
                if let Some(note) = &mut self.note {
                    note.meta.title = std::mem::take(&mut self.current_value);
                }
            }
            "content" => {
                if let Some(note) = &mut self.note {
                    note.content = Some(std::mem::take(&mut self.current_value));
                }
            }
            "created" => {
                if let Some(note) = &mut self.note {
                    note.meta.created = note::parse_timestamp(self.current_value.trim());
                }
            }
            "updated" => {
                if let Some(note) = &mut self.note {
                    note.meta.updated = note::parse_timestamp(self.current_value.trim());
                }
            }
            "source" => {
                if let Some(note) = &mut self.note {
                    if self.current_value == "web.clip" {
                        note.meta.web_clip = true;
                    }
                }
            }
            "data" => {
                if let Some(resource) = &mut self.resource {
                    resource.data = std::mem::take(&mut self.current_value);
                }
            }
            "mime" => {
                if let Some(resource) = &mut self.resource {
                    resource.mime = Some(std::mem::take(&mut self.current_value));
                }
            }
            "width" => {
                if let Some(resource) = &mut self.resource {
                    resource.width = self.current_value.trim().parse().unwrap_or(0);
                }
            }
            "height" => {
                if let Some(resource) = &mut self.resource {
                    resource.height = self.current_value.trim().parse().unwrap_or(0);
                }
            }
            "file-name" => {
                if let Some(resource) = &mut self.resource {
                    resource.file_name = Some(std::mem::take(&mut self.current_value));
                }
            }
            "recognition" => {
                if let Some(resource) = &mut self.resource {
                    resource.reco = match RecoIndex::parse(&self.current_value) {
                        Ok(reco) => Some(reco),
                        Err(err) => {
                            warn!(%err, "unparseable recognition block");
                            None
                        }
                    };
                }
            }
            "resource" => self.close_resource(),
            "note" => {
                if let Some(note) = self.note.take() {
                    self.save_note(note)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Decode the finished resource and register it in the note's media map.
    /// A resource that fails to decode is dropped with a warning; its
    /// placeholder (if any) stays unresolved in the note body.
    fn close_resource(&mut self) {
        let Some(resource) = self.resource.take() else {
            return;
        };
        let Some(note) = &mut self.note else {
            return;
        };
        let attachments_dir = self
            .output_dir
            .join(format!("{}.attachments", note.file_name()));
        match resource.finalize(&attachments_dir) {
            Ok((object_id, media)) => {
                note.media.insert(object_id, media);
            }
            Err(err) => warn!(%err, "could not extract resource"),
        }
    }

    fn save_note(&mut self, note: NoteState) -> Result<(), ExportError> {
        let file_name = note.file_name();
        let content = note.content.unwrap_or_default();
        let body = if note.meta.web_clip {
            match en_note_fragment(&content) {
                Ok(fragment) => note::html_document(&note.meta.title, fragment),
                Err(err) => self.error_marker(&note.meta.title, &err),
            }
        } else {
            match self.convert(&content, &note.media) {
                Ok(markdown) => markdown,
                Err(err) => self.error_marker(&note.meta.title, &err),
            }
        };

        let path = self.output_dir.join(file_name);
        fs::write(&path, body)?;
        if let Err(err) = note::apply_file_times(&path, &note.meta) {
            warn!(%err, "could not restore note timestamps");
        }
        self.summary.notes += 1;
        info!(title = %note.meta.title, file = %path.display(), "note converted");
        Ok(())
    }

    fn convert(
        &self,
        content: &str,
        media: &HashMap<String, MediaResource>,
    ) -> Result<String, ExportError> {
        let fragment = en_note_fragment(content)?;
        let markdown = enmark_renderer::render(fragment)?;
        Ok(substitute(&markdown, media, self.max_width))
    }

    fn error_marker(&mut self, title: &str, err: &ExportError) -> String {
        warn!(title = %title, %err, "note conversion failed");
        self.summary.failures += 1;
        format!("error converting note content: {err}")
    }
}

/// Slice the body fragment out of a note's content document: everything
/// between the `en-note` open tag and its close tag.
fn en_note_fragment(content: &str) -> Result<&str, ExportError> {
    let start = content.find("<en-note").ok_or(ExportError::MissingEnNote)?;
    let element = &content[start..];
    let end = element.find("</en-note>").ok_or(ExportError::MissingEnNote)?;
    let element = &element[..end];
    let body_start = element.find('>').map(|i| i + 1).ok_or(ExportError::MissingEnNote)?;
    Ok(&element[body_start..])
}

/// Decode a standard XML entity or numeric character reference appearing in
/// container-level text (note titles and the like).
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn en_note_fragment_slices_the_body() {
        let content = concat!(
            "<?xml version=\"1.0\"?>",
            "<!DOCTYPE en-note SYSTEM \"http://xml.evernote.com/pub/enml2.dtd\">",
            "<en-note style=\"word-wrap: break-word\"><div>body</div></en-note>",
        );
        assert_eq!(en_note_fragment(content).unwrap(), "<div>body</div>");
    }

    #[test]
    fn content_without_en_note_is_an_error() {
        assert!(matches!(
            en_note_fragment("<html>nope</html>"),
            Err(ExportError::MissingEnNote)
        ));
    }

    #[test]
    fn decode_entity_handles_standard_and_numeric() {
        assert_eq!(decode_entity("amp"), "&");
        assert_eq!(decode_entity("#xE9"), "\u{e9}");
        assert_eq!(decode_entity("nope"), "&nope;");
    }
}
