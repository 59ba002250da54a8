//! Error types for container extraction and conversion.

/// Error during export-file processing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExportError {
    /// I/O error reading the export or writing output.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// XML parsing error in the container.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Base64 decoding error in a resource payload.
    #[error("base64 decode error")]
    Base64(#[from] base64::DecodeError),

    /// Note body rendering error.
    #[error("render error: {0}")]
    Render(#[from] enmark_renderer::RenderError),

    /// Note content carries no `en-note` element.
    #[error("note content has no en-note element")]
    MissingEnNote,
}
