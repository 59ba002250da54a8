//! Note-export container extraction and conversion pipeline.
//!
//! One `.enex` export file holds many notes; each note carries its body as an
//! XHTML fragment plus base64-encoded binary resources. [`convert_file`]
//! streams the container, renders each note body to Markdown with
//! [`enmark_renderer`], decodes resources into an attachments directory, and
//! replaces the renderer's media placeholder tokens with real file names and
//! clamped image dimensions before writing one document per note.
//!
//! A failure converting one note never aborts the batch: that note's output
//! document becomes a visible error marker instead.

mod error;
mod note;
mod reader;
mod reco;
mod resource;
mod substitute;

pub use error::ExportError;
pub use note::NoteMeta;
pub use reader::{ExportOptions, ExportSummary, convert_file};
pub use reco::RecoIndex;
pub use resource::MediaResource;
pub use substitute::{DEFAULT_MAX_IMAGE_WIDTH, clamp_dimensions, substitute};
