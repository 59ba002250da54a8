//! Binary resource decoding and registration.
//!
//! Resources arrive as base64 text inside the container. Each one is decoded,
//! written into the note's attachments directory, and registered in the
//! note's media map so placeholder substitution can resolve the object id the
//! body referenced. The id comes from the recognition block when there is
//! one; otherwise the MD5 digest of the decoded payload is used, which is the
//! value `en-media hash=` carries.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use tracing::debug;

use crate::error::ExportError;
use crate::reco::RecoIndex;

/// One extracted resource, ready for placeholder substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaResource {
    /// File name of the decoded payload inside the attachments directory.
    pub file_name: Option<String>,
    /// Pixel width; 0 when unknown.
    pub width: u32,
    /// Pixel height; 0 when unknown.
    pub height: u32,
}

/// Accumulates one `resource` subtree while the container streams by.
#[derive(Debug, Default)]
pub(crate) struct ResourceBuilder {
    pub data: String,
    pub mime: Option<String>,
    pub width: u32,
    pub height: u32,
    pub file_name: Option<String>,
    pub reco: Option<RecoIndex>,
}

impl ResourceBuilder {
    /// Decode the payload, write it under `attachments_dir`, and return the
    /// `(object_id, resource)` pair to register in the note's media map.
    pub(crate) fn finalize(
        self,
        attachments_dir: &Path,
    ) -> Result<(String, MediaResource), ExportError> {
        let bytes = decode_base64(&self.data)?;
        let digest = format!("{:x}", Md5::digest(&bytes));

        let object_id = self
            .reco
            .as_ref()
            .and_then(|reco| reco.object_id.clone())
            .unwrap_or_else(|| digest.clone());
        let (width, height) = match &self.reco {
            Some(reco) if reco.width > 0 || reco.height > 0 => (reco.width, reco.height),
            _ => (self.width, self.height),
        };
        let file_name = self
            .file_name
            .unwrap_or_else(|| format!("{digest}{}", extension_for(self.mime.as_deref())));

        fs::create_dir_all(attachments_dir)?;
        fs::write(attachments_dir.join(&file_name), &bytes)?;
        debug!(%object_id, %file_name, "extracted resource");

        Ok((
            object_id,
            MediaResource {
                file_name: Some(file_name),
                width,
                height,
            },
        ))
    }
}

/// Decode a base64 payload, tolerating the line breaks and indentation the
/// container format wraps long payloads with.
pub(crate) fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(cleaned)
}

/// File extension for a resource MIME type.
pub(crate) fn extension_for(mime: Option<&str>) -> &'static str {
    match mime {
        Some("image/jpeg") => ".jpg",
        Some("image/png") => ".png",
        Some("image/gif") => ".gif",
        Some("application/pdf") => ".pdf",
        _ => ".bin",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn base64_decode_tolerates_whitespace() {
        assert_eq!(decode_base64("aGVs\n bG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn known_mime_types_map_to_extensions() {
        assert_eq!(extension_for(Some("image/jpeg")), ".jpg");
        assert_eq!(extension_for(Some("application/pdf")), ".pdf");
        assert_eq!(extension_for(Some("application/x-thing")), ".bin");
        assert_eq!(extension_for(None), ".bin");
    }

    #[test]
    fn finalize_prefers_recognition_identity() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ResourceBuilder {
            data: "aGVsbG8=".to_owned(),
            mime: Some("image/png".to_owned()),
            reco: Some(RecoIndex {
                object_id: Some("obj1".to_owned()),
                width: 640,
                height: 480,
                ..RecoIndex::default()
            }),
            ..ResourceBuilder::default()
        };
        let (id, resource) = builder.finalize(dir.path()).unwrap();
        assert_eq!(id, "obj1");
        assert_eq!(resource.width, 640);
        assert_eq!(resource.height, 480);
        let name = resource.file_name.unwrap();
        assert!(name.ends_with(".png"), "got: {name}");
        assert_eq!(fs::read(dir.path().join(&name)).unwrap(), b"hello");
    }

    #[test]
    fn finalize_falls_back_to_payload_digest() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ResourceBuilder {
            data: "aGVsbG8=".to_owned(),
            width: 10,
            height: 20,
            ..ResourceBuilder::default()
        };
        let (id, resource) = builder.finalize(dir.path()).unwrap();
        // MD5 of "hello"
        assert_eq!(id, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(resource.file_name.as_deref(), Some("5d41402abc4b2a76b9719d911017c592.bin"));
        assert_eq!(resource.width, 10);
        assert_eq!(resource.height, 20);
    }

    #[test]
    fn declared_file_name_wins() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ResourceBuilder {
            data: "aGVsbG8=".to_owned(),
            file_name: Some("photo.jpg".to_owned()),
            ..ResourceBuilder::default()
        };
        let (_, resource) = builder.finalize(dir.path()).unwrap();
        assert_eq!(resource.file_name.as_deref(), Some("photo.jpg"));
        assert!(dir.path().join("photo.jpg").exists());
    }
}
