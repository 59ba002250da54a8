//! Media placeholder emission.
//!
//! Embedded resources are referenced by hash before their payloads have been
//! extracted, so the engine emits literal placeholder tokens (`{id}`,
//! `{id}_width`, `{id}_height`) and leaves substitution to a second pass
//! that runs once real file names and dimensions are known.

use std::fmt::Write;

use tracing::warn;

use crate::events::AttrList;

/// Emit the placeholder for one `en-media` element.
///
/// Image resources become an HTML `img` tag whose source, alt text, and
/// dimension attributes are all placeholder tokens; everything else becomes
/// a Markdown link-style placeholder. Elements without a `hash` attribute
/// reference nothing and are skipped.
pub(crate) fn emit_placeholder(out: &mut String, attrs: &AttrList) {
    let Some(hash) = attrs.get("hash") else {
        warn!("media element without hash attribute, skipping");
        return;
    };
    let is_image = attrs
        .get("type")
        .is_some_and(|mime| mime.starts_with("image"));
    if is_image {
        let _ = write!(
            out,
            "<img src=\"{hash}\" alt=\"{hash}\" width=\"{hash}_width\" height=\"{hash}_height\" /><br />"
        );
    } else {
        let _ = write!(out, "![{hash}]({hash} \"{hash}\")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Attribute;

    fn media_attrs(hash: &str, mime: &str) -> AttrList {
        [
            Attribute {
                name: "hash".to_owned(),
                value: hash.to_owned(),
            },
            Attribute {
                name: "type".to_owned(),
                value: mime.to_owned(),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn image_placeholder_uses_dimension_tokens() {
        let mut out = String::new();
        emit_placeholder(&mut out, &media_attrs("abc123", "image/jpeg"));
        assert_eq!(
            out,
            "<img src=\"abc123\" alt=\"abc123\" width=\"abc123_width\" height=\"abc123_height\" /><br />"
        );
    }

    #[test]
    fn attachment_placeholder_is_a_link() {
        let mut out = String::new();
        emit_placeholder(&mut out, &media_attrs("abc123", "application/pdf"));
        assert_eq!(out, "![abc123](abc123 \"abc123\")");
    }

    #[test]
    fn missing_type_renders_as_attachment() {
        let mut out = String::new();
        let attrs: AttrList = [Attribute {
            name: "hash".to_owned(),
            value: "abc".to_owned(),
        }]
        .into_iter()
        .collect();
        emit_placeholder(&mut out, &attrs);
        assert_eq!(out, "![abc](abc \"abc\")");
    }

    #[test]
    fn missing_hash_emits_nothing() {
        let mut out = String::new();
        emit_placeholder(&mut out, &AttrList::default());
        assert!(out.is_empty());
    }
}
