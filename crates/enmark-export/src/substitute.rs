//! Placeholder substitution: the second pass over rendered Markdown.
//!
//! The renderer emits `{id}`, `{id}_width`, and `{id}_height` tokens because
//! resource metadata may not have been parsed yet when a media reference
//! renders. Once the whole note has been extracted, this pass replaces the
//! tokens with resolved file names and clamped image dimensions.

use std::collections::HashMap;

use tracing::warn;

use crate::resource::MediaResource;

/// Default maximum rendered image width in pixels.
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 600;

/// Replace every media placeholder token with its resolved value.
///
/// Dimension tokens are replaced before the bare id token so `{id}_width`
/// never loses its suffix to the shorter match. A resource without a
/// resolved file name leaves its id token in place.
#[must_use]
pub fn substitute(
    markdown: &str,
    media: &HashMap<String, MediaResource>,
    max_width: u32,
) -> String {
    let mut result = markdown.to_owned();
    for (id, resource) in media {
        let (width, height) = clamp_dimensions(resource.width, resource.height, max_width);
        result = result.replace(&format!("{id}_width"), &width.to_string());
        result = result.replace(&format!("{id}_height"), &height.to_string());
        match &resource.file_name {
            Some(file_name) => result = result.replace(id.as_str(), file_name),
            None => warn!(%id, "no file name resolved for media object"),
        }
    }
    result
}

/// Scale dimensions down to `max_width`, preserving the aspect ratio.
/// Dimensions within the limit pass through unchanged.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width > max_width {
        let scale = f64::from(max_width) / f64::from(width);
        (max_width, (f64::from(height) * scale).round() as u32)
    } else {
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn media(id: &str, resource: MediaResource) -> HashMap<String, MediaResource> {
        HashMap::from([(id.to_owned(), resource)])
    }

    #[test]
    fn oversized_images_scale_to_max_width() {
        assert_eq!(clamp_dimensions(1200, 800, 600), (600, 400));
    }

    #[test]
    fn small_images_pass_through() {
        assert_eq!(clamp_dimensions(400, 300, 600), (400, 300));
    }

    #[test]
    fn scaled_height_rounds() {
        // 500 * (600/900) = 333.33…
        assert_eq!(clamp_dimensions(900, 500, 600), (600, 333));
    }

    #[test]
    fn replaces_dimension_tokens_before_the_id() {
        let markdown = "<img src=\"ab12\" alt=\"ab12\" width=\"ab12_width\" height=\"ab12_height\" />";
        let out = substitute(
            markdown,
            &media(
                "ab12",
                MediaResource {
                    file_name: Some("photo.jpg".to_owned()),
                    width: 1200,
                    height: 800,
                },
            ),
            DEFAULT_MAX_IMAGE_WIDTH,
        );
        assert_eq!(
            out,
            "<img src=\"photo.jpg\" alt=\"photo.jpg\" width=\"600\" height=\"400\" />"
        );
    }

    #[test]
    fn unresolved_file_name_keeps_the_id_token() {
        let out = substitute(
            "![ab12](ab12 \"ab12\")",
            &media(
                "ab12",
                MediaResource {
                    file_name: None,
                    width: 0,
                    height: 0,
                },
            ),
            DEFAULT_MAX_IMAGE_WIDTH,
        );
        assert_eq!(out, "![ab12](ab12 \"ab12\")");
    }
}
