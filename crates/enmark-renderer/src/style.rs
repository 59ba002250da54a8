//! Inline text styling: resolution and Markdown style markers.
//!
//! A text run's style is resolved when its element closes, by merging inline
//! `style=` declarations from every currently-open ancestor with the global
//! toggles set by `<b>`/`<i>`/`<u>`. Each property is tri-state: `None`
//! inherits, `Some(true)` is active, and the first source to set a property
//! wins (ancestors are scanned root-first, toggles fill in what remains).

use crate::events::AttrList;

/// The fenced-block marker wrapped around monospace runs.
pub(crate) const CODE_FENCE: &str = "\n```\n";

/// Font size treated as "unstyled" when resolving `font-size` declarations.
pub(crate) const DEFAULT_FONT_SIZE: i32 = 12;

/// Global style toggles driven by `<b>`/`<i>`/`<u>` elements.
#[derive(Debug, Default)]
pub(crate) struct StyleToggles {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// The resolved style of one text run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    /// Bold, from `font-weight: bold` or a `<b>` toggle.
    pub bold: Option<bool>,
    /// Italic, from `font-style: italic` or an `<i>` toggle.
    pub italic: Option<bool>,
    /// Underline, from `text-decoration: underline` or a `<u>` toggle.
    pub underline: Option<bool>,
    /// Strikethrough, from `text-decoration: line-through`.
    pub strikethrough: Option<bool>,
    /// First non-empty `font-family` declaration seen.
    pub font_family: String,
    /// First `font-size` declaration differing from the default.
    pub font_size: Option<i32>,
}

impl TextStyle {
    /// Resolve the style in effect for the element on top of `attr_stack`.
    pub(crate) fn resolve(attr_stack: &[AttrList], toggles: &StyleToggles) -> TextStyle {
        let mut style = TextStyle::default();
        for attrs in attr_stack {
            if let Some(declarations) = attrs.style() {
                style.apply_declarations(declarations);
            }
        }
        if style.italic.is_none() && toggles.italic {
            style.italic = Some(true);
        }
        if style.bold.is_none() && toggles.bold {
            style.bold = Some(true);
        }
        if style.underline.is_none() && toggles.underline {
            style.underline = Some(true);
        }
        style
    }

    /// Whether the run renders inside a fenced code block.
    #[must_use]
    pub fn monospace(&self) -> bool {
        self.font_family.to_ascii_lowercase().contains("mono")
    }

    /// Fold one `style=` attribute value into this style. Properties already
    /// set by a closer scope are left alone.
    pub(crate) fn apply_declarations(&mut self, declarations: &str) {
        for declaration in declarations.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match property.trim() {
                "font-weight" => {
                    if self.bold.is_none() && value == "bold" {
                        self.bold = Some(true);
                    }
                }
                "font-style" => {
                    if self.italic.is_none() && value == "italic" {
                        self.italic = Some(true);
                    }
                }
                "text-decoration" => {
                    if self.underline.is_none() && value.contains("underline") {
                        self.underline = Some(true);
                    }
                    if self.strikethrough.is_none() && value.contains("line-through") {
                        self.strikethrough = Some(true);
                    }
                }
                "font-family" => {
                    if self.font_family.is_empty() && !value.is_empty() {
                        self.font_family = value.to_owned();
                    }
                }
                "font-size" => {
                    let size = value
                        .strip_suffix("px")
                        .unwrap_or(value)
                        .trim()
                        .parse::<i32>()
                        .unwrap_or(DEFAULT_FONT_SIZE);
                    if self.font_size.is_none() && size != DEFAULT_FONT_SIZE {
                        self.font_size = Some(size);
                    }
                }
                _ => {}
            }
        }
    }

    /// Markers emitted before the run's text (the monospace fence is handled
    /// separately because adjacent runs merge).
    pub(crate) fn opening_markers(&self) -> String {
        let mut markers = String::new();
        if self.italic == Some(true) && self.bold == Some(true) {
            markers.push_str("***");
        } else if self.italic == Some(true) {
            markers.push('_');
        } else if self.bold == Some(true) {
            markers.push_str("**");
        }
        if self.underline == Some(true) {
            markers.push_str("<u>");
        }
        if self.strikethrough == Some(true) {
            markers.push_str("~~");
        }
        markers
    }

    /// Markers emitted after the run's text, mirroring [`opening_markers`]
    /// in reverse order.
    ///
    /// [`opening_markers`]: TextStyle::opening_markers
    pub(crate) fn closing_markers(&self) -> String {
        let mut markers = String::new();
        if self.strikethrough == Some(true) {
            markers.push_str("~~");
        }
        if self.underline == Some(true) {
            markers.push_str("</u>");
        }
        if self.italic == Some(true) && self.bold == Some(true) {
            markers.push_str("***");
        } else if self.italic == Some(true) {
            markers.push('_');
        } else if self.bold == Some(true) {
            markers.push_str("**");
        }
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Attribute;

    fn attrs(style: &str) -> AttrList {
        [Attribute {
            name: "style".to_owned(),
            value: style.to_owned(),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn declarations_set_unset_properties_only() {
        let mut style = TextStyle::default();
        style.apply_declarations("font-weight: bold; text-decoration: underline line-through");
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.underline, Some(true));
        assert_eq!(style.strikethrough, Some(true));
        assert_eq!(style.italic, None);
    }

    #[test]
    fn font_size_strips_px_and_ignores_default() {
        let mut style = TextStyle::default();
        style.apply_declarations("font-size: 18px");
        assert_eq!(style.font_size, Some(18));

        let mut default_size = TextStyle::default();
        default_size.apply_declarations("font-size: 12px");
        assert_eq!(default_size.font_size, None);

        let mut garbage = TextStyle::default();
        garbage.apply_declarations("font-size: large");
        assert_eq!(garbage.font_size, None);
    }

    #[test]
    fn monospace_detection_is_case_insensitive() {
        let mut style = TextStyle::default();
        style.apply_declarations("font-family: Monaco");
        assert!(style.monospace());

        let mut serif = TextStyle::default();
        serif.apply_declarations("font-family: Georgia");
        assert!(!serif.monospace());
    }

    #[test]
    fn toggle_fills_in_when_declarations_are_silent() {
        let toggles = StyleToggles {
            bold: true,
            italic: false,
            underline: false,
        };
        let style = TextStyle::resolve(&[attrs("font-style: italic")], &toggles);
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.italic, Some(true));
    }

    #[test]
    fn ancestor_order_first_match_wins() {
        let outer = attrs("font-family: monospace");
        let inner = attrs("font-family: Georgia");
        let style = TextStyle::resolve(&[outer, inner], &StyleToggles::default());
        assert_eq!(style.font_family, "monospace");
    }

    #[test]
    fn marker_order_mirrors() {
        let style = TextStyle {
            bold: Some(true),
            italic: Some(true),
            underline: Some(true),
            strikethrough: Some(true),
            ..TextStyle::default()
        };
        assert_eq!(style.opening_markers(), "***<u>~~");
        assert_eq!(style.closing_markers(), "~~</u>***");
    }

    #[test]
    fn single_styles_use_their_own_markers() {
        let bold = TextStyle {
            bold: Some(true),
            ..TextStyle::default()
        };
        assert_eq!(bold.opening_markers(), "**");

        let italic = TextStyle {
            italic: Some(true),
            ..TextStyle::default()
        };
        assert_eq!(italic.opening_markers(), "_");
    }
}
