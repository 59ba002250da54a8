//! Per-note metadata and output persistence.

use std::fs::{File, FileTimes};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Metadata of one note in the export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMeta {
    /// Note title, used to derive the output file name.
    pub title: String,
    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,
    /// Last-update timestamp, restored onto the output file.
    pub updated: Option<DateTime<Utc>>,
    /// Web clips keep their captured HTML instead of converting to Markdown.
    pub web_clip: bool,
}

/// Parse the container's compact UTC timestamp format (`20190801T123456Z`).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ") {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            warn!(value, %err, "unparseable note timestamp");
            None
        }
    }
}

/// Derive the output file name from a note title.
///
/// Path separators are replaced with spaces and the runs of doubled spaces
/// that leaves behind are collapsed.
pub(crate) fn note_file_name(title: &str, web_clip: bool) -> String {
    let extension = if web_clip { "html" } else { "md" };
    let mut name = format!("{title}.{extension}")
        .replace('/', " ")
        .replace('\\', " ");
    while name.contains("  ") {
        name = name.replace("  ", " ");
    }
    name
}

/// Wrap a web clip's captured body in a minimal HTML document.
pub(crate) fn html_document(title: &str, body: &str) -> String {
    format!(
        "<html>\n<head>\n    <meta charset=\"utf-8\"/>\n    <title>{title}</title>\n</head>\n<body>\n{body}</body></html>"
    )
}

/// Restore the note's update time onto the written file.
///
/// Creation time is not portably settable and is skipped; on the filesystems
/// where it matters the attempt fails silently anyway.
pub(crate) fn apply_file_times(path: &Path, meta: &NoteMeta) -> std::io::Result<()> {
    let Some(updated) = meta.updated else {
        return Ok(());
    };
    let updated = std::time::SystemTime::from(updated);
    let file = File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_accessed(updated).set_modified(updated))
}
