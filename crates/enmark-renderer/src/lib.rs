//! Markdown rendering engine for note-export XHTML fragments.
//!
//! The entry point is [`render`]: one XHTML fragment in, one Markdown string
//! out. The fragment is parsed into a flat event stream ([`events`]) and fed
//! through a stateful visitor ([`MarkupRenderer`]) that tracks list nesting,
//! table position (including row-span emulation), and inline formatting runs
//! while appending to a single output buffer.
//!
//! Embedded media is not resolved here: `en-media` elements render as
//! placeholder tokens (`{id}`, `{id}_width`, `{id}_height`) that a later
//! pass replaces once the referenced resources have been extracted. See
//! [`media`] for the token format.

mod entities;
mod error;
mod events;
mod media;
mod renderer;
mod state;
mod style;
mod tag;

pub use error::RenderError;
pub use events::{AttrList, Attribute, XhtmlEvent, parse_fragment};
pub use renderer::{MarkupRenderer, render};
pub use style::TextStyle;
pub use tag::Tag;
