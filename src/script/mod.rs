//! Userscript record handling
//!
//! A recovered record is an identifier plus the full script text. This
//! module derives everything else from the text: the header attribute
//! mapping and the display name used for filenames.

mod metadata;

pub use metadata::{display_name, parse_metadata, Metadata, MetadataValue};
