//! Browser-side collaborators
//!
//! Everything that touches Chrome itself: locating profiles and their
//! extension stores on disk, verifying the installed extension, and
//! asking a running browser to quit so the store lock is released.

pub mod process;
pub mod profiles;

pub use profiles::{chrome_support_dir, discover, verify_extension, ProfileStore, EXTENSION_ID};
