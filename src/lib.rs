//! tweeks-sync - export userscripts from the Tweeks by NextByte Chrome
//! extension into a git repository
//!
//! The interesting work is in two modules: `store` recovers records from a
//! LevelDB store that may be locked, damaged, or half-written, and `export`
//! reconciles what was recovered against the previous run so filenames stay
//! stable and nothing already exported is ever lost. The rest is plumbing
//! around those two.

pub mod browser;
pub mod cli;
pub mod config;
pub mod destination;
pub mod export;
pub mod script;
pub mod store;
pub mod vcs;
