//! Checksum-verified copy
//!
//! Single files go through [`copy_file`]; whole index folders go through
//! [`copy_tree`], which records every file in the snapshot's manifest.

mod file;
mod tree;

pub use file::{copy_file, verify_file, CopyOutcome};
pub use tree::{copy_tracked, copy_tree, CopyStats};
