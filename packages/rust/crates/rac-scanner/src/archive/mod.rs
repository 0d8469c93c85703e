//! Archive Module
//!
//! Scans, filters and lints the directory of captured documents.

pub mod lint;
pub mod scanner;
pub mod types;
