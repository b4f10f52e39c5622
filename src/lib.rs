//! readmegen - Generate a README from a scan of your project
//!
//! Walks a project tree, classifies files by technology, counts lines and
//! renders the totals into a fixed-layout Markdown README, with an optional
//! JSON metadata file alongside.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod info;
pub mod output;
pub mod pipeline;

// Re-export main types
pub use analysis::{Analyzer, ProjectSummary};
pub use config::Config;
pub use error::{Error, Result};
pub use info::ProjectInfo;
pub use output::{Document, Renderer};
pub use pipeline::{Pipeline, RunReport};
