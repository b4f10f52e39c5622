// Output generation module

pub mod context;
pub mod document;
pub mod templates;
pub mod writer;

pub use context::ReadmeContext;
pub use document::*;
pub use templates::*;
pub use writer::*;
