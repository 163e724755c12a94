//! Flat-file content store: markdown documents with a `---` metadata block,
//! one file per section.

pub mod collection;
pub mod document;
pub mod fields;
pub mod handlers;
pub mod loader;
pub mod models;

pub use loader::{ContentError, ContentStore, PageContent};
