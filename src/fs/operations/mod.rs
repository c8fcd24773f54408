//! Filesystem operations split into focused modules.

mod browse;
mod content;
mod dir_ops;
mod stat;

pub use content::{ContentReader, ContentWriter};
