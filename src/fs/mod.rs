//! Filesystem emulation over the object store.

pub mod mime;
pub(crate) mod node;
mod operations;
mod path;

pub use node::FileStat;
pub use operations::{ContentReader, ContentWriter};
pub use path::PathCodec;
