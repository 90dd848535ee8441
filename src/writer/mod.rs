//! Binary output: container files, placeholders and the index trailer.
pub mod bin;
pub mod index;

pub use bin::{Container, ContainerWriter, Placeholder, WriterError};
pub use index::IndexTable;
