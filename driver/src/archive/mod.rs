pub mod json;

pub use json::{ArchiveDocument, JsonArchive, JsonArchiveReader, JsonArchiveWriter};
