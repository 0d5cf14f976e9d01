pub mod document;
pub mod errors;
pub mod parser;
pub mod serializer;

pub use document::{Comment, Document, Node, Property, Section};
pub use errors::IniError;
pub use parser::parse;
pub use serializer::{escape_key, escape_section_name, serialize};
