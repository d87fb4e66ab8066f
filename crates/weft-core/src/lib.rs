pub mod emitter;
pub mod error;
pub mod id;
pub mod merge;
pub mod model;
pub mod parser;
pub mod source;
pub mod tree;

pub use emitter::{generate, generate_component_file, generate_imports};
pub use error::{MergeError, ParseError, SnapshotMergeError};
pub use id::ElementId;
pub use merge::{MergeOptions, SnapshotMerge, SnapshotMergeRequest, merge_into_existing_file};
pub use model::*;
pub use parser::parse;
pub use source::extract_return_markup;
pub use tree::InsertPosition;
