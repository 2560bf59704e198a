//! Block and variable extraction and reinjection for UserStyle stylus sources.

pub mod classify;
pub mod extract;
pub mod model;
pub mod reconstruct;
pub mod unwrap;

pub use extract::{extract_file, ExtractOptions};
pub use model::Block;
pub use reconstruct::reconstruct_file;
pub use unwrap::unwrap_file;
