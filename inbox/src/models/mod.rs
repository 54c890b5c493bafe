mod document;
mod extraction;

pub use document::*;
pub use extraction::*;
