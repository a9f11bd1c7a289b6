//! Pre-tokenization pipeline.
//!
//! Text is first cut at special-token literals allowed by the caller, then
//! each ordinary span is split into chunks. Merges never cross either kind
//! of boundary.

pub mod special;
pub mod split;

pub use special::{AllowedSpecial, Span, SpecialTokenPolicy};
pub use split::Chunker;
