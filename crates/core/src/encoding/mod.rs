//! Applying learned merges to raw bytes.
//!
//! Byte-level encoding treats each chunk as UTF-8 bytes (ids 0-255) and
//! replays merges in rank order.

pub mod byte_level;

pub use byte_level::ByteLevelEncoder;
