//! Forma Tokens - Match requested style values to tokens already in use
//!
//! Nearest-neighbour search over the inventory's token usage. Colors are
//! compared perceptually (CIELAB ΔE), spacing and radii numerically, and
//! every distance is discounted by how often the candidate is used.

mod matcher;

pub use matcher::{MatchThresholds, TokenMatch, TokenMatcher};
