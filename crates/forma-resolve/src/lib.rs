//! Forma Resolve - Tiered component resolution
//!
//! Every component instance in an intent tree is run through an ordered
//! chain of strategies, from exact reference lookup down to a built-in
//! default style:
//! 1. `ExactReference` - id or key found verbatim
//! 2. `KeywordMatch` - keyword relevance against names and descriptions
//! 3. `StructuralMatch` - component anatomy against named archetypes
//! 4. `TokenApproximate` - styled container from token values in use
//! 5. `HardDefault` - fixed palette, always succeeds

mod anatomy;
mod keywords;
mod outcome;
mod resolver;
mod strategy;
mod summary;
mod tiers;

pub use anatomy::{Anatomy, Archetype};
pub use keywords::{extract_keywords, score_component, semantic_type_of};
pub use outcome::{Instruction, ResolutionOutcome, StyleDefaults};
pub use resolver::{ResolutionReport, Resolver};
pub use strategy::{ResolutionState, ResolutionStrategy, ResolveContext, ResolverConfig};
pub use summary::{CategorizedWarning, NodeResolution, QualityRating, ResolutionSummary};
pub use tiers::{ExactReference, HardDefault, KeywordMatch, StructuralMatch, TokenApproximate};
