//! Domain layer: beam model, puzzle parsing and the analysis passes
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod inference;
pub mod layout;

pub use arena::{BeamNode, BeamTree, Placement, UnknownWeight};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use inference::{infer_missing_weight, infer_missing_weight_from, Inference, Resolution};
pub use layout::{compute_layout_scales, required_scale, LayoutParams, DEFAULT_LAYOUT_SCALE};
