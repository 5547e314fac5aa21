//! Model Module - trained scorers behind a narrow interface
//!
//! Scorers are loaded once and shared read-only. Swapping the artifact
//! format only touches `linear.rs`.

pub mod linear;
pub mod registry;
pub mod scorer;

// Re-export common types
pub use linear::{LinearScorer, Link, ModelLoadError};
pub use registry::{ModelRegistry, ModelRole, ModelStatus, RegistryStatus};
pub use scorer::{FnScorer, ScoreError, Scorer};
