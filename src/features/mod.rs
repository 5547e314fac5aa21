//! Features Module - profile encoding for the trained scorers
//!
//! Layouts, lookup tables and the mapper that turns a `UserProfile` into a
//! schema-specific `FeatureVector`.

pub mod layout;
pub mod mapper;
pub mod tables;
pub mod vector;


// Re-export common types
pub use layout::{LayoutInfo, LayoutMismatchError, SchemaKind, LAYOUT_VERSION};
pub use mapper::{FeatureMapper, Mappers, MappingSchema};
pub use tables::{LookupTable, LookupTables};
pub use vector::{FeatureValue, FeatureVector};
