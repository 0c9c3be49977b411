//! Parts shared by every Office Open XML package.

pub mod properties;

pub use properties::DocumentProperties;
