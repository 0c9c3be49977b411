/// Open Packaging Conventions (OPC) writing support.
///
/// A spreadsheet package is a ZIP archive holding XML parts, a
/// `[Content_Types].xml` index and relationship parts. This module provides
/// the pieces needed to emit one sequentially:
///
/// - Content type management (`pkgwriter`)
/// - Relationship parts (`rel`)
/// - ZIP-based physical packaging (`phys_pkg`)
pub mod constants;
pub mod phys_pkg;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use phys_pkg::{Compression, PhysPkgWriter};
pub use pkgwriter::ContentTypes;
pub use rel::{Relationship, Relationships};
