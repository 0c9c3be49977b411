//! Office Open XML (OOXML) format implementation.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): ZIP container, relationships, content types
//! 2. **Shared Parts** (`common`): document properties
//! 3. **Format-Specific Modules**:
//!    - `xlsx`: streaming spreadsheet writer
pub mod common;
pub mod opc;
pub mod xlsx;

// Re-export common utilities
pub use common::DocumentProperties;
