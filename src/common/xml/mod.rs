//! XML text helpers shared by every part generator.

mod escape;

pub use escape::escape_xml;
