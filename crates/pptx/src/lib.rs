//! PPTX (Office Open XML) template reader.
//!
//! Templates are ZIP archives of XML parts. This crate reads the slide size,
//! theme colors and fonts, layout placeholder geometry, and the pictures on
//! the template's own slides into [`deck_core::RawTemplateData`].

pub mod extractor;
pub mod package;
pub mod xml;

pub use extractor::TemplateExtractor;
