//! Core of template-faithful slide synthesis: the template manifest, layout
//! resolution, placeholder location, styling, and the per-slide pipeline
//! that drives a [`DocumentModel`].

pub mod assets;
pub mod config;
pub mod content;
pub mod degrade;
pub mod document;
pub mod error;
pub mod locator;
pub mod manifest;
pub mod resolver;
pub mod styling;
pub mod synth;
pub mod types;

pub use config::SynthesisPolicy;
pub use content::{fallback_blocks, parse_content_plan, ContentGenerator, ContentPlan};
pub use degrade::{DegradeEvent, DegradeKind, DegradeLog};
pub use document::{DocumentModel, MemoryDeck};
pub use error::{CollaboratorError, DocumentError, Error, Result};
pub use manifest::{BuiltManifest, ManifestBuilder, ManifestNormalizer, ManifestSource};
pub use resolver::LayoutResolver;
pub use synth::{build_deck, DeckBuild, SlideSynthesizer, SynthesisReport};
pub use types::{ContentBlock, Manifest, RawTemplateData};
