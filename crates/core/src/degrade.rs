//! Structured record of every recovered failure in a build.

use serde::Serialize;
use std::fmt;

/// Which recovery path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeKind {
    /// Assisted manifest was missing or invalid; the fallback manifest is in use.
    ManifestValidation,
    /// The chosen layout had no document counterpart; an ordinal default was used.
    LayoutResolutionMiss,
    /// A text role (title or body) had no shape on the slide.
    PlaceholderMiss,
    /// A single formatting attribute could not be applied.
    StylingFailure,
    /// A template asset could not be placed.
    AssetFailure,
    /// The slide was rebuilt as a title-only substitute.
    SlideSubstituted,
}

impl DegradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManifestValidation => "manifest_validation",
            Self::LayoutResolutionMiss => "layout_resolution_miss",
            Self::PlaceholderMiss => "placeholder_miss",
            Self::StylingFailure => "styling_failure",
            Self::AssetFailure => "asset_failure",
            Self::SlideSubstituted => "slide_substituted",
        }
    }
}

/// One recovered failure. `slide` is `None` for deck-level events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradeEvent {
    pub slide: Option<usize>,
    pub kind: DegradeKind,
    pub detail: String,
}

impl fmt::Display for DegradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slide {
            Some(idx) => write!(f, "slide {}: {}: {}", idx + 1, self.kind.as_str(), self.detail),
            None => write!(f, "{}: {}", self.kind.as_str(), self.detail),
        }
    }
}

/// Append-only list of degrade events, mirrored to the log as they happen.
#[derive(Debug, Clone, Default)]
pub struct DegradeLog {
    events: Vec<DegradeEvent>,
}

impl DegradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event for a slide (or the whole deck when `slide` is `None`).
    pub fn record(&mut self, slide: Option<usize>, kind: DegradeKind, detail: impl Into<String>) {
        let event = DegradeEvent {
            slide,
            kind,
            detail: detail.into(),
        };
        log::warn!("degraded: {}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[DegradeEvent] {
        &self.events
    }

    pub fn count(&self, kind: DegradeKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn into_events(self) -> Vec<DegradeEvent> {
        self.events
    }
}
