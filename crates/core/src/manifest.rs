//! Manifest construction: validate an assisted candidate, or fall back deterministically.
//!
//! The assisted step (usually a language model) is unreliable, so its output is
//! treated as untrusted text. Anything that fails validation is replaced by a
//! manifest built purely from the raw template data, which always succeeds.

use crate::degrade::{DegradeKind, DegradeLog};
use crate::error::CollaboratorError;
use crate::types::{
    Archetype, Asset, BodyStyle, Manifest, ManifestLayout, ManifestPlaceholder, ManifestTheme,
    Palette, RawTemplateData, Rect, Rules, SlideSize, TextDefaults, ThemeFonts, TitleStyle,
};
use serde::Serialize;
use thiserror::Error;

/// Top-level keys every manifest candidate must carry.
pub const REQUIRED_KEYS: [&str; 6] = [
    "slide_size",
    "theme",
    "layouts",
    "text_defaults",
    "assets",
    "rules",
];

const FALLBACK_FAMILY: &str = "Calibri";
const FALLBACK_TITLE_SIZE_PT: f64 = 32.0;
const FALLBACK_BODY_SIZE_PT: f64 = 18.0;
const FALLBACK_LOGO_POLICY: &str = "Apply logos as found in template";

/// Why an assisted manifest candidate was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ManifestValidationError {
    /// No assisted result was supplied.
    #[error("no assisted manifest supplied")]
    Absent,

    /// The assisted step itself failed.
    #[error("assisted normalization failed: {0}")]
    Normalizer(#[from] CollaboratorError),

    /// The candidate contains no JSON object.
    #[error("no JSON object found in candidate")]
    NoJson,

    /// The candidate is not valid JSON.
    #[error("candidate is not valid JSON: {0}")]
    Malformed(String),

    /// A required top-level key is missing.
    #[error("missing required key '{0}'")]
    MissingKey(&'static str),

    /// A field has the wrong shape or an unknown enum token.
    #[error("schema violation: {0}")]
    Schema(String),

    /// The candidate's slide size differs from the template's.
    #[error("slide size {found:?} does not match template {expected:?}")]
    SlideSizeMismatch { expected: SlideSize, found: SlideSize },

    /// A layout's placeholder geometry differs from the template's.
    #[error("layout '{0}' alters template placeholder geometry")]
    GeometryMismatch(String),
}

/// Where the manifest in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestSource {
    Assisted,
    Fallback,
}

/// The assisted normalization collaborator.
pub trait ManifestNormalizer {
    /// Produce a manifest candidate (JSON, possibly wrapped in prose) for the template.
    fn normalize(&self, raw: &RawTemplateData) -> Result<String, CollaboratorError>;
}

/// A manifest together with its provenance.
#[derive(Debug, Clone)]
pub struct BuiltManifest {
    pub manifest: Manifest,
    pub source: ManifestSource,
    /// Why the assisted candidate was rejected, when the fallback is in use.
    pub rejection: Option<ManifestValidationError>,
}

impl BuiltManifest {
    /// Record the rejection (if any) as a deck-level degrade event.
    pub fn record_degrade(&self, log: &mut DegradeLog) {
        if let Some(err) = &self.rejection {
            log.record(None, DegradeKind::ManifestValidation, err.to_string());
        }
    }

    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary::of(&self.manifest, self.source)
    }
}

/// Counts reported alongside a finished deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub source: ManifestSource,
    pub colors: usize,
    pub fonts: usize,
    pub layouts: usize,
    pub assets: usize,
}

impl ManifestSummary {
    pub fn of(manifest: &Manifest, source: ManifestSource) -> Self {
        let fonts = &manifest.theme.fonts;
        let distinct_fonts = if fonts.title_family == fonts.body_family {
            1
        } else {
            2
        };
        Self {
            source,
            colors: manifest.theme.palette.color_count(),
            fonts: distinct_fonts,
            layouts: manifest.layouts.len(),
            assets: manifest.assets.len(),
        }
    }
}

/// Builds manifests from raw template data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestBuilder;

impl ManifestBuilder {
    /// Create a new manifest builder.
    pub fn new() -> Self {
        Self
    }

    /// Build a manifest from an optional assisted candidate.
    ///
    /// Never fails: any problem with the candidate yields the fallback manifest.
    pub fn build(&self, raw: &RawTemplateData, assisted: Option<&str>) -> BuiltManifest {
        let outcome = match assisted {
            Some(candidate) => self.validate(raw, candidate),
            None => Err(ManifestValidationError::Absent),
        };
        self.finish(raw, outcome)
    }

    /// Build a manifest by asking a normalizer for a candidate first.
    pub fn build_with<N>(&self, raw: &RawTemplateData, normalizer: &N) -> BuiltManifest
    where
        N: ManifestNormalizer + ?Sized,
    {
        let outcome = normalizer
            .normalize(raw)
            .map_err(ManifestValidationError::from)
            .and_then(|candidate| self.validate(raw, &candidate));
        self.finish(raw, outcome)
    }

    fn finish(
        &self,
        raw: &RawTemplateData,
        outcome: Result<Manifest, ManifestValidationError>,
    ) -> BuiltManifest {
        match outcome {
            Ok(manifest) => {
                log::info!(
                    "Using assisted manifest with {} layouts",
                    manifest.layouts.len()
                );
                BuiltManifest {
                    manifest,
                    source: ManifestSource::Assisted,
                    rejection: None,
                }
            }
            Err(err) => {
                log::info!("Using fallback manifest: {}", err);
                BuiltManifest {
                    manifest: fallback_manifest(raw),
                    source: ManifestSource::Fallback,
                    rejection: Some(err),
                }
            }
        }
    }

    /// Validate a candidate manifest against the schema and the template it describes.
    pub fn validate(
        &self,
        raw: &RawTemplateData,
        candidate: &str,
    ) -> Result<Manifest, ManifestValidationError> {
        let json = extract_json_object(candidate).ok_or(ManifestValidationError::NoJson)?;
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ManifestValidationError::Malformed(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| ManifestValidationError::Schema("top level is not an object".into()))?;
        for key in REQUIRED_KEYS {
            if !object.contains_key(key) {
                return Err(ManifestValidationError::MissingKey(key));
            }
        }

        let manifest: Manifest = serde_json::from_value(value)
            .map_err(|e| ManifestValidationError::Schema(e.to_string()))?;

        let expected = SlideSize {
            width_emu: raw.slide_width_emu,
            height_emu: raw.slide_height_emu,
        };
        if manifest.slide_size != expected {
            return Err(ManifestValidationError::SlideSizeMismatch {
                expected,
                found: manifest.slide_size,
            });
        }

        check_geometry(raw, &manifest)?;
        Ok(manifest)
    }
}

/// Every manifest layout that names a template layout must keep its placeholder rectangles.
fn check_geometry(
    raw: &RawTemplateData,
    manifest: &Manifest,
) -> Result<(), ManifestValidationError> {
    for layout in &manifest.layouts {
        let Some(source) = raw.layouts.iter().find(|r| r.name == layout.name) else {
            continue;
        };

        let mut expected: Vec<Rect> = source.placeholders.iter().map(|p| p.rect()).collect();
        let mut found: Vec<Rect> = layout.placeholders.iter().map(|p| p.rect()).collect();
        expected.sort();
        found.sort();

        if expected != found {
            return Err(ManifestValidationError::GeometryMismatch(layout.name.clone()));
        }
    }
    Ok(())
}

/// Locate the outermost JSON object in text that may carry prose around it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Build the deterministic fallback manifest. Total: succeeds for any input.
pub fn fallback_manifest(raw: &RawTemplateData) -> Manifest {
    let layouts = raw
        .layouts
        .iter()
        .map(|layout| ManifestLayout {
            id: format!("layout_{}", layout.index),
            name: layout.name.clone(),
            archetype: Archetype::Other,
            placeholders: layout
                .placeholders
                .iter()
                .map(ManifestPlaceholder::from)
                .collect(),
        })
        .collect();

    Manifest {
        slide_size: SlideSize {
            width_emu: raw.slide_width_emu,
            height_emu: raw.slide_height_emu,
        },
        theme: ManifestTheme {
            palette: Palette {
                primary: "#1f4e79".to_string(),
                secondary: "#4472c4".to_string(),
                accent: vec!["#4472c4".to_string(), "#ed7d31".to_string()],
                text: "#000000".to_string(),
                background: "#ffffff".to_string(),
            },
            fonts: ThemeFonts {
                title_family: FALLBACK_FAMILY.to_string(),
                body_family: FALLBACK_FAMILY.to_string(),
            },
        },
        layouts,
        text_defaults: TextDefaults {
            title: TitleStyle {
                family: FALLBACK_FAMILY.to_string(),
                size_pt: FALLBACK_TITLE_SIZE_PT,
                bold: true,
                color: Some("primary".to_string()),
            },
            body: vec![BodyStyle {
                level: 0,
                family: FALLBACK_FAMILY.to_string(),
                size_pt: FALLBACK_BODY_SIZE_PT,
                color: Some("text".to_string()),
            }],
        },
        assets: raw.images.iter().map(Asset::from).collect(),
        rules: Rules {
            title_color: "primary".to_string(),
            body_color: "text".to_string(),
            logo_policy: FALLBACK_LOGO_POLICY.to_string(),
        },
    }
}
