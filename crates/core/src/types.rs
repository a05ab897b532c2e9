//! Domain types: raw template facts, the normalized manifest, and content blocks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default slide width (10in, 4:3) used when a template omits its size.
pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

/// Default slide height (7.5in, 4:3) used when a template omits its size.
pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

/// Canonical theme color slot names, indexed by their position in the scheme.
pub const COLOR_SLOTS: [&str; 10] = [
    "bg1", "text1", "bg2", "text2", "accent1", "accent2", "accent3", "accent4", "accent5",
    "accent6",
];

/// Map a color scheme position to its canonical slot name.
///
/// Positions past the last accent (hyperlink colors and beyond) have no slot.
pub fn color_slot_name(index: usize) -> Option<&'static str> {
    COLOR_SLOTS.get(index).copied()
}

/// Axis-aligned geometry in EMU, copied verbatim from the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw template data
// ---------------------------------------------------------------------------

/// Structural and style facts read straight out of a template package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTemplateData {
    pub slide_width_emu: i64,
    pub slide_height_emu: i64,
    #[serde(default)]
    pub theme: RawTheme,
    #[serde(default)]
    pub layouts: Vec<RawLayout>,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

impl Default for RawTemplateData {
    fn default() -> Self {
        Self {
            slide_width_emu: DEFAULT_SLIDE_WIDTH_EMU,
            slide_height_emu: DEFAULT_SLIDE_HEIGHT_EMU,
            theme: RawTheme::default(),
            layouts: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// Theme colors by canonical slot name, plus the major/minor font faces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTheme {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub fonts: RawFonts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFonts {
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub minor: Option<String>,
}

/// A slide layout as found in the template, in master order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLayout {
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub placeholders: Vec<RawPlaceholder>,
}

/// A layout placeholder. `kind` is empty when no semantic type could be inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlaceholder {
    #[serde(default)]
    pub kind: String,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl RawPlaceholder {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// A picture found on one of the template's own slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    pub id: String,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    pub size_bytes: u64,
    /// Zero-based index of the slide the picture was found on.
    pub source_slide: usize,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Normalized, validated description of a template that drives synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub slide_size: SlideSize,
    pub theme: ManifestTheme,
    pub layouts: Vec<ManifestLayout>,
    pub text_defaults: TextDefaults,
    pub assets: Vec<Asset>,
    pub rules: Rules,
}

impl Manifest {
    /// Look up a layout by its manifest id.
    pub fn layout(&self, id: &str) -> Option<&ManifestLayout> {
        self.layouts.iter().find(|l| l.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width_emu: i64,
    pub height_emu: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestTheme {
    pub palette: Palette,
    pub fonts: ThemeFonts,
}

/// Named colors referenced by text defaults and rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    #[serde(default)]
    pub accent: Vec<String>,
    pub text: String,
    pub background: String,
}

impl Palette {
    /// Resolve a palette key to its hex string.
    ///
    /// `accent` means the first accent, `accentN` the N-th (one-based).
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "primary" => Some(&self.primary),
            "secondary" => Some(&self.secondary),
            "text" => Some(&self.text),
            "background" => Some(&self.background),
            "accent" => self.accent.first().map(String::as_str),
            other => {
                let n: usize = other.strip_prefix("accent")?.parse().ok()?;
                self.accent.get(n.checked_sub(1)?).map(String::as_str)
            }
        }
    }

    /// Number of distinct colors the palette carries.
    pub fn color_count(&self) -> usize {
        4 + self.accent.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeFonts {
    pub title_family: String,
    pub body_family: String,
}

/// Canonical role of a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    TitleOnly,
    TitleContent,
    TwoContent,
    SectionHeader,
    #[default]
    Other,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleOnly => "title_only",
            Self::TitleContent => "title_content",
            Self::TwoContent => "two_content",
            Self::SectionHeader => "section_header",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestLayout {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archetype: Archetype,
    #[serde(default)]
    pub placeholders: Vec<ManifestPlaceholder>,
}

/// Semantic placeholder kinds the manifest knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaceholderKind {
    Title,
    Body,
    Picture,
    Footer,
}

impl PlaceholderKind {
    /// Map a raw placeholder kind name onto a canonical kind, if it has one.
    pub fn from_raw(kind: &str) -> Option<Self> {
        match kind.to_ascii_uppercase().as_str() {
            "TITLE" | "CENTER_TITLE" | "VERTICAL_TITLE" => Some(Self::Title),
            "BODY" | "VERTICAL_BODY" => Some(Self::Body),
            "PICTURE" => Some(Self::Picture),
            "FOOTER" => Some(Self::Footer),
            _ => None,
        }
    }
}

/// A manifest placeholder. `kind` is `None` when the raw kind has no canonical counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPlaceholder {
    #[serde(default)]
    pub kind: Option<PlaceholderKind>,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl ManifestPlaceholder {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

impl From<&RawPlaceholder> for ManifestPlaceholder {
    fn from(raw: &RawPlaceholder) -> Self {
        Self {
            kind: PlaceholderKind::from_raw(&raw.kind),
            left: raw.left,
            top: raw.top,
            width: raw.width,
            height: raw.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDefaults {
    pub title: TitleStyle,
    pub body: Vec<BodyStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleStyle {
    pub family: String,
    pub size_pt: f64,
    #[serde(default)]
    pub bold: bool,
    /// Palette key.
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyStyle {
    #[serde(default)]
    pub level: u8,
    pub family: String,
    pub size_pt: f64,
    /// Palette key.
    #[serde(default)]
    pub color: Option<String>,
}

/// Which slides a template asset is repeated on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOn {
    All,
    TitleOnly,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub apply_on: ApplyOn,
}

impl Asset {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

impl From<&RawImage> for Asset {
    fn from(image: &RawImage) -> Self {
        Self {
            id: image.id.clone(),
            left: image.left,
            top: image.top,
            width: image.width,
            height: image.height,
            apply_on: ApplyOn::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Palette key used for titles when the title style names none.
    pub title_color: String,
    /// Palette key used for body text when the body style names none.
    pub body_color: String,
    pub logo_policy: String,
}

// ---------------------------------------------------------------------------
// Content blocks
// ---------------------------------------------------------------------------

/// Slide body as produced by the content generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Items(Vec<String>),
}

/// One unit of generated content; becomes exactly one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub speaker_notes: String,
    #[serde(default)]
    pub layout_hint: Option<String>,
}

impl ContentBlock {
    /// Create a block with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Some(Content::Text(text.into()));
        self
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = Some(Content::Items(items.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.speaker_notes = notes.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.layout_hint = Some(hint.into());
        self
    }

    /// Body text as one string; list items are joined by newlines.
    pub fn body_text(&self) -> String {
        match &self.content {
            Some(Content::Text(text)) => text.clone(),
            Some(Content::Items(items)) => items.join("\n"),
            None => String::new(),
        }
    }

    /// Whether the block carries any non-blank body content.
    pub fn has_content(&self) -> bool {
        match &self.content {
            Some(Content::Text(text)) => !text.trim().is_empty(),
            Some(Content::Items(items)) => items.iter().any(|i| !i.trim().is_empty()),
            None => false,
        }
    }

    /// Length of the body text in characters.
    pub fn content_chars(&self) -> usize {
        self.body_text().chars().count()
    }

    /// Whether the generator marked this block as a section divider.
    pub fn is_section_hint(&self) -> bool {
        self.layout_hint.as_deref() == Some("section")
    }
}
