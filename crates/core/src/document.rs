//! The document model the synthesizer drives, and an in-memory implementation.
//!
//! The synthesizer decides what goes on each slide; a [`DocumentModel`]
//! carries it out. [`MemoryDeck`] instantiates slides from the layouts of a
//! [`RawTemplateData`] and serializes the finished deck as JSON.

use crate::error::DocumentError;
use crate::types::{PlaceholderKind, RawPlaceholder, RawTemplateData, Rect};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Regex for a six-digit hex color with optional leading '#'.
static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9a-fA-F]{6})$").unwrap());

/// Raw placeholder kinds that cannot hold text.
const NON_TEXT_KINDS: &[&str] = &[
    "PICTURE",
    "CHART",
    "TABLE",
    "MEDIA_CLIP",
    "CLIP_ART",
    "ORG_CHART",
    "SLIDE_IMAGE",
    "BITMAP",
];

/// Identifies a shape within one slide.
pub type ShapeId = usize;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` or `rrggbb`. Anything else is rejected.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let caps = HEX_COLOR_REGEX.captures(hex.trim())?;
        let digits = caps.get(1)?.as_str();
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// One paragraph of shape text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    /// Outline level, 0 for top-level.
    pub level: u8,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: 0,
        }
    }
}

/// A layout the document can instantiate slides from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub index: usize,
    pub name: String,
    pub placeholders: Vec<RawPlaceholder>,
}

/// An image shipped in the template that can be re-placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentImage {
    pub id: String,
    pub rect: Rect,
    pub size_bytes: u64,
}

/// A shape on an instantiated slide, as seen by the placeholder locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideShape {
    pub id: ShapeId,
    pub name: String,
    pub is_placeholder: bool,
    /// Canonical kind, for placeholders that have one.
    pub kind: Option<PlaceholderKind>,
    pub text_capable: bool,
}

/// Exclusive handle to a slide that has been instantiated but not yet committed.
///
/// Not `Clone`: a handle is committed or discarded exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct SlideHandle {
    id: usize,
    layout: usize,
}

impl SlideHandle {
    /// Create a handle. Only document model implementations should need this.
    pub fn new(id: usize, layout: usize) -> Self {
        Self { id, layout }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn layout(&self) -> usize {
        self.layout
    }
}

/// Operations the synthesizer needs from a presentation document.
pub trait DocumentModel {
    /// Layouts in template order.
    fn layouts(&self) -> Vec<DocumentLayout>;

    /// Images available for re-placement.
    fn images(&self) -> Vec<DocumentImage>;

    /// Create a pending slide from the layout at `layout`.
    fn instantiate(&mut self, layout: usize) -> Result<SlideHandle, DocumentError>;

    /// Shapes on a pending slide, in outline order.
    fn shapes(&self, slide: &SlideHandle) -> Result<Vec<SlideShape>, DocumentError>;

    /// Replace a shape's text with the given paragraphs.
    fn set_paragraphs(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        paragraphs: &[Paragraph],
    ) -> Result<(), DocumentError>;

    fn set_font_name(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        family: &str,
    ) -> Result<(), DocumentError>;

    fn set_font_size(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        size_pt: f64,
    ) -> Result<(), DocumentError>;

    fn set_font_bold(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        bold: bool,
    ) -> Result<(), DocumentError>;

    fn set_font_color(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        color: Rgb,
    ) -> Result<(), DocumentError>;

    /// Attach speaker notes to the slide.
    fn set_notes(&mut self, slide: &SlideHandle, text: &str) -> Result<(), DocumentError>;

    /// Place a template image at explicit coordinates.
    fn place_image(
        &mut self,
        slide: &SlideHandle,
        image_id: &str,
        rect: Rect,
    ) -> Result<(), DocumentError>;

    /// Append the pending slide to the deck.
    fn commit(&mut self, slide: SlideHandle) -> Result<(), DocumentError>;

    /// Drop a pending slide without adding it to the deck.
    fn discard(&mut self, slide: SlideHandle);

    /// Number of committed slides.
    fn slide_count(&self) -> usize;

    /// Serialize the committed deck.
    fn serialize(&self) -> Result<Vec<u8>, DocumentError>;
}

// ---------------------------------------------------------------------------
// In-memory deck
// ---------------------------------------------------------------------------

/// Font attributes set on a shape. Unset attributes inherit from the layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_pt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: ShapeId,
    pub name: String,
    /// Raw placeholder kind inherited from the layout.
    pub kind: String,
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(skip)]
    text_capable: bool,
    pub paragraphs: Vec<Paragraph>,
    pub font: FontRecord,
}

impl ShapeRecord {
    /// All paragraph text joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedImage {
    pub image_id: String,
    #[serde(flatten)]
    pub rect: Rect,
}

/// A slide held by [`MemoryDeck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub layout: usize,
    pub layout_name: String,
    pub shapes: Vec<ShapeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub images: Vec<PlacedImage>,
}

impl SlideRecord {
    /// The first shape whose layout kind is a title.
    pub fn title_shape(&self) -> Option<&ShapeRecord> {
        self.shapes
            .iter()
            .find(|s| PlaceholderKind::from_raw(&s.kind) == Some(PlaceholderKind::Title))
    }

    /// Text-bearing shapes other than the title.
    pub fn body_text(&self) -> String {
        let title = self.title_shape().map(|s| s.id);
        self.shapes
            .iter()
            .filter(|s| Some(s.id) != title && !s.paragraphs.is_empty())
            .map(ShapeRecord::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Serialize)]
struct DeckDocument<'a> {
    slide_width_emu: i64,
    slide_height_emu: i64,
    slides: &'a [SlideRecord],
}

/// Document model that keeps the whole deck in memory.
#[derive(Debug, Clone)]
pub struct MemoryDeck {
    slide_width_emu: i64,
    slide_height_emu: i64,
    layouts: Vec<DocumentLayout>,
    images: Vec<DocumentImage>,
    pending: BTreeMap<usize, SlideRecord>,
    slides: Vec<SlideRecord>,
    next_id: usize,
}

impl MemoryDeck {
    /// Create an empty deck that instantiates slides from the template's layouts.
    pub fn from_template(raw: &RawTemplateData) -> Self {
        let layouts = raw
            .layouts
            .iter()
            .map(|l| DocumentLayout {
                index: l.index,
                name: l.name.clone(),
                placeholders: l.placeholders.clone(),
            })
            .collect();
        let images = raw
            .images
            .iter()
            .map(|i| DocumentImage {
                id: i.id.clone(),
                rect: Rect::new(i.left, i.top, i.width, i.height),
                size_bytes: i.size_bytes,
            })
            .collect();

        Self {
            slide_width_emu: raw.slide_width_emu,
            slide_height_emu: raw.slide_height_emu,
            layouts,
            images,
            pending: BTreeMap::new(),
            slides: Vec::new(),
            next_id: 0,
        }
    }

    /// Committed slides in deck order.
    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    /// Number of slides instantiated but neither committed nor discarded.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn slide_mut(&mut self, slide: &SlideHandle) -> Result<&mut SlideRecord, DocumentError> {
        self.pending
            .get_mut(&slide.id)
            .ok_or(DocumentError::UnknownSlide(slide.id))
    }

    fn shape_mut(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
    ) -> Result<&mut ShapeRecord, DocumentError> {
        let slide_id = slide.id;
        self.slide_mut(slide)?
            .shapes
            .get_mut(shape)
            .ok_or(DocumentError::UnknownShape {
                slide: slide_id,
                shape,
            })
    }

    fn text_shape_mut(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
    ) -> Result<&mut ShapeRecord, DocumentError> {
        let record = self.shape_mut(slide, shape)?;
        if record.text_capable {
            Ok(record)
        } else {
            Err(DocumentError::NotTextCapable(shape))
        }
    }
}

fn shape_label(kind: &str) -> String {
    if kind.is_empty() {
        return "Placeholder".to_string();
    }
    kind.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl DocumentModel for MemoryDeck {
    fn layouts(&self) -> Vec<DocumentLayout> {
        self.layouts.clone()
    }

    fn images(&self) -> Vec<DocumentImage> {
        self.images.clone()
    }

    fn instantiate(&mut self, layout: usize) -> Result<SlideHandle, DocumentError> {
        let source = self
            .layouts
            .get(layout)
            .ok_or(DocumentError::UnknownLayout(layout))?;

        let shapes = source
            .placeholders
            .iter()
            .enumerate()
            .map(|(id, ph)| ShapeRecord {
                id,
                name: format!("{} {}", shape_label(&ph.kind), id + 1),
                kind: ph.kind.clone(),
                rect: ph.rect(),
                text_capable: !NON_TEXT_KINDS.contains(&ph.kind.to_ascii_uppercase().as_str()),
                paragraphs: Vec::new(),
                font: FontRecord::default(),
            })
            .collect();

        let record = SlideRecord {
            layout,
            layout_name: source.name.clone(),
            shapes,
            notes: None,
            images: Vec::new(),
        };

        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id, record);
        Ok(SlideHandle::new(id, layout))
    }

    fn shapes(&self, slide: &SlideHandle) -> Result<Vec<SlideShape>, DocumentError> {
        let record = self
            .pending
            .get(&slide.id)
            .ok_or(DocumentError::UnknownSlide(slide.id))?;

        Ok(record
            .shapes
            .iter()
            .map(|s| SlideShape {
                id: s.id,
                name: s.name.clone(),
                is_placeholder: true,
                kind: PlaceholderKind::from_raw(&s.kind),
                text_capable: s.text_capable,
            })
            .collect())
    }

    fn set_paragraphs(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        paragraphs: &[Paragraph],
    ) -> Result<(), DocumentError> {
        self.text_shape_mut(slide, shape)?.paragraphs = paragraphs.to_vec();
        Ok(())
    }

    fn set_font_name(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        family: &str,
    ) -> Result<(), DocumentError> {
        self.text_shape_mut(slide, shape)?.font.family = Some(family.to_string());
        Ok(())
    }

    fn set_font_size(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        size_pt: f64,
    ) -> Result<(), DocumentError> {
        if !(size_pt.is_finite() && size_pt > 0.0) {
            return Err(DocumentError::Backend(format!("invalid font size {}", size_pt)));
        }
        self.text_shape_mut(slide, shape)?.font.size_pt = Some(size_pt);
        Ok(())
    }

    fn set_font_bold(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        bold: bool,
    ) -> Result<(), DocumentError> {
        self.text_shape_mut(slide, shape)?.font.bold = Some(bold);
        Ok(())
    }

    fn set_font_color(
        &mut self,
        slide: &SlideHandle,
        shape: ShapeId,
        color: Rgb,
    ) -> Result<(), DocumentError> {
        self.text_shape_mut(slide, shape)?.font.color = Some(color.to_string());
        Ok(())
    }

    fn set_notes(&mut self, slide: &SlideHandle, text: &str) -> Result<(), DocumentError> {
        self.slide_mut(slide)?.notes = Some(text.to_string());
        Ok(())
    }

    fn place_image(
        &mut self,
        slide: &SlideHandle,
        image_id: &str,
        rect: Rect,
    ) -> Result<(), DocumentError> {
        if !self.images.iter().any(|i| i.id == image_id) {
            return Err(DocumentError::UnknownImage(image_id.to_string()));
        }
        self.slide_mut(slide)?.images.push(PlacedImage {
            image_id: image_id.to_string(),
            rect,
        });
        Ok(())
    }

    fn commit(&mut self, slide: SlideHandle) -> Result<(), DocumentError> {
        let record = self
            .pending
            .remove(&slide.id)
            .ok_or(DocumentError::UnknownSlide(slide.id))?;
        self.slides.push(record);
        Ok(())
    }

    fn discard(&mut self, slide: SlideHandle) {
        self.pending.remove(&slide.id);
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn serialize(&self) -> Result<Vec<u8>, DocumentError> {
        let document = DeckDocument {
            slide_width_emu: self.slide_width_emu,
            slide_height_emu: self.slide_height_emu,
            slides: &self.slides,
        };
        serde_json::to_vec_pretty(&document).map_err(|e| DocumentError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawImage, RawLayout};

    fn template() -> RawTemplateData {
        let ph = |kind: &str, top: i64| RawPlaceholder {
            kind: kind.into(),
            left: 100,
            top,
            width: 800,
            height: 200,
        };
        RawTemplateData {
            layouts: vec![RawLayout {
                index: 0,
                name: "Picture with Caption".into(),
                placeholders: vec![ph("TITLE", 0), ph("PICTURE", 300), ph("BODY", 600)],
            }],
            images: vec![RawImage {
                id: "img_0_1".into(),
                left: 1,
                top: 2,
                width: 3,
                height: 4,
                size_bytes: 10,
                source_slide: 0,
            }],
            ..RawTemplateData::default()
        }
    }

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#1f4e79"), Some(Rgb(0x1f, 0x4e, 0x79)));
        assert_eq!(Rgb::from_hex("FFFFFF"), Some(Rgb(255, 255, 255)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gggggg"), None);
        assert_eq!(Rgb::from_hex("primary"), None);
        assert_eq!(Rgb(0x1f, 0x4e, 0x79).to_string(), "#1f4e79");
    }

    #[test]
    fn test_shape_label() {
        assert_eq!(shape_label("CENTER_TITLE"), "Center Title");
        assert_eq!(shape_label(""), "Placeholder");
    }

    #[test]
    fn test_instantiate_and_commit() {
        let mut deck = MemoryDeck::from_template(&template());
        let slide = deck.instantiate(0).unwrap();

        let shapes = deck.shapes(&slide).unwrap();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0].kind, Some(PlaceholderKind::Title));
        assert!(!shapes[1].text_capable);
        assert_eq!(shapes[2].name, "Body 3");

        deck.set_paragraphs(&slide, 0, &[Paragraph::new("Hello")]).unwrap();
        deck.set_font_color(&slide, 0, Rgb(0, 0, 0)).unwrap();
        deck.place_image(&slide, "img_0_1", Rect::new(1, 2, 3, 4)).unwrap();
        deck.commit(slide).unwrap();

        assert_eq!(deck.slide_count(), 1);
        assert_eq!(deck.pending_count(), 0);
        let committed = &deck.slides()[0];
        assert_eq!(committed.title_shape().unwrap().text(), "Hello");
        assert_eq!(committed.shapes[0].font.color.as_deref(), Some("#000000"));
        assert_eq!(committed.images.len(), 1);
    }

    #[test]
    fn test_rejections() {
        let mut deck = MemoryDeck::from_template(&template());
        assert_eq!(deck.instantiate(5), Err(DocumentError::UnknownLayout(5)));

        let slide = deck.instantiate(0).unwrap();
        assert_eq!(
            deck.set_paragraphs(&slide, 1, &[Paragraph::new("x")]),
            Err(DocumentError::NotTextCapable(1))
        );
        assert!(matches!(
            deck.set_font_bold(&slide, 9, true),
            Err(DocumentError::UnknownShape { shape: 9, .. })
        ));
        assert_eq!(
            deck.place_image(&slide, "nope", Rect::default()),
            Err(DocumentError::UnknownImage("nope".into()))
        );
        assert!(deck.set_font_size(&slide, 0, 0.0).is_err());

        deck.discard(slide);
        assert_eq!(deck.pending_count(), 0);
        assert_eq!(deck.slide_count(), 0);
    }

    #[test]
    fn test_serialize_json() {
        let mut deck = MemoryDeck::from_template(&template());
        let slide = deck.instantiate(0).unwrap();
        deck.set_notes(&slide, "remember").unwrap();
        deck.commit(slide).unwrap();

        let bytes = deck.serialize().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["slide_width_emu"], 9_144_000);
        assert_eq!(value["slides"][0]["layout_name"], "Picture with Caption");
        assert_eq!(value["slides"][0]["notes"], "remember");
        assert_eq!(value["slides"][0]["shapes"][2]["top"], 600);
    }
}
