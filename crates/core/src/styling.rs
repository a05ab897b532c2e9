//! Writing slide text and applying manifest font rules.

use crate::config::SynthesisPolicy;
use crate::degrade::{DegradeKind, DegradeLog};
use crate::document::{DocumentModel, Paragraph, Rgb, ShapeId, SlideHandle};
use crate::error::DocumentError;
use crate::locator::LocatedShapes;
use crate::types::{Content, ContentBlock, Manifest, Palette};
use unicode_normalization::UnicodeNormalization;

/// Normalize a piece of slide text: NFC composition, trimmed.
fn clean_text(text: &str) -> String {
    text.nfc().collect::<String>().trim().to_string()
}

/// Title paragraphs for a block. Empty when the block has no title.
pub fn title_paragraphs(block: &ContentBlock) -> Vec<Paragraph> {
    let title = clean_text(&block.title);
    if title.is_empty() {
        Vec::new()
    } else {
        vec![Paragraph::new(title)]
    }
}

/// Body paragraphs for a block; never empty and never blank.
///
/// List items become one level-0 paragraph each; a string becomes a single
/// paragraph. Blank content is replaced with a phrase derived from the title.
pub fn body_paragraphs(block: &ContentBlock, policy: &SynthesisPolicy) -> Vec<Paragraph> {
    let paragraphs: Vec<Paragraph> = match &block.content {
        Some(Content::Items(items)) => items
            .iter()
            .map(|item| clean_text(item))
            .filter(|item| !item.is_empty())
            .map(Paragraph::new)
            .collect(),
        Some(Content::Text(text)) => {
            let text = clean_text(text);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Paragraph::new(text)]
            }
        }
        None => Vec::new(),
    };

    if !paragraphs.is_empty() {
        return paragraphs;
    }

    let title = clean_text(&block.title);
    let phrase = if title.is_empty() {
        policy.generic_body_text.clone()
    } else {
        format!("Key points about {}", title)
    };
    vec![Paragraph::new(phrase)]
}

/// Resolve a palette key to a color, or explain why it cannot be.
pub fn resolve_color(palette: &Palette, key: &str) -> Result<Rgb, String> {
    let hex = palette
        .get(key)
        .ok_or_else(|| format!("palette has no color '{}'", key))?;
    Rgb::from_hex(hex).ok_or_else(|| format!("palette color '{}' is not a hex color: {}", key, hex))
}

/// Font attributes for one text role, resolved from the manifest.
#[derive(Debug, Clone, PartialEq)]
struct FontRule<'m> {
    role: &'static str,
    family: Option<&'m str>,
    size_pt: Option<f64>,
    bold: Option<bool>,
    color_key: Option<&'m str>,
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl<'m> FontRule<'m> {
    fn title(manifest: &'m Manifest) -> Self {
        let style = &manifest.text_defaults.title;
        Self {
            role: "title",
            family: non_blank(&style.family)
                .or_else(|| non_blank(&manifest.theme.fonts.title_family)),
            size_pt: Some(style.size_pt),
            bold: Some(style.bold),
            color_key: style
                .color
                .as_deref()
                .and_then(non_blank)
                .or_else(|| non_blank(&manifest.rules.title_color)),
        }
    }

    fn body(manifest: &'m Manifest) -> Self {
        let style = manifest.text_defaults.body.first();
        Self {
            role: "body",
            family: style
                .and_then(|s| non_blank(&s.family))
                .or_else(|| non_blank(&manifest.theme.fonts.body_family)),
            size_pt: style.map(|s| s.size_pt),
            bold: None,
            color_key: style
                .and_then(|s| s.color.as_deref())
                .and_then(non_blank)
                .or_else(|| non_blank(&manifest.rules.body_color)),
        }
    }
}

/// Writes text into located shapes and applies manifest styling.
#[derive(Debug, Clone)]
pub struct StylingApplier<'a> {
    manifest: &'a Manifest,
    policy: &'a SynthesisPolicy,
}

impl<'a> StylingApplier<'a> {
    pub fn new(manifest: &'a Manifest, policy: &'a SynthesisPolicy) -> Self {
        Self { manifest, policy }
    }

    /// Write title and body text and style both.
    ///
    /// Failing to write text is an error for the slide; failing to apply a
    /// single font attribute is recorded and skipped.
    pub fn apply<D>(
        &self,
        doc: &mut D,
        slide: &SlideHandle,
        slide_index: usize,
        located: &LocatedShapes,
        block: &ContentBlock,
        log: &mut DegradeLog,
    ) -> Result<(), DocumentError>
    where
        D: DocumentModel + ?Sized,
    {
        match located.title {
            Some(shape) => {
                let paragraphs = title_paragraphs(block);
                if !paragraphs.is_empty() {
                    doc.set_paragraphs(slide, shape, &paragraphs)?;
                    let rule = FontRule::title(self.manifest);
                    self.apply_font(doc, slide, shape, slide_index, &rule, log);
                }
            }
            None => log.record(
                Some(slide_index),
                DegradeKind::PlaceholderMiss,
                "no title shape on slide",
            ),
        }

        match located.body {
            Some(shape) => {
                let paragraphs = body_paragraphs(block, self.policy);
                doc.set_paragraphs(slide, shape, &paragraphs)?;
                let rule = FontRule::body(self.manifest);
                self.apply_font(doc, slide, shape, slide_index, &rule, log);
            }
            None => log.record(
                Some(slide_index),
                DegradeKind::PlaceholderMiss,
                "no body shape on slide",
            ),
        }

        Ok(())
    }

    fn apply_font<D>(
        &self,
        doc: &mut D,
        slide: &SlideHandle,
        shape: ShapeId,
        slide_index: usize,
        rule: &FontRule<'_>,
        log: &mut DegradeLog,
    ) where
        D: DocumentModel + ?Sized,
    {
        let mut skip = |attribute: &str, err: String| {
            log.record(
                Some(slide_index),
                DegradeKind::StylingFailure,
                format!("{} {}: {}", rule.role, attribute, err),
            )
        };

        if let Some(family) = rule.family {
            if let Err(e) = doc.set_font_name(slide, shape, family) {
                skip("font", e.to_string());
            }
        }
        if let Some(size) = rule.size_pt {
            if let Err(e) = doc.set_font_size(slide, shape, size) {
                skip("size", e.to_string());
            }
        }
        if let Some(bold) = rule.bold {
            if let Err(e) = doc.set_font_bold(slide, shape, bold) {
                skip("bold", e.to_string());
            }
        }
        if let Some(key) = rule.color_key {
            match resolve_color(&self.manifest.theme.palette, key) {
                Ok(color) => {
                    if let Err(e) = doc.set_font_color(slide, shape, color) {
                        skip("color", e.to_string());
                    }
                }
                Err(reason) => skip("color", reason),
            }
        }
    }
}
