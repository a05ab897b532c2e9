//! Slide synthesis: turn content blocks into committed slides.
//!
//! Each block runs through resolve → instantiate → locate → style → assets →
//! notes → commit. A failure anywhere in that chain discards the partial
//! slide and commits a title-only substitute instead, so one bad block never
//! costs the deck.

use crate::assets::place_assets;
use crate::config::SynthesisPolicy;
use crate::degrade::{DegradeEvent, DegradeKind, DegradeLog};
use crate::document::{DocumentLayout, DocumentModel, SlideHandle};
use crate::error::{DocumentError, Result};
use crate::locator::{locate, locate_title, BodyStrategy};
use crate::manifest::{BuiltManifest, ManifestSummary};
use crate::resolver::{LayoutResolver, ResolutionRule};
use crate::styling::{title_paragraphs, StylingApplier};
use crate::types::{ContentBlock, Manifest, ManifestLayout};
use serde::Serialize;

/// What happened to one content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideOutcome {
    /// Zero-based position in the deck.
    pub index: usize,
    pub title: String,
    /// Manifest layout id, when a manifest layout was used.
    pub layout_id: Option<String>,
    /// Document layout the slide was instantiated from.
    pub layout_index: usize,
    pub rule: Option<ResolutionRule>,
    pub body_strategy: Option<BodyStrategy>,
    pub assets_placed: usize,
    /// Whether the slide is a title-only substitute.
    pub substituted: bool,
}

/// Per-slide outcomes plus every degrade event of the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SynthesisReport {
    pub slides: Vec<SlideOutcome>,
    pub events: Vec<DegradeEvent>,
}

impl SynthesisReport {
    pub fn substituted_count(&self) -> usize {
        self.slides.iter().filter(|s| s.substituted).count()
    }
}

/// A finished deck.
#[derive(Debug, Clone)]
pub struct DeckBuild {
    pub bytes: Vec<u8>,
    pub manifest: ManifestSummary,
    pub report: SynthesisReport,
}

/// Document layout chosen for a block, with how it was reached.
struct LayoutChoice {
    layout_index: usize,
    layout_id: Option<String>,
    rule: Option<ResolutionRule>,
}

/// Orchestrates the per-block pipeline against a document model.
#[derive(Debug, Clone)]
pub struct SlideSynthesizer<'m> {
    manifest: &'m Manifest,
    policy: SynthesisPolicy,
}

impl<'m> SlideSynthesizer<'m> {
    pub fn new(manifest: &'m Manifest) -> Self {
        Self {
            manifest,
            policy: SynthesisPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SynthesisPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build one slide per block, in order.
    ///
    /// Only a document model that cannot produce even a substitute slide makes
    /// this fail.
    pub fn synthesize<D>(&self, doc: &mut D, blocks: Vec<ContentBlock>) -> Result<SynthesisReport>
    where
        D: DocumentModel + ?Sized,
    {
        let mut log = DegradeLog::new();
        let slides = self.run(doc, blocks, &mut log)?;
        Ok(SynthesisReport {
            slides,
            events: log.into_events(),
        })
    }

    fn run<D>(
        &self,
        doc: &mut D,
        blocks: Vec<ContentBlock>,
        log: &mut DegradeLog,
    ) -> Result<Vec<SlideOutcome>>
    where
        D: DocumentModel + ?Sized,
    {
        let layouts = doc.layouts();
        let mut outcomes = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.into_iter().enumerate() {
            let outcome = match self.build_slide(doc, &layouts, index, &block, log) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log.record(
                        Some(index),
                        DegradeKind::SlideSubstituted,
                        format!("slide failed ({}), using title-only substitute", e),
                    );
                    self.substitute(doc, &layouts, index, &block, log)?
                }
            };
            outcomes.push(outcome);
        }

        log::info!(
            "Synthesized {} slides ({} substituted)",
            outcomes.len(),
            outcomes.iter().filter(|o| o.substituted).count()
        );
        Ok(outcomes)
    }

    fn build_slide<D>(
        &self,
        doc: &mut D,
        layouts: &[DocumentLayout],
        index: usize,
        block: &ContentBlock,
        log: &mut DegradeLog,
    ) -> std::result::Result<SlideOutcome, DocumentError>
    where
        D: DocumentModel + ?Sized,
    {
        let choice = self.choose_layout(layouts, index, block, log);
        let slide = doc.instantiate(choice.layout_index)?;

        match self.populate(doc, &slide, index, block, log) {
            Ok((body_strategy, assets_placed)) => {
                doc.commit(slide)?;
                Ok(SlideOutcome {
                    index,
                    title: block.title.clone(),
                    layout_id: choice.layout_id,
                    layout_index: choice.layout_index,
                    rule: choice.rule,
                    body_strategy,
                    assets_placed,
                    substituted: false,
                })
            }
            Err(e) => {
                doc.discard(slide);
                Err(e)
            }
        }
    }

    fn populate<D>(
        &self,
        doc: &mut D,
        slide: &SlideHandle,
        index: usize,
        block: &ContentBlock,
        log: &mut DegradeLog,
    ) -> std::result::Result<(Option<BodyStrategy>, usize), DocumentError>
    where
        D: DocumentModel + ?Sized,
    {
        let located = locate(&doc.shapes(slide)?);

        StylingApplier::new(self.manifest, &self.policy)
            .apply(doc, slide, index, &located, block, log)?;

        let placed = place_assets(doc, slide, index, &self.manifest.assets, log);

        if self.policy.include_speaker_notes && !block.speaker_notes.is_empty() {
            doc.set_notes(slide, &block.speaker_notes)?;
        }

        Ok((located.body_strategy, placed))
    }

    fn choose_layout(
        &self,
        layouts: &[DocumentLayout],
        index: usize,
        block: &ContentBlock,
        log: &mut DegradeLog,
    ) -> LayoutChoice {
        let resolution = LayoutResolver::new(&self.policy).resolve(block, &self.manifest.layouts);

        let Some(resolution) = resolution else {
            log.record(
                Some(index),
                DegradeKind::LayoutResolutionMiss,
                "manifest has no layouts, using default layout",
            );
            return LayoutChoice {
                layout_index: default_layout_index(layouts),
                layout_id: None,
                rule: None,
            };
        };

        let layout_index = match document_layout_for(layouts, resolution.layout) {
            Some(idx) => idx,
            None => {
                log.record(
                    Some(index),
                    DegradeKind::LayoutResolutionMiss,
                    format!(
                        "layout '{}' not in document, using default layout",
                        resolution.layout.name
                    ),
                );
                default_layout_index(layouts)
            }
        };

        LayoutChoice {
            layout_index,
            layout_id: Some(resolution.layout.id.clone()),
            rule: Some(resolution.rule),
        }
    }

    /// Commit a title-only slide on the second manifest layout (or the first).
    fn substitute<D>(
        &self,
        doc: &mut D,
        layouts: &[DocumentLayout],
        index: usize,
        block: &ContentBlock,
        log: &mut DegradeLog,
    ) -> Result<SlideOutcome>
    where
        D: DocumentModel + ?Sized,
    {
        let manifest_layout = self
            .manifest
            .layouts
            .get(1)
            .or_else(|| self.manifest.layouts.first());
        let layout_index = manifest_layout
            .and_then(|l| document_layout_for(layouts, l))
            .unwrap_or_else(|| default_layout_index(layouts));

        let slide = doc.instantiate(layout_index)?;

        let title = doc.shapes(&slide).ok().and_then(|shapes| locate_title(&shapes));
        let paragraphs = title_paragraphs(block);
        match title {
            Some(shape) if !paragraphs.is_empty() => {
                if let Err(e) = doc.set_paragraphs(&slide, shape, &paragraphs) {
                    log.record(
                        Some(index),
                        DegradeKind::PlaceholderMiss,
                        format!("substitute title not written: {}", e),
                    );
                }
            }
            Some(_) => {}
            None => log.record(
                Some(index),
                DegradeKind::PlaceholderMiss,
                "substitute slide has no title shape",
            ),
        }

        doc.commit(slide)?;

        Ok(SlideOutcome {
            index,
            title: block.title.clone(),
            layout_id: manifest_layout.map(|l| l.id.clone()),
            layout_index,
            rule: None,
            body_strategy: None,
            assets_placed: 0,
            substituted: true,
        })
    }
}

/// Position of the document layout carrying the manifest layout's name.
fn document_layout_for(layouts: &[DocumentLayout], layout: &ManifestLayout) -> Option<usize> {
    layouts.iter().position(|l| l.name == layout.name)
}

/// The second document layout when there is more than one, else the first.
fn default_layout_index(layouts: &[DocumentLayout]) -> usize {
    if layouts.len() > 1 {
        1
    } else {
        0
    }
}

/// Synthesize a deck from a built manifest and serialize it.
pub fn build_deck<D>(
    doc: &mut D,
    built: &BuiltManifest,
    blocks: Vec<ContentBlock>,
    policy: SynthesisPolicy,
) -> Result<DeckBuild>
where
    D: DocumentModel + ?Sized,
{
    let mut log = DegradeLog::new();
    built.record_degrade(&mut log);

    let synthesizer = SlideSynthesizer::new(&built.manifest).with_policy(policy);
    let slides = synthesizer.run(doc, blocks, &mut log)?;
    let bytes = doc.serialize()?;

    Ok(DeckBuild {
        bytes,
        manifest: built.summary(),
        report: SynthesisReport {
            slides,
            events: log.into_events(),
        },
    })
}
