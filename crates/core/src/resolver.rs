//! Layout resolution: pick the manifest layout that best fits a content block.
//!
//! Rules are evaluated top to bottom. A rule fires when it applies to the
//! block and some layout satisfies it; within a rule the first layout in
//! manifest order wins. Real content always outranks a "section" hint, so a
//! mislabeled hint cannot suppress body text.

use crate::config::SynthesisPolicy;
use crate::types::{Archetype, ContentBlock, ManifestLayout};
use serde::Serialize;

/// The rule that selected a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    /// Content present, `title_content` layout available.
    TitleContent,
    /// Long content, `two_content` layout available.
    TwoContent,
    /// Content present, any content-bearing archetype.
    AnyContent,
    /// No content or a section hint, `section_header`/`title_only` available.
    SectionOrTitleOnly,
    /// Nothing matched; first layout.
    FirstLayout,
}

struct Rule {
    rule: ResolutionRule,
    applies: fn(&ContentBlock, &SynthesisPolicy) -> bool,
    matches: fn(&ManifestLayout) -> bool,
}

const RULES: [Rule; 5] = [
    Rule {
        rule: ResolutionRule::TitleContent,
        applies: |block, _| block.has_content(),
        matches: |layout| layout.archetype == Archetype::TitleContent,
    },
    Rule {
        rule: ResolutionRule::TwoContent,
        applies: |block, policy| {
            block.has_content() && block.content_chars() > policy.two_content_min_chars
        },
        matches: |layout| layout.archetype == Archetype::TwoContent,
    },
    Rule {
        rule: ResolutionRule::AnyContent,
        applies: |block, _| block.has_content(),
        matches: |layout| layout.archetype.as_str().contains("content"),
    },
    Rule {
        rule: ResolutionRule::SectionOrTitleOnly,
        applies: |block, _| !block.has_content() || block.is_section_hint(),
        matches: |layout| {
            matches!(
                layout.archetype,
                Archetype::SectionHeader | Archetype::TitleOnly
            )
        },
    },
    Rule {
        rule: ResolutionRule::FirstLayout,
        applies: |_, _| true,
        matches: |_| true,
    },
];

/// A chosen layout and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'m> {
    pub layout: &'m ManifestLayout,
    pub rule: ResolutionRule,
}

/// Picks layouts for content blocks.
#[derive(Debug, Clone)]
pub struct LayoutResolver<'p> {
    policy: &'p SynthesisPolicy,
}

impl<'p> LayoutResolver<'p> {
    pub fn new(policy: &'p SynthesisPolicy) -> Self {
        Self { policy }
    }

    /// Resolve a block against the manifest layouts.
    ///
    /// Returns `None` only when `layouts` is empty.
    pub fn resolve<'m>(
        &self,
        block: &ContentBlock,
        layouts: &'m [ManifestLayout],
    ) -> Option<Resolution<'m>> {
        RULES
            .iter()
            .filter(|rule| (rule.applies)(block, self.policy))
            .find_map(|rule| {
                layouts
                    .iter()
                    .find(|layout| (rule.matches)(layout))
                    .map(|layout| Resolution {
                        layout,
                        rule: rule.rule,
                    })
            })
            .inspect(|r| {
                log::debug!(
                    "Resolved '{}' to layout '{}' via {:?}",
                    block.title,
                    r.layout.id,
                    r.rule
                )
            })
    }
}
