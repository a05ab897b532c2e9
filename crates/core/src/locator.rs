//! Locating the title and body shapes on an instantiated slide.

use crate::document::{ShapeId, SlideShape};
use crate::types::PlaceholderKind;
use serde::Serialize;

/// How the body shape was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStrategy {
    /// A placeholder of canonical kind BODY.
    CanonicalBody,
    /// The placeholder in the second outline slot.
    OutlinePosition,
    /// Any text placeholder that is not a title.
    NonTitlePlaceholder,
    /// Any text shape other than the title, placeholder or not.
    AnyTextShape,
}

type Strategy = fn(&[SlideShape], Option<ShapeId>) -> Option<ShapeId>;

/// Body strategies, most specific first.
const BODY_STRATEGIES: [(BodyStrategy, Strategy); 4] = [
    (BodyStrategy::CanonicalBody, canonical_body),
    (BodyStrategy::OutlinePosition, outline_position),
    (BodyStrategy::NonTitlePlaceholder, non_title_placeholder),
    (BodyStrategy::AnyTextShape, any_text_shape),
];

/// Outline slot conventionally holding the body, right after the title.
const BODY_OUTLINE_POSITION: usize = 1;

fn canonical_body(shapes: &[SlideShape], _title: Option<ShapeId>) -> Option<ShapeId> {
    shapes
        .iter()
        .find(|s| s.is_placeholder && s.kind == Some(PlaceholderKind::Body))
        .map(|s| s.id)
}

fn outline_position(shapes: &[SlideShape], title: Option<ShapeId>) -> Option<ShapeId> {
    shapes
        .iter()
        .filter(|s| s.is_placeholder)
        .nth(BODY_OUTLINE_POSITION)
        .filter(|s| s.text_capable && Some(s.id) != title)
        .map(|s| s.id)
}

fn non_title_placeholder(shapes: &[SlideShape], title: Option<ShapeId>) -> Option<ShapeId> {
    shapes
        .iter()
        .find(|s| {
            s.is_placeholder
                && s.text_capable
                && s.kind != Some(PlaceholderKind::Title)
                && Some(s.id) != title
        })
        .map(|s| s.id)
}

fn any_text_shape(shapes: &[SlideShape], title: Option<ShapeId>) -> Option<ShapeId> {
    shapes
        .iter()
        .find(|s| s.text_capable && Some(s.id) != title)
        .map(|s| s.id)
}

/// The text roles found on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedShapes {
    pub title: Option<ShapeId>,
    pub body: Option<ShapeId>,
    pub body_strategy: Option<BodyStrategy>,
}

/// Find the title and body shapes among a slide's shapes.
pub fn locate(shapes: &[SlideShape]) -> LocatedShapes {
    let title = locate_title(shapes);

    let found = BODY_STRATEGIES
        .iter()
        .find_map(|(strategy, find)| find(shapes, title).map(|id| (*strategy, id)));

    match found {
        Some((strategy, id)) => {
            log::debug!("Body shape {} found via {:?}", id, strategy);
            LocatedShapes {
                title,
                body: Some(id),
                body_strategy: Some(strategy),
            }
        }
        None => LocatedShapes {
            title,
            body: None,
            body_strategy: None,
        },
    }
}

/// The first title placeholder, if any.
pub fn locate_title(shapes: &[SlideShape]) -> Option<ShapeId> {
    shapes
        .iter()
        .find(|s| s.is_placeholder && s.kind == Some(PlaceholderKind::Title))
        .map(|s| s.id)
}
