//! Content plans: parsing generator output and the local chunked fallback.

use crate::error::CollaboratorError;
use crate::types::ContentBlock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used when a plan does not name one.
pub const DEFAULT_PRESENTATION_TITLE: &str = "Generated Presentation";

/// Rough number of content slides the chunked fallback aims for.
const FALLBACK_TARGET_SLIDES: usize = 5;

/// Fewest sentences per fallback slide.
const FALLBACK_MIN_SENTENCES: usize = 3;

/// The content generation collaborator.
pub trait ContentGenerator {
    /// Structure free text into ordered content blocks.
    fn generate(&self, text: &str, guidance: &str) -> Result<Vec<ContentBlock>, CollaboratorError>;
}

/// An ordered list of content blocks with a deck title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPlan {
    #[serde(default = "default_title")]
    pub presentation_title: String,
    pub slides: Vec<ContentBlock>,
}

fn default_title() -> String {
    DEFAULT_PRESENTATION_TITLE.to_string()
}

/// Why a generator response could not be used as a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentPlanError {
    #[error("no JSON found in response")]
    NoJson,

    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("plan has no slides")]
    Empty,

    #[error("slide {0} is missing '{1}'")]
    MissingField(usize, &'static str),
}

/// Parse a generator response into a plan.
///
/// Accepts `{"presentation_title": .., "slides": [..]}` or a bare array of
/// blocks, optionally surrounded by prose. Every slide must carry `title` and
/// `content` keys.
pub fn parse_content_plan(response: &str) -> Result<ContentPlan, ContentPlanError> {
    let value = locate_plan(response)?;

    let (title, slides) = match &value {
        serde_json::Value::Array(slides) => (None, slides),
        serde_json::Value::Object(object) => {
            let slides = object
                .get("slides")
                .and_then(|s| s.as_array())
                .ok_or(ContentPlanError::Empty)?;
            let title = object
                .get("presentation_title")
                .and_then(|t| t.as_str())
                .map(str::to_string);
            (title, slides)
        }
        _ => return Err(ContentPlanError::NoJson),
    };

    if slides.is_empty() {
        return Err(ContentPlanError::Empty);
    }
    for (idx, slide) in slides.iter().enumerate() {
        for key in ["title", "content"] {
            if slide.get(key).is_none() {
                return Err(ContentPlanError::MissingField(idx, key));
            }
        }
    }

    let slides: Vec<ContentBlock> = serde_json::from_value(serde_json::Value::Array(slides.clone()))
        .map_err(|e| ContentPlanError::Malformed(e.to_string()))?;

    Ok(ContentPlan {
        presentation_title: title.unwrap_or_else(default_title),
        slides,
    })
}

/// Find the plan JSON in a response.
///
/// The outermost `{..}` span is tried before the outermost `[..]` span, so
/// bracketed prose ahead of a plan object does not hide it. A span that parses
/// but does not look like a plan is used only when nothing better is found.
fn locate_plan(text: &str) -> Result<serde_json::Value, ContentPlanError> {
    let mut fallback = Err(ContentPlanError::NoJson);

    for span in [json_span(text, '{', '}'), json_span(text, '[', ']')]
        .into_iter()
        .flatten()
    {
        match serde_json::from_str::<serde_json::Value>(span) {
            Ok(value) if is_plan_shaped(&value) => return Ok(value),
            Ok(value) => {
                if fallback.is_err() {
                    fallback = Ok(value);
                }
            }
            Err(e) => {
                if fallback == Err(ContentPlanError::NoJson) {
                    fallback = Err(ContentPlanError::Malformed(e.to_string()));
                }
            }
        }
    }

    fallback
}

/// Text from the first `open` to the last `close`, inclusive.
fn json_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn is_plan_shaped(value: &serde_json::Value) -> bool {
    value.is_array() || value.get("slides").is_some()
}

/// Recover slides from a non-JSON response laid out as a plain outline.
///
/// Lines mentioning a slide, title, or section start a new block; other lines
/// become its bullet items.
pub fn plan_from_outline(response: &str) -> Vec<ContentBlock> {
    let mut blocks: Vec<ContentBlock> = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for line in response.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        let starts_block =
            lower.contains("slide") || lower.contains("title:") || lower.contains("section");

        if starts_block {
            if let Some(last) = blocks.last_mut() {
                *last = std::mem::take(last).with_items(std::mem::take(&mut items));
            }
            let title = line.replace("Slide", "").replace(':', "").trim().to_string();
            blocks.push(ContentBlock::new(title));
        } else if !blocks.is_empty() {
            items.push(line.to_string());
        }
    }
    if let Some(last) = blocks.last_mut() {
        *last = std::mem::take(last).with_items(items);
    }

    blocks
}

/// Chunk raw text into roughly five slides after a title slide.
pub fn fallback_blocks(text: &str) -> Vec<ContentBlock> {
    let sentences: Vec<&str> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let chunk_size = FALLBACK_MIN_SENTENCES.max(sentences.len() / FALLBACK_TARGET_SLIDES);

    let mut blocks = vec![
        ContentBlock::new("Presentation Overview").with_text("Generated from provided text content")
    ];

    for chunk in sentences.chunks(chunk_size) {
        let number = blocks.len();
        let items = chunk.iter().map(|s| terminate_sentence(s));
        blocks.push(ContentBlock::new(format!("Key Points {}", number)).with_items(items));
    }

    blocks
}

fn terminate_sentence(sentence: &str) -> String {
    if sentence.ends_with(['.', '!', '?']) {
        sentence.to_string()
    } else {
        format!("{}.", sentence)
    }
}

/// Ask the generator for blocks, substituting the chunked fallback on failure or empty output.
pub fn generate_or_fallback<G>(generator: &G, text: &str, guidance: &str) -> Vec<ContentBlock>
where
    G: ContentGenerator + ?Sized,
{
    match generator.generate(text, guidance) {
        Ok(blocks) if !blocks.is_empty() => blocks,
        Ok(_) => {
            log::warn!("Content generator returned no slides, using chunked fallback");
            fallback_blocks(text)
        }
        Err(e) => {
            log::warn!("Content generation failed ({}), using chunked fallback", e);
            fallback_blocks(text)
        }
    }
}

/// Resolve a raw generator response: JSON plan, then outline, then chunked source text.
pub fn blocks_from_response(response: &str, source_text: &str) -> Vec<ContentBlock> {
    match parse_content_plan(response) {
        Ok(plan) => plan.slides,
        Err(e) => {
            log::debug!("Response is not a content plan: {}", e);
            let outline = plan_from_outline(response);
            if outline.is_empty() {
                fallback_blocks(source_text)
            } else {
                outline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;

    #[test]
    fn test_parse_plan_object() {
        let response = r#"Sure! {"presentation_title":"Q3","total_slides":2,"slides":[
            {"slide_number":1,"title":"Intro","type":"content","content":"Hello","speaker_notes":"Say hi"},
            {"slide_number":2,"title":"Points","content":["a","b"]}]}"#;

        let plan = parse_content_plan(response).unwrap();
        assert_eq!(plan.presentation_title, "Q3");
        assert_eq!(plan.slides.len(), 2);
        assert_eq!(plan.slides[0].speaker_notes, "Say hi");
        assert_eq!(
            plan.slides[1].content,
            Some(Content::Items(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_parse_plan_bare_array() {
        let plan = parse_content_plan(r#"[{"title":"Only","content":"x"}]"#).unwrap();
        assert_eq!(plan.presentation_title, DEFAULT_PRESENTATION_TITLE);
        assert_eq!(plan.slides[0].title, "Only");
    }

    #[test]
    fn test_parse_plan_after_bracketed_prose() {
        let response = "Here is the plan [draft]:\n\
            {\"presentation_title\":\"Q\",\"slides\":[{\"title\":\"A\",\"content\":\"b\"}]}";
        let plan = parse_content_plan(response).unwrap();
        assert_eq!(plan.presentation_title, "Q");
        assert_eq!(plan.slides[0].title, "A");
        assert_eq!(plan.slides[0].content, Some(Content::Text("b".into())));

        let blocks = blocks_from_response(response, "unused source. text.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "A");
    }

    #[test]
    fn test_parse_plan_array_with_prose_around_it() {
        let response =
            r#"Slides: [{"title":"One","content":"x"},{"title":"Two","content":["y"]}] done"#;
        let plan = parse_content_plan(response).unwrap();
        assert_eq!(plan.slides.len(), 2);
        assert_eq!(plan.slides[1].title, "Two");
    }

    #[test]
    fn test_parse_plan_rejections() {
        assert_eq!(parse_content_plan("nothing"), Err(ContentPlanError::NoJson));
        assert_eq!(
            parse_content_plan(r#"{"slides":[]}"#),
            Err(ContentPlanError::Empty)
        );
        assert_eq!(
            parse_content_plan(r#"{"slides":[{"title":"x"}]}"#),
            Err(ContentPlanError::MissingField(0, "content"))
        );
        assert!(matches!(
            parse_content_plan("{oops}"),
            Err(ContentPlanError::Malformed(_))
        ));
    }

    #[test]
    fn test_plan_from_outline() {
        let response = "Slide 1: Welcome\nfirst point\nsecond point\n\nSlide 2: Wrap up\nthanks";
        let blocks = plan_from_outline(response);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "1 Welcome");
        assert_eq!(blocks[0].body_text(), "first point\nsecond point");
        assert_eq!(blocks[1].body_text(), "thanks");
    }

    #[test]
    fn test_fallback_blocks_chunks_sentences() {
        let text = (1..=20)
            .map(|i| format!("Sentence {}", i))
            .collect::<Vec<_>>()
            .join(". ");
        let blocks = fallback_blocks(&text);

        // title slide + 20 sentences in chunks of 4
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[0].title, "Presentation Overview");
        assert_eq!(blocks[1].title, "Key Points 1");
        assert_eq!(
            blocks[1].content,
            Some(Content::Items(vec![
                "Sentence 1.".into(),
                "Sentence 2.".into(),
                "Sentence 3.".into(),
                "Sentence 4.".into(),
            ]))
        );
        assert!(blocks.iter().all(|b| b.has_content()));
    }

    #[test]
    fn test_fallback_blocks_short_text() {
        let blocks = fallback_blocks("One thing. Another thing.");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].body_text(), "One thing.\nAnother thing.");

        assert_eq!(fallback_blocks("").len(), 1);
    }

    #[test]
    fn test_generate_or_fallback() {
        struct Broken;
        impl ContentGenerator for Broken {
            fn generate(&self, _: &str, _: &str) -> Result<Vec<ContentBlock>, CollaboratorError> {
                Err(CollaboratorError::new("generator", "timeout"))
            }
        }
        struct Fixed;
        impl ContentGenerator for Fixed {
            fn generate(&self, _: &str, _: &str) -> Result<Vec<ContentBlock>, CollaboratorError> {
                Ok(vec![ContentBlock::new("Given").with_text("body")])
            }
        }

        let text = "Alpha. Beta. Gamma.";
        assert_eq!(generate_or_fallback(&Broken, text, ""), fallback_blocks(text));
        assert_eq!(generate_or_fallback(&Fixed, text, "")[0].title, "Given");
    }

    #[test]
    fn test_blocks_from_response_falls_through() {
        let blocks = blocks_from_response("I cannot help with that", "One. Two.");
        assert_eq!(blocks[0].title, "Presentation Overview");
    }
}
