//! Tunable synthesis policy.

/// Minimum body length (in characters) at which a two-column layout is preferred
/// over falling through to generic content layouts.
pub const TWO_CONTENT_MIN_CHARS: usize = 200;

/// Body text used when a slide has neither content nor a title.
pub const GENERIC_BODY_TEXT: &str = "Content will be added here";

/// Knobs that shape how content blocks become slides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisPolicy {
    /// Body length above which `two_content` layouts are considered.
    pub two_content_min_chars: usize,

    /// Whether speaker notes are attached to slides.
    pub include_speaker_notes: bool,

    /// Body text for slides with no content and no title.
    pub generic_body_text: String,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            two_content_min_chars: TWO_CONTENT_MIN_CHARS,
            include_speaker_notes: true,
            generic_body_text: GENERIC_BODY_TEXT.to_string(),
        }
    }
}

impl SynthesisPolicy {
    /// Create a policy with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the two-content length threshold.
    pub fn with_two_content_min_chars(mut self, chars: usize) -> Self {
        self.two_content_min_chars = chars;
        self
    }

    /// Set whether speaker notes are attached.
    pub fn with_speaker_notes(mut self, include: bool) -> Self {
        self.include_speaker_notes = include;
        self
    }

    /// Set the generic body text. Blank text keeps the previous value.
    pub fn with_generic_body_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.generic_body_text = text;
        }
        self
    }
}
