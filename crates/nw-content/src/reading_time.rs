//! Reading-time estimate for blog posts.

use pulldown_cmark::{Event, Parser, TextMergeStream};
use serde::Serialize;

/// Average adult reading speed.
const WORDS_PER_MINUTE: f64 = 200.0;

/// Estimated reading time of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingTime {
    /// Display text, e.g. `"3 min read"`.
    pub text: String,
    /// Exact estimate in minutes.
    pub minutes: f64,
    /// Number of words counted.
    pub words: usize,
}

/// Estimate reading time from a Markdown body.
///
/// Only visible text counts: markup, link targets and HTML tags are skipped.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate(markdown: &str) -> ReadingTime {
    let words: usize = TextMergeStream::new(Parser::new(markdown))
        .map(|event| match event {
            Event::Text(text) | Event::Code(text) => text.split_whitespace().count(),
            _ => 0,
        })
        .sum();

    let minutes = words as f64 / WORDS_PER_MINUTE;
    let displayed = (minutes.ceil() as u64).max(1);

    ReadingTime {
        text: format!("{displayed} min read"),
        minutes,
        words,
    }
}
