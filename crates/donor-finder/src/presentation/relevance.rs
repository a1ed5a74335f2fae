use regex::RegexBuilder;

pub const MAX_STARS: u8 = 5;

/// Maps a relevance score onto 0..=5 filled stars, rounding to the nearest
/// star. Scores outside [0, 1] clamp; NaN renders as no stars.
pub fn star_rating(score: f64) -> u8 {
    if !score.is_finite() {
        return if score == f64::INFINITY { MAX_STARS } else { 0 };
    }
    (score * f64::from(MAX_STARS))
        .round()
        .clamp(0.0, f64::from(MAX_STARS)) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment {
    pub text: String,
    pub matched: bool,
}

/// Splits `text` into runs that do and do not match `query`, case-insensitively.
/// The query is matched literally; regex metacharacters carry no meaning.
pub fn highlight_segments(text: &str, query: Option<&str>) -> Vec<HighlightSegment> {
    let plain = || {
        vec![HighlightSegment {
            text: text.to_string(),
            matched: false,
        }]
    };

    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return plain();
    };
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return plain();
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(HighlightSegment {
                text: text[cursor..found.start()].to_string(),
                matched: false,
            });
        }
        segments.push(HighlightSegment {
            text: found.as_str().to_string(),
            matched: true,
        });
        cursor = found.end();
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(HighlightSegment {
            text: text[cursor..].to_string(),
            matched: false,
        });
    }
    segments
}
