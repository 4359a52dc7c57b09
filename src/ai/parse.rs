//! Splitting a free-text model reply into summary and recommendations.

use crate::models::Analysis;

/// Section headers that open the recommendations part of a reply.
pub const DEFAULT_SECTION_HEADERS: &[&str] = &[
    "recommendations:",
    "recommendation:",
    "suggested actions:",
    "next steps:",
    "action items:",
    "handlungsempfehlungen:",
    "empfehlungen:",
];

pub const REVIEW_PLACEHOLDER: &str =
    "Please review the analysis above for detailed recommendations.";

/// Markdown decoration left around a header such as `**Recommendations:**`.
const DECORATION: &[char] = &['*', '#', '_'];

/// Split `text` at the earliest section header (case-insensitive), else at
/// the first period at or after the midpoint, else keep the whole text as
/// summary and use [`REVIEW_PLACEHOLDER`].
pub fn split_response(text: &str, headers: &[&str]) -> Analysis {
    let text = text.trim();

    if let Some((start, len)) = find_header(text, headers) {
        return Analysis {
            summary: tidy_end(&text[..start]),
            recommendations: tidy_start(&text[start + len..]),
        };
    }

    if let Some(period) = period_after_midpoint(text) {
        let recommendations = text[period + 1..].trim().to_string();
        return Analysis {
            summary: text[..=period].trim().to_string(),
            recommendations: if recommendations.is_empty() {
                REVIEW_PLACEHOLDER.to_string()
            } else {
                recommendations
            },
        };
    }

    Analysis {
        summary: text.to_string(),
        recommendations: REVIEW_PLACEHOLDER.to_string(),
    }
}

/// Byte offset and length of the earliest header; the longer header wins a
/// tie. ASCII lowercasing keeps offsets aligned with `text`.
fn find_header(text: &str, headers: &[&str]) -> Option<(usize, usize)> {
    let haystack = text.to_ascii_lowercase();
    headers
        .iter()
        .filter(|h| !h.is_empty())
        .filter_map(|h| {
            let needle = h.to_ascii_lowercase();
            haystack.find(&needle).map(|pos| (pos, needle.len()))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
}

fn period_after_midpoint(text: &str) -> Option<usize> {
    let mut mid = text.len() / 2;
    while !text.is_char_boundary(mid) {
        mid += 1;
    }
    text[mid..].find('.').map(|offset| mid + offset)
}

fn tidy_end(part: &str) -> String {
    part.trim_end().trim_end_matches(DECORATION).trim().to_string()
}

fn tidy_start(part: &str) -> String {
    part.trim_start().trim_start_matches(DECORATION).trim().to_string()
}
