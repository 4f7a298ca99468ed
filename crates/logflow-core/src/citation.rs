//! Citation scanning for AI-generated analysis text.
//!
//! Analyses reference individual log records with the literal marker
//! `[Log #<digits>]`. The extractor turns those markers into addressable
//! spans so a view can render them distinctly and raise a highlight when
//! one is activated.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::LogId;

fn citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[Log #(\d+)\]").expect("citation pattern compiles"))
}

/// One piece of a partitioned analysis text, in original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Citation(LogId),
}

/// First citation in `text`, if any.
pub fn extract_citation(text: &str) -> Option<LogId> {
    citation_re()
        .captures(text)
        .map(|caps| LogId::from_citation(&caps[1]))
}

/// Every citation in `text`, in order of appearance.
pub fn extract_citations(text: &str) -> Vec<LogId> {
    citation_re()
        .captures_iter(text)
        .map(|caps| LogId::from_citation(&caps[1]))
        .collect()
}

/// Partition `text` into literal and citation segments, preserving order.
///
/// Decorative symbols are stripped uniformly first; apart from that pass,
/// concatenating the literal segments reproduces the input byte for byte.
pub fn split_for_rendering(text: &str) -> Vec<Segment> {
    let cleaned = strip_decorations(text);
    let mut segments = Vec::new();
    let mut cursor = 0;
    for caps in citation_re().captures_iter(&cleaned) {
        let whole = caps.get(0).expect("group 0 always present");
        if whole.start() > cursor {
            segments.push(Segment::Text(cleaned[cursor..whole.start()].to_string()));
        }
        segments.push(Segment::Citation(LogId::from_citation(&caps[1])));
        cursor = whole.end();
    }
    if cursor < cleaned.len() {
        segments.push(Segment::Text(cleaned[cursor..].to_string()));
    }
    segments
}

/// Drop emoji and related presentation characters the AI sprinkles into
/// its prose. Text, punctuation, and whitespace pass through untouched.
pub fn strip_decorations(text: &str) -> String {
    text.chars().filter(|c| !is_decoration(*c)).collect()
}

fn is_decoration(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF    // pictographs, transport, supplemental symbols
        | 0x2600..=0x27BF    // misc symbols and dingbats
        | 0x2B00..=0x2BFF    // arrows, stars
        | 0xFE0F             // emoji variation selector
        | 0x200D             // zero-width joiner
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_citation() {
        assert_eq!(
            extract_citation("See [Log #42] for detail"),
            Some(LogId::Number(42))
        );
    }

    #[test]
    fn no_citation_yields_none() {
        assert_eq!(extract_citation("no citation here"), None);
        assert_eq!(extract_citation("[Log #] missing digits"), None);
    }

    #[test]
    fn extracts_all_citations_in_order() {
        let ids = extract_citations("[Log #3] then [Log #1] then [Log #3]");
        assert_eq!(
            ids,
            vec![LogId::Number(3), LogId::Number(1), LogId::Number(3)]
        );
    }

    #[test]
    fn split_isolates_citations() {
        let segments = split_for_rendering("before [Log #7] after");
        assert_eq!(
            segments,
            vec![
                Segment::Text("before ".to_string()),
                Segment::Citation(LogId::Number(7)),
                Segment::Text(" after".to_string()),
            ]
        );
    }

    #[test]
    fn literal_parts_reproduce_stripped_input() {
        let input = "🔍 root cause near [Log #12], confirmed by [Log #13] ✅ done";
        let stripped = strip_decorations(input);
        let rebuilt: String = split_for_rendering(input)
            .into_iter()
            .map(|s| match s {
                Segment::Text(t) => t,
                Segment::Citation(id) => format!("[Log #{id}]"),
            })
            .collect();
        assert_eq!(rebuilt, stripped);
    }

    #[test]
    fn plain_text_survives_stripping() {
        let input = "latency p99=450ms, attempts=3 (auth-service)";
        assert_eq!(strip_decorations(input), input);
    }
}
