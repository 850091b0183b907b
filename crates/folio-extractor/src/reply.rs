//! Reducing service replies of varying shape to a single string

use folio_domain::GenerationReply;

/// One way of reading text out of a reply
pub trait ReplyNormalizer: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Text for this reply, or `None` if the reply lacks this shape
    fn normalize(&self, reply: &GenerationReply) -> Option<String>;
}

/// Reads the reply's direct text field
pub struct DirectText;

impl ReplyNormalizer for DirectText {
    fn name(&self) -> &'static str {
        "direct-text"
    }

    fn normalize(&self, reply: &GenerationReply) -> Option<String> {
        reply.text.clone().filter(|t| !t.is_empty())
    }
}

/// Joins candidate fragments with newlines
///
/// Each fragment contributes its `content`, or its `text` when `content` is
/// empty. A reply with candidates always matches, even if every fragment is
/// empty.
pub struct CandidateFragments;

impl ReplyNormalizer for CandidateFragments {
    fn name(&self) -> &'static str {
        "candidate-fragments"
    }

    fn normalize(&self, reply: &GenerationReply) -> Option<String> {
        if reply.candidates.is_empty() {
            return None;
        }

        let parts: Vec<&str> = reply
            .candidates
            .iter()
            .filter_map(|c| {
                c.content
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .or_else(|| c.text.as_deref().filter(|s| !s.is_empty()))
            })
            .collect();

        Some(parts.join("\n"))
    }
}

/// Last resort: the whole reply as a string
pub struct Stringify;

impl ReplyNormalizer for Stringify {
    fn name(&self) -> &'static str {
        "stringify"
    }

    fn normalize(&self, reply: &GenerationReply) -> Option<String> {
        Some(reply.raw.clone())
    }
}

/// Ordered normalizers; the first that matches wins
pub fn default_normalizers() -> Vec<Box<dyn ReplyNormalizer>> {
    vec![
        Box::new(DirectText),
        Box::new(CandidateFragments),
        Box::new(Stringify),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::CandidateFragment;

    fn fragment(content: Option<&str>, text: Option<&str>) -> CandidateFragment {
        CandidateFragment {
            content: content.map(String::from),
            text: text.map(String::from),
        }
    }

    #[test]
    fn test_direct_text() {
        let reply = GenerationReply::from_text("[]");
        assert_eq!(DirectText.normalize(&reply).as_deref(), Some("[]"));

        let empty = GenerationReply {
            text: Some(String::new()),
            ..Default::default()
        };
        assert!(DirectText.normalize(&empty).is_none());
    }

    #[test]
    fn test_candidate_fragments_prefer_content_then_text() {
        let reply = GenerationReply {
            text: None,
            candidates: vec![
                fragment(Some("one"), Some("ignored")),
                fragment(None, Some("two")),
                fragment(Some(""), None),
            ],
            raw: String::new(),
        };
        assert_eq!(
            CandidateFragments.normalize(&reply).as_deref(),
            Some("one\ntwo")
        );
    }

    #[test]
    fn test_candidate_fragments_without_candidates() {
        assert!(CandidateFragments
            .normalize(&GenerationReply::default())
            .is_none());
    }

    #[test]
    fn test_empty_candidates_still_match() {
        let reply = GenerationReply {
            text: None,
            candidates: vec![fragment(None, None)],
            raw: "{\"candidates\":[{}]}".to_string(),
        };
        assert_eq!(CandidateFragments.normalize(&reply).as_deref(), Some(""));
    }

    #[test]
    fn test_stringify_always_matches() {
        let reply = GenerationReply {
            raw: "Reply(blocked)".to_string(),
            ..Default::default()
        };
        assert_eq!(
            Stringify.normalize(&reply).as_deref(),
            Some("Reply(blocked)")
        );
    }

    #[test]
    fn test_default_order() {
        let names: Vec<_> = default_normalizers().iter().map(|n| n.name()).collect();
        assert_eq!(names, ["direct-text", "candidate-fragments", "stringify"]);
    }
}
