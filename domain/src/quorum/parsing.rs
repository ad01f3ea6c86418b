//! Response extraction for agent replies.
//!
//! Agents are instructed to wrap their answers in tags, but models often add
//! commentary around them. These functions find the first well-formed tagged
//! region and ignore everything else. They are pure domain logic: no I/O and
//! no error types, only "found" or "not found".
//!
//! | Function | Tag | Used by |
//! |----------|-----|---------|
//! | [`extract_verdict`] | `<isvalid>` + optional `<invalid_msg>` | verification and validation panels |
//! | [`extract_output`] | `<output>` | conversion agent |

/// Tag holding a panel member's true/false verdict
pub const VERDICT_TAG: &str = "isvalid";
/// Tag holding a panel member's explanation
pub const MESSAGE_TAG: &str = "invalid_msg";
/// Tag holding the conversion payload
pub const OUTPUT_TAG: &str = "output";

/// A verdict pulled out of a panel member's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedVerdict {
    pub approved: bool,
    pub message: String,
}

/// Content of the first `<tag>...</tag>` region, trimmed
///
/// Tag names are matched case-insensitively. The region runs from the first
/// opening tag to the first closing tag after it.
pub fn extract_tag<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets identical to `text`
    let lowered = text.to_ascii_lowercase();
    let open = format!("<{}>", tag.to_ascii_lowercase());
    let close = format!("</{}>", tag.to_ascii_lowercase());

    let start = lowered.find(&open)? + open.len();
    let end = start + lowered[start..].find(&close)?;
    Some(text[start..end].trim())
}

/// Extract a panel member's verdict
///
/// Returns `None` when the verdict tag is missing or holds anything other than
/// `true`/`false` (any case). The message is the `<invalid_msg>` content when
/// present, otherwise the trimmed reply.
pub fn extract_verdict(raw: &str) -> Option<ExtractedVerdict> {
    let verdict = extract_tag(raw, VERDICT_TAG)?;
    let approved = if verdict.eq_ignore_ascii_case("true") {
        true
    } else if verdict.eq_ignore_ascii_case("false") {
        false
    } else {
        return None;
    };

    let message = extract_tag(raw, MESSAGE_TAG)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| raw.trim())
        .to_string();

    Some(ExtractedVerdict { approved, message })
}

/// Extract the conversion payload
pub fn extract_output(raw: &str) -> Option<String> {
    extract_tag(raw, OUTPUT_TAG).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== extract_tag Tests ====================

    #[test]
    fn test_extract_tag_with_commentary() {
        let raw = "Sure! Here you go:\n<output>\nid,name\n1,a\n</output>\nHope that helps.";
        assert_eq!(extract_tag(raw, "output"), Some("id,name\n1,a"));
    }

    #[test]
    fn test_extract_tag_case_insensitive() {
        assert_eq!(extract_tag("<IsValid>TRUE</ISVALID>", "isvalid"), Some("TRUE"));
    }

    #[test]
    fn test_extract_tag_first_region_wins() {
        let raw = "<output>first</output> and <output>second</output>";
        assert_eq!(extract_tag(raw, "output"), Some("first"));
    }

    #[test]
    fn test_extract_tag_unclosed() {
        assert_eq!(extract_tag("<output>never closed", "output"), None);
        assert_eq!(extract_tag("</output><output>", "output"), None);
    }

    #[test]
    fn test_extract_tag_preserves_non_ascii() {
        assert_eq!(extract_tag("Ünïcode <OUTPUT>café ☕</OUTPUT>", "output"), Some("café ☕"));
    }

    // ==================== extract_verdict Tests ====================

    #[test]
    fn test_verdict_true_with_message() {
        let raw = "<isvalid>true</isvalid><invalid_msg>none</invalid_msg>";
        let verdict = extract_verdict(raw).unwrap();
        assert!(verdict.approved);
        assert_eq!(verdict.message, "none");
    }

    #[test]
    fn test_verdict_false_with_reason() {
        let raw = "Reviewing...\n<isvalid> False </isvalid>\n<invalid_msg>Column 3 is empty</invalid_msg>";
        let verdict = extract_verdict(raw).unwrap();
        assert!(!verdict.approved);
        assert_eq!(verdict.message, "Column 3 is empty");
    }

    #[test]
    fn test_verdict_without_message_uses_reply() {
        let verdict = extract_verdict("  <isvalid>TRUE</isvalid>  ").unwrap();
        assert_eq!(verdict.message, "<isvalid>TRUE</isvalid>");
    }

    #[test]
    fn test_verdict_unrecognized_value() {
        assert_eq!(extract_verdict("<isvalid>yes</isvalid>"), None);
        assert_eq!(extract_verdict("<isvalid></isvalid>"), None);
    }

    #[test]
    fn test_verdict_missing_tag() {
        assert_eq!(extract_verdict("I think this is valid."), None);
    }

    // ==================== extract_output Tests ====================

    #[test]
    fn test_output_extracted() {
        assert_eq!(extract_output("<output>{\"a\":1}</output>"), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_output_missing() {
        assert_eq!(extract_output("no tags"), None);
    }
}
