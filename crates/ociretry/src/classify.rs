//! Failure classification
//!
//! Turns the provider's diagnostic text into a [`FailureClass`]. The class
//! only decides whether the next attempt moves to another availability
//! domain; every class is retried.

/// Phrases the provider uses when a domain has no room for the shape.
pub const CAPACITY_PHRASES: &[&str] = &["out of host capacity", "out of capacity"];

/// Markers of an ordinary provider or CLI failure.
pub const FAILURE_MARKERS: &[&str] = &["error", "failed"];

/// Diagnostic text shown to the operator is cut to this many characters.
pub const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// Category of a failed or ambiguous launch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// The targeted domain is out of capacity; try the next one
    CapacityExhausted,

    /// Some other reported failure; stay on the same domain
    Generic,

    /// Nothing recognisable in the response; stay on the same domain
    Unclassified,
}

impl FailureClass {
    /// Whether this failure advances the domain rotation.
    pub fn rotates_domain(self) -> bool {
        matches!(self, Self::CapacityExhausted)
    }

    /// Short label for logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::CapacityExhausted => "capacity_exhausted",
            Self::Generic => "generic",
            Self::Unclassified => "unclassified",
        }
    }
}

/// Classify diagnostic text. Case-insensitive; capacity phrases win.
pub fn classify(text: &str) -> FailureClass {
    let text = text.to_lowercase();

    if CAPACITY_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        FailureClass::CapacityExhausted
    } else if FAILURE_MARKERS.iter().any(|marker| text.contains(marker)) {
        FailureClass::Generic
    } else {
        FailureClass::Unclassified
    }
}

/// First [`MAX_DIAGNOSTIC_CHARS`] characters of `text`, surrounding whitespace removed.
pub fn truncate_diagnostic(text: &str) -> &str {
    let text = text.trim();
    match text.char_indices().nth(MAX_DIAGNOSTIC_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::oci_service_error(
        r#"ServiceError: {"code": "InternalError", "message": "Out of host capacity.", "status": 500}"#,
        FailureClass::CapacityExhausted
    )]
    #[case::short_phrase("Out of capacity for shape VM.Standard.A1.Flex", FailureClass::CapacityExhausted)]
    #[case::shouting("OUT OF HOST CAPACITY", FailureClass::CapacityExhausted)]
    #[case::not_authorized(
        r#"ServiceError: {"code": "NotAuthorizedOrNotFound", "status": 404}"#,
        FailureClass::Generic
    )]
    #[case::failed("Request failed: connection reset", FailureClass::Generic)]
    #[case::empty("", FailureClass::Unclassified)]
    #[case::timeout_text("Timeout waiting for instance", FailureClass::Unclassified)]
    #[case::limit("LimitExceeded: service limit reached", FailureClass::Unclassified)]
    fn test_classify(#[case] text: &str, #[case] expected: FailureClass) {
        assert_eq!(classify(text), expected);
    }

    #[test]
    fn test_only_capacity_rotates() {
        assert!(FailureClass::CapacityExhausted.rotates_domain());
        assert!(!FailureClass::Generic.rotates_domain());
        assert!(!FailureClass::Unclassified.rotates_domain());
    }

    #[test]
    fn test_truncate_diagnostic() {
        let long = "x".repeat(500);
        assert_eq!(truncate_diagnostic(&long).len(), MAX_DIAGNOSTIC_CHARS);
        assert_eq!(truncate_diagnostic("  short error\n"), "short error");

        // Multi-byte characters are never split.
        let wide = "é".repeat(300);
        assert_eq!(truncate_diagnostic(&wide).chars().count(), MAX_DIAGNOSTIC_CHARS);
    }

    proptest! {
        #[test]
        fn classification_is_a_pure_function(text in ".{0,300}") {
            prop_assert_eq!(classify(&text), classify(&text));
        }

        #[test]
        fn capacity_phrase_always_wins(prefix in "[a-zA-Z :]{0,40}", suffix in "[a-zA-Z :]{0,40}") {
            let text = format!("{prefix}Error: Out of host capacity{suffix}");
            prop_assert_eq!(classify(&text), FailureClass::CapacityExhausted);
        }
    }
}
