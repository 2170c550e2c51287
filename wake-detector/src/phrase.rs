//! Wake-phrase and command matching
//!
//! Substring heuristics over lower-cased transcripts. The wake variants
//! absorb recognizer homophones of the intended phrase; command
//! classification is keyword co-occurrence, not language understanding.

use device_authority::CommandKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical wake word reported in detection events
pub const WAKE_WORD: &str = "hey sri";

/// Homophones the recognizer produces for the wake phrase
const WAKE_VARIANTS: &[&str] = &[
    "hey sri",
    "hey s r i",
    "hey siri",
    "hey shri",
    "hey shree",
    "hey three",
    "hey serie",
];

static WAKE_STRIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"hey\s*(sri|siri|serie|shri|shree|three)").expect("wake strip pattern")
});

static CALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"call\s*").expect("call pattern"));

static MESSAGE_TARGET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"message\s*to\s*(.+)").expect("message target pattern"));

static OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"open\s*").expect("open pattern"));

/// True when the text contains any accepted form of the wake phrase.
/// Matching is case-insensitive; the caller keeps the original text.
pub fn contains_wake_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    WAKE_VARIANTS.iter().any(|variant| lower.contains(variant))
}

/// Classify a transcript fragment as a command.
///
/// The wake phrase is stripped first so "hey sri lock my phone" classifies
/// the same as "lock my phone". Classification order is fixed: lock, call,
/// message, open.
pub fn classify_command(text: &str) -> Option<CommandKind> {
    let lower = text.to_lowercase();
    let cleaned = WAKE_STRIP_RE.replace_all(&lower, "");
    let cleaned = cleaned.trim();

    if cleaned.contains("lock")
        && (cleaned.contains("phone") || cleaned.contains("device") || cleaned.contains("screen"))
    {
        return Some(CommandKind::Lock);
    }

    if cleaned.contains("call") {
        let target = CALL_RE.replace(cleaned, "").trim().to_string();
        return Some(CommandKind::Call { target });
    }

    if cleaned.contains("send") && cleaned.contains("message") {
        let target = MESSAGE_TARGET_RE
            .captures(cleaned)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());
        return Some(CommandKind::Message { target });
    }

    if cleaned.contains("open") {
        let target = OPEN_RE.replace(cleaned, "").trim().to_string();
        return Some(CommandKind::Open { target });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("hey sri" ; "canonical")]
    #[test_case("hey s r i" ; "letter by letter")]
    #[test_case("hey siri" ; "siri homophone")]
    #[test_case("hey shri" ; "shri homophone")]
    #[test_case("hey shree" ; "shree homophone")]
    #[test_case("hey three" ; "three homophone")]
    #[test_case("hey serie" ; "serie homophone")]
    fn wake_variant_matches(text: &str) {
        assert!(contains_wake_phrase(text));
    }

    #[test_case("HEY SRI" ; "upper case")]
    #[test_case("okay Hey Siri please" ; "embedded in phrase")]
    fn wake_match_is_case_insensitive(text: &str) {
        assert!(contains_wake_phrase(text));
    }

    #[test_case("" ; "empty")]
    #[test_case("hello there" ; "unrelated")]
    #[test_case("hey, sri" ; "comma splits the phrase")]
    fn non_wake_text_does_not_match(text: &str) {
        assert!(!contains_wake_phrase(text));
    }

    #[test_case("lock my phone")]
    #[test_case("lock the device")]
    #[test_case("please lock the screen now")]
    #[test_case("LOCK THE SCREEN")]
    fn lock_command_matches(text: &str) {
        assert_eq!(classify_command(text), Some(CommandKind::Lock));
    }

    #[test_case("lock it down" ; "lock without object")]
    #[test_case("charge my phone" ; "no lock keyword")]
    #[test_case("hello world" ; "unrelated")]
    fn non_commands_do_not_match(text: &str) {
        assert_eq!(classify_command(text), None);
    }

    #[test]
    fn substring_matching_accepts_embedded_keywords() {
        // Keyword co-occurrence is substring-based: "unblock" contains "lock".
        assert_eq!(classify_command("unblock my phone"), Some(CommandKind::Lock));
    }

    #[test]
    fn wake_prefix_is_stripped_before_classification() {
        assert_eq!(
            classify_command("hey siri lock my phone"),
            Some(CommandKind::Lock)
        );
        // Without stripping, "hey three" would leave no command keywords.
        assert_eq!(classify_command("hey three open camera").map(|c| c.name()), Some("open"));
    }

    #[test]
    fn call_command_extracts_target() {
        assert_eq!(
            classify_command("call mom"),
            Some(CommandKind::Call {
                target: "mom".to_string()
            })
        );
    }

    #[test]
    fn message_command_extracts_target() {
        assert_eq!(
            classify_command("send a message to alex"),
            Some(CommandKind::Message {
                target: Some("alex".to_string())
            })
        );
        assert_eq!(
            classify_command("send message"),
            Some(CommandKind::Message { target: None })
        );
    }

    #[test]
    fn open_command_extracts_target() {
        assert_eq!(
            classify_command("open camera"),
            Some(CommandKind::Open {
                target: "camera".to_string()
            })
        );
    }

    #[test]
    fn lock_wins_over_other_classes() {
        // "call" also appears, but lock is classified first.
        assert_eq!(
            classify_command("lock the phone and call mom"),
            Some(CommandKind::Lock)
        );
    }
}
