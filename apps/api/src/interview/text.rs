/// Answers shorter than this (after cleanup) are treated as not heard.
pub const MIN_ANSWER_CHARS: usize = 5;

/// Stand-in answer graded when nothing usable was transcribed.
pub const PLACEHOLDER_ANSWER: &str =
    "I have experience with this skill and have used it in projects.";

/// Collapses immediate word repetitions ("I I think think so") that speech
/// recognition produces for stuttered speech. Case-insensitive; keeps the
/// first spelling.
pub fn clean_stutter(text: &str) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if cleaned
            .last()
            .is_some_and(|prev| prev.to_lowercase() == word.to_lowercase())
        {
            continue;
        }
        cleaned.push(word);
    }
    cleaned.join(" ")
}

/// Cleans a transcript and substitutes the placeholder when it is unusable.
/// Returns the answer text and whether the placeholder was used.
pub fn normalize_answer(transcript: Option<&str>) -> (String, bool) {
    let cleaned = transcript.map(clean_stutter).unwrap_or_default();
    if cleaned.trim().chars().count() < MIN_ANSWER_CHARS {
        return (PLACEHOLDER_ANSWER.to_string(), true);
    }
    (cleaned, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_stutter_collapses_repeats() {
        assert_eq!(
            clean_stutter("I I think think that Rust rust is great"),
            "I think that Rust is great"
        );
    }

    #[test]
    fn test_clean_stutter_keeps_non_adjacent_repeats() {
        assert_eq!(clean_stutter("a b a b"), "a b a b");
    }

    #[test]
    fn test_clean_stutter_normalizes_whitespace() {
        assert_eq!(clean_stutter("  hello   world \n"), "hello world");
        assert_eq!(clean_stutter(""), "");
    }

    #[test]
    fn test_normalize_answer_uses_placeholder_for_silence() {
        assert_eq!(normalize_answer(None), (PLACEHOLDER_ANSWER.to_string(), true));
        assert_eq!(
            normalize_answer(Some("uh uh")),
            (PLACEHOLDER_ANSWER.to_string(), true)
        );
    }

    #[test]
    fn test_normalize_answer_passes_real_answer() {
        let (answer, placeholder) = normalize_answer(Some("Borrowing borrowing lets you share"));
        assert_eq!(answer, "Borrowing lets you share");
        assert!(!placeholder);
    }
}
