use serde::{Deserialize, Serialize};

/// Characters removed before answers are compared.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Lowercase, drop the stripped punctuation set, and collapse whitespace runs
/// into single spaces with no leading or trailing whitespace.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|ch| !STRIPPED_PUNCTUATION.contains(ch))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_correct(user: &str, expected: &str) -> bool {
    normalize(user) == normalize(expected)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDiff {
    pub word: String,
    pub is_correct: bool,
    pub is_missing: bool,
    pub is_extra: bool,
}

/// Position-by-position token comparison for feedback highlighting.
///
/// Tokens are case-folded but punctuation is kept. The comparison is purely
/// positional: one inserted or omitted word shifts every later position.
pub fn compare_words(user: &str, expected: &str) -> Vec<WordDiff> {
    let user = user.to_lowercase();
    let expected = expected.to_lowercase();
    let user_words: Vec<&str> = user.split_whitespace().collect();
    let expected_words: Vec<&str> = expected.split_whitespace().collect();

    let len = user_words.len().max(expected_words.len());
    (0..len)
        .map(|i| {
            let user_word = user_words.get(i).copied();
            let expected_word = expected_words.get(i).copied();
            WordDiff {
                word: user_word.or(expected_word).unwrap_or_default().to_string(),
                is_correct: user_word == expected_word,
                is_missing: user_word.is_none() && expected_word.is_some(),
                is_extra: user_word.is_some() && expected_word.is_none(),
            }
        })
        .collect()
}
