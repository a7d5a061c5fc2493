//! Query tokenizer: lowercase, whitespace split, short words dropped.

/// Tokens must be longer than this many characters to survive.
pub const MIN_TOKEN_LEN: usize = 3;

/// Lowercased tokens longer than `MIN_TOKEN_LEN` characters, in message order.
/// Duplicates are kept; the ranker counts distinct tokens itself.
pub fn tokenize(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}
