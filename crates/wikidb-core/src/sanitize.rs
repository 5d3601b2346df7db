//! Character stripping for prompts that end up inside a search query.
//!
//! This only removes quote and statement-separator characters. It alters
//! legitimate text containing them and is not an escaping scheme; search
//! backends should still take the prompt as a bound parameter.

const STRIPPED: [char; 3] = ['\'', '"', ';'];

/// Remove every `'`, `"` and `;` from `input`. Case and all other characters
/// are preserved.
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| !STRIPPED.contains(c)).collect()
}
