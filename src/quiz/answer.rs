//! Answer normalization and matching.
//!
//! An expected field like `"Run, Sprint / Dash"` is a set of alternatives:
//! lowercase it, split on `,` `;` `/`, trim each segment and collapse
//! internal whitespace runs. The user's input goes through the same
//! normalization and must match one alternative exactly, so "running" never
//! passes for "run".

/// Delimiters separating alternative answers inside one field.
const ALTERNATIVE_DELIMITERS: [char; 3] = [',', ';', '/'];

/// Trims, lowercases, and collapses whitespace runs to single spaces.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// All normalized alternatives of an expected answer field.
pub fn accepted_answers(expected: &str) -> Vec<String> {
    expected
        .to_lowercase()
        .split(ALTERNATIVE_DELIMITERS)
        .map(normalize)
        .collect()
}

pub fn is_correct(expected: &str, input: &str) -> bool {
    let normalized = normalize(input);
    accepted_answers(expected)
        .iter()
        .any(|alt| *alt == normalized)
}
