use std::fmt;

/// Longest match string accepted, in bytes. Longer input is truncated.
pub const MAX_MATCH_LEN: usize = 511;

/// Bounded, already-decoded console match string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchString(String);

impl MatchString {
    pub fn new(text: &str) -> Self {
        MatchString(truncate_to_boundary(text, MAX_MATCH_LEN).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive substring test against `haystack`.
    pub fn found_in(&self, haystack: &str) -> bool {
        contains_ignore_case(haystack, &self.0)
    }
}

impl From<&str> for MatchString {
    fn from(value: &str) -> Self {
        MatchString::new(value)
    }
}

impl fmt::Display for MatchString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ASCII case-insensitive substring containment. An empty needle is found in
/// any haystack.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return true;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

fn truncate_to_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
