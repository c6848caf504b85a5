//! Case-insensitive text helpers shared by the pipeline stages and the scorers.

use std::collections::HashSet;

use regex::Regex;

/// Trims, drops empties, and removes case-insensitive duplicates, keeping the
/// first spelling seen.
pub fn dedup_case_insensitive<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive whole-word matcher for one job keyword. "Java" does not
/// match inside "JavaScript" and "Go" does not match inside "MongoDB". Edges
/// of the keyword that are punctuation ("C++", ".NET") match without a
/// boundary check on that side.
pub struct WordMatcher {
    pattern: Regex,
    left_boundary: bool,
    right_boundary: bool,
}

impl WordMatcher {
    /// `None` for blank keywords.
    pub fn new(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        let first = keyword.chars().next()?;
        let last = keyword.chars().next_back()?;
        let pattern = Regex::new(&format!("(?i){}", regex::escape(keyword))).ok()?;
        Some(Self {
            pattern,
            left_boundary: is_word_char(first),
            right_boundary: is_word_char(last),
        })
    }

    /// Non-overlapping whole-word occurrences in `haystack`.
    pub fn count(&self, haystack: &str) -> usize {
        self.pattern
            .find_iter(haystack)
            .filter(|m| {
                let before = haystack[..m.start()].chars().next_back();
                let after = haystack[m.end()..].chars().next();
                !(self.left_boundary && before.is_some_and(is_word_char))
                    && !(self.right_boundary && after.is_some_and(is_word_char))
            })
            .count()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.count(haystack) > 0
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
