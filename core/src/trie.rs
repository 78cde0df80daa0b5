/// Prefix trie for syllable-shape validation.
use std::collections::HashMap;

use crate::charset::to_lower;

/// Outcome of looking a letter sequence up in the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    NotMatch,
    /// The sequence can still grow into a complete syllable.
    MatchPrefix,
    MatchFull,
}

/// A prefix tree over syllable spellings.
///
/// Besides plain inserts, a syllable can be inserted together with its
/// "down-level" spellings: a letter with a diacritic also accepts the same
/// letter without it (`ươ` also admits `uo`, `ưo`, `uơ`). A spelling reached
/// through a down-level letter that is not the last one is only a prefix, so
/// an undecorated letter in the middle of a word never counts as complete.
///
/// # Example
/// ```
/// use libviet_core::trie::{MatchResult, TrieNode};
///
/// let mut trie = TrieNode::new();
/// trie.insert("ngh");
/// trie.insert("nghe");
///
/// assert!(trie.contains_word("ngh"));
/// assert!(!trie.contains_word("ng"));
/// assert_eq!(trie.lookup("ng"), MatchResult::MatchPrefix);
/// assert_eq!(trie.lookup("NGHE"), MatchResult::MatchFull);
/// assert_eq!(trie.lookup("ngx"), MatchResult::NotMatch);
/// ```
#[derive(Debug, Default)]
pub struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    is_end: bool,
}

impl TrieNode {
    /// Create a new empty trie root.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            is_end: false,
        }
    }

    /// Insert a spelling as-is.
    pub fn insert(&mut self, word: &str) {
        let mut node = self;
        for ch in word.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.is_end = true;
    }

    /// Insert a spelling and every spelling obtained by replacing letters
    /// with their down-level forms as given by `down_levels`.
    pub fn insert_with_down_levels<F>(&mut self, word: &str, down_levels: &F)
    where
        F: Fn(char) -> &'static [char],
    {
        let chars: Vec<char> = word.chars().collect();
        self.insert_chars(&chars, false, down_levels);
    }

    fn insert_chars<F>(&mut self, chars: &[char], down: bool, down_levels: &F)
    where
        F: Fn(char) -> &'static [char],
    {
        let Some((&first, rest)) = chars.split_first() else {
            return;
        };
        let child = self
            .children
            .entry(first)
            .or_insert_with(|| Box::new(TrieNode::new()));
        if rest.is_empty() {
            child.is_end |= !down;
        } else {
            child.insert_chars(rest, down, down_levels);
        }

        for &lower_level in down_levels(first) {
            let child = self
                .children
                .entry(lower_level)
                .or_insert_with(|| Box::new(TrieNode::new()));
            if rest.is_empty() {
                child.is_end = true;
            } else {
                child.insert_chars(rest, true, down_levels);
            }
        }
    }

    /// Check whether the trie contains exactly the given word.
    pub fn contains_word(&self, word: &str) -> bool {
        self.lookup(word) == MatchResult::MatchFull
    }

    /// Look a sequence up, ignoring case.
    pub fn lookup(&self, word: &str) -> MatchResult {
        let mut node = self;
        for ch in word.chars() {
            match node.children.get(&to_lower(ch)) {
                Some(child) => node = child,
                None => return MatchResult::NotMatch,
            }
        }
        if node.is_end {
            MatchResult::MatchFull
        } else {
            MatchResult::MatchPrefix
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_down_levels(_: char) -> &'static [char] {
        &[]
    }

    fn strip_hats(c: char) -> &'static [char] {
        match c {
            'â' => &['a'],
            'ê' => &['e'],
            _ => &[],
        }
    }

    #[test]
    fn test_basic_insert_and_contains() {
        let mut trie = TrieNode::new();
        trie.insert("an");
        trie.insert("anh");
        trie.insert_with_down_levels("em", &no_down_levels);

        assert!(trie.contains_word("an"));
        assert!(trie.contains_word("anh"));
        assert!(trie.contains_word("em"));
        assert!(!trie.contains_word("a"));
        assert!(!trie.contains_word("e"));
    }

    #[test]
    fn test_lookup_prefix_and_case() {
        let mut trie = TrieNode::new();
        trie.insert("nghieng");
        assert_eq!(trie.lookup(""), MatchResult::MatchPrefix);
        assert_eq!(trie.lookup("Nghi"), MatchResult::MatchPrefix);
        assert_eq!(trie.lookup("NGHIENG"), MatchResult::MatchFull);
        assert_eq!(trie.lookup("nghiengx"), MatchResult::NotMatch);
    }

    #[test]
    fn test_down_level_at_last_letter_is_full() {
        let mut trie = TrieNode::new();
        trie.insert_with_down_levels("tâ", &strip_hats);
        assert_eq!(trie.lookup("tâ"), MatchResult::MatchFull);
        assert_eq!(trie.lookup("ta"), MatchResult::MatchFull);
    }

    #[test]
    fn test_down_level_in_the_middle_is_prefix() {
        let mut trie = TrieNode::new();
        trie.insert_with_down_levels("tên", &strip_hats);
        assert_eq!(trie.lookup("tên"), MatchResult::MatchFull);
        assert_eq!(trie.lookup("ten"), MatchResult::MatchPrefix);
    }
}
