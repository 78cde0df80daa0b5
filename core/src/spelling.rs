//! Syllable-shape validator.
//!
//! A Vietnamese syllable is `[first consonant] vowel [last consonant]`.
//! Letter groups are grouped into rows and two small matrices say which
//! first-consonant rows may precede which vowel rows, and which vowel rows
//! may precede which last-consonant rows. Every legal combination is
//! enumerated once into a [`TrieNode`], so checking a spelling is a trie walk.
//!
//! Spellings are checked toneless and lowercase; mark-less variants are
//! admitted through the trie's down-level expansion.

use once_cell::sync::Lazy;

use crate::charset::{remove_mark, remove_tone, to_lower};
use crate::trie::{MatchResult, TrieNode};

const FIRST_CONSONANTS: [&str; 3] = [
    "b d đ g gh m n nh p ph r s t tr v z",
    "c h k kh qu th",
    "ch gi l ng ngh x",
];

const VOWEL_GROUPS: [&str; 6] = [
    "ê i ua uê uy y",
    "a iê oa uyê yê",
    "â ă e o oo ô ơ oe u ư uâ uô ươ",
    "oă",
    "uơ",
    "ai ao au âu ay ây eo êu ia iêu iu oai oao oay oeo oi ôi ơi ưa uây ui ưi uôi ươi ươu ưu uya uyu yêu",
];

const LAST_CONSONANTS: [&str; 3] = ["ch nh", "c k ng", "m n p t"];

/// Vowel rows each first-consonant row may precede.
const CV_MATRIX: [&[usize]; 3] = [&[0, 1, 2, 5], &[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 5]];

/// Last-consonant rows each vowel row may precede.
const VC_MATRIX: [&[usize]; 6] = [&[0, 2], &[0, 1, 2], &[1, 2], &[1, 2], &[], &[]];

/// Last consonants that only admit the acute or dot tone.
pub const STOP_CONSONANTS: [&str; 5] = ["c", "k", "p", "t", "ch"];

static SPELLING_TRIE: Lazy<TrieNode> = Lazy::new(|| {
    let mut trie = TrieNode::new();
    for word in generate_dictionary() {
        trie.insert_with_down_levels(&word, &down_levels);
    }
    trie
});

/// Letters a decorated letter falls back to when the decoration is omitted.
fn down_levels(c: char) -> &'static [char] {
    match c {
        'á' | 'à' | 'ả' | 'ã' | 'ạ' | 'ă' | 'â' => &['a'],
        'ắ' => &['ă', 'á', 'a'],
        'ằ' => &['ă', 'à', 'a'],
        'ẳ' => &['ă', 'ả', 'a'],
        'ẵ' => &['ă', 'ã', 'a'],
        'ặ' => &['ă', 'ạ', 'a'],
        'ấ' => &['â', 'á', 'a'],
        'ầ' => &['â', 'à', 'a'],
        'ẩ' => &['â', 'ả', 'a'],
        'ẫ' => &['â', 'ã', 'a'],
        'ậ' => &['â', 'ạ', 'a'],
        'é' | 'è' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' => &['e'],
        'ế' => &['ê', 'é', 'e'],
        'ề' => &['ê', 'è', 'e'],
        'ể' => &['ê', 'ẻ', 'e'],
        'ễ' => &['ê', 'ẽ', 'e'],
        'ệ' => &['ê', 'ẹ', 'e'],
        'í' | 'ì' | 'ỉ' | 'ĩ' | 'ị' => &['i'],
        'ó' | 'ò' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ơ' => &['o'],
        'ố' => &['ô', 'ó', 'o'],
        'ồ' => &['ô', 'ò', 'o'],
        'ổ' => &['ô', 'ỏ', 'o'],
        'ỗ' => &['ô', 'õ', 'o'],
        'ộ' => &['ô', 'ọ', 'o'],
        'ớ' => &['ơ', 'ó', 'o'],
        'ờ' => &['ơ', 'ò', 'o'],
        'ở' => &['ơ', 'ỏ', 'o'],
        'ỡ' => &['ơ', 'õ', 'o'],
        'ợ' => &['ơ', 'ọ', 'o'],
        'ú' | 'ù' | 'ủ' | 'ũ' | 'ụ' | 'ư' => &['u'],
        'ứ' => &['ư', 'ú', 'u'],
        'ừ' => &['ư', 'ù', 'u'],
        'ử' => &['ư', 'ủ', 'u'],
        'ữ' => &['ư', 'ũ', 'u'],
        'ự' => &['ư', 'ụ', 'u'],
        'ý' | 'ỳ' | 'ỷ' | 'ỹ' | 'ỵ' => &['y'],
        'đ' => &['d'],
        _ => &[],
    }
}

fn row(group: &str) -> impl Iterator<Item = &str> {
    group.split(' ')
}

/// Every legal toneless syllable: bare vowels, CV, VC and CVC shapes.
pub fn generate_dictionary() -> Vec<String> {
    let mut words: Vec<String> = VOWEL_GROUPS
        .iter()
        .flat_map(|g| row(g))
        .map(str::to_string)
        .collect();

    for (c_row, v_rows) in CV_MATRIX.iter().enumerate() {
        for &v_row in v_rows.iter() {
            for c in row(FIRST_CONSONANTS[c_row]) {
                for v in row(VOWEL_GROUPS[v_row]) {
                    words.push(format!("{c}{v}"));
                }
            }
        }
    }

    for (v_row, c_rows) in VC_MATRIX.iter().enumerate() {
        for &c_row in c_rows.iter() {
            for v in row(VOWEL_GROUPS[v_row]) {
                for c in row(LAST_CONSONANTS[c_row]) {
                    words.push(format!("{v}{c}"));
                }
            }
        }
    }

    for (c1_row, v_rows) in CV_MATRIX.iter().enumerate() {
        for &v_row in v_rows.iter() {
            for &c2_row in VC_MATRIX[v_row] {
                for c1 in row(FIRST_CONSONANTS[c1_row]) {
                    for v in row(VOWEL_GROUPS[v_row]) {
                        for c2 in row(LAST_CONSONANTS[c2_row]) {
                            words.push(format!("{c1}{v}{c2}"));
                        }
                    }
                }
            }
        }
    }
    words
}

/// Look a toneless spelling up in the syllable trie.
///
/// ```
/// use libviet_core::spelling::lookup;
/// use libviet_core::trie::MatchResult;
/// assert_eq!(lookup("nghiêng"), MatchResult::MatchFull);
/// assert_eq!(lookup("nghieng"), MatchResult::MatchPrefix);
/// assert_eq!(lookup("ngh"), MatchResult::MatchPrefix);
/// assert_eq!(lookup("arch"), MatchResult::NotMatch);
/// ```
pub fn lookup(word: &str) -> MatchResult {
    SPELLING_TRIE.lookup(word)
}

/// A syllable split into its letter groups. Missing groups are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyllableParts<'a> {
    pub first: &'a str,
    pub vowel: &'a str,
    pub last: &'a str,
}

fn bare(c: char) -> char {
    to_lower(remove_mark(remove_tone(c)))
}

/// Length in chars of `pattern` if `chars` starts with it, ignoring case,
/// tones and marks.
fn match_prefix(chars: &[char], pattern: &str) -> Option<usize> {
    let mut len = 0;
    for p in pattern.chars() {
        if chars.get(len).map(|&c| bare(c)) != Some(bare(p)) {
            return None;
        }
        len += 1;
    }
    Some(len)
}

/// Split a syllable into first consonant, vowel and last consonant.
///
/// Groups are matched longest-first (a longer first consonant wins, then a
/// longer vowel) and must be compatible according to the matrices. Tones,
/// marks and case are ignored while matching; the returned slices borrow
/// from `word` and so keep its tones and marks. `None` when the word is not
/// a complete syllable.
///
/// ```
/// use libviet_core::spelling::classify;
/// let parts = classify("nghiêng").unwrap();
/// assert_eq!((parts.first, parts.vowel, parts.last), ("ngh", "iê", "ng"));
/// let parts = classify("Gió").unwrap();
/// assert_eq!((parts.first, parts.vowel, parts.last), ("Gi", "ó", ""));
/// assert!(classify("arch").is_none());
/// ```
pub fn classify(word: &str) -> Option<SyllableParts<'_>> {
    let chars: Vec<char> = word.chars().collect();
    let mut firsts: Vec<(Option<usize>, &str)> = vec![(None, "")];
    for (r, group) in FIRST_CONSONANTS.iter().enumerate() {
        firsts.extend(row(group).map(|c| (Some(r), c)));
    }

    let mut best: Option<(usize, usize, usize)> = None;
    for (c_row, first) in firsts {
        let Some(c_len) = match_prefix(&chars, first) else {
            continue;
        };
        let v_rows: Vec<usize> = match c_row {
            Some(r) => CV_MATRIX[r].to_vec(),
            None => (0..VOWEL_GROUPS.len()).collect(),
        };
        for v_row in v_rows {
            for vowel in row(VOWEL_GROUPS[v_row]) {
                let Some(v_len) = match_prefix(&chars[c_len..], vowel) else {
                    continue;
                };
                let rest = &chars[c_len + v_len..];
                let l_len = if rest.is_empty() {
                    Some(0)
                } else {
                    VC_MATRIX[v_row]
                        .iter()
                        .flat_map(|&l_row| row(LAST_CONSONANTS[l_row]))
                        .find_map(|last| match_prefix(rest, last).filter(|&n| n == rest.len()))
                };
                let Some(l_len) = l_len else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((bc, bv, _)) => (c_len, v_len) > (bc, bv),
                };
                if better {
                    best = Some((c_len, v_len, l_len));
                }
            }
        }
    }

    let (c_len, v_len, _) = best?;
    let byte_at = |n: usize| word.char_indices().nth(n).map_or(word.len(), |(i, _)| i);
    let (first_end, vowel_end) = (byte_at(c_len), byte_at(c_len + v_len));
    Some(SyllableParts {
        first: &word[..first_end],
        vowel: &word[first_end..vowel_end],
        last: &word[vowel_end..],
    })
}

pub fn is_stop_consonant(last_consonant: &str) -> bool {
    STOP_CONSONANTS.contains(&last_consonant)
}
