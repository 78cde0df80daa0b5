//! Tone and mark algebra over Vietnamese letters.
//!
//! Every base vowel owns a run of six consecutive slots in [`VOWELS`]
//! (plain, grave, acute, hook, tilde, dot), so adding or reading a tone is
//! slot arithmetic. Marks (circumflex, breve, horn, stroke) are resolved
//! through a small per-letter family table; tones are stripped before the
//! lookup and restored afterwards so the two kinds of diacritic commute.
//!
//! All functions preserve the case of their input.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Vowels in tone-run order: `a à á ả ã ạ ă ằ ...`.
pub const VOWELS: &str =
    "aàáảãạăằắẳẵặâầấẩẫậeèéẻẽẹêềếểễệiìíỉĩịoòóỏõọôồốổỗộơờớởỡợuùúủũụưừứửữựyỳýỷỹỵ";

static VOWEL_TABLE: Lazy<Vec<char>> = Lazy::new(|| VOWELS.chars().collect());

const TONES_PER_VOWEL: usize = 6;

/// Tone marks, numbered by their slot inside a vowel run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tone {
    #[default]
    None = 0,
    Grave = 1,
    Acute = 2,
    Hook = 3,
    Tilde = 4,
    Dot = 5,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::None,
        Tone::Grave,
        Tone::Acute,
        Tone::Hook,
        Tone::Tilde,
        Tone::Dot,
    ];

    fn from_slot(slot: usize) -> Tone {
        Tone::ALL.get(slot).copied().unwrap_or(Tone::None)
    }
}

/// Letter marks, numbered by their slot inside a mark family.
///
/// `Raw` is not a diacritic: it replaces the target letter with the key that
/// produced it, which is how a double-tapped effect key reverts to a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mark {
    #[default]
    None = 0,
    Circumflex = 1,
    Breve = 2,
    Horn = 3,
    Stroke = 4,
    Raw = 5,
}

impl Mark {
    fn from_slot(slot: usize) -> Option<Mark> {
        match slot {
            0 => Some(Mark::None),
            1 => Some(Mark::Circumflex),
            2 => Some(Mark::Breve),
            3 => Some(Mark::Horn),
            4 => Some(Mark::Stroke),
            _ => None,
        }
    }
}

/// Five-slot mark family of a toneless lowercase letter; `_` marks an
/// unsupported slot.
fn mark_family(c: char) -> Option<&'static str> {
    match c {
        'a' | 'â' | 'ă' => Some("aâă__"),
        'e' | 'ê' => Some("eê___"),
        'o' | 'ô' | 'ơ' => Some("oô_ơ_"),
        'u' | 'ư' => Some("u__ư_"),
        'd' | 'đ' => Some("d___đ"),
        _ => None,
    }
}

pub(crate) fn to_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

pub(crate) fn to_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Apply `f` to the lowercase form of `c` and restore the original case.
fn keep_case(c: char, f: impl Fn(char) -> char) -> char {
    if c.is_uppercase() {
        to_upper(f(to_lower(c)))
    } else {
        f(c)
    }
}

fn vowel_position(c: char) -> Option<usize> {
    let c = to_lower(c);
    VOWEL_TABLE.iter().position(|&v| v == c)
}

pub fn is_vowel(c: char) -> bool {
    vowel_position(c).is_some()
}

/// ASCII letters, every toned/marked vowel, and `đ`.
pub fn is_vietnamese_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || is_vowel(c) || to_lower(c) == 'đ'
}

pub fn is_punctuation_mark(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Characters that can end a word when typed: anything but a letter, so
/// digits and non-ASCII punctuation too. Keys of the active input method are
/// exempted by the caller.
pub fn is_word_break_symbol(c: char) -> bool {
    !c.is_alphabetic()
}

pub fn find_tone_from_char(c: char) -> Tone {
    vowel_position(c)
        .map(|pos| Tone::from_slot(pos % TONES_PER_VOWEL))
        .unwrap_or(Tone::None)
}

/// Put `tone` on `c`, replacing any tone it already carries. Non-vowels are
/// returned unchanged.
pub fn add_tone(c: char, tone: Tone) -> char {
    keep_case(c, |c| match vowel_position(c) {
        Some(pos) => VOWEL_TABLE[pos - pos % TONES_PER_VOWEL + tone as usize],
        None => c,
    })
}

pub fn remove_tone(c: char) -> char {
    add_tone(c, Tone::None)
}

/// Mark carried by `c`, or `None` when `c` has no mark family.
///
/// ```
/// use libviet_core::charset::{find_mark_from_char, Mark};
/// assert_eq!(find_mark_from_char('ư'), Some(Mark::Horn));
/// assert_eq!(find_mark_from_char('ấ'), Some(Mark::Circumflex));
/// assert_eq!(find_mark_from_char('a'), Some(Mark::None));
/// assert_eq!(find_mark_from_char('b'), None);
/// ```
pub fn find_mark_from_char(c: char) -> Option<Mark> {
    let base = to_lower(remove_tone(c));
    let family = mark_family(base)?;
    family
        .chars()
        .position(|m| m == base)
        .and_then(Mark::from_slot)
}

/// Put `mark` on `c`, keeping its tone. A mark the letter cannot take (and
/// `Mark::Raw`) leaves `c` unchanged.
pub fn add_mark(c: char, mark: Mark) -> char {
    keep_case(c, |c| {
        let tone = find_tone_from_char(c);
        let base = remove_tone(c);
        let marked = mark_family(base)
            .and_then(|family| family.chars().nth(mark as usize))
            .filter(|&m| m != '_');
        match marked {
            Some(m) => add_tone(m, tone),
            None => c,
        }
    })
}

/// Strip the mark from `c`, keeping its tone.
pub fn remove_mark(c: char) -> char {
    add_mark(c, Mark::None)
}

/// Every letter reachable from `c` by adding or removing a mark, in slot order.
pub fn get_mark_family(c: char) -> Vec<char> {
    mark_family(to_lower(remove_tone(c)))
        .map(|family| family.chars().filter(|&m| m != '_').collect())
        .unwrap_or_default()
}
