//! The composition graph and the queries the engine runs over it.
//!
//! A composition is an append-only `Vec<Transformation>`. Appending
//! transformations carry one literal letter each; tone and mark
//! transformations overlay a diacritic onto an earlier node. The target of
//! an overlay is stored as a backwards distance from the overlay itself, so
//! any sub-slice of a composition is again a composition: overlays whose
//! target falls outside the slice are simply ignored, and splicing a slice
//! back keeps every target intact.

use std::num::NonZeroUsize;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::charset::{
    find_tone_from_char, is_punctuation_mark, is_vowel, is_word_break_symbol, remove_tone,
    to_lower, Tone,
};
use crate::flattener::{flatten, flatten_picked};
use crate::mode::Mode;
use crate::rules::{Effect, Rule};
use crate::spelling::{self, is_stop_consonant};
use crate::trie::MatchResult;

/// One node of the composition graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub rule: Rule,
    /// Distance back to the target node. Appendings have none.
    offset: Option<NonZeroUsize>,
    pub is_upper_case: bool,
}

impl Transformation {
    /// A literal letter.
    pub fn appending(rule: Rule, is_upper_case: bool) -> Self {
        Self {
            rule,
            offset: None,
            is_upper_case,
        }
    }

    /// Plain append of `key` as typed.
    pub fn literal(key: char, is_upper_case: bool) -> Self {
        Self::appending(Rule::appending(Some(key), key), is_upper_case)
    }

    pub fn offset(&self) -> Option<NonZeroUsize> {
        self.offset
    }
}

/// Append an overlay targeting `target`, which must already be in `comp`.
pub fn push_targeted(comp: &mut Vec<Transformation>, rule: Rule, target: usize, is_upper_case: bool) {
    debug_assert!(target < comp.len());
    let offset = NonZeroUsize::new(comp.len().saturating_sub(target));
    comp.push(Transformation {
        rule,
        offset,
        is_upper_case,
    });
}

/// `comp` with one more overlay, for trying a candidate without committing it.
pub(crate) fn with_targeted(comp: &[Transformation], rule: Rule, target: usize) -> Vec<Transformation> {
    let mut candidate = comp.to_vec();
    push_targeted(&mut candidate, rule, target, false);
    candidate
}

/// Index of the node `comp[i]` targets, if it lies inside `comp`.
pub fn target_of(comp: &[Transformation], i: usize) -> Option<usize> {
    let offset = comp.get(i)?.offset?;
    i.checked_sub(offset.get())
}

/// Follow targets from `i` down to the node that has none.
pub fn root_of(comp: &[Transformation], mut i: usize) -> usize {
    while let Some(j) = target_of(comp, i) {
        i = j;
    }
    i
}

pub fn last_appending_index(comp: &[Transformation]) -> Option<usize> {
    comp.iter().rposition(|t| t.rule.is_appending())
}

fn has_appending(comp: &[Transformation]) -> bool {
    comp.iter().any(|t| t.rule.is_appending())
}

/// Most recent tone overlay that still has a target.
pub fn last_tone_index(comp: &[Transformation]) -> Option<usize> {
    (0..comp.len())
        .rev()
        .find(|&i| comp[i].rule.is_tone() && target_of(comp, i).is_some())
}

/// Whether no overlay of the same kind as `effect` targets `target` yet.
pub fn is_free(comp: &[Transformation], target: usize, effect: Effect) -> bool {
    !comp.iter().enumerate().any(|(i, t)| {
        std::mem::discriminant(&t.rule.effect) == std::mem::discriminant(&effect)
            && target_of(comp, i) == Some(target)
    })
}

/// Start of the last word.
///
/// A word ends at an appended character that is not a letter and not one of
/// `keys`. With `punctuation` set, ASCII punctuation stays inside the word.
pub fn last_word_start(comp: &[Transformation], keys: &[char], punctuation: bool) -> usize {
    for (i, t) in comp.iter().enumerate().rev() {
        if !t.rule.is_appending() {
            continue;
        }
        let Some(c) = t.rule.effect_on else {
            continue;
        };
        if is_word_break_symbol(c) && !keys.contains(&c) && !(punctuation && is_punctuation_mark(c))
        {
            return i + 1;
        }
    }
    0
}

/// Start of the last syllable inside a word.
///
/// Prefixes are flattened left to right; once one stops being a possible
/// syllable, the search restarts right after it.
pub fn last_syllable_start(comp: &[Transformation]) -> usize {
    if !has_appending(comp) {
        return comp.len();
    }
    for i in 0..comp.len() {
        let prefix = &comp[..=i];
        if !has_appending(prefix) {
            continue;
        }
        let text = flatten(prefix, Mode::VIETNAMESE | Mode::TONE_LESS | Mode::LOWER_CASE);
        if text.is_empty() {
            continue;
        }
        if spelling::lookup(&text) == MatchResult::NotMatch {
            let skip = i.max(1);
            return skip + last_syllable_start(&comp[skip..]);
        }
    }
    0
}

/// Role of a letter inside a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    NoSound,
    FirstConsonant,
    Vowel,
    LastConsonant,
}

static QU_GI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(qu|gi)(\p{L}+)").expect("qu/gi pattern is valid"));

fn dump_sounds(word: &str) -> Vec<Sound> {
    let mut had_vowel = false;
    word.chars()
        .map(|c| {
            if is_vowel(c) {
                had_vowel = true;
                Sound::Vowel
            } else if c.is_alphabetic() {
                if had_vowel {
                    Sound::LastConsonant
                } else {
                    Sound::FirstConsonant
                }
            } else {
                Sound::NoSound
            }
        })
        .collect()
}

/// Classify each letter of a lowercase toneless word. The `u` of `qu` and
/// the `i` of `gi` belong to the first consonant when a vowel follows.
pub fn parse_sounds(word: &str) -> Vec<Sound> {
    if let Some(caps) = QU_GI.captures(word) {
        let rest = caps.get(2).map_or("", |m| m.as_str());
        if rest.chars().next().is_some_and(is_vowel) {
            let mut sounds = vec![Sound::FirstConsonant; 2];
            sounds.extend(dump_sounds(rest));
            return sounds;
        }
    }
    dump_sounds(word)
}

/// `(index, sound)` for every appending node of `comp`.
pub fn sounds(comp: &[Transformation]) -> Vec<(usize, Sound)> {
    let indexes: Vec<usize> = (0..comp.len()).filter(|&i| comp[i].rule.is_appending()).collect();
    let word: String = indexes
        .iter()
        .filter_map(|&i| comp[i].rule.effect_on)
        .map(|c| to_lower(remove_tone(c)))
        .collect();
    indexes.into_iter().zip(parse_sounds(&word)).collect()
}

fn indexes_with_sound(comp: &[Transformation], sound: Sound) -> Vec<usize> {
    sounds(comp)
        .into_iter()
        .filter(|&(_, s)| s == sound)
        .map(|(i, _)| i)
        .collect()
}

/// Appending nodes that form the vowel run of the syllable.
pub fn rightmost_vowels(comp: &[Transformation]) -> Vec<usize> {
    indexes_with_sound(comp, Sound::Vowel)
}

/// The vowel run together with the mark overlays on it.
pub fn vowels_with_marks(comp: &[Transformation]) -> Vec<usize> {
    let vowels = rightmost_vowels(comp);
    (0..comp.len())
        .filter(|&i| {
            vowels.contains(&i)
                || (comp[i].rule.is_mark()
                    && target_of(comp, i).is_some_and(|t| vowels.contains(&t)))
        })
        .collect()
}

fn has_appending_after(comp: &[Transformation], i: usize) -> bool {
    has_appending(&comp[i + 1..])
}

/// Which vowel of the syllable receives the tone.
pub fn find_tone_target(comp: &[Transformation], std_style: bool) -> Option<usize> {
    let vowels = rightmost_vowels(comp);
    match vowels.len() {
        1 => Some(vowels[0]),
        2 if std_style => {
            let run = flatten_picked(
                comp,
                &vowels_with_marks(comp),
                Mode::TONE_LESS | Mode::LOWER_CASE,
            );
            for preferred in ['ơ', 'ê'] {
                if let Some(p) = run.chars().position(|c| c == preferred) {
                    if p > 0 {
                        return vowels.get(p).copied();
                    }
                }
            }
            if has_appending_after(comp, vowels[1]) {
                Some(vowels[1])
            } else {
                Some(vowels[0])
            }
        }
        2 => {
            if has_appending_after(comp, vowels[1]) {
                return Some(vowels[1]);
            }
            let run = flatten_picked(
                comp,
                &vowels,
                Mode::TONE_LESS | Mode::MARK_LESS | Mode::LOWER_CASE,
            );
            if matches!(run.as_str(), "oa" | "oe" | "uy" | "ue" | "uo") {
                Some(vowels[1])
            } else {
                Some(vowels[0])
            }
        }
        3 => {
            let run = flatten_picked(
                comp,
                &vowels,
                Mode::TONE_LESS | Mode::MARK_LESS | Mode::LOWER_CASE,
            );
            if run == "uye" {
                Some(vowels[2])
            } else {
                Some(vowels[1])
            }
        }
        _ => None,
    }
}

fn last_consonant(comp: &[Transformation]) -> String {
    let word = flatten(comp, Mode::TONE_LESS | Mode::LOWER_CASE);
    if let Some(parts) = spelling::classify(&word) {
        return parts.last.to_string();
    }
    indexes_with_sound(comp, Sound::LastConsonant)
        .into_iter()
        .filter_map(|i| comp[i].rule.effect_on)
        .map(|c| to_lower(remove_tone(c)))
        .collect()
}

/// Grave, hook and tilde cannot sit on a syllable closed by a stop consonant.
pub fn have_valid_tone(comp: &[Transformation], tone: Tone) -> bool {
    if matches!(tone, Tone::None | Tone::Acute | Tone::Dot) {
        return true;
    }
    !is_stop_consonant(&last_consonant(comp))
}

/// Spelling plausibility of a candidate; single letters always match.
pub fn spelling_match(comp: &[Transformation]) -> MatchResult {
    if comp.is_empty() {
        return MatchResult::MatchFull;
    }
    let text = flatten(comp, Mode::TONE_LESS | Mode::LOWER_CASE);
    if text.chars().count() <= 1 {
        return MatchResult::MatchFull;
    }
    spelling::lookup(&text)
}

/// Whether `comp` spells a syllable with a legal tone. With `full` unset, a
/// syllable that can still be completed counts as valid.
pub fn is_valid(comp: &[Transformation], full: bool) -> bool {
    if !has_appending(comp) {
        return true;
    }
    if let Some(i) = last_tone_index(comp) {
        if let Effect::Tone(tone) = comp[i].rule.effect {
            if !have_valid_tone(comp, tone) {
                return false;
            }
        }
    }
    match spelling::lookup(&flatten(comp, Mode::TONE_LESS | Mode::LOWER_CASE)) {
        MatchResult::NotMatch => false,
        MatchResult::MatchPrefix => !full,
        MatchResult::MatchFull => true,
    }
}

/// Drop every node for which `remove` holds and recompute the offsets of
/// the survivors. An overlay whose target was dropped loses its target.
pub fn compact(comp: &[Transformation], remove: impl Fn(usize) -> bool) -> Vec<Transformation> {
    let mut new_index: Vec<Option<usize>> = vec![None; comp.len()];
    let mut out: Vec<Transformation> = Vec::with_capacity(comp.len());
    for (i, t) in comp.iter().enumerate() {
        if remove(i) {
            continue;
        }
        new_index[i] = Some(out.len());
        let offset = target_of(comp, i)
            .and_then(|j| new_index[j])
            .and_then(|j| NonZeroUsize::new(out.len() - j));
        out.push(Transformation {
            offset,
            ..t.clone()
        });
    }
    out
}

/// Lowercased tone of the letter an appending node seeds.
pub(crate) fn seeded_tone(t: &Transformation) -> Tone {
    t.rule.result.map_or(Tone::None, find_tone_from_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Mark;

    fn letters(word: &str) -> Vec<Transformation> {
        word.chars()
            .map(|c| Transformation::literal(to_lower(c), c.is_uppercase()))
            .collect()
    }

    #[test]
    fn test_targets_are_relative() {
        let mut comp = letters("an");
        push_targeted(&mut comp, Rule::tone(Some('s'), Tone::Acute), 0, false);
        assert_eq!(target_of(&comp, 2), Some(0));
        assert_eq!(target_of(&comp, 0), None);
        // the overlay still finds its target after the prefix moves
        let shifted: Vec<Transformation> = letters("x").into_iter().chain(comp).collect();
        assert_eq!(target_of(&shifted, 3), Some(1));
        // but not when the target is cut away
        assert_eq!(target_of(&shifted[2..], 1), None);
    }

    #[test]
    fn test_root_follows_chain() {
        let mut comp = letters("o");
        push_targeted(&mut comp, Rule::mark(Some('o'), Mark::Circumflex, 'o', 'ô'), 0, false);
        push_targeted(&mut comp, Rule::bare_mark(Mark::None), 1, false);
        assert_eq!(root_of(&comp, 2), 0);
    }

    #[test]
    fn test_word_boundaries() {
        let comp = letters("xin chao");
        assert_eq!(last_word_start(&comp, &[], false), 4);
        let comp = letters("a:b");
        assert_eq!(last_word_start(&comp, &[], false), 2);
        assert_eq!(last_word_start(&comp, &[':'], false), 0);
        assert_eq!(last_word_start(&comp, &[], true), 0);
        assert_eq!(last_word_start(&letters("ab "), &[], true), 3);
        // digits and full-width punctuation break too, unless they are keys
        assert_eq!(last_word_start(&letters("ab1c"), &[], false), 3);
        assert_eq!(last_word_start(&letters("ab1c"), &['1'], false), 0);
        assert_eq!(last_word_start(&letters("tôi）t"), &[], true), 4);
    }

    #[test]
    fn test_syllable_restarts_after_impossible_prefix() {
        assert_eq!(last_syllable_start(&letters("tieng")), 0);
        assert_eq!(last_syllable_start(&letters("linux")), 4);
        assert_eq!(last_syllable_start(&[]), 0);
    }

    #[test]
    fn test_sounds_of_qu_and_gi() {
        assert_eq!(
            parse_sounds("quan"),
            vec![
                Sound::FirstConsonant,
                Sound::FirstConsonant,
                Sound::Vowel,
                Sound::LastConsonant
            ]
        );
        assert_eq!(
            parse_sounds("gi"),
            vec![Sound::FirstConsonant, Sound::Vowel]
        );
        assert_eq!(rightmost_vowels(&letters("nguoi")), vec![2, 3, 4]);
    }

    #[test]
    fn test_tone_target_tie_break() {
        assert_eq!(find_tone_target(&letters("ban"), true), Some(1));
        assert_eq!(find_tone_target(&letters("hoa"), false), Some(2));
        assert_eq!(find_tone_target(&letters("hoa"), true), Some(1));
        assert_eq!(find_tone_target(&letters("mai"), false), Some(1));
        assert_eq!(find_tone_target(&letters("toan"), true), Some(2));
        assert_eq!(find_tone_target(&letters("khuya"), true), Some(3));
        assert_eq!(find_tone_target(&letters("chuyen"), true), Some(4));
        assert_eq!(find_tone_target(&letters("tr"), true), None);
    }

    #[test]
    fn test_tone_target_prefers_marked_second_vowel() {
        let mut comp = letters("tuoi");
        push_targeted(&mut comp, Rule::mark(Some('o'), Mark::Circumflex, 'o', 'ô'), 2, false);
        // "uôi" has three vowels: the middle one
        assert_eq!(find_tone_target(&comp, true), Some(2));

        let mut comp = letters("tuen");
        push_targeted(&mut comp, Rule::mark(Some('e'), Mark::Circumflex, 'e', 'ê'), 2, false);
        assert_eq!(find_tone_target(&comp, true), Some(2));
    }

    #[test]
    fn test_stop_consonant_rejects_grave() {
        let comp = letters("cat");
        assert!(have_valid_tone(&comp, Tone::Acute));
        assert!(have_valid_tone(&comp, Tone::Dot));
        assert!(!have_valid_tone(&comp, Tone::Grave));
        assert!(have_valid_tone(&letters("can"), Tone::Grave));
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(&letters("to"), true));
        assert!(is_valid(&letters("ngh"), false));
        assert!(!is_valid(&letters("ngh"), true));
        assert!(!is_valid(&letters("arch"), false));
        assert!(is_valid(&[], true));

        let mut comp = letters("cat");
        push_targeted(&mut comp, Rule::tone(Some('f'), Tone::Grave), 1, false);
        assert!(!is_valid(&comp, false));
    }

    #[test]
    fn test_is_free() {
        let mut comp = letters("a");
        assert!(is_free(&comp, 0, Effect::Tone(Tone::None)));
        push_targeted(&mut comp, Rule::tone(Some('s'), Tone::Acute), 0, false);
        assert!(!is_free(&comp, 0, Effect::Tone(Tone::None)));
        assert!(is_free(&comp, 0, Effect::Mark(Mark::None)));
    }

    #[test]
    fn test_compact_remaps_targets() {
        let mut comp = letters("ab");
        push_targeted(&mut comp, Rule::tone(Some('s'), Tone::Acute), 0, false);
        push_targeted(&mut comp, Rule::tone(Some('f'), Tone::Grave), 1, false);
        let out = compact(&comp, |i| i == 1);
        assert_eq!(out.len(), 3);
        assert_eq!(target_of(&out, 1), Some(0));
        // its target was removed
        assert_eq!(target_of(&out, 2), None);
    }
}
