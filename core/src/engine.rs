// core/src/engine.rs
//
// The keystroke transducer. Every key is resolved against the active
// syllable only: the composition is split at the start of the last
// syllable, the key is applied to the tail, and the tail is spliced back.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::charset::{is_punctuation_mark, is_vietnamese_letter, is_vowel, to_lower, Mark, Tone};
use crate::composition::{
    compact, find_tone_target, have_valid_tone, is_free, is_valid, last_appending_index,
    last_syllable_start, last_tone_index, last_word_start, push_targeted, rightmost_vowels,
    root_of, seeded_tone, spelling_match, target_of, vowels_with_marks, with_targeted,
    Transformation,
};
use crate::flattener::{flatten, flatten_picked};
use crate::mode::{Flags, Mode};
use crate::rules::{Effect, InputMethod, Rule};
use crate::trie::MatchResult;

/// A `uo` pair where only one of the two letters carries the horn.
static HALF_HORNED_UO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"uơ|ưo").expect("horn pattern is valid"));

/// The same pair once another letter has been typed after it.
static HALF_HORNED_UO_IN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:uơ|ưo)\p{L}+").expect("horn pattern is valid"));

/// Vietnamese input engine for one input context.
///
/// The engine owns the whole edit history of the buffer as a composition
/// graph (see [`crate::composition`]); rendering is done on demand.
///
/// # Example
/// ```
/// use libviet_core::{Engine, Flags, InputMethod, Mode};
///
/// let telex = InputMethod::from_definitions(
///     "Telex",
///     [('s', "DauSac"), ('j', "DauNang"), ('e', "E_Ê"), ('w', "UOA_ƯƠĂ"), ('d', "D_Đ")],
/// );
/// let mut engine = Engine::new(telex, Flags::STD);
/// engine.process_string("Vieejt", Mode::VIETNAMESE);
/// assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "Việt");
/// assert_eq!(engine.get_processed_string(Mode::ENGLISH), "Vieejt");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    input_method: InputMethod,
    flags: Flags,
    composition: Vec<Transformation>,
}

impl Engine {
    pub fn new(input_method: InputMethod, flags: Flags) -> Self {
        Self {
            input_method,
            flags,
            composition: Vec::new(),
        }
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn input_method(&self) -> &InputMethod {
        &self.input_method
    }

    /// The raw composition graph.
    pub fn composition(&self) -> &[Transformation] {
        &self.composition
    }

    /// Whether `key` means anything to the engine: a Latin or Vietnamese
    /// letter, or one of the input method's keys.
    pub fn can_process_key(&self, key: char) -> bool {
        let key = to_lower(key);
        is_vietnamese_letter(key) || self.input_method.is_key(key)
    }

    /// Feed one keystroke.
    pub fn process_key(&mut self, key: char, mode: Mode) {
        let lower = to_lower(key);
        let is_upper_case = key.is_uppercase();
        if mode.contains(Mode::ENGLISH) || !self.can_process_key(lower) {
            let literal = Transformation::literal(lower, is_upper_case);
            if mode.contains(Mode::IN_REVERSE_ORDER) {
                self.composition.insert(0, literal);
            } else {
                self.composition.push(literal);
            }
            return;
        }
        let mut composition = std::mem::take(&mut self.composition);
        self.new_composition(&mut composition, lower, is_upper_case);
        self.composition = composition;
    }

    /// Feed every character of `text` (NFC-composed first).
    pub fn process_string(&mut self, text: &str, mode: Mode) {
        for key in crate::utils::normalize(text).chars() {
            self.process_key(key, mode);
        }
    }

    /// Render the buffer. Without [`Mode::FULL_TEXT`] only the last word is
    /// rendered.
    pub fn get_processed_string(&self, mode: Mode) -> String {
        let keys = &self.input_method.keys;
        let start = if mode.contains(Mode::FULL_TEXT) {
            0
        } else if mode.contains(Mode::PUNCTUATION_MODE) {
            last_word_start(&self.composition, keys, true)
        } else {
            last_word_start(&self.composition, keys, false)
        };
        flatten(&self.composition[start..], mode)
    }

    /// Whether the last word spells a Vietnamese syllable. With
    /// `require_fully_typed` unset, an incomplete syllable is accepted.
    pub fn is_valid(&self, require_fully_typed: bool) -> bool {
        let start = last_word_start(&self.composition, &self.input_method.keys, false);
        is_valid(&self.composition[start..], require_fully_typed)
    }

    /// Undo the last typed letter together with every overlay on it.
    pub fn remove_last_char(&mut self, refresh_tone: bool) {
        let Some(last) = last_appending_index(&self.composition) else {
            return;
        };
        let key = self.composition[last].rule.key;
        if !key.is_some_and(|k| self.can_process_key(k)) {
            self.composition.pop();
            return;
        }

        let keys = &self.input_method.keys;
        let start = last_word_start(&self.composition, keys, false);
        let comp = &self.composition;
        let remaining = compact(comp, |i| {
            i == last || (i >= start && target_of(comp, i) == Some(last))
        });
        trace!(removed = comp.len() - remaining.len(), "remove last char");
        self.composition = remaining;

        if refresh_tone {
            let start = last_word_start(&self.composition, keys, false);
            let mut word = self.composition.split_off(start);
            self.refresh_tone_target(&mut word);
            self.composition.extend(word);
        }
    }

    /// Restore the last word to the keys that were typed. With
    /// `to_vietnamese` set the keys are typed again from scratch instead.
    pub fn restore_last_word(&mut self, to_vietnamese: bool) {
        let start = last_word_start(&self.composition, &self.input_method.keys, false);
        if start == self.composition.len() {
            return;
        }
        let word = self.composition.split_off(start);
        let keys = word
            .iter()
            .filter_map(|t| t.rule.key.map(|k| (k, t.is_upper_case)));

        if !to_vietnamese {
            self.composition
                .extend(keys.map(|(k, upper)| Transformation::literal(k, upper)));
            return;
        }

        let mut replayed = Vec::new();
        for (key, upper) in keys {
            if self.can_process_key(key) {
                self.new_composition(&mut replayed, key, upper);
            } else {
                replayed.push(Transformation::literal(key, upper));
            }
        }
        self.composition.extend(replayed);
    }

    pub fn reset(&mut self) {
        self.composition.clear();
    }

    fn new_composition(&self, comp: &mut Vec<Transformation>, key: char, is_upper_case: bool) {
        let word_start = last_word_start(comp, &[], false);
        let start = word_start + last_syllable_start(&comp[word_start..]);
        let mut syllable = comp.split_off(start);
        self.generate(&mut syllable, key, is_upper_case);
        comp.extend(syllable);
    }

    fn generate(&self, syllable: &mut Vec<Transformation>, key: char, is_upper_case: bool) {
        let rules = self.input_method.rules_for(key);
        // The horn key itself finishes the pair; a tone key must not.
        let completes_uo = !self.input_method.super_keys.contains(&to_lower(key))
            && !rules.iter().any(|r| matches!(r.effect, Effect::Tone(_)));
        if completes_uo {
            self.apply_horn_shortcut(syllable, &HALF_HORNED_UO);
        }
        if !self.transform(syllable, &rules, key, is_upper_case) {
            self.append_fallback(syllable, &rules, key, is_upper_case);
        }
        self.refresh_tone_target(syllable);
    }

    fn transform(
        &self,
        syllable: &mut Vec<Transformation>,
        rules: &[&Rule],
        key: char,
        is_upper_case: bool,
    ) -> bool {
        // Typing the same key twice reverts a literal it turned into
        // something else.
        if let Some(last) = syllable.last() {
            if last.rule.is_appending() && last.rule.key == Some(key) && last.rule.result != Some(key) {
                trace!(%key, "repeated key reverts to raw");
                let target = syllable.len() - 1;
                push_targeted(syllable, Rule::bare_mark(Mark::Raw), target, false);
                return true;
            }
        }

        if let Some((target, rule)) = self.find_target(syllable, rules) {
            trace!(%key, target, effect = ?rule.effect, "applying effect");
            push_targeted(syllable, rule.clone(), target, is_upper_case);
            if rule.is_mark() {
                self.apply_horn_shortcut(syllable, &HALF_HORNED_UO_IN_WORD);
            }
            return true;
        }

        let undo = self.undo_list(syllable, rules);
        if undo.is_empty() {
            return false;
        }

        let mut undone = syllable.clone();
        for (rule, target) in &undo {
            push_targeted(&mut undone, rule.clone(), *target, false);
        }
        let lower = Mode::TONE_LESS | Mode::LOWER_CASE;
        let before = flatten_picked(syllable, &vowels_with_marks(syllable), lower);
        let undone_vowels = vowels_with_marks(&undone);
        let after = flatten_picked(&undone, &undone_vowels, lower);
        if before.contains("ươ") && after.contains("ưo") {
            // "ươ" + o: drop the horn from the first vowel and retry.
            if let Some(&first) = undone_vowels.first() {
                let reset = with_targeted(syllable, Rule::bare_mark(Mark::None), first);
                if let Some((target, rule)) = self.find_target(&reset, rules) {
                    if target != first {
                        trace!(%key, target, "uo exception");
                        push_targeted(syllable, Rule::bare_mark(Mark::None), first, false);
                        push_targeted(syllable, rule.clone(), target, is_upper_case);
                        return true;
                    }
                }
            }
        }

        trace!(%key, count = undo.len(), "undoing previous effects");
        for (rule, target) in undo {
            push_targeted(syllable, rule, target, false);
        }
        syllable.push(Transformation::literal(key, is_upper_case));
        true
    }

    fn tone_target(&self, comp: &[Transformation], tone: Tone) -> Option<usize> {
        if self.flags.contains(Flags::FREE_TONE_MARKING) {
            if have_valid_tone(comp, tone) {
                find_tone_target(comp, self.flags.contains(Flags::STD_TONE_STYLE))
            } else {
                None
            }
        } else {
            last_appending_index(comp).filter(|&i| comp[i].rule.effect_on.is_some_and(is_vowel))
        }
    }

    fn find_target<'r>(
        &self,
        comp: &[Transformation],
        rules: &[&'r Rule],
    ) -> Option<(usize, &'r Rule)> {
        let current = flatten(comp, Mode::VIETNAMESE);
        for &rule in rules {
            let Effect::Tone(tone) = rule.effect else {
                continue;
            };
            let Some(target) = self.tone_target(comp, tone) else {
                continue;
            };
            let candidate = with_targeted(comp, rule.clone(), target);
            if flatten(&candidate, Mode::VIETNAMESE) == current {
                continue;
            }
            if tone == Tone::None
                && is_free(comp, target, rule.effect)
                && seeded_tone(&comp[target]) == Tone::None
            {
                return None;
            }
            return Some((target, rule));
        }
        self.find_mark_target(comp, rules)
    }

    fn find_mark_target<'r>(
        &self,
        comp: &[Transformation],
        rules: &[&'r Rule],
    ) -> Option<(usize, &'r Rule)> {
        let current = flatten(comp, Mode::VIETNAMESE);
        for i in (0..comp.len()).rev() {
            let Some(result) = comp[i].rule.result else {
                continue;
            };
            for &rule in rules {
                if !matches!(rule.effect, Effect::Mark(m) if m != Mark::None) {
                    continue;
                }
                if rule.effect_on != Some(result) {
                    continue;
                }
                let target = root_of(comp, i);
                let candidate = with_targeted(comp, rule.clone(), target);
                if flatten(&candidate, Mode::VIETNAMESE) == current {
                    continue;
                }
                if spelling_match(&candidate) != MatchResult::NotMatch {
                    return Some((target, rule));
                }
            }
        }
        None
    }

    /// Overlays that reverse what `rules` did earlier in the syllable.
    fn undo_list(&self, syllable: &[Transformation], rules: &[&Rule]) -> Vec<(Rule, usize)> {
        let mut undo = Vec::new();
        for rule in rules {
            match rule.effect {
                Effect::Tone(tone) => {
                    if let Some(target) = self.tone_target(syllable, tone) {
                        undo.push((Rule::tone(None, Tone::None), target));
                    }
                }
                Effect::Mark(_) => {
                    for i in (0..syllable.len()).rev() {
                        if syllable[i].rule.result.is_some() && syllable[i].rule.result == rule.effect_on {
                            undo.push((Rule::bare_mark(Mark::None), root_of(syllable, i)));
                        }
                    }
                }
                Effect::Appending => {}
            }
        }
        undo
    }

    /// One horn key upgrades both letters of `uo`.
    fn apply_horn_shortcut(&self, syllable: &mut Vec<Transformation>, pattern: &Regex) {
        if !self.flags.contains(Flags::AUTO_CORRECT_ENABLED) {
            return;
        }
        let Some(&super_key) = self.input_method.super_keys.first() else {
            return;
        };
        let text = flatten(syllable, Mode::TONE_LESS | Mode::LOWER_CASE);
        if !pattern.is_match(&text) {
            return;
        }
        let rules = self.input_method.rules_for(super_key);
        if let Some((target, rule)) = self.find_target(syllable, &rules) {
            trace!(target, "horn shortcut");
            let mut rule = rule.clone();
            rule.key = None;
            push_targeted(syllable, rule, target, false);
        }
    }

    /// Append the key as a letter, expanding the literal its rules declare.
    fn append_fallback(
        &self,
        syllable: &mut Vec<Transformation>,
        rules: &[&Rule],
        key: char,
        is_upper_case: bool,
    ) {
        let literal = rules.iter().find(|r| r.is_appending());
        let mut appended = Vec::new();
        match literal.and_then(|r| r.effect_on.map(|c| (r, c))) {
            Some((rule, c)) => {
                let mut first = Rule::appending(Some(key), to_lower(c));
                first.appended_rules = rule.appended_rules.clone();
                appended.push(Transformation::appending(first, is_upper_case || c.is_uppercase()));
                for chained in &rule.appended_rules {
                    if let Some(c) = chained.effect_on {
                        appended.push(Transformation::appending(
                            Rule::appending(chained.key, to_lower(c)),
                            is_upper_case || c.is_uppercase(),
                        ));
                    }
                }
            }
            None => appended.push(Transformation::literal(key, is_upper_case)),
        }

        if appended.len() > 1 && is_punctuation_mark(key) {
            let mut candidate = syllable.clone();
            candidate.extend(appended.iter().cloned());
            if !is_valid(&candidate, false) {
                appended = vec![Transformation::literal(key, is_upper_case)];
            }
        }
        trace!(%key, letters = appended.len(), "append");
        syllable.extend(appended);
    }

    /// Move the tone when the letters typed since no longer put it on the
    /// right vowel.
    fn refresh_tone_target(&self, syllable: &mut Vec<Transformation>) {
        if !self.flags.contains(Flags::FREE_TONE_MARKING) || !is_valid(syllable, false) {
            return;
        }
        if rightmost_vowels(syllable).is_empty() {
            return;
        }
        let Some(last_tone) = last_tone_index(syllable) else {
            return;
        };
        let Some(old) = target_of(syllable, last_tone) else {
            return;
        };
        let Effect::Tone(tone) = syllable[last_tone].rule.effect else {
            return;
        };
        let new = find_tone_target(syllable, self.flags.contains(Flags::STD_TONE_STYLE));
        if new == Some(old) {
            return;
        }
        trace!(old, ?new, "moving tone");
        push_targeted(syllable, Rule::tone(None, Tone::None), old, false);
        if let Some(new) = new {
            push_targeted(syllable, Rule::tone(None, tone), new, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telex() -> InputMethod {
        InputMethod::from_definitions(
            "Telex",
            [
                ('z', "XoaDauThanh"),
                ('s', "DauSac"),
                ('f', "DauHuyen"),
                ('r', "DauHoi"),
                ('x', "DauNga"),
                ('j', "DauNang"),
                ('a', "A_Â"),
                ('e', "E_Ê"),
                ('o', "O_Ô"),
                ('w', "UOA_ƯƠĂ"),
                ('d', "D_Đ"),
            ],
        )
    }

    fn typed(text: &str) -> Engine {
        let mut engine = Engine::new(telex(), Flags::STD);
        engine.process_string(text, Mode::VIETNAMESE);
        engine
    }

    #[test]
    fn test_basic_telex() {
        assert_eq!(typed("aw").get_processed_string(Mode::VIETNAMESE), "ă");
        assert_eq!(typed("chuaarn").get_processed_string(Mode::VIETNAMESE), "chuẩn");
        assert_eq!(typed("ddafi").get_processed_string(Mode::VIETNAMESE), "đài");
        assert_eq!(typed("mootj").get_processed_string(Mode::VIETNAMESE), "một");
    }

    #[test]
    fn test_free_tone_moves_with_later_letters() {
        // the tone moves once the syllable grows
        assert_eq!(typed("hoafn").get_processed_string(Mode::VIETNAMESE), "hoàn");
        assert_eq!(typed("hoaf").get_processed_string(Mode::VIETNAMESE), "hòa");
        let mut engine = Engine::new(telex(), Flags::STD - Flags::STD_TONE_STYLE);
        engine.process_string("hoaf", Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "hoà");
    }

    #[test]
    fn test_fixed_tone_marking_needs_a_vowel_before() {
        let mut engine = Engine::new(telex(), Flags::empty());
        engine.process_string("tos", Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "tó");
        engine.reset();
        engine.process_string("tons", Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "tons");
    }

    #[test]
    fn test_repeated_tone_key_undoes() {
        let engine = typed("tooss");
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "tôs");
        assert_eq!(engine.get_processed_string(Mode::ENGLISH), "tooss");
    }

    #[test]
    fn test_horn_shortcut() {
        assert_eq!(typed("nguoiw").get_processed_string(Mode::VIETNAMESE), "ngươi");
        assert_eq!(typed("duwoi").get_processed_string(Mode::VIETNAMESE), "dươi");
    }

    #[test]
    fn test_explicit_second_horn_is_kept() {
        assert_eq!(typed("dduwowngf").get_processed_string(Mode::VIETNAMESE), "đường");
        assert_eq!(typed("nuwowcs").get_processed_string(Mode::VIETNAMESE), "nước");
        assert_eq!(typed("ruwowuj").get_processed_string(Mode::VIETNAMESE), "rượu");
        assert_eq!(typed("thuwowr").get_processed_string(Mode::VIETNAMESE), "thưở");
        // nothing follows the pair yet
        assert_eq!(typed("duwo").get_processed_string(Mode::VIETNAMESE), "dưo");
        assert_eq!(typed("duwow").get_processed_string(Mode::VIETNAMESE), "dươ");
    }

    #[test]
    fn test_horn_shortcut_needs_auto_correct() {
        let mut engine = Engine::new(telex(), Flags::FREE_TONE_MARKING | Flags::STD_TONE_STYLE);
        engine.process_string("duwo", Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "dưo");
    }

    #[test]
    fn test_english_and_unprocessable_keys_are_literal() {
        let mut engine = typed("tieengs");
        engine.process_string(" ok", Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "ok");
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE | Mode::FULL_TEXT), "tiếng ok");
        assert_eq!(engine.get_processed_string(Mode::ENGLISH | Mode::FULL_TEXT), "tieengs ok");
        engine.process_key('1', Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE | Mode::FULL_TEXT), "tiếng ok1");
    }

    #[test]
    fn test_reverse_order_inserts_at_front() {
        let mut engine = typed("an");
        engine.process_key('x', Mode::ENGLISH | Mode::IN_REVERSE_ORDER);
        assert_eq!(engine.get_processed_string(Mode::ENGLISH | Mode::FULL_TEXT), "xan");
    }

    #[test]
    fn test_punctuation_mode_keeps_punctuation() {
        let engine = typed("xin.chaof");
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "chào");
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE | Mode::PUNCTUATION_MODE), "xin.chào");
    }

    #[test]
    fn test_decomposed_input_is_composed_first() {
        // "e" + combining circumflex + combining dot below
        let engine = typed("Vie\u{0302}\u{0323}t");
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "Việt");
        assert_eq!(engine.get_processed_string(Mode::ENGLISH), "Việt");
        // surrounding spaces are keys too
        let engine = typed(" an ");
        assert_eq!(engine.get_processed_string(Mode::ENGLISH | Mode::FULL_TEXT), " an ");
    }

    #[test]
    fn test_chained_letters_carry_no_key() {
        let im = InputMethod::from_definitions("Brackets", [('[', "__ươ")]);
        let mut engine = Engine::new(im, Flags::STD);
        engine.process_key('[', Mode::VIETNAMESE);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "ươ");
        let keys: Vec<_> = engine.composition().iter().map(|t| t.rule.key).collect();
        assert_eq!(keys, vec![Some('['), None]);
    }

    #[test]
    fn test_remove_last_char_drops_overlays() {
        let mut engine = typed("VIEETJ");
        engine.remove_last_char(true);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "VIỆ");
        engine.remove_last_char(true);
        engine.remove_last_char(true);
        engine.remove_last_char(true);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "");
        // no-op on an empty buffer
        engine.remove_last_char(true);
        assert!(engine.composition().is_empty());
    }

    #[test]
    fn test_restore_last_word() {
        let mut engine = typed("dduwongf");
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "đường");
        engine.restore_last_word(false);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "dduwongf");
        engine.restore_last_word(true);
        assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "đường");
    }

    #[test]
    fn test_can_process_key() {
        let engine = typed("");
        assert!(engine.can_process_key('a'));
        assert!(engine.can_process_key('Đ'));
        assert!(engine.can_process_key('ư'));
        assert!(!engine.can_process_key('1'));
        assert!(!engine.can_process_key(' '));
    }

    #[test]
    fn test_targets_always_precede() {
        let engine = typed("nguowif tooi ddax vieetj");
        let comp = engine.composition();
        for (i, t) in comp.iter().enumerate() {
            if let Some(offset) = t.offset() {
                assert!(offset.get() <= i);
                assert!(!t.rule.is_appending());
            }
        }
    }
}
