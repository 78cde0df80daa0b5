//! Rendering a composition into text.

use crate::charset::{add_mark, add_tone, remove_mark, remove_tone, to_lower, to_upper, Mark};
use crate::composition::{root_of, target_of, Transformation};
use crate::mode::Mode;
use crate::rules::Effect;

/// Render `comp` under `mode`.
///
/// With [`Mode::ENGLISH`] the physical keys are echoed (synthetic nodes are
/// skipped). Otherwise every appending node becomes one output letter and
/// the tone and mark overlays are applied on top of it in order.
pub fn flatten(comp: &[Transformation], mode: Mode) -> String {
    let all: Vec<usize> = (0..comp.len()).collect();
    flatten_picked(comp, &all, mode)
}

/// Render only the nodes at `picked`. Overlays still resolve their targets
/// through the whole composition, but only land on picked letters.
pub fn flatten_picked(comp: &[Transformation], picked: &[usize], mode: Mode) -> String {
    if mode.contains(Mode::ENGLISH) {
        return flatten_literal(comp, picked, mode);
    }

    let mut letters: Vec<char> = Vec::new();
    let mut slot_of: Vec<Option<usize>> = vec![None; comp.len()];
    for &i in picked {
        let t = &comp[i];
        if !t.rule.is_appending() {
            continue;
        }
        let Some(mut c) = t.rule.effect_on else {
            continue;
        };
        if mode.contains(Mode::TONE_LESS) {
            c = remove_tone(c);
        }
        if mode.contains(Mode::MARK_LESS) {
            c = remove_mark(c);
        }
        slot_of[i] = Some(letters.len());
        letters.push(c);
    }

    for &i in picked {
        let t = &comp[i];
        let Some(target) = target_of(comp, i).map(|j| root_of(comp, j)) else {
            continue;
        };
        let Some(slot) = slot_of[target] else {
            continue;
        };
        match t.rule.effect {
            Effect::Mark(Mark::Raw) => {
                if let Some(key) = comp[target].rule.key {
                    letters[slot] = key;
                }
            }
            Effect::Mark(mark) if !mode.contains(Mode::MARK_LESS) => {
                letters[slot] = add_mark(letters[slot], mark);
            }
            Effect::Tone(tone) if !mode.contains(Mode::TONE_LESS) => {
                letters[slot] = add_tone(letters[slot], tone);
            }
            _ => {}
        }
    }

    if mode.contains(Mode::LOWER_CASE) {
        return letters.into_iter().map(to_lower).collect();
    }
    for (i, slot) in slot_of.iter().enumerate() {
        if let Some(slot) = *slot {
            if comp[i].is_upper_case {
                letters[slot] = to_upper(letters[slot]);
            }
        }
    }
    letters.into_iter().collect()
}

fn flatten_literal(comp: &[Transformation], picked: &[usize], mode: Mode) -> String {
    let text: String = picked
        .iter()
        .filter_map(|&i| {
            let t = &comp[i];
            t.rule
                .key
                .map(|k| if t.is_upper_case { to_upper(k) } else { k })
        })
        .collect();
    if mode.contains(Mode::LOWER_CASE) {
        text.to_lowercase()
    } else {
        text
    }
}
