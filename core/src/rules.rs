//! Key rules and the rule DSL.
//!
//! An input method is described as an ordered table of `trigger key ->
//! definition` pairs. A definition is either one of the reserved tone
//! tokens (`DauSac`, `DauHuyen`, ...) or a mark pattern such as `A_Â`,
//! `UOA_ƯƠĂ__Ư` or `__ươ`:
//!
//! - `SOURCES_TARGETS` pairs letters positionally; each pair becomes mark
//!   rules (expanded over the six tones when the source is a vowel).
//! - a trailing `__LITERAL` (or a bare `_LITERAL`) declares what the key
//!   appends when it finds nothing to mark. The first letter is the rule
//!   result, further letters become chained appends.
//!
//! A definition that matches neither form compiles to no rules.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::charset::{add_tone, find_mark_from_char, get_mark_family, is_vowel, Mark, Tone};

/// What a rule does to the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Adds a literal letter.
    Appending,
    Mark(Mark),
    Tone(Tone),
}

/// One primitive behavior of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Physical key. `None` for synthetic rules that must not show up in the
    /// literal rendering.
    pub key: Option<char>,
    pub effect: Effect,
    /// Letter the effect applies to (the appended letter for `Appending`).
    pub effect_on: Option<char>,
    /// Letter produced once the effect is applied.
    pub result: Option<char>,
    /// Extra letters appended by the same keystroke.
    pub appended_rules: Vec<Rule>,
}

impl Rule {
    /// A plain append of `c` produced by `key`.
    pub fn appending(key: Option<char>, c: char) -> Self {
        Self {
            key,
            effect: Effect::Appending,
            effect_on: Some(c),
            result: Some(c),
            appended_rules: Vec::new(),
        }
    }

    pub fn tone(key: Option<char>, tone: Tone) -> Self {
        Self {
            key,
            effect: Effect::Tone(tone),
            effect_on: None,
            result: None,
            appended_rules: Vec::new(),
        }
    }

    pub fn mark(key: Option<char>, mark: Mark, effect_on: char, result: char) -> Self {
        Self {
            key,
            effect: Effect::Mark(mark),
            effect_on: Some(effect_on),
            result: Some(result),
            appended_rules: Vec::new(),
        }
    }

    /// A mark rule with no letter constraint, used for resets and overrides.
    pub(crate) fn bare_mark(mark: Mark) -> Self {
        Self {
            key: None,
            effect: Effect::Mark(mark),
            effect_on: None,
            result: None,
            appended_rules: Vec::new(),
        }
    }

    pub fn is_appending(&self) -> bool {
        self.effect == Effect::Appending
    }

    pub fn is_tone(&self) -> bool {
        matches!(self.effect, Effect::Tone(_))
    }

    pub fn is_mark(&self) -> bool {
        matches!(self.effect, Effect::Mark(_))
    }
}

/// A compiled input method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputMethod {
    pub name: String,
    pub rules: Vec<Rule>,
    /// Every key the method reacts to, in definition order.
    pub keys: Vec<char>,
    /// Keys bound to a tone token.
    pub tone_keys: Vec<char>,
    /// Keys that take part in the two-vowel horn shortcut (Telex `w`).
    pub super_keys: Vec<char>,
}

impl InputMethod {
    /// Compile an ordered `key -> definition` table.
    ///
    /// ```
    /// use libviet_core::InputMethod;
    /// let im = InputMethod::from_definitions("Mini", [('s', "DauSac"), ('w', "UO_ƯƠ")]);
    /// assert_eq!(im.keys, vec!['s', 'w']);
    /// assert_eq!(im.tone_keys, vec!['s']);
    /// assert_eq!(im.super_keys, vec!['w']);
    /// ```
    pub fn from_definitions<'a, I>(name: &str, definitions: I) -> Self
    where
        I: IntoIterator<Item = (char, &'a str)>,
    {
        let mut im = InputMethod {
            name: name.to_string(),
            ..Default::default()
        };
        for (key, line) in definitions {
            im.rules.extend(parse_rules(key, line));
            if line.to_lowercase().contains("uo") {
                im.super_keys.push(key);
            }
            if tone_from_token(line).is_some() {
                im.tone_keys.push(key);
            }
            im.keys.push(key);
        }
        im
    }

    /// Rules triggered by `key` (compared lowercase), in definition order.
    pub fn rules_for(&self, key: char) -> Vec<&Rule> {
        let key = crate::charset::to_lower(key);
        self.rules.iter().filter(|r| r.key == Some(key)).collect()
    }

    pub fn is_key(&self, c: char) -> bool {
        self.keys.contains(&c)
    }
}

fn tone_from_token(token: &str) -> Option<Tone> {
    match token {
        "XoaDauThanh" => Some(Tone::None),
        "DauSac" => Some(Tone::Acute),
        "DauHuyen" => Some(Tone::Grave),
        "DauNga" => Some(Tone::Tilde),
        "DauNang" => Some(Tone::Dot),
        "DauHoi" => Some(Tone::Hook),
        _ => None,
    }
}

static MARK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z]+)_(\p{L}+)([_\p{L}]*)").expect("mark pattern is valid")
});

static APPEND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(_?)_(\p{L}+)").expect("append pattern is valid"));

/// Compile the definition of one key.
///
/// ```
/// use libviet_core::rules::{parse_rules, Effect};
/// use libviet_core::charset::Mark;
/// let rules = parse_rules('d', "D_Đ");
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[0].effect, Effect::Mark(Mark::Stroke));
/// assert_eq!(rules[0].effect_on, Some('d'));
/// ```
pub fn parse_rules(key: char, line: &str) -> Vec<Rule> {
    match tone_from_token(line) {
        Some(tone) => vec![Rule::tone(Some(key), tone)],
        None => parse_toneless_rules(key, line),
    }
}

/// Compile a mark or append definition.
pub fn parse_toneless_rules(key: char, line: &str) -> Vec<Rule> {
    let mut rules = Vec::new();
    let lowered = line.to_lowercase();
    if let Some(caps) = MARK_PATTERN.captures(&lowered) {
        let sources = caps.get(1).map_or("", |m| m.as_str());
        let targets = caps.get(2).map_or("", |m| m.as_str());
        for (source, target) in sources.chars().zip(targets.chars()) {
            let Some(mark) = find_mark_from_char(target) else {
                continue;
            };
            rules.extend(expand_mark_rule(key, source, target, mark));
        }
        let tail = caps.get(3).map_or("", |m| m.as_str());
        rules.extend(appending_rule(key, tail));
    } else {
        rules.extend(appending_rule(key, line));
    }
    if rules.is_empty() {
        debug!(key = %key, definition = line, "definition produced no rules");
    }
    rules
}

/// Expand `source -> target` over the mark family of `source`.
///
/// Every family member other than `target` gets a rule turning it into
/// `target` (once per tone for vowels). `target` itself gets the reverse
/// rule with no mark, which lets the key undo its own effect.
fn expand_mark_rule(key: char, source: char, target: char, mark: Mark) -> Vec<Rule> {
    let mut rules = Vec::new();
    for member in get_mark_family(source) {
        if member == target {
            rules.push(Rule::mark(Some(key), Mark::None, target, source));
        } else if is_vowel(member) {
            for tone in Tone::ALL {
                rules.push(Rule::mark(
                    Some(key),
                    mark,
                    add_tone(member, tone),
                    add_tone(target, tone),
                ));
            }
        } else {
            rules.push(Rule::mark(Some(key), mark, member, target));
        }
    }
    rules
}

fn appending_rule(key: char, value: &str) -> Option<Rule> {
    let caps = APPEND_PATTERN.captures(value)?;
    let mut letters = caps.get(2)?.as_str().chars();
    let first = letters.next()?;
    let mut rule = Rule::appending(Some(key), first);
    rule.appended_rules = letters.map(|c| Rule::appending(None, c)).collect();
    Some(rule)
}
