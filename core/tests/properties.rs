// Property tests for the keystroke engine.
//
// 1. The literal rendering of the whole buffer is exactly what was typed
// 2. Restoring a word then re-typing its keys matches restoring to Vietnamese
// 3. No panics on arbitrary key/remove/restore sequences
// 4. Every overlay targets an earlier transformation
//
// File: core/tests/properties.rs

use libviet_core::{Engine, Flags, InputMethod, Mode};
use proptest::prelude::*;

const TELEX: [(char, &str); 11] = [
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
];

fn telex() -> InputMethod {
    InputMethod::from_definitions("Telex", TELEX)
}

fn telex_2() -> InputMethod {
    let w = "UOA_ƯƠĂ__Ư";
    let table = TELEX
        .iter()
        .map(|&(k, v)| if k == 'w' { (k, w) } else { (k, v) })
        .chain([(']', "__ư"), ('[', "__ơ"), ('}', "_Ư"), ('{', "_Ơ")]);
    InputMethod::from_definitions("Telex 2", table)
}

fn typed(keys: &str) -> Engine {
    let mut engine = Engine::new(telex(), Flags::STD);
    engine.process_string(keys, Mode::VIETNAMESE);
    engine
}

// ── Strategies ──────────────────────────────────────────────────────────

fn keys_strategy() -> impl Strategy<Value = String> {
    "[a-zAEOW ]{0,12}"
}

#[derive(Debug, Clone)]
enum Op {
    Key(char, Mode),
    Remove(bool),
    Restore(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let keys: Vec<char> = "abcdefghijklmnopqrstuvwxyzAEOW []{}:;.,1".chars().collect();
    let modes = vec![
        Mode::VIETNAMESE,
        Mode::ENGLISH,
        Mode::VIETNAMESE | Mode::IN_REVERSE_ORDER,
    ];
    prop_oneof![
        7 => (prop::sample::select(keys), prop::sample::select(modes))
            .prop_map(|(k, m)| Op::Key(k, m)),
        2 => any::<bool>().prop_map(Op::Remove),
        1 => any::<bool>().prop_map(Op::Restore),
    ]
}

fn flags_strategy() -> impl Strategy<Value = Flags> {
    prop::sample::select(vec![
        Flags::empty(),
        Flags::FREE_TONE_MARKING,
        Flags::FREE_TONE_MARKING | Flags::STD_TONE_STYLE,
        Flags::FREE_TONE_MARKING | Flags::AUTO_CORRECT_ENABLED,
        Flags::STD,
    ])
}

fn targets_precede(engine: &Engine) -> bool {
    engine
        .composition()
        .iter()
        .enumerate()
        .all(|(i, t)| t.offset().map_or(true, |o| o.get() <= i))
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Literal invariance
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn literal_full_text_echoes_keys(keys in keys_strategy()) {
        let engine = typed(&keys);
        prop_assert_eq!(engine.get_processed_string(Mode::ENGLISH | Mode::FULL_TEXT), keys);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Restore law
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn restore_matches_retyping(keys in keys_strategy()) {
        let word = keys.rsplit(' ').next().unwrap_or_default();

        let mut restored = typed(word);
        restored.restore_last_word(true);

        let mut literal = typed(word);
        literal.restore_last_word(false);
        let retyped = typed(&literal.get_processed_string(Mode::ENGLISH));

        prop_assert_eq!(
            restored.get_processed_string(Mode::VIETNAMESE),
            retyped.get_processed_string(Mode::VIETNAMESE)
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. & 4. Arbitrary operation sequences
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arbitrary_operations_never_panic(
        flags in flags_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut engine = Engine::new(telex_2(), flags);
        for op in ops {
            match op {
                Op::Key(key, mode) => engine.process_key(key, mode),
                Op::Remove(refresh) => engine.remove_last_char(refresh),
                Op::Restore(to_vietnamese) => engine.restore_last_word(to_vietnamese),
            }
            for mode in [
                Mode::VIETNAMESE,
                Mode::ENGLISH,
                Mode::FULL_TEXT,
                Mode::PUNCTUATION_MODE,
                Mode::TONE_LESS | Mode::MARK_LESS | Mode::LOWER_CASE,
            ] {
                let _ = engine.get_processed_string(mode);
            }
            let _ = engine.is_valid(true);
            prop_assert!(targets_precede(&engine));
        }
    }
}
