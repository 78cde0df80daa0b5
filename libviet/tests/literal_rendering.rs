// Literal rendering of the built-in input methods.
//
// For methods whose keys only carry tones and marks, the English full-text
// rendering reproduces the typed keys exactly, whatever the engine did with
// them. Methods with append keys (Microsoft layout, Telex 2) are excluded:
// a doubled append key collapses to a single literal key.
//
// File: libviet/tests/literal_rendering.rs

use libviet::{Engine, Flags, InputMethodKind, Mode};
use proptest::prelude::*;

const METHODS: [InputMethodKind; 6] = [
    InputMethodKind::Telex,
    InputMethodKind::Vni,
    InputMethodKind::Viqr,
    InputMethodKind::TelexVniViqr,
    InputMethodKind::VniFrench,
    InputMethodKind::Telex3,
];

fn keys_strategy(kind: InputMethodKind) -> impl Strategy<Value = String> {
    let mut alphabet: Vec<char> = "abcdeghinoutyAEOW ".chars().collect();
    alphabet.extend(kind.definition().into_iter().map(|(k, _)| k));
    prop::collection::vec(prop::sample::select(alphabet), 0..10)
        .prop_map(|keys| keys.into_iter().collect())
}

fn method_and_keys() -> impl Strategy<Value = (InputMethodKind, String)> {
    prop::sample::select(METHODS.to_vec())
        .prop_flat_map(|kind| (Just(kind), keys_strategy(kind)))
}

proptest! {
    #[test]
    fn english_full_text_is_what_was_typed(
        (kind, keys) in method_and_keys(),
        std in any::<bool>(),
    ) {
        let flags = if std { Flags::STD } else { Flags::empty() };
        let mut engine = Engine::new(kind.input_method(), flags);
        engine.process_string(&keys, Mode::VIETNAMESE);
        prop_assert_eq!(
            engine.get_processed_string(Mode::ENGLISH | Mode::FULL_TEXT),
            keys,
            "{}", kind.name()
        );
    }
}
