//! Rendering modes and engine behavior flags.

use bitflags::bitflags;

bitflags! {
    /// How a keystroke is interpreted and how the composition is rendered.
    ///
    /// Modes combine freely: `Mode::VIETNAMESE | Mode::FULL_TEXT` renders the
    /// whole buffer with diacritics, `Mode::ENGLISH | Mode::FULL_TEXT` renders
    /// every physical key that was typed.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u32 {
        const VIETNAMESE       = 1 << 0;
        /// Literal rendering: raw keys, no diacritics.
        const ENGLISH          = 1 << 1;
        const TONE_LESS        = 1 << 2;
        const MARK_LESS        = 1 << 3;
        const LOWER_CASE       = 1 << 4;
        /// Render the whole composition instead of the last word.
        const FULL_TEXT        = 1 << 5;
        /// Last word, keeping trailing punctuation attached.
        const PUNCTUATION_MODE = 1 << 6;
        /// Insert literal keys at the front (replaying text left of the cursor).
        const IN_REVERSE_ORDER = 1 << 7;
    }
}

bitflags! {
    /// Engine behavior flags.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        /// Tone keys may be pressed anywhere in the syllable.
        const FREE_TONE_MARKING    = 1 << 0;
        /// Tone on the first of an open vowel pair ("hòa", not "hoà"),
        /// on ơ/ê when the pair has one.
        const STD_TONE_STYLE       = 1 << 1;
        const AUTO_CORRECT_ENABLED = 1 << 2;
        const STD = Self::FREE_TONE_MARKING.bits()
            | Self::STD_TONE_STYLE.bits()
            | Self::AUTO_CORRECT_ENABLED.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_flags_cover_all_behaviors() {
        assert!(Flags::STD.contains(Flags::FREE_TONE_MARKING));
        assert!(Flags::STD.contains(Flags::STD_TONE_STYLE));
        assert!(Flags::STD.contains(Flags::AUTO_CORRECT_ENABLED));
    }

    #[test]
    fn test_modes_are_distinct_bits() {
        let all = [
            Mode::VIETNAMESE,
            Mode::ENGLISH,
            Mode::TONE_LESS,
            Mode::MARK_LESS,
            Mode::LOWER_CASE,
            Mode::FULL_TEXT,
            Mode::PUNCTUATION_MODE,
            Mode::IN_REVERSE_ORDER,
        ];
        let mut acc = Mode::empty();
        for m in all {
            assert!(!acc.intersects(m));
            acc |= m;
        }
        assert_eq!(acc, Mode::all());
    }
}
