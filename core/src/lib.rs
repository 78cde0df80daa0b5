//! libviet-core
//!
//! Keystroke-to-Vietnamese transducer shared by the input-method crates.
//! Keys are folded into an append-only transformation graph; a small
//! compiled syllable grammar and the tone/mark character algebra decide
//! where each diacritic lands, and the graph is flattened to text on demand.
//!
//! Public API:
//! - `Engine` - Per-context transducer (process keys, render, undo, restore)
//! - `InputMethod` / `Rule` - Compiled key tables and the rule DSL
//! - `Transformation` - One node of the composition graph
//! - `Mode` / `Flags` - Rendering modes and engine behavior bitmasks
//! - `spelling` - Syllable-shape validator
//! - `charset` - Tone and mark algebra over Vietnamese letters
//! - `Config` - Configuration and feature flags
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod charset;
pub use charset::{Mark, Tone};

pub mod rules;
pub use rules::{Effect, InputMethod, Rule};

pub mod trie;
pub use trie::{MatchResult, TrieNode};

pub mod spelling;

pub mod mode;
pub use mode::{Flags, Mode};

pub mod composition;
pub use composition::Transformation;

pub mod flattener;
pub use flattener::flatten;

pub mod engine;
pub use engine::Engine;

pub mod error;
pub use error::{Error, Result};

/// Engine and rendering options.
///
/// Language crates extend this with their own fields (input method name,
/// custom tables) by flattening it into their config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Tone keys may be typed anywhere in the syllable.
    pub free_tone_marking: bool,
    /// Place tones on open vowel pairs the traditional way ("hòa").
    pub std_tone_style: bool,
    /// One horn key upgrades both letters of "uo".
    pub auto_correct: bool,

    // Rendering
    pub output_lowercase: bool,
    pub tone_less: bool,
    pub mark_less: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            free_tone_marking: true,
            std_tone_style: true,
            auto_correct: true,
            output_lowercase: false,
            tone_less: false,
            mark_less: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Engine flags selected by this config.
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::empty();
        flags.set(Flags::FREE_TONE_MARKING, self.free_tone_marking);
        flags.set(Flags::STD_TONE_STYLE, self.std_tone_style);
        flags.set(Flags::AUTO_CORRECT_ENABLED, self.auto_correct);
        flags
    }

    /// Vietnamese rendering mode with the configured output options.
    pub fn output_mode(&self) -> Mode {
        let mut mode = Mode::VIETNAMESE;
        mode.set(Mode::LOWER_CASE, self.output_lowercase);
        mode.set(Mode::TONE_LESS, self.tone_less);
        mode.set(Mode::MARK_LESS, self.mark_less);
        mode
    }

    /// Config with the engine behavior of `flags` and default rendering.
    pub fn from_flags(flags: Flags) -> Self {
        Self {
            free_tone_marking: flags.contains(Flags::FREE_TONE_MARKING),
            std_tone_style: flags.contains(Flags::STD_TONE_STYLE),
            auto_correct: flags.contains(Flags::AUTO_CORRECT_ENABLED),
            ..Self::default()
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Compose typed text to NFC so combining marks arrive as one key.
    /// Whitespace is kept: spaces are keys like any other.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect()
    }
}
