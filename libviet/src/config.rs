use libviet_core::{Config, Error, InputMethod, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input_methods::{self, parse_input_method, InputMethodDefinition};

/// One `key = rule` line of a custom table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyDefinition {
    /// Must be exactly one character.
    pub key: String,
    pub rule: String,
}

/// A user-defined input method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomInputMethod {
    pub name: String,
    #[serde(default)]
    pub definitions: Vec<KeyDefinition>,
}

impl CustomInputMethod {
    /// The table as ordered `(key, rule)` pairs.
    pub fn definition(&self) -> Result<InputMethodDefinition> {
        self.definitions
            .iter()
            .map(|d| {
                let mut chars = d.key.chars();
                match (chars.next(), chars.next()) {
                    (Some(key), None) => Ok((key, d.rule.clone())),
                    _ => Err(Error::InvalidKeyDefinition {
                        key: d.key.clone(),
                        definition: d.rule.clone(),
                    }),
                }
            })
            .collect()
    }
}

/// Vietnamese-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `libviet_core::Config` (flattened via serde)
/// - The name of the active input method
/// - User-defined input method tables
///
/// # Example
///
/// ```rust
/// use libviet::VietConfig;
///
/// let config = VietConfig::from_toml_str(r#"
/// input_method = "VNI"
/// std_tone_style = false
/// "#).unwrap();
/// assert_eq!(config.resolve_input_method().unwrap().name, "VNI");
/// assert!(!config.base().std_tone_style);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VietConfig {
    /// Base configuration fields (tone placement, output options)
    #[serde(flatten)]
    pub base: Config,

    /// Display name of the active input method
    pub input_method: String,

    /// Tables that are looked up before the built-in ones
    pub custom_input_methods: Vec<CustomInputMethod>,
}

impl Default for VietConfig {
    fn default() -> Self {
        Self {
            base: Config::default(),
            input_method: "Telex".to_string(),
            custom_input_methods: Vec::new(),
        }
    }
}

impl VietConfig {
    /// Convert this config into the base config
    pub fn into_base(self) -> Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut Config {
        &mut self.base
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Compile the configured input method. Custom tables shadow built-ins
    /// of the same name.
    pub fn resolve_input_method(&self) -> Result<InputMethod> {
        if let Some(custom) = self
            .custom_input_methods
            .iter()
            .find(|m| m.name == self.input_method)
        {
            debug!(name = %custom.name, "using custom input method");
            return Ok(parse_input_method(&custom.name, &custom.definition()?));
        }
        input_methods::lookup(&self.input_method)
    }
}
