//! libviet crate root
//!
//! This crate provides the Vietnamese input-method tables and a config-driven
//! constructor for the `libviet-core` engine.
//!
//! Public API exported here:
//! - `InputMethodKind`, `lookup` and `parse_input_method` from `input_methods`
//! - `VietConfig` from `config`
//! - `engine_from_config` to build a ready engine

// Language-specific modules.
pub mod config;
pub mod input_methods;

// Re-export engine types from core so callers need only this crate.
pub use libviet_core::{Config, Engine, Error, Flags, InputMethod, Mode, Result, Rule};

// Convenience re-exports for common types used by callers.
pub use config::{CustomInputMethod, KeyDefinition, VietConfig};
pub use input_methods::{
    input_method_names, lookup, parse_input_method, InputMethodDefinition, InputMethodKind,
};

/// Build an engine for the input method and flags named by `config`.
///
/// ```
/// use libviet::{engine_from_config, Mode, VietConfig};
///
/// let mut engine = engine_from_config(&VietConfig::default()).unwrap();
/// engine.process_string("dduwongf", Mode::VIETNAMESE);
/// assert_eq!(engine.get_processed_string(Mode::VIETNAMESE), "đường");
/// ```
pub fn engine_from_config(config: &VietConfig) -> Result<Engine> {
    let input_method = config.resolve_input_method()?;
    Ok(Engine::new(input_method, config.base().flags()))
}
