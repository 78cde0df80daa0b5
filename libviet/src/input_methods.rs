//! Built-in input method tables.
//!
//! Each table is an ordered list of `trigger key -> definition` pairs in the
//! rule DSL of [`libviet_core::rules`]. Order matters: it fixes the key order
//! of the compiled method and with it the key used for the `uo` horn
//! shortcut (the first key whose definition mentions `uo`).
//!
//! ## Supported methods
//!
//! - **Telex**: letters double as marks (`aa` → â, `w` → horn/breve)
//! - **VNI**: digits 0-9
//! - **VIQR**: punctuation that looks like the diacritic
//! - **Microsoft layout**: the Windows Vietnamese keyboard, one key per letter
//! - **Telex 2**: Telex plus bracket keys for ư/ơ, `w` alone types ư
//! - **Telex + VNI + VIQR**: all three at once
//! - **VNI Bàn phím tiếng Pháp**: VNI on a French AZERTY keyboard
//! - **Telex 3**: Telex plus `[` for ươ

use libviet_core::{Error, InputMethod, Result};
use tracing::debug;

/// An ordered `(trigger key, definition)` table.
pub type InputMethodDefinition = Vec<(char, String)>;

const TELEX: &[(char, &str)] = &[
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

const VNI: &[(char, &str)] = &[
    ('0', "XoaDauThanh"),
    ('1', "DauSac"),
    ('2', "DauHuyen"),
    ('3', "DauHoi"),
    ('4', "DauNga"),
    ('5', "DauNang"),
    ('6', "AEO_ÂÊÔ"),
    ('7', "UO_ƯƠ"),
    ('8', "A_Ă"),
    ('9', "D_Đ"),
];

const VIQR: &[(char, &str)] = &[
    ('0', "XoaDauThanh"),
    ('\'', "DauSac"),
    ('`', "DauHuyen"),
    ('?', "DauHoi"),
    ('~', "DauNga"),
    ('.', "DauNang"),
    ('^', "AEO_ÂÊÔ"),
    ('+', "UO_ƯƠ"),
    ('*', "UO_ƯƠ"),
    ('(', "A_Ă"),
    ('\\', "D_Đ"),
];

const MICROSOFT_LAYOUT: &[(char, &str)] = &[
    ('8', "DauSac"),
    ('5', "DauHuyen"),
    ('6', "DauHoi"),
    ('7', "DauNga"),
    ('9', "DauNang"),
    ('1', "__ă"),
    ('!', "_Ă"),
    ('2', "__â"),
    ('@', "_Â"),
    ('3', "__ê"),
    ('#', "_Ê"),
    ('4', "__ô"),
    ('$', "_Ô"),
    ('0', "__đ"),
    (')', "_Đ"),
    ('[', "__ư"),
    ('{', "_Ư"),
    (']', "__ơ"),
    ('}', "_Ơ"),
];

const TELEX_2_EXTRA: &[(char, &str)] = &[(']', "__ư"), ('[', "__ơ"), ('}', "_Ư"), ('{', "_Ơ")];

const TELEX_3_EXTRA: &[(char, &str)] = &[('[', "__ươ"), ('{', "_ƯƠ")];

const VNI_FRENCH: &[(char, &str)] = &[
    ('&', "XoaDauThanh"),
    ('é', "DauSac"),
    ('"', "DauHuyen"),
    ('\'', "DauHoi"),
    ('(', "DauNga"),
    ('-', "DauNang"),
    ('è', "AEO_ÂÊÔ"),
    ('_', "UO_ƯƠ"),
    ('ç', "A_Ă"),
    ('à', "D_Đ"),
];

/// The built-in input methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMethodKind {
    Telex,
    Vni,
    Viqr,
    MicrosoftLayout,
    Telex2,
    TelexVniViqr,
    VniFrench,
    Telex3,
}

static BY_NAME: phf::Map<&'static str, InputMethodKind> = phf::phf_map! {
    "Telex" => InputMethodKind::Telex,
    "VNI" => InputMethodKind::Vni,
    "VIQR" => InputMethodKind::Viqr,
    "Microsoft layout" => InputMethodKind::MicrosoftLayout,
    "Telex 2" => InputMethodKind::Telex2,
    "Telex + VNI + VIQR" => InputMethodKind::TelexVniViqr,
    "VNI Bàn phím tiếng Pháp" => InputMethodKind::VniFrench,
    "Telex 3" => InputMethodKind::Telex3,
};

impl InputMethodKind {
    pub const ALL: [InputMethodKind; 8] = [
        InputMethodKind::Telex,
        InputMethodKind::Vni,
        InputMethodKind::Viqr,
        InputMethodKind::MicrosoftLayout,
        InputMethodKind::Telex2,
        InputMethodKind::TelexVniViqr,
        InputMethodKind::VniFrench,
        InputMethodKind::Telex3,
    ];

    /// Display name, as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            InputMethodKind::Telex => "Telex",
            InputMethodKind::Vni => "VNI",
            InputMethodKind::Viqr => "VIQR",
            InputMethodKind::MicrosoftLayout => "Microsoft layout",
            InputMethodKind::Telex2 => "Telex 2",
            InputMethodKind::TelexVniViqr => "Telex + VNI + VIQR",
            InputMethodKind::VniFrench => "VNI Bàn phím tiếng Pháp",
            InputMethodKind::Telex3 => "Telex 3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name).copied()
    }

    /// The key table of this method.
    pub fn definition(&self) -> InputMethodDefinition {
        let owned = |table: &[(char, &str)]| -> InputMethodDefinition {
            table.iter().map(|&(k, v)| (k, v.to_string())).collect()
        };
        match self {
            InputMethodKind::Telex => owned(TELEX),
            InputMethodKind::Vni => owned(VNI),
            InputMethodKind::Viqr => owned(VIQR),
            InputMethodKind::MicrosoftLayout => owned(MICROSOFT_LAYOUT),
            InputMethodKind::Telex2 => {
                let mut def = owned(TELEX);
                for (key, rule) in def.iter_mut() {
                    if *key == 'w' {
                        *rule = "UOA_ƯƠĂ__Ư".to_string();
                    }
                }
                def.extend(owned(TELEX_2_EXTRA));
                def
            }
            InputMethodKind::TelexVniViqr => {
                let mut def = owned(TELEX);
                for table in [VNI, VIQR] {
                    for &(key, rule) in table {
                        if !def.iter().any(|(k, _)| *k == key) {
                            def.push((key, rule.to_string()));
                        }
                    }
                }
                def
            }
            InputMethodKind::VniFrench => owned(VNI_FRENCH),
            InputMethodKind::Telex3 => {
                let mut def = owned(TELEX);
                def.extend(owned(TELEX_3_EXTRA));
                def
            }
        }
    }

    pub fn input_method(&self) -> InputMethod {
        parse_input_method(self.name(), &self.definition())
    }
}

/// Compile a key table into an input method.
pub fn parse_input_method(name: &str, definition: &[(char, String)]) -> InputMethod {
    InputMethod::from_definitions(name, definition.iter().map(|(k, v)| (*k, v.as_str())))
}

/// Names of the built-in methods, in menu order.
pub fn input_method_names() -> Vec<&'static str> {
    InputMethodKind::ALL.iter().map(|kind| kind.name()).collect()
}

/// Compile a built-in method by display name.
///
/// ```
/// let telex = libviet::lookup("Telex").unwrap();
/// assert_eq!(telex.super_keys, vec!['w']);
/// assert!(libviet::lookup("Dvorak").is_err());
/// ```
pub fn lookup(name: &str) -> Result<InputMethod> {
    match InputMethodKind::from_name(name) {
        Some(kind) => Ok(kind.input_method()),
        None => {
            debug!(name, "unknown input method");
            Err(Error::UnknownInputMethod(name.to_string()))
        }
    }
}
