//! Read-only view of the loaded game data that queries search.

use crate::form_type::FormType;

/// Console command or script function descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptCommand {
    pub name: String,
    pub alias: String,
    pub help: String,
}

/// Typed value of a setting; the kind comes from the setting name's prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Float(f32),
    SignedInteger(i32),
    UnsignedInteger(u32),
    Color([u8; 4]),
    String(String),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub name: String,
    pub value: SettingValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub editor_id: String,
    pub value: f32,
}

/// Loaded form as seen through the in-memory object model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub form_id: u32,
    pub form_type: FormType,
    /// Editor ID as kept by the record itself; many types drop it at load.
    pub editor_id: Option<String>,
    pub name: Option<String>,
    /// Only meaningful for cells.
    pub exterior: bool,
}

impl Form {
    pub fn is_exterior_cell(&self) -> bool {
        self.form_type == FormType::Cell && self.exterior
    }
}

/// Collections the help query reads from.
pub trait GameData {
    fn console_commands(&self) -> &[ScriptCommand];

    fn script_functions(&self) -> &[ScriptCommand];

    fn game_settings(&self) -> &[Setting];

    fn ini_settings(&self) -> &[Setting];

    /// Preference override for an INI setting of the same name.
    fn ini_pref_setting(&self, name: &str) -> Option<&Setting>;

    fn globals(&self) -> &[Global];

    /// Every loaded form, keyed by form ID.
    fn all_forms(&self) -> Box<dyn Iterator<Item = &Form> + '_>;

    /// Forms of one type, in data-handler order.
    fn forms_of_type(&self, form_type: FormType) -> Box<dyn Iterator<Item = &Form> + '_>;
}
