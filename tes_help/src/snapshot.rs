use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::form_type::FormType;
use crate::model::{Form, GameData, Global, ScriptCommand, Setting, SettingValue};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonFormId {
    Number(u32),
    Text(String),
}

impl JsonFormId {
    fn resolve(&self) -> Result<u32> {
        match self {
            JsonFormId::Number(value) => Ok(*value),
            JsonFormId::Text(text) => parse_form_id(text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonCommand {
    name: String,
    #[serde(default)]
    alias: String,
    #[serde(default)]
    help: String,
}

#[derive(Debug, Deserialize)]
struct JsonSetting {
    name: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct JsonGlobal {
    editor_id: String,
    value: f32,
}

#[derive(Debug, Deserialize)]
struct JsonForm {
    form_id: JsonFormId,
    #[serde(rename = "type")]
    form_type: FormType,
    #[serde(default)]
    editor_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    exterior: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonSnapshot {
    console_commands: Vec<JsonCommand>,
    script_functions: Vec<JsonCommand>,
    game_settings: Vec<JsonSetting>,
    ini_settings: Vec<JsonSetting>,
    ini_pref_settings: Option<Vec<JsonSetting>>,
    globals: Vec<JsonGlobal>,
    forms: Vec<JsonForm>,
}

/// Game data captured as a JSON document.
///
/// Stands in for the engine's singletons: command tables, setting
/// collections, the global list and the form maps.
#[derive(Debug, Default, Clone)]
pub struct GameSnapshot {
    console_commands: Vec<ScriptCommand>,
    script_functions: Vec<ScriptCommand>,
    game_settings: Vec<Setting>,
    ini_settings: Vec<Setting>,
    ini_pref_settings: Option<Vec<Setting>>,
    ini_pref_index: HashMap<String, usize>,
    globals: Vec<Global>,
    forms: Vec<Form>,
    forms_by_id: BTreeMap<u32, usize>,
    forms_by_type: HashMap<FormType, Vec<usize>>,
}

impl GameSnapshot {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot file: {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to load snapshot: {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: JsonSnapshot = serde_json::from_str(text).context("parsing snapshot json")?;

        let mut snapshot = GameSnapshot {
            console_commands: raw.console_commands.into_iter().map(command).collect(),
            script_functions: raw.script_functions.into_iter().map(command).collect(),
            game_settings: raw.game_settings.into_iter().map(setting).collect(),
            ini_settings: raw.ini_settings.into_iter().map(setting).collect(),
            ini_pref_settings: raw
                .ini_pref_settings
                .map(|prefs| prefs.into_iter().map(setting).collect()),
            globals: raw
                .globals
                .into_iter()
                .map(|global| Global {
                    editor_id: global.editor_id,
                    value: global.value,
                })
                .collect(),
            ..GameSnapshot::default()
        };

        if let Some(prefs) = &snapshot.ini_pref_settings {
            for (index, pref) in prefs.iter().enumerate() {
                snapshot
                    .ini_pref_index
                    .insert(pref.name.to_ascii_lowercase(), index);
            }
        }

        for (index, form) in raw.forms.into_iter().enumerate() {
            let form_id = form
                .form_id
                .resolve()
                .with_context(|| format!("form #{index} has an invalid form_id"))?;
            snapshot.push_form(Form {
                form_id,
                form_type: form.form_type,
                editor_id: form.editor_id,
                name: form.name,
                exterior: form.exterior,
            });
        }

        Ok(snapshot)
    }

    fn push_form(&mut self, form: Form) {
        let index = self.forms.len();
        if let Some(previous) = self.forms_by_id.insert(form.form_id, index) {
            warn!(
                "form {:08X} listed twice; keeping the later {} entry",
                form.form_id, form.form_type
            );
            for indices in self.forms_by_type.values_mut() {
                indices.retain(|&i| i != previous);
            }
        }
        self.forms_by_type
            .entry(form.form_type)
            .or_default()
            .push(index);
        self.forms.push(form);
    }

    pub fn form_count(&self) -> usize {
        self.forms_by_id.len()
    }
}

impl GameData for GameSnapshot {
    fn console_commands(&self) -> &[ScriptCommand] {
        &self.console_commands
    }

    fn script_functions(&self) -> &[ScriptCommand] {
        &self.script_functions
    }

    fn game_settings(&self) -> &[Setting] {
        &self.game_settings
    }

    fn ini_settings(&self) -> &[Setting] {
        &self.ini_settings
    }

    fn ini_pref_setting(&self, name: &str) -> Option<&Setting> {
        let prefs = self.ini_pref_settings.as_ref()?;
        let index = self.ini_pref_index.get(&name.to_ascii_lowercase())?;
        prefs.get(*index)
    }

    fn globals(&self) -> &[Global] {
        &self.globals
    }

    fn all_forms(&self) -> Box<dyn Iterator<Item = &Form> + '_> {
        Box::new(self.forms_by_id.values().map(|&index| &self.forms[index]))
    }

    fn forms_of_type(&self, form_type: FormType) -> Box<dyn Iterator<Item = &Form> + '_> {
        match self.forms_by_type.get(&form_type) {
            Some(indices) => Box::new(indices.iter().map(|&index| &self.forms[index])),
            None => Box::new(std::iter::empty()),
        }
    }
}

fn command(raw: JsonCommand) -> ScriptCommand {
    ScriptCommand {
        name: raw.name,
        alias: raw.alias,
        help: raw.help,
    }
}

fn setting(raw: JsonSetting) -> Setting {
    let value = SettingValue::from_json(&raw.name, &raw.value);
    if value == SettingValue::Unknown {
        warn!("setting {} has no recognised kind for {}", raw.name, raw.value);
    }
    Setting {
        name: raw.name,
        value,
    }
}

impl SettingValue {
    /// Decode a JSON value using the kind declared by the name's prefix.
    ///
    /// The prefix letter is read without regard to case, like the name
    /// lookups. Values that do not fit the declared kind decode as `Unknown`.
    pub fn from_json(name: &str, value: &Value) -> SettingValue {
        let kind = name.chars().next().map(|prefix| prefix.to_ascii_lowercase());
        let decoded = match kind {
            Some('b') => value
                .as_bool()
                .or_else(|| value.as_i64().map(|v| v != 0))
                .map(SettingValue::Bool),
            Some('f') => value.as_f64().map(|v| SettingValue::Float(v as f32)),
            Some('i') => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(SettingValue::SignedInteger),
            Some('u') => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(SettingValue::UnsignedInteger),
            Some('r') => color(value).map(SettingValue::Color),
            Some('s') => value.as_str().map(|v| SettingValue::String(v.to_string())),
            _ => None,
        };
        decoded.unwrap_or(SettingValue::Unknown)
    }
}

fn color(value: &Value) -> Option<[u8; 4]> {
    let channels = value.as_array()?;
    if channels.len() != 3 && channels.len() != 4 {
        return None;
    }
    let mut rgba = [0, 0, 0, 255];
    for (slot, channel) in rgba.iter_mut().zip(channels) {
        *slot = u8::try_from(channel.as_u64()?).ok()?;
    }
    Some(rgba)
}

/// Parse a hexadecimal form ID, with or without a `0x` prefix.
pub fn parse_form_id(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 8 {
        bail!("form id '{text}' must be 1-8 hex digits");
    }
    u32::from_str_radix(digits, 16).map_err(|err| anyhow!("form id '{text}': {err}"))
}
