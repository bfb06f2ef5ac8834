use crate::matchers::{emit_all, MatchResult};
use crate::model::{GameData, Setting, SettingValue};
use crate::sink::ResultSink;
use crate::text::MatchString;

pub const GAME_SETTINGS_HEADER: &str = "----GAME SETTINGS-----------------------";
pub const INI_SETTINGS_HEADER: &str = "----INI SETTINGS------------------------";

pub fn matches<'a, I>(
    settings: I,
    query: &'a MatchString,
) -> impl Iterator<Item = MatchResult> + 'a
where
    I: IntoIterator<Item = &'a Setting>,
    I::IntoIter: 'a,
{
    settings
        .into_iter()
        .filter(move |setting| query.found_in(&setting.name))
        .map(|setting| MatchResult::unsorted(format_setting(setting)))
}

pub fn format_setting(setting: &Setting) -> String {
    format!("{} = {}", setting.name, format_value(&setting.value))
}

pub fn format_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(value) => value.to_string(),
        SettingValue::Float(value) => format!("{value:.2}"),
        SettingValue::SignedInteger(value) => value.to_string(),
        SettingValue::UnsignedInteger(value) => value.to_string(),
        SettingValue::Color([r, g, b, a]) => format!("({r}, {g}, {b}, {a})"),
        SettingValue::String(value) => value.clone(),
        SettingValue::Unknown => "<UNKNOWN>".to_string(),
    }
}

/// INI settings as currently in effect: a preference value of the same name
/// replaces the base value.
pub fn effective_ini_settings(data: &dyn GameData) -> impl Iterator<Item = &Setting> {
    data.ini_settings()
        .iter()
        .map(move |base| data.ini_pref_setting(&base.name).unwrap_or(base))
}

pub fn print(data: &dyn GameData, query: &MatchString, sink: &mut dyn ResultSink) {
    sink.emit(GAME_SETTINGS_HEADER);
    emit_all(matches(data.game_settings(), query), sink);

    sink.emit(INI_SETTINGS_HEADER);
    emit_all(matches(effective_ini_settings(data), query), sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::GameSnapshot;

    fn setting(name: &str, value: SettingValue) -> Setting {
        Setting {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn formats_every_kind() {
        let cases = [
            (SettingValue::Bool(true), "bFlag = true"),
            (SettingValue::Float(76.0), "bFlag = 76.00"),
            (SettingValue::Float(1.5), "bFlag = 1.50"),
            (SettingValue::SignedInteger(-4), "bFlag = -4"),
            (SettingValue::UnsignedInteger(4000000000), "bFlag = 4000000000"),
            (SettingValue::Color([255, 128, 0, 255]), "bFlag = (255, 128, 0, 255)"),
            (SettingValue::String("Whiterun".to_string()), "bFlag = Whiterun"),
            (SettingValue::Unknown, "bFlag = <UNKNOWN>"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_setting(&setting("bFlag", value)), expected);
        }
    }

    #[test]
    fn matches_on_name_only() {
        let settings = vec![
            setting("fJumpHeightMin", SettingValue::Float(76.0)),
            setting("sJump", SettingValue::String("height".to_string())),
        ];
        let query = MatchString::new("HEIGHT");
        let lines: Vec<String> = matches(&settings, &query)
            .map(|result| result.display_line)
            .collect();
        assert_eq!(lines, vec!["fJumpHeightMin = 76.00"]);
    }

    #[test]
    fn preference_values_replace_base_ini_values() {
        let snapshot = GameSnapshot::from_json_str(
            r#"{
                "ini_settings": [
                    { "name": "fDefaultFOV:Display", "value": 65.0 },
                    { "name": "bShowCompass:Interface", "value": true }
                ],
                "ini_pref_settings": [ { "name": "fDefaultFOV:Display", "value": 90.0 } ]
            }"#,
        )
        .unwrap();
        let lines: Vec<String> = effective_ini_settings(&snapshot)
            .map(format_setting)
            .collect();
        assert_eq!(
            lines,
            vec![
                "fDefaultFOV:Display = 90.00",
                "bShowCompass:Interface = true",
            ]
        );
    }

    #[test]
    fn preference_with_different_case_keeps_its_kind() {
        let snapshot = GameSnapshot::from_json_str(
            r#"{
                "ini_settings": [ { "name": "bShowCompass:Interface", "value": true } ],
                "ini_pref_settings": [ { "name": "BSHOWCOMPASS:INTERFACE", "value": false } ]
            }"#,
        )
        .unwrap();
        let query = MatchString::new("showcompass");
        let lines: Vec<String> = matches(effective_ini_settings(&snapshot), &query)
            .map(|result| result.display_line)
            .collect();
        assert_eq!(lines, vec!["BSHOWCOMPASS:INTERFACE = false"]);
    }
}
