use crate::matchers::{emit_all, MatchResult};
use crate::model::{GameData, ScriptCommand};
use crate::sink::ResultSink;
use crate::text::MatchString;

pub const CONSOLE_COMMANDS_HEADER: &str = "----CONSOLE COMMANDS--------------------";
pub const SCRIPT_FUNCTIONS_HEADER: &str = "----SCRIPT FUNCTIONS--------------------";

/// Commands whose name, alias or help text contains the query.
/// Nameless table slots never match.
pub fn matches<'a>(
    commands: &'a [ScriptCommand],
    query: &'a MatchString,
) -> impl Iterator<Item = MatchResult> + 'a {
    commands
        .iter()
        .filter(|command| !command.name.is_empty())
        .filter(move |command| {
            query.found_in(&command.name)
                || query.found_in(&command.alias)
                || query.found_in(&command.help)
        })
        .map(|command| MatchResult::unsorted(format_command(command)))
}

/// `name (alias) > help`, leaving out the empty parts.
pub fn format_command(command: &ScriptCommand) -> String {
    let mut line = command.name.clone();
    if !command.alias.is_empty() {
        line.push_str(&format!(" ({})", command.alias));
    }
    if !command.help.is_empty() {
        line.push_str(&format!(" > {}", command.help));
    }
    line
}

pub fn print(data: &dyn GameData, query: &MatchString, sink: &mut dyn ResultSink) {
    sink.emit(CONSOLE_COMMANDS_HEADER);
    emit_all(matches(data.console_commands(), query), sink);

    sink.emit(SCRIPT_FUNCTIONS_HEADER);
    emit_all(matches(data.script_functions(), query), sink);
}
