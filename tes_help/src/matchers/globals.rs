use crate::matchers::{emit_all, MatchResult};
use crate::model::{GameData, Global};
use crate::sink::ResultSink;
use crate::text::MatchString;

pub const GLOBALS_HEADER: &str = "----GLOBAL VARIABLES--------------------";

pub fn matches<'a>(
    globals: &'a [Global],
    query: &'a MatchString,
) -> impl Iterator<Item = MatchResult> + 'a {
    globals
        .iter()
        .filter(move |global| query.found_in(&global.editor_id))
        .map(|global| {
            MatchResult::unsorted(format!("{} = {:.2}", global.editor_id, global.value))
        })
}

pub fn print(data: &dyn GameData, query: &MatchString, sink: &mut dyn ResultSink) {
    sink.emit(GLOBALS_HEADER);
    emit_all(matches(data.globals(), query), sink);
}
