use crate::cells::CellIndex;
use crate::matchers::{emit_sorted, MatchResult};
use crate::sink::ResultSink;
use crate::text::MatchString;

pub const EXTERIOR_CELLS_HEADER: &str = "----EXTERIOR CELLS----------------------";

/// Cells whose identifier contains the query, keyed `(compile index, identifier)`.
pub fn matches<'a>(
    index: &'a CellIndex,
    query: &'a MatchString,
) -> impl Iterator<Item = MatchResult<(u32, &'a str)>> + 'a {
    index
        .iter()
        .filter(move |(_, identifier, _)| query.found_in(identifier))
        .map(|(compile_index, identifier, file)| MatchResult {
            sort_key: (compile_index, identifier),
            display_line: format_cell(file, identifier),
        })
}

pub fn format_cell(file: &str, identifier: &str) -> String {
    if file.is_empty() {
        format!("CELL: {identifier}")
    } else {
        format!("{file} CELL: {identifier}")
    }
}

pub fn print(index: &CellIndex, query: &MatchString, sink: &mut dyn ResultSink) {
    sink.emit(EXTERIOR_CELLS_HEADER);
    emit_sorted(matches(index, query), sink);
}
