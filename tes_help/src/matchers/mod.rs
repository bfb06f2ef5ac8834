//! Per-source match predicates and line formatting.

pub mod cells;
pub mod commands;
pub mod forms;
pub mod globals;
pub mod settings;

use crate::sink::ResultSink;

/// One surfaced entry: how it sorts and exactly what gets printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<K = ()> {
    pub sort_key: K,
    pub display_line: String,
}

impl MatchResult<()> {
    fn unsorted(display_line: String) -> Self {
        MatchResult {
            sort_key: (),
            display_line,
        }
    }
}

/// Emit `results` in the order given.
pub fn emit_all<K>(results: impl IntoIterator<Item = MatchResult<K>>, sink: &mut dyn ResultSink) {
    for result in results {
        sink.emit(&result.display_line);
    }
}

/// Sort by key, then emit. Entries with equal keys keep their source order.
pub fn emit_sorted<K: Ord>(
    results: impl IntoIterator<Item = MatchResult<K>>,
    sink: &mut dyn ResultSink,
) {
    let mut results: Vec<MatchResult<K>> = results.into_iter().collect();
    results.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    emit_all(results, sink);
}
