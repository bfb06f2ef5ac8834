//! Generic forms: everything loaded that is neither a global nor an exterior
//! cell.

use crate::form_type::FormType;
use crate::matchers::{emit_sorted, MatchResult};
use crate::model::Form;
use crate::resolver::EditorIdResolver;
use crate::sink::ResultSink;
use crate::text::MatchString;

/// Listing order: type code, then editor ID, then form ID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormKey {
    pub type_code: u32,
    pub editor_id: String,
    pub form_id: u32,
}

pub fn matches<'a>(
    forms: impl Iterator<Item = &'a Form> + 'a,
    query: &'a MatchString,
    resolver: &'a EditorIdResolver,
) -> impl Iterator<Item = MatchResult<FormKey>> + 'a {
    forms
        .filter(|form| form.form_type != FormType::Global && !form.is_exterior_cell())
        .filter_map(move |form| {
            let editor_id = resolver.resolve(form);
            let name = form.name.as_deref().unwrap_or("");
            if !query.found_in(editor_id) && !query.found_in(name) {
                return None;
            }
            Some(MatchResult {
                sort_key: FormKey {
                    type_code: form.form_type.sort_code(),
                    editor_id: editor_id.to_string(),
                    form_id: form.form_id,
                },
                display_line: format_form(form, editor_id),
            })
        })
}

pub fn format_form(form: &Form, editor_id: &str) -> String {
    let mut line = format!("{}: {} ({:08X})", form.form_type, editor_id, form.form_id);
    if let Some(name) = form.name.as_deref().filter(|name| !name.is_empty()) {
        line.push_str(&format!(" '{name}'"));
    }
    line
}

/// Sorted matches from `forms`, without a section header.
pub fn print<'a>(
    forms: impl Iterator<Item = &'a Form> + 'a,
    query: &'a MatchString,
    resolver: &'a EditorIdResolver,
    sink: &mut dyn ResultSink,
) {
    emit_sorted(matches(forms, query, resolver), sink);
}
