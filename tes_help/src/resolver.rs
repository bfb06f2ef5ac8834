use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};

use crate::model::Form;
use crate::snapshot::parse_form_id;

/// External provider of editor IDs for forms that drop theirs at load.
pub trait EditorIdSource: Send + Sync {
    fn editor_id(&self, form_id: u32) -> Option<&str>;
}

/// Editor IDs loaded from a JSON object of `"FORMID": "EditorId"` pairs.
#[derive(Debug, Default, Clone)]
pub struct EditorIdTable {
    ids: HashMap<u32, String>,
}

impl EditorIdTable {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read editor id table: {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse editor id table: {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let map: HashMap<String, String> = serde_json::from_str(text)?;
        let mut ids = HashMap::with_capacity(map.len());
        for (form_id, editor_id) in map {
            ids.insert(parse_form_id(&form_id)?, editor_id);
        }
        Ok(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl EditorIdSource for EditorIdTable {
    fn editor_id(&self, form_id: u32) -> Option<&str> {
        self.ids.get(&form_id).map(String::as_str)
    }
}

/// Resolves the editor ID shown for a form.
///
/// Types that keep their editor ID in memory always use it. Other types ask
/// the external source first, if one was installed, and fall back to the
/// record's own value.
#[derive(Default)]
pub struct EditorIdResolver {
    external: Option<Box<dyn EditorIdSource>>,
}

impl EditorIdResolver {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn with_source(source: Box<dyn EditorIdSource>) -> Self {
        Self {
            external: Some(source),
        }
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    pub fn resolve<'a>(&'a self, form: &'a Form) -> &'a str {
        let builtin = form.editor_id.as_deref().unwrap_or("");
        if form.form_type.stores_editor_id() {
            return builtin;
        }
        self.external
            .as_ref()
            .and_then(|source| source.editor_id(form.form_id))
            .unwrap_or(builtin)
    }
}

impl std::fmt::Debug for EditorIdResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorIdResolver")
            .field("external", &self.external.is_some())
            .finish()
    }
}
