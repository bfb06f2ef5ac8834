use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::warn;
use tes_formats::{CompileIndex, FormIdMapper, PluginHeader};
use walkdir::WalkDir;

const PLUGIN_EXTENSIONS: [&str; 3] = ["esm", "esp", "esl"];

/// One plugin file in the load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFile {
    pub name: String,
    pub path: PathBuf,
    pub compile_index: CompileIndex,
    pub masters: Vec<String>,
}

/// Plugin files with their load slots, regular files before light files.
#[derive(Debug, Default, Clone)]
pub struct LoadOrder {
    files: Vec<ContainerFile>,
}

impl LoadOrder {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve the plugins named in `list` (plugins.txt layout) under `data_dir`.
    pub fn from_plugin_list<P: AsRef<Path>, Q: AsRef<Path>>(data_dir: P, list: Q) -> Result<Self> {
        let list = list.as_ref();
        let raw = fs::read_to_string(list)
            .with_context(|| format!("reading plugin list {}", list.display()))?;
        let names: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.trim_start_matches('*').to_string())
            .collect();
        Ok(Self::from_names(data_dir.as_ref(), &names))
    }

    /// Every plugin sitting directly in `data_dir`: masters first, then by name.
    pub fn discover<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        if !data_dir.is_dir() {
            bail!("{} is not a directory", data_dir.display());
        }

        let mut names: Vec<String> = WalkDir::new(data_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| plugin_extension(entry.path()).is_some())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        names.sort_by_key(|name| {
            let is_master = plugin_extension(Path::new(name)).as_deref() == Some("esm");
            (!is_master, name.to_ascii_lowercase())
        });

        Ok(Self::from_names(data_dir, &names))
    }

    /// Assign load slots to `names` in order. Names with no file in
    /// `data_dir` get no slot. Files whose header cannot be read are kept as
    /// regular plugins so the cell scan reports them.
    pub fn from_names(data_dir: &Path, names: &[String]) -> Self {
        let mut primary = Vec::new();
        let mut light = Vec::new();
        let mut seen = HashSet::new();

        for name in names {
            if !seen.insert(name.to_ascii_lowercase()) {
                warn!("{name} is listed more than once; keeping the first entry");
                continue;
            }

            let path = data_dir.join(name);
            if !path.is_file() {
                warn!("{name} is not in {}; skipping", data_dir.display());
                continue;
            }
            let header = match PluginHeader::read(&path) {
                Ok(header) => header,
                Err(err) => {
                    warn!("failed to read header of {}: {err}", path.display());
                    PluginHeader::default()
                }
            };
            let is_light = header.is_light()
                || plugin_extension(&path).as_deref() == Some("esl");
            let slot = (name.clone(), path, header);
            if is_light {
                light.push(slot);
            } else {
                primary.push(slot);
            }
        }

        let mut files = Vec::with_capacity(primary.len() + light.len());
        for (index, (name, path, header)) in primary.into_iter().enumerate() {
            match CompileIndex::primary(index) {
                Some(compile_index) => files.push(ContainerFile {
                    name,
                    path,
                    compile_index,
                    masters: header.masters,
                }),
                None => warn!("no load slot left for {name}; skipping"),
            }
        }
        for (index, (name, path, header)) in light.into_iter().enumerate() {
            match CompileIndex::light(index) {
                Some(compile_index) => files.push(ContainerFile {
                    name,
                    path,
                    compile_index,
                    masters: header.masters,
                }),
                None => warn!("no light slot left for {name}; skipping"),
            }
        }

        Self { files }
    }

    /// Files in scan order: regular plugins, then light plugins.
    pub fn files(&self) -> &[ContainerFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ContainerFile> {
        self.files
            .iter()
            .find(|file| file.name.eq_ignore_ascii_case(name))
    }

    /// Qualifier for the raw form IDs stored in `file`.
    pub fn form_id_mapper(&self, file: &ContainerFile) -> FormIdMapper {
        let masters = file
            .masters
            .iter()
            .map(|master| {
                let resolved = self.find(master).map(|found| found.compile_index);
                if resolved.is_none() {
                    warn!("{}: master {master} is not loaded", file.name);
                }
                resolved
            })
            .collect();
        FormIdMapper::new(file.compile_index, masters)
    }
}

fn plugin_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| PLUGIN_EXTENSIONS.contains(&ext.as_str()))
}
