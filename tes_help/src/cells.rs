//! Exterior-cell index built from the plugin files themselves.
//!
//! Cells that were never loaded have no in-memory form to search, so their
//! editor IDs are recovered by scanning every plugin in the load order.

use std::{collections::BTreeMap, sync::Arc, time::Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;
use tes_formats::scan_cells;

use crate::load_order::LoadOrder;

/// `(compile index prefix, editor ID)`; the derived order is the listing order.
pub type CellKey = (u32, String);

/// Exterior cells keyed by load slot and editor ID, valued by source file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CellIndex {
    cells: BTreeMap<CellKey, String>,
}

impl CellIndex {
    /// Record a cell. An existing entry for the same key is replaced.
    pub fn insert(&mut self, compile_index: u32, identifier: String, source_file: String) {
        self.cells.insert((compile_index, identifier), source_file);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn source_file(&self, compile_index: u32, identifier: &str) -> Option<&str> {
        self.cells
            .get(&(compile_index, identifier.to_string()))
            .map(String::as_str)
    }

    /// Entries in `(compile index, identifier)` order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str, &str)> {
        self.cells
            .iter()
            .map(|((index, identifier), file)| (*index, identifier.as_str(), file.as_str()))
    }
}

/// Scans a load order into a [`CellIndex`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CellIndexBuilder;

impl CellIndexBuilder {
    /// Scan every file of `load_order` in order. Later files overwrite
    /// duplicate keys from earlier ones; a file that fails contributes nothing.
    pub fn build(&self, load_order: &LoadOrder) -> CellIndex {
        let started = Instant::now();
        let mut index = CellIndex::default();
        let mut skipped = 0usize;

        for file in load_order.files() {
            let mapper = load_order.form_id_mapper(file);
            let prefix = file.compile_index.prefix();
            match scan_cells(&file.path, &mapper) {
                Ok(cells) => {
                    debug!("{}: {} exterior cells", file.name, cells.len());
                    for cell in cells {
                        index.insert(prefix, cell.identifier, file.name.clone());
                    }
                }
                Err(err) => {
                    warn!("skipping {} during cell scan: {err}", file.name);
                    skipped += 1;
                }
            }
        }

        info!(
            "indexed {} exterior cells from {} files ({} skipped) in {:.1?}",
            index.len(),
            load_order.files().len() - skipped,
            skipped,
            started.elapsed()
        );
        index
    }
}

/// Lazily built, explicitly invalidated [`CellIndex`].
///
/// The lock is held across a build, so at most one scan runs at a time and
/// readers only ever see the previous state or the finished index.
#[derive(Debug, Default)]
pub struct CellIndexCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    index: Option<Arc<CellIndex>>,
    builds: usize,
}

impl CellIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached index, scanning `load_order` first if the cache is empty.
    pub fn get_or_build(&self, load_order: &LoadOrder) -> Arc<CellIndex> {
        let mut state = self.state.lock();
        if let Some(index) = &state.index {
            return Arc::clone(index);
        }
        let index = Arc::new(CellIndexBuilder.build(load_order));
        state.index = Some(Arc::clone(&index));
        state.builds += 1;
        index
    }

    /// Drop the cached index; the next lookup rescans.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        if state.index.take().is_some() {
            debug!("cell index invalidated");
        }
    }

    pub fn is_built(&self) -> bool {
        self.state.lock().index.is_some()
    }

    /// Number of scans performed over the cache's lifetime.
    pub fn builds(&self) -> usize {
        self.state.lock().builds
    }
}
