//! Line-oriented console over one loaded data set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};
use thiserror::Error;

use crate::cells::CellIndexCache;
use crate::dispatch::{HelpQuery, QueryDispatcher};
use crate::load_order::LoadOrder;
use crate::resolver::{EditorIdResolver, EditorIdTable};
use crate::sink::ResultSink;
use crate::snapshot::GameSnapshot;

/// Where a session loads its data from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub snapshot: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub plugins: Option<PathBuf>,
    pub editor_ids: Option<PathBuf>,
}

impl SessionConfig {
    fn load_snapshot(&self) -> Result<GameSnapshot> {
        GameSnapshot::from_json_file(&self.snapshot)
    }

    fn load_order(&self) -> Result<LoadOrder> {
        let Some(data_dir) = self.data_dir.as_deref() else {
            return Ok(LoadOrder::empty());
        };
        match self.plugins.as_deref() {
            Some(list) => LoadOrder::from_plugin_list(data_dir, list),
            None => LoadOrder::discover(data_dir),
        }
    }

    fn resolver(&self) -> Result<EditorIdResolver> {
        match self.editor_ids.as_deref() {
            Some(path) => {
                let table = EditorIdTable::from_json_file(path)?;
                info!("loaded {} external editor ids", table.len());
                Ok(EditorIdResolver::with_source(Box::new(table)))
            }
            None => Ok(EditorIdResolver::builtin()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),
    #[error("filter must be a number from 0 to 4, got `{0}`")]
    InvalidFilter(String),
    #[error("too many arguments for `{command}` (at most {max})")]
    TooManyArguments { command: &'static str, max: usize },
    #[error("unknown command `{0}` (try help, reload or quit)")]
    UnknownCommand(String),
    #[error("reload failed: {0:#}")]
    Reload(anyhow::Error),
}

/// What the console loop does after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ConsoleSession {
    config: Option<SessionConfig>,
    snapshot: GameSnapshot,
    load_order: LoadOrder,
    resolver: EditorIdResolver,
    cells: CellIndexCache,
}

impl ConsoleSession {
    pub fn open(config: SessionConfig) -> Result<Self> {
        let snapshot = config.load_snapshot()?;
        let load_order = config.load_order().context("building load order")?;
        let resolver = config.resolver()?;
        info!(
            "session ready: {} forms, {} plugin files",
            snapshot.form_count(),
            load_order.files().len()
        );
        Ok(ConsoleSession {
            config: Some(config),
            snapshot,
            load_order,
            resolver,
            cells: CellIndexCache::new(),
        })
    }

    /// A session over already-loaded data; `reload` only drops the cell index.
    pub fn from_parts(
        snapshot: GameSnapshot,
        load_order: LoadOrder,
        resolver: EditorIdResolver,
    ) -> Self {
        ConsoleSession {
            config: None,
            snapshot,
            load_order,
            resolver,
            cells: CellIndexCache::new(),
        }
    }

    pub fn load_order(&self) -> &LoadOrder {
        &self.load_order
    }

    pub fn cells(&self) -> &CellIndexCache {
        &self.cells
    }

    pub fn query(&self, query: &HelpQuery, sink: &mut dyn ResultSink) {
        QueryDispatcher::new(&self.snapshot, &self.resolver, &self.cells, &self.load_order)
            .run(query, sink);
    }

    /// Game data changed underneath the session; the cell index is stale.
    pub fn data_loaded(&self) {
        self.cells.invalidate();
    }

    /// Re-read the configured inputs and drop the cell index.
    ///
    /// On failure the previous data stays in place.
    pub fn reload(&mut self) -> Result<()> {
        if let Some(config) = &self.config {
            let snapshot = config.load_snapshot()?;
            let load_order = config.load_order().context("building load order")?;
            let resolver = config.resolver()?;
            self.snapshot = snapshot;
            self.load_order = load_order;
            self.resolver = resolver;
        }
        self.data_loaded();
        info!("reloaded game data");
        Ok(())
    }

    /// Run one console line.
    pub fn execute(&mut self, line: &str, sink: &mut dyn ResultSink) -> Result<Flow, ConsoleError> {
        let words = tokenize(line)?;
        let Some((command, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };
        debug!("console: {command} {args:?}");

        match command.to_ascii_lowercase().as_str() {
            "help" => {
                let query = parse_help(args)?;
                self.query(&query, sink);
                Ok(Flow::Continue)
            }
            "reload" => {
                self.reload().map_err(ConsoleError::Reload)?;
                sink.emit("game data reloaded");
                Ok(Flow::Continue)
            }
            "quit" | "exit" => Ok(Flow::Quit),
            _ => Err(ConsoleError::UnknownCommand(command.clone())),
        }
    }
}

/// `help [matchstring] [filter] [form type]`
fn parse_help(args: &[String]) -> Result<HelpQuery, ConsoleError> {
    if args.len() > 3 {
        return Err(ConsoleError::TooManyArguments {
            command: "help",
            max: 3,
        });
    }
    let match_string = args.first().map(String::as_str).unwrap_or("");
    let filter = match args.get(1) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| ConsoleError::InvalidFilter(raw.clone()))?,
        None => 0,
    };
    let form_type = args.get(2).map(String::as_str);
    Ok(HelpQuery::from_console(match_string, filter, form_type))
}

/// Whitespace-separated words; double quotes group words and may be empty.
pub fn tokenize(line: &str) -> Result<Vec<String>, ConsoleError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            ch => {
                current.push(ch);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err(ConsoleError::UnterminatedQuote(line.to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Filter, BANNER};
    use crate::matchers::globals::GLOBALS_HEADER;
    use crate::sink::MemorySink;
    use std::fs;
    use tempfile::tempdir;
    use tes_formats::testing::PluginBuilder;

    const SNAPSHOT: &str = r#"{
        "globals": [ { "editor_id": "GameDaysPassed", "value": 12.345 } ],
        "forms": [ { "form_id": "00012EB7", "type": "WEAP", "name": "Iron Sword" } ]
    }"#;

    fn session() -> ConsoleSession {
        ConsoleSession::from_parts(
            GameSnapshot::from_json_str(SNAPSHOT).unwrap(),
            LoadOrder::empty(),
            EditorIdResolver::builtin(),
        )
    }

    #[test]
    fn tokenizer_handles_quotes() {
        assert_eq!(tokenize("help market 4 cell").unwrap(), ["help", "market", "4", "cell"]);
        assert_eq!(
            tokenize(r#"help "iron sword"  4"#).unwrap(),
            ["help", "iron sword", "4"]
        );
        assert_eq!(tokenize(r#"help "" 3"#).unwrap(), ["help", "", "3"]);
        assert!(tokenize("   ").unwrap().is_empty());
        assert!(matches!(
            tokenize(r#"help "open"#),
            Err(ConsoleError::UnterminatedQuote(_))
        ));
    }

    #[test]
    fn help_arguments_default_to_all() {
        let query = parse_help(&["gamedays".to_string()]).unwrap();
        assert_eq!(query, HelpQuery::new("gamedays", Filter::All));
        assert!(matches!(
            parse_help(&["x".to_string(), "four".to_string()]),
            Err(ConsoleError::InvalidFilter(_))
        ));
        let too_many: Vec<String> = ["a", "1", "CELL", "x"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            parse_help(&too_many),
            Err(ConsoleError::TooManyArguments { .. })
        ));
    }

    #[test]
    fn help_line_runs_a_query() {
        let mut session = session();
        let mut sink = MemorySink::new();
        let flow = session.execute("help gamedays 3", &mut sink).unwrap();
        assert_eq!(flow, Flow::Continue);
        let mut expected = vec![GLOBALS_HEADER.to_string(), "GameDaysPassed = 12.35".to_string()];
        expected.extend(BANNER.iter().map(|line| line.to_string()));
        assert_eq!(sink.into_lines(), expected);
    }

    #[test]
    fn quit_and_unknown_commands() {
        let mut session = session();
        let mut sink = MemorySink::new();
        assert_eq!(session.execute("QUIT", &mut sink).unwrap(), Flow::Quit);
        assert_eq!(session.execute("exit", &mut sink).unwrap(), Flow::Quit);
        assert_eq!(session.execute("", &mut sink).unwrap(), Flow::Continue);
        assert!(matches!(
            session.execute("coc whiterun", &mut sink),
            Err(ConsoleError::UnknownCommand(name)) if name == "coc"
        ));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn reload_rereads_inputs_and_invalidates_cells() {
        let dir = tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        fs::write(&snapshot_path, SNAPSHOT).unwrap();
        let data_dir = dir.path().join("Data");
        fs::create_dir(&data_dir).unwrap();
        PluginBuilder::new()
            .cell(0x0D62, Some("Tundra"), Some(0))
            .write_to(data_dir.join("Skyrim.esm"))
            .unwrap();

        let mut session = ConsoleSession::open(SessionConfig {
            snapshot: snapshot_path,
            data_dir: Some(data_dir.clone()),
            ..SessionConfig::default()
        })
        .unwrap();
        let mut sink = MemorySink::new();
        session.execute("help tundra 4 cell", &mut sink).unwrap();
        assert!(sink.lines().contains(&"Skyrim.esm CELL: Tundra".to_string()));
        assert_eq!(session.cells().builds(), 1);

        PluginBuilder::new()
            .cell(0x0801, Some("TundraEdge"), Some(0))
            .write_to(data_dir.join("Frontier.esp"))
            .unwrap();
        sink.clear();
        session.execute("reload", &mut sink).unwrap();
        assert_eq!(sink.lines(), ["game data reloaded".to_string()]);
        assert!(!session.cells().is_built());
        assert_eq!(session.load_order().files().len(), 2);

        sink.clear();
        session.execute("help tundra 4 cell", &mut sink).unwrap();
        assert!(sink.lines().contains(&"Frontier.esp CELL: TundraEdge".to_string()));
        assert_eq!(session.cells().builds(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_data() {
        let dir = tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        fs::write(&snapshot_path, SNAPSHOT).unwrap();
        let mut session = ConsoleSession::open(SessionConfig {
            snapshot: snapshot_path.clone(),
            ..SessionConfig::default()
        })
        .unwrap();

        fs::write(&snapshot_path, "{ not json").unwrap();
        let mut sink = MemorySink::new();
        assert!(matches!(
            session.execute("reload", &mut sink),
            Err(ConsoleError::Reload(_))
        ));
        session.execute("help gamedays 3", &mut sink).unwrap();
        assert!(sink.lines().contains(&"GameDaysPassed = 12.35".to_string()));
    }
}
