use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::console::SessionConfig;
use crate::dispatch::HelpQuery;

#[derive(Parser, Debug)]
#[command(
    about = "Searches console commands, settings, globals, forms and cells of a game data set",
    version
)]
pub struct Args {
    /// Game data snapshot (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Directory holding the .esm/.esp/.esl plugin files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// plugins.txt style load order file (requires --data-dir)
    #[arg(long)]
    pub plugins: Option<PathBuf>,

    /// JSON object mapping hex form IDs to editor IDs
    #[arg(long)]
    pub editor_ids: Option<PathBuf>,

    /// Read console lines (help, reload, quit) from stdin
    #[arg(long)]
    pub console: bool,

    /// Text to search for
    #[arg(value_name = "MATCH")]
    pub match_string: Option<String>,

    /// 0-all 1-functions 2-settings 3-globals 4-other forms
    #[arg(value_name = "FILTER", default_value_t = 0, allow_negative_numbers = true)]
    pub filter: i64,

    /// Four character form type, used with filter 4
    #[arg(value_name = "TYPE")]
    pub form_type: Option<String>,
}

#[derive(Debug)]
pub enum Command {
    Console(SessionConfig),
    Query(SessionConfig, HelpQuery),
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    fn into_command(self) -> Result<Command> {
        if self.plugins.is_some() && self.data_dir.is_none() {
            bail!("--plugins requires --data-dir");
        }
        if self.console && self.match_string.is_some() {
            bail!("--console does not take a match string");
        }

        let config = SessionConfig {
            snapshot: self.snapshot,
            data_dir: self.data_dir,
            plugins: self.plugins,
            editor_ids: self.editor_ids,
        };
        if self.console {
            return Ok(Command::Console(config));
        }
        let match_string = self.match_string.unwrap_or_default();
        let query = HelpQuery::from_console(&match_string, self.filter, self.form_type.as_deref());
        Ok(Command::Query(config, query))
    }
}
