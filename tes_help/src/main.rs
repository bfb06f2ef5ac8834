use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tes_help::cli::{self, Command};
use tes_help::{ConsoleSession, ConsoleSink, Flow, ResultSink, SessionConfig};

fn main() -> Result<()> {
    env_logger::init();

    match cli::parse()? {
        Command::Query(config, query) => {
            let session = ConsoleSession::open(config)?;
            session.query(&query, &mut ConsoleSink::stdout());
        }
        Command::Console(config) => run_console(config)?,
    }
    Ok(())
}

fn run_console(config: SessionConfig) -> Result<()> {
    let mut session = ConsoleSession::open(config)?;
    let mut sink = ConsoleSink::stdout();
    for line in io::stdin().lock().lines() {
        let line = line.context("reading console input")?;
        match session.execute(&line, &mut sink) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => sink.emit(&format!("error: {err}")),
        }
    }
    Ok(())
}
