use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tes_formats::cell::scan_cursor;
use tes_formats::{CompileIndex, FormIdMapper, RecordCursor, RecordTag};

#[derive(Parser, Debug)]
#[command(about = "Summarise the records of a plugin file", version)]
struct Args {
    /// Plugin file (.esm, .esp or .esl)
    plugin: PathBuf,

    /// Load slot to qualify form IDs with (light slot when --light is set)
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Treat the file as a light plugin
    #[arg(long)]
    light: bool,

    /// List the exterior cells found instead of record counts
    #[arg(long)]
    cells: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let compile_index = if args.light {
        CompileIndex::light(args.index)
    } else {
        CompileIndex::primary(args.index)
    }
    .with_context(|| format!("load slot {} is out of range", args.index))?;

    let mut cursor = RecordCursor::open(&args.plugin)
        .with_context(|| format!("opening plugin {}", args.plugin.display()))?;
    let header = cursor.plugin_header().clone();
    println!(
        "{} ({} bytes) flags {:08X} slot {}",
        args.plugin.display(),
        cursor.file_len(),
        header.flags,
        compile_index
    );
    for master in &header.masters {
        println!("  master {master}");
    }

    if args.cells {
        // Masters are not resolved here; their records keep raw IDs.
        let mapper = FormIdMapper::new(compile_index, vec![None; header.masters.len()]);
        for cell in scan_cursor(&mut cursor, &mapper) {
            println!("{:08X} {}", cell.form_id, cell.identifier);
        }
        return Ok(());
    }

    let mut counts: BTreeMap<RecordTag, usize> = BTreeMap::new();
    while let Some(record) = cursor
        .next_record()
        .with_context(|| format!("walking {}", args.plugin.display()))?
    {
        *counts.entry(record.tag).or_default() += 1;
    }
    for (tag, count) in counts {
        println!("{:<4} {count:>8}", tag.to_string());
    }
    Ok(())
}
