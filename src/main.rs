//! Lazyseq CLI
//!
//! Small driver that exercises generators from the command line.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lazyseq::prelude::*;
use rustc_hash::FxHashMap;
use tracing::info;

#[derive(Parser)]
#[command(name = "lazyseq")]
#[command(author, version, about = "Drive lazy thread-backed generators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with producer thread settings
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Count down from N to 1
    Countdown {
        /// Starting value
        from: u64,
        /// Stop the generator after this many elements
        #[arg(short, long)]
        take: Option<usize>,
        /// Print the collected sequence as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Flatten countdowns from N, N-1, ..., 1 into one sequence
    Nested {
        /// Largest countdown
        from: u64,
    },

    /// Walk KEY=VALUE pairs through a keyed source
    Items {
        /// Pairs in KEY=VALUE form
        #[arg(required = true)]
        pairs: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    lazyseq::logging::init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    match cli.command {
        Commands::Countdown { from, take, json } => run_countdown(config, from, take, json),
        Commands::Nested { from } => run_nested(config, from),
        Commands::Items { pairs } => run_items(&pairs),
    }
}

fn countdown(config: GeneratorConfig, from: u64) -> lazyseq::Result<BaseGenerator<u64>> {
    let mut counter = from;
    let mut generator = BaseGenerator::with_config(config);
    generator.start(
        move || {
            if counter == 0 {
                return Ok(None);
            }
            counter -= 1;
            Ok(Some(counter + 1))
        },
        move || info!(from, "countdown finished"),
    )?;
    Ok(generator)
}

fn run_countdown(
    config: GeneratorConfig,
    from: u64,
    take: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let mut generator = countdown(config, from)?;
    let values = match take {
        Some(limit) => {
            let mut values = Vec::with_capacity(limit);
            for item in generator.iter().take(limit) {
                values.push(item?);
            }
            generator.stop();
            values
        }
        None => generator.drain()?,
    };

    if json {
        println!("{}", serde_json::to_string(&values)?);
    } else {
        for value in values {
            println!("{}", value);
        }
    }
    Ok(())
}

fn run_nested(config: GeneratorConfig, from: u64) -> anyhow::Result<()> {
    let outer = countdown(config.clone(), from)?;
    let mut nested = flatten(outer, move |n| countdown(config.clone(), n))?;
    for value in nested.iter() {
        print!("{} ", value?);
    }
    println!();
    Ok(())
}

fn run_items(pairs: &[String]) -> anyhow::Result<()> {
    let mut map: FxHashMap<String, String> = FxHashMap::default();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got '{}'", pair);
        };
        map.insert(key.to_string(), value.to_string());
    }

    let source: FxKeyedSource<String, String> = KeyedSource::new(map);
    let mut items = source.items()?;
    for item in items.iter() {
        let (key, value) = item?;
        println!("{} = {}", key, value);
    }
    Ok(())
}
