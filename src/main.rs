use std::io::{self, Read};

use anyhow::{Context, Result};
use hasse_align::config::{Job, OutputFormat};
use hasse_align::{Dot, Summary};
use tracing_subscriber::EnvFilter;

fn read_input() -> Result<String> {
    match std::env::args().nth(1) {
        Some(path) if path != "-" => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("HASSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // One JSON job from a file argument or stdin
    let job = Job::from_json(&read_input()?)?;
    let poset = job.build()?;

    match job.output {
        OutputFormat::Text => print!("{}", Summary::of(&poset)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&Summary::of(&poset)?)?),
        OutputFormat::Dot => print!("{}", Dot(&poset)),
    }
    Ok(())
}
