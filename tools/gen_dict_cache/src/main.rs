//! Prebuild the on-disk dictionary cache from a word-frequency table, so
//! deployments pay the prefix-table build once instead of on first use.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hanseg_core::{cache, PrefixDict};

#[derive(Parser)]
#[command(about = "Build a dictionary cache file from a word-frequency table")]
struct Args {
    /// Dictionary file, one `word freq [tag]` per line
    dict: PathBuf,
    /// Output cache path
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let file = File::open(&args.dict).with_context(|| format!("open {}", args.dict.display()))?;
    let dict = PrefixDict::load(BufReader::new(file), &args.dict.display().to_string())?;
    cache::store(&args.out, &dict).with_context(|| format!("write {}", args.out.display()))?;
    println!(
        "{} keys, total frequency {} -> {}",
        dict.len(),
        dict.total(),
        args.out.display()
    );
    Ok(())
}
