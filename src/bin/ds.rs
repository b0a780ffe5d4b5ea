use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error};

use freqstats::ingest;
use freqstats::summary::{Layout, Summary};
use freqstats::Dataset;

/// ds is a CLI tool to compute stats for data sets.
///
/// Reads one number per line; grouping commas and blank lines are ignored.
#[derive(Debug, Parser)]
#[command(name = "ds", version, about)]
struct Args {
    /// Input file to compute statistics for [default: stdin]
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print all labels on one line and all values on the next
    #[arg(long, conflicts_with = "json")]
    horizontal: bool,

    /// Print the summary as a JSON object
    #[arg(long)]
    json: bool,
}

fn load(args: &Args, dataset: &Dataset) -> Result<u64> {
    let count = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open the specified file {}", path.display()))?;
            ingest::load(BufReader::new(file), dataset)
        }
        None => ingest::load(io::stdin().lock(), dataset),
    }
    .context("error summarizing the numbers")?;
    Ok(count)
}

fn render(args: &Args, summary: &Summary) -> Result<String> {
    if args.json {
        #[cfg(feature = "serde")]
        return Ok(summary.to_json()? + "\n");
        #[cfg(not(feature = "serde"))]
        anyhow::bail!("JSON output requires the `serde` feature");
    }

    let layout = if args.horizontal {
        Layout::Horizontal
    } else {
        Layout::Vertical
    };
    Ok(summary.render(layout))
}

fn run(args: &Args) -> Result<()> {
    let dataset = Dataset::new();
    let count = load(args, &dataset)?;
    debug!("read {} values into {:?}", count, dataset);

    let summary = Summary::from_dataset(&dataset).context("no numbers to summarize")?;
    let out = render(args, &summary)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
