use clap::Parser;
use common::{reduce, JobKind};
use itertools::Itertools;
use std::path::PathBuf;

/// Runs a job over whole files in one process, without splitting.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(short, long, default_value = "word_count")]
    job: JobKind,
    input_files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut partials = Vec::with_capacity(cli.input_files.len());
    for file in &cli.input_files {
        let contents = tokio::fs::read_to_string(file).await?;
        partials.push(cli.job.map(&contents));
    }

    let result = cli.job.finalize(reduce(partials))?;
    println!("{result}");
    println!(
        "({} over {})",
        cli.job,
        cli.input_files.iter().map(|f| f.display()).join(", ")
    );
    Ok(())
}
