use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::{Error, JobKind};
use distributed::{config::DEFAULT_NUM_NODES, init_logger, Executor, NameNode, StorageLayout};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Split text files across local storage nodes and run parallel jobs on them")]
pub struct Cli {
    /// Directory holding `nodes/` and `namenode/`.
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,
    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a file into line-aligned chunks, one per node.
    Split {
        path: PathBuf,
        #[arg(short, long, default_value_t = DEFAULT_NUM_NODES)]
        nodes: usize,
    },
    /// List registered files.
    Ls,
    /// Print the chunk paths of a registered file.
    Resolve { file_name: String },
    /// Run a job over the chunks of a registered file.
    Run {
        file_name: String,
        /// word_count (1) or top_word (2).
        #[arg(short, long, default_value = "word_count")]
        job: JobKind,
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logger(cli.log_dir.as_deref());

    let layout = cli.root.map(StorageLayout::new).unwrap_or_default();
    let (namenode, _) = NameNode::spawn(layout);

    match cli.command {
        Command::Split { path, nodes } => {
            let manifest = namenode.split(&path, nodes).await?;
            println!(
                "File safely split into {} chunks (line-safe).",
                manifest.num_chunks
            );
        }
        Command::Ls => {
            let files = namenode.list_known_files().await?;
            if files.is_empty() {
                println!("No files found.");
            }
            for (i, file) in files.iter().enumerate() {
                println!("{}. {}", i + 1, file);
            }
        }
        Command::Resolve { file_name } => {
            for path in namenode.resolve(&file_name).await? {
                println!("{}", path.display());
            }
        }
        Command::Run {
            file_name,
            job,
            workers,
        } => {
            let executor = match workers {
                Some(n) => Executor::with_workers(namenode, n),
                None => Executor::new(namenode),
            };
            info!(workers = executor.worker_count(), "executor ready");
            match executor.run(&file_name, job).await {
                Ok(result) => println!("{result}"),
                Err(e @ (Error::NoChunksFound(_) | Error::EmptyCorpus)) => {
                    error!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
