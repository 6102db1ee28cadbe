use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dotenvy::dotenv;
use futures::stream::{self, StreamExt};
use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::task;

use blk_transcriber::file_reader::{process_file, FileReader};
use blk_transcriber::{AddressResolver, Config, FileReport, NetworkAddressResolver};

type Outcome = (PathBuf, blk_transcriber::Result<FileReport>);

#[derive(Debug, Default)]
struct RunSummary {
    files_ok: usize,
    files_failed: usize,
    blocks: usize,
    transactions: u64,
    mismatches: usize,
}

impl RunSummary {
    fn record(&mut self, path: &Path, outcome: blk_transcriber::Result<FileReport>) {
        match outcome {
            Ok(report) => {
                self.blocks += report.blocks.len();
                self.transactions += report.transactions;
                for check in report.mismatches() {
                    warn!(
                        "Block {} in {:?} failed merkle verification",
                        check.block_hash, path
                    );
                    self.mismatches += 1;
                }
                if report.is_complete() {
                    self.files_ok += 1;
                } else {
                    self.files_failed += 1;
                }
            }
            Err(e) => {
                error!("Failed to process file {:?}: {}", path, e);
                self.files_failed += 1;
            }
        }
    }
}

fn spawn_collector(mut rx: mpsc::Receiver<Outcome>) -> task::JoinHandle<RunSummary> {
    task::spawn(async move {
        let mut summary = RunSummary::default();
        while let Some((path, outcome)) = rx.recv().await {
            summary.record(&path, outcome);
        }
        summary
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.dest_dir)?;

    let reader = FileReader::new(&config.source_dir, &config.file_pattern)?;
    info!(
        "Found {} files matching {} in {:?}",
        reader.file_paths.len(),
        config.file_pattern,
        reader.path()
    );

    let resolver: Arc<dyn AddressResolver> =
        Arc::new(NetworkAddressResolver::new(config.network));
    let dest_dir = Arc::new(config.dest_dir.clone());

    let (tx, rx) = mpsc::channel::<Outcome>(100);
    let collector = spawn_collector(rx);

    let start_time = Instant::now();
    stream::iter(reader.file_paths)
        .for_each_concurrent(config.workers, |path| {
            let tx = tx.clone();
            let resolver = Arc::clone(&resolver);
            let dest_dir = Arc::clone(&dest_dir);
            async move {
                let file = path.clone();
                let outcome =
                    task::spawn_blocking(move || process_file(&file, &dest_dir, resolver.as_ref()))
                        .await
                        .unwrap_or_else(|e| {
                            Err(std::io::Error::new(std::io::ErrorKind::Other, e).into())
                        });
                if tx.send((path, outcome)).await.is_err() {
                    error!("Result collector stopped early");
                }
            }
        })
        .await;

    drop(tx);
    let summary = collector.await?;

    info!(
        "All files processed in {:?}: {} ok, {} failed, {} blocks, {} transactions, {} merkle mismatches",
        start_time.elapsed(),
        summary.files_ok,
        summary.files_failed,
        summary.blocks,
        summary.transactions,
        summary.mismatches
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blk_transcriber::{Error, ParseError};

    #[tokio::test]
    async fn collector_tallies_file_outcomes() {
        let (tx, rx) = mpsc::channel::<Outcome>(4);
        let collector = spawn_collector(rx);

        let mut ok = FileReport::new("blk00000.dat");
        ok.transactions = 3;
        let mut partial = FileReport::new("blk00001.dat");
        partial.error = Some(ParseError::TruncatedStream {
            offset: 10,
            needed: 4,
            remaining: 0,
        });

        tx.send((PathBuf::from("blk00000.dat"), Ok(ok))).await.unwrap();
        tx.send((PathBuf::from("blk00001.dat"), Ok(partial))).await.unwrap();
        tx.send((
            PathBuf::from("blk00002.dat"),
            Err(Error::Config("unreadable".to_string())),
        ))
        .await
        .unwrap();
        drop(tx);

        let summary = collector.await.unwrap();
        assert_eq!(summary.files_ok, 1);
        assert_eq!(summary.files_failed, 2);
        assert_eq!(summary.transactions, 3);
        assert_eq!(summary.mismatches, 0);
    }
}
