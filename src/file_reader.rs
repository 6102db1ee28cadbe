use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};
use tempfile::NamedTempFile;

use crate::address::AddressResolver;
use crate::config::FilePattern;
use crate::error::Result;
use crate::processing::{parse_blocks, transcribe, FileReport};

/// Block files found in a source directory, in name order.
pub struct FileReader {
    path: PathBuf,
    pub file_paths: Vec<PathBuf>,
}

impl FileReader {
    pub fn new(path: impl Into<PathBuf>, pattern: &FilePattern) -> io::Result<Self> {
        let mut file_reader = Self {
            path: path.into(),
            file_paths: Vec::new(),
        };
        file_reader.index_files(pattern)?;
        Ok(file_reader)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn index_files(&mut self, pattern: &FilePattern) -> io::Result<()> {
        let mut paths: Vec<_> = fs::read_dir(&self.path)?.collect::<io::Result<Vec<_>>>()?;
        paths.sort_by_key(|entry| entry.file_name());

        self.file_paths = paths
            .into_iter()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| pattern.matches(name))
                    .unwrap_or(false)
            })
            .map(|entry| entry.path())
            .collect();

        Ok(())
    }
}

/// Transcript path for a source file: `blk00000.dat` becomes `blk00000.txt`.
pub fn transcript_path(source: &Path, dest_dir: &Path) -> PathBuf {
    dest_dir.join(output_name(source, "txt"))
}

pub fn report_path(source: &Path, dest_dir: &Path) -> PathBuf {
    dest_dir.join(output_name(source, "report.json"))
}

fn output_name(source: &Path, extension: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}.{extension}")
}

/// Transcribes one block file into `dest_dir`.
///
/// Records are streamed into a temporary file in `dest_dir` that only
/// replaces the transcript once the scan is over, so readers never see a
/// half-written file. A parse error is file-scoped: it is logged and carried
/// in the returned report alongside the blocks decoded before it.
pub fn process_file(
    path: &Path,
    dest_dir: &Path,
    resolver: &dyn AddressResolver,
) -> Result<FileReport> {
    let start_time = Instant::now();
    info!("Processing file: {:?}", path);

    let data = fs::read(path)?;
    let source = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut transcript = NamedTempFile::new_in(dest_dir)?;
    let report = {
        let mut writer = BufWriter::new(transcript.as_file_mut());
        let report = transcribe(parse_blocks(data, resolver), &source, &mut writer)?;
        writer.flush()?;
        report
    };
    transcript
        .persist(transcript_path(path, dest_dir))
        .map_err(|e| e.error)?;

    let mut report_file = BufWriter::new(File::create(report_path(path, dest_dir))?);
    serde_json::to_writer_pretty(&mut report_file, &report)?;
    report_file.flush()?;

    if let Some(e) = &report.error {
        warn!(
            "Stopped parsing {:?} after {} blocks: {}",
            path,
            report.blocks.len(),
            e
        );
    }
    info!(
        "Finished {:?}: {} blocks, {} transactions, {} records in {:?}",
        path,
        report.blocks.len(),
        report.transactions,
        report.records,
        start_time.elapsed()
    );

    Ok(report)
}
