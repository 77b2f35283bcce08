// src/sink/file.rs

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use super::{shared, OutputSink, SharedSink, SinkFactory};

/// Writes everything to one log file and optionally echoes captured output
/// to stdout.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    terminal_out: bool,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>, terminal_out: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).with_context(|| format!("creating output file {:?}", path))?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            terminal_out,
        })
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| anyhow!("output file {:?} already closed", self.path))
    }
}

impl OutputSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer()?, "{line}")
            .with_context(|| format!("writing to {:?}", self.path))?;
        if self.terminal_out {
            println!("{line}");
        }
        Ok(())
    }

    fn write_message(&mut self, message: &str, suppress_echo: bool) -> Result<()> {
        writeln!(self.writer()?, "{message}")
            .with_context(|| format!("writing to {:?}", self.path))?;
        if self.terminal_out && !suppress_echo {
            println!("{message}");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer
                .flush()
                .with_context(|| format!("flushing {:?}", self.path)),
            None => Ok(()),
        }
    }
}

/// Opens `<output_dir>/<submission>_output.txt` for every submission.
#[derive(Debug, Clone)]
pub struct FileSinkFactory {
    output_dir: PathBuf,
}

impl FileSinkFactory {
    /// Create the factory, creating `output_dir` if it does not exist.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating output dir {:?}", output_dir))?;
        Ok(Self { output_dir })
    }

    pub fn output_path(&self, submission: &str) -> PathBuf {
        self.output_dir.join(format!("{submission}_output.txt"))
    }
}

impl SinkFactory for FileSinkFactory {
    fn open(&mut self, submission: &str, echo: bool) -> Result<SharedSink> {
        let sink = FileSink::create(self.output_path(submission), echo)?;
        Ok(shared(sink))
    }
}
