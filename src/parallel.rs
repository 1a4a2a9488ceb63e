//! Batch orchestration
//!
//! Documents are formatted independently on a rayon pool and folded into one
//! report by the calling thread.
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FormatConfig;
use crate::document::{FormatError, FormatResult, MarkdownFile, RunReport};
use crate::file_processor::{find_markdown_files, format_file};

/// Drives discovery and per-document formatting for one run.
pub struct BatchProcessor<'a> {
    config: &'a FormatConfig,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(config: &'a FormatConfig) -> Self {
        Self { config }
    }

    /// Formats every document under the configured root.
    ///
    /// Only an unusable root directory fails the run; per-document failures
    /// are recorded in the report.
    pub fn run(&self) -> Result<RunReport, FormatError> {
        let start = Instant::now();
        let files = find_markdown_files(self.config)?;
        log::debug!("Formatting {} files", files.len());

        let mut report = RunReport::default();
        for result in self.process_files(files) {
            report.record(result);
        }
        report.finish(start.elapsed());

        log::info!(
            "Processed {} files in {:?}: {} modified, {} unchanged, {} errors",
            report.total_files,
            report.duration,
            report.files_modified + report.files_skipped,
            report.files_unchanged,
            report.files_errored
        );
        Ok(report)
    }

    /// Formats `files`, in parallel when the `parallel` feature is on.
    pub fn process_files(&self, files: Vec<MarkdownFile>) -> Vec<FormatResult> {
        let config = self.config;

        #[cfg(feature = "parallel")]
        {
            let format_all = || files.into_par_iter().map(|file| format_file(file, config)).collect::<Vec<_>>();
            match config.jobs {
                Some(jobs) => match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                    Ok(pool) => pool.install(format_all),
                    Err(err) => {
                        log::warn!("Failed to build a pool of {jobs} threads: {err}");
                        format_all()
                    }
                },
                None => format_all(),
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            files.into_iter().map(|file| format_file(file, config)).collect()
        }
    }
}
