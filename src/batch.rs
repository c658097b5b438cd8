//! Parallel extraction over a directory of TEI files.
//!
//! Each file is extracted independently on the rayon pool and written to its
//! own JSON file; workers only share the atomic [`BatchStats`] counters. A
//! malformed document is counted and logged, never fatal to the run.

use crate::config::TEI_EXTENSION;
use crate::error::ExtractError;
use crate::export;
use crate::extract::extract_file;
use crate::stats::BatchStats;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Worker threads; `None` uses rayon's default pool
    pub threads: Option<usize>,
    /// Process at most this many files (for testing)
    pub limit: Option<usize>,
    /// Extract without writing output files
    pub dry_run: bool,
}

/// Regular file with the TEI extension (any case).
pub fn is_tei_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TEI_EXTENSION))
}

/// TEI files directly inside `dir`, sorted by path.
pub fn collect_inputs(dir: &Path, limit: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if is_tei_file(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    if let Some(limit) = limit {
        inputs.truncate(limit);
    }
    Ok(inputs)
}

/// `paper.tei.xml` -> `paper.json`, `paper.xml` -> `paper.json`
pub fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_suffix(".tei").unwrap_or(&stem);
    format!("{}.json", stem)
}

/// `paper.tei.xml` -> `paper.tei.xml.json`
fn full_output_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.json", name)
}

/// One output name per input, in input order. Inputs whose short name is
/// shared with another input keep their full file name instead, so no two
/// workers ever write the same file.
pub fn output_names(inputs: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = inputs.iter().map(|p| output_name(p)).collect();
    loop {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &names {
            *counts.entry(name.as_str()).or_default() += 1;
        }
        let colliding: Vec<(usize, String)> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| counts[name.as_str()] > 1)
            .map(|(i, _)| (i, full_output_name(&inputs[i])))
            .filter(|(i, full)| names[*i] != *full)
            .collect();
        if colliding.is_empty() {
            return names;
        }
        for (i, full) in colliding {
            warn!(
                path = %inputs[i].display(),
                output = %full,
                "Output name collides with another input; using full file name"
            );
            names[i] = full;
        }
    }
}

fn make_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    {spinner:.cyan} Extracting     [{bar:30.cyan/blue}] {pos}/{len} files")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn process_file(
    input: &Path,
    name: &str,
    config: &BatchConfig,
    stats: &BatchStats,
) -> Result<()> {
    let doc = match extract_file(input) {
        Ok(doc) => doc,
        Err(e @ ExtractError::MalformedDocument { .. }) => {
            warn!(path = %input.display(), error = %e, "Skipping malformed document");
            stats.inc_malformed();
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if !config.dry_run {
        let output = config.output_dir.join(name);
        export::write_json(&doc, &output)?;
        stats.inc_outputs();
        debug!(path = %output.display(), references = doc.references.len(), "Wrote output");
    }

    // Only documents that made it all the way through count as processed;
    // a failed write is counted once, as failed.
    stats.inc_processed();
    stats.add_references(doc.references.len() as u64);
    if doc.main_paper.paper.title.is_none() {
        stats.inc_untitled();
    }
    Ok(())
}

pub fn run_batch(config: &BatchConfig) -> Result<BatchStats> {
    let inputs = collect_inputs(&config.input_dir, config.limit)?;
    if !config.dry_run {
        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                config.output_dir.display()
            )
        })?;
    }

    info!(
        files = inputs.len(),
        input = %config.input_dir.display(),
        "Starting batch extraction"
    );

    let names = output_names(&inputs);
    let stats = BatchStats::new();
    let pb = make_progress_bar(inputs.len() as u64)?;

    let work = || {
        inputs.par_iter().zip(names.par_iter()).for_each(|(input, name)| {
            if let Err(e) = process_file(input, name, config, &stats) {
                warn!(path = %input.display(), error = %format!("{:#}", e), "Failed to process document");
                stats.inc_failed();
            }
            pb.inc(1);
        });
    };

    match config.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("teiref-worker-{i}"))
            .build()
            .context("Failed to build worker pool")?
            .install(work),
        None => work(),
    }

    pb.finish_and_clear();

    info!(
        processed = stats.processed(),
        malformed = stats.malformed(),
        failed = stats.failed(),
        references = stats.references(),
        "Batch extraction complete"
    );

    Ok(stats)
}
