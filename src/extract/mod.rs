//! The extraction pipeline.
//!
//! Source text flows through three stages: the [`scanner::CallScanner`]
//! locates calls to configured function names, the [`literal`] decoder
//! turns captured literal tokens into runtime strings, and [`interpret`]
//! assembles the structured entry that goes to the catalog sinks. The
//! entry points in this module wire the stages together for one source
//! string, one file, or a batch of files.

pub mod interpret;
pub(crate) mod lexer;
pub mod literal;
pub mod role;
pub mod scanner;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, trace};
use rayon::prelude::*;

use crate::catalog::{Catalog, CatalogSink, TranslationEntry};
use crate::config::ExtractorConfig;

pub use interpret::interpret;
pub use literal::decode;
pub use role::{ArgLayout, FunctionRole};
pub use scanner::{CallScanner, RawArg, RawCallMatch};

/// Scan one source text and push every extracted entry into `sink`.
///
/// `file` is the identifier recorded in entry references; it is supplied by
/// the caller (this crate performs no file discovery).
pub fn extract_from_string(
    source: &str,
    file: &str,
    config: &ExtractorConfig,
    sink: &mut dyn CatalogSink,
) {
    for found in CallScanner::new(source, config) {
        match interpret(&found, config, file) {
            Some(entry) => {
                trace!("{}:{}: extracted {:?}", file, entry.reference.line, entry.singular);
                sink.add(entry);
            }
            None => debug!(
                "{}:{}: skipping {}() call (non-literal or missing arguments)",
                file, found.line, found.name
            ),
        }
    }
}

/// Scan one source text once and fan every extracted entry out to several
/// sinks, e.g. when one pass feeds multiple destination catalogs.
pub fn extract_from_string_multiple(
    source: &str,
    file: &str,
    config: &ExtractorConfig,
    sinks: &mut [&mut dyn CatalogSink],
) {
    let mut entries: Vec<TranslationEntry> = Vec::new();
    extract_from_string(source, file, config, &mut entries);
    for entry in entries {
        for sink in sinks.iter_mut() {
            sink.add(entry.clone());
        }
    }
}

/// Read one already-resolved path and extract from its contents.
pub fn extract_from_file(
    path: &Path,
    config: &ExtractorConfig,
    sink: &mut dyn CatalogSink,
) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;
    extract_from_string(&source, &path.to_string_lossy(), config, sink);
    Ok(())
}

/// A per-file failure inside a batch extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: String,
    pub error: String,
}

/// Result of a batch extraction over many files.
///
/// Failures never abort the batch; every readable file contributes to the
/// catalog and every unreadable one is recorded here.
#[derive(Debug, Default)]
pub struct ExtractResult {
    pub catalog: Catalog,
    pub errors: Vec<FileError>,
}

/// Extract from a list of already-resolved paths into one merged catalog.
///
/// Files are scanned in parallel, each against the same immutable config,
/// and the per-file results are merged sequentially so catalog order
/// follows the order of `paths`.
pub fn extract_from_files(paths: &[PathBuf], config: &ExtractorConfig) -> ExtractResult {
    let per_file: Vec<(String, Result<Vec<TranslationEntry>>)> = paths
        .par_iter()
        .map(|path| {
            let file = path.to_string_lossy().to_string();
            let result = fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file: {}", path.display()))
                .map(|source| {
                    let mut entries: Vec<TranslationEntry> = Vec::new();
                    extract_from_string(&source, &file, config, &mut entries);
                    entries
                });
            (file, result)
        })
        .collect();

    let mut out = ExtractResult::default();
    for (file, result) in per_file {
        match result {
            Ok(entries) => {
                debug!("{}: {} entries", file, entries.len());
                for entry in entries {
                    out.catalog.add(entry);
                }
            }
            Err(err) => out.errors.push(FileError {
                path: file,
                error: format!("{:#}", err),
            }),
        }
    }
    out
}
