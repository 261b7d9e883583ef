//! Bundles accumulated results into one zip archive.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, Result};
use crate::types::ProcessedResult;

use super::collector::ResultCollector;

/// Builds an archive over everything the collector holds.
///
/// Returns `Ok(None)` when nothing has been accumulated; that is reported
/// to the user, not treated as a failure.
pub async fn archive_collected(collector: &ResultCollector) -> Result<Option<Vec<u8>>> {
    let results = collector.snapshot().await;
    if results.is_empty() {
        info!("Nothing to archive");
        return Ok(None);
    }

    let audio_bytes: usize = results.iter().map(ProcessedResult::len).sum();
    let archive = build_archive(&results)?;
    info!(
        entries = results.len(),
        audio_bytes,
        bytes = archive.len(),
        "Archive built"
    );
    Ok(Some(archive))
}

/// Writes one entry per result, in order.
///
/// Repeated file names are kept as distinct entries with ` (2)`, ` (3)`, ...
/// inserted before the extension.
pub fn build_archive(results: &[ProcessedResult]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    // WAV data barely compresses.
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (result, name) in results.iter().zip(entry_names(results)) {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| AppError::archive_failed(format!("{}: {}", name, e)))?;
        writer
            .write_all(&result.audio_bytes)
            .map_err(|e| AppError::archive_failed(format!("{}: {}", name, e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| AppError::archive_failed(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Assigns every result a unique entry name.
fn entry_names(results: &[ProcessedResult]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(results.len());

    for result in results {
        let base = result.file_name.clone();
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;

        let mut name = if *count == 1 {
            base.clone()
        } else {
            numbered(&base, *count)
        };
        // A numbered name may itself collide with a literal file name.
        let mut n = *count;
        while names.contains(&name) {
            n += 1;
            name = numbered(&base, n);
        }
        names.push(name);
    }

    names
}

fn numbered(file_name: &str, n: usize) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &file_name[..dot], n, &file_name[dot..]),
        _ => format!("{} ({})", file_name, n),
    }
}
