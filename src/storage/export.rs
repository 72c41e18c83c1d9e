//! JSON export and import over any result store
//!
//! The file holds one JSON object mapping each target to its array of
//! results, with keys sorted so repeated exports diff cleanly.

use crate::crawler::ExtractedResult;
use crate::storage::traits::{ResultStore, StorageResult};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes every entry of `store` to `path`
///
/// # Returns
///
/// The number of targets written
pub fn export_results(store: &dyn ResultStore, path: &Path) -> StorageResult<usize> {
    let entries: BTreeMap<String, Vec<ExtractedResult>> = store.get_all()?.into_iter().collect();

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!("Exported {} targets to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// Loads entries from `path` into `store`
///
/// # Returns
///
/// The number of targets loaded
pub fn import_results(store: &dyn ResultStore, path: &Path) -> StorageResult<usize> {
    let reader = BufReader::new(File::open(path)?);
    let entries: HashMap<String, Vec<ExtractedResult>> = serde_json::from_reader(reader)?;

    let count = entries.len();
    for (target, results) in entries {
        store.store(&target, results)?;
    }

    tracing::debug!("Imported {} targets from {}", count, path.display());
    Ok(count)
}
