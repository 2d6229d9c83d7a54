use std::{fs, io::Write, path::{Path, PathBuf}};
use tracing::info;

use crate::errors::LoaderError;
use crate::table::Table;

pub const CSV_DELIMITER: u8 = b',';

///
/// Writes table as csv to dirname/filename, creating dirname if needed.
/// The file is staged in a tempfile next to the target and renamed in place
///
pub fn save_csv_to_disk(
    table: &Table,
    filename: &str,
    dirname: impl AsRef<Path>
) -> Result<PathBuf, LoaderError> {
    let dir = dirname.as_ref();
    let path = dir.join(filename);

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e|
            LoaderError::Csv(format!("create dir {}: {e}", dir.display()))
        )?;
        info!(dir = %dir.display(), path = %path.display(), "sink.dir.created");
    }

    let text = table.to_delimited(CSV_DELIMITER)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| LoaderError::Csv(
            format!("tempfile in {}: {e}", dir.display())
        ))?;
    temp.write_all(text.as_bytes())?;
    temp.flush()?;

    temp.persist(&path).map_err(|e|
        LoaderError::Csv(format!("persist {}: {e}", path.display())))?;

    info!(path = %path.display(), rows = table.len(), "sink.csv.saved");
    Ok(path)
}
