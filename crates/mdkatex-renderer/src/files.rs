//! Atomic file writes shared by the render cache and the resolver.

use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

/// Writes `contents` to `path` via a sibling temp file and a rename.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place so concurrent readers never observe a partially written payload.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let mut file = Builder::new()
        .prefix(
            path.file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("mdkatex"),
        )
        .suffix(".part")
        .tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
