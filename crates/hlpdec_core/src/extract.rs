//! Writing internal streams to disk.

use crate::container::Container;
use crate::error::{CoreError, CoreResult};
use hlpdec_codec::{decompress, Method};
use hlpdec_storage::{DiskFile, VirtualFile};
use std::path::Path;
use tracing::{debug, warn};

/// Expands stream `name` with `method` into a new file at `path`.
///
/// Parent directories are created as needed. Returns the number of bytes
/// written, or `None` (creating nothing) if the stream does not exist.
///
/// # Errors
///
/// Returns [`CoreError::AlreadyExists`] if `path` exists and the
/// container's configuration does not allow overwriting, plus any error of
/// [`Container::locate`], of decompression or of writing the file. A file
/// created by a failed call is removed again.
pub fn extract_to_path<F: VirtualFile>(
    container: &mut Container<F>,
    name: impl AsRef<[u8]>,
    method: Method,
    path: &Path,
) -> CoreResult<Option<u64>> {
    let Some(location) = container.open_stream(name)? else {
        return Ok(None);
    };
    if path.exists() && !container.config().overwrite_existing {
        return Err(CoreError::already_exists(path));
    }

    let mut sink = DiskFile::create_with_dirs(path)?;
    let result = decompress(method, container.file_mut(), location.length, &mut sink)
        .map_err(CoreError::from)
        .and_then(|written| {
            sink.flush()?;
            Ok(written)
        });
    drop(sink);

    let written = match result {
        Ok(written) => written,
        Err(err) => {
            if let Err(remove) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %remove, "failed to remove partial output");
            }
            return Err(err);
        }
    };
    debug!(path = %path.display(), written, "extracted stream");
    Ok(Some(written))
}
