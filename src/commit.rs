//! Whole-file replacement through a sibling temp file.
//!
//! The new content is written to `<name>.tmp` next to the target, given the
//! target's permission bits, and renamed over it. `std::fs::rename` replaces
//! an existing destination on every supported platform, so readers see either
//! the old file or the new one, never a gap.

use std::{
    ffi::OsString,
    fs::{self, File, Permissions},
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use log::debug;

/// Path of the scratch file used while rewriting `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Streams `path` through `transform` into a temp file, then swaps the temp
/// file into place.
///
/// The source is opened before anything is created, so a missing or
/// unreadable file fails with nothing written. The temp file takes the
/// source's permission bits before any content reaches it. If `transform` or
/// the write fails, the original is untouched and the temp file is removed. A
/// failed rename may leave the temp file behind.
///
/// # Errors
///
/// Any I/O error from opening the source, writing the temp file or renaming
/// it is returned unchanged.
pub fn replace_with<T, F>(path: &Path, transform: F) -> io::Result<T>
where
    F: FnOnce(&mut BufReader<File>, &mut BufWriter<File>) -> io::Result<T>,
{
    let source = File::open(path)?;
    let permissions = source.metadata()?.permissions();
    let temp = temp_path(path);

    debug!("writing '{}'", temp.display());
    let outcome = write_temp(source, &temp, permissions, transform).inspect_err(|_| {
        let _ = fs::remove_file(&temp);
    })?;

    debug!("renaming '{}' to '{}'", temp.display(), path.display());
    fs::rename(&temp, path)?;
    Ok(outcome)
}

// Both handles are dropped before this returns.
fn write_temp<T, F>(
    source: File,
    temp: &Path,
    permissions: Permissions,
    transform: F,
) -> io::Result<T>
where
    F: FnOnce(&mut BufReader<File>, &mut BufWriter<File>) -> io::Result<T>,
{
    let mut reader = BufReader::new(source);
    let file = File::create(temp)?;
    // Restrict the file before secrets are written into it
    file.set_permissions(permissions)?;
    let mut writer = BufWriter::new(file);
    let outcome = transform(&mut reader, &mut writer)?;
    writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?
        .sync_all()?;
    Ok(outcome)
}
