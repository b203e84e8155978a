//! Saving user-supplied images without trusting their names or declared types.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// MIME types accepted after content sniffing.
const ALLOWED_MIME: [&str; 2] = ["image/png", "image/jpeg"];

#[derive(Debug, Error)]
pub enum SaveRejection {
    #[error("file exceeds the size limit")]
    TooBig,
    #[error("file content is not an accepted image type")]
    BadType,
    #[error("file name is not a plain file name")]
    BadName,
    #[error("target directory is a symbolic link")]
    SymlinkParent,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SaveRejection {
    /// Short machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            SaveRejection::TooBig => "too_big",
            SaveRejection::BadType => "bad_type",
            SaveRejection::BadName => "bad_name",
            SaveRejection::SymlinkParent => "symlink_parent",
            SaveRejection::Io(_) => "io_error",
        }
    }
}

/// Writes `data` into `dir` under a fresh random name.
///
/// The type is taken from the bytes, never from `filename`; only PNG and JPEG
/// pass. `filename` must be a single normal path component and is only used
/// for logging. `dir` is created if missing and must not be a symlink.
///
/// # Arguments
///
/// * `dir` - The target directory.
/// * `filename` - The client-supplied file name.
/// * `data` - The file content.
/// * `max_bytes` - The size limit.
///
/// # Returns
///
/// The path of the saved file.
pub fn secure_save(
    dir: impl AsRef<Path>,
    filename: &str,
    data: &[u8],
    max_bytes: usize,
) -> Result<PathBuf, SaveRejection> {
    let dir = dir.as_ref();

    if data.len() > max_bytes {
        return Err(SaveRejection::TooBig);
    }

    let kind = infer::get(data)
        .filter(|kind| ALLOWED_MIME.contains(&kind.mime_type()))
        .ok_or(SaveRejection::BadType)?;

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(SaveRejection::BadName),
    }

    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    if fs::symlink_metadata(dir)?.file_type().is_symlink() {
        return Err(SaveRejection::SymlinkParent);
    }

    let target = dir.join(format!("{}.{}", Uuid::new_v4(), kind.extension()));
    let mut file = OpenOptions::new().write(true).create_new(true).open(&target)?;
    file.write_all(data)?;
    file.sync_all()?;

    tracing::info!(original = %filename, saved = %target.display(), "Upload stored");
    Ok(target)
}
