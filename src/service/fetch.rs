use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{MagikdError, MagikdResult};

/// Turns a caller-supplied reference into raw image bytes.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, reference: &str) -> MagikdResult<Vec<u8>>;
}

/// Reads references as files below a fixed root directory.
///
/// Accepts relative paths, absolute paths inside the root and `file://` URLs. Anything that would
/// leave the root is rejected, symlinks included.
#[derive(Clone, Debug)]
pub struct FsSourceFetcher {
    root: PathBuf,
}

impl FsSourceFetcher {
    pub fn new(root: impl AsRef<Path>) -> MagikdResult<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("resolve source root '{}'", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, reference: &str) -> MagikdResult<PathBuf> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MagikdError::invalid_input("missing image reference"));
        }
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Err(MagikdError::invalid_input(format!(
                "remote reference '{reference}' is not supported; upload the image instead"
            )));
        }

        let raw = reference
            .strip_prefix("file://")
            .unwrap_or(reference);
        let candidate = if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else {
            self.root.join(normalize_rel_path(raw)?)
        };

        let resolved = candidate
            .canonicalize()
            .map_err(|_| MagikdError::invalid_input(format!("source '{reference}' not found")))?;
        if !resolved.starts_with(&self.root) {
            return Err(MagikdError::invalid_input(format!(
                "source '{reference}' is outside the source root"
            )));
        }
        if !resolved.is_file() {
            return Err(MagikdError::invalid_input(format!(
                "source '{reference}' is not a file"
            )));
        }
        Ok(resolved)
    }
}

impl SourceFetcher for FsSourceFetcher {
    #[tracing::instrument(skip(self))]
    fn fetch(&self, reference: &str) -> MagikdResult<Vec<u8>> {
        let path = self.resolve(reference)?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read source bytes from '{}'", path.display()))?;
        tracing::debug!(bytes = bytes.len(), "fetched source");
        Ok(bytes)
    }
}

/// Normalize a root-relative path.
///
/// Uses `/` separators, drops `.` segments, and rejects parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MagikdResult<String> {
    let s = source.replace('\\', "/");
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MagikdError::invalid_input(
                "source paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MagikdError::invalid_input(
            "source path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/service/fetch.rs"]
mod tests;
