use std::fmt::Write;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use polars::prelude::*;
use sha2::{Digest, Sha256};

use crate::config::ViewAliases;
use crate::error::DakodaResult;

/// A search index persisted as (zstd-compressed) Arrow IPC file.
///
/// Next to the index a fingerprint of the indexed files is stored;
/// the cache is only used as long as the fingerprint matches.
#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
    name: String,
}

impl IndexCache {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(dir: P, name: S) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cache_file(&self) -> PathBuf {
        self.dir.join(format!("{}.ipc", self.name))
    }

    fn fingerprint_file(&self) -> PathBuf {
        self.dir.join(format!("{}.sha256", self.name))
    }

    #[inline]
    pub fn is_cached(&self) -> bool {
        self.cache_file().is_file()
    }

    /// Returns true if the cache exists and was built from files with
    /// the given fingerprint.
    pub fn is_fresh(&self, fingerprint: &str) -> bool {
        self.is_cached()
            && fs::read_to_string(self.fingerprint_file())
                .map(|stored| stored.trim() == fingerprint)
                .unwrap_or(false)
    }

    pub fn write(
        &self,
        df: &mut DataFrame,
        fingerprint: &str,
    ) -> DakodaResult<()> {
        fs::create_dir_all(&self.dir)?;

        let mut writer = IpcWriter::new(File::create(self.cache_file())?)
            .with_compression(Some(IpcCompression::ZSTD));
        writer.finish(df)?;

        fs::write(self.fingerprint_file(), fingerprint)?;
        log::debug!("wrote index cache {}", self.cache_file().display());
        Ok(())
    }

    pub fn read(&self) -> DakodaResult<DataFrame> {
        log::debug!("reading index cache {}", self.cache_file().display());
        Ok(IpcReader::new(File::open(self.cache_file())?).finish()?)
    }

    /// Removes the cache files, if present.
    pub fn clear(&self) -> DakodaResult<()> {
        for path in [self.cache_file(), self.fingerprint_file()] {
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }

        Ok(())
    }
}

/// Returns the SHA256 digest of the names, sizes and modification
/// times of the given files and of the view aliases used to index
/// them.
pub fn fingerprint<P: AsRef<Path>>(
    paths: &[P],
    views: &ViewAliases,
) -> DakodaResult<String> {
    let mut hasher = Sha256::new();

    for path in paths {
        let path = path.as_ref();
        let metadata = path.metadata()?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|x| x.duration_since(UNIX_EPOCH).ok())
            .map(|x| x.as_nanos())
            .unwrap_or_default();

        if let Some(filename) = path.file_name() {
            hasher.update(filename.as_encoded_bytes());
        }

        hasher.update(metadata.len().to_le_bytes());
        hasher.update(mtime.to_le_bytes());
    }

    for (alias, view) in views.iter() {
        hasher.update(alias.as_bytes());
        hasher.update([0u8]);
        hasher.update(view.as_bytes());
        hasher.update([0u8]);
    }

    let hash = hasher.finalize();
    Ok(hash.iter().fold(String::new(), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{rows_to_frame, IndexRow};

    type TestResult = anyhow::Result<()>;

    #[test]
    fn write_and_read() -> TestResult {
        let tmpdir = tempfile::tempdir()?;
        let cache = IndexCache::new(tmpdir.path().join(".index"), "cas");
        assert!(!cache.is_cached());

        let mut df = rows_to_frame(vec![IndexRow {
            idx: Some(0),
            view: Some("learner".into()),
            type_name: Some("Token".into()),
            field: "coveredText".into(),
            value: Some("Haus".into()),
        }])?;

        cache.write(&mut df, "abc")?;
        assert!(cache.is_cached());
        assert!(cache.is_fresh("abc"));
        assert!(!cache.is_fresh("abd"));
        assert!(cache.cache_file().ends_with(".index/cas.ipc"));
        assert!(cache.read()?.equals_missing(&df));

        cache.clear()?;
        assert!(!cache.is_cached());
        assert!(!cache.is_fresh("abc"));
        Ok(())
    }

    #[test]
    fn fingerprint_changes() -> TestResult {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("a.xmi");
        fs::write(&path, "<xmi/>")?;

        let views = ViewAliases::default();
        let fp = fingerprint(&[&path], &views)?;
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, fingerprint(&[&path], &views)?);

        let mut other = ViewAliases::default();
        other.insert("learner", "tok");
        assert_ne!(fp, fingerprint(&[&path], &other)?);

        fs::write(&path, "<xmi></xmi>")?;
        assert_ne!(fp, fingerprint(&[&path], &views)?);

        let empty: [&Path; 0] = [];
        assert_ne!(fp, fingerprint(&empty, &views)?);
        Ok(())
    }
}
