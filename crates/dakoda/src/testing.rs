use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Directory of the fixture corpora.
pub(crate) fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

/// Copies the XMI files of a fixture corpus into a temporary
/// directory named after the corpus, so that tests can write caches.
pub(crate) fn copy_corpus(name: &str) -> anyhow::Result<(TempDir, PathBuf)> {
    let tmpdir = tempfile::tempdir()?;
    let target = tmpdir.path().join(name);
    fs::create_dir(&target)?;

    for entry in fs::read_dir(data_dir().join(name))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "xmi") {
            if let Some(filename) = path.file_name() {
                fs::copy(&path, target.join(filename))?;
            }
        }
    }

    Ok((tmpdir, target))
}
