use std::fmt::{self, Display};
use std::ops::{Index, Range};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use hashbrown::HashMap;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::config::Config;
use crate::document::Document;
use crate::error::{bail, DakodaError, DakodaResult};
use crate::index::{
    fingerprint, CasIndexer, IndexCache, Indexer, MetaDataIndexer,
};
use crate::query::Predicate;
use crate::uima::dakoda_typesystem;

/// The part of a corpus covered by a search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSubset {
    /// Annotations of the CAS views.
    Cas,
    /// The structured metadata.
    Meta,
}

impl DataSubset {
    pub const ALL: [DataSubset; 2] = [Self::Cas, Self::Meta];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cas => "cas",
            Self::Meta => "meta",
        }
    }

    #[inline]
    fn slot(&self) -> usize {
        match self {
            Self::Cas => 0,
            Self::Meta => 1,
        }
    }
}

impl Display for DataSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataSubset {
    type Err = DakodaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cas" => Ok(Self::Cas),
            "meta" => Ok(Self::Meta),
            _ => bail!("invalid subset '{s}' (expected 'cas' or 'meta')"),
        }
    }
}

/// A DAKODA corpus: a directory of XMI files.
///
/// Documents are loaded lazily. The search indices are built on first
/// use; the CAS index is cached on disk.
#[derive(Debug)]
pub struct Corpus {
    name: String,
    path: PathBuf,
    config: Config,
    docs: Vec<Document>,
    ids: HashMap<String, usize>,
    quiet: bool,
    indices: [OnceLock<DataFrame>; 2],
}

impl Corpus {
    /// Opens the corpus at `path` using the default config.
    pub fn open<P: AsRef<Path>>(path: P) -> DakodaResult<Self> {
        Self::with_config(path, Config::default())
    }

    /// Opens the corpus at `path`.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        config: Config,
    ) -> DakodaResult<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            bail!("corpus '{}' is not a directory", path.display());
        }

        let name = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => path
                .canonicalize()?
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default(),
        };

        let typesystem = dakoda_typesystem()?;
        let docs = list_documents(path)?
            .into_iter()
            .map(|p| -> DakodaResult<Document> {
                Ok(Document::from_path(p)?
                    .with_typesystem(typesystem.clone())
                    .with_views(config.views.clone())
                    .cache_metadata(config.index.cache_metadata))
            })
            .collect::<DakodaResult<Vec<_>>>()?;

        let ids = docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.id().to_string(), i))
            .collect();

        log::debug!("opened corpus {name} with {} documents", docs.len());

        Ok(Self {
            name,
            path: path.into(),
            config,
            docs,
            ids,
            quiet: false,
            indices: Default::default(),
        })
    }

    /// Whether to hide progress bars or not.
    pub fn quiet(mut self, yes: bool) -> Self {
        self.quiet = yes;
        self
    }

    #[inline]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.docs.iter()
    }

    #[inline]
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    /// Returns the paths of all XMI files, sorted.
    pub fn document_paths(&self) -> Vec<&Path> {
        self.docs.iter().filter_map(Document::path).collect()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Document> {
        self.docs.get(idx)
    }

    /// Returns the document with the given id. Paths are accepted as
    /// well; only their file stem is used.
    pub fn by_id(&self, id: &str) -> DakodaResult<&Document> {
        let key = Path::new(id)
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        self.ids
            .get(key.as_ref())
            .map(|i| &self.docs[*i])
            .ok_or_else(|| DakodaError::UnknownDocument(id.into()))
    }

    /// Returns the documents in `range`; the range is clamped to the
    /// size of the corpus.
    pub fn range(&self, range: Range<usize>) -> &[Document] {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        &self.docs[start..end]
    }

    pub fn random_doc(&self) -> DakodaResult<&Document> {
        self.docs
            .choose(&mut rand::thread_rng())
            .ok_or(DakodaError::EmptyCorpus)
    }

    /// Returns the search index of a subset, building it on first use.
    pub fn index(&self, subset: DataSubset) -> DakodaResult<&DataFrame> {
        let slot = &self.indices[subset.slot()];
        if let Some(df) = slot.get() {
            return Ok(df);
        }

        let df = self.load_index(subset, false)?;
        Ok(slot.get_or_init(|| df))
    }

    /// (Re-)builds the search index of a subset. Unless `force` is set,
    /// an up-to-date cache is used.
    pub fn build_index(
        &mut self,
        subset: DataSubset,
        force: bool,
    ) -> DakodaResult<&DataFrame> {
        let df = self.load_index(subset, force)?;
        let slot = &mut self.indices[subset.slot()];
        *slot = OnceLock::from(df);
        slot.get().ok_or_else(|| DakodaError::other("index not built"))
    }

    /// Returns the cache of the CAS index.
    pub fn index_cache(&self) -> IndexCache {
        let dir = self.config.cache_dir(&self.path);
        IndexCache::new(dir, DataSubset::Cas.as_str())
    }

    fn load_index(
        &self,
        subset: DataSubset,
        force: bool,
    ) -> DakodaResult<DataFrame> {
        match subset {
            DataSubset::Meta => MetaDataIndexer.index_corpus(self),
            DataSubset::Cas => {
                let cache = self.index_cache();
                let fp =
                    fingerprint(&self.document_paths(), &self.config.views)?;

                if !force && cache.is_fresh(&fp) {
                    match cache.read() {
                        Ok(df) => return Ok(df),
                        Err(e) => {
                            log::warn!("unable to read index cache: {e}")
                        }
                    }
                }

                let indexer = CasIndexer::new(self.config.views.clone());
                let mut df = indexer.index_corpus(self)?;
                if let Err(e) = cache.write(&mut df, &fp) {
                    log::warn!(
                        "unable to write index cache {}: {e}",
                        cache.cache_file().display()
                    );
                }

                Ok(df)
            }
        }
    }

    /// Returns the (sorted) positions of the documents matching the
    /// predicate. Without a subset, the matches of both indices are
    /// merged.
    pub fn query(
        &self,
        predicate: &Predicate,
        subset: Option<DataSubset>,
    ) -> DakodaResult<Vec<usize>> {
        let subsets = match subset {
            Some(subset) => vec![subset],
            None => DataSubset::ALL.to_vec(),
        };

        let mut result: Vec<usize> = vec![];
        for subset in subsets {
            let docs = predicate.documents(self.index(subset)?)?;
            result.extend(
                docs.into_iter().filter_map(|i| usize::try_from(i).ok()),
            );
        }

        result.sort_unstable();
        result.dedup();
        Ok(result)
    }

    /// Returns the documents matching the predicate.
    pub fn select(
        &self,
        predicate: &Predicate,
        subset: Option<DataSubset>,
    ) -> DakodaResult<Vec<&Document>> {
        Ok(self
            .query(predicate, subset)?
            .into_iter()
            .filter_map(|i| self.get(i))
            .collect())
    }

    /// Returns the flattened metadata of all documents as one data
    /// frame (one row per document). Fields missing in a document are
    /// null.
    pub fn meta_frame(&self) -> DakodaResult<DataFrame> {
        if self.is_empty() {
            return Ok(DataFrame::empty());
        }

        let frames = self
            .docs
            .par_iter()
            .map(|doc| {
                let mut df = doc.meta()?.to_frame()?;
                df.insert_column(0, Column::new("id".into(), [doc.id()]))?;
                Ok(df)
            })
            .collect::<DakodaResult<Vec<_>>>()?;

        // a field may be numeric in one document and `notAvailable` in
        // another, so columns are cast to their common supertype.
        let args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };

        let frames: Vec<LazyFrame> =
            frames.into_iter().map(DataFrame::lazy).collect();
        Ok(concat_lf_diagonal(frames, args)?.collect()?)
    }
}

fn list_documents(dir: &Path) -> DakodaResult<Vec<PathBuf>> {
    let Some(dir) = dir.to_str() else {
        bail!("invalid corpus path '{}'", dir.display());
    };

    let pattern = format!("{}/*.xmi", glob::Pattern::escape(dir));
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(DakodaError::other)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();

    paths.sort_unstable();
    Ok(paths)
}

impl Index<usize> for Corpus {
    type Output = Document;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.docs[idx]
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

impl Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dakoda Corpus: {} at {}", self.name, self.path.display())
    }
}

impl PartialEq for Corpus {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IDX;
    use crate::query::{annotation, count, eq, field, ge, view, Operator};
    use crate::testing::copy_corpus;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn open_corpus() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let corpus = Corpus::open(&dir)?.quiet(true);

        assert_eq!(corpus.name(), "WTLD");
        assert_eq!(corpus.len(), 3);
        assert!(!corpus.is_empty());
        assert_eq!(corpus[1].id(), "wtld_002");
        assert_eq!(corpus.get(3).map(Document::id), None);
        assert_eq!(
            corpus.iter().map(Document::id).collect::<Vec<_>>(),
            vec!["wtld_001", "wtld_002", "wtld_003"]
        );
        assert_eq!(corpus.document_paths()[2], dir.join("wtld_003.xmi"));
        assert_eq!(corpus.range(1..10).len(), 2);
        assert!(corpus.range(5..10).is_empty());
        assert_eq!(
            corpus.to_string(),
            format!("Dakoda Corpus: WTLD at {}", dir.display())
        );
        assert!(corpus == Corpus::open(&dir)?);
        Ok(())
    }

    #[test]
    fn documents_by_id() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let corpus = Corpus::open(&dir)?;

        assert_eq!(corpus.by_id("wtld_002")?.id(), "wtld_002");
        assert_eq!(corpus.by_id("somewhere/wtld_003.xmi")?.id(), "wtld_003");
        assert!(matches!(
            corpus.by_id("wtld_999"),
            Err(DakodaError::UnknownDocument(_))
        ));

        let doc = corpus.random_doc()?;
        assert!(corpus.by_id(doc.id()).is_ok());
        Ok(())
    }

    #[test]
    fn empty_corpus() -> TestResult {
        let tmpdir = tempfile::tempdir()?;
        let corpus = Corpus::open(tmpdir.path())?.quiet(true);

        assert!(corpus.is_empty());
        assert!(matches!(corpus.random_doc(), Err(DakodaError::EmptyCorpus)));
        assert_eq!(corpus.index(DataSubset::Cas)?.height(), 0);
        assert!(corpus.query(&Predicate::True, None)?.is_empty());
        assert_eq!(corpus.meta_frame()?.height(), 0);

        assert!(Corpus::open(tmpdir.path().join("missing")).is_err());
        Ok(())
    }

    #[test]
    fn subsets() -> TestResult {
        assert_eq!("cas".parse::<DataSubset>()?, DataSubset::Cas);
        assert_eq!("META".parse::<DataSubset>()?, DataSubset::Meta);
        assert!("all".parse::<DataSubset>().is_err());
        assert_eq!(DataSubset::Meta.to_string(), "meta");
        Ok(())
    }

    #[test]
    fn query_corpus() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let corpus = Corpus::open(&dir)?.quiet(true);

        let q = annotation("Token") & view("learner") & eq("wohnt");
        assert_eq!(corpus.query(&q, Some(DataSubset::Cas))?, vec![2]);

        let q = annotation("Token") & view("target_hypothesis");
        assert_eq!(corpus.query(&q, None)?, vec![0, 1]);

        let q = count(annotation("Token") & view("learner"), Operator::Ge, 8);
        assert_eq!(corpus.query(&q, Some(DataSubset::Cas))?, vec![0]);

        let q = field("learner_id") & eq("L01");
        assert_eq!(corpus.query(&q, Some(DataSubset::Meta))?, vec![0, 2]);
        assert!(corpus.query(&q, Some(DataSubset::Cas))?.is_empty());

        let q = field("text_learner_ageProduction") & ge(30);
        let docs = corpus.select(&q, None)?;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), "wtld_002");

        let idx = corpus.index(DataSubset::Cas)?.column(IDX)?;
        assert_eq!(idx.null_count(), 0);
        Ok(())
    }

    #[test]
    fn cas_index_is_cached() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let mut corpus = Corpus::open(&dir)?.quiet(true);
        let cache = corpus.index_cache();
        assert!(!cache.is_cached());

        let height = corpus.index(DataSubset::Cas)?.height();
        assert!(cache.is_cached());
        assert_eq!(cache.cache_file(), dir.join(".index/cas.ipc"));

        let reopened = Corpus::open(&dir)?.quiet(true);
        assert_eq!(reopened.index(DataSubset::Cas)?.height(), height);
        assert_eq!(corpus.build_index(DataSubset::Cas, true)?.height(), height);
        Ok(())
    }

    #[test]
    fn custom_cache_location() -> TestResult {
        let (tmpdir, dir) = copy_corpus("WTLD")?;
        let mut config = Config::default();
        config.index.cache_dir = Some(tmpdir.path().join("cache"));
        config.index.cache_metadata = false;

        let corpus = Corpus::with_config(&dir, config)?.quiet(true);
        corpus.index(DataSubset::Cas)?;
        corpus.index(DataSubset::Meta)?;

        assert!(tmpdir.path().join("cache/cas.ipc").is_file());
        assert!(!dir.join(".index").exists());
        assert!(!dir.join("wtld_001.json").exists());
        Ok(())
    }

    #[test]
    fn metadata_frame() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let corpus = Corpus::open(&dir)?.quiet(true);
        let df = corpus.meta_frame()?;

        assert_eq!(df.height(), 3);
        assert_eq!(df.get_column_names_str()[0], "id");

        let ids = df.column("id")?;
        assert_eq!(ids.as_materialized_series().str()?.get(2), Some("wtld_003"));

        let counts = df.column("text_tokenCount")?;
        assert_eq!(counts.as_materialized_series().i64()?.get(1), Some(6));
        Ok(())
    }
}
