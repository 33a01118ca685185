use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::ViewAliases;
use crate::diff::context_diff;
use crate::error::{bail, DakodaError, DakodaResult};
use crate::metadata::MetaData;
use crate::uima::{dakoda_typesystem, load_cas_from_file, Cas, TypeSystem};
use crate::view::DocumentView;

/// A document of a DAKODA corpus.
///
/// The CAS of a document is loaded from its XMI file on first use.
/// The metadata is read from a JSON file next to the XMI file, if
/// present; otherwise it's extracted from the CAS and (unless caching
/// is disabled) written to that file.
#[derive(Debug)]
pub struct Document {
    id: String,
    path: Option<PathBuf>,
    typesystem: Arc<TypeSystem>,
    views: ViewAliases,
    cache_metadata: bool,
    cas: OnceLock<Cas>,
    meta: OnceLock<MetaData>,
}

impl Document {
    /// Creates a document backed by an XMI file. The id of the
    /// document is the file stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> DakodaResult<Self> {
        let path = path.as_ref();
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            bail!("invalid document path '{}'", path.display());
        };

        Ok(Self {
            id: id.into(),
            path: Some(path.into()),
            typesystem: dakoda_typesystem()?,
            views: ViewAliases::default(),
            cache_metadata: true,
            cas: OnceLock::new(),
            meta: OnceLock::new(),
        })
    }

    /// Creates a document from an already loaded CAS. Such a document
    /// has no metadata cache.
    pub fn from_cas<S: Into<String>>(id: S, cas: Cas) -> Self {
        Self {
            id: id.into(),
            path: None,
            typesystem: cas.shared_typesystem(),
            views: ViewAliases::default(),
            cache_metadata: false,
            cas: OnceLock::from(cas),
            meta: OnceLock::new(),
        }
    }

    /// Uses the given view aliases to resolve view names.
    pub fn with_views(mut self, views: ViewAliases) -> Self {
        self.views = views;
        self
    }

    /// Uses `ts` to load the CAS of the document.
    pub fn with_typesystem(mut self, ts: Arc<TypeSystem>) -> Self {
        self.typesystem = ts;
        self
    }

    /// Whether to write the metadata cache file or not.
    pub fn cache_metadata(mut self, yes: bool) -> Self {
        self.cache_metadata = yes;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the path of the metadata cache file.
    pub fn meta_path(&self) -> Option<PathBuf> {
        self.path.as_ref().map(|path| path.with_extension("json"))
    }

    /// Returns the CAS of the document, loading it on first use.
    pub fn cas(&self) -> DakodaResult<&Cas> {
        if let Some(cas) = self.cas.get() {
            return Ok(cas);
        }

        let cas = self.load_cas()?;
        Ok(self.cas.get_or_init(|| cas))
    }

    /// Returns the CAS of the document without keeping it in memory,
    /// unless it's loaded already.
    pub fn read_cas(&self) -> DakodaResult<Cow<'_, Cas>> {
        match self.cas.get() {
            Some(cas) => Ok(Cow::Borrowed(cas)),
            None => Ok(Cow::Owned(self.load_cas()?)),
        }
    }

    fn load_cas(&self) -> DakodaResult<Cas> {
        let path = self.path.as_ref().ok_or_else(|| {
            DakodaError::other(format!("document '{}' has no file", self.id))
        })?;

        load_cas_from_file(path, self.typesystem.clone())
    }

    /// Returns the text the learner produced (the sofa string of the
    /// initial view).
    pub fn text(&self) -> DakodaResult<&str> {
        self.cas()?.sofa_string()
    }

    /// Returns the metadata of the document.
    pub fn meta(&self) -> DakodaResult<&MetaData> {
        if let Some(meta) = self.meta.get() {
            return Ok(meta);
        }

        let meta = self.load_meta()?;
        Ok(self.meta.get_or_init(|| meta))
    }

    fn load_meta(&self) -> DakodaResult<MetaData> {
        let meta_path = self.meta_path();
        if let Some(ref path) = meta_path {
            if path.is_file() {
                log::debug!("reading metadata from {}", path.display());
                return MetaData::from_json_file(path);
            }
        }

        let meta = MetaData::from_cas(&*self.read_cas()?)?;
        if let (true, Some(path)) = (self.cache_metadata, meta_path) {
            if let Err(e) = meta.write_json_file(&path) {
                log::warn!(
                    "unable to write metadata cache {}: {e}",
                    path.display()
                );
            }
        }

        Ok(meta)
    }

    /// Returns a view of the document. View aliases, such as
    /// `learner`, are resolved.
    pub fn view(&self, name: &str) -> DakodaResult<DocumentView<'_>> {
        DocumentView::new(self.cas()?, self.views.resolve(name))
    }

    /// Returns the view holding the learner's text.
    pub fn learner(&self) -> DakodaResult<DocumentView<'_>> {
        self.view("learner")
    }

    /// Returns the view holding the target hypothesis.
    pub fn target_hypothesis(&self) -> DakodaResult<DocumentView<'_>> {
        self.view("target_hypothesis")
    }

    /// Returns the context diff of the tokens of two views.
    ///
    /// # Errors
    ///
    /// Fails if one of the views doesn't exist or has no tokens.
    pub fn text_diff(&self, view_1: &str, view_2: &str) -> DakodaResult<String> {
        let tokens_1 = self.token_texts(view_1)?;
        let tokens_2 = self.token_texts(view_2)?;
        Ok(context_diff(&tokens_1, &tokens_2))
    }

    fn token_texts(&self, name: &str) -> DakodaResult<Vec<String>> {
        let tokens: Vec<String> = self
            .view(name)?
            .tokens()?
            .into_iter()
            .map(|token| token.text().to_string())
            .collect();

        if tokens.is_empty() {
            bail!("view '{}' has no tokens", self.views.resolve(name));
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::copy_corpus;
    use crate::uima::load_cas_from_str;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn lazy_document() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let doc = Document::from_path(dir.join("wtld_001.xmi"))?;

        assert_eq!(doc.id(), "wtld_001");
        assert_eq!(doc.text()?, "Ich wohne in Berlin seit zwei Jahr.");
        assert_eq!(doc.learner()?.name(), "ctok");
        assert_eq!(doc.target_hypothesis()?.name(), "mixtral_th1");
        assert_eq!(doc.view("ctok")?.tokens()?.len(), 8);
        Ok(())
    }

    #[test]
    fn metadata_is_cached() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let path = dir.join("wtld_001.xmi");
        let cache = dir.join("wtld_001.json");

        let doc = Document::from_path(&path)?;
        assert!(!cache.is_file());

        let meta = doc.meta()?.clone();
        assert!(cache.is_file());
        assert_eq!(MetaData::from_json_file(&cache)?, meta);

        let doc = Document::from_path(&path)?.cache_metadata(false);
        assert_eq!(doc.meta()?, &meta);
        Ok(())
    }

    #[test]
    fn metadata_cache_disabled() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let doc = Document::from_path(dir.join("wtld_002.xmi"))?
            .cache_metadata(false);

        assert!(doc.meta().is_ok());
        assert!(!dir.join("wtld_002.json").exists());
        Ok(())
    }

    #[test]
    fn diff_of_views() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let doc = Document::from_path(dir.join("wtld_001.xmi"))?;

        assert_eq!(
            doc.text_diff("learner", "target_hypothesis")?,
            "*** \n--- \n***************\n*** 1,8 ****\n  Ich\n  wohne\n  \
             in\n  Berlin\n- seit\n- zwei\n- Jahr\n  .\n--- 1,8 ----\n  \
             Ich\n  wohne\n+ seit\n+ zwei\n+ Jahren\n  in\n  Berlin\n  \
             .\n"
        );

        assert_eq!(doc.text_diff("learner", "ctok")?, "");
        assert!(doc.text_diff("learner", "_InitialView").is_err());
        assert!(doc.text_diff("learner", "unknown").is_err());
        Ok(())
    }

    #[test]
    fn document_from_cas() -> TestResult {
        let xmi = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore" xmi:version="2.0">
  <cas:Sofa xmi:id="1" sofaNum="1" sofaID="_InitialView" mimeType="text" sofaString="Hallo Welt"/>
  <cas:View sofa="1" members=""/>
</xmi:XMI>"#;

        let cas = load_cas_from_str(xmi, dakoda_typesystem()?)?;
        let doc = Document::from_cas("hallo", cas);

        assert_eq!(doc.id(), "hallo");
        assert_eq!(doc.path(), None);
        assert_eq!(doc.meta_path(), None);
        assert_eq!(doc.text()?, "Hallo Welt");
        assert!(matches!(doc.meta(), Err(DakodaError::MissingMetadata)));
        assert!(matches!(doc.learner(), Err(DakodaError::UnknownView(_))));
        Ok(())
    }
}
