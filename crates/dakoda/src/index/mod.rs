//! The search index of a corpus.
//!
//! An index is a data frame with one row per indexed value and the
//! columns `idx` (position of the document in the corpus), `view`,
//! `type`, `field` and `value`. The CAS index holds the primary value
//! of every token, lemma, POS tag, sentence and stage annotation; the
//! metadata index holds the leaves of the metadata records.

use indicatif::ParallelProgressIterator;
use polars::prelude::*;
use rayon::prelude::*;

use crate::config::ViewAliases;
use crate::corpus::Corpus;
use crate::document::Document;
use crate::error::DakodaResult;
use crate::metadata::leaf_to_string;
use crate::progress::{ProgressBarBuilder, PBAR_INDEX, PBAR_META};
use crate::uima::short_name;
use crate::view::{COVERED_TEXT, PRIMARY_FIELDS};

mod cache;

pub use cache::{fingerprint, IndexCache};

pub const IDX: &str = "idx";
pub const VIEW: &str = "view";
pub const TYPE: &str = "type";
pub const FIELD: &str = "field";
pub const VALUE: &str = "value";

/// A row of the search index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRow {
    pub idx: Option<i64>,
    pub view: Option<String>,
    pub type_name: Option<String>,
    pub field: String,
    pub value: Option<String>,
}

/// Builds a data frame from index rows.
pub fn rows_to_frame<I>(rows: I) -> DakodaResult<DataFrame>
where
    I: IntoIterator<Item = IndexRow>,
{
    let mut idx: Vec<Option<i64>> = vec![];
    let mut view: Vec<Option<String>> = vec![];
    let mut type_name: Vec<Option<String>> = vec![];
    let mut field: Vec<String> = vec![];
    let mut value: Vec<Option<String>> = vec![];

    for row in rows.into_iter() {
        idx.push(row.idx);
        view.push(row.view);
        type_name.push(row.type_name);
        field.push(row.field);
        value.push(row.value);
    }

    Ok(DataFrame::new(vec![
        Column::new(IDX.into(), idx),
        Column::new(VIEW.into(), view),
        Column::new(TYPE.into(), type_name),
        Column::new(FIELD.into(), field),
        Column::new(VALUE.into(), value),
    ])?)
}

pub trait Indexer: Sync {
    /// The progress bar template used while indexing a corpus.
    const TEMPLATE: &'static str;

    /// Returns the index rows of a document. `idx` is the position
    /// of the document in its corpus.
    fn to_entries(
        &self,
        doc: &Document,
        idx: Option<i64>,
    ) -> DakodaResult<Vec<IndexRow>>;

    /// Indexes all documents of a corpus in parallel.
    fn index_corpus(&self, corpus: &Corpus) -> DakodaResult<DataFrame> {
        let pbar = ProgressBarBuilder::new(Self::TEMPLATE, corpus.is_quiet())
            .len(corpus.len() as u64)
            .build();

        let rows = corpus
            .docs()
            .par_iter()
            .enumerate()
            .progress_with(pbar)
            .map(|(i, doc)| self.to_entries(doc, Some(i as i64)))
            .collect::<DakodaResult<Vec<_>>>()?;

        rows_to_frame(rows.into_iter().flatten())
    }

    /// Indexes a single document; the `idx` column is null.
    fn index_document(&self, doc: &Document) -> DakodaResult<DataFrame> {
        rows_to_frame(self.to_entries(doc, None)?)
    }
}

/// Indexes the annotations of every (aliased) view.
#[derive(Debug, Clone, Default)]
pub struct CasIndexer {
    views: ViewAliases,
}

impl CasIndexer {
    pub fn new(views: ViewAliases) -> Self {
        Self { views }
    }
}

impl Indexer for CasIndexer {
    const TEMPLATE: &'static str = PBAR_INDEX;

    fn to_entries(
        &self,
        doc: &Document,
        idx: Option<i64>,
    ) -> DakodaResult<Vec<IndexRow>> {
        let cas = doc.read_cas()?;
        let mut rows = vec![];

        for (alias, name) in self.views.iter() {
            if !cas.has_view(name) {
                log::debug!("document '{}' has no view '{name}'", doc.id());
                continue;
            }

            let view = cas.view(name)?;
            for (type_name, field) in PRIMARY_FIELDS {
                for fs in view.select(type_name)? {
                    let value = if field == COVERED_TEXT {
                        Some(view.covered_text(fs).to_string())
                    } else {
                        fs.get(field).map(String::from)
                    };

                    rows.push(IndexRow {
                        idx,
                        view: Some(alias.into()),
                        type_name: Some(short_name(type_name).into()),
                        field: field.into(),
                        value,
                    });
                }
            }
        }

        Ok(rows)
    }
}

/// Indexes the flattened metadata record of a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaDataIndexer;

impl Indexer for MetaDataIndexer {
    const TEMPLATE: &'static str = PBAR_META;

    fn to_entries(
        &self,
        doc: &Document,
        idx: Option<i64>,
    ) -> DakodaResult<Vec<IndexRow>> {
        Ok(doc
            .meta()?
            .iter_flat()?
            .map(|(field, value)| IndexRow {
                idx,
                view: None,
                type_name: None,
                field,
                value: Some(leaf_to_string(&value)),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::copy_corpus;

    type TestResult = anyhow::Result<()>;

    fn strings(df: &DataFrame, name: &str) -> anyhow::Result<Vec<String>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|s| s.unwrap_or_default().to_string())
            .collect())
    }

    #[test]
    fn cas_index_of_document() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let doc = Document::from_path(dir.join("wtld_001.xmi"))?;
        let rows = CasIndexer::default().to_entries(&doc, Some(3))?;

        assert!(rows.iter().all(|row| row.idx == Some(3)));
        assert!(rows.contains(&IndexRow {
            idx: Some(3),
            view: Some("learner".into()),
            type_name: Some("Token".into()),
            field: COVERED_TEXT.into(),
            value: Some("Berlin".into()),
        }));
        assert!(rows.contains(&IndexRow {
            idx: Some(3),
            view: Some("learner".into()),
            type_name: Some("POS".into()),
            field: "PosValue".into(),
            value: Some("NE".into()),
        }));
        assert!(rows.contains(&IndexRow {
            idx: Some(3),
            view: Some("target_hypothesis".into()),
            type_name: Some("Token".into()),
            field: COVERED_TEXT.into(),
            value: Some("Jahren".into()),
        }));

        let df = CasIndexer::default().index_document(&doc)?;
        assert_eq!(df.height(), rows.len());
        assert_eq!(df.column(IDX)?.null_count(), df.height());
        Ok(())
    }

    #[test]
    fn missing_views_are_skipped() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let doc = Document::from_path(dir.join("wtld_003.xmi"))?;
        let df = CasIndexer::default().index_document(&doc)?;

        assert!(df.height() > 0);
        assert!(strings(&df, VIEW)?.iter().all(|view| view == "learner"));
        Ok(())
    }

    #[test]
    fn metadata_index_of_document() -> TestResult {
        let (_tmpdir, dir) = copy_corpus("WTLD")?;
        let doc = Document::from_path(dir.join("wtld_001.xmi"))?;
        let df = MetaDataIndexer.index_document(&doc)?;

        assert_eq!(df.column(VIEW)?.null_count(), df.height());
        assert_eq!(df.column(TYPE)?.null_count(), df.height());

        let fields = strings(&df, FIELD)?;
        let values = strings(&df, VALUE)?;
        let pos = fields
            .iter()
            .position(|f| f == "corpus_admin_acronym")
            .unwrap();
        assert_eq!(values[pos], "WTLD");
        Ok(())
    }

    #[test]
    fn empty_frame_has_schema() -> TestResult {
        let df = rows_to_frame(vec![])?;
        assert_eq!(df.height(), 0);
        assert_eq!(
            df.get_column_names_str(),
            vec![IDX, VIEW, TYPE, FIELD, VALUE]
        );
        assert_eq!(df.column(IDX)?.dtype(), &DataType::Int64);
        Ok(())
    }
}
