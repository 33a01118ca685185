//! Access to the learner corpora of the DAKODA project.
//!
//! A corpus is a directory of UIMA XMI documents. Every document holds
//! the learner text, further views (e.g. a target hypothesis), the
//! linguistic annotations of each view and a structured metadata
//! record. The crate loads corpora lazily, indexes their annotations
//! and metadata as data frames and selects documents with composable
//! predicates.
//!
//! ```no_run
//! use dakoda::prelude::*;
//!
//! # fn main() -> DakodaResult<()> {
//! let corpus = Corpus::open("corpora/WTLD")?;
//! let q = count(annotation("Token") & view("learner"), Operator::Ge, 100);
//! for doc in corpus.select(&q, Some(DataSubset::Cas))? {
//!     println!("{}", doc.id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod corpus;
pub mod diff;
pub mod document;
pub mod error;
pub mod index;
pub mod metadata;
pub mod progress;
pub mod query;
pub mod resources;
pub mod uima;
pub mod view;
pub mod vocab;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::config::{Config, ViewAliases};
    pub use crate::corpus::{Corpus, DataSubset};
    pub use crate::document::Document;
    pub use crate::error::{DakodaError, DakodaResult};
    pub use crate::index::{CasIndexer, Indexer, MetaDataIndexer};
    pub use crate::metadata::{MetaData, Violation};
    pub use crate::query::{
        aggregate, annotation, annotation_with, column, contains, count,
        custom, endswith, eq, field, field_with, ge, gt, in_list,
        is_not_null, is_null, le, lt, max_filter, mean_filter, min_filter,
        neq, not_in_list, startswith, std_filter, sum_filter, value,
        var_filter, view, view_with, Aggregation, Operator, Predicate,
        QueryValue,
    };
    pub use crate::uima::{Cas, TypeSystem};
    pub use crate::view::{DocumentView, TypeAnnotation};
    pub use crate::vocab::{vocabulary, VocabKind, Vocabulary};
}
