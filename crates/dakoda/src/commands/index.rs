use std::path::PathBuf;

use clap::Parser;

use super::write_frame;
use crate::prelude::*;

/// Builds the search index of a corpus.
///
/// The CAS index is cached in the index directory of the corpus and
/// only rebuilt if a document changed.
#[derive(Debug, Parser)]
pub(crate) struct Index {
    /// Rebuild the index even if the cache is up to date.
    #[arg(short, long)]
    force: bool,

    /// The part of the corpus to index: `cas` (annotations) or `meta`
    /// (metadata).
    #[arg(long, short, default_value = "cas", value_name = "subset")]
    subset: DataSubset,

    /// Write the index into `filename`. The output is written as CSV
    /// if the file extension is `csv`, otherwise as Arrow IPC.
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,

    /// The corpus. Defaults to `corpus.path` of the config.
    corpus: Option<PathBuf>,
}

impl Index {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let mut corpus = ctx.corpus(self.corpus.as_deref())?;
        let name = corpus.name().to_string();
        let df = corpus.build_index(self.subset, self.force)?;

        match self.output {
            Some(ref path) => write_frame(&mut df.clone(), Some(path))?,
            None if !ctx.quiet() => {
                eprintln!(
                    "{name}: {} rows ({} index)",
                    df.height(),
                    self.subset
                );
            }
            None => (),
        }

        Ok(())
    }
}
