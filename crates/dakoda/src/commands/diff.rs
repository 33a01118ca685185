use std::path::PathBuf;

use clap::Parser;

use crate::prelude::*;

/// Prints a context diff of the tokens of two views of a document.
#[derive(Debug, Parser)]
pub(crate) struct Diff {
    /// The corpus of the document. Defaults to `corpus.path` of the
    /// config.
    #[arg(long, short = 'C', value_name = "path")]
    corpus: Option<PathBuf>,

    /// The first view (name or alias).
    #[arg(long, default_value = "learner")]
    from: String,

    /// The second view (name or alias).
    #[arg(long, default_value = "target_hypothesis")]
    to: String,

    /// The document, either an XMI file or the id of a document of the
    /// corpus.
    document: String,
}

impl Diff {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let doc = ctx.document(&self.document, self.corpus.as_deref())?;
        print!("{}", doc.text_diff(&self.from, &self.to)?);
        Ok(())
    }
}
