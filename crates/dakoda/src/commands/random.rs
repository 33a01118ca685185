use std::path::PathBuf;

use clap::Parser;

use crate::prelude::*;

/// Picks a random document of a corpus.
#[derive(Debug, Parser)]
pub(crate) struct Random {
    /// Print the learner text of the document as well.
    #[arg(long, short)]
    text: bool,

    /// The corpus. Defaults to `corpus.path` of the config.
    corpus: Option<PathBuf>,
}

impl Random {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let corpus = ctx.corpus(self.corpus.as_deref())?;
        let doc = corpus.random_doc()?;

        println!("{}", doc.id());
        if self.text {
            println!("{}", doc.text()?);
        }

        Ok(())
    }
}
