use std::path::PathBuf;

use clap::Parser;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use dakoda::progress::PBAR_VALIDATE;

use crate::prelude::*;

/// Validates the metadata of the documents of a corpus.
///
/// Every violated constraint is printed as one line. The command fails
/// if at least one document is invalid.
#[derive(Debug, Parser)]
pub(crate) struct Validate {
    /// Validate a metadata record stored as JSON file instead of a
    /// corpus.
    #[arg(long, value_name = "filename", conflicts_with = "corpus")]
    json: Option<PathBuf>,

    /// The corpus. Defaults to `corpus.path` of the config.
    corpus: Option<PathBuf>,
}

fn report(id: &str, violations: &[Violation]) {
    for violation in violations {
        println!("{id}: {violation}");
    }
}

impl Validate {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        if let Some(ref path) = self.json {
            let violations = MetaData::from_json_file(path)?.validate()?;
            report(&path.display().to_string(), &violations);
            if !violations.is_empty() {
                bail!("validation failed ({} violations)", violations.len());
            }

            return Ok(());
        }

        let corpus = ctx.corpus(self.corpus.as_deref())?;
        let pbar = ProgressBarBuilder::new(PBAR_VALIDATE, ctx.quiet())
            .len(corpus.len() as u64)
            .build();

        let results: Vec<(&Document, DakodaResult<Vec<Violation>>)> = corpus
            .docs()
            .par_iter()
            .progress_with(pbar)
            .map(|doc| (doc, doc.meta().and_then(MetaData::validate)))
            .collect();

        let mut invalid = 0;
        for (doc, result) in results {
            match result {
                Ok(violations) if violations.is_empty() => (),
                Ok(violations) => {
                    report(doc.id(), &violations);
                    invalid += 1;
                }
                Err(e) => {
                    println!("{}: {e}", doc.id());
                    invalid += 1;
                }
            }
        }

        if invalid > 0 {
            bail!(
                "validation failed ({invalid} of {} documents)",
                corpus.len()
            );
        }

        Ok(())
    }
}
