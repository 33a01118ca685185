use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::commands::*;
use crate::prelude::{Corpus, DakodaResult, Document};

#[derive(Debug, Parser)]
#[command(
    name = "dakoda",
    version,
    about,
    long_about = None,
    max_term_width = 72
)]
pub(crate) struct Args {
    /// Number of threads to use. If this options isn't set or a value
    /// of "0" is chosen, the maximum number of available threads
    /// is used.
    #[clap(
        short = 'j',
        long,
        global = true,
        env = "DAKODA_NUM_JOBS",
        hide_env_values = true
    )]
    pub(crate) num_jobs: Option<usize>,

    /// Read the config from `filename`. By default the config is
    /// searched in `DAKODA_CONFIG`, in the current directory and its
    /// parents, and in the user's config directory.
    #[arg(long, global = true, value_name = "filename")]
    pub(crate) config: Option<PathBuf>,

    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub(crate) verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    #[command(subcommand)]
    pub(crate) cmd: Command,
}

impl Args {
    pub(crate) fn context(&self) -> Context {
        Context {
            config: self.config.clone(),
            quiet: self.quiet,
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    Check(Check),
    Completions(Completions),
    Config(Config),
    Diff(Diff),
    Index(Index),
    Meta(Meta),
    Query(Query),
    Random(Random),
    Summary(Summary),
    Validate(Validate),
}

/// Options shared by all commands.
#[derive(Debug, Default)]
pub(crate) struct Context {
    config: Option<PathBuf>,
    quiet: bool,
}

impl Context {
    #[inline]
    pub(crate) fn quiet(&self) -> bool {
        self.quiet
    }

    pub(crate) fn config(&self) -> DakodaResult<dakoda::config::Config> {
        dakoda::config::Config::discover(self.config.as_deref())
    }

    /// Opens the given corpus or, if there is none, the corpus of the
    /// config.
    pub(crate) fn corpus(&self, path: Option<&Path>) -> DakodaResult<Corpus> {
        let config = self.config()?;
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match config.corpus.path {
                Some(ref path) => path.clone(),
                None => bail!(
                    "no corpus given (pass a path or set `corpus.path`)"
                ),
            },
        };

        Ok(Corpus::with_config(path, config)?.quiet(self.quiet))
    }

    /// Returns a document, given either as path of an XMI file or as id
    /// of a document of the corpus.
    pub(crate) fn document(
        &self,
        doc: &str,
        corpus: Option<&Path>,
    ) -> DakodaResult<Document> {
        let path = Path::new(doc);
        if path.is_file() {
            let config = self.config()?;
            return Ok(Document::from_path(path)?
                .with_views(config.views)
                .cache_metadata(config.index.cache_metadata));
        }

        let corpus = self.corpus(corpus)?;
        let Some(path) = corpus.by_id(doc)?.path() else {
            bail!("document '{doc}' has no file");
        };

        Ok(Document::from_path(path)?
            .with_views(corpus.config().views.clone())
            .cache_metadata(corpus.config().index.cache_metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn global_options_after_command() -> TestResult {
        let args =
            Args::try_parse_from(["dakoda", "check", "-j", "2", "--quiet"])?;
        assert_eq!(args.num_jobs, Some(2));
        assert!(args.context().quiet());
        assert!(matches!(args.cmd, Command::Check(_)));

        assert!(
            Args::try_parse_from(["dakoda", "-v", "-q", "check"]).is_err()
        );
        Ok(())
    }
}
