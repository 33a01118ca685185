use clap::Parser;

use crate::prelude::*;

/// Get and set config options.
///
/// Known options are `corpus.path`, `index.cache-dir`,
/// `index.cache-metadata`, `runtime.num-jobs` and `views.<alias>`.
#[derive(Debug, Parser)]
pub(crate) struct Config {
    /// Get the value for the given key.
    #[arg(long, conflicts_with_all = ["value", "unset", "set"])]
    get: bool,

    /// Remove the key from the config.
    #[arg(long, conflicts_with_all = ["value", "get", "set"])]
    unset: bool,

    /// Set the value for the given key.
    #[arg(long, requires = "value", conflicts_with_all = ["get", "unset"])]
    set: bool,

    /// The name of the config option. If no name is given, the whole
    /// config is printed.
    name: Option<String>,

    /// The (new) value of the config option.
    #[arg(conflicts_with_all = ["get", "unset"])]
    value: Option<String>,
}

#[inline]
fn print_option<T>(key: &str, value: Option<T>)
where
    T: ToString,
{
    println!(
        "{key} = {}",
        match value {
            Some(value) => value.to_string(),
            None => "None".to_string(),
        }
    );
}

impl Config {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let mut config = ctx.config()?;

        let Some(name) = self.name else {
            if let Some(path) = config.path() {
                log::debug!("config file: {}", path.display());
            }

            print!("{config}");
            return Ok(());
        };

        if self.unset {
            config.unset(&name)?;
            config.save()?;
        } else if let Some(value) = self.value {
            config.set(&name, &value)?;
            config.save()?;
        } else if self.get || !self.set {
            print_option(&name, config.get(&name)?);
        } else {
            unreachable!()
        }

        Ok(())
    }
}
