use clap::Parser;

use crate::prelude::*;

/// Checks that the bundled resources can be loaded.
#[derive(Debug, Default, Parser)]
pub(crate) struct Check {}

impl Check {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let ts = dakoda::uima::dakoda_typesystem()?;
        log::debug!("loaded type system with {} types", ts.len());

        for kind in VocabKind::ALL {
            let vocab = vocabulary(kind)?;
            log::debug!("loaded vocabulary {kind} ({} entries)", vocab.len());
        }

        ctx.config()?;
        println!("Dakoda installed successfully.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn bundled_resources_load() -> TestResult {
        Check::default().execute(&Context::default())?;
        Ok(())
    }
}
