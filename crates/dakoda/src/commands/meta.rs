use std::path::PathBuf;

use clap::Parser;
use comfy_table::{presets, Row, Table};

use super::write_frame;
use crate::prelude::*;

/// Prints the metadata of a document.
#[derive(Debug, Parser)]
pub(crate) struct Meta {
    /// The corpus of the document. Defaults to `corpus.path` of the
    /// config.
    #[arg(long, short = 'C', value_name = "path")]
    corpus: Option<PathBuf>,

    /// Print the flattened metadata as a table of fields and values.
    #[arg(long, short)]
    flat: bool,

    /// Export the flattened metadata of all documents of the corpus,
    /// one row per document.
    #[arg(long, conflicts_with_all = ["document", "flat"])]
    all: bool,

    /// Write the exported metadata into `filename` (CSV or Arrow IPC,
    /// depending on the file extension) instead of `stdout`.
    #[arg(short, long, value_name = "filename", requires = "all")]
    output: Option<PathBuf>,

    /// The document, either an XMI file or the id of a document of the
    /// corpus.
    #[arg(required_unless_present = "all")]
    document: Option<String>,
}

impl Meta {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        if self.all {
            let corpus = ctx.corpus(self.corpus.as_deref())?;
            let mut df = corpus.meta_frame()?;
            return write_frame(&mut df, self.output.as_deref());
        }

        let Some(ref id) = self.document else {
            bail!("no document given");
        };

        let doc = ctx.document(id, self.corpus.as_deref())?;
        let meta = doc.meta()?;

        if self.flat {
            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_header(Row::from(vec!["field", "value"]));

            for (field, value) in meta.iter_flat()? {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };

                table.add_row([field, value]);
            }

            println!("{table}");
        } else {
            println!("{}", meta.to_json_string()?);
        }

        Ok(())
    }
}
