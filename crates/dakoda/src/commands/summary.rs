use std::path::PathBuf;

use clap::Parser;
use comfy_table::{presets, Row, Table};
use humansize::{make_format, BINARY};
use polars::prelude::{col, len, DataType, IntoLazy, SortMultipleOptions};

use crate::prelude::*;

/// Prints a summary of a corpus.
#[derive(Debug, Parser)]
pub(crate) struct Summary {
    /// The corpus. Defaults to `corpus.path` of the config.
    corpus: Option<PathBuf>,
}

impl Summary {
    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let corpus = ctx.corpus(self.corpus.as_deref())?;
        let size: u64 = corpus
            .document_paths()
            .iter()
            .filter_map(|path| path.metadata().ok())
            .map(|metadata| metadata.len())
            .sum();

        let formatter = make_format(BINARY);
        println!("{corpus}");
        println!("{} documents, {}", corpus.len(), formatter(size));

        let df = corpus
            .index(DataSubset::Cas)?
            .clone()
            .lazy()
            .group_by([col("view"), col("type")])
            .agg([
                len().alias("rows"),
                col("idx").n_unique().alias("docs"),
            ])
            .select([
                col("view"),
                col("type"),
                col("docs").cast(DataType::UInt64),
                col("rows").cast(DataType::UInt64),
            ])
            .sort(["view", "type"], SortMultipleOptions::default())
            .collect()?;

        let views = df.column("view")?.as_materialized_series().str()?;
        let types = df.column("type")?.as_materialized_series().str()?;
        let docs = df.column("docs")?.as_materialized_series().u64()?;
        let rows = df.column("rows")?.as_materialized_series().u64()?;

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_header(Row::from(vec![
            "view",
            "type",
            "docs",
            "annotations",
        ]));

        for idx in 0..df.height() {
            table.add_row([
                views.get(idx).unwrap_or_default().to_string(),
                types.get(idx).unwrap_or_default().to_string(),
                docs.get(idx).unwrap_or_default().to_string(),
                rows.get(idx).unwrap_or_default().to_string(),
            ]);
        }

        println!("{table}");
        Ok(())
    }
}
