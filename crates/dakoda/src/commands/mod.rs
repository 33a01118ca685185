use std::ffi::OsStr;
use std::fs::File;
use std::io::stdout;
use std::path::Path;

use polars::prelude::{
    CsvWriter, DataFrame, IpcCompression, IpcWriter, SerWriter,
};

use crate::prelude::DakodaResult;

pub(crate) use check::Check;
pub(crate) use completions::Completions;
pub(crate) use config::Config;
pub(crate) use diff::Diff;
pub(crate) use index::Index;
pub(crate) use meta::Meta;
pub(crate) use query::Query;
pub(crate) use random::Random;
pub(crate) use summary::Summary;
pub(crate) use validate::Validate;

mod check;
mod completions;
mod config;
mod diff;
mod index;
mod meta;
mod query;
mod random;
mod summary;
mod validate;

/// Writes a data frame to `output`; IPC unless the file extension is
/// `csv`. Without an output the frame is written as CSV to `stdout`.
pub(crate) fn write_frame(
    df: &mut DataFrame,
    output: Option<&Path>,
) -> DakodaResult<()> {
    match output {
        Some(path) => match path.extension().and_then(OsStr::to_str) {
            Some("csv") => {
                let mut writer = CsvWriter::new(File::create(path)?);
                writer.finish(df)?;
            }
            _ => {
                let mut writer = IpcWriter::new(File::create(path)?)
                    .with_compression(Some(IpcCompression::ZSTD));
                writer.finish(df)?;
            }
        },
        None => {
            let mut writer = CsvWriter::new(stdout().lock());
            writer.finish(df)?;
        }
    }

    Ok(())
}
