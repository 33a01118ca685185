use std::collections::BTreeSet;
use std::mem;
use std::path::PathBuf;

use clap::Parser;
use polars::prelude::{DataFrame, DataType, IntoLazy};
use polars::sql::SQLContext;

use super::write_frame;
use crate::prelude::*;

/// Selects the documents of a corpus.
///
/// The options `--field`, `--annotation`, `--view` and `--value` are
/// combined into one predicate which must hold for a single row of
/// the index. Alternatively, an SQL predicate over the columns `idx`,
/// `view`, `type`, `field` and `value` can be given with `--where`.
#[derive(Debug, Parser)]
pub(crate) struct Query {
    /// Select rows of the metadata field `name`.
    #[arg(long, value_name = "name")]
    field: Option<String>,

    /// Select rows of the annotation type `name` (e.g. `Token`).
    #[arg(long, value_name = "name")]
    annotation: Option<String>,

    /// Select rows of a view (name or alias, e.g. `learner`).
    #[arg(long, value_name = "name")]
    view: Option<String>,

    /// The operator used to compare values: eq, ne, lt, le, gt, ge,
    /// contains, startswith, endswith, in, not_in, is_null or
    /// is_not_null.
    #[arg(long, default_value = "eq", value_name = "op")]
    op: Operator,

    /// The value to compare with. For the `in` and `not_in` operators
    /// a comma-separated list of values is expected.
    #[arg(long)]
    value: Option<String>,

    /// Select documents with at least `n` matching rows.
    #[arg(long, value_name = "n")]
    min_count: Option<usize>,

    /// An SQL predicate to filter the rows of the index.
    #[arg(
        long = "where",
        value_name = "predicate",
        conflicts_with_all = [
            "field", "annotation", "view", "value", "min_count"
        ]
    )]
    filter: Option<String>,

    /// Restrict the query to one index: `cas` or `meta`. By default
    /// the matches of both indices are merged.
    #[arg(long, short, value_name = "subset")]
    subset: Option<DataSubset>,

    /// Print the paths of the matching documents instead of their ids.
    #[arg(long)]
    paths: bool,

    /// Write the matching rows of the index into `filename` (CSV or
    /// Arrow IPC, depending on the file extension).
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,

    /// The corpus. Defaults to `corpus.path` of the config.
    corpus: Option<PathBuf>,
}

fn parse_scalar(s: &str) -> QueryValue {
    match s {
        "true" => QueryValue::Bool(true),
        "false" => QueryValue::Bool(false),
        s => match s.parse::<f64>() {
            Ok(n) => QueryValue::Num(n),
            Err(_) => QueryValue::Str(s.into()),
        },
    }
}

fn parse_value(s: &str, op: Operator) -> QueryValue {
    match op {
        Operator::In | Operator::NotIn => {
            let items: Vec<&str> = s.split(',').map(str::trim).collect();
            let values: Vec<QueryValue> =
                items.iter().copied().map(parse_scalar).collect();

            // cells are cast by the first item; mixed lists compare text
            let kind = values.first().map(mem::discriminant);
            let mixed =
                values.iter().any(|v| Some(mem::discriminant(v)) != kind);

            if mixed {
                QueryValue::list(items)
            } else {
                QueryValue::List(values)
            }
        }
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            QueryValue::Str(s.into())
        }
        _ => parse_scalar(s),
    }
}

impl Query {
    fn predicate(&self) -> DakodaResult<Predicate> {
        let mut preds = vec![];

        if let Some(ref name) = self.field {
            preds.push(field(name));
        }

        if let Some(ref name) = self.annotation {
            preds.push(annotation(name));
        }

        if let Some(ref name) = self.view {
            preds.push(view(name));
        }

        match (self.op, &self.value) {
            (op, Some(v)) => preds.push(value(parse_value(v, op), op)),
            (op @ (Operator::IsNull | Operator::IsNotNull), None) => {
                preds.push(value(QueryValue::Null, op))
            }
            (Operator::Eq, None) => (),
            (op, None) => bail!("operator `{op}` requires a value"),
        }

        let pred = match preds.len() {
            0 => Predicate::True,
            1 => preds.remove(0),
            _ => Predicate::And(preds),
        };

        Ok(match self.min_count {
            Some(n) => count(pred, Operator::Ge, n),
            None => pred,
        })
    }

    fn subsets(&self) -> Vec<DataSubset> {
        match self.subset {
            Some(subset) => vec![subset],
            None if self.filter.is_some() => vec![DataSubset::Cas],
            None => DataSubset::ALL.to_vec(),
        }
    }

    pub(crate) fn execute(self, ctx: &Context) -> DakodaResult<()> {
        let corpus = ctx.corpus(self.corpus.as_deref())?;
        let pred = self.predicate()?;

        let mut rows: Option<DataFrame> = None;
        for subset in self.subsets() {
            let index = corpus.index(subset)?;
            let df = match self.filter {
                Some(ref filter) => {
                    let mut sql = SQLContext::new();
                    sql.register("df", index.clone().lazy());
                    sql.execute(&format!("SELECT * FROM df WHERE {filter}"))?
                        .collect()?
                }
                None => pred.filter(index)?,
            };

            rows = Some(match rows {
                Some(rows) => rows.vstack(&df)?,
                None => df,
            });
        }

        let Some(mut rows) = rows else {
            return Ok(());
        };

        let ids: BTreeSet<i64> = rows
            .column("idx")?
            .as_materialized_series()
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .flatten()
            .collect();

        for doc in ids.into_iter().filter_map(|i| corpus.get(i as usize)) {
            match (self.paths, doc.path()) {
                (true, Some(path)) => println!("{}", path.display()),
                _ => println!("{}", doc.id()),
            }
        }

        if let Some(ref path) = self.output {
            write_frame(&mut rows, Some(path))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dakoda::index::{rows_to_frame, IndexRow};

    use super::*;

    type TestResult = anyhow::Result<()>;

    fn token(idx: i64, text: &str) -> IndexRow {
        IndexRow {
            idx: Some(idx),
            view: Some("learner".into()),
            type_name: Some("Token".into()),
            field: "coveredText".into(),
            value: Some(text.into()),
        }
    }

    fn meta(idx: i64, field: &str, value: Option<&str>) -> IndexRow {
        IndexRow {
            idx: Some(idx),
            field: field.into(),
            value: value.map(Into::into),
            ..Default::default()
        }
    }

    fn index() -> DakodaResult<DataFrame> {
        rows_to_frame(vec![
            token(0, "Haus"),
            token(0, "Haus"),
            meta(0, "learner_textCount", Some("2")),
            meta(0, "learner_multipleL1", Some("true")),
            meta(0, "corpus_admin_acronym", Some("WTLD")),
            token(1, "Baum"),
            meta(1, "learner_textCount", Some("5")),
            meta(1, "learner_multipleL1", Some("false")),
            meta(1, "corpus_admin_acronym", Some("SWIKO")),
            token(2, "Hausboot"),
            meta(2, "learner_textCount", Some("notAvailable")),
            meta(2, "learner_multipleL1", None),
            meta(2, "corpus_admin_acronym", Some("1")),
        ])
    }

    fn parse(args: &[&str]) -> Result<Query, clap::Error> {
        Query::try_parse_from(["query"].iter().chain(args))
    }

    fn documents(args: &[&str]) -> anyhow::Result<Vec<i64>> {
        Ok(parse(args)?.predicate()?.documents(&index()?)?)
    }

    #[test]
    fn parse_values() {
        assert_eq!(parse_scalar("true"), QueryValue::Bool(true));
        assert_eq!(parse_scalar("2.5"), QueryValue::Num(2.5));
        assert_eq!(parse_scalar("A2"), QueryValue::Str("A2".into()));

        assert_eq!(
            parse_value("12", Operator::Contains),
            QueryValue::Str("12".into())
        );
        assert_eq!(
            parse_value("1, 2", Operator::In),
            QueryValue::list([1, 2])
        );
        assert_eq!(
            parse_value("1,a", Operator::NotIn),
            QueryValue::list(["1", "a"])
        );
    }

    #[test]
    fn combine_options() -> TestResult {
        assert_eq!(documents(&["--annotation", "Token"])?, vec![0, 1, 2]);
        assert_eq!(
            documents(&["--view", "learner", "--value", "Baum"])?,
            vec![1]
        );
        assert_eq!(
            documents(&[
                "--annotation",
                "Token",
                "--op",
                "startswith",
                "--value",
                "Haus"
            ])?,
            vec![0, 2]
        );
        Ok(())
    }

    #[test]
    fn typed_values() -> TestResult {
        let field = "learner_textCount";
        assert_eq!(
            documents(&["--field", field, "--op", "gt", "--value", "3"])?,
            vec![1]
        );
        assert_eq!(
            documents(&["--field", field, "--op", "in", "--value", "2,5"])?,
            vec![0, 1]
        );
        assert_eq!(
            documents(&["--field", field, "--op", "contains", "--value", "5"])?,
            vec![1]
        );

        let field = "learner_multipleL1";
        assert_eq!(documents(&["--field", field, "--value", "true"])?, vec![0]);
        assert_eq!(
            documents(&["--field", field, "--value", "false"])?,
            vec![1]
        );
        assert_eq!(
            documents(&["--field", field, "--op", "is_null"])?,
            vec![2]
        );
        Ok(())
    }

    #[test]
    fn mixed_lists_compare_text() -> TestResult {
        assert_eq!(
            documents(&[
                "--field",
                "corpus_admin_acronym",
                "--op",
                "in",
                "--value",
                "1,WTLD"
            ])?,
            vec![0, 2]
        );
        Ok(())
    }

    #[test]
    fn min_count() -> TestResult {
        let args = ["--annotation", "Token", "--view", "learner"];
        assert_eq!(documents(&args)?, vec![0, 1, 2]);

        let mut args = args.to_vec();
        args.extend(["--min-count", "2"]);
        assert_eq!(documents(&args)?, vec![0]);
        Ok(())
    }

    #[test]
    fn missing_value() -> TestResult {
        assert!(parse(&["--field", "learner_textCount", "--op", "lt"])?
            .predicate()
            .is_err());
        assert!(parse(&["--op", "eq"])?.predicate().is_ok());
        assert!(parse(&["--op", "unknown"]).is_err());
        Ok(())
    }
}
