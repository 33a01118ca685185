//! Predicates over the search index of a corpus.
//!
//! A predicate selects rows of an index. Column predicates compare the
//! cells of one column with a value; they can be combined with `&`,
//! `|` and `!`. Aggregation predicates group the rows selected by a
//! base predicate by document and keep all rows of the documents whose
//! aggregate passes a threshold.
//!
//! ```ignore
//! use dakoda::prelude::*;
//!
//! // Documents with at least 100 tokens in the learner text.
//! let q = count(annotation("Token") & view("learner"), Operator::Ge, 100);
//!
//! // Documents of the SWIKO corpus.
//! let q = field("corpus_admin_acronym") & eq("SWIKO");
//! ```

use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;
use std::sync::Arc;

use hashbrown::HashSet;
use polars::prelude::*;

use crate::error::{bail, DakodaError, DakodaResult};
use crate::index::{FIELD, IDX, TYPE, VALUE, VIEW};

mod value;

pub use value::QueryValue;

/// Comparison operators of column predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::In,
        Self::NotIn,
        Self::IsNull,
        Self::IsNotNull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = DakodaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::ALL.iter().find(|op| op.as_str() == s) {
            Some(op) => Ok(*op),
            None => bail!("unknown operator '{s}'"),
        }
    }
}

/// A user-defined test of a (non-null) cell.
#[derive(Clone)]
pub struct CustomFn(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl Debug for CustomFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFn(..)")
    }
}

/// An operator together with its operand.
#[derive(Debug, Clone)]
pub enum Comparison {
    Op(Operator, QueryValue),
    Custom(CustomFn),
}

impl Comparison {
    /// Returns true if a cell satisfies the comparison.
    ///
    /// Before comparing, the cell is converted to the type of the
    /// operand. Null cells and cells which can't be converted never
    /// match, except for `is_null`.
    fn matches(&self, cell: Option<&str>) -> bool {
        let (op, operand) = match self {
            Self::Custom(CustomFn(f)) => return cell.is_some_and(|s| f(s)),
            Self::Op(Operator::IsNull, _) => return cell.is_none(),
            Self::Op(Operator::IsNotNull, _) => return cell.is_some(),
            Self::Op(op, operand) => (op, operand),
        };

        let Some(cell) = cell else {
            return false;
        };

        match op {
            Operator::Contains => return cell.contains(&operand.to_string()),
            Operator::StartsWith => {
                return cell.starts_with(&operand.to_string())
            }
            Operator::EndsWith => return cell.ends_with(&operand.to_string()),
            _ => {}
        }

        let Some(lhs) = operand.cast(cell) else {
            return false;
        };

        let rhs = match op {
            Operator::In => return operand.contains(&lhs),
            Operator::NotIn => return !operand.contains(&lhs),
            _ => match operand.scalar() {
                Some(rhs) => rhs,
                None => return false,
            },
        };

        match op {
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Gt => lhs > rhs,
            Operator::Ge => lhs >= rhs,
            _ => false,
        }
    }
}

/// Aggregation functions of [`Predicate::Aggregation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Std,
    Var,
}

impl Aggregation {
    fn expr(&self) -> Expr {
        let value = || col(VALUE).cast(DataType::Float64);
        match self {
            Self::Count => len(),
            Self::Sum => value().sum(),
            Self::Mean => value().mean(),
            Self::Min => value().min(),
            Self::Max => value().max(),
            Self::Std => value().std(1),
            Self::Var => value().var(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnPredicate {
    pub column: String,
    pub comparison: Comparison,
}

#[derive(Debug, Clone)]
pub struct AggregationPredicate {
    pub base: Box<Predicate>,
    pub function: Aggregation,
    pub threshold: Comparison,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    True,
    False,
    Column(ColumnPredicate),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Aggregation(AggregationPredicate),
}

fn repeat(value: bool, len: usize) -> BooleanChunked {
    BooleanChunked::full(PlSmallStr::EMPTY, value, len)
}

fn evaluate_column(
    index: &DataFrame,
    column: &str,
    comparison: &Comparison,
) -> DakodaResult<BooleanChunked> {
    let Ok(column) = index.column(column) else {
        return Ok(repeat(false, index.height()));
    };

    let cells = column.as_materialized_series().cast(&DataType::String)?;
    Ok(cells
        .str()?
        .into_iter()
        .map(|cell| comparison.matches(cell))
        .collect())
}

fn idx_values(df: &DataFrame) -> DakodaResult<Vec<Option<i64>>> {
    let idx = df
        .column(IDX)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    Ok(idx.i64()?.into_iter().collect())
}

impl Predicate {
    /// Evaluates the predicate against an index. The result has one
    /// entry for every row of the index.
    pub fn evaluate(&self, index: &DataFrame) -> DakodaResult<BooleanChunked> {
        let height = index.height();

        match self {
            Self::True => Ok(repeat(true, height)),
            Self::False => Ok(repeat(false, height)),
            Self::Column(pred) => {
                evaluate_column(index, &pred.column, &pred.comparison)
            }
            Self::And(preds) => {
                let mut result = repeat(true, height);
                for pred in preds {
                    result = &result & &pred.evaluate(index)?;
                }

                Ok(result)
            }
            Self::Or(preds) => {
                let mut result = repeat(false, height);
                for pred in preds {
                    result = &result | &pred.evaluate(index)?;
                }

                Ok(result)
            }
            Self::Not(pred) => Ok(!&pred.evaluate(index)?),
            Self::Aggregation(pred) => pred.evaluate(index),
        }
    }

    /// Returns the rows of the index matching the predicate.
    pub fn filter(&self, index: &DataFrame) -> DakodaResult<DataFrame> {
        let mask = self.evaluate(index)?;
        Ok(index.filter(&mask)?)
    }

    /// Returns the (unique, sorted) positions of the documents having
    /// at least one row which matches the predicate.
    pub fn documents(&self, index: &DataFrame) -> DakodaResult<Vec<i64>> {
        let filtered = self.filter(index)?;
        if filtered.height() == 0 {
            return Ok(vec![]);
        }

        let result: BTreeSet<i64> =
            idx_values(&filtered)?.into_iter().flatten().collect();
        Ok(result.into_iter().collect())
    }
}

impl AggregationPredicate {
    fn evaluate(&self, index: &DataFrame) -> DakodaResult<BooleanChunked> {
        let filtered = self.base.filter(index)?;
        if filtered.height() == 0 {
            return Ok(repeat(false, index.height()));
        }

        let aggregated = filtered
            .lazy()
            .group_by([col(IDX)])
            .agg([self.function.expr().alias("agg_value")])
            .collect()?;

        let mask = evaluate_column(&aggregated, "agg_value", &self.threshold)?;
        let passing: HashSet<i64> = idx_values(&aggregated.filter(&mask)?)?
            .into_iter()
            .flatten()
            .collect();

        Ok(idx_values(index)?
            .into_iter()
            .map(|idx| idx.is_some_and(|idx| passing.contains(&idx)))
            .collect())
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self, rhs])
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self))
    }
}

/// Creates a column predicate.
pub fn column<S, V>(column: S, op: Operator, value: V) -> Predicate
where
    S: Into<String>,
    V: Into<QueryValue>,
{
    let value = value.into();
    let value = match (op, value) {
        (Operator::In | Operator::NotIn, QueryValue::List(items)) => {
            QueryValue::List(items)
        }
        (Operator::In | Operator::NotIn, value) => {
            QueryValue::List(vec![value])
        }
        (_, value) => value,
    };

    Predicate::Column(ColumnPredicate {
        column: column.into(),
        comparison: Comparison::Op(op, value),
    })
}

/// Matches rows of the metadata field `name`. To select documents by
/// the value of a field, combine the predicate with a value predicate:
/// `field("corpus_admin_acronym") & eq("SWIKO")`.
pub fn field<S: Into<String>>(name: S) -> Predicate {
    column(FIELD, Operator::Eq, name.into())
}

/// Matches rows whose field name satisfies `op`, e.g. all fields
/// starting with `corpus_`.
pub fn field_with<S: Into<String>>(name: S, op: Operator) -> Predicate {
    column(FIELD, op, name.into())
}

/// Matches rows of the annotation type `name` (short name, e.g.
/// `Token`).
pub fn annotation<S: Into<String>>(name: S) -> Predicate {
    column(TYPE, Operator::Eq, name.into())
}

pub fn annotation_with<S: Into<String>>(name: S, op: Operator) -> Predicate {
    column(TYPE, op, name.into())
}

/// Matches rows of a view (alias), e.g. `learner`.
pub fn view<S: Into<String>>(name: S) -> Predicate {
    column(VIEW, Operator::Eq, name.into())
}

pub fn view_with<S: Into<String>>(name: S, op: Operator) -> Predicate {
    column(VIEW, op, name.into())
}

/// Matches rows whose value satisfies `op`.
pub fn value<V: Into<QueryValue>>(value: V, op: Operator) -> Predicate {
    column(VALUE, op, value)
}

pub fn eq<V: Into<QueryValue>>(value: V) -> Predicate {
    column(VALUE, Operator::Eq, value)
}

pub fn neq<V: Into<QueryValue>>(value: V) -> Predicate {
    column(VALUE, Operator::Ne, value)
}

pub fn lt<V: Into<QueryValue>>(value: V) -> Predicate {
    column(VALUE, Operator::Lt, value)
}

pub fn le<V: Into<QueryValue>>(value: V) -> Predicate {
    column(VALUE, Operator::Le, value)
}

pub fn gt<V: Into<QueryValue>>(value: V) -> Predicate {
    column(VALUE, Operator::Gt, value)
}

pub fn ge<V: Into<QueryValue>>(value: V) -> Predicate {
    column(VALUE, Operator::Ge, value)
}

pub fn contains<S: Into<String>>(value: S) -> Predicate {
    column(VALUE, Operator::Contains, value.into())
}

pub fn startswith<S: Into<String>>(value: S) -> Predicate {
    column(VALUE, Operator::StartsWith, value.into())
}

pub fn endswith<S: Into<String>>(value: S) -> Predicate {
    column(VALUE, Operator::EndsWith, value.into())
}

pub fn in_list<I, V>(values: I) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<QueryValue>,
{
    column(VALUE, Operator::In, QueryValue::list(values))
}

pub fn not_in_list<I, V>(values: I) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<QueryValue>,
{
    column(VALUE, Operator::NotIn, QueryValue::list(values))
}

pub fn is_null() -> Predicate {
    column(VALUE, Operator::IsNull, QueryValue::Null)
}

pub fn is_not_null() -> Predicate {
    column(VALUE, Operator::IsNotNull, QueryValue::Null)
}

/// Matches rows whose (non-null) value passes the test `f`.
pub fn custom<F>(f: F) -> Predicate
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Predicate::Column(ColumnPredicate {
        column: VALUE.into(),
        comparison: Comparison::Custom(CustomFn(Arc::new(f))),
    })
}

/// Creates an aggregation predicate.
pub fn aggregate<V: Into<QueryValue>>(
    predicate: Predicate,
    function: Aggregation,
    op: Operator,
    threshold: V,
) -> Predicate {
    Predicate::Aggregation(AggregationPredicate {
        base: Box::new(predicate),
        function,
        threshold: Comparison::Op(op, threshold.into()),
    })
}

/// Selects documents by the number of rows matching `predicate`.
pub fn count<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Count, op, threshold)
}

/// Selects documents by the sum of the (numeric) values of the rows
/// matching `predicate`.
pub fn sum_filter<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Sum, op, threshold)
}

pub fn mean_filter<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Mean, op, threshold)
}

pub fn min_filter<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Min, op, threshold)
}

pub fn max_filter<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Max, op, threshold)
}

/// Selects documents by the sample standard deviation of the values
/// of the rows matching `predicate`.
pub fn std_filter<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Std, op, threshold)
}

/// Selects documents by the sample variance of the values of the rows
/// matching `predicate`.
pub fn var_filter<V: Into<QueryValue>>(
    predicate: Predicate,
    op: Operator,
    threshold: V,
) -> Predicate {
    aggregate(predicate, Aggregation::Var, op, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{rows_to_frame, IndexRow};

    type TestResult = anyhow::Result<()>;

    fn row(idx: i64, view: &str, ty: &str, field: &str, value: &str) -> IndexRow {
        IndexRow {
            idx: Some(idx),
            view: (!view.is_empty()).then(|| view.into()),
            type_name: (!ty.is_empty()).then(|| ty.into()),
            field: field.into(),
            value: Some(value.into()),
        }
    }

    fn index() -> DataFrame {
        rows_to_frame(vec![
            row(0, "learner", "Token", "coveredText", "Ich"),
            row(0, "learner", "Token", "coveredText", "gehe"),
            row(0, "learner", "POS", "PosValue", "VVFIN"),
            row(0, "target_hypothesis", "Token", "coveredText", "Ich"),
            row(0, "", "", "learner_textCount", "2"),
            row(0, "", "", "corpus_admin_acronym", "SWIKO"),
            row(1, "learner", "Token", "coveredText", "Haus"),
            row(1, "learner", "Stage", "name", "stage1"),
            row(1, "", "", "learner_textCount", "5"),
            row(1, "", "", "corpus_admin_acronym", "WTLD"),
            row(2, "learner", "Token", "coveredText", "Ich"),
            row(2, "", "", "learner_textCount", "notAvailable"),
            row(2, "", "", "learner_multipleL1", "true"),
        ])
        .unwrap()
    }

    #[test]
    fn operators_from_str() -> TestResult {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>()?, op);
        }

        assert!("like".parse::<Operator>().is_err());
        Ok(())
    }

    #[test]
    fn true_false_and_missing_columns() -> TestResult {
        let df = index();
        assert_eq!(Predicate::True.documents(&df)?, vec![0, 1, 2]);
        assert!(Predicate::False.documents(&df)?.is_empty());
        assert!(column("unknown", Operator::Eq, "x").documents(&df)?.is_empty());
        assert_eq!(Predicate::And(vec![]).documents(&df)?, vec![0, 1, 2]);
        assert!(Predicate::Or(vec![]).documents(&df)?.is_empty());
        Ok(())
    }

    #[test]
    fn string_comparisons() -> TestResult {
        let df = index();
        assert_eq!(eq("Ich").documents(&df)?, vec![0, 2]);
        assert_eq!((eq("Ich") & view("target_hypothesis")).documents(&df)?, vec![0]);
        assert_eq!(contains("aus").documents(&df)?, vec![1]);
        assert_eq!(startswith("stage").documents(&df)?, vec![1]);
        assert_eq!(endswith("FIN").documents(&df)?, vec![0]);
        assert_eq!(
            (field("corpus_admin_acronym") & in_list(["SWIKO", "MERLIN"]))
                .documents(&df)?,
            vec![0]
        );
        assert_eq!(
            (field("corpus_admin_acronym") & not_in_list(["SWIKO"]))
                .documents(&df)?,
            vec![1]
        );
        assert_eq!(
            field_with("corpus_", Operator::StartsWith).documents(&df)?,
            vec![0, 1]
        );
        assert_eq!(annotation("Stage").documents(&df)?, vec![1]);
        Ok(())
    }

    #[test]
    fn numeric_and_bool_comparisons() -> TestResult {
        let df = index();
        let count = field("learner_textCount");

        assert_eq!((count.clone() & gt(3)).documents(&df)?, vec![1]);
        assert_eq!((count.clone() & le(5.0)).documents(&df)?, vec![0, 1]);
        assert_eq!((count.clone() & eq(2)).documents(&df)?, vec![0]);

        // unconvertible cells never match, not even `ne`
        assert_eq!((count.clone() & neq(2)).documents(&df)?, vec![1]);
        assert_eq!((count & lt("3")).documents(&df)?, vec![0]);

        assert_eq!(eq(true).documents(&df)?, vec![2]);
        Ok(())
    }

    #[test]
    fn null_handling() -> TestResult {
        let df = index();
        let rows = column(VIEW, Operator::IsNull, QueryValue::Null).filter(&df)?;
        assert_eq!(rows.height(), 6);

        let rows = (view("learner") & is_not_null()).filter(&df)?;
        assert_eq!(rows.height(), 6);
        assert!(is_null().documents(&df)?.is_empty());
        assert!(column(VIEW, Operator::Ne, "learner").filter(&df)?.height() == 1);
        Ok(())
    }

    #[test]
    fn negation_and_custom() -> TestResult {
        let df = index();
        let tokens = annotation("Token") & view("learner");

        assert_eq!((!annotation("Token")).documents(&df)?, vec![0, 1, 2]);
        assert_eq!(
            (tokens.clone() & custom(|s| s.chars().count() == 4)).documents(&df)?,
            vec![0, 1]
        );
        assert_eq!((tokens & !eq("Ich")).documents(&df)?, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn aggregations() -> TestResult {
        let df = index();
        let tokens = annotation("Token") & view("learner");

        assert_eq!(count(tokens.clone(), Operator::Ge, 2).documents(&df)?, vec![0]);
        assert_eq!(count(tokens.clone(), Operator::Eq, 1).documents(&df)?, vec![1, 2]);
        assert!(count(eq("nothing"), Operator::Ge, 0).documents(&df)?.is_empty());

        let text_count = field("learner_textCount");
        assert_eq!(
            sum_filter(text_count.clone(), Operator::Gt, 3).documents(&df)?,
            vec![1]
        );
        assert_eq!(
            max_filter(text_count.clone(), Operator::Lt, 3).documents(&df)?,
            vec![0]
        );
        assert_eq!(
            min_filter(text_count.clone(), Operator::Ge, 2).documents(&df)?,
            vec![0, 1]
        );
        assert_eq!(
            mean_filter(text_count, Operator::Eq, 5).documents(&df)?,
            vec![1]
        );

        // all rows of a passing document are selected
        let rows = count(annotation("Stage"), Operator::Ge, 1).filter(&df)?;
        assert_eq!(rows.height(), 4);
        Ok(())
    }

    #[test]
    fn spread_aggregations() -> TestResult {
        let df = rows_to_frame(vec![
            row(0, "", "", "score", "1"),
            row(0, "", "", "score", "3"),
            row(1, "", "", "score", "2"),
            row(1, "", "", "score", "2"),
        ])?;

        let score = field("score");
        assert_eq!(var_filter(score.clone(), Operator::Eq, 2).documents(&df)?, vec![0]);
        assert_eq!(std_filter(score.clone(), Operator::Lt, 0.5).documents(&df)?, vec![1]);
        assert_eq!(sum_filter(score, Operator::Eq, 4).documents(&df)?, vec![0, 1]);
        Ok(())
    }
}
