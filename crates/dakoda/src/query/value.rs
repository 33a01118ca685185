use std::fmt::{self, Display};

/// The operand of a comparison.
///
/// Index cells are strings; before a comparison they are converted to
/// the type of the operand (for lists, the type of the first item).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<QueryValue>),
}

/// A converted cell.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub(crate) enum Scalar {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl QueryValue {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Converts a cell to the type of the value. Returns `None` if the
    /// cell can't be converted.
    pub(crate) fn cast(&self, cell: &str) -> Option<Scalar> {
        match self {
            Self::Null | Self::Str(_) => Some(Scalar::Str(cell.into())),
            Self::Num(_) => cell.trim().parse().ok().map(Scalar::Num),
            Self::Bool(_) => match cell.trim() {
                "true" | "True" => Some(Scalar::Bool(true)),
                "false" | "False" => Some(Scalar::Bool(false)),
                _ => None,
            },
            Self::List(items) => match items.first() {
                Some(first) => first.cast(cell),
                None => Some(Scalar::Str(cell.into())),
            },
        }
    }

    pub(crate) fn scalar(&self) -> Option<Scalar> {
        match self {
            Self::Str(s) => Some(Scalar::Str(s.clone())),
            Self::Num(n) => Some(Scalar::Num(*n)),
            Self::Bool(b) => Some(Scalar::Bool(*b)),
            Self::Null | Self::List(_) => None,
        }
    }

    /// Returns true if one of the list items equals the converted cell.
    pub(crate) fn contains(&self, other: &Scalar) -> bool {
        match self {
            Self::List(items) => items
                .iter()
                .any(|item| item.scalar().as_ref() == Some(other)),
            value => value.scalar().as_ref() == Some(other),
        }
    }
}

impl Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                let items: Vec<String> =
                    items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(value: $t) -> Self {
                    Self::Num(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u32, u64, usize, f32, f64);

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        Self::list(values)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn cast_by_operand_type() {
        let num = QueryValue::from(3);
        assert_eq!(num.cast(" 2.5"), Some(Scalar::Num(2.5)));
        assert_eq!(num.cast("notAvailable"), None);

        let flag = QueryValue::from(false);
        assert_eq!(flag.cast("true"), Some(Scalar::Bool(true)));
        assert_eq!(flag.cast("1"), None);

        let list = QueryValue::list([1, 2]);
        assert_eq!(list.cast("2"), Some(Scalar::Num(2.0)));
        assert!(list.contains(&Scalar::Num(2.0)));
        assert!(!list.contains(&Scalar::Num(3.0)));

        assert_eq!(QueryValue::from("x").cast("7"), Some(Scalar::Str("7".into())));
    }

    #[test]
    fn scientific_notation() {
        let Some(Scalar::Num(n)) = QueryValue::from(0).cast("1.5e-3") else {
            panic!("expected a number");
        };

        assert_relative_eq!(n, 0.0015);
    }

    #[test]
    fn display() {
        assert_eq!(QueryValue::from(5).to_string(), "5");
        assert_eq!(QueryValue::from(0.5).to_string(), "0.5");
        assert_eq!(QueryValue::list(["a", "b"]).to_string(), "[a, b]");
        assert_eq!(QueryValue::from(None::<bool>).to_string(), "null");
    }
}
