pub type DakodaResult<T> = Result<T, DakodaError>;

macro_rules! bail {
    ($($arg:tt)*) => {{
        return Err($crate::error::DakodaError::Other(format!($($arg)*)));
    }};
}

pub(crate) use bail;

#[derive(Debug, thiserror::Error)]
pub enum DakodaError {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("no structured metadata found in the document")]
    MissingMetadata,

    #[error("no documents in the corpus")]
    EmptyCorpus,

    #[error("unknown document '{0}'")]
    UnknownDocument(String),

    #[error("unknown view '{0}'")]
    UnknownView(String),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("{0}")]
    Other(String),
}

impl DakodaError {
    #[inline]
    pub(crate) fn other<T: ToString>(s: T) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DakodaError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.into())
    }
}
