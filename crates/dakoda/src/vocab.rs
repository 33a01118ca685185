//! Country and language vocabularies.
//!
//! Vocabularies are read from the bundled two-column CSV mappings
//! (`key,value`, no header). The values are what appears in the
//! metadata of a document, the keys are symbolic names (`DEU`,
//! `NOT_AVAILABLE`, ...).

use std::fmt::{self, Display};
use std::io::Read;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{bail, DakodaError, DakodaResult};
use crate::resources;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabKind {
    CountryType,
    CountryTypeOrNa,
    DkdTrgLang,
    LanguageCode,
    LanguageGroup,
    LanguageNameDe,
    LanguageNameEn,
}

impl VocabKind {
    pub const ALL: [VocabKind; 7] = [
        Self::CountryType,
        Self::CountryTypeOrNa,
        Self::DkdTrgLang,
        Self::LanguageCode,
        Self::LanguageGroup,
        Self::LanguageNameDe,
        Self::LanguageNameEn,
    ];

    /// Returns the name of the type mapping the vocabulary is read
    /// from.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CountryType => "CountryType",
            Self::CountryTypeOrNa => "CountryTypeOrNa",
            Self::DkdTrgLang => "DkdTrgLang",
            Self::LanguageCode => "LanguageCode",
            Self::LanguageGroup => "LanguageGroup",
            Self::LanguageNameDe => "LanguageNameDe",
            Self::LanguageNameEn => "LanguageNameEn",
        }
    }

    #[inline]
    fn slot(&self) -> usize {
        *self as usize
    }
}

impl Display for VocabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An ordered list of `(key, value)` pairs.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<(String, String)>,
}

impl Vocabulary {
    /// Reads a vocabulary from CSV data. Rows with less than two
    /// columns or an empty key are skipped.
    pub fn from_reader<R: Read>(rdr: R) -> DakodaResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let mut entries = vec![];
        for result in reader.records() {
            let record = result?;
            if record.len() < 2 {
                continue;
            }

            let key = record[0].trim();
            let value = record[1].trim();
            if !key.is_empty() {
                entries.push((key.to_string(), value.to_string()));
            }
        }

        Ok(Self { entries })
    }

    /// Reads one of the bundled vocabularies.
    pub fn bundled(kind: VocabKind) -> DakodaResult<Self> {
        match resources::type_mapping(kind.name()) {
            Some(data) => Self::from_reader(data.as_bytes()),
            None => bail!("missing type mapping '{kind}'"),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn contains_value(&self, value: &str) -> bool {
        self.entries.iter().any(|(_, v)| v == value)
    }

    pub fn key_of(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v == value)
            .map(|(k, _)| k.as_str())
    }

    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

static VOCABULARIES: [OnceLock<Vocabulary>; 7] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

/// Returns the process-wide instance of a bundled vocabulary. The
/// vocabulary is parsed on first access.
pub fn vocabulary(kind: VocabKind) -> DakodaResult<&'static Vocabulary> {
    let cell = &VOCABULARIES[kind.slot()];
    if let Some(vocab) = cell.get() {
        return Ok(vocab);
    }

    let vocab = Vocabulary::bundled(kind)?;
    log::debug!("loaded vocabulary {kind} ({} entries)", vocab.len());
    Ok(cell.get_or_init(|| vocab))
}

macro_rules! vocab_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a value without checking it against the
            /// vocabulary. Use [`FromStr`] for a checked conversion.
            pub fn new<S: Into<String>>(value: S) -> Self {
                Self(value.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn vocabulary() -> DakodaResult<&'static Vocabulary> {
                vocabulary(VocabKind::$name)
            }

            /// Returns true if the value is part of the vocabulary.
            pub fn is_known(&self) -> bool {
                Self::vocabulary()
                    .map(|vocab| vocab.contains_value(&self.0))
                    .unwrap_or(false)
            }

            /// Returns the symbolic key of the value, if known.
            pub fn key(&self) -> Option<&'static str> {
                Self::vocabulary().ok()?.key_of(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DakodaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = Self::new(s);
                if !value.is_known() {
                    bail!(
                        "invalid {} value '{s}'",
                        VocabKind::$name
                    );
                }

                Ok(value)
            }
        }
    };
}

vocab_type! {
    /// Three-letter country code defined in ISO 3166-1 (upper case).
    CountryType
}

vocab_type! {
    /// A country code or `notAvailable`.
    CountryTypeOrNa
}

vocab_type! {
    /// A target language of a DAKODA corpus.
    DkdTrgLang
}

vocab_type! {
    /// Three-letter language code defined in ISO 639-3 (lower case).
    LanguageCode
}

vocab_type! {
    LanguageGroup
}

vocab_type! {
    /// German name of a language.
    LanguageNameDe
}

vocab_type! {
    /// English name of a language.
    LanguageNameEn
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn vocabulary_from_reader() -> TestResult {
        let data = "A,a\n\n,skipped\nonly-key\n B , b \n";
        let vocab = Vocabulary::from_reader(data.as_bytes())?;

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.value_of("B"), Some("b"));
        assert_eq!(vocab.key_of("a"), Some("A"));
        assert!(!vocab.contains_value("skipped"));
        Ok(())
    }

    #[test]
    fn bundled_vocabularies() -> TestResult {
        for kind in VocabKind::ALL {
            assert!(!vocabulary(kind)?.is_empty(), "{kind}");
        }

        assert_eq!(vocabulary(VocabKind::CountryType)?.len(), 249);
        Ok(())
    }

    #[test]
    fn country_codes_are_case_sensitive() {
        assert!(CountryType::new("DEU").is_known());
        assert!(!CountryType::new("deu").is_known());
        assert!(CountryType::from_str("deu").is_err());
        assert_eq!(CountryType::new("DEU").key(), Some("DEU"));

        assert!(CountryTypeOrNa::new("notAvailable").is_known());
        assert!(!CountryType::new("notAvailable").is_known());
    }

    #[test]
    fn language_codes() -> TestResult {
        let code = LanguageCode::from_str("deu")?;
        assert_eq!(code.key(), Some("DEU"));
        assert_eq!(code.to_string(), "deu");
        assert!(LanguageCode::from_str("DEU").is_err());

        assert!(LanguageNameDe::new("Deutsch").is_known());
        assert!(LanguageNameEn::new("German").is_known());
        Ok(())
    }

    #[test]
    fn serde_transparent() -> TestResult {
        let code: LanguageCode = serde_json::from_str("\"tur\"")?;
        assert_eq!(code.as_str(), "tur");
        assert_eq!(serde_json::to_string(&code)?, "\"tur\"");
        Ok(())
    }
}
