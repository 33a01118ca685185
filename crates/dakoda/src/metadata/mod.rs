//! The structured metadata of a DAKODA document.
//!
//! Every document carries exactly one metadata record, stored as JSON
//! in a `MetaDataStringField` annotation with the key
//! `structured_metadata`. The record is typed by the scheme in
//! [`scheme`]; closed value sets live in [`enums`] and the
//! "value or not available" unions in [`values`].

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DakodaError, DakodaResult};
use crate::uima::Cas;
use crate::view::T_META;

pub mod enums;
mod flatten;
pub mod scheme;
pub mod validate;
pub mod values;

pub use enums::*;
pub use scheme::*;
pub use validate::{Constraint, Violation};
pub use values::*;

/// The metadata record of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaData {
    pub corpus: Option<Corpus>,
    pub production_setting: Option<ProductionSetting>,
    pub task: Option<TaskBlock>,
    pub learner: Option<Learner>,
    pub text: Option<TextProperties>,
    pub target_hypothesis: Vec<TargetHypothesis>,
    pub annotation: Vec<Annotation>,
    pub annotator: Vec<Annotator>,
}

impl MetaData {
    /// The key of the `MetaDataStringField` holding the record.
    pub const CAS_KEY: &'static str = "structured_metadata";

    pub fn from_json_str(s: &str) -> DakodaResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> DakodaResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Extracts the metadata record from a CAS.
    ///
    /// # Errors
    ///
    /// Returns [`DakodaError::MissingMetadata`] if the CAS has no
    /// metadata field with the key `structured_metadata`.
    pub fn from_cas(cas: &Cas) -> DakodaResult<Self> {
        let field = cas
            .select_all(T_META)?
            .into_iter()
            .find(|fs| fs.get("key") == Some(Self::CAS_KEY))
            .ok_or(DakodaError::MissingMetadata)?;

        let value = field.get("value").ok_or(DakodaError::MissingMetadata)?;
        Self::from_json_str(value)
    }

    /// Serializes the record as pretty-printed JSON.
    pub fn to_json_string(&self) -> DakodaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json_file<P: AsRef<Path>>(&self, path: P) -> DakodaResult<()> {
        let out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(out, self)?;
        Ok(())
    }

    /// Returns the leaves of the record as `(field, value)` pairs.
    ///
    /// Null values are skipped, nested records are recursed into and
    /// the items of a list are reported one by one under the name of
    /// the list.
    pub fn iter_flat(
        &self,
    ) -> DakodaResult<impl Iterator<Item = (String, Value)>> {
        let value = serde_json::to_value(self)?;
        Ok(flatten::flatten(&value).into_iter())
    }

    /// Builds a one-row data frame from the flattened record. If a
    /// field occurs more than once, the last value wins.
    pub fn to_frame(&self) -> DakodaResult<DataFrame> {
        let mut row = serde_json::Map::new();
        for (key, value) in self.iter_flat()? {
            row.insert(key, value);
        }

        let columns: Vec<Column> = row
            .into_iter()
            .map(|(key, value)| match value {
                Value::Bool(b) => Column::new(key.into(), [b]),
                Value::Number(n) if n.is_i64() => {
                    Column::new(key.into(), [n.as_i64()])
                }
                Value::Number(n) => Column::new(key.into(), [n.as_f64()]),
                Value::String(s) => Column::new(key.into(), [s]),
                other => Column::new(key.into(), [other.to_string()]),
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Checks the record against the constraints of the scheme.
    pub fn validate(&self) -> DakodaResult<Vec<Violation>> {
        let value = serde_json::to_value(self)?;
        Ok(validate::validate(&value))
    }
}

/// Renders a leaf value the way it is stored in the search index.
pub(crate) fn leaf_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::uima::{dakoda_typesystem, load_cas_from_str};

    type TestResult = anyhow::Result<()>;

    const META: &str = r#"{
        "corpus": {
            "administrative": {
                "corpus_admin_acronym": "SWIKO",
                "corpus_admin_name": ["Schweizer Korpus"]
            }
        },
        "learner": {
            "learner_id": "L01",
            "learner_textCount": 2,
            "language": [
                { "learner_language_status": ["L1"] },
                { "learner_language_status": ["L2"] }
            ]
        },
        "text": {
            "learner": { "text_learner_ageProduction": 14.5 }
        }
    }"#;

    #[test]
    fn json_roundtrip() -> TestResult {
        let meta = MetaData::from_json_str(META)?;
        let admin = meta
            .corpus
            .as_ref()
            .and_then(|c| c.administrative.as_ref())
            .unwrap();

        assert_eq!(admin.corpus_admin_acronym.as_deref(), Some("SWIKO"));
        assert_eq!(MetaData::from_json_str(&meta.to_json_string()?)?, meta);
        Ok(())
    }

    #[test]
    fn flat_iteration() -> TestResult {
        let meta = MetaData::from_json_str(META)?;
        let flat: Vec<(String, Value)> = meta.iter_flat()?.collect();

        assert!(flat.contains(&(
            "corpus_admin_acronym".into(),
            json!("SWIKO")
        )));
        assert!(flat.contains(&("learner_textCount".into(), json!(2))));

        let status: Vec<&Value> = flat
            .iter()
            .filter(|(k, _)| k == "learner_language_status")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(status, vec![&json!("L1"), &json!("L2")]);
        assert!(flat.iter().all(|(_, v)| !v.is_null()));
        Ok(())
    }

    #[test]
    fn one_row_frame() -> TestResult {
        let meta = MetaData::from_json_str(META)?;
        let df = meta.to_frame()?;

        assert_eq!(df.height(), 1);
        let status = df.column("learner_language_status")?;
        assert_eq!(status.as_materialized_series().str()?.get(0), Some("L2"));

        let count = df.column("learner_textCount")?;
        assert_eq!(count.as_materialized_series().i64()?.get(0), Some(2));

        let age = df.column("text_learner_ageProduction")?;
        assert_eq!(age.as_materialized_series().f64()?.get(0), Some(14.5));
        Ok(())
    }

    #[test]
    fn metadata_from_cas() -> TestResult {
        let xmi = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore"
    xmlns:type="http:///de/tudarmstadt/ukp/dkpro/core/api/metadata/type.ecore" xmi:version="2.0">
  <type:MetaDataStringField xmi:id="2" sofa="1" begin="0" end="0" key="other" value="x"/>
  <type:MetaDataStringField xmi:id="3" sofa="1" begin="0" end="0" key="structured_metadata" value="{}"/>
  <cas:Sofa xmi:id="1" sofaNum="1" sofaID="_InitialView" mimeType="text" sofaString="Hallo"/>
  <cas:View sofa="1" members="2 3"/>
</xmi:XMI>"#,
            r#"{&quot;learner&quot;: {&quot;learner_id&quot;: &quot;L01&quot;}}"#
        );

        let cas = load_cas_from_str(&xmi, dakoda_typesystem()?)?;
        let meta = MetaData::from_cas(&cas)?;
        assert_eq!(meta.learner.unwrap().learner_id.as_deref(), Some("L01"));
        Ok(())
    }

    #[test]
    fn missing_metadata() -> TestResult {
        let xmi = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore" xmi:version="2.0">
  <cas:Sofa xmi:id="1" sofaNum="1" sofaID="_InitialView" mimeType="text" sofaString="Hallo"/>
  <cas:View sofa="1" members=""/>
</xmi:XMI>"#;

        let cas = load_cas_from_str(xmi, dakoda_typesystem()?)?;
        assert!(matches!(
            MetaData::from_cas(&cas),
            Err(DakodaError::MissingMetadata)
        ));
        Ok(())
    }
}
