//! Constraints of the metadata scheme which can't be expressed by the
//! types of the records.
//!
//! The checks run over the serialized record. A rule is bound to the
//! (unique) name of a field and applies to every record which has a
//! field of that name, no matter how deeply it is nested.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use hashbrown::HashMap;
use regex::Regex;
use serde_json::Value;

use crate::vocab::{vocabulary, VocabKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// The field must not be null.
    Required,
    /// A list with at least `n` items.
    MinOccurs(usize),
    /// A list with at most `n` items.
    MaxOccurs(usize),
    /// String values must match the whole pattern.
    Pattern(&'static str),
    /// Numeric values must be greater than the bound.
    MinExclusive(f64),
    /// Numeric values must be within the (inclusive) bounds.
    Range(f64, f64),
    /// String values must be part of a vocabulary.
    Vocabulary(VocabKind),
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "value is required"),
            Self::MinOccurs(n) => write!(f, "expected at least {n} item(s)"),
            Self::MaxOccurs(n) => write!(f, "expected at most {n} item(s)"),
            Self::Pattern(p) => write!(f, "value must match '{p}'"),
            Self::MinExclusive(min) => {
                write!(f, "value must be greater than {min}")
            }
            Self::Range(min, max) => {
                write!(f, "value must be between {min} and {max}")
            }
            Self::Vocabulary(kind) => write!(f, "unknown {kind} value"),
        }
    }
}

/// A field which doesn't satisfy a constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: String,
    pub constraint: Constraint,
    pub value: Option<String>,
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)?;
        if let Some(ref value) = self.value {
            write!(f, " (got '{value}')")?;
        }

        Ok(())
    }
}

const MAIL: &str = r"([^@]+@[^\.]+\..+)|(notAvailable)";
const YEAR_RANGE: &str = r"\d{4}-\d{4}";

const RULES: &[(&str, Constraint)] = &[
    ("corpus", Constraint::Required),
    ("production_setting", Constraint::Required),
    ("task", Constraint::Required),
    ("learner", Constraint::Required),
    ("text", Constraint::Required),
    ("annotation_type", Constraint::MinOccurs(1)),
    ("corpus_admin_name", Constraint::MinOccurs(1)),
    ("corpus_admin_author", Constraint::MinOccurs(1)),
    ("corpus_admin_contactMail", Constraint::MinOccurs(1)),
    ("corpus_admin_contactMail", Constraint::Pattern(MAIL)),
    ("corpus_admin_contributor_dkd", Constraint::MinOccurs(11)),
    ("corpus_admin_contributor_dkd", Constraint::MaxOccurs(11)),
    ("corpus_admin_dateOfPublication", Constraint::Pattern(r"\d{4}-\d{2}")),
    ("corpus_admin_documentation", Constraint::MinOccurs(1)),
    ("corpus_admin_fileFormat", Constraint::MinOccurs(1)),
    ("corpus_design_l1Language", Constraint::MinOccurs(1)),
    (
        "corpus_design_l1Language",
        Constraint::Vocabulary(VocabKind::LanguageNameDe),
    ),
    ("corpus_design_l1Type", Constraint::MinOccurs(1)),
    ("corpus_design_targetLanguage", Constraint::MinOccurs(1)),
    (
        "corpus_design_targetLanguage",
        Constraint::Vocabulary(VocabKind::DkdTrgLang),
    ),
    ("corpus_design_targetLanguageType", Constraint::MinOccurs(1)),
    ("corpus_design_timeOfDataCollection", Constraint::Pattern(YEAR_RANGE)),
    (
        "corpus_proficiency_learner_AssignmentInstrument",
        Constraint::MinOccurs(1),
    ),
    ("corpus_project_contact_orig", Constraint::Pattern(MAIL)),
    ("corpus_project_duration_orig", Constraint::Pattern(YEAR_RANGE)),
    ("corpus_project_head_dkd", Constraint::MinOccurs(2)),
    ("corpus_project_head_dkd", Constraint::MaxOccurs(2)),
    ("corpus_project_institution_dkd", Constraint::MinOccurs(1)),
    ("corpus_project_institution_orig", Constraint::MinOccurs(1)),
    ("corpus_subcorpus_targetLanguage", Constraint::MinOccurs(1)),
    (
        "corpus_subcorpus_targetLanguage",
        Constraint::Vocabulary(VocabKind::DkdTrgLang),
    ),
    ("task_interaction_conceptualMode", Constraint::MinOccurs(1)),
    (
        "task_interaction_ExpectedRhetoricalFunctions",
        Constraint::MinOccurs(1),
    ),
    ("task_interaction_mode", Constraint::MinOccurs(1)),
    ("task_interaction_participants", Constraint::MinOccurs(1)),
    (
        "task_interaction_participants",
        Constraint::Pattern(r"\d{1,2}-\d{1,2}"),
    ),
    ("task_comparison", Constraint::MinOccurs(1)),
    ("task_durationMinutes", Constraint::Pattern(r"\d{1,3}-\d{1,3}")),
    ("task_levelMax", Constraint::MinOccurs(1)),
    ("task_levelMin", Constraint::MinOccurs(1)),
    ("task_stimulusType", Constraint::MinOccurs(1)),
    ("productionSetting_setting", Constraint::MinOccurs(1)),
    ("learner_id_orig", Constraint::MinOccurs(1)),
    ("learner_lCount", Constraint::MinExclusive(0.0)),
    ("language", Constraint::MinOccurs(1)),
    ("learner_socio_majorSubject", Constraint::MinOccurs(1)),
    ("learner_socio_profession", Constraint::MinOccurs(1)),
    (
        "learner_socio_birthplace",
        Constraint::Vocabulary(VocabKind::CountryType),
    ),
    (
        "learner_socio_country",
        Constraint::Vocabulary(VocabKind::CountryType),
    ),
    ("learner_language_status", Constraint::MinOccurs(1)),
    ("learner_language_dominantWordOrder", Constraint::MinOccurs(1)),
    ("learner_language_dominantWordOrder", Constraint::MaxOccurs(2)),
    (
        "learner_language_group",
        Constraint::Vocabulary(VocabKind::LanguageGroup),
    ),
    (
        "learner_language_parentL1",
        Constraint::Vocabulary(VocabKind::LanguageCode),
    ),
    ("learner_language_exposure_onset", Constraint::MinExclusive(0.0)),
    (
        "learner_language_exposure_durationOfInstruction",
        Constraint::MinExclusive(0.0),
    ),
    (
        "learner_language_exposure_durationOfUse",
        Constraint::MinExclusive(0.0),
    ),
    (
        "learner_language_exposure_monthsSpentEnvironment",
        Constraint::MinExclusive(0.0),
    ),
    (
        "learner_language_exposure_placeAcquisition",
        Constraint::Vocabulary(VocabKind::CountryTypeOrNa),
    ),
    (
        "learner_language_proficiency_assignmentMethod",
        Constraint::MinOccurs(1),
    ),
    (
        "learner_language_proficiency_cTestPercent",
        Constraint::Range(0.0, 100.0),
    ),
    ("text_learner_ageProduction", Constraint::MinExclusive(0.0)),
    ("text_learner_role", Constraint::MinOccurs(1)),
    ("text_timeOfCreation", Constraint::Pattern(YEAR_RANGE)),
    ("text_topicAutom", Constraint::MinOccurs(1)),
    ("name_de", Constraint::Vocabulary(VocabKind::LanguageNameDe)),
    ("name_en", Constraint::Vocabulary(VocabKind::LanguageNameEn)),
    ("iso_code_639_3", Constraint::Vocabulary(VocabKind::LanguageCode)),
    ("group", Constraint::Vocabulary(VocabKind::LanguageGroup)),
];

/// Placeholders which are valid for every field.
const NA_VALUES: [&str; 2] = ["notAvailable", "notApplicable"];

fn patterns() -> &'static HashMap<&'static str, Regex> {
    static PATTERNS: OnceLock<HashMap<&'static str, Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(_, constraint)| match constraint {
                Constraint::Pattern(p) => Some(*p),
                _ => None,
            })
            .filter_map(|p| match Regex::new(&format!("^(?:{p})$")) {
                Ok(re) => Some((p, re)),
                Err(e) => {
                    log::error!("invalid pattern '{p}': {e}");
                    None
                }
            })
            .collect()
    })
}

/// Checks a serialized metadata record. The violations are reported
/// in document order.
pub(crate) fn validate(value: &Value) -> Vec<Violation> {
    let mut violations = vec![];
    visit(value, true, &mut violations);
    violations
}

fn visit(value: &Value, root: bool, violations: &mut Vec<Violation>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                for (_, constraint) in RULES.iter().filter(|(k, _)| *k == key.as_str()) {
                    if *constraint == Constraint::Required && !root {
                        continue;
                    }

                    check(key, value, *constraint, violations);
                }

                visit(value, false, violations);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, false, violations);
            }
        }
        _ => (),
    }
}

fn check(
    field: &str,
    value: &Value,
    constraint: Constraint,
    violations: &mut Vec<Violation>,
) {
    let mut report = |value: Option<String>| {
        violations.push(Violation {
            field: field.into(),
            constraint,
            value,
        })
    };

    match constraint {
        Constraint::Required => {
            if value.is_null() {
                report(None);
            }
        }
        Constraint::MinOccurs(n) => {
            let len = occurrences(value);
            if len < n {
                report(Some(len.to_string()));
            }
        }
        Constraint::MaxOccurs(n) => {
            let len = occurrences(value);
            if len > n {
                report(Some(len.to_string()));
            }
        }
        _ => {
            for item in items(value) {
                if !satisfies(item, constraint) {
                    report(Some(super::leaf_to_string(item)));
                }
            }
        }
    }
}

#[inline]
fn occurrences(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

fn items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => vec![],
        Value::Array(items) => items.iter().collect(),
        _ => vec![value],
    }
}

fn satisfies(value: &Value, constraint: Constraint) -> bool {
    match (constraint, value) {
        (_, Value::String(s)) if NA_VALUES.contains(&s.as_str()) => true,
        (Constraint::Pattern(p), Value::String(s)) => patterns()
            .get(p)
            .map(|re| re.is_match(s))
            .unwrap_or(true),
        (Constraint::MinExclusive(min), Value::Number(n)) => {
            n.as_f64().map(|x| x > min).unwrap_or(false)
        }
        (Constraint::Range(min, max), Value::Number(n)) => n
            .as_f64()
            .map(|x| (min..=max).contains(&x))
            .unwrap_or(false),
        (Constraint::Vocabulary(kind), Value::String(s)) => vocabulary(kind)
            .map(|vocab| vocab.contains_value(s))
            .unwrap_or(false),
        _ => true,
    }
}
