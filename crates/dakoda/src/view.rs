//! Access to the views of a document and their annotations.

use std::fmt::{self, Display};

use crate::error::DakodaResult;
use crate::uima::{short_name, Cas, FeatureStructure, View};

pub const T_TOKEN: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Token";
pub const T_LEMMA: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Lemma";
pub const T_POS: &str = "de.tudarmstadt.ukp.dkpro.core.api.lexmorph.type.pos.POS";
pub const T_SENT: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Sentence";
pub const T_MORPH: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.lexmorph.type.morph.Morpheme";
pub const T_DEP: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.syntax.type.dependency.Dependency";
pub const T_META: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.metadata.type.MetaDataStringField";
pub const T_STAGE: &str = "org.dakoda.Stage";

/// Pseudo feature denoting the text covered by an annotation.
pub const COVERED_TEXT: &str = "coveredText";

/// The feature holding the primary value of each indexed type.
pub const PRIMARY_FIELDS: [(&str, &str); 5] = [
    (T_TOKEN, COVERED_TEXT),
    (T_LEMMA, "value"),
    (T_POS, "PosValue"),
    (T_SENT, COVERED_TEXT),
    (T_STAGE, "name"),
];

/// Returns the name of the primary field of a type, if any.
pub fn primary_field(type_name: &str) -> Option<&'static str> {
    PRIMARY_FIELDS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, field)| *field)
}

/// Structured access to one view of a document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    view: View<'a>,
}

impl<'a> DocumentView<'a> {
    pub fn new(cas: &'a Cas, name: &str) -> DakodaResult<Self> {
        Ok(Self {
            view: cas.view(name)?,
        })
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        self.view.name()
    }

    /// Returns the text (sofa string) of the view.
    #[inline]
    pub fn text(&self) -> &'a str {
        self.view.sofa_string()
    }

    /// Returns the underlying CAS view.
    #[inline]
    pub fn raw(&self) -> View<'a> {
        self.view
    }

    /// Returns all annotations of a type (or any of its subtypes).
    pub fn annotation(
        &self,
        type_name: &str,
    ) -> DakodaResult<Vec<TypeAnnotation>> {
        Ok(self
            .view
            .select(type_name)?
            .into_iter()
            .map(|fs| TypeAnnotation::new(type_name, fs, &self.view))
            .collect())
    }

    pub fn tokens(&self) -> DakodaResult<Vec<TypeAnnotation>> {
        self.annotation(T_TOKEN)
    }

    pub fn sentences(&self) -> DakodaResult<Vec<TypeAnnotation>> {
        self.annotation(T_SENT)
    }

    pub fn lemmas(&self) -> DakodaResult<Vec<TypeAnnotation>> {
        self.annotation(T_LEMMA)
    }

    pub fn pos_tags(&self) -> DakodaResult<Vec<TypeAnnotation>> {
        self.annotation(T_POS)
    }

    pub fn stages(&self) -> DakodaResult<Vec<TypeAnnotation>> {
        self.annotation(T_STAGE)
    }
}

/// An annotation together with its covered text and primary value.
///
/// Two annotations are equal if they have the same type, span and
/// value; the covered text is not compared.
#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    type_name: String,
    text: String,
    value: Option<String>,
    span: (usize, usize),
}

impl TypeAnnotation {
    /// Wraps a feature structure selected as `type_name`. The value is
    /// looked up using the primary field of `type_name`.
    pub fn new(type_name: &str, fs: &FeatureStructure, view: &View) -> Self {
        let text = view.covered_text(fs).to_string();
        let value = match primary_field(type_name) {
            Some(COVERED_TEXT) => Some(text.clone()),
            Some(field) => fs.get(field).map(String::from),
            None => None,
        };

        Self {
            type_name: type_name.into(),
            text,
            value,
            span: fs.span().unwrap_or_default(),
        }
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the text covered by the annotation.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the primary value of the annotation, e.g. the tag of a
    /// POS annotation.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[inline]
    pub fn span(&self) -> (usize, usize) {
        self.span
    }
}

impl PartialEq for TypeAnnotation {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.span == other.span
            && self.value == other.value
    }
}

impl Eq for TypeAnnotation {}

impl Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = short_name(&self.type_name);
        match (primary_field(&self.type_name), &self.value) {
            (Some(COVERED_TEXT), _) | (_, None) => {
                write!(f, "{name}({})", self.text)
            }
            (_, Some(value)) => write!(f, "{name}({}[{value}])", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uima::{dakoda_typesystem, load_cas_from_str};

    type TestResult = anyhow::Result<()>;

    const XMI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore"
    xmlns:type="http:///de/tudarmstadt/ukp/dkpro/core/api/segmentation/type.ecore"
    xmlns:pos="http:///de/tudarmstadt/ukp/dkpro/core/api/lexmorph/type/pos.ecore"
    xmlns:dakoda="http:///org/dakoda.ecore" xmi:version="2.0">
  <type:Sentence xmi:id="2" sofa="1" begin="0" end="12"/>
  <type:Token xmi:id="3" sofa="1" begin="0" end="3"/>
  <type:Token xmi:id="4" sofa="1" begin="4" end="7"/>
  <type:Token xmi:id="5" sofa="1" begin="8" end="12"/>
  <type:Lemma xmi:id="6" sofa="1" begin="4" end="7" value="sein"/>
  <pos:POS_NOUN xmi:id="7" sofa="1" begin="8" end="12" PosValue="NN"/>
  <pos:POS xmi:id="8" sofa="1" begin="4" end="7" PosValue="VAFIN"/>
  <dakoda:Stage xmi:id="9" sofa="1" begin="0" end="12" name="stage1" level="1"/>
  <cas:Sofa xmi:id="1" sofaNum="1" sofaID="ctok" mimeType="text" sofaString="Das ist Haus"/>
  <cas:View sofa="1" members="2 3 4 5 6 7 8 9"/>
</xmi:XMI>"#;

    #[test]
    fn document_view() -> TestResult {
        let cas = load_cas_from_str(XMI, dakoda_typesystem()?)?;
        let view = DocumentView::new(&cas, "ctok")?;

        assert_eq!(view.name(), "ctok");
        assert_eq!(view.text(), "Das ist Haus");

        let tokens: Vec<String> =
            view.tokens()?.iter().map(|t| t.text().into()).collect();
        assert_eq!(tokens, vec!["Das", "ist", "Haus"]);

        let pos = view.pos_tags()?;
        assert_eq!(pos.len(), 2);
        assert_eq!(pos[0].value(), Some("VAFIN"));
        assert_eq!(pos[1].to_string(), "POS(Haus[NN])");

        assert_eq!(view.lemmas()?[0].to_string(), "Lemma(ist[sein])");
        assert_eq!(view.sentences()?[0].span(), (0, 12));
        assert_eq!(view.stages()?[0].value(), Some("stage1"));
        assert!(DocumentView::new(&cas, "mixtral_th1").is_err());
        Ok(())
    }

    #[test]
    fn annotation_display_and_equality() -> TestResult {
        let cas = load_cas_from_str(XMI, dakoda_typesystem()?)?;
        let view = DocumentView::new(&cas, "ctok")?;

        let tokens = view.tokens()?;
        assert_eq!(tokens[2].to_string(), "Token(Haus)");
        assert_eq!(tokens[2].value(), Some("Haus"));
        assert_ne!(tokens[1], tokens[2]);
        assert_eq!(tokens[2], view.tokens()?[2]);

        let morph = view.annotation(T_MORPH)?;
        assert!(morph.is_empty());
        Ok(())
    }

    #[test]
    fn primary_fields() {
        assert_eq!(primary_field(T_TOKEN), Some(COVERED_TEXT));
        assert_eq!(primary_field(T_POS), Some("PosValue"));
        assert_eq!(primary_field(T_DEP), None);
    }
}
