use std::fs::read_to_string;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DakodaError, DakodaResult};
use crate::resources;

pub const TOP: &str = "uima.cas.TOP";
pub const ANNOTATION_BASE: &str = "uima.cas.AnnotationBase";
pub const ANNOTATION: &str = "uima.tcas.Annotation";
pub const DOCUMENT_ANNOTATION: &str = "uima.tcas.DocumentAnnotation";
pub const SOFA: &str = "uima.cas.Sofa";

const PRIMITIVES: &[&str] = &[
    "uima.cas.Boolean",
    "uima.cas.Byte",
    "uima.cas.Short",
    "uima.cas.Integer",
    "uima.cas.Long",
    "uima.cas.Float",
    "uima.cas.Double",
    "uima.cas.String",
];

const ARRAYS: &[&str] = &[
    "uima.cas.FSArray",
    "uima.cas.BooleanArray",
    "uima.cas.ByteArray",
    "uima.cas.ShortArray",
    "uima.cas.IntegerArray",
    "uima.cas.LongArray",
    "uima.cas.FloatArray",
    "uima.cas.DoubleArray",
    "uima.cas.StringArray",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub range_type: String,
    pub element_type: Option<String>,
}

impl Feature {
    fn new(name: &str, range_type: &str) -> Self {
        Self {
            name: name.into(),
            range_type: range_type.into(),
            element_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDescription {
    pub name: String,
    pub supertype: Option<String>,
    pub description: Option<String>,
    pub features: Vec<Feature>,
}

impl TypeDescription {
    fn builtin(name: &str, supertype: Option<&str>) -> Self {
        Self {
            name: name.into(),
            supertype: supertype.map(String::from),
            ..Default::default()
        }
    }

    fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    /// Returns the last segment of the type name.
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

/// Returns the last segment of a fully qualified type name.
#[inline]
pub fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// A UIMA type system.
///
/// The built-in UIMA types are always present; further types are read
/// from a `typeSystemDescription` document.
#[derive(Debug, Clone)]
pub struct TypeSystem {
    types: HashMap<String, TypeDescription>,
}

impl Default for TypeSystem {
    fn default() -> Self {
        let mut types = vec![
            TypeDescription::builtin(TOP, None),
            TypeDescription::builtin(ANNOTATION_BASE, Some(TOP))
                .with_features(vec![Feature::new("sofa", SOFA)]),
            TypeDescription::builtin(ANNOTATION, Some(ANNOTATION_BASE))
                .with_features(vec![
                    Feature::new("begin", "uima.cas.Integer"),
                    Feature::new("end", "uima.cas.Integer"),
                ]),
            TypeDescription::builtin(DOCUMENT_ANNOTATION, Some(ANNOTATION))
                .with_features(vec![Feature::new(
                    "language",
                    "uima.cas.String",
                )]),
            TypeDescription::builtin(SOFA, Some(TOP)).with_features(vec![
                Feature::new("sofaNum", "uima.cas.Integer"),
                Feature::new("sofaID", "uima.cas.String"),
                Feature::new("mimeType", "uima.cas.String"),
                Feature::new("sofaString", "uima.cas.String"),
            ]),
            TypeDescription::builtin("uima.cas.ArrayBase", Some(TOP)),
        ];

        types.extend(
            PRIMITIVES
                .iter()
                .map(|name| TypeDescription::builtin(name, Some(TOP))),
        );
        types.extend(ARRAYS.iter().map(|name| {
            TypeDescription::builtin(name, Some("uima.cas.ArrayBase"))
        }));

        Self {
            types: types
                .into_iter()
                .map(|td| (td.name.clone(), td))
                .collect(),
        }
    }
}

impl TypeSystem {
    /// Parses a `typeSystemDescription` document.
    pub fn from_xml(xml: &str) -> DakodaResult<Self> {
        let mut ts = Self::default();
        for td in parse_type_descriptions(xml)? {
            ts.insert(td);
        }

        let unresolved: Vec<(String, String)> = ts
            .types
            .values()
            .filter_map(|td| match td.supertype {
                Some(ref st) if !ts.contains(st) => {
                    Some((td.name.clone(), st.clone()))
                }
                _ => None,
            })
            .collect();

        for (name, supertype) in unresolved {
            log::warn!(
                "supertype {supertype} of {name} is unknown, using {TOP}"
            );

            if let Some(td) = ts.types.get_mut(&name) {
                td.supertype = Some(TOP.into());
            }
        }

        Ok(ts)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> DakodaResult<Self> {
        Self::from_xml(&read_to_string(path)?)
    }

    /// Adds a type description. An existing description of the same
    /// type is replaced.
    pub fn insert(&mut self, td: TypeDescription) {
        self.types.insert(td.name.clone(), td);
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&TypeDescription> {
        self.types.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the names of all types, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns `true` if a value of type `name` is a primitive value
    /// and not a feature structure.
    pub fn is_primitive(&self, name: &str) -> bool {
        PRIMITIVES.contains(&name)
    }

    /// Returns the chain of supertypes of `name`, starting with the
    /// type itself and ending with `uima.cas.TOP`.
    pub fn ancestors<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut chain = vec![];
        let mut current = self.get(name);

        while let Some(td) = current {
            if chain.contains(&td.name.as_str()) {
                break;
            }

            chain.push(td.name.as_str());
            current = td.supertype.as_deref().and_then(|st| self.get(st));
        }

        chain
    }

    /// Returns `true` if `child` equals `parent` or inherits from it.
    pub fn is_subtype(&self, child: &str, parent: &str) -> bool {
        self.ancestors(child).contains(&parent)
    }

    /// Returns the names of all types inheriting from `parent`,
    /// including `parent` itself.
    pub fn subtypes(&self, parent: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .keys()
            .map(String::as_str)
            .filter(|name| self.is_subtype(name, parent))
            .collect();
        names.sort_unstable();
        names
    }

    /// Resolves a feature of a type, following the supertype chain.
    pub fn feature(&self, type_name: &str, name: &str) -> Option<&Feature> {
        self.ancestors(type_name).into_iter().find_map(|ancestor| {
            self.get(ancestor)?.features.iter().find(|f| f.name == name)
        })
    }

    /// Returns all features of a type, inherited ones first.
    pub fn features(&self, type_name: &str) -> Vec<&Feature> {
        let mut features = vec![];
        for ancestor in self.ancestors(type_name).into_iter().rev() {
            if let Some(td) = self.get(ancestor) {
                features.extend(td.features.iter());
            }
        }

        features
    }
}

fn parse_type_descriptions(xml: &str) -> DakodaResult<Vec<TypeDescription>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut descriptions = vec![];
    let mut path: Vec<String> = vec![];
    let mut current: Option<TypeDescription> = None;
    let mut feature: Option<Feature> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name =
                    String::from_utf8_lossy(e.local_name().as_ref())
                        .to_string();
                match name.as_str() {
                    "typeDescription" => {
                        current = Some(TypeDescription::default())
                    }
                    "featureDescription" => {
                        feature = Some(Feature::new("", ""))
                    }
                    _ => (),
                }

                path.push(name);
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"typeDescription" => {
                        if let Some(td) = current.take() {
                            if td.name.is_empty() {
                                return Err(DakodaError::other(
                                    "type description without a name",
                                ));
                            }

                            descriptions.push(td);
                        }
                    }
                    b"featureDescription" => {
                        if let (Some(td), Some(f)) =
                            (current.as_mut(), feature.take())
                        {
                            td.features.push(f);
                        }
                    }
                    _ => (),
                }

                path.pop();
            }
            Event::Text(e) => {
                let text = e.unescape()?.to_string();
                let n = path.len();
                if n < 2 {
                    continue;
                }

                let (parent, elem) = (path[n - 2].as_str(), &path[n - 1]);
                match (parent, elem.as_str(), &mut current, &mut feature) {
                    ("featureDescription", "name", _, Some(f)) => {
                        f.name = text
                    }
                    ("featureDescription", "rangeTypeName", _, Some(f)) => {
                        f.range_type = text
                    }
                    ("featureDescription", "elementType", _, Some(f)) => {
                        f.element_type = Some(text)
                    }
                    ("typeDescription", "name", Some(td), _) => {
                        td.name = text
                    }
                    ("typeDescription", "supertypeName", Some(td), _) => {
                        td.supertype = Some(text)
                    }
                    ("typeDescription", "description", Some(td), _) => {
                        td.description = Some(text)
                    }
                    _ => (),
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    Ok(descriptions)
}

/// Parses the type system shared by all DAKODA corpora.
pub fn load_dakoda_typesystem() -> DakodaResult<TypeSystem> {
    TypeSystem::from_xml(resources::typesystem_xml())
}

static DAKODA_TYPESYSTEM: OnceLock<Arc<TypeSystem>> = OnceLock::new();

/// Returns a shared instance of the DAKODA type system, which is
/// parsed on first access.
pub fn dakoda_typesystem() -> DakodaResult<Arc<TypeSystem>> {
    if let Some(ts) = DAKODA_TYPESYSTEM.get() {
        return Ok(ts.clone());
    }

    let ts = Arc::new(load_dakoda_typesystem()?);
    Ok(DAKODA_TYPESYSTEM.get_or_init(|| ts).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{T_POS, T_STAGE, T_TOKEN};

    type TestResult = anyhow::Result<()>;

    #[test]
    fn builtin_types() {
        let ts = TypeSystem::default();
        assert!(ts.contains(TOP));
        assert!(ts.is_subtype(DOCUMENT_ANNOTATION, ANNOTATION_BASE));
        assert!(ts.is_primitive("uima.cas.String"));
        assert!(!ts.is_primitive(ANNOTATION));
        assert_eq!(ts.feature(ANNOTATION, "sofa").unwrap().range_type, SOFA);
    }

    #[test]
    fn dakoda_types() -> TestResult {
        let ts = load_dakoda_typesystem()?;
        let noun = "de.tudarmstadt.ukp.dkpro.core.api.lexmorph.type.pos.POS_NOUN";

        assert!(ts.contains(T_TOKEN));
        assert!(ts.is_subtype(noun, T_POS));
        assert!(ts.is_subtype(noun, ANNOTATION));
        assert!(!ts.is_subtype(T_POS, noun));
        assert!(ts.subtypes(T_POS).contains(&noun));

        let feature = ts.feature(noun, "PosValue").unwrap();
        assert_eq!(feature.range_type, "uima.cas.String");
        assert!(ts.feature(noun, "begin").is_some());
        assert!(ts.feature(noun, "lemma").is_none());

        let stage = ts.get(T_STAGE).unwrap();
        assert_eq!(stage.short_name(), "Stage");
        assert!(stage.description.is_some());

        let names: Vec<&str> = ts
            .features(T_STAGE)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["sofa", "begin", "end", "name", "level"]);
        Ok(())
    }

    #[test]
    fn unknown_supertype() -> TestResult {
        let ts = TypeSystem::from_xml(
            r#"<typeSystemDescription>
                <types>
                  <typeDescription>
                    <name>a.B</name>
                    <supertypeName>a.Missing</supertypeName>
                  </typeDescription>
                </types>
            </typeSystemDescription>"#,
        )?;

        assert_eq!(ts.get("a.B").unwrap().supertype.as_deref(), Some(TOP));
        assert_eq!(short_name("a.B"), "B");
        Ok(())
    }

    #[test]
    fn shared_instance() -> TestResult {
        let a = dakoda_typesystem()?;
        let b = dakoda_typesystem()?;
        assert!(Arc::ptr_eq(&a, &b));
        Ok(())
    }
}
