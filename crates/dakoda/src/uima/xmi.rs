//! XMI (de)serialization of a CAS.
//!
//! The reader understands the XMI written by DKPro Core and INCEpTION:
//! a flat list of feature structures below the root element, followed
//! by `cas:Sofa` and `cas:View` elements. Element namespaces encode
//! the package of a type (`http:///org/dakoda.ecore` is the package
//! `org.dakoda`).

use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::cas::{Cas, FeatureStructure, ViewData};
use super::typesystem::TypeSystem;
use crate::error::{bail, DakodaError, DakodaResult};

const XMI_ID: &str = "xmi:id";
const T_NULL: &str = "uima.cas.NULL";
const T_SOFA: &str = "uima.cas.Sofa";
const T_VIEW: &str = "uima.cas.View";

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    strict: bool,
}

impl LoadOptions {
    /// In strict mode feature structures of a type unknown to the type
    /// system are an error. Otherwise they are skipped.
    pub fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn load_str(
        &self,
        xmi: &str,
        ts: Arc<TypeSystem>,
    ) -> DakodaResult<Cas> {
        let doc = RawDocument::parse(xmi)?;
        doc.into_cas(ts, self)
    }

    pub fn load_file<P: AsRef<Path>>(
        &self,
        path: P,
        ts: Arc<TypeSystem>,
    ) -> DakodaResult<Cas> {
        let path = path.as_ref();
        log::debug!("loading CAS from {}", path.display());
        self.load_str(&read_to_string(path)?, ts)
    }
}

/// Loads a CAS from an XMI string (lenient).
pub fn load_cas_from_str(xmi: &str, ts: Arc<TypeSystem>) -> DakodaResult<Cas> {
    LoadOptions::default().load_str(xmi, ts)
}

/// Loads a CAS from an XMI file (lenient).
pub fn load_cas_from_file<P: AsRef<Path>>(
    path: P,
    ts: Arc<TypeSystem>,
) -> DakodaResult<Cas> {
    LoadOptions::default().load_file(path, ts)
}

#[derive(Debug, Default)]
struct RawElement {
    type_name: String,
    attrs: Vec<(String, String)>,
    children: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct RawDocument {
    structures: Vec<RawElement>,
    sofas: Vec<RawElement>,
    views: Vec<RawElement>,
}

impl RawElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn id(&self) -> DakodaResult<u64> {
        match self.attr(XMI_ID).map(str::parse::<u64>) {
            Some(Ok(id)) => Ok(id),
            _ => bail!("{} without a valid {XMI_ID}", self.type_name),
        }
    }

    fn number(&self, name: &str) -> DakodaResult<Option<u64>> {
        match self.attr(name) {
            None => Ok(None),
            Some(value) => match value.parse::<u64>() {
                Ok(n) => Ok(Some(n)),
                Err(_) => bail!(
                    "invalid {name} '{value}' in {} {}",
                    self.type_name,
                    self.attr(XMI_ID).unwrap_or("?")
                ),
            },
        }
    }
}

fn qname(raw: &[u8]) -> (Option<String>, String) {
    let raw = String::from_utf8_lossy(raw);
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix.into()), local.into()),
        None => (None, raw.to_string()),
    }
}

fn attributes(e: &BytesStart) -> DakodaResult<Vec<(String, String)>> {
    let mut attrs = vec![];
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        attrs.push((key, attr.unescape_value()?.to_string()));
    }

    Ok(attrs)
}

/// Maps a namespace URI to a type package (`http:///uima/cas.ecore`
/// becomes `uima.cas`).
fn namespace_to_package(uri: &str) -> String {
    uri.trim_start_matches("http:///")
        .trim_end_matches(".ecore")
        .replace('/', ".")
}

impl RawDocument {
    fn parse(xmi: &str) -> DakodaResult<Self> {
        let mut reader = Reader::from_str(xmi);
        reader.config_mut().trim_text(false);

        let mut doc = RawDocument::default();
        let mut namespaces: HashMap<String, String> = HashMap::new();
        let mut pending: Option<RawElement> = None;
        let mut child: Option<(String, String)> = None;
        let mut depth = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    match depth {
                        0 => read_namespaces(&e, &mut namespaces)?,
                        1 => {
                            pending = Some(raw_element(&e, &namespaces)?)
                        }
                        2 => {
                            let (_, local) = qname(e.name().as_ref());
                            child = Some((local, String::new()));
                        }
                        _ => (),
                    }

                    depth += 1;
                }
                Event::Empty(e) => match depth {
                    0 => read_namespaces(&e, &mut namespaces)?,
                    1 => doc.push(raw_element(&e, &namespaces)?),
                    _ => (),
                },
                Event::Text(e) => {
                    if let (3, Some((_, text))) = (depth, child.as_mut()) {
                        text.push_str(&e.unescape()?);
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    match depth {
                        1 => {
                            if let Some(element) = pending.take() {
                                doc.push(element);
                            }
                        }
                        2 => {
                            if let (Some(element), Some(kv)) =
                                (pending.as_mut(), child.take())
                            {
                                element.children.push(kv);
                            }
                        }
                        _ => (),
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if namespaces.is_empty() {
            bail!("not an XMI document (no namespace declarations)");
        }

        Ok(doc)
    }

    fn push(&mut self, element: RawElement) {
        match element.type_name.as_str() {
            T_NULL => (),
            T_SOFA => self.sofas.push(element),
            T_VIEW => self.views.push(element),
            _ => self.structures.push(element),
        }
    }

    fn into_cas(
        self,
        ts: Arc<TypeSystem>,
        options: &LoadOptions,
    ) -> DakodaResult<Cas> {
        let mut views = vec![];
        let mut sofas = self
            .sofas
            .iter()
            .map(|sofa| -> DakodaResult<(u64, &RawElement)> {
                Ok((sofa.number("sofaNum")?.unwrap_or(0), sofa))
            })
            .collect::<DakodaResult<Vec<_>>>()?;
        sofas.sort_by_key(|(num, _)| *num);

        for (_, sofa) in sofas {
            let name = match sofa.attr("sofaID") {
                Some(name) => name.to_string(),
                None => bail!("sofa without sofaID"),
            };

            views.push(ViewData::new(
                name,
                sofa.id()?,
                sofa.attr("sofaString").unwrap_or_default().to_string(),
                sofa.attr("mimeType").map(String::from),
            ));
        }

        let offsets: HashMap<u64, Vec<usize>> = views
            .iter()
            .map(|v| (v.sofa_id, utf16_to_char_offsets(&v.sofa_string)))
            .collect();

        let mut structures = vec![];
        let mut skipped: HashSet<String> = HashSet::new();

        for element in self.structures {
            if !ts.contains(&element.type_name) {
                if options.strict {
                    return Err(DakodaError::UnknownType(element.type_name));
                }

                if !skipped.contains(&element.type_name) {
                    log::warn!(
                        "skipping feature structures of unknown type {}",
                        element.type_name
                    );
                    skipped.insert(element.type_name.clone());
                }

                continue;
            }

            structures.push(feature_structure(element, &offsets)?);
        }

        let positions: HashMap<u64, usize> = structures
            .iter()
            .enumerate()
            .map(|(i, fs): (usize, &FeatureStructure)| (fs.id, i))
            .collect();
        let mut listed = vec![false; structures.len()];

        for raw in self.views.iter() {
            let Some(sofa) = raw.number("sofa")? else {
                continue;
            };

            let Some(view) = views.iter_mut().find(|v| v.sofa_id == sofa)
            else {
                log::warn!("view references unknown sofa {sofa}");
                continue;
            };

            let members = raw.attr("members").unwrap_or_default();
            for member in members.split_whitespace() {
                let pos = member
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| positions.get(&id));

                if let Some(pos) = pos {
                    view.members.push(*pos);
                    listed[*pos] = true;
                }
            }
        }

        for (pos, fs) in structures.iter().enumerate() {
            if listed[pos] {
                continue;
            }

            if let Some(view) = fs
                .sofa
                .and_then(|sofa| views.iter_mut().find(|v| v.sofa_id == sofa))
            {
                view.members.push(pos);
            }
        }

        Ok(Cas::from_parts(ts, structures, views))
    }
}

fn read_namespaces(
    e: &BytesStart,
    namespaces: &mut HashMap<String, String>,
) -> DakodaResult<()> {
    for (key, value) in attributes(e)? {
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            namespaces.insert(prefix.into(), value);
        }
    }

    Ok(())
}

fn raw_element(
    e: &BytesStart,
    namespaces: &HashMap<String, String>,
) -> DakodaResult<RawElement> {
    let (prefix, local) = qname(e.name().as_ref());
    let type_name = match prefix {
        Some(prefix) => match namespaces.get(&prefix) {
            Some(uri) => format!("{}.{local}", namespace_to_package(uri)),
            None => bail!("undeclared namespace prefix '{prefix}'"),
        },
        None => local,
    };

    Ok(RawElement {
        type_name,
        attrs: attributes(e)?,
        children: vec![],
    })
}

/// Returns, for every UTF-16 offset into `s`, the corresponding
/// character offset. Offsets in the middle of a surrogate pair map to
/// the character they belong to.
fn utf16_to_char_offsets(s: &str) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(s.len() + 1);
    let mut n = 0;

    for (i, c) in s.chars().enumerate() {
        for _ in 0..c.len_utf16() {
            offsets.push(i);
        }

        n = i + 1;
    }

    offsets.push(n);
    offsets
}

fn feature_structure(
    element: RawElement,
    offsets: &HashMap<u64, Vec<usize>>,
) -> DakodaResult<FeatureStructure> {
    let id = element.id()?;
    let sofa = element.number("sofa")?;
    let mut begin = element.number("begin")?.map(|n| n as usize);
    let mut end = element.number("end")?.map(|n| n as usize);

    if let Some(map) = sofa.and_then(|sofa| offsets.get(&sofa)) {
        let convert = |offset: usize| match map.get(offset) {
            Some(pos) => *pos,
            None => {
                log::warn!(
                    "offset {offset} of {} {id} is out of bounds",
                    element.type_name
                );
                map.last().copied().unwrap_or_default()
            }
        };

        begin = begin.map(convert);
        end = end.map(convert);
    }

    let mut features = BTreeMap::new();
    for (key, value) in element.attrs {
        if matches!(key.as_str(), XMI_ID | "sofa" | "begin" | "end") {
            continue;
        }

        features.insert(key, value);
    }

    for (key, value) in element.children {
        features
            .entry(key)
            .and_modify(|v: &mut String| {
                v.push(' ');
                v.push_str(&value);
            })
            .or_insert_with(|| value.clone());
    }

    Ok(FeatureStructure {
        id,
        type_name: element.type_name,
        sofa,
        begin,
        end,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uima::typesystem::dakoda_typesystem;
    use crate::view::{T_POS, T_TOKEN};

    type TestResult = anyhow::Result<()>;

    const XMI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore"
    xmlns:type="http:///de/tudarmstadt/ukp/dkpro/core/api/segmentation/type.ecore"
    xmlns:pos="http:///de/tudarmstadt/ukp/dkpro/core/api/lexmorph/type/pos.ecore"
    xmlns:custom="http:///org/example.ecore" xmi:version="2.0">
  <cas:NULL xmi:id="0"/>
  <type:Token xmi:id="10" sofa="1" begin="0" end="3" pos="20"/>
  <type:Token xmi:id="11" sofa="1" begin="4" end="8"/>
  <pos:POS_NOUN xmi:id="20" sofa="1" begin="0" end="3" PosValue="NN"/>
  <custom:Thing xmi:id="30" sofa="1" begin="0" end="1"/>
  <type:Token xmi:id="40" sofa="2" begin="0" end="4"/>
  <type:Sentence xmi:id="50" sofa="1" begin="0" end="8">
    <id>s1</id>
  </type:Sentence>
  <cas:Sofa xmi:id="2" sofaNum="2" sofaID="ctok" mimeType="text" sofaString="Haus"/>
  <cas:Sofa xmi:id="1" sofaNum="1" sofaID="_InitialView" mimeType="text" sofaString="&#128512;a Haus"/>
  <cas:View sofa="1" members="10 11 20 30"/>
  <cas:View sofa="2" members="40"/>
</xmi:XMI>"#;

    #[test]
    fn load_views_and_offsets() -> TestResult {
        let cas = load_cas_from_str(XMI, dakoda_typesystem()?)?;
        assert_eq!(cas.view_names(), vec!["_InitialView", "ctok"]);

        let view = cas.initial_view()?;
        assert_eq!(view.sofa_string(), "\u{1F600}a Haus");

        let tokens = view.select(T_TOKEN)?;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].span(), Some((0, 2)));
        assert_eq!(view.covered_text(tokens[0]), "\u{1F600}a");
        assert_eq!(tokens[1].span(), Some((3, 7)));
        assert_eq!(view.covered_text(tokens[1]), "Haus");

        let pos = cas.resolve(tokens[0], "pos").unwrap();
        assert_eq!(pos.get("PosValue"), Some("NN"));

        let ctok = cas.view("ctok")?;
        assert_eq!(ctok.select(T_TOKEN)?.len(), 1);
        assert_eq!(ctok.mime_type(), Some("text"));
        Ok(())
    }

    #[test]
    fn select_includes_subtypes() -> TestResult {
        let cas = load_cas_from_str(XMI, dakoda_typesystem()?)?;
        let pos = cas.select(T_POS)?;

        assert_eq!(pos.len(), 1);
        assert_eq!(pos[0].short_type_name(), "POS_NOUN");
        assert!(matches!(
            cas.select("org.example.Thing"),
            Err(DakodaError::UnknownType(_))
        ));
        Ok(())
    }

    #[test]
    fn unlisted_members_fall_back_to_sofa() -> TestResult {
        let cas = load_cas_from_str(XMI, dakoda_typesystem()?)?;
        let sentences = cas.select(
            "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Sentence",
        )?;

        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].get("id"), Some("s1"));
        Ok(())
    }

    #[test]
    fn strict_mode_rejects_unknown_types() -> TestResult {
        let result = LoadOptions::default()
            .strict(true)
            .load_str(XMI, dakoda_typesystem()?);

        assert!(matches!(result, Err(DakodaError::UnknownType(name))
            if name == "org.example.Thing"));
        Ok(())
    }

    #[test]
    fn namespace_packages() {
        assert_eq!(namespace_to_package("http:///uima/cas.ecore"), "uima.cas");
        assert_eq!(
            namespace_to_package("http:///org/dakoda.ecore"),
            "org.dakoda"
        );
    }

    #[test]
    fn utf16_offsets() {
        assert_eq!(utf16_to_char_offsets("a\u{1F600}b"), vec![0, 1, 1, 2, 3]);
        assert_eq!(utf16_to_char_offsets(""), vec![0]);
    }

    #[test]
    fn reject_non_xmi() -> TestResult {
        let ts = dakoda_typesystem()?;
        assert!(load_cas_from_str("<a><b/></a>", ts).is_err());
        Ok(())
    }
}
