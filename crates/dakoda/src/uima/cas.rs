use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use hashbrown::HashMap;

use super::typesystem::{short_name, TypeSystem};
use crate::error::{DakodaError, DakodaResult};

/// Name of the view every CAS starts with.
pub const INITIAL_VIEW: &str = "_InitialView";

/// A feature structure of a CAS.
///
/// Primitive features are kept as strings; references to other
/// feature structures are stored as the (decimal) id of the target
/// and can be resolved with [`Cas::get`]. Offsets are character
/// offsets into the sofa string of the feature structure's view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureStructure {
    pub(crate) id: u64,
    pub(crate) type_name: String,
    pub(crate) sofa: Option<u64>,
    pub(crate) begin: Option<usize>,
    pub(crate) end: Option<usize>,
    pub(crate) features: BTreeMap<String, String>,
}

impl FeatureStructure {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn short_type_name(&self) -> &str {
        short_name(&self.type_name)
    }

    #[inline]
    pub fn begin(&self) -> Option<usize> {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Returns the `(begin, end)` span of an annotation.
    pub fn span(&self) -> Option<(usize, usize)> {
        Some((self.begin?, self.end?))
    }

    /// Returns the value of a feature. Offsets are not features; use
    /// [`FeatureStructure::span`] instead.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, &str)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Display for FeatureStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.short_type_name(), self.id)?;
        if let Some((begin, end)) = self.span() {
            write!(f, "[{begin}..{end}]")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ViewData {
    pub(crate) name: String,
    pub(crate) sofa_id: u64,
    pub(crate) sofa_string: String,
    pub(crate) mime_type: Option<String>,
    pub(crate) members: Vec<usize>,
    /// Byte offset of every character of the sofa string, followed by
    /// the length of the string.
    boundaries: Vec<usize>,
}

impl ViewData {
    pub(crate) fn new(
        name: String,
        sofa_id: u64,
        sofa_string: String,
        mime_type: Option<String>,
    ) -> Self {
        let mut boundaries: Vec<usize> =
            sofa_string.char_indices().map(|(i, _)| i).collect();
        boundaries.push(sofa_string.len());

        Self {
            name,
            sofa_id,
            sofa_string,
            mime_type,
            members: vec![],
            boundaries,
        }
    }

    #[inline]
    pub(crate) fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    fn slice(&self, begin: usize, end: usize) -> &str {
        let n = self.char_len();
        let (begin, end) = (begin.min(n), end.min(n));
        if begin >= end {
            return "";
        }

        &self.sofa_string[self.boundaries[begin]..self.boundaries[end]]
    }
}

/// A Common Analysis Structure: a set of views, each with a subject
/// of analysis (sofa) and the feature structures indexed in it.
#[derive(Debug, Clone)]
pub struct Cas {
    typesystem: Arc<TypeSystem>,
    structures: Vec<FeatureStructure>,
    ids: HashMap<u64, usize>,
    views: Vec<ViewData>,
}

impl Cas {
    pub(crate) fn from_parts(
        typesystem: Arc<TypeSystem>,
        structures: Vec<FeatureStructure>,
        views: Vec<ViewData>,
    ) -> Self {
        let ids = structures
            .iter()
            .enumerate()
            .map(|(i, fs)| (fs.id, i))
            .collect();

        Self {
            typesystem,
            structures,
            ids,
            views,
        }
    }

    #[inline]
    pub fn typesystem(&self) -> &TypeSystem {
        &self.typesystem
    }

    #[inline]
    pub(crate) fn shared_typesystem(&self) -> Arc<TypeSystem> {
        self.typesystem.clone()
    }

    /// Returns the number of feature structures.
    #[inline]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Looks up a feature structure by its id.
    pub fn get(&self, id: u64) -> Option<&FeatureStructure> {
        self.ids.get(&id).map(|i| &self.structures[*i])
    }

    /// Resolves a reference feature of `fs`.
    pub fn resolve(
        &self,
        fs: &FeatureStructure,
        feature: &str,
    ) -> Option<&FeatureStructure> {
        self.get(fs.get(feature)?.parse().ok()?)
    }

    pub fn view_names(&self) -> Vec<&str> {
        self.views.iter().map(|v| v.name.as_str()).collect()
    }

    #[inline]
    pub fn has_view(&self, name: &str) -> bool {
        self.views.iter().any(|v| v.name == name)
    }

    pub fn views(&self) -> impl Iterator<Item = View<'_>> {
        self.views.iter().map(|data| View { cas: self, data })
    }

    pub fn view(&self, name: &str) -> DakodaResult<View<'_>> {
        self.views
            .iter()
            .find(|v| v.name == name)
            .map(|data| View { cas: self, data })
            .ok_or_else(|| DakodaError::UnknownView(name.into()))
    }

    /// Returns the initial view, or the first view if the CAS has no
    /// view named `_InitialView`.
    pub fn initial_view(&self) -> DakodaResult<View<'_>> {
        match self.view(INITIAL_VIEW) {
            Ok(view) => Ok(view),
            Err(_) => self
                .views()
                .next()
                .ok_or_else(|| DakodaError::UnknownView(INITIAL_VIEW.into())),
        }
    }

    /// Returns the sofa string of the initial view.
    pub fn sofa_string(&self) -> DakodaResult<&str> {
        Ok(self.initial_view()?.sofa_string())
    }

    /// Selects feature structures of a type (or any subtype) from the
    /// initial view.
    pub fn select(&self, type_name: &str) -> DakodaResult<Vec<&FeatureStructure>> {
        self.initial_view()?.select(type_name)
    }

    /// Selects feature structures of a type (or any subtype) regardless
    /// of the view they are indexed in. The result is ordered by id.
    pub fn select_all(
        &self,
        type_name: &str,
    ) -> DakodaResult<Vec<&FeatureStructure>> {
        self.check_type(type_name)?;

        let mut result: Vec<&FeatureStructure> = self
            .structures
            .iter()
            .filter(|fs| self.typesystem.is_subtype(&fs.type_name, type_name))
            .collect();
        result.sort_by_key(|fs| fs.id);
        Ok(result)
    }

    fn check_type(&self, type_name: &str) -> DakodaResult<()> {
        if !self.typesystem.contains(type_name) {
            return Err(DakodaError::UnknownType(type_name.into()));
        }

        Ok(())
    }
}

/// A view of a [`Cas`].
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    cas: &'a Cas,
    data: &'a ViewData,
}

impl<'a> View<'a> {
    #[inline]
    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    #[inline]
    pub fn sofa_string(&self) -> &'a str {
        &self.data.sofa_string
    }

    #[inline]
    pub fn mime_type(&self) -> Option<&'a str> {
        self.data.mime_type.as_deref()
    }

    #[inline]
    pub fn cas(&self) -> &'a Cas {
        self.cas
    }

    /// Returns the number of feature structures indexed in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &'a FeatureStructure> {
        let structures = &self.cas.structures;
        self.data.members.iter().map(move |i| &structures[*i])
    }

    /// Returns the members of type `type_name` or any of its subtypes
    /// ordered by begin (ascending), end (descending) and id.
    pub fn select(
        &self,
        type_name: &str,
    ) -> DakodaResult<Vec<&'a FeatureStructure>> {
        self.cas.check_type(type_name)?;

        let ts = self.cas.typesystem();
        let mut result: Vec<&FeatureStructure> = self
            .members()
            .filter(|fs| ts.is_subtype(&fs.type_name, type_name))
            .collect();

        result.sort_by(|a, b| {
            a.begin
                .unwrap_or_default()
                .cmp(&b.begin.unwrap_or_default())
                .then_with(|| {
                    b.end.unwrap_or_default().cmp(&a.end.unwrap_or_default())
                })
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(result)
    }

    /// Returns the text covered by an annotation. Feature structures
    /// without offsets cover the empty string.
    pub fn covered_text(&self, fs: &FeatureStructure) -> &'a str {
        match fs.span() {
            Some((begin, end)) => self.data.slice(begin, end),
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covered_text_uses_char_offsets() {
        let view = ViewData::new(
            INITIAL_VIEW.into(),
            1,
            "Grüße aus Köln".into(),
            None,
        );

        assert_eq!(view.char_len(), 14);
        assert_eq!(view.slice(0, 5), "Grüße");
        assert_eq!(view.slice(10, 14), "Köln");
        assert_eq!(view.slice(10, 99), "Köln");
        assert_eq!(view.slice(5, 5), "");
        assert_eq!(view.slice(7, 3), "");
    }
}
