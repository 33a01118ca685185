//! Static assets compiled into the library.
//!
//! The resource bundle consists of the project logo, the UIMA type
//! system used by DAKODA corpora and the CSV type mappings from which
//! the country and language vocabularies are built.

/// The UIMA type system description shared by all DAKODA corpora.
const TYPESYSTEM: &str = include_str!("../res/dakoda_typesystem.xml");

/// The DAKODA logo (SVG).
const LOGO: &[u8] = include_bytes!("../res/dakoda_logo.svg");

const TYPE_MAPPINGS: &[(&str, &str)] = &[
    (
        "CountryType",
        include_str!("../res/type_mappings/CountryType.csv"),
    ),
    (
        "CountryTypeOrNa",
        include_str!("../res/type_mappings/CountryTypeOrNa.csv"),
    ),
    (
        "DkdTrgLang",
        include_str!("../res/type_mappings/DkdTrgLang.csv"),
    ),
    (
        "LanguageCode",
        include_str!("../res/type_mappings/LanguageCode.csv"),
    ),
    (
        "LanguageGroup",
        include_str!("../res/type_mappings/LanguageGroup.csv"),
    ),
    (
        "LanguageNameDe",
        include_str!("../res/type_mappings/LanguageNameDe.csv"),
    ),
    (
        "LanguageNameEn",
        include_str!("../res/type_mappings/LanguageNameEn.csv"),
    ),
];

/// Returns the XML source of the bundled type system.
#[inline]
pub fn typesystem_xml() -> &'static str {
    TYPESYSTEM
}

/// Returns the raw bytes of the bundled logo.
#[inline]
pub fn logo() -> &'static [u8] {
    LOGO
}

/// Returns the CSV source of the type mapping `name` (e.g.
/// `"CountryType"`), or `None` if no such mapping is bundled.
pub fn type_mapping(name: &str) -> Option<&'static str> {
    TYPE_MAPPINGS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, csv)| *csv)
}

/// Returns the names of all bundled type mappings.
pub fn type_mapping_names() -> impl Iterator<Item = &'static str> {
    TYPE_MAPPINGS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets() {
        assert!(typesystem_xml().contains("typeSystemDescription"));
        assert!(logo().starts_with(b"<svg"));
    }

    #[test]
    fn type_mapping_lookup() {
        assert!(type_mapping("CountryType").unwrap().contains("DEU"));
        assert!(type_mapping("LanguageCode").unwrap().contains("deu"));
        assert!(type_mapping("Klingon").is_none());
        assert_eq!(type_mapping_names().count(), 7);
    }
}
