//! A small UIMA implementation: type systems, CAS and XMI.

mod cas;
mod typesystem;
mod xmi;

pub use cas::{Cas, FeatureStructure, View, INITIAL_VIEW};
pub use typesystem::{
    dakoda_typesystem, load_dakoda_typesystem, short_name, Feature,
    TypeDescription, TypeSystem, ANNOTATION, ANNOTATION_BASE,
    DOCUMENT_ANNOTATION, TOP,
};
pub use xmi::{load_cas_from_file, load_cas_from_str, LoadOptions};
