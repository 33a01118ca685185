//! Closed value lists of the metadata scheme.
//!
//! Every variant (de)serializes as the string used in the DAKODA
//! metadata. Most lists contain an explicit `notAvailable` value; the
//! unions "value or not available" are modelled in
//! [`crate::metadata::values`].

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{bail, DakodaError};

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// All values in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant,)+];

            /// Returns the string used in the metadata.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DakodaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    _ => bail!(
                        "invalid {} value '{s}'",
                        stringify!($name)
                    ),
                }
            }
        }
    };
}

string_enum! {
    /// Coarse CEFR levels; A1/A2 are merged, so are the B and C
    /// levels.
    CoarseCefrLevel {
        A => "A",
        B => "B",
        C => "C",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// License types by which a corpus may be available, if at all.
    ///
    /// * `closed`: access only for members of the DAKODA project
    /// * `restricted`: access restricted to members of German
    ///   academic institutions
    /// * `open`: all CC-licenses
    CorpusAvailabilityType {
        Closed => "closed",
        Restricted => "restricted",
        SpecialRestrictions => "special restrictions",
        Open => "open",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    CorpusGroup {
        Cdlk => "CDLK",
        KiezDeutschKorpus => "KiezDeutsch-Korpus",
        Disko => "DISKO",
        EuracKorpora => "EURAC-Korpora",
        Falko => "Falko",
        FdLex => "FD-Lex",
        HaMaTaC => "HaMaTaC",
        HaMoTiC => "HaMoTiC",
        NotApplicable => "notApplicable",
    }
}

string_enum! {
    DakodaProjectDuration {
        Y2022To2025 => "2022-2025",
    }
}

string_enum! {
    /// The setting in which the data was produced. An official
    /// language test is one performed by an approved language
    /// assessment body.
    DataProductionSetting {
        EducationalSetting => "educational setting",
        Naturalistic => "naturalistic",
        OfficialLanguageTest => "officialLanguageTest",
        ResearchProject => "research project",
        LanguageCourse => "language course",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// Conceptual mode in which the corpus data was produced.
    DataProductionSettingConceptualMode {
        Spoken => "spoken",
        Written => "written",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// Medial mode in which the corpus data was produced.
    DataProductionSettingMode {
        Spoken => "spoken",
        Written => "written",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// A person working for the DAKODA project.
    DkdContributor {
        JamilaBlaesing => "Jamila Bläsing",
        LuiseBoettcher => "Luise Böttcher",
        ShannyDruker => "Shanny Druker",
        LisaLenort => "Lisa Lenort",
        AnnettePortmann => "Annette Portmann",
        ChristineRenker => "Christine Renker",
        JosefRuppenhofer => "Josef Ruppenhofer",
        MatthiasSchwendemann => "Matthias Schwendemann",
        IuliaSucutardean => "Iulia Sucutardean",
        KatrinWisniewski => "Katrin Wisniewski",
        TorstenZesch => "Torsten Zesch",
    }
}

string_enum! {
    DkdInstitution {
        UniversitaetLeipzig => "Universität Leipzig",
        FernUniversitaetHagen => "FernUniversität in Hagen",
    }
}

string_enum! {
    /// A principal investigator of the DAKODA project.
    DkdProjectHead {
        KatrinWisniewski => "Katrin Wisniewski",
        TorstenZesch => "Torsten Zesch",
    }
}

string_enum! {
    /// Full name of the DAKODA project.
    DkdProjectName {
        Datenkompetenzen => "Datenkompetenzen in DaF/DaZ: Exploration \
            sprachtechnologischer Ansätze zur Analyse von \
            L2-Erwerbsstufen in Lernerkorpora des Deutschen",
    }
}

string_enum! {
    /// The type of funding that supported the DAKODA project.
    DkdProjectType {
        Bmbf => "Bundesministerium für Bildung und Forschung (BMBF)",
    }
}

impl Default for DkdProjectType {
    fn default() -> Self {
        Self::Bmbf
    }
}

string_enum! {
    /// The education stage the learner is in at the time of data
    /// collection.
    EducationalStage {
        EarlyChildhood => "early childhood",
        Primary => "primary",
        LowerSecondary => "lower secondary",
        UpperSecondary => "upper secondary",
        PostSecondaryNonTertiary => "post-secondary non-tertiary",
        ShortCycleTertiary => "short-cycle tertiary",
        Bachelor => "Bachelor",
        Master => "Master",
        Doctorate => "Doctorate",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// Formality level of the task.
    FormalityType {
        Informal => "informal",
        UnmarkedToInformal => "unmarked to informal",
        Unmarked => "unmarked",
        UnmarkedToFormal => "unmarked to formal",
        Formal => "formal",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    Gender {
        Female => "female",
        Male => "male",
        NonBinary => "non-binary",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// The language combinations of the participants of an
    /// interaction.
    InteractionTypes {
        OnlyL1Speakers => "only L1-speakers",
        OnlyL2Speakers => "only L2 speakers",
        L1AndL2SpeakersMixed => "L1 and L2 speakers mixed",
        NotAvailable => "notAvailable",
        NotApplicable => "notApplicable",
    }
}

string_enum! {
    /// `mono` if all participants share one L1, `multi` otherwise.
    L1Constellation {
        Mono => "mono",
        Multi => "multi",
    }
}

string_enum! {
    LangStatus {
        L1 => "L1",
        L2 => "L2",
        TargetLanguage => "Target language",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// Age ranges associated with different types of language
    /// acquisition processes.
    LearnerAgeRange {
        Age0To3 => "0 bis 3, Erstspracherwerb",
        Age4To6 => "4 bis 6, Früher (kindlicher) Zweitspracherwerb",
        Age7To8 => "7 bis 8,(Später kindlicher) Zweitspracherwerb / \
            Fremdspracherwerb",
        Age9To12 => "9 bis 12, (später kindlicher) Zweitspracherwerb / \
            Fremdspracherwerb",
        Age12To18 => "12 bis 18, Zweitspracherwerb / Fremdspracherwerb \
            (von Jugendlichen und Erwachsenen)",
        Age19To35 => "19 bis 35, Zweitspracherwerb / Fremdspracherwerb \
            (von Jugendlichen und Erwachsenen)",
        AgeOver35 => "älter als 35, Zweitspracherwerb / \
            Fremdspracherwerb (von Jugendlichen und Erwachsenen)",
        Unclear => "unklar bzw. sonstige",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// Type of task used in collecting the data.
    LearnerTaskType {
        BookReview => "book review",
        Consultation => "consultation",
        Conversation => "conversation",
        Description => "description",
        Essay => "essay",
        Instruction => "instruction",
        Interview => "interview",
        Letter => "letter",
        MapTask => "map task",
        NarrowElicitationTask => "narrow elicitation task",
        PostInAForum => "post in a forum",
        ProblemSolving => "problem sovling",
        Report => "report",
        Story => "story",
        Summary => "summary",
        Translation => "translation",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// No value is available for a metadatum or the metadatum is not
    /// applicable.
    NaString {
        NotAvailable => "notAvailable",
        NotApplicable => "notApplicable",
    }
}

string_enum! {
    /// Possibilities for comparing tasks and time points: one or
    /// several (`m`) tasks, each done once (`1`) or repeatedly (`n`).
    PossibilitiesForComparisons {
        A1 => "A-1",
        AN => "A-n",
        MAN => "mA-n",
        MA1 => "mA-1",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    ProficiencyAssessmentMethod {
        IndependentInstrument => "independent instrument",
        TotalTestScore => "total test score",
        Other => "other",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    ProficiencyAssignmentMethod {
        LearnerCentred => "learner-centred",
        TextCentred => "text-centred",
        Automatic => "automatic",
        Unassigned => "none",
        NotAvailable => "notAvailable",
        NotApplicable => "notApplicable",
    }
}

impl Default for ProficiencyAssignmentMethod {
    fn default() -> Self {
        Self::Unassigned
    }
}

string_enum! {
    /// Method used for the proficiency assessment of a text.
    ProficiencyAssignmentMethodType {
        ScoreOnText => "score on text",
        TeachersEvaluation => "teacher's evaluation",
        PostHocAssignment => "post-hoc assignment",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// CEFR proficiency levels.
    ProficiencyLevel {
        A1 => "A1",
        A2 => "A2",
        B1 => "B1",
        B2 => "B2",
        C1 => "C1",
        C2 => "C2",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    RhetoricalFunctions {
        Applying => "applying",
        Arguing => "arguing",
        AskingForHelp => "asking for help",
        AskingForInformation => "asking for information",
        BuildASentence => "build a sentence",
        Comparing => "comparing",
        Complaining => "complaining",
        Describing => "describing",
        ExpressCongratulations => "express congratulations",
        GivingAdvice => "giving advice",
        Informing => "informing",
        Instructing => "instructing",
        Narrating => "narrating",
        OfferingSomething => "offering something",
        OrganiseMeeting => "organise meeting",
        QuestionAndAnswer => "question and answer",
        ReadingAloud => "reading aloud",
        Reporting => "reporting",
        Summarising => "summarising",
        Translating => "translating",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    StorageUnit {
        Kb => "KB",
        Mb => "MB",
        Gb => "GB",
        Tb => "TB",
        Pb => "PB",
    }
}

string_enum! {
    /// The study design under which the corpus data was produced.
    StudyDesign {
        Longitudinal => "longitudinal",
        PseudoLongitudinal => "pseudo-longitudinal",
        CrossSectional => "cross-sectional",
    }
}

string_enum! {
    /// Type of stimulus for the task.
    TaskStimulusType {
        Advertisement => "advertisement",
        Article => "article",
        Articles => "articles",
        Book => "book",
        Comic => "comic",
        DescriptionOfASituation => "description of a situation",
        Diagram => "diagram",
        Essay => "essay",
        ExtractFromDissertation => "extract from a doctoral dissertation",
        ExtractFromArticles => "extract from a doctoral articles",
        Figure => "figure",
        TextEditedForTeaching => "text edited for teaching",
        Form => "form",
        Interview => "interview",
        JobAdvertisement => "job advertisement",
        Letter => "letter",
        ListOfWordsOrExpressions => "list of words or expressions",
        Map => "map",
        OralInstructions => "oral instructions",
        Pictures => "picture(s)",
        Questionnaire => "questionnaire",
        Quote => "quote",
        SceneActedOut => "scene acted out",
        Talks => "talks",
        Video => "video",
        WrittenInstruction => "written instruction",
        NotAvailable => "notAvailable",
        NotApplicable => "notApplicable",
    }
}

string_enum! {
    /// Topic types that may be assigned to texts.
    TopicType {
        Domestic => "domestic",
        DailyActivities => "daily activities",
        BusinessWorkPlace => "business/work place",
        Science => "science",
        EducationAcademic => "education / academic",
        GovernmentLegalPolitics => "government / legal / politics",
        Religion => "religion",
        Sports => "sports",
        ArtEntertainment => "art / entertainement",
        Other => "other",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// How the learner was exposed to the target language.
    TrgLangInputType {
        WithoutControlledTeaching => "mainly without controlled \
            teaching processes",
        ControlledTeaching => "mainly in controlled teaching contexts",
        Hybrid => "hybrid",
        NotAvailable => "notAvailable",
    }
}

string_enum! {
    /// Dominant word order type according to WALS.
    WordOrderType {
        Sov => "SOV",
        Svo => "SVO",
        Vso => "VSO",
        SvoVso => "SVO ; VSO",
        SovSvo => "SOV; SVO",
        NoDominantOrder => "no dominant order",
        Unclear => "unclear",
        NotAvailable => "notAvailable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn proficiency_level_from_str() -> TestResult {
        assert_eq!(ProficiencyLevel::from_str("B1")?, ProficiencyLevel::B1);
        assert_eq!(
            ProficiencyLevel::from_str("notAvailable")?,
            ProficiencyLevel::NotAvailable
        );
        assert!(ProficiencyLevel::from_str("b1").is_err());
        Ok(())
    }

    #[test]
    fn continued_literals_are_single_spaced() {
        assert_eq!(
            TrgLangInputType::WithoutControlledTeaching.as_str(),
            "mainly without controlled teaching processes"
        );
        assert!(LearnerAgeRange::Age12To18
            .as_str()
            .ends_with("Fremdspracherwerb (von Jugendlichen und Erwachsenen)"));
        assert!(DkdProjectName::Datenkompetenzen
            .as_str()
            .contains("Ansätze zur Analyse von L2-Erwerbsstufen"));
    }

    #[test]
    fn serde_uses_metadata_strings() -> TestResult {
        let stage: EducationalStage =
            serde_json::from_str("\"post-secondary non-tertiary\"")?;
        assert_eq!(stage, EducationalStage::PostSecondaryNonTertiary);

        assert_eq!(
            serde_json::to_string(&ProficiencyAssignmentMethod::default())?,
            "\"none\""
        );
        assert!(serde_json::from_str::<Gender>("\"unknown\"").is_err());
        Ok(())
    }

    #[test]
    fn all_values() {
        assert_eq!(ProficiencyLevel::ALL.len(), 7);
        assert_eq!(DkdContributor::ALL.len(), 11);
        assert_eq!(Gender::ALL[2].to_string(), "non-binary");
    }
}
