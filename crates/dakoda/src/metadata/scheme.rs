//! Records of the DAKODA metadata scheme.
//!
//! Field names follow Rust conventions; the serialized names are the
//! keys used in the structured metadata of a document. Every record
//! deserializes from partial input, missing fields are `None` or
//! empty.

use serde::{Deserialize, Serialize};

use super::enums::*;
use super::values::{BoolOrNa, IntOrNa, NumberOrNa, NumberOrText};
use crate::vocab::{
    CountryType, CountryTypeOrNa, DkdTrgLang, LanguageCode, LanguageGroup,
    LanguageNameDe, LanguageNameEn,
};

/// An automatic or manual annotation layer of a text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    pub annotation_automatic: Option<bool>,
    pub annotation_corrected: Option<bool>,
    pub annotation_documentation: Option<serde_json::Value>,
    pub annotation_evaluation: Option<BoolOrNa>,
    pub annotation_tool: Option<String>,
    #[serde(rename = "annotation_toolVersion")]
    pub annotation_tool_version: Option<String>,
    #[serde(rename = "annotation_modelVersion")]
    pub annotation_model_version: Option<String>,
    pub annotation_type: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusAdministrative {
    pub corpus_admin_acronym: Option<String>,
    pub corpus_admin_name: Vec<String>,
    pub corpus_admin_author: Vec<String>,
    pub corpus_admin_availability: Option<CorpusAvailabilityType>,
    #[serde(rename = "corpus_admin_citationDocument")]
    pub corpus_admin_citation_document: Option<String>,
    #[serde(rename = "corpus_admin_citeAs")]
    pub corpus_admin_cite_as: Option<String>,
    #[serde(rename = "corpus_admin_contactMail")]
    pub corpus_admin_contact_mail: Vec<String>,
    pub corpus_admin_contributor_dkd: Vec<DkdContributor>,
    pub corpus_admin_contributor_orig: Vec<String>,
    /// A month (`YYYY-MM`), a date or `notAvailable`.
    #[serde(rename = "corpus_admin_dateOfPublication")]
    pub corpus_admin_date_of_publication: Option<String>,
    pub corpus_admin_documentation: Vec<String>,
    #[serde(rename = "corpus_admin_fileFormat")]
    pub corpus_admin_file_format: Vec<String>,
    pub corpus_admin_licence: Option<String>,
    #[serde(rename = "corpus_admin_licenceFulltext")]
    pub corpus_admin_licence_fulltext: Option<String>,
    #[serde(rename = "corpus_admin_licenceUrl")]
    pub corpus_admin_licence_url: Option<String>,
    #[serde(rename = "corpus_admin_otherVersions")]
    pub corpus_admin_other_versions: Vec<String>,
    pub corpus_admin_pid_dkd: Option<String>,
    pub corpus_admin_pid_orig: Option<String>,
    #[serde(rename = "corpus_admin_refArticle")]
    pub corpus_admin_ref_article: Vec<String>,
    #[serde(rename = "corpus_admin_referencesOther")]
    pub corpus_admin_references_other: Vec<String>,
    #[serde(rename = "corpus_admin_researchPaper")]
    pub corpus_admin_research_paper: Vec<String>,
    #[serde(rename = "corpus_admin_URL_download")]
    pub corpus_admin_url_download: Vec<String>,
    #[serde(rename = "corpus_admin_URLquery")]
    pub corpus_admin_url_query: Vec<String>,
    pub corpus_admin_version_orig: Option<String>,
}

/// Size of the corpus in storage units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusDesignSize {
    pub value: Option<f64>,
    pub unit: Option<StorageUnit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusDesign {
    pub corpus_design_description: Option<String>,
    #[serde(rename = "corpus_design_designType")]
    pub corpus_design_design_type: Option<StudyDesign>,
    pub corpus_design_group: Option<CorpusGroup>,
    #[serde(rename = "corpus_design_isComparableDataIncluded")]
    pub corpus_design_is_comparable_data_included: Option<BoolOrNa>,
    #[serde(rename = "corpus_design_l1Language")]
    pub corpus_design_l1_language: Vec<LanguageNameDe>,
    #[serde(rename = "corpus_design_l1Type")]
    pub corpus_design_l1_type: Vec<L1Constellation>,
    pub corpus_design_size: Option<CorpusDesignSize>,
    #[serde(rename = "corpus_design_targetLanguage")]
    pub corpus_design_target_language: Vec<DkdTrgLang>,
    #[serde(rename = "corpus_design_targetLanguageType")]
    pub corpus_design_target_language_type: Vec<L1Constellation>,
    /// A range of years (`YYYY-YYYY`) or `notAvailable`.
    #[serde(rename = "corpus_design_timeOfDataCollection")]
    pub corpus_design_time_of_data_collection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusProficiency {
    #[serde(rename = "corpus_proficiency_assignmentMethod")]
    pub corpus_proficiency_assignment_method: ProficiencyAssignmentMethod,
    #[serde(rename = "corpus_proficiency_isAssignmentAvailable")]
    pub corpus_proficiency_is_assignment_available: Option<bool>,
    #[serde(rename = "corpus_proficiency_learner_AssignmentInstrument")]
    pub corpus_proficiency_learner_assignment_instrument: Vec<String>,
    #[serde(rename = "corpus_proficiency_levelMax")]
    pub corpus_proficiency_level_max: Option<ProficiencyLevel>,
    #[serde(rename = "corpus_proficiency_levelMin")]
    pub corpus_proficiency_level_min: Option<ProficiencyLevel>,
    #[serde(rename = "corpus_proficiency_textAssignmentInstrument")]
    pub corpus_proficiency_text_assignment_instrument: Option<String>,
    #[serde(
        rename = "corpus_proficiency_textAutomaticAssignmentInstrument"
    )]
    pub corpus_proficiency_text_automatic_assignment_instrument:
        Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusProject {
    pub corpus_project_contact_orig: Vec<String>,
    pub corpus_project_duration_dkd: Option<DakodaProjectDuration>,
    pub corpus_project_duration_orig: Option<String>,
    pub corpus_project_head_dkd: Vec<DkdProjectHead>,
    pub corpus_project_head_orig: Vec<String>,
    pub corpus_project_institution_dkd: Vec<DkdInstitution>,
    pub corpus_project_institution_orig: Vec<String>,
    pub corpus_project_name_dkd: Option<DkdProjectName>,
    pub corpus_project_name_orig: Vec<String>,
    pub corpus_project_type_dkd: DkdProjectType,
    pub corpus_project_type_orig: Option<String>,
    #[serde(rename = "corpus_project_URL_dkd")]
    pub corpus_project_url_dkd: Option<String>,
    #[serde(rename = "corpus_project_URL_orig")]
    pub corpus_project_url_orig: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSubcorpus {
    pub corpus_subcorpus_signet: Option<String>,
    #[serde(rename = "corpus_subcorpus_sizeLearners")]
    pub corpus_subcorpus_size_learners: Option<i64>,
    #[serde(rename = "corpus_subcorpus_sizeTexts")]
    pub corpus_subcorpus_size_texts: Option<i64>,
    #[serde(rename = "corpus_subcorpus_sizeTokens")]
    pub corpus_subcorpus_size_tokens: Option<i64>,
    #[serde(rename = "corpus_subcorpus_targetLanguage")]
    pub corpus_subcorpus_target_language: Vec<DkdTrgLang>,
}

/// Metadata describing the corpus a document belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Corpus {
    pub administrative: Option<CorpusAdministrative>,
    pub design: Option<CorpusDesign>,
    pub proficiency: Option<CorpusProficiency>,
    pub project: Option<CorpusProject>,
    pub subcorpus: Option<CorpusSubcorpus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionSetting {
    #[serde(rename = "production_setting_schoolGrade")]
    pub production_setting_school_grade: Option<IntOrNa>,
    #[serde(rename = "productionSetting_educationalStage")]
    pub educational_stage: Vec<EducationalStage>,
    #[serde(rename = "productionSetting_languageTest")]
    pub language_test: Option<String>,
    #[serde(rename = "productionSetting_languageCourseLevel")]
    pub language_course_level: Option<String>,
    #[serde(rename = "productionSetting_naturalistic")]
    pub naturalistic: Option<String>,
    #[serde(rename = "productionSetting_collectedInResearchProject")]
    pub collected_in_research_project: Option<bool>,
    #[serde(rename = "productionSetting_setting")]
    pub setting: Vec<DataProductionSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionBlock {
    #[serde(rename = "task_interaction_conceptualMode")]
    pub task_interaction_conceptual_mode:
        Vec<DataProductionSettingConceptualMode>,
    #[serde(rename = "task_interaction_ExpectedRhetoricalFunctions")]
    pub task_interaction_expected_rhetorical_functions:
        Vec<RhetoricalFunctions>,
    pub task_interaction_formality: Option<FormalityType>,
    pub task_interaction_mode: Vec<DataProductionSettingMode>,
    #[serde(rename = "task_interaction_participantsL1L2Interaction")]
    pub task_interaction_participants_l1_l2_interaction:
        Option<InteractionTypes>,
    /// Number of participants, either a count or a range such as
    /// `2-4`.
    pub task_interaction_participants: Vec<NumberOrText>,
    pub task_interaction_type: Option<LearnerTaskType>,
}

/// The task the text was produced for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskBlock {
    pub task_id: Option<String>,
    pub task_id_orig: Option<String>,
    pub task_title: Option<String>,
    pub task_comparison: Vec<PossibilitiesForComparisons>,
    pub task_description: Option<String>,
    #[serde(rename = "task_descriptionDetailed")]
    pub task_description_detailed: Option<String>,
    #[serde(rename = "task_durationMinutes")]
    pub task_duration_minutes: Option<NumberOrText>,
    pub task_instructions: Option<String>,
    #[serde(rename = "task_isDurationLimited")]
    pub task_is_duration_limited: Option<BoolOrNa>,
    #[serde(rename = "task_levelMax")]
    pub task_level_max: Vec<ProficiencyLevel>,
    #[serde(rename = "task_levelMin")]
    pub task_level_min: Vec<ProficiencyLevel>,
    pub task_assessed: Option<BoolOrNa>,
    #[serde(rename = "task_officialLanguageTest")]
    pub task_official_language_test: Option<BoolOrNa>,
    #[serde(rename = "task_officialLanguageTestSpecific")]
    pub task_official_language_test_specific: Option<String>,
    pub task_options: Option<BoolOrNa>,
    #[serde(rename = "task_stimulusOffered")]
    pub task_stimulus_offered: Option<BoolOrNa>,
    #[serde(rename = "task_stimulusType")]
    pub task_stimulus_type: Vec<TaskStimulusType>,
    pub interaction: Option<InteractionBlock>,
}

/// A language described in all of its vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lingua {
    pub name_de: Option<LanguageNameDe>,
    pub name_en: Option<LanguageNameEn>,
    pub iso_code_639_3: Option<LanguageCode>,
    pub group: Option<LanguageGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sociodemographics {
    pub learner_socio_birthplace: Option<CountryType>,
    pub learner_socio_country: Option<CountryType>,
    #[serde(rename = "learner_socio_educationalBackground")]
    pub learner_socio_educational_background: Option<EducationalStage>,
    pub learner_socio_gender: Option<Gender>,
    #[serde(rename = "learner_socio_majorSubject")]
    pub learner_socio_major_subject: Vec<String>,
    pub learner_socio_profession: Vec<String>,
    #[serde(rename = "learner_socio_schoolGrade")]
    pub learner_socio_school_grade: Option<IntOrNa>,
}

/// How and for how long a learner was exposed to a language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageExposure {
    /// Age at the onset of acquisition, in years.
    pub learner_language_exposure_onset: Option<NumberOrNa>,
    pub learner_language_exposure_onset_group: Option<String>,
    #[serde(rename = "learner_language_exposure_durationOfInstruction")]
    pub learner_language_exposure_duration_of_instruction:
        Option<NumberOrNa>,
    #[serde(rename = "learner_language_exposure_durationOfUse")]
    pub learner_language_exposure_duration_of_use: Option<NumberOrNa>,
    pub learner_language_exposure_input: Option<TrgLangInputType>,
    pub learner_language_exposure_institution: Vec<String>,
    #[serde(rename = "learner_language_exposure_monthsSpentEnvironment")]
    pub learner_language_exposure_months_spent_environment:
        Option<NumberOrNa>,
    #[serde(rename = "learner_language_exposure_learningContext")]
    pub learner_language_exposure_learning_context: Option<String>,
    #[serde(rename = "learner_language_exposure_placeAcquisition")]
    pub learner_language_exposure_place_acquisition: Option<CountryTypeOrNa>,
    #[serde(rename = "learner_language_exposure_WasInEnvironment")]
    pub learner_language_exposure_was_in_environment: Option<BoolOrNa>,
    #[serde(rename = "learner_language_WasInstructed")]
    pub learner_language_was_instructed: Option<BoolOrNa>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerLanguageProficiency {
    pub learner_language_proficiency_score: Option<NumberOrText>,
    #[serde(rename = "learner_language_proficiency_cefrMax")]
    pub learner_language_proficiency_cefr_max: Option<ProficiencyLevel>,
    #[serde(rename = "learner_language_proficiency_cefrMin")]
    pub learner_language_proficiency_cefr_min: Option<ProficiencyLevel>,
    #[serde(rename = "learner_language_proficiency_cTestCefrMax")]
    pub learner_language_proficiency_c_test_cefr_max:
        Option<ProficiencyLevel>,
    #[serde(rename = "learner_language_proficiency_cTestCefrMin")]
    pub learner_language_proficiency_c_test_cefr_min:
        Option<ProficiencyLevel>,
    #[serde(rename = "learner_language_proficiency_cTestLevelDetail")]
    pub learner_language_proficiency_c_test_level_detail: Option<String>,
    /// Percentage of the C-test solved, between 0 and 100.
    #[serde(rename = "learner_language_proficiency_cTestPercent")]
    pub learner_language_proficiency_c_test_percent: Option<NumberOrNa>,
    #[serde(rename = "learner_language_proficiency_cTestType")]
    pub learner_language_proficiency_c_test_type: Option<String>,
    #[serde(rename = "learner_language_proficiency_estimateMax")]
    pub learner_language_proficiency_estimate_max: Option<ProficiencyLevel>,
    #[serde(rename = "learner_language_proficiency_estimateMin")]
    pub learner_language_proficiency_estimate_min: Option<ProficiencyLevel>,
    #[serde(rename = "learner_language_proficiency_selfAssessment")]
    pub learner_language_proficiency_self_assessment: Option<String>,
    #[serde(rename = "learner_language_proficiency_assignmentInstrument")]
    pub learner_language_proficiency_assignment_instrument: Option<String>,
    #[serde(rename = "learner_language_proficiency_assignmentMethod")]
    pub learner_language_proficiency_assignment_method:
        Vec<ProficiencyAssessmentMethod>,
    pub learner_language_proficiency_documentation: Option<String>,
}

/// A language spoken by the learner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOfSpeaker {
    pub learner_language_iso639_3: Option<Lingua>,
    pub learner_language_status: Vec<LangStatus>,
    #[serde(rename = "learner_language_IsTarget")]
    pub learner_language_is_target: Option<BoolOrNa>,
    #[serde(rename = "learner_language_dominantWordOrder")]
    pub learner_language_dominant_word_order: Vec<WordOrderType>,
    pub learner_language_group: Option<LanguageGroup>,
    #[serde(rename = "learner_language_isSpokenHome")]
    pub learner_language_is_spoken_home: Option<BoolOrNa>,
    #[serde(rename = "learner_language_isSpokenSchool")]
    pub learner_language_is_spoken_school: Vec<BoolOrNa>,
    #[serde(rename = "learner_language_parentL1")]
    pub learner_language_parent_l1: Option<LanguageCode>,
    pub exposure: Option<LanguageExposure>,
    pub proficiency: Option<LearnerLanguageProficiency>,
}

/// The learner who produced the text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Learner {
    pub learner_id: Option<String>,
    pub learner_id_orig: Vec<String>,
    /// Number of languages spoken by the learner.
    #[serde(rename = "learner_lCount")]
    pub learner_l_count: Option<NumberOrNa>,
    #[serde(rename = "learner_multipleL1")]
    pub learner_multiple_l1: Option<BoolOrNa>,
    #[serde(rename = "learner_textCount")]
    pub learner_text_count: Option<i64>,
    pub learner_note: Option<String>,
    pub sociodemographic: Option<Sociodemographics>,
    pub language: Vec<LanguageOfSpeaker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLearner {
    /// Age of the learner when the text was produced.
    #[serde(rename = "text_learner_ageProduction")]
    pub text_learner_age_production: Option<NumberOrNa>,
    #[serde(rename = "text_learner_ageProductionAggregated")]
    pub text_learner_age_production_aggregated: Option<LearnerAgeRange>,
    pub text_learner_role: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProficiency {
    #[serde(rename = "text_proficiency_assignmentInstrument")]
    pub text_proficiency_assignment_instrument: Option<String>,
    #[serde(rename = "text_proficiency_assignmentMethod")]
    pub text_proficiency_assignment_method:
        Option<ProficiencyAssignmentMethodType>,
    #[serde(rename = "text_proficiency_cefrMax")]
    pub text_proficiency_cefr_max: Option<CoarseCefrLevel>,
    #[serde(rename = "text_proficiency_cefrMin")]
    pub text_proficiency_cefr_min: Option<CoarseCefrLevel>,
    #[serde(rename = "text_proficiency_cefrAutomMax")]
    pub text_proficiency_cefr_autom_max: Option<ProficiencyLevel>,
    #[serde(rename = "text_proficiency_cefrAutomMin")]
    pub text_proficiency_cefr_autom_min: Option<ProficiencyLevel>,
    pub text_proficiency_documentation: Option<String>,
    #[serde(rename = "text_proficiency_official_languageTestingScore")]
    pub text_proficiency_official_language_testing_score: Option<String>,
    pub text_proficiency_score: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAnnotation {
    pub text_annotation_borrowed_orig: Option<BoolOrNa>,
    #[serde(rename = "text_annotation_hasErrorAnnotation_orig")]
    pub text_annotation_has_error_annotation_orig: Option<BoolOrNa>,
    #[serde(rename = "text_annotation_hasTargetHypotheses")]
    pub text_annotation_has_target_hypotheses: Option<BoolOrNa>,
}

/// Properties of the learner text itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProperties {
    pub text_file: Option<String>,
    pub text_id: Option<String>,
    #[serde(rename = "text_ID_orig")]
    pub text_id_orig: Option<String>,
    pub text_language: Option<Lingua>,
    #[serde(rename = "text_longitudinalOrder")]
    pub text_longitudinal_order: Option<IntOrNa>,
    #[serde(rename = "text_timeOfCreation")]
    pub text_time_of_creation: Option<String>,
    #[serde(rename = "text_tokenCount")]
    pub text_token_count: Option<i64>,
    #[serde(rename = "text_clauseCount")]
    pub text_clause_count: Option<i64>,
    #[serde(rename = "text_topicAutom")]
    pub text_topic_autom: Vec<TopicType>,
    pub text_note: Option<String>,
    pub learner: Option<TextLearner>,
    pub proficiency: Option<TextProficiency>,
    pub annotation: Option<TextAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetHypothesis {
    #[serde(rename = "targetHypothesis_automatic")]
    pub automatic: Option<bool>,
    #[serde(rename = "targetHypothesis_corrected")]
    pub corrected: Option<bool>,
    #[serde(rename = "targetHypothesis_documentation")]
    pub documentation: Option<serde_json::Value>,
    #[serde(rename = "targetHypothesis_evaluation")]
    pub evaluation: Option<BoolOrNa>,
    #[serde(rename = "targetHypothesis_tool")]
    pub tool: Option<String>,
    #[serde(rename = "targetHypothesis_toolVersion")]
    pub tool_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotator {
    pub annotator_id: Option<String>,
    #[serde(rename = "annotator_L1")]
    pub annotator_l1: Option<Lingua>,
    #[serde(rename = "annotator_L2")]
    pub annotator_l2: Option<Lingua>,
    pub annotator_note: Option<String>,
    #[serde(rename = "annotator_targetLanguageCompetence")]
    pub annotator_target_language_competence: Option<String>,
    pub annotator_type: Option<String>,
}
