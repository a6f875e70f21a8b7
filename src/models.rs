// feedback-report-service/src/models.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Theory,
    Practical,
    TextAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Theory => "theory",
            QuestionType::Practical => "practical",
            QuestionType::TextAnswer => "text-answer",
        }
    }

    pub fn is_rating(&self) -> bool {
        !matches!(self, QuestionType::TextAnswer)
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theory" => Ok(QuestionType::Theory),
            "practical" => Ok(QuestionType::Practical),
            "text-answer" => Ok(QuestionType::TextAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subjects are either lectures or labs. A subject without a type is
/// treated as theory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Theory,
    Practical,
}

impl SubjectType {
    pub fn question_type(&self) -> QuestionType {
        match self {
            SubjectType::Theory => QuestionType::Theory,
            SubjectType::Practical => QuestionType::Practical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.question_type().as_str()
    }

    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("practical") => SubjectType::Practical,
            _ => SubjectType::Theory,
        }
    }
}

/// A selector component that is either a concrete value or the literal
/// `All` the frontend sends for "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<T> {
    All,
    Only(T),
}

impl<T> Scope<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Scope::All => None,
            Scope::Only(value) => Some(value),
        }
    }
}

/// `All` goes out as the same literal the frontend sends back.
impl<T: Serialize> Serialize for Scope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scope::All => serializer.serialize_str("All"),
            Scope::Only(value) => value.serialize(serializer),
        }
    }
}

impl<T: FromStr> Scope<T> {
    pub fn parse(raw: &str) -> Result<Self, T::Err> {
        if raw.eq_ignore_ascii_case("all") {
            Ok(Scope::All)
        } else {
            raw.parse().map(Scope::Only)
        }
    }
}

/// Aggregated 1-5 rating distribution for one question under one selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRow {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub excellent: i64,
    pub very_good: i64,
    pub good: i64,
    pub satisfactory: i64,
    pub not_satisfactory: i64,
    pub total_responses: i64,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnswerRow {
    pub question_id: i64,
    pub question_text: String,
    pub answer_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub question_type: QuestionType,
}

/// A text-answer question together with its non-empty answers, in the order
/// they are printed in the suggestions section.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionGroup {
    pub question: String,
    pub answers: Vec<String>,
}

/// Names resolved from a teacher-subject link.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentInfo {
    pub teacher_name: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub department_name: String,
}

/// Immutable snapshot assembled before layout begins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub teacher_name: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub department_name: String,
    pub feedback_count: i64,
    pub generated_at: NaiveDateTime,
}

/// Identifies one teacher-subject report inside the caller's department.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSelector {
    pub department_id: i32,
    pub teacher_subject_id: i64,
    pub academic_year: String,
    pub student_year: i32,
    pub semester: i32,
}

/// Selector for the teacher-analysis view.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSelector {
    pub department_id: i32,
    pub teacher_id: i64,
    pub teacher_subject: Scope<i64>,
    pub academic_year: Scope<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub department_id: i32,
    pub year: i32,
    pub semester: i32,
    pub academic_year: String,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSubjectListing {
    pub teacher_subject_id: i64,
    pub subject_name: String,
    pub teacher_name: String,
    pub semester: i32,
}

/// A teacher with at least one assignment in the analysis scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherSummary {
    pub id: i64,
    pub teacher_name: String,
}

/// Entry of the analysis subject picker. The leading entry selects every
/// subject of the teacher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSubject {
    pub teacher_subject_id: Scope<i64>,
    pub subject_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<i32>,
    pub subject_type: &'static str,
}

impl AnalysisSubject {
    pub fn all_subjects() -> Self {
        Self {
            teacher_subject_id: Scope::All,
            subject_name: "All Subjects".into(),
            semester: None,
            subject_type: "all",
        }
    }
}

/// One raw answer as stored, used to build the spreadsheet matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeedback {
    pub username: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub rating: Option<i32>,
    pub text_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnswer {
    pub teacher_subject_id: i64,
    pub question_id: i64,
    pub rating: Option<i32>,
    pub text_answer: Option<String>,
}

/// Everything one student answers in a sitting. Stored atomically together
/// with the consumption of the student's credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    #[serde(default = "uuid::Uuid::new_v4")]
    pub submission_id: uuid::Uuid,
    pub academic_year: String,
    pub answers: Vec<FeedbackAnswer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded { answers: usize },
    UnknownCredential,
    AlreadyUsed,
}

/// A finished document ready to be streamed to the caller.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub filename: String,
    pub mime_type: String,
    pub content: Vec<u8>,
    pub page_count: usize,
}
