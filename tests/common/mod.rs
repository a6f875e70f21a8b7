#![allow(dead_code)]

use async_trait::async_trait;
use feedback_report_service::aggregation::round2;
use feedback_report_service::config::{
    Config, DatabaseConfig, ReportConfig, ServerConfig, ServiceConfig, TemplateConfig,
};
use feedback_report_service::credentials::CredentialBatch;
use feedback_report_service::error::Result;
use feedback_report_service::models::{
    AnalysisSelector, AnalysisSubject, AssignmentInfo, Credential, FeedbackSubmission, Question, QuestionType,
    RatingRow, RawFeedback, ReportSelector, Scope, SubjectType, SubmitOutcome,
    TeacherSubjectListing, TeacherSummary, TextAnswerRow,
};
use feedback_report_service::persistence::{CredentialStore, FeedbackStore};
use feedback_report_service::pipeline::ReportPipeline;
use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

pub const CS: i32 = 1;
pub const MECH: i32 = 4;

#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: i64,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub department_id: i32,
    pub academic_year: String,
    pub year: i32,
    pub semester: i32,
}

#[derive(Debug, Clone)]
pub struct StoredAnswer {
    pub teacher_subject_id: i64,
    pub question_id: i64,
    pub academic_year: String,
    pub semester: i32,
    pub rating: Option<i32>,
    pub text_answer: Option<String>,
    pub submission_id: Uuid,
    pub username: String,
}

/// Both stores over plain vectors, aggregating the way the SQL does.
#[derive(Default)]
pub struct MemoryStore {
    pub departments: BTreeMap<i32, String>,
    pub assignments: Vec<Assignment>,
    pub questions: Vec<Question>,
    pub answers: Mutex<Vec<StoredAnswer>>,
    pub logins: Mutex<Vec<Credential>>,
}

impl MemoryStore {
    pub fn seeded() -> Self {
        let mut store = MemoryStore::default();
        store.departments.insert(CS, "Computer Science".into());
        store.departments.insert(MECH, "Mechanical".into());

        store.assignments = vec![
            Assignment {
                id: 10,
                teacher_id: 100,
                teacher_name: "Anita Rao".into(),
                subject_name: "Operating Systems".into(),
                subject_type: SubjectType::Theory,
                department_id: CS,
                academic_year: "2025-2026".into(),
                year: 2,
                semester: 1,
            },
            Assignment {
                id: 11,
                teacher_id: 100,
                teacher_name: "Anita Rao".into(),
                subject_name: "OS Lab".into(),
                subject_type: SubjectType::Practical,
                department_id: CS,
                academic_year: "2025-2026".into(),
                year: 2,
                semester: 1,
            },
            Assignment {
                id: 20,
                teacher_id: 200,
                teacher_name: "Vikram Joshi".into(),
                subject_name: "Thermodynamics".into(),
                subject_type: SubjectType::Theory,
                department_id: MECH,
                academic_year: "2025-2026".into(),
                year: 2,
                semester: 1,
            },
        ];

        let question = |id: i64, text: &str, question_type: QuestionType| Question {
            id,
            text: text.into(),
            question_type,
        };
        store.questions = vec![
            question(1, "1. Quality of notes/materials provided?", QuestionType::Theory),
            question(2, "2. Regularity of classes?", QuestionType::Theory),
            question(3, "1. Structure of practical sessions?", QuestionType::Practical),
            question(4, "Any suggestions for the teacher?", QuestionType::TextAnswer),
            question(5, "What should the department improve?", QuestionType::TextAnswer),
        ];

        store
    }

    pub fn with_login(self, username: &str, semester: i32) -> Self {
        self.logins.lock().unwrap().push(Credential {
            username: username.into(),
            password: "1234".into(),
            department_id: CS,
            year: 2,
            semester,
            academic_year: "2025-2026".into(),
            used: false,
        });
        self
    }

    /// Adds one submission for `username` on link 10.
    pub fn rate(&self, username: &str, ratings: &[(i64, i32)], comment: Option<&str>) {
        let submission_id = Uuid::new_v4();
        let mut answers = self.answers.lock().unwrap();
        for &(question_id, rating) in ratings {
            answers.push(StoredAnswer {
                teacher_subject_id: 10,
                question_id,
                academic_year: "2025-2026".into(),
                semester: 1,
                rating: Some(rating),
                text_answer: None,
                submission_id,
                username: username.into(),
            });
        }
        if let Some(text) = comment {
            answers.push(StoredAnswer {
                teacher_subject_id: 10,
                question_id: 4,
                academic_year: "2025-2026".into(),
                semester: 1,
                rating: None,
                text_answer: Some(text.into()),
                submission_id,
                username: username.into(),
            });
        }
    }

    pub fn login(&self, username: &str) -> Option<Credential> {
        self.logins
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.username == username)
            .cloned()
    }

    fn assignment(&self, id: i64) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    fn question(&self, id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    fn selected(&self, selector: &ReportSelector) -> Vec<StoredAnswer> {
        let Some(link) = self.assignment(selector.teacher_subject_id) else {
            return Vec::new();
        };
        if link.department_id != selector.department_id || link.year != selector.student_year {
            return Vec::new();
        }

        self.answers
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                a.teacher_subject_id == selector.teacher_subject_id
                    && a.academic_year == selector.academic_year
                    && a.semester == selector.semester
            })
            .cloned()
            .collect()
    }

    fn aggregate<'a>(&self, answers: impl Iterator<Item = &'a StoredAnswer>) -> Vec<RatingRow> {
        let mut grouped: BTreeMap<i64, Vec<i32>> = BTreeMap::new();
        for answer in answers {
            grouped
                .entry(answer.question_id)
                .or_default()
                .extend(answer.rating);
        }

        grouped
            .into_iter()
            .filter_map(|(question_id, ratings)| {
                let question = self.question(question_id)?;
                let count = |value: i32| ratings.iter().filter(|&&r| r == value).count() as i64;
                let total = ratings.len() as i64;
                let avg = if total == 0 {
                    0.0
                } else {
                    round2(ratings.iter().sum::<i32>() as f64 / total as f64)
                };

                Some(RatingRow {
                    question_id,
                    question_text: question.text.clone(),
                    question_type: question.question_type,
                    excellent: count(5),
                    very_good: count(4),
                    good: count(3),
                    satisfactory: count(2),
                    not_satisfactory: count(1),
                    total_responses: total,
                    avg_rating: avg,
                })
            })
            .collect()
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn assignment_info(&self, selector: &ReportSelector) -> Result<Option<AssignmentInfo>> {
        Ok(self
            .assignment(selector.teacher_subject_id)
            .filter(|a| {
                a.department_id == selector.department_id
                    && a.academic_year == selector.academic_year
                    && a.year == selector.student_year
                    && a.semester == selector.semester
            })
            .map(|a| AssignmentInfo {
                teacher_name: a.teacher_name.clone(),
                subject_name: a.subject_name.clone(),
                subject_type: a.subject_type,
                department_name: self.departments[&a.department_id].clone(),
            }))
    }

    async fn feedback_count(&self, selector: &ReportSelector) -> Result<i64> {
        let ids: HashSet<Uuid> = self.selected(selector).iter().map(|a| a.submission_id).collect();
        Ok(ids.len() as i64)
    }

    async fn rating_rows(&self, selector: &ReportSelector) -> Result<Vec<RatingRow>> {
        let Some(link) = self.assignment(selector.teacher_subject_id) else {
            return Ok(Vec::new());
        };
        let wanted = link.subject_type.question_type();
        let selected = self.selected(selector);
        let rows = self.aggregate(
            selected
                .iter()
                .filter(|a| self.question(a.question_id).map(|q| q.question_type) == Some(wanted)),
        );
        Ok(rows)
    }

    async fn text_answers(&self, selector: &ReportSelector) -> Result<Vec<TextAnswerRow>> {
        let mut rows: Vec<TextAnswerRow> = self
            .selected(selector)
            .into_iter()
            .filter_map(|a| {
                let question = self.question(a.question_id)?;
                (question.question_type == QuestionType::TextAnswer).then(|| TextAnswerRow {
                    question_id: question.id,
                    question_text: question.text.clone(),
                    answer_text: a.text_answer,
                })
            })
            .collect();
        rows.sort_by_key(|r| r.question_id);
        Ok(rows)
    }

    async fn text_questions(&self) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.question_type == QuestionType::TextAnswer)
            .cloned()
            .collect())
    }

    async fn subject_type(&self, department_id: i32, teacher_subject_id: i64) -> Result<Option<SubjectType>> {
        Ok(self
            .assignment(teacher_subject_id)
            .filter(|a| a.department_id == department_id)
            .map(|a| a.subject_type))
    }

    async fn analysis_rows(
        &self,
        selector: &AnalysisSelector,
        subject_type: Option<SubjectType>,
    ) -> Result<Vec<RatingRow>> {
        let answers = self.answers.lock().unwrap().clone();
        let matching = answers.iter().filter(|a| {
            let Some(link) = self.assignment(a.teacher_subject_id) else {
                return false;
            };
            let Some(question) = self.question(a.question_id) else {
                return false;
            };
            link.teacher_id == selector.teacher_id
                && link.department_id == selector.department_id
                && selector.academic_year.as_option().map_or(true, |y| *y == a.academic_year)
                && selector
                    .teacher_subject
                    .as_option()
                    .map_or(true, |id| *id == a.teacher_subject_id)
                && match subject_type {
                    Some(t) => question.question_type == t.question_type(),
                    None => question.question_type.is_rating(),
                }
        });

        let mut rows = self.aggregate(matching);
        rows.sort_by_key(|r| (r.question_type.as_str(), r.question_id));
        Ok(rows)
    }

    async fn teacher_subjects(
        &self,
        department_id: i32,
        academic_year: &str,
        year: i32,
    ) -> Result<Vec<TeacherSubjectListing>> {
        let mut rows: Vec<TeacherSubjectListing> = self
            .assignments
            .iter()
            .filter(|a| a.department_id == department_id && a.academic_year == academic_year && a.year == year)
            .map(|a| TeacherSubjectListing {
                teacher_subject_id: a.id,
                subject_name: a.subject_name.clone(),
                teacher_name: a.teacher_name.clone(),
                semester: a.semester,
            })
            .collect();
        rows.sort_by(|a, b| a.subject_name.cmp(&b.subject_name));
        Ok(rows)
    }

    async fn analysis_years(&self, department_id: i32) -> Result<Vec<String>> {
        let mut years: Vec<String> = self
            .answers
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                self.assignment(a.teacher_subject_id)
                    .is_some_and(|link| link.department_id == department_id)
            })
            .map(|a| a.academic_year.clone())
            .collect();
        years.sort();
        years.dedup();
        Ok(years)
    }

    async fn analysis_teachers(&self, department_id: i32, academic_year: &Scope<String>) -> Result<Vec<TeacherSummary>> {
        let mut teachers: Vec<TeacherSummary> = self
            .assignments
            .iter()
            .filter(|a| {
                a.department_id == department_id
                    && academic_year.as_option().map_or(true, |y| *y == a.academic_year)
            })
            .map(|a| TeacherSummary {
                id: a.teacher_id,
                teacher_name: a.teacher_name.clone(),
            })
            .collect();
        teachers.sort_by(|a, b| a.teacher_name.cmp(&b.teacher_name));
        teachers.dedup();
        Ok(teachers)
    }

    async fn analysis_subjects(
        &self,
        department_id: i32,
        teacher_id: i64,
        academic_year: &Scope<String>,
    ) -> Result<Vec<AnalysisSubject>> {
        let mut links: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| {
                a.teacher_id == teacher_id
                    && a.department_id == department_id
                    && academic_year.as_option().map_or(true, |y| *y == a.academic_year)
            })
            .collect();
        links.sort_by(|a, b| (&a.subject_name, a.semester).cmp(&(&b.subject_name, b.semester)));

        Ok(links
            .into_iter()
            .map(|a| AnalysisSubject {
                teacher_subject_id: Scope::Only(a.id),
                subject_name: a.subject_name.clone(),
                semester: Some(a.semester),
                subject_type: a.subject_type.as_str(),
            })
            .collect())
    }

    async fn submitted_students(&self, selector: &ReportSelector) -> Result<Vec<String>> {
        let mut students: Vec<String> = self.selected(selector).into_iter().map(|a| a.username).collect();
        students.sort();
        students.dedup();
        Ok(students)
    }

    async fn questions_for(&self, subject_type: SubjectType) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| {
                q.question_type == subject_type.question_type()
                    || q.question_type == QuestionType::TextAnswer
            })
            .cloned()
            .collect())
    }

    async fn raw_feedback(&self, selector: &ReportSelector, subject_type: SubjectType) -> Result<Vec<RawFeedback>> {
        Ok(self
            .selected(selector)
            .into_iter()
            .filter_map(|a| {
                let question = self.question(a.question_id)?;
                let wanted = question.question_type == subject_type.question_type()
                    || question.question_type == QuestionType::TextAnswer;
                wanted.then(|| RawFeedback {
                    username: a.username,
                    question_text: question.text.clone(),
                    question_type: question.question_type,
                    rating: a.rating,
                    text_answer: a.text_answer,
                })
            })
            .collect())
    }

    async fn link_subject_type(&self, teacher_subject_id: i64) -> Result<Option<SubjectType>> {
        Ok(self.assignment(teacher_subject_id).map(|a| a.subject_type))
    }

    async fn question_type(&self, question_id: i64) -> Result<Option<QuestionType>> {
        Ok(self.question(question_id).map(|q| q.question_type))
    }

    async fn record_submission(&self, username: &str, submission: &FeedbackSubmission) -> Result<SubmitOutcome> {
        let mut logins = self.logins.lock().unwrap();
        let Some(login) = logins.iter_mut().find(|c| c.username == username) else {
            return Ok(SubmitOutcome::UnknownCredential);
        };
        if login.used {
            return Ok(SubmitOutcome::AlreadyUsed);
        }

        let mut answers = self.answers.lock().unwrap();
        for answer in &submission.answers {
            answers.push(StoredAnswer {
                teacher_subject_id: answer.teacher_subject_id,
                question_id: answer.question_id,
                academic_year: submission.academic_year.clone(),
                semester: login.semester,
                rating: answer.rating,
                text_answer: answer.text_answer.clone(),
                submission_id: submission.submission_id,
                username: username.to_string(),
            });
        }
        login.used = true;

        Ok(SubmitOutcome::Recorded {
            answers: submission.answers.len(),
        })
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn department_name(&self, department_id: i32) -> Result<Option<String>> {
        Ok(self.departments.get(&department_id).cloned())
    }

    async fn issue_credentials(&self, batch: &CredentialBatch) -> Result<Vec<Credential>> {
        let mut logins = self.logins.lock().unwrap();
        let taken: HashSet<String> = logins
            .iter()
            .filter(|c| c.username.starts_with(batch.pattern.prefix()))
            .map(|c| c.username.clone())
            .collect();

        let issued = batch.plan(&taken, &mut rand::thread_rng())?;
        logins.extend(issued.iter().cloned());
        Ok(issued)
    }

    async fn delete_credentials(&self, department_id: i32, used_only: bool) -> Result<u64> {
        let mut logins = self.logins.lock().unwrap();
        let before = logins.len();
        logins.retain(|c| c.department_id != department_id || (used_only && !c.used));
        Ok((before - logins.len()) as u64)
    }
}

pub const ALL_TEMPLATES: [&str; 4] = ["theory.png", "practical.png", "header.png", "student_login.png"];

pub fn write_templates(dir: &Path, names: &[&str]) {
    for name in names {
        let img = RgbaImage::from_pixel(12, 16, Rgba([230, 230, 250, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        std::fs::write(dir.join(name), out.into_inner()).unwrap();
    }
}

pub fn config(dir: &Path) -> Config {
    Config {
        service: ServiceConfig {
            name: "feedback-report-service".into(),
            log_level: "debug".into(),
        },
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
            max_connections: 1,
        },
        templates: TemplateConfig {
            path: dir.display().to_string(),
            theory: "theory.png".into(),
            practical: "practical.png".into(),
            header: "header.png".into(),
            student_login: "student_login.png".into(),
            page_width: 612.0,
            page_height: 792.0,
        },
        report: ReportConfig {
            render_timeout_secs: 30,
        },
    }
}

/// A pipeline over `store` with the given templates present on disk.
pub fn pipeline(store: Arc<MemoryStore>, templates: &[&str]) -> (ReportPipeline, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    write_templates(dir.path(), templates);
    let pipeline = ReportPipeline::new(store.clone(), store, &config(dir.path()));
    (pipeline, dir)
}

pub fn report_selector(department_id: i32) -> ReportSelector {
    ReportSelector {
        department_id,
        teacher_subject_id: 10,
        academic_year: "2025-2026".into(),
        student_year: 2,
        semester: 1,
    }
}
