// feedback-report-service/src/persistence.rs

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::credentials::CredentialBatch;
use crate::error::Result;
use crate::models::{
    AnalysisSelector, AnalysisSubject, AssignmentInfo, Credential, FeedbackSubmission, Question,
    QuestionType, RatingRow, RawFeedback, ReportSelector, Scope, SubjectType, SubmitOutcome,
    TeacherSubjectListing, TeacherSummary, TextAnswerRow,
};

// ============================================================
// Store interfaces
// ============================================================

/// Read side of the feedback tables plus the submission write path.
/// Department-scoped lookups return `None` for rows outside the caller's
/// department.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn assignment_info(&self, selector: &ReportSelector) -> Result<Option<AssignmentInfo>>;

    /// Distinct submissions for the selector.
    async fn feedback_count(&self, selector: &ReportSelector) -> Result<i64>;

    /// Rating questions of the subject's own type, ascending by question id.
    async fn rating_rows(&self, selector: &ReportSelector) -> Result<Vec<RatingRow>>;

    async fn text_answers(&self, selector: &ReportSelector) -> Result<Vec<TextAnswerRow>>;

    async fn text_questions(&self) -> Result<Vec<Question>>;

    async fn subject_type(&self, department_id: i32, teacher_subject_id: i64) -> Result<Option<SubjectType>>;

    /// `subject_type = None` means both rating types.
    async fn analysis_rows(
        &self,
        selector: &AnalysisSelector,
        subject_type: Option<SubjectType>,
    ) -> Result<Vec<RatingRow>>;

    async fn teacher_subjects(
        &self,
        department_id: i32,
        academic_year: &str,
        year: i32,
    ) -> Result<Vec<TeacherSubjectListing>>;

    /// Academic years with at least one submission, ascending.
    async fn analysis_years(&self, department_id: i32) -> Result<Vec<String>>;

    async fn analysis_teachers(&self, department_id: i32, academic_year: &Scope<String>) -> Result<Vec<TeacherSummary>>;

    /// The teacher's links in the department, ordered by subject and semester.
    async fn analysis_subjects(
        &self,
        department_id: i32,
        teacher_id: i64,
        academic_year: &Scope<String>,
    ) -> Result<Vec<AnalysisSubject>>;

    async fn submitted_students(&self, selector: &ReportSelector) -> Result<Vec<String>>;

    /// Rating questions of `subject_type` plus every text-answer question.
    async fn questions_for(&self, subject_type: SubjectType) -> Result<Vec<Question>>;

    async fn raw_feedback(&self, selector: &ReportSelector, subject_type: SubjectType) -> Result<Vec<RawFeedback>>;

    /// Subject type of a link regardless of department.
    async fn link_subject_type(&self, teacher_subject_id: i64) -> Result<Option<SubjectType>>;

    async fn question_type(&self, question_id: i64) -> Result<Option<QuestionType>>;

    /// Stores every answer and flips the student's credential to used in one
    /// transaction.
    async fn record_submission(&self, username: &str, submission: &FeedbackSubmission) -> Result<SubmitOutcome>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn department_name(&self, department_id: i32) -> Result<Option<String>>;

    /// Plans and inserts a batch while holding the batch prefix exclusively,
    /// so two concurrent batches never pick the same username.
    async fn issue_credentials(&self, batch: &CredentialBatch) -> Result<Vec<Credential>>;

    async fn delete_credentials(&self, department_id: i32, used_only: bool) -> Result<u64>;
}

// ============================================================
// Row records
// ============================================================

#[derive(Debug, FromRow)]
struct RatingRecord {
    question_id: i64,
    question_text: String,
    question_type: String,
    excellent: i64,
    very_good: i64,
    good: i64,
    satisfactory: i64,
    not_satisfactory: i64,
    total_responses: i64,
    avg_rating: f64,
}

impl TryFrom<RatingRecord> for RatingRow {
    type Error = anyhow::Error;

    fn try_from(r: RatingRecord) -> anyhow::Result<Self> {
        Ok(RatingRow {
            question_id: r.question_id,
            question_text: r.question_text,
            question_type: r.question_type.parse().map_err(|e: String| anyhow!(e))?,
            excellent: r.excellent,
            very_good: r.very_good,
            good: r.good,
            satisfactory: r.satisfactory,
            not_satisfactory: r.not_satisfactory,
            total_responses: r.total_responses,
            avg_rating: r.avg_rating,
        })
    }
}

#[derive(Debug, FromRow)]
struct QuestionRecord {
    id: i64,
    text: String,
    question_type: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = anyhow::Error;

    fn try_from(r: QuestionRecord) -> anyhow::Result<Self> {
        Ok(Question {
            id: r.id,
            text: r.text,
            question_type: r.question_type.parse().map_err(|e: String| anyhow!(e))?,
        })
    }
}

#[derive(Debug, FromRow)]
struct RawFeedbackRecord {
    username: String,
    question_text: String,
    question_type: String,
    rating: Option<i32>,
    text_answer: Option<String>,
}

#[derive(Debug, FromRow)]
struct AssignmentRecord {
    teacher_name: String,
    subject_name: String,
    subject_type: Option<String>,
    department_name: String,
}

#[derive(Debug, FromRow)]
struct CredentialStateRecord {
    used: bool,
    semester: i32,
}

fn collect<R, T>(records: Vec<R>) -> anyhow::Result<Vec<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    records.into_iter().map(T::try_from).collect()
}

// ============================================================
// PostgreSQL
// ============================================================

const RATING_COLUMNS: &str = r#"
    q.id::bigint AS question_id,
    q.text AS question_text,
    q.type AS question_type,
    COUNT(CASE WHEN f.rating = 5 THEN 1 END) AS excellent,
    COUNT(CASE WHEN f.rating = 4 THEN 1 END) AS very_good,
    COUNT(CASE WHEN f.rating = 3 THEN 1 END) AS good,
    COUNT(CASE WHEN f.rating = 2 THEN 1 END) AS satisfactory,
    COUNT(CASE WHEN f.rating = 1 THEN 1 END) AS not_satisfactory,
    COUNT(f.rating) AS total_responses,
    COALESCE(ROUND(AVG(f.rating)::numeric, 2), 0)::float8 AS avg_rating
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn assignment_info(&self, selector: &ReportSelector) -> Result<Option<AssignmentInfo>> {
        let record = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT t.name AS teacher_name,
                   s.name AS subject_name,
                   s.type AS subject_type,
                   d.name AS department_name
            FROM teacher_subjects ts
            JOIN teachers t ON ts.teacher_id = t.id
            JOIN subjects s ON ts.subject_id = s.id
            JOIN departments d ON s.department_id = d.id
            WHERE ts.id = $1
              AND ts.academic_year = $2
              AND ts.year = $3
              AND ts.semester = $4
              AND s.department_id = $5
            "#,
        )
        .bind(selector.teacher_subject_id)
        .bind(&selector.academic_year)
        .bind(selector.student_year)
        .bind(selector.semester)
        .bind(selector.department_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch teacher-subject assignment")?;

        Ok(record.map(|r| AssignmentInfo {
            subject_type: SubjectType::from_db(r.subject_type.as_deref()),
            teacher_name: r.teacher_name,
            subject_name: r.subject_name,
            department_name: r.department_name,
        }))
    }

    async fn feedback_count(&self, selector: &ReportSelector) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT f.submission_id)
            FROM feedback f
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE f.teacher_subject_id = $1
              AND f.academic_year = $2
              AND ts.year = $3
              AND ts.semester = $4
              AND s.department_id = $5
            "#,
        )
        .bind(selector.teacher_subject_id)
        .bind(&selector.academic_year)
        .bind(selector.student_year)
        .bind(selector.semester)
        .bind(selector.department_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count feedback submissions")?;

        Ok(count)
    }

    async fn rating_rows(&self, selector: &ReportSelector) -> Result<Vec<RatingRow>> {
        let records = sqlx::query_as::<_, RatingRecord>(&format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM feedback f
            JOIN questions q ON f.question_id = q.id
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE f.teacher_subject_id = $1
              AND f.academic_year = $2
              AND ts.year = $3
              AND f.semester = $4
              AND s.department_id = $5
              AND q.type = COALESCE(s.type, 'theory')
            GROUP BY q.id, q.text, q.type
            ORDER BY q.id
            "#
        ))
        .bind(selector.teacher_subject_id)
        .bind(&selector.academic_year)
        .bind(selector.student_year)
        .bind(selector.semester)
        .bind(selector.department_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate ratings")?;

        Ok(collect(records)?)
    }

    async fn text_answers(&self, selector: &ReportSelector) -> Result<Vec<TextAnswerRow>> {
        let rows = sqlx::query_as::<_, (i64, String, Option<String>)>(
            r#"
            SELECT q.id::bigint, q.text, f.text_answer
            FROM feedback f
            JOIN questions q ON f.question_id = q.id
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE f.teacher_subject_id = $1
              AND f.academic_year = $2
              AND ts.year = $3
              AND f.semester = $4
              AND s.department_id = $5
              AND q.type = 'text-answer'
            ORDER BY q.id, f.id
            "#,
        )
        .bind(selector.teacher_subject_id)
        .bind(&selector.academic_year)
        .bind(selector.student_year)
        .bind(selector.semester)
        .bind(selector.department_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch text answers")?;

        Ok(rows
            .into_iter()
            .map(|(question_id, question_text, answer_text)| TextAnswerRow {
                question_id,
                question_text,
                answer_text,
            })
            .collect())
    }

    async fn text_questions(&self) -> Result<Vec<Question>> {
        let records = sqlx::query_as::<_, QuestionRecord>(
            r#"
            SELECT id::bigint AS id, text, type AS question_type
            FROM questions
            WHERE type = 'text-answer'
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch text-answer questions")?;

        Ok(collect(records)?)
    }

    async fn subject_type(&self, department_id: i32, teacher_subject_id: i64) -> Result<Option<SubjectType>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT COALESCE(s.type, 'theory')
            FROM teacher_subjects ts
            JOIN subjects s ON ts.subject_id = s.id
            WHERE ts.id = $1 AND s.department_id = $2
            "#,
        )
        .bind(teacher_subject_id)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch subject type")?;

        Ok(value.map(|v| SubjectType::from_db(Some(&v))))
    }

    async fn analysis_rows(
        &self,
        selector: &AnalysisSelector,
        subject_type: Option<SubjectType>,
    ) -> Result<Vec<RatingRow>> {
        let records = sqlx::query_as::<_, RatingRecord>(&format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM feedback f
            JOIN questions q ON f.question_id = q.id
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE ts.teacher_id = $1
              AND s.department_id = $2
              AND ($3::text IS NULL OR f.academic_year = $3)
              AND ($4::bigint IS NULL OR f.teacher_subject_id = $4)
              AND (($5::text IS NULL AND q.type IN ('theory', 'practical')) OR q.type = $5)
            GROUP BY q.id, q.text, q.type
            ORDER BY q.type, q.id
            "#
        ))
        .bind(selector.teacher_id)
        .bind(selector.department_id)
        .bind(selector.academic_year.as_option())
        .bind(selector.teacher_subject.as_option().copied())
        .bind(subject_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate teacher analysis")?;

        Ok(collect(records)?)
    }

    async fn teacher_subjects(
        &self,
        department_id: i32,
        academic_year: &str,
        year: i32,
    ) -> Result<Vec<TeacherSubjectListing>> {
        let rows = sqlx::query_as::<_, (i64, String, String, i32)>(
            r#"
            SELECT ts.id::bigint, s.name, t.name, ts.semester::int
            FROM teacher_subjects ts
            JOIN teachers t ON ts.teacher_id = t.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE s.department_id = $1
              AND ts.academic_year = $2
              AND ts.year = $3
            ORDER BY s.name, t.name, ts.semester
            "#,
        )
        .bind(department_id)
        .bind(academic_year)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list teacher subjects")?;

        Ok(rows
            .into_iter()
            .map(|(teacher_subject_id, subject_name, teacher_name, semester)| TeacherSubjectListing {
                teacher_subject_id,
                subject_name,
                teacher_name,
                semester,
            })
            .collect())
    }

    async fn analysis_years(&self, department_id: i32) -> Result<Vec<String>> {
        let years = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT f.academic_year
            FROM feedback f
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE s.department_id = $1
            ORDER BY f.academic_year ASC
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list academic years")?;

        Ok(years)
    }

    async fn analysis_teachers(&self, department_id: i32, academic_year: &Scope<String>) -> Result<Vec<TeacherSummary>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT DISTINCT t.id::bigint, t.name
            FROM teacher_subjects ts
            JOIN teachers t ON ts.teacher_id = t.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE s.department_id = $1
              AND ($2::text IS NULL OR ts.academic_year = $2)
            ORDER BY t.name ASC
            "#,
        )
        .bind(department_id)
        .bind(academic_year.as_option())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list teachers")?;

        Ok(rows
            .into_iter()
            .map(|(id, teacher_name)| TeacherSummary { id, teacher_name })
            .collect())
    }

    async fn analysis_subjects(
        &self,
        department_id: i32,
        teacher_id: i64,
        academic_year: &Scope<String>,
    ) -> Result<Vec<AnalysisSubject>> {
        let rows = sqlx::query_as::<_, (i64, String, i32, Option<String>)>(
            r#"
            SELECT DISTINCT ts.id::bigint, s.name, ts.semester::int, s.type
            FROM teacher_subjects ts
            JOIN subjects s ON ts.subject_id = s.id
            WHERE ts.teacher_id = $1
              AND s.department_id = $2
              AND ($3::text IS NULL OR ts.academic_year = $3)
            ORDER BY s.name, ts.semester::int
            "#,
        )
        .bind(teacher_id)
        .bind(department_id)
        .bind(academic_year.as_option())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list teacher subjects for analysis")?;

        Ok(rows
            .into_iter()
            .map(|(id, subject_name, semester, subject_type)| AnalysisSubject {
                teacher_subject_id: Scope::Only(id),
                subject_name,
                semester: Some(semester),
                subject_type: SubjectType::from_db(subject_type.as_deref()).as_str(),
            })
            .collect())
    }

    async fn submitted_students(&self, selector: &ReportSelector) -> Result<Vec<String>> {
        let students = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT f.username
            FROM feedback f
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE f.teacher_subject_id = $1
              AND f.academic_year = $2
              AND ts.year = $3
              AND f.semester = $4
              AND s.department_id = $5
            ORDER BY f.username ASC
            "#,
        )
        .bind(selector.teacher_subject_id)
        .bind(&selector.academic_year)
        .bind(selector.student_year)
        .bind(selector.semester)
        .bind(selector.department_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list submitting students")?;

        Ok(students)
    }

    async fn questions_for(&self, subject_type: SubjectType) -> Result<Vec<Question>> {
        let records = sqlx::query_as::<_, QuestionRecord>(
            r#"
            SELECT id::bigint AS id, text, type AS question_type
            FROM questions
            WHERE type = $1 OR type = 'text-answer'
            ORDER BY type, id
            "#,
        )
        .bind(subject_type.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch questions")?;

        Ok(collect(records)?)
    }

    async fn raw_feedback(&self, selector: &ReportSelector, subject_type: SubjectType) -> Result<Vec<RawFeedback>> {
        let records = sqlx::query_as::<_, RawFeedbackRecord>(
            r#"
            SELECT f.username,
                   q.text AS question_text,
                   q.type AS question_type,
                   f.rating::int AS rating,
                   f.text_answer
            FROM feedback f
            JOIN questions q ON f.question_id = q.id
            JOIN teacher_subjects ts ON f.teacher_subject_id = ts.id
            JOIN subjects s ON ts.subject_id = s.id
            WHERE f.teacher_subject_id = $1
              AND f.academic_year = $2
              AND ts.year = $3
              AND f.semester = $4
              AND s.department_id = $5
              AND q.type IN ($6, 'text-answer')
            ORDER BY f.username, q.type, q.id
            "#,
        )
        .bind(selector.teacher_subject_id)
        .bind(&selector.academic_year)
        .bind(selector.student_year)
        .bind(selector.semester)
        .bind(selector.department_id)
        .bind(subject_type.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch raw feedback")?;

        let rows = records
            .into_iter()
            .map(|r| {
                Ok(RawFeedback {
                    username: r.username,
                    question_text: r.question_text,
                    question_type: r.question_type.parse().map_err(|e: String| anyhow!(e))?,
                    rating: r.rating,
                    text_answer: r.text_answer,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(rows)
    }

    async fn link_subject_type(&self, teacher_subject_id: i64) -> Result<Option<SubjectType>> {
        let value = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT s.type
            FROM teacher_subjects ts
            JOIN subjects s ON ts.subject_id = s.id
            WHERE ts.id = $1
            "#,
        )
        .bind(teacher_subject_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch teacher-subject link")?;

        Ok(value.map(|v| SubjectType::from_db(v.as_deref())))
    }

    async fn question_type(&self, question_id: i64) -> Result<Option<QuestionType>> {
        let value = sqlx::query_scalar::<_, String>("SELECT type FROM questions WHERE id = $1")
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch question")?;

        let parsed = value
            .map(|v| v.parse::<QuestionType>().map_err(|e| anyhow!(e)))
            .transpose()?;
        Ok(parsed)
    }

    async fn record_submission(&self, username: &str, submission: &FeedbackSubmission) -> Result<SubmitOutcome> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let state = sqlx::query_as::<_, CredentialStateRecord>(
            "SELECT used, semester::int AS semester FROM student_login WHERE username = $1 FOR UPDATE",
        )
        .bind(username)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to lock student login")?;

        let Some(state) = state else {
            return Ok(SubmitOutcome::UnknownCredential);
        };
        if state.used {
            return Ok(SubmitOutcome::AlreadyUsed);
        }

        for answer in &submission.answers {
            sqlx::query(
                r#"
                INSERT INTO feedback (
                    teacher_subject_id, academic_year, semester, rating,
                    text_answer, question_id, submission_id, username
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(answer.teacher_subject_id)
            .bind(&submission.academic_year)
            .bind(state.semester)
            .bind(answer.rating)
            .bind(&answer.text_answer)
            .bind(answer.question_id)
            .bind(submission.submission_id)
            .bind(username)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert answer for question {}", answer.question_id))?;
        }

        sqlx::query("UPDATE student_login SET used = TRUE WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await
            .context("Failed to mark student login as used")?;

        tx.commit().await.context("Failed to commit submission")?;

        Ok(SubmitOutcome::Recorded {
            answers: submission.answers.len(),
        })
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn department_name(&self, department_id: i32) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM departments WHERE id = $1")
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch department")?;

        Ok(name)
    }

    async fn issue_credentials(&self, batch: &CredentialBatch) -> Result<Vec<Credential>> {
        let prefix = batch.pattern.prefix();
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        // Usernames only collide within one prefix; the lock is released on
        // commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(prefix)
            .execute(&mut *tx)
            .await
            .context("Failed to lock username prefix")?;

        let taken: HashSet<String> = sqlx::query_scalar::<_, String>(
            "SELECT username FROM student_login WHERE username LIKE $1 || '%'",
        )
        .bind(prefix)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to read existing usernames")?
        .into_iter()
        .collect();

        debug!(prefix, taken = taken.len(), "Existing usernames loaded");

        let credentials = batch.plan(&taken, &mut rand::thread_rng())?;

        let usernames: Vec<String> = credentials.iter().map(|c| c.username.clone()).collect();
        let passwords: Vec<String> = credentials.iter().map(|c| c.password.clone()).collect();

        sqlx::query(
            r#"
            INSERT INTO student_login (
                department_id, username, password, year, semester, academic_year, used
            )
            SELECT $1, u.username, u.password, $2, $3, $4, FALSE
            FROM UNNEST($5::text[], $6::text[]) AS u(username, password)
            "#,
        )
        .bind(batch.department_id)
        .bind(batch.year)
        .bind(batch.semester)
        .bind(&batch.academic_year)
        .bind(&usernames)
        .bind(&passwords)
        .execute(&mut *tx)
        .await
        .context("Failed to insert student logins")?;

        tx.commit().await.context("Failed to commit student logins")?;

        info!(
            department_id = batch.department_id,
            prefix,
            count = credentials.len(),
            "Student logins issued"
        );

        Ok(credentials)
    }

    async fn delete_credentials(&self, department_id: i32, used_only: bool) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM student_login WHERE department_id = $1 AND ($2 = FALSE OR used = TRUE)",
        )
        .bind(department_id)
        .bind(used_only)
        .execute(&self.pool)
        .await
        .context("Failed to delete student logins")?;

        Ok(result.rows_affected())
    }
}
