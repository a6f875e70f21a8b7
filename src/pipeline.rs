// feedback-report-service/src/pipeline.rs

use chrono::{Local, Utc};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::aggregation::{feedback_matrix, group_suggestions, FeedbackMatrix};
use crate::config::{Config, TemplateConfig};
use crate::credentials::CredentialBatch;
use crate::error::{ReportError, Result};
use crate::models::{
    AnalysisSelector, AnalysisSubject, FeedbackSubmission, GeneratedDocument, ReportContext,
    ReportSelector, Scope, SubmitOutcome, TeacherSubjectListing, TeacherSummary,
};
use crate::persistence::{CredentialStore, FeedbackStore};
use crate::renderers::{
    compose_feedback_report, compose_login_sheet, feedback_filename, login_sheet_filename,
    report_layout, Canvas, FeedbackReportInput, LoginSheetInput, PdfCanvas, TemplateKind,
    TemplateSet,
};
use crate::review::{teacher_analysis, TeacherAnalysis};

const PDF_MIME: &str = "application/pdf";

/// Orchestrates: lookups → template loading → layout on the blocking pool →
/// serialized document.
#[derive(Clone)]
pub struct ReportPipeline {
    feedback: Arc<dyn FeedbackStore>,
    credentials: Arc<dyn CredentialStore>,
    templates: TemplateConfig,
    render_timeout: Duration,
}

impl ReportPipeline {
    pub fn new(
        feedback: Arc<dyn FeedbackStore>,
        credentials: Arc<dyn CredentialStore>,
        config: &Config,
    ) -> Self {
        Self {
            feedback,
            credentials,
            templates: config.templates.clone(),
            render_timeout: config.report.render_timeout(),
        }
    }

    /// Builds the paginated feedback report for one teacher-subject link.
    #[instrument(skip(self, selector), fields(
        department_id = selector.department_id,
        teacher_subject_id = selector.teacher_subject_id,
        academic_year = %selector.academic_year
    ))]
    pub async fn feedback_report(&self, selector: ReportSelector) -> Result<GeneratedDocument> {
        let (assignment, feedback_count, ratings, answers, text_questions) = futures::try_join!(
            self.feedback.assignment_info(&selector),
            self.feedback.feedback_count(&selector),
            self.feedback.rating_rows(&selector),
            self.feedback.text_answers(&selector),
            self.feedback.text_questions(),
        )?;

        let assignment = assignment
            .ok_or_else(|| ReportError::NotFound("Teacher-subject assignment not found".into()))?;

        info!(
            feedback_count,
            ratings = ratings.len(),
            answers = answers.len(),
            subject_type = assignment.subject_type.as_str(),
            "Report data loaded"
        );

        let filename = feedback_filename(
            &assignment.teacher_name,
            &assignment.subject_name,
            &selector.academic_year,
            selector.semester,
        );
        let context = ReportContext {
            teacher_name: assignment.teacher_name,
            subject_name: assignment.subject_name,
            subject_type: assignment.subject_type,
            department_name: assignment.department_name,
            feedback_count,
            generated_at: Local::now().naive_local(),
        };
        let suggestions = group_suggestions(&text_questions, &answers);
        let type_template = report_layout(context.subject_type).template;

        let document = self
            .render(
                filename,
                &[type_template, TemplateKind::Header],
                move |canvas| {
                    compose_feedback_report(
                        canvas,
                        &FeedbackReportInput {
                            context: &context,
                            ratings: &ratings,
                            suggestions: &suggestions,
                        },
                    )
                },
            )
            .await?;

        Ok(document)
    }

    /// Row-per-student matrix for spreadsheet export.
    #[instrument(skip(self, selector), fields(
        department_id = selector.department_id,
        teacher_subject_id = selector.teacher_subject_id
    ))]
    pub async fn feedback_matrix(&self, selector: ReportSelector) -> Result<FeedbackMatrix> {
        let subject_type = self
            .feedback
            .subject_type(selector.department_id, selector.teacher_subject_id)
            .await?
            .ok_or_else(|| ReportError::NotFound("Subject not found".into()))?;

        let students = self.feedback.submitted_students(&selector).await?;
        if students.is_empty() {
            debug!("No submissions for selector");
            return Ok(FeedbackMatrix::default());
        }

        let (questions, raw) = futures::try_join!(
            self.feedback.questions_for(subject_type),
            self.feedback.raw_feedback(&selector, subject_type),
        )?;

        Ok(feedback_matrix(subject_type, &questions, &students, &raw))
    }

    #[instrument(skip(self, selector), fields(
        department_id = selector.department_id,
        teacher_id = selector.teacher_id
    ))]
    pub async fn teacher_analysis(&self, selector: AnalysisSelector) -> Result<TeacherAnalysis> {
        let subject_type = match selector.teacher_subject.as_option() {
            Some(&teacher_subject_id) => Some(
                self.feedback
                    .subject_type(selector.department_id, teacher_subject_id)
                    .await?
                    .ok_or_else(|| ReportError::NotFound("Subject not found".into()))?,
            ),
            None => None,
        };

        let rows = self.feedback.analysis_rows(&selector, subject_type).await?;
        info!(rows = rows.len(), "Analysis rows aggregated");

        Ok(teacher_analysis(&rows))
    }

    /// Years offered by the analysis picker, `All` first.
    pub async fn analysis_years(&self, department_id: i32) -> Result<Vec<Scope<String>>> {
        let years = self.feedback.analysis_years(department_id).await?;
        Ok(std::iter::once(Scope::All)
            .chain(years.into_iter().map(Scope::Only))
            .collect())
    }

    pub async fn analysis_teachers(
        &self,
        department_id: i32,
        academic_year: Scope<String>,
    ) -> Result<Vec<TeacherSummary>> {
        self.feedback
            .analysis_teachers(department_id, &academic_year)
            .await
    }

    /// The teacher's subjects behind an `All Subjects` entry.
    pub async fn analysis_subjects(
        &self,
        department_id: i32,
        teacher_id: i64,
        academic_year: Scope<String>,
    ) -> Result<Vec<AnalysisSubject>> {
        let subjects = self
            .feedback
            .analysis_subjects(department_id, teacher_id, &academic_year)
            .await?;

        debug!(teacher_id, subjects = subjects.len(), "Analysis subjects listed");
        Ok(std::iter::once(AnalysisSubject::all_subjects())
            .chain(subjects)
            .collect())
    }

    pub async fn teacher_subjects(
        &self,
        department_id: i32,
        academic_year: &str,
        year: i32,
    ) -> Result<Vec<TeacherSubjectListing>> {
        self.feedback
            .teacher_subjects(department_id, academic_year, year)
            .await
    }

    /// Issues a batch of logins and renders the listing handed to students.
    #[instrument(skip(self, batch), fields(
        department_id = batch.department_id,
        year = batch.year,
        count = batch.count
    ))]
    pub async fn credential_sheet(&self, batch: CredentialBatch) -> Result<GeneratedDocument> {
        let department_name = self
            .credentials
            .department_name(batch.department_id)
            .await?
            .ok_or_else(|| ReportError::NotFound("Department not found".into()))?;

        // A missing template must not leave freshly issued logins behind.
        let templates = self
            .within_deadline(TemplateSet::load(&self.templates, &[TemplateKind::StudentLogin]))
            .await?;

        let credentials = self.credentials.issue_credentials(&batch).await?;

        let filename = login_sheet_filename(
            &department_name,
            batch.pattern.year_prefix,
            Utc::now().timestamp_millis(),
        );
        let generated_at = Local::now().naive_local();

        self.render_with(filename, templates, move |canvas| {
            compose_login_sheet(
                canvas,
                &LoginSheetInput {
                    department_name: &department_name,
                    year: batch.year,
                    semester: batch.semester,
                    academic_year: &batch.academic_year,
                    generated_at,
                    credentials: &credentials,
                },
            )
        })
        .await
    }

    pub async fn delete_credentials(&self, department_id: i32, used_only: bool) -> Result<u64> {
        let deleted = self
            .credentials
            .delete_credentials(department_id, used_only)
            .await?;

        info!(department_id, used_only, deleted, "Student logins deleted");
        Ok(deleted)
    }

    /// Validates every answer against its subject, then stores the sitting
    /// and consumes the student's login.
    #[instrument(skip(self, submission), fields(
        submission_id = %submission.submission_id,
        answers = submission.answers.len()
    ))]
    pub async fn submit_feedback(&self, username: &str, submission: FeedbackSubmission) -> Result<usize> {
        if submission.academic_year.trim().is_empty() {
            return Err(ReportError::Validation("Academic year is required".into()));
        }
        if submission.answers.is_empty() {
            return Err(ReportError::Validation("At least one answer is required".into()));
        }

        for answer in &submission.answers {
            let (subject_type, question_type) = futures::try_join!(
                self.feedback.link_subject_type(answer.teacher_subject_id),
                self.feedback.question_type(answer.question_id),
            )?;
            let subject_type = subject_type
                .ok_or_else(|| ReportError::NotFound("Teacher-subject link not found".into()))?;
            let question_type =
                question_type.ok_or_else(|| ReportError::NotFound("Question not found".into()))?;

            if question_type.is_rating() {
                if question_type != subject_type.question_type() {
                    return Err(ReportError::Validation(
                        "Question type does not match subject type".into(),
                    ));
                }
                if !matches!(answer.rating, Some(1..=5)) {
                    return Err(ReportError::Validation(format!(
                        "Question {} needs a rating between 1 and 5",
                        answer.question_id
                    )));
                }
            }
        }

        match self.feedback.record_submission(username, &submission).await? {
            SubmitOutcome::Recorded { answers } => {
                info!(username, answers, "Feedback recorded");
                Ok(answers)
            }
            SubmitOutcome::UnknownCredential => {
                Err(ReportError::NotFound("Student login not found".into()))
            }
            SubmitOutcome::AlreadyUsed => {
                warn!(username, "Repeated submission rejected");
                Err(ReportError::CredentialUsed(username.to_string()))
            }
        }
    }

    async fn render<F>(&self, filename: String, kinds: &[TemplateKind], compose: F) -> Result<GeneratedDocument>
    where
        F: FnOnce(&mut PdfCanvas) -> Result<()> + Send + 'static,
    {
        let templates = self
            .within_deadline(TemplateSet::load(&self.templates, kinds))
            .await?;
        self.render_with(filename, templates, compose).await
    }

    /// Lays out on the blocking pool. The printpdf document is created and
    /// dropped on that thread.
    async fn render_with<F>(&self, filename: String, templates: TemplateSet, compose: F) -> Result<GeneratedDocument>
    where
        F: FnOnce(&mut PdfCanvas) -> Result<()> + Send + 'static,
    {
        let start = Instant::now();
        let title = filename.trim_end_matches(".pdf").to_string();

        let layout = tokio::task::spawn_blocking(move || {
            let mut canvas = PdfCanvas::new(&title, templates)?;
            compose(&mut canvas)?;
            let pages = canvas.page_count();
            let content = canvas.finish()?;
            Ok::<_, ReportError>((content, pages))
        });

        let (content, page_count) = self
            .within_deadline(async {
                layout
                    .await
                    .map_err(|e| ReportError::Render(format!("Layout task failed: {e}")))?
            })
            .await?;

        let mut hasher = Sha256::new();
        hasher.update(&content);
        let sha256 = hex::encode(hasher.finalize());

        info!(
            filename = %filename,
            pages = page_count,
            size_kb = content.len() / 1024,
            sha256 = %sha256,
            rendering_duration_ms = start.elapsed().as_millis() as u64,
            "Document rendered"
        );

        Ok(GeneratedDocument {
            filename,
            mime_type: PDF_MIME.to_string(),
            content,
            page_count,
        })
    }

    async fn within_deadline<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.render_timeout, work)
            .await
            .map_err(|_| ReportError::Timeout(self.render_timeout.as_secs()))?
    }
}
