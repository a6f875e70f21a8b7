// feedback-report-service/src/renderers/coordinates.rs
//
// Overlay positions, in points from the bottom-left corner, matching the
// printed template artwork. Changing the artwork means changing these tables
// and nothing else.

use super::TemplateKind;
use crate::models::SubjectType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

const fn at(x: f32, y: f32) -> Point {
    Point { x, y }
}

/// First page of a feedback report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub template: TemplateKind,
    pub teacher: Point,
    pub department: Point,
    pub feedback_count: Point,
    pub subject: Point,
    pub generated_at: Point,
    pub field_size: f32,
    /// Five bucket percentages then the average.
    pub rating_columns: [f32; 6],
    /// Baselines of the printed grid rows. Rows beyond these are not drawn.
    pub rating_rows: &'static [f32],
    pub rating_size: f32,
    pub empty_ratings: Point,
    pub empty_ratings_size: f32,
}

const RATING_COLUMNS: [f32; 6] = [290.0, 346.0, 394.0, 443.0, 493.0, 547.0];

static THEORY: ReportLayout = ReportLayout {
    template: TemplateKind::Theory,
    teacher: at(100.0, 662.0),
    department: at(430.0, 662.0),
    feedback_count: at(155.0, 633.0),
    subject: at(400.0, 633.0),
    generated_at: at(315.0, 604.0),
    field_size: 14.0,
    rating_columns: RATING_COLUMNS,
    rating_rows: &[409.0, 370.0, 330.0, 300.0, 260.0, 220.0, 184.0, 149.0, 110.0],
    rating_size: 14.0,
    empty_ratings: at(50.0, 500.0),
    empty_ratings_size: 12.0,
};

static PRACTICAL: ReportLayout = ReportLayout {
    template: TemplateKind::Practical,
    teacher: at(100.0, 662.0),
    department: at(430.0, 662.0),
    feedback_count: at(155.0, 633.0),
    subject: at(400.0, 633.0),
    generated_at: at(315.0, 604.0),
    field_size: 14.0,
    rating_columns: RATING_COLUMNS,
    rating_rows: &[413.0, 380.0, 350.0, 311.0, 278.0, 239.0, 200.0, 171.0, 141.0, 112.0],
    rating_size: 14.0,
    empty_ratings: at(50.0, 500.0),
    empty_ratings_size: 12.0,
};

pub fn report_layout(subject_type: SubjectType) -> &'static ReportLayout {
    match subject_type {
        SubjectType::Theory => &THEORY,
        SubjectType::Practical => &PRACTICAL,
    }
}

/// Free-form continuation pages stamped with the header template.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionsLayout {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub title_size: f32,
    pub title_gap: f32,
    pub question_size: f32,
    pub question_gap: f32,
    pub answer_indent: f32,
    pub answer_size: f32,
    pub answer_gap: f32,
    pub between_questions: f32,
    pub empty_size: f32,
}

pub static SUGGESTIONS: SuggestionsLayout = SuggestionsLayout {
    top: 680.0,
    bottom: 50.0,
    left: 50.0,
    right: 50.0,
    title_size: 16.0,
    title_gap: 30.0,
    question_size: 12.0,
    question_gap: 25.0,
    answer_indent: 10.0,
    answer_size: 11.0,
    answer_gap: 5.0,
    between_questions: 15.0,
    empty_size: 16.0,
};

/// Credential listing. Header fields are re-stamped on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSheetLayout {
    pub department: Point,
    pub year: Point,
    pub academic_year: Point,
    pub academic_year_repeat: Point,
    pub semester: Point,
    pub generated_at: Point,
    pub field_size: f32,
    pub date_size: f32,
    pub username_x: f32,
    pub password_x: f32,
    /// Distance from the top edge to the column titles.
    pub table_offset: f32,
    pub title_gap: f32,
    pub row_gap: f32,
    pub bottom: f32,
    pub text_size: f32,
}

static LOGIN_SHEET: LoginSheetLayout = LoginSheetLayout {
    department: at(160.0, 665.0),
    year: at(120.0, 650.0),
    academic_year: at(360.0, 665.0),
    academic_year_repeat: at(310.0, 650.0),
    semester: at(500.0, 665.0),
    generated_at: at(500.0, 650.0),
    field_size: 12.0,
    date_size: 10.0,
    username_x: 80.0,
    password_x: 300.0,
    table_offset: 250.0,
    title_gap: 25.0,
    row_gap: 20.0,
    bottom: 100.0,
    text_size: 12.0,
};

pub fn login_sheet_layout() -> &'static LoginSheetLayout {
    &LOGIN_SHEET
}
