// feedback-report-service/src/renderers/login_sheet.rs

use chrono::NaiveDateTime;

use super::feedback_report::underscore_whitespace;
use super::{login_sheet_layout, Canvas, PageCursor, TemplateKind};
use crate::error::Result;
use crate::layout::StandardFont;
use crate::models::Credential;

pub struct LoginSheetInput<'a> {
    pub department_name: &'a str,
    pub year: i32,
    pub semester: i32,
    pub academic_year: &'a str,
    pub generated_at: NaiveDateTime,
    pub credentials: &'a [Credential],
}

pub fn login_sheet_filename(department_name: &str, year_prefix: &str, epoch_millis: i64) -> String {
    format!(
        "StudentLogins_{}_{}_{}.pdf",
        underscore_whitespace(department_name),
        year_prefix,
        epoch_millis
    )
}

/// Two-column username/password listing. Every page repeats the header
/// fields and the column titles.
pub fn compose_login_sheet(canvas: &mut impl Canvas, input: &LoginSheetInput<'_>) -> Result<()> {
    let layout = login_sheet_layout();
    let page_size = canvas.page_size(TemplateKind::StudentLogin);
    let table_top = page_size.height - layout.table_offset;

    let mut cursor = PageCursor::new(TemplateKind::StudentLogin, page_size, table_top, layout.bottom);

    canvas.start_page(TemplateKind::StudentLogin)?;
    stamp_page(canvas, input, &mut cursor);

    for credential in input.credentials {
        if cursor.ensure_room(canvas, 0.0)? {
            stamp_page(canvas, input, &mut cursor);
        }

        let font = StandardFont::Helvetica;
        canvas.draw_text(&credential.username, font, layout.text_size, layout.username_x, cursor.y);
        canvas.draw_text(&credential.password, font, layout.text_size, layout.password_x, cursor.y);
        cursor.advance(layout.row_gap);
    }

    Ok(())
}

fn stamp_page(canvas: &mut impl Canvas, input: &LoginSheetInput<'_>, cursor: &mut PageCursor) {
    let layout = login_sheet_layout();
    let regular = StandardFont::Helvetica;
    let size = layout.field_size;

    canvas.draw_text(input.department_name, regular, size, layout.department.x, layout.department.y);
    canvas.draw_text(&input.year.to_string(), regular, size, layout.year.x, layout.year.y);
    canvas.draw_text(input.academic_year, regular, size, layout.academic_year.x, layout.academic_year.y);
    canvas.draw_text(
        input.academic_year,
        regular,
        size,
        layout.academic_year_repeat.x,
        layout.academic_year_repeat.y,
    );
    canvas.draw_text(&input.semester.to_string(), regular, size, layout.semester.x, layout.semester.y);
    canvas.draw_text(
        &input.generated_at.format("%d/%m/%Y, %I:%M:%S %P").to_string(),
        regular,
        layout.date_size,
        layout.generated_at.x,
        layout.generated_at.y,
    );

    let bold = StandardFont::HelveticaBold;
    canvas.draw_text("Username", bold, layout.text_size, layout.username_x, cursor.y);
    canvas.draw_text("Password", bold, layout.text_size, layout.password_x, cursor.y);
    cursor.advance(layout.title_gap);
}
