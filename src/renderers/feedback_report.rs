// feedback-report-service/src/renderers/feedback_report.rs

use tracing::{debug, warn};

use super::{draw_block, report_layout, Canvas, PageCursor, TemplateKind, SUGGESTIONS};
use crate::error::{ReportError, Result};
use crate::layout::{StandardFont, TextBlock};
use crate::models::{RatingRow, ReportContext, SuggestionGroup};

pub const NO_FEEDBACK: &str = "No Feedback Available";
pub const NO_SUGGESTIONS: &str = "No Suggestions Questions Available";
pub const SUGGESTIONS_TITLE: &str = "Suggestions";

pub struct FeedbackReportInput<'a> {
    pub context: &'a ReportContext,
    pub ratings: &'a [RatingRow],
    pub suggestions: &'a [SuggestionGroup],
}

pub fn feedback_filename(teacher: &str, subject: &str, academic_year: &str, semester: i32) -> String {
    format!(
        "Feedback_{}_{}_{}_{}.pdf",
        underscore_whitespace(teacher),
        underscore_whitespace(subject),
        academic_year,
        semester
    )
}

pub(crate) fn underscore_whitespace(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Lays out a complete teacher-subject report: the type-specific summary page
/// followed by as many header pages as the suggestions need.
pub fn compose_feedback_report(canvas: &mut impl Canvas, input: &FeedbackReportInput<'_>) -> Result<()> {
    draw_summary_page(canvas, input)?;
    draw_suggestions(canvas, input.suggestions)?;

    debug!(pages = canvas.page_count(), "Feedback report composed");
    Ok(())
}

fn draw_summary_page(canvas: &mut impl Canvas, input: &FeedbackReportInput<'_>) -> Result<()> {
    let ctx = input.context;
    let layout = report_layout(ctx.subject_type);

    canvas.start_page(layout.template)?;

    let bold = StandardFont::HelveticaBold;
    let size = layout.field_size;
    canvas.draw_text(&ctx.teacher_name, bold, size, layout.teacher.x, layout.teacher.y);
    canvas.draw_text(&ctx.department_name, bold, size, layout.department.x, layout.department.y);
    canvas.draw_text(
        &ctx.feedback_count.to_string(),
        bold,
        size,
        layout.feedback_count.x,
        layout.feedback_count.y,
    );
    canvas.draw_text(&ctx.subject_name, bold, size, layout.subject.x, layout.subject.y);
    canvas.draw_text(
        &ctx.generated_at.format("%d/%m/%Y, %I:%M %P").to_string(),
        StandardFont::Helvetica,
        size,
        layout.generated_at.x,
        layout.generated_at.y,
    );

    if input.ratings.is_empty() {
        canvas.draw_text(
            NO_FEEDBACK,
            StandardFont::Helvetica,
            layout.empty_ratings_size,
            layout.empty_ratings.x,
            layout.empty_ratings.y,
        );
        return Ok(());
    }

    // The ratings grid is pre-printed with a fixed number of rows; anything
    // past the last slot is not rendered.
    if input.ratings.len() > layout.rating_rows.len() {
        warn!(
            template = layout.template.file_label(),
            rows = input.ratings.len(),
            slots = layout.rating_rows.len(),
            "Ratings exceed template rows, extra rows dropped"
        );
    }

    for (row, &y) in input.ratings.iter().zip(layout.rating_rows) {
        for (cell, &x) in row.table_cells().iter().zip(&layout.rating_columns) {
            canvas.draw_text(cell, StandardFont::Helvetica, layout.rating_size, x, y);
        }
    }

    Ok(())
}

fn draw_suggestions(canvas: &mut impl Canvas, groups: &[SuggestionGroup]) -> Result<()> {
    let s = &SUGGESTIONS;

    canvas.start_page(TemplateKind::Header)?;
    let page_size = canvas.page_size(TemplateKind::Header);
    let mut cursor = PageCursor::new(TemplateKind::Header, page_size, s.top, s.bottom);
    let max_width = page_size.width - s.left - s.right;

    canvas.draw_text(SUGGESTIONS_TITLE, StandardFont::HelveticaBold, s.title_size, s.left, cursor.y);
    cursor.advance(s.title_gap);

    if groups.is_empty() {
        canvas.draw_text(NO_SUGGESTIONS, StandardFont::Helvetica, s.empty_size, s.left, cursor.y);
        return Ok(());
    }

    for (index, group) in groups.iter().enumerate() {
        let heading = format!("{}. {}", index + 1, group.question);
        let block = TextBlock::measure(&heading, &StandardFont::HelveticaBold, s.question_size, max_width);
        place_block(canvas, &mut cursor, &block, StandardFont::HelveticaBold, s.left, s.question_gap)?;

        for answer in &group.answers {
            let bullet = format!("- {answer}");
            let block = TextBlock::measure(
                &bullet,
                &StandardFont::Helvetica,
                s.answer_size,
                max_width - s.answer_indent,
            );
            place_block(
                canvas,
                &mut cursor,
                &block,
                StandardFont::Helvetica,
                s.left + s.answer_indent,
                s.answer_gap,
            )?;
        }

        cursor.advance(s.between_questions);
    }

    Ok(())
}

fn place_block(
    canvas: &mut impl Canvas,
    cursor: &mut PageCursor,
    block: &TextBlock,
    font: StandardFont,
    x: f32,
    gap: f32,
) -> Result<()> {
    let height = block.height() + gap;
    if height <= cursor.top_margin - cursor.bottom_margin {
        cursor.ensure_room(canvas, height)?;
        draw_block(canvas, block, font, x, cursor.y);
        cursor.advance(height);
        return Ok(());
    }

    // Taller than a whole page: fill the current page, then continue.
    let line_height = block.line_height();
    let mut rest = block.lines.as_slice();
    while !rest.is_empty() {
        let room = cursor.lines_left(line_height);
        if room == 0 {
            if cursor.at_top() {
                return Err(ReportError::Render(format!(
                    "line height {line_height} exceeds the page body"
                )));
            }
            cursor.ensure_room(canvas, line_height)?;
            continue;
        }

        let (chunk, tail) = rest.split_at(room.min(rest.len()));
        let chunk = TextBlock {
            lines: chunk.to_vec(),
            font_size: block.font_size,
        };
        draw_block(canvas, &chunk, font, x, cursor.y);
        cursor.advance(chunk.height());
        rest = tail;
    }

    debug!(lines = block.lines.len(), "Oversized block split across pages");
    cursor.advance(gap);
    Ok(())
}
