// feedback-report-service/src/renderers/mod.rs

mod coordinates;
mod feedback_report;
mod login_sheet;
mod pdf;
mod templates;

pub use coordinates::{
    login_sheet_layout, report_layout, LoginSheetLayout, Point, ReportLayout, SuggestionsLayout,
    SUGGESTIONS,
};
pub use feedback_report::{compose_feedback_report, feedback_filename, FeedbackReportInput};
pub use login_sheet::{compose_login_sheet, login_sheet_filename, LoginSheetInput};
pub use pdf::PdfCanvas;
pub use templates::{TemplateAsset, TemplateSet};

use crate::error::Result;
use crate::layout::{StandardFont, TextBlock};

/// The background artwork a page is stamped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Theory,
    Practical,
    Header,
    StudentLogin,
}

impl TemplateKind {
    pub fn file_label(&self) -> &'static str {
        match self {
            TemplateKind::Theory => "theory",
            TemplateKind::Practical => "practical",
            TemplateKind::Header => "header",
            TemplateKind::StudentLogin => "student_login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Drawing surface in PDF points, origin bottom-left.
pub trait Canvas {
    fn page_size(&self, template: TemplateKind) -> PageSize;

    /// Appends a page stamped with `template`; later text lands on it.
    fn start_page(&mut self, template: TemplateKind) -> Result<()>;

    fn draw_text(&mut self, text: &str, font: StandardFont, size: f32, x: f32, y: f32);

    fn page_count(&self) -> usize;
}

/// Draws a measured block with its first baseline at `y`.
pub fn draw_block(
    canvas: &mut impl Canvas,
    block: &TextBlock,
    font: StandardFont,
    x: f32,
    y: f32,
) {
    for (i, line) in block.lines.iter().enumerate() {
        let baseline = y - i as f32 * block.line_height();
        canvas.draw_text(line, font, block.font_size, x, baseline);
    }
}

/// Vertical position tracker for one document. Lives only for the duration
/// of a single composition call.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCursor {
    pub template: TemplateKind,
    pub page_size: PageSize,
    pub y: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
}

impl PageCursor {
    pub fn new(template: TemplateKind, page_size: PageSize, top_margin: f32, bottom_margin: f32) -> Self {
        Self {
            template,
            page_size,
            y: top_margin,
            top_margin,
            bottom_margin,
        }
    }

    pub fn fits(&self, height: f32) -> bool {
        self.y - height >= self.bottom_margin
    }

    pub fn at_top(&self) -> bool {
        self.y >= self.top_margin
    }

    /// Whole lines of `line_height` that still fit above the bottom margin.
    pub fn lines_left(&self, line_height: f32) -> usize {
        ((self.y - self.bottom_margin) / line_height).floor().max(0.0) as usize
    }

    /// Starts a fresh page when a block of `height` would cross the bottom
    /// margin. Returns whether a page was added. A page nothing has been
    /// placed on yet is never abandoned.
    pub fn ensure_room(&mut self, canvas: &mut impl Canvas, height: f32) -> Result<bool> {
        if self.fits(height) || self.at_top() {
            return Ok(false);
        }

        canvas.start_page(self.template)?;
        self.y = self.top_margin;
        Ok(true)
    }

    pub fn advance(&mut self, height: f32) {
        self.y = (self.y - height).max(0.0);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct DrawnText {
        pub text: String,
        pub font: StandardFont,
        pub size: f32,
        pub x: f32,
        pub y: f32,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedPage {
        pub template: TemplateKind,
        pub texts: Vec<DrawnText>,
    }

    impl RecordedPage {
        pub fn contains(&self, text: &str) -> bool {
            self.texts.iter().any(|t| t.text == text)
        }
    }

    /// Canvas that keeps every draw call for inspection.
    pub struct RecordingCanvas {
        pub size: PageSize,
        pub pages: Vec<RecordedPage>,
        pub missing: Option<TemplateKind>,
    }

    impl RecordingCanvas {
        pub fn new() -> Self {
            Self {
                size: PageSize {
                    width: 612.0,
                    height: 792.0,
                },
                pages: Vec::new(),
                missing: None,
            }
        }
    }

    impl Canvas for RecordingCanvas {
        fn page_size(&self, _template: TemplateKind) -> PageSize {
            self.size
        }

        fn start_page(&mut self, template: TemplateKind) -> Result<()> {
            if self.missing == Some(template) {
                return Err(crate::error::ReportError::TemplateMissing(template));
            }
            self.pages.push(RecordedPage {
                template,
                texts: Vec::new(),
            });
            Ok(())
        }

        fn draw_text(&mut self, text: &str, font: StandardFont, size: f32, x: f32, y: f32) {
            let page = self.pages.last_mut().expect("draw before first page");
            page.texts.push(DrawnText {
                text: text.to_string(),
                font,
                size,
                x,
                y,
            });
        }

        fn page_count(&self) -> usize {
            self.pages.len()
        }
    }
}
