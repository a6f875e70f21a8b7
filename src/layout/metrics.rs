// feedback-report-service/src/layout/metrics.rs
//
// Advance widths of the PDF base-14 Helvetica faces, in 1/1000 em, for the
// printable ASCII range 0x20..=0x7E. Taken from the Adobe core AFM files.

use super::FontMetrics;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Glyphs outside the table are measured like a digit.
const FALLBACK_ADVANCE: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    fn table(&self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica => &HELVETICA,
            StandardFont::HelveticaBold => &HELVETICA_BOLD,
        }
    }
}

impl FontMetrics for StandardFont {
    fn advance(&self, ch: char) -> f32 {
        let code = ch as u32;
        let width = if (0x20..=0x7E).contains(&code) {
            self.table()[(code - 0x20) as usize]
        } else {
            FALLBACK_ADVANCE
        };
        width as f32
    }
}
