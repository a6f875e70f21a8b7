// feedback-report-service/src/layout/mod.rs
//
// Greedy word wrapping against glyph advance widths. The composer uses the
// same `wrap_lines` result both to decide page breaks and to draw, so the
// estimate and the printed block can never disagree.

mod metrics;

pub use metrics::StandardFont;

/// Every wrapped line takes `font_size * LINE_HEIGHT_FACTOR` vertically.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

pub trait FontMetrics {
    /// Advance width of one glyph in 1/1000 em.
    fn advance(&self, ch: char) -> f32;

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.advance(c)).sum::<f32>() * font_size / 1000.0
    }
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_HEIGHT_FACTOR
}

/// Splits on single spaces and packs words while the line stays within
/// `max_width`. A word wider than `max_width` gets a line of its own and is
/// never broken. Empty input yields one empty line.
pub fn wrap_lines(
    text: &str,
    metrics: &impl FontMetrics,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if metrics.text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    lines.push(current);
    lines
}

/// A measured paragraph: the wrapped lines plus the vertical space they take.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font_size: f32,
}

impl TextBlock {
    pub fn measure(text: &str, metrics: &impl FontMetrics, font_size: f32, max_width: f32) -> Self {
        Self {
            lines: wrap_lines(text, metrics, font_size, max_width),
            font_size,
        }
    }

    pub fn line_height(&self) -> f32 {
        line_height(self.font_size)
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height()
    }
}

pub fn block_height(text: &str, metrics: &impl FontMetrics, font_size: f32, max_width: f32) -> f32 {
    TextBlock::measure(text, metrics, font_size, max_width).height()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every glyph is `advance` thousandths of an em wide.
    pub(crate) struct Monospace(pub f32);

    impl FontMetrics for Monospace {
        fn advance(&self, _ch: char) -> f32 {
            self.0
        }
    }

    // At size 10 with 500/1000 em per glyph each character is 5pt wide.
    const MONO: Monospace = Monospace(500.0);

    #[test]
    fn short_text_fits_on_one_line() {
        let lines = wrap_lines("hello world", &MONO, 10.0, 100.0);
        assert_eq!(lines, vec!["hello world".to_string()]);
    }

    #[test]
    fn words_exactly_max_width_each_take_a_line() {
        // "abcd" is 20pt wide.
        for k in 1..6 {
            let text = vec!["abcd"; k].join(" ");
            assert_eq!(wrap_lines(&text, &MONO, 10.0, 20.0).len(), k);
        }
    }

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(wrap_lines("", &MONO, 10.0, 50.0), vec![String::new()]);
        assert_eq!(block_height("", &MONO, 10.0, 50.0), 12.0);
    }

    #[test]
    fn overlong_words_are_not_broken() {
        let lines = wrap_lines("a supercalifragilistic b", &MONO, 10.0, 30.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn greedy_packing() {
        // 6 chars per line at 30pt.
        let lines = wrap_lines("ab cd ef gh", &MONO, 10.0, 30.0);
        assert_eq!(lines, vec!["ab cd", "ef gh"]);
        let block = TextBlock::measure("ab cd ef gh", &MONO, 10.0, 30.0);
        assert_eq!(block.height(), 2.0 * 12.0);
    }

    #[test]
    fn helvetica_width_matches_afm() {
        // H(722) + i(222) at 10pt
        let w = StandardFont::Helvetica.text_width("Hi", 10.0);
        assert!((w - 9.44).abs() < 1e-4);
    }
}
