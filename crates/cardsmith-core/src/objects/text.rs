//! Text box content and approximate layout.

use serde::{Deserialize, Serialize};

/// Average glyph advance as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f64 = 0.55;

/// Default line height as a multiple of the font size.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.16;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Content and typography of a text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

fn default_line_height() -> f64 {
    DEFAULT_LINE_HEIGHT
}

impl TextContent {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_weight: FontWeight::default(),
            align: TextAlign::default(),
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Approximate advance width of a run of text.
    pub fn measure(&self, run: &str) -> f64 {
        let factor = match self.font_weight {
            FontWeight::Normal => CHAR_WIDTH_FACTOR,
            FontWeight::Bold => CHAR_WIDTH_FACTOR * 1.1,
        };
        run.chars().count() as f64 * self.font_size * factor
    }

    /// Greedy word wrap into lines no wider than `width`.
    ///
    /// Explicit newlines always break. A single word wider than `width`
    /// occupies its own line.
    pub fn wrap(&self, width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in self.text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if self.measure(&candidate) <= width + 1e-9 {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                }
            }
            lines.push(current);
        }
        lines
    }

    /// Number of wrapped lines at `width`.
    pub fn line_count(&self, width: f64) -> usize {
        self.wrap(width).len()
    }

    /// Height of the wrapped text block at `width`.
    pub fn layout_height(&self, width: f64) -> f64 {
        self.line_count(width) as f64 * self.font_size * self.line_height
    }

    /// Width of the widest unwrapped line, used for new text boxes.
    pub fn natural_width(&self) -> f64 {
        self.text
            .split('\n')
            .map(|line| self.measure(line))
            .fold(0.0, f64::max)
    }
}
