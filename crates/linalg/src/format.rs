//! Text rendering of matrices and vectors

use moment_fixed_point::{ScaledInteger, ScaledVector};

use crate::matrix::Matrix;

/// How numbers are rendered by [`format_matrix`] and [`format_vector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    /// Fractional decimal digits (exact, truncated)
    pub precision: usize,
    /// Minimum field width, left-aligned; 0 disables padding
    pub width: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            width: 0,
        }
    }
}

impl FormatConfig {
    /// Short output for diagnostics
    pub fn debug() -> Self {
        Self {
            precision: 5,
            width: 0,
        }
    }

    /// `precision` digits in columns wide enough to line up
    pub fn aligned(precision: usize) -> Self {
        Self {
            precision,
            width: precision + precision / 2,
        }
    }

    fn render(&self, value: &ScaledInteger) -> String {
        let text = value.to_decimal_string(self.precision);
        format!("{:<width$}", text, width = self.width)
    }
}

/// One logical row per line, entries separated by tabs
pub fn format_matrix(matrix: &Matrix, config: &FormatConfig) -> String {
    let dim = matrix.dim();
    let mut out = String::new();
    for row in 0..dim {
        let cells: Vec<String> = (0..dim)
            .map(|col| config.render(matrix.at(row, col)))
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// All entries on one line, separated by tabs
pub fn format_vector(vector: &ScaledVector, config: &FormatConfig) -> String {
    vector
        .iter()
        .map(|value| config.render(value))
        .collect::<Vec<_>>()
        .join("\t")
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_matrix(self, &FormatConfig::default()))
    }
}
