//! Confusion Matrix Plot
//!
//! Renders an annotated heatmap of a confusion matrix as an SVG document.

mod format;
mod palette;

pub use format::NumberFormat;
pub use palette::Palette;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MendError, Result};

const PX_PER_INCH: f64 = 72.0;
const TITLE_HEIGHT: f64 = 28.0;
const AXIS_TITLE_SPACE: f64 = 24.0;
const COLORBAR_WIDTH: f64 = 16.0;
const COLORBAR_GAP: f64 = 14.0;
const COLORBAR_TEXT_SPACE: f64 = 48.0;
const LABEL_CHAR_WIDTH: f64 = 7.0;
const FONT_SIZE: f64 = 12.0;

/// Display options for [`render_confusion_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Figure size in inches (width, height).
    pub fig_size: (f64, f64),
    pub number_format: NumberFormat,
    pub title: String,
    pub palette: Palette,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            fig_size: (7.0, 7.0),
            number_format: NumberFormat::default(),
            title: "Confusion matrix".to_string(),
            palette: Palette::default(),
        }
    }
}

/// A confusion matrix with its class labels, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub matrix: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

impl ConfusionMatrix {
    pub fn render(&self, opts: &PlotOptions) -> Result<String> {
        render_confusion_matrix(&self.matrix, &self.labels, opts)
    }
}

fn validate(matrix: &[Vec<f64>], labels: &[String]) -> Result<()> {
    let n = matrix.len();
    if n == 0 {
        return Err(MendError::InvalidMatrix("matrix is empty".into()));
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(MendError::InvalidMatrix(format!(
            "row {i} has {} values, expected {n}",
            row.len()
        )));
    }
    if labels.len() != n {
        return Err(MendError::InvalidMatrix(format!(
            "{} labels for {n} classes",
            labels.len()
        )));
    }
    if matrix.iter().flatten().any(|v| !v.is_finite()) {
        return Err(MendError::InvalidMatrix("values must be finite".into()));
    }
    Ok(())
}

/// Render `matrix` as an SVG heatmap.
///
/// Rows are true labels, columns predicted labels. Each cell is annotated
/// with its value, in white when the value exceeds half the matrix maximum
/// and in black otherwise.
///
/// # Examples
/// ```
/// use textmend::tools::plot::{render_confusion_matrix, PlotOptions};
///
/// let labels = vec!["cat".to_string(), "dog".to_string()];
/// let svg = render_confusion_matrix(&[vec![0.9, 0.1], vec![0.2, 0.8]], &labels, &PlotOptions::default()).unwrap();
/// assert!(svg.starts_with("<svg"));
/// assert!(svg.contains(">0.90</text>"));
/// ```
pub fn render_confusion_matrix(
    matrix: &[Vec<f64>],
    labels: &[String],
    opts: &PlotOptions,
) -> Result<String> {
    validate(matrix, labels)?;
    let n = matrix.len();

    let (fig_w, fig_h) = opts.fig_size;
    if !(fig_w.is_finite() && fig_h.is_finite() && fig_w > 0.0 && fig_h > 0.0) {
        return Err(MendError::PlotOption(format!(
            "figure size must be positive, got {fig_w}x{fig_h}"
        )));
    }
    let width = fig_w * PX_PER_INCH;
    let height = fig_h * PX_PER_INCH;

    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let max_label_space = (width.min(height) * 0.3).max(24.0);
    let label_space = (longest * LABEL_CHAR_WIDTH + 8.0).clamp(24.0, max_label_space);

    let left = AXIS_TITLE_SPACE + label_space;
    let top = TITLE_HEIGHT + label_space;
    let right = COLORBAR_GAP + COLORBAR_WIDTH + COLORBAR_TEXT_SPACE;
    let bottom = AXIS_TITLE_SPACE + 8.0;
    let grid = (width - left - right).min(height - top - bottom);
    if grid <= 0.0 {
        return Err(MendError::PlotOption(format!(
            "figure of {fig_w}x{fig_h} in is too small for {n} classes"
        )));
    }
    let cell = grid / n as f64;

    let values = matrix.iter().flatten().copied();
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let thresh = max / 2.0;
    debug!(n, min, max, thresh, "rendering confusion matrix");

    let mut lines = Vec::new();
    lines.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}" font-family="sans-serif" font-size="{FONT_SIZE}">"#
    ));
    lines.push(r#"<rect width="100%" height="100%" fill="white"/>"#.to_string());
    lines.push(format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">{}</text>"#,
        left + grid / 2.0,
        TITLE_HEIGHT - 10.0,
        html_escape::encode_text(&opts.title)
    ));

    // cells and annotations
    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let x = left + j as f64 * cell;
            let y = top + i as f64 * cell;
            let t = if span > 0.0 { (value - min) / span } else { 0.0 };
            lines.push(format!(
                r#"<rect x="{x:.1}" y="{y:.1}" width="{cell:.1}" height="{cell:.1}" fill="{}"/>"#,
                opts.palette.color_at(t)
            ));
            let color = if value > thresh { "white" } else { "black" };
            lines.push(format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" dominant-baseline="central" fill="{color}">{}</text>"#,
                x + cell / 2.0,
                y + cell / 2.0,
                opts.number_format.format(value)
            ));
        }
    }

    // tick labels: predicted along the top, rotated; true on the left
    for (k, label) in labels.iter().enumerate() {
        let center = k as f64 * cell + cell / 2.0;
        let label = html_escape::encode_text(label);
        lines.push(format!(
            r#"<text class="xtick" transform="translate({:.1},{:.1}) rotate(-90)" dominant-baseline="central">{label}</text>"#,
            left + center,
            top - 6.0
        ));
        lines.push(format!(
            r#"<text class="ytick" x="{:.1}" y="{:.1}" text-anchor="end" dominant-baseline="central">{label}</text>"#,
            left - 6.0,
            top + center
        ));
    }

    // axis titles
    lines.push(format!(
        r#"<text transform="translate({:.1},{:.1}) rotate(-90)" text-anchor="middle">True labels</text>"#,
        AXIS_TITLE_SPACE / 2.0 + 4.0,
        top + grid / 2.0
    ));
    lines.push(format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Predicted labels</text>"#,
        left + grid / 2.0,
        top + grid + AXIS_TITLE_SPACE
    ));

    // colour legend
    let bar_x = left + grid + COLORBAR_GAP;
    lines.push(r#"<defs><linearGradient id="colorbar" x1="0" y1="1" x2="0" y2="0">"#.to_string());
    let stops = opts.palette.hex_stops();
    let last = (stops.len() - 1) as f64;
    for (k, color) in stops.iter().enumerate() {
        lines.push(format!(
            r#"<stop offset="{:.3}" stop-color="{color}"/>"#,
            k as f64 / last
        ));
    }
    lines.push("</linearGradient></defs>".to_string());
    lines.push(format!(
        r#"<rect class="colorbar" x="{bar_x:.1}" y="{top:.1}" width="{COLORBAR_WIDTH}" height="{grid:.1}" fill="url(#colorbar)" stroke="black" stroke-width="0.5"/>"#
    ));
    for (fraction, value) in [(0.0, min), (0.5, (min + max) / 2.0), (1.0, max)] {
        lines.push(format!(
            r#"<text class="legend" x="{:.1}" y="{:.1}" dominant-baseline="central" font-size="10">{}</text>"#,
            bar_x + COLORBAR_WIDTH + 4.0,
            top + grid * (1.0 - fraction),
            opts.number_format.format(value)
        ));
    }

    lines.push("</svg>".to_string());

    let mut svg = lines.join("\n");
    svg.push('\n');
    Ok(svg)
}

/// Render and write the SVG to `path`.
pub fn write_confusion_matrix(
    path: impl AsRef<Path>,
    matrix: &[Vec<f64>],
    labels: &[String],
    opts: &PlotOptions,
) -> Result<()> {
    let svg = render_confusion_matrix(matrix, labels, opts)?;
    std::fs::write(path.as_ref(), svg)?;
    debug!(path = %path.as_ref().display(), "wrote confusion matrix");
    Ok(())
}
