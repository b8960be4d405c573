use crate::config::StyleOptions;
use crate::frame::escape_xml;
use crate::geometry::num;
use crate::matrix::QrMatrix;
use crate::roundness::{RectDocument, apply_roundness};
use std::fmt::Write;

/// Plain rect-per-module rendering used for live previews. No neighbor
/// analysis, no logo, no frame: just squares the roundness pass can edit.
pub fn render_rect_preview<M: QrMatrix + ?Sized>(matrix: &M, options: &StyleOptions) -> String {
    let count = matrix.module_count().max(1);
    let cell = options.size / count as f32;
    let total = options.size + 2.0 * options.quiet_zone;
    let origin = options.quiet_zone;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\">",
        num(total)
    );
    if let Some(background) = &options.background_color {
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(background)
        );
    }
    let fill = escape_xml(&options.dots_color);
    for row in 0..matrix.module_count() {
        for col in 0..matrix.module_count() {
            if !matrix.is_dark(row, col) {
                continue;
            }
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                num(origin + col as f32 * cell),
                num(origin + row as f32 * cell),
                num(cell),
                num(cell),
                fill
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Rect preview with continuous corner rounding applied.
pub fn render_roundness_preview<M: QrMatrix + ?Sized>(
    matrix: &M,
    options: &StyleOptions,
    roundness: f32,
) -> String {
    let mut document = RectDocument::parse(&render_rect_preview(matrix, options));
    let changed = apply_roundness(&mut document, roundness);
    tracing::debug!(changed, roundness, "applied preview roundness");
    document.to_svg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::BitMatrix;

    #[test]
    fn one_rect_per_dark_module_plus_background() {
        let matrix = BitMatrix::from_rows(&["#.", "##"]);
        let options = StyleOptions {
            size: 20.0,
            ..StyleOptions::default()
        };
        let svg = render_rect_preview(&matrix, &options);
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains("<rect x=\"10\" y=\"10\" width=\"10\" height=\"10\" fill=\"#000000\"/>"));
    }

    #[test]
    fn roundness_preview_rounds_modules_only() {
        let matrix = BitMatrix::from_rows(&["#.", ".#"]);
        let options = StyleOptions {
            size: 20.0,
            ..StyleOptions::default()
        };
        let svg = render_roundness_preview(&matrix, &options, 100.0);
        assert_eq!(svg.matches("rx=\"5\"").count(), 2);
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>"));
    }
}
