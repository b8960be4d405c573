use crate::config::{LogoShape, StyleOptions};
use crate::corners::generate_corner_patterns;
use crate::dots::{CellMask, generate_dots_path};
use crate::frame::{escape_xml, layout_frame};
use crate::geometry::num;
use crate::gradient::{GradientArea, build_gradient_def};
use crate::logo::{
    ExclusionArea, FileRasterLoader, LOGO_CLIP_ID, RasterLoader, backdrop, clip_path_def,
    compute_exclusion_area, embed_logo,
};
use crate::matrix::QrMatrix;
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

pub const DOTS_ID: &str = "qr-dots";
pub const QR_GROUP_ID: &str = "qr-code";
pub const LOGO_GROUP_ID: &str = "logo";
pub const DOTS_GRADIENT_ID: &str = "dots-gradient";
pub const BACKGROUND_GRADIENT_ID: &str = "background-gradient";

/// Render `matrix` with `options` into a standalone SVG document, loading
/// raster logos from the local filesystem or data URIs.
pub fn render_svg<M: QrMatrix + ?Sized>(matrix: &M, options: &StyleOptions) -> String {
    render_svg_with_loader(matrix, options, Arc::new(FileRasterLoader))
}

/// Same as [`render_svg`], with raster logos fetched through `loader`.
///
/// Never fails: a logo that cannot be loaded or parsed is left out and the
/// rest of the document is still produced.
pub fn render_svg_with_loader<M: QrMatrix + ?Sized>(
    matrix: &M,
    options: &StyleOptions,
    loader: Arc<dyn RasterLoader>,
) -> String {
    let count = matrix.module_count().max(1);
    let size = options.size;
    let cell = size / count as f32;

    let logo = resolve_logo(options, loader);
    let exclusion = logo.as_ref().map(|(area, _)| *area);
    let mask = CellMask::build(matrix, cell, exclusion.as_ref());

    let quiet = options.quiet_zone;
    let frame = layout_frame(&options.frame, size + 2.0 * quiet);
    let width = size + 2.0 * quiet + frame.extra_width;
    let height = size + 2.0 * quiet + frame.extra_height;
    let origin_x = frame.qr_offset_x + quiet;
    let origin_y = frame.qr_offset_y + quiet;

    tracing::debug!(
        modules = count,
        cell_size = cell,
        excluded = mask.excluded_count(),
        logo = logo.is_some(),
        "rendering styled qr code"
    );

    let mut defs = String::new();
    let dots_fill = match options.active_gradient() {
        Some(gradient) => {
            // Dots and finder patterns share one gradient over the code group.
            defs.push_str(&build_gradient_def(
                gradient,
                DOTS_GRADIENT_ID,
                &GradientArea::square(size),
            ));
            format!("url(#{DOTS_GRADIENT_ID})")
        }
        None => {
            if options.use_gradient {
                tracing::debug!("gradient enabled without a spec, using solid dots color");
            }
            escape_xml(&options.dots_color)
        }
    };
    let background_fill = match &options.background_gradient {
        Some(gradient) => {
            let area = GradientArea {
                x: 0.0,
                y: 0.0,
                width,
                height,
            };
            defs.push_str(&build_gradient_def(gradient, BACKGROUND_GRADIENT_ID, &area));
            Some(format!("url(#{BACKGROUND_GRADIENT_ID})"))
        }
        None => options.background_color.as_deref().map(escape_xml),
    };
    if let (Some((area, _)), Some(logo_options)) = (&logo, &options.logo)
        && let Some(clip) = clip_path_def(logo_options.shape, &area.inset(logo_options.margin), LOGO_CLIP_ID)
    {
        defs.push_str(&clip);
    }

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" version=\"1.1\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = num(width),
        h = num(height)
    );
    let _ = write!(svg, "<defs>{defs}</defs>");

    if let Some(fill) = background_fill {
        let _ = write!(
            svg,
            "<rect id=\"background\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{fill}\"/>",
            num(width),
            num(height)
        );
    }

    if !frame.chrome.is_empty() {
        svg.push_str("<g id=\"frame\">");
        for element in &frame.chrome {
            svg.push_str(&element.to_svg());
        }
        svg.push_str("</g>");
    }

    let _ = write!(
        svg,
        "<g id=\"{QR_GROUP_ID}\" transform=\"translate({} {})\">",
        num(origin_x),
        num(origin_y)
    );
    let dots = generate_dots_path(options.dot_style, &mask, cell);
    if !dots.is_empty() {
        let _ = write!(svg, "<path id=\"{DOTS_ID}\" d=\"{dots}\" fill=\"{dots_fill}\"/>");
    }
    let square_fill = options
        .corner_square_color
        .as_deref()
        .map_or_else(|| dots_fill.clone(), escape_xml);
    let dot_fill = options
        .corner_dot_color
        .as_deref()
        .map_or_else(|| dots_fill.clone(), escape_xml);
    for (position, pattern) in generate_corner_patterns(
        options.corner_square_style,
        options.corner_dot_style,
        matrix.module_count(),
        cell,
    ) {
        let _ = write!(
            svg,
            "<g id=\"{}\"><path class=\"corner-square\" d=\"{}\" fill=\"{square_fill}\" fill-rule=\"evenodd\"/><path class=\"corner-dot\" d=\"{}\" fill=\"{dot_fill}\"/></g>",
            position.id(),
            pattern.outer_path,
            pattern.inner_path
        );
    }
    svg.push_str("</g>");

    if let (Some((area, content)), Some(logo_options)) = (&logo, &options.logo) {
        let _ = write!(
            svg,
            "<g id=\"{LOGO_GROUP_ID}\" transform=\"translate({} {})\">",
            num(origin_x),
            num(origin_y)
        );
        if let Some(color) = &logo_options.background_color {
            svg.push_str(&backdrop(logo_options.shape, area, color));
        }
        if logo_options.shape != LogoShape::Square {
            let _ = write!(svg, "<g clip-path=\"url(#{LOGO_CLIP_ID})\">{content}</g>");
        } else {
            svg.push_str(content);
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// Exclusion area and embedded markup for the configured logo. Any failure
/// is logged and turns into "no logo", which also leaves the modules under
/// it intact.
fn resolve_logo(options: &StyleOptions, loader: Arc<dyn RasterLoader>) -> Option<(ExclusionArea, String)> {
    if !options.has_logo() {
        return None;
    }
    let logo = options.logo.as_ref()?;
    let area = compute_exclusion_area(logo.size, logo.margin, options.size)?;
    match embed_logo(logo, &area, loader) {
        Ok(markup) => Some((area, markup)),
        Err(err) => {
            tracing::warn!(error = %err, "logo omitted");
            None
        }
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, scale: f32) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| anyhow::anyhow!("Invalid output scale {scale}"))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorStop, GradientSpec, LogoOptions};
    use crate::matrix::BitMatrix;

    const LOGO: &str = r#"<svg viewBox="0 0 10 10"><rect width="10" height="10" fill="blue"/></svg>"#;

    fn qr() -> BitMatrix {
        let mut matrix = BitMatrix::new(21).with_finder_patterns();
        for i in 8..13 {
            matrix.set(i, i, true);
        }
        matrix
    }

    #[test]
    fn layers_are_in_fixed_order() {
        let options = StyleOptions {
            use_gradient: true,
            gradient: Some(GradientSpec::linear(
                45.0,
                vec![ColorStop::new(0.0, "#f00"), ColorStop::new(1.0, "#00f")],
            )),
            logo: Some(LogoOptions {
                url: LOGO.to_string(),
                shape: LogoShape::Circle,
                ..LogoOptions::default()
            }),
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        let defs = svg.find("<defs>").unwrap();
        let background = svg.find("id=\"background\"").unwrap();
        let code = svg.find("id=\"qr-code\"").unwrap();
        let logo = svg.find("id=\"logo\"").unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(defs < background && background < code && code < logo);
        assert!(svg.find("<clipPath id=\"logo-clip\">").unwrap() < background);
        assert!(svg.contains("fill=\"url(#dots-gradient)\""));
        assert!(svg.contains("clip-path=\"url(#logo-clip)\""));
    }

    #[test]
    fn gradient_flag_without_spec_falls_back_to_solid() {
        let options = StyleOptions {
            use_gradient: true,
            gradient: None,
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        assert!(!svg.contains("Gradient"));
        assert!(svg.contains("fill=\"#000000\""));
    }

    #[test]
    fn corner_colors_override_dots_fill() {
        let options = StyleOptions {
            corner_square_color: Some("#123456".to_string()),
            corner_dot_color: Some("#abcdef".to_string()),
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        assert_eq!(svg.matches("class=\"corner-square\"").count(), 3);
        assert_eq!(svg.matches("fill=\"#123456\"").count(), 3);
        assert_eq!(svg.matches("fill=\"#abcdef\"").count(), 3);
    }

    #[test]
    fn broken_logo_is_omitted_and_modules_kept() {
        let options = StyleOptions {
            logo: Some(LogoOptions {
                url: "/nonexistent/logo.png".to_string(),
                ..LogoOptions::default()
            }),
            ..StyleOptions::default()
        };
        let with_broken_logo = render_svg(&qr(), &options);
        let without_logo = render_svg(&qr(), &StyleOptions::default());
        assert!(!with_broken_logo.contains("id=\"logo\""));
        assert_eq!(with_broken_logo, without_logo);
    }

    #[test]
    fn logo_backdrop_is_drawn_inside_logo_group() {
        let options = StyleOptions {
            logo: Some(LogoOptions {
                url: LOGO.to_string(),
                background_color: Some("#ffffff".to_string()),
                ..LogoOptions::default()
            }),
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        let group = svg.find("id=\"logo\"").unwrap();
        assert!(svg[group..].contains("fill=\"#ffffff\""));
        assert!(!svg.contains("clip-path"));
    }

    #[test]
    fn quiet_zone_and_frame_shift_the_code() {
        let mut options = StyleOptions {
            quiet_zone: 10.0,
            ..StyleOptions::default()
        };
        options.frame.style = crate::config::FrameStyle::Top;
        options.frame.label = Some("Scan me".to_string());
        let svg = render_svg(&qr(), &options);
        assert!(svg.contains("width=\"352\" height=\"396\""));
        assert!(svg.contains("<g id=\"qr-code\" transform=\"translate(26 70)\">"));
        assert!(svg.contains("<g id=\"frame\">"));
        assert!(svg.contains(">Scan me</text>"));
    }

    #[test]
    fn finder_patterns_share_the_dots_gradient_span() {
        let options = StyleOptions {
            size: 210.0,
            use_gradient: true,
            gradient: Some(GradientSpec::linear(
                0.0,
                vec![ColorStop::new(0.0, "#f00"), ColorStop::new(1.0, "#00f")],
            )),
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        assert!(svg.contains(
            "<linearGradient id=\"dots-gradient\" gradientUnits=\"userSpaceOnUse\" x1=\"0\" y1=\"105\" x2=\"210\" y2=\"105\">"
        ));
        assert_eq!(svg.matches("fill=\"url(#dots-gradient)\"").count(), 7);
    }

    #[test]
    fn configured_colors_are_escaped() {
        let options = StyleOptions {
            dots_color: "#000\"/><script/>".to_string(),
            background_color: Some("white\" onload=\"x".to_string()),
            corner_square_color: Some("a&b".to_string()),
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        assert!(!svg.contains("<script"));
        assert!(svg.contains("fill=\"#000&quot;/&gt;&lt;script/&gt;\""));
        assert!(svg.contains("fill=\"white&quot; onload=&quot;x\""));
        assert!(svg.contains("fill=\"a&amp;b\""));
    }

    #[test]
    fn root_declares_xlink_for_raster_logos() {
        let svg = render_svg(&qr(), &StyleOptions::default());
        assert!(svg.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));
    }

    #[test]
    fn transparent_background_has_no_rect() {
        let options = StyleOptions {
            background_color: None,
            ..StyleOptions::default()
        };
        let svg = render_svg(&qr(), &options);
        assert!(!svg.contains("id=\"background\""));
    }
}
