use std::sync::Arc;
use std::time::Duration;

use qrart_renderer::{
    BitMatrix, ColorStop, DotStyle, GradientSpec, LogoError, LogoOptions, QrMatrix, RasterLoader,
    StyleOptions, render_svg, render_svg_with_loader,
};

fn assert_valid_svg(svg: &str, case: &str) {
    assert!(svg.starts_with("<?xml"), "{case}: missing xml declaration");
    assert!(svg.contains("<svg"), "{case}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{case}: missing </svg tag");
}

fn dots_path(svg: &str) -> Option<&str> {
    let start = svg.find("<path id=\"qr-dots\" d=\"")? + "<path id=\"qr-dots\" d=\"".len();
    let end = svg[start..].find('"')? + start;
    Some(&svg[start..end])
}

/// A 25-module grid with finder patterns and a deterministic fill.
fn busy_matrix() -> BitMatrix {
    let mut matrix = BitMatrix::new(25).with_finder_patterns();
    for row in 0..25 {
        for col in 0..25 {
            if !qrart_renderer::matrix::is_finder_cell(25, row, col) && (row * 7 + col * 3) % 5 < 3 {
                matrix.set(row, col, true);
            }
        }
    }
    matrix
}

#[test]
fn three_by_three_block_renders_nine_squares() {
    let mut matrix = BitMatrix::new(21);
    for row in 9..12 {
        for col in 9..12 {
            matrix.set(row, col, true);
        }
    }
    let options = StyleOptions {
        size: 21.0,
        ..StyleOptions::default()
    };
    let svg = render_svg(&matrix, &options);
    assert_valid_svg(&svg, "3x3 block");

    let mut expected = String::new();
    for row in 9..12 {
        for col in 9..12 {
            expected.push_str(&format!(
                "M{col} {row}H{}V{}H{col}V{row}Z",
                col + 1,
                row + 1
            ));
        }
    }
    assert_eq!(dots_path(&svg), Some(expected.as_str()));
    assert_eq!(svg.matches("class=\"corner-square\"").count(), 3);
    assert!(svg.contains("id=\"corner-top-left\""));
    assert!(svg.contains("id=\"corner-top-right\""));
    assert!(svg.contains("id=\"corner-bottom-left\""));
    assert!(!svg.contains("corner-bottom-right"));
    assert!(!svg.contains("Gradient"));
    assert!(!svg.contains("id=\"logo\""));
}

#[test]
fn logo_exclusion_removes_cells_under_the_logo() {
    let mut matrix = BitMatrix::new(25);
    for row in 7..18 {
        for col in 7..18 {
            matrix.set(row, col, true);
        }
    }
    let options = StyleOptions {
        size: 300.0,
        logo: Some(LogoOptions {
            url: r#"<svg viewBox="0 0 1 1"><rect width="1" height="1"/></svg>"#.to_string(),
            size: 0.3,
            margin: 5.0,
            ..LogoOptions::default()
        }),
        ..StyleOptions::default()
    };
    let svg = render_svg(&matrix, &options);
    assert_valid_svg(&svg, "logo");
    assert!(svg.contains("id=\"logo\""));

    // Cells are 12 units; the exclusion square spans 109..191, so columns
    // and rows 9 through 15 are withheld.
    let path = dots_path(&svg).expect("data path present");
    for idx in 9..=15 {
        let at = idx as f32 * 12.0;
        assert!(!path.contains(&format!("M{at} {at}H")), "cell {idx} should be excluded");
    }
    assert!(path.contains("M96 96H108V108H96V96Z"));
    assert!(path.contains("M192 192H204V204H192V192Z"));
}

#[test]
fn cells_next_to_the_logo_round_toward_it() {
    let mut matrix = BitMatrix::new(25);
    for row in 7..18 {
        matrix.set(row, 12, true);
    }
    let options = StyleOptions {
        dot_style: DotStyle::Rounded,
        logo: Some(LogoOptions {
            url: r#"<svg viewBox="0 0 1 1"><rect width="1" height="1"/></svg>"#.to_string(),
            ..LogoOptions::default()
        }),
        ..StyleOptions::default()
    };
    let svg = render_svg(&matrix, &options);
    let path = dots_path(&svg).expect("data path present");
    // Cell (8, 12) sits right above the logo; excluded cells are not
    // neighbors, so its bottom corners round.
    assert!(path.contains("M144 96H156V102A6 6 0 0 1 150 108"));
}

#[test]
fn percent_encoded_svg_data_uri_logo_is_embedded() {
    let matrix = busy_matrix();
    let inline = r#"<svg viewBox="0 0 1 1"><rect width="1" height="1"/></svg>"#;
    let encoded = "data:image/svg+xml;charset=utf-8,%3Csvg%20viewBox%3D%220%200%201%201%22%3E%3Crect%20width%3D%221%22%20height%3D%221%22%2F%3E%3C%2Fsvg%3E";
    let render_with = |url: &str| {
        let options = StyleOptions {
            logo: Some(LogoOptions {
                url: url.to_string(),
                ..LogoOptions::default()
            }),
            ..StyleOptions::default()
        };
        render_svg(&matrix, &options)
    };
    let from_inline = render_with(inline);
    let from_uri = render_with(encoded);
    assert!(from_uri.contains("id=\"logo\""));
    assert_eq!(from_inline, from_uri);
}

#[test]
fn every_style_renders_a_document() {
    let matrix = busy_matrix();
    for style in [
        DotStyle::Square,
        DotStyle::Dots,
        DotStyle::Rounded,
        DotStyle::ExtraRounded,
        DotStyle::Classy,
        DotStyle::ClassyRounded,
    ] {
        let options = StyleOptions {
            dot_style: style,
            use_gradient: true,
            gradient: Some(GradientSpec::radial(vec![
                ColorStop::new(0.0, "#fff"),
                ColorStop::new(0.5, "#888"),
                ColorStop::new(1.0, "#000"),
            ])),
            ..StyleOptions::default()
        };
        let svg = render_svg(&matrix, &options);
        assert_valid_svg(&svg, &format!("{style:?}"));
        assert_eq!(svg.matches("<stop ").count(), 3);
        assert_eq!(svg.matches("<g id=\"corner-").count(), 3);
    }
}

#[test]
fn renders_concurrently() {
    let matrix = Arc::new(busy_matrix());
    let handles: Vec<_> = [150.0f32, 300.0, 600.0]
        .into_iter()
        .map(|size| {
            let matrix = Arc::clone(&matrix);
            std::thread::spawn(move || {
                let options = StyleOptions {
                    size,
                    ..StyleOptions::default()
                };
                render_svg(matrix.as_ref(), &options)
            })
        })
        .collect();
    for handle in handles {
        let svg = handle.join().expect("render thread panicked");
        assert_valid_svg(&svg, "concurrent");
    }
}

struct NeverLoader;

impl RasterLoader for NeverLoader {
    fn load(&self, _source: &str) -> Result<Vec<u8>, LogoError> {
        std::thread::sleep(Duration::from_secs(2));
        Err(LogoError::Load("too late".to_string()))
    }
}

#[test]
fn raster_timeout_omits_logo_but_renders() {
    let matrix = busy_matrix();
    let options = StyleOptions {
        logo: Some(LogoOptions {
            url: "https://example.com/logo.png".to_string(),
            timeout_ms: 10,
            ..LogoOptions::default()
        }),
        ..StyleOptions::default()
    };
    let svg = render_svg_with_loader(&matrix, &options, Arc::new(NeverLoader));
    assert_valid_svg(&svg, "timeout");
    assert!(!svg.contains("id=\"logo\""));
    assert_eq!(matrix.module_count(), 25);
}
