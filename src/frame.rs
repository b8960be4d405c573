use crate::config::{FontFamily, FrameConfig, FrameIcon, FrameStyle, IconPosition};
use crate::geometry::{CornerRadii, num, rounded_rect_path};

/// Side of the box icon path data is drawn in.
const ICON_VIEWBOX: f32 = 24.0;
/// Icon side relative to the label font size.
const ICON_SCALE: f32 = 1.2;

pub fn icon_path(icon: FrameIcon) -> &'static str {
    match icon {
        FrameIcon::Scan => {
            "M3 7V5a2 2 0 0 1 2-2h2M17 3h2a2 2 0 0 1 2 2v2M21 17v2a2 2 0 0 1-2 2h-2M7 21H5a2 2 0 0 1-2-2v-2M7 12h10"
        }
        FrameIcon::Link => {
            "M10 13a5 5 0 0 0 7.54.54l3-3a5 5 0 0 0-7.07-7.07l-1.72 1.71M14 11a5 5 0 0 0-7.54-.54l-3 3a5 5 0 0 0 7.07 7.07l1.71-1.71"
        }
        FrameIcon::Phone => {
            "M7 2h10a2 2 0 0 1 2 2v16a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V4a2 2 0 0 1 2-2zM12 18h.01"
        }
        FrameIcon::Mail => {
            "M4 4h16c1.1 0 2 .9 2 2v12c0 1.1-.9 2-2 2H4c-1.1 0-2-.9-2-2V6c0-1.1.9-2 2-2zM22 6l-10 7L2 6"
        }
        FrameIcon::Arrow => "M5 12h14M12 5l7 7-7 7",
        FrameIcon::Heart => {
            "M20.84 4.61a5.5 5.5 0 0 0-7.78 0L12 5.67l-1.06-1.06a5.5 5.5 0 0 0-7.78 7.78l1.06 1.06L12 21.23l7.78-7.78 1.06-1.06a5.5 5.5 0 0 0 0-7.78z"
        }
    }
}

pub fn font_stack(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Sans => "'Helvetica Neue', Helvetica, Arial, sans-serif",
        FontFamily::Serif => "Georgia, 'Times New Roman', Times, serif",
        FontFamily::Mono => "'SFMono-Regular', Menlo, Consolas, monospace",
        FontFamily::Rounded => "'Nunito', 'Varela Round', 'Arial Rounded MT Bold', sans-serif",
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameElement {
    Path {
        d: String,
        fill: String,
        stroke: Option<(String, f32)>,
    },
    Text {
        x: f32,
        y: f32,
        content: String,
        font_size: f32,
        font_family: FontFamily,
        fill: String,
    },
    Icon {
        icon: FrameIcon,
        x: f32,
        y: f32,
        size: f32,
        color: String,
    },
}

impl FrameElement {
    pub fn to_svg(&self) -> String {
        match self {
            Self::Path { d, fill, stroke } => {
                let stroke = stroke
                    .as_ref()
                    .map(|(color, width)| {
                        format!(" stroke=\"{}\" stroke-width=\"{}\"", escape_xml(color), num(*width))
                    })
                    .unwrap_or_default();
                format!("<path d=\"{d}\" fill=\"{}\"{stroke}/>", escape_xml(fill))
            }
            Self::Text {
                x,
                y,
                content,
                font_size,
                font_family,
                fill,
            } => format!(
                "<text id=\"frame-label\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
                num(*x),
                num(*y),
                font_stack(*font_family),
                num(*font_size),
                escape_xml(fill),
                escape_xml(content)
            ),
            Self::Icon {
                icon,
                x,
                y,
                size,
                color,
            } => format!(
                "<path id=\"frame-icon\" d=\"{}\" transform=\"translate({} {}) scale({})\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
                icon_path(*icon),
                num(*x),
                num(*y),
                num(size / ICON_VIEWBOX),
                escape_xml(color)
            ),
        }
    }
}

/// Canvas growth, QR origin shift and chrome for a frame around a QR box of
/// side `canvas_size`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameLayout {
    pub extra_width: f32,
    pub extra_height: f32,
    pub qr_offset_x: f32,
    pub qr_offset_y: f32,
    pub chrome: Vec<FrameElement>,
}

impl FrameLayout {
    pub fn none() -> Self {
        Self::default()
    }
}

pub fn layout_frame(frame: &FrameConfig, canvas_size: f32) -> FrameLayout {
    if !frame.style.is_exportable() {
        return FrameLayout::none();
    }
    let m = &frame.metrics;
    let pad = m.padding;
    let width = canvas_size + 2.0 * pad;
    let border = Some((frame.border_color.clone(), m.border_width));
    let half_border = m.border_width / 2.0;

    match frame.style {
        FrameStyle::Top | FrameStyle::Bottom => {
            let height = canvas_size + 2.0 * pad + m.label_height;
            let top = frame.style == FrameStyle::Top;
            let band_y = if top { 0.0 } else { height - m.label_height };
            let band_radii = if top {
                CornerRadii {
                    top_left: m.corner_radius,
                    top_right: m.corner_radius,
                    ..CornerRadii::default()
                }
            } else {
                CornerRadii {
                    bottom_left: m.corner_radius,
                    bottom_right: m.corner_radius,
                    ..CornerRadii::default()
                }
            };
            let mut chrome = vec![
                FrameElement::Path {
                    d: rounded_rect_path(
                        half_border,
                        half_border,
                        width - m.border_width,
                        height - m.border_width,
                        CornerRadii::uniform(m.corner_radius),
                    ),
                    fill: frame.background_color.clone(),
                    stroke: border,
                },
                FrameElement::Path {
                    d: rounded_rect_path(0.0, band_y, width, m.label_height, band_radii),
                    fill: frame.border_color.clone(),
                    stroke: None,
                },
            ];
            chrome.extend(label_elements(frame, width / 2.0, band_y + m.label_height / 2.0));
            FrameLayout {
                extra_width: 2.0 * pad,
                extra_height: 2.0 * pad + m.label_height,
                qr_offset_x: pad,
                qr_offset_y: if top { pad + m.label_height } else { pad },
                chrome,
            }
        }
        FrameStyle::Badge => {
            let boxed = canvas_size + 2.0 * pad;
            let mut chrome = vec![FrameElement::Path {
                d: rounded_rect_path(
                    half_border,
                    half_border,
                    width - m.border_width,
                    boxed - m.border_width,
                    CornerRadii::uniform(m.corner_radius),
                ),
                fill: frame.background_color.clone(),
                stroke: border,
            }];
            let labels = label_elements(frame, width / 2.0, boxed + m.badge_gap + m.badge_height / 2.0);
            if !labels.is_empty() {
                let pill_width = (label_block_width(frame) + m.badge_height).min(width);
                chrome.push(FrameElement::Path {
                    d: rounded_rect_path(
                        (width - pill_width) / 2.0,
                        boxed + m.badge_gap,
                        pill_width,
                        m.badge_height,
                        CornerRadii::uniform(m.badge_height / 2.0),
                    ),
                    fill: frame.border_color.clone(),
                    stroke: None,
                });
                chrome.extend(labels);
            }
            FrameLayout {
                extra_width: 2.0 * pad,
                extra_height: 2.0 * pad + m.badge_gap + m.badge_height,
                qr_offset_x: pad,
                qr_offset_y: pad,
                chrome,
            }
        }
        _ => FrameLayout::none(),
    }
}

/// Label text cut to the configured maximum; `None` when there is nothing
/// to show.
pub fn label_text(frame: &FrameConfig) -> Option<String> {
    let label = frame.label.as_deref()?.trim();
    if label.is_empty() {
        return None;
    }
    Some(label.chars().take(frame.metrics.max_label_chars).collect())
}

fn text_width(frame: &FrameConfig, label: &str) -> f32 {
    label.chars().count() as f32 * frame.font_size.px() * frame.metrics.char_width
}

fn icon_size(frame: &FrameConfig) -> f32 {
    frame.font_size.px() * ICON_SCALE
}

fn shows_icon(frame: &FrameConfig) -> Option<FrameIcon> {
    match frame.icon_position {
        IconPosition::None => None,
        IconPosition::Left | IconPosition::Right => frame.icon,
    }
}

/// Width of label text plus icon, as laid out.
pub fn label_block_width(frame: &FrameConfig) -> f32 {
    let Some(label) = label_text(frame) else {
        return 0.0;
    };
    let mut width = text_width(frame, &label);
    if shows_icon(frame).is_some() {
        width += frame.metrics.icon_gap + icon_size(frame);
    }
    width
}

/// Text and icon centered as one block on `(cx, cy)`.
fn label_elements(frame: &FrameConfig, cx: f32, cy: f32) -> Vec<FrameElement> {
    let Some(label) = label_text(frame) else {
        return Vec::new();
    };
    let text_w = text_width(frame, &label);
    let block_left = cx - label_block_width(frame) / 2.0;
    let icon_side = icon_size(frame);
    let gap = frame.metrics.icon_gap;

    let mut elements = Vec::new();
    let text_cx = match (shows_icon(frame), frame.icon_position) {
        (Some(icon), IconPosition::Left) => {
            elements.push(FrameElement::Icon {
                icon,
                x: block_left,
                y: cy - icon_side / 2.0,
                size: icon_side,
                color: frame.text_color.clone(),
            });
            block_left + icon_side + gap + text_w / 2.0
        }
        (Some(icon), _) => {
            elements.push(FrameElement::Icon {
                icon,
                x: block_left + text_w + gap,
                y: cy - icon_side / 2.0,
                size: icon_side,
                color: frame.text_color.clone(),
            });
            block_left + text_w / 2.0
        }
        (None, _) => cx,
    };
    elements.insert(
        0,
        FrameElement::Text {
            x: text_cx,
            y: cy,
            content: label,
            font_size: frame.font_size.px(),
            font_family: frame.font_family,
            fill: frame.text_color.clone(),
        },
    );
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontSize;

    fn frame(style: FrameStyle, label: Option<&str>) -> FrameConfig {
        FrameConfig {
            style,
            label: label.map(str::to_string),
            ..FrameConfig::default()
        }
    }

    #[test]
    fn no_frame_adds_nothing() {
        assert_eq!(layout_frame(&frame(FrameStyle::None, Some("hi")), 300.0), FrameLayout::none());
    }

    #[test]
    fn preview_only_styles_export_without_chrome() {
        for style in [FrameStyle::Ribbon, FrameStyle::Speech, FrameStyle::Circle] {
            let layout = layout_frame(&frame(style, Some("Scan me")), 300.0);
            assert!(layout.chrome.is_empty());
            assert_eq!(layout.extra_height, 0.0);
        }
    }

    #[test]
    fn top_label_pushes_code_down() {
        let layout = layout_frame(&frame(FrameStyle::Top, Some("Scan me")), 300.0);
        assert_eq!(layout.extra_width, 32.0);
        assert_eq!(layout.extra_height, 76.0);
        assert_eq!(layout.qr_offset_x, 16.0);
        assert_eq!(layout.qr_offset_y, 60.0);
        assert!(layout.chrome.iter().any(|el| matches!(el, FrameElement::Text { y, .. } if *y == 22.0)));
    }

    #[test]
    fn bottom_label_keeps_code_at_padding() {
        let layout = layout_frame(&frame(FrameStyle::Bottom, Some("Scan me")), 300.0);
        assert_eq!(layout.qr_offset_y, 16.0);
        let text_y = layout.chrome.iter().find_map(|el| match el {
            FrameElement::Text { y, .. } => Some(*y),
            _ => None,
        });
        assert_eq!(text_y, Some(376.0 - 22.0));
    }

    #[test]
    fn badge_without_label_has_no_pill() {
        let layout = layout_frame(&frame(FrameStyle::Badge, None), 300.0);
        assert_eq!(layout.chrome.len(), 1);
        assert_eq!(layout.extra_height, 32.0 + 12.0 + 36.0);
    }

    #[test]
    fn badge_pill_wraps_the_label() {
        let mut config = frame(FrameStyle::Badge, Some("Scan me"));
        config.font_size = FontSize::Small;
        // 7 chars at 14px and 0.6 em.
        assert!((label_block_width(&config) - 58.8).abs() < 1e-3);

        let layout = layout_frame(&config, 300.0);
        assert_eq!(layout.chrome.len(), 3);
        // Pill is 58.8 + 36 wide, centered under the 332-wide box, 12 below it.
        let FrameElement::Path { d, stroke, .. } = &layout.chrome[1] else {
            panic!("second element should be the pill");
        };
        assert!(d.starts_with("M136.6 344H195.4A18 18 0 0 1 213.4 362"));
        assert!(stroke.is_none());
        let text_y = layout.chrome.iter().find_map(|el| match el {
            FrameElement::Text { y, .. } => Some(*y),
            _ => None,
        });
        assert_eq!(text_y, Some(362.0));
    }

    #[test]
    fn frame_colors_are_escaped() {
        let mut config = frame(FrameStyle::Top, Some("hi"));
        config.border_color = "red\" onclick=\"x".to_string();
        let svg: String = layout_frame(&config, 300.0)
            .chrome
            .iter()
            .map(FrameElement::to_svg)
            .collect();
        assert!(!svg.contains("red\" onclick"));
        assert!(svg.contains("red&quot; onclick=&quot;x"));
    }

    #[test]
    fn label_is_escaped_and_truncated() {
        let mut config = frame(FrameStyle::Top, Some("<Tom & Jerry's \"QR\"> and a much longer tail"));
        config.metrics.max_label_chars = 24;
        let layout = layout_frame(&config, 300.0);
        let svg: String = layout.chrome.iter().map(FrameElement::to_svg).collect();
        assert!(svg.contains("&lt;Tom &amp; Jerry&apos;s &quot;QR&quot;&gt;"));
        assert!(!svg.contains("longer"));
    }

    #[test]
    fn icon_sits_left_or_right_of_text() {
        let mut config = frame(FrameStyle::Bottom, Some("Scan"));
        config.font_size = FontSize::Small;
        config.icon = Some(FrameIcon::Scan);
        config.icon_position = IconPosition::Left;
        let left = label_elements(&config, 100.0, 50.0);
        config.icon_position = IconPosition::Right;
        let right = label_elements(&config, 100.0, 50.0);

        let position = |elements: &[FrameElement]| {
            let text = elements.iter().find_map(|el| match el {
                FrameElement::Text { x, .. } => Some(*x),
                _ => None,
            });
            let icon = elements.iter().find_map(|el| match el {
                FrameElement::Icon { x, .. } => Some(*x),
                _ => None,
            });
            (text.unwrap(), icon.unwrap())
        };
        let (text_x, icon_x) = position(&left);
        assert!(icon_x < text_x);
        let (text_x, icon_x) = position(&right);
        assert!(icon_x > text_x);
    }

    #[test]
    fn icon_without_position_is_hidden() {
        let mut config = frame(FrameStyle::Top, Some("Scan"));
        config.icon = Some(FrameIcon::Heart);
        let elements = label_elements(&config, 100.0, 20.0);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn icon_markup_is_scaled_from_24_units() {
        let icon = FrameElement::Icon {
            icon: FrameIcon::Arrow,
            x: 10.0,
            y: 5.0,
            size: 12.0,
            color: "#fff".to_string(),
        };
        let svg = icon.to_svg();
        assert!(svg.contains("d=\"M5 12h14M12 5l7 7-7 7\""));
        assert!(svg.contains("transform=\"translate(10 5) scale(0.5)\""));
    }
}
