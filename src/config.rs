use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotStyle {
    #[default]
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerSquareStyle {
    #[default]
    Square,
    ExtraRounded,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerDotStyle {
    #[default]
    Square,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: String,
}

impl ColorStop {
    pub fn new(offset: f32, color: &str) -> Self {
        Self {
            offset,
            color: color.to_string(),
        }
    }
}

/// Gradient description; callers guarantee at least two stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientSpec {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: GradientKind,
    /// Degrees; only meaningful for linear gradients.
    #[serde(default, alias = "rotationDegrees")]
    pub rotation: f32,
    pub color_stops: Vec<ColorStop>,
}

impl GradientSpec {
    pub fn linear(rotation: f32, stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientKind::Linear,
            rotation,
            color_stops: stops,
        }
    }

    pub fn radial(stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientKind::Radial,
            rotation: 0.0,
            color_stops: stops,
        }
    }
}

/// Passed through to the encoder; the renderer never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoShape {
    #[default]
    Square,
    Circle,
    Rounded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoOptions {
    /// Inline SVG markup, a data URI, or a file path.
    pub url: String,
    pub shape: LogoShape,
    /// Fraction of the drawing area the logo occupies.
    pub size: f32,
    /// Clear space around the logo, in output units.
    pub margin: f32,
    pub background_color: Option<String>,
    pub timeout_ms: u64,
}

impl Default for LogoOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            shape: LogoShape::Square,
            size: 0.3,
            margin: 5.0,
            background_color: None,
            timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameStyle {
    #[default]
    None,
    Top,
    Bottom,
    Badge,
    /// Live-preview only; exported without chrome.
    Ribbon,
    /// Live-preview only; exported without chrome.
    Speech,
    /// Live-preview only; exported without chrome.
    Circle,
}

impl FrameStyle {
    pub fn is_exportable(self) -> bool {
        matches!(self, Self::Top | Self::Bottom | Self::Badge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn px(self) -> f32 {
        match self {
            Self::Small => 14.0,
            Self::Medium => 18.0,
            Self::Large => 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
    Rounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameIcon {
    Scan,
    Link,
    Phone,
    Mail,
    Arrow,
    Heart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconPosition {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameMetrics {
    pub padding: f32,
    pub label_height: f32,
    pub badge_height: f32,
    pub badge_gap: f32,
    pub corner_radius: f32,
    pub border_width: f32,
    pub max_label_chars: usize,
    /// Label width estimate per character, as a fraction of the font size.
    pub char_width: f32,
    pub icon_gap: f32,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            padding: 16.0,
            label_height: 44.0,
            badge_height: 36.0,
            badge_gap: 12.0,
            corner_radius: 12.0,
            border_width: 4.0,
            max_label_chars: 28,
            char_width: 0.6,
            icon_gap: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameConfig {
    pub style: FrameStyle,
    pub label: Option<String>,
    pub font_size: FontSize,
    pub font_family: FontFamily,
    pub icon: Option<FrameIcon>,
    pub icon_position: IconPosition,
    pub border_color: String,
    pub background_color: String,
    pub text_color: String,
    pub metrics: FrameMetrics,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::from_theme(&Theme::classic())
    }
}

impl FrameConfig {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            style: FrameStyle::None,
            label: None,
            font_size: FontSize::Medium,
            font_family: theme.font_family,
            icon: None,
            icon_position: IconPosition::None,
            border_color: theme.frame_border.clone(),
            background_color: theme.frame_background.clone(),
            text_color: theme.frame_text.clone(),
            metrics: FrameMetrics::default(),
        }
    }
}

/// Everything the compositor needs besides the matrix. Built fresh per
/// render and never mutated by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOptions {
    /// Side of the QR drawing area, in output units.
    pub size: f32,
    /// Light border around the drawing area, inside any frame.
    pub quiet_zone: f32,
    pub dots_color: String,
    /// `None` leaves the document transparent.
    pub background_color: Option<String>,
    pub corner_square_color: Option<String>,
    pub corner_dot_color: Option<String>,
    pub dot_style: DotStyle,
    pub corner_square_style: CornerSquareStyle,
    pub corner_dot_style: CornerDotStyle,
    pub use_gradient: bool,
    pub gradient: Option<GradientSpec>,
    pub background_gradient: Option<GradientSpec>,
    pub error_correction: ErrorCorrection,
    pub logo: Option<LogoOptions>,
    pub frame: FrameConfig,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::from_theme(&Theme::classic())
    }
}

impl StyleOptions {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            size: 300.0,
            quiet_zone: 0.0,
            dots_color: theme.foreground.clone(),
            background_color: Some(theme.background.clone()),
            corner_square_color: theme.corner_square.clone(),
            corner_dot_color: theme.corner_dot.clone(),
            dot_style: DotStyle::Square,
            corner_square_style: CornerSquareStyle::Square,
            corner_dot_style: CornerDotStyle::Square,
            use_gradient: false,
            gradient: None,
            background_gradient: None,
            error_correction: ErrorCorrection::M,
            logo: None,
            frame: FrameConfig::from_theme(theme),
        }
    }

    /// Logos hide modules, so any configured logo forces the highest level.
    pub fn effective_error_correction(&self) -> ErrorCorrection {
        if self.has_logo() {
            ErrorCorrection::H
        } else {
            self.error_correction
        }
    }

    pub fn has_logo(&self) -> bool {
        self.logo
            .as_ref()
            .is_some_and(|logo| !logo.url.trim().is_empty() && logo.size > 0.0)
    }

    /// The gradient to apply to dots, if gradients are on and one is given.
    pub fn active_gradient(&self) -> Option<&GradientSpec> {
        if self.use_gradient {
            self.gradient.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleConfigFile {
    theme: Option<String>,
    size: Option<f32>,
    quiet_zone: Option<f32>,
    dots_color: Option<String>,
    background_color: Option<String>,
    corner_square_color: Option<String>,
    corner_dot_color: Option<String>,
    dot_style: Option<DotStyle>,
    corner_square_style: Option<CornerSquareStyle>,
    corner_dot_style: Option<CornerDotStyle>,
    use_gradient: Option<bool>,
    gradient: Option<GradientSpec>,
    background_gradient: Option<GradientSpec>,
    error_correction: Option<ErrorCorrection>,
    logo: Option<LogoOptions>,
    frame: Option<FrameConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameConfigFile {
    style: Option<FrameStyle>,
    label: Option<String>,
    font_size: Option<FontSize>,
    font_family: Option<FontFamily>,
    icon: Option<FrameIcon>,
    icon_position: Option<IconPosition>,
    border_color: Option<String>,
    background_color: Option<String>,
    text_color: Option<String>,
    metrics: Option<FrameMetrics>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<StyleOptions> {
    let Some(path) = path else {
        return Ok(StyleOptions::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse a style config (JSON, or JSON5 as a fallback) and merge it over
/// the defaults of the selected theme.
pub fn parse_config(contents: &str) -> anyhow::Result<StyleOptions> {
    let parsed: StyleConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|json5_err| anyhow::anyhow!("invalid config: {json_err}; {json5_err}"))?,
    };

    let theme = match parsed.theme.as_deref() {
        Some(name) => Theme::by_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{name}'"))?,
        None => Theme::classic(),
    };
    let mut config = StyleOptions::from_theme(&theme);

    if let Some(v) = parsed.size {
        config.size = v;
    }
    if let Some(v) = parsed.quiet_zone {
        config.quiet_zone = v;
    }
    if let Some(v) = parsed.dots_color {
        config.dots_color = v;
    }
    if let Some(v) = parsed.background_color {
        config.background_color = if v.eq_ignore_ascii_case("transparent") {
            None
        } else {
            Some(v)
        };
    }
    if parsed.corner_square_color.is_some() {
        config.corner_square_color = parsed.corner_square_color;
    }
    if parsed.corner_dot_color.is_some() {
        config.corner_dot_color = parsed.corner_dot_color;
    }
    if let Some(v) = parsed.dot_style {
        config.dot_style = v;
    }
    if let Some(v) = parsed.corner_square_style {
        config.corner_square_style = v;
    }
    if let Some(v) = parsed.corner_dot_style {
        config.corner_dot_style = v;
    }
    if let Some(v) = parsed.use_gradient {
        config.use_gradient = v;
    }
    if parsed.gradient.is_some() {
        config.gradient = parsed.gradient;
    }
    if parsed.background_gradient.is_some() {
        config.background_gradient = parsed.background_gradient;
    }
    if let Some(v) = parsed.error_correction {
        config.error_correction = v;
    }
    if parsed.logo.is_some() {
        config.logo = parsed.logo;
    }

    if let Some(frame) = parsed.frame {
        if let Some(v) = frame.style {
            config.frame.style = v;
        }
        if frame.label.is_some() {
            config.frame.label = frame.label;
        }
        if let Some(v) = frame.font_size {
            config.frame.font_size = v;
        }
        if let Some(v) = frame.font_family {
            config.frame.font_family = v;
        }
        if frame.icon.is_some() {
            config.frame.icon = frame.icon;
        }
        if let Some(v) = frame.icon_position {
            config.frame.icon_position = v;
        }
        if let Some(v) = frame.border_color {
            config.frame.border_color = v;
        }
        if let Some(v) = frame.background_color {
            config.frame.background_color = v;
        }
        if let Some(v) = frame.text_color {
            config.frame.text_color = v;
        }
        if let Some(v) = frame.metrics {
            config.frame.metrics = v;
        }
    }

    Ok(config)
}
