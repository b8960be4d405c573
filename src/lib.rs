#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod corners;
pub mod dots;
pub mod frame;
pub mod geometry;
pub mod gradient;
pub mod logo;
pub mod matrix;
pub mod preview;
pub mod render;
pub mod roundness;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{
    ColorStop, CornerDotStyle, CornerSquareStyle, DotStyle, FrameConfig, FrameStyle, GradientKind,
    GradientSpec, LogoOptions, LogoShape, StyleOptions, load_config, parse_config,
};
pub use logo::{FileRasterLoader, LogoError, RasterLoader};
pub use matrix::{BitMatrix, QrMatrix};
pub use preview::{render_rect_preview, render_roundness_preview};
pub use render::{render_svg, render_svg_with_loader};
pub use roundness::{RectDocument, RoundnessThresholds, apply_roundness, styles_for_roundness};
pub use theme::Theme;
