//! Map renderer
//!
//! Projects people onto an equirectangular world canvas and produces an SVG
//! string with CSS classes and custom properties for styling, optionally
//! wrapped in an HTML page.

pub mod config;
pub mod html;
pub mod projection;
pub mod svg;

pub use config::SvgConfig;
pub use html::render_html;
pub use projection::{nearest_copy, Point, Projection, ScaleBar};
pub use svg::{render_svg, render_svg_with_theme, SvgBuilder};
