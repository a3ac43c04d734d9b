//! Configuration for SVG rendering

use crate::config::MAP_ICON_SIZE;

/// Configuration options for SVG output
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Canvas width in pixels
    pub width: f64,

    /// Canvas height in pixels
    pub height: f64,

    /// Whether to include XML declaration and standalone attributes
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "map-" for "map-marker")
    pub class_prefix: Option<String>,

    /// Spacing of graticule lines in degrees, `None` to hide them
    pub graticule_step: Option<f64>,

    /// Marker diameter in rem
    pub icon_size: f64,

    /// Pixels per rem, used to size markers
    pub root_font_size: f64,

    /// Margin between the canvas edge and pinned controls
    pub control_margin: f64,

    /// Longest scale bar in pixels, `None` to hide the scale
    pub scale_max_width: Option<f64>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 512.0,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("map-".to_string()),
            graticule_step: Some(30.0),
            icon_size: MAP_ICON_SIZE,
            root_font_size: 16.0,
            control_margin: 10.0,
            scale_max_width: Some(100.0),
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Set the graticule spacing
    pub fn with_graticule_step(mut self, degrees: f64) -> Self {
        self.graticule_step = Some(degrees);
        self
    }

    /// Hide the graticule
    pub fn without_graticule(mut self) -> Self {
        self.graticule_step = None;
        self
    }

    /// Hide the scale bar
    pub fn without_scale(mut self) -> Self {
        self.scale_max_width = None;
        self
    }

    /// Set the marker diameter in rem
    pub fn with_icon_size(mut self, rem: f64) -> Self {
        self.icon_size = rem;
        self
    }

    /// Convert rem to pixels
    pub fn rem2px(&self, rem: f64) -> f64 {
        self.root_font_size * rem
    }
}
