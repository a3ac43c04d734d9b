//! Purchase Map - people plotted by purchase year
//!
//! This library loads a paginated GeoJSON dataset of people, colors each one
//! by the year of their purchase and renders the result as an SVG world map
//! with hover popups and a year legend.
//!
//! # Example
//!
//! ```rust
//! use purchase_map::{render, Config, PeopleFeatureCollection, PersonFeature};
//!
//! let people = PeopleFeatureCollection::new(vec![PersonFeature::new(-79.4, 43.7, Some(2018))]);
//! let config = Config::offline().with_current_year(2020);
//! let svg = render(&people, &config);
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("Purchased 2018"));
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod legend;
pub mod link;
pub mod loader;
pub mod renderer;
pub mod theme;

pub use color::{lerp, Hsl, YearScale, NEUTRAL_COLOR};
pub use config::{Config, ConfigError, Credentials};
pub use data::{PeopleFeatureCollection, PersonFeature};
pub use error::MapError;
pub use legend::{ControlPosition, PurchaseYearLegend};
pub use link::parse_link_header;
pub use loader::{load_dataset, load_geojson_data, pages, HttpTransport, LoadError, Transport};
pub use renderer::{render_html, render_svg, render_svg_with_theme, SvgConfig};
pub use theme::Theme;

/// Output document kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Standalone SVG image
    Svg,
    /// HTML page embedding the SVG
    #[default]
    Html,
    /// The merged feature collection itself
    GeoJson,
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Theme for color resolution
    pub theme: Theme,
    pub format: OutputFormat,
    /// Page title for HTML output
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            svg: SvgConfig::default(),
            theme: Theme::default(),
            format: OutputFormat::default(),
            title: "Purchase Map".to_string(),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the theme for color resolution
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the HTML page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Render people to SVG with default render settings
pub fn render(people: &PeopleFeatureCollection, config: &Config) -> String {
    let svg = SvgConfig::default().with_icon_size(config.icon_size);
    render_svg(people, &YearScale::from_config(config), &svg)
}

/// Render people in the configured output format
///
/// # Example
///
/// ```rust
/// use purchase_map::{render_with_config, Config, OutputFormat, PeopleFeatureCollection, RenderConfig};
///
/// let config = Config::offline();
/// let render = RenderConfig::new().with_format(OutputFormat::GeoJson);
/// let json = render_with_config(&PeopleFeatureCollection::default(), &config, &render).unwrap();
/// assert!(json.contains("FeatureCollection"));
/// ```
pub fn render_with_config(
    people: &PeopleFeatureCollection,
    config: &Config,
    render: &RenderConfig,
) -> Result<String, MapError> {
    let scale = YearScale::from_config(config);
    let svg_config = render.svg.clone().with_icon_size(config.icon_size);

    let output = match render.format {
        OutputFormat::GeoJson => people.to_json_pretty()?,
        OutputFormat::Svg => render_svg_with_theme(people, &scale, &svg_config, &render.theme),
        OutputFormat::Html => {
            let svg = render_svg_with_theme(people, &scale, &svg_config, &render.theme);
            render_html(&render.title, &svg, &render.theme)
        }
    };
    Ok(output)
}

/// Fetch the configured dataset and render it
///
/// Fails before rendering anything if the config has no credentials or any
/// page cannot be loaded.
pub async fn load_and_render<T>(
    transport: &T,
    config: &Config,
    render: &RenderConfig,
) -> Result<String, MapError>
where
    T: Transport + ?Sized,
{
    let credentials = config.credentials.as_ref().ok_or(ConfigError::Missing {
        name: crate::config::API_KEY_VAR,
        message: "Missing Mapbox API key!",
    })?;
    let people = load_dataset(transport, credentials).await?;
    render_with_config(&people, config, render)
}
