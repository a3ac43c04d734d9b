//! SVG generation for the people map

use tracing::debug;

use crate::color::YearScale;
use crate::data::PeopleFeatureCollection;
use crate::legend::{ControlPosition, PurchaseYearLegend};
use crate::theme::Theme;

use super::projection::{Point, Projection, ScaleBar};
use super::SvgConfig;

/// Legend panel width
const LEGEND_WIDTH: f64 = 96.0;
/// Height of the legend heading row
const LEGEND_TITLE_HEIGHT: f64 = 26.0;
/// Height of each year row
const LEGEND_ROW_HEIGHT: f64 = 18.0;
/// Height of the scale control
const SCALE_HEIGHT: f64 = 20.0;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    base: Vec<String>,
    markers: Vec<String>,
    controls: Vec<String>,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            base: vec![],
            markers: vec![],
            controls: vec![],
        }
    }

    /// Add CSS custom properties from a theme
    pub fn add_theme(&mut self, theme: &Theme) {
        self.styles.push(theme.css_variables());
    }

    /// Add the rules that tie classes to theme variables and drive the popup
    pub fn add_base_styles(&mut self) {
        let p = self.prefix();
        let rules = [
            format!(".{p}background {{ fill: var(--background); }}"),
            format!(".{p}graticule {{ stroke: var(--graticule); stroke-width: 1; }}"),
            format!(".{p}equator {{ stroke: var(--equator); }}"),
            format!(".{p}marker {{ cursor: pointer; outline: none; }}"),
            format!(".{p}marker__halo {{ fill: var(--{p}marker-color); fill-opacity: 0.3; }}"),
            format!(
                ".{p}marker__inner {{ fill: var(--{p}marker-color); stroke: var(--marker-outline); stroke-width: 1; }}"
            ),
            format!(".{p}popup {{ visibility: hidden; pointer-events: none; }}"),
            format!(".{p}marker:hover .{p}popup, .{p}marker:focus .{p}popup {{ visibility: visible; }}"),
            format!(".{p}popup rect {{ fill: var(--popup-background); }}"),
            format!(".{p}popup text {{ fill: var(--popup-text); font: 12px sans-serif; }}"),
            format!(".{p}legend__panel {{ fill: var(--legend-background); fill-opacity: 0.9; }}"),
            format!(".{p}legend text {{ fill: var(--legend-text); font: 12px sans-serif; }}"),
            format!(".{p}legend__title {{ font-weight: bold; }}"),
            format!(".{p}legend__year--stripe {{ fill: var(--{p}legend-color); }}"),
            format!(".{p}scale__panel {{ fill: var(--legend-background); fill-opacity: 0.75; }}"),
            format!(".{p}scale__bar {{ fill: none; stroke: var(--legend-text); stroke-width: 2; }}"),
            format!(".{p}scale text {{ fill: var(--legend-text); font: 10px sans-serif; }}"),
        ];
        self.styles.extend(rules);
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self, depth: usize) -> String {
        if self.config.pretty_print {
            "  ".repeat(depth)
        } else {
            String::new()
        }
    }

    /// Top-left of a `width` x `height` control pinned to `position`
    fn corner(&self, position: ControlPosition, width: f64, height: f64) -> (f64, f64) {
        let margin = self.config.control_margin;
        let left = margin;
        let right = self.config.width - margin - width;
        let top = margin;
        let bottom = self.config.height - margin - height;
        match position {
            ControlPosition::TopLeft => (left, top),
            ControlPosition::TopRight => (right, top),
            ControlPosition::BottomLeft => (left, bottom),
            ControlPosition::BottomRight => (right, bottom),
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Fill the whole canvas with the background color
    pub fn add_background(&mut self) {
        let p = self.prefix();
        self.base.push(format!(
            r#"{}<rect class="{}background" x="0" y="0" width="{}" height="{}"/>"#,
            self.indent_str(1),
            p,
            self.config.width,
            self.config.height
        ));
    }

    /// Add meridians and parallels every `step` degrees
    pub fn add_graticule(&mut self, projection: &Projection, step: f64) {
        if !(step.is_finite() && step > 0.0) {
            return;
        }
        let p = self.prefix();
        let indent = self.indent_str(1);
        let (width, height) = (self.config.width, self.config.height);

        let meridians = (180.0 / step).floor() as i64;
        for i in -meridians..=meridians {
            let x = projection.x_of(i as f64 * step);
            self.base.push(format!(
                r#"{}<line class="{}graticule" x1="{}" y1="0" x2="{}" y2="{}"/>"#,
                indent, p, x, x, height
            ));
        }

        let parallels = (90.0 / step).floor() as i64;
        for i in -parallels..=parallels {
            let y = projection.y_of(i as f64 * step);
            let class = if i == 0 {
                format!("{p}graticule {p}equator")
            } else {
                format!("{p}graticule")
            };
            self.base.push(format!(
                r#"{}<line class="{}" x1="0" y1="{}" x2="{}" y2="{}"/>"#,
                indent, class, y, width, y
            ));
        }
    }

    /// Add one person marker
    ///
    /// `radius` is the icon radius; an invisible hit circle one pixel larger
    /// sits underneath so hovering anywhere on the icon opens the popup.
    pub fn add_marker(&mut self, at: Point, radius: f64, color: &str, popup: Option<&str>) {
        let p = self.prefix();
        let outer = self.indent_str(2);
        let inner = self.indent_str(3);
        let nl = self.newline();

        let mut marker = format!(
            r#"{}<g class="{}marker" tabindex="0" style="--{}marker-color: {}">{}"#,
            outer,
            p,
            p,
            escape_xml(color),
            nl
        );
        marker.push_str(&format!(
            r##"{}<circle class="{}marker__hitbox" cx="{}" cy="{}" r="{}" fill="#00FFFF" fill-opacity="0"/>{}"##,
            inner,
            p,
            at.x,
            at.y,
            radius + 1.0,
            nl
        ));
        marker.push_str(&format!(
            r#"{}<circle class="{}marker__halo" cx="{}" cy="{}" r="{}"/>{}"#,
            inner, p, at.x, at.y, radius, nl
        ));
        marker.push_str(&format!(
            r#"{}<circle class="{}marker__inner" cx="{}" cy="{}" r="{}"/>{}"#,
            inner,
            p,
            at.x,
            at.y,
            radius / 3.0,
            nl
        ));

        if let Some(text) = popup {
            let text = escape_xml(text);
            marker.push_str(&format!("{}<title>{}</title>{}", inner, text, nl));
            marker.push_str(&format!(
                r#"{}<g class="{}popup" transform="translate({} {})"><rect x="-50" y="-22" width="100" height="20" rx="3"/><text x="0" y="-8" text-anchor="middle">{}</text></g>{}"#,
                inner,
                p,
                at.x,
                at.y - radius - 4.0,
                text,
                nl
            ));
        }

        marker.push_str(&format!("{}</g>", outer));
        self.markers.push(marker);
    }

    /// Add the purchase year legend in its pinned corner
    pub fn add_legend(&mut self, legend: &PurchaseYearLegend) {
        let p = self.prefix();
        let nl = self.newline();
        let height = LEGEND_TITLE_HEIGHT + LEGEND_ROW_HEIGHT * legend.len() as f64 + 6.0;
        let (x, y) = self.corner(legend.position, LEGEND_WIDTH, height);

        let mut out = format!(
            r#"{}<g class="{}legend" transform="translate({} {})">{}"#,
            self.indent_str(1),
            p,
            x,
            y,
            nl
        );
        out.push_str(&format!(
            r#"{}<rect class="{}legend__panel" x="0" y="0" width="{}" height="{}" rx="4"/>{}"#,
            self.indent_str(2),
            p,
            LEGEND_WIDTH,
            height,
            nl
        ));
        out.push_str(&format!(
            r#"{}<text class="{}legend__title" x="10" y="18">{}</text>{}"#,
            self.indent_str(2),
            p,
            escape_xml(&legend.title),
            nl
        ));

        for (i, entry) in legend.entries.iter().enumerate() {
            let row_y = LEGEND_TITLE_HEIGHT + LEGEND_ROW_HEIGHT * i as f64;
            out.push_str(&format!(
                r#"{}<g class="{}legend__year" style="--{}legend-color: {}">{}"#,
                self.indent_str(2),
                p,
                p,
                entry.color,
                nl
            ));
            out.push_str(&format!(
                r#"{}<text class="{}legend__year--text" x="10" y="{}">{}</text>{}"#,
                self.indent_str(3),
                p,
                row_y + 12.0,
                entry.year,
                nl
            ));
            out.push_str(&format!(
                r#"{}<rect class="{}legend__year--stripe" x="52" y="{}" width="34" height="10"/>{}"#,
                self.indent_str(3),
                p,
                row_y + 3.0,
                nl
            ));
            out.push_str(&format!("{}</g>{}", self.indent_str(2), nl));
        }

        out.push_str(&format!("{}</g>", self.indent_str(1)));
        self.controls.push(out);
    }

    /// Add a distance scale in the given corner
    pub fn add_scale(&mut self, bar: &ScaleBar, position: ControlPosition) {
        let p = self.prefix();
        let nl = self.newline();
        let (x, y) = self.corner(position, bar.width, SCALE_HEIGHT);

        let mut out = format!(
            r#"{}<g class="{}scale" transform="translate({} {})">{}"#,
            self.indent_str(1),
            p,
            x,
            y,
            nl
        );
        out.push_str(&format!(
            r#"{}<rect class="{}scale__panel" x="0" y="0" width="{}" height="{}"/>{}"#,
            self.indent_str(2),
            p,
            bar.width,
            SCALE_HEIGHT,
            nl
        ));
        out.push_str(&format!(
            r#"{}<path class="{}scale__bar" d="M1 12 V19 H{} V12"/>{}"#,
            self.indent_str(2),
            p,
            bar.width - 1.0,
            nl
        ));
        out.push_str(&format!(
            r#"{}<text x="4" y="13">{}</text>{}"#,
            self.indent_str(2),
            escape_xml(&bar.label()),
            nl
        ));
        out.push_str(&format!("{}</g>", self.indent_str(1)));
        self.controls.push(out);
    }

    /// Number of markers added so far
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Build the final SVG string
    pub fn build(self) -> String {
        let nl = self.newline();
        let p = self.prefix();

        let mut svg = String::new();

        // XML declaration for standalone
        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="{}canvas" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            p, self.config.width, self.config.height, self.config.width, self.config.height
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str(&self.indent_str(1));
            svg.push_str("<style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str(&self.indent_str(2));
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str(&self.indent_str(1));
            svg.push_str("</style>");
            svg.push_str(nl);
        }

        for elem in &self.base {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str(&format!(r#"{}<g class="{}people">"#, self.indent_str(1), p));
        svg.push_str(nl);
        for marker in &self.markers {
            svg.push_str(marker);
            svg.push_str(nl);
        }
        svg.push_str(&self.indent_str(1));
        svg.push_str("</g>");
        svg.push_str(nl);

        // Controls (rendered on top)
        for control in &self.controls {
            svg.push_str(control);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render people to an SVG string with the default theme
pub fn render_svg(people: &PeopleFeatureCollection, scale: &YearScale, config: &SvgConfig) -> String {
    render_svg_with_theme(people, scale, config, &Theme::default())
}

/// Render people to an SVG string with a custom theme
pub fn render_svg_with_theme(
    people: &PeopleFeatureCollection,
    scale: &YearScale,
    config: &SvgConfig,
    theme: &Theme,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_theme(theme);
    builder.add_base_styles();

    let projection = Projection::new(config.width, config.height);
    builder.add_background();
    if let Some(step) = config.graticule_step {
        builder.add_graticule(&projection, step);
    }

    let radius = config.rem2px(config.icon_size / 2.0);
    for person in &people.features {
        let Some(at) = projection.project(person.coordinates()) else {
            debug!(coordinates = ?person.coordinates(), "skipping person with unusable coordinates");
            continue;
        };
        let year = person.purchase_year();
        let color = scale.marker_color(year);
        let popup = year.map(|year| format!("Purchased {}", year));
        builder.add_marker(at, radius, &color, popup.as_deref());
    }
    debug!(markers = builder.marker_count(), "placed markers");

    builder.add_legend(&PurchaseYearLegend::new(scale));
    if let Some(bar) = config
        .scale_max_width
        .and_then(|max_width| projection.scale_bar(max_width))
    {
        builder.add_scale(&bar, ControlPosition::BottomLeft);
    }
    builder.build()
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
