//! Standalone HTML page around the rendered map

use crate::theme::Theme;

use super::svg::escape_xml;

/// Wrap an inline SVG map in a full-window HTML page
///
/// Any XML declaration on `svg` is dropped since it is invalid inside HTML.
/// The page around the map takes the theme's background color.
pub fn render_html(title: &str, svg: &str, theme: &Theme) -> String {
    let body = svg
        .strip_prefix(r#"<?xml version="1.0" encoding="UTF-8"?>"#)
        .unwrap_or(svg)
        .trim_start();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{}</title>
  <style>
    html, body {{ margin: 0; height: 100%; background: {}; }}
    #map {{ width: 100%; height: 100%; display: flex; align-items: center; justify-content: center; }}
    #map > svg {{ width: 100%; height: auto; max-height: 100%; }}
  </style>
</head>
<body>
<div id="map">
{}
</div>
</body>
</html>
"#,
        escape_xml(title),
        escape_xml(theme.color("background")),
        body
    )
}
