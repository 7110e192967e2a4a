//! SVG Map Renderer
//!
//! Each city is a disc on a grid cell with half-bars toward its linked
//! neighbours; occupied cities carry a marker with the alien count.

use std::fmt::Write;

use invasion_events::WorldSnapshot;
use thiserror::Error;

const CITY_COLOR: &str = "fill:#283f93";
const ALIEN_COLOR: &str = "fill:#19e822";
const FIGHT_COLOR: &str = "fill:#e81922";
const NAME_STYLE: &str = "text-anchor:middle;font-size:16px;font-family:helvetica;fill:white";
const COUNT_STYLE: &str = "text-anchor:middle;font-size:10px;font-family:helvetica;fill:black";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("city `{city}` has negative coordinates ({x}, {y})")]
    NegativeCoordinates { city: String, x: i64, y: i64 },

    #[error("formatting image: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Turns a snapshot into an encoded image.
pub trait Renderer: Send + Sync {
    /// MIME type of the bytes `render` produces
    fn content_type(&self) -> &'static str;

    fn render(&self, snapshot: &WorldSnapshot) -> Result<Vec<u8>, RenderError>;
}

/// Grid geometry in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgRenderer {
    /// Minimum canvas width
    pub width: i64,
    /// Minimum canvas height
    pub height: i64,
    /// Side of one grid cell
    pub city_size: i64,
    /// Radius of a city disc
    pub city_width: i64,
    /// Thickness of a connection bar
    pub conn_size: i64,
    /// Radius of the alien marker
    pub alien_width: i64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            city_size: 120,
            city_width: 40,
            conn_size: 10,
            alien_width: 12,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas size; grows past the minimum when the map needs more room.
    pub fn canvas_size(&self, snapshot: &WorldSnapshot) -> (i64, i64) {
        (
            self.width.max(snapshot.width * self.city_size),
            self.height.max(snapshot.height * self.city_size),
        )
    }

    /// The document as a string.
    pub fn render_to_string(&self, snapshot: &WorldSnapshot) -> Result<String, RenderError> {
        let (width, height) = self.canvas_size(snapshot);
        let counts = snapshot.alien_counts();
        let half = self.city_size / 2;
        let bar = self.conn_size / 2;

        let mut svg = String::new();
        writeln!(svg, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            svg,
            r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">"#
        )?;

        for city in &snapshot.cities {
            if city.x < 0 || city.y < 0 {
                return Err(RenderError::NegativeCoordinates {
                    city: city.name.clone(),
                    x: city.x,
                    y: city.y,
                });
            }
            let x = self.city_size * city.x;
            let y = self.city_size * city.y;
            let (cx, cy) = (x + half, y + half);

            if city.north.is_some() {
                self.rect(&mut svg, cx - bar, y, self.conn_size, half)?;
            }
            if city.east.is_some() {
                self.rect(&mut svg, cx, cy - bar, half, self.conn_size)?;
            }
            if city.south.is_some() {
                self.rect(&mut svg, cx - bar, cy, self.conn_size, half)?;
            }
            if city.west.is_some() {
                self.rect(&mut svg, x, cy - bar, half, self.conn_size)?;
            }

            writeln!(
                svg,
                r#"<circle cx="{cx}" cy="{cy}" r="{}" style="{CITY_COLOR}" />"#,
                self.city_width
            )?;
            writeln!(
                svg,
                r#"<text x="{cx}" y="{cy}" style="{NAME_STYLE}">{}</text>"#,
                escape_xml(&city.name)
            )?;

            let aliens = counts.get(&city.city_id).copied().unwrap_or(0);
            if aliens > 0 {
                let color = if aliens == 1 { ALIEN_COLOR } else { FIGHT_COLOR };
                let my = cy + self.city_size / 8;
                writeln!(
                    svg,
                    r#"<circle cx="{cx}" cy="{my}" r="{}" style="{color}" />"#,
                    self.alien_width
                )?;
                writeln!(
                    svg,
                    r#"<text x="{cx}" y="{}" style="{COUNT_STYLE}">{aliens}</text>"#,
                    my + self.alien_width / 3
                )?;
            }
        }

        writeln!(svg, "</svg>")?;
        Ok(svg)
    }

    fn rect(&self, svg: &mut String, x: i64, y: i64, w: i64, h: i64) -> std::fmt::Result {
        writeln!(
            svg,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" style="{CITY_COLOR}" />"#
        )
    }
}

impl Renderer for SvgRenderer {
    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn render(&self, snapshot: &WorldSnapshot) -> Result<Vec<u8>, RenderError> {
        self.render_to_string(snapshot).map(String::into_bytes)
    }
}

/// Escapes the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
