//! Purchase year to marker color mapping

use std::fmt;

use crate::config::Config;

/// Color used for people with no recorded purchase year
pub const NEUTRAL_COLOR: &str = "white";

/// Saturation of every year color, in percent
pub const SATURATION: u8 = 74;

/// Lightness of every year color, in percent
pub const LIGHTNESS: u8 = 69;

/// Linearly rescale `x` from `[x1_min, x1_max]` into `[x2_min, x2_max]`
///
/// Values outside the source range extrapolate; nothing is clamped.
pub fn lerp(x: f64, (x1_min, x1_max): (f64, f64), (x2_min, x2_max): (f64, f64)) -> f64 {
    x2_min + (x - x1_min) * (x2_max - x2_min) / (x1_max - x1_min)
}

/// An HSL color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: u8,
    pub lightness: u8,
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Maps years in `[start_year, current_year + 1]` onto the hue wheel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearScale {
    pub start_year: i32,
    pub current_year: i32,
}

impl YearScale {
    pub fn new(start_year: i32, current_year: i32) -> Self {
        Self {
            start_year,
            current_year,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.start_year, config.current_year)
    }

    /// Hue in degrees for `year`
    ///
    /// The upper bound is `current_year + 1` so the start and current years
    /// never share the 0/360 hue.
    pub fn hue(&self, year: i32) -> f64 {
        lerp(
            f64::from(year),
            (
                f64::from(self.start_year),
                f64::from(self.current_year) + 1.0,
            ),
            (0.0, 360.0),
        )
    }

    pub fn color(&self, year: i32) -> Hsl {
        Hsl {
            hue: self.hue(year),
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }

    /// CSS color for a marker, neutral when the year is unknown
    pub fn marker_color(&self, year: Option<i32>) -> String {
        match year {
            Some(year) => self.color(year).to_string(),
            None => NEUTRAL_COLOR.to_string(),
        }
    }

    /// Years covered by the legend, newest first
    pub fn years_descending(&self) -> impl Iterator<Item = i32> {
        (self.start_year..=self.current_year).rev()
    }
}
