//! Purchase year legend

use crate::color::{Hsl, YearScale};

/// Corner of the map a control is pinned to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// One colored year block
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub year: i32,
    pub color: Hsl,
}

/// Legend listing every year from the current one back to the first sale
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseYearLegend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
    pub position: ControlPosition,
}

impl PurchaseYearLegend {
    pub fn new(scale: &YearScale) -> Self {
        let entries = scale
            .years_descending()
            .map(|year| LegendEntry {
                year,
                color: scale.color(year),
            })
            .collect();

        Self {
            title: "Legend".to_string(),
            entries,
            position: ControlPosition::default(),
        }
    }

    pub fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
