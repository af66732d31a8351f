// Link domain model and directional conflict resolution
use super::color::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrow {
    AToZ = 1,
    ZToA = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    Z,
}

impl Side {
    pub fn arrow(&self) -> Arrow {
        match self {
            Side::A => Arrow::AToZ,
            Side::Z => Arrow::ZToA,
        }
    }
}

/// Per-direction statistics shown in tooltips.
/// `cur` is the normalized percentage used for coloring; the rest are unit-scaled strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionStats {
    pub cur: Option<f64>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub sum: Option<String>,
    pub avg: Option<String>,
    /// Sampling cadence of the side's series, in milliseconds.
    #[serde(default)]
    pub interval_ms: Option<i64>,
}

/// Result of running one series through the pipeline for one side of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct SideUpdate {
    pub cur: f64,
    pub color: Color,
    pub count: usize,
    pub min: String,
    pub max: String,
    pub sum: String,
    pub avg: String,
    pub interval_ms: Option<i64>,
}

/// A topology edge. The owning layer controls its lifetime; the pipeline
/// only rewrites its visual content while it holds the layer borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub endpoints: [String; 2],
    #[serde(default)]
    pub az: DirectionStats,
    #[serde(default)]
    pub za: DirectionStats,
    #[serde(default, skip_deserializing)]
    pub line_color: Option<Color>,
    #[serde(default, skip_deserializing)]
    pub az_line_color: Option<Color>,
    #[serde(default, skip_deserializing)]
    pub za_line_color: Option<Color>,
    #[serde(default)]
    pub arrow: Option<Arrow>,
    #[serde(default)]
    pub count: usize,
}

impl Link {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, a_side: impl Into<String>, z_side: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: [a_side.into(), z_side.into()],
            az: DirectionStats::default(),
            za: DirectionStats::default(),
            line_color: None,
            az_line_color: None,
            za_line_color: None,
            arrow: None,
            count: 0,
        }
    }

    /// Which side of the link `endpoint` measures. Anything that is not the
    /// A-side endpoint is treated as the Z-side.
    pub fn side_of(&self, endpoint: &str) -> Side {
        if self.endpoints[0] == endpoint {
            Side::A
        } else {
            Side::Z
        }
    }

    /// Overwrite one side's slot with this cycle's result and re-resolve the
    /// rendered color and arrow.
    pub fn record(&mut self, side: Side, update: SideUpdate) {
        let stats = DirectionStats {
            cur: Some(update.cur),
            min: Some(update.min),
            max: Some(update.max),
            sum: Some(update.sum),
            avg: Some(update.avg),
            interval_ms: update.interval_ms,
        };

        match side {
            Side::A => {
                self.az = stats;
                self.az_line_color = Some(update.color);
            }
            Side::Z => {
                self.za = stats;
                self.za_line_color = Some(update.color);
            }
        }
        self.count = update.count;
        self.line_color = Some(update.color);
        self.arrow = Some(side.arrow());

        self.resolve_direction();
    }

    /// The side with the strictly larger `cur` wins; ties go to Z.
    /// With only one side measured, that side wins.
    pub fn winning_side(&self) -> Option<Side> {
        match (self.az.cur, self.za.cur) {
            (Some(az), Some(za)) if az > za => Some(Side::A),
            (Some(_), Some(_)) => Some(Side::Z),
            (Some(_), None) => Some(Side::A),
            (None, Some(_)) => Some(Side::Z),
            (None, None) => None,
        }
    }

    pub fn resolve_direction(&mut self) {
        let Some(side) = self.winning_side() else {
            return;
        };
        let color = match side {
            Side::A => self.az_line_color,
            Side::Z => self.za_line_color,
        };
        if color.is_some() {
            self.line_color = color;
        }
        self.arrow = Some(side.arrow());
    }
}
