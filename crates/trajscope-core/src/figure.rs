//! Figure preparation for 3D line plots
//!
//! Converts projected trajectories into plotly-compatible traces: one `scatter3d`
//! line per trajectory, colored from blue (first step) to red (last step).

use serde::{Deserialize, Serialize};

use crate::projector::ProjectedTrajectory;

pub const FIGURE_TITLE: &str = "Trajectories in Latent Space";
const LINE_WIDTH: u32 = 2;

/// 8-bit RGB color, serialized as `rgb(r, g, b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let inner = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("not an rgb() color: {}", s))?;
        let channels = inner
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("bad channel in {}: {}", s, e))?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgb(*r, *g, *b)),
            _ => Err(format!("expected 3 channels in {}", s)),
        }
    }
}

/// Color of point `index` in a trajectory of `len` points.
///
/// `t = index / (len - 1)` sweeps 0 -> 1; red rises with `t`, blue falls. A single
/// point takes `t = 0`.
pub fn gradient_color(index: usize, len: usize) -> Rgb {
    let t = if len > 1 {
        index as f64 / (len - 1) as f64
    } else {
        0.0
    };
    let channel = |v: f64| (255.0 * v.clamp(0.0, 1.0)).round() as u8;
    Rgb(channel(t), 0, channel(1.0 - t))
}

/// Axis label for the `ordinal`-th selected basis (0-based in, 1-based out).
pub fn axis_label(ordinal: usize) -> String {
    format!("SVD{}", ordinal + 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: Vec<Rgb>,
    pub width: u32,
}

/// One trajectory rendered as a continuous 3D curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub line: Line,
    pub name: String,
}

impl Trace {
    /// Build the trace for trajectory number `index` (0-based).
    pub fn from_trajectory(index: usize, trajectory: &ProjectedTrajectory) -> Self {
        let axis = |k: usize| -> Vec<f64> {
            trajectory
                .iter()
                .filter_map(|point| point.get(k).copied())
                .collect()
        };
        let len = trajectory.len();

        Self {
            x: axis(0),
            y: axis(1),
            z: axis(2),
            mode: "lines".to_string(),
            kind: "scatter3d".to_string(),
            line: Line {
                color: (0..len).map(|i| gradient_color(i, len)).collect(),
                width: LINE_WIDTH,
            },
            name: format!("Trajectory {}", index + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.line.color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.color.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
    pub showspikes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
    pub hovermode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub showlegend: bool,
    pub scene: Scene,
}

impl Default for Layout {
    fn default() -> Self {
        let axis = |ordinal| Axis {
            title: axis_label(ordinal),
            showspikes: false,
        };
        Self {
            title: FIGURE_TITLE.to_string(),
            showlegend: false,
            scene: Scene {
                xaxis: axis(0),
                yaxis: axis(1),
                zaxis: axis(2),
                hovermode: false,
            },
        }
    }
}

/// Everything a renderer needs for one update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn from_projection(trajectories: &[ProjectedTrajectory]) -> Self {
        Self {
            data: trajectories
                .iter()
                .enumerate()
                .map(|(i, t)| Trace::from_trajectory(i, t))
                .collect(),
            layout: Layout::default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
