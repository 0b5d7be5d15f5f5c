use serde::{Deserialize, Serialize};

/// Style block shared by every element variant. Free-form so the design canvas
/// (out of scope here) can carry whatever rendering attributes it needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementCommon {
    pub id: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Rectangle {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        radius: f64,
    },
    Ellipse {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
    },
    Polygon {
        #[serde(flatten)]
        common: ElementCommon,
        points: Vec<(f64, f64)>,
    },
    Custom {
        #[serde(flatten)]
        common: ElementCommon,
        data: serde_json::Value,
    },
}

impl Shape {
    pub fn common(&self) -> &ElementCommon {
        match self {
            Shape::Rectangle { common, .. }
            | Shape::Circle { common, .. }
            | Shape::Ellipse { common, .. }
            | Shape::Polygon { common, .. }
            | Shape::Custom { common, .. } => common,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Hole {
    Circular {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        radius: f64,
    },
    Rectangular {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Square {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        side: f64,
    },
    Slot {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Custom {
        #[serde(flatten)]
        common: ElementCommon,
        area: f64,
        data: serde_json::Value,
    },
}

impl Hole {
    pub fn common(&self) -> &ElementCommon {
        match self {
            Hole::Circular { common, .. }
            | Hole::Rectangular { common, .. }
            | Hole::Square { common, .. }
            | Hole::Slot { common, .. }
            | Hole::Custom { common, .. } => common,
        }
    }

    /// Area of this hole in mm², used to enforce the "holes sum to at most the
    /// outer rectangle's area" invariant.
    pub fn area(&self) -> f64 {
        match self {
            Hole::Circular { radius, .. } => std::f64::consts::PI * radius * radius,
            Hole::Rectangular { width, height, .. } => width * height,
            Hole::Square { side, .. } => side * side,
            Hole::Slot { width, height, .. } => width * height,
            Hole::Custom { area, .. } => *area,
        }
    }

    pub fn has_positive_dimensions(&self) -> bool {
        match self {
            Hole::Circular { radius, .. } => *radius > 0.0,
            Hole::Rectangular { width, height, .. } => *width > 0.0 && *height > 0.0,
            Hole::Square { side, .. } => *side > 0.0,
            Hole::Slot { width, height, .. } => *width > 0.0 && *height > 0.0,
            Hole::Custom { area, .. } => *area > 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeCut {
    Straight {
        #[serde(flatten)]
        common: ElementCommon,
        from: (f64, f64),
        to: (f64, f64),
    },
    Bevel {
        #[serde(flatten)]
        common: ElementCommon,
        from: (f64, f64),
        to: (f64, f64),
        angle_deg: f64,
    },
    Rounded {
        #[serde(flatten)]
        common: ElementCommon,
        from: (f64, f64),
        to: (f64, f64),
        radius: f64,
    },
    Notched {
        #[serde(flatten)]
        common: ElementCommon,
        from: (f64, f64),
        to: (f64, f64),
        depth: f64,
    },
    Custom {
        #[serde(flatten)]
        common: ElementCommon,
        data: serde_json::Value,
    },
}

impl EdgeCut {
    pub fn common(&self) -> &ElementCommon {
        match self {
            EdgeCut::Straight { common, .. }
            | EdgeCut::Bevel { common, .. }
            | EdgeCut::Rounded { common, .. }
            | EdgeCut::Notched { common, .. }
            | EdgeCut::Custom { common, .. } => common,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Note {
    Text {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        text: String,
    },
    Measurement {
        #[serde(flatten)]
        common: ElementCommon,
        from: (f64, f64),
        to: (f64, f64),
        value_mm: f64,
    },
    Dimension {
        #[serde(flatten)]
        common: ElementCommon,
        from: (f64, f64),
        to: (f64, f64),
        label: String,
    },
    Angle {
        #[serde(flatten)]
        common: ElementCommon,
        vertex: (f64, f64),
        degrees: f64,
    },
    Area {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        value_mm2: f64,
    },
    Tooltip {
        #[serde(flatten)]
        common: ElementCommon,
        x: f64,
        y: f64,
        text: String,
    },
}

impl Note {
    pub fn common(&self) -> &ElementCommon {
        match self {
            Note::Text { common, .. }
            | Note::Measurement { common, .. }
            | Note::Dimension { common, .. }
            | Note::Angle { common, .. }
            | Note::Area { common, .. }
            | Note::Tooltip { common, .. } => common,
        }
    }
}

/// The full element payload stored as JSON text in `designs.elements_json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Elements {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub holes: Vec<Hole>,
    #[serde(default)]
    pub cuts: Vec<EdgeCut>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Elements {
    pub fn total_hole_area(&self) -> f64 {
        self.holes.iter().map(Hole::area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_round_trip_through_json() {
        let elements = Elements {
            shapes: vec![Shape::Rectangle {
                common: ElementCommon {
                    id: "outer".into(),
                    style: Style::default(),
                    visible: true,
                    locked: false,
                },
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 200.0,
            }],
            holes: vec![Hole::Circular {
                common: ElementCommon {
                    id: "hole-1".into(),
                    style: Style::default(),
                    visible: true,
                    locked: false,
                },
                x: 10.0,
                y: 10.0,
                radius: 5.0,
            }],
            cuts: vec![],
            notes: vec![],
        };

        let json = serde_json::to_string(&elements).unwrap();
        let round_tripped: Elements = serde_json::from_str(&json).unwrap();

        assert_eq!(round_tripped.shapes.len(), 1);
        assert_eq!(round_tripped.holes.len(), 1);
        assert!((round_tripped.total_hole_area() - std::f64::consts::PI * 25.0).abs() < 1e-9);
    }
}
