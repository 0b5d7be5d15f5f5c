use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Blf,
    Genetic,
    Greedy,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Blf
    }
}

/// One required piece, as submitted in an optimisation request. Each
/// carries its original request index so tie-breaks can prefer lower indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceRequest {
    /// Source design, when this piece was expanded from a catalogued design
    /// rather than an ad-hoc override.
    #[serde(default)]
    pub design_id: Option<Id>,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementOptions {
    #[serde(default = "default_true")]
    pub allow_rotation: bool,
    #[serde(default)]
    pub allow_flipping: bool,
    #[serde(default = "default_gap")]
    pub minimum_gap: f64,
    #[serde(default = "default_margin")]
    pub edge_margin: f64,
}

fn default_true() -> bool {
    true
}
fn default_gap() -> f64 {
    2.0
}
fn default_margin() -> f64 {
    5.0
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            allow_rotation: true,
            allow_flipping: false,
            minimum_gap: default_gap(),
            edge_margin: default_margin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingRequest {
    pub sheet_width: f64,
    pub sheet_height: f64,
    pub pieces: Vec<PieceRequest>,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub options: PlacementOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub id: String,
    pub design_id: Option<Id>,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 0 or 90, in degrees.
    pub rotation: u32,
    pub flipped: bool,
}

impl PlacedPiece {
    /// The oriented footprint: `(width, height)` swapped under a 90° rotation.
    pub fn footprint(&self) -> (f64, f64) {
        if self.rotation == 90 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    pub fn perimeter(&self) -> f64 {
        let (w, h) = self.footprint();
        2.0 * (w + h)
    }

    pub fn area(&self) -> f64 {
        let (w, h) = self.footprint();
        w * h
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnplacedPiece {
    pub label: Option<String>,
    pub width: f64,
    pub height: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingStats {
    pub total_pieces: u32,
    pub placed_count: u32,
    pub unplaced_count: u32,
    pub utilization: f64,
    pub waste: f64,
    pub cutting_length_mm: f64,
    pub cutting_time_s: f64,
    pub material_efficiency: f64,
    #[serde(default)]
    pub timeout: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub sheet_width: f64,
    pub sheet_height: f64,
    pub placed: Vec<PlacedPiece>,
    pub unplaced: Vec<UnplacedPiece>,
    pub stats: NestingStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingResult {
    pub layout: Layout,
    pub execution_ms: u64,
}
