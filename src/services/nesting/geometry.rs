use crate::models::nesting::PlacedPiece;

/// A piece expanded out of its `PieceRequest` quantity, carrying its original
/// request index so tie-breaks can prefer the piece that arrived first.
#[derive(Debug, Clone)]
pub struct ExpandedPiece {
    pub original_index: usize,
    pub design_id: Option<crate::models::Id>,
    pub label: Option<String>,
    pub width: f64,
    pub height: f64,
    pub priority: i32,
}

/// The two orientations a piece may be tried in, as `(width, height, rotation)`.
pub fn orientations(width: f64, height: f64, allow_rotation: bool) -> Vec<(f64, f64, u32)> {
    let mut out = vec![(width, height, 0)];
    if allow_rotation {
        out.push((height, width, 90));
    }
    out
}

pub fn within_sheet(x: f64, y: f64, w: f64, h: f64, margin: f64, sheet_w: f64, sheet_h: f64) -> bool {
    x >= margin && y >= margin && x + w <= sheet_w - margin && y + h <= sheet_h - margin
}

/// Whether a candidate rectangle at `(x, y, w, h)` keeps `minimum_gap` away
/// from `other` along at least one axis.
fn separated(x: f64, y: f64, w: f64, h: f64, other: &PlacedPiece, gap: f64) -> bool {
    let (ow, oh) = other.footprint();
    let separated_x = x + w + gap <= other.x || other.x + ow + gap <= x;
    let separated_y = y + h + gap <= other.y || other.y + oh + gap <= y;
    separated_x || separated_y
}

pub fn fits(x: f64, y: f64, w: f64, h: f64, placed: &[PlacedPiece], gap: f64, margin: f64, sheet_w: f64, sheet_h: f64) -> bool {
    within_sheet(x, y, w, h, margin, sheet_w, sheet_h) && placed.iter().all(|p| separated(x, y, w, h, p, gap))
}

/// Candidate x/y positions derived from the sheet margin plus every already
/// placed piece's far edge (inflated by the gap). Bottom-left and greedy
/// placement both scan this grid rather than maintaining a free-rectangle
/// list; it is simpler to reason about and gives the same candidate set.
pub fn candidate_positions(placed: &[PlacedPiece], margin: f64, gap: f64) -> (Vec<f64>, Vec<f64>) {
    let mut xs = vec![margin];
    let mut ys = vec![margin];
    for p in placed {
        let (w, h) = p.footprint();
        xs.push(p.x + w + gap);
        ys.push(p.y + h + gap);
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    xs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ys.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    (xs, ys)
}
