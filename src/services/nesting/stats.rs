use crate::models::nesting::{NestingStats, PlacedPiece, UnplacedPiece};

const DEFAULT_FEED_RATE_S_PER_MM: f64 = 0.002;

/// Computes the statistics block for a finished layout.
/// `material_efficiency = utilisation × (placed_count / total_count)`, so a
/// run with unplaced pieces scores lower even when the placed ones pack tightly.
pub fn compute(
    placed: &[PlacedPiece],
    unplaced: &[UnplacedPiece],
    sheet_width: f64,
    sheet_height: f64,
    timed_out: bool,
) -> NestingStats {
    let total_pieces = (placed.len() + unplaced.len()) as u32;
    let placed_count = placed.len() as u32;
    let unplaced_count = unplaced.len() as u32;

    let used_area: f64 = placed.iter().map(PlacedPiece::area).sum();
    let sheet_area = sheet_width * sheet_height;
    let utilization = if sheet_area > 0.0 { used_area / sheet_area } else { 0.0 };
    let waste = 1.0 - utilization;

    let cutting_length_mm: f64 = placed.iter().map(PlacedPiece::perimeter).sum();
    let cutting_time_s = cutting_length_mm * DEFAULT_FEED_RATE_S_PER_MM;

    let material_efficiency = if total_pieces > 0 {
        utilization * (placed_count as f64 / total_pieces as f64)
    } else {
        0.0
    };

    NestingStats {
        total_pieces,
        placed_count,
        unplaced_count,
        utilization,
        waste,
        cutting_length_mm,
        cutting_time_s,
        material_efficiency,
        timeout: timed_out,
    }
}
