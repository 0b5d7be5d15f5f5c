use std::time::Instant;

use crate::models::nesting::{PlacedPiece, PlacementOptions, UnplacedPiece};

use super::blf::RunOutcome;
use super::geometry::{candidate_positions, fits, orientations, ExpandedPiece};

/// Greedy row-major first-fit: pieces sorted by area descending
/// only, each placed at the first candidate position that fits rather than
/// the best one. Faster and lower-utilisation than bottom-left fill.
pub fn run(
    mut pieces: Vec<ExpandedPiece>,
    sheet_width: f64,
    sheet_height: f64,
    options: &PlacementOptions,
    deadline: Instant,
) -> RunOutcome {
    pieces.sort_by(|a, b| {
        (b.width * b.height)
            .partial_cmp(&(a.width * a.height))
            .unwrap()
            .then(a.original_index.cmp(&b.original_index))
    });

    let mut placed = Vec::new();
    let mut unplaced = Vec::new();
    let mut timed_out = false;

    for piece in pieces {
        if Instant::now() >= deadline {
            timed_out = true;
            unplaced.push(UnplacedPiece {
                label: piece.label,
                width: piece.width,
                height: piece.height,
                reason: "timeout".into(),
            });
            continue;
        }

        let mut placement: Option<(f64, f64, u32)> = None;

        'orientations: for (w, h, rotation) in orientations(piece.width, piece.height, options.allow_rotation) {
            let (xs, ys) = candidate_positions(&placed, options.edge_margin, options.minimum_gap);
            for &y in &ys {
                for &x in &xs {
                    if fits(x, y, w, h, &placed, options.minimum_gap, options.edge_margin, sheet_width, sheet_height) {
                        placement = Some((x, y, rotation));
                        break 'orientations;
                    }
                }
            }
        }

        match placement {
            Some((x, y, rotation)) => placed.push(PlacedPiece {
                id: format!("piece-{}", piece.original_index),
                design_id: piece.design_id,
                label: piece.label,
                x,
                y,
                width: piece.width,
                height: piece.height,
                rotation,
                flipped: false,
            }),
            None => unplaced.push(UnplacedPiece {
                label: piece.label,
                width: piece.width,
                height: piece.height,
                reason: "no-fit".into(),
            }),
        }
    }

    RunOutcome {
        placed,
        unplaced,
        timed_out,
    }
}
