use std::time::Instant;

use crate::models::nesting::{PlacedPiece, PlacementOptions, UnplacedPiece};

use super::geometry::{candidate_positions, fits, orientations, ExpandedPiece};

pub struct RunOutcome {
    pub placed: Vec<PlacedPiece>,
    pub unplaced: Vec<UnplacedPiece>,
    pub timed_out: bool,
}

/// Bottom-Left Fill. Pieces are sorted by
/// priority ascending then area descending; each piece is tried in both
/// orientations (if rotation is allowed), scanning candidate positions in
/// bottom-left order, and the lexicographically-smallest `(y, x)` across both
/// orientations wins.
pub fn run(
    mut pieces: Vec<ExpandedPiece>,
    sheet_width: f64,
    sheet_height: f64,
    options: &PlacementOptions,
    deadline: Instant,
) -> RunOutcome {
    pieces.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then((b.width * b.height).partial_cmp(&(a.width * a.height)).unwrap())
            .then(a.original_index.cmp(&b.original_index))
    });

    place_in_order(pieces, sheet_width, sheet_height, options, deadline)
}

/// The placement core of bottom-left fill, run over `pieces` in the order
/// given rather than re-sorting them. The genetic algorithm reuses
/// this directly: its fitness function is the utilisation this yields for a
/// candidate permutation.
pub fn place_in_order(
    pieces: Vec<ExpandedPiece>,
    sheet_width: f64,
    sheet_height: f64,
    options: &PlacementOptions,
    deadline: Instant,
) -> RunOutcome {
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

        let mut best: Option<(f64, f64, f64, f64, u32)> = None; // (y, x, w, h, rotation)

        for (w, h, rotation) in orientations(piece.width, piece.height, options.allow_rotation) {
            let (xs, ys) = candidate_positions(&placed, options.edge_margin, options.minimum_gap);
            'search: for &y in &ys {
                for &x in &xs {
                    if fits(x, y, w, h, &placed, options.minimum_gap, options.edge_margin, sheet_width, sheet_height) {
                        let candidate = (y, x, w, h, rotation);
                        let better = match &best {
                            None => true,
                            Some((by, bx, ..)) => (y, x) < (*by, *bx),
                        };
                        if better {
                            best = Some(candidate);
                        }
                        break 'search;
                    }
                }
            }
        }

        match best {
            Some((y, x, _w, _h, rotation)) => placed.push(PlacedPiece {
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
