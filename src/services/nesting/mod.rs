mod blf;
mod geometry;
mod genetic;
mod greedy;
mod stats;

use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::models::nesting::{Algorithm, Layout, NestingRequest, NestingResult};

use geometry::ExpandedPiece;

fn validate_request(request: &NestingRequest) -> Result<(), AppError> {
    if !request.sheet_width.is_finite() || !request.sheet_height.is_finite() {
        return Err(AppError::Validation("sheet dimensions must be finite numbers".into()));
    }
    if request.sheet_width <= 0.0 || request.sheet_height <= 0.0 {
        return Err(AppError::Validation("sheet dimensions must be positive".into()));
    }
    if request.options.minimum_gap < 0.0 || request.options.edge_margin < 0.0 {
        return Err(AppError::Validation("minimum_gap and edge_margin must not be negative".into()));
    }

    for piece in &request.pieces {
        if !piece.width.is_finite() || !piece.height.is_finite() {
            return Err(AppError::Validation("piece dimensions must be finite numbers".into()));
        }
        if piece.width <= 0.0 || piece.height <= 0.0 {
            return Err(AppError::Validation("piece dimensions must be positive".into()));
        }
        if piece.quantity == 0 {
            return Err(AppError::Validation("piece quantity must be at least 1".into()));
        }
    }

    Ok(())
}

fn expand_pieces(request: &NestingRequest) -> Vec<ExpandedPiece> {
    let mut expanded = Vec::new();
    for (index, piece) in request.pieces.iter().enumerate() {
        for _ in 0..piece.quantity {
            expanded.push(ExpandedPiece {
                original_index: index,
                design_id: piece.design_id,
                label: piece.label.clone(),
                width: piece.width,
                height: piece.height,
                priority: piece.priority,
            });
        }
    }
    expanded
}

/// Runs a nesting request to completion (or to its wall-clock ceiling) and
/// assembles the resulting `Layout`. `budget` bounds how long any
/// algorithm may run; the caller (the optimisation service, or a direct API
/// handler) derives it from the configured optimisation timeout.
pub fn solve(request: &NestingRequest, budget: Duration, seed: u64) -> Result<NestingResult, AppError> {
    validate_request(request)?;

    let started = Instant::now();
    let deadline = started + budget;
    let pieces = expand_pieces(request);

    let outcome = match request.algorithm {
        Algorithm::Blf => blf::run(pieces, request.sheet_width, request.sheet_height, &request.options, deadline),
        Algorithm::Greedy => greedy::run(
            pieces,
            request.sheet_width,
            request.sheet_height,
            &request.options,
            deadline,
        ),
        Algorithm::Genetic => genetic::run(
            pieces,
            request.sheet_width,
            request.sheet_height,
            &request.options,
            deadline,
            seed,
        ),
    };

    let stats = stats::compute(
        &outcome.placed,
        &outcome.unplaced,
        request.sheet_width,
        request.sheet_height,
        outcome.timed_out,
    );

    let layout = Layout {
        sheet_width: request.sheet_width,
        sheet_height: request.sheet_height,
        placed: outcome.placed,
        unplaced: outcome.unplaced,
        stats,
    };

    Ok(NestingResult {
        execution_ms: started.elapsed().as_millis() as u64,
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::nesting::{PieceRequest, PlacementOptions};

    fn request(sheet_width: f64, sheet_height: f64, pieces: Vec<PieceRequest>, algorithm: Algorithm) -> NestingRequest {
        NestingRequest {
            sheet_width,
            sheet_height,
            pieces,
            algorithm,
            options: PlacementOptions::default(),
        }
    }

    fn piece(width: f64, height: f64, quantity: u32) -> PieceRequest {
        PieceRequest {
            design_id: None,
            width,
            height,
            quantity,
            priority: 0,
            label: None,
        }
    }

    #[test]
    fn empty_request_succeeds_with_empty_layout() {
        let req = request(1000.0, 1000.0, vec![], Algorithm::Blf);
        let result = solve(&req, Duration::from_secs(5), 1).unwrap();
        assert!(result.layout.placed.is_empty());
        assert!(result.layout.unplaced.is_empty());
        assert_eq!(result.layout.stats.utilization, 0.0);
    }

    #[test]
    fn oversized_piece_is_unplaced_with_zero_utilization() {
        let req = request(100.0, 100.0, vec![piece(5000.0, 5000.0, 1)], Algorithm::Blf);
        let result = solve(&req, Duration::from_secs(5), 1).unwrap();
        assert!(result.layout.placed.is_empty());
        assert_eq!(result.layout.unplaced.len(), 1);
        assert_eq!(result.layout.unplaced[0].reason, "no-fit");
        assert_eq!(result.layout.stats.utilization, 0.0);
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        let req = request(1000.0, 1000.0, vec![piece(-10.0, 10.0, 1)], Algorithm::Blf);
        assert!(matches!(solve(&req, Duration::from_secs(5), 1), Err(AppError::Validation(_))));
    }

    #[test]
    fn blf_places_pieces_that_fit_side_by_side() {
        let req = request(
            500.0,
            500.0,
            vec![piece(100.0, 100.0, 4)],
            Algorithm::Blf,
        );
        let result = solve(&req, Duration::from_secs(5), 1).unwrap();
        assert_eq!(result.layout.placed.len(), 4);
        assert!(result.layout.unplaced.is_empty());
        assert!(result.layout.stats.utilization > 0.0);
    }

    #[test]
    fn greedy_and_blf_both_place_all_pieces_on_a_roomy_sheet() {
        let pieces = vec![piece(200.0, 150.0, 3), piece(100.0, 100.0, 2)];
        let blf_result = solve(
            &request(1200.0, 800.0, pieces.clone(), Algorithm::Blf),
            Duration::from_secs(5),
            1,
        )
        .unwrap();
        let greedy_result = solve(
            &request(1200.0, 800.0, pieces, Algorithm::Greedy),
            Duration::from_secs(5),
            1,
        )
        .unwrap();

        assert_eq!(blf_result.layout.unplaced.len(), 0);
        assert_eq!(greedy_result.layout.unplaced.len(), 0);
    }

    #[test]
    fn genetic_is_deterministic_for_a_fixed_seed() {
        let pieces = vec![piece(150.0, 100.0, 5), piece(80.0, 80.0, 3)];
        let req = request(900.0, 600.0, pieces, Algorithm::Genetic);
        let first = solve(&req, Duration::from_secs(5), 42).unwrap();
        let second = solve(&req, Duration::from_secs(5), 42).unwrap();
        assert_eq!(first.layout.stats.placed_count, second.layout.stats.placed_count);
        assert_eq!(first.layout.stats.utilization, second.layout.stats.utilization);
    }

    #[test]
    fn placed_pieces_never_overlap() {
        let req = request(
            500.0,
            500.0,
            vec![piece(90.0, 60.0, 6), piece(40.0, 40.0, 4)],
            Algorithm::Blf,
        );
        let result = solve(&req, Duration::from_secs(5), 1).unwrap();

        for (i, a) in result.layout.placed.iter().enumerate() {
            for b in result.layout.placed.iter().skip(i + 1) {
                let (aw, ah) = a.footprint();
                let (bw, bh) = b.footprint();
                let x_overlap = a.x < b.x + bw && b.x < a.x + aw;
                let y_overlap = a.y < b.y + bh && b.y < a.y + ah;
                assert!(!(x_overlap && y_overlap), "placed pieces overlap");
            }
        }
    }
}
