use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::nesting::PlacementOptions;

use super::blf::{place_in_order, RunOutcome};
use super::geometry::ExpandedPiece;

const POPULATION_SIZE: usize = 50;
const MUTATION_RATE: f64 = 0.1;
const TOURNAMENT_SIZE: usize = 3;
const ELITE_COUNT: usize = 2;
const GENERATIONS: usize = 100;

fn utilization_of(outcome: &RunOutcome, sheet_width: f64, sheet_height: f64) -> f64 {
    let used: f64 = outcome.placed.iter().map(|p| p.area()).sum();
    used / (sheet_width * sheet_height)
}

fn order_crossover(parent_a: &[usize], parent_b: &[usize], rng: &mut StdRng) -> Vec<usize> {
    let len = parent_a.len();
    if len < 2 {
        return parent_a.to_vec();
    }
    let mut start = rng.gen_range(0..len);
    let mut end = rng.gen_range(0..len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    let mut child: Vec<Option<usize>> = vec![None; len];
    child[start..=end].copy_from_slice(&parent_a[start..=end].iter().map(|&v| Some(v)).collect::<Vec<_>>());

    let taken: std::collections::HashSet<usize> = parent_a[start..=end].iter().copied().collect();
    let mut fill = parent_b.iter().filter(|v| !taken.contains(v));
    for slot in child.iter_mut() {
        if slot.is_none() {
            *slot = fill.next().copied();
        }
    }

    child.into_iter().map(|v| v.expect("order crossover fills every slot")).collect()
}

fn tournament_select<'a>(population: &'a [(Vec<usize>, f64)], rng: &mut StdRng) -> &'a Vec<usize> {
    let mut best: Option<&(Vec<usize>, f64)> = None;
    for _ in 0..TOURNAMENT_SIZE {
        let candidate = &population[rng.gen_range(0..population.len())];
        best = match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        };
    }
    &best.expect("tournament size is always > 0").0
}

/// Evolves permutations of the piece order, scoring each by the utilisation
/// bottom-left fill achieves for that ordering. Seedable for
/// deterministic tests; stops at `GENERATIONS` or the shared wall-clock
/// deadline, whichever comes first.
pub fn run(
    pieces: Vec<ExpandedPiece>,
    sheet_width: f64,
    sheet_height: f64,
    options: &PlacementOptions,
    deadline: Instant,
    seed: u64,
) -> RunOutcome {
    if pieces.len() < 2 {
        return place_in_order(pieces, sheet_width, sheet_height, options, deadline);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let n = pieces.len();
    let base_order: Vec<usize> = (0..n).collect();

    let evaluate = |order: &[usize], rng_deadline: Instant| -> (RunOutcome, f64) {
        let ordered: Vec<ExpandedPiece> = order.iter().map(|&i| pieces[i].clone()).collect();
        let outcome = place_in_order(ordered, sheet_width, sheet_height, options, rng_deadline);
        let fitness = utilization_of(&outcome, sheet_width, sheet_height);
        (outcome, fitness)
    };

    let mut population: Vec<Vec<usize>> = Vec::with_capacity(POPULATION_SIZE);
    population.push(base_order.clone());
    for _ in 1..POPULATION_SIZE {
        let mut order = base_order.clone();
        order.shuffle(&mut rng);
        population.push(order);
    }

    // The base order is always scored once regardless of the deadline, so a
    // budget that is already exhausted by the time the search starts still
    // yields a best-so-far result instead of panicking on an empty population.
    let (first_outcome, first_fitness) = evaluate(&population[0], deadline);
    let mut best_outcome: Option<(RunOutcome, f64)> = Some((first_outcome, first_fitness));
    let mut scored: Vec<(Vec<usize>, f64)> = vec![(population[0].clone(), first_fitness)];

    for order in &population[1..] {
        if Instant::now() >= deadline {
            break;
        }
        let (outcome, fitness) = evaluate(order, deadline);
        if fitness > best_outcome.as_ref().map(|(_, f)| *f).unwrap_or(f64::MIN) {
            best_outcome = Some((outcome, fitness));
        }
        scored.push((order.clone(), fitness));
    }

    let mut generation = 0;
    while generation < GENERATIONS && Instant::now() < deadline && !scored.is_empty() {
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        let mut next_generation: Vec<Vec<usize>> = scored.iter().take(ELITE_COUNT).map(|(o, _)| o.clone()).collect();

        while next_generation.len() < POPULATION_SIZE {
            let parent_a = tournament_select(&scored, &mut rng);
            let parent_b = tournament_select(&scored, &mut rng);
            let mut child = order_crossover(parent_a, parent_b, &mut rng);

            if rng.gen_bool(MUTATION_RATE) && child.len() >= 2 {
                let i = rng.gen_range(0..child.len());
                let j = rng.gen_range(0..child.len());
                child.swap(i, j);
            }

            next_generation.push(child);
        }

        let mut next_scored = Vec::with_capacity(POPULATION_SIZE);
        for order in &next_generation {
            if Instant::now() >= deadline {
                break;
            }
            let (outcome, fitness) = evaluate(order, deadline);
            if best_outcome.as_ref().map(|(_, f)| fitness > *f).unwrap_or(true) {
                best_outcome = Some((outcome, fitness));
            }
            next_scored.push((order.clone(), fitness));
        }

        if next_scored.is_empty() {
            break;
        }
        scored = next_scored;
        generation += 1;
    }

    let (mut outcome, _) = best_outcome.expect("population is non-empty so at least one candidate was scored");
    outcome.timed_out = Instant::now() >= deadline;
    outcome
}
