use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tourweave::{DistanceIndex, EngineConfig, RingDetector, Solver, TourResult};

fn solve(coords: &[(f64, f64)]) -> (DistanceIndex, TourResult) {
    let index = DistanceIndex::from_coords(coords).unwrap();
    let mut solver = Solver::new(index, EngineConfig::default());
    let result = solver.solve().unwrap();
    (solver.into_index(), result)
}

fn square(x: f64, y: f64) -> Vec<(f64, f64)> {
    vec![(x, y), (x, y + 1.0), (x + 1.0, y + 1.0), (x + 1.0, y)]
}

/// Every connection is recorded at both of its endpoints and no point exceeds two.
fn assert_consistent(index: &DistanceIndex, result: &TourResult) {
    let graph = &result.graph;
    for p in 0..index.len() {
        assert!(graph.degree(p) <= 2);
        for q in graph.neighbors(p) {
            assert!(graph.neighbors(q).contains(&p), "{p}-{q} is one-sided");
        }
    }
    let sum = graph.edges().iter().map(|&e| index.length(e)).sum::<f64>();
    assert!((sum - result.total_length).abs() < 1e-9);
}

#[test]
fn unit_square_is_solved_without_merging() {
    let (index, result) = solve(&square(0.0, 0.0));
    assert_consistent(&index, &result);
    assert!(result.complete);
    assert_eq!(result.total_length, 4.0);
    assert_eq!(result.rounds, 1);
    assert_eq!(result.rings.len(), 1);
    assert_eq!(result.graph.edges().len(), 4);
}

#[test]
fn regular_octagon_closes_on_its_perimeter() {
    let coords = (0..8)
        .map(|k| {
            let angle = k as f64 * std::f64::consts::FRAC_PI_4;
            (angle.cos(), angle.sin())
        })
        .collect::<Vec<_>>();
    let (index, result) = solve(&coords);
    assert_consistent(&index, &result);

    assert!(result.complete);
    assert_eq!(result.merges, 0);
    let side = index.distance(0, 1);
    assert!((result.total_length - 8.0 * side).abs() < 1e-9);
    for p in 0..8 {
        let mut neighbors = result.graph.neighbors(p).to_vec();
        neighbors.sort();
        let mut expected = vec![(p + 1) % 8, (p + 7) % 8];
        expected.sort();
        assert_eq!(neighbors, expected);
    }
}

#[test]
fn distant_clusters_are_merged_into_one_tour() {
    let mut coords = square(0.0, 0.0);
    coords.extend(square(1000.0, 1000.0));
    let (index, result) = solve(&coords);
    assert_consistent(&index, &result);

    assert!(result.complete);
    assert!(result.merges >= 1);
    assert!(result.rounds >= 2);
    assert_eq!(result.rings.len(), 1);

    let tour = result.tour().unwrap();
    assert_eq!(tour.iter().copied().collect::<BTreeSet<_>>().len(), 8);
    assert_eq!(result.unbalanced(), 0);
}

#[test]
fn random_instances_close_into_consistent_tours() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let count = rng.random_range(4..=8);
        let coords = (0..count)
            .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect::<Vec<_>>();
        let (index, result) = solve(&coords);
        assert_consistent(&index, &result);
        assert!(result.complete, "{coords:?}");

        let covered = result.rings.iter().map(|ring| ring.len()).sum::<usize>();
        assert_eq!(covered, count);

        let tour = result.tour().unwrap();
        assert_eq!(tour.len(), count);
        assert_eq!(tour.iter().copied().collect::<BTreeSet<_>>().len(), count);
        assert_eq!(result.graph.edges().len(), count);
    }
}

#[test]
fn redetecting_a_solved_graph_gives_the_same_rings() {
    let mut coords = square(0.0, 0.0);
    coords.extend(square(0.0, 50.0));
    coords.push((25.0, 25.0));
    let (mut index, result) = solve(&coords);

    let again = RingDetector.detect(&mut index, &result.graph).unwrap();
    assert_eq!(again.len(), result.rings.len());
    for (a, b) in again.iter().zip(&result.rings) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.edge_set(), b.edge_set());
        assert_eq!(a.level(), b.level());
    }
}

#[test]
fn invalid_configs_are_rejected() {
    let mut config = EngineConfig::default();
    config.max_rounds = 0;
    assert!(config.validate().is_err());

    config.max_rounds = 4;
    config.merge.joint_bias = f64::NAN;
    assert!(config.validate().is_err());
}
