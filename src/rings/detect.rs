use geo::{Area, Contains, Point as GeoPoint, Polygon};

use crate::error::{Result, TourError};
use crate::graph::ConnectionGraph;
use crate::index::{DistanceIndex, Edge};
use crate::rings::{Ring, RingKind};

/// Decomposes a connection graph into rings and computes their nesting.
#[derive(Clone, Copy, Debug, Default)]
pub struct RingDetector;

impl RingDetector {
    /// Partition the graph into rings, numbered in discovery order.
    ///
    /// Chains are walked first, starting from points with fewer than two
    /// connections in id order; the remaining points belong to cycles.
    /// Every point's ring tag is overwritten with its ring number.
    pub fn detect(&self, index: &mut DistanceIndex, graph: &ConnectionGraph) -> Result<Vec<Ring>> {
        index.clear_rings();

        let mut visited = vec![false; graph.len()];
        let mut rings = Vec::new();

        for start in 0..graph.len() {
            if !visited[start] && graph.degree(start) < 2 {
                rings.push(walk(graph, start, rings.len(), &mut visited)?);
            }
        }
        for start in 0..graph.len() {
            if !visited[start] {
                rings.push(walk(graph, start, rings.len(), &mut visited)?);
            }
        }

        if rings.len() > 1 && rings.iter().any(Ring::is_closed) {
            nest(index, &mut rings);
        }

        for ring in &rings {
            for &p in &ring.points { index.set_ring(p, ring.number) }
        }

        log::debug!("[rings] detected {} rings ({} closed)", rings.len(), rings.iter().filter(|r| r.is_closed()).count());
        Ok(rings)
    }
}

/// Follow the non-incoming edge from `start` until the walk returns or hits a loose end.
fn walk(graph: &ConnectionGraph, start: usize, number: usize, visited: &mut [bool]) -> Result<Ring> {
    let mut points = vec![start];
    let mut edges = Vec::new();
    let (mut previous, mut current) = (None, start);
    visited[start] = true;

    loop {
        let next = graph.neighbors(current).into_iter().find(|&q| Some(q) != previous);
        match next {
            Some(q) if q == start => {
                edges.push(Edge::new(current, q));
                return Ok(Ring::new(number, RingKind::Closed, points, edges));
            }
            Some(q) => {
                if visited[q] || edges.len() >= graph.len() {
                    return Err(TourError::DegenerateRing { point: q, reason: "walk revisited a point".into() });
                }
                edges.push(Edge::new(current, q));
                points.push(q);
                visited[q] = true;
                (previous, current) = (Some(current), q);
            }
            None if graph.degree(current) == 2 || (current != start && graph.degree(current) == 0) => {
                return Err(TourError::DegenerateRing { point: current, reason: "walk reached a dead end".into() });
            }
            None if graph.degree(start) == 2 => {
                return Err(TourError::DegenerateRing {
                    point: current,
                    reason: "closed walk reached a point with a missing connection".into(),
                });
            }
            None => {
                let endpoints = [start, current];
                return Ok(Ring::new(number, RingKind::Open { endpoints }, points, edges));
            }
        }
    }
}

/// Assign `enclosing` and `level` from polygon containment.
///
/// A ring's containers are the closed rings of strictly larger area whose
/// polygon contains the ring's first point; the smallest is its enclosing
/// ring. Strictly increasing areas keep the relation acyclic.
fn nest(index: &DistanceIndex, rings: &mut [Ring]) {
    let polygons = rings.iter()
        .map(|ring| ring.polygon(index).map(|polygon| {
            let area = polygon.unsigned_area();
            (polygon, area)
        }))
        .collect::<Vec<Option<(Polygon<f64>, f64)>>>();

    for i in 0..rings.len() {
        let (x, y) = index.point(rings[i].points[0]).coords();
        let probe = GeoPoint::new(x, y);
        let own_area = polygons[i].as_ref().map_or(0.0, |(_, area)| *area);

        rings[i].enclosing = polygons.iter().enumerate()
            .filter(|&(j, _)| j != i)
            .filter_map(|(j, entry)| entry.as_ref().map(|(polygon, area)| (j, polygon, *area)))
            .filter(|&(_, polygon, area)| area > own_area && polygon.contains(&probe))
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(j, _, _)| rings[j].number);
    }

    for i in 0..rings.len() {
        let mut level = 0;
        let mut cursor = rings[i].enclosing;
        while let Some(j) = cursor {
            level += 1;
            cursor = rings[j].enclosing;
        }
        rings[i].level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect_cycle(graph: &mut ConnectionGraph, cycle: &[usize]) {
        for (i, &p) in cycle.iter().enumerate() {
            graph.connect(Edge::new(p, cycle[(i + 1) % cycle.len()])).unwrap();
        }
    }

    #[test]
    fn one_sided_connections_are_degenerate() {
        let mut index = DistanceIndex::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]).unwrap();
        let mut graph = ConnectionGraph::new(3);
        graph.reserve(0, Edge::new(0, 1)).unwrap();

        let err = RingDetector.detect(&mut index, &graph).unwrap_err();
        assert!(matches!(err, TourError::DegenerateRing { point: 1, .. }), "{err:?}");
    }

    #[test]
    fn single_cycle_is_one_closed_ring() {
        let mut index = DistanceIndex::from_coords(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]).unwrap();
        let mut graph = ConnectionGraph::new(4);
        connect_cycle(&mut graph, &[0, 1, 2, 3]);

        let rings = RingDetector.detect(&mut index, &graph).unwrap();
        assert_eq!(rings.len(), 1);
        assert!(rings[0].is_closed());
        assert_eq!(rings[0].edges().len(), 4);
        assert_eq!(rings[0].level(), 0);
        assert!((0..4).all(|p| index.ring(p) == Some(0)));

        // Consecutive edges share an endpoint.
        for pair in rings[0].edges().windows(2) {
            assert!(pair[0].shared_point(&pair[1]).is_some());
        }
    }

    #[test]
    fn chains_and_isolated_points_are_open_rings() {
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (5.0, 5.0), (9.0, 9.0), (9.0, 8.0), (8.0, 9.0)];
        let mut index = DistanceIndex::from_coords(&coords).unwrap();
        let mut graph = ConnectionGraph::new(coords.len());
        graph.connect(Edge::new(0, 1)).unwrap();
        graph.connect(Edge::new(1, 2)).unwrap();
        connect_cycle(&mut graph, &[4, 5, 6]);

        let rings = RingDetector.detect(&mut index, &graph).unwrap();
        assert_eq!(rings.len(), 3);
        assert_eq!(rings[0].kind(), RingKind::Open { endpoints: [0, 2] });
        assert_eq!(rings[0].points(), &[0, 1, 2]);
        assert_eq!(rings[1].kind(), RingKind::Open { endpoints: [3, 3] });
        assert!(rings[1].edges().is_empty());
        assert!(rings[2].is_closed());
        assert_eq!(index.ring(3), Some(1));
    }

    #[test]
    fn nested_ring_gets_level_and_enclosing() {
        let mut coords = vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]; // outer
        coords.extend([(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0)]);            // inner
        coords.extend([(20.0, 0.0), (20.0, 1.0), (21.0, 0.0)]);                    // unrelated
        let mut index = DistanceIndex::from_coords(&coords).unwrap();
        let mut graph = ConnectionGraph::new(coords.len());
        connect_cycle(&mut graph, &[0, 1, 2, 3]);
        connect_cycle(&mut graph, &[4, 5, 6, 7]);
        connect_cycle(&mut graph, &[8, 9, 10]);

        let rings = RingDetector.detect(&mut index, &graph).unwrap();
        let (outer, inner, other) = (&rings[0], &rings[1], &rings[2]);
        assert_eq!(outer.level(), 0);
        assert_eq!(outer.enclosing(), None);
        assert_eq!(inner.level(), 1);
        assert_eq!(inner.enclosing(), Some(outer.number()));
        assert_eq!(other.enclosing(), None);

        assert!(outer.can_connect(inner));
        assert!(outer.can_connect(other));
        assert!(!other.can_connect(inner));
    }

    #[test]
    fn doubly_nested_levels_follow_the_chain() {
        let coords = [
            (0.0, 0.0), (0.0, 30.0), (30.0, 30.0), (30.0, 0.0),
            (5.0, 5.0), (5.0, 25.0), (25.0, 25.0), (25.0, 5.0),
            (14.0, 14.0), (14.0, 16.0), (16.0, 16.0), (16.0, 14.0),
        ];
        let mut index = DistanceIndex::from_coords(&coords).unwrap();
        let mut graph = ConnectionGraph::new(coords.len());
        connect_cycle(&mut graph, &[0, 1, 2, 3]);
        connect_cycle(&mut graph, &[4, 5, 6, 7]);
        connect_cycle(&mut graph, &[8, 9, 10, 11]);

        let rings = RingDetector.detect(&mut index, &graph).unwrap();
        assert_eq!(rings.iter().map(Ring::level).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(rings[2].enclosing(), Some(1));
        assert!(!rings[0].can_connect(&rings[2]));
    }

    #[test]
    fn detection_is_idempotent() {
        let coords = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (5.0, 5.0), (6.0, 5.0), (5.0, 6.0), (9.0, 0.0)];
        let mut index = DistanceIndex::from_coords(&coords).unwrap();
        let mut graph = ConnectionGraph::new(coords.len());
        connect_cycle(&mut graph, &[0, 1, 2]);
        connect_cycle(&mut graph, &[3, 4, 5]);

        let first = RingDetector.detect(&mut index, &graph).unwrap();
        let second = RingDetector.detect(&mut index, &graph).unwrap();
        let partition = |rings: &[Ring]| {
            let mut sets = rings.iter().map(|r| (r.points().to_vec(), r.edge_set())).collect::<Vec<_>>();
            sets.iter_mut().for_each(|(points, _)| points.sort());
            sets.sort();
            sets
        };
        assert_eq!(partition(&first), partition(&second));
    }
}
