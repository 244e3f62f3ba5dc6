use crate::error::{Result, TourError};
use crate::index::{Edge, Point};

/// Relative tolerance used when checking a supplied matrix for symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Precomputed pairwise distances over a fixed point set.
///
/// Distances live in a packed lower-triangular table indexed by [`Edge`];
/// every point additionally keeps its neighbors sorted by ascending distance
/// (ties broken by neighbor id). Besides the immutable distances the index
/// owns the per-run mutable state the engine works with: the per-edge
/// usability mask and each point's elevation and ring tag.
#[derive(Clone, Debug)]
pub struct DistanceIndex {
    points: Vec<Point>,
    lengths: Vec<f64>,      // lengths[slot(edge)] = actual length of edge
    usable: Vec<bool>,      // usable[slot(edge)] = edge may be selected
    sorted: Vec<Vec<u32>>,  // sorted[i] = neighbors of i by ascending distance
    min_two: Vec<[f64; 2]>, // min_two[i] = two smallest distances from i
}

/// Position of an edge in the packed triangular tables.
#[inline]
fn slot(edge: Edge) -> usize {
    let (a, b) = (edge.a(), edge.b());
    b * (b - 1) / 2 + a
}

fn validate_coords(coords: &[(f64, f64)]) -> Result<()> {
    if let Some(i) = coords.iter().position(|&(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(TourError::InvalidInput(format!("point {i} has non-finite coordinates")));
    }
    Ok(())
}

impl DistanceIndex {
    /// Build the index from planar coordinates using Euclidean distance.
    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        validate_coords(coords)?;

        let n = coords.len();
        let mut lengths = vec![0.0; n * n.saturating_sub(1) / 2];
        for b in 1..n {
            for a in 0..b {
                let (dx, dy) = (coords[a].0 - coords[b].0, coords[a].1 - coords[b].1);
                lengths[slot(Edge::new(a, b))] = dx.hypot(dy);
            }
        }

        Ok(Self::from_lengths(coords, lengths))
    }

    /// Build the index from coordinates and a precomputed symmetric distance matrix.
    ///
    /// Coordinates are still required: ring nesting is a planar test.
    pub fn from_matrix(coords: &[(f64, f64)], matrix: &[Vec<f64>]) -> Result<Self> {
        validate_coords(coords)?;

        let n = coords.len();
        if matrix.len() != n {
            return Err(TourError::InvalidInput(format!("matrix has {} rows, expected {n}", matrix.len())));
        }
        if let Some(i) = matrix.iter().position(|row| row.len() != n) {
            return Err(TourError::InvalidInput(format!("matrix row {i} has {} columns, expected {n}", matrix[i].len())));
        }

        let mut lengths = vec![0.0; n * n.saturating_sub(1) / 2];
        for b in 1..n {
            for a in 0..b {
                let (d_ab, d_ba) = (matrix[a][b], matrix[b][a]);
                if !d_ab.is_finite() || d_ab < 0.0 {
                    return Err(TourError::InvalidInput(format!("distance {a}-{b} is {d_ab}")));
                }
                if (d_ab - d_ba).abs() > SYMMETRY_TOLERANCE * d_ab.max(d_ba).max(1.0) {
                    return Err(TourError::InvalidInput(format!("matrix is not symmetric at {a}-{b}: {d_ab} vs {d_ba}")));
                }
                lengths[slot(Edge::new(a, b))] = d_ab;
            }
        }

        Ok(Self::from_lengths(coords, lengths))
    }

    /// Rebuild the index from already-sorted neighbor rows (as read back from the cache).
    pub(crate) fn from_sorted_rows(coords: &[(f64, f64)], rows: Vec<Vec<u32>>, dists: Vec<Vec<f64>>) -> Result<Self> {
        validate_coords(coords)?;

        let n = coords.len();
        if rows.len() != n || dists.len() != n {
            return Err(TourError::InvalidInput(format!("expected {n} neighbor rows, got {} / {}", rows.len(), dists.len())));
        }

        let mut lengths = vec![f64::NAN; n * n.saturating_sub(1) / 2];
        for (i, (row, row_dists)) in rows.iter().zip(&dists).enumerate() {
            if row.len() != n - 1 || row_dists.len() != n - 1 {
                return Err(TourError::InvalidInput(format!("row {i} has {} neighbors, expected {}", row.len(), n - 1)));
            }
            for (&j, &d) in row.iter().zip(row_dists) {
                let j = j as usize;
                if j >= n || j == i || !d.is_finite() || d < 0.0 {
                    return Err(TourError::InvalidInput(format!("row {i} has invalid entry {j} -> {d}")));
                }
                let stored = &mut lengths[slot(Edge::new(i, j))];
                if !stored.is_nan() && *stored != d {
                    return Err(TourError::InvalidInput(format!("distance {i}-{j} is {d}, but {} from the other side", *stored)));
                }
                *stored = d;
            }
            let ordered = row.windows(2).zip(row_dists.windows(2))
                .all(|(j, d)| d[0].total_cmp(&d[1]).then(j[0].cmp(&j[1])).is_lt());
            if !ordered {
                return Err(TourError::InvalidInput(format!("row {i} is not sorted by distance")));
            }
        }
        if lengths.iter().any(|d| d.is_nan()) {
            return Err(TourError::InvalidInput("neighbor rows do not cover every pair".into()));
        }

        let min_two = rows.iter().zip(&dists)
            .map(|(_, d)| [d.first().copied().unwrap_or(f64::INFINITY), d.get(1).copied().unwrap_or(f64::INFINITY)])
            .collect();

        Ok(Self {
            points: coords.iter().enumerate().map(|(i, &(x, y))| Point::new(i, x, y)).collect(),
            usable: vec![true; lengths.len()],
            lengths,
            sorted: rows,
            min_two,
        })
    }

    /// Sort every point's neighbors and derive the two minimal distances.
    fn from_lengths(coords: &[(f64, f64)], lengths: Vec<f64>) -> Self {
        let n = coords.len();
        let sorted = (0..n).map(|i| {
            let mut row = (0..n as u32).filter(|&j| j as usize != i).collect::<Vec<_>>();
            row.sort_by(|&j, &k| {
                lengths[slot(Edge::new(i, j as usize))]
                    .total_cmp(&lengths[slot(Edge::new(i, k as usize))])
                    .then(j.cmp(&k))
            });
            row
        }).collect::<Vec<_>>();

        let min_two = sorted.iter().enumerate().map(|(i, row)| {
            let nth = |k: usize| row.get(k)
                .map_or(f64::INFINITY, |&j| lengths[slot(Edge::new(i, j as usize))]);
            [nth(0), nth(1)]
        }).collect();

        Self {
            points: coords.iter().enumerate().map(|(i, &(x, y))| Point::new(i, x, y)).collect(),
            usable: vec![true; lengths.len()],
            lengths,
            sorted,
            min_two,
        }
    }

    /// Get the number of points.
    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    #[inline] pub fn points(&self) -> &[Point] { &self.points }

    #[inline] pub fn point(&self, i: usize) -> &Point { &self.points[i] }

    /// Get the edge joining `i` and `j`.
    pub fn edge(&self, i: usize, j: usize) -> Result<Edge> {
        if i == j || i >= self.len() || j >= self.len() {
            return Err(TourError::NotFound { a: i, b: j });
        }
        Ok(Edge::new(i, j))
    }

    /// Get the actual (immutable) length of an edge.
    #[inline] pub fn length(&self, edge: Edge) -> f64 { self.lengths[slot(edge)] }

    /// Get the distance between two points (zero for `i == j`).
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        if i == j { 0.0 } else { self.length(Edge::new(i, j)) }
    }

    /// Iterate over the edges at `i` in ascending order of length.
    ///
    /// The iterator is finite and can be restarted by calling this again.
    pub fn sorted_neighbors(&self, i: usize) -> impl Iterator<Item = Edge> + '_ {
        self.sorted[i].iter().map(move |&j| Edge::new(i, j as usize))
    }

    /// The raw sorted neighbor ids of `i`.
    #[inline] pub(crate) fn sorted_row(&self, i: usize) -> &[u32] { &self.sorted[i] }

    /// The two smallest distances from `i` (`INFINITY` when fewer neighbors exist).
    #[inline] pub fn min_two_distances(&self, i: usize) -> [f64; 2] { self.min_two[i] }

    /// Toggle the working usability flag of the edge between `i` and `j`.
    pub fn set_usable(&mut self, i: usize, j: usize, usable: bool) -> Result<()> {
        let edge = self.edge(i, j)?;
        self.usable[slot(edge)] = usable;
        Ok(())
    }

    #[inline] pub fn is_usable(&self, edge: Edge) -> bool { self.usable[slot(edge)] }

    /// Mark every edge usable again.
    pub fn reset_usable(&mut self) { self.usable.fill(true) }

    #[inline] pub fn elevation(&self, i: usize) -> f64 { self.points[i].elevation }

    /// Add `amount` to the elevation of point `i`.
    #[inline] pub fn raise_elevation(&mut self, i: usize, amount: f64) { self.points[i].elevation += amount }

    /// Reset every point's elevation to zero.
    pub fn reset_elevations(&mut self) { self.points.iter_mut().for_each(|p| p.elevation = 0.0) }

    #[inline] pub fn ring(&self, i: usize) -> Option<usize> { self.points[i].ring }

    #[inline] pub fn set_ring(&mut self, i: usize, ring: usize) { self.points[i].ring = Some(ring) }

    /// Drop every point's ring tag.
    pub fn clear_rings(&mut self) { self.points.iter_mut().for_each(|p| p.ring = None) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> DistanceIndex {
        DistanceIndex::from_coords(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]).unwrap()
    }

    #[test]
    fn lengths_are_euclidean_and_symmetric() {
        let index = unit_square();
        assert_eq!(index.len(), 4);
        assert_eq!(index.length(Edge::new(0, 1)), 1.0);
        assert_eq!(index.distance(1, 0), 1.0);
        assert!((index.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(index.distance(2, 2), 0.0);
    }

    #[test]
    fn sorted_neighbors_break_ties_by_id() {
        let index = unit_square();
        let order = index.sorted_neighbors(0).map(|e| e.other(0).unwrap()).collect::<Vec<_>>();
        assert_eq!(order, vec![1, 3, 2]);

        // Restartable: a second call yields the same sequence.
        let again = index.sorted_neighbors(0).map(|e| e.other(0).unwrap()).collect::<Vec<_>>();
        assert_eq!(order, again);
    }

    #[test]
    fn min_two_distances_are_the_two_smallest() {
        let index = DistanceIndex::from_coords(&[(0.0, 0.0), (3.0, 0.0), (0.0, 1.0), (10.0, 0.0)]).unwrap();
        assert_eq!(index.min_two_distances(0), [1.0, 3.0]);
        assert_eq!(index.min_two_distances(3), [7.0, 10.0]);
    }

    #[test]
    fn min_two_distances_pad_with_infinity() {
        let index = DistanceIndex::from_coords(&[(0.0, 0.0), (2.0, 0.0)]).unwrap();
        assert_eq!(index.min_two_distances(0), [2.0, f64::INFINITY]);
    }

    #[test]
    fn edge_lookup_rejects_self_loops() {
        let index = unit_square();
        assert_eq!(index.edge(2, 1).unwrap(), Edge::new(1, 2));
        assert!(matches!(index.edge(1, 1), Err(TourError::NotFound { a: 1, b: 1 })));
        assert!(matches!(index.edge(0, 9), Err(TourError::NotFound { .. })));
    }

    #[test]
    fn usability_mask_toggles_and_resets() {
        let mut index = unit_square();
        index.set_usable(3, 0, false).unwrap();
        assert!(!index.is_usable(Edge::new(0, 3)));
        assert!(index.is_usable(Edge::new(0, 1)));

        index.reset_usable();
        assert!(index.is_usable(Edge::new(0, 3)));
    }

    #[test]
    fn matrix_input_is_validated() {
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let good = vec![vec![0.0, 5.0, 7.0], vec![5.0, 0.0, 1.0], vec![7.0, 1.0, 0.0]];
        let index = DistanceIndex::from_matrix(&coords, &good).unwrap();
        assert_eq!(index.distance(0, 1), 5.0);
        assert_eq!(index.sorted_neighbors(1).map(|e| e.other(1).unwrap()).collect::<Vec<_>>(), vec![2, 0]);

        let asymmetric = vec![vec![0.0, 5.0, 7.0], vec![4.0, 0.0, 1.0], vec![7.0, 1.0, 0.0]];
        assert!(matches!(DistanceIndex::from_matrix(&coords, &asymmetric), Err(TourError::InvalidInput(_))));

        let short = vec![vec![0.0, 5.0], vec![5.0, 0.0]];
        assert!(matches!(DistanceIndex::from_matrix(&coords, &short), Err(TourError::InvalidInput(_))));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert!(matches!(
            DistanceIndex::from_coords(&[(0.0, 0.0), (f64::NAN, 1.0)]),
            Err(TourError::InvalidInput(_))
        ));
    }

    #[test]
    fn sorted_rows_round_trip_through_rebuild() {
        let index = unit_square();
        let rows = (0..index.len()).map(|i| index.sorted_row(i).to_vec()).collect::<Vec<_>>();
        let dists = (0..index.len())
            .map(|i| index.sorted_row(i).iter().map(|&j| index.distance(i, j as usize)).collect())
            .collect::<Vec<Vec<f64>>>();
        let coords = index.points().iter().map(|p| p.coords()).collect::<Vec<_>>();

        let rebuilt = DistanceIndex::from_sorted_rows(&coords, rows, dists).unwrap();
        for i in 0..4 {
            assert_eq!(rebuilt.min_two_distances(i), index.min_two_distances(i));
            assert_eq!(rebuilt.sorted_row(i), index.sorted_row(i));
        }
    }

    #[test]
    fn tampered_rows_are_rejected() {
        let index = unit_square();
        let coords = index.points().iter().map(|p| p.coords()).collect::<Vec<_>>();
        let rows = (0..4).map(|i| index.sorted_row(i).to_vec()).collect::<Vec<_>>();
        let dists = (0..4)
            .map(|i| index.sorted_row(i).iter().map(|&j| index.distance(i, j as usize)).collect())
            .collect::<Vec<Vec<f64>>>();

        let mut reordered = (rows.clone(), dists.clone());
        reordered.0[0].reverse();
        reordered.1[0].reverse();
        assert!(DistanceIndex::from_sorted_rows(&coords, reordered.0, reordered.1).is_err());

        let mut asymmetric = dists.clone();
        asymmetric[0][2] = 1.5;
        assert!(matches!(
            DistanceIndex::from_sorted_rows(&coords, rows, asymmetric),
            Err(TourError::InvalidInput(_)),
        ));
    }

    #[test]
    fn point_state_is_mutable() {
        let mut index = unit_square();
        index.raise_elevation(2, 1.5);
        index.set_ring(2, 4);
        assert_eq!(index.elevation(2), 1.5);
        assert_eq!(index.ring(2), Some(4));

        index.reset_elevations();
        index.clear_rings();
        assert_eq!(index.elevation(2), 0.0);
        assert_eq!(index.point(2).ring(), None);
    }
}
