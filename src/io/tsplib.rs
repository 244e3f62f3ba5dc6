//! TSPLIB instance reading and writing.

use std::{fs::File, io::{BufWriter, Write}, path::Path, sync::LazyLock};

use anyhow::{Context, Result, bail, ensure};
use rand::{Rng, SeedableRng, rngs::StdRng};
use regex::Regex;

use crate::index::DistanceIndex;

/// `KEYWORD : value` or a bare section keyword.
static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Z0-9_]*)\s*(?::\s*(.*?))?\s*$").expect("keyword pattern is valid")
});

/// How distances between nodes are defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightType {
    /// Euclidean distance between node coordinates.
    Euc2d,
    /// Euclidean distance rounded up to the next integer.
    Ceil2d,
    /// A full distance matrix given in `EDGE_WEIGHT_SECTION`.
    Explicit,
}

impl WeightType {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "EUC_2D" => Ok(Self::Euc2d),
            "CEIL_2D" => Ok(Self::Ceil2d),
            "EXPLICIT" => Ok(Self::Explicit),
            other => bail!("[io::tsplib] unsupported EDGE_WEIGHT_TYPE {other}"),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Euc2d => "EUC_2D",
            Self::Ceil2d => "CEIL_2D",
            Self::Explicit => "EXPLICIT",
        }
    }
}

/// A symmetric TSP instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub name: String,
    pub comment: Option<String>,
    pub weight_type: WeightType,
    /// Node coordinates in file order; node `i` in the file is point `i - 1`.
    pub points: Vec<(f64, f64)>,
    /// Explicit distances, present for `EXPLICIT` instances.
    pub matrix: Option<Vec<Vec<f64>>>,
}

impl Instance {
    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Build the distance index the instance describes.
    pub fn build_index(&self) -> Result<DistanceIndex> {
        let index = match (self.weight_type, &self.matrix) {
            (WeightType::Euc2d, _) => DistanceIndex::from_coords(&self.points),
            (WeightType::Ceil2d, _) => {
                let matrix = self.points.iter()
                    .map(|&(x1, y1)| self.points.iter().map(|&(x2, y2)| (x1 - x2).hypot(y1 - y2).ceil()).collect())
                    .collect::<Vec<Vec<f64>>>();
                DistanceIndex::from_matrix(&self.points, &matrix)
            }
            (WeightType::Explicit, Some(matrix)) => DistanceIndex::from_matrix(&self.points, matrix),
            (WeightType::Explicit, None) => bail!("[io::tsplib] {}: EXPLICIT instance without a matrix", self.name),
        };
        index.with_context(|| format!("[io::tsplib] {}: invalid distances", self.name))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section { Header, Coords, Display, Weights }

/// Read a TSPLIB instance from a file.
pub fn read_tsplib(path: &Path) -> Result<Instance> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("[io::tsplib] failed to read {}", path.display()))?;
    parse_tsplib(&text)
        .with_context(|| format!("[io::tsplib] failed to parse {}", path.display()))
}

/// Parse a TSPLIB instance.
///
/// Supports `TSP` instances with `EUC_2D`, `CEIL_2D` or `EXPLICIT`
/// (`FULL_MATRIX`) weights. Explicit instances take coordinates from
/// `DISPLAY_DATA_SECTION` when present and are otherwise laid out on a line.
pub fn parse_tsplib(text: &str) -> Result<Instance> {
    let mut name = String::new();
    let mut comment = None;
    let mut dimension = None;
    let mut weight_type = None;
    let mut weight_format = None;
    let mut coords: Vec<Option<(f64, f64)>> = Vec::new();
    let mut weights: Vec<f64> = Vec::new();
    let mut section = Section::Header;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() { continue }

        if let Some(caps) = KEYWORD.captures(line) {
            let value = caps.get(2).map_or("", |m| m.as_str());
            section = Section::Header;
            match &caps[1] {
                "NAME" => name = value.to_string(),
                "COMMENT" => comment = Some(value.to_string()),
                "TYPE" => ensure!(value == "TSP", "[io::tsplib] unsupported TYPE {value}"),
                "DIMENSION" => {
                    let n = value.parse::<usize>()
                        .with_context(|| format!("[io::tsplib] line {}: invalid DIMENSION {value}", line_no + 1))?;
                    coords = vec![None; n];
                    dimension = Some(n);
                }
                "EDGE_WEIGHT_TYPE" => weight_type = Some(WeightType::parse(value)?),
                "EDGE_WEIGHT_FORMAT" => weight_format = Some(value.to_string()),
                "DISPLAY_DATA_TYPE" | "NODE_COORD_TYPE" => {}
                "NODE_COORD_SECTION" => section = Section::Coords,
                "DISPLAY_DATA_SECTION" => section = Section::Display,
                "EDGE_WEIGHT_SECTION" => section = Section::Weights,
                "EOF" => break,
                other => log::debug!("[io::tsplib] ignoring keyword {other}"),
            }
            if matches!(section, Section::Coords | Section::Display | Section::Weights) {
                ensure!(dimension.is_some(), "[io::tsplib] line {}: section before DIMENSION", line_no + 1);
            }
            continue;
        }

        match section {
            Section::Header => bail!("[io::tsplib] line {}: unexpected data {line:?}", line_no + 1),
            Section::Coords | Section::Display => {
                let fields = line.split_whitespace().collect::<Vec<_>>();
                ensure!(fields.len() == 3, "[io::tsplib] line {}: expected `id x y`", line_no + 1);
                let id = fields[0].parse::<usize>()
                    .with_context(|| format!("[io::tsplib] line {}: invalid node id", line_no + 1))?;
                let x = fields[1].parse::<f64>()
                    .with_context(|| format!("[io::tsplib] line {}: invalid x", line_no + 1))?;
                let y = fields[2].parse::<f64>()
                    .with_context(|| format!("[io::tsplib] line {}: invalid y", line_no + 1))?;
                ensure!(id >= 1 && id <= coords.len(), "[io::tsplib] line {}: node id {id} out of range", line_no + 1);
                coords[id - 1] = Some((x, y));
            }
            Section::Weights => {
                for token in line.split_whitespace() {
                    weights.push(token.parse::<f64>()
                        .with_context(|| format!("[io::tsplib] line {}: invalid weight {token}", line_no + 1))?);
                }
            }
        }
    }

    let n = dimension.context("[io::tsplib] missing DIMENSION")?;
    let weight_type = weight_type.unwrap_or(WeightType::Euc2d);

    let matrix = match weight_type {
        WeightType::Explicit => {
            let format = weight_format.as_deref().unwrap_or("FULL_MATRIX");
            ensure!(format == "FULL_MATRIX", "[io::tsplib] unsupported EDGE_WEIGHT_FORMAT {format}");
            ensure!(weights.len() == n * n, "[io::tsplib] expected {} weights, found {}", n * n, weights.len());
            Some(weights.chunks(n.max(1)).map(<[f64]>::to_vec).collect::<Vec<_>>())
        }
        _ => None,
    };

    let points = if coords.iter().all(Option::is_some) {
        coords.into_iter().flatten().collect()
    } else if matrix.is_some() && coords.iter().all(Option::is_none) {
        log::warn!("[io::tsplib] {name}: no display coordinates, nesting is disabled");
        (0..n).map(|i| (i as f64, 0.0)).collect()
    } else {
        let missing = coords.iter().filter(|c| c.is_none()).count();
        bail!("[io::tsplib] {missing} of {n} nodes have no coordinates");
    };

    Ok(Instance { name, comment, weight_type, points, matrix })
}

/// Write an instance in TSPLIB format.
fn write_instance<W: Write>(writer: &mut W, instance: &Instance) -> Result<()> {
    writeln!(writer, "NAME : {}", instance.name)?;
    if let Some(comment) = &instance.comment {
        writeln!(writer, "COMMENT : {comment}")?;
    }
    writeln!(writer, "TYPE : TSP")?;
    writeln!(writer, "DIMENSION : {}", instance.len())?;
    writeln!(writer, "EDGE_WEIGHT_TYPE : {}", instance.weight_type.as_str())?;

    if let Some(matrix) = &instance.matrix {
        writeln!(writer, "EDGE_WEIGHT_FORMAT : FULL_MATRIX")?;
        writeln!(writer, "EDGE_WEIGHT_SECTION")?;
        for row in matrix {
            let row = row.iter().map(f64::to_string).collect::<Vec<_>>();
            writeln!(writer, "{}", row.join(" "))?;
        }
        writeln!(writer, "DISPLAY_DATA_SECTION")?;
    } else {
        writeln!(writer, "NODE_COORD_SECTION")?;
    }
    for (i, (x, y)) in instance.points.iter().enumerate() {
        writeln!(writer, "{} {x} {y}", i + 1)?;
    }
    writeln!(writer, "EOF")?;
    Ok(())
}

/// Render an instance in TSPLIB format.
pub fn write_tsplib_string(instance: &Instance) -> Result<String> {
    let mut buffer = Vec::new();
    write_instance(&mut buffer, instance)?;
    String::from_utf8(buffer)
        .context("[io::tsplib] instance text is not valid UTF-8")
}

/// Write an instance to a TSPLIB file.
pub fn write_tsplib(instance: &Instance, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::tsplib] failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_instance(&mut writer, instance)
        .with_context(|| format!("[io::tsplib] failed to write {}", path.display()))?;
    writer.flush()
        .with_context(|| format!("[io::tsplib] failed to write {}", path.display()))
}

/// Generate `count` uniformly random points in `[0, extent)²`.
pub fn random_instance(count: usize, seed: u64, extent: f64) -> Instance {
    let mut rng = StdRng::seed_from_u64(seed);
    let points = (0..count)
        .map(|_| (rng.random_range(0.0..extent), rng.random_range(0.0..extent)))
        .collect();

    Instance {
        name: format!("random{count}"),
        comment: Some(format!("{count} uniform random points, seed {seed}")),
        weight_type: WeightType::Euc2d,
        points,
        matrix: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
NAME : square4
COMMENT : unit square
TYPE : TSP
DIMENSION : 4
EDGE_WEIGHT_TYPE : EUC_2D
NODE_COORD_SECTION
1 0 0
2 0 1
3 1 1
4 1.0e0 0
EOF
";

    #[test]
    fn parses_coordinate_instances() {
        let instance = parse_tsplib(SQUARE).unwrap();
        assert_eq!(instance.name, "square4");
        assert_eq!(instance.comment.as_deref(), Some("unit square"));
        assert_eq!(instance.weight_type, WeightType::Euc2d);
        assert_eq!(instance.points, vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(instance.matrix.is_none());

        let index = instance.build_index().unwrap();
        assert!((index.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn parses_explicit_matrices() {
        let text = "\
NAME: tri
TYPE: TSP
DIMENSION: 3
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
EDGE_WEIGHT_SECTION
0 2 9
2 0 4
9 4 0
EOF
";
        let instance = parse_tsplib(text).unwrap();
        assert_eq!(instance.weight_type, WeightType::Explicit);
        assert_eq!(instance.matrix.as_ref().unwrap()[0], vec![0.0, 2.0, 9.0]);
        assert_eq!(instance.points, vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(instance.build_index().unwrap().distance(0, 2), 9.0);
    }

    #[test]
    fn ceil_distances_round_up() {
        let text = SQUARE.replace("EUC_2D", "CEIL_2D");
        let index = parse_tsplib(&text).unwrap().build_index().unwrap();
        assert_eq!(index.distance(0, 2), 2.0);
        assert_eq!(index.distance(0, 1), 1.0);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_tsplib("NAME : x\nTYPE : ATSP\nDIMENSION : 3\n").is_err());
        assert!(parse_tsplib("NAME : x\nNODE_COORD_SECTION\n1 0 0\n").is_err());
        assert!(parse_tsplib(&SQUARE.replace("4 1.0e0 0\n", "")).is_err());
        assert!(parse_tsplib(&SQUARE.replace("3 1 1", "9 1 1")).is_err());
    }

    #[test]
    fn written_instances_parse_back() {
        let instance = random_instance(12, 7, 100.0);
        let parsed = parse_tsplib(&write_tsplib_string(&instance).unwrap()).unwrap();
        assert_eq!(parsed, instance);
    }

    #[test]
    fn random_instances_are_reproducible() {
        let a = random_instance(20, 42, 10.0);
        let b = random_instance(20, 42, 10.0);
        let c = random_instance(20, 43, 10.0);
        assert_eq!(a.points, b.points);
        assert_ne!(a.points, c.points);
        assert!(a.points.iter().all(|&(x, y)| (0.0..10.0).contains(&x) && (0.0..10.0).contains(&y)));
    }
}
