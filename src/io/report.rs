//! Textual and machine-readable reports of a solver run.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::index::DistanceIndex;
use crate::solver::TourResult;

/// Per-ring entry of a [`TourSummary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingSummary {
    pub number: usize,
    pub closed: bool,
    pub level: usize,
    pub enclosing: Option<usize>,
    pub size: usize,
    pub length: f64,
}

/// JSON summary of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TourSummary {
    pub name: String,
    pub points: usize,
    pub total_length: f64,
    pub complete: bool,
    pub rounds: usize,
    pub iterations: usize,
    pub merges: usize,
    pub unbalanced: usize,
    pub rings: Vec<RingSummary>,
    /// 0-based visiting order, present for complete tours.
    pub tour: Option<Vec<usize>>,
}

impl TourSummary {
    pub fn new(name: &str, index: &DistanceIndex, result: &TourResult) -> Self {
        Self {
            name: name.to_string(),
            points: index.len(),
            total_length: result.total_length,
            complete: result.complete,
            rounds: result.rounds,
            iterations: result.iterations,
            merges: result.merges,
            unbalanced: result.unbalanced(),
            rings: result.rings.iter().map(|ring| RingSummary {
                number: ring.number(),
                closed: ring.is_closed(),
                level: ring.level(),
                enclosing: ring.enclosing(),
                size: ring.len(),
                length: ring.length(index),
            }).collect(),
            tour: result.tour().map(<[usize]>::to_vec),
        }
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("[io::report] Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("[io::report] Failed to write summary to {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

/// Write the connection report: one row per point, totals, then one block per ring.
///
/// Incomplete points are prefixed with `**`.
pub fn write_report<W: Write>(writer: &mut W, name: &str, index: &DistanceIndex, result: &TourResult) -> Result<()> {
    writeln!(writer, "NAME\t{name}")?;
    writeln!(writer, "POINTS\t{}", index.len())?;
    writeln!(writer, "ROUNDS\t{}", result.rounds)?;
    writeln!(writer)?;
    writeln!(writer, "[point]\t[x]\t[y]\t[elevation]\t[ring]\t[first]\t[length]\t[second]\t[length]")?;

    for point in index.points() {
        let p = point.sequence;
        let marker = if result.graph.is_complete(p) { "" } else { "**" };
        let ring = point.ring().map_or("-".to_string(), |r| r.to_string());
        write!(writer, "{marker}{p}\t{}\t{}\t{:.4}\t{ring}", point.x, point.y, point.elevation())?;

        let neighbors = result.graph.neighbors(p);
        for slot in 0..2 {
            match neighbors.get(slot) {
                Some(&q) => write!(writer, "\t{q}\t{:.6}", index.distance(p, q))?,
                None => write!(writer, "\t-\t-")?,
            }
        }
        writeln!(writer)?;
    }

    writeln!(writer, "Total Distance:\t{:.6}", result.total_length)?;
    writeln!(writer, "Unbalanced Count:\t{}", result.unbalanced())?;

    for ring in &result.rings {
        writeln!(writer)?;
        writeln!(writer, "RING\t{}", ring.number())?;
        writeln!(writer, "CLOSED\t{}", ring.is_closed())?;
        writeln!(writer, "LEVEL\t{}", ring.level())?;
        writeln!(writer, "ENCLOSING\t{}", ring.enclosing().map_or("-".to_string(), |r| r.to_string()))?;
        writeln!(writer, "SIZE\t{}", ring.len())?;
        for edge in ring.edges() {
            writeln!(writer, "{}\t{}\t{:.6}", edge.a(), edge.b(), index.length(*edge))?;
        }
    }
    Ok(())
}

/// Write the connection report to a file.
pub fn write_report_file(path: &Path, name: &str, index: &DistanceIndex, result: &TourResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::report] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_report(&mut writer, name, index, result)
        .with_context(|| format!("[io::report] Failed to write report to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Write a complete tour in TSPLIB `TOUR` format (1-based node ids).
pub fn write_tour<W: Write>(writer: &mut W, name: &str, result: &TourResult) -> Result<()> {
    let Some(tour) = result.tour() else {
        bail!("[io::report] {name}: cannot write a tour for an incomplete result");
    };

    writeln!(writer, "NAME : {name}.tour")?;
    writeln!(writer, "COMMENT : length {:.6}", result.total_length)?;
    writeln!(writer, "TYPE : TOUR")?;
    writeln!(writer, "DIMENSION : {}", tour.len())?;
    writeln!(writer, "TOUR_SECTION")?;
    for &p in tour {
        writeln!(writer, "{}", p + 1)?;
    }
    writeln!(writer, "-1")?;
    writeln!(writer, "EOF")?;
    Ok(())
}

/// Write a complete tour to a file.
pub fn write_tour_file(path: &Path, name: &str, result: &TourResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::report] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_tour(&mut writer, name, result)?;
    writer.flush()?;
    Ok(())
}
