//! SVG writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use geo::{BoundingRect, MultiPoint, Rect};

use crate::index::DistanceIndex;
use crate::io::svg::color::ring_color;
use crate::solver::TourResult;

const WIDTH: f64 = 800.0;
const MARGIN: f64 = 20.0;

/// Maps instance coordinates into the SVG viewport (y axis flipped).
struct Projection {
    bounds: Rect<f64>,
    scale: f64,
}

impl Projection {
    fn new(index: &DistanceIndex) -> Self {
        let points = index.points().iter().map(|p| p.coords()).collect::<Vec<_>>();
        let bounds = MultiPoint::from(points).bounding_rect()
            .unwrap_or_else(|| Rect::new((0.0, 0.0), (1.0, 1.0)));
        let extent = bounds.width().max(bounds.height()).max(f64::EPSILON);
        Self { bounds, scale: (WIDTH - 2.0 * MARGIN) / extent }
    }

    #[inline]
    fn project(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (MARGIN + (x - self.bounds.min().x) * self.scale, MARGIN + (self.bounds.max().y - y) * self.scale)
    }

    fn height(&self) -> f64 { 2.0 * MARGIN + self.bounds.height() * self.scale }
}

/// Write the SVG header, including the XML declaration and opening <svg> tag.
fn write_svg_header<W: Write>(writer: &mut W, width: f64, height: f64, scale: f64, bounds: &Rect<f64>) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-x-min="{x_min}" data-x-max="{x_max}"
        data-y-min="{y_min}" data-y-max="{y_max}"
        data-margin="{MARGIN}" data-scale="{scale}">"##,
        x_min = bounds.min().x,
        x_max = bounds.max().x,
        y_min = bounds.min().y,
        y_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

fn write_svg_styles<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .edge {{ stroke-width: 1.2; stroke-linecap: round; vector-effect: non-scaling-stroke; }}
    .pt {{ fill: #111827; }}
    .open {{ fill: #dc2626; }}
</style>
</defs>"##)?;
    Ok(())
}

fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}

/// Render points and connections, one color per ring; incomplete points are highlighted.
fn render<W: Write>(writer: &mut W, index: &DistanceIndex, result: &TourResult) -> Result<()> {
    let projection = Projection::new(index);
    write_svg_header(writer, WIDTH, projection.height(), projection.scale, &projection.bounds)?;
    write_svg_styles(writer)?;

    writeln!(writer, r#"<g id="rings">"#)?;
    for ring in &result.rings {
        let color = ring_color(ring.number());
        for edge in ring.edges() {
            let (x1, y1) = projection.project(index.point(edge.a()).coords());
            let (x2, y2) = projection.project(index.point(edge.b()).coords());
            writeln!(writer, r#"<line class="edge" x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{color}"/>"#)?;
        }
    }
    writeln!(writer, "</g>")?;

    writeln!(writer, r#"<g id="points">"#)?;
    for point in index.points() {
        let (cx, cy) = projection.project(point.coords());
        let class = if result.graph.is_complete(point.sequence) { "pt" } else { "pt open" };
        writeln!(writer, r#"<circle class="{class}" cx="{cx:.2}" cy="{cy:.2}" r="2"><title>{}</title></circle>"#, point.sequence)?;
    }
    writeln!(writer, "</g>")?;

    write_svg_footer(writer)
}

/// Write the SVG rendering of a run to a file.
pub fn write_svg(path: &Path, index: &DistanceIndex, result: &TourResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    render(&mut writer, index, result)?;
    writer.flush()
        .with_context(|| format!("[io::svg] Failed to write {}", path.display()))
}

/// Render a run to an SVG string.
pub fn write_svg_string(index: &DistanceIndex, result: &TourResult) -> Result<String> {
    let mut buffer = Vec::new();
    render(&mut buffer, index, result)?;
    String::from_utf8(buffer)
        .context("[io::svg] SVG output is not valid UTF-8")
}
