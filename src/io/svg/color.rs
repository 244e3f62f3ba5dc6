//! Ring colors for SVG rendering.

use std::fmt;

/// HSL color: h in degrees, s and l in [0.0, 1.0].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hsl {
    pub(crate) h: f64,
    pub(crate) s: f64,
    pub(crate) l: f64,
}

impl fmt::Display for Hsl {
    /// Format as CSS HSL:
    ///   hsl({h:.1},{s:.0}%,{l:.0}%)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // normalize hue into [0,360)
        let h = (self.h % 360.0 + 360.0) % 360.0;
        let s = (self.s * 100.0).clamp(0.0, 100.0);
        let l = (self.l * 100.0).clamp(0.0, 100.0);
        write!(f, "hsl({:.1},{:.0}%,{:.0}%)", h, s, l)
    }
}

const GOLDEN_ANGLE: f64 = 137.50776405;

/// Well-separated hues for consecutive ring numbers.
pub(crate) fn ring_color(ring: usize) -> Hsl {
    Hsl { h: ((ring as f64) * GOLDEN_ANGLE) % 360.0, s: 0.70, l: 0.45 }
}
