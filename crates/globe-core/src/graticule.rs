//! Graticule
//!
//! Meridian and parallel polylines drawn over the sphere.

use serde::{Deserialize, Serialize};

/// Graticule layout in degrees
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graticule {
    /// Spacing of the minor meridians and parallels
    pub minor_step: f64,

    /// Spacing of the full-height meridians
    pub major_step: f64,

    /// Latitude bound of the minor lines
    pub minor_extent: f64,

    /// Sampling interval along each line
    pub precision: f64,
}

impl Default for Graticule {
    fn default() -> Self {
        Self {
            minor_step: 10.0,
            major_step: 90.0,
            minor_extent: 80.0,
            precision: 2.5,
        }
    }
}

impl Graticule {
    /// All lines as (lon, lat) polylines
    pub fn lines(&self) -> Vec<Vec<(f64, f64)>> {
        let mut lines = Vec::new();

        for lon in steps(-180.0, 180.0, self.major_step) {
            lines.push(self.meridian(lon, 90.0));
        }

        for lon in steps(-180.0, 180.0, self.minor_step) {
            if !is_multiple(lon, self.major_step) {
                lines.push(self.meridian(lon, self.minor_extent));
            }
        }

        for lat in steps(-self.minor_extent, self.minor_extent + self.minor_step / 2.0, self.minor_step) {
            lines.push(self.parallel(lat));
        }

        lines
    }

    fn meridian(&self, lon: f64, extent: f64) -> Vec<(f64, f64)> {
        let mut line: Vec<(f64, f64)> = steps(-extent, extent, self.precision)
            .map(|lat| (lon, lat))
            .collect();
        line.push((lon, extent));
        line
    }

    fn parallel(&self, lat: f64) -> Vec<(f64, f64)> {
        let mut line: Vec<(f64, f64)> = steps(-180.0, 180.0, self.precision)
            .map(|lon| (lon, lat))
            .collect();
        line.push((180.0, lat));
        line
    }
}

/// `start, start + step, …` strictly below `end`
fn steps(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if step > 0.0 {
        ((end - start) / step).ceil().max(0.0) as usize
    } else {
        0
    };
    (0..count).map(move |i| (i as f64).mul_add(step, start))
}

fn is_multiple(value: f64, step: f64) -> bool {
    (value / step - (value / step).round()).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_counts() {
        let lines = Graticule::default().lines();
        // 4 major meridians, 32 minor meridians, 17 parallels
        assert_eq!(lines.len(), 4 + 32 + 17);
    }

    #[test]
    fn test_major_meridian_reaches_poles() {
        let lines = Graticule::default().lines();
        let first = &lines[0];
        assert_eq!(first.first(), Some(&(-180.0, -90.0)));
        assert_eq!(first.last(), Some(&(-180.0, 90.0)));
    }

    #[test]
    fn test_minor_lines_stay_within_extent() {
        let graticule = Graticule::default();
        for line in graticule.lines().iter().skip(4) {
            assert!(line.iter().all(|&(_, lat)| lat.abs() <= 80.0 + 1e-9));
        }
    }
}
