//! Iso-margin curves for two-outcome markets.
//!
//! For a margin `v` the odds pairs `(x, y)` with `1/x + 1/y - 1 = v` are the
//! zero set of the conic `xy - (x + y) / (1 + v)`, i.e. `(1 + v)xy - x - y`
//! scaled by `1 / (1 + v)`. The conic is sampled on a regular grid and the
//! zero level is extracted with marching squares.

use std::collections::HashMap;

use crate::config::ContourConfig;
use crate::data::filter::Table;
use crate::data::model::{BetType, Column};

pub type Point = [f64; 2];

// ---------------------------------------------------------------------------
// Conic
// ---------------------------------------------------------------------------

/// `a x² + b xy + c y² + d x + e y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Conic {
    /// Zero set is the two-outcome iso-margin curve for `vig`.
    pub fn iso_margin(vig: f64) -> Self {
        let linear = -1.0 / (1.0 + vig);
        Self {
            a: 0.0,
            b: 1.0,
            c: 0.0,
            d: linear,
            e: linear,
            f: 0.0,
        }
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.a * x * x + self.b * x * y + self.c * y * y + self.d * x + self.e * y + self.f
    }
}

/// Over-round of a two-outcome market quoted at decimal odds `x` and `y`.
pub fn two_way_margin(x: f64, y: f64) -> f64 {
    1.0 / x + 1.0 / y - 1.0
}

// ---------------------------------------------------------------------------
// Sampling grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Bounding box of `points`, widened by `padding` on every side.
    pub fn around(points: impl IntoIterator<Item = Point>, padding: f64) -> Option<Self> {
        let mut iter = points.into_iter();
        let [x0, y0] = iter.next()?;
        let mut b = Bounds {
            x_min: x0,
            x_max: x0,
            y_min: y0,
            y_max: y0,
        };
        for [x, y] in iter {
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }
        b.x_min -= padding;
        b.x_max += padding;
        b.y_min -= padding;
        b.y_max += padding;
        Some(b)
    }
}

/// Values of a function sampled on a regular `nx × ny` lattice, row-major in y.
#[derive(Debug, Clone)]
pub struct ScalarField {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

impl ScalarField {
    /// `resolution` is clamped to at least 2 points per axis.
    pub fn sample(bounds: Bounds, resolution: usize, f: impl Fn(f64, f64) -> f64) -> Self {
        let n = resolution.max(2);
        let xs = linspace(bounds.x_min, bounds.x_max, n);
        let ys = linspace(bounds.y_min, bounds.y_max, n);
        let values = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self { xs, ys, values }
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.xs.len() + i]
    }
}

// ---------------------------------------------------------------------------
// Marching squares
// ---------------------------------------------------------------------------

/// A lattice edge: `H(i, j)` joins `(i, j)`–`(i+1, j)`, `V(i, j)` joins
/// `(i, j)`–`(i, j+1)`. Neighbouring cells share keys, which is what lets
/// segments be chained without comparing floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    H(usize, usize),
    V(usize, usize),
}

/// Crossings of one level, as segments between lattice edges.
#[derive(Debug, Clone, Default)]
pub struct IsoLine {
    crossings: HashMap<EdgeKey, Point>,
    segments: Vec<(EdgeKey, EdgeKey)>,
}

impl ScalarField {
    fn crossing(&self, edge: EdgeKey, level: f64) -> Point {
        let ((i0, j0), (i1, j1)) = match edge {
            EdgeKey::H(i, j) => ((i, j), (i + 1, j)),
            EdgeKey::V(i, j) => ((i, j), (i, j + 1)),
        };
        let (v0, v1) = (self.at(i0, j0), self.at(i1, j1));
        let t = (level - v0) / (v1 - v0);
        [
            self.xs[i0] + t * (self.xs[i1] - self.xs[i0]),
            self.ys[j0] + t * (self.ys[j1] - self.ys[j0]),
        ]
    }

    /// Extract the `level` isoline. Corners strictly above the level count as
    /// inside; saddle cells are split by the sign of the cell-centre average.
    pub fn isoline(&self, level: f64) -> IsoLine {
        let (nx, ny) = (self.xs.len(), self.ys.len());
        let mut line = IsoLine::default();

        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let bl = self.at(i, j);
                let br = self.at(i + 1, j);
                let tr = self.at(i + 1, j + 1);
                let tl = self.at(i, j + 1);

                let case = (bl > level) as u8
                    | ((br > level) as u8) << 1
                    | ((tr > level) as u8) << 2
                    | ((tl > level) as u8) << 3;

                let bottom = EdgeKey::H(i, j);
                let top = EdgeKey::H(i, j + 1);
                let left = EdgeKey::V(i, j);
                let right = EdgeKey::V(i + 1, j);
                let centre_inside = (bl + br + tr + tl) / 4.0 > level;

                let mut emit = |a: EdgeKey, b: EdgeKey| {
                    for edge in [a, b] {
                        line.crossings
                            .entry(edge)
                            .or_insert_with(|| self.crossing(edge, level));
                    }
                    line.segments.push((a, b));
                };

                match case {
                    0 | 15 => {}
                    1 | 14 => emit(left, bottom),
                    2 | 13 => emit(bottom, right),
                    3 | 12 => emit(left, right),
                    4 | 11 => emit(right, top),
                    6 | 9 => emit(bottom, top),
                    7 | 8 => emit(left, top),
                    5 if centre_inside => {
                        emit(bottom, right);
                        emit(left, top);
                    }
                    5 => {
                        emit(left, bottom);
                        emit(right, top);
                    }
                    10 if centre_inside => {
                        emit(left, bottom);
                        emit(right, top);
                    }
                    10 => {
                        emit(bottom, right);
                        emit(left, top);
                    }
                    _ => unreachable!("marching-squares case is a 4-bit index"),
                }
            }
        }
        line
    }
}

impl IsoLine {
    pub fn segments(&self) -> Vec<[Point; 2]> {
        self.segments
            .iter()
            .map(|(a, b)| [self.crossings[a], self.crossings[b]])
            .collect()
    }

    /// Chain segments into polylines through shared edges. Closed loops end
    /// on their first point.
    pub fn polylines(&self) -> Vec<Vec<Point>> {
        let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for (idx, (a, b)) in self.segments.iter().enumerate() {
            by_edge.entry(*a).or_default().push(idx);
            by_edge.entry(*b).or_default().push(idx);
        }

        let mut used = vec![false; self.segments.len()];
        let walk = |mut end: EdgeKey, used: &mut Vec<bool>| -> Vec<EdgeKey> {
            let mut chain = Vec::new();
            while let Some(&next) = by_edge
                .get(&end)
                .and_then(|segs| segs.iter().find(|&&s| !used[s]))
            {
                used[next] = true;
                let (a, b) = self.segments[next];
                end = if a == end { b } else { a };
                chain.push(end);
            }
            chain
        };

        let mut out = Vec::new();
        for start in 0..self.segments.len() {
            if used[start] {
                continue;
            }
            used[start] = true;
            let (a, b) = self.segments[start];
            let forward = walk(b, &mut used);
            let backward = walk(a, &mut used);

            let keys = backward
                .into_iter()
                .rev()
                .chain([a, b])
                .chain(forward);
            out.push(keys.map(|k| self.crossings[&k]).collect());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// One dashed reference curve.
#[derive(Debug, Clone)]
pub struct IsoMarginCurve {
    pub margin: f64,
    pub segments: Vec<[Point; 2]>,
    pub polylines: Vec<Vec<Point>>,
}

/// Iso-margin curves over the scatter of a two-outcome market.
#[derive(Debug, Clone)]
pub struct ContourOverlay {
    pub bet: BetType,
    pub x: Column,
    pub y: Column,
    pub bounds: Bounds,
    /// Observed odds pairs, drawn underneath the curves.
    pub points: Vec<Point>,
    pub curves: Vec<IsoMarginCurve>,
}

/// Build the overlay for the Gol/Nogol and Under/Over 2.5 markets; `None` for
/// the three-way markets or an empty table.
pub fn build_overlay(table: &Table, bet: BetType, cfg: &ContourConfig) -> Option<ContourOverlay> {
    let &[x, y] = bet.odds_columns() else {
        return None;
    };
    let points: Vec<Point> = table
        .rows()
        .map(|view| [x.value(view.row), y.value(view.row)])
        .collect();
    let bounds = Bounds::around(points.iter().copied(), cfg.padding)?;

    let curves: Vec<IsoMarginCurve> = cfg
        .margins
        .iter()
        .map(|&margin| {
            let conic = Conic::iso_margin(margin);
            let line = ScalarField::sample(bounds, cfg.resolution, |x, y| conic.eval(x, y))
                .isoline(0.0);
            IsoMarginCurve {
                margin,
                segments: line.segments(),
                polylines: line.polylines(),
            }
        })
        .collect();

    log::debug!(
        "iso-margin overlay for {bet}: {} points, {} segments over {} levels",
        points.len(),
        curves.iter().map(|c| c.segments.len()).sum::<usize>(),
        cfg.margins.len()
    );

    Some(ContourOverlay {
        bet,
        x,
        y,
        bounds,
        points,
        curves,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::LeagueFilter;
    use crate::data::loader::parse_snapshot;
    use crate::data::loader::tests::{csv_of, line, PREFIX};

    const SQUARE: Bounds = Bounds {
        x_min: 1.4,
        x_max: 3.0,
        y_min: 1.4,
        y_max: 3.0,
    };

    #[test]
    fn iso_margin_conic_vanishes_on_the_margin_locus() {
        let conic = Conic::iso_margin(0.05);
        let x = 1.9;
        let y = 1.0 / (1.05 - 1.0 / x);
        assert_abs_diff_eq!(conic.eval(x, y), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(two_way_margin(x, y), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn ten_percent_curve_is_not_the_eleven_percent_one() {
        // evens on one side forces 1/y = 0.6 at 10%
        let conic = Conic::iso_margin(0.10);
        assert_abs_diff_eq!(conic.eval(2.0, 1.0 / 0.6), 0.0, epsilon = 1e-12);
        assert!(conic.eval(2.0, 1.0 / (1.0 / 0.9 - 0.5)).abs() > 1e-3);
    }

    #[test]
    fn overlay_vertices_sit_on_their_margin() {
        let csv = csv_of(&[
            line("A", "B", "LIGA", "2024-03-01 10:00:00.1", "1.60"),
            line("C", "D", "LIGA", "2024-03-01 10:00:00.1", "2.40"),
        ]);
        let snap = Arc::new(parse_snapshot(csv.as_bytes(), PREFIX, "test").unwrap());
        let since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let table = Table::build(snap, LeagueFilter::All, since, 3);
        let cfg = ContourConfig {
            resolution: 80,
            ..ContourConfig::default()
        };

        let overlay = build_overlay(&table, BetType::GolNogol, &cfg).unwrap();
        let drawn: usize = overlay.curves.iter().map(|c| c.polylines.len()).sum();
        assert!(drawn > 0);
        for curve in &overlay.curves {
            for [x, y] in curve.polylines.iter().flatten() {
                assert_abs_diff_eq!(two_way_margin(*x, *y), curve.margin, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn curve_points_have_the_requested_margin() {
        for vig in ContourConfig::default().margins {
            let conic = Conic::iso_margin(vig);
            let line = ScalarField::sample(SQUARE, 400, |x, y| conic.eval(x, y)).isoline(0.0);
            assert!(!line.segments().is_empty(), "no curve for {vig}");
            for [p, q] in line.segments() {
                for [x, y] in [p, q] {
                    assert_abs_diff_eq!(two_way_margin(x, y), vig, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn open_branch_chains_into_one_polyline() {
        for vig in [0.04, 0.07, 0.10] {
            let conic = Conic::iso_margin(vig);
            let line = ScalarField::sample(SQUARE, 120, |x, y| conic.eval(x, y)).isoline(0.0);
            let polylines = line.polylines();
            assert_eq!(polylines.len(), 1, "vig {vig}");
            assert_eq!(polylines[0].len(), line.segments().len() + 1);
        }
    }

    #[test]
    fn circle_chains_into_a_closed_loop() {
        let circle = Conic {
            a: 1.0,
            b: 0.0,
            c: 1.0,
            d: 0.0,
            e: 0.0,
            f: -1.0,
        };
        let bounds = Bounds {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -2.0,
            y_max: 2.0,
        };
        let line = ScalarField::sample(bounds, 41, |x, y| circle.eval(x, y)).isoline(0.0);
        let polylines = line.polylines();
        assert_eq!(polylines.len(), 1);
        let ring = &polylines[0];
        assert_eq!(ring.first(), ring.last());
        for [x, y] in ring {
            assert_abs_diff_eq!((x * x + y * y).sqrt(), 1.0, epsilon = 0.01);
        }
    }

    #[test]
    fn level_outside_the_field_gives_nothing() {
        let line = ScalarField::sample(SQUARE, 10, |x, y| x + y).isoline(100.0);
        assert!(line.segments().is_empty());
        assert!(line.polylines().is_empty());
    }

    #[test]
    fn bounds_pad_the_observed_range() {
        let b = Bounds::around([[1.5, 2.0], [2.5, 1.8]], 0.1).unwrap();
        assert_abs_diff_eq!(b.x_min, 1.4, epsilon = 1e-12);
        assert_abs_diff_eq!(b.x_max, 2.6, epsilon = 1e-12);
        assert_abs_diff_eq!(b.y_min, 1.7, epsilon = 1e-12);
        assert_abs_diff_eq!(b.y_max, 2.1, epsilon = 1e-12);
        assert!(Bounds::around([], 0.1).is_none());
    }

    #[test]
    fn overlay_only_for_two_way_markets() {
        let csv = csv_of(&[
            line("A", "B", "LIGA", "2024-03-01 10:00:00.1", "1.60"),
            line("C", "D", "LIGA", "2024-03-01 10:00:00.1", "2.40"),
        ]);
        let snap = Arc::new(parse_snapshot(csv.as_bytes(), PREFIX, "test").unwrap());
        let since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let table = Table::build(snap, LeagueFilter::All, since, 3);
        let cfg = ContourConfig {
            resolution: 60,
            ..ContourConfig::default()
        };

        assert!(build_overlay(&table, BetType::OneXTwo, &cfg).is_none());
        let overlay = build_overlay(&table, BetType::GolNogol, &cfg).unwrap();
        assert_eq!(overlay.x, Column::OddsGol);
        assert_eq!(overlay.points.len(), 2);
        assert_eq!(overlay.curves.len(), 7);
        assert_abs_diff_eq!(overlay.bounds.x_min, 1.5, epsilon = 1e-9);

        let empty = Table::build(
            Arc::clone(table.snapshot()),
            LeagueFilter::All,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            3,
        );
        assert!(build_overlay(&empty, BetType::UnderOver25, &cfg).is_none());
    }
}
