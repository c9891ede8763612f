//! Orthographic camera for drawing 3D scatters on a 2D plot.

/// Rotation of the unit cube, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation around the vertical (z) axis.
    pub yaw: f64,
    /// Tilt towards the viewer.
    pub pitch: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 35.0,
            pitch: 25.0,
        }
    }
}

impl Camera {
    /// Project a point already normalised to the unit cube.
    pub fn project(&self, [x, y, z]: [f64; 3]) -> [f64; 2] {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        // rotate about the cube centre
        let (x, y, z) = (x - 0.5, y - 0.5, z - 0.5);
        let xr = x * cy - y * sy;
        let yr = x * sy + y * cy;
        [xr, z * cp + yr * sp]
    }
}

/// Per-axis min/max scaling to `[0, 1]`. Degenerate axes map to 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCube {
    min: [f64; 3],
    max: [f64; 3],
}

impl UnitCube {
    pub fn fit<'a>(points: impl IntoIterator<Item = &'a [f64]>) -> Option<Self> {
        let mut cube: Option<UnitCube> = None;
        for p in points {
            let [x, y, z] = [p[0], p[1], p[2]];
            let c = cube.get_or_insert(UnitCube {
                min: [x, y, z],
                max: [x, y, z],
            });
            for (k, v) in [x, y, z].into_iter().enumerate() {
                c.min[k] = c.min[k].min(v);
                c.max[k] = c.max[k].max(v);
            }
        }
        cube
    }

    pub fn normalise(&self, p: &[f64]) -> [f64; 3] {
        let mut out = [0.5; 3];
        for k in 0..3 {
            let range = self.max[k] - self.min[k];
            if range.abs() > f64::EPSILON {
                out[k] = (p[k] - self.min[k]) / range;
            }
        }
        out
    }

    pub fn min(&self, axis: usize) -> f64 {
        self.min[axis]
    }

    pub fn max(&self, axis: usize) -> f64 {
        self.max[axis]
    }
}
