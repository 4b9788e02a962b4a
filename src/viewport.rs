//! Affine mapping between simulation space and the output raster.

use crate::vector::Vector2;

/// A rectangular window onto the simulation plane and the raster it maps to.
///
/// Raster coordinates grow to the right and *down*; simulation coordinates
/// grow to the right and up. The minimum corner of the window lands on the
/// bottom-left of the raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min: Vector2,
    max: Vector2,
    width: u32,
    height: u32,
}

impl Viewport {
    /// `max` must exceed `min` on both axes.
    pub fn new(min: Vector2, max: Vector2, width: u32, height: u32) -> Self {
        debug_assert!(max.x > min.x && max.y > min.y, "empty viewport");
        Self {
            min,
            max,
            width,
            height,
        }
    }

    pub fn min(&self) -> Vector2 {
        self.min
    }

    pub fn max(&self) -> Vector2 {
        self.max
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raster pixels per simulation unit, per axis.
    pub fn scale(&self) -> Vector2 {
        Vector2::new(
            f64::from(self.width) / (self.max.x - self.min.x),
            f64::from(self.height) / (self.max.y - self.min.y),
        )
    }

    /// Map a simulation point to raster coordinates (origin top-left).
    pub fn to_screen(&self, point: Vector2) -> Vector2 {
        let scale = self.scale();
        Vector2::new(
            (point.x - self.min.x) * scale.x,
            f64::from(self.height) - (point.y - self.min.y) * scale.y,
        )
    }

    /// Inverse of [`Viewport::to_screen`].
    pub fn to_virtual(&self, screen: Vector2) -> Vector2 {
        let scale = self.scale();
        Vector2::new(
            screen.x / scale.x + self.min.x,
            (f64::from(self.height) - screen.y) / scale.y + self.min.y,
        )
    }

    /// Scale a simulation-space length along x into raster pixels.
    pub fn to_screen_length(&self, length: f64) -> f64 {
        length * self.scale().x
    }

    /// Simulation-space centres of a `columns × rows` grid laid over the
    /// window, row-major from the top row.
    pub fn sample_grid(&self, columns: u32, rows: u32) -> impl Iterator<Item = Vector2> + '_ {
        let cell = Vector2::new(
            (self.max.x - self.min.x) / f64::from(columns),
            (self.max.y - self.min.y) / f64::from(rows),
        );
        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| {
                Vector2::new(
                    self.min.x + (f64::from(column) + 0.5) * cell.x,
                    self.max.y - (f64::from(row) + 0.5) * cell.y,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Viewport {
        Viewport::new(Vector2::ZERO, Vector2::new(1.0, 1.0), 1000, 1000)
    }

    #[test]
    fn corners_map_to_flipped_raster_corners() {
        let v = unit();
        assert_eq!(v.to_screen(Vector2::ZERO), Vector2::new(0.0, 1000.0));
        assert_eq!(v.to_screen(Vector2::new(1.0, 1.0)), Vector2::new(1000.0, 0.0));
        assert_eq!(v.to_screen(Vector2::new(0.25, 0.75)), Vector2::new(250.0, 250.0));
    }

    #[test]
    fn to_virtual_inverts_to_screen() {
        let v = Viewport::new(Vector2::new(-3.0, 2.0), Vector2::new(5.0, 4.0), 800, 200);
        let p = Vector2::new(1.7, 3.1);
        let back = v.to_virtual(v.to_screen(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn anisotropic_scale() {
        let v = Viewport::new(Vector2::ZERO, Vector2::new(2.0, 4.0), 100, 100);
        assert_eq!(v.scale(), Vector2::new(50.0, 25.0));
        assert_eq!(v.to_screen_length(0.5), 25.0);
    }

    #[test]
    fn sample_grid_starts_top_left_and_is_row_major() {
        let v = Viewport::new(Vector2::ZERO, Vector2::new(4.0, 2.0), 4, 2);
        let samples: Vec<_> = v.sample_grid(4, 2).collect();
        assert_eq!(samples.len(), 8);
        assert_eq!(samples[0], Vector2::new(0.5, 1.5));
        assert_eq!(samples[3], Vector2::new(3.5, 1.5));
        assert_eq!(samples[4], Vector2::new(0.5, 0.5));
        assert_eq!(samples[7], Vector2::new(3.5, 0.5));
    }
}
