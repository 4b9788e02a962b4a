//! Charge primitives and their closed-form field and potential.
//!
//! Every source answers two questions about a query point: the electric field
//! vector ([`Field`]) and the scalar potential ([`Potential`]). Points where
//! the closed form diverges (a point charge's own position, a point on a
//! charged segment) are reported as explicit singular values instead of
//! infinities hidden inside a vector.

use std::f64::consts::PI;

use crate::vector::Vector2;

/// Coulomb's constant, in N·m²/C².
pub const COULOMB_CONSTANT: f64 = 8.9875517923e9;

/// Electric field at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Finite(Vector2),
    Singular,
}

impl Field {
    /// True when the field is a usable, finite vector.
    pub fn is_finite(&self) -> bool {
        matches!(self, Field::Finite(v) if v.is_finite())
    }

    pub fn vector(&self) -> Option<Vector2> {
        match self {
            Field::Finite(v) => Some(*v),
            Field::Singular => None,
        }
    }
}

/// Sign of the charge responsible for a singular potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub fn of(charge: f64) -> Self {
        if charge > 0.0 {
            Polarity::Positive
        } else if charge < 0.0 {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }
}

/// Electric potential at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Potential {
    Finite(f64),
    Singular(Polarity),
}

impl Potential {
    /// Collapse into a plain number for ranking: singularities become `±∞`,
    /// and a singularity of a neutral charge contributes nothing.
    pub fn to_f64(self) -> f64 {
        match self {
            Potential::Finite(v) => v,
            Potential::Singular(Polarity::Positive) => f64::INFINITY,
            Potential::Singular(Polarity::Negative) => f64::NEG_INFINITY,
            Potential::Singular(Polarity::Neutral) => 0.0,
        }
    }

    pub fn is_singular(&self) -> bool {
        matches!(self, Potential::Singular(_))
    }
}

/// A charge concentrated at a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCharge {
    pub charge: f64,
    pub position: Vector2,
}

impl PointCharge {
    pub fn new(charge: f64, position: Vector2) -> Self {
        Self { charge, position }
    }

    pub fn field_at(&self, point: Vector2) -> Field {
        let distance = self.position.distance_to(point);
        if distance == 0.0 {
            return Field::Singular;
        }
        let magnitude = COULOMB_CONSTANT * self.charge / distance.powi(2);
        Field::Finite(Vector2::from_polar(
            magnitude,
            self.position.direction_to(point),
        ))
    }

    pub fn potential_at(&self, point: Vector2) -> Potential {
        let distance = self.position.distance_to(point);
        if distance == 0.0 {
            return Potential::Singular(Polarity::of(self.charge));
        }
        Potential::Finite(COULOMB_CONSTANT * self.charge / distance)
    }
}

/// Projection of a query point onto a segment's line.
///
/// `a1`/`a2` are the signed distances, measured along the segment direction,
/// from the point's perpendicular foot to each endpoint; `r1`/`r2` are the
/// straight distances to the endpoints and `z` the distance to the line.
struct Projection {
    a1: f64,
    a2: f64,
    r1: f64,
    r2: f64,
    z: f64,
}

/// A charge spread uniformly along a straight segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCharge {
    pub charge: f64,
    pub endpoint1: Vector2,
    pub endpoint2: Vector2,
}

impl LineCharge {
    /// Endpoints must differ; a zero-length segment has no charge density.
    pub fn new(charge: f64, endpoint1: Vector2, endpoint2: Vector2) -> Self {
        debug_assert!(endpoint1 != endpoint2, "degenerate line charge");
        Self {
            charge,
            endpoint1,
            endpoint2,
        }
    }

    pub fn length(&self) -> f64 {
        self.endpoint1.distance_to(self.endpoint2)
    }

    pub fn midpoint(&self) -> Vector2 {
        Vector2::lerp(self.endpoint1, self.endpoint2, 0.5)
    }

    /// Linear charge density.
    pub fn density(&self) -> f64 {
        self.charge / self.length()
    }

    fn project(&self, point: Vector2) -> Projection {
        let line = self.endpoint2 - self.endpoint1;
        let length = line.magnitude();
        let a1 = line.dot(self.endpoint1 - point) / length;
        let r1_squared = point.squared_distance_to(self.endpoint1);
        Projection {
            a1,
            a2: a1 + length,
            r1: r1_squared.sqrt(),
            r2: point.squared_distance_to(self.endpoint2).sqrt(),
            z: (r1_squared - a1.powi(2)).abs().sqrt(),
        }
    }

    pub fn field_at(&self, point: Vector2) -> Field {
        let Projection { a1, a2, r1, r2, z } = self.project(point);
        if r1 == 0.0 || r2 == 0.0 {
            return Field::Singular;
        }

        let line = self.endpoint2 - self.endpoint1;
        let length = line.magnitude();
        let k_rho = COULOMB_CONSTANT * self.charge / length;
        let parallel = k_rho * (1.0 / r2 - 1.0 / r1);

        let transverse = if z == 0.0 {
            if a1 <= 0.0 && a2 >= 0.0 {
                return Field::Singular;
            }
            0.0
        } else {
            k_rho / z * (a2 / r2 - a1 / r1)
        };

        // The transverse component points away from the line on whichever
        // side the query point lies.
        let offset = point - self.endpoint1;
        let field = if offset.x * line.y < offset.y * line.x {
            Vector2::new(
                line.x * parallel - line.y * transverse,
                line.y * parallel + line.x * transverse,
            )
        } else {
            Vector2::new(
                line.x * parallel + line.y * transverse,
                line.y * parallel - line.x * transverse,
            )
        };
        Field::Finite(field / length)
    }

    pub fn potential_at(&self, point: Vector2) -> Potential {
        let Projection { a1, a2, r1, r2, z } = self.project(point);
        let k_rho = COULOMB_CONSTANT * self.density();

        // Collinear with the segment's line.
        if z == 0.0 || a1.abs() == r1 || a2.abs() == r2 {
            if a1 < 0.0 && a2 < 0.0 {
                return Potential::Finite(k_rho * (a1 / a2).ln());
            }
            if a1 <= 0.0 && a2 >= 0.0 {
                return Potential::Singular(Polarity::of(self.charge));
            }
            return Potential::Finite(k_rho * (a2 / a1).ln());
        }

        // Both forms are the same quantity; the first avoids cancellation in
        // `a + r` when the point lies beyond endpoint 2.
        let ratio = if a1 < 0.0 && a2 < 0.0 {
            (r1 - a1) / (r2 - a2)
        } else {
            (a2 + r2) / (a1 + r1)
        };
        Potential::Finite(k_rho * ratio.abs().ln())
    }
}

/// A regular polygon whose perimeter carries a uniform charge.
///
/// The polygon is expanded into one [`LineCharge`] per side when it is
/// constructed; each side carries `charge / sides`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonCharge {
    pub charge: f64,
    pub center: Vector2,
    pub sides: usize,
    pub radius: f64,
    /// Rotation in radians.
    pub rotation: f64,
    edges: Vec<LineCharge>,
}

impl PolygonCharge {
    pub fn new(charge: f64, center: Vector2, sides: usize, radius: f64, rotation: f64) -> Self {
        debug_assert!(sides >= 3, "a polygon needs at least three sides");
        let vertices = Self::corners(center, sides, radius, rotation);
        let side_charge = charge / sides as f64;
        let edges = (0..sides)
            .map(|i| LineCharge::new(side_charge, vertices[i], vertices[(i + 1) % sides]))
            .collect();

        Self {
            charge,
            center,
            sides,
            radius,
            rotation,
            edges,
        }
    }

    /// Vertices of the polygon, in edge order. `rotation` is in radians.
    pub fn corners(center: Vector2, sides: usize, radius: f64, rotation: f64) -> Vec<Vector2> {
        (0..sides)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / sides as f64 + rotation + PI;
                center + Vector2::from_polar(radius, angle)
            })
            .collect()
    }

    pub fn edges(&self) -> &[LineCharge] {
        &self.edges
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vector2> + '_ {
        self.edges.iter().map(|e| e.endpoint1)
    }

    pub fn field_at(&self, point: Vector2) -> Field {
        let mut total = Vector2::ZERO;
        for edge in &self.edges {
            match edge.field_at(point) {
                Field::Finite(v) => total += v,
                Field::Singular => return Field::Singular,
            }
        }
        Field::Finite(total)
    }

    pub fn potential_at(&self, point: Vector2) -> Potential {
        let mut total = 0.0;
        for edge in &self.edges {
            match edge.potential_at(point) {
                Potential::Finite(v) => total += v,
                singular @ Potential::Singular(_) => return singular,
            }
        }
        Potential::Finite(total)
    }
}

/// Any charge shape the solver understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeSource {
    Point(PointCharge),
    Line(LineCharge),
    Polygon(PolygonCharge),
}

impl ChargeSource {
    pub fn field_at(&self, point: Vector2) -> Field {
        match self {
            ChargeSource::Point(c) => c.field_at(point),
            ChargeSource::Line(c) => c.field_at(point),
            ChargeSource::Polygon(c) => c.field_at(point),
        }
    }

    pub fn potential_at(&self, point: Vector2) -> Potential {
        match self {
            ChargeSource::Point(c) => c.potential_at(point),
            ChargeSource::Line(c) => c.potential_at(point),
            ChargeSource::Polygon(c) => c.potential_at(point),
        }
    }

    /// Total charge carried by the source.
    pub fn charge(&self) -> f64 {
        match self {
            ChargeSource::Point(c) => c.charge,
            ChargeSource::Line(c) => c.charge,
            ChargeSource::Polygon(c) => c.charge,
        }
    }

    /// Number of primitive field evaluations one query costs.
    pub fn primitive_count(&self) -> usize {
        match self {
            ChargeSource::Point(_) | ChargeSource::Line(_) => 1,
            ChargeSource::Polygon(c) => c.sides,
        }
    }
}

impl From<PointCharge> for ChargeSource {
    fn from(c: PointCharge) -> Self {
        ChargeSource::Point(c)
    }
}

impl From<LineCharge> for ChargeSource {
    fn from(c: LineCharge) -> Self {
        ChargeSource::Line(c)
    }
}

impl From<PolygonCharge> for ChargeSource {
    fn from(c: PolygonCharge) -> Self {
        ChargeSource::Polygon(c)
    }
}
