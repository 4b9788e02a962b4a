//! Superposition of charge sources.

use crate::charge::{ChargeSource, Field, Potential};
use crate::seed::SeedGenerator;
use crate::vector::Vector2;

/// The charges of a scene and the generators that seed its field lines.
///
/// Insertion order does not change the field (superposition commutes) but it
/// does decide which singular source is reported first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeCollection {
    charges: Vec<ChargeSource>,
    seed_generators: Vec<SeedGenerator>,
}

impl ChargeCollection {
    pub fn new(charges: Vec<ChargeSource>, seed_generators: Vec<SeedGenerator>) -> Self {
        Self {
            charges,
            seed_generators,
        }
    }

    pub fn charges(&self) -> &[ChargeSource] {
        &self.charges
    }

    pub fn seed_generators(&self) -> &[SeedGenerator] {
        &self.seed_generators
    }

    pub fn push_charge(&mut self, charge: impl Into<ChargeSource>) {
        self.charges.push(charge.into());
    }

    /// Insert a charge before `index`. Panics if `index > len`.
    pub fn insert_charge(&mut self, index: usize, charge: impl Into<ChargeSource>) {
        self.charges.insert(index, charge.into());
    }

    /// Remove and return the charge at `index`. Panics if out of bounds.
    pub fn remove_charge(&mut self, index: usize) -> ChargeSource {
        self.charges.remove(index)
    }

    pub fn push_seed_generator(&mut self, generator: SeedGenerator) {
        self.seed_generators.push(generator);
    }

    /// Insert a generator before `index`. Panics if `index > len`.
    pub fn insert_seed_generator(&mut self, index: usize, generator: SeedGenerator) {
        self.seed_generators.insert(index, generator);
    }

    /// Remove and return the generator at `index`. Panics if out of bounds.
    pub fn remove_seed_generator(&mut self, index: usize) -> SeedGenerator {
        self.seed_generators.remove(index)
    }

    /// Number of field lines all generators seed together.
    pub fn total_field_lines(&self) -> usize {
        self.seed_generators
            .iter()
            .map(SeedGenerator::field_line_count)
            .sum()
    }

    /// Number of primitive sources a single field query evaluates.
    pub fn primitive_count(&self) -> usize {
        self.charges.iter().map(ChargeSource::primitive_count).sum()
    }

    /// Total field at `point`; the first singular source ends the sum.
    pub fn field_at(&self, point: Vector2) -> Field {
        let mut total = Vector2::ZERO;
        for charge in &self.charges {
            match charge.field_at(point) {
                Field::Finite(v) => total += v,
                Field::Singular => return Field::Singular,
            }
        }
        Field::Finite(total)
    }

    /// Total potential at `point`; the first singular source ends the sum.
    pub fn potential_at(&self, point: Vector2) -> Potential {
        let mut total = 0.0;
        for charge in &self.charges {
            match charge.potential_at(point) {
                Potential::Finite(v) => total += v,
                singular @ Potential::Singular(_) => return singular,
            }
        }
        Potential::Finite(total)
    }
}
