use rand::Rng;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::packing::{Packing, random_point_in_disc};
use crate::selection;

/// Evolution controller for the disc packing problem: owns the population,
/// drives crossover/mutation offspring generation and elitist roulette
/// selection back to a fixed size.
pub struct Evolution {
    radius: f64,
    catalog: Catalog,
    population: Vec<Packing>,
}

impl Evolution {
    /// Builds a population of `population_size` greedily seeded packings:
    /// each individual gets `starting_rectangles` random placement attempts
    /// at uniform points in the disc, then one compaction pass.
    pub fn new<R: Rng>(
        population_size: usize,
        radius: f64,
        catalog: Catalog,
        starting_rectangles: usize,
        rng: &mut R,
    ) -> Result<Self, Error> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let mut population = Vec::with_capacity(population_size);
        for _ in 0..population_size {
            let mut individual = Packing::new(radius);
            for _ in 0..starting_rectangles {
                let (x, y) = random_point_in_disc(radius, rng);
                individual.try_add_new(catalog.place_random(rng, x, y));
            }
            individual.correct(&catalog, rng);
            population.push(individual);
        }
        Ok(Self {
            radius,
            catalog,
            population,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn population(&self) -> &[Packing] {
        &self.population
    }

    /// Elitism plus roulette: keeps the `elite_count` fittest unconditionally
    /// and fills the remaining `population_limit - elite_count` slots by
    /// fitness-weighted draws with replacement from the rest. Fails before
    /// touching the population if the limits are inconsistent.
    pub fn selection<R: Rng>(
        &mut self,
        population_limit: usize,
        elite_count: usize,
        rng: &mut R,
    ) -> Result<(), Error> {
        if elite_count > population_limit {
            return Err(Error::EliteExceedsLimit {
                elite_count,
                population_limit,
            });
        }
        if self.population.len() < population_limit {
            return Err(Error::LimitExceedsPopulation {
                population_limit,
                current: self.population.len(),
            });
        }

        self.population
            .sort_by(|a, b| b.evaluate().total_cmp(&a.evaluate()));
        let rest = self.population.split_off(elite_count);
        let weights: Vec<f64> = rest.iter().map(Packing::evaluate).collect();
        let chosen = selection::roulette(&rest, &weights, population_limit - elite_count, rng);
        self.population.extend(chosen);
        Ok(())
    }

    /// One generation: `n_crossings` children from random parent pairs,
    /// `n_mutations` mutants from random individuals (both appended to the
    /// pool, so later picks may draw fresh offspring), then selection back
    /// to the starting size.
    pub fn iter<R: Rng>(
        &mut self,
        n_mutations: usize,
        n_crossings: usize,
        elite_count: usize,
        rng: &mut R,
    ) -> Result<(), Error> {
        let n = self.population.len();

        for _ in 0..n_crossings {
            let father = &self.population[rng.gen_range(0..self.population.len())];
            let mother = &self.population[rng.gen_range(0..self.population.len())];
            let child = father.random_cross(mother, &self.catalog, rng);
            self.population.push(child);
        }

        for _ in 0..n_mutations {
            let candidate = &self.population[rng.gen_range(0..self.population.len())];
            let mutant = candidate.random_mutation(&self.catalog, rng)?;
            self.population.push(mutant);
        }

        self.selection(n, elite_count, rng)?;
        tracing::debug!(
            population = self.population.len(),
            best = self.best().map(Packing::evaluate).unwrap_or(0.0),
            "generation complete"
        );
        Ok(())
    }

    /// The fittest packing in the current population.
    pub fn best(&self) -> Option<&Packing> {
        self.population
            .iter()
            .max_by(|a, b| a.evaluate().total_cmp(&b.evaluate()))
    }
}
