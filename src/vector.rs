//! The simple real-vector GA: individuals are plain `f64` vectors, fitness
//! is a caller-supplied function to minimize. Same population + operator +
//! selection shape as the disc packer, with elitism + tournament instead of
//! roulette.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::Error;
use crate::selection;

pub struct VectorPopulation<F: Fn(&[f64]) -> f64> {
    eval_f: F,
    size: usize,
    individuals: Vec<Vec<f64>>,
}

impl<F: Fn(&[f64]) -> f64> VectorPopulation<F> {
    /// Uniform initialization inside the box `[min_value, max_value]`.
    pub fn new<R: Rng>(
        eval_f: F,
        size: usize,
        min_value: &[f64],
        max_value: &[f64],
        rng: &mut R,
    ) -> Result<Self, Error> {
        if min_value.len() != max_value.len() {
            return Err(Error::BoundsMismatch {
                min: min_value.len(),
                max: max_value.len(),
            });
        }
        let individuals = (0..size)
            .map(|_| {
                min_value
                    .iter()
                    .zip(max_value)
                    .map(|(&lo, &hi)| lo + rng.gen_range(0.0..1.0) * (hi - lo))
                    .collect()
            })
            .collect();
        Ok(Self {
            eval_f,
            size,
            individuals,
        })
    }

    pub fn individuals(&self) -> &[Vec<f64>] {
        &self.individuals
    }

    pub fn evaluate(&self, individual: &[f64]) -> f64 {
        (self.eval_f)(individual)
    }

    /// Appends a mutant of a random individual (drawn from the first `size`,
    /// the survivors of the last selection): every element perturbed by
    /// `N(0, sigma)`.
    pub fn mutation<R: Rng>(&mut self, sigma: f64, rng: &mut R) {
        let parent = &self.individuals[rng.gen_range(0..self.size.min(self.individuals.len()))];
        let mutant: Vec<f64> = parent
            .iter()
            .map(|&v| v + sigma * rng.sample::<f64, _>(StandardNormal))
            .collect();
        self.individuals.push(mutant);
    }

    /// Appends a single-point crossover of two random individuals.
    pub fn crossing<R: Rng>(&mut self, rng: &mut R) {
        let bound = self.size.min(self.individuals.len());
        let a = &self.individuals[rng.gen_range(0..bound)];
        let b = &self.individuals[rng.gen_range(0..bound)];
        // one-dimensional individuals have no interior cut point
        let child = if a.len() > 1 {
            let cut = rng.gen_range(1..a.len());
            a[..cut].iter().chain(&b[cut..]).copied().collect()
        } else {
            a.clone()
        };
        self.individuals.push(child);
    }

    /// Elitism + tournament, minimizing. Sorts ascending by fitness, keeps
    /// the first `elite_count`, then repeatedly runs smallest-index-wins
    /// tournaments over the rest (without replacement) until `size` is
    /// restored.
    pub fn selection<R: Rng>(
        &mut self,
        elite_count: usize,
        tournament_size: usize,
        rng: &mut R,
    ) -> Result<(), Error> {
        if elite_count > self.size {
            return Err(Error::EliteExceedsLimit {
                elite_count,
                population_limit: self.size,
            });
        }
        let available = self.individuals.len().saturating_sub(elite_count);
        if tournament_size == 0 || tournament_size > available {
            return Err(Error::InvalidTournamentSize {
                tournament_size,
                available,
            });
        }

        self.individuals
            .sort_by(|a, b| (self.eval_f)(a).total_cmp(&(self.eval_f)(b)));
        let mut pool = self.individuals.split_off(elite_count);
        while self.individuals.len() < self.size {
            let winner = selection::tournament(&mut pool, tournament_size, rng);
            self.individuals.push(winner);
        }
        Ok(())
    }

    pub fn iteration<R: Rng>(
        &mut self,
        n_mutations: usize,
        sigma: f64,
        n_crossings: usize,
        elite_count: usize,
        tournament_size: usize,
        rng: &mut R,
    ) -> Result<(), Error> {
        if tournament_size + elite_count > self.size + n_mutations + n_crossings {
            return Err(Error::InvalidTournamentSize {
                tournament_size,
                available: (self.size + n_mutations + n_crossings).saturating_sub(elite_count),
            });
        }

        for _ in 0..n_mutations {
            self.mutation(sigma, rng);
        }
        for _ in 0..n_crossings {
            self.crossing(rng);
        }
        self.selection(elite_count, tournament_size, rng)
    }

    /// The minimum-fitness individual.
    pub fn best(&self) -> Option<&[f64]> {
        self.individuals
            .iter()
            .min_by(|a, b| (self.eval_f)(a).total_cmp(&(self.eval_f)(b)))
            .map(Vec::as_slice)
    }
}
