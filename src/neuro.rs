//! Neuro-evolution variant: individuals are small dense networks whose
//! fitness is the MSE over a fixed dataset. Evaluation is costly and
//! individuals are immutable once built, so the fitness is computed once at
//! construction and cached. Selection is the shared elitism + tournament.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::Error;
use crate::selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// Row-major: `weights[out][in]`.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    /// Xavier-uniform initialization: `U(-limit, limit)` with
    /// `limit = sqrt(6 / (fan_in + fan_out))`.
    fn random<R: Rng>(fan_in: usize, fan_out: usize, activation: Activation, rng: &mut R) -> Self {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let weights = (0..fan_out)
            .map(|_| {
                (0..fan_in)
                    .map(|_| rng.gen_range(-limit..limit))
                    .collect()
            })
            .collect();
        let biases = (0..fan_out).map(|_| rng.gen_range(-limit..limit)).collect();
        Self {
            weights,
            biases,
            activation,
        }
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, &bias)| {
                let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(sum + bias)
            })
            .collect()
    }

    fn perturb<R: Rng>(&mut self, sigma: f64, rng: &mut R) {
        for row in &mut self.weights {
            for w in row {
                *w += sigma * rng.sample::<f64, _>(StandardNormal);
            }
        }
        for b in &mut self.biases {
            *b += sigma * rng.sample::<f64, _>(StandardNormal);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Net {
    layers: Vec<DenseLayer>,
}

impl Net {
    /// Layer sizes and activations are zipped; extra entries of either are
    /// ignored.
    pub fn random<R: Rng>(
        input_size: usize,
        layer_sizes: &[usize],
        activations: &[Activation],
        rng: &mut R,
    ) -> Self {
        let mut layers = Vec::new();
        let mut fan_in = input_size;
        for (&size, &activation) in layer_sizes.iter().zip(activations) {
            layers.push(DenseLayer::random(fan_in, size, activation, rng));
            fan_in = size;
        }
        Self { layers }
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current);
        }
        current
    }

    /// Mean squared error over a dataset of rows.
    pub fn mse(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for (x, y) in inputs.iter().zip(targets) {
            let out = self.forward(x);
            for (o, t) in out.iter().zip(y) {
                total += (o - t) * (o - t);
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { total / count as f64 }
    }
}

/// A network with its fitness cached at construction.
#[derive(Debug, Clone)]
pub struct NeuroIndividual {
    net: Net,
    fitness: f64,
}

impl NeuroIndividual {
    fn new(net: Net, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Self {
        let fitness = net.mse(inputs, targets);
        Self { net, fitness }
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Mutant with one uniformly chosen layer's weights and biases perturbed
    /// by `N(0, sigma)`.
    fn mutation<R: Rng>(
        &self,
        sigma: f64,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rng: &mut R,
    ) -> Self {
        let mut net = self.net.clone();
        let layer = rng.gen_range(0..net.layers.len());
        net.layers[layer].perturb(sigma, rng);
        Self::new(net, inputs, targets)
    }

    /// Child taking one uniformly chosen layer from the partner.
    fn crossing<R: Rng>(
        &self,
        other: &Self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rng: &mut R,
    ) -> Self {
        let mut net = self.net.clone();
        let layer = rng.gen_range(0..net.layers.len());
        net.layers[layer] = other.net.layers[layer].clone();
        Self::new(net, inputs, targets)
    }
}

pub struct NeuroPopulation {
    size: usize,
    individuals: Vec<NeuroIndividual>,
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl NeuroPopulation {
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng>(
        size: usize,
        input_size: usize,
        layer_sizes: &[usize],
        activations: &[Activation],
        inputs: Vec<Vec<f64>>,
        targets: Vec<Vec<f64>>,
        rng: &mut R,
    ) -> Self {
        let individuals = (0..size)
            .map(|_| {
                let net = Net::random(input_size, layer_sizes, activations, rng);
                NeuroIndividual::new(net, &inputs, &targets)
            })
            .collect();
        Self {
            size,
            individuals,
            inputs,
            targets,
        }
    }

    pub fn individuals(&self) -> &[NeuroIndividual] {
        &self.individuals
    }

    /// Each survivor spawns a mutant with probability `p`.
    pub fn mutations<R: Rng>(&mut self, sigma: f64, p: f64, rng: &mut R) {
        for i in 0..self.size.min(self.individuals.len()) {
            if rng.gen_range(0.0..1.0) < p {
                let mutant =
                    self.individuals[i].mutation(sigma, &self.inputs, &self.targets, rng);
                self.individuals.push(mutant);
            }
        }
    }

    /// Each survivor crosses with a random partner with probability `p`.
    pub fn crossings<R: Rng>(&mut self, p: f64, rng: &mut R) {
        let bound = self.size.min(self.individuals.len());
        for i in 0..bound {
            if rng.gen_range(0.0..1.0) < p {
                let partner = rng.gen_range(0..bound);
                let child = self.individuals[i].crossing(
                    &self.individuals[partner],
                    &self.inputs,
                    &self.targets,
                    rng,
                );
                self.individuals.push(child);
            }
        }
    }

    /// Elitism + tournament, minimizing cached MSE.
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
            .sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        let mut pool = self.individuals.split_off(elite_count);
        while self.individuals.len() < self.size {
            let winner = selection::tournament(&mut pool, tournament_size, rng);
            self.individuals.push(winner);
        }
        Ok(())
    }

    pub fn iteration<R: Rng>(
        &mut self,
        p_mutation: f64,
        sigma: f64,
        p_crossing: f64,
        elite_count: usize,
        tournament_size: usize,
        rng: &mut R,
    ) -> Result<(), Error> {
        self.mutations(sigma, p_mutation, rng);
        self.crossings(p_crossing, rng);
        self.selection(elite_count, tournament_size, rng)
    }

    pub fn best(&self) -> Option<&NeuroIndividual> {
        self.individuals
            .iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }
}
