use thiserror::Error;

/// Errors surfaced by the evolution controllers. Configuration errors are
/// detected before any population state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("elite count {elite_count} exceeds population limit {population_limit}")]
    EliteExceedsLimit {
        elite_count: usize,
        population_limit: usize,
    },

    #[error("population limit {population_limit} exceeds current population size {current}")]
    LimitExceedsPopulation {
        population_limit: usize,
        current: usize,
    },

    #[error("catalog contains no rectangle types")]
    EmptyCatalog,

    /// No catalog shape could be placed after the retry budget was spent.
    /// The original system looped forever here; the cap is a deliberate
    /// deviation so a saturated disc fails instead of hanging.
    #[error("no catalog shape fit the packing after {attempts} attempts")]
    PackingSaturated { attempts: usize },

    #[error("bound vectors have different dimensions: {min} vs {max}")]
    BoundsMismatch { min: usize, max: usize },

    #[error("tournament size {tournament_size} not in 1..={available}")]
    InvalidTournamentSize {
        tournament_size: usize,
        available: usize,
    },
}
