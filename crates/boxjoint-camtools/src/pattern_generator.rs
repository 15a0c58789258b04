use crate::error::{GeneratorError, GeneratorResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters for random test patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGeneratorParameters {
    /// Narrowest gap or finger (thou, inclusive)
    pub min_width: i32,
    /// Widest gap or finger (thou, inclusive)
    pub max_width: i32,
    /// Number of gap/finger pairs to produce
    pub pair_count: usize,
}

/// Generator for random gap/finger patterns
pub struct RandomPatternGenerator {
    params: PatternGeneratorParameters,
}

impl RandomPatternGenerator {
    /// Create a new RandomPatternGenerator with the given parameters
    pub fn new(params: PatternGeneratorParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PatternGeneratorParameters {
        &self.params
    }

    /// Generate a pattern using the thread-local RNG
    pub fn generate(&self) -> GeneratorResult<Vec<i32>> {
        self.generate_with_rng(&mut rand::thread_rng())
    }

    /// Generate a pattern of `2 * pair_count` widths, each drawn uniformly
    /// from `min_width..=max_width`
    pub fn generate_with_rng(&self, rng: &mut impl Rng) -> GeneratorResult<Vec<i32>> {
        let p = &self.params;
        if p.min_width > p.max_width {
            return Err(GeneratorError::InvalidRange {
                min: p.min_width,
                max: p.max_width,
            });
        }

        let pattern: Vec<i32> = (0..p.pair_count * 2)
            .map(|_| rng.gen_range(p.min_width..=p.max_width))
            .collect();

        tracing::debug!(
            "Generated {} pairs in {}..={}",
            p.pair_count,
            p.min_width,
            p.max_width
        );
        Ok(pattern)
    }
}

/// Generate a random pattern in one call
pub fn generate(min_width: i32, max_width: i32, pair_count: usize) -> GeneratorResult<Vec<i32>> {
    RandomPatternGenerator::new(PatternGeneratorParameters {
        min_width,
        max_width,
        pair_count,
    })
    .generate()
}
