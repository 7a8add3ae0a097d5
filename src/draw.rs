use rand::Rng;

use crate::error::{Result, WheelError};

/// Inverse-CDF sampler over a fixed set of positive weights. The cumulative
/// table is built once per configuration.
#[derive(Debug, Clone)]
pub struct WeightedDraw {
    /// cumulative[i] = weights[0] + ... + weights[i]
    cumulative: Vec<f64>,
}

impl WeightedDraw {
    pub fn new(weights: &[f64]) -> Result<WeightedDraw> {
        if weights.is_empty() {
            return Err(WheelError::EmptyTable);
        }
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.;
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0. {
                return Err(WheelError::InvalidWeight { index, weight });
            }
            total += weight;
            // Sum overflowed
            if !total.is_finite() {
                return Err(WheelError::InvalidWeight { index, weight });
            }
            cumulative.push(total);
        }
        if total <= 0. {
            return Err(WheelError::ZeroTotalWeight);
        }
        if let Some(index) = weights.iter().position(|&w| w == 0.) {
            return Err(WheelError::InvalidWeight { index, weight: 0. });
        }
        Ok(WeightedDraw { cumulative })
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Probability of drawing `index`.
    pub fn probability(&self, index: usize) -> f64 {
        let prev = if index == 0 { 0. } else { self.cumulative[index - 1] };
        (self.cumulative[index] - prev) / self.total()
    }

    /// Draws r in [0, total) and returns the smallest i with C[i] >= r.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r = self.total() * rng.gen::<f64>();
        self.index_for(r)
    }

    fn index_for(&self, r: f64) -> usize {
        let idx = self.cumulative.partition_point(|&c| c < r);
        // Rounding in the running sum can leave r a hair above the last entry
        idx.min(self.cumulative.len() - 1)
    }
}

/// One-shot weighted draw over parallel value/weight sequences. Returns the
/// index of the chosen entry.
pub fn weighted_index<T, R: Rng + ?Sized>(values: &[T], weights: &[f64], rng: &mut R) -> Result<usize> {
    if values.len() != weights.len() {
        return Err(WheelError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }
    Ok(WeightedDraw::new(weights)?.sample(rng))
}

/// Uniform draw over `0..n`, ignoring weights.
pub fn uniform_index<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<usize> {
    if n == 0 {
        return Err(WheelError::EmptyTable);
    }
    Ok(rng.gen_range(0..n))
}
