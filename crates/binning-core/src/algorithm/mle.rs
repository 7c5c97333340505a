//! Maximum likelihood estimate for log-normally distributed values ("ML").

use super::{check_weight_coeff, finish_weighted_sums, merge_weighted_sums, slots, BinAlgorithm};
use crate::error::Result;

const ACCUMULATED: [&str; 4] = ["sum_log", "sum_sq_log", "count", "weight"];
const INTERPRETED: [&str; 5] = ["mean", "sigma", "median", "mode", "count"];

/// Log-normal estimator. Sums are accumulated in the log domain, so only
/// strictly positive values contribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximumLikelihood {
    weight_coeff: f64,
}

impl MaximumLikelihood {
    pub fn new(weight_coeff: f64) -> Result<Self> {
        Ok(Self {
            weight_coeff: check_weight_coeff(weight_coeff)?,
        })
    }

    pub fn weight_coeff(&self) -> f64 {
        self.weight_coeff
    }
}

impl BinAlgorithm for MaximumLikelihood {
    fn name(&self) -> &'static str {
        "ML"
    }

    fn num_accumulated_variables(&self) -> usize {
        ACCUMULATED.len()
    }

    fn accumulated_variable_name(&self, index: usize) -> Option<&'static str> {
        ACCUMULATED.get(index).copied()
    }

    fn num_interpreted_variables(&self) -> usize {
        INTERPRETED.len()
    }

    fn interpreted_variable_name(&self, index: usize) -> Option<&'static str> {
        INTERPRETED.get(index).copied()
    }

    fn needs_finish_spatial(&self) -> bool {
        true
    }

    fn needs_interpretation(&self) -> bool {
        true
    }

    #[inline]
    fn accumulate_spatial(&self, value: f64, bin: &mut [f64]) {
        if value > 0.0 {
            let log_value = value.ln();
            bin[slots::SUM] += log_value;
            bin[slots::SUM_SQ] += log_value * log_value;
            bin[slots::COUNT] += 1.0;
        }
    }

    fn finish_spatial(&self, bin: &mut [f64]) {
        finish_weighted_sums(self.weight_coeff, bin);
    }

    fn accumulate_temporal(&self, source: &[f64], target: &mut [f64]) {
        merge_weighted_sums(source, target);
    }

    fn interpret_into(&self, accumulated: &[f64], output: &mut [f64]) {
        let count = accumulated[slots::COUNT];
        let weight = accumulated[slots::WEIGHT];
        if count > 0.0 && weight > 0.0 {
            let inv_weight = 1.0 / weight;
            let avg_log = accumulated[slots::SUM] * inv_weight;
            let var_log = accumulated[slots::SUM_SQ] * inv_weight - avg_log * avg_log;
            let mean = (avg_log + 0.5 * var_log).exp();
            let exp_var = var_log.exp();
            output[0] = mean;
            output[1] = if exp_var >= 1.0 {
                mean * (exp_var - 1.0).sqrt()
            } else {
                -1.0
            };
            output[2] = avg_log.exp();
            output[3] = (avg_log - var_log).exp();
            output[4] = count;
        } else {
            output[..5].fill(0.0);
        }
    }
}
