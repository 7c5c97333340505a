//! Weighted arithmetic mean ("AME").

use super::{check_weight_coeff, finish_weighted_sums, merge_weighted_sums, slots, BinAlgorithm};
use crate::error::Result;

const ACCUMULATED: [&str; 4] = ["sum", "sum_sq", "count", "weight"];
const INTERPRETED: [&str; 3] = ["mean", "sigma", "count"];

/// Arithmetic mean with per-pass weighting `count^weight_coeff`.
///
/// A coefficient of 1 weights every observation equally across passes; 0
/// weights every pass equally regardless of its observation count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArithmeticMean {
    weight_coeff: f64,
}

impl ArithmeticMean {
    pub fn new(weight_coeff: f64) -> Result<Self> {
        Ok(Self {
            weight_coeff: check_weight_coeff(weight_coeff)?,
        })
    }

    pub fn weight_coeff(&self) -> f64 {
        self.weight_coeff
    }
}

impl BinAlgorithm for ArithmeticMean {
    fn name(&self) -> &'static str {
        "AME"
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
        bin[slots::SUM] += value;
        bin[slots::SUM_SQ] += value * value;
        bin[slots::COUNT] += 1.0;
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
            let mean = accumulated[slots::SUM] * inv_weight;
            let variance = accumulated[slots::SUM_SQ] * inv_weight - mean * mean;
            output[0] = mean;
            output[1] = if variance > 0.0 { variance.sqrt() } else { -1.0 };
            output[2] = count;
        } else {
            output[..3].fill(0.0);
        }
    }
}
