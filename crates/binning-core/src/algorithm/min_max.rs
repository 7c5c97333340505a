//! Value range ("MIN_MAX").

use super::BinAlgorithm;

const NAMES: [&str; 3] = ["min", "max", "count"];

const MIN: usize = 0;
const MAX: usize = 1;
const COUNT: usize = 2;

/// Tracks the minimum and maximum observed value. The accumulated vector is
/// its own output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinMax;

impl BinAlgorithm for MinMax {
    fn name(&self) -> &'static str {
        "MIN_MAX"
    }

    fn num_accumulated_variables(&self) -> usize {
        NAMES.len()
    }

    fn accumulated_variable_name(&self, index: usize) -> Option<&'static str> {
        NAMES.get(index).copied()
    }

    fn num_interpreted_variables(&self) -> usize {
        NAMES.len()
    }

    fn interpreted_variable_name(&self, index: usize) -> Option<&'static str> {
        NAMES.get(index).copied()
    }

    fn needs_finish_spatial(&self) -> bool {
        false
    }

    fn needs_interpretation(&self) -> bool {
        false
    }

    #[inline]
    fn accumulate_spatial(&self, value: f64, bin: &mut [f64]) {
        if bin[COUNT] == 0.0 {
            bin[MIN] = value;
            bin[MAX] = value;
        } else {
            bin[MIN] = bin[MIN].min(value);
            bin[MAX] = bin[MAX].max(value);
        }
        bin[COUNT] += 1.0;
    }

    fn finish_spatial(&self, _bin: &mut [f64]) {}

    fn accumulate_temporal(&self, source: &[f64], target: &mut [f64]) {
        if source[COUNT] <= 0.0 {
            return;
        }
        if target[COUNT] == 0.0 {
            target[MIN] = source[MIN];
            target[MAX] = source[MAX];
        } else {
            target[MIN] = target[MIN].min(source[MIN]);
            target[MAX] = target[MAX].max(source[MAX]);
        }
        target[COUNT] += source[COUNT];
    }

    fn interpret_into(&self, accumulated: &[f64], output: &mut [f64]) {
        output[..NAMES.len()].copy_from_slice(&accumulated[..NAMES.len()]);
    }
}
