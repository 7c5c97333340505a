//! Per-variable bin layout and the bin lifecycle operations.

use planetary_grid::BinId;

use crate::algorithm::{Algorithm, BinAlgorithm};
use crate::bin::{InterpretedBin, SpatialBin, TemporalBin};
use crate::error::{BinningError, Result};
use crate::variable::VariableContext;

/// Applies one algorithm to every variable of an observation.
///
/// Each variable owns `algorithm.num_accumulated_variables()` consecutive
/// slots of a bin's feature vector, in variable index order.
#[derive(Debug, Clone, PartialEq)]
pub struct BinManager {
    algorithm: Algorithm,
    variable_names: Vec<String>,
    super_sampling: u32,
}

impl BinManager {
    pub fn new(variables: &VariableContext, algorithm: Algorithm, super_sampling: u32) -> Result<Self> {
        if super_sampling < 1 {
            return Err(BinningError::invalid_parameter(
                "super_sampling",
                "must be at least 1",
            ));
        }
        Ok(Self {
            algorithm,
            variable_names: variables.names().map(str::to_string).collect(),
            super_sampling,
        })
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    pub fn variable_count(&self) -> usize {
        self.variable_names.len()
    }

    pub fn super_sampling(&self) -> u32 {
        self.super_sampling
    }

    /// Sub-pixel offsets in `(0, 1)` used when super-sampling a pixel.
    pub fn super_sampling_steps(&self) -> Vec<f64> {
        let n = self.super_sampling as f64;
        (0..self.super_sampling)
            .map(|i| (i as f64 + 0.5) / n)
            .collect()
    }

    /// Length of a spatial or temporal feature vector.
    pub fn accumulated_feature_count(&self) -> usize {
        self.variable_count() * self.algorithm.num_accumulated_variables()
    }

    /// Length of an interpreted value vector.
    pub fn interpreted_feature_count(&self) -> usize {
        self.variable_count() * self.algorithm.num_interpreted_variables()
    }

    /// Feature names of accumulated bins, e.g. `chl_sum`.
    pub fn accumulated_feature_names(&self) -> Vec<String> {
        self.feature_names(
            self.algorithm.num_accumulated_variables(),
            |i| self.algorithm.accumulated_variable_name(i),
        )
    }

    /// Feature names of interpreted bins, e.g. `chl_mean`.
    pub fn interpreted_feature_names(&self) -> Vec<String> {
        self.feature_names(
            self.algorithm.num_interpreted_variables(),
            |i| self.algorithm.interpreted_variable_name(i),
        )
    }

    fn feature_names<'a>(
        &'a self,
        per_variable: usize,
        name: impl Fn(usize) -> Option<&'static str> + 'a,
    ) -> Vec<String> {
        let mut names = Vec::with_capacity(self.variable_count() * per_variable);
        for variable in &self.variable_names {
            for i in 0..per_variable {
                names.push(format!("{}_{}", variable, name(i).unwrap_or("value")));
            }
        }
        names
    }

    pub fn create_spatial_bin(&self, index: BinId) -> SpatialBin {
        SpatialBin::new(index, self.accumulated_feature_count())
    }

    /// Accumulate the values of one observation. Missing or non-finite
    /// values leave their variable's slots untouched.
    pub fn aggregate_spatial(&self, values: &[f64], bin: &mut SpatialBin) {
        let width = self.algorithm.num_accumulated_variables();
        for (i, slots) in bin.features.chunks_exact_mut(width).enumerate() {
            match values.get(i) {
                Some(&value) if value.is_finite() => {
                    self.algorithm.accumulate_spatial(value, slots)
                }
                _ => {}
            }
        }
        bin.num_obs += 1;
    }

    /// Close a spatial bin at the end of its pass.
    pub fn complete_spatial(&self, bin: &mut SpatialBin) {
        if !self.algorithm.needs_finish_spatial() {
            return;
        }
        let width = self.algorithm.num_accumulated_variables();
        for slots in bin.features.chunks_exact_mut(width) {
            self.algorithm.finish_spatial(slots);
        }
    }

    pub fn create_temporal_bin(&self, index: BinId) -> TemporalBin {
        TemporalBin::new(index, self.accumulated_feature_count())
    }

    /// Add a completed spatial bin to a composite as one more pass.
    pub fn aggregate_temporal(&self, spatial: &SpatialBin, temporal: &mut TemporalBin) {
        self.merge_features(&spatial.features, &mut temporal.features);
        temporal.num_obs += spatial.num_obs;
        temporal.num_passes += 1;
    }

    /// Fold the composite `source` into `target`.
    pub fn merge_temporal(&self, source: &TemporalBin, target: &mut TemporalBin) {
        self.merge_features(&source.features, &mut target.features);
        target.num_obs += source.num_obs;
        target.num_passes += source.num_passes;
    }

    fn merge_features(&self, source: &[f64], target: &mut [f64]) {
        let width = self.algorithm.num_accumulated_variables();
        for (src, dst) in source.chunks_exact(width).zip(target.chunks_exact_mut(width)) {
            self.algorithm.accumulate_temporal(src, dst);
        }
    }

    pub fn interpret(&self, temporal: &TemporalBin) -> InterpretedBin {
        let in_width = self.algorithm.num_accumulated_variables();
        let out_width = self.algorithm.num_interpreted_variables();
        let mut values = vec![0.0; self.interpreted_feature_count()];
        for (src, dst) in temporal
            .features
            .chunks_exact(in_width)
            .zip(values.chunks_exact_mut(out_width))
        {
            self.algorithm.interpret_into(src, dst);
        }
        InterpretedBin {
            index: temporal.index,
            num_obs: temporal.num_obs,
            num_passes: temporal.num_passes,
            values,
        }
    }
}
