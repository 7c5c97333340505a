//! Spatial and temporal binners.
//!
//! A [`SpatialBinner`] turns the observations of one pass into completed
//! spatial bins; a [`TemporalBinner`] folds any number of passes into
//! composites and interprets them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use planetary_grid::BinId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bin::{InterpretedBin, SpatialBin, TemporalBin};
use crate::context::BinningContext;
use crate::observation::Observation;

/// Counters of one spatial pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    pub observations_seen: u64,
    pub observations_accepted: u64,
    /// Observations outside the time range, region or current data period.
    pub observations_rejected: u64,
    pub bins: usize,
}

/// Accumulates the observations of one pass into sparse spatial bins.
#[derive(Debug)]
pub struct SpatialBinner {
    context: Arc<BinningContext>,
    bins: HashMap<BinId, SpatialBin>,
    stats: PassStats,
}

impl SpatialBinner {
    pub fn new(context: Arc<BinningContext>) -> Self {
        Self {
            context,
            bins: HashMap::new(),
            stats: PassStats::default(),
        }
    }

    pub fn context(&self) -> &Arc<BinningContext> {
        &self.context
    }

    /// Counters so far; `bins` is the number of bins touched.
    pub fn stats(&self) -> PassStats {
        PassStats {
            bins: self.bins.len(),
            ..self.stats
        }
    }

    /// Bin an observation. Returns `false` if a filter of the context
    /// rejects it.
    pub fn process_observation(&mut self, observation: &Observation) -> bool {
        self.stats.observations_seen += 1;
        let Some(index) = resolve_bin(&self.context, observation) else {
            self.stats.observations_rejected += 1;
            return false;
        };
        self.stats.observations_accepted += 1;

        let manager = self.context.bin_manager();
        let bin = self
            .bins
            .entry(index)
            .or_insert_with(|| manager.create_spatial_bin(index));
        manager.aggregate_spatial(&observation.values, bin);
        true
    }

    /// Bin observations in order.
    pub fn process_observations<'a>(
        &mut self,
        observations: impl IntoIterator<Item = &'a Observation>,
    ) {
        for observation in observations {
            self.process_observation(observation);
        }
    }

    /// Bin a batch of observations on the rayon pool.
    ///
    /// Bins are sharded by id so each shard owns its bins exclusively.
    /// Observations falling into the same bin are accumulated in their
    /// slice order.
    pub fn process_parallel(&mut self, observations: &[Observation]) {
        let context = &self.context;
        let indices: Vec<Option<BinId>> = observations
            .par_iter()
            .map(|obs| resolve_bin(context, obs))
            .collect();

        let accepted = indices.iter().filter(|i| i.is_some()).count() as u64;
        self.stats.observations_seen += observations.len() as u64;
        self.stats.observations_accepted += accepted;
        self.stats.observations_rejected += observations.len() as u64 - accepted;

        let num_shards = rayon::current_num_threads().max(1);
        let mut shards: Vec<HashMap<BinId, SpatialBin>> =
            (0..num_shards).map(|_| HashMap::new()).collect();
        for (index, bin) in self.bins.drain() {
            shards[shard_of(index, num_shards)].insert(index, bin);
        }

        let manager = context.bin_manager();
        let shards: Vec<HashMap<BinId, SpatialBin>> = shards
            .into_par_iter()
            .enumerate()
            .map(|(shard, mut bins)| {
                for (obs, index) in observations.iter().zip(&indices) {
                    let Some(index) = *index else { continue };
                    if shard_of(index, num_shards) != shard {
                        continue;
                    }
                    let bin = bins
                        .entry(index)
                        .or_insert_with(|| manager.create_spatial_bin(index));
                    manager.aggregate_spatial(&obs.values, bin);
                }
                bins
            })
            .collect();

        for bins in shards {
            self.bins.extend(bins);
        }

        debug!(
            observations = observations.len(),
            accepted,
            shards = num_shards,
            bins = self.bins.len(),
            "Processed observation batch"
        );
    }

    /// Finish every bin and return them sorted by id.
    pub fn complete(self) -> (Vec<SpatialBin>, PassStats) {
        let manager = self.context.bin_manager();
        let mut bins: Vec<SpatialBin> = self.bins.into_values().collect();
        bins.par_iter_mut()
            .for_each(|bin| manager.complete_spatial(bin));
        bins.sort_unstable_by_key(|bin| bin.index);

        let stats = PassStats {
            bins: bins.len(),
            ..self.stats
        };
        if bins.is_empty() {
            warn!(
                observations = stats.observations_seen,
                rejected = stats.observations_rejected,
                "Spatial pass produced no bins"
            );
        } else {
            info!(
                observations = stats.observations_seen,
                accepted = stats.observations_accepted,
                rejected = stats.observations_rejected,
                bins = stats.bins,
                "Spatial pass complete"
            );
        }
        (bins, stats)
    }
}

fn resolve_bin(context: &BinningContext, observation: &Observation) -> Option<BinId> {
    context
        .accepts(observation.lat, observation.lon, observation.time)
        .then(|| context.bin_index(observation.lat, observation.lon))
}

#[inline]
fn shard_of(index: BinId, num_shards: usize) -> usize {
    (index % num_shards as u64) as usize
}

/// Folds completed spatial passes into temporal composites.
#[derive(Debug, Clone)]
pub struct TemporalBinner {
    context: Arc<BinningContext>,
    bins: BTreeMap<BinId, TemporalBin>,
    num_passes: u32,
}

impl TemporalBinner {
    pub fn new(context: Arc<BinningContext>) -> Self {
        Self {
            context,
            bins: BTreeMap::new(),
            num_passes: 0,
        }
    }

    pub fn context(&self) -> &Arc<BinningContext> {
        &self.context
    }

    /// Number of passes added, including those of merged composites.
    pub fn num_passes(&self) -> u32 {
        self.num_passes
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, index: BinId) -> Option<&TemporalBin> {
        self.bins.get(&index)
    }

    /// Composites in bin id order.
    pub fn bins(&self) -> impl Iterator<Item = &TemporalBin> {
        self.bins.values()
    }

    pub fn into_bins(self) -> Vec<TemporalBin> {
        self.bins.into_values().collect()
    }

    /// Add the completed bins of one spatial pass.
    pub fn add_pass(&mut self, spatial_bins: &[SpatialBin]) {
        let manager = self.context.bin_manager();
        for spatial in spatial_bins {
            let temporal = self
                .bins
                .entry(spatial.index)
                .or_insert_with(|| manager.create_temporal_bin(spatial.index));
            manager.aggregate_temporal(spatial, temporal);
        }
        self.num_passes += 1;
        debug!(
            pass = self.num_passes,
            pass_bins = spatial_bins.len(),
            composite_bins = self.bins.len(),
            "Added spatial pass"
        );
    }

    /// Fold another composite into this one.
    pub fn merge(&mut self, other: &TemporalBinner) {
        let manager = self.context.bin_manager();
        for source in other.bins.values() {
            let target = self
                .bins
                .entry(source.index)
                .or_insert_with(|| manager.create_temporal_bin(source.index));
            manager.merge_temporal(source, target);
        }
        self.num_passes += other.num_passes;
        debug!(
            merged_bins = other.bins.len(),
            composite_bins = self.bins.len(),
            "Merged temporal composite"
        );
    }

    /// Interpret every composite, sorted by bin id.
    pub fn interpret_all(&self) -> Vec<InterpretedBin> {
        let manager = self.context.bin_manager();
        let bins: Vec<&TemporalBin> = self.bins.values().collect();
        let interpreted: Vec<InterpretedBin> =
            bins.par_iter().map(|bin| manager.interpret(bin)).collect();
        info!(
            bins = interpreted.len(),
            passes = self.num_passes,
            "Interpreted temporal composite"
        );
        interpreted
    }
}
