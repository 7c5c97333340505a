//! The handle passed through a binning pipeline.

use std::sync::Arc;

use planetary_grid::{BinId, PlanetaryGrid, Region};
use serde::{Deserialize, Serialize};

use crate::bin_manager::BinManager;
use crate::data_period::{DataPeriod, DataPeriodMembership, TimeRange};
use crate::variable::VariableContext;

/// How pixels are turned into observations.
///
/// The binner itself treats both alike; the flag is read by the pixel
/// iteration that feeds it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositingType {
    /// Observations are accumulated into statistics.
    #[default]
    #[serde(alias = "binning")]
    Binning,
    /// Observations are projected and the latest one wins.
    #[serde(alias = "mosaicking")]
    Mosaicking,
}

/// Grid, variables, bin manager and the filters of a binning run.
#[derive(Debug, Clone)]
pub struct BinningContext {
    grid: Arc<dyn PlanetaryGrid>,
    variables: VariableContext,
    bin_manager: BinManager,
    compositing_type: CompositingType,
    data_period: Option<DataPeriod>,
    time_range: Option<TimeRange>,
    region: Option<Region>,
}

impl BinningContext {
    pub fn new(
        grid: Arc<dyn PlanetaryGrid>,
        variables: VariableContext,
        bin_manager: BinManager,
        compositing_type: CompositingType,
    ) -> Self {
        Self {
            grid,
            variables,
            bin_manager,
            compositing_type,
            data_period: None,
            time_range: None,
            region: None,
        }
    }

    pub fn with_data_period(mut self, data_period: DataPeriod) -> Self {
        self.data_period = Some(data_period);
        self
    }

    /// Only observations within `time_range` are binned.
    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    /// Only observations inside `region` are binned.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn grid(&self) -> &Arc<dyn PlanetaryGrid> {
        &self.grid
    }

    pub fn variables(&self) -> &VariableContext {
        &self.variables
    }

    pub fn bin_manager(&self) -> &BinManager {
        &self.bin_manager
    }

    pub fn compositing_type(&self) -> CompositingType {
        self.compositing_type
    }

    pub fn data_period(&self) -> Option<&DataPeriod> {
        self.data_period.as_ref()
    }

    pub fn time_range(&self) -> Option<&TimeRange> {
        self.time_range.as_ref()
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Whether an observation passes the time range, region and data
    /// period filters.
    pub fn accepts(&self, lat: f64, lon: f64, time: f64) -> bool {
        if let Some(range) = &self.time_range {
            if !range.contains(time) {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if !region.contains(lon, lat) {
                return false;
            }
        }
        match &self.data_period {
            Some(period) => {
                period.membership(lon, time) == DataPeriodMembership::CurrentPeriod
            }
            None => true,
        }
    }

    pub fn super_sampling(&self) -> u32 {
        self.bin_manager.super_sampling()
    }

    /// Bin containing a geographic point.
    pub fn bin_index(&self, lat: f64, lon: f64) -> BinId {
        self.grid.bin_index(lat, lon)
    }
}
