//! Binning run configuration.
//!
//! Configuration is plain data, deserialised from YAML or JSON text and
//! optionally overridden from the environment. Reading files is left to the
//! caller.
//!
//! ```yaml
//! grid:
//!   type: sea
//!   num_rows: 2160
//! variables:
//!   - name: chl
//!   - name: tsm
//!     expression: "exp(b5)"
//! algorithm:
//!   name: AME
//!   weight_coeff: "0.5"
//! super_sampling: 3
//! data_period:
//!   start_date: 2024-06-01
//!   duration_days: 1
//! start_date: 2024-06-01
//! end_date: 2024-06-30
//! region: [[-6, 30], [36, 30], [36, 46], [-6, 46]]
//! ```

use std::sync::Arc;

use planetary_grid::{GridDefinition, Region};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::algorithm::{Algorithm, BinAlgorithm, DEFAULT_WEIGHT_COEFF};
use crate::bin_manager::BinManager;
use crate::context::{BinningContext, CompositingType};
use crate::data_period::{parse_date_mjd, DataPeriod, TimeRange};
use crate::error::{BinningError, Result};
use crate::variable::VariableContext;

/// Complete configuration of a binning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Grid topology and resolution.
    #[serde(default)]
    pub grid: GridDefinition,

    /// Variables carried by each observation, in value order.
    pub variables: Vec<VariableConfig>,

    /// Pixel validity expression, evaluated by the observation producer.
    #[serde(default)]
    pub valid_mask_expression: Option<String>,

    #[serde(default)]
    pub algorithm: AlgorithmConfig,

    #[serde(default)]
    pub compositing_type: CompositingType,

    /// Sub-pixel oversampling factor (>= 1).
    #[serde(default = "default_super_sampling")]
    pub super_sampling: u32,

    /// Temporal window used to reject observations of other data days.
    #[serde(default)]
    pub data_period: Option<DataPeriodConfig>,

    /// First date of the product range (`YYYY-MM-DD`).
    #[serde(default)]
    pub start_date: Option<String>,

    /// Last date of the product range (`YYYY-MM-DD`), inclusive.
    #[serde(default)]
    pub end_date: Option<String>,

    /// Polygon of `[lon, lat]` vertices; observations outside are dropped.
    #[serde(default)]
    pub region: Option<Region>,
}

fn default_super_sampling() -> u32 {
    1
}

/// A variable definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub name: String,
    #[serde(default)]
    pub expression: Option<String>,
}

/// Algorithm selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// `AME`, `ML` or `MIN_MAX`.
    #[serde(default = "default_algorithm_name")]
    pub name: String,

    /// Weight coefficient of the mean-based algorithms, kept as text and
    /// parsed when the algorithm is built.
    #[serde(default, deserialize_with = "string_or_number")]
    pub weight_coeff: Option<String>,
}

fn default_algorithm_name() -> String {
    "AME".to_string()
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            name: default_algorithm_name(),
            weight_coeff: None,
        }
    }
}

impl AlgorithmConfig {
    pub fn build(&self) -> Result<Algorithm> {
        Algorithm::from_name(&self.name, self.weight_coeff.as_deref())
    }
}

/// Data period settings. The start is either a date or an MJD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPeriodConfig {
    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub start_mjd: Option<f64>,

    #[serde(default = "default_duration_days")]
    pub duration_days: f64,

    /// Hour at which the data day begins at longitude -180.
    #[serde(default)]
    pub min_data_hour: f64,
}

fn default_duration_days() -> f64 {
    1.0
}

impl DataPeriodConfig {
    pub fn build(&self) -> Result<DataPeriod> {
        let start_time = match (&self.start_date, self.start_mjd) {
            (Some(date), None) => parse_date_mjd(date)?,
            (None, Some(mjd)) => mjd,
            (Some(_), Some(_)) => {
                return Err(BinningError::invalid_config(
                    "data_period: give either start_date or start_mjd, not both",
                ))
            }
            (None, None) => {
                return Err(BinningError::invalid_config(
                    "data_period: start_date or start_mjd is required",
                ))
            }
        };
        DataPeriod::new(start_time, self.duration_days, self.min_data_hour)
    }
}

/// Accepts `weight_coeff: 0.5` as well as `weight_coeff: "0.5"`.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(value) => value.to_string(),
    }))
}

impl BinningConfig {
    /// Configuration with one variable per name and defaults elsewhere.
    pub fn with_variables<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            grid: GridDefinition::default(),
            variables: names
                .iter()
                .map(|name| VariableConfig {
                    name: name.as_ref().to_string(),
                    expression: None,
                })
                .collect(),
            valid_mask_expression: None,
            algorithm: AlgorithmConfig::default(),
            compositing_type: CompositingType::default(),
            super_sampling: default_super_sampling(),
            data_period: None,
            start_date: None,
            end_date: None,
            region: None,
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply overrides from `BINNING_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup:
    ///
    /// - `BINNING_NUM_ROWS`: grid row count
    /// - `BINNING_SUPER_SAMPLING`: super-sampling factor
    /// - `BINNING_ALGORITHM`: algorithm name
    /// - `BINNING_WEIGHT_COEFF`: weight coefficient
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BINNING_NUM_ROWS") {
            let rows = val.trim().parse().map_err(|_| {
                BinningError::invalid_parameter("BINNING_NUM_ROWS", format!("not an integer: '{}'", val))
            })?;
            self.grid = self.grid.clone().with_num_rows(rows);
        }

        if let Some(val) = lookup("BINNING_SUPER_SAMPLING") {
            self.super_sampling = val.trim().parse().map_err(|_| {
                BinningError::invalid_parameter(
                    "BINNING_SUPER_SAMPLING",
                    format!("not an integer: '{}'", val),
                )
            })?;
        }

        if let Some(val) = lookup("BINNING_ALGORITHM") {
            self.algorithm.name = val.trim().to_string();
        }

        if let Some(val) = lookup("BINNING_WEIGHT_COEFF") {
            self.algorithm.weight_coeff = Some(val.trim().to_string());
        }

        Ok(())
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        let num_rows = self.grid.num_rows();
        if num_rows <= 2 {
            return Err(BinningError::invalid_config(format!(
                "grid must have more than 2 rows, got {}",
                num_rows
            )));
        }

        if self.super_sampling < 1 {
            return Err(BinningError::invalid_config("super_sampling must be >= 1"));
        }

        if self.variables.is_empty() {
            return Err(BinningError::invalid_config("at least one variable is required"));
        }

        if let Some(name) = self
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .find(|name| name.trim().is_empty())
        {
            return Err(BinningError::invalid_config(format!(
                "variable names must not be empty: '{}'",
                name
            )));
        }

        self.time_range()?;

        if let Some(period) = &self.data_period {
            if period.duration_days.is_nan() || period.duration_days <= 0.0 {
                return Err(BinningError::invalid_config(format!(
                    "data_period.duration_days must be > 0, got {}",
                    period.duration_days
                )));
            }
        }

        Ok(())
    }

    /// Product time range spanned by `start_date` and `end_date`.
    pub fn time_range(&self) -> Result<Option<TimeRange>> {
        TimeRange::from_dates(self.start_date.as_deref(), self.end_date.as_deref())
    }

    /// Variable context of the configured variables.
    pub fn variable_context(&self) -> VariableContext {
        let mut variables = VariableContext::new();
        for variable in &self.variables {
            variables.define_variable(&variable.name, variable.expression.as_deref());
        }
        variables.set_valid_mask_expression(self.valid_mask_expression.as_deref());
        variables
    }

    /// Validate and build the context of a binning run.
    pub fn create_binning_context(&self) -> Result<BinningContext> {
        self.validate()?;

        let grid = self.grid.build()?;
        let variables = self.variable_context();
        let algorithm = self.algorithm.build()?;
        let bin_manager = BinManager::new(&variables, algorithm, self.super_sampling)?;

        let mut context =
            BinningContext::new(Arc::clone(&grid), variables, bin_manager, self.compositing_type);
        if let Some(period) = &self.data_period {
            let period = period.build()?;
            debug!(
                start = period.start_time(),
                duration_days = period.duration_days(),
                min_data_hour = period.min_data_hour(),
                "Configured data period"
            );
            context = context.with_data_period(period);
        }
        if let Some(range) = self.time_range()? {
            debug!(start = range.start(), end = range.end(), "Configured time range");
            context = context.with_time_range(range);
        }
        if let Some(region) = &self.region {
            debug!(vertices = region.vertices().len(), "Configured region");
            context = context.with_region(region.clone());
        }

        info!(
            grid = grid.name(),
            num_rows = grid.num_rows(),
            num_bins = grid.num_bins(),
            algorithm = algorithm.name(),
            variables = self.variables.len(),
            super_sampling = self.super_sampling,
            "Created binning context"
        );
        Ok(context)
    }

    /// Weight coefficient that will be used, if it parses.
    pub fn effective_weight_coeff(&self) -> Option<f64> {
        match &self.algorithm.weight_coeff {
            Some(text) => text.trim().parse().ok(),
            None => Some(DEFAULT_WEIGHT_COEFF),
        }
    }
}
