//! Observations fed into the binner.

use serde::{Deserialize, Serialize};

/// A single geolocated measurement vector.
///
/// `values` is ordered like the variables of the
/// [`VariableContext`](crate::VariableContext); `time` is a Modified Julian
/// Date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub lat: f64,
    pub lon: f64,
    pub time: f64,
    pub values: Vec<f64>,
}

impl Observation {
    pub fn new(lat: f64, lon: f64, time: f64, values: Vec<f64>) -> Self {
        Self {
            lat,
            lon,
            time,
            values,
        }
    }

    /// Value of the variable at `index`, if present.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}
