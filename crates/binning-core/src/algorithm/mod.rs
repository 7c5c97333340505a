//! Accumulation algorithms.
//!
//! An algorithm defines the layout of a bin vector and its lifecycle:
//!
//! ```text
//! zeros ─► accumulate_spatial* ─► finish_spatial ─► accumulate_temporal* ─► interpret
//!                                 (if needed)                              (if needed)
//! ```
//!
//! The set of algorithms is closed; [`Algorithm`] is selected by name once
//! at configuration time and dispatches to the concrete strategy.

mod mean;
mod min_max;
mod mle;

pub use mean::ArithmeticMean;
pub use min_max::MinMax;
pub use mle::MaximumLikelihood;

use serde::{Deserialize, Serialize};

use crate::error::{BinningError, Result};

/// Weight coefficient used when none is configured.
pub const DEFAULT_WEIGHT_COEFF: f64 = 0.5;

/// Operations every accumulation strategy provides.
///
/// Bins are plain `f64` slices of length
/// [`num_accumulated_variables`](Self::num_accumulated_variables), zeroed on
/// creation. None of the operations fail: degenerate statistics are reported
/// through sentinel values.
pub trait BinAlgorithm {
    /// Configuration name, e.g. `"AME"`.
    fn name(&self) -> &'static str;

    fn num_accumulated_variables(&self) -> usize;

    fn accumulated_variable_name(&self, index: usize) -> Option<&'static str>;

    fn num_interpreted_variables(&self) -> usize;

    fn interpreted_variable_name(&self, index: usize) -> Option<&'static str>;

    /// Whether [`finish_spatial`](Self::finish_spatial) must run after a pass.
    fn needs_finish_spatial(&self) -> bool;

    /// Whether [`interpret`](Self::interpret) transforms the accumulated
    /// vector. If not, the accumulated vector is the output.
    fn needs_interpretation(&self) -> bool;

    /// Add one observed value to a spatial bin.
    fn accumulate_spatial(&self, value: f64, bin: &mut [f64]);

    /// Normalise a spatial bin once its pass is complete.
    fn finish_spatial(&self, bin: &mut [f64]);

    /// Merge `source` into `target`. `source` is left untouched.
    fn accumulate_temporal(&self, source: &[f64], target: &mut [f64]);

    /// Write the output quantities of `accumulated` into `output`, which has
    /// length [`num_interpreted_variables`](Self::num_interpreted_variables).
    fn interpret_into(&self, accumulated: &[f64], output: &mut [f64]);

    /// Output quantities of an accumulated bin.
    fn interpret(&self, accumulated: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; self.num_interpreted_variables()];
        self.interpret_into(accumulated, &mut output);
        output
    }

    /// A zeroed bin vector.
    fn create_bin(&self) -> Vec<f64> {
        vec![0.0; self.num_accumulated_variables()]
    }
}

/// The configured accumulation strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
    ArithmeticMean(ArithmeticMean),
    MaximumLikelihood(MaximumLikelihood),
    MinMax(MinMax),
}

/// Algorithm name as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmKind {
    #[serde(rename = "AME")]
    ArithmeticMean,
    #[serde(rename = "ML", alias = "MLE")]
    MaximumLikelihood,
    #[serde(rename = "MIN_MAX")]
    MinMax,
}

impl AlgorithmKind {
    /// Parse a configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_uppercase().as_str() {
            "AME" => Ok(Self::ArithmeticMean),
            "ML" | "MLE" => Ok(Self::MaximumLikelihood),
            "MIN_MAX" | "MINMAX" => Ok(Self::MinMax),
            _ => Err(BinningError::UnknownAlgorithm(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArithmeticMean => "AME",
            Self::MaximumLikelihood => "ML",
            Self::MinMax => "MIN_MAX",
        }
    }
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Algorithm {
    /// Select an algorithm by name.
    ///
    /// `weight_coeff` is the textual weight coefficient of the mean-based
    /// algorithms; it is ignored by `MIN_MAX` and defaults to
    /// [`DEFAULT_WEIGHT_COEFF`].
    pub fn from_name(name: &str, weight_coeff: Option<&str>) -> Result<Self> {
        let kind = AlgorithmKind::from_name(name)?;
        let weight_coeff = match weight_coeff {
            Some(text) => parse_weight_coeff(text)?,
            None => DEFAULT_WEIGHT_COEFF,
        };
        Self::new(kind, weight_coeff)
    }

    /// Create an algorithm of the given kind.
    pub fn new(kind: AlgorithmKind, weight_coeff: f64) -> Result<Self> {
        Ok(match kind {
            AlgorithmKind::ArithmeticMean => {
                Algorithm::ArithmeticMean(ArithmeticMean::new(weight_coeff)?)
            }
            AlgorithmKind::MaximumLikelihood => {
                Algorithm::MaximumLikelihood(MaximumLikelihood::new(weight_coeff)?)
            }
            AlgorithmKind::MinMax => Algorithm::MinMax(MinMax),
        })
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::ArithmeticMean(_) => AlgorithmKind::ArithmeticMean,
            Algorithm::MaximumLikelihood(_) => AlgorithmKind::MaximumLikelihood,
            Algorithm::MinMax(_) => AlgorithmKind::MinMax,
        }
    }

    fn strategy(&self) -> &dyn BinAlgorithm {
        match self {
            Algorithm::ArithmeticMean(a) => a,
            Algorithm::MaximumLikelihood(a) => a,
            Algorithm::MinMax(a) => a,
        }
    }
}

impl BinAlgorithm for Algorithm {
    fn name(&self) -> &'static str {
        self.strategy().name()
    }

    fn num_accumulated_variables(&self) -> usize {
        self.strategy().num_accumulated_variables()
    }

    fn accumulated_variable_name(&self, index: usize) -> Option<&'static str> {
        self.strategy().accumulated_variable_name(index)
    }

    fn num_interpreted_variables(&self) -> usize {
        self.strategy().num_interpreted_variables()
    }

    fn interpreted_variable_name(&self, index: usize) -> Option<&'static str> {
        self.strategy().interpreted_variable_name(index)
    }

    fn needs_finish_spatial(&self) -> bool {
        self.strategy().needs_finish_spatial()
    }

    fn needs_interpretation(&self) -> bool {
        self.strategy().needs_interpretation()
    }

    #[inline]
    fn accumulate_spatial(&self, value: f64, bin: &mut [f64]) {
        self.strategy().accumulate_spatial(value, bin)
    }

    fn finish_spatial(&self, bin: &mut [f64]) {
        self.strategy().finish_spatial(bin)
    }

    fn accumulate_temporal(&self, source: &[f64], target: &mut [f64]) {
        self.strategy().accumulate_temporal(source, target)
    }

    fn interpret_into(&self, accumulated: &[f64], output: &mut [f64]) {
        self.strategy().interpret_into(accumulated, output)
    }
}

/// Parse a textual weight coefficient.
pub fn parse_weight_coeff(text: &str) -> Result<f64> {
    let value: f64 = text.trim().parse().map_err(|_| {
        BinningError::invalid_parameter("weight_coeff", format!("not a number: '{}'", text))
    })?;
    check_weight_coeff(value)
}

pub(crate) fn check_weight_coeff(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BinningError::invalid_parameter(
            "weight_coeff",
            format!("must be finite, got {}", value),
        ))
    }
}

/// Shared slot layout of the mean-based algorithms.
pub(crate) mod slots {
    pub const SUM: usize = 0;
    pub const SUM_SQ: usize = 1;
    pub const COUNT: usize = 2;
    pub const WEIGHT: usize = 3;
}

/// Weighting of a finished spatial pass: scales the sums by
/// `count^(c - 1)` and stores `count^c` as the pass weight.
pub(crate) fn finish_weighted_sums(weight_coeff: f64, bin: &mut [f64]) {
    let count = bin[slots::COUNT];
    if count > 0.0 {
        let weight = count.powf(weight_coeff);
        let norm = count.powf(weight_coeff - 1.0);
        bin[slots::SUM] *= norm;
        bin[slots::SUM_SQ] *= norm;
        bin[slots::WEIGHT] = weight;
    }
}

/// Component-wise merge of weighted sums for non-empty sources.
pub(crate) fn merge_weighted_sums(source: &[f64], target: &mut [f64]) {
    if source[slots::COUNT] > 0.0 {
        target[slots::SUM] += source[slots::SUM];
        target[slots::SUM_SQ] += source[slots::SUM_SQ];
        target[slots::COUNT] += source[slots::COUNT];
        target[slots::WEIGHT] += source[slots::WEIGHT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            Algorithm::from_name("AME", None).unwrap().kind(),
            AlgorithmKind::ArithmeticMean
        );
        assert_eq!(
            Algorithm::from_name("ml", Some("1.0")).unwrap().kind(),
            AlgorithmKind::MaximumLikelihood
        );
        assert_eq!(
            Algorithm::from_name("MLE", None).unwrap().kind(),
            AlgorithmKind::MaximumLikelihood
        );
        assert_eq!(
            Algorithm::from_name("MIN_MAX", Some("ignored?")).unwrap_err().to_string(),
            "invalid parameter value for 'weight_coeff': not a number: 'ignored?'"
        );
        assert_eq!(
            Algorithm::from_name("min_max", None).unwrap().kind(),
            AlgorithmKind::MinMax
        );
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = Algorithm::from_name("MEDIAN", None).unwrap_err();
        assert!(matches!(err, BinningError::UnknownAlgorithm(ref n) if n == "MEDIAN"));
    }

    #[test]
    fn test_invalid_weight_coeff() {
        let err = Algorithm::from_name("AME", Some("abc")).unwrap_err();
        assert!(matches!(err, BinningError::InvalidParameter { .. }));
        assert!(parse_weight_coeff("inf").is_err());
        assert_eq!(parse_weight_coeff(" 0.25 ").unwrap(), 0.25);
    }

    #[test]
    fn test_layout_sizes() {
        let ame = Algorithm::from_name("AME", None).unwrap();
        assert_eq!(ame.num_accumulated_variables(), 4);
        assert_eq!(ame.num_interpreted_variables(), 3);

        let ml = Algorithm::from_name("ML", None).unwrap();
        assert_eq!(ml.num_accumulated_variables(), 4);
        assert_eq!(ml.num_interpreted_variables(), 5);
        assert_eq!(ml.interpreted_variable_name(3), Some("mode"));

        let min_max = Algorithm::from_name("MIN_MAX", None).unwrap();
        assert_eq!(min_max.num_accumulated_variables(), 3);
        assert!(!min_max.needs_finish_spatial());
        assert!(!min_max.needs_interpretation());
        assert_eq!(min_max.create_bin(), vec![0.0; 3]);
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: AlgorithmKind = serde_json::from_str("\"MLE\"").unwrap();
        assert_eq!(kind, AlgorithmKind::MaximumLikelihood);
        assert_eq!(serde_json::to_string(&AlgorithmKind::MinMax).unwrap(), "\"MIN_MAX\"");
    }
}
