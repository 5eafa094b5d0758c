//! Random variates consumed by the clinic.
//!
//! The clinic only ever asks for a duration or a yes/no answer and hands over its random source; it never knows
//! which law is behind a sampler. The random source is a [`Pcg64`] seeded from a `u64`, so a replication is
//! reproducible from its seed and the fixed order in which the clinic draws.

use crate::config::{ClinicParameters, ConfigError};
use crate::Hours;

use ordered_float::NotNan;
use rand::distr::Bernoulli;
use rand::RngCore;
use rand_distr::{Distribution, Exp};
pub use rand_pcg::Pcg64;
use std::fmt::Debug;

/// Draws non-negative durations, in hours.
pub trait DurationSampler: Debug {
    fn sample(&self, rng: &mut dyn RngCore) -> f64;
}

/// Draws a boolean attribute.
pub trait FlagSampler: Debug {
    fn sample(&self, rng: &mut dyn RngCore) -> bool;
}

/// Exponentially distributed durations with the given mean.
#[derive(Debug, Clone, Copy)]
pub struct Exponential {
    mean: f64,
    distribution: Exp<f64>,
}

impl Exponential {
    /// # Errors
    ///
    /// The mean must be a positive, finite number.
    pub fn new(mean: f64) -> Result<Self, ConfigError> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(ConfigError::Invalid(format!("mean {mean} must be a positive, finite number")));
        }
        let distribution = Exp::new(1.0 / mean).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Self { mean, distribution })
    }

    /// Mean of the distribution, in hours.
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl DurationSampler for Exponential {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.distribution.sample(rng)
    }
}

/// The same duration every time. Draws nothing from the random source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl DurationSampler for Constant {
    fn sample(&self, _: &mut dyn RngCore) -> f64 {
        self.0
    }
}

impl FlagSampler for Bernoulli {
    fn sample(&self, rng: &mut dyn RngCore) -> bool {
        Distribution::sample(self, rng)
    }
}

/// The four samplers a clinic draws from.
#[derive(Debug)]
pub struct Distributions {
    pub inter_arrival: Box<dyn DurationSampler>,
    pub exam: Box<dyn DurationSampler>,
    pub mh_consult: Box<dyn DurationSampler>,
    pub depression: Box<dyn FlagSampler>,
}

impl Distributions {
    /// Exponential inter-arrival, exam and consultation times with the configured means, and a Bernoulli draw for
    /// depression.
    ///
    /// # Errors
    ///
    /// Fails if any mean is not positive and finite, or the probability lies outside `[0, 1]`.
    pub fn from_parameters(parameters: &ClinicParameters) -> Result<Self, ConfigError> {
        Ok(Self {
            inter_arrival: Box::new(Exponential::new(parameters.mean_arrival_time)?),
            exam: Box::new(Exponential::new(parameters.mean_exam_duration)?),
            mh_consult: Box::new(Exponential::new(parameters.mean_mh_consult)?),
            depression: Box::new(depression_flag(parameters.prob_depression)?),
        })
    }
}

/// Turn a sampled duration into a clock offset.
///
/// # Errors
///
/// Returns [`Error::InvalidDuration`] for NaN or negative durations.
///
/// [`Error::InvalidDuration`]: crate::Error::InvalidDuration
pub(crate) fn checked_delay(what: &'static str, duration: f64) -> crate::Result<Hours> {
    NotNan::new(duration)
        .ok()
        .filter(|delay| delay.into_inner() >= 0.0)
        .ok_or(crate::Error::InvalidDuration { what, value: duration })
}

/// A Bernoulli draw that comes up `true` with the given probability.
///
/// # Errors
///
/// The probability must lie in `[0, 1]`.
pub fn depression_flag(probability: f64) -> Result<Bernoulli, ConfigError> {
    Bernoulli::new(probability)
        .map_err(|_| ConfigError::Invalid(format!("probability {probability} must lie between 0 and 1")))
}
