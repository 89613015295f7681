#![forbid(unsafe_code)]

//! # `mwc_mutants`
//!
//! Bayesian parameter estimation for the MWC model of allosteric transcription
//! factors, applied to repressor mutants measured across inducer
//! concentrations and repressor copy numbers.
//!
//! The crate provides the model functions (active probability, fold-change,
//! Bohr parameter), preprocessing of tidy fold-change tables, the log-prior,
//! log-likelihood and log-posterior evaluated on a sampler's flat parameter
//! vector, walker initialization for ensemble samplers, and posterior
//! summaries. The sampler itself is external: any driver reaches the model
//! through [`LogDensity`].
//!
//! ## Feature flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) during preprocessing, walker setup and ensemble evaluation | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod inference;
pub mod input;
pub mod models;
pub mod preprocess;
pub mod utils;

pub use inference::{InferenceError, LogDensity, evaluate_ensemble};
pub use input::{InputError, Observation, ObservationTable};
pub mod matrix_ops {
    pub use crate::models::matrix_ops::*;
}

pub use models::thermo::{
    MwcConstants, ThermoError, active_probability, active_probability_limits,
    active_probability_scalar, bohr_parameter, fold_change, fold_change_scalar,
};

pub use models::mwc::{
    EnergyPrior, FlatChain, McmcData, McmcError, McmcInput, MwcPosterior, MwcPriorConfig,
    NOISE_SCALE_NAME, ParameterLayout, ParameterSet, ParameterSummary, PosteriorConfig,
    UniqueVariables, WalkerConfig, energy_name, fold_change_credible_region, hpd, init_walkers,
    log_likelihood, log_likelihood_flat, log_post, log_post_ensemble, log_post_flat, log_prior,
    log_prior_flat, mcmc_pre_process, render_summary_table, summarize_chain,
};
