//! MWC induction model of repressor mutants.
//!
//! Bayesian inference of the repressor-operator binding energy of each mutant
//! from fold-change titrations. The module prepares a tidy table for
//! sampling, evaluates the prior, likelihood and posterior on the sampler's
//! flat parameter vector, scatters initial walkers, and summarizes the
//! resulting chain.

pub mod input;
pub mod likelihood;
pub mod posterior;
pub mod priors;
pub mod summary;
pub mod types;
pub mod walkers;

pub use input::{McmcData, McmcInput, mcmc_pre_process};
pub use likelihood::{log_likelihood, log_likelihood_flat};
pub use posterior::{MwcPosterior, log_post, log_post_ensemble, log_post_flat};
pub use priors::{EnergyPrior, MwcPriorConfig, log_prior, log_prior_flat};
pub use summary::{
    FlatChain, ParameterSummary, fold_change_credible_region, hpd, render_summary_table,
    summarize_chain,
};
pub use types::{
    McmcError, NOISE_SCALE_NAME, ParameterLayout, ParameterSet, PosteriorConfig, UniqueVariables,
    energy_name,
};
pub use walkers::{WalkerConfig, init_walkers};
