//! # Installation Guard Core
//!
//! This crate keeps a GitHub App installation's repository list in line with
//! each organization's `sensitive` custom repository property.
//!
//! ## Overview
//!
//! A run goes through these steps:
//! 1. Validate the raw inputs into a [`Config`]
//! 2. Build one [`OwnerContext`] per configured owner
//! 3. For each owner, strictly one after another:
//!    - list the non-archived repositories and their custom property values
//!    - split them into sensitive and non-sensitive repositories
//!    - add non-sensitive repositories to the installation (`sync` mode only)
//!    - remove sensitive repositories from the installation
//! 4. Report every owner's status in a [`RunResult`]
//!
//! Failures inside an owner never abort the run; they mark that owner as
//! [`OwnerStatus::Failure`] and the driver moves on to the next owner.
//!
//! ## Examples
//!
//! ```no_run
//! use installation_guard_core::{
//!     build_owner_contexts, run, Config, ConfigInputs, RotatingClientFactory,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_inputs(ConfigInputs {
//!     classic_pats: Some(json!(["ghp_..."])),
//!     owners: Some(json!([
//!         { "login": "acme", "installId": 1, "fineGrainedPat": "github_pat_..." }
//!     ])),
//!     ..ConfigInputs::default()
//! })?;
//!
//! let factory = RotatingClientFactory::new(&config);
//! let contexts = build_owner_contexts(&config, &factory)?;
//! let result = run(&contexts, config.mode).await;
//! result.log_summary();
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod context;
pub mod errors;
pub mod reconciler;
pub mod run;

#[cfg(test)]
mod test_support;

pub use classifier::{classify, Classification, Repo};
pub use config::{parse_json_input, Config, ConfigInputs, Owner, SyncMode};
pub use context::{build_owner_contexts, ClientFactory, OwnerContext, RotatingClientFactory};
pub use errors::{ConfigError, Error, GuardResult, ValidationErrors, ValidationIssue};
pub use reconciler::{reconcile, ReconcileReport};
pub use run::{run, run_owner, OwnerStatus, RunResult};
