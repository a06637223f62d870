//! Crate entrypoint: an ACME DNS-01 solver for zones hosted at Abion.
//!
//! [`solver::ChallengeSolver`] presents and cleans up `_acme-challenge` TXT records
//! through [`abion::client::AbionClient`], which speaks the zone API's JSON Merge
//! Patch dialect.

pub mod abion;
pub mod config;
pub mod error;
pub mod solver;
pub mod validation;

pub use abion::ZoneApi;
pub use abion::client::AbionClient;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, SolverError};
pub use solver::{ChallengeRequest, ChallengeSolver};
