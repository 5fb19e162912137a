#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod config;
pub mod datum;
pub mod derive;
pub mod error;
pub mod label;
pub mod provider;
pub mod runtime;
pub mod schema;

pub use config::{Cip68Config, Network};
pub use derive::unique_asset_name;
pub use error::{BuilderError, Cip68Error, ProviderError};
pub use provider::ChainQuery;
pub use runtime::aggregate::OutputAggregator;
pub use runtime::burn::{BurnDecision, resolve_burn};
pub use runtime::classify::{AssetState, BatchClassification, classify_batch};
pub use runtime::{Cip68Runtime, InstructionPlan};
pub use schema::asset::*;
pub use schema::instruction::*;
