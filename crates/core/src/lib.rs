//! sparkdwh-core
//!
//! Schema management and batch loading for the songplay star schema on
//! Amazon Redshift.
//!
//! A run has two independent components sharing one [`DwhConfig`] and one
//! [`Warehouse`] session:
//!
//! - the schema manager ([`schema`]) drops and recreates the seven tables
//!   declared in [`tables`];
//! - the [`LoadRunner`] copies the event log and song catalog from S3 into
//!   the staging tables, then fills `songplays`, `users`, `songs`, `artists`
//!   and `time` with `INSERT ... SELECT` statements from [`queries`].
//!
//! The schema manager must finish before the load runner starts. Neither
//! component retries, validates loaded data, or deduplicates across runs.
//!
//! ```ignore
//! use sparkdwh_core::{schema, DwhConfig, LoadRunner, Warehouse};
//!
//! let config = DwhConfig::from_file("dwh.cfg")?;
//! let mut warehouse = Warehouse::connect(&config.cluster).await?;
//! let outcome = async {
//!     schema::reset(&mut warehouse).await?;
//!     LoadRunner::new(&config).run(&mut warehouse).await
//! }
//! .await;
//! warehouse.close().await?;
//! outcome?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod copy;
pub mod error;
pub mod loader;
pub mod queries;
pub mod schema;
pub mod statement;
pub mod summary;
pub mod tables;
pub mod warehouse;

pub use config::{ClusterConfig, CommitMode, DwhConfig, EtlConfig, IamRoleConfig, S3Config};
pub use error::{DwhError, DwhResult};
pub use loader::LoadRunner;
pub use statement::{Statement, Step};
pub use summary::{RunSummary, StepSummary};
pub use warehouse::Warehouse;
