//! Armada Core Library
//!
//! Provides the domain logic for applying declarative changes (chart
//! installs/removals, raw manifest apply/delete) against a fleet of
//! remote clusters concurrently, with per-target failure aggregation.

pub mod client;
pub mod deploy;
pub mod error;
pub mod status;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Operations and payloads
    pub use crate::types::{ApplyOptions, ChartSpec, ManifestPayload, Operation, TargetConfig};

    // Engine
    pub use crate::deploy::Deployer;

    // Client seam
    pub use crate::client::{ClientFactory, ClusterClient};
    pub use crate::client::helm_cli::{HelmCliClient, HelmCliFactory};

    // Errors and status
    pub use crate::error::{AggregatedError, DeployError, FailureKind, TargetFailure};
    pub use crate::status::Status;
}
