//! Client abstraction for cross-cluster operations.
//!
//! The engine talks to clusters only through these traits: a factory turns
//! one target's opaque connection bytes into a client, and the client
//! performs exactly one operation per engine call. Production code shells
//! out to `helm`/`kubectl` via [`helm_cli`]; tests substitute in-memory
//! fakes.

pub mod helm_cli;

use async_trait::async_trait;

use crate::types::{ApplyOptions, ChartSpec, TargetConfig};

pub use helm_cli::{HelmCliClient, HelmCliFactory};

/// Builds a client bound to one target's connection descriptor.
///
/// Construction may fail (malformed or unusable descriptor); the engine
/// records that per-target and keeps sibling targets running.
#[async_trait]
pub trait ClientFactory: Send + Sync + 'static {
    async fn connect(&self, target: &TargetConfig) -> anyhow::Result<Box<dyn ClusterClient>>;
}

/// Operations a connected cluster client supports.
///
/// Each method maps 1:1 to an [`Operation`](crate::types::Operation)
/// variant; manifest deletion travels through `apply_manifest` via
/// [`ApplyOptions::delete`].
#[async_trait]
pub trait ClusterClient: Send + Sync + std::fmt::Debug {
    /// Install a packaged chart release.
    async fn install_chart(&self, spec: &ChartSpec) -> anyhow::Result<()>;

    /// Remove a packaged chart release.
    async fn uninstall_chart(&self, spec: &ChartSpec) -> anyhow::Result<()>;

    /// Apply (or delete, per `opts.delete`) rendered manifest bytes.
    async fn apply_manifest(&self, contents: &[u8], opts: ApplyOptions) -> anyhow::Result<()>;
}
