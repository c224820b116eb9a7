//! Shared core types: operations, payloads, and target descriptors.

use serde::{Deserialize, Serialize};

/// Location and identity of a packaged chart, plus where to install it.
///
/// Immutable once a run begins; the engine hands out shared references only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart repository URL (e.g. "https://charts.example.io/").
    pub repository: String,
    /// Chart name within the repository.
    pub chart: String,
    /// Chart version to install or remove.
    pub version: String,
    /// Namespace the release lives in.
    pub namespace: String,
    /// Create the namespace if it does not exist.
    pub create_namespace: bool,
    /// Release name for the installed chart.
    pub release_name: String,
}

/// Raw, already-rendered resource definitions to apply or delete directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPayload {
    /// Rendered manifest bytes, passed to the client verbatim.
    pub contents: Vec<u8>,
    /// Namespace the resources are applied into.
    pub namespace: String,
    /// Update resources in place when they already exist.
    pub update: bool,
}

impl ManifestPayload {
    /// Options handed to the client for this payload. The delete flag comes
    /// from the surrounding [`Operation`] variant, not the payload itself.
    pub fn options(&self, delete: bool) -> ApplyOptions {
        ApplyOptions {
            namespace: self.namespace.clone(),
            update: self.update,
            delete,
        }
    }
}

/// Options for a single manifest apply/delete against one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub namespace: String,
    pub update: bool,
    pub delete: bool,
}

/// One declarative change, with its payload.
///
/// Exactly one client call corresponds to each variant.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Install a packaged chart on every target.
    InstallChart(ChartSpec),
    /// Remove a packaged chart release from every target.
    UninstallChart(ChartSpec),
    /// Apply a raw manifest on every target.
    ApplyManifest(ManifestPayload),
    /// Delete the resources described by a raw manifest from every target.
    DeleteManifest(ManifestPayload),
}

impl Operation {
    /// Whether this operation removes state rather than creating it.
    ///
    /// Drives the in-flight/terminal status pair (Removing/Removed vs
    /// Installing/Installed).
    pub fn is_delete(&self) -> bool {
        matches!(self, Operation::UninstallChart(_) | Operation::DeleteManifest(_))
    }

    /// Short human-readable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InstallChart(_) => "install-chart",
            Operation::UninstallChart(_) => "uninstall-chart",
            Operation::ApplyManifest(_) => "apply-manifest",
            Operation::DeleteManifest(_) => "delete-manifest",
        }
    }
}

/// Opaque connection descriptor for one remote cluster.
///
/// The engine never inspects the bytes; they are forwarded to the
/// [`ClientFactory`](crate::client::ClientFactory) as-is. The optional name
/// exists purely so failures can be attributed to a target in reports.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    name: Option<String>,
    connection: Vec<u8>,
}

impl TargetConfig {
    /// Build a target from serialized connection data (e.g. kubeconfig bytes).
    pub fn new(connection: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            connection: connection.into(),
        }
    }

    /// Attach a human-readable label used in failure reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The label, if one was attached.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The opaque connection bytes.
    pub fn connection(&self) -> &[u8] {
        &self.connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_flag_follows_operation_variant() {
        let payload = ManifestPayload {
            contents: b"kind: Namespace".to_vec(),
            namespace: "default".to_string(),
            update: true,
        };

        assert!(!Operation::ApplyManifest(payload.clone()).is_delete());
        assert!(Operation::DeleteManifest(payload.clone()).is_delete());

        let opts = payload.options(true);
        assert!(opts.delete);
        assert!(opts.update);
        assert_eq!(opts.namespace, "default");
    }

    #[test]
    fn target_name_defaults_to_none() {
        let target = TargetConfig::new(b"creds".to_vec());
        assert!(target.name().is_none());

        let named = target.with_name("staging");
        assert_eq!(named.name(), Some("staging"));
        assert_eq!(named.connection(), b"creds");
    }
}
