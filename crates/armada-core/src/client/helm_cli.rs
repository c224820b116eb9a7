//! Production cluster client shelling out to `helm` and `kubectl`.
//!
//! The target's connection bytes are materialized into a private temp file
//! and passed to both tools via `--kubeconfig`; manifest bytes are streamed
//! over stdin. A non-zero exit becomes an error carrying the tool's stderr.

use std::io::Write;
use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{ClientFactory, ClusterClient};
use crate::types::{ApplyOptions, ChartSpec, TargetConfig};

/// Builds [`HelmCliClient`]s from kubeconfig bytes.
#[derive(Debug, Clone, Default)]
pub struct HelmCliFactory {
    helm_bin: Option<String>,
    kubectl_bin: Option<String>,
}

impl HelmCliFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the `helm` binary looked up on PATH.
    pub fn with_helm_bin(mut self, bin: impl Into<String>) -> Self {
        self.helm_bin = Some(bin.into());
        self
    }

    /// Override the `kubectl` binary looked up on PATH.
    pub fn with_kubectl_bin(mut self, bin: impl Into<String>) -> Self {
        self.kubectl_bin = Some(bin.into());
        self
    }
}

#[async_trait]
impl ClientFactory for HelmCliFactory {
    async fn connect(&self, target: &TargetConfig) -> anyhow::Result<Box<dyn ClusterClient>> {
        if target.connection().is_empty() {
            anyhow::bail!("empty connection descriptor");
        }

        let mut kubeconfig = NamedTempFile::new().context("Failed to create kubeconfig file")?;
        kubeconfig
            .write_all(target.connection())
            .context("Failed to write kubeconfig file")?;
        kubeconfig
            .flush()
            .context("Failed to flush kubeconfig file")?;

        Ok(Box::new(HelmCliClient {
            kubeconfig,
            helm_bin: self.helm_bin.clone().unwrap_or_else(|| "helm".to_string()),
            kubectl_bin: self
                .kubectl_bin
                .clone()
                .unwrap_or_else(|| "kubectl".to_string()),
        }))
    }
}

/// One cluster's client. Owns the kubeconfig temp file for its lifetime.
#[derive(Debug)]
pub struct HelmCliClient {
    kubeconfig: NamedTempFile,
    helm_bin: String,
    kubectl_bin: String,
}

impl HelmCliClient {
    fn kubeconfig_path(&self) -> &std::path::Path {
        self.kubeconfig.path()
    }

    async fn run(&self, mut cmd: Command, tool: &str) -> anyhow::Result<()> {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to invoke {tool}"))?;
        Self::check_status(&output, tool)
    }

    async fn run_with_stdin(
        &self,
        mut cmd: Command,
        tool: &str,
        input: &[u8],
    ) -> anyhow::Result<()> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to invoke {tool}"))?;

        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("Failed to open stdin for {tool}"))?;
        stdin
            .write_all(input)
            .await
            .with_context(|| format!("Failed to stream manifest to {tool}"))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for {tool}"))?;
        Self::check_status(&output, tool)
    }

    fn check_status(output: &std::process::Output, tool: &str) -> anyhow::Result<()> {
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{tool} exited with {}: {}", output.status, stderr.trim());
    }
}

#[async_trait]
impl ClusterClient for HelmCliClient {
    async fn install_chart(&self, spec: &ChartSpec) -> anyhow::Result<()> {
        debug!(
            chart = %spec.chart,
            version = %spec.version,
            namespace = %spec.namespace,
            "installing chart"
        );

        let mut cmd = Command::new(&self.helm_bin);
        cmd.arg("upgrade")
            .arg("--install")
            .arg(&spec.release_name)
            .arg(&spec.chart)
            .arg("--repo")
            .arg(&spec.repository)
            .arg("--version")
            .arg(&spec.version)
            .arg("--namespace")
            .arg(&spec.namespace)
            .arg("--kubeconfig")
            .arg(self.kubeconfig_path());
        if spec.create_namespace {
            cmd.arg("--create-namespace");
        }

        self.run(cmd, "helm").await
    }

    async fn uninstall_chart(&self, spec: &ChartSpec) -> anyhow::Result<()> {
        debug!(release = %spec.release_name, namespace = %spec.namespace, "uninstalling chart");

        let mut cmd = Command::new(&self.helm_bin);
        cmd.arg("uninstall")
            .arg(&spec.release_name)
            .arg("--namespace")
            .arg(&spec.namespace)
            .arg("--kubeconfig")
            .arg(self.kubeconfig_path());

        self.run(cmd, "helm").await
    }

    async fn apply_manifest(&self, contents: &[u8], opts: ApplyOptions) -> anyhow::Result<()> {
        let verb = if opts.delete {
            "delete"
        } else if opts.update {
            "apply"
        } else {
            "create"
        };
        debug!(verb, namespace = %opts.namespace, bytes = contents.len(), "applying manifest");

        let mut cmd = Command::new(&self.kubectl_bin);
        cmd.arg(verb)
            .arg("-f")
            .arg("-")
            .arg("--namespace")
            .arg(&opts.namespace)
            .arg("--kubeconfig")
            .arg(self.kubeconfig_path());

        self.run_with_stdin(cmd, "kubectl", contents).await
    }
}
