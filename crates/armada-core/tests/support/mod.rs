//! In-memory fake factory/client for engine tests.
//!
//! A target's behavior is scripted by its connection bytes: `ok` succeeds,
//! `refuse` fails client construction, `break` fails the operation, and
//! `hang` never completes.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Barrier;

use armada_core::client::{ClientFactory, ClusterClient};
use armada_core::types::{ApplyOptions, ChartSpec, TargetConfig};

#[derive(Debug, Default)]
pub struct Calls {
    pub connects: AtomicUsize,
    pub installs: AtomicUsize,
    pub uninstalls: AtomicUsize,
    pub applies: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl Calls {
    pub fn operations(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
            + self.uninstalls.load(Ordering::SeqCst)
            + self.applies.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }
}

pub struct FakeFactory {
    pub calls: Arc<Calls>,
    /// When set, every operation waits here before finishing, proving all
    /// targets were dispatched before any result was awaited.
    pub barrier: Option<Arc<Barrier>>,
}

impl FakeFactory {
    pub fn new() -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        (
            Self {
                calls: Arc::clone(&calls),
                barrier: None,
            },
            calls,
        )
    }

    pub fn with_barrier(parties: usize) -> (Self, Arc<Calls>) {
        let (mut factory, calls) = Self::new();
        factory.barrier = Some(Arc::new(Barrier::new(parties)));
        (factory, calls)
    }
}

#[async_trait]
impl ClientFactory for FakeFactory {
    async fn connect(&self, target: &TargetConfig) -> anyhow::Result<Box<dyn ClusterClient>> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        let script = String::from_utf8_lossy(target.connection()).into_owned();
        if script == "refuse" {
            anyhow::bail!("connection refused");
        }
        Ok(Box::new(FakeClient {
            calls: Arc::clone(&self.calls),
            barrier: self.barrier.clone(),
            script,
        }))
    }
}

#[derive(Debug)]
pub struct FakeClient {
    calls: Arc<Calls>,
    barrier: Option<Arc<Barrier>>,
    script: String,
}

impl FakeClient {
    async fn finish(&self) -> anyhow::Result<()> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        match self.script.as_str() {
            "break" => anyhow::bail!("remote apply exploded"),
            "hang" => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterClient for FakeClient {
    async fn install_chart(&self, _spec: &ChartSpec) -> anyhow::Result<()> {
        self.calls.installs.fetch_add(1, Ordering::SeqCst);
        self.finish().await
    }

    async fn uninstall_chart(&self, _spec: &ChartSpec) -> anyhow::Result<()> {
        self.calls.uninstalls.fetch_add(1, Ordering::SeqCst);
        self.finish().await
    }

    async fn apply_manifest(&self, _contents: &[u8], opts: ApplyOptions) -> anyhow::Result<()> {
        if opts.delete {
            self.calls.deletes.fetch_add(1, Ordering::SeqCst);
        } else {
            self.calls.applies.fetch_add(1, Ordering::SeqCst);
        }
        self.finish().await
    }
}

pub fn target(name: &str, script: &str) -> TargetConfig {
    TargetConfig::new(script.as_bytes().to_vec()).with_name(name)
}

pub fn chart_spec() -> ChartSpec {
    ChartSpec {
        repository: "https://charts.example.io/".to_string(),
        chart: "mesh".to_string(),
        version: "1.4.2".to_string(),
        namespace: "mesh-system".to_string(),
        create_namespace: true,
        release_name: "mesh".to_string(),
    }
}
