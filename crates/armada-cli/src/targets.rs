//! Target set loading for the CLI.
//!
//! Targets come from repeated `--kubeconfig` flags, a TOML fleet file, or
//! (with neither) `$KUBECONFIG` / `~/.kube/config`. The core never loads
//! credentials itself; it only sees the resulting opaque bytes.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use armada_core::types::TargetConfig;

/// Fleet file schema:
///
/// ```toml
/// [[cluster]]
/// name = "staging-east"
/// kubeconfig = "/path/to/kubeconfig"
/// ```
#[derive(Debug, Deserialize)]
struct FleetFile {
    #[serde(default, rename = "cluster")]
    clusters: Vec<ClusterEntry>,
}

#[derive(Debug, Deserialize)]
struct ClusterEntry {
    name: String,
    kubeconfig: PathBuf,
}

/// Resolve the target set from CLI inputs.
pub fn load_targets(
    kubeconfigs: &[PathBuf],
    fleet_file: Option<&Path>,
) -> anyhow::Result<Vec<TargetConfig>> {
    if let Some(path) = fleet_file {
        return load_fleet_file(path);
    }
    if !kubeconfigs.is_empty() {
        return kubeconfigs.iter().map(|p| load_kubeconfig(p)).collect();
    }
    let default = default_kubeconfig_path()?;
    Ok(vec![load_kubeconfig(&default)?])
}

fn load_fleet_file(path: &Path) -> anyhow::Result<Vec<TargetConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fleet file {}", path.display()))?;
    let fleet: FleetFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse fleet file {}", path.display()))?;

    fleet
        .clusters
        .into_iter()
        .map(|entry| {
            let bytes = std::fs::read(&entry.kubeconfig).with_context(|| {
                format!(
                    "Failed to read kubeconfig {} for cluster {}",
                    entry.kubeconfig.display(),
                    entry.name
                )
            })?;
            Ok(TargetConfig::new(bytes).with_name(entry.name))
        })
        .collect()
}

fn load_kubeconfig(path: &Path) -> anyhow::Result<TargetConfig> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
    Ok(TargetConfig::new(bytes).with_name(path.display().to_string()))
}

fn default_kubeconfig_path() -> anyhow::Result<PathBuf> {
    if let Ok(env_path) = std::env::var("KUBECONFIG") {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".kube").join("config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn fleet_file_yields_named_targets() {
        let temp = TempDir::new().unwrap();
        let kc_east = temp.path().join("east.yaml");
        let kc_west = temp.path().join("west.yaml");
        std::fs::write(&kc_east, "east-creds").unwrap();
        std::fs::write(&kc_west, "west-creds").unwrap();

        let fleet_path = temp.path().join("fleet.toml");
        let mut fleet = std::fs::File::create(&fleet_path).unwrap();
        writeln!(
            fleet,
            "[[cluster]]\nname = \"east\"\nkubeconfig = {:?}\n\n[[cluster]]\nname = \"west\"\nkubeconfig = {:?}",
            kc_east, kc_west
        )
        .unwrap();

        let targets = load_targets(&[], Some(&fleet_path)).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name(), Some("east"));
        assert_eq!(targets[0].connection(), b"east-creds");
        assert_eq!(targets[1].name(), Some("west"));
    }

    #[test]
    fn kubeconfig_flags_take_precedence_over_default() {
        let temp = TempDir::new().unwrap();
        let kc = temp.path().join("cluster.yaml");
        std::fs::write(&kc, "creds").unwrap();

        let targets = load_targets(std::slice::from_ref(&kc), None).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].connection(), b"creds");
    }

    #[test]
    fn missing_kubeconfig_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        let err = load_targets(std::slice::from_ref(&missing), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read kubeconfig"));
    }

    #[test]
    fn empty_fleet_file_yields_empty_target_set() {
        let temp = TempDir::new().unwrap();
        let fleet_path = temp.path().join("fleet.toml");
        std::fs::write(&fleet_path, "").unwrap();

        let targets = load_targets(&[], Some(&fleet_path)).unwrap();
        assert!(targets.is_empty());
    }
}
