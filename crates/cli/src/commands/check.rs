//! `tenantry check`: Validate a configuration file.

use std::path::Path;

use anyhow::Context as _;
use tenantry_config::Config;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    println!("{}", render(&config)?);
    println!("\n  ✅ Configuration is valid");
    Ok(())
}

/// The normalized configuration as pretty JSON.
fn render(config: &Config) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().join("absent.json")).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("Failed to load config"));
        assert!(chain.contains("doesn't exist"));
    }

    #[test]
    fn renders_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let document = serde_json::json!({
            "version": 1,
            "paths": {"plugins": root, "spool": root, "ipc": root},
            "storages": {"core": {"type": "files"}}
        });
        let path = dir.path().join("tenantry.json");
        std::fs::write(&path, document.to_string()).unwrap();

        run(&path).unwrap();
        let rendered = render(&Config::load(&path).unwrap()).unwrap();
        assert!(rendered.contains("\"backend_type\": \"files\""));
        assert!(rendered.contains("\"hostname\""));
    }
}
