//! `tenantry storages`: Instantiate every configured storage.
//!
//! Unknown backend kinds are reported and skipped; anything else aborts.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use tenantry_config::Config;
use tenantry_context::Context;
use tenantry_core::logging::{LoggingSink, TracingSink};

/// Outcome per configured storage.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

pub async fn run(path: &Path, namespace: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let sink: Arc<dyn LoggingSink> = Arc::new(TracingSink::new());
    let context = Context::new(config, Some(sink));

    let report = probe(&context, namespace).await?;

    println!();
    if report.skipped.is_empty() {
        println!("  🎉 All {} storage(s) created", report.created.len());
    } else {
        println!(
            "  ⚠️  {} storage(s) created, {} skipped: {}",
            report.created.len(),
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }
    Ok(())
}

async fn probe(context: &Context, namespace: Option<&str>) -> anyhow::Result<Report> {
    let log = context.log("storages");
    let mut report = Report::default();

    for (name, info) in context.config().storages() {
        let storage = match context.storage(name) {
            Ok(storage) => storage,
            Err(e) if e.is_recoverable() => {
                log.warning(&format!("skipping storage '{name}': {e}"));
                println!("  ❌ {name:<16} {e}");
                report.skipped.push(name.clone());
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to create storage '{name}'")),
        };

        match namespace {
            Some(ns) => {
                let objects = storage
                    .all(ns)
                    .await
                    .with_context(|| format!("Failed to list '{ns}' in storage '{name}'"))?;
                println!(
                    "  ✅ {name:<16} {:<10} {} object(s) in '{ns}'",
                    info.backend_type,
                    objects.len()
                );
            }
            None => println!("  ✅ {name:<16} {}", info.backend_type),
        }
        report.created.push(name.clone());
    }

    Ok(report)
}
