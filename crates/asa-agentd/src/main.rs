mod config;

use std::sync::Arc;

use anyhow::Context;
use prometheus::{Encoder, TextEncoder};
use tracing::info;

use asa_core::{AssignmentManager, InMemoryRuleStore, InMemoryRuntimes, InMemoryScenarios};
use asa_model::{AssignmentInput, LabelSelector, PageRequest, Runtime, RuntimeId, TenantId};
use asa_observe::{LoggerTimeZone, init_local_offset, init_logger};
use asa_prometheus::PrometheusMetrics;

use config::AgentConfig;

fn main() -> anyhow::Result<()> {
    let cfg = AgentConfig::load()?;

    // Offset detection only works while the process is single-threaded.
    if cfg.logger.tz == LoggerTimeZone::Local {
        init_local_offset();
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?
        .block_on(run(cfg))
}

async fn run(cfg: AgentConfig) -> anyhow::Result<()> {
    // 1) logger
    init_logger(&cfg.logger)?;
    info!("logger initialized");

    // 2) metrics
    let metrics = PrometheusMetrics::new()?;

    // 3) collaborators + manager
    let tenant = TenantId::from("demo-tenant");
    let scenarios = Arc::new(InMemoryScenarios::new());
    scenarios.define(&tenant, ["PRODUCTION", "MANUAL"]);
    info!(tenant = %tenant, scenarios = ?scenarios.list(&tenant), "scenarios defined");
    let runtimes = Arc::new(InMemoryRuntimes::new());

    let manager = AssignmentManager::new(
        Arc::new(InMemoryRuleStore::new()),
        scenarios,
        runtimes.clone(),
    )
    .with_config(cfg.engine)
    .with_metrics(Arc::new(metrics.clone()));

    // 4) runtimes
    let ids: Vec<RuntimeId> = vec![
        runtimes.register(&tenant, Runtime::new("runtime0").with_label("KEY", "VALUE")),
        runtimes.register(&tenant, Runtime::new("runtime1").with_label("KEY", "VALUE")),
        runtimes.register(&tenant, Runtime::new("runtime2")),
    ];
    log_scenarios(&runtimes, &tenant, &ids, "registered");

    // 5) rule
    let selector = LabelSelector::new("KEY", "VALUE");
    let rule = manager
        .create_assignment(
            &tenant,
            AssignmentInput::new("PRODUCTION", selector.clone()),
        )
        .await?;
    info!(scenario = %rule.scenario_name, selector = %rule.selector, "rule created");
    log_scenarios(&runtimes, &tenant, &ids, "after create");

    // 6) label change on runtime2
    runtimes.set_label(&tenant, &ids[2], "KEY", "VALUE")?;
    manager.on_runtime_labels_changed(&tenant, &ids[2]).await?;
    log_scenarios(&runtimes, &tenant, &ids, "after label change");

    let page = manager
        .list_assignments_page(&tenant, &PageRequest::default())
        .await?;
    info!(total = page.total_count, "rules listed");

    // 7) delete
    let deleted = manager
        .delete_assignments_for_selector(&tenant, &selector)
        .await?;
    info!(count = deleted.len(), "rules deleted");
    log_scenarios(&runtimes, &tenant, &ids, "after delete");

    // 8) metrics dump
    let mut buf = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
    info!(metrics = %String::from_utf8_lossy(&buf), "metrics snapshot");

    Ok(())
}

fn log_scenarios(runtimes: &InMemoryRuntimes, tenant: &TenantId, ids: &[RuntimeId], stage: &str) {
    for id in ids {
        if let Some(rt) = runtimes.get(tenant, id) {
            let scenarios: Vec<String> = rt.scenarios().iter().map(ToString::to_string).collect();
            info!(stage, runtime = %rt.name, scenarios = ?scenarios, "runtime scenarios");
        }
    }
}
