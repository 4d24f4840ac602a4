//! Orchestrates one application run: ingest configuration from every
//! source, wire the bean container, drive registered runners until
//! shutdown, then tear the container down in reverse dependency order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::container::BeanContainer;
use crate::dynamic::Refreshable;
use crate::error::WeaveError;
use crate::ingest::cmdline;
use crate::ingest::decode::DecoderRegistry;
use crate::ingest::env::{self, EnvOptions};
use crate::logger::Logger;
use crate::properties::{flatten, PropertyStore};

static LOG: Logger = Logger::new("runner");

/// One configuration source to decode and merge, lowest priority first.
/// `ext` (no leading dot, e.g. `"properties"`, `"json"`) selects the
/// decoder out of the plan's [`DecoderRegistry`].
pub struct ConfigSource {
    pub prefix: String,
    pub raw: Vec<u8>,
    pub ext: String,
}

/// Everything needed to ingest configuration before the container refreshes.
pub struct IngestPlan {
    pub sources: Vec<ConfigSource>,
    pub env: Option<EnvOptions>,
    pub cmdline_args: Vec<String>,
    pub decoders: DecoderRegistry,
}

impl Default for IngestPlan {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            env: None,
            cmdline_args: Vec::new(),
            decoders: DecoderRegistry::default(),
        }
    }
}

impl IngestPlan {
    pub fn build(&self) -> Result<PropertyStore, WeaveError> {
        let mut store = PropertyStore::new();
        for source in &self.sources {
            let value = self.decoders.decode(&source.raw, &source.ext)?;
            let flat = flatten::flatten(&source.prefix, &value)?;
            for (k, v) in flat {
                store.set(&k, v)?;
            }
        }
        if let Some(opts) = &self.env {
            env::import_env(&mut store, opts)?;
        }
        let overrides = cmdline::parse_overrides(self.cmdline_args.iter().map(String::as_str))?;
        cmdline::apply_overrides(&mut store, &overrides)?;
        Ok(store)
    }
}

/// One long-running application task driven by the runtime after wiring
/// completes. A runner should return once it observes `ctx.is_shutting_down()`.
///
/// Hand-rolled boxed-future object safety (no `async-trait`-style macro in
/// the dependency stack): implementors write a normal `async fn` and wrap
/// its call in `Box::pin`.
pub trait AppRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        ctx: RunnerContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), WeaveError>> + Send + 'a>>;
}

/// Shared handle every runner task gets: the wired container, the
/// refreshable property facade, and the shutdown signal.
#[derive(Clone)]
pub struct RunnerContext {
    pub container: Arc<BeanContainer>,
    pub properties: Arc<Refreshable>,
    shutdown: watch::Receiver<bool>,
}

impl RunnerContext {
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub async fn shutdown_signal(&mut self) {
        let _ = self.shutdown.changed().await;
    }
}

/// Build the property store, refresh the container, spawn every runner,
/// and wait for either every runner to finish or a ctrl-c / explicit
/// shutdown signal — then close the container.
pub async fn run_app(
    plan: &IngestPlan,
    container: BeanContainer,
    runners: Vec<Arc<dyn AppRunner>>,
) -> Result<(), WeaveError> {
    let store = plan.build()?;
    if store.has("spring.config.banner") && store.get("spring.config.banner") == "true" {
        print_banner();
    }
    let properties = Arc::new(Refreshable::new(store.copy()));
    container.refresh(&store)?;
    let container = Arc::new(container);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = JoinSet::new();
    for runner in runners {
        let ctx = RunnerContext {
            container: container.clone(),
            properties: properties.clone(),
            shutdown: shutdown_rx.clone(),
        };
        tasks.spawn(async move { runner.run(ctx).await });
        // `runner.run(ctx)` returns a boxed future directly; the `async
        // move` block above just drives it to completion inside the task.
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            LOG.info("received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
        _ = drain(&mut tasks) => {
            LOG.info("every runner returned on its own");
        }
    }

    let _ = shutdown_tx.send(true);
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => LOG.error(&format!("runner failed: {e}")),
            Err(e) => LOG.error(&format!("runner task panicked: {e}")),
        }
    }

    container.close();
    Ok(())
}

async fn drain(tasks: &mut JoinSet<Result<(), WeaveError>>) {
    while tasks.join_next().await.is_some() {}
}

fn print_banner() {
    println!("weave {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_plan_merges_sources_env_and_overrides() {
        let plan = IngestPlan {
            sources: vec![ConfigSource {
                prefix: String::new(),
                raw: b"db.url=file-value\nport=8080".to_vec(),
                ext: "properties".to_string(),
            }],
            env: None,
            cmdline_args: vec!["-D".to_string(), "port=9090".to_string()],
            ..Default::default()
        };
        let store = plan.build().unwrap();
        assert_eq!(store.get("db.url"), "file-value");
        assert_eq!(store.get("port"), "9090");
    }

    #[test]
    fn ingest_plan_rejects_unsupported_extension() {
        let plan = IngestPlan {
            sources: vec![ConfigSource {
                prefix: String::new(),
                raw: b"key: value".to_vec(),
                ext: "yaml".to_string(),
            }],
            ..Default::default()
        };
        assert!(plan.build().is_err());
    }
}
