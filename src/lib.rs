// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod plan;
pub mod serve;
pub mod types;
pub mod watch;

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch as signal};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, BuildConfig};
use crate::engine::{BlockingTaskBackend, CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::fs::RealFileSystem;
use crate::pipeline::{run_task, TaskContext, TaskKind, TaskReport};
use crate::plan::{Step, TaskPlan};
use crate::types::{AssetClass, Mode};
use crate::watch::{build_task_watch_profiles, spawn_watcher, WatcherHandle};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - mode resolution and path table loading
/// - the entry point's plan
/// - the initial transform series
/// - (for `default`) the source watcher, re-run engine and live server
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mode = Mode::resolve(args.mode.as_deref());
    let table = load_and_validate(&args.root, args.config.as_deref())?;
    let config = Arc::new(BuildConfig::new(args.root.clone(), mode, table));
    let plan = TaskPlan::for_entry(args.task)?;

    if args.dry_run {
        print!("{}", dry_run_report(&config, &plan));
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    info!(%mode, entry = %plan.entry(), root = ?config.root(), "starting");

    let ctx = TaskContext::new(Arc::clone(&config), Arc::new(RealFileSystem));
    execute(&plan, ctx).await
}

/// Run `plan` step by step.
///
/// Transforms run one after another, each on a blocking thread; a task
/// error stops the plan. Watch and serve steps are started in order and
/// then kept running until Ctrl-C.
pub async fn execute(plan: &TaskPlan, ctx: TaskContext) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let mut reports = Vec::new();
    let mut source_watcher: Option<WatcherHandle> = None;
    let mut server: Option<LiveServer> = None;

    for step in plan.steps() {
        match *step {
            Step::Transform(kind) => reports.push(run_transform(kind, &ctx).await?),
            Step::Watch => {
                let profiles = build_task_watch_profiles(ctx.config.table())?;
                source_watcher = Some(spawn_watcher(ctx.config.root(), profiles, rt_tx.clone())?);
            }
            Step::Serve => server = Some(LiveServer::start(&ctx.config).await?),
        }
    }

    log_summary(&reports);

    if source_watcher.is_none() && server.is_none() {
        return Ok(());
    }

    // Ctrl-C -> stop the runtime and the server.
    let (stop_tx, stop_rx) = signal::channel(false);
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                // Keep `stop_tx` alive so the server is not stopped early.
                std::future::pending::<()>().await;
            }
            info!("shutting down");
            let _ = stop_tx.send(true);
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let backend = BlockingTaskBackend::new(ctx, rt_tx);
    let runtime = Runtime::new(CoreRuntime::new(RuntimeOptions::default()), rt_rx, backend);

    let serving = async move {
        match server {
            Some(server) => server.run(stop_rx).await,
            None => Ok(()),
        }
    };

    tokio::try_join!(async { runtime.run().await.map_err(anyhow::Error::from) }, serving)?;
    drop(source_watcher);
    Ok(())
}

/// Run one transform on the blocking pool.
pub async fn run_transform(kind: TaskKind, ctx: &TaskContext) -> errors::Result<TaskReport> {
    let ctx = ctx.clone();
    tokio::task::spawn_blocking(move || run_task(kind, &ctx))
        .await
        .map_err(|e| anyhow::anyhow!("task {kind} did not finish: {e}"))?
}

/// Bound listener plus everything needed to serve it.
struct LiveServer {
    listener: TcpListener,
    app: axum::Router,
    _reload_watcher: WatcherHandle,
}

impl LiveServer {
    async fn start(config: &BuildConfig) -> errors::Result<Self> {
        let listener = serve::bind(config.table().serve.port).await?;
        let (reload_tx, _) = broadcast::channel(16);
        let reload_watcher = serve::spawn_reload_watcher(config, reload_tx.clone())?;
        let app = serve::router(config.serve_dir(), reload_tx);
        Ok(Self {
            listener,
            app,
            _reload_watcher: reload_watcher,
        })
    }

    async fn run(self, mut stop: signal::Receiver<bool>) -> Result<()> {
        let shutdown = async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        };
        let result = serve::run(self.listener, self.app, shutdown).await;
        drop(self._reload_watcher);
        Ok(result?)
    }
}

fn log_summary(reports: &[TaskReport]) {
    if reports.is_empty() {
        return;
    }
    let written: usize = reports.iter().map(|r| r.written.len()).sum();
    let failed: usize = reports.iter().map(|r| r.failed.len()).sum();
    if failed > 0 {
        warn!(written, failed, "build finished with skipped files");
    } else {
        info!(written, "build finished");
    }
}

/// Dry-run output: mode, resolved paths and plan.
pub fn dry_run_report(config: &BuildConfig, plan: &TaskPlan) -> String {
    let table = config.table();
    let mut out = String::new();

    let _ = writeln!(out, "sitepipe dry-run");
    let _ = writeln!(out, "  mode = {}", config.mode());
    let _ = writeln!(out, "  root = {:?}", config.root());
    let _ = writeln!(out);

    let _ = writeln!(out, "sources:");
    for class in AssetClass::ALL {
        let _ = writeln!(out, "  {class}: {:?}", table.source.patterns(class));
    }
    let _ = writeln!(
        out,
        "  views: {:?} (templates in {:?})",
        table.views.source, table.views.templates
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "outputs ({}):", config.mode());
    for class in AssetClass::ALL {
        let _ = writeln!(out, "  {class}: {}", config.output_dir(class).display());
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "serve: {} on port {} (reload on {:?})",
        config.serve_dir().display(),
        table.serve.port,
        table.serve.path_list
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "plan: {plan}");
    out
}
