// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Forensic Video Pipeline CLI
//!
//! Entry point for the forensic video analysis orchestration service.
//! Since the HTTP handler glue is out of scope for this crate (spec
//! §1), this binary exposes the same use cases an HTTP layer would call
//! through a small command-line surface: submit a file for analysis,
//! check a job's status, list jobs, request a reprocess, and fetch an
//! attached artifact's bytes back out.
//!
//! ## Architecture
//!
//! Follows the same Clean Architecture layering as the rest of the
//! crate:
//!
//! - **Domain Layer**: entities, value objects, repository/service ports
//! - **Application Layer**: use cases and the stateful orchestration
//!   services (executor, scheduler, webhook dispatcher, ...)
//! - **Infrastructure Layer**: SQLite job store, local/S3 blob storage,
//!   the chunked-upload assembler, the stage workers
//!
//! This binary is the composition root: it builds every adapter once,
//! wires them into the application services, and dispatches the
//! requested command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

mod application;
mod config;
mod infrastructure;

use crate::application::services::{ArtifactKind, ArtifactPublisher, Executor, Scheduler, StageRegistry, WebhookDispatcher};
use crate::application::use_cases::{
    AnalyzeSingleShot, GetFileStream, GetJobStatus, ListJobs, ListJobsQuery, ReprocessJob,
};
use crate::config::PipelineConfig;
use crate::infrastructure::workers::{
    ClassificationWorker, CleaningWorker, FftWorker, MetadataExtractionWorker, PrnuWorker,
};
use crate::infrastructure::{ChunkAssembler, HttpWebhookSender, LocalBlobStore, S3Mirror, SqliteJobStore};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::services::{BlobMirror, BlobStore, WebhookSender};
use forensic_pipeline_domain::value_objects::JobId;

#[derive(Parser)]
#[command(name = "forensic-pipeline")]
#[command(about = "Forensic video analysis orchestration service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a video file for analysis and run it to completion
    Analyze {
        /// Path to the video file
        input: PathBuf,

        /// Webhook URL to notify on stage transitions and completion
        #[arg(long)]
        webhook: Option<String>,
    },

    /// Show a job's status, stage progress, and attached artifact links
    Status {
        /// Job id
        job_id: JobId,
    },

    /// List jobs, newest first
    List {
        /// Filter by status (pending, running, completed, failed)
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        #[arg(long, default_value_t = 0)]
        limit: usize,
    },

    /// Re-run a completed or failed job from scratch
    Reprocess {
        /// Job id
        job_id: JobId,
    },

    /// Fetch an attached artifact's bytes and write them to a file
    Fetch {
        /// Job id
        job_id: JobId,

        /// Which artifact: original, report, or clean-video
        kind: String,

        /// Output file path
        output: PathBuf,
    },
}

fn parse_artifact_kind(kind: &str) -> Result<ArtifactKind> {
    match kind {
        "original" => Ok(ArtifactKind::Original),
        "report" => Ok(ArtifactKind::Report),
        "clean-video" | "clean_video" => Ok(ArtifactKind::CleanVideo),
        other => Err(anyhow::anyhow!(
            "unknown artifact kind '{other}', expected original, report, or clean-video"
        )),
    }
}

fn parse_job_status(status: &str) -> Result<forensic_pipeline_domain::entities::JobStatus> {
    use forensic_pipeline_domain::entities::JobStatus;
    match status.to_lowercase().as_str() {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(anyhow::anyhow!("unknown job status '{other}'")),
    }
}

/// Everything the composition root builds once and hands to whichever
/// use case the requested command needs.
struct AppContext {
    job_store: Arc<SqliteJobStore>,
    blob_store: Arc<LocalBlobStore>,
    assembler: Arc<ChunkAssembler>,
    publisher: Arc<ArtifactPublisher>,
    scheduler: Arc<Scheduler>,
    webhooks: Arc<WebhookDispatcher>,
    config: Arc<PipelineConfig>,
}

impl AppContext {
    fn job_store_port(&self) -> Arc<dyn JobStore> {
        self.job_store.clone()
    }

    fn blob_store_port(&self) -> Arc<dyn BlobStore> {
        self.blob_store.clone()
    }
}

async fn build_context() -> Result<AppContext> {
    let config = Arc::new(PipelineConfig::load().context("loading configuration")?);

    let job_store = Arc::new(
        SqliteJobStore::connect(&config.database_url)
            .await
            .context("connecting to the job store")?,
    );
    let blob_store = Arc::new(LocalBlobStore::new(config.storage_root.clone()));
    let dyn_blob_store: Arc<dyn BlobStore> = blob_store.clone();

    let mirror: Option<Arc<dyn BlobMirror>> = S3Mirror::from_config(&config)
        .await
        .map(|mirror| Arc::new(mirror) as Arc<dyn BlobMirror>);
    if mirror.is_none() && config.remote_storage_enabled {
        warn!("remote mirroring is enabled but under-configured; falling back to local-only storage");
    }

    let assembler = Arc::new(ChunkAssembler::new(config.storage_root.clone(), job_store.clone()));
    let publisher = Arc::new(ArtifactPublisher::new(job_store.clone(), blob_store.clone(), mirror));

    let registry = Arc::new(StageRegistry::new(vec![
        Arc::new(MetadataExtractionWorker::new(dyn_blob_store.clone())),
        Arc::new(PrnuWorker::new(dyn_blob_store.clone())),
        Arc::new(FftWorker::new(dyn_blob_store.clone())),
        Arc::new(ClassificationWorker::default()),
        Arc::new(CleaningWorker::new(dyn_blob_store.clone(), config.external_encoder_path.clone())),
    ]));

    let sender: Arc<dyn WebhookSender> = Arc::new(
        HttpWebhookSender::new(Duration::from_secs(config.webhook_timeout_seconds))
            .context("constructing the webhook HTTP client")?,
    );
    let webhooks = Arc::new(WebhookDispatcher::new(sender, config.webhook_retry_attempts));

    let executor = Arc::new(Executor::new(
        job_store.clone(),
        dyn_blob_store,
        registry,
        publisher.clone(),
        webhooks.clone(),
    ));
    let scheduler = Arc::new(Scheduler::new(executor, job_store.clone(), config.worker_pool_size));

    scheduler
        .recover_crashed_jobs()
        .await
        .context("recovering jobs left running by a prior crash")?;

    Ok(AppContext {
        job_store,
        blob_store,
        assembler,
        publisher,
        scheduler,
        webhooks,
        config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting the global tracing subscriber once at startup");

    debug!("starting forensic-pipeline");

    let ctx = build_context().await?;

    match cli.command {
        Commands::Analyze { input, webhook } => analyze(&ctx, input, webhook).await?,
        Commands::Status { job_id } => status(&ctx, job_id).await?,
        Commands::List { status, offset, limit } => list(&ctx, status, offset, limit).await?,
        Commands::Reprocess { job_id } => reprocess(&ctx, job_id).await?,
        Commands::Fetch { job_id, kind, output } => fetch(&ctx, job_id, kind, output).await?,
    }

    Ok(())
}

async fn analyze(ctx: &AppContext, input: PathBuf, webhook: Option<String>) -> Result<()> {
    let bytes = tokio::fs::read(&input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let original_filename = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    let media_type = guess_media_type(&input);

    let use_case = AnalyzeSingleShot::new(
        ctx.assembler.clone(),
        ctx.publisher.clone(),
        ctx.scheduler.clone(),
        ctx.webhooks.clone(),
        ctx.config.clone(),
    );
    let job_id = use_case.execute(original_filename, media_type, bytes, webhook).await?;
    println!("submitted job {job_id}");
    Ok(())
}

fn guess_media_type(path: &std::path::Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()).unwrap_or_default() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
    .to_string()
}

async fn status(ctx: &AppContext, job_id: JobId) -> Result<()> {
    let use_case = GetJobStatus::new(ctx.job_store_port());
    let view = use_case.execute(job_id).await?;

    println!("job {}: {:?}", view.job.id, view.job.status);
    println!(
        "progress: {:.1}% ({} completed, {} running, {} pending)",
        view.progress.progress_percentage,
        view.progress.completed_count,
        view.progress.running_count,
        view.progress.pending_count,
    );
    for stage in &view.stages {
        println!("  - {:?}: {:?}", stage.name, stage.status);
    }
    for artifact in &view.artifacts {
        println!("artifact {}: {}", artifact.kind, artifact.url);
    }
    Ok(())
}

async fn list(ctx: &AppContext, status: Option<String>, offset: usize, limit: usize) -> Result<()> {
    let status = status.map(|s| parse_job_status(&s)).transpose()?;
    let use_case = ListJobs::new(ctx.job_store_port());
    let jobs = use_case
        .execute(ListJobsQuery { status, offset, limit })
        .await?;

    if jobs.is_empty() {
        println!("no jobs found");
    }
    for job in jobs {
        println!("{}  {:?}  {}  {}", job.id, job.status, job.original_filename, job.created_at);
    }
    Ok(())
}

async fn reprocess(ctx: &AppContext, job_id: JobId) -> Result<()> {
    let use_case = ReprocessJob::new(ctx.scheduler.clone());
    use_case.execute(job_id).await?;
    println!("job {job_id} re-queued");
    Ok(())
}

async fn fetch(ctx: &AppContext, job_id: JobId, kind: String, output: PathBuf) -> Result<()> {
    let kind = parse_artifact_kind(&kind)?;
    let use_case = GetFileStream::new(
        ctx.job_store_port(),
        ctx.blob_store_port(),
    );
    let stream = use_case.execute(job_id, kind).await.map_err(map_not_found)?;
    tokio::fs::write(&output, &stream.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {} bytes to {}", stream.bytes.len(), output.display());
    Ok(())
}

fn map_not_found(err: ForensicError) -> anyhow::Error {
    anyhow::anyhow!(err)
}
