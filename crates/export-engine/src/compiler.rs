//! Export pipeline: plan, stage input, run the engine, collect output.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use keepcut_common::error::{KeepcutError, KeepcutResult};
use keepcut_edit_model::Segment;

use crate::empty::empty_output;
use crate::engine::MediaEngine;
use crate::plan::{ExportPlan, Invocation};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::settings::{ExportFormat, ExportSettings};

/// Where the source media comes from.
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    /// Raw bytes of the source file.
    Bytes(&'a [u8]),
    /// A file on disk.
    File(&'a Path),
}

/// One export request.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub source: ExportSource<'a>,
    /// Keep segments. Normalized to sorted, disjoint and at least one
    /// frame long when the plan is compiled.
    pub segments: &'a [Segment],
    pub settings: ExportSettings,
    pub source_has_audio: bool,
}

/// Encoded export result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub duration_secs: f64,
}

impl ExportOutput {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Turns keep segments into encoded output through a [`MediaEngine`].
///
/// Only one export runs at a time; a second call while one is in flight
/// fails with [`KeepcutError::ExportBusy`].
#[derive(Debug, Default)]
pub struct ExportCompiler {
    busy: AtomicBool,
}

impl ExportCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run an export.
    ///
    /// An empty segment list returns an empty container without touching
    /// the engine. Any engine failure surfaces as
    /// [`KeepcutError::MediaEngine`]; the busy flag is cleared on every
    /// exit path, including cancellation.
    pub async fn export<E: MediaEngine + ?Sized>(
        &self,
        engine: &E,
        request: ExportRequest<'_>,
        on_progress: Option<ProgressCallback>,
    ) -> KeepcutResult<ExportOutput> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let plan = ExportPlan::compile(
            request.segments,
            &request.settings,
            request.source_has_audio,
        );
        let format = plan.format();
        let tracker = ProgressTracker::new(plan.invocation_count(), on_progress);

        let input_name = input_name(&request.source);
        let output_name = format!("output.{}", format.extension());
        let Some(invocation) = plan.to_invocation(&input_name, &output_name) else {
            tracing::info!(%format, "Nothing kept, writing empty output");
            tracker.finish();
            return Ok(ExportOutput {
                bytes: empty_output(format),
                format,
                duration_secs: 0.0,
            });
        };

        tracing::info!(
            engine = engine.name(),
            %format,
            resolution = %request.settings.resolution,
            fps = request.settings.frame_rate.fps(),
            segments = plan.segments().len(),
            duration_secs = plan.output_duration(),
            "Starting export"
        );

        let result = run_invocation(
            engine,
            &request.source,
            &input_name,
            &output_name,
            &invocation,
            &tracker,
        )
        .await;

        for name in [&input_name, &output_name] {
            if let Err(e) = engine.delete_file(name).await {
                tracing::warn!(file = %name, error = %e, "Failed to clean up engine file");
            }
        }

        let bytes = result.map_err(|e| {
            tracing::error!(error = %e, "Export failed");
            into_engine_failure(e)
        })?;
        tracker.finish();

        tracing::info!(bytes = bytes.len(), %format, "Export complete");
        Ok(ExportOutput {
            bytes,
            format,
            duration_secs: plan.output_duration(),
        })
    }
}

async fn run_invocation<E: MediaEngine + ?Sized>(
    engine: &E,
    source: &ExportSource<'_>,
    input_name: &str,
    output_name: &str,
    invocation: &Invocation,
    tracker: &ProgressTracker,
) -> KeepcutResult<Vec<u8>> {
    match source {
        ExportSource::Bytes(bytes) => engine.write_file(input_name, bytes).await?,
        ExportSource::File(path) => engine.import_file(input_name, path).await?,
    }
    tracker.begin_invocation(0);
    engine.exec(invocation, tracker).await?;
    engine.read_file(output_name).await
}

fn input_name(source: &ExportSource<'_>) -> String {
    let extension = match source {
        ExportSource::File(path) => path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric())),
        ExportSource::Bytes(_) => None,
    };
    match extension {
        Some(ext) => format!("input.{ext}"),
        None => "input".to_string(),
    }
}

fn into_engine_failure(error: KeepcutError) -> KeepcutError {
    match error {
        KeepcutError::MediaEngine { .. } | KeepcutError::FileNotFound { .. } => error,
        other => KeepcutError::media_engine(other.to_string()),
    }
}

/// Holds the busy flag for the lifetime of one export.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> KeepcutResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| KeepcutError::ExportBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
