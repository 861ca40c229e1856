//! ffmpeg-backed media engine and ffprobe helpers.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use keepcut_common::error::{KeepcutError, KeepcutResult};

use crate::engine::{EngineEvents, MediaEngine};
use crate::plan::Invocation;

/// stderr lines kept for the failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Runs the system `ffmpeg` binary inside a private temporary directory.
///
/// The directory and everything left in it is removed when the engine is
/// dropped.
pub struct FfmpegEngine {
    binary: PathBuf,
    workdir: TempDir,
}

impl FfmpegEngine {
    pub fn new() -> KeepcutResult<Self> {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> KeepcutResult<Self> {
        let workdir = tempfile::Builder::new().prefix("keepcut-").tempdir()?;
        tracing::debug!(workdir = %workdir.path().display(), "ffmpeg work area created");
        Ok(Self {
            binary: binary.into(),
            workdir,
        })
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Whether the configured binary can be executed.
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn resolve(&self, name: &str) -> KeepcutResult<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.workdir.path().join(name)),
            _ => Err(KeepcutError::media_engine(format!(
                "Invalid engine file name: {name:?}"
            ))),
        }
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> KeepcutResult<()> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn import_file(&self, name: &str, source: &Path) -> KeepcutResult<()> {
        let path = self.resolve(name)?;
        if !source.exists() {
            return Err(KeepcutError::FileNotFound {
                path: source.to_path_buf(),
            });
        }
        tokio::fs::copy(source, &path).await?;
        Ok(())
    }

    async fn exec(&self, invocation: &Invocation, events: &dyn EngineEvents) -> KeepcutResult<()> {
        tracing::debug!(args = ?invocation.args, "Running ffmpeg");
        let started = std::time::Instant::now();

        let mut child = Command::new(&self.binary)
            .current_dir(self.workdir.path())
            .args(["-hide_banner", "-nostats", "-progress", "pipe:1"])
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| KeepcutError::media_engine(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            args_len = invocation.args.len(),
            expected_secs = invocation.expected_duration_secs,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| KeepcutError::media_engine("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| KeepcutError::media_engine("Failed to capture ffmpeg stderr"))?;

        let expected = invocation.expected_duration_secs;
        let read_progress = async {
            let mut lines = BufReader::new(stdout).lines();
            let mut state = ProgressState::default();
            while let Some(line) = lines.next_line().await? {
                if let Some((key, value)) = line.trim().split_once('=') {
                    state.update(key, value);
                    if key == "progress" {
                        events.progress(state.fraction(expected));
                    }
                }
            }
            Ok::<(), std::io::Error>(())
        };

        // Drained alongside stdout so ffmpeg never blocks on a full pipe.
        let read_stderr = async {
            let mut lines = BufReader::new(stderr).lines();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            while let Ok(Some(line)) = lines.next_line().await {
                events.log(&line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        };

        let (progress_result, stderr_tail) = tokio::join!(read_progress, read_stderr);
        progress_result
            .map_err(|e| KeepcutError::media_engine(format!("Failed reading ffmpeg progress: {e}")))?;

        let status = child
            .wait()
            .await
            .map_err(|e| KeepcutError::media_engine(format!("Failed to wait on ffmpeg: {e}")))?;

        if !status.success() {
            return Err(KeepcutError::media_engine(format!(
                "ffmpeg exited with {status}: {}",
                stderr_tail.trim()
            )));
        }

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "ffmpeg process finished"
        );
        Ok(())
    }

    async fn read_file(&self, name: &str) -> KeepcutResult<Vec<u8>> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => KeepcutError::media_engine(format!(
                "ffmpeg produced no output file {name:?}"
            )),
            _ => KeepcutError::Io(e),
        })
    }

    async fn delete_file(&self, name: &str) -> KeepcutResult<()> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // Despite its name ffmpeg reports this in microseconds.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    fn fraction(&self, expected_duration_secs: f64) -> f64 {
        if self.complete {
            1.0
        } else if expected_duration_secs <= 0.0 {
            0.0
        } else {
            (self.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
        }
    }
}

/// What ffprobe reports about a source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub has_audio: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe a media file with ffprobe. `None` if ffprobe is missing, fails,
/// or reports no positive duration.
pub fn probe_media(path: &Path) -> Option<MediaInfo> {
    let output = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=codec_type,width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    parse_probe_output(&String::from_utf8(output.stdout).ok()?)
}

/// Parse ffprobe JSON output.
pub fn parse_probe_output(raw: &str) -> Option<MediaInfo> {
    let probe: ProbeOutput = serde_json::from_str(raw).ok()?;
    let duration_secs = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Some(MediaInfo {
        duration_secs,
        has_audio,
        width: video.and_then(|v| v.width).filter(|w| *w > 0),
        height: video.and_then(|v| v.height).filter(|h| *h > 0),
    })
}
