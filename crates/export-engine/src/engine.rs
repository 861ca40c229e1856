//! Media engine port.

use std::path::Path;

use async_trait::async_trait;

use keepcut_common::error::KeepcutResult;

use crate::plan::Invocation;

/// Receives engine events while an invocation runs.
pub trait EngineEvents: Send + Sync {
    /// Fraction `[0.0, 1.0]` of the current invocation completed.
    fn progress(&self, fraction: f64);

    /// One line of engine diagnostics.
    fn log(&self, line: &str);
}

/// Engine that runs export invocations against a private file area.
///
/// Files are addressed by bare names. Implementations must reject names
/// that would escape their file area.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    async fn write_file(&self, name: &str, bytes: &[u8]) -> KeepcutResult<()>;

    /// Place an on-disk file under `name`. Defaults to reading it and
    /// calling [`MediaEngine::write_file`].
    async fn import_file(&self, name: &str, source: &Path) -> KeepcutResult<()> {
        let bytes = tokio::fs::read(source).await?;
        self.write_file(name, &bytes).await
    }

    async fn exec(&self, invocation: &Invocation, events: &dyn EngineEvents) -> KeepcutResult<()>;

    async fn read_file(&self, name: &str) -> KeepcutResult<Vec<u8>>;

    /// Remove `name`. Missing files are not an error.
    async fn delete_file(&self, name: &str) -> KeepcutResult<()>;
}
