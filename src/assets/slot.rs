use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::progress::LoadProgress;
use super::source::AssetSource;
use crate::loaders::LoadError;
use crate::scene::SceneAsset;

/// Identifier of one file selection, increasing per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-request abandon flag shared between the slot and the worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a worker needs to serve one request
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub id: RequestId,
    pub source: AssetSource,
    pub token: CancelToken,
    pub progress: LoadProgress,
}

/// Result of one request, posted back to the event loop
#[derive(Debug)]
pub struct LoadCompletion {
    pub id: RequestId,
    pub name: String,
    pub token: CancelToken,
    pub result: Result<SceneAsset, LoadError>,
}

impl LoadCompletion {
    pub fn new(ticket: &LoadTicket, result: Result<SceneAsset, LoadError>) -> Self {
        Self {
            id: ticket.id,
            name: ticket.source.name(),
            token: ticket.token.clone(),
            result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The decoded asset is now displayed
    Applied,
    /// Decoding failed; nothing is displayed
    Failed,
    /// The request was abandoned before it arrived; nothing changed
    Discarded,
}

/// Operator-visible channel for load failures
pub trait DiagnosticSink {
    fn report(&mut self, error: &LoadError);
}

#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&mut self, error: &LoadError) {
        log::error!("{}", error);
    }
}

#[derive(Debug)]
struct PendingLoad {
    id: RequestId,
    name: String,
    token: CancelToken,
    progress: LoadProgress,
}

/// The displayed asset plus the at-most-one request that may replace it.
/// Owned and mutated by the event-loop thread only.
pub struct AssetSlot {
    current: Option<Arc<SceneAsset>>,
    pending: Option<PendingLoad>,
    next_id: u64,
    generation: u64,
    last_error: Option<String>,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl AssetSlot {
    pub fn new() -> Self {
        Self::with_diagnostics(Box::new(LogDiagnostics))
    }

    pub fn with_diagnostics(diagnostics: Box<dyn DiagnosticSink>) -> Self {
        Self {
            current: None,
            pending: None,
            next_id: 1,
            generation: 0,
            last_error: None,
            diagnostics,
        }
    }

    /// Start a new request. The previous pending request, if any, is
    /// abandoned; the displayed asset stays until the new one completes.
    pub fn begin(&mut self, source: AssetSource) -> LoadTicket {
        self.abandon_pending();

        let id = RequestId(self.next_id);
        self.next_id += 1;

        let ticket = LoadTicket {
            id,
            source,
            token: CancelToken::new(),
            progress: LoadProgress::new(),
        };
        log::info!("Load {} requested: {}", id, ticket.source.name());

        self.pending = Some(PendingLoad {
            id,
            name: ticket.source.name(),
            token: ticket.token.clone(),
            progress: ticket.progress.clone(),
        });
        ticket
    }

    /// Apply a finished request. Abandoned requests never mutate state.
    pub fn complete(&mut self, completion: LoadCompletion) -> SwapOutcome {
        if completion.token.is_cancelled() {
            log::debug!("Load {} ({}) abandoned, ignoring result", completion.id, completion.name);
            return SwapOutcome::Discarded;
        }

        if self.pending.as_ref().map(|p| p.id) == Some(completion.id) {
            self.pending = None;
        }
        self.generation += 1;

        match completion.result {
            Ok(mut asset) => {
                let marked = asset.enable_shadows();
                log::info!(
                    "Load {} finished: {} ({} nodes, {} shadowed meshes, {} triangles)",
                    completion.id,
                    asset.name,
                    asset.root.node_count(),
                    marked,
                    asset.triangle_count()
                );
                self.current = Some(Arc::new(asset));
                self.last_error = None;
                SwapOutcome::Applied
            }
            Err(error) => {
                self.diagnostics.report(&error);
                self.current = None;
                self.last_error = Some(error.to_string());
                SwapOutcome::Failed
            }
        }
    }

    /// Abandon any pending request and drop the displayed asset
    pub fn clear(&mut self) {
        self.abandon_pending();
        if self.current.take().is_some() {
            self.generation += 1;
        }
        self.last_error = None;
    }

    fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("Abandoning load {} ({})", pending.id, pending.name);
            pending.token.cancel();
        }
    }

    pub fn current(&self) -> Option<&Arc<SceneAsset>> {
        self.current.as_ref()
    }

    /// Bumped whenever the displayed asset changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_name(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.name.as_str())
    }

    /// Floored completion percentage of the pending request
    pub fn progress_percent(&self) -> Option<u32> {
        self.pending.as_ref().map(|p| p.progress.percent())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for AssetSlot {
    fn default() -> Self {
        Self::new()
    }
}
