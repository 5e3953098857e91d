pub mod loader;
pub mod progress;
pub mod slot;
pub mod source;

pub use loader::{AssetLoader, CompletionSink};
pub use progress::LoadProgress;
pub use slot::{
    AssetSlot, CancelToken, DiagnosticSink, LoadCompletion, LoadTicket, LogDiagnostics, RequestId,
    SwapOutcome,
};
pub use source::AssetSource;
