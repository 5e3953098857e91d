use std::borrow::Cow;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use winit::event_loop::EventLoopProxy;

use super::slot::{LoadCompletion, LoadTicket};
use super::source::{read_chunked, AssetSource};
use crate::event::ViewerEvent;
use crate::loaders::{Decoder, LoadError};
use crate::scene::SceneAsset;

/// Where workers post finished requests. Delivery must hand the completion
/// to the thread that owns the `AssetSlot`.
pub trait CompletionSink: Send + 'static {
    /// False once the receiving side is gone
    fn deliver(&self, completion: LoadCompletion) -> bool;
}

impl CompletionSink for mpsc::Sender<LoadCompletion> {
    fn deliver(&self, completion: LoadCompletion) -> bool {
        self.send(completion).is_ok()
    }
}

impl CompletionSink for EventLoopProxy<ViewerEvent> {
    fn deliver(&self, completion: LoadCompletion) -> bool {
        self.send_event(ViewerEvent::AssetLoaded(Box::new(completion))).is_ok()
    }
}

/// Runs each request on its own worker thread
pub struct AssetLoader<S> {
    decoder: Arc<dyn Decoder>,
    sink: S,
}

impl<S: CompletionSink + Clone> AssetLoader<S> {
    pub fn new(decoder: Arc<dyn Decoder>, sink: S) -> Self {
        Self { decoder, sink }
    }

    /// Start serving `ticket`. Nothing is delivered for a request that was
    /// abandoned before its result was ready.
    pub fn spawn(&self, ticket: LoadTicket) -> Result<JoinHandle<()>, LoadError> {
        let decoder = Arc::clone(&self.decoder);
        let sink = self.sink.clone();
        let name = ticket.source.name();

        thread::Builder::new()
            .name(format!("asset-load-{}", ticket.id.0))
            .spawn(move || {
                let result = match load(&ticket, decoder.as_ref()) {
                    Some(result) => result,
                    None => {
                        log::debug!("Load {} abandoned while reading", ticket.id);
                        return;
                    }
                };
                if ticket.token.is_cancelled() {
                    log::debug!("Load {} abandoned during decode", ticket.id);
                    return;
                }
                if !sink.deliver(LoadCompletion::new(&ticket, result)) {
                    log::debug!("Load {} finished after the viewer closed", ticket.id);
                }
            })
            .map_err(|source| LoadError::Spawn { name, source })
    }
}

/// Read and decode one request; `None` when abandoned mid-read
pub fn load(ticket: &LoadTicket, decoder: &dyn Decoder) -> Option<Result<SceneAsset, LoadError>> {
    let name = ticket.source.name();

    let bytes: Cow<[u8]> = match &ticket.source {
        AssetSource::Path(path) => match read_chunked(path, &ticket.token, &ticket.progress) {
            Ok(Some(data)) => Cow::Owned(data),
            Ok(None) => return None,
            Err(source) => return Some(Err(LoadError::Read { name, source })),
        },
        AssetSource::Bytes { bytes, .. } => {
            ticket.progress.set_total(bytes.len() as u64);
            ticket.progress.advance(bytes.len() as u64);
            Cow::Borrowed(&bytes[..])
        }
    };

    log::info!("Read {} ({} bytes)", name, bytes.len());
    let start = std::time::Instant::now();
    let result = decoder
        .decode(&name, &bytes, ticket.source.base_dir())
        .map_err(|source| LoadError::Decode {
            name: name.clone(),
            source,
        });
    log::debug!("Decoding {} took {:.2?}", name, start.elapsed());
    Some(result)
}
