mod common;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use glb_viewer::assets::loader::load;
use glb_viewer::assets::{AssetLoader, AssetSlot, AssetSource, DiagnosticSink, SwapOutcome};
use glb_viewer::loaders::{DecodeError, Decoder, GltfDecoder, LoadError};
use glb_viewer::scene::SceneAsset;

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// Holds each named decode until the test opens its gate
#[derive(Default)]
struct GatedDecoder {
    gates: Mutex<HashMap<String, mpsc::Receiver<()>>>,
}

impl GatedDecoder {
    fn gate(&self, name: &str) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(name.to_string(), rx);
        tx
    }
}

impl Decoder for GatedDecoder {
    fn decode(&self, name: &str, bytes: &[u8], base: Option<&Path>) -> Result<SceneAsset, DecodeError> {
        let gate = self.gates.lock().unwrap().remove(name);
        if let Some(gate) = gate {
            gate.recv_timeout(RECV_TIMEOUT).ok();
        }
        GltfDecoder.decode(name, bytes, base)
    }
}

/// Sleeps a fixed time per name before decoding
struct DelayedDecoder {
    delays: HashMap<String, Duration>,
}

impl Decoder for DelayedDecoder {
    fn decode(&self, name: &str, bytes: &[u8], base: Option<&Path>) -> Result<SceneAsset, DecodeError> {
        if let Some(delay) = self.delays.get(name) {
            thread::sleep(*delay);
        }
        GltfDecoder.decode(name, bytes, base)
    }
}

#[derive(Clone, Default)]
struct RecordingDiagnostics(Arc<Mutex<Vec<String>>>);

impl DiagnosticSink for RecordingDiagnostics {
    fn report(&mut self, error: &LoadError) {
        self.0.lock().unwrap().push(error.to_string());
    }
}

fn model(name: &str) -> AssetSource {
    AssetSource::bytes(name, common::triangle_glb())
}

#[cfg(test)]
mod asset_swap_tests {
    use super::*;

    #[test]
    fn test_valid_load_is_displayed_with_shadows() {
        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(Arc::new(GltfDecoder), tx);
        let mut slot = AssetSlot::new();

        loader.spawn(slot.begin(model("tri.glb"))).unwrap();
        let outcome = slot.complete(rx.recv_timeout(RECV_TIMEOUT).unwrap());

        assert_eq!(outcome, SwapOutcome::Applied);
        assert!(!slot.is_loading());
        let asset = slot.current().unwrap();
        assert_eq!(asset.name, "tri.glb");
        asset.root.traverse(&mut |node| {
            assert_eq!(node.cast_shadow, node.is_mesh());
            assert_eq!(node.receive_shadow, node.is_mesh());
        });
    }

    #[test]
    fn test_invalid_load_clears_display_and_reports_once() {
        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(Arc::new(GltfDecoder), tx);
        let diagnostics = RecordingDiagnostics::default();
        let mut slot = AssetSlot::with_diagnostics(Box::new(diagnostics.clone()));

        loader.spawn(slot.begin(model("good.glb"))).unwrap();
        slot.complete(rx.recv_timeout(RECV_TIMEOUT).unwrap());
        assert!(slot.current().is_some());

        let broken = AssetSource::bytes("broken.glb", common::invalid_bytes());
        loader.spawn(slot.begin(broken)).unwrap();
        let outcome = slot.complete(rx.recv_timeout(RECV_TIMEOUT).unwrap());

        assert_eq!(outcome, SwapOutcome::Failed);
        assert!(slot.current().is_none());
        let reports = diagnostics.0.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("broken.glb"));
        assert!(slot.last_error().is_some());
    }

    #[test]
    fn test_later_request_wins_when_it_finishes_first() {
        let decoder = Arc::new(GatedDecoder::default());
        let release_a = decoder.gate("a.glb");
        let release_b = decoder.gate("b.glb");

        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(decoder.clone() as Arc<dyn Decoder>, tx);
        let mut slot = AssetSlot::new();

        let worker_a = loader.spawn(slot.begin(model("a.glb"))).unwrap();
        let worker_b = loader.spawn(slot.begin(model("b.glb"))).unwrap();

        release_b.send(()).unwrap();
        let b = rx.recv_timeout(RECV_TIMEOUT).unwrap();
        assert_eq!(b.name, "b.glb");
        assert_eq!(slot.complete(b), SwapOutcome::Applied);
        worker_b.join().unwrap();

        release_a.send(()).unwrap();
        worker_a.join().unwrap();

        // A was abandoned when B began, so its worker posts nothing
        assert!(rx.try_recv().is_err());
        assert_eq!(slot.current().unwrap().name, "b.glb");
    }

    #[test]
    fn test_abandoned_result_arriving_late_is_discarded() {
        let mut slot = AssetSlot::new();

        let ticket_a = slot.begin(model("a.glb"));
        let ticket_b = slot.begin(model("b.glb"));

        let b = load(&ticket_b, &GltfDecoder).unwrap();
        let a = load(&ticket_a, &GltfDecoder).unwrap();

        let completion_b = glb_viewer::assets::LoadCompletion::new(&ticket_b, b);
        let completion_a = glb_viewer::assets::LoadCompletion::new(&ticket_a, a);

        assert_eq!(slot.complete(completion_b), SwapOutcome::Applied);
        let generation = slot.generation();
        assert_eq!(slot.complete(completion_a), SwapOutcome::Discarded);

        assert_eq!(slot.current().unwrap().name, "b.glb");
        assert_eq!(slot.generation(), generation);
    }

    #[test]
    fn test_slow_first_request_never_overwrites_fast_second() {
        let delays = HashMap::from([
            ("a.glb".to_string(), Duration::from_millis(300)),
            ("b.glb".to_string(), Duration::from_millis(30)),
        ]);
        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(Arc::new(DelayedDecoder { delays }), tx);
        let mut slot = AssetSlot::new();

        let worker_a = loader.spawn(slot.begin(model("a.glb"))).unwrap();
        thread::sleep(Duration::from_millis(75));
        let worker_b = loader.spawn(slot.begin(model("b.glb"))).unwrap();

        worker_a.join().unwrap();
        worker_b.join().unwrap();

        let mut applied = Vec::new();
        while let Ok(completion) = rx.try_recv() {
            let name = completion.name.clone();
            if slot.complete(completion) == SwapOutcome::Applied {
                applied.push(name);
            }
        }

        assert_eq!(applied, vec!["b.glb".to_string()]);
        assert_eq!(slot.current().unwrap().name, "b.glb");
        assert!(!slot.is_loading());
    }

    #[test]
    fn test_new_request_keeps_previous_asset_until_ready() {
        let decoder = Arc::new(GatedDecoder::default());
        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(decoder.clone() as Arc<dyn Decoder>, tx);
        let mut slot = AssetSlot::new();

        loader.spawn(slot.begin(model("first.glb"))).unwrap();
        slot.complete(rx.recv_timeout(RECV_TIMEOUT).unwrap());

        let release = decoder.gate("second.glb");
        loader.spawn(slot.begin(model("second.glb"))).unwrap();

        assert!(slot.is_loading());
        assert_eq!(slot.pending_name(), Some("second.glb"));
        assert_eq!(slot.current().unwrap().name, "first.glb");

        release.send(()).unwrap();
        slot.complete(rx.recv_timeout(RECV_TIMEOUT).unwrap());
        assert_eq!(slot.current().unwrap().name, "second.glb");
    }

    #[test]
    fn test_clear_abandons_in_flight_request() {
        let decoder = Arc::new(GatedDecoder::default());
        let release = decoder.gate("slow.glb");
        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(decoder.clone() as Arc<dyn Decoder>, tx);
        let mut slot = AssetSlot::new();

        let worker = loader.spawn(slot.begin(model("slow.glb"))).unwrap();
        slot.clear();
        release.send(()).unwrap();
        worker.join().unwrap();

        assert!(rx.try_recv().is_err());
        assert!(slot.current().is_none());
        assert!(!slot.is_loading());
    }
}
