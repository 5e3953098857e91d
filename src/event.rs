use crate::assets::LoadCompletion;

/// Events posted to the winit loop from other threads
#[derive(Debug)]
pub enum ViewerEvent {
    AssetLoaded(Box<LoadCompletion>),
}
