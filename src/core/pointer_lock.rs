use winit::window::{CursorGrabMode, Window};

/// Something that can capture and hide the cursor
pub trait CursorGrab {
    /// Try to capture the cursor; true when the grab took effect
    fn grab_cursor(&self) -> bool;

    fn release_cursor(&self);
}

impl CursorGrab for Window {
    fn grab_cursor(&self) -> bool {
        let grabbed = self
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.set_cursor_grab(CursorGrabMode::Confined));

        match grabbed {
            Ok(()) => {
                self.set_cursor_visible(false);
                true
            }
            Err(e) => {
                log::warn!("Pointer lock unavailable: {}", e);
                false
            }
        }
    }

    fn release_cursor(&self) {
        if let Err(e) = self.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("Failed to release cursor grab: {}", e);
        }
        self.set_cursor_visible(true);
    }
}

/// Tracks whether this window currently holds the pointer lock.
/// Mouse-look deltas must only be applied while it does.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerLock {
    locked: bool,
}

impl PointerLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Request the lock on a click inside the surface. No-op when held.
    pub fn request(&mut self, target: &dyn CursorGrab) -> bool {
        if !self.locked {
            self.locked = target.grab_cursor();
            if self.locked {
                log::debug!("Pointer lock acquired");
            }
        }
        self.locked
    }

    /// Release the lock; returns whether it was held
    pub fn release(&mut self, target: &dyn CursorGrab) -> bool {
        let was_locked = self.locked;
        if was_locked {
            target.release_cursor();
            self.locked = false;
            log::debug!("Pointer lock released");
        }
        was_locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct MockSurface {
        grants: bool,
        grabs: Cell<u32>,
        releases: Cell<u32>,
    }

    impl MockSurface {
        fn new(grants: bool) -> Self {
            Self {
                grants,
                grabs: Cell::new(0),
                releases: Cell::new(0),
            }
        }
    }

    impl CursorGrab for MockSurface {
        fn grab_cursor(&self) -> bool {
            self.grabs.set(self.grabs.get() + 1);
            self.grants
        }

        fn release_cursor(&self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    #[test]
    fn test_request_locks_once() {
        let surface = MockSurface::new(true);
        let mut lock = PointerLock::new();

        assert!(lock.request(&surface));
        assert!(lock.request(&surface));
        assert!(lock.is_locked());
        assert_eq!(surface.grabs.get(), 1);
    }

    #[test]
    fn test_denied_grab_stays_unlocked() {
        let surface = MockSurface::new(false);
        let mut lock = PointerLock::new();

        assert!(!lock.request(&surface));
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_release_only_when_locked() {
        let surface = MockSurface::new(true);
        let mut lock = PointerLock::new();

        assert!(!lock.release(&surface));
        assert_eq!(surface.releases.get(), 0);

        lock.request(&surface);
        assert!(lock.release(&surface));
        assert!(!lock.is_locked());
        assert_eq!(surface.releases.get(), 1);
    }
}
