//! Privacy cover for the task switcher
//!
//! The cover hides vault content from the app-switcher snapshot. It is shown
//! the moment the app resigns active and hidden when it becomes active again,
//! whatever the auto-lock timeout says.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Cover visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverState {
    /// Content visible
    Hidden,
    /// Content covered
    Shown,
}

/// Platform view that actually draws the cover
pub trait CoverSurface: Send + Sync {
    /// Make the cover visible
    fn show(&self);

    /// Hide the cover
    fn hide(&self);
}

/// Privacy cover manager
///
/// Until a surface is attached, only the state is tracked.
pub struct PrivacyCover {
    state: RwLock<CoverState>,
    surface: RwLock<Option<Arc<dyn CoverSurface>>>,
    attached: AtomicBool,
    shown_count: AtomicU32,
}

impl PrivacyCover {
    /// Create a hidden cover with no surface
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CoverState::Hidden),
            surface: RwLock::new(None),
            attached: AtomicBool::new(false),
            shown_count: AtomicU32::new(0),
        }
    }

    /// Attach the platform surface (called once at window setup)
    pub fn attach(&self, surface: Arc<dyn CoverSurface>) {
        surface.hide();
        *self.surface.write() = Some(surface);
        self.attached.store(true, Ordering::SeqCst);
        *self.state.write() = CoverState::Hidden;
    }

    /// Whether a surface is attached
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Current state
    pub fn state(&self) -> CoverState {
        *self.state.read()
    }

    /// Whether content is covered
    pub fn is_shown(&self) -> bool {
        self.state() == CoverState::Shown
    }

    /// Number of times the cover was raised
    pub fn shown_count(&self) -> u32 {
        self.shown_count.load(Ordering::SeqCst)
    }

    /// Cover content
    pub fn show(&self) {
        if let Some(surface) = self.surface.read().as_ref() {
            surface.show();
        }
        let mut state = self.state.write();
        if *state != CoverState::Shown {
            *state = CoverState::Shown;
            self.shown_count.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Privacy cover shown");
        }
    }

    /// Reveal content
    pub fn hide(&self) {
        if let Some(surface) = self.surface.read().as_ref() {
            surface.hide();
        }
        let mut state = self.state.write();
        if *state != CoverState::Hidden {
            *state = CoverState::Hidden;
            tracing::debug!("Privacy cover hidden");
        }
    }
}

impl Default for PrivacyCover {
    fn default() -> Self {
        Self::new()
    }
}
