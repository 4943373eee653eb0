//! Analytics consent banner.
//!
//! The banner decides, once per process start, whether to ask the user for
//! consent, and translates the stored or explicit choice into analytics
//! signals. It never affects code execution.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::StorageError;

pub mod analytics;
pub mod store;

pub use analytics::{AnalyticsSignal, AnalyticsSink, ConsentParams, DataLayer};
pub use store::{ConsentStore, FileConsentStore, MemoryConsentStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentState {
    #[default]
    Unset,
    Granted,
    Denied,
}

impl ConsentState {
    pub fn parse(value: &str) -> Result<Self, StorageError> {
        match value.trim() {
            "" => Ok(Self::Unset),
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            other => Err(StorageError::InvalidValue(other.to_string())),
        }
    }

    pub fn as_stored(self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::Granted => Some("granted"),
            Self::Denied => Some("denied"),
        }
    }
}

/// What `initialize` decided about showing the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerDecision {
    /// Do-not-track is on; consent stays denied and nothing is stored.
    Suppressed,
    /// A stored choice exists; it has been applied.
    Remembered(ConsentState),
    /// No stored choice; the banner is visible.
    Show,
}

pub struct ConsentBanner {
    store: Arc<dyn ConsentStore>,
    sink: Arc<dyn AnalyticsSink>,
    do_not_track: bool,
    state: ConsentState,
    visible: bool,
}

impl ConsentBanner {
    pub fn new(store: Arc<dyn ConsentStore>, sink: Arc<dyn AnalyticsSink>, do_not_track: bool) -> Self {
        Self { store, sink, do_not_track, state: ConsentState::Unset, visible: false }
    }

    pub fn state(&self) -> ConsentState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Apply the startup rules. Call once, when the screen is ready to draw.
    pub fn initialize(&mut self) -> BannerDecision {
        self.sink.push(AnalyticsSignal::default_denied());

        if self.do_not_track {
            debug!("do-not-track set, consent banner suppressed");
            self.state = ConsentState::Denied;
            return BannerDecision::Suppressed;
        }

        let stored = self.store.load().unwrap_or_else(|err| {
            debug!(error = %err, "consent storage unreadable, treating as unset");
            ConsentState::Unset
        });
        self.state = stored;

        match stored {
            ConsentState::Granted => {
                self.sink.push(AnalyticsSignal::ConsentUpdate { params: ConsentParams::granted() });
                self.sink.push(AnalyticsSignal::page_view());
                BannerDecision::Remembered(stored)
            }
            ConsentState::Denied => BannerDecision::Remembered(stored),
            ConsentState::Unset => {
                self.visible = true;
                BannerDecision::Show
            }
        }
    }

    pub fn accept(&mut self) {
        self.choose(ConsentState::Granted);
        self.sink.push(AnalyticsSignal::ConsentUpdate { params: ConsentParams::granted() });
        self.sink.push(AnalyticsSignal::page_view());
    }

    pub fn reject(&mut self) {
        self.choose(ConsentState::Denied);
        self.sink.push(AnalyticsSignal::ConsentUpdate { params: ConsentParams::denied() });
    }

    fn choose(&mut self, state: ConsentState) {
        if let Err(err) = self.store.save(state) {
            debug!(error = %err, "consent not persisted");
        }
        info!(consent = ?state, "consent recorded");
        self.state = state;
        self.visible = false;
    }
}
