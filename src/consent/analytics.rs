//! Analytics signals and the data layer they are pushed onto.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

/// Milliseconds the analytics tag waits for a consent update after the default.
pub const WAIT_FOR_UPDATE_MS: u64 = 500;

pub const PAGE_VIEW: &str = "page_view";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentValue {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsentParams {
    pub ad_storage: ConsentValue,
    pub ad_user_data: ConsentValue,
    pub ad_personalization: ConsentValue,
    pub analytics_storage: ConsentValue,
}

impl ConsentParams {
    pub const fn all(value: ConsentValue) -> Self {
        Self {
            ad_storage: value,
            ad_user_data: value,
            ad_personalization: value,
            analytics_storage: value,
        }
    }

    pub const fn granted() -> Self {
        Self::all(ConsentValue::Granted)
    }

    pub const fn denied() -> Self {
        Self::all(ConsentValue::Denied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AnalyticsSignal {
    ConsentDefault {
        params: ConsentParams,
        wait_for_update: u64,
    },
    ConsentUpdate {
        params: ConsentParams,
    },
    Event {
        name: String,
    },
}

impl AnalyticsSignal {
    pub fn default_denied() -> Self {
        Self::ConsentDefault { params: ConsentParams::denied(), wait_for_update: WAIT_FOR_UPDATE_MS }
    }

    pub fn page_view() -> Self {
        Self::Event { name: PAGE_VIEW.to_string() }
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn push(&self, signal: AnalyticsSignal);
}

/// Ordered record of every signal pushed, mirrored to `tracing`.
#[derive(Debug, Default)]
pub struct DataLayer {
    entries: Mutex<Vec<AnalyticsSignal>>,
}

impl DataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AnalyticsSignal> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl AnalyticsSink for DataLayer {
    fn push(&self, signal: AnalyticsSignal) {
        let payload = serde_json::to_string(&signal).unwrap_or_default();
        info!(target: "analytics", %payload, "data layer push");
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).push(signal);
    }
}
