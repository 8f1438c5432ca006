//! Per-view request state
//!
//! Each view allows one outstanding generation at a time:
//!
//! ```text
//!   Idle ──begin──▶ Loading ──complete──▶ Ready
//!     ▲               │  └──fail/drop──▶ Failed
//!     └────reset──────┘
//! ```
//!
//! `begin` is refused while a view is `Loading`. A reset returns the view to
//! `Idle`, after which the superseded request's outcome is ignored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

/// Views that issue remote requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Chart,
    Stars,
    Horoscope,
    FloorPlan,
    Design,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::Chart,
        ViewKind::Stars,
        ViewKind::Horoscope,
        ViewKind::FloorPlan,
        ViewKind::Design,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ViewKind::Chart => "chart",
            ViewKind::Stars => "stars",
            ViewKind::Horoscope => "horoscope",
            ViewKind::FloorPlan => "floor-plan",
            ViewKind::Design => "design",
        }
    }

    pub fn from_key(key: &str) -> Option<ViewKind> {
        Self::ALL.iter().copied().find(|v| v.key() == key)
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Loading {
        request_id: Uuid,
        started_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Ready {
        request_id: Uuid,
        completed_at: DateTime<Utc>,
        data: Value,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        request_id: Uuid,
        completed_at: DateTime<Utc>,
        error: String,
    },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    fn loading_id(&self) -> Option<Uuid> {
        match self {
            ViewState::Loading { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }
}

/// `begin` refused because the view is already loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBusy {
    pub view: ViewKind,
    pub request_id: Uuid,
}

impl fmt::Display for ViewBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "View '{}' is already loading (request {})",
            self.view, self.request_id
        )
    }
}

impl std::error::Error for ViewBusy {}

type Slots = HashMap<ViewKind, ViewState>;

/// Shared state of every view
#[derive(Clone, Default)]
pub struct ViewRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, view: ViewKind) -> ViewState {
        self.lock().get(&view).cloned().unwrap_or(ViewState::Idle)
    }

    /// Start a request for a view
    pub fn begin(&self, view: ViewKind) -> Result<ViewTicket, ViewBusy> {
        let mut slots = self.lock();
        if let Some(request_id) = slots.get(&view).and_then(ViewState::loading_id) {
            return Err(ViewBusy { view, request_id });
        }

        let request_id = Uuid::new_v4();
        slots.insert(
            view,
            ViewState::Loading {
                request_id,
                started_at: Utc::now(),
            },
        );
        debug!(view = %view, request_id = %request_id, "View loading");

        Ok(ViewTicket {
            registry: self.clone(),
            view,
            request_id,
            settled: false,
        })
    }

    /// Return a view to `Idle`, superseding any in-flight request
    pub fn reset(&self, view: ViewKind) -> ViewState {
        let previous = self.lock().insert(view, ViewState::Idle);
        debug!(view = %view, "View reset");
        previous.unwrap_or(ViewState::Idle)
    }

    /// Replace `Loading(request_id)` with `next`; false if the request was superseded
    fn settle(&self, view: ViewKind, request_id: Uuid, next: ViewState) -> bool {
        let mut slots = self.lock();
        let current = slots.get(&view).and_then(ViewState::loading_id);
        if current != Some(request_id) {
            debug!(view = %view, request_id = %request_id, "Ignoring outcome of superseded request");
            return false;
        }
        slots.insert(view, next);
        true
    }
}

/// Handle on one in-flight request
///
/// Dropping an unsettled ticket marks the view `Failed`.
pub struct ViewTicket {
    registry: ViewRegistry,
    view: ViewKind,
    request_id: Uuid,
    settled: bool,
}

impl ViewTicket {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Record success; returns false when the request was superseded
    pub fn complete(mut self, data: Value) -> bool {
        self.settled = true;
        self.registry.settle(
            self.view,
            self.request_id,
            ViewState::Ready {
                request_id: self.request_id,
                completed_at: Utc::now(),
                data,
            },
        )
    }

    /// Record failure; returns false when the request was superseded
    pub fn fail(mut self, error: impl Into<String>) -> bool {
        self.settled = true;
        self.registry.settle(
            self.view,
            self.request_id,
            ViewState::Failed {
                request_id: self.request_id,
                completed_at: Utc::now(),
                error: error.into(),
            },
        )
    }
}

impl Drop for ViewTicket {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let marked = self.registry.settle(
            self.view,
            self.request_id,
            ViewState::Failed {
                request_id: self.request_id,
                completed_at: Utc::now(),
                error: "Request was cancelled".to_string(),
            },
        );
        if marked {
            warn!(view = %self.view, request_id = %self.request_id, "Request dropped mid-flight");
        }
    }
}
