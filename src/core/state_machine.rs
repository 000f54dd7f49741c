//! State machine for tracking a release run
//!
//! The pipeline is strictly linear. Optional states may be skipped, but a
//! state is never entered twice and the run never moves backwards. Nothing is
//! persisted: a release run either finishes or stops.

use crate::core::error::ReleaseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Release state, declared in pipeline order
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseState {
    #[default]
    Init,
    VersionResolved,
    Cleaned,
    Linted,
    TypeChecked,
    Built,
    StagingPublished,
    VerifyHinted,
    ProductionPublished,
    Done,
    Failed,
}

impl ReleaseState {
    /// States that a run may pass over
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            ReleaseState::StagingPublished
                | ReleaseState::VerifyHinted
                | ReleaseState::ProductionPublished
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseState::Done | ReleaseState::Failed)
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// State transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateTransition {
    /// From state
    pub from: ReleaseState,

    /// To state
    pub to: ReleaseState,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Free-form detail (version, registry, failure reason)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// State machine for tracking the release pipeline
#[derive(Debug, Default)]
pub struct ReleaseStateMachine {
    current_state: ReleaseState,
    transitions: Vec<StateTransition>,
}

impl ReleaseStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward to `to`
    ///
    /// Any non-terminal state may move to `Failed`. Otherwise `to` must come
    /// after the current state, and every mandatory state in between must
    /// already have been visited.
    pub fn transition(
        &mut self,
        to: ReleaseState,
        detail: Option<String>,
    ) -> Result<(), ReleaseError> {
        let from = self.current_state;

        let allowed = if from.is_terminal() {
            false
        } else if to == ReleaseState::Failed {
            true
        } else {
            to > from && Self::skipped(from, to).all(|state| state.is_optional())
        };

        if !allowed {
            return Err(ReleaseError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        tracing::debug!(%from, %to, detail = detail.as_deref().unwrap_or(""), "state transition");

        self.transitions.push(StateTransition {
            from,
            to,
            timestamp: Utc::now(),
            detail,
        });
        self.current_state = to;

        Ok(())
    }

    /// States strictly between `from` and `to`
    fn skipped(from: ReleaseState, to: ReleaseState) -> impl Iterator<Item = ReleaseState> {
        const ORDER: [ReleaseState; 10] = [
            ReleaseState::Init,
            ReleaseState::VersionResolved,
            ReleaseState::Cleaned,
            ReleaseState::Linted,
            ReleaseState::TypeChecked,
            ReleaseState::Built,
            ReleaseState::StagingPublished,
            ReleaseState::VerifyHinted,
            ReleaseState::ProductionPublished,
            ReleaseState::Done,
        ];
        ORDER.into_iter().filter(move |s| *s > from && *s < to)
    }

    /// Get current state
    pub fn state(&self) -> ReleaseState {
        self.current_state
    }

    /// Get transition history as human-readable string
    pub fn history(&self) -> String {
        self.transitions
            .iter()
            .map(|t| {
                let time = t.timestamp.to_rfc3339();
                let detail = t
                    .detail
                    .as_ref()
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default();
                format!("{}: {} → {}{}", time, t.from, t.to, detail)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
