//! Incoming engine notifications and the listener that turns them into
//! actions.

use serde::Deserialize;
use serde_json::Value;

use crate::badges::{BadgeIngester, BadgeState, IngestOutcome};
use crate::error::{Error, Result};
use crate::protocol::{Action, Dispatch};

pub const BADGE_STATE_METHOD: &str = "keybase.1.NotifyBadges.badgeState";
pub const TRACKING_CHANGED_METHOD: &str = "keybase.1.NotifyTracking.trackingChanged";

#[derive(Debug, Clone, PartialEq)]
pub enum IncomingNotification {
    BadgeState(BadgeState),
    TrackingChanged { is_tracking: bool, username: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BadgeStateParams {
    badge_state: BadgeState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingChangedParams {
    is_tracking: bool,
    username: String,
}

impl IncomingNotification {
    /// Decode an RPC notification by method name.
    pub fn from_rpc(method: &str, params: Value) -> Result<Self> {
        match method {
            BADGE_STATE_METHOD => {
                let params: BadgeStateParams = serde_json::from_value(params)?;
                Ok(Self::BadgeState(params.badge_state))
            }
            TRACKING_CHANGED_METHOD => {
                let params: TrackingChangedParams = serde_json::from_value(params)?;
                Ok(Self::TrackingChanged {
                    is_tracking: params.is_tracking,
                    username: params.username,
                })
            }
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

/// What a handled notification led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Badge(IngestOutcome),
    Following,
}

pub struct NotificationListener<D> {
    dispatch: D,
    badges: BadgeIngester,
}

impl<D> NotificationListener<D>
where
    D: Dispatch,
{
    pub fn new(dispatch: D, badges: BadgeIngester) -> Self {
        Self { dispatch, badges }
    }

    pub fn badges(&self) -> &BadgeIngester {
        &self.badges
    }

    pub fn handle(&mut self, notification: IncomingNotification) -> Handled {
        match notification {
            IncomingNotification::BadgeState(badge_state) => {
                Handled::Badge(self.badges.ingest(badge_state))
            }
            IncomingNotification::TrackingChanged {
                is_tracking,
                username,
            } => {
                self.dispatch.dispatch(Action::UpdateFollowing {
                    is_tracking,
                    username,
                });
                Handled::Following
            }
        }
    }

    /// Decode and handle a raw RPC notification.
    pub fn handle_rpc(&mut self, method: &str, params: Value) -> Result<Handled> {
        let notification = IncomingNotification::from_rpc(method, params)?;
        Ok(self.handle(notification))
    }
}
