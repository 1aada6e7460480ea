use crossbeam_channel::Sender;
use serde::Serialize;
use tracing::debug;

use crate::badges::BadgeState;
use crate::message::Ordinal;
use crate::wallets::WalletsAction;

/// Screen rectangle a menu is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuPosition {
    BottomLeft,
}

/// Actions sent from the view logic to the application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// Open the full profile screen (mobile)
    ShowUserProfile { username: String },
    /// Fetch and show the profile popup (desktop)
    GetProfile {
        username: String,
        force_display: bool,
        ignore_cache: bool,
    },
    /// Show the per-message action menu
    ShowMessageMenu {
        ordinal: Ordinal,
        position: MenuPosition,
        target_rect: Option<TargetRect>,
    },
    /// A badge state accepted by the ingester
    ReceivedBadgeState { badge_state: BadgeState },
    /// We started or stopped following someone
    UpdateFollowing { is_tracking: bool, username: String },
    Wallets(WalletsAction),
}

/// Sink for actions. Results are never inspected.
pub trait Dispatch {
    fn dispatch(&self, action: Action);
}

impl Dispatch for Sender<Action> {
    fn dispatch(&self, action: Action) {
        // Receiver gone means the app is shutting down
        if self.send(action).is_err() {
            debug!("action receiver dropped; discarding action");
        }
    }
}
