//! Core client state, separated from the view logic.
//!
//! `ClientState` is the immutable snapshot view models read from, and the
//! single place actions are reduced into.

use std::collections::HashSet;

use crate::badges::BadgeState;
use crate::config::Settings;
use crate::protocol::Action;
use crate::wallets::WalletsState;

/// Who we are and who we follow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigState {
    pub username: String,
    pub following: HashSet<String>,
}

impl ConfigState {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            following: HashSet::new(),
        }
    }

    pub fn is_you(&self, username: &str) -> bool {
        !self.username.is_empty() && self.username == username
    }

    pub fn is_following(&self, username: &str) -> bool {
        self.following.contains(username)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientState {
    pub config: ConfigState,
    /// Last badge state dispatched by the ingester.
    pub badge_state: Option<BadgeState>,
    pub wallets: WalletsState,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            config: ConfigState {
                username: settings.username.clone(),
                following: settings.following.iter().cloned().collect(),
            },
            ..Self::default()
        }
    }

    /// Total unread chat messages from the latest badge state.
    pub fn unread_total(&self) -> i64 {
        self.badge_state.as_ref().map_or(0, BadgeState::total_unread)
    }

    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation is handled by the router, not stored here
            Action::ShowUserProfile { .. }
            | Action::GetProfile { .. }
            | Action::ShowMessageMenu { .. } => {}
            Action::ReceivedBadgeState { badge_state } => {
                self.badge_state = Some(badge_state);
            }
            Action::UpdateFollowing {
                is_tracking,
                username,
            } => {
                if is_tracking {
                    self.config.following.insert(username);
                } else {
                    self.config.following.remove(&username);
                }
            }
            Action::Wallets(action) => self.wallets.apply(action),
        }
    }
}
