//! View model for a single message row in the conversation timeline.
//!
//! Combines the client snapshot, the message and its predecessor into the
//! props the row renders from, plus handlers that dispatch the row's
//! actions.

use serde::Serialize;

use crate::message::Message;
use crate::protocol::{Action, Dispatch, MenuPosition, TargetRect};
use crate::state::ClientState;
use crate::timeline::{annotate_with_oracle, LoadMoreState, OldestOrdinalOracle};
use crate::timestamp::TimeFormatter;

/// Per-row UI flags owned by the list, not by the message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowState {
    pub is_editing: bool,
    pub is_selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapperProps {
    pub author: String,
    pub failure_description: Option<String>,
    pub include_header: bool,
    pub is_broken: bool,
    pub is_edited: bool,
    pub is_editing: bool,
    pub is_first_new_message: bool,
    pub is_following: bool,
    pub is_revoked: bool,
    pub is_selected: bool,
    pub is_you: bool,
    pub load_more: LoadMoreState,
    pub timestamp: Option<String>,
}

pub fn wrapper_props(
    state: &ClientState,
    message: &Message,
    previous: Option<&Message>,
    row: RowState,
    oracle: &impl OldestOrdinalOracle,
    formatter: &impl TimeFormatter,
) -> WrapperProps {
    let annotation = annotate_with_oracle(message, previous, oracle, formatter);

    WrapperProps {
        author: message.author.clone(),
        failure_description: None,
        include_header: annotation.include_header,
        // TODO: derive from the tracker's broken-proof state once it is in ClientState
        is_broken: false,
        is_edited: message.has_been_edited,
        is_editing: row.is_editing,
        is_first_new_message: false,
        is_following: state.config.is_following(&message.author),
        is_revoked: message.is_revoked(),
        is_selected: row.is_selected,
        is_you: state.config.is_you(&message.author),
        load_more: annotation.load_more,
        timestamp: annotation.timestamp_label,
    }
}

/// Row callbacks bound to a dispatch sink
pub struct WrapperHandlers<'a, D: Dispatch> {
    dispatch: &'a D,
    is_mobile: bool,
}

impl<'a, D: Dispatch> WrapperHandlers<'a, D> {
    pub fn new(dispatch: &'a D, is_mobile: bool) -> Self {
        Self {
            dispatch,
            is_mobile,
        }
    }

    pub fn on_author_click(&self, username: &str) {
        let username = username.to_string();
        let action = if self.is_mobile {
            Action::ShowUserProfile { username }
        } else {
            Action::GetProfile {
                username,
                force_display: true,
                ignore_cache: true,
            }
        };
        self.dispatch.dispatch(action);
    }

    pub fn on_show_menu(&self, message: &Message, target_rect: Option<TargetRect>) {
        self.dispatch.dispatch(Action::ShowMessageMenu {
            ordinal: message.ordinal,
            position: MenuPosition::BottomLeft,
            target_rect,
        });
    }
}
