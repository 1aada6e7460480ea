//! Wallet view state: accounts, assets, payments and the account-linking
//! forms, updated by [`WalletsAction`]s.

mod reducer;

pub use reducer::WalletsAction;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A secret that never shows up in `Debug` output or logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiddenString(String);

impl HiddenString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HiddenString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HiddenString(<redacted>)")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: AccountId,
    pub name: String,
    pub balance_description: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub issuer: String,
    pub balance_total: String,
    pub worth: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub amount_description: String,
    pub delta: String,
    pub public_note: String,
    pub public_note_type: String,
    pub tx_id: String,
    pub timestamp: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub description: String,
}

/// Progress of an asynchronous form-field validation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationState {
    #[default]
    None,
    Waiting,
    Error,
    Valid,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletsState {
    pub account_map: HashMap<AccountId, Account>,
    pub assets_map: HashMap<AccountId, Vec<Asset>>,
    pub payments_map: HashMap<AccountId, Vec<Payment>>,
    pub currencies: Vec<Currency>,
    pub currency_map: HashMap<AccountId, Currency>,
    pub exported_secret_key: HiddenString,
    pub selected_account: Option<AccountId>,

    pub account_name: String,
    pub account_name_error: String,
    pub account_name_validation_state: ValidationState,
    pub secret_key: HiddenString,
    pub secret_key_error: String,
    pub secret_key_validation_state: ValidationState,
    pub link_existing_account_error: String,
}

impl WalletsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Account> {
        self.selected_account
            .as_ref()
            .and_then(|id| self.account_map.get(id))
    }

    /// Reset the link-account form inputs and their errors.
    fn clear_form(&mut self) {
        self.account_name.clear();
        self.account_name_error.clear();
        self.account_name_validation_state = ValidationState::None;
        self.link_existing_account_error.clear();
        self.secret_key = HiddenString::default();
        self.secret_key_error.clear();
        self.secret_key_validation_state = ValidationState::None;
    }
}
