use serde::Serialize;
use tracing::debug;

use super::{
    Account, AccountId, Asset, Currency, HiddenString, Payment, ValidationState, WalletsState,
};

/// Every wallet action the application can dispatch.
///
/// Variants under "saga only" drive side effects elsewhere and leave the
/// view state untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WalletsAction {
    ResetStore,
    AccountsReceived {
        accounts: Vec<Account>,
    },
    AssetsReceived {
        account_id: AccountId,
        assets: Vec<Asset>,
    },
    PaymentDetailReceived {
        account_id: AccountId,
        payment_id: String,
        public_note: String,
        public_note_type: String,
        tx_id: String,
    },
    PaymentsReceived {
        account_id: AccountId,
        payments: Vec<Payment>,
    },
    DisplayCurrenciesReceived {
        currencies: Vec<Currency>,
    },
    DisplayCurrencyReceived {
        account_id: AccountId,
        currency: Currency,
    },
    SecretKeyReceived {
        secret_key: HiddenString,
    },
    SecretKeySeen,
    SelectAccount {
        account_id: AccountId,
    },
    ValidateAccountName {
        name: String,
    },
    /// `error` is set when validation failed
    ValidatedAccountName {
        name: String,
        error: Option<String>,
    },
    ValidateSecretKey {
        secret_key: HiddenString,
    },
    ValidatedSecretKey {
        secret_key: HiddenString,
        error: Option<String>,
    },
    ClearErrors,
    LinkedExistingAccount {
        result: Result<AccountId, String>,
    },

    // Saga only
    ExportSecretKey {
        account_id: AccountId,
    },
    LinkExistingAccount {
        name: String,
        secret_key: HiddenString,
    },
    LoadAssets {
        account_id: AccountId,
    },
    LoadPaymentDetail {
        account_id: AccountId,
        payment_id: String,
    },
    LoadPayments {
        account_id: AccountId,
    },
    LoadDisplayCurrencies,
    LoadDisplayCurrency {
        account_id: AccountId,
    },
    ChangeDisplayCurrency {
        account_id: AccountId,
        code: String,
    },
    ChangeAccountName {
        account_id: AccountId,
        name: String,
    },
    DeleteAccount {
        account_id: AccountId,
    },
    LoadAccounts,
}

impl WalletsState {
    pub fn apply(&mut self, action: WalletsAction) {
        match action {
            WalletsAction::ResetStore => *self = WalletsState::default(),
            WalletsAction::AccountsReceived { accounts } => {
                self.account_map = accounts
                    .into_iter()
                    .map(|account| (account.account_id.clone(), account))
                    .collect();
            }
            WalletsAction::AssetsReceived { account_id, assets } => {
                self.assets_map.insert(account_id, assets);
            }
            WalletsAction::PaymentDetailReceived {
                account_id,
                payment_id,
                public_note,
                public_note_type,
                tx_id,
            } => {
                let payment = self
                    .payments_map
                    .get_mut(&account_id)
                    .and_then(|payments| payments.iter_mut().find(|p| p.id == payment_id));
                match payment {
                    Some(payment) => {
                        payment.public_note = public_note;
                        payment.public_note_type = public_note_type;
                        payment.tx_id = tx_id;
                    }
                    None => debug!(%account_id, %payment_id, "payment detail for unknown payment"),
                }
            }
            WalletsAction::PaymentsReceived {
                account_id,
                payments,
            } => {
                self.payments_map.insert(account_id, payments);
            }
            WalletsAction::DisplayCurrenciesReceived { currencies } => {
                self.currencies = currencies;
            }
            WalletsAction::DisplayCurrencyReceived {
                account_id,
                currency,
            } => {
                self.currency_map.insert(account_id, currency);
            }
            WalletsAction::SecretKeyReceived { secret_key } => {
                self.exported_secret_key = secret_key;
            }
            WalletsAction::SecretKeySeen => {
                self.exported_secret_key = HiddenString::default();
            }
            WalletsAction::SelectAccount { account_id } => {
                self.exported_secret_key = HiddenString::default();
                self.selected_account = Some(account_id);
            }
            WalletsAction::ValidateAccountName { name } => {
                self.account_name = name;
                self.account_name_validation_state = ValidationState::Waiting;
            }
            WalletsAction::ValidatedAccountName { name, error } => {
                // Response to an older request
                if name != self.account_name {
                    return;
                }
                self.account_name.clear();
                self.account_name_validation_state = validation_state(&error);
                self.account_name_error = error.unwrap_or_default();
            }
            WalletsAction::ValidateSecretKey { secret_key } => {
                self.secret_key = secret_key;
                self.secret_key_validation_state = ValidationState::Waiting;
            }
            WalletsAction::ValidatedSecretKey { secret_key, error } => {
                if secret_key != self.secret_key {
                    return;
                }
                self.secret_key = HiddenString::default();
                self.secret_key_validation_state = validation_state(&error);
                self.secret_key_error = error.unwrap_or_default();
            }
            WalletsAction::ClearErrors => self.clear_form(),
            WalletsAction::LinkedExistingAccount { result } => match result {
                Ok(account_id) => {
                    self.clear_form();
                    self.selected_account = Some(account_id);
                }
                Err(error) => self.link_existing_account_error = error,
            },
            WalletsAction::ExportSecretKey { .. }
            | WalletsAction::LinkExistingAccount { .. }
            | WalletsAction::LoadAssets { .. }
            | WalletsAction::LoadPaymentDetail { .. }
            | WalletsAction::LoadPayments { .. }
            | WalletsAction::LoadDisplayCurrencies
            | WalletsAction::LoadDisplayCurrency { .. }
            | WalletsAction::ChangeDisplayCurrency { .. }
            | WalletsAction::ChangeAccountName { .. }
            | WalletsAction::DeleteAccount { .. }
            | WalletsAction::LoadAccounts => {}
        }
    }
}

fn validation_state(error: &Option<String>) -> ValidationState {
    if error.is_some() {
        ValidationState::Error
    } else {
        ValidationState::Valid
    }
}
