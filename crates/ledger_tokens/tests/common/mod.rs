//! In-memory ledger double for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use ledger_tokens::transaction::AnyTransactionData;
use ledger_tokens::{
    AccountId, FrozenTransaction, Identity, KeyCurve, LedgerClient, LedgerError, PrivateKey,
    Status, TokenId, TransactionId, TransactionReceipt, TransactionResponse,
};
use parking_lot::Mutex;

pub fn operator() -> Identity {
    Identity::new(
        AccountId::new(0, 0, 1001),
        PrivateKey::generate(KeyCurve::Ed25519).unwrap(),
    )
}

#[derive(Default)]
struct LedgerState {
    submitted: Vec<FrozenTransaction>,
    receipts: HashMap<TransactionId, TransactionReceipt>,
    associations: HashSet<(AccountId, TokenId)>,
    next_token_num: u64,
    next_serial: HashMap<TokenId, i64>,
    fail_next_submit: Option<String>,
    omit_token_id: bool,
}

/// Verifies signatures, assigns token ids and serials, tracks associations.
pub struct MockLedger {
    operator: Identity,
    state: Mutex<LedgerState>,
}

impl MockLedger {
    pub fn new(operator: Identity) -> Self {
        Self {
            operator,
            state: Mutex::new(LedgerState {
                next_token_num: 5000,
                ..Default::default()
            }),
        }
    }

    pub fn operator_identity(&self) -> &Identity {
        &self.operator
    }

    pub fn submitted(&self) -> Vec<FrozenTransaction> {
        self.state.lock().submitted.clone()
    }

    pub fn last_submitted(&self) -> FrozenTransaction {
        self.state.lock().submitted.last().cloned().expect("nothing submitted")
    }

    pub fn fail_next_submit(&self, message: &str) {
        self.state.lock().fail_next_submit = Some(message.to_string());
    }

    /// Create receipts will carry no token id.
    pub fn omit_token_id(&self) {
        self.state.lock().omit_token_id = true;
    }

    pub fn is_associated(&self, account: AccountId, token: TokenId) -> bool {
        self.state.lock().associations.contains(&(account, token))
    }

    fn apply(state: &mut LedgerState, data: &AnyTransactionData) -> TransactionReceipt {
        match data {
            AnyTransactionData::TokenCreate(_) => {
                let token_id = TokenId::new(0, 0, state.next_token_num);
                state.next_token_num += 1;
                let mut receipt = TransactionReceipt::with_status(Status::Success);
                if !state.omit_token_id {
                    receipt.token_id = Some(token_id);
                }
                receipt
            }
            AnyTransactionData::TokenMint(mint) => {
                let Some(token_id) = mint.token_id() else {
                    return TransactionReceipt::with_status(Status::InvalidTokenId);
                };
                let next = state.next_serial.entry(token_id).or_insert(1);
                let serials: Vec<i64> = (0..mint.metadata().len() as i64).map(|i| *next + i).collect();
                *next += serials.len() as i64;
                let mut receipt = TransactionReceipt::with_status(Status::Success);
                receipt.total_supply = Some((*next - 1) as u64);
                receipt.serial_numbers = serials;
                receipt
            }
            AnyTransactionData::TokenAssociate(associate) => {
                let Some(account) = associate.account_id() else {
                    return TransactionReceipt::with_status(Status::InvalidAccountId);
                };
                let already = associate
                    .token_ids()
                    .iter()
                    .any(|token| state.associations.contains(&(account, *token)));
                if already {
                    return TransactionReceipt::with_status(Status::TokenAlreadyAssociatedToAccount);
                }
                for token in associate.token_ids() {
                    state.associations.insert((account, *token));
                }
                let mut receipt = TransactionReceipt::with_status(Status::Success);
                receipt.account_id = Some(account);
                receipt
            }
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn operator(&self) -> Option<&Identity> {
        Some(&self.operator)
    }

    fn node_account_ids(&self) -> Vec<AccountId> {
        vec![AccountId::new(0, 0, 3), AccountId::new(0, 0, 4)]
    }

    async fn submit(&self, transaction: &FrozenTransaction) -> Result<TransactionResponse, LedgerError> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_next_submit.take() {
            return Err(LedgerError::Transport(message));
        }
        if !transaction.verify_signatures() {
            return Err(LedgerError::Precheck {
                transaction_id: transaction.transaction_id(),
                status: Status::InvalidSignature,
            });
        }

        let receipt = Self::apply(&mut state, &transaction.body().data);
        state.receipts.insert(transaction.transaction_id(), receipt);
        state.submitted.push(transaction.clone());

        Ok(TransactionResponse {
            transaction_id: transaction.transaction_id(),
            node_account_id: transaction.body().node_account_ids[0],
            transaction_hash: transaction.hash(),
        })
    }

    async fn receipt(&self, transaction_id: &TransactionId) -> Result<TransactionReceipt, LedgerError> {
        self.state
            .lock()
            .receipts
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::Transport(format!("no receipt for {transaction_id}")))
    }
}
