use crate::domain::basket::InvoiceLine;
use crate::domain::config::flexible_id;
use crate::domain::ports::{HostLedger, InvoicePayment};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An invoice as the host exposes it to gateway modules.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invoice {
    #[serde(deserialize_with = "flexible_id")]
    pub id: u64,
    #[serde(rename = "userid", deserialize_with = "flexible_id")]
    pub user_id: u64,
    #[serde(default)]
    pub items: Vec<InvoiceLine>,
}

/// One entry of the host's gateway transaction log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLogEntry {
    pub gateway: String,
    pub payload: serde_json::Value,
    pub status: String,
}

/// One entry of the host's module debug log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleLogEntry {
    pub module: String,
    pub action: String,
    pub request: serde_json::Value,
    pub response: String,
}

#[derive(Debug, Default)]
struct LedgerState {
    invoices: HashMap<u64, Invoice>,
    payments: Vec<InvoicePayment>,
    transaction_log: Vec<TransactionLogEntry>,
    module_log: Vec<ModuleLogEntry>,
}

/// A thread-safe in-memory stand-in for the host's database.
///
/// Clones share state. Backs the CLI, which receives the invoices it needs
/// in its input document.
#[derive(Default, Clone)]
pub struct InMemoryHostLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryHostLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoices(invoices: impl IntoIterator<Item = Invoice>) -> Self {
        let state = LedgerState {
            invoices: invoices.into_iter().map(|i| (i.id, i)).collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.state.write().await.invoices.insert(invoice.id, invoice);
    }

    pub async fn payments(&self) -> Vec<InvoicePayment> {
        self.state.read().await.payments.clone()
    }

    pub async fn transaction_log(&self) -> Vec<TransactionLogEntry> {
        self.state.read().await.transaction_log.clone()
    }

    pub async fn module_log(&self) -> Vec<ModuleLogEntry> {
        self.state.read().await.module_log.clone()
    }
}

#[async_trait]
impl HostLedger for InMemoryHostLedger {
    async fn invoice_lines(&self, invoice_id: u64) -> Result<Vec<InvoiceLine>> {
        let state = self.state.read().await;
        Ok(state
            .invoices
            .get(&invoice_id)
            .map(|i| i.items.clone())
            .unwrap_or_default())
    }

    async fn invoice_owner(&self, invoice_id: u64) -> Result<Option<u64>> {
        let state = self.state.read().await;
        Ok(state.invoices.get(&invoice_id).map(|i| i.user_id))
    }

    async fn invoice_exists(&self, invoice_id: u64) -> Result<bool> {
        Ok(self.state.read().await.invoices.contains_key(&invoice_id))
    }

    async fn transaction_exists(&self, transaction_id: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .iter()
            .any(|p| p.transaction_id == transaction_id))
    }

    async fn add_invoice_payment(&self, payment: InvoicePayment) -> Result<()> {
        self.state.write().await.payments.push(payment);
        Ok(())
    }

    async fn log_transaction(
        &self,
        gateway: &str,
        payload: &serde_json::Value,
        status: &str,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .transaction_log
            .push(TransactionLogEntry {
                gateway: gateway.to_string(),
                payload: payload.clone(),
                status: status.to_string(),
            });
        Ok(())
    }

    async fn log_module_call(
        &self,
        module: &str,
        action: &str,
        request: &serde_json::Value,
        response: &str,
    ) -> Result<()> {
        self.state.write().await.module_log.push(ModuleLogEntry {
            module: module.to_string(),
            action: action.to_string(),
            request: request.clone(),
            response: response.to_string(),
        });
        Ok(())
    }
}
