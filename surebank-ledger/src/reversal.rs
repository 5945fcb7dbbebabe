//! Transaction reversal.
//!
//! Archiving never deletes a transaction. It flags it, backs its amount out
//! of the account balance, corrects the opening balance of every later live
//! transaction on the account, and backs the amount out of the summary of
//! the day it was posted. All of it commits together under the account lock.

use tracing::{info, instrument};

use surebank_types::{
    AccountStore, Actor, AppError, ArchiveRequest, DomainError, LedgerStore, Role, SummaryDelta,
    Transaction, TransactionId, TransactionStore, UnitOfWork,
};

use crate::service::{LedgerService, authorize};

fn not_found(id: TransactionId) -> AppError {
    AppError::NotFound(format!("Transaction {}", id))
}

impl<S: LedgerStore> LedgerService<S> {
    /// Archives a transaction. Admins only.
    #[instrument(skip(self, actor), fields(transaction_id = %req.transaction_id))]
    pub async fn archive(&self, actor: &Actor, req: ArchiveRequest) -> Result<Transaction, AppError> {
        authorize(actor)?;
        if !actor.has_role(Role::Admin) {
            return Err(AppError::Forbidden("admin role required".into()));
        }
        self.reverse(req.transaction_id)
            .await
            .map_err(|e| e.context("archive"))
    }

    async fn reverse(&self, id: TransactionId) -> Result<Transaction, AppError> {
        let account_id = {
            let mut uow = self.store().begin().await?;
            uow.transaction_by_id(id)
                .await?
                .ok_or_else(|| not_found(id))?
                .account_id
        };

        let _guard = self.locks().acquire(account_id).await;
        let mut uow = self.store().begin().await?;

        // Re-read under the lock: a concurrent archive may have won.
        let mut transaction = uow
            .transaction_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        if transaction.is_archived() {
            return Err(DomainError::AlreadyArchived(id).into());
        }

        let now = self.now();
        let delta = transaction.reversal_delta();
        uow.archive_transaction(id, now).await?;
        let balance = uow
            .update_balance(transaction.account_id, delta, None, now)
            .await?;
        let corrected = uow
            .shift_opening_balances(transaction.account_id, transaction.sequence, delta)
            .await?;
        self.summaries()
            .apply(&mut uow, transaction.created_at, SummaryDelta::income(delta))
            .await?;
        uow.commit().await?;

        transaction.archived_at = Some(now);
        transaction.updated_at = now;
        info!(
            receipt = %transaction.receipt_no,
            delta,
            balance,
            corrected,
            "transaction archived"
        );
        Ok(transaction)
    }
}
