//! Ledger Application Service
//!
//! Orchestrates account and posting operations through the store port.
//! Contains NO infrastructure logic - pure business orchestration.
//!
//! Every write follows the same shape: validate, resolve the account, take
//! the account's lock, run all postings in one unit of work, commit, release
//! the lock and only then notify the customer.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde_json::json;
use tracing::{info, instrument, warn};

use surebank_types::{
    Account, AccountId, AccountStore, AccountType, Actor, AppError, Clock, Commission, CommissionId,
    CommissionStore, DeductionRequest, DepositRequest, DomainError, LedgerStore, Money, Notifier,
    OpenAccountRequest, PaymentMethod, SmsTemplate, SummaryDelta, Transaction, TransactionId,
    TransactionStore, TransactionType, UnitOfWork, Validate, ValidationErrors, WithdrawRequest,
    format_minor_units,
};

use crate::config::{CYCLE_FEE_NARRATION, LedgerConfig};
use crate::cycle::ContributionCycleManager;
use crate::identifier::{IdentifierGenerator, Reservation};
use crate::locks::AccountLocks;
use crate::summary::SummaryAggregator;

/// Gap between consecutive DS unit postings of one deposit.
const UNIT_SPACING_SECS: i64 = 4;

/// Gap between a cycle-opening contribution and its fee.
const FEE_DELAY_SECS: i64 = 2;

/// Application service for ledger operations.
///
/// Generic over `S: LedgerStore` - the adapter is injected at compile time.
/// Notifier and clock are trait objects so tests can swap them freely.
pub struct LedgerService<S: LedgerStore> {
    store: S,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
    locks: AccountLocks,
    identifiers: IdentifierGenerator,
    cycles: ContributionCycleManager,
    summaries: SummaryAggregator,
}

/// Rejects callers without a subject.
pub(crate) fn authorize(actor: &Actor) -> Result<(), AppError> {
    if actor.is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Forbidden("authentication required".into()))
    }
}

/// Validates a strictly positive amount.
pub(crate) fn positive_amount(amount: i64) -> Result<Money, AppError> {
    let mut errors = ValidationErrors::new();
    errors.check(amount <= 0, "amount", "must be greater than zero");
    errors.into_result()?;
    Ok(Money::new(amount)?)
}

/// One entry to write inside a unit of work.
struct Posting {
    transaction_type: TransactionType,
    amount: Money,
    narration: String,
    payment_method: Option<PaymentMethod>,
    created_at: DateTime<Utc>,
}

/// What one posting step wrote.
struct Posted {
    transaction: Transaction,
    /// Cycle fee taken right after a cycle-opening contribution.
    fee: Option<Transaction>,
    /// Account balance after the posting and its fee.
    balance: i64,
}

/// Committed result of a batch of postings on one account.
struct Batch {
    account: Account,
    transactions: Vec<Transaction>,
    fees: Vec<Transaction>,
    balance: i64,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a new ledger service.
    pub fn new(
        store: S,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            locks: AccountLocks::new(),
            identifiers: IdentifierGenerator::new(config.identifier_attempts),
            cycles: ContributionCycleManager::new(config.calendar, config.cycle_length_days),
            summaries: SummaryAggregator::new(config.calendar),
            store,
            notifier,
            clock,
            config,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current time at the microsecond precision stores keep.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    pub(crate) fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    pub(crate) fn summaries(&self) -> &SummaryAggregator {
        &self.summaries
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Account Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a new account owned by the acting teller.
    #[instrument(skip(self, actor, req), fields(account_type = %req.account_type))]
    pub async fn open_account(
        &self,
        actor: &Actor,
        req: OpenAccountRequest,
    ) -> Result<Account, AppError> {
        authorize(actor)?;
        req.validate()?;
        let target = Money::new(req.target)?;
        let now = self.now();

        let result: Result<Account, AppError> = async {
            let mut uow = self.store.begin().await?;
            let number = self
                .identifiers
                .account_number(&mut uow, req.account_type)
                .await?;
            let account = Account {
                id: AccountId::new(),
                number: number.value().to_string(),
                account_type: req.account_type,
                balance: 0,
                target,
                target_info: req.target_info,
                customer_id: req.customer_id,
                customer_name: req.customer_name,
                phone_number: req.phone_number,
                sales_rep_id: actor.subject.clone(),
                branch_id: req.branch_id,
                last_payment_date: None,
                created_at: now,
                updated_at: now,
                archived_at: None,
            };
            uow.insert_account(&account).await?;
            uow.commit().await?;
            Ok::<Account, AppError>(account)
        }
        .await;

        let account = result.map_err(|e| e.context("open_account"))?;
        info!(number = %account.number, "account opened");
        Ok(account)
    }

    /// Gets an account by its number.
    pub async fn get_account(&self, number: &str) -> Result<Account, AppError> {
        let mut uow = self.store.begin().await?;
        uow.account_by_number(number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {}", number)))
    }

    /// Lists an account's transactions in posting order, archived included.
    pub async fn list_transactions(&self, number: &str) -> Result<Vec<Transaction>, AppError> {
        let mut uow = self.store.begin().await?;
        let account = uow
            .account_by_number(number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {}", number)))?;
        Ok(uow.transactions_for_account(account.id).await?)
    }

    /// Gets a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        let mut uow = self.store.begin().await?;
        uow.transaction_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transaction Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Pays money into an account.
    ///
    /// DS deposits are split into one posting per contribution day; the last
    /// posting is returned.
    #[instrument(skip(self, actor, req), fields(account = %req.account_number, amount = req.amount))]
    pub async fn deposit(&self, actor: &Actor, req: DepositRequest) -> Result<Transaction, AppError> {
        authorize(actor)?;
        req.validate()?;
        let account = self.get_account(&req.account_number).await?;
        let amount = positive_amount(req.amount)?;

        if account.is_daily_savings() {
            return self.deposit_daily_savings(actor, account, amount, req).await;
        }

        let posting = Posting {
            transaction_type: TransactionType::Deposit,
            amount,
            narration: req.narration,
            payment_method: Some(req.payment_method),
            created_at: self.now(),
        };
        let mut batch = self
            .post(actor, account.id, vec![posting])
            .await
            .map_err(|e| e.context("deposit"))?;
        let transaction = batch
            .transactions
            .pop()
            .ok_or_else(|| AppError::Infrastructure("deposit: nothing posted".into()))?;
        info!(receipt = %transaction.receipt_no, balance = batch.balance, "deposit posted");

        // Ajo contributions are not announced.
        if batch.account.account_type == AccountType::SimpleBalance {
            let data = json!({
                "name": batch.account.customer_name,
                "amount": format_minor_units(amount.amount()),
                "balance": format_minor_units(batch.balance),
            });
            self.notify(actor, &batch.account, SmsTemplate::PaymentReceived, data)
                .await;
        }
        Ok(transaction)
    }

    async fn deposit_daily_savings(
        &self,
        actor: &Actor,
        account: Account,
        amount: Money,
        req: DepositRequest,
    ) -> Result<Transaction, AppError> {
        let days = account.contribution_days(amount)?;
        if days > self.config.max_prepay_days {
            return Err(DomainError::PrepayLimitExceeded {
                days,
                max_days: self.config.max_prepay_days,
            }
            .into());
        }

        let payment_method = match req.payment_method {
            PaymentMethod::BankDeposit => PaymentMethod::BankDeposit,
            _ => PaymentMethod::Cash,
        };
        let start = self.now();
        let postings = (0..days)
            .map(|unit| Posting {
                transaction_type: TransactionType::Deposit,
                amount: account.target,
                narration: req.narration.clone(),
                payment_method: Some(payment_method),
                created_at: start + Duration::seconds(UNIT_SPACING_SECS * unit),
            })
            .collect();

        let mut batch = self
            .post(actor, account.id, postings)
            .await
            .map_err(|e| e.context("deposit"))?;
        let last = batch
            .transactions
            .pop()
            .ok_or_else(|| AppError::Infrastructure("deposit: nothing posted".into()))?;
        info!(
            units = days,
            fees = batch.fees.len(),
            receipt = %last.receipt_no,
            balance = batch.balance,
            "daily savings deposit posted"
        );

        let data = json!({
            "name": batch.account.customer_name,
            "amount": format_minor_units(amount.amount()),
            "balance": format_minor_units(batch.balance),
            "effective_date": self.config.calendar.day_of(last.effective_date).to_string(),
        });
        self.notify(actor, &batch.account, SmsTemplate::DsReceived, data)
            .await;
        Ok(last)
    }

    /// Pays money out to the customer.
    ///
    /// The payment method and, for transfers, the receiving bank details are
    /// folded into the narration before the deduction is made.
    #[instrument(skip(self, actor, req), fields(account = %req.account_number, amount = req.amount))]
    pub async fn withdraw(&self, actor: &Actor, req: WithdrawRequest) -> Result<Transaction, AppError> {
        authorize(actor)?;
        req.validate()?;
        let payment_method = req.payment_method;
        self.deduct(actor, DeductionRequest::from(req), Some(payment_method))
            .await
            .map_err(|e| e.context("withdraw"))
    }

    /// Takes money out of an account.
    #[instrument(skip(self, actor, req), fields(account = %req.account_number, amount = req.amount))]
    pub async fn make_deduction(
        &self,
        actor: &Actor,
        req: DeductionRequest,
    ) -> Result<Transaction, AppError> {
        authorize(actor)?;
        req.validate()?;
        self.deduct(actor, req, None)
            .await
            .map_err(|e| e.context("make_deduction"))
    }

    async fn deduct(
        &self,
        actor: &Actor,
        req: DeductionRequest,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Transaction, AppError> {
        let account = self.get_account(&req.account_number).await?;
        let amount = positive_amount(req.amount)?;

        let posting = Posting {
            transaction_type: TransactionType::Withdrawal,
            amount,
            narration: req.narration,
            payment_method,
            created_at: self.now(),
        };
        let mut batch = self.post(actor, account.id, vec![posting]).await?;
        let transaction = batch
            .transactions
            .pop()
            .ok_or_else(|| AppError::Infrastructure("nothing posted".into()))?;
        info!(receipt = %transaction.receipt_no, balance = batch.balance, "withdrawal posted");

        let data = json!({
            "name": batch.account.customer_name,
            "amount": format_minor_units(amount.amount()),
            "balance": format_minor_units(batch.balance),
        });
        self.notify(actor, &batch.account, SmsTemplate::PaymentWithdrawn, data)
            .await;
        Ok(transaction)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Posting
    // ─────────────────────────────────────────────────────────────────────────────

    /// Runs `postings` in order in one unit of work under the account lock.
    ///
    /// Nothing is written unless every posting succeeds.
    async fn post(
        &self,
        actor: &Actor,
        account_id: AccountId,
        postings: Vec<Posting>,
    ) -> Result<Batch, AppError> {
        let _guard = self.locks.acquire(account_id).await;
        let mut uow = self.store.begin().await?;

        // Re-read under the lock: the balance may have moved since validation.
        let account = uow
            .account_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {}", account_id)))?;

        let mut receipts = Vec::with_capacity(postings.len());
        let mut transactions = Vec::with_capacity(postings.len());
        let mut fees = Vec::new();
        let mut balance = account.balance;
        for posting in postings {
            let posted = self
                .create(&mut uow, &account, actor, posting, balance, &mut receipts)
                .await?;
            balance = posted.balance;
            transactions.push(posted.transaction);
            fees.extend(posted.fee);
        }

        uow.commit().await?;
        drop(receipts);

        Ok(Batch {
            account,
            transactions,
            fees,
            balance,
        })
    }

    /// The posting step: one transaction, its balance movement, summary
    /// contribution and, for a cycle-opening DS contribution, the cycle fee
    /// and its commission.
    async fn create<'g>(
        &'g self,
        uow: &mut S::Uow,
        account: &Account,
        actor: &Actor,
        posting: Posting,
        opening_balance: i64,
        receipts: &mut Vec<Reservation<'g>>,
    ) -> Result<Posted, AppError> {
        if posting.transaction_type == TransactionType::Withdrawal
            && opening_balance < posting.amount.amount()
        {
            return Err(DomainError::InsufficientFunds {
                available: opening_balance,
                requested: posting.amount.amount(),
            }
            .into());
        }

        let effective_date = self.effective_date(uow, account, posting.created_at).await?;
        let is_deposit = posting.transaction_type == TransactionType::Deposit;
        let new_cycle = account.is_daily_savings()
            && is_deposit
            && self
                .cycles
                .starting_new_cycle(uow, account.id, effective_date)
                .await?;

        let receipt = self.identifiers.receipt_number(uow).await?;
        let transaction = Transaction {
            id: TransactionId::new(),
            account_id: account.id,
            sequence: uow.next_sequence(account.id).await?,
            transaction_type: posting.transaction_type,
            amount: posting.amount,
            opening_balance,
            narration: posting.narration,
            payment_method: posting.payment_method,
            sales_rep_id: actor.subject.clone(),
            receipt_no: receipt.value().to_string(),
            effective_date,
            created_at: posting.created_at,
            updated_at: posting.created_at,
            archived_at: None,
        };
        receipts.push(receipt);
        uow.insert_transaction(&transaction).await?;

        let last_payment_date = is_deposit.then_some(effective_date);
        let mut balance = uow
            .update_balance(
                account.id,
                transaction.signed_amount(),
                last_payment_date,
                posting.created_at,
            )
            .await?;
        self.summaries
            .apply(
                uow,
                posting.created_at,
                SummaryDelta::income(transaction.signed_amount()),
            )
            .await?;

        let fee = if new_cycle {
            let fee_at = posting.created_at + Duration::seconds(FEE_DELAY_SECS);
            let receipt = self.identifiers.receipt_number(uow).await?;
            let fee = Transaction {
                id: TransactionId::new(),
                account_id: account.id,
                sequence: uow.next_sequence(account.id).await?,
                transaction_type: TransactionType::Withdrawal,
                amount: account.target,
                opening_balance: balance,
                narration: CYCLE_FEE_NARRATION.to_string(),
                payment_method: None,
                sales_rep_id: actor.subject.clone(),
                receipt_no: receipt.value().to_string(),
                effective_date,
                created_at: fee_at,
                updated_at: fee_at,
                archived_at: None,
            };
            receipts.push(receipt);
            uow.insert_transaction(&fee).await?;
            balance = uow
                .update_balance(account.id, fee.signed_amount(), None, fee_at)
                .await?;
            uow.insert_commission(&Commission {
                id: CommissionId::new(),
                account_id: account.id,
                customer_id: account.customer_id,
                amount: account.target,
                date: posting.created_at,
                effective_date,
            })
            .await?;
            self.summaries
                .apply(uow, fee_at, SummaryDelta::income(fee.signed_amount()))
                .await?;
            info!(receipt = %fee.receipt_no, "cycle fee deducted");
            Some(fee)
        } else {
            None
        };

        Ok(Posted {
            transaction,
            fee,
            balance,
        })
    }

    /// Accounting date a new posting is attributed to.
    ///
    /// DS postings follow on from the last live deposit, one day later;
    /// everything else lands on the current accounting day.
    async fn effective_date(
        &self,
        uow: &mut S::Uow,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AppError> {
        let calendar = &self.config.calendar;
        if account.is_daily_savings() {
            if let Some(last) = uow
                .last_transaction(account.id, TransactionType::Deposit)
                .await?
            {
                return Ok(calendar.add_days(last.effective_date, 1));
            }
        }
        Ok(calendar.start_of_day(now))
    }

    /// Best-effort customer notification. Failures and timeouts are logged,
    /// never returned.
    pub async fn notify(
        &self,
        actor: &Actor,
        account: &Account,
        template: SmsTemplate,
        data: serde_json::Value,
    ) {
        let send = self
            .notifier
            .send(actor, &account.phone_number, template, data);
        match tokio::time::timeout(self.config.notify_timeout, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                account = %account.number,
                template = %template,
                error = %e,
                "customer notification failed"
            ),
            Err(_) => warn!(
                account = %account.number,
                template = %template,
                timeout_ms = self.config.notify_timeout.as_millis() as u64,
                "customer notification timed out"
            ),
        }
    }
}
