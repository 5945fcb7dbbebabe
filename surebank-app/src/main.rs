//! # SureBank
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the SQLite store and the SMS notifier
//! - Create the ledger service
//! - Run one command on behalf of the acting teller

mod config;

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use surebank_ledger::LedgerService;
use surebank_repo::{HttpSmsNotifier, LogNotifier, SqliteStore, build_store};
use surebank_types::{
    AccountType, Actor, ArchiveRequest, DeductionRequest, DepositRequest, Notifier,
    OpenAccountRequest, PaymentMethod, Role, SystemClock, TransactionId, WithdrawRequest,
};

#[derive(Parser)]
#[command(name = "surebank")]
#[command(author, version, about = "SureBank ledger command line", long_about = None)]
struct Cli {
    /// User id of the acting teller
    #[arg(long, global = true, env = "SUREBANK_ACTOR", default_value = "")]
    actor: String,

    /// Roles of the acting teller (comma-separated: user, admin)
    #[arg(
        long = "role",
        global = true,
        env = "SUREBANK_ROLES",
        value_delimiter = ',',
        default_value = "user"
    )]
    roles: Vec<Role>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },
    /// Pay money into an account
    Deposit {
        #[arg(long)]
        account: String,
        /// Amount in minor units
        #[arg(long)]
        amount: i64,
        /// cash, bank_deposit or transfer
        #[arg(long, default_value = "cash")]
        method: PaymentMethod,
        #[arg(long, default_value = "")]
        narration: String,
    },
    /// Pay money out to the customer
    Withdraw {
        #[arg(long)]
        account: String,
        /// Amount in minor units
        #[arg(long)]
        amount: i64,
        /// cash, bank_deposit or transfer
        #[arg(long, default_value = "cash")]
        method: PaymentMethod,
        /// Receiving bank, for transfers
        #[arg(long, default_value = "")]
        bank: String,
        #[arg(long, default_value = "")]
        bank_account_number: String,
        #[arg(long, default_value = "")]
        narration: String,
    },
    /// Deduct money from an account without a payout
    Deduct {
        #[arg(long)]
        account: String,
        /// Amount in minor units
        #[arg(long)]
        amount: i64,
        #[arg(long, default_value = "")]
        narration: String,
    },
    /// Reverse a transaction (admin only)
    Archive {
        /// Transaction ID (UUID)
        id: TransactionId,
    },
    /// Daily summary operations
    Summary {
        #[command(subcommand)]
        action: SummaryCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Open a new account
    Open {
        /// SB, DS or AJ
        #[arg(long = "type")]
        account_type: AccountType,
        /// Customer ID (UUID); generated when omitted
        #[arg(long)]
        customer_id: Option<Uuid>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Daily contribution in minor units (DS accounts)
        #[arg(long, default_value_t = 0)]
        target: i64,
        #[arg(long, default_value = "")]
        target_info: String,
        #[arg(long, default_value = "")]
        branch: String,
    },
    /// Show account details
    Show {
        /// Account number, e.g. DS04821
        number: String,
    },
    /// List an account's transactions
    History {
        /// Account number, e.g. DS04821
        number: String,
    },
}

#[derive(Subcommand)]
enum SummaryCommands {
    /// Add to a day's summary
    Record {
        #[arg(long, default_value_t = 0)]
        income: i64,
        #[arg(long, default_value_t = 0)]
        expenditure: i64,
        #[arg(long, default_value_t = 0)]
        bank_deposit: i64,
        /// Accounting day (YYYY-MM-DD); today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record cash lodged at the bank today
    BankDeposit {
        /// Amount in minor units
        amount: i64,
    },
    /// Record money spent today
    Expenditure {
        /// Amount in minor units
        amount: i64,
    },
    /// Show a day's summary
    Show {
        /// Accounting day (YYYY-MM-DD); today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,surebank_ledger=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output stays parseable.
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::Config::from_env()?;
    init_tracing(config.log_json);

    tracing::debug!("Using database: {}", config.database_url);

    // Build store (handles connection and migration)
    let store = build_store(&config.database_url).await?;

    let notifier: Arc<dyn Notifier> = match &config.sms_gateway_url {
        Some(url) => Arc::new(HttpSmsNotifier::new(
            url.clone(),
            config.sms_sender_id.clone(),
        )?),
        None => Arc::new(LogNotifier),
    };
    let calendar = config.ledger.calendar;
    let service: LedgerService<SqliteStore> =
        LedgerService::new(store, notifier, Arc::new(SystemClock), config.ledger);

    let actor = Actor::new(cli.actor, cli.roles);

    match cli.command {
        Commands::Account { action } => match action {
            AccountCommands::Open {
                account_type,
                customer_id,
                name,
                phone,
                target,
                target_info,
                branch,
            } => {
                let req = OpenAccountRequest {
                    account_type,
                    customer_id: customer_id.unwrap_or_else(Uuid::new_v4),
                    customer_name: name,
                    phone_number: phone,
                    target,
                    target_info,
                    branch_id: branch,
                };
                print_json(&service.open_account(&actor, req).await?)?;
            }
            AccountCommands::Show { number } => {
                print_json(&service.get_account(&number).await?)?;
            }
            AccountCommands::History { number } => {
                print_json(&service.list_transactions(&number).await?)?;
            }
        },

        Commands::Deposit {
            account,
            amount,
            method,
            narration,
        } => {
            let req = DepositRequest {
                account_number: account,
                amount,
                narration,
                payment_method: method,
            };
            print_json(&service.deposit(&actor, req).await?)?;
        }

        Commands::Withdraw {
            account,
            amount,
            method,
            bank,
            bank_account_number,
            narration,
        } => {
            let req = WithdrawRequest {
                account_number: account,
                amount,
                payment_method: method,
                bank,
                bank_account_number,
                narration,
            };
            print_json(&service.withdraw(&actor, req).await?)?;
        }

        Commands::Deduct {
            account,
            amount,
            narration,
        } => {
            let req = DeductionRequest {
                account_number: account,
                amount,
                narration,
            };
            print_json(&service.make_deduction(&actor, req).await?)?;
        }

        Commands::Archive { id } => {
            let tx = service
                .archive(&actor, ArchiveRequest { transaction_id: id })
                .await?;
            print_json(&tx)?;
        }

        Commands::Summary { action } => match action {
            SummaryCommands::Record {
                income,
                expenditure,
                bank_deposit,
                date,
            } => {
                let at = date.map_or_else(Utc::now, |day| calendar.midnight(day));
                print_json(
                    &service
                        .save_daily_summary(income, expenditure, bank_deposit, at)
                        .await?,
                )?;
            }
            SummaryCommands::BankDeposit { amount } => {
                print_json(&service.record_bank_deposit(&actor, amount).await?)?;
            }
            SummaryCommands::Expenditure { amount } => {
                print_json(&service.record_expenditure(&actor, amount).await?)?;
            }
            SummaryCommands::Show { date } => {
                let day = date.unwrap_or_else(|| calendar.day_of(Utc::now()));
                print_json(&service.daily_summary(day).await?)?;
            }
        },
    }

    Ok(())
}
