//! Command execution for one logged-in user.
//!
//! A [`WalletSession`] turns a token line into a wallet operation: the parser
//! validates flags, budget pre-checks run before any outcome is recorded, and the
//! user store is asked to persist the wallet after every successful mutation.
//! Prompts are delegated to a [`Confirm`] collaborator so the core never touches
//! the console.

use std::fmt;

use crate::cli::parser::{parse, tokenize, ParseErrors, ParsedArgs};
use crate::cli::registry::{flags, COMMANDS};
use crate::config::Config;
use crate::core::services::{
    BudgetAlert, BudgetService, CategoryRow, CategoryService, SummaryService, TransactionQuery,
    TransactionService, WalletSummary,
};
use crate::core::user::{User, UserStore};
use crate::errors::{Result, WalletError};
use crate::ledger::{Clock, Namespace, SystemClock, Transaction, TransactionKind, TransactionLedger};
use crate::money::Money;

/// Question the session needs answered before it may continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// Recording `amount` would push `category` past its budget.
    CategoryBudget { category: String, amount: Money },
    /// Recording `amount` would push outcomes past the wallet's total income.
    TotalIncome { amount: Money },
    /// Removing a category drops all of its transactions.
    RemoveCategory {
        category: String,
        namespace: Namespace,
    },
}

impl fmt::Display for ConfirmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmRequest::CategoryBudget { category, amount } => write!(
                f,
                "Adding {amount} exceeds the budget of `{category}`. Continue?"
            ),
            ConfirmRequest::TotalIncome { amount } => {
                write!(f, "Adding {amount} exceeds total income. Continue?")
            }
            ConfirmRequest::RemoveCategory {
                category,
                namespace,
            } => write!(
                f,
                "Remove {namespace} category `{category}` and all of its transactions?"
            ),
        }
    }
}

/// Answers yes/no questions raised while a command runs.
pub trait Confirm {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmRequest) -> bool,
{
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Typed result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    TransactionAdded {
        id: u32,
        kind: TransactionKind,
        category: String,
        amount: Money,
    },
    TransactionRemoved {
        id: u32,
    },
    CategoryAdded {
        category: String,
        namespace: Namespace,
    },
    CategoryRenamed {
        from: String,
        to: String,
        namespace: Namespace,
        updated: usize,
    },
    CategoryRemoved {
        category: String,
        namespace: Namespace,
        removed: usize,
    },
    Categories(Vec<CategoryRow>),
    Transactions(Vec<Transaction>),
    Status(WalletSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub output: CommandOutput,
    /// Budget alerts raised by the wallet state after the command ran.
    pub alerts: Vec<BudgetAlert>,
}

impl CommandOutcome {
    fn quiet(output: CommandOutput) -> Self {
        Self {
            output,
            alerts: Vec::new(),
        }
    }
}

pub struct WalletSession {
    user: User,
    store: Box<dyn UserStore>,
    clock: Box<dyn Clock>,
    config: Config,
}

impl WalletSession {
    pub fn new(user: User, store: Box<dyn UserStore>) -> Self {
        Self {
            user,
            store,
            clock: Box::new(SystemClock),
            config: Config::default(),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn into_user(self) -> User {
        self.user
    }

    /// Tokenizes `line` and runs it.
    pub fn execute_line(&mut self, line: &str, confirm: &mut dyn Confirm) -> Result<CommandOutcome> {
        self.execute(&tokenize(line), confirm)
    }

    /// Parses and runs one command line given as tokens.
    pub fn execute<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
        confirm: &mut dyn Confirm,
    ) -> Result<CommandOutcome> {
        if tokens.is_empty() {
            return Err(WalletError::InvalidInput("empty command".into()));
        }
        let signature = COMMANDS
            .resolve(tokens)
            .ok_or_else(|| ParseErrors::unknown_command(&attempted_command(tokens)))?;
        let args = parse(tokens, signature)?;
        tracing::info!(command = signature.name, user = %self.user.username, "executing command");

        match signature.name {
            "add_income" => self.record(&args, TransactionKind::Income, confirm),
            "add_outcome" => self.record(&args, TransactionKind::OutcomeSpent, confirm),
            "set_budget" => self.record(&args, TransactionKind::OutcomePlanned, confirm),
            "status" => Ok(CommandOutcome::quiet(CommandOutput::Status(
                SummaryService::summarize(self.user.wallet(), self.config.warning_percent),
            ))),
            "actions list" => self.list_actions(&args),
            "actions remove" => self.remove_action(&args),
            "category add" => self.add_category(&args),
            "category list" => self.list_categories(&args),
            "category edit" => self.edit_category(&args),
            "category remove" => self.remove_category(&args, confirm),
            other => Err(WalletError::UnsupportedCommand(other.to_string())),
        }
    }

    fn record(
        &mut self,
        args: &ParsedArgs,
        kind: TransactionKind,
        confirm: &mut dyn Confirm,
    ) -> Result<CommandOutcome> {
        let category = required(args, flags::CATEGORY)?.to_string();
        let amount = Money::parse(required(args, flags::AMOUNT)?)?;
        if amount.is_negative() {
            return Err(WalletError::InvalidAmount);
        }

        if kind != TransactionKind::Income {
            let is_planned = kind == TransactionKind::OutcomePlanned;
            let wallet = self.user.wallet();
            if BudgetService::would_exceed_category_budget(wallet, &category, amount, is_planned)
                && !confirm.confirm(&ConfirmRequest::CategoryBudget {
                    category: category.clone(),
                    amount,
                })
            {
                tracing::debug!(%category, %amount, "category budget prompt declined");
                return Err(WalletError::BudgetExceeded);
            }
            if BudgetService::would_exceed_total_income(wallet, amount, is_planned)
                && !confirm.confirm(&ConfirmRequest::TotalIncome { amount })
            {
                tracing::debug!(%category, %amount, "total income prompt declined");
                return Err(WalletError::BudgetExceeded);
            }
        }

        let timestamp = self.clock.now();
        let id = self.commit(|wallet| wallet.add_at(&category, amount, kind, timestamp))?;

        let mut alerts = Vec::new();
        if kind != TransactionKind::Income {
            alerts.extend(BudgetService::category_alert(
                self.user.wallet(),
                &category,
                self.config.warning_percent,
            ));
        }
        alerts.extend(BudgetService::total_alerts(self.user.wallet()));
        Ok(self.with_alerts(
            CommandOutput::TransactionAdded {
                id,
                kind,
                category,
                amount,
            },
            alerts,
        ))
    }

    fn list_actions(&self, args: &ParsedArgs) -> Result<CommandOutcome> {
        let last = match args.get(flags::COUNT) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                WalletError::InvalidInput(format!("`{raw}` is not a transaction count"))
            })?),
            None => self.config.list_limit,
        };
        let query = TransactionQuery {
            category: args.get(flags::CATEGORY).map(str::to_string),
            namespace: optional_namespace(args)?,
            last,
            from: args
                .get(flags::FROM)
                .map(TransactionService::parse_datetime_bound)
                .transpose()?,
            to: args
                .get(flags::TO)
                .map(TransactionService::parse_datetime_bound)
                .transpose()?,
        };
        let transactions = TransactionService::list(self.user.wallet(), &query);
        Ok(CommandOutcome::quiet(CommandOutput::Transactions(transactions)))
    }

    fn remove_action(&mut self, args: &ParsedArgs) -> Result<CommandOutcome> {
        let token = required(args, flags::ID)?;
        let id = self.commit(|wallet| wallet.remove_by_id_token(token))?;
        let alerts = BudgetService::total_alerts(self.user.wallet());
        Ok(self.with_alerts(CommandOutput::TransactionRemoved { id }, alerts))
    }

    fn add_category(&mut self, args: &ParsedArgs) -> Result<CommandOutcome> {
        let category = required(args, flags::CATEGORY)?.to_string();
        let namespace = parse_namespace(required(args, flags::TYPE)?)?;
        let timestamp = self.clock.now();
        self.commit(|wallet| CategoryService::add_at(wallet, &category, namespace, timestamp))?;
        Ok(CommandOutcome::quiet(CommandOutput::CategoryAdded {
            category,
            namespace,
        }))
    }

    fn list_categories(&self, args: &ParsedArgs) -> Result<CommandOutcome> {
        let mut rows = CategoryService::list(
            self.user.wallet(),
            optional_namespace(args)?,
            self.config.warning_percent,
        );
        if let Some(wanted) = args.get(flags::CATEGORY) {
            rows.retain(|row| row_category(row) == wanted);
        }
        Ok(CommandOutcome::quiet(CommandOutput::Categories(rows)))
    }

    fn edit_category(&mut self, args: &ParsedArgs) -> Result<CommandOutcome> {
        let from = required(args, flags::CATEGORY)?.to_string();
        let namespace =
            CategoryService::resolve_namespace(self.user.wallet(), &from, optional_namespace(args)?)?;
        let to = required(args, flags::NEW_NAME)?.to_string();
        let updated =
            self.commit(|wallet| CategoryService::edit(wallet, &from, Some(namespace), &to))?;
        let alerts = BudgetService::total_alerts(self.user.wallet());
        Ok(self.with_alerts(
            CommandOutput::CategoryRenamed {
                from,
                to,
                namespace,
                updated,
            },
            alerts,
        ))
    }

    fn remove_category(
        &mut self,
        args: &ParsedArgs,
        confirm: &mut dyn Confirm,
    ) -> Result<CommandOutcome> {
        let category = required(args, flags::CATEGORY)?.to_string();
        let namespace = CategoryService::resolve_namespace(
            self.user.wallet(),
            &category,
            optional_namespace(args)?,
        )?;
        if !confirm.confirm(&ConfirmRequest::RemoveCategory {
            category: category.clone(),
            namespace,
        }) {
            return Err(WalletError::Cancelled);
        }
        let removed =
            self.commit(|wallet| Ok(CategoryService::remove(wallet, &category, namespace)))?;
        let alerts = BudgetService::total_alerts(self.user.wallet());
        Ok(self.with_alerts(
            CommandOutput::CategoryRemoved {
                category,
                namespace,
                removed,
            },
            alerts,
        ))
    }

    /// Applies `mutate` to the wallet and saves the user. If either step fails the
    /// wallet is restored, so a failed command never leaves a half-applied change.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut TransactionLedger) -> Result<T>,
    ) -> Result<T> {
        let before = self.user.wallet().clone();
        let result = mutate(self.user.wallet_mut())
            .and_then(|value| self.store.save(&self.user).map(|()| value));
        if let Err(err) = &result {
            tracing::debug!(user = %self.user.username, error = %err, "rolling back wallet");
            *self.user.wallet_mut() = before;
        }
        result
    }

    fn with_alerts(&self, output: CommandOutput, alerts: Vec<BudgetAlert>) -> CommandOutcome {
        for alert in &alerts {
            tracing::warn!(user = %self.user.username, "{alert}");
        }
        CommandOutcome { output, alerts }
    }
}

fn required<'a>(args: &'a ParsedArgs, flag: &'static str) -> Result<&'a str> {
    args.get(flag).ok_or(WalletError::MissingArgument(flag))
}

fn parse_namespace(raw: &str) -> Result<Namespace> {
    raw.parse::<Namespace>()
        .map_err(|err| WalletError::InvalidInput(err.to_string()))
}

fn optional_namespace(args: &ParsedArgs) -> Result<Option<Namespace>> {
    args.get(flags::TYPE).map(parse_namespace).transpose()
}

fn row_category(row: &CategoryRow) -> &str {
    match row {
        CategoryRow::Income { category, .. } => category,
        CategoryRow::Outcome(status) => &status.category,
    }
}

// `actions lst` should be reported (and matched for suggestions) as a whole.
fn attempted_command<S: AsRef<str>>(tokens: &[S]) -> String {
    let first: &str = tokens.first().map_or("", |token| token.as_ref());
    let group = format!("{first} ");
    match tokens.get(1) {
        Some(second) if COMMANDS.names().any(|name| name.starts_with(&group)) => {
            format!("{first} {}", second.as_ref())
        }
        _ => first.to_string(),
    }
}
