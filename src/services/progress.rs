//! Progress log records for long-running tasks
//!
//! A process creates one record when it starts, moves it through `step`
//! updates and finishes with `success`, `warning` or `failed`. A process that
//! dies mid-way leaves the record on its last `Started`/`Working` state; no
//! failure is inferred for it.
//!
//! Transitions are not validated. Any state may follow any other, including
//! `step` after a terminal update.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, Set,
};
use std::io::Write;

use crate::caller::{CallerSource, NoCaller};
use crate::context::LogContext;
use crate::error::{AppError, Result};
use crate::models::progress_log_entry::{
    self, ResultMessage, ACTION_MAX_LEN, IP_ADDRESS_MAX_LEN, RESULT_INFO_MAX_LEN, TASK_MAX_LEN,
    WHO_MAX_LEN,
};

/// Timestamp layout used by `ProgressLog::format`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Initial values for a new record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
    /// Falls back to the caller's module when `None`
    pub task: Option<String>,
    /// Falls back to the caller's function when `None`
    pub action: Option<String>,
    pub message: ResultMessage,
    pub info: Option<String>,
}

impl NewEntry {
    pub fn new(task: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            action: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: ResultMessage) -> Self {
        self.message = message;
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

/// Handle on one persisted progress record.
///
/// Every update writes through to the store before returning. If the write
/// fails the handle keeps its previous state.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    model: progress_log_entry::Model,
    ctx: LogContext,
}

impl ProgressLog {
    /// Create and persist a `Started` record with explicit names
    pub async fn start<C>(
        db: &C,
        ctx: &LogContext,
        task: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        Self::create(db, ctx, NewEntry::new(task, action), &NoCaller).await
    }

    /// Create and persist a record.
    ///
    /// Missing task/action names are taken from `caller`. Fails with
    /// `AppError::CallerUnknown` if a name is missing and `caller` has none,
    /// and with `AppError::Database` if the store rejects the insert.
    pub async fn create<C, S>(db: &C, ctx: &LogContext, entry: NewEntry, caller: &S) -> Result<Self>
    where
        C: ConnectionTrait,
        S: CallerSource + ?Sized,
    {
        let (task, action) = resolve_names(entry.task, entry.action, caller)?;
        validate_name("task", &task, TASK_MAX_LEN)?;
        validate_name("action", &action, ACTION_MAX_LEN)?;

        let mut active = progress_log_entry::ActiveModel {
            task: Set(task),
            action: Set(action),
            result_message: Set(entry.message),
            result_info: Set(clean_info(entry.info)),
            who: Set(None),
            ip_address: Set(None),
            ..Default::default()
        };
        auto_fill(&mut active, ctx, Utc::now());

        let model = active.insert(db).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create progress log entry");
            AppError::from(e)
        })?;

        tracing::debug!(
            id = model.id,
            task = %model.task,
            action = %model.action,
            message = %model.result_message,
            "Progress log entry created"
        );

        Ok(Self {
            model,
            ctx: ctx.clone(),
        })
    }

    /// Re-open an existing record, e.g. when a job resumes in another process
    pub async fn load<C>(db: &C, ctx: &LogContext, id: i64) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let model = progress_log_entry::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Progress log entry {} not found", id)))?;

        Ok(Self {
            model,
            ctx: ctx.clone(),
        })
    }

    /// Record intermediate progress (`Working`)
    pub async fn step<C>(&mut self, db: &C, info: impl Into<String>) -> Result<&mut Self>
    where
        C: ConnectionTrait,
    {
        self.update_progress(db, ResultMessage::Working, info.into())
            .await
    }

    pub async fn success<C>(&mut self, db: &C, info: impl Into<String>) -> Result<&mut Self>
    where
        C: ConnectionTrait,
    {
        self.update_progress(db, ResultMessage::Success, info.into())
            .await
    }

    pub async fn warning<C>(&mut self, db: &C, info: impl Into<String>) -> Result<&mut Self>
    where
        C: ConnectionTrait,
    {
        self.update_progress(db, ResultMessage::Warning, info.into())
            .await
    }

    pub async fn failed<C>(&mut self, db: &C, info: impl Into<String>) -> Result<&mut Self>
    where
        C: ConnectionTrait,
    {
        self.update_progress(db, ResultMessage::Failed, info.into())
            .await
    }

    async fn update_progress<C>(
        &mut self,
        db: &C,
        message: ResultMessage,
        info: String,
    ) -> Result<&mut Self>
    where
        C: ConnectionTrait,
    {
        let previous = self.model.result_message;
        if previous.is_terminal() && previous != message {
            tracing::debug!(
                id = self.model.id,
                from = %previous,
                to = %message,
                "Progress log entry updated after terminal state"
            );
        }

        let mut active = self.model.clone().into_active_model();
        active.result_message = Set(message);
        active.result_info = Set(clean_info(Some(info)));
        auto_fill(&mut active, &self.ctx, Utc::now());

        let model = active.update(db).await.map_err(|e| {
            tracing::error!(id = self.model.id, error = %e, "Failed to persist progress update");
            AppError::from(e)
        })?;

        tracing::debug!(
            id = model.id,
            task = %model.task,
            message = %model.result_message,
            "Progress log entry updated"
        );

        self.model = model;
        Ok(self)
    }

    /// Replace the context used to fill `who`/`ip_address` on later writes.
    /// Values already stored are kept.
    pub fn set_context(&mut self, ctx: LogContext) {
        self.ctx = ctx;
    }

    /// `<prefix><ended>\t<message>[:\t<info>]<suffix>\n`
    pub fn format(&self, prefix: &str, suffix: &str) -> String {
        let mut line = format!(
            "{}{}\t{}",
            prefix,
            self.model.ended.format(TIMESTAMP_FORMAT),
            self.model.result_message
        );
        if let Some(info) = self.model.result_info.as_deref().filter(|i| !i.is_empty()) {
            line.push_str(":\t");
            line.push_str(info);
        }
        line.push_str(suffix);
        line.push('\n');
        line
    }

    pub fn line(&self) -> String {
        self.format("", "")
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.line().as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Print the current state line to stdout
    pub fn output(&self) -> Result<()> {
        self.write_to(&mut std::io::stdout().lock())
    }

    pub fn id(&self) -> i64 {
        self.model.id
    }

    pub fn result_message(&self) -> ResultMessage {
        self.model.result_message
    }

    pub fn is_terminal(&self) -> bool {
        self.model.result_message.is_terminal()
    }

    pub fn model(&self) -> &progress_log_entry::Model {
        &self.model
    }

    pub fn into_model(self) -> progress_log_entry::Model {
        self.model
    }
}

fn resolve_names<S>(
    task: Option<String>,
    action: Option<String>,
    caller: &S,
) -> Result<(String, String)>
where
    S: CallerSource + ?Sized,
{
    let task = task.filter(|t| !t.trim().is_empty());
    let action = action.filter(|a| !a.trim().is_empty());

    match (task, action) {
        (Some(task), Some(action)) => Ok((task, action)),
        (task, action) => {
            let caller = caller.caller().ok_or_else(|| {
                AppError::CallerUnknown(
                    "task or action omitted and the calling function could not be identified"
                        .to_string(),
                )
            })?;
            Ok((
                task.unwrap_or_else(|| caller.task().to_string()),
                action.unwrap_or_else(|| caller.action().to_string()),
            ))
        }
    }
}

fn validate_name(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters, got {}",
            field, max_len, len
        )));
    }
    Ok(())
}

/// Fill `who`, `started` and `ip_address` when unset and stamp `ended`.
///
/// `ended` never moves backwards, even if the wall clock does.
fn auto_fill(active: &mut progress_log_entry::ActiveModel, ctx: &LogContext, now: DateTime<Utc>) {
    if is_blank(&active.who) {
        if let Some(actor) = non_empty(&ctx.actor) {
            active.who = Set(Some(truncate_chars(actor, WHO_MAX_LEN)));
        }
    }

    let started = match &active.started {
        ActiveValue::Set(started) | ActiveValue::Unchanged(started) => *started,
        ActiveValue::NotSet => {
            active.started = Set(now);
            now
        }
    };

    if is_blank(&active.ip_address) {
        if let Some(ip) = non_empty(&ctx.client_ip) {
            active.ip_address = Set(Some(truncate_chars(ip, IP_ADDRESS_MAX_LEN)));
        }
    }

    let ended = match &active.ended {
        ActiveValue::Set(prev) | ActiveValue::Unchanged(prev) => now.max(*prev),
        ActiveValue::NotSet => now.max(started),
    };
    active.ended = Set(ended);
}

fn is_blank(value: &ActiveValue<Option<String>>) -> bool {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => {
            v.as_deref().map_or(true, |s| s.is_empty())
        }
        ActiveValue::NotSet => true,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn clean_info(info: Option<String>) -> Option<String> {
    info.filter(|i| !i.is_empty())
        .map(|i| truncate_chars(&i, RESULT_INFO_MAX_LEN))
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

/// Create a `Started` record named after the enclosing module and function.
///
/// Expands to a future; `progress_log!(&db, &ctx).await?` or, with initial
/// info, `progress_log!(&db, &ctx, "queued").await?`.
#[macro_export]
macro_rules! progress_log {
    ($db:expr, $ctx:expr) => {
        $crate::services::progress::ProgressLog::create(
            $db,
            $ctx,
            $crate::services::progress::NewEntry::default(),
            &$crate::caller!(),
        )
    };
    ($db:expr, $ctx:expr, $info:expr) => {
        $crate::services::progress::ProgressLog::create(
            $db,
            $ctx,
            $crate::services::progress::NewEntry::default().with_info($info),
            &$crate::caller!(),
        )
    };
}
