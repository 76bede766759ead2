use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Column widths of the `progress_log_entries` table
pub const TASK_MAX_LEN: usize = 32;
pub const ACTION_MAX_LEN: usize = 32;
pub const WHO_MAX_LEN: usize = 256;
pub const IP_ADDRESS_MAX_LEN: usize = 64;
pub const RESULT_INFO_MAX_LEN: usize = 255;

/// Current state of a tracked run.
///
/// `Success`, `Warning` and `Failed` are conventionally terminal, but nothing
/// stops a caller from moving a record out of them again.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ResultMessage {
    #[default]
    #[sea_orm(string_value = "Started")]
    Started,
    #[sea_orm(string_value = "Working")]
    Working,
    #[sea_orm(string_value = "Success")]
    Success,
    #[sea_orm(string_value = "Warning")]
    Warning,
    #[sea_orm(string_value = "Failed")]
    Failed,
}

impl ResultMessage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResultMessage::Success | ResultMessage::Warning | ResultMessage::Failed
        )
    }
}

impl std::fmt::Display for ResultMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultMessage::Started => write!(f, "Started"),
            ResultMessage::Working => write!(f, "Working"),
            ResultMessage::Success => write!(f, "Success"),
            ResultMessage::Warning => write!(f, "Warning"),
            ResultMessage::Failed => write!(f, "Failed"),
        }
    }
}

/// One row per task execution
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "progress_log_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task: String,
    pub action: String,
    /// Actor that started the run; never overwritten once set
    pub who: Option<String>,
    pub started: DateTimeUtc,
    /// Time of the most recent write, not only of the terminal one
    pub ended: DateTimeUtc,
    /// Client address of the request that started the run
    pub ip_address: Option<String>,
    pub result_message: ResultMessage,
    pub result_info: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
