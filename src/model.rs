//! Domain Types
//!
//! Chat turns, mockups, feedback, and ticket records as the backend
//! reports them.

use serde::{Deserialize, Serialize};

use crate::conversation::marker;

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

/// One entry in a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    /// Set on the system notice that announces a generated mockup
    #[serde(default)]
    pub artifact_ready: bool,
    /// Conversation the notice belongs to
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            artifact_ready: false,
            conversation_id: None,
        }
    }

    /// Mark this turn as the announcement of a ready artifact
    pub fn with_artifact(mut self, conversation_id: Option<String>) -> Self {
        self.artifact_ready = true;
        self.conversation_id = conversation_id;
        self
    }

    /// Text as it should be shown, with the ready marker removed
    pub fn display_text(&self) -> String {
        marker::strip(&self.text)
    }
}

/// A generated mockup and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mockup {
    pub id: String,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub html_filename: Option<String>,
    #[serde(default)]
    pub screenshot_filename: Option<String>,
    #[serde(default)]
    pub feedback: Vec<FeedbackItem>,
}

fn default_project_name() -> String {
    "Untitled Project".to_string()
}

impl Mockup {
    /// Creation time formatted for display, or the raw value if unparseable
    pub fn created_display(&self) -> String {
        format_timestamp(&self.created_at)
    }

    /// File name used when saving the HTML locally
    pub fn download_filename(&self) -> String {
        let stem = self.project_name.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}_mockup.html", stem)
    }
}

/// Entry in the past-projects list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockupSummary {
    pub id: String,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub created_at: String,
}

impl MockupSummary {
    const PREVIEW_CHARS: usize = 80;

    pub fn prompt_preview(&self) -> String {
        let head: String = self.prompt.chars().take(Self::PREVIEW_CHARS).collect();
        format!("{}...", head)
    }

    pub fn created_display(&self) -> String {
        format_timestamp(&self.created_at)
    }
}

/// Comment left on a mockup (legacy feedback flow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default = "default_author")]
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
}

pub(crate) fn default_author() -> String {
    "Anonymous".to_string()
}

/// Stakeholder feedback produced by the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedFeedback {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Per-ticket result of a tracker submission, as sent by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub issue_key: Option<String>,
    #[serde(default)]
    pub priority_rank: Option<u32>,
    #[serde(default)]
    pub difficulty_score: Option<f64>,
    #[serde(default)]
    pub issue_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A ticket result with the success flag folded into the type
#[derive(Debug, Clone, PartialEq)]
pub enum TicketOutcome {
    Created {
        title: String,
        issue_key: String,
        priority_rank: Option<u32>,
        difficulty_score: Option<f64>,
        issue_url: Option<String>,
    },
    Failed {
        title: String,
        error: String,
    },
}

impl TicketOutcome {
    pub fn title(&self) -> &str {
        match self {
            TicketOutcome::Created { title, .. } | TicketOutcome::Failed { title, .. } => title,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, TicketOutcome::Created { .. })
    }
}

impl From<TicketResult> for TicketOutcome {
    fn from(r: TicketResult) -> Self {
        if r.success {
            TicketOutcome::Created {
                title: r.title,
                issue_key: r.issue_key.unwrap_or_default(),
                priority_rank: r.priority_rank,
                difficulty_score: r.difficulty_score,
                issue_url: r.issue_url,
            }
        } else {
            TicketOutcome::Failed {
                title: r.title,
                error: r.error.unwrap_or_else(|| "Unknown error".to_string()),
            }
        }
    }
}

/// Tracker workflow bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Indeterminate,
    Done,
    /// Also used for any category this client does not know
    #[default]
    #[serde(other)]
    New,
}

/// Ticket as listed on the tracker board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerTicket {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_category: StatusCategory,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub assignee_avatar: Option<String>,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub issue_type_icon: Option<String>,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub url: String,
}

impl TrackerTicket {
    pub fn updated_display(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.updated)
            .or_else(|_| chrono::DateTime::parse_from_str(&self.updated, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.updated.clone())
    }
}

fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %d, %Y %H:%M").to_string();
    }
    // The backend writes naive ISO timestamps
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
