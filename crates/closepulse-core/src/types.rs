//! Core data types for ClosePulse

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The authenticated identity of the current user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Session {
    /// Stable user identifier
    #[validate(length(min = 1))]
    pub id: String,

    /// Login email
    #[validate(length(min = 1))]
    pub email: String,

    /// Display name
    pub name: String,
}

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing has been determined yet
    #[default]
    Unknown,
    /// Persisted state is being read
    Loading,
    /// A session is established
    Authenticated,
    /// Determined to have no session
    Anonymous,
}

impl SessionState {
    /// Whether restore has finished, one way or the other
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Authenticated | Self::Anonymous)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// What readers see of the session: the identity plus its state.
///
/// `session` is `Some` exactly when `state` is [`SessionState::Authenticated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    /// Current identity, if any
    pub session: Option<Session>,
    /// Current lifecycle state
    pub state: SessionState,
}

impl SessionSnapshot {
    /// Snapshot for an established session
    pub const fn authenticated(session: Session) -> Self {
        Self {
            session: Some(session),
            state: SessionState::Authenticated,
        }
    }

    /// Snapshot with no session
    pub const fn anonymous() -> Self {
        Self {
            session: None,
            state: SessionState::Anonymous,
        }
    }
}

/// Result descriptor returned by user-facing operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Whether the operation succeeded
    pub success: bool,
    /// Message to display
    pub message: String,
}

impl ActionOutcome {
    /// Successful outcome
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed outcome
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Call identifier, unique within a dataset and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub u32);

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CallId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Overall customer sentiment of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    /// Favorable reaction
    Positive,
    /// Mixed reaction
    Neutral,
    /// Concerns or dissatisfaction
    Negative,
}

impl Sentiment {
    /// All variants in display order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    /// What the sentiment indicates about the customer
    pub const fn indication(self) -> &'static str {
        match self {
            Self::Positive => "a favorable customer reaction",
            Self::Negative => "potential concerns or dissatisfaction",
            Self::Neutral => "a balanced discussion with mixed reactions",
        }
    }

    /// Sentence shown in the analysis tab
    pub fn summary(self) -> String {
        format!(
            "This call had an overall {} sentiment, indicating {}.",
            self.to_string().to_lowercase(),
            self.indication()
        )
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

/// Deal outcome of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Deal closed
    Won,
    /// Deal lost
    Lost,
    /// Decision outstanding
    Pending,
}

impl Outcome {
    /// All variants in display order
    pub const ALL: [Self; 3] = [Self::Won, Self::Lost, Self::Pending];
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "Won"),
            Self::Lost => write!(f, "Lost"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// One recorded sales call with its analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CallRecord {
    /// Unique, stable identifier
    pub id: CallId,

    /// Day the call took place
    pub date: NaiveDate,

    /// Time of day as displayed, e.g. "10:30 AM"
    pub time: String,

    /// Duration as displayed, e.g. "32:45"
    pub duration_label: String,

    /// Customer organisation
    #[validate(length(min = 1, max = 255))]
    pub customer: String,

    /// Sales agent
    #[validate(length(min = 1, max = 255))]
    pub agent: String,

    /// Overall sentiment
    pub sentiment: Sentiment,

    /// Deal outcome
    pub outcome: Outcome,

    /// Topics discussed, in order
    #[serde(default)]
    pub topics: Vec<String>,

    /// Full transcript
    #[serde(default)]
    pub transcript: String,

    /// What went well
    #[serde(default)]
    pub strengths: Vec<String>,

    /// Areas for improvement
    #[serde(default)]
    pub weaknesses: Vec<String>,

    /// Explanation of the outcome
    #[serde(default)]
    pub why: String,
}

/// Bar colour band for a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTone {
    /// 80% and above
    Strong,
    /// 51% to 79%
    Moderate,
    /// 50% and below
    Weak,
}

impl ProgressTone {
    /// Classify a percentage
    pub const fn for_percentage(percentage: u8) -> Self {
        if percentage >= 80 {
            Self::Strong
        } else if percentage >= 51 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

/// One statistic inside a pattern group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PatternItem {
    /// Statement shown next to the bar
    #[validate(length(min = 1))]
    pub text: String,

    /// Share in percent, 0 to 100
    #[validate(range(max = 100))]
    pub percentage: u8,
}

impl PatternItem {
    /// Create an item, clamping the percentage into range
    pub fn new(text: impl Into<String>, percentage: u8) -> Self {
        Self {
            text: text.into(),
            percentage: percentage.min(100),
        }
    }

    /// Colour band of this item
    pub const fn tone(&self) -> ProgressTone {
        ProgressTone::for_percentage(self.percentage)
    }
}

/// A named cluster of aggregate statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PatternGroup {
    /// Group identifier
    pub id: u32,

    /// Heading
    #[validate(length(min = 1))]
    pub title: String,

    /// One-line description
    pub description: String,

    /// Statistics ordered by descending importance
    #[validate(nested)]
    pub items: Vec<PatternItem>,
}
