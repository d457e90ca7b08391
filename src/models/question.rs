use serde::{Deserialize, Serialize};

/// A recruitment form category (staff, media, ...). The set of types is
/// fixed at deploy time; see `catalog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationType {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub order: i32,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Single-line answer, at most 500 characters.
    Text,
    /// Free-form answer, at most 2000 characters.
    Textarea,
    /// One value chosen from `options`.
    Select,
    /// Comma-separated values chosen from `options`.
    Multiselect,
}
