use serde::Serialize;

/// One labeled stage attached to a response for display. Not used for
/// control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub label: String,
    pub description: String,
}

impl TraceStep {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Displayable result of dispatching one query. Produced fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// Answer text for the caller.
    pub answer: String,
    /// Illustrative step trace; may be empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<TraceStep>,
    /// Failure detail when a provider call did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
