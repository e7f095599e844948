use pofmt_core::{CatalogIssue, MessageKey};
use serde::Serialize;

/// One reportable finding, flattened for logs and JSON reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            context: None,
            id: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_key(mut self, key: &MessageKey) -> Self {
        self.context = key.context.clone();
        self.id = Some(key.id.clone());
        self
    }

    pub fn from_issue(issue: &CatalogIssue) -> Self {
        let diagnostic = Diagnostic::new(issue.code(), issue.kind.to_string());
        match &issue.key {
            Some(key) => diagnostic.with_key(key),
            None => diagnostic,
        }
    }
}
