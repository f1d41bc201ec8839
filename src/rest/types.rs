//! Wire shapes used only by the REST backend.

use serde::Deserialize;

/// Error body returned by the management API on non-success responses.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) messages: Vec<ErrorMessage>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct ErrorMessage {
    #[serde(default)]
    pub(super) code: Option<String>,
    #[serde(default)]
    pub(super) severity: Option<String>,
    #[serde(default)]
    pub(super) message_l10n: Option<String>,
}

impl ErrorBody {
    /// First message reported at error severity, falling back to the first
    /// message of any severity.
    pub(super) fn primary(self) -> Option<ErrorMessage> {
        let is_error = |message: &ErrorMessage| {
            message
                .severity
                .as_deref()
                .is_none_or(|severity| !severity.eq_ignore_ascii_case("info"))
        };
        let index = self.messages.iter().position(is_error).unwrap_or(0);
        self.messages.into_iter().nth(index)
    }
}
