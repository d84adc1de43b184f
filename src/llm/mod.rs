//! Language model abstraction and failure policies.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion model treated as a single blocking call.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete the conversation and return the model's text, which may be empty.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// What a call site does when the model call itself fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and continue with a user-safe fallback text.
    Recover { fallback: String },
    /// Hand the error to the caller.
    Propagate,
}

impl FailurePolicy {
    pub fn recover(fallback: impl Into<String>) -> Self {
        FailurePolicy::Recover {
            fallback: fallback.into(),
        }
    }

    /// Apply the policy to the outcome of a call site.
    pub fn resolve(&self, result: Result<String>) -> Result<String> {
        match (result, self) {
            (Ok(text), _) => Ok(text),
            (Err(e), FailurePolicy::Recover { fallback }) => {
                error!("Using fallback after failure: {}", e);
                Ok(fallback.clone())
            }
            (Err(e), FailurePolicy::Propagate) => Err(e),
        }
    }
}

/// Call the model, substituting `empty_fallback` for an empty response and applying
/// `policy` to call failures.
pub async fn complete_with_policy(
    model: &dyn LanguageModel,
    messages: &[ChatMessage],
    empty_fallback: &str,
    policy: &FailurePolicy,
) -> Result<String> {
    let result = model.complete(messages).await.map(|text| {
        if text.is_empty() {
            empty_fallback.to_string()
        } else {
            text
        }
    });
    policy.resolve(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClipchatError;
    use crate::test_support::ScriptedModel;

    #[tokio::test]
    async fn test_empty_response_uses_fallback() {
        let model = ScriptedModel::replying("");
        let text = complete_with_policy(
            &model,
            &[ChatMessage::user("hi")],
            "nothing",
            &FailurePolicy::Propagate,
        )
        .await
        .unwrap();
        assert_eq!(text, "nothing");
    }

    #[tokio::test]
    async fn test_whitespace_response_is_kept() {
        let model = ScriptedModel::replying("  ");
        let text = complete_with_policy(
            &model,
            &[ChatMessage::user("hi")],
            "nothing",
            &FailurePolicy::Propagate,
        )
        .await
        .unwrap();
        assert_eq!(text, "  ");
    }

    #[test]
    fn test_resolve() {
        let policy = FailurePolicy::recover("safe");
        assert_eq!(policy.resolve(Ok("fine".to_string())).unwrap(), "fine");
        assert_eq!(
            policy
                .resolve(Err(ClipchatError::SummaryGeneration("boom".to_string())))
                .unwrap(),
            "safe"
        );

        let err = FailurePolicy::Propagate
            .resolve(Err(ClipchatError::LanguageModel("boom".to_string())))
            .unwrap_err();
        assert!(matches!(err, ClipchatError::LanguageModel(_)));
    }

    #[tokio::test]
    async fn test_recover_policy_swallows_failure() {
        let model = ScriptedModel::failing();
        let text = complete_with_policy(
            &model,
            &[ChatMessage::user("hi")],
            "nothing",
            &FailurePolicy::recover("safe"),
        )
        .await
        .unwrap();
        assert_eq!(text, "safe");
    }

    #[tokio::test]
    async fn test_propagate_policy_returns_error() {
        let model = ScriptedModel::failing();
        let err = complete_with_policy(
            &model,
            &[ChatMessage::user("hi")],
            "nothing",
            &FailurePolicy::Propagate,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClipchatError::LanguageModel(_)));
    }
}
