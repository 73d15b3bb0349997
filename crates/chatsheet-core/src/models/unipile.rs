use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A third-party account linked to the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnipileAccount {
    pub id: String,
    pub user_email: String,
    /// e.g. "linkedin"
    pub provider: String,
    /// Account ID assigned by Unipile
    pub account_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub message: Option<String>,
    // The backend sends null rather than [] when nothing is linked
    #[serde(default)]
    accounts: Option<Vec<UnipileAccount>>,
}

impl AccountsResponse {
    pub fn into_accounts(self) -> Vec<UnipileAccount> {
        self.accounts.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicLinkRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CookieLinkRequest<'a> {
    pub access_token: &'a str,
    pub user_agent: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckpointRequest<'a> {
    pub account_id: &'a str,
    /// 2FA/OTP code or phone number, depending on the checkpoint
    pub code: &'a str,
}

/// Raw body of a link or checkpoint response.
/// 200 carries `{message, account_id}`, 202 adds `checkpoint_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub account_id: String,
    #[serde(default)]
    pub checkpoint_type: Option<String>,
}

/// Result of a linking step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// The account is linked
    Connected { account_id: String },
    /// Unipile wants a checkpoint solved before the account can be linked.
    /// Pass `account_id` back to `solve_checkpoint`.
    CheckpointRequired {
        account_id: String,
        checkpoint_type: String,
    },
}

impl LinkOutcome {
    pub fn account_id(&self) -> &str {
        match self {
            LinkOutcome::Connected { account_id }
            | LinkOutcome::CheckpointRequired { account_id, .. } => account_id,
        }
    }

    pub fn needs_checkpoint(&self) -> bool {
        matches!(self, LinkOutcome::CheckpointRequired { .. })
    }
}

impl From<LinkResponse> for LinkOutcome {
    fn from(resp: LinkResponse) -> Self {
        match resp.checkpoint_type.filter(|t| !t.is_empty()) {
            Some(checkpoint_type) => LinkOutcome::CheckpointRequired {
                account_id: resp.account_id,
                checkpoint_type,
            },
            None => LinkOutcome::Connected {
                account_id: resp.account_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accounts_response() {
        let json = r#"{"message": "Get success", "accounts": [{"id": "6f1c1f7e-3b0d-4d8e-9f57-0c2a1b9d4e11", "user_email": "a@b.co", "provider": "linkedin", "account_id": "acc_123", "created_at": "2025-03-01T10:15:00Z", "updated_at": "2025-03-01T10:15:00Z"}]}"#;
        let accounts = serde_json::from_str::<AccountsResponse>(json)
            .unwrap()
            .into_accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].provider, "linkedin");
        assert_eq!(accounts[0].account_id, "acc_123");
    }

    #[test]
    fn test_null_accounts_is_empty() {
        let resp: AccountsResponse =
            serde_json::from_str(r#"{"message": "Get success", "accounts": null}"#).unwrap();
        assert!(resp.into_accounts().is_empty());
    }

    #[test]
    fn test_link_outcome_connected() {
        let resp: LinkResponse =
            serde_json::from_str(r#"{"message": "linked", "account_id": "acc_1"}"#).unwrap();
        let outcome = LinkOutcome::from(resp);
        assert_eq!(
            outcome,
            LinkOutcome::Connected {
                account_id: "acc_1".to_string()
            }
        );
        assert!(!outcome.needs_checkpoint());
    }

    #[test]
    fn test_link_outcome_checkpoint() {
        let resp: LinkResponse = serde_json::from_str(
            r#"{"message": "checkpoint", "account_id": "intent_9", "checkpoint_type": "2FA"}"#,
        )
        .unwrap();
        let outcome = LinkOutcome::from(resp);
        assert!(outcome.needs_checkpoint());
        assert_eq!(outcome.account_id(), "intent_9");
    }

    #[test]
    fn test_link_request_wire_format() {
        let body = serde_json::to_value(CookieLinkRequest {
            access_token: "li_at",
            user_agent: "Mozilla/5.0",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"access_token": "li_at", "user_agent": "Mozilla/5.0"})
        );
    }
}
