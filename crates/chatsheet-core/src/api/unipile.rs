//! LinkedIn account linking through the backend's Unipile integration

use super::{ApiClient, ApiError};
use crate::models::{
    AccountsResponse, BasicLinkRequest, CheckpointRequest, CookieLinkRequest, LinkOutcome,
    LinkResponse, UnipileAccount,
};

const ACCOUNTS_PATH: &str = "/api/unipile";
const LINKEDIN_BASIC_PATH: &str = "/api/unipile/linkedin/basic";
const LINKEDIN_COOKIE_PATH: &str = "/api/unipile/linkedin/cookie";
const LINKEDIN_CHECKPOINT_PATH: &str = "/api/unipile/linkedin/checkpoint";

impl ApiClient {
    /// List accounts linked to the logged-in user
    pub async fn list_accounts(&self) -> Result<Vec<UnipileAccount>, ApiError> {
        let response: AccountsResponse = self.get(ACCOUNTS_PATH).await?;
        Ok(response.into_accounts())
    }

    /// Link a LinkedIn account with username and password
    pub async fn connect_linkedin_basic(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LinkOutcome, ApiError> {
        let body = BasicLinkRequest { username, password };
        let response: LinkResponse = self.post(LINKEDIN_BASIC_PATH, &body).await?;
        Ok(response.into())
    }

    /// Link a LinkedIn account with an existing session cookie (`li_at`)
    pub async fn connect_linkedin_cookie(
        &self,
        access_token: &str,
        user_agent: &str,
    ) -> Result<LinkOutcome, ApiError> {
        let body = CookieLinkRequest {
            access_token,
            user_agent,
        };
        let response: LinkResponse = self.post(LINKEDIN_COOKIE_PATH, &body).await?;
        Ok(response.into())
    }

    /// Answer a pending checkpoint.
    /// `account_id` is the one returned with `LinkOutcome::CheckpointRequired`.
    pub async fn solve_checkpoint(
        &self,
        account_id: &str,
        code: &str,
    ) -> Result<LinkOutcome, ApiError> {
        let body = CheckpointRequest { account_id, code };
        let response: LinkResponse = self.post(LINKEDIN_CHECKPOINT_PATH, &body).await?;
        Ok(response.into())
    }
}
