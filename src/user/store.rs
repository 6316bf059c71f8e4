use super::auth::{AuthToken, AuthTokenValue};
use super::models::{NewUser, User};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    /// Returns Err if the email is already taken.
    fn create_user(&self, new_user: &NewUser) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns Ok(None) if no account carries this email.
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns all user ids, ascending.
    fn all_user_ids(&self) -> Result<Vec<usize>>;

    /// Updates the show_course/show_year/show_faculty privacy flags.
    fn set_privacy_flags(
        &self,
        user_id: usize,
        show_course: bool,
        show_year: bool,
        show_faculty: bool,
    ) -> Result<()>;

    /// Adds a new session token.
    fn add_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Returns Ok(None) if the token does not exist.
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes a session token. Missing tokens are a no-op.
    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<()>;

    /// Stamps the token with the latest use timestamp.
    fn touch_auth_token(&self, value: &AuthTokenValue) -> Result<()>;
}
