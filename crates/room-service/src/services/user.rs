//! User service
//!
//! Presence in the room: join by display name, leave, activity, who is online.

use room_core::entities::User;
use room_core::{validate_display_name, Snowflake};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Bring a display name online on the given connection
    ///
    /// The name is trimmed and validated. The most recently active user with
    /// that exact name is reused; otherwise a new user is created.
    #[instrument(skip(self, raw_name))]
    pub async fn join(&self, raw_name: &str, socket_id: &str) -> ServiceResult<User> {
        let name = validate_display_name(raw_name)?;

        let existing = self.ctx.user_repo().find_latest_by_name(&name).await?;
        let user = match existing {
            Some(user) => {
                let user = self.ctx.user_repo().set_online(user.id, socket_id).await?;
                debug!(user_id = %user.id, "Reusing existing user");
                user
            }
            None => {
                let user = User::new_online(self.ctx.generate_id(), name, socket_id.to_string());
                self.ctx.user_repo().create(&user).await?;
                info!(user_id = %user.id, name = %user.name, "User created");
                user
            }
        };

        Ok(user)
    }

    /// Take a user offline and clear its connection binding
    #[instrument(skip(self))]
    pub async fn leave(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self.ctx.user_repo().set_offline(user_id).await?)
    }

    /// Record activity
    #[instrument(skip(self))]
    pub async fn touch(&self, user_id: Snowflake) -> ServiceResult<()> {
        Ok(self.ctx.user_repo().touch(user_id).await?)
    }

    /// Online users, ordered by name
    pub async fn active_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.user_repo().find_online().await?)
    }

    pub async fn count_online(&self) -> ServiceResult<i64> {
        Ok(self.ctx.user_repo().count_online().await?)
    }
}
