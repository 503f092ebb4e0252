//! User entity <-> model mapper

use room_core::entities::User;
use room_core::value_objects::Snowflake;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            name: model.name,
            is_online: model.is_online,
            socket_id: model.socket_id,
            last_active_at: model.last_active_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert User entity reference to values for database insertion
pub struct UserInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub is_online: bool,
    pub socket_id: Option<&'a str>,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            name: &user.name,
            is_online: user.is_online,
            socket_id: user.socket_id.as_deref(),
        }
    }
}
