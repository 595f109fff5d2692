//! User entity <-> model mapper

use chat_core::entities::User;
use chat_core::value_objects::UserId;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.id),
            name: model.name,
            email: model.email,
            avatar: model.avatar,
        }
    }
}
