use sea_orm::{
    ActiveModelTrait, ActiveValue as AV, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, warn};

use super::{Error, Kind, DB};
use crate::{config::Bootstrap, entity::user, validate};

pub const ADMIN_USERNAME: &str = "admin";
const ADMIN_DEFAULT_PASSWORD: &str = "admin123";

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("Username or Password cannot be empty.")]
    Empty,
    #[error("User does not exist.")]
    UnknownUser,
    #[error("Incorrect password.")]
    WrongPassword,
}

/// A profile form as submitted.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: String,
    pub name: String,
    pub password: String,
    /// Current password, re-checked before anything changes.
    pub current_password: String,
}

async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await
}

fn optional(name: &str) -> Option<String> {
    (!name.is_empty()).then(|| name.to_string())
}

impl DB {
    pub async fn user(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(id).one(&self.connection).await
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        find_by_username(&self.connection, username).await
    }

    pub async fn all_users(&self) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.connection)
            .await
    }

    pub async fn creator_count(&self) -> Result<u64, DbErr> {
        user::Entity::find()
            .filter(user::Column::IsCreator.eq(true))
            .count(&self.connection)
            .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<user::Model, Error> {
        let username = validate::name("Username", username)?;
        validate::password("Password", password)?;

        let txn = self.connection.begin().await?;
        if find_by_username(&txn, &username).await?.is_some() {
            return Err(Error::DuplicateUsername);
        }

        let mut user = user::ActiveModel {
            username: AV::Set(username),
            name: AV::Set(optional(name)),
            is_admin: AV::Set(false),
            is_creator: AV::Set(false),
            ..Default::default()
        };
        self.credentials.set_password(&mut user, password)?;
        let user = user.insert(&txn).await?;
        txn.commit().await?;

        info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, Error> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::Empty.into());
        }
        let Some(user) = self.user_by_username(username).await? else {
            return Err(LoginError::UnknownUser.into());
        };
        if !self.credentials.verify_password(&user, password) {
            return Err(LoginError::WrongPassword.into());
        }
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        update: &ProfileUpdate,
    ) -> Result<user::Model, Error> {
        let username = validate::name("Username", &update.username)?;
        validate::password("Password", &update.password)?;
        validate::required("Current password", &update.current_password)?;

        let txn = self.connection.begin().await?;
        let user = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::User))?;

        if !self.credentials.verify_password(&user, &update.current_password) {
            return Err(Error::IncorrectPassword);
        }
        // only other users can clash
        if let Some(other) = find_by_username(&txn, &username).await? {
            if other.id != user.id {
                return Err(Error::DuplicateUsername);
            }
        }

        let mut active: user::ActiveModel = user.into();
        active.username = AV::Set(username);
        active.name = AV::Set(optional(&update.name));
        self.credentials.set_password(&mut active, &update.password)?;
        let user = active.update(&txn).await?;
        txn.commit().await?;

        info!("updated profile of user {}", user.id);
        Ok(user)
    }

    /// Grants the creator flag. Returns whether anything changed; repeated
    /// calls are no-ops.
    pub async fn promote_to_creator(&self, user_id: i32) -> Result<bool, Error> {
        let txn = self.connection.begin().await?;
        let user = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(Kind::User))?;
        if user.is_creator {
            return Ok(false);
        }

        let mut active: user::ActiveModel = user.into();
        active.is_creator = AV::Set(true);
        active.update(&txn).await?;
        txn.commit().await?;

        info!("user {user_id} is now a creator");
        Ok(true)
    }

    /// Makes sure an `admin` account exists. Returns whether one was created.
    pub async fn bootstrap_admin(&self, bootstrap: &Bootstrap) -> Result<bool, Error> {
        let txn = self.connection.begin().await?;
        if find_by_username(&txn, ADMIN_USERNAME).await?.is_some() {
            return Ok(false);
        }

        let password = match bootstrap.admin_password.as_deref() {
            Some(password) if !password.is_empty() => password,
            _ => {
                warn!(
                    "creating user '{ADMIN_USERNAME}' with the well-known default password; \
                     set bootstrap.admin_password and change it after logging in"
                );
                ADMIN_DEFAULT_PASSWORD
            }
        };

        validate::password("Admin password", password)?;

        let mut admin = user::ActiveModel {
            username: AV::Set(ADMIN_USERNAME.to_string()),
            name: AV::Set(Some("Admin".to_string())),
            is_admin: AV::Set(true),
            is_creator: AV::Set(true),
            ..Default::default()
        };
        self.credentials.set_password(&mut admin, password)?;
        admin.insert(&txn).await?;
        txn.commit().await?;

        info!("created administrator '{ADMIN_USERNAME}'");
        Ok(true)
    }
}
