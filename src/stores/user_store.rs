use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::UserError;
use crate::providers::Clock;
use crate::stores::is_unique_violation;
use crate::types::db::user;
use crate::types::internal::role::Role;
use crate::types::internal::user::{User, UserStatus};

/// Fields for a new user row. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
}

/// Partial update of a user row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub status: Option<UserStatus>,
    pub role: Option<Role>,
    pub soft_delete: bool,
}

/// User plus stored hash, only for credential verification
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Repository for the `users` table
///
/// Soft-deleted rows are invisible to every lookup except
/// `find_by_id_including_deleted` and `display_names`.
pub struct UserStore {
    clock: Arc<dyn Clock>,
}

impl UserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Insert a new user
    ///
    /// The email is checked first so the common case reports a clean conflict;
    /// a concurrent insert that slips past the check is caught by the UNIQUE index.
    ///
    /// # Returns
    /// * `Ok(User)` - Inserted user
    /// * `Err(UserError::DuplicateEmail)` - Email already taken (deleted rows included)
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUser,
    ) -> Result<User, InternalError> {
        if self.email_taken(conn, &new_user.email).await? {
            return Err(UserError::DuplicateEmail {
                email: new_user.email,
            }
            .into());
        }

        let now = self.clock.now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(new_user.name),
            email: Set(new_user.email.clone()),
            password_hash: Set(new_user.password_hash),
            role_id: Set(new_user.role.as_str().to_string()),
            status: Set(new_user.status.as_str().to_string()),
            is_deleted: Set(false),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
        };

        let inserted = model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InternalError::User(UserError::DuplicateEmail {
                    email: new_user.email.clone(),
                })
            } else {
                InternalError::database("insert_user", e)
            }
        })?;

        User::try_from(inserted)
    }

    /// Whether any row, deleted or not, already uses this email
    pub async fn email_taken(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<bool, InternalError> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("check_email", e))?;
        Ok(count > 0)
    }

    /// Find a non-deleted user by id
    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<User>, InternalError> {
        user::Entity::find_by_id(id.to_string())
            .filter(user::Column::IsDeleted.eq(false))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))?
            .map(User::try_from)
            .transpose()
    }

    /// Find a user by id regardless of soft deletion (activity trails)
    pub async fn find_by_id_including_deleted(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<User>, InternalError> {
        user::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id_including_deleted", e))?
            .map(User::try_from)
            .transpose()
    }

    /// Non-deleted user by exact email, with the stored hash for verification
    pub async fn find_credentials_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<UserCredentials>, InternalError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::IsDeleted.eq(false))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))?;

        match model {
            Some(model) => {
                let password_hash = model.password_hash.clone();
                Ok(Some(UserCredentials {
                    user: User::try_from(model)?,
                    password_hash,
                }))
            }
            None => Ok(None),
        }
    }

    /// Non-deleted users, oldest first, optionally filtered by status
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        status: Option<UserStatus>,
    ) -> Result<Vec<User>, InternalError> {
        let mut query = user::Entity::find().filter(user::Column::IsDeleted.eq(false));
        if let Some(status) = status {
            query = query.filter(user::Column::Status.eq(status.as_str()));
        }

        query
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Email)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_users", e))?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Apply a partial update to a non-deleted user and refresh `updated_at`
    ///
    /// Soft deletion sets `is_deleted` and `deleted_at`; the row stays.
    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, InternalError> {
        let existing = user::Entity::find_by_id(id.to_string())
            .filter(user::Column::IsDeleted.eq(false))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("load_user_for_update", e))?
            .ok_or_else(|| UserError::NotFound {
                user_id: id.to_string(),
            })?;

        let now = self.clock.now();
        let mut model: user::ActiveModel = existing.into();
        if let Some(status) = patch.status {
            model.status = Set(status.as_str().to_string());
        }
        if let Some(role) = patch.role {
            model.role_id = Set(role.as_str().to_string());
        }
        if patch.soft_delete {
            model.is_deleted = Set(true);
            model.deleted_at = Set(Some(now));
        }
        model.updated_at = Set(now);

        let updated = model
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_user", e))?;
        User::try_from(updated)
    }

    /// Record a successful login. Session bookkeeping only; `updated_at` is untouched.
    pub async fn touch_last_login(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<(), InternalError> {
        let model = user::ActiveModel {
            id: Set(id.to_string()),
            last_login_at: Set(Some(self.clock.now())),
            ..Default::default()
        };
        model
            .update(conn)
            .await
            .map_err(|e| InternalError::database("touch_last_login", e))?;
        Ok(())
    }

    /// Display names for the given ids, soft-deleted users included
    pub async fn display_names(
        &self,
        conn: &impl ConnectionTrait,
        ids: &[String],
    ) -> Result<HashMap<String, String>, InternalError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, String)> = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .column(user::Column::Name)
            .filter(user::Column::Id.is_in(ids.iter().cloned()))
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("resolve_user_names", e))?;

        Ok(rows.into_iter().collect())
    }

    /// Total rows, soft-deleted included
    pub async fn count_all(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        user::Entity::find()
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_users", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ManualClock;
    use crate::test::utils::setup_test_connections;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::Technician,
            status: UserStatus::Approved,
        }
    }

    async fn setup() -> (sea_orm::DatabaseConnection, UserStore, Arc<ManualClock>) {
        let connections = setup_test_connections().await;
        let clock = Arc::new(ManualClock::new(1_000));
        (connections.main, UserStore::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (db, store, _clock) = setup().await;
        let user = store.insert(&db, new_user("ada@example.com")).await.unwrap();

        assert_eq!(user.created_at, 1_000);
        assert_eq!(user.role, Role::Technician);

        let found = store.find_by_id(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(found, user);

        let creds = store
            .find_credentials_by_email(&db, "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "$argon2id$placeholder");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_and_row_count_unchanged() {
        let (db, store, _clock) = setup().await;
        store.insert(&db, new_user("dup@example.com")).await.unwrap();

        let result = store.insert(&db, new_user("dup@example.com")).await;
        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateEmail { .. }))
        ));
        assert_eq!(store.count_all(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let (db, store, _clock) = setup().await;
        store.insert(&db, new_user("ada@example.com")).await.unwrap();

        assert!(store
            .find_credentials_by_email(&db, "ADA@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_hidden_but_resolvable() {
        let (db, store, clock) = setup().await;
        let user = store.insert(&db, new_user("gone@example.com")).await.unwrap();
        clock.advance(50);

        let deleted = store
            .update(
                &db,
                &user.id,
                UserPatch {
                    soft_delete: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(deleted.is_deleted);
        assert_eq!(deleted.deleted_at, Some(1_050));

        assert!(store.find_by_id(&db, &user.id).await.unwrap().is_none());
        assert!(store.list(&db, None).await.unwrap().is_empty());
        assert!(store
            .find_credentials_by_email(&db, "gone@example.com")
            .await
            .unwrap()
            .is_none());

        let names = store.display_names(&db, &[user.id.clone()]).await.unwrap();
        assert_eq!(names.get(&user.id).map(String::as_str), Some("Ada Lovelace"));
        assert!(store
            .find_by_id_including_deleted(&db, &user.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_partial_update_changes_only_supplied_fields() {
        let (db, store, clock) = setup().await;
        let user = store.insert(&db, new_user("patch@example.com")).await.unwrap();
        clock.advance(10);

        let updated = store
            .update(
                &db,
                &user.id,
                UserPatch {
                    role: Some(Role::Supervisor),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Supervisor);
        assert_eq!(updated.status, user.status);
        assert_eq!(updated.name, user.name);
        assert_eq!(updated.updated_at, 1_010);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let (db, store, _clock) = setup().await;
        let result = store.update(&db, "missing", UserPatch::default()).await;
        assert!(matches!(
            result,
            Err(InternalError::User(UserError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (db, store, _clock) = setup().await;
        store.insert(&db, new_user("a@example.com")).await.unwrap();
        let mut pending = new_user("b@example.com");
        pending.status = UserStatus::Pending;
        store.insert(&db, pending).await.unwrap();

        let listed = store.list(&db, Some(UserStatus::Pending)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "b@example.com");
        assert_eq!(store.list(&db, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_touch_last_login_keeps_updated_at() {
        let (db, store, clock) = setup().await;
        let user = store.insert(&db, new_user("login@example.com")).await.unwrap();
        clock.advance(30);

        store.touch_last_login(&db, &user.id).await.unwrap();
        let found = store.find_by_id(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(found.last_login_at, Some(1_030));
        assert_eq!(found.updated_at, user.updated_at);
    }
}
