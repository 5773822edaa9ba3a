use career_core::model::{Email, NewUser, User, UserId};

use super::MySqlRepository;
use super::mapping::map_user_row;
use crate::repository::{StorageError, UserInsert, UserRepository};

const USER_COLUMNS: &str = "id, name, email, password, grade, created_at";

#[async_trait::async_trait]
impl UserRepository for MySqlRepository {
    async fn insert_user(&self, user: NewUser) -> Result<UserInsert, StorageError> {
        if let Some(existing) = self.find_by_email(&user.email).await? {
            return Ok(UserInsert::Existing(existing));
        }

        let res = sqlx::query(
            r"
            INSERT INTO users (name, email, password, grade, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.grade.number())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) => Ok(UserInsert::Created(
                user.assign_id(UserId::new(done.last_insert_id())),
            )),
            // Lost a race with a concurrent registration of the same email.
            Err(e) => match self.query_err(e) {
                StorageError::Conflict => self
                    .find_by_email(&user.email)
                    .await?
                    .map(UserInsert::Existing)
                    .ok_or(StorageError::Conflict),
                other => Err(other),
            },
        }
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        row.as_ref().map(map_user_row).transpose()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        row.as_ref().map(map_user_row).transpose()
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE users SET name = ?, grade = ? WHERE id = ?")
            .bind(user.name().as_str())
            .bind(user.grade().number())
            .bind(user.id().value())
            .execute(&self.pool)
            .await
            .map_err(|e| self.query_err(e))?;
        // MySQL reports matched-but-unchanged rows as 0 affected.
        if res.rows_affected() == 0 && self.get_user(user.id()).await?.is_none() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
