// File: questdeck-core/src/repositories/postgres/users.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use questdeck_common::error::Error;
use questdeck_common::models::user::User;
use questdeck_common::traits::repository_traits::UserRepository;

pub struct PostgresUserRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn user_from_row(r: &sqlx::postgres::PgRow) -> Result<User, Error> {
    Ok(User {
        user_id: r.try_get("user_id")?,
        username: r.try_get("username")?,
        nickname: r.try_get("nickname")?,
        avatar_url: r.try_get("avatar_url")?,
        points: r.try_get("points")?,
        created_at: r.try_get("created_at")?,
        last_daily_update: r.try_get("last_daily_update")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                nickname,
                avatar_url,
                points,
                created_at,
                last_daily_update
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.nickname)
            .bind(&user.avatar_url)
            .bind(user.points)
            .bind(user.created_at)
            .bind(user.last_daily_update)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::UserExists(user.username.clone())
                }
                other => Error::Database(other),
            })?;

        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT
                user_id,
                username,
                nickname,
                avatar_url,
                points,
                created_at,
                last_daily_update
            FROM users
            WHERE username = $1
            "#,
        )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(user_from_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<User>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                user_id,
                username,
                nickname,
                avatar_url,
                points,
                created_at,
                last_daily_update
            FROM users
            ORDER BY created_at
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(user_from_row(&r)?);
        }
        Ok(out)
    }

    async fn add_points(&self, username: &str, delta: i64) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET points = points + $1
            WHERE username = $2
            "#,
        )
            .bind(delta)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(username.to_string()));
        }
        Ok(())
    }

    async fn set_last_daily_update(&self, username: &str, at: DateTime<Utc>) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_daily_update = $1
            WHERE username = $2
            "#,
        )
            .bind(at)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(username.to_string()));
        }
        Ok(())
    }
}
