// File: questdeck-core/src/repositories/postgres/prizes.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use questdeck_common::error::Error;
use questdeck_common::models::user::UserPrize;
use questdeck_common::traits::repository_traits::PrizeRepository;

/// Append-only prize ledger. One row per grant; repeat wins of the same
/// prize are collapsed at display time by the user service.
pub struct PostgresPrizeRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresPrizeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrizeRepository for PostgresPrizeRepository {
    async fn record_grant(&self, prize: &UserPrize) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO user_prizes (
                prize_id,
                owner_username,
                prize_url,
                available,
                granted_at
            )
            VALUES ($1,$2,$3,$4,$5)
            "#,
        )
            .bind(prize.prize_id)
            .bind(&prize.owner_username)
            .bind(&prize.prize_url)
            .bind(prize.available)
            .bind(prize.granted_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<UserPrize>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                prize_id,
                owner_username,
                prize_url,
                available,
                granted_at
            FROM user_prizes
            WHERE owner_username = $1
            ORDER BY granted_at
            "#,
        )
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(UserPrize {
                prize_id: r.try_get("prize_id")?,
                owner_username: r.try_get("owner_username")?,
                prize_url: r.try_get("prize_url")?,
                available: r.try_get("available")?,
                granted_at: r.try_get("granted_at")?,
            });
        }
        Ok(out)
    }
}
