// File: questdeck-core/src/repositories/postgres/cards.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questdeck_common::error::Error;
use questdeck_common::models::card::{Card, CardTemplate, PoolKind};
use questdeck_common::traits::repository_traits::CardRepository;

pub struct PostgresCardRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresCardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn template_from_row(r: &sqlx::postgres::PgRow) -> Result<CardTemplate, Error> {
    let spec: serde_json::Value = r.try_get("spec")?;
    let tpl: CardTemplate = serde_json::from_value(spec)?;
    Ok(tpl)
}

fn card_from_row(r: &sqlx::postgres::PgRow) -> Result<Card, Error> {
    let spec: serde_json::Value = r.try_get("template_spec")?;
    let template: CardTemplate = serde_json::from_value(spec)?;
    Ok(Card {
        card_id: r.try_get("card_id")?,
        owner_username: r.try_get("owner_username")?,
        template,
        done: r.try_get("done")?,
        progress: r.try_get("progress")?,
        history: r.try_get("history")?,
        is_viewed: r.try_get("is_viewed")?,
        version: r.try_get("version")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl CardRepository for PostgresCardRepository {
    async fn create_template(&self, tpl: &CardTemplate) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO card_templates (
                template_id,
                pool,
                goal,
                spec,
                created_at
            )
            VALUES ($1,$2,$3,$4,$5)
            "#,
        )
            .bind(tpl.template_id)
            .bind(tpl.placement.pool().as_str())
            .bind(&tpl.goal)
            .bind(serde_json::to_value(tpl)?)
            .bind(tpl.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_template_by_id(&self, template_id: Uuid) -> Result<Option<CardTemplate>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT spec
            FROM card_templates
            WHERE template_id = $1
            "#,
        )
            .bind(template_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(template_from_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn list_templates(&self) -> Result<Vec<CardTemplate>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT spec
            FROM card_templates
            ORDER BY created_at
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(template_from_row(&r)?);
        }
        Ok(out)
    }

    async fn list_templates_by_pool(&self, pool: PoolKind) -> Result<Vec<CardTemplate>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT spec
            FROM card_templates
            WHERE pool = $1
            ORDER BY created_at
            "#,
        )
            .bind(pool.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(template_from_row(&r)?);
        }
        Ok(out)
    }

    async fn delete_templates(&self, template_ids: &[Uuid]) -> Result<(), Error> {
        sqlx::query(
            r#"
            DELETE FROM card_templates
            WHERE template_id = ANY($1)
            "#,
        )
            .bind(template_ids)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_card(&self, card: &Card) -> Result<(), Error> {
        let (chain_name, chain_order) = match card.template.placement.chain() {
            Some((name, order)) => (Some(name.to_string()), Some(order)),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO cards (
                card_id,
                owner_username,
                template_id,
                pool,
                chain_name,
                chain_order,
                template_spec,
                done,
                progress,
                history,
                is_viewed,
                version,
                created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            "#,
        )
            .bind(card.card_id)
            .bind(&card.owner_username)
            .bind(card.template.template_id)
            .bind(card.template.placement.pool().as_str())
            .bind(chain_name)
            .bind(chain_order)
            .bind(serde_json::to_value(&card.template)?)
            .bind(card.done)
            .bind(card.progress)
            .bind(&card.history)
            .bind(card.is_viewed)
            .bind(card.version)
            .bind(card.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_card_by_id(&self, card_id: Uuid) -> Result<Option<Card>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT
                card_id,
                owner_username,
                template_spec,
                done,
                progress,
                history,
                is_viewed,
                version,
                created_at
            FROM cards
            WHERE card_id = $1
            "#,
        )
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(card_from_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn list_cards_for_owner(
        &self,
        owner: &str,
        pool: Option<PoolKind>,
    ) -> Result<Vec<Card>, Error> {
        // chain_name/chain_order are NULL for daily cards, so the sort only
        // matters for const-pool results, which come back chain-grouped.
        let rows = match pool {
            Some(p) => {
                sqlx::query(
                    r#"
                    SELECT
                        card_id,
                        owner_username,
                        template_spec,
                        done,
                        progress,
                        history,
                        is_viewed,
                        version,
                        created_at
                    FROM cards
                    WHERE owner_username = $1
                      AND pool = $2
                    ORDER BY chain_name, chain_order
                    "#,
                )
                    .bind(owner)
                    .bind(p.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT
                        card_id,
                        owner_username,
                        template_spec,
                        done,
                        progress,
                        history,
                        is_viewed,
                        version,
                        created_at
                    FROM cards
                    WHERE owner_username = $1
                    ORDER BY chain_name, chain_order
                    "#,
                )
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(card_from_row(&r)?);
        }
        Ok(out)
    }

    async fn update_card(&self, card: &Card) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET done = $1,
                progress = $2,
                history = $3,
                is_viewed = $4,
                version = version + 1
            WHERE card_id = $5
              AND version = $6
            "#,
        )
            .bind(card.done)
            .bind(card.progress)
            .bind(&card.history)
            .bind(card.is_viewed)
            .bind(card.card_id)
            .bind(card.version)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            // row gone or a concurrent writer bumped the version first
            return Err(Error::StaleCard(card.card_id));
        }
        Ok(())
    }

    async fn mark_card_viewed(&self, card_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE cards
            SET is_viewed = TRUE
            WHERE card_id = $1
            "#,
        )
            .bind(card_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_card(&self, card_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            DELETE FROM cards
            WHERE card_id = $1
            "#,
        )
            .bind(card_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_pending_cards(&self, owner: &str, pool: PoolKind) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM cards
            WHERE owner_username = $1
              AND pool = $2
              AND done = 0
            "#,
        )
            .bind(owner)
            .bind(pool.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
