//! PostgreSQL storage implementation.
//!
//! Queries are built at runtime with `sqlx::query` so the crate compiles
//! without a live database. The schema is embedded from `migrations/`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use skye_core::{
    inviter_commission, AccountSummary, CompletionRecord, Gift, GiftId, GiftReason, RedeemCode,
    Redemption, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::Store;

const USER_COLUMNS: &str =
    "id, email, password_hash, name, is_vip, invitation_code, inviter_id, date_joined";

/// PostgreSQL-backed storage implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to `database_url` and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool without running migrations.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_user(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        is_vip: row.try_get("is_vip")?,
        invitation_code: row.try_get("invitation_code")?,
        inviter_id: UserId::from_uuid(row.try_get("inviter_id")?),
        date_joined: row.try_get("date_joined")?,
    })
}

fn redeem_code_from_row(row: &PgRow) -> Result<RedeemCode> {
    let redeemer: Option<Uuid> = row.try_get("redeemer_id")?;
    Ok(RedeemCode {
        code: row.try_get("code")?,
        amount: row.try_get("amount")?,
        created_at: row.try_get("created_at")?,
        redeemer: redeemer.map(UserId::from_uuid),
        redeemed_at: row.try_get("redeemed_at")?,
    })
}

fn gift_from_row(row: &PgRow) -> Result<Gift> {
    let id: String = row.try_get("id")?;
    let reason: String = row.try_get("reason")?;
    Ok(Gift {
        id: id
            .parse::<GiftId>()
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        amount: row.try_get("amount")?,
        reason: GiftReason::parse(&reason),
        gifted_at: row.try_get("gifted_at")?,
    })
}

/// Name of the violated unique constraint, if `e` is a unique violation.
fn unique_violation(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

async fn insert_user<'e, E>(executor: E, user: &User) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, is_vip, invitation_code, inviter_id, date_joined)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(user.id.as_uuid())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.is_vip)
    .bind(&user.invitation_code)
    .bind(user.inviter_id.as_uuid())
    .bind(user.date_joined)
    .execute(executor)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => match unique_violation(&e).as_deref() {
            Some("users_email_key") => Err(StoreError::DuplicateEmail {
                email: user.email.clone(),
            }),
            Some("users_invitation_code_key") => Err(StoreError::DuplicateInvitationCode {
                code: user.invitation_code.clone().unwrap_or_default(),
            }),
            _ => Err(e.into()),
        },
    }
}

async fn insert_gift<'e, E>(executor: E, gift: &Gift) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO gifts (id, user_id, amount, reason, gifted_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(gift.id.to_string())
    .bind(gift.user_id.as_uuid())
    .bind(gift.amount)
    .bind(gift.reason.as_str())
    .bind(gift.gifted_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    async fn create_root_user(&self, user: &User) -> Result<()> {
        insert_user(&self.pool, user).await
    }

    async fn register_user(&self, user: &User, gifts: &[Gift]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_user(&mut *tx, user).await?;
        for gift in gifts {
            insert_gift(&mut *tx, gift).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn get_user_by_invitation_code(&self, code: &str) -> Result<Option<User>> {
        self.fetch_user("invitation_code", code).await
    }

    async fn assign_invitation_code(&self, user_id: &UserId, code: &str) -> Result<String> {
        let result = sqlx::query(
            "UPDATE users SET invitation_code = $2
             WHERE id = $1 AND invitation_code IS NULL
             RETURNING invitation_code",
        )
        .bind(user_id.as_uuid())
        .bind(code)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(row.try_get("invitation_code")?),
            Ok(None) => {
                // Already assigned, or no such user.
                let existing: Option<Option<String>> =
                    sqlx::query_scalar("SELECT invitation_code FROM users WHERE id = $1")
                        .bind(user_id.as_uuid())
                        .fetch_optional(&self.pool)
                        .await?;
                existing.flatten().ok_or(StoreError::NotFound)
            }
            Err(e) if unique_violation(&e).is_some() => Err(StoreError::DuplicateInvitationCode {
                code: code.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_vip(&self, user_id: &UserId, is_vip: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_vip = $2 WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(is_vip)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_invitees(&self, inviter_id: &UserId) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE inviter_id = $1 AND id <> $1
             ORDER BY date_joined DESC"
        );
        sqlx::query(&sql)
            .bind(inviter_id.as_uuid())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn count_users(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Redeem Code Operations
    // =========================================================================

    async fn put_redeem_code(&self, code: &RedeemCode) -> Result<()> {
        sqlx::query(
            "INSERT INTO redeem_codes (code, amount, created_at, redeemer_id, redeemed_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&code.code)
        .bind(code.amount)
        .bind(code.created_at)
        .bind(code.redeemer.map(|id| *id.as_uuid()))
        .bind(code.redeemed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn redeem_code(&self, user: &User, code: &str) -> Result<Redemption> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let amount: Option<i64> = sqlx::query_scalar(
            "UPDATE redeem_codes SET redeemer_id = $2, redeemed_at = $3
             WHERE code = $1 AND redeemer_id IS NULL
             RETURNING amount",
        )
        .bind(code)
        .bind(user.id.as_uuid())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(amount) = amount else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM redeem_codes WHERE code = $1)")
                    .bind(code)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                StoreError::CodeAlreadyRedeemed {
                    code: code.to_string(),
                }
            } else {
                StoreError::UnknownCode {
                    code: code.to_string(),
                }
            });
        };

        let inviter_gift = inviter_commission(amount);
        let gift = Gift {
            gifted_at: now,
            ..Gift::new(user.inviter_id, inviter_gift, GiftReason::RedemptionCommission)
        };
        insert_gift(&mut *tx, &gift).await?;
        tx.commit().await?;

        Ok(Redemption {
            code: code.to_string(),
            amount,
            inviter_id: user.inviter_id,
            inviter_gift,
            redeemed_at: now,
        })
    }

    async fn list_redeemed_codes(&self, user_id: &UserId) -> Result<Vec<RedeemCode>> {
        sqlx::query(
            "SELECT code, amount, created_at, redeemer_id, redeemed_at FROM redeem_codes
             WHERE redeemer_id = $1
             ORDER BY redeemed_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(redeem_code_from_row)
        .collect()
    }

    // =========================================================================
    // Gift Operations
    // =========================================================================

    async fn put_gift(&self, gift: &Gift) -> Result<()> {
        insert_gift(&self.pool, gift).await
    }

    async fn list_gifts(&self, user_id: &UserId) -> Result<Vec<Gift>> {
        sqlx::query(
            "SELECT id, user_id, amount, reason, gifted_at FROM gifts
             WHERE user_id = $1
             ORDER BY gifted_at DESC, id DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(gift_from_row)
        .collect()
    }

    // =========================================================================
    // Usage Operations
    // =========================================================================

    async fn record_completion(&self, record: &CompletionRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO completions
                (id, user_id, model, prompt, completion, finish_reason,
                 prompt_usage, completion_usage, total_usage, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_uuid())
        .bind(&record.model)
        .bind(&record.prompt)
        .bind(&record.completion)
        .bind(&record.finish_reason)
        .bind(record.prompt_usage)
        .bind(record.completion_usage)
        .bind(record.total_usage)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn account_summary(&self, user_id: &UserId) -> Result<AccountSummary> {
        let row = sqlx::query(
            "SELECT
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM redeem_codes WHERE redeemer_id = $1) AS paid,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM gifts WHERE user_id = $1) AS gifted,
                (SELECT COALESCE(SUM(total_usage), 0)::BIGINT FROM completions WHERE user_id = $1) AS used",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(AccountSummary::new(
            row.try_get("paid")?,
            row.try_get("gifted")?,
            row.try_get("used")?,
        ))
    }
}
