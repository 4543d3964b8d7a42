use crate::error::StoreError;
use crate::store::{InsertOutcome, PurchaseStore};
use agora_state::{ItemKind, PurchaseRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio_postgres::{Client, NoTls, Row};
use tracing::error;
use uuid::Uuid;

/// Purchase-record schema. The two UNIQUE constraints are the concurrency
/// story: duplicate purchases and signature replays are stopped by the
/// database, not by application-level checks.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS purchase_records (
    id UUID PRIMARY KEY,
    buyer_id TEXT NOT NULL,
    seller_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    item_kind TEXT NOT NULL,
    amount_lamports BIGINT NOT NULL,
    transaction_signature TEXT NOT NULL,
    buyer_wallet TEXT NOT NULL,
    seller_wallet TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    UNIQUE (buyer_id, item_id, item_kind),
    UNIQUE (transaction_signature)
);
"#;

const INSERT: &str = "\
INSERT INTO purchase_records \
    (id, buyer_id, seller_id, item_id, item_kind, amount_lamports, \
     transaction_signature, buyer_wallet, seller_wallet, created_at) \
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
ON CONFLICT DO NOTHING";

const SELECT_BY_SIGNATURE: &str =
    "SELECT * FROM purchase_records WHERE transaction_signature = $1";

const SELECT_BY_BUYER_ITEM: &str =
    "SELECT * FROM purchase_records WHERE buyer_id = $1 AND item_id = $2 AND item_kind = $3";

/// Postgres-backed purchase store.
pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(conn_str: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(db_err)?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(%err, "postgres connection task ended");
            }
        });
        client.batch_execute(SCHEMA).await.map_err(db_err)?;
        Ok(Self { client })
    }
}

fn db_err(err: tokio_postgres::Error) -> StoreError {
    StoreError(err.to_string())
}

fn parse_err(what: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError(format!("stored {what} failed to parse: {err}"))
}

fn row_to_record(row: &Row) -> Result<PurchaseRecord, StoreError> {
    let kind: String = row.get("item_kind");
    let signature: String = row.get("transaction_signature");
    let buyer_wallet: String = row.get("buyer_wallet");
    let seller_wallet: String = row.get("seller_wallet");
    let amount: i64 = row.get("amount_lamports");
    let id: Uuid = row.get("id");
    let created_at: DateTime<Utc> = row.get("created_at");

    Ok(PurchaseRecord {
        id,
        buyer_id: row.get("buyer_id"),
        seller_id: row.get("seller_id"),
        item_id: row.get("item_id"),
        item_kind: kind
            .parse::<ItemKind>()
            .map_err(|err| parse_err("item kind", err))?,
        amount_lamports: amount as u64,
        transaction_signature: signature
            .parse::<Signature>()
            .map_err(|err| parse_err("signature", err))?,
        buyer_wallet: buyer_wallet
            .parse::<Pubkey>()
            .map_err(|err| parse_err("buyer wallet", err))?,
        seller_wallet: seller_wallet
            .parse::<Pubkey>()
            .map_err(|err| parse_err("seller wallet", err))?,
        created_at,
    })
}

#[async_trait]
impl PurchaseStore for PgStore {
    async fn insert(&self, record: PurchaseRecord) -> Result<InsertOutcome, StoreError> {
        let rows = self
            .client
            .execute(
                INSERT,
                &[
                    &record.id,
                    &record.buyer_id,
                    &record.seller_id,
                    &record.item_id,
                    &record.item_kind.as_str(),
                    &(record.amount_lamports as i64),
                    &record.transaction_signature.to_string(),
                    &record.buyer_wallet.to_string(),
                    &record.seller_wallet.to_string(),
                    &record.created_at,
                ],
            )
            .await
            .map_err(db_err)?;

        if rows == 1 {
            return Ok(InsertOutcome::Inserted(record));
        }

        // One of the two constraints fired; work out which row won.
        if let Some(existing) = self.find_by_signature(&record.transaction_signature).await? {
            if existing.buyer_id == record.buyer_id
                && existing.item_id == record.item_id
                && existing.item_kind == record.item_kind
            {
                return Ok(InsertOutcome::AlreadyPurchased(existing));
            }
            return Ok(InsertOutcome::SignatureConflict(existing));
        }
        if let Some(existing) = self
            .find_by_buyer_item(&record.buyer_id, &record.item_id, record.item_kind)
            .await?
        {
            return Ok(InsertOutcome::AlreadyPurchased(existing));
        }
        Err(StoreError(
            "insert conflicted but no conflicting row was found".to_string(),
        ))
    }

    async fn find_by_signature(
        &self,
        signature: &Signature,
    ) -> Result<Option<PurchaseRecord>, StoreError> {
        let row = self
            .client
            .query_opt(SELECT_BY_SIGNATURE, &[&signature.to_string()])
            .await
            .map_err(db_err)?;
        row.map(|row| row_to_record(&row)).transpose()
    }

    async fn find_by_buyer_item(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<Option<PurchaseRecord>, StoreError> {
        let row = self
            .client
            .query_opt(SELECT_BY_BUYER_ITEM, &[&buyer_id, &item_id, &kind.as_str()])
            .await
            .map_err(db_err)?;
        row.map(|row| row_to_record(&row)).transpose()
    }

    async fn exists(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<bool, StoreError> {
        Ok(self
            .find_by_buyer_item(buyer_id, item_id, kind)
            .await?
            .is_some())
    }
}
