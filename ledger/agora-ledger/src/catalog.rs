use crate::error::CatalogError;
use agora_state::{ItemKind, MarketplaceItem};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Read-only lookup into the marketplace listings. Item writes belong to
/// the listing CRUD elsewhere; the ledger only needs the canonical price
/// and parties.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn item(
        &self,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<Option<MarketplaceItem>, CatalogError>;
}

/// Fixed catalog for tests and demos.
#[derive(Default)]
pub struct MemoryCatalog {
    items: Mutex<Vec<MarketplaceItem>>,
}

impl MemoryCatalog {
    pub fn new(items: Vec<MarketplaceItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub async fn add(&self, item: MarketplaceItem) {
        self.items.lock().await.push(item);
    }
}

#[async_trait]
impl ItemCatalog for MemoryCatalog {
    async fn item(
        &self,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<Option<MarketplaceItem>, CatalogError> {
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .find(|item| item.id == item_id && item.kind == kind)
            .cloned())
    }
}
