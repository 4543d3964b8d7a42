use crate::error::{AgoraSdkError, Result};
use crate::ledger_api::LedgerApi;
use agora_state::MarketplaceItem;
use std::sync::Arc;
use tracing::debug;

/// Why content is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockReason {
    FreeItem,
    Owner,
    Purchased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Ledger query in flight (or not yet issued).
    Checking,
    /// No purchase found; render the purchase offer.
    Locked,
    Unlocked(UnlockReason),
}

/// Render-time decision for one gated item and one viewer.
///
/// Free items and the item's own creator unlock without ever touching the
/// ledger. Everything else starts at `Checking` and resolves through a
/// ledger read. After a purchase, call [`resolve`] again: the gate
/// re-queries rather than assuming success, because the ledger write may
/// not be visible to the read path yet.
///
/// [`resolve`]: AccessGate::resolve
pub struct AccessGate {
    ledger: Arc<dyn LedgerApi>,
    item: MarketplaceItem,
    viewer_id: Option<String>,
    state: GateState,
}

impl AccessGate {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        item: MarketplaceItem,
        viewer_id: Option<String>,
    ) -> Self {
        let state = if item.is_free {
            GateState::Unlocked(UnlockReason::FreeItem)
        } else if viewer_id
            .as_deref()
            .is_some_and(|viewer| item.is_owned_by(viewer))
        {
            GateState::Unlocked(UnlockReason::Owner)
        } else {
            GateState::Checking
        };

        Self {
            ledger,
            item,
            viewer_id,
            state,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, GateState::Unlocked(_))
    }

    pub fn item(&self) -> &MarketplaceItem {
        &self.item
    }

    /// Drive the gate to a terminal decision for the current viewer.
    ///
    /// Unlocked states are terminal. From `Checking` or `Locked` this
    /// issues a fresh ledger read; a read failure leaves the gate locked
    /// rather than guessing.
    pub async fn resolve(&mut self) -> Result<GateState> {
        if let GateState::Unlocked(_) = self.state {
            return Ok(self.state);
        }

        // Anonymous viewers cannot hold purchases; stay locked without a
        // pointless query.
        let Some(viewer_id) = self.viewer_id.clone() else {
            self.state = GateState::Locked;
            return Ok(self.state);
        };

        self.state = GateState::Checking;
        match self
            .ledger
            .check_user_purchase(&viewer_id, &self.item.id, self.item.kind)
            .await
        {
            Ok(true) => {
                self.state = GateState::Unlocked(UnlockReason::Purchased);
                Ok(self.state)
            }
            Ok(false) => {
                debug!(item = %self.item.id, viewer = %viewer_id, "no purchase on record");
                self.state = GateState::Locked;
                Ok(self.state)
            }
            Err(err) => {
                self.state = GateState::Locked;
                Err(AgoraSdkError::Ledger {
                    signature: None,
                    reason: err.to_string(),
                })
            }
        }
    }
}
