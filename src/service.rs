//! Service layer implementing the lot lifecycle over the storage facade.
use super::error::TransferError;
use super::lot::{self, Lot, LotDraft, LotKey, LotStatus};
use super::store::{LotBatch, LotStore};
use std::sync::Arc;

/// Key the seed lot is stored under.
pub const SEED_KEY: &str = "1";

pub struct TransferService {
    store: LotStore,
}

impl TransferService {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self {
            store: LotStore::new(instance),
        }
    }

    /// Seed the ledger with the well-known first lot under [`SEED_KEY`].
    /// Overwrites unconditionally; this is a fixture, not a lifecycle
    /// operation.
    pub fn init_ledger(&self) -> Result<Lot, TransferError> {
        let lot = LotDraft::new()
            .set_product_id("FirstProduct_00.00.2000")
            .set_name("FirstProduct")
            .set_owner("FirstOwner")
            .set_value("10$")
            .set_quantity(70)
            .set_expiration_date("01.01.2199")
            .set_manufactured_date("02.02.2020")
            .set_status(LotStatus::OnSale)
            .set_issue_date("00.00.2000")
            .set_supplier("FirstOwner")
            .set_demander(" ")
            .into_lot("FirstOwner_FirstProduct_00.00.2000", lot::now_stamp());

        self.store.put(SEED_KEY, &lot)?;
        tracing::debug!(key = SEED_KEY, "ledger seeded");
        Ok(lot)
    }

    /// Record a new lot under a caller-supplied key.
    ///
    /// Any resident record at `key` rejects the create, even an empty
    /// sentinel value that would not decode as a lot.
    pub fn add_lot(&self, key: &str, draft: LotDraft) -> Result<Lot, TransferError> {
        if self.store.contains(key)? {
            return Err(TransferError::AlreadyExists {
                key: key.to_owned(),
            });
        }

        let lot = draft.into_lot(key, lot::now_stamp());
        self.store.put(key, &lot)?;
        tracing::debug!(key, owner = %lot.owner, "product lot created");
        Ok(lot)
    }

    pub fn lot_by_key(&self, key: &str) -> Result<Lot, TransferError> {
        self.store.get(key)?.ok_or_else(|| TransferError::NotFound {
            key: key.to_owned(),
        })
    }

    /// Hand the lot to a new owner. Quantity, dates and provenance carry
    /// over unchanged; only owner, status and the update stamp move.
    pub fn change_ownership(&self, key: &str, new_owner: &str) -> Result<Lot, TransferError> {
        let current = self.lot_by_key(key)?;

        let updated = Lot {
            owner: new_owner.to_owned(),
            status: LotStatus::Changed,
            last_update: lot::now_stamp(),
            ..current
        };

        self.store.put(key, &updated)?;
        tracing::debug!(key, new_owner, "ownership changed");
        Ok(updated)
    }

    pub fn delete_lot(&self, key: &str) -> Result<(), TransferError> {
        if !self.store.contains(key)? {
            return Err(TransferError::NotFound {
                key: key.to_owned(),
            });
        }

        self.store.delete(key)?;
        tracing::debug!(key, "product lot deleted");
        Ok(())
    }

    /// Split a lot between the seller and a buyer.
    ///
    /// A partial purchase rewrites the source lot with the remaining supply
    /// and lands a second record for the buyer under the derived key
    /// `newOwner_name_issueDate`; buying the exact remaining quantity removes
    /// the source record instead, so a zero-quantity lot is never resident.
    /// Each branch applies its writes as one batch. A request exceeding the
    /// supply fails before any write.
    pub fn purchase(
        &self,
        key: &str,
        new_owner: &str,
        quantity: u32,
    ) -> Result<Lot, TransferError> {
        let supply = self.lot_by_key(key)?;

        let remaining = i64::from(supply.quantity) - i64::from(quantity);
        if remaining < 0 {
            return Err(TransferError::SupplyNotEnough {
                key: key.to_owned(),
            });
        }

        let purchase_key = LotKey::derive(new_owner, &supply.name, &supply.issue_date)?;
        let stamp = lot::now_stamp();

        if remaining > 0 {
            let rest = Lot {
                quantity: remaining as u32,
                status: LotStatus::OnSale,
                last_update: stamp.clone(),
                ..supply.clone()
            };
            let purchased = Lot {
                key: purchase_key.as_str().to_owned(),
                product_id: supply.product_id.clone(),
                name: supply.name.clone(),
                owner: new_owner.to_owned(),
                value: supply.value.clone(),
                quantity,
                expiration_date: supply.expiration_date.clone(),
                manufactured_date: supply.manufactured_date.clone(),
                status: LotStatus::Purchased,
                issue_date: supply.issue_date.clone(),
                last_update: stamp,
                supplier: supply.owner.clone(),
                demander: new_owner.to_owned(),
            };

            let mut batch = LotBatch::new();
            batch.put(key, &rest)?;
            batch.put(purchase_key.as_str(), &purchased)?;
            self.store.apply(batch)?;

            tracing::debug!(
                key,
                purchased = %purchased.key,
                remaining = rest.quantity,
                "partial purchase"
            );
            Ok(rest)
        } else {
            // Depletion stores the date pair swapped relative to the partial
            // branch (manufactured and expiration trade places). Kept as-is;
            // see DESIGN.md.
            let purchased = Lot {
                key: purchase_key.as_str().to_owned(),
                product_id: supply.product_id.clone(),
                name: supply.name.clone(),
                owner: new_owner.to_owned(),
                value: supply.value.clone(),
                quantity,
                expiration_date: supply.manufactured_date.clone(),
                manufactured_date: supply.expiration_date.clone(),
                status: LotStatus::Purchased,
                issue_date: supply.issue_date.clone(),
                last_update: stamp,
                supplier: supply.owner.clone(),
                demander: new_owner.to_owned(),
            };

            let mut batch = LotBatch::new();
            batch.delete(key);
            batch.put(purchase_key.as_str(), &purchased)?;
            self.store.apply(batch)?;

            tracing::debug!(key, purchased = %purchased.key, "lot depleted");
            Ok(purchased)
        }
    }
}
