//! Owner ↔ vehicle relationship maintenance
//!
//! The owner's `vehicle_ids` list and each vehicle's `owner_id` are two sides
//! of the same relation. Every operation here updates both through an
//! [`OwnershipStore`]; the Postgres store runs inside a single transaction.

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Storage operations the maintainer needs
#[async_trait]
pub trait OwnershipStore: Send {
    /// Vehicle ids currently listed on the owner, `None` if the owner does not exist
    async fn owned_vehicle_ids(&mut self, owner_id: Uuid) -> AppResult<Option<Vec<Uuid>>>;

    /// Add `vehicle_id` to the owner's list unless already present
    async fn attach_vehicle(&mut self, owner_id: Uuid, vehicle_id: Uuid) -> AppResult<()>;

    /// Remove `vehicle_id` from the owner's list
    async fn detach_vehicle(&mut self, owner_id: Uuid, vehicle_id: Uuid) -> AppResult<()>;

    /// Point the vehicle at its new owner and record the previous one
    async fn set_vehicle_owner(
        &mut self,
        vehicle_id: Uuid,
        owner_id: Uuid,
        previous_owner_id: Option<Uuid>,
    ) -> AppResult<()>;
}

/// Outcome of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub vehicle_id: Uuid,
    pub from: Option<Uuid>,
    pub to: Uuid,
}

pub struct OwnershipMaintainer<'s, S: OwnershipStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: OwnershipStore + ?Sized> OwnershipMaintainer<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    async fn ensure_owner_exists(&mut self, owner_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.store
            .owned_vehicle_ids(owner_id)
            .await?
            .ok_or_else(|| not_found_error("Owner", &owner_id))
    }

    /// Link a freshly created vehicle to its owner
    pub async fn on_vehicle_created(&mut self, vehicle_id: Uuid, owner_id: Uuid) -> AppResult<()> {
        self.ensure_owner_exists(owner_id).await?;
        self.store.attach_vehicle(owner_id, vehicle_id).await?;
        debug!("Vehicle {} linked to owner {}", vehicle_id, owner_id);
        Ok(())
    }

    /// Move a vehicle from `from` to `to`.
    ///
    /// Repeating the same call leaves both lists unchanged and `to` listing
    /// the vehicle exactly once.
    pub async fn transfer(&mut self, vehicle_id: Uuid, from: Option<Uuid>, to: Uuid) -> AppResult<Transfer> {
        if from == Some(to) {
            debug!("Vehicle {} already belongs to {}, nothing to transfer", vehicle_id, to);
            return Ok(Transfer { vehicle_id, from, to });
        }

        self.ensure_owner_exists(to).await?;

        if let Some(previous) = from {
            self.store.detach_vehicle(previous, vehicle_id).await?;
        }
        self.store.attach_vehicle(to, vehicle_id).await?;
        self.store.set_vehicle_owner(vehicle_id, to, from).await?;

        info!(
            "🔁 Vehicle {} transferred from {:?} to {}",
            vehicle_id, from, to
        );

        Ok(Transfer { vehicle_id, from, to })
    }

    /// Unlink a vehicle that is being removed for good
    pub async fn on_vehicle_removed(&mut self, vehicle_id: Uuid, owner_id: Uuid) -> AppResult<()> {
        self.store.detach_vehicle(owner_id, vehicle_id).await?;
        debug!("Vehicle {} unlinked from owner {}", vehicle_id, owner_id);
        Ok(())
    }

    /// Referential-integrity guard for owner deletion
    pub async fn ensure_owner_deletable(&mut self, owner_id: Uuid) -> AppResult<()> {
        let vehicle_ids = self.ensure_owner_exists(owner_id).await?;
        check_owner_deletable(owner_id, &vehicle_ids)
    }
}

/// An owner can only be deleted once it lists no vehicles
pub fn check_owner_deletable(owner_id: Uuid, vehicle_ids: &[Uuid]) -> AppResult<()> {
    if vehicle_ids.is_empty() {
        Ok(())
    } else {
        Err(AppError::OwnerHasVehicles {
            owner_id,
            vehicle_count: vehicle_ids.len(),
        })
    }
}
