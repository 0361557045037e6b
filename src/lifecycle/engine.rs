use crate::config::NotifyConfig;
use crate::food::models::{
    Claim, FoodDetails, FoodQuery, FoodRecord, FoodStatus, StatusGuard, Transition,
    TransitionOutcome,
};
use crate::food::FoodStore;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::input::{non_blank, validate_details};
use crate::notify::templates::{self, EmailMessage};
use crate::notify::{Notifier, NotifyError};
use crate::users::UserDirectory;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Who is claiming a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub requester_id: Uuid,
    pub requester_name: String,
    pub requester_phone: String,
}

/// Applies status transitions to food listings and notifies the people involved
///
/// Holds no state of its own; every operation loads from and writes back to the store.
/// Notifications are sent after the write is durable, bounded by a timeout, and their
/// failure never fails the operation.
pub struct LifecycleEngine<S: FoodStore, U: UserDirectory, N: Notifier> {
    store: Arc<S>,
    users: Arc<U>,
    notifier: Arc<N>,
    admin_email: String,
    notify_timeout: Duration,
}

impl<S: FoodStore, U: UserDirectory, N: Notifier> LifecycleEngine<S, U, N> {
    pub fn new(store: Arc<S>, users: Arc<U>, notifier: Arc<N>, config: &NotifyConfig) -> Self {
        Self {
            store,
            users,
            notifier,
            admin_email: config.admin_email.clone(),
            notify_timeout: config.timeout(),
        }
    }

    /// Override the bound on each notification attempt
    #[cfg(test)]
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// List a new donation as available and tell the administrative inbox
    pub async fn create(
        &self,
        donor_id: Uuid,
        details: FoodDetails,
        image: Option<String>,
    ) -> Result<FoodRecord, LifecycleError> {
        validate_details(&details)?;

        let record = FoodRecord::new(donor_id, details, image);
        self.store.insert_food(record.clone()).await?;
        info!(
            "Created food {} ({}) for donor {}",
            record.id, record.details.food_name, donor_id
        );

        self.notify(&self.admin_email, templates::new_donation(&record))
            .await;
        Ok(record)
    }

    /// Claim an available listing and tell its donor who wants it
    pub async fn claim(
        &self,
        id: Uuid,
        request: ClaimRequest,
    ) -> Result<FoodRecord, LifecycleError> {
        let requester_name = non_blank(&request.requester_name, "requesterName")?;
        let requester_phone = non_blank(&request.requester_phone, "requesterPhone")?;

        let claim = Claim {
            requester_id: request.requester_id,
            requester_name,
            requester_phone,
            requested_at: Utc::now(),
        };

        let outcome = self
            .store
            .transition(
                id,
                StatusGuard::Is(FoodStatus::Available),
                Transition::Claim(claim.clone()),
            )
            .await?;

        match outcome {
            TransitionOutcome::Applied(record) => {
                info!(
                    "Food {} requested by {} ({})",
                    id, claim.requester_name, claim.requester_id
                );
                self.notify_donor(&record, &claim).await;
                Ok(record)
            }
            TransitionOutcome::Rejected(current) => {
                warn!(
                    "Food {} already requested or picked up. Status: {}",
                    id, current.status
                );
                Err(LifecycleError::InvalidState {
                    id,
                    status: current.status,
                })
            }
            TransitionOutcome::Missing => Err(LifecycleError::NotFound(id)),
        }
    }

    /// Drop any claim and make the listing available again
    ///
    /// Always writes, even when the listing is already available.
    pub async fn cancel(&self, id: Uuid) -> Result<FoodRecord, LifecycleError> {
        let outcome = self
            .store
            .transition(id, StatusGuard::Any, Transition::Release { at: Utc::now() })
            .await?;

        match outcome {
            TransitionOutcome::Applied(record) => {
                info!("Request on food {} cancelled", id);
                Ok(record)
            }
            TransitionOutcome::Rejected(current) => Err(LifecycleError::InvalidState {
                id,
                status: current.status,
            }),
            TransitionOutcome::Missing => Err(LifecycleError::NotFound(id)),
        }
    }

    /// Record the handover of a claimed listing
    ///
    /// A second call leaves the first pickup time in place.
    pub async fn mark_picked_up(&self, id: Uuid) -> Result<FoodRecord, LifecycleError> {
        let outcome = self
            .store
            .transition(
                id,
                StatusGuard::Is(FoodStatus::Requested),
                Transition::PickUp { at: Utc::now() },
            )
            .await?;

        match outcome {
            TransitionOutcome::Applied(record) => {
                info!("Food {} marked as picked up", id);
                Ok(record)
            }
            TransitionOutcome::Rejected(current) if current.status == FoodStatus::PickedUp => {
                Err(LifecycleError::AlreadyPickedUp(id))
            }
            TransitionOutcome::Rejected(current) => {
                warn!("Food {} cannot be picked up before it is requested", id);
                Err(LifecycleError::InvalidState {
                    id,
                    status: current.status,
                })
            }
            TransitionOutcome::Missing => Err(LifecycleError::NotFound(id)),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), LifecycleError> {
        if !self.store.delete_food(id).await? {
            return Err(LifecycleError::NotFound(id));
        }
        info!("Food {} deleted", id);
        Ok(())
    }

    /// Replace the descriptive fields; the image changes only when a new one is given
    pub async fn update(
        &self,
        id: Uuid,
        details: FoodDetails,
        image: Option<String>,
    ) -> Result<FoodRecord, LifecycleError> {
        validate_details(&details)?;

        let record = self
            .store
            .update_details(id, details, image, Utc::now())
            .await?
            .ok_or(LifecycleError::NotFound(id))?;
        info!("Food {} updated", id);
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<FoodRecord>, LifecycleError> {
        Ok(self.store.query(FoodQuery::all()).await?)
    }

    pub async fn list_by_donor(&self, donor_id: Uuid) -> Result<Vec<FoodRecord>, LifecycleError> {
        Ok(self.store.query(FoodQuery::by_donor(donor_id)).await?)
    }

    pub async fn list_by_status(
        &self,
        status: FoodStatus,
    ) -> Result<Vec<FoodRecord>, LifecycleError> {
        Ok(self.store.query(FoodQuery::by_status(status)).await?)
    }

    async fn notify_donor(&self, record: &FoodRecord, claim: &Claim) {
        let donor = match self.users.find_user(record.donor_id).await {
            Ok(Some(donor)) => donor,
            Ok(None) => {
                warn!("Donor {} of food {} not found", record.donor_id, record.id);
                return;
            }
            Err(e) => {
                warn!("Failed to look up donor {}: {}", record.donor_id, e);
                return;
            }
        };

        let Some(email) = donor.deliverable_email() else {
            warn!("Donor {} has no email address", donor.id);
            return;
        };

        self.notify(email, templates::donation_requested(&donor, record, claim))
            .await;
    }

    /// Send one message, logging rather than returning any failure
    async fn notify(&self, to: &str, message: EmailMessage) {
        debug!("Notifying {to}: {}", message.subject);

        let result = tokio::time::timeout(
            self.notify_timeout,
            self.notifier.send(to, &message.subject, &message.body),
        )
        .await
        .unwrap_or(Err(NotifyError::Timeout(self.notify_timeout)));

        match result {
            Ok(()) => info!("Email sent to: {to}"),
            Err(e) => warn!("Failed to notify {to}: {e}"),
        }
    }
}
