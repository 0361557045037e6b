use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle status of a food listing. Removal is not a stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodStatus {
    /// Listed and open for claims
    Available,
    /// Claimed by a requester, waiting for pickup
    Requested,
    /// Handed over to the requester
    PickedUp,
}

impl FoodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodStatus::Available => "available",
            FoodStatus::Requested => "requested",
            FoodStatus::PickedUp => "pickedup",
        }
    }
}

impl fmt::Display for FoodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown food status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for FoodStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; `picked_up`, `picked-up` and `PickedUp` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "available" => Ok(FoodStatus::Available),
            "requested" => Ok(FoodStatus::Requested),
            "pickedup" => Ok(FoodStatus::PickedUp),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Street address of the pickup point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub pincode: String,
}

/// Geographic coordinates of the pickup point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// The donor-editable part of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDetails {
    pub food_name: String,
    pub quantity: u32,
    pub expiry: DateTime<Utc>,
    pub description: String,
    pub address: Address,
    pub location: Location,
}

/// Who claimed a listing and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub requester_id: Uuid,
    pub requester_name: String,
    pub requester_phone: String,
    pub requested_at: DateTime<Utc>,
}

/// A single food-donation listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: Uuid,
    pub donor_id: Uuid,
    #[serde(flatten)]
    pub details: FoodDetails,
    pub image: Option<String>,
    pub status: FoodStatus,
    /// Present only while the status is `Requested` or `PickedUp`
    pub claim: Option<Claim>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodRecord {
    /// Create a new available listing owned by `donor_id`
    pub fn new(donor_id: Uuid, details: FoodDetails, image: Option<String>) -> Self {
        Self::new_at(donor_id, details, image, Utc::now())
    }

    /// Create a new available listing with an explicit creation time
    pub fn new_at(
        donor_id: Uuid,
        details: FoodDetails,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            donor_id,
            details,
            image,
            status: FoodStatus::Available,
            claim: None,
            picked_up_at: None,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Precondition checked atomically with a status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGuard {
    Any,
    Is(FoodStatus),
    IsNot(FoodStatus),
}

impl StatusGuard {
    pub fn admits(&self, status: FoodStatus) -> bool {
        match self {
            StatusGuard::Any => true,
            StatusGuard::Is(expected) => status == *expected,
            StatusGuard::IsNot(excluded) => status != *excluded,
        }
    }
}

/// A change to the lifecycle fields of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Record the requester and move to `Requested`
    Claim(Claim),
    /// Drop any claim and return to `Available`
    Release { at: DateTime<Utc> },
    /// Move to `PickedUp`, keeping the claim
    PickUp { at: DateTime<Utc> },
}

impl Transition {
    pub fn target_status(&self) -> FoodStatus {
        match self {
            Transition::Claim(_) => FoodStatus::Requested,
            Transition::Release { .. } => FoodStatus::Available,
            Transition::PickUp { .. } => FoodStatus::PickedUp,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Transition::Claim(claim) => claim.requested_at,
            Transition::Release { at } | Transition::PickUp { at } => *at,
        }
    }

    /// Apply the change in place; guard checks are the caller's job
    pub fn apply(&self, record: &mut FoodRecord) {
        record.status = self.target_status();
        record.updated_at = self.at();
        match self {
            Transition::Claim(claim) => {
                record.claim = Some(claim.clone());
                record.picked_up_at = None;
            }
            Transition::Release { .. } => {
                record.claim = None;
                record.picked_up_at = None;
            }
            Transition::PickUp { at } => {
                record.picked_up_at = Some(*at);
            }
        }
    }
}

/// Result of a guarded transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The guard held and the record now has the new state
    Applied(FoodRecord),
    /// The guard failed; the record is returned unchanged
    Rejected(FoodRecord),
    /// No record with that id
    Missing,
}

/// Bulk-deletion rule used by the cleanup sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeRule {
    /// Expiry strictly before the instant, regardless of status
    ExpiredBefore(DateTime<Utc>),
    /// Picked up strictly before the instant
    PickedUpBefore(DateTime<Utc>),
}

impl PurgeRule {
    pub fn name(&self) -> &'static str {
        match self {
            PurgeRule::ExpiredBefore(_) => "expired",
            PurgeRule::PickedUpBefore(_) => "picked_up",
        }
    }

    pub fn matches(&self, record: &FoodRecord) -> bool {
        match self {
            PurgeRule::ExpiredBefore(cutoff) => record.details.expiry < *cutoff,
            PurgeRule::PickedUpBefore(cutoff) => {
                record.status == FoodStatus::PickedUp
                    && record.picked_up_at.is_some_and(|at| at < *cutoff)
            }
        }
    }
}

/// Filter for listing queries; results are always newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoodQuery {
    pub donor_id: Option<Uuid>,
    pub status: Option<FoodStatus>,
}

impl FoodQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_donor(donor_id: Uuid) -> Self {
        Self {
            donor_id: Some(donor_id),
            status: None,
        }
    }

    pub fn by_status(status: FoodStatus) -> Self {
        Self {
            donor_id: None,
            status: Some(status),
        }
    }

    pub fn matches(&self, record: &FoodRecord) -> bool {
        self.donor_id.map_or(true, |donor| record.donor_id == donor)
            && self.status.map_or(true, |status| record.status == status)
    }
}
