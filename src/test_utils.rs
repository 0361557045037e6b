use crate::config::{NotifyConfig, SweepConfig};
use crate::food::models::{Address, FoodDetails, FoodRecord, Location};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Valid details expiring two days from now
pub fn create_test_details(food_name: &str) -> FoodDetails {
    FoodDetails {
        food_name: food_name.to_string(),
        quantity: 5,
        expiry: Utc::now() + Duration::days(2),
        description: "Freshly cooked".to_string(),
        address: Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            pincode: "12345".to_string(),
        },
        location: Location {
            lat: 12.97,
            lng: 77.59,
        },
    }
}

/// An available record owned by `donor_id`
pub fn create_test_record(donor_id: Uuid, food_name: &str) -> FoodRecord {
    FoodRecord::new(donor_id, create_test_details(food_name), None)
}

pub fn create_test_notify_config() -> NotifyConfig {
    NotifyConfig {
        admin_email: "admin@example.com".to_string(),
        from: "noreply@example.com".to_string(),
        endpoint: None,
        api_key: None,
        timeout_seconds: 5,
    }
}

pub fn create_test_sweep_config() -> SweepConfig {
    SweepConfig {
        interval_seconds: 60,
        retention_seconds: 3600,
    }
}
