use crate::food::models::{Address, FoodDetails, Location};
use crate::lifecycle::error::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Listing fields as submitted by a client form
///
/// Everything arrives as text; `address` and `location` are JSON documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodInput {
    pub food_name: Option<String>,
    pub quantity: Option<String>,
    pub expiry: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
}

impl FoodInput {
    /// Parse and validate into typed details
    pub fn parse(&self) -> Result<FoodDetails, ValidationError> {
        let food_name = required(&self.food_name, "foodName")?.to_string();
        let quantity = parse_quantity(required(&self.quantity, "quantity")?)?;
        let expiry = parse_expiry(required(&self.expiry, "expiry")?)?;
        let address: Address = serde_json::from_str(required(&self.address, "address")?)
            .map_err(|e| ValidationError::MalformedAddress(e.to_string()))?;
        let location: Location = serde_json::from_str(required(&self.location, "location")?)
            .map_err(|e| ValidationError::MalformedLocation(e.to_string()))?;

        let details = FoodDetails {
            food_name,
            quantity,
            expiry,
            description: self.description.clone().unwrap_or_default(),
            address,
            location,
        };
        validate_details(&details)?;
        Ok(details)
    }
}

/// Invariants every stored listing must satisfy
pub fn validate_details(details: &FoodDetails) -> Result<(), ValidationError> {
    if details.food_name.trim().is_empty() {
        return Err(ValidationError::MissingField("foodName"));
    }
    if details.quantity == 0 {
        return Err(ValidationError::InvalidQuantity(
            "must be at least 1".to_string(),
        ));
    }
    if details.address.street.trim().is_empty() {
        return Err(ValidationError::MalformedAddress("street is empty".to_string()));
    }
    if details.address.city.trim().is_empty() {
        return Err(ValidationError::MalformedAddress("city is empty".to_string()));
    }

    let Location { lat, lng } = details.location;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ValidationError::CoordinatesOutOfRange { lat, lng });
    }
    Ok(())
}

/// Reject a blank value as missing
fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

/// Trimmed copy of `value`, or MissingField when blank
pub fn non_blank(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn parse_quantity(raw: &str) -> Result<u32, ValidationError> {
    let quantity: u32 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidQuantity(raw.to_string()))?;
    if quantity == 0 {
        return Err(ValidationError::InvalidQuantity(raw.to_string()));
    }
    Ok(quantity)
}

/// RFC 3339, a `datetime-local` value (taken as UTC), or a bare date (UTC midnight)
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidExpiry(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_input() -> FoodInput {
        FoodInput {
            food_name: Some("Rice".to_string()),
            quantity: Some("5".to_string()),
            expiry: Some("2030-01-02T03:04:05Z".to_string()),
            description: Some("Cooked this morning".to_string()),
            address: Some(r#"{"street":"1 Main St","city":"Springfield","pincode":"12345"}"#.to_string()),
            location: Some(r#"{"lat":12.97,"lng":77.59}"#.to_string()),
        }
    }

    #[test]
    fn valid_input_parses() {
        let details = valid_input().parse().unwrap();
        assert_eq!(details.food_name, "Rice");
        assert_eq!(details.quantity, 5);
        assert_eq!(details.expiry, Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(details.address.city, "Springfield");
        assert_eq!(details.location.lng, 77.59);
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let mut input = valid_input();
        input.description = None;
        assert_eq!(input.parse().unwrap().description, "");
    }

    #[test]
    fn blank_name_is_missing() {
        let mut input = valid_input();
        input.food_name = Some("   ".to_string());
        assert_eq!(input.parse(), Err(ValidationError::MissingField("foodName")));
    }

    #[test]
    fn non_numeric_or_zero_quantity_is_rejected() {
        for raw in ["five", "0", "-3", "2.5"] {
            let mut input = valid_input();
            input.quantity = Some(raw.to_string());
            assert!(
                matches!(input.parse(), Err(ValidationError::InvalidQuantity(_))),
                "quantity {raw} should be rejected"
            );
        }
    }

    #[test]
    fn expiry_accepts_form_formats() {
        let mut input = valid_input();
        input.expiry = Some("2030-01-02T03:04".to_string());
        assert_eq!(
            input.parse().unwrap().expiry,
            Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 0).unwrap()
        );

        input.expiry = Some("2030-01-02".to_string());
        assert_eq!(
            input.parse().unwrap().expiry,
            Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap()
        );

        input.expiry = Some("next tuesday".to_string());
        assert!(matches!(input.parse(), Err(ValidationError::InvalidExpiry(_))));
    }

    #[test]
    fn unparsable_address_is_malformed() {
        let mut input = valid_input();
        input.address = Some("1 Main St, Springfield".to_string());
        assert!(matches!(input.parse(), Err(ValidationError::MalformedAddress(_))));

        input.address = Some(r#"{"street":"1 Main St"}"#.to_string());
        assert!(matches!(input.parse(), Err(ValidationError::MalformedAddress(_))));
    }

    #[test]
    fn unparsable_location_is_malformed() {
        let mut input = valid_input();
        input.location = Some(r#"{"lat":"north"}"#.to_string());
        assert!(matches!(input.parse(), Err(ValidationError::MalformedLocation(_))));
    }

    #[test]
    fn coordinates_must_be_on_earth() {
        let mut input = valid_input();
        input.location = Some(r#"{"lat":91.0,"lng":0.0}"#.to_string());
        assert!(matches!(
            input.parse(),
            Err(ValidationError::CoordinatesOutOfRange { .. })
        ));
    }
}
