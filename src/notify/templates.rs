//! Message bodies for the notifications the lifecycle engine sends.

use crate::food::models::{Claim, FoodRecord};
use crate::users::models::UserContact;

/// A rendered message, ready for a Notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

/// Summary of a new listing for the administrative inbox
pub fn new_donation(record: &FoodRecord) -> EmailMessage {
    let details = &record.details;
    let body = format!(
        "<h3>New Donation Received</h3>\n\
         <p><strong>Donor ID:</strong> {}</p>\n\
         <p><strong>Food:</strong> {}</p>\n\
         <p><strong>Quantity:</strong> {}</p>\n\
         <p><strong>Expires at:</strong> {}</p>\n\
         <p><strong>Description:</strong> {}</p>\n\
         <p><strong>Address:</strong> {}, {}, {}</p>\n",
        record.donor_id,
        escape_html(&details.food_name),
        details.quantity,
        details.expiry.to_rfc3339(),
        escape_html(&details.description),
        escape_html(&details.address.street),
        escape_html(&details.address.city),
        escape_html(&details.address.pincode),
    );

    EmailMessage {
        subject: "New Food Donation".to_string(),
        body,
    }
}

/// Tell a donor who claimed their listing and how to reach them
pub fn donation_requested(donor: &UserContact, record: &FoodRecord, claim: &Claim) -> EmailMessage {
    let food_name = escape_html(&record.details.food_name);
    let body = format!(
        "<p>Hello {},</p>\n\
         <p>Your food donation \"{food_name}\" has been requested!</p>\n\
         <p><strong>Requester details</strong><br>\n\
         Name: {}<br>\n\
         Phone: {}</p>\n\
         <p>Please get in touch with them to arrange pickup.</p>\n\
         <p>Thank you for helping reduce food waste!</p>\n",
        escape_html(&donor.name),
        escape_html(&claim.requester_name),
        escape_html(&claim.requester_phone),
    );

    EmailMessage {
        subject: format!("Your food \"{}\" has been requested!", record.details.food_name),
        body,
    }
}

/// Fixed message used to check relay configuration
pub fn test_message() -> EmailMessage {
    EmailMessage {
        subject: "Test Subject".to_string(),
        body: "<p>This is a test email from the food sharing service.</p>".to_string(),
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
