pub mod error;
#[cfg(test)]
pub mod fake;
pub mod http;
pub mod log_only;
pub mod notifier;
pub mod templates;

pub use error::NotifyError;
#[cfg(test)]
pub use fake::{FakeNotifier, SentMessage};
pub use http::HttpMailer;
pub use log_only::LogNotifier;
pub use notifier::Notifier;
pub use templates::EmailMessage;
