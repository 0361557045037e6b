pub mod directory;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod models;
pub mod sqlite;

pub use directory::UserDirectory;
pub use error::UserDirectoryError;
#[cfg(test)]
pub use fake::FakeUserDirectory;
pub use models::UserContact;
pub use sqlite::SqliteUserDirectory;
