use crate::food::error::FoodStoreError;
use crate::food::food_store::FoodStore;
use crate::food::models::{
    Address, Claim, FoodDetails, FoodQuery, FoodRecord, FoodStatus, Location, PurgeRule,
    StatusGuard, Transition, TransitionOutcome,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task;
use tracing::{debug, error, info};
use uuid::Uuid;

const FOOD_COLUMNS: &str = "id, donor_id, food_name, quantity, expiry, description, \
     street, city, pincode, lat, lng, image, status, requester_id, requester_name, \
     requester_phone, requested_at, picked_up_at, created_at, updated_at";

// ?1 = id, ?2 = required status, ?3 = excluded status
const GUARD_CLAUSE: &str =
    "id = ?1 AND (?2 IS NULL OR status = ?2) AND (?3 IS NULL OR status <> ?3)";

/// A SQLite implementation of the FoodStore trait
pub struct SqliteFoodStore {
    connection: Arc<Mutex<Connection>>,
}

/// Raw column values of one `foods` row
struct FoodRow {
    id: String,
    donor_id: String,
    food_name: String,
    quantity: i64,
    expiry: String,
    description: String,
    street: String,
    city: String,
    pincode: String,
    lat: f64,
    lng: f64,
    image: Option<String>,
    status: String,
    requester_id: Option<String>,
    requester_name: Option<String>,
    requester_phone: Option<String>,
    requested_at: Option<String>,
    picked_up_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl FoodRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FoodRow {
            id: row.get(0)?,
            donor_id: row.get(1)?,
            food_name: row.get(2)?,
            quantity: row.get(3)?,
            expiry: row.get(4)?,
            description: row.get(5)?,
            street: row.get(6)?,
            city: row.get(7)?,
            pincode: row.get(8)?,
            lat: row.get(9)?,
            lng: row.get(10)?,
            image: row.get(11)?,
            status: row.get(12)?,
            requester_id: row.get(13)?,
            requester_name: row.get(14)?,
            requester_phone: row.get(15)?,
            requested_at: row.get(16)?,
            picked_up_at: row.get(17)?,
            created_at: row.get(18)?,
            updated_at: row.get(19)?,
        })
    }

    fn into_record(self) -> Result<FoodRecord, FoodStoreError> {
        let status: FoodStatus = self
            .status
            .parse()
            .map_err(|e| FoodStoreError::OperationError(format!("{e}")))?;

        // A claim is only meaningful when all requester columns are present
        let claim = match (
            self.requester_id,
            self.requester_name,
            self.requester_phone,
            self.requested_at,
        ) {
            (Some(requester_id), Some(requester_name), Some(requester_phone), Some(at))
                if status != FoodStatus::Available =>
            {
                Some(Claim {
                    requester_id: SqliteFoodStore::string_to_uuid(&requester_id)?,
                    requester_name,
                    requester_phone,
                    requested_at: SqliteFoodStore::string_to_datetime(&at)?,
                })
            }
            _ => None,
        };

        let quantity = u32::try_from(self.quantity).map_err(|_| {
            FoodStoreError::OperationError(format!("Invalid quantity: {}", self.quantity))
        })?;

        Ok(FoodRecord {
            id: SqliteFoodStore::string_to_uuid(&self.id)?,
            donor_id: SqliteFoodStore::string_to_uuid(&self.donor_id)?,
            details: FoodDetails {
                food_name: self.food_name,
                quantity,
                expiry: SqliteFoodStore::string_to_datetime(&self.expiry)?,
                description: self.description,
                address: Address {
                    street: self.street,
                    city: self.city,
                    pincode: self.pincode,
                },
                location: Location {
                    lat: self.lat,
                    lng: self.lng,
                },
            },
            image: self.image,
            status,
            claim,
            picked_up_at: self
                .picked_up_at
                .as_deref()
                .map(SqliteFoodStore::string_to_datetime)
                .transpose()?,
            created_at: SqliteFoodStore::string_to_datetime(&self.created_at)?,
            updated_at: SqliteFoodStore::string_to_datetime(&self.updated_at)?,
        })
    }
}

impl SqliteFoodStore {
    /// Create a new SqliteFoodStore with the given database path (`:memory:` allowed)
    pub fn new(db_path: &str) -> Result<Self, FoodStoreError> {
        info!("Creating SQLite food store at path: {db_path}");

        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create directory {parent:?}: {e}");
                    FoodStoreError::OpenError(format!("Failed to create directory: {e}"))
                })?;
            }
        }

        let connection = Connection::open(db_path).map_err(|e| {
            error!("Failed to open SQLite database at {db_path}: {e}");
            FoodStoreError::OpenError(format!("Failed to open SQLite database: {e}"))
        })?;

        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS foods (
                    id TEXT PRIMARY KEY,
                    donor_id TEXT NOT NULL,
                    food_name TEXT NOT NULL,
                    quantity INTEGER NOT NULL,
                    expiry TEXT NOT NULL,
                    description TEXT NOT NULL,
                    street TEXT NOT NULL,
                    city TEXT NOT NULL,
                    pincode TEXT NOT NULL,
                    lat REAL NOT NULL,
                    lng REAL NOT NULL,
                    image TEXT,
                    status TEXT NOT NULL,
                    requester_id TEXT,
                    requester_name TEXT,
                    requester_phone TEXT,
                    requested_at TEXT,
                    picked_up_at TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_foods_donor ON foods(donor_id);
                CREATE INDEX IF NOT EXISTS idx_foods_status ON foods(status);
                CREATE INDEX IF NOT EXISTS idx_foods_expiry ON foods(expiry);
                CREATE INDEX IF NOT EXISTS idx_foods_created_at ON foods(created_at);",
            )
            .map_err(|e| {
                error!("Failed to create foods table: {e}");
                FoodStoreError::OpenError(format!("Failed to create foods table: {e}"))
            })?;

        info!("SQLite food store initialized successfully at: {db_path}");
        Ok(SqliteFoodStore {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    // Fixed-width UTC form so that TEXT comparison in SQL orders like time
    fn datetime_to_string(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn string_to_datetime(s: &str) -> Result<DateTime<Utc>, FoodStoreError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| FoodStoreError::OperationError(format!("Failed to parse datetime: {e}")))
    }

    fn string_to_uuid(s: &str) -> Result<Uuid, FoodStoreError> {
        Uuid::parse_str(s)
            .map_err(|e| FoodStoreError::OperationError(format!("Failed to parse id {s}: {e}")))
    }

    fn guard_params(guard: StatusGuard) -> (Option<&'static str>, Option<&'static str>) {
        match guard {
            StatusGuard::Any => (None, None),
            StatusGuard::Is(status) => (Some(status.as_str()), None),
            StatusGuard::IsNot(status) => (None, Some(status.as_str())),
        }
    }

    fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, FoodStoreError> {
        connection.lock().map_err(|_| {
            error!("Failed to acquire database lock");
            FoodStoreError::Locked
        })
    }

    fn select_by_id(conn: &Connection, id: &str) -> Result<Option<FoodRecord>, FoodStoreError> {
        let row = conn
            .query_row(
                &format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = ?1"),
                params![id],
                FoodRow::from_row,
            )
            .optional()
            .map_err(|e| {
                error!("Failed to query food {id}: {e}");
                FoodStoreError::OperationError(format!("Failed to query food: {e}"))
            })?;

        row.map(FoodRow::into_record).transpose()
    }

    /// Run a blocking closure against the connection on the blocking thread pool
    async fn with_connection<F, T>(&self, f: F) -> Result<T, FoodStoreError>
    where
        F: FnOnce(&Connection) -> Result<T, FoodStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        task::spawn_blocking(move || {
            let conn = Self::lock(&connection)?;
            f(&conn)
        })
        .await
        .map_err(|e| FoodStoreError::OperationError(format!("Task join error: {e}")))?
    }
}

#[async_trait]
impl FoodStore for SqliteFoodStore {
    async fn get_food(&self, id: Uuid) -> Result<Option<FoodRecord>, FoodStoreError> {
        let id_str = id.to_string();
        self.with_connection(move |conn| Self::select_by_id(conn, &id_str))
            .await
    }

    async fn insert_food(&self, record: FoodRecord) -> Result<Uuid, FoodStoreError> {
        debug!(
            "Inserting food record: id={}, donor_id={}, status={}",
            record.id, record.donor_id, record.status
        );

        let id = record.id;
        self.with_connection(move |conn| {
            let claim = record.claim.as_ref();
            conn.execute(
                &format!(
                    "INSERT INTO foods ({FOOD_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
                ),
                params![
                    record.id.to_string(),
                    record.donor_id.to_string(),
                    record.details.food_name,
                    i64::from(record.details.quantity),
                    Self::datetime_to_string(record.details.expiry),
                    record.details.description,
                    record.details.address.street,
                    record.details.address.city,
                    record.details.address.pincode,
                    record.details.location.lat,
                    record.details.location.lng,
                    record.image,
                    record.status.as_str(),
                    claim.map(|c| c.requester_id.to_string()),
                    claim.map(|c| c.requester_name.clone()),
                    claim.map(|c| c.requester_phone.clone()),
                    claim.map(|c| Self::datetime_to_string(c.requested_at)),
                    record.picked_up_at.map(Self::datetime_to_string),
                    Self::datetime_to_string(record.created_at),
                    Self::datetime_to_string(record.updated_at),
                ],
            )
            .map_err(|e| {
                error!("Failed to insert food record: {e}");
                FoodStoreError::OperationError(format!("Failed to insert record: {e}"))
            })?;
            Ok(id)
        })
        .await
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: FoodDetails,
        image: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<FoodRecord>, FoodStoreError> {
        let id_str = id.to_string();
        self.with_connection(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE foods SET food_name = ?2, quantity = ?3, expiry = ?4, description = ?5,
                         street = ?6, city = ?7, pincode = ?8, lat = ?9, lng = ?10,
                         image = COALESCE(?11, image), updated_at = ?12
                     WHERE id = ?1",
                    params![
                        id_str,
                        details.food_name,
                        i64::from(details.quantity),
                        Self::datetime_to_string(details.expiry),
                        details.description,
                        details.address.street,
                        details.address.city,
                        details.address.pincode,
                        details.location.lat,
                        details.location.lng,
                        image,
                        Self::datetime_to_string(at),
                    ],
                )
                .map_err(|e| {
                    error!("Failed to update food {id_str}: {e}");
                    FoodStoreError::OperationError(format!("Failed to update record: {e}"))
                })?;

            if updated == 0 {
                return Ok(None);
            }
            Self::select_by_id(conn, &id_str)
        })
        .await
    }

    async fn transition(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: Transition,
    ) -> Result<TransitionOutcome, FoodStoreError> {
        let id_str = id.to_string();
        let (required, excluded) = Self::guard_params(guard);
        let target = transition.target_status().as_str();
        let at = Self::datetime_to_string(transition.at());

        self.with_connection(move |conn| {
            let result = match &transition {
                Transition::Claim(claim) => conn.execute(
                    &format!(
                        "UPDATE foods SET status = ?4, requester_id = ?5, requester_name = ?6,
                             requester_phone = ?7, requested_at = ?8, picked_up_at = NULL,
                             updated_at = ?8
                         WHERE {GUARD_CLAUSE}"
                    ),
                    params![
                        id_str,
                        required,
                        excluded,
                        target,
                        claim.requester_id.to_string(),
                        claim.requester_name,
                        claim.requester_phone,
                        at,
                    ],
                ),
                Transition::Release { .. } => conn.execute(
                    &format!(
                        "UPDATE foods SET status = ?4, requester_id = NULL, requester_name = NULL,
                             requester_phone = NULL, requested_at = NULL, picked_up_at = NULL,
                             updated_at = ?5
                         WHERE {GUARD_CLAUSE}"
                    ),
                    params![id_str, required, excluded, target, at],
                ),
                Transition::PickUp { .. } => conn.execute(
                    &format!(
                        "UPDATE foods SET status = ?4, picked_up_at = ?5, updated_at = ?5
                         WHERE {GUARD_CLAUSE}"
                    ),
                    params![id_str, required, excluded, target, at],
                ),
            };

            let applied = result.map_err(|e| {
                error!("Failed to apply transition to food {id_str}: {e}");
                FoodStoreError::OperationError(format!("Failed to apply transition: {e}"))
            })?;

            // Still under the connection lock, so this reads what the UPDATE left
            match Self::select_by_id(conn, &id_str)? {
                Some(record) if applied > 0 => Ok(TransitionOutcome::Applied(record)),
                Some(record) => Ok(TransitionOutcome::Rejected(record)),
                None => Ok(TransitionOutcome::Missing),
            }
        })
        .await
    }

    async fn delete_food(&self, id: Uuid) -> Result<bool, FoodStoreError> {
        let id_str = id.to_string();
        self.with_connection(move |conn| {
            let deleted = conn
                .execute("DELETE FROM foods WHERE id = ?1", params![id_str])
                .map_err(|e| {
                    error!("Failed to delete food {id_str}: {e}");
                    FoodStoreError::OperationError(format!("Failed to delete record: {e}"))
                })?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_where(&self, rule: PurgeRule) -> Result<u64, FoodStoreError> {
        self.with_connection(move |conn| {
            let result = match rule {
                PurgeRule::ExpiredBefore(cutoff) => conn.execute(
                    "DELETE FROM foods WHERE expiry < ?1",
                    params![Self::datetime_to_string(cutoff)],
                ),
                PurgeRule::PickedUpBefore(cutoff) => conn.execute(
                    "DELETE FROM foods
                     WHERE status = ?1 AND picked_up_at IS NOT NULL AND picked_up_at < ?2",
                    params![
                        FoodStatus::PickedUp.as_str(),
                        Self::datetime_to_string(cutoff)
                    ],
                ),
            };

            let deleted = result.map_err(|e| {
                error!("Failed to purge {} foods: {e}", rule.name());
                FoodStoreError::OperationError(format!("Failed to purge records: {e}"))
            })?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn query(&self, query: FoodQuery) -> Result<Vec<FoodRecord>, FoodStoreError> {
        let donor = query.donor_id.map(|id| id.to_string());
        let status = query.status.map(|s| s.as_str());

        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {FOOD_COLUMNS} FROM foods
                     WHERE (?1 IS NULL OR donor_id = ?1) AND (?2 IS NULL OR status = ?2)
                     ORDER BY created_at DESC, id DESC"
                ))
                .map_err(|e| {
                    FoodStoreError::OperationError(format!("Failed to prepare query: {e}"))
                })?;

            let rows = stmt
                .query_map(params![donor, status], FoodRow::from_row)
                .map_err(|e| {
                    error!("Failed to query foods: {e}");
                    FoodStoreError::OperationError(format!("Failed to query foods: {e}"))
                })?;

            let mut records = Vec::new();
            for row in rows {
                let row = row.map_err(|e| {
                    FoodStoreError::OperationError(format!("Failed to read row: {e}"))
                })?;
                records.push(row.into_record()?);
            }
            Ok(records)
        })
        .await
    }
}
