use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tablebook_core::booking::{Provenance, Reservation, ReservationStatus};
use tablebook_core::repository::ReservationStore;
use tablebook_core::{ClientError, ClientResult};
use uuid::Uuid;

const TOKEN_FILE: &str = "token";
const RESERVATIONS_FILE: &str = "reservations.json";

/// File-backed analogue of the browser's local storage: one file for the
/// bearer token, one JSON array of fallback reservation records. Reads are
/// best-effort; a missing or malformed file is "no data", never an error.
/// Nothing locks the directory, so two concurrent processes can race on
/// it; the cache is a convenience, not a source of truth.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    // ------------------------------------------------------------------
    // Token
    // ------------------------------------------------------------------

    pub fn token(&self) -> Option<String> {
        let raw = fs::read_to_string(self.dir.join(TOKEN_FILE)).ok()?;
        let token = raw.trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    pub fn set_token(&self, token: &str) -> ClientResult<()> {
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.dir.join(TOKEN_FILE), token))
            .map_err(|e| ClientError::LocalState(e.to_string()))
    }

    /// Logout must never fail, so removal errors are only logged.
    pub fn clear_token(&self) {
        if let Err(err) = fs::remove_file(self.dir.join(TOKEN_FILE)) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("could not remove token file: {}", err);
            }
        }
    }

    // ------------------------------------------------------------------
    // Fallback reservations
    // ------------------------------------------------------------------

    fn read_records(&self) -> Vec<StoredReservation> {
        let path = self.dir.join(RESERVATIONS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::debug!("ignoring unreadable local reservations: {}", err);
                Vec::new()
            }
        }
    }

    fn write_records(&self, records: &[StoredReservation]) -> ClientResult<()> {
        let body = serde_json::to_string(records)
            .map_err(|e| ClientError::LocalState(e.to_string()))?;
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.dir.join(RESERVATIONS_FILE), body))
            .map_err(|e| ClientError::LocalState(e.to_string()))
    }

    /// Append one reservation to the fallback cache.
    pub fn record(&self, reservation: &Reservation) -> ClientResult<()> {
        let mut records = self.read_records();
        records.push(StoredReservation::from(reservation));
        self.write_records(&records)
    }
}

#[async_trait]
impl ReservationStore for LocalStore {
    async fn list(&self) -> ClientResult<Vec<Reservation>> {
        Ok(self
            .read_records()
            .into_iter()
            .map(StoredReservation::into_reservation)
            .collect())
    }

    /// Drop the matching entry. Cancelling an id the cache does not hold is
    /// a no-op, matching how the merged view can outlive the cache.
    async fn cancel(&self, reservation_id: &str) -> ClientResult<()> {
        let records: Vec<StoredReservation> = self
            .read_records()
            .into_iter()
            .filter(|r| r.id.as_deref() != Some(reservation_id))
            .collect();
        self.write_records(&records)
    }
}

/// On-disk record shape. Older caches used camelCase spellings; aliases
/// fold them in on read, writes always use the canonical names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReservation {
    #[serde(default, alias = "reservationId")]
    pub id: Option<String>,
    #[serde(default, alias = "restaurantId")]
    pub restaurant_id: Option<i64>,
    #[serde(default, alias = "restaurantName")]
    pub restaurant_name: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(default = "default_people", alias = "people", alias = "partySize")]
    pub party_size: u32,
}

fn default_people() -> u32 {
    2
}

impl StoredReservation {
    fn into_reservation(self) -> Reservation {
        let restaurant = match (&self.restaurant_name, self.restaurant_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Restaurant #{}", id),
            (None, None) => "Restaurant".to_string(),
        };
        Reservation {
            id: self.id.unwrap_or_else(placeholder_id),
            restaurant,
            restaurant_id: self.restaurant_id,
            date: self.date,
            time: self.time,
            people: self.party_size,
            status: ReservationStatus::Confirmed,
            provenance: Provenance::Local,
        }
    }
}

impl From<&Reservation> for StoredReservation {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: Some(reservation.id.clone()),
            restaurant_id: reservation.restaurant_id,
            restaurant_name: Some(reservation.restaurant.clone()),
            date: reservation.date.clone(),
            time: reservation.time.clone(),
            party_size: reservation.people,
        }
    }
}

/// Clearly-marked client identifier for records that never got one.
fn placeholder_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("local-{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("tablebook-test-{}", Uuid::new_v4()));
        LocalStore::new(dir)
    }

    fn reservation(id: &str) -> Reservation {
        Reservation {
            id: id.to_string(),
            restaurant: "Trattoria".to_string(),
            restaurant_id: Some(3),
            date: "2025-05-04".to_string(),
            time: "19:00".to_string(),
            people: 2,
            status: ReservationStatus::Confirmed,
            provenance: Provenance::Local,
        }
    }

    #[tokio::test]
    async fn test_record_then_list_round_trip() {
        let store = temp_store();
        store.record(&reservation("local-1")).unwrap();
        store.record(&reservation("local-2")).unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.provenance == Provenance::Local));
    }

    #[tokio::test]
    async fn test_cancel_removes_only_the_matching_entry() {
        let store = temp_store();
        store.record(&reservation("keep")).unwrap();
        store.record(&reservation("drop")).unwrap();

        store.cancel("drop").await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "keep");
    }

    #[tokio::test]
    async fn test_missing_and_malformed_files_read_as_empty() {
        let store = temp_store();
        assert!(store.list().await.unwrap().is_empty());

        fs::create_dir_all(&store.dir).unwrap();
        fs::write(store.dir.join(RESERVATIONS_FILE), "{not json").unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_token_round_trip_and_clear() {
        let store = temp_store();
        assert!(store.token().is_none());

        store.set_token("tok-123").unwrap();
        assert_eq!(store.token().as_deref(), Some("tok-123"));

        store.clear_token();
        assert!(store.token().is_none());
        // Clearing twice stays silent
        store.clear_token();
    }

    #[test]
    fn test_legacy_camel_case_records_are_readable() {
        let store = temp_store();
        fs::create_dir_all(&store.dir).unwrap();
        fs::write(
            store.dir.join(RESERVATIONS_FILE),
            r#"[{"reservationId":"old-1","restaurantId":7,"restaurantName":"Izakaya","date":"2025-05-04","time":"19:00","people":4}]"#,
        )
        .unwrap();

        let records = store.read_records();
        assert_eq!(records.len(), 1);
        let reservation = records[0].clone().into_reservation();
        assert_eq!(reservation.id, "old-1");
        assert_eq!(reservation.restaurant, "Izakaya");
        assert_eq!(reservation.people, 4);
    }

    #[test]
    fn test_record_without_id_gets_local_placeholder() {
        let record = StoredReservation {
            id: None,
            restaurant_id: Some(5),
            restaurant_name: None,
            date: "2025-05-04".to_string(),
            time: "19:00".to_string(),
            party_size: 2,
        };
        let reservation = record.into_reservation();
        assert!(reservation.id.starts_with("local-"));
        assert_eq!(reservation.restaurant, "Restaurant #5");
    }
}
