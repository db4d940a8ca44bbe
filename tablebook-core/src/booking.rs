use crate::ClientError;
use serde::{Deserialize, Serialize};

/// Where a reservation record came from. Cancellation must route to the
/// matching store and never touch the other one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Server,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

/// The slot a user picked, carried by value from search to review. Never
/// persisted before confirmation; a reload loses it, which is why the
/// review step has to treat missing fields as an invalid entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectedBooking {
    pub restaurant_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub people: u32,
    pub table_id: Option<i64>,
    pub table_type: Option<String>,
    pub restaurant_name: Option<String>,
    pub restaurant_address: Option<String>,
    pub maps_url: Option<String>,
}

impl SelectedBooking {
    /// Reject a selection that arrived without its required fields. The
    /// caller redirects on this instead of rendering an error, since there
    /// is nothing the user can fix on the review page itself.
    pub fn validate(&self) -> Result<(), ClientError> {
        let missing = if self.restaurant_id.is_none() {
            Some("restaurant id")
        } else if self.date.is_none() {
            Some("date")
        } else if self.time.is_none() {
            Some("time")
        } else if self.table_id.is_none() {
            Some("table id")
        } else {
            None
        };

        match missing {
            Some(field) => Err(ClientError::Validation(format!(
                "booking selection is missing required field: {}",
                field
            ))),
            None => Ok(()),
        }
    }

    /// Display name for the restaurant, falling back to its id.
    pub fn display_name(&self) -> String {
        match (&self.restaurant_name, self.restaurant_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Restaurant #{}", id),
            (None, None) => "Restaurant".to_string(),
        }
    }
}

/// A reservation in the merged view, whichever store it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: String,
    pub restaurant: String,
    pub restaurant_id: Option<i64>,
    pub date: String,
    pub time: String,
    pub people: u32,
    pub status: ReservationStatus,
    pub provenance: Provenance,
}

impl Reservation {
    pub fn is_local(&self) -> bool {
        self.provenance == Provenance::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> SelectedBooking {
        SelectedBooking {
            restaurant_id: Some(3),
            date: Some("2025-05-04".to_string()),
            time: Some("19:00".to_string()),
            people: 2,
            table_id: Some(14),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_selection_validates() {
        assert!(selection().validate().is_ok());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut s = selection();
        s.table_id = None;
        let err = s.validate().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let mut s = selection();
        s.restaurant_id = None;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut s = selection();
        assert_eq!(s.display_name(), "Restaurant #3");
        s.restaurant_name = Some("Trattoria".to_string());
        assert_eq!(s.display_name(), "Trattoria");
    }
}
