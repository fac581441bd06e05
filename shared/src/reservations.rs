use lambda_http::{Body, Response};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::response::ok;
use crate::store::{record_to_item, ItemStore};
use crate::types::Reservation;
use crate::validation::{
    integer_field, parse_body, parse_date, parse_slot_time, require_fields, string_field,
};

const RESERVATION_FIELDS: [&str; 6] = [
    "tableNumber",
    "clientName",
    "phoneNumber",
    "date",
    "slotTimeStart",
    "slotTimeEnd",
];

fn parse_reservation(body: &[u8]) -> Result<Reservation, ApiError> {
    let body = parse_body(body)?;
    require_fields(&body, &RESERVATION_FIELDS)?;

    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        table_number: integer_field(&body, "tableNumber")?,
        client_name: string_field(&body, "clientName")?,
        phone_number: string_field(&body, "phoneNumber")?,
        date: string_field(&body, "date")?,
        slot_time_start: string_field(&body, "slotTimeStart")?,
        slot_time_end: string_field(&body, "slotTimeEnd")?,
    };

    parse_date("date", &reservation.date)?;
    let start = parse_slot_time("slotTimeStart", &reservation.slot_time_start)?;
    let end = parse_slot_time("slotTimeEnd", &reservation.slot_time_end)?;
    if end <= start {
        return Err(ApiError::validation(
            "Invalid slot: slotTimeEnd must be after slotTimeStart",
        ));
    }
    Ok(reservation)
}

/// Book a slot; the reservation id is generated here, never by the caller
pub async fn create_reservation(
    store: &dyn ItemStore,
    collection: &str,
    body: &[u8],
) -> Result<Response<Body>, ApiError> {
    let reservation = parse_reservation(body)?;

    store
        .put(collection, record_to_item(&reservation)?)
        .await
        .map_err(|e| ApiError::collaborator("Cannot create reservation", e))?;

    tracing::info!(
        "Reservation {} stored for table {}",
        reservation.id,
        reservation.table_number
    );
    ok(&json!({ "reservationId": reservation.id }))
}

pub async fn list_reservations(
    store: &dyn ItemStore,
    collection: &str,
) -> Result<Response<Body>, ApiError> {
    let reservations = store
        .scan_all(collection)
        .await
        .map_err(|e| ApiError::collaborator("Cannot retrieve reservations", e))?;

    ok(&json!({ "reservations": reservations }))
}
