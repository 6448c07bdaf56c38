// File: crates/bookline_booking/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{BookingConfirmation, BookingRejection};
use crate::validation::RawBookingRequest;

#[utoipa::path(
    post,
    path = "/book",
    request_body(content = RawBookingRequest, example = json!({
        "name": "Jean Dupont",
        "phone": "514-123-4567",
        "email": "jean.dupont@email.com",
        "start": "2025-06-27T14:00:00"
    })),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingConfirmation,
         example = json!({
             "success": true,
             "message": "Rendez-vous confirmé pour Jean Dupont le 27 juin 2025 à 14:00. Une confirmation sera envoyée au +15141234567.",
             "client_name": "Jean Dupont",
             "client_phone": "+15141234567",
             "start": "2025-06-27T14:00:00-04:00",
             "end": "2025-06-27T14:30:00-04:00",
             "meet_link": "https://meet.google.com/abc-defg-hij",
             "sms_sent": true,
             "event_id": "abc123xyz456"
         })
        ),
        (status = 400, description = "Request rejected by a validation gate", body = BookingRejection),
        (status = 409, description = "Requested slot is already taken", body = BookingRejection,
         example = json!({
             "success": false,
             "message": "Ce créneau est déjà pris"
         })
        ),
        (status = 502, description = "Upstream calendar failure", body = BookingRejection)
    )
)]
fn doc_book_handler() {}

#[utoipa::path(
    post,
    path = "/mcp",
    request_body(content = serde_json::Value, example = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "book_appointment",
            "arguments": {
                "name": "Jean Dupont",
                "phone": "514-123-4567",
                "start": "2025-06-27T14:00:00"
            }
        }
    })),
    responses(
        (status = 200, description = "RPC envelope carrying a result or a typed error")
    )
)]
fn doc_rpc_handler() {}

#[utoipa::path(
    get,
    path = "/sse",
    responses(
        (status = 200, description = "Event stream advertising the RPC endpoint")
    )
)]
fn doc_sse_discovery_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_book_handler, doc_rpc_handler, doc_sse_discovery_handler),
    components(schemas(RawBookingRequest, BookingConfirmation, BookingRejection)),
    tags(
        (name = "booking", description = "Appointment booking bridge API")
    ),
    servers(
        (url = "/api", description = "Main API prefix")
    )
)]
pub struct BookingApiDoc;
