//! Change notifications fanned out to connected clients.
//!
//! Writes publish onto a broadcast channel; each SSE subscriber filters the
//! stream down to the events that concern it.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::bookings::{Booking, BookingStatus};
use crate::models::services::Service;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    BookingCreated {
        booking_id: Uuid,
        customer_id: Uuid,
        provider_id: Uuid,
        service_name: String,
    },
    #[serde(rename_all = "camelCase")]
    BookingStatusChanged {
        booking_id: Uuid,
        customer_id: Uuid,
        provider_id: Uuid,
        status: BookingStatus,
    },
    #[serde(rename_all = "camelCase")]
    ServiceCreated { service_id: Uuid, title: String },
}

impl ServerEvent {
    pub fn booking_created(booking: &Booking) -> Self {
        ServerEvent::BookingCreated {
            booking_id: booking.id,
            customer_id: booking.user_id,
            provider_id: booking.provider_id,
            service_name: booking.service_name.clone(),
        }
    }

    pub fn status_changed(booking: &Booking) -> Self {
        ServerEvent::BookingStatusChanged {
            booking_id: booking.id,
            customer_id: booking.user_id,
            provider_id: booking.provider_id,
            status: booking.status,
        }
    }

    pub fn service_created(service: &Service) -> Self {
        ServerEvent::ServiceCreated {
            service_id: service.id,
            title: service.title.clone(),
        }
    }

    /// Booking events go to their two parties; catalog events go to everyone.
    pub fn concerns(&self, user_id: Uuid) -> bool {
        match self {
            ServerEvent::BookingCreated {
                customer_id,
                provider_id,
                ..
            }
            | ServerEvent::BookingStatusChanged {
                customer_id,
                provider_id,
                ..
            } => *customer_id == user_id || *provider_id == user_id,
            ServerEvent::ServiceCreated { .. } => true,
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Fire and forget; having no subscribers is not an error.
    pub fn publish(&self, event: ServerEvent) {
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::debug!(receivers, "event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let service_id = Uuid::new_v4();

        bus.publish(ServerEvent::ServiceCreated {
            service_id,
            title: "Tap fitting".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::ServiceCreated { service_id: id, .. } if id == service_id));
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        EventBus::new().publish(ServerEvent::ServiceCreated {
            service_id: Uuid::new_v4(),
            title: "Tap fitting".to_string(),
        });
    }

    #[test]
    fn booking_events_concern_only_their_parties() {
        let (customer, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let event = ServerEvent::BookingStatusChanged {
            booking_id: Uuid::new_v4(),
            customer_id: customer,
            provider_id: provider,
            status: BookingStatus::Approved,
        };
        assert!(event.concerns(customer));
        assert!(event.concerns(provider));
        assert!(!event.concerns(Uuid::new_v4()));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "booking_status_changed");
        assert_eq!(json["status"], "approved");
        assert!(json.get("bookingId").is_some());
    }
}
