//! The unified event payload written to the log.
//!
//! Every aggregate's event enum maps into [`EventPayload`] statically; there
//! is no runtime event registry. The repository relies on these conversions
//! to route stream payloads back to the owning aggregate, and the
//! shopping-list fold consumes the payload directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use larder_baskets::BasketEvent;
use larder_events::Event;
use larder_meals::MealEvent;
use larder_products::ProductEvent;
use larder_shops::ShopEvent;

/// An event from any of the four aggregate types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    Product(ProductEvent),
    Meal(MealEvent),
    Shop(ShopEvent),
    Basket(BasketEvent),
}

impl Event for EventPayload {
    fn event_type(&self) -> &'static str {
        match self {
            EventPayload::Product(e) => e.event_type(),
            EventPayload::Meal(e) => e.event_type(),
            EventPayload::Shop(e) => e.event_type(),
            EventPayload::Basket(e) => e.event_type(),
        }
    }
}

/// The payload did not belong to the requested aggregate type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("event payload belongs to another aggregate type")]
pub struct PayloadMismatch;

macro_rules! impl_payload_conversions {
    ($variant:ident, $event:ty) => {
        impl From<$event> for EventPayload {
            fn from(event: $event) -> Self {
                EventPayload::$variant(event)
            }
        }

        impl TryFrom<EventPayload> for $event {
            type Error = PayloadMismatch;

            fn try_from(payload: EventPayload) -> Result<Self, Self::Error> {
                match payload {
                    EventPayload::$variant(event) => Ok(event),
                    _ => Err(PayloadMismatch),
                }
            }
        }
    };
}

impl_payload_conversions!(Product, ProductEvent);
impl_payload_conversions!(Meal, MealEvent);
impl_payload_conversions!(Shop, ShopEvent);
impl_payload_conversions!(Basket, BasketEvent);

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::ShopId;
    use larder_shops::ShopCreated;

    #[test]
    fn conversions_round_trip() {
        let event = ShopEvent::Created(ShopCreated { id: ShopId::first() });
        let payload = EventPayload::from(event.clone());

        assert_eq!(payload.event_type(), "shop.created");
        assert_eq!(ShopEvent::try_from(payload.clone()).unwrap(), event);
        assert_eq!(MealEvent::try_from(payload), Err(PayloadMismatch));
    }

    #[test]
    fn payloads_survive_json_round_trips() {
        let payload = EventPayload::Shop(ShopEvent::Created(ShopCreated { id: ShopId::first() }));
        let json = serde_json::to_string(&payload).unwrap();
        let decoded: EventPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, payload);
    }
}
