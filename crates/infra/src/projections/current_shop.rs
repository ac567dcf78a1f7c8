//! Which shop is the current one?
//!
//! Shops are numbered sequentially, so the current shop is simply the
//! highest id whose creation event has been observed.

use std::convert::Infallible;

use larder_core::ShopId;
use larder_events::{Fold, StoredEvent};
use larder_shops::ShopEvent;

use crate::payload::EventPayload;

#[derive(Debug, Default)]
pub struct CurrentShopProjection {
    latest: Option<ShopId>,
}

impl CurrentShopProjection {
    pub fn current(&self) -> Option<ShopId> {
        self.latest
    }
}

impl Fold for CurrentShopProjection {
    type Payload = EventPayload;
    type Error = Infallible;

    fn apply(&mut self, event: &StoredEvent<EventPayload>) -> Result<(), Infallible> {
        if let EventPayload::Shop(ShopEvent::Created(e)) = event.payload() {
            if self.latest.is_none_or(|latest| e.id > latest) {
                self.latest = Some(e.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::ExpectedVersion;
    use larder_events::{EventLog, InMemoryEventLog, ProjectionRunner};
    use larder_shops::ShopCreated;

    fn start_shop(log: &InMemoryEventLog<EventPayload>, id: u32) {
        log.append(
            "shop",
            &id.to_string(),
            ExpectedVersion::Exact(0),
            vec![EventPayload::Shop(ShopEvent::Created(ShopCreated {
                id: ShopId::from(id),
            }))],
        )
        .unwrap();
    }

    #[test]
    fn no_shops_means_no_current_shop() {
        let log = InMemoryEventLog::new();
        let mut runner = ProjectionRunner::new(CurrentShopProjection::default());
        runner.run_to_end(&log).unwrap();
        assert_eq!(runner.fold().current(), None);
    }

    #[test]
    fn the_highest_shop_id_wins() {
        let log = InMemoryEventLog::new();
        start_shop(&log, 1);
        start_shop(&log, 2);
        start_shop(&log, 3);

        let mut runner = ProjectionRunner::new(CurrentShopProjection::default());
        runner.run_to_end(&log).unwrap();
        assert_eq!(runner.fold().current(), Some(ShopId::from(3)));
    }
}
