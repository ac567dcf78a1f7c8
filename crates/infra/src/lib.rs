//! Infrastructure layer: the unified event payload, durable log storage,
//! cross-aggregate read models, and application services.

pub mod event_log;
pub mod payload;
pub mod projections;
pub mod services;

pub use event_log::SqliteEventLog;
pub use payload::{EventPayload, PayloadMismatch};
pub use projections::{
    CurrentShopProjection, ProductDetails, ShoppingList, ShoppingListError, ShoppingListItem,
    ShoppingListProjection,
};
pub use services::{ShopService, ShopServiceError};
