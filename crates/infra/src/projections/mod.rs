//! Cross-aggregate read models.
//!
//! Each projection is an explicit state struct implementing
//! [`Fold`](larder_events::Fold); the generic runner drives it across the
//! log. Read models are disposable: events are the source of truth and any
//! projection can be rebuilt from offset 0.

pub mod current_shop;
pub mod shopping_list;

pub use current_shop::CurrentShopProjection;
pub use shopping_list::{
    ProductDetails, ShoppingList, ShoppingListError, ShoppingListItem, ShoppingListProjection,
};
