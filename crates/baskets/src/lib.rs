//! Baskets domain module (event-sourced).
//!
//! A basket tracks which shopping-list products have physically been picked
//! up during one shop. It shares its identifier with the shop it belongs to.

pub mod basket;

pub use basket::{
    AddBasketItem, Basket, BasketCommand, BasketCreated, BasketEvent, BasketItemAdded,
    BasketItemRemoved, CreateBasket, RemoveBasketItem,
};
