//! Shops domain module (event-sourced).
//!
//! A shop is one shopping trip. It links the meals being shopped for and any
//! products added directly, and it is what the shopping-list read model is
//! scoped to: starting a new shop starts the list over.

pub mod shop;

pub use shop::{
    AddItem, AddMeal, ItemAdded, ItemRemoved, MealAdded, MealRemoved, RemoveItem, RemoveMeal,
    Shop, ShopCommand, ShopCreated, ShopEvent, ShopItem, StartShop,
};
