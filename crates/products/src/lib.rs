//! Products domain module (event-sourced).
//!
//! A product is anything that can end up on a shopping list: an ingredient
//! of a meal or an item added to a shop directly. Pure domain logic only
//! (no IO, no HTTP, no storage).

pub mod product;

pub use product::{
    CreateProduct, Product, ProductCommand, ProductCreated, ProductEvent, ProductName,
};
