//! Meals domain module (event-sourced).
//!
//! A meal is a named recipe with an ordered list of ingredient-quantity
//! pairs. Editing a meal never touches a shop directly; the shopping-list
//! read model decides whether the edit is visible based on shop membership.

pub mod meal;

pub use meal::{
    AddIngredient, CreateMeal, IngredientAdded, IngredientRemoved, Meal, MealCommand, MealCreated,
    MealEvent, MealIngredient, NameUpdated, RemoveIngredient, Rename, SetUrl, UrlUpdated,
};
