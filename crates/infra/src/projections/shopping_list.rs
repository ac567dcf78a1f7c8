//! The shopping-list read model.
//!
//! A single fold over all four aggregate streams, keyed by product. Each
//! entry counts how many times the current shop needs the product (once per
//! meal that includes it, plus once per direct item) and keeps the matching
//! multiset of quantities.
//!
//! Two rules shape everything here:
//!
//! - **Membership gating**: ingredient-level meal events only touch the list
//!   while that meal is linked to the active shop. Meals that are not being
//!   shopped for can be edited freely.
//! - **Fail loud**: an event that references a meal, product, or item this
//!   fold has never seen halts the run with an error instead of being
//!   skipped. A stalled projection is recoverable; silently wrong counts are
//!   not.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use larder_baskets::BasketEvent;
use larder_core::{Aggregate, Category, MealId, ProductId, Quantity, ShopId};
use larder_events::{Fold, StoredEvent};
use larder_meals::{Meal, MealEvent};
use larder_products::{ProductEvent, ProductName};
use larder_shops::ShopEvent;

use crate::payload::EventPayload;

/// Product fields carried into the shopping list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    pub id: ProductId,
    pub name: ProductName,
    pub category: Category,
}

/// One line of the shopping list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    #[serde(flatten)]
    pub product: ProductDetails,
    /// How many meals (and direct items) currently want this product.
    pub meal_count: u32,
    pub is_in_basket: bool,
    /// One entry per contribution, in the order the contributions arrived.
    pub quantities: Vec<Quantity>,
}

/// Serializable snapshot of the projection output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub shop_id: Option<ShopId>,
    pub shopping_list: HashMap<ProductId, ShoppingListItem>,
}

/// Fatal fold error: the log referenced something this fold has never seen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShoppingListError {
    #[error("meal {0} referenced before its creation event")]
    UnknownMeal(MealId),

    #[error("product {0} referenced before its creation event")]
    UnknownProduct(ProductId),

    #[error("ingredient {product_id} is not on meal {meal_id}")]
    IngredientNotOnMeal {
        meal_id: MealId,
        product_id: ProductId,
    },

    #[error("product {0} was never added to the current shop as an item")]
    UnknownShopItem(ProductId),

    #[error("meal event carries malformed aggregate id {0:?}")]
    BadAggregateId(String),
}

/// Folds all aggregate streams into the list for the most recently started
/// shop.
#[derive(Debug, Default)]
pub struct ShoppingListProjection {
    shop_id: Option<ShopId>,
    list: HashMap<ProductId, ShoppingListItem>,
    /// Meals linked to the active shop.
    shop_meals: HashSet<MealId>,
    /// Quantities of the active shop's direct items, kept so `ItemRemoved`
    /// (which carries only a product id) can release the right amount.
    shop_items: HashMap<ProductId, Quantity>,
    products: HashMap<ProductId, ProductDetails>,
    /// Meal state replayed through the aggregate's own `apply`.
    meals: HashMap<MealId, Meal>,
}

impl ShoppingListProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently started shop, if any.
    pub fn shop_id(&self) -> Option<ShopId> {
        self.shop_id
    }

    pub fn items(&self) -> &HashMap<ProductId, ShoppingListItem> {
        &self.list
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&ShoppingListItem> {
        self.list.get(product_id)
    }

    /// Clone out the serializable output shape.
    pub fn snapshot(&self) -> ShoppingList {
        ShoppingList {
            shop_id: self.shop_id,
            shopping_list: self.list.clone(),
        }
    }

    /// Record one more demand for `product_id`.
    fn charge(&mut self, product_id: ProductId, quantity: Quantity) -> Result<(), ShoppingListError> {
        if let Some(entry) = self.list.get_mut(&product_id) {
            entry.meal_count += 1;
            entry.quantities.push(quantity);
        } else {
            let product = self
                .products
                .get(&product_id)
                .cloned()
                .ok_or(ShoppingListError::UnknownProduct(product_id))?;
            self.list.insert(
                product_id,
                ShoppingListItem {
                    product,
                    meal_count: 1,
                    is_in_basket: false,
                    quantities: vec![quantity],
                },
            );
        }
        Ok(())
    }

    /// Drop one demand for `product_id`. Products without a list entry are
    /// ignored; entries that reach zero are deleted.
    fn release(&mut self, product_id: ProductId, quantity: Quantity) {
        let Some(entry) = self.list.get_mut(&product_id) else {
            return;
        };
        entry.meal_count = entry.meal_count.saturating_sub(1);
        // First equal quantity wins. When two contributions are identical it
        // is arbitrary which one goes; the counts still balance.
        if let Some(pos) = entry.quantities.iter().position(|q| *q == quantity) {
            entry.quantities.remove(pos);
        }
        if entry.meal_count == 0 {
            self.list.remove(&product_id);
        }
    }

    fn apply_meal_event(
        &mut self,
        meal_id: MealId,
        event: &MealEvent,
    ) -> Result<(), ShoppingListError> {
        match event {
            MealEvent::Created(e) => {
                let mut meal = Meal::empty(e.id);
                meal.apply(event);
                self.meals.insert(e.id, meal);
            }
            MealEvent::IngredientAdded(e) => {
                let meal = self
                    .meals
                    .get_mut(&meal_id)
                    .ok_or(ShoppingListError::UnknownMeal(meal_id))?;
                meal.apply(event);
                if self.shop_meals.contains(&meal_id) {
                    self.charge(e.ingredient.product_id, e.ingredient.quantity)?;
                }
            }
            MealEvent::IngredientRemoved(e) => {
                let meal = self
                    .meals
                    .get_mut(&meal_id)
                    .ok_or(ShoppingListError::UnknownMeal(meal_id))?;
                // The event carries no quantity; read it from the cached meal
                // before the removal is applied.
                let quantity = meal
                    .ingredients()
                    .iter()
                    .find(|i| i.product_id == e.product_id)
                    .map(|i| i.quantity)
                    .ok_or(ShoppingListError::IngredientNotOnMeal {
                        meal_id,
                        product_id: e.product_id,
                    })?;
                meal.apply(event);
                if self.shop_meals.contains(&meal_id) {
                    self.release(e.product_id, quantity);
                }
            }
            MealEvent::NameUpdated(_) | MealEvent::UrlUpdated(_) => {
                let meal = self
                    .meals
                    .get_mut(&meal_id)
                    .ok_or(ShoppingListError::UnknownMeal(meal_id))?;
                meal.apply(event);
            }
        }
        Ok(())
    }

    fn apply_shop_event(&mut self, event: &ShopEvent) -> Result<(), ShoppingListError> {
        match event {
            ShopEvent::Created(e) => {
                // A new shop starts the list over; only the most recently
                // started shop is ever reflected.
                self.list.clear();
                self.shop_meals.clear();
                self.shop_items.clear();
                self.shop_id = Some(e.id);
            }
            ShopEvent::MealAdded(e) => {
                self.shop_meals.insert(e.meal_id);
                let ingredients = self
                    .meals
                    .get(&e.meal_id)
                    .ok_or(ShoppingListError::UnknownMeal(e.meal_id))?
                    .ingredients()
                    .to_vec();
                for ingredient in ingredients {
                    self.charge(ingredient.product_id, ingredient.quantity)?;
                }
            }
            ShopEvent::MealRemoved(e) => {
                self.shop_meals.remove(&e.meal_id);
                let ingredients = self
                    .meals
                    .get(&e.meal_id)
                    .ok_or(ShoppingListError::UnknownMeal(e.meal_id))?
                    .ingredients()
                    .to_vec();
                for ingredient in ingredients {
                    self.release(ingredient.product_id, ingredient.quantity);
                }
            }
            ShopEvent::ItemAdded(e) => {
                self.shop_items.insert(e.item.product_id, e.item.quantity);
                self.charge(e.item.product_id, e.item.quantity)?;
            }
            ShopEvent::ItemRemoved(e) => {
                let quantity = self
                    .shop_items
                    .remove(&e.product_id)
                    .ok_or(ShoppingListError::UnknownShopItem(e.product_id))?;
                self.release(e.product_id, quantity);
            }
        }
        Ok(())
    }

    fn apply_basket_event(&mut self, event: &BasketEvent) {
        match event {
            BasketEvent::Created(_) => {}
            BasketEvent::ItemAdded(e) => {
                if let Some(entry) = self.list.get_mut(&e.product_id) {
                    entry.is_in_basket = true;
                }
            }
            BasketEvent::ItemRemoved(e) => {
                if let Some(entry) = self.list.get_mut(&e.product_id) {
                    entry.is_in_basket = false;
                }
            }
        }
    }
}

impl Fold for ShoppingListProjection {
    type Payload = EventPayload;
    type Error = ShoppingListError;

    fn apply(&mut self, stored: &StoredEvent<EventPayload>) -> Result<(), ShoppingListError> {
        match stored.payload() {
            EventPayload::Product(ProductEvent::Created(e)) => {
                self.products.insert(
                    e.id,
                    ProductDetails {
                        id: e.id,
                        name: e.name.clone(),
                        category: e.category,
                    },
                );
            }
            EventPayload::Meal(event) => {
                // Meal events other than `Created` identify their meal only
                // through the stream they sit on.
                let meal_id = match event {
                    MealEvent::Created(e) => e.id,
                    _ => stored.aggregate_id().parse().map_err(|_| {
                        ShoppingListError::BadAggregateId(stored.aggregate_id().to_string())
                    })?,
                };
                self.apply_meal_event(meal_id, event)?;
            }
            EventPayload::Shop(event) => self.apply_shop_event(event)?,
            EventPayload::Basket(event) => self.apply_basket_event(event),
        }
        Ok(())
    }
}
