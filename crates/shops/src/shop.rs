use serde::{Deserialize, Serialize};

use larder_core::{Aggregate, AggregateRoot, DomainError, MealId, ProductId, Quantity, ShopId};
use larder_events::Event;

/// A product added to a shop directly, without going through a meal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl ShopItem {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: Quantity::default(),
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Aggregate root: Shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shop {
    id: ShopId,
    meals: Vec<MealId>,
    items: Vec<ShopItem>,
    version: u64,
    created: bool,
}

impl Shop {
    /// Meals in this shop, in the order they were added.
    pub fn meals(&self) -> &[MealId] {
        &self.meals
    }

    /// Directly-added items, in the order they were added.
    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn has_meal(&self, meal_id: MealId) -> bool {
        self.meals.contains(&meal_id)
    }

    fn item(&self, product_id: ProductId) -> Option<&ShopItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}

/// Command: StartShop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartShop {
    pub id: ShopId,
}

/// Command: AddMeal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMeal {
    pub meal_id: MealId,
}

/// Command: RemoveMeal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMeal {
    pub meal_id: MealId,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item: ShopItem,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopCommand {
    Start(StartShop),
    AddMeal(AddMeal),
    RemoveMeal(RemoveMeal),
    AddItem(AddItem),
    RemoveItem(RemoveItem),
}

/// Event: ShopCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCreated {
    pub id: ShopId,
}

/// Event: MealAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealAdded {
    pub meal_id: MealId,
}

/// Event: MealRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRemoved {
    pub meal_id: MealId,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: ShopItem,
}

/// Event: ItemRemoved.
///
/// Carries only the product id; the quantity that was added lives in the
/// shop state (and in read-model caches).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopEvent {
    Created(ShopCreated),
    MealAdded(MealAdded),
    MealRemoved(MealRemoved),
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
}

impl Event for ShopEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShopEvent::Created(_) => "shop.created",
            ShopEvent::MealAdded(_) => "shop.meal-added",
            ShopEvent::MealRemoved(_) => "shop.meal-removed",
            ShopEvent::ItemAdded(_) => "shop.item-added",
            ShopEvent::ItemRemoved(_) => "shop.item-removed",
        }
    }
}

impl AggregateRoot for Shop {
    type Id = ShopId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Shop {
    type Command = ShopCommand;
    type Event = ShopEvent;
    type Error = DomainError;

    const AGGREGATE_TYPE: &'static str = "shop";

    fn empty(id: Self::Id) -> Self {
        Self {
            id,
            meals: Vec::new(),
            items: Vec::new(),
            version: 0,
            created: false,
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ShopEvent::Created(e) => {
                self.id = e.id;
                self.meals = Vec::new();
                self.items = Vec::new();
                self.created = true;
            }
            ShopEvent::MealAdded(e) => {
                self.meals.push(e.meal_id);
            }
            ShopEvent::MealRemoved(e) => {
                self.meals.retain(|id| *id != e.meal_id);
            }
            ShopEvent::ItemAdded(e) => {
                self.items.push(e.item);
            }
            ShopEvent::ItemRemoved(e) => {
                self.items.retain(|i| i.product_id != e.product_id);
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ShopCommand::Start(cmd) => self.handle_start(cmd),
            ShopCommand::AddMeal(cmd) => self.handle_add_meal(cmd),
            ShopCommand::RemoveMeal(cmd) => self.handle_remove_meal(cmd),
            ShopCommand::AddItem(cmd) => self.handle_add_item(cmd),
            ShopCommand::RemoveItem(cmd) => self.handle_remove_item(cmd),
        }
    }
}

impl Shop {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_start(&self, cmd: &StartShop) -> Result<Vec<ShopEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("shop already started"));
        }
        Ok(vec![ShopEvent::Created(ShopCreated { id: cmd.id })])
    }

    fn handle_add_meal(&self, cmd: &AddMeal) -> Result<Vec<ShopEvent>, DomainError> {
        self.ensure_created()?;
        if self.has_meal(cmd.meal_id) {
            return Err(DomainError::conflict(format!(
                "meal {} is already in the shop",
                cmd.meal_id
            )));
        }
        Ok(vec![ShopEvent::MealAdded(MealAdded {
            meal_id: cmd.meal_id,
        })])
    }

    fn handle_remove_meal(&self, cmd: &RemoveMeal) -> Result<Vec<ShopEvent>, DomainError> {
        self.ensure_created()?;
        if !self.has_meal(cmd.meal_id) {
            return Err(DomainError::validation(format!(
                "meal {} is not in the shop",
                cmd.meal_id
            )));
        }
        Ok(vec![ShopEvent::MealRemoved(MealRemoved {
            meal_id: cmd.meal_id,
        })])
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<ShopEvent>, DomainError> {
        self.ensure_created()?;
        if self.item(cmd.item.product_id).is_some() {
            return Err(DomainError::conflict(format!(
                "product {} is already in the shop",
                cmd.item.product_id
            )));
        }
        Ok(vec![ShopEvent::ItemAdded(ItemAdded { item: cmd.item })])
    }

    fn handle_remove_item(&self, cmd: &RemoveItem) -> Result<Vec<ShopEvent>, DomainError> {
        self.ensure_created()?;
        if self.item(cmd.product_id).is_none() {
            return Err(DomainError::validation(format!(
                "product {} is not in the shop",
                cmd.product_id
            )));
        }
        Ok(vec![ShopEvent::ItemRemoved(ItemRemoved {
            product_id: cmd.product_id,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::Unit;

    fn started(id: ShopId) -> Shop {
        let mut shop = Shop::empty(id);
        let events = shop.handle(&ShopCommand::Start(StartShop { id })).unwrap();
        shop.apply(&events[0]);
        shop
    }

    fn run(shop: &mut Shop, command: ShopCommand) {
        let events = shop.handle(&command).unwrap();
        for event in &events {
            shop.apply(event);
        }
    }

    #[test]
    fn starting_a_shop_yields_an_empty_trip() {
        let shop = started(ShopId::first());
        assert!(shop.meals().is_empty());
        assert!(shop.items().is_empty());
        assert_eq!(shop.version(), 1);
    }

    #[test]
    fn meals_can_be_added_and_removed() {
        let mut shop = started(ShopId::first());
        let meal_id = MealId::new();

        run(&mut shop, ShopCommand::AddMeal(AddMeal { meal_id }));
        assert!(shop.has_meal(meal_id));

        run(&mut shop, ShopCommand::RemoveMeal(RemoveMeal { meal_id }));
        assert!(!shop.has_meal(meal_id));
    }

    #[test]
    fn the_same_meal_cannot_join_a_shop_twice() {
        let mut shop = started(ShopId::first());
        let meal_id = MealId::new();

        run(&mut shop, ShopCommand::AddMeal(AddMeal { meal_id }));
        let err = shop
            .handle(&ShopCommand::AddMeal(AddMeal { meal_id }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn items_track_their_quantities() {
        let mut shop = started(ShopId::first());
        let item = ShopItem::new(ProductId::new()).with_quantity(Quantity::new(2, Unit::Pack));

        run(&mut shop, ShopCommand::AddItem(AddItem { item }));
        assert_eq!(shop.items(), &[item]);

        run(
            &mut shop,
            ShopCommand::RemoveItem(RemoveItem {
                product_id: item.product_id,
            }),
        );
        assert!(shop.items().is_empty());
    }

    #[test]
    fn removing_an_absent_member_is_rejected() {
        let shop = started(ShopId::first());

        let err = shop
            .handle(&ShopCommand::RemoveMeal(RemoveMeal {
                meal_id: MealId::new(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = shop
            .handle(&ShopCommand::RemoveItem(RemoveItem {
                product_id: ProductId::new(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn commands_on_an_unstarted_shop_are_rejected() {
        let shop = Shop::empty(ShopId::first());
        let err = shop
            .handle(&ShopCommand::AddMeal(AddMeal {
                meal_id: MealId::new(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Replaying the same event sequence twice yields identical state.
            #[test]
            fn replay_is_deterministic(meal_count in 1usize..6) {
                let id = ShopId::first();
                let mut events = vec![ShopEvent::Created(ShopCreated { id })];
                for _ in 0..meal_count {
                    events.push(ShopEvent::MealAdded(MealAdded { meal_id: MealId::new() }));
                }

                let mut one = Shop::empty(id);
                let mut two = Shop::empty(id);
                for event in &events {
                    one.apply(event);
                }
                for event in &events {
                    two.apply(event);
                }

                prop_assert_eq!(one, two);
            }
        }
    }
}
