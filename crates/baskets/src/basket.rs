use serde::{Deserialize, Serialize};

use larder_core::{Aggregate, AggregateRoot, DomainError, ProductId, ShopId};
use larder_events::Event;

/// Aggregate root: Basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basket {
    shop_id: ShopId,
    items: Vec<ProductId>,
    version: u64,
    created: bool,
}

impl Basket {
    /// Products picked up so far, in pick-up order.
    pub fn items(&self) -> &[ProductId] {
        &self.items
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.contains(&product_id)
    }
}

/// Command: CreateBasket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBasket {
    pub shop_id: ShopId,
}

/// Command: AddBasketItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBasketItem {
    pub product_id: ProductId,
}

/// Command: RemoveBasketItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveBasketItem {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasketCommand {
    Create(CreateBasket),
    AddItem(AddBasketItem),
    RemoveItem(RemoveBasketItem),
}

/// Event: BasketCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketCreated {
    pub shop_id: ShopId,
}

/// Event: BasketItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItemAdded {
    pub product_id: ProductId,
}

/// Event: BasketItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItemRemoved {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasketEvent {
    Created(BasketCreated),
    ItemAdded(BasketItemAdded),
    ItemRemoved(BasketItemRemoved),
}

impl Event for BasketEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BasketEvent::Created(_) => "basket.created",
            BasketEvent::ItemAdded(_) => "basket.item-added",
            BasketEvent::ItemRemoved(_) => "basket.item-removed",
        }
    }
}

impl AggregateRoot for Basket {
    type Id = ShopId;

    fn id(&self) -> &Self::Id {
        &self.shop_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Basket {
    type Command = BasketCommand;
    type Event = BasketEvent;
    type Error = DomainError;

    const AGGREGATE_TYPE: &'static str = "basket";

    fn empty(id: Self::Id) -> Self {
        Self {
            shop_id: id,
            items: Vec::new(),
            version: 0,
            created: false,
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BasketEvent::Created(e) => {
                self.shop_id = e.shop_id;
                self.items = Vec::new();
                self.created = true;
            }
            BasketEvent::ItemAdded(e) => {
                self.items.push(e.product_id);
            }
            BasketEvent::ItemRemoved(e) => {
                self.items.retain(|id| *id != e.product_id);
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BasketCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("basket already exists"));
                }
                Ok(vec![BasketEvent::Created(BasketCreated {
                    shop_id: cmd.shop_id,
                })])
            }
            BasketCommand::AddItem(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.contains(cmd.product_id) {
                    return Err(DomainError::conflict(format!(
                        "product {} is already in the basket",
                        cmd.product_id
                    )));
                }
                Ok(vec![BasketEvent::ItemAdded(BasketItemAdded {
                    product_id: cmd.product_id,
                })])
            }
            BasketCommand::RemoveItem(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if !self.contains(cmd.product_id) {
                    return Err(DomainError::validation(format!(
                        "product {} is not in the basket",
                        cmd.product_id
                    )));
                }
                Ok(vec![BasketEvent::ItemRemoved(BasketItemRemoved {
                    product_id: cmd.product_id,
                })])
            }
        }
    }
}
