//! Application services invoked by request handlers.
//!
//! Handlers stay thin: each operation here loads an aggregate through the
//! repository, executes a command, and saves. Only the shop needs a real
//! service because "the current shop" is itself derived from the log.

use larder_core::{DomainError, MealId, ProductId, ShopId};
use larder_events::{
    EventLog, EventLogError, ProjectionError, ProjectionRunner, Repository, RepositoryError,
    Tracked,
};
use larder_shops::{AddItem, AddMeal, RemoveItem, RemoveMeal, Shop, ShopCommand, ShopItem, StartShop};
use thiserror::Error;

use crate::payload::EventPayload;
use crate::projections::CurrentShopProjection;

#[derive(Debug, Error)]
pub enum ShopServiceError {
    #[error("no shop has been started yet")]
    NoCurrentShop,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Log(#[from] EventLogError),
}

/// Operations on the current shopping trip.
pub struct ShopService<L> {
    log: L,
    shops: Repository<Shop, L>,
}

impl<L> ShopService<L>
where
    L: EventLog<Payload = EventPayload> + Clone,
{
    pub fn new(log: L) -> Self {
        Self {
            shops: Repository::new(log.clone()),
            log,
        }
    }

    /// The id of the most recently started shop.
    pub fn current_shop_id(&self) -> Result<Option<ShopId>, ShopServiceError> {
        let mut runner = ProjectionRunner::new(CurrentShopProjection::default());
        match runner.run_to_end(&self.log) {
            Ok(()) => Ok(runner.fold().current()),
            Err(ProjectionError::Log(e)) => Err(e.into()),
            Err(ProjectionError::Fold(never)) => match never {},
        }
    }

    pub fn current_shop(&self) -> Result<Option<Tracked<Shop>>, ShopServiceError> {
        match self.current_shop_id()? {
            None => Ok(None),
            Some(id) => Ok(Some(self.shops.load(&id)?)),
        }
    }

    /// Start the next shopping trip. The new shop takes over the shopping
    /// list; the previous trip is left behind in the log.
    pub fn start_shop(&self) -> Result<Tracked<Shop>, ShopServiceError> {
        let id = self
            .current_shop_id()?
            .map(ShopId::next)
            .unwrap_or_else(ShopId::first);
        tracing::debug!(shop_id = %id, "starting shop");

        let mut shop = Tracked::create(id, &ShopCommand::Start(StartShop { id }))?;
        self.shops.save(&mut shop)?;
        Ok(shop)
    }

    pub fn add_meal_to_current(&self, meal_id: MealId) -> Result<Tracked<Shop>, ShopServiceError> {
        let mut shop = self.current_shop()?.ok_or(ShopServiceError::NoCurrentShop)?;
        tracing::debug!(shop_id = %shop.id(), %meal_id, "adding meal to shop");
        shop.execute(&ShopCommand::AddMeal(AddMeal { meal_id }))?;
        self.shops.save(&mut shop)?;
        Ok(shop)
    }

    pub fn remove_meal_from_current(
        &self,
        meal_id: MealId,
    ) -> Result<Tracked<Shop>, ShopServiceError> {
        let mut shop = self.current_shop()?.ok_or(ShopServiceError::NoCurrentShop)?;
        tracing::debug!(shop_id = %shop.id(), %meal_id, "removing meal from shop");
        shop.execute(&ShopCommand::RemoveMeal(RemoveMeal { meal_id }))?;
        self.shops.save(&mut shop)?;
        Ok(shop)
    }

    pub fn add_item_to_current(&self, item: ShopItem) -> Result<Tracked<Shop>, ShopServiceError> {
        let mut shop = self.current_shop()?.ok_or(ShopServiceError::NoCurrentShop)?;
        tracing::debug!(shop_id = %shop.id(), product_id = %item.product_id, "adding item to shop");
        shop.execute(&ShopCommand::AddItem(AddItem { item }))?;
        self.shops.save(&mut shop)?;
        Ok(shop)
    }

    pub fn remove_item_from_current(
        &self,
        product_id: ProductId,
    ) -> Result<Tracked<Shop>, ShopServiceError> {
        let mut shop = self.current_shop()?.ok_or(ShopServiceError::NoCurrentShop)?;
        tracing::debug!(shop_id = %shop.id(), %product_id, "removing item from shop");
        shop.execute(&ShopCommand::RemoveItem(RemoveItem { product_id }))?;
        self.shops.save(&mut shop)?;
        Ok(shop)
    }
}
