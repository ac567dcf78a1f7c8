use serde::{Deserialize, Serialize};

use larder_core::{Aggregate, AggregateRoot, DomainError, MealId, ProductId, Quantity};
use larder_events::Event;

/// One ingredient line of a meal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealIngredient {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl MealIngredient {
    /// An ingredient with the default quantity, e.g. "one onion".
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

/// Aggregate root: Meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    id: MealId,
    name: String,
    url: Option<String>,
    ingredients: Vec<MealIngredient>,
    version: u64,
    created: bool,
}

impl Meal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Ingredient lines in the order they were added.
    pub fn ingredients(&self) -> &[MealIngredient] {
        &self.ingredients
    }

    fn ingredient(&self, product_id: ProductId) -> Option<&MealIngredient> {
        self.ingredients.iter().find(|i| i.product_id == product_id)
    }
}

/// Command: CreateMeal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMeal {
    pub id: MealId,
    pub name: String,
    pub url: Option<String>,
    pub ingredients: Vec<MealIngredient>,
}

/// Command: AddIngredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddIngredient {
    pub ingredient: MealIngredient,
}

/// Command: RemoveIngredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveIngredient {
    pub product_id: ProductId,
}

/// Command: Rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub name: String,
}

/// Command: SetUrl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUrl {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealCommand {
    Create(CreateMeal),
    AddIngredient(AddIngredient),
    RemoveIngredient(RemoveIngredient),
    Rename(Rename),
    SetUrl(SetUrl),
}

/// Event: MealCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealCreated {
    pub id: MealId,
    pub name: String,
    pub url: Option<String>,
    pub ingredients: Vec<MealIngredient>,
}

/// Event: IngredientAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAdded {
    pub ingredient: MealIngredient,
}

/// Event: IngredientRemoved.
///
/// Carries only the product id; consumers that need the removed quantity
/// must look it up in the meal state before applying this event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRemoved {
    pub product_id: ProductId,
}

/// Event: NameUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameUpdated {
    pub name: String,
}

/// Event: UrlUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlUpdated {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealEvent {
    Created(MealCreated),
    IngredientAdded(IngredientAdded),
    IngredientRemoved(IngredientRemoved),
    NameUpdated(NameUpdated),
    UrlUpdated(UrlUpdated),
}

impl Event for MealEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MealEvent::Created(_) => "meal.created",
            MealEvent::IngredientAdded(_) => "meal.ingredient-added",
            MealEvent::IngredientRemoved(_) => "meal.ingredient-removed",
            MealEvent::NameUpdated(_) => "meal.name-updated",
            MealEvent::UrlUpdated(_) => "meal.url-updated",
        }
    }
}

impl AggregateRoot for Meal {
    type Id = MealId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Meal {
    type Command = MealCommand;
    type Event = MealEvent;
    type Error = DomainError;

    const AGGREGATE_TYPE: &'static str = "meal";

    fn empty(id: Self::Id) -> Self {
        Self {
            id,
            name: String::new(),
            url: None,
            ingredients: Vec::new(),
            version: 0,
            created: false,
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            MealEvent::Created(e) => {
                self.id = e.id;
                self.name = e.name.clone();
                self.url = e.url.clone();
                self.ingredients = e.ingredients.clone();
                self.created = true;
            }
            MealEvent::IngredientAdded(e) => {
                self.ingredients.push(e.ingredient);
            }
            MealEvent::IngredientRemoved(e) => {
                self.ingredients.retain(|i| i.product_id != e.product_id);
            }
            MealEvent::NameUpdated(e) => {
                self.name = e.name.clone();
            }
            MealEvent::UrlUpdated(e) => {
                self.url = e.url.clone();
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            MealCommand::Create(cmd) => self.handle_create(cmd),
            MealCommand::AddIngredient(cmd) => self.handle_add_ingredient(cmd),
            MealCommand::RemoveIngredient(cmd) => self.handle_remove_ingredient(cmd),
            MealCommand::Rename(cmd) => self.handle_rename(cmd),
            MealCommand::SetUrl(cmd) => self.handle_set_url(cmd),
        }
    }
}

impl Meal {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateMeal) -> Result<Vec<MealEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("meal already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("meal name cannot be empty"));
        }
        for (idx, ingredient) in cmd.ingredients.iter().enumerate() {
            let earlier = &cmd.ingredients[..idx];
            if earlier.iter().any(|i| i.product_id == ingredient.product_id) {
                return Err(DomainError::invariant(format!(
                    "duplicate ingredient {}",
                    ingredient.product_id
                )));
            }
        }

        Ok(vec![MealEvent::Created(MealCreated {
            id: cmd.id,
            name: cmd.name.clone(),
            url: cmd.url.clone(),
            ingredients: cmd.ingredients.clone(),
        })])
    }

    fn handle_add_ingredient(&self, cmd: &AddIngredient) -> Result<Vec<MealEvent>, DomainError> {
        self.ensure_created()?;
        if self.ingredient(cmd.ingredient.product_id).is_some() {
            return Err(DomainError::conflict(format!(
                "ingredient {} is already on the meal",
                cmd.ingredient.product_id
            )));
        }

        Ok(vec![MealEvent::IngredientAdded(IngredientAdded {
            ingredient: cmd.ingredient,
        })])
    }

    fn handle_remove_ingredient(
        &self,
        cmd: &RemoveIngredient,
    ) -> Result<Vec<MealEvent>, DomainError> {
        self.ensure_created()?;
        if self.ingredient(cmd.product_id).is_none() {
            return Err(DomainError::validation(format!(
                "ingredient {} is not on the meal",
                cmd.product_id
            )));
        }

        Ok(vec![MealEvent::IngredientRemoved(IngredientRemoved {
            product_id: cmd.product_id,
        })])
    }

    fn handle_rename(&self, cmd: &Rename) -> Result<Vec<MealEvent>, DomainError> {
        self.ensure_created()?;
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("meal name cannot be empty"));
        }

        Ok(vec![MealEvent::NameUpdated(NameUpdated {
            name: cmd.name.clone(),
        })])
    }

    fn handle_set_url(&self, cmd: &SetUrl) -> Result<Vec<MealEvent>, DomainError> {
        self.ensure_created()?;

        Ok(vec![MealEvent::UrlUpdated(UrlUpdated {
            url: cmd.url.clone(),
        })])
    }
}
