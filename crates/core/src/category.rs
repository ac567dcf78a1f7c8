//! Product categories.

use serde::{Deserialize, Serialize};

/// The aisle a product belongs to.
///
/// Closed set; serialized by variant name. The list endpoint that exposes
/// these to clients lives outside this workspace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fruit,
    Meat,
    FishAndSeafood,
    FoodCupboard,
    Drinks,
    Chilled,
    Frozen,
    Bakery,
    Vegetables,
    TeaAndCoffee,
    AlcoholicDrinks,
    SaucesOilsAndDressings,
    PastaRiceAndNoodles,
    SeedsNutsAndDriedFruits,
    ChocolateAndSweets,
    TinsCansAndPackets,
    Desserts,
    Dairy,
    Eggs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_serialize_by_name() {
        let json = serde_json::to_value(Category::AlcoholicDrinks).unwrap();
        assert_eq!(json, serde_json::json!("AlcoholicDrinks"));
    }
}
