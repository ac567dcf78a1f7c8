use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use uuid::Uuid;

use larder_core::{Category, ExpectedVersion, MealId, ProductId};
use larder_events::{EventLog, InMemoryEventLog, ProjectionRunner, Repository};
use larder_infra::{EventPayload, ShoppingListProjection};
use larder_meals::{IngredientAdded, IngredientRemoved, Meal, MealCreated, MealEvent, MealIngredient};
use larder_products::{ProductCreated, ProductEvent, ProductName};
use larder_shops::{MealAdded, ShopCreated, ShopEvent};

fn product_id(n: u128) -> ProductId {
    ProductId::from_uuid(Uuid::from_u128(n))
}

fn meal_id(n: u128) -> MealId {
    MealId::from_uuid(Uuid::from_u128(1_000_000 + n))
}

/// A log with one long-lived meal: created once, then ingredients churned.
fn meal_churn_log(events: usize) -> Arc<InMemoryEventLog<EventPayload>> {
    let log = Arc::new(InMemoryEventLog::new());
    let id = meal_id(0);

    let mut stream = vec![EventPayload::Meal(MealEvent::Created(MealCreated {
        id,
        name: "Stew".to_string(),
        url: None,
        ingredients: vec![],
    }))];
    for n in 0..events {
        let ingredient = MealIngredient::new(product_id(n as u128 % 32));
        stream.push(EventPayload::Meal(MealEvent::IngredientAdded(IngredientAdded {
            ingredient,
        })));
        stream.push(EventPayload::Meal(MealEvent::IngredientRemoved(IngredientRemoved {
            product_id: ingredient.product_id,
        })));
    }
    log.append("meal", &id.to_string(), ExpectedVersion::Exact(0), stream)
        .unwrap();
    log
}

/// A log with `meals` meals of `ingredients` products each, all in one shop.
fn shopping_log(meals: usize, ingredients: usize) -> Arc<InMemoryEventLog<EventPayload>> {
    let log = Arc::new(InMemoryEventLog::new());

    for n in 0..(meals * ingredients) {
        let id = product_id(n as u128);
        log.append(
            "product",
            &id.to_string(),
            ExpectedVersion::Exact(0),
            vec![EventPayload::Product(ProductEvent::Created(ProductCreated {
                id,
                name: ProductName::new(format!("Product {n}")).unwrap(),
                category: Category::FoodCupboard,
            }))],
        )
        .unwrap();
    }

    for m in 0..meals {
        let id = meal_id(m as u128);
        let ingredients = (0..ingredients)
            .map(|i| MealIngredient::new(product_id((m * ingredients + i) as u128)))
            .collect();
        log.append(
            "meal",
            &id.to_string(),
            ExpectedVersion::Exact(0),
            vec![EventPayload::Meal(MealEvent::Created(MealCreated {
                id,
                name: format!("Meal {m}"),
                url: None,
                ingredients,
            }))],
        )
        .unwrap();
    }

    let mut shop_stream = vec![EventPayload::Shop(ShopEvent::Created(ShopCreated {
        id: larder_core::ShopId::first(),
    }))];
    for m in 0..meals {
        shop_stream.push(EventPayload::Shop(ShopEvent::MealAdded(MealAdded {
            meal_id: meal_id(m as u128),
        })));
    }
    log.append("shop", "1", ExpectedVersion::Exact(0), shop_stream)
        .unwrap();

    log
}

fn bench_aggregate_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_replay");
    for events in [100usize, 1_000] {
        let log = meal_churn_log(events);
        let repository: Repository<Meal, _> = Repository::new(log);
        group.throughput(Throughput::Elements(events as u64 * 2 + 1));
        group.bench_function(format!("{events}_churn_events"), |b| {
            b.iter(|| {
                let meal = repository.load(black_box(&meal_id(0))).unwrap();
                black_box(meal.state().ingredients().len())
            })
        });
    }
    group.finish();
}

fn bench_shopping_list_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("shopping_list_fold");
    for (meals, ingredients) in [(10usize, 5usize), (50, 10)] {
        let log = shopping_log(meals, ingredients);
        let total = log.read_all(0, 1 << 20).unwrap().len() as u64;
        group.throughput(Throughput::Elements(total));
        group.bench_function(format!("{meals}_meals_x_{ingredients}_ingredients"), |b| {
            b.iter(|| {
                let mut runner = ProjectionRunner::new(ShoppingListProjection::new());
                runner.run_to_end(black_box(&log)).unwrap();
                black_box(runner.fold().items().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate_replay, bench_shopping_list_fold);
criterion_main!(benches);
