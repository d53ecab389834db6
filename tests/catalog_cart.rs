use pos_server::{
    models::{NewProduct, Product, ProductPatch},
    stores::{AddOutcome, CartEvent, CartStore, CatalogEvent, CatalogStore, StockError},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn find<'a>(catalog: &'a CatalogStore, name: &str) -> &'a Product {
    catalog
        .products()
        .iter()
        .find(|p| p.name == name)
        .expect("demo product")
}

#[test]
fn search_matches_name_or_category_against_full_catalog() {
    let catalog = CatalogStore::demo();

    let fruit = catalog.search("FRUIT");
    assert_eq!(fruit.len(), 2);

    // narrowing once does not narrow the next search
    assert_eq!(catalog.search("milk").len(), 1);
    assert_eq!(catalog.search("ban").len(), 1);
    assert_eq!(catalog.search("   ").len(), 3);
    assert!(catalog.search("bread").is_empty());
}

#[test]
fn set_stock_is_visible_through_search() {
    let mut catalog = CatalogStore::demo();
    let apple = find(&catalog, "Apple").id;

    let updated = catalog.set_stock(apple, 7).expect("apple exists");
    assert_eq!(updated.stock, 7);

    let listed = catalog.search("");
    let apple = listed.iter().find(|p| p.id == apple).unwrap();
    assert_eq!(apple.stock, 7);
}

#[test]
fn missing_ids_are_silent_no_ops() {
    let mut catalog = CatalogStore::demo();
    let before = catalog.products().to_vec();

    assert!(catalog.set_stock(Uuid::new_v4(), 3).is_none());
    assert!(
        catalog
            .update(
                Uuid::new_v4(),
                ProductPatch {
                    name: Some("Ghost".into()),
                    ..ProductPatch::default()
                }
            )
            .is_none()
    );
    assert_eq!(catalog.products(), before.as_slice());
}

#[test]
fn add_assigns_fresh_ids_and_update_merges() {
    let mut catalog = CatalogStore::new();
    let mut events = catalog.subscribe();

    let bread = catalog.add(NewProduct {
        name: "Bread".into(),
        category: "Bakery".into(),
        price: Decimal::from(800),
        stock: 20,
    });
    let rolls = catalog.add(NewProduct {
        name: "Rolls".into(),
        category: "Bakery".into(),
        price: Decimal::from(300),
        stock: 40,
    });
    assert_ne!(bread.id, rolls.id);
    assert_eq!(events.try_recv().unwrap(), CatalogEvent::Added(bread.clone()));

    let updated = catalog
        .update(
            bread.id,
            ProductPatch {
                price: Some(Decimal::from(850)),
                ..ProductPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Bread");
    assert_eq!(updated.category, "Bakery");
    assert_eq!(updated.price, Decimal::from(850));
    assert_eq!(updated.stock, 20);
}

#[test]
fn decrement_is_conditional_on_stock() {
    let mut catalog = CatalogStore::demo();
    let milk = find(&catalog, "Milk").id;

    let err = catalog.decrement_stock(milk, 51).unwrap_err();
    assert_eq!(
        err,
        StockError::Insufficient {
            product_id: milk,
            requested: 51,
            available: 50
        }
    );
    assert_eq!(catalog.get(milk).unwrap().stock, 50);

    let after = catalog.decrement_stock(milk, 50).unwrap();
    assert_eq!(after.stock, 0);

    let unknown = Uuid::new_v4();
    assert_eq!(
        catalog.decrement_stock(unknown, 1).unwrap_err(),
        StockError::UnknownProduct(unknown)
    );
}

#[test]
fn low_stock_sorted_by_stock() {
    let mut catalog = CatalogStore::demo();
    let banana = find(&catalog, "Banana").id;
    catalog.set_stock(banana, 2);

    let low = catalog.low_stock(60);
    let names: Vec<_> = low.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Banana", "Milk"]);
}

fn product(stock: u32, price: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: "Widget".into(),
        category: "Misc".into(),
        price: Decimal::from(price),
        stock,
    }
}

#[test]
fn add_inserts_then_increments_up_to_stock() {
    let mut cart = CartStore::new();
    let widget = product(2, 250);

    assert_eq!(cart.add(&widget), AddOutcome::Added);
    assert_eq!(cart.add(&widget), AddOutcome::Incremented);
    assert_eq!(cart.add(&widget), AddOutcome::AtStockLimit);
    assert_eq!(cart.quantity_of(widget.id), Some(2));
    assert_eq!(cart.item_count(), 2);
}

#[test]
fn add_out_of_stock_product_is_refused() {
    let mut cart = CartStore::new();
    let widget = product(0, 250);

    assert_eq!(cart.add(&widget), AddOutcome::OutOfStock);
    assert!(cart.is_empty());
}

#[test]
fn readding_refreshes_snapshot_and_clamps() {
    let mut cart = CartStore::new();
    let mut widget = product(5, 250);
    cart.add(&widget);
    cart.set_quantity(widget.id, 5);

    widget.stock = 3;
    widget.price = Decimal::from(300);
    assert_eq!(cart.add(&widget), AddOutcome::AtStockLimit);
    assert_eq!(cart.quantity_of(widget.id), Some(3));
    assert_eq!(cart.total(), Decimal::from(900));
}

#[test]
fn set_quantity_clamps_and_removes() {
    let mut cart = CartStore::new();
    let widget = product(4, 100);
    cart.add(&widget);

    cart.set_quantity(widget.id, 10);
    assert_eq!(cart.quantity_of(widget.id), Some(4));

    cart.set_quantity(widget.id, 2);
    assert_eq!(cart.quantity_of(widget.id), Some(2));

    cart.set_quantity(widget.id, 0);
    assert_eq!(cart.quantity_of(widget.id), None);

    // unknown id
    cart.set_quantity(Uuid::new_v4(), 3);
    assert!(cart.is_empty());
}

#[test]
fn total_is_sum_of_line_totals() {
    let mut cart = CartStore::new();
    let a = product(10, 1000);
    let b = product(10, 500);
    cart.add(&a);
    cart.add(&a);
    cart.add(&b);

    let expected: Decimal = cart
        .lines()
        .iter()
        .map(|l| l.product.price * Decimal::from(l.quantity))
        .sum();
    assert_eq!(cart.total(), expected);
    assert_eq!(cart.total(), Decimal::from(2500));
}

#[test]
fn remove_and_clear_notify_subscribers() {
    let mut cart = CartStore::new();
    let widget = product(3, 100);
    cart.add(&widget);

    let mut events = cart.subscribe();
    assert!(cart.remove(widget.id));
    assert!(!cart.remove(widget.id));
    cart.clear();

    assert_eq!(
        events.try_recv().unwrap(),
        CartEvent::LineRemoved {
            product_id: widget.id
        }
    );
    assert_eq!(events.try_recv().unwrap(), CartEvent::Cleared);
}

fn bulk(name: &str, price: Decimal, stock: u32) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        category: "Bulk".into(),
        price,
        stock,
    }
}

#[test]
fn cart_total_saturates_instead_of_overflowing() {
    let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
    let mut cart = CartStore::new();
    cart.add(&bulk("Gold", huge, 1));
    cart.add(&bulk("Platinum", huge, 1));

    assert_eq!(cart.total(), Decimal::MAX);
}

#[test]
fn item_count_saturates_at_u32_max() {
    let mut cart = CartStore::new();
    let crates = bulk("Crates", Decimal::ONE, u32::MAX);
    let pallets = bulk("Pallets", Decimal::ONE, u32::MAX);
    cart.add(&crates);
    cart.add(&pallets);
    cart.set_quantity(crates.id, 3_000_000_000);
    cart.set_quantity(pallets.id, 3_000_000_000);

    assert_eq!(cart.quantity_of(crates.id), Some(3_000_000_000));
    assert_eq!(cart.item_count(), u32::MAX);
}
