use chrono::Utc;
use pos_server::{
    config::AppConfig,
    dto::{
        cart::{AddToCartRequest, UpdateCartQuantityRequest},
        checkout::CheckoutRequest,
        products::UpdateStockRequest,
    },
    middleware::auth::AuthUser,
    models::{Product, ProductPatch, Role, User},
    services::{cart_service, checkout_service, product_service},
    state::AppState,
    stores::{CartStore, CatalogStore, SalesLedger, users::BOOTSTRAP_ADMIN_ID},
    workflow::{CheckoutError, place_order, receipt_document},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn apple(catalog: &CatalogStore) -> Product {
    catalog
        .products()
        .iter()
        .find(|p| p.name == "Apple")
        .cloned()
        .expect("demo apple")
}

#[test]
fn checkout_records_sale_and_decrements_stock() {
    let mut catalog = CatalogStore::demo();
    let mut ledger = SalesLedger::default();
    let mut cart = CartStore::new();
    let apple = apple(&catalog);

    cart.add(&apple);
    cart.add(&apple);

    let sale = place_order(&mut cart, &mut catalog, &mut ledger, "cash", Utc::now()).unwrap();

    assert_eq!(sale.total, Decimal::from(2000));
    assert_eq!(sale.items.len(), 1);
    assert_eq!(sale.items[0].quantity, 2);
    assert_eq!(sale.items[0].price, Decimal::from(1000));
    assert_eq!(catalog.get(apple.id).unwrap().stock, 98);
    assert_eq!(ledger.len(), 1);
    assert!(cart.is_empty());
}

#[test]
fn sale_items_are_snapshots() {
    let mut catalog = CatalogStore::demo();
    let mut ledger = SalesLedger::default();
    let mut cart = CartStore::new();
    let apple = apple(&catalog);
    cart.add(&apple);

    let sale = place_order(&mut cart, &mut catalog, &mut ledger, "cash", Utc::now()).unwrap();
    catalog.update(
        apple.id,
        ProductPatch {
            price: Some(Decimal::from(1200)),
            ..Default::default()
        },
    );

    let recorded = ledger.get(sale.id).unwrap();
    assert_eq!(recorded.items[0].price, Decimal::from(1000));
    assert_eq!(recorded.total, Decimal::from(1000));
}

#[test]
fn checkout_validation_errors() {
    let mut catalog = CatalogStore::demo();
    let mut ledger = SalesLedger::default();
    let mut cart = CartStore::new();

    assert_eq!(
        place_order(&mut cart, &mut catalog, &mut ledger, "cash", Utc::now()),
        Err(CheckoutError::EmptyCart)
    );

    cart.add(&apple(&catalog));
    assert_eq!(
        place_order(&mut cart, &mut catalog, &mut ledger, "  ", Utc::now()),
        Err(CheckoutError::MissingPaymentMethod)
    );
    assert_eq!(cart.item_count(), 1);
    assert!(ledger.is_empty());
}

#[test]
fn insufficient_stock_leaves_everything_untouched() {
    let mut catalog = CatalogStore::demo();
    let mut ledger = SalesLedger::default();
    let mut cart = CartStore::new();
    let apple = apple(&catalog);
    let banana = catalog
        .products()
        .iter()
        .find(|p| p.name == "Banana")
        .cloned()
        .unwrap();

    cart.add(&banana);
    cart.add(&apple);
    cart.add(&apple);
    cart.add(&apple);
    // another till sold most of the apples meanwhile
    catalog.set_stock(apple.id, 2);

    let err = place_order(&mut cart, &mut catalog, &mut ledger, "cash", Utc::now()).unwrap_err();
    assert_eq!(
        err,
        CheckoutError::InsufficientStock {
            product_id: apple.id,
            requested: 3,
            available: 2
        }
    );
    assert_eq!(catalog.get(banana.id).unwrap().stock, 150);
    assert_eq!(catalog.get(apple.id).unwrap().stock, 2);
    assert!(ledger.is_empty());
    assert_eq!(cart.item_count(), 4);
}

#[test]
fn receipt_lists_items_total_and_payment() {
    let mut catalog = CatalogStore::demo();
    let mut ledger = SalesLedger::default();
    let mut cart = CartStore::new();
    cart.add(&apple(&catalog));

    let sale = place_order(&mut cart, &mut catalog, &mut ledger, "mobile", Utc::now()).unwrap();
    let receipt = receipt_document(&sale, "Tsh.", ledger.offset());

    let page = &receipt.pages[0];
    assert_eq!(page.heading, "Receipt");
    assert_eq!(page.table.as_ref().unwrap().rows.len(), 1);
    assert!(page.footer.contains(&"Total: Tsh. 1000.00".to_string()));
    assert!(page.footer.contains(&"Payment Method: mobile".to_string()));
}

#[test]
fn checkout_rejects_an_unrepresentable_total_before_touching_stock() {
    let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
    let gold = Product {
        id: Uuid::new_v4(),
        name: "Gold".into(),
        category: "Bulk".into(),
        price: huge,
        stock: 5,
    };
    let platinum = Product {
        id: Uuid::new_v4(),
        name: "Platinum".into(),
        ..gold.clone()
    };
    let mut catalog = CatalogStore::with_products(vec![gold.clone(), platinum.clone()]);
    let mut ledger = SalesLedger::default();
    let mut cart = CartStore::new();
    cart.add(&gold);
    cart.add(&platinum);

    let err = place_order(&mut cart, &mut catalog, &mut ledger, "cash", Utc::now()).unwrap_err();

    assert_eq!(err, CheckoutError::TotalOutOfRange);
    assert_eq!(catalog.get(gold.id).unwrap().stock, 5);
    assert_eq!(catalog.get(platinum.id).unwrap().stock, 5);
    assert!(ledger.is_empty());
    assert_eq!(cart.item_count(), 2);
}

async fn login_as(state: &AppState, user: User) -> AuthUser {
    let mut shop = state.shop.lock().await;
    let session_id = shop.sessions.open(user.clone());
    AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
        session_id,
    }
}

fn admin() -> User {
    User {
        id: BOOTSTRAP_ADMIN_ID,
        username: "admin".into(),
        role: Role::Admin,
    }
}

// Integration flow through the services: fill cart -> checkout -> receipt, then admin restocks.
#[tokio::test]
async fn cart_checkout_and_receipt_flow() -> anyhow::Result<()> {
    let state = AppState::bootstrap(AppConfig::for_tests(), None).await?;
    let shopkeeper = login_as(
        &state,
        User {
            id: Uuid::new_v4(),
            username: "till-1".into(),
            role: Role::Shopkeeper,
        },
    )
    .await;
    let apple_id = apple(&state.shop.lock().await.catalog).id;

    for _ in 0..3 {
        cart_service::add_to_cart(&state, &shopkeeper, AddToCartRequest { product_id: apple_id })
            .await?;
    }
    let cart = cart_service::set_quantity(
        &state,
        &shopkeeper,
        apple_id,
        UpdateCartQuantityRequest { quantity: 2 },
    )
    .await?;
    assert_eq!(cart.data.unwrap().total, Decimal::from(2000));

    let checkout = checkout_service::checkout(
        &state,
        &shopkeeper,
        CheckoutRequest {
            payment_method: "cash".into(),
        },
    )
    .await?;
    let checkout = checkout.data.unwrap();
    assert_eq!(checkout.sale.total, Decimal::from(2000));
    assert_eq!(
        checkout.receipt_url,
        format!("/api/sales/{}/receipt", checkout.sale.id)
    );

    let cart = cart_service::view_cart(&state, &shopkeeper).await?;
    assert_eq!(cart.data.unwrap().item_count, 0);

    let product = product_service::get_product(&state, apple_id).await?;
    assert_eq!(product.data.unwrap().stock, 98);

    let receipt = checkout_service::receipt(&state, checkout.sale.id).await?;
    assert_eq!(receipt.content_type, "application/pdf");
    assert!(receipt.bytes.starts_with(b"%PDF"));

    // shopkeepers cannot restock
    let denied = product_service::set_stock(
        &state,
        &shopkeeper,
        apple_id,
        UpdateStockRequest { stock: 500 },
    )
    .await;
    assert!(denied.is_err());

    let admin = login_as(&state, admin()).await;
    let restocked =
        product_service::set_stock(&state, &admin, apple_id, UpdateStockRequest { stock: 500 })
            .await?;
    assert_eq!(restocked.data.unwrap().stock, 500);

    Ok(())
}

#[tokio::test]
async fn checkout_rejects_oversell_across_sessions() -> anyhow::Result<()> {
    let state = AppState::bootstrap(AppConfig::for_tests(), None).await?;
    let first = login_as(&state, admin()).await;
    let second = login_as(&state, admin()).await;

    let milk_id = {
        let shop = state.shop.lock().await;
        let milk = shop.catalog.search("milk")[0].clone();
        milk.id
    };
    let admin_user = login_as(&state, admin()).await;
    product_service::set_stock(&state, &admin_user, milk_id, UpdateStockRequest { stock: 1 })
        .await?;

    for till in [&first, &second] {
        cart_service::add_to_cart(&state, till, AddToCartRequest { product_id: milk_id }).await?;
    }

    checkout_service::checkout(
        &state,
        &first,
        CheckoutRequest {
            payment_method: "cash".into(),
        },
    )
    .await?;
    let second_attempt = checkout_service::checkout(
        &state,
        &second,
        CheckoutRequest {
            payment_method: "cash".into(),
        },
    )
    .await;

    let err = second_attempt.expect_err("second till must not oversell");
    assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);

    let shop = state.shop.lock().await;
    assert_eq!(shop.catalog.get(milk_id).unwrap().stock, 0);
    assert_eq!(shop.ledger.len(), 1);
    Ok(())
}
