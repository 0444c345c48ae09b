//! 订单流程集成测试
//!
//! 使用内存引擎跑完整的下单/结算路径。

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

use powercore::auth::JwtConfig;
use powercore::db::models::{
    OrderAddress, OrderCreate, OrderItemInput, OrderStatus, OrderStatusUpdate, PaymentStatus,
    Product, ProductCreate,
};
use powercore::{AppError, Config, ServerState};

async fn test_state() -> ServerState {
    let db = Surreal::new::<Mem>(()).await.expect("mem db");
    db.use_ns("powercore_test")
        .use_db("powercore_test")
        .await
        .expect("ns/db");
    powercore::db::define_tables(&db).await.expect("indexes");

    let config = Config {
        data_dir: "./target/test-data".to_string(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-32-bytes!!".to_string(),
            access_minutes: 30,
            refresh_days: 7,
            issuer: "powercore-test".to_string(),
        },
        cors_origins: vec!["*".to_string()],
        log_level: "warn".to_string(),
        environment: "test".to_string(),
        request_timeout_ms: 30000,
    };

    ServerState::with_db(config, db)
}

async fn seed_product(state: &ServerState, name: &str, price: f64, stock: i64) -> Product {
    state
        .products
        .create_product(ProductCreate {
            name: name.to_string(),
            description: Some("Test power bank".to_string()),
            price,
            image_url: None,
            capacity: Some(20000),
            power: Some(22),
            battery_type: Some("Li-Po".to_string()),
            brand: None,
            category: Some("Power Bank".to_string()),
            weight: None,
            dimensions: None,
            stock,
            is_active: true,
            rating: 0.0,
            rating_count: 0,
        })
        .await
        .expect("seed product")
}

fn product_id(product: &Product) -> String {
    product.id.as_ref().expect("product id").to_raw()
}

fn order_payload(items: Vec<OrderItemInput>, delivery_method: &str) -> OrderCreate {
    OrderCreate {
        user_id: None,
        items,
        address: OrderAddress {
            street: "вул. Хрещатик, 1".to_string(),
            city: "Київ".to_string(),
            postal_code: "01001".to_string(),
            country: "Україна".to_string(),
            phone: "+380501234567".to_string(),
        },
        email: "buyer@example.com".to_string(),
        notes: None,
        payment_method: "card".to_string(),
        delivery_method: delivery_method.to_string(),
    }
}

#[test]
fn test_order_payload_wire_defaults() {
    let payload = serde_json::json!({
        "items": [{ "product_id": "products:abc", "quantity": 1, "price": 100.0 }],
        "address": {
            "street": "вул. Соборна, 5",
            "city": "Львів",
            "postal_code": "79000",
            "phone": "+380671112233"
        },
        "email": "buyer@example.com"
    });

    let parsed: OrderCreate = serde_json::from_value(payload).expect("deserialize");
    assert_eq!(parsed.address.country, "Україна");
    assert_eq!(parsed.payment_method, "card");
    assert_eq!(parsed.delivery_method, "courier");
    assert!(parsed.user_id.is_none());
    assert!(parsed.notes.is_none());
}

#[tokio::test]
async fn test_order_totals_identity() {
    let state = test_state().await;
    let product = seed_product(&state, "Anker PowerCore 20k", 1200.0, 10).await;

    let order = state
        .orders
        .create_order(order_payload(
            vec![OrderItemInput {
                product_id: product_id(&product),
                quantity: 2,
                price: 1200.0,
            }],
            "post",
        ))
        .await
        .expect("create order");

    assert_eq!(order.items_total, 2400.0);
    // 小计超过 2000，post 也免运费
    assert_eq!(order.delivery_cost, 0.0);
    assert_eq!(order.total_amount, order.items_total + order.delivery_cost);
    assert_eq!(order.order_status, OrderStatus::New);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.items[0].product_name, "Anker PowerCore 20k");
}

#[tokio::test]
async fn test_order_delivery_cost_below_threshold() {
    let state = test_state().await;
    let product = seed_product(&state, "Mini bank", 500.0, 10).await;

    let order = state
        .orders
        .create_order(order_payload(
            vec![OrderItemInput {
                product_id: product_id(&product),
                quantity: 1,
                price: 500.0,
            }],
            "courier",
        ))
        .await
        .expect("create order");

    assert_eq!(order.delivery_cost, 150.0);
    assert_eq!(order.total_amount, 650.0);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_stock_unchanged() {
    let state = test_state().await;
    let product = seed_product(&state, "Scarce bank", 900.0, 2).await;
    let pid = product_id(&product);

    let err = state
        .orders
        .create_order(order_payload(
            vec![OrderItemInput {
                product_id: pid.clone(),
                quantity: 3,
                price: 900.0,
            }],
            "courier",
        ))
        .await
        .expect_err("must fail");

    match err {
        AppError::Validation(msg) => {
            assert!(msg.contains("available 2"), "message was: {msg}");
            assert!(msg.contains("requested 3"), "message was: {msg}");
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    let reread = state.products.get_product(&pid).await.expect("reread");
    assert_eq!(reread.stock, 2);
}

#[tokio::test]
async fn test_order_missing_product() {
    let state = test_state().await;

    let err = state
        .orders
        .create_order(order_payload(
            vec![OrderItemInput {
                product_id: "products:doesnotexist".to_string(),
                quantity: 1,
                price: 100.0,
            }],
            "courier",
        ))
        .await
        .expect_err("must fail");

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_order_inactive_product_rejected() {
    let state = test_state().await;
    let product = seed_product(&state, "Retired bank", 700.0, 5).await;
    let pid = product_id(&product);

    state.products.delete_product(&pid).await.expect("soft delete");

    let err = state
        .orders
        .create_order(order_payload(
            vec![OrderItemInput {
                product_id: pid,
                quantity: 1,
                price: 700.0,
            }],
            "courier",
        ))
        .await
        .expect_err("must fail");

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_checkout_marks_order_paid() {
    let state = test_state().await;
    let product = seed_product(&state, "Checkout bank", 1000.0, 5).await;

    let result = state
        .orders
        .checkout(order_payload(
            vec![OrderItemInput {
                product_id: product_id(&product),
                quantity: 1,
                price: 1000.0,
            }],
            "pickup",
        ))
        .await
        .expect("checkout");

    assert!(result.payment.success);
    assert!(result.payment.transaction_id.starts_with("txn_"));
    assert_eq!(result.order.payment_status, PaymentStatus::Paid);
    // 支付只动 payment_status，订单状态仍是 new
    assert_eq!(result.order.order_status, OrderStatus::New);
}

#[tokio::test]
async fn test_status_update_partial_and_not_found() {
    let state = test_state().await;
    let product = seed_product(&state, "Status bank", 800.0, 5).await;

    let order = state
        .orders
        .create_order(order_payload(
            vec![OrderItemInput {
                product_id: product_id(&product),
                quantity: 1,
                price: 800.0,
            }],
            "courier",
        ))
        .await
        .expect("create order");
    let oid = order.id.as_ref().expect("order id").to_raw();

    let updated = state
        .orders
        .update_order_status(
            &oid,
            OrderStatusUpdate {
                order_status: Some(OrderStatus::Shipped),
                payment_status: None,
            },
        )
        .await
        .expect("update status");

    assert_eq!(updated.order_status, OrderStatus::Shipped);
    // 未提供的字段保持原值
    assert_eq!(updated.payment_status, PaymentStatus::Pending);

    let err = state
        .orders
        .update_order_status(
            "orders:doesnotexist",
            OrderStatusUpdate {
                order_status: Some(OrderStatus::Cancelled),
                payment_status: None,
            },
        )
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_orders_scoped_to_user() {
    let state = test_state().await;
    let product = seed_product(&state, "Scoped bank", 600.0, 20).await;

    let mut mine = order_payload(
        vec![OrderItemInput {
            product_id: product_id(&product),
            quantity: 1,
            price: 600.0,
        }],
        "courier",
    );
    mine.user_id = Some("users:alice".to_string());
    state.orders.create_order(mine).await.expect("alice order");

    let anonymous = order_payload(
        vec![OrderItemInput {
            product_id: product_id(&product),
            quantity: 1,
            price: 600.0,
        }],
        "courier",
    );
    state
        .orders
        .create_order(anonymous)
        .await
        .expect("guest order");

    let alice_orders = state
        .orders
        .get_orders_by_user("users:alice", 50)
        .await
        .expect("list");
    assert_eq!(alice_orders.len(), 1);

    let all = state.orders.get_all_orders(50).await.expect("all");
    assert_eq!(all.len(), 2);
}
