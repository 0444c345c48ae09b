//! 评价审核与评分重算集成测试

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

use powercore::auth::JwtConfig;
use powercore::db::models::{Product, ProductCreate, ReviewCreate, ReviewUpdate};
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

async fn seed_product(state: &ServerState) -> Product {
    state
        .products
        .create_product(ProductCreate {
            name: "EcoFlow River 2".to_string(),
            description: Some("Портативна електростанція".to_string()),
            price: 9999.0,
            image_url: None,
            capacity: Some(256000),
            power: Some(300),
            battery_type: Some("LiFePO4".to_string()),
            brand: None,
            category: Some("Power Station".to_string()),
            weight: Some(3.5),
            dimensions: None,
            stock: 10,
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

fn review_payload(product_id: &str, rating: f64) -> ReviewCreate {
    ReviewCreate {
        product_id: product_id.to_string(),
        rating,
        comment: "Чудова якість, тримає заряд довго".to_string(),
        user_name: Some("Анонім".to_string()),
    }
}

#[tokio::test]
async fn test_moderation_drives_rating_recompute() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);

    let mut review_ids = Vec::new();
    for rating in [5.0, 4.0, 3.0] {
        let review = state
            .reviews
            .create_review(review_payload(&pid, rating), None)
            .await
            .expect("create review");
        review_ids.push(review.id.expect("review id").to_raw());
    }

    // 未批准的评价不计入评分
    let fresh = state.products.get_product(&pid).await.expect("product");
    assert_eq!(fresh.rating, 0.0);
    assert_eq!(fresh.rating_count, 0);

    // 全部批准 → mean(5,4,3) = 4.0
    for rid in &review_ids {
        state
            .reviews
            .moderate_review(rid, true, None)
            .await
            .expect("approve");
    }
    let approved = state.products.get_product(&pid).await.expect("product");
    assert_eq!(approved.rating, 4.0);
    assert_eq!(approved.rating_count, 3);

    // 驳回 3 星那条 → mean(5,4) = 4.5
    state
        .reviews
        .moderate_review(&review_ids[2], false, Some("спам".to_string()))
        .await
        .expect("reject");
    let narrowed = state.products.get_product(&pid).await.expect("product");
    assert_eq!(narrowed.rating, 4.5);
    assert_eq!(narrowed.rating_count, 2);

    // 重复裁决是幂等的
    state
        .reviews
        .moderate_review(&review_ids[2], false, Some("спам".to_string()))
        .await
        .expect("reject again");
    let same = state.products.get_product(&pid).await.expect("product");
    assert_eq!(same.rating, 4.5);
    assert_eq!(same.rating_count, 2);

    // 全部驳回 → 回到 (0.0, 0)
    for rid in &review_ids {
        state
            .reviews
            .moderate_review(rid, false, None)
            .await
            .expect("reject all");
    }
    let empty = state.products.get_product(&pid).await.expect("product");
    assert_eq!(empty.rating, 0.0);
    assert_eq!(empty.rating_count, 0);
}

#[tokio::test]
async fn test_duplicate_review_constraint_authenticated_only() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);

    state
        .reviews
        .create_review(review_payload(&pid, 5.0), Some("users:bob".to_string()))
        .await
        .expect("first review");

    let err = state
        .reviews
        .create_review(review_payload(&pid, 4.0), Some("users:bob".to_string()))
        .await
        .expect_err("duplicate must fail");
    assert!(matches!(err, AppError::Validation(_)));

    // 匿名提交不受一人一评约束
    state
        .reviews
        .create_review(review_payload(&pid, 4.0), None)
        .await
        .expect("anonymous #1");
    state
        .reviews
        .create_review(review_payload(&pid, 3.0), None)
        .await
        .expect("anonymous #2");
}

#[tokio::test]
async fn test_review_product_key_normalized_across_id_forms() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);
    let bare = pid.strip_prefix("products:").expect("prefixed id").to_string();

    state
        .reviews
        .create_review(review_payload(&pid, 5.0), Some("users:bob".to_string()))
        .await
        .expect("first review");

    // 同一用户换用裸 id 写法，仍然撞一人一评约束
    let err = state
        .reviews
        .create_review(review_payload(&bare, 4.0), Some("users:bob".to_string()))
        .await
        .expect_err("bare-id duplicate must fail");
    assert!(matches!(err, AppError::Validation(_)));

    // 裸 id 创建的评价落库为规范形态，与前缀形态同键
    let anon = state
        .reviews
        .create_review(review_payload(&bare, 3.0), None)
        .await
        .expect("anonymous via bare id");
    assert_eq!(anon.product_id, pid);

    let bob_id = state
        .reviews
        .get_product_reviews(&pid, false, 50)
        .await
        .expect("list")
        .into_iter()
        .find(|r| r.user_id.as_deref() == Some("users:bob"))
        .and_then(|r| r.id)
        .expect("bob review id")
        .to_raw();
    let anon_id = anon.id.expect("anon review id").to_raw();

    state
        .reviews
        .moderate_review(&bob_id, true, None)
        .await
        .expect("approve bob");
    state
        .reviews
        .moderate_review(&anon_id, true, None)
        .await
        .expect("approve anon");

    // 两种 id 写法的评价聚合到同一商品：mean(5,3) = 4.0
    let fresh = state.products.get_product(&pid).await.expect("product");
    assert_eq!(fresh.rating, 4.0);
    assert_eq!(fresh.rating_count, 2);

    // 裸 id 查询也能看到两条
    let via_bare = state
        .reviews
        .get_product_reviews(&bare, false, 50)
        .await
        .expect("list via bare id");
    assert_eq!(via_bare.len(), 2);
}

#[tokio::test]
async fn test_anonymous_review_requires_display_name() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);

    let mut nameless = review_payload(&pid, 4.0);
    nameless.user_name = None;
    let err = state
        .reviews
        .create_review(nameless, None)
        .await
        .expect_err("anonymous without name must fail");
    assert!(matches!(err, AppError::Validation(_)));

    // 认证用户不需要显示名称
    let mut authed = review_payload(&pid, 4.0);
    authed.user_name = None;
    state
        .reviews
        .create_review(authed, Some("users:carol".to_string()))
        .await
        .expect("authenticated without name");
}

#[tokio::test]
async fn test_review_for_missing_product() {
    let state = test_state().await;

    let err = state
        .reviews
        .create_review(review_payload("products:ghost", 5.0), None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_review_owner_only() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);

    let review = state
        .reviews
        .create_review(review_payload(&pid, 5.0), Some("users:bob".to_string()))
        .await
        .expect("create");
    let rid = review.id.expect("review id").to_raw();

    let err = state
        .reviews
        .update_review(
            &rid,
            ReviewUpdate {
                rating: Some(1.0),
                comment: None,
                is_approved: None,
            },
            "users:mallory",
        )
        .await
        .expect_err("stranger must be rejected");
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated = state
        .reviews
        .update_review(
            &rid,
            ReviewUpdate {
                rating: Some(4.0),
                comment: None,
                is_approved: None,
            },
            "users:bob",
        )
        .await
        .expect("owner update");
    assert_eq!(updated.rating, 4.0);
}

#[tokio::test]
async fn test_delete_review_recomputes_rating() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);

    let kept = state
        .reviews
        .create_review(review_payload(&pid, 5.0), None)
        .await
        .expect("review 1");
    let doomed = state
        .reviews
        .create_review(review_payload(&pid, 1.0), None)
        .await
        .expect("review 2");
    let kept_id = kept.id.expect("id").to_raw();
    let doomed_id = doomed.id.expect("id").to_raw();

    state
        .reviews
        .moderate_review(&kept_id, true, None)
        .await
        .expect("approve");
    state
        .reviews
        .moderate_review(&doomed_id, true, None)
        .await
        .expect("approve");

    let both = state.products.get_product(&pid).await.expect("product");
    assert_eq!(both.rating, 3.0);
    assert_eq!(both.rating_count, 2);

    // 管理员删除后评分重算
    state
        .reviews
        .delete_review(&doomed_id, "users:admin", true)
        .await
        .expect("delete");

    let after = state.products.get_product(&pid).await.expect("product");
    assert_eq!(after.rating, 5.0);
    assert_eq!(after.rating_count, 1);
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let state = test_state().await;
    let product = seed_product(&state).await;
    let pid = product_id(&product);

    let review = state
        .reviews
        .create_review(review_payload(&pid, 4.0), None)
        .await
        .expect("create");
    let rid = review.id.expect("id").to_raw();
    state
        .reviews
        .moderate_review(&rid, true, None)
        .await
        .expect("approve");

    let first = state
        .reviews
        .recompute_product_rating(&pid)
        .await
        .expect("recompute #1");
    let second = state
        .reviews
        .recompute_product_rating(&pid)
        .await
        .expect("recompute #2");
    assert_eq!(first, second);
    assert_eq!(first, (4.0, 1));
}

#[tokio::test]
async fn test_rate_product_fold() {
    let state = test_state().await;
    let product = state
        .products
        .create_product(ProductCreate {
            name: "Rated bank".to_string(),
            description: None,
            price: 500.0,
            image_url: None,
            capacity: Some(10000),
            power: Some(18),
            battery_type: None,
            brand: None,
            category: Some("Power Bank".to_string()),
            weight: None,
            dimensions: None,
            stock: 5,
            is_active: true,
            rating: 4.0,
            rating_count: 1,
        })
        .await
        .expect("seed");
    let pid = product.id.as_ref().expect("id").to_raw();

    // (4.0*1 + 2.0) / 2 = 3.0
    let rated = state.products.rate_product(&pid, 2.0).await.expect("rate");
    assert_eq!(rated.rating, 3.0);
    assert_eq!(rated.rating_count, 2);

    let err = state
        .products
        .rate_product(&pid, 9.0)
        .await
        .expect_err("out of range");
    assert!(matches!(err, AppError::Validation(_)));
}
