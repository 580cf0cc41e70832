use axum::body::Body;
use axum::http::{Request, StatusCode};
use rusty_book_catalog::adapters::mock::BookRepository as MockBookRepository;
use rusty_book_catalog::api::handlers::AppState;
use rusty_book_catalog::api::router::create_router;
use rusty_book_catalog::application::catalog::ServiceDependencies;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// E2Eテスト用のアプリケーションセットアップ
///
/// インメモリリポジトリと実際のAPIルーターを使用する。
/// 各テストは独立したリポジトリを持つため、テスト間の干渉はない。
fn setup_app() -> axum::Router {
    let book_repository = Arc::new(MockBookRepository::new());

    let service_deps = ServiceDependencies { book_repository };

    let app_state = Arc::new(AppState { service_deps });

    create_router(app_state)
}

/// JSONボディ付きのリクエストを送信する
async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: &Value,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// ボディなしのリクエストを送信する
async fn send(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

fn book_body(title: &str, isbn: &str) -> Value {
    json!({
        "title": title,
        "author": "Test Author",
        "isbn": isbn,
    })
}

/// 書籍を1冊登録してIDを返す
async fn create_book(app: &axum::Router, title: &str, isbn: &str) -> i64 {
    let (status, body) = send_json(app, "POST", "/books", &book_body(title, isbn)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_health_check() {
    let app = setup_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_e2e_full_book_lifecycle() {
    let app = setup_app();

    // Step 1: 書籍登録（POST /books）
    let (status, body) =
        send_json(&app, "POST", "/books", &book_body("The Rust Book", "9781718503106")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "available");
    assert_eq!(body["isbn"], "9781718503106");
    let id = body["id"].as_i64().unwrap();
    assert!(id > 0);

    // Step 2: 貸出（POST /books/:id/borrow）
    let (status, body) = send(&app, "POST", &format!("/books/{}/borrow", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "borrowed");

    // Step 3: 返却（POST /books/:id/return）
    let (status, body) = send(&app, "POST", &format!("/books/{}/return", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");

    // Step 4: 削除（DELETE /books/:id）
    let (status, _) = send(&app, "DELETE", &format!("/books/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Step 5: 削除後は404
    let (status, body) = send(&app, "GET", &format!("/books/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOK_NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_list_books_with_statistics() {
    let app = setup_app();

    let id_a = create_book(&app, "Book A", "111-1111111111").await;
    create_book(&app, "Book B", "222-2222222222").await;

    let (status, _) = send(&app, "POST", &format!("/books/{}/borrow", id_a)).await;
    assert_eq!(status, StatusCode::OK);

    // フィルタなし: 全件と全体の集計
    let (status, body) = send(&app, "GET", "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 2);
    assert_eq!(body["statistics"]["available"], 1);
    assert_eq!(body["statistics"]["borrowed"], 1);
    assert_eq!(body["statistics"]["total"], 2);

    // フィルタあり: 集計はフィルタ後の集合を反映する
    let (status, body) = send(&app, "GET", "/books?status=borrowed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["id"].as_i64().unwrap(), id_a);
    assert_eq!(body["statistics"]["available"], 0);
    assert_eq!(body["statistics"]["borrowed"], 1);
    assert_eq!(body["statistics"]["total"], 1);
}

#[tokio::test]
async fn test_e2e_empty_list_has_zero_statistics() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/books").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 0);
    assert_eq!(body["statistics"]["available"], 0);
    assert_eq!(body["statistics"]["borrowed"], 0);
    assert_eq!(body["statistics"]["total"], 0);
}

#[tokio::test]
async fn test_e2e_update_borrowed_book() {
    let app = setup_app();

    let id = create_book(&app, "Old Title", "9780321146533").await;
    send(&app, "POST", &format!("/books/{}/borrow", id)).await;

    // 貸出中でも内容の更新は許可され、ステータスは変わらない
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/books/{}", id),
        &book_body("New Title", "9780321146533"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New Title");
    assert_eq!(body["status"], "borrowed");
}

// ============================================================================
// E2Eテスト: エラーとステータスコードのマッピング
// ============================================================================

#[tokio::test]
async fn test_e2e_validation_errors_map_to_400() {
    let app = setup_app();

    // 必須フィールド欠落
    let (status, body) = send_json(
        &app,
        "POST",
        "/books",
        &json!({"title": "", "author": "a", "isbn": "9780321146533"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    // ISBN書式不正
    let (status, body) = send_json(
        &app,
        "POST",
        "/books",
        &json!({"title": "t", "author": "a", "isbn": "bogus"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ISBN");

    // ID不正
    let (status, body) = send(&app, "GET", "/books/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ID");
}

#[tokio::test]
async fn test_e2e_duplicate_isbn_maps_to_409() {
    let app = setup_app();

    create_book(&app, "Book A", "111-1111111111").await;

    let (status, body) =
        send_json(&app, "POST", "/books", &book_body("Book B", "111-1111111111")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ISBN_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_e2e_lifecycle_conflicts_map_to_409() {
    let app = setup_app();

    let id = create_book(&app, "Book A", "9780321146533").await;

    // 貸出中でない書籍の返却
    let (status, body) = send(&app, "POST", &format!("/books/{}/return", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_BORROWED");

    send(&app, "POST", &format!("/books/{}/borrow", id)).await;

    // 二重貸出
    let (status, body) = send(&app, "POST", &format!("/books/{}/borrow", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_BORROWED");

    // 貸出中の書籍の削除
    let (status, body) = send(&app, "DELETE", &format!("/books/{}", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CANNOT_DELETE_BORROWED");
}

#[tokio::test]
async fn test_e2e_missing_book_maps_to_404() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/books/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOK_NOT_FOUND");

    let (status, _) = send(&app, "POST", "/books/999/borrow").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/books/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_invalid_status_filter_maps_to_400() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/books?status=lost").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}
