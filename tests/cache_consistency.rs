use std::sync::Arc;

use httpmock::MockServer;
use recipebox::cache::{CacheConfig, QueryCache, QueryKey, QueryOptions, QueryStatus};
use recipebox::domain::ratings::Stars;
use recipebox::infra::http::HttpRecipeApi;
use recipebox::infra::token::{MemoryTokenHolder, TokenHolder};
use recipebox_api_types::CreateRecipeRequest;
use serde_json::json;

const SOUP: &str = r#"{"id":1,"title":"Soup","ingredients":["Water"],"instructions":"Boil.","user":{"id":1,"email":"cook@example.com"}}"#;
const BREAD: &str = r#"{"id":2,"title":"Bread","ingredients":["Flour"],"instructions":"Bake.","user":{"id":1,"email":"cook@example.com"}}"#;

fn cache_for(server: &MockServer, tokens: Arc<dyn TokenHolder>) -> QueryCache {
    let api = HttpRecipeApi::new(&server.base_url(), tokens).expect("api");
    QueryCache::new(Arc::new(api), CacheConfig::default())
}

fn signed_in() -> Arc<dyn TokenHolder> {
    Arc::new(MemoryTokenHolder::with_token("token-1"))
}

#[tokio::test]
async fn concurrent_queries_issue_one_request() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method("GET").path("/recipes");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!("[{SOUP}]"));
    });
    let cache = cache_for(&server, signed_in());

    let (a, b, c, d, e) = tokio::join!(
        cache.all_recipes(QueryOptions::default()),
        cache.all_recipes(QueryOptions::default()),
        cache.all_recipes(QueryOptions::default()),
        cache.all_recipes(QueryOptions::default()),
        cache.all_recipes(QueryOptions::default()),
    );

    list.assert_calls(1);
    for other in [&b, &c, &d, &e] {
        assert_eq!(&a, other);
    }
    assert_eq!(a.data.map(|recipes| recipes.len()), Some(1));
}

#[tokio::test]
async fn create_recipe_refetches_the_list() {
    let server = MockServer::start();
    let mut before = server.mock(|when, then| {
        when.method("GET").path("/recipes");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!("[{SOUP}]"));
    });
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/recipes")
            .json_body(json!({
                "title": "Bread",
                "ingredients": ["Flour"],
                "instructions": "Bake."
            }));
        then.status(201)
            .header("content-type", "application/json")
            .body(BREAD);
    });
    let cache = cache_for(&server, signed_in());

    cache.all_recipes(QueryOptions::default()).await;
    before.assert_calls(1);
    before.delete();

    let after = server.mock(|when, then| {
        when.method("GET").path("/recipes");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!("[{SOUP},{BREAD}]"));
    });

    cache
        .create_recipe(&CreateRecipeRequest {
            title: "Bread".into(),
            description: None,
            ingredients: vec!["Flour".into()],
            instructions: "Bake.".into(),
        })
        .await
        .expect("create succeeds");
    create.assert();
    assert_eq!(cache.status(QueryKey::AllRecipes), Some(QueryStatus::Stale));

    let titles: Vec<String> = cache
        .all_recipes(QueryOptions::default())
        .await
        .data
        .expect("list")
        .into_iter()
        .map(|recipe| recipe.title)
        .collect();
    after.assert_calls(1);
    assert_eq!(titles, vec!["Soup", "Bread"]);
}

#[tokio::test]
async fn forbidden_delete_invalidates_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/recipes");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!("[{SOUP}]"));
    });
    server.mock(|when, then| {
        when.method("GET").path("/recipes/1");
        then.status(200)
            .header("content-type", "application/json")
            .body(SOUP);
    });
    server.mock(|when, then| {
        when.method("DELETE").path("/recipes/1");
        then.status(403)
            .header("content-type", "application/json")
            .body(r#"{"statusCode":403,"message":"Forbidden"}"#);
    });
    let cache = cache_for(&server, signed_in());
    cache.all_recipes(QueryOptions::default()).await;
    cache.recipe(1, QueryOptions::default()).await;

    let err = cache.delete_recipe(1).await.expect_err("forbidden");

    assert_eq!(err.status(), Some(403));
    assert_eq!(err.user_message(), "Forbidden");
    assert_eq!(cache.status(QueryKey::AllRecipes), Some(QueryStatus::Ready));
    assert_eq!(cache.status(QueryKey::RecipeById(1)), Some(QueryStatus::Ready));
}

#[tokio::test]
async fn upsert_then_query_returns_one_rating_for_the_caller() {
    let server = MockServer::start();
    let mut empty = server.mock(|when, then| {
        when.method("GET").path("/ratings/recipe/7");
        then.status(200)
            .header("content-type", "application/json")
            .body("[]");
    });
    server.mock(|when, then| {
        when.method("POST")
            .path("/ratings")
            .json_body(json!({"recipeId": 7, "stars": 4}));
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"id":3,"recipeId":7,"userId":1,"stars":4}"#);
    });
    let cache = cache_for(&server, signed_in());
    cache.ratings(7, QueryOptions::default()).await;
    empty.delete();
    server.mock(|when, then| {
        when.method("GET").path("/ratings/recipe/7");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":3,"recipeId":7,"userId":1,"stars":4}]"#);
    });

    let stars = Stars::new(4).expect("valid stars");
    cache.upsert_rating(7, stars).await.expect("first upsert");
    cache.upsert_rating(7, stars).await.expect("repeat upsert");

    let ratings = cache
        .ratings(7, QueryOptions::default())
        .await
        .data
        .expect("ratings");
    assert_eq!(ratings.len(), 1);
    assert_eq!((ratings[0].user_id, ratings[0].stars), (1, 4));
}

#[tokio::test]
async fn credential_is_visible_to_the_next_request() {
    let server = MockServer::start();
    let mine = server.mock(|when, then| {
        when.method("GET")
            .path("/recipes/mine")
            .header("authorization", "Bearer fresh");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!("[{SOUP}]"));
    });
    let tokens: Arc<dyn TokenHolder> = Arc::new(MemoryTokenHolder::new());
    let cache = cache_for(&server, Arc::clone(&tokens));

    tokens.set("fresh").expect("set token");
    let snapshot = cache.my_recipes(QueryOptions::default()).await;

    mine.assert();
    assert_eq!(snapshot.status, QueryStatus::Ready);
}
