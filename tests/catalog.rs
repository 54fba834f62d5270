use serde_json::json;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use memoria::catalog::ProductCatalog;
use memoria::config::CatalogConfig;

fn catalog_for(server: &MockServer) -> ProductCatalog {
    ProductCatalog::new(CatalogConfig {
        enabled: true,
        timeout_seconds: 2,
        food_base: server.uri(),
        book_base: server.uri(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_food_hits_skip_book_lookup_and_pad_with_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .and(query_param("search_terms", "peanut butter"))
        .and(query_param("json", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                { "product_name": "Crunchy Peanut Butter", "image_url": "https://img/1.jpg", "code": "111" },
                { "product_name": "", "code": "222" },
                { "product_name": "Third", "code": "333" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let recommendations = catalog_for(&server)
        .recommendations("Peanut Butter!")
        .await;

    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0].title, "Crunchy Peanut Butter");
    assert_eq!(recommendations[0].price, "Price varies by store");
    assert_eq!(recommendations[0].url, format!("{}/product/111", server.uri()));
    assert_eq!(recommendations[1].title, "Peanut Butter");
    assert!(recommendations[1].image.starts_with("https://via.placeholder.com/150"));
    assert_eq!(recommendations[2].title, "Peanut Butter - Google Shopping");
}

#[tokio::test]
async fn test_book_lookup_fills_after_food_miss() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "dune"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [
                { "title": "Dune", "cover_i": 42, "key": "/works/OL1W" },
                { "title": "Dune Messiah", "key": "/works/OL2W" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recommendations = catalog_for(&server).recommendations("dune").await;

    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0].title, "Dune");
    assert_eq!(
        recommendations[0].image,
        "https://covers.openlibrary.org/b/id/42-L.jpg"
    );
    assert_eq!(recommendations[0].url, format!("{}/works/OL1W", server.uri()));
    assert!(recommendations[1].image.contains("Book"));
    assert_eq!(recommendations[2].title, "Dune - Google Shopping");
}

#[tokio::test]
async fn test_catalog_failures_fall_back_to_shopping_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let recommendations = catalog_for(&server).recommendations("kettle").await;

    let titles: Vec<&str> = recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Kettle - Google Shopping",
            "Kettle - Amazon",
            "Kettle - eBay"
        ]
    );
    assert!(recommendations.iter().all(|r| r.price == "Various prices"));
}
