//! Product recommendations from public catalogs
//!
//! A product name is looked up in a food catalog and then a book catalog,
//! each with a short fixed timeout. Whatever those return is padded with
//! generic shopping search links so a lookup always yields between one and
//! three entries.

use crate::config::CatalogConfig;
use crate::error::{MemoriaError, Result};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

const MAX_RESULTS: usize = 3;
const PER_CATALOG: usize = 2;
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";
const BOOK_COVER_BASE: &str = "https://covers.openlibrary.org/b/id";

/// One recommended product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    pub title: String,
    pub price: String,
    pub image: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct FoodSearch {
    #[serde(default)]
    products: Vec<FoodProduct>,
}

#[derive(Debug, Deserialize)]
struct FoodProduct {
    product_name: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct BookSearch {
    #[serde(default)]
    docs: Vec<BookDoc>,
}

#[derive(Debug, Deserialize)]
struct BookDoc {
    title: Option<String>,
    cover_i: Option<i64>,
    #[serde(default)]
    key: String,
}

/// Catalog lookups for product recommendations
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    client: Client,
    config: CatalogConfig,
}

impl ProductCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("memoria/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                MemoriaError::Collaborator(format!("Failed to create catalog client: {}", e))
            })?;
        Ok(Self { client, config })
    }

    /// Recommend up to three products for `product_name`
    ///
    /// Returns an empty list only when the name has no usable characters.
    pub async fn recommendations(&self, product_name: &str) -> Vec<ProductRecommendation> {
        let cleaned = clean_product_name(product_name);
        if cleaned.trim().is_empty() {
            return Vec::new();
        }

        let mut products = Vec::new();
        if self.config.enabled {
            match self.food_products(&cleaned).await {
                Ok(found) => products.extend(found),
                Err(e) => tracing::warn!("Food catalog lookup failed: {}", e),
            }

            if products.len() < PER_CATALOG {
                match self.book_products(&cleaned).await {
                    Ok(found) => products.extend(found),
                    Err(e) => tracing::warn!("Book catalog lookup failed: {}", e),
                }
            }
        }

        if products.len() < MAX_RESULTS {
            let missing = MAX_RESULTS - products.len();
            products.extend(shopping_links(&cleaned).into_iter().take(missing));
        }
        products.truncate(MAX_RESULTS);
        products
    }

    async fn food_products(&self, cleaned: &str) -> Result<Vec<ProductRecommendation>> {
        let base = self.config.food_base.trim_end_matches('/');
        let url = Url::parse_with_params(
            &format!("{}/cgi/search.pl", base),
            &[
                ("search_terms", cleaned),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
            ],
        )?;

        let search: FoodSearch = self.get_json(url).await?;
        Ok(search
            .products
            .into_iter()
            .take(PER_CATALOG)
            .map(|item| ProductRecommendation {
                title: item
                    .product_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| title_case(cleaned)),
                price: "Price varies by store".to_string(),
                image: item
                    .image_url
                    .unwrap_or_else(|| placeholder_image(cleaned)),
                url: format!("{}/product/{}", base, item.code),
            })
            .collect())
    }

    async fn book_products(&self, cleaned: &str) -> Result<Vec<ProductRecommendation>> {
        let base = self.config.book_base.trim_end_matches('/');
        let url = Url::parse_with_params(&format!("{}/search.json", base), &[("q", cleaned)])?;

        let search: BookSearch = self.get_json(url).await?;
        Ok(search
            .docs
            .into_iter()
            .take(PER_CATALOG)
            .filter_map(|doc| {
                let title = doc.title?;
                let image = match doc.cover_i {
                    Some(id) if id != 0 => format!("{}/{}-L.jpg", BOOK_COVER_BASE, id),
                    _ => placeholder_image("Book"),
                };
                Some(ProductRecommendation {
                    title,
                    price: "Price varies by store".to_string(),
                    image,
                    url: format!("{}{}", base, doc.key),
                })
            })
            .collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("Catalog request: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(
                MemoriaError::Collaborator(format!("Catalog returned status {}", status)).into(),
            );
        }
        Ok(response.json().await?)
    }
}

/// Lower-case and keep only `[a-z0-9 ]`
pub fn clean_product_name(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9 ]").expect("static regex"));
    re.replace_all(name.trim().to_lowercase().as_str(), "")
        .into_owned()
}

/// Google Shopping, Amazon, and eBay search links
pub fn shopping_links(cleaned: &str) -> Vec<ProductRecommendation> {
    let title = title_case(cleaned);
    let stores = [
        (
            "Google Shopping",
            "https://www.google.com/search",
            vec![("q", cleaned), ("tbm", "shop")],
        ),
        ("Amazon", "https://www.amazon.com/s", vec![("k", cleaned)]),
        ("eBay", "https://www.ebay.com/sch/i.html", vec![("_nkw", cleaned)]),
    ];

    stores
        .into_iter()
        .map(|(store, base, params)| ProductRecommendation {
            title: format!("{} - {}", title, store),
            price: "Various prices".to_string(),
            image: placeholder_image(store),
            url: Url::parse_with_params(base, &params)
                .map(String::from)
                .unwrap_or_else(|_| base.to_string()),
        })
        .collect()
}

fn placeholder_image(text: &str) -> String {
    Url::parse_with_params(PLACEHOLDER_IMAGE, &[("text", text)])
        .map(String::from)
        .unwrap_or_else(|_| PLACEHOLDER_IMAGE.to_string())
}

/// Upper-case the first letter of every word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_catalog() -> ProductCatalog {
        ProductCatalog::new(CatalogConfig {
            enabled: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_clean_product_name() {
        assert_eq!(clean_product_name("  Running Shoes!! "), "running shoes");
        assert_eq!(clean_product_name("Café-au-lait"), "caflait");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("running shoes"), "Running Shoes");
        assert_eq!(title_case("4k tv"), "4K Tv");
    }

    #[test]
    fn test_shopping_links_shape() {
        let links = shopping_links("running shoes");
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].title, "Running Shoes - Google Shopping");
        assert!(links[0].url.starts_with("https://www.google.com/search?q=running+shoes"));
        assert!(links[0].url.ends_with("tbm=shop"));
        assert_eq!(links[1].url, "https://www.amazon.com/s?k=running+shoes");
        assert_eq!(links[2].title, "Running Shoes - eBay");
        assert_eq!(links[2].price, "Various prices");
    }

    #[tokio::test]
    async fn test_offline_catalog_returns_three_links() {
        let recs = offline_catalog().recommendations("Running Shoes").await;
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.price == "Various prices"));
    }

    #[tokio::test]
    async fn test_unusable_name_returns_nothing() {
        assert!(offline_catalog().recommendations("?!").await.is_empty());
    }
}
