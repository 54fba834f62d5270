use super::types::{ImageAnalysisRecord, InteractionRecord, ItemLocationRecord, ItemMatch};
use super::MemoryStore;
use crate::config::MatcherConfig;
use crate::matcher::BestMatch;
use crate::retry::{retry, RetryPolicy};
use std::sync::Arc;

/// Number of recent images scanned for product suggestions
const RECENT_PRODUCT_IMAGES: usize = 5;
/// Maximum suggestions returned by [`MemoryRecall::recent_products`]
const RECENT_PRODUCT_LIMIT: usize = 5;

/// Retrying reads and writes over a [`MemoryStore`]
///
/// Reads never fail: once retries are exhausted a lookup reports "no match"
/// and writes report "not stored".
#[derive(Clone)]
pub struct MemoryRecall {
    store: Arc<dyn MemoryStore>,
    retry: RetryPolicy,
    matcher: MatcherConfig,
}

impl MemoryRecall {
    pub fn new(store: Arc<dyn MemoryStore>, retry: RetryPolicy, matcher: MatcherConfig) -> Self {
        Self {
            store,
            retry,
            matcher,
        }
    }

    /// Locate an item by name
    ///
    /// Exact item-location membership first, then a fuzzy scan of recent
    /// item-location records, then a fuzzy scan of recent image labels and
    /// objects.
    pub async fn find_item(&self, user_id: &str, item_name: &str) -> Option<ItemMatch> {
        let term = item_name.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }

        if let Some(record) = self
            .attempt("item membership lookup", || {
                self.store.latest_location_with_item(user_id, &term)
            })
            .await
            .flatten()
        {
            return Some(ItemMatch::Storage(record));
        }

        let window = self.matcher.window;
        let locations: Vec<ItemLocationRecord> = self
            .attempt("item location scan", || {
                self.store.recent_item_locations(user_id, window)
            })
            .await
            .unwrap_or_default();

        let mut best = BestMatch::new();
        for record in &locations {
            best.offer_all(
                record.items.iter().map(String::as_str),
                &term,
                &self.matcher.item_location,
                || record,
            );
        }
        if let Some(record) = best.into_inner() {
            return Some(ItemMatch::Storage(record.clone()));
        }

        let images: Vec<ImageAnalysisRecord> = self
            .attempt("image sighting scan", || self.store.recent_images(user_id, window))
            .await
            .unwrap_or_default();

        let mut best = BestMatch::new();
        for image in &images {
            best.offer_all(
                image.detection_names(),
                &term,
                &self.matcher.image_sighting,
                || image,
            );
        }
        best.into_inner().map(|image| ItemMatch::SeenInImage {
            location: image.location.clone(),
            timestamp: image.timestamp.clone(),
        })
    }

    /// Find the image a product was seen in
    ///
    /// Exact potential-product membership first, then a fuzzy scan of
    /// potential products. An image's labels and objects are only scored
    /// while the best score so far is below the configured threshold.
    pub async fn find_product(
        &self,
        user_id: &str,
        product_name: &str,
    ) -> Option<ImageAnalysisRecord> {
        let term = product_name.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }

        if let Some(image) = self
            .attempt("product membership lookup", || {
                self.store.latest_image_with_product(user_id, &term)
            })
            .await
            .flatten()
        {
            return Some(image);
        }

        let window = self.matcher.window;
        let images = self
            .attempt("product scan", || self.store.recent_images(user_id, window))
            .await
            .unwrap_or_default();

        let mut best = BestMatch::new();
        for image in &images {
            best.offer_all(
                image.potential_products.iter().map(String::as_str),
                &term,
                &self.matcher.product,
                || image,
            );
            if best.score() < self.matcher.label_fallback_below {
                best.offer_all(
                    image.detection_names(),
                    &term,
                    &self.matcher.product_label,
                    || image,
                );
            }
        }
        best.into_inner().cloned()
    }

    /// Most recent image analysis
    pub async fn recent_image(&self, user_id: &str) -> Option<ImageAnalysisRecord> {
        self.attempt("recent image lookup", || self.store.recent_images(user_id, 1))
            .await
            .and_then(|images| images.into_iter().next())
    }

    /// Potential products of the most recent images, de-duplicated in order
    pub async fn recent_products(&self, user_id: &str) -> Vec<String> {
        let images = self
            .attempt("recent products lookup", || {
                self.store.recent_images(user_id, RECENT_PRODUCT_IMAGES)
            })
            .await
            .unwrap_or_default();

        let mut products: Vec<String> = Vec::new();
        for product in images.into_iter().flat_map(|i| i.potential_products) {
            if !products.contains(&product) {
                products.push(product);
            }
        }
        products.truncate(RECENT_PRODUCT_LIMIT);
        products
    }

    /// Persist an image analysis, returning its id when stored
    pub async fn remember_image(
        &self,
        user_id: &str,
        record: &ImageAnalysisRecord,
    ) -> Option<String> {
        let id = self
            .attempt("image write", || self.store.insert_image(user_id, record))
            .await?;
        tracing::info!("Stored image analysis: {}", id);
        Some(id)
    }

    /// Persist an item-location record, returning its id when stored
    pub async fn remember_item_location(
        &self,
        user_id: &str,
        record: &ItemLocationRecord,
    ) -> Option<String> {
        let id = self
            .attempt("item location write", || {
                self.store.insert_item_location(user_id, record)
            })
            .await?;
        tracing::info!("Stored item location: {}", id);
        Some(id)
    }

    /// Persist an interaction, returning its id when stored
    pub async fn log_interaction(
        &self,
        user_id: &str,
        record: &InteractionRecord,
    ) -> Option<String> {
        let id = self
            .attempt("interaction write", || {
                self.store.insert_interaction(user_id, record)
            })
            .await?;
        tracing::info!("Stored {} record: {}", record.kind.as_str(), id);
        Some(id)
    }

    /// Retry a store call and collapse exhaustion into `None`
    async fn attempt<T, F, Fut>(&self, op_name: &str, op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = crate::error::Result<T>>,
    {
        retry(self.retry, op_name, op).await.ok()
    }
}
