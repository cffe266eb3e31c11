//! Owned, shared catalog of garment records plus the user reference photo.
//!
//! The store is the single authority over persisted wardrobe state.
//! Presentation surfaces hold references to it, never private copies.
//! Records are immutable once added, so reads take a shared lock while
//! writes are serialized; persistence is write-through on every mutation.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::catalog::model::{Category, GarmentDraft, GarmentRecord, ImagePayload, UserPhoto};
use crate::error::CatalogError;
use crate::imaging;
use crate::storage::KeyValueStore;

const CLOSET_KEY: &str = "virtual_closet";
const USER_PHOTO_KEY: &str = "virtual_closet_user_image";

#[derive(Default)]
struct CatalogState {
    items: Vec<GarmentRecord>,
    user_photo: Option<UserPhoto>,
}

pub struct CatalogStore {
    store: Arc<dyn KeyValueStore>,
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    /// Loads the catalog from the backing store. Absent or unreadable keys
    /// yield an empty catalog, never an error.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let items: Vec<GarmentRecord> =
            read_or_default(store.as_ref(), CLOSET_KEY).await.unwrap_or_default();
        let user_photo: Option<UserPhoto> =
            read_or_default(store.as_ref(), USER_PHOTO_KEY).await;

        info!(
            "Catalog loaded: {} item(s), user photo {}",
            items.len(),
            if user_photo.is_some() { "present" } else { "absent" }
        );

        Self {
            store,
            state: RwLock::new(CatalogState { items, user_photo }),
        }
    }

    /// Commits a confirmed draft as a new record and persists the catalog.
    ///
    /// The record is rebuilt from the draft's named fields only, so nothing
    /// a caller smuggled alongside a draft can ever reach storage.
    pub async fn add_item(&self, draft: GarmentDraft) -> Result<GarmentRecord, CatalogError> {
        let record = GarmentRecord {
            id: Uuid::new_v4().to_string(),
            image: ImagePayload::new(draft.image.data, draft.image.mime_type),
            category: draft.category,
            name: draft.name,
            tags: draft.tags,
        };

        let snapshot = {
            let mut state = self.write();
            state.items.push(record.clone());
            serde_json::to_value(&state.items)?
        };

        self.store.set(CLOSET_KEY, snapshot).await?;
        debug!("Added {} item '{}' ({})", record.category, record.name, record.id);
        Ok(record)
    }

    /// Removes the record with the given id. No-op when absent.
    pub async fn remove_item(&self, id: &str) -> Result<(), CatalogError> {
        let snapshot = {
            let mut state = self.write();
            let before = state.items.len();
            state.items.retain(|item| item.id != id);
            if state.items.len() == before {
                debug!("remove_item: no record with id '{}'", id);
                return Ok(());
            }
            serde_json::to_value(&state.items)?
        };

        self.store.set(CLOSET_KEY, snapshot).await?;
        debug!("Removed item '{}'", id);
        Ok(())
    }

    /// All records in the given category, insertion order preserved.
    pub fn items_by_category(&self, category: Category) -> Vec<GarmentRecord> {
        self.read()
            .items
            .iter()
            .filter(|item| item.category == category)
            .cloned()
            .collect()
    }

    /// Distinct categories currently holding at least one record.
    pub fn available_categories(&self) -> Vec<Category> {
        let state = self.read();
        Category::ALL
            .into_iter()
            .filter(|c| state.items.iter().any(|item| item.category == *c))
            .collect()
    }

    /// Full snapshot of the catalog, insertion order preserved.
    pub fn items(&self) -> Vec<GarmentRecord> {
        self.read().items.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// Replaces the user reference photo and persists it, normalized to
    /// the default dimension bound. A payload that cannot be decoded is
    /// stored as received.
    pub async fn set_user_photo(&self, image: ImagePayload) -> Result<(), CatalogError> {
        let image = match imaging::normalize(&image, imaging::DEFAULT_MAX_DIMENSION) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!("User photo normalization failed, storing original: {}", e);
                image
            }
        };
        let photo = UserPhoto { image };
        let snapshot = serde_json::to_value(&photo)?;

        self.write().user_photo = Some(photo);
        self.store.set(USER_PHOTO_KEY, snapshot).await?;
        debug!("User photo updated");
        Ok(())
    }

    pub fn user_photo(&self) -> Option<UserPhoto> {
        self.read().user_photo.clone()
    }

    // Records are immutable once added, so a poisoned lock still guards a
    // consistent state and can be recovered rather than propagated.
    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reads and decodes one key; any failure downgrades to `None` with a log
/// line, because a missing or corrupt document is an empty catalog, not
/// an error.
async fn read_or_default<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let value = match store.get(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to load key '{}', starting empty: {}", key, e);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Discarding malformed document under '{}': {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn draft(category: Category, name: &str) -> GarmentDraft {
        GarmentDraft {
            image: ImagePayload::png(vec![1, 2, 3]),
            category,
            name: name.to_string(),
            tags: vec!["test".to_string()],
        }
    }

    async fn empty_store() -> CatalogStore {
        CatalogStore::load(Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn add_item_assigns_fresh_ids() {
        let catalog = empty_store().await;

        let a = catalog.add_item(draft(Category::Tops, "Shirt")).await.unwrap();
        let b = catalog.add_item(draft(Category::Tops, "Blouse")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(catalog.items().len(), 2);
    }

    #[tokio::test]
    async fn items_by_category_preserves_insertion_order() {
        let catalog = empty_store().await;

        catalog.add_item(draft(Category::Tops, "First")).await.unwrap();
        catalog.add_item(draft(Category::Shoes, "Boots")).await.unwrap();
        catalog.add_item(draft(Category::Tops, "Second")).await.unwrap();

        let tops = catalog.items_by_category(Category::Tops);
        assert_eq!(tops.len(), 2);
        assert_eq!(tops[0].name, "First");
        assert_eq!(tops[1].name, "Second");
    }

    #[tokio::test]
    async fn remove_item_excludes_the_record() {
        let catalog = empty_store().await;

        let kept = catalog.add_item(draft(Category::Tops, "Keep")).await.unwrap();
        let gone = catalog.add_item(draft(Category::Tops, "Drop")).await.unwrap();

        catalog.remove_item(&gone.id).await.unwrap();

        let tops = catalog.items_by_category(Category::Tops);
        assert_eq!(tops.len(), 1);
        assert_eq!(tops[0].id, kept.id);
    }

    #[tokio::test]
    async fn remove_item_is_a_noop_for_unknown_id() {
        let catalog = empty_store().await;
        catalog.add_item(draft(Category::Shoes, "Boots")).await.unwrap();

        catalog.remove_item("no-such-id").await.unwrap();
        assert_eq!(catalog.items().len(), 1);
    }

    #[tokio::test]
    async fn available_categories_never_contains_empty_category() {
        let catalog = empty_store().await;
        assert!(catalog.available_categories().is_empty());

        let shoes = catalog.add_item(draft(Category::Shoes, "Boots")).await.unwrap();
        catalog.add_item(draft(Category::Tops, "Shirt")).await.unwrap();
        assert_eq!(
            catalog.available_categories(),
            vec![Category::Tops, Category::Shoes]
        );

        catalog.remove_item(&shoes.id).await.unwrap();
        assert_eq!(catalog.available_categories(), vec![Category::Tops]);
    }

    #[tokio::test]
    async fn catalog_survives_reload_through_the_same_store() {
        let store = Arc::new(MemoryStore::new());

        let catalog = CatalogStore::load(store.clone()).await;
        catalog.add_item(draft(Category::Bottoms, "Jeans")).await.unwrap();
        catalog
            .set_user_photo(ImagePayload::new(vec![9, 9], "image/jpeg"))
            .await
            .unwrap();

        let reloaded = CatalogStore::load(store).await;
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].name, "Jeans");
        assert!(reloaded.user_photo().is_some());
    }

    fn wide_png(width: u32, height: u32) -> ImagePayload {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([50, 60, 70, 255]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        ImagePayload::png(buf)
    }

    #[tokio::test]
    async fn oversized_user_photo_is_normalized_before_persistence() {
        use image::GenericImageView;

        let store = Arc::new(MemoryStore::new());
        let catalog = CatalogStore::load(store.clone()).await;

        catalog.set_user_photo(wide_png(2000, 100)).await.unwrap();

        let stored = catalog.user_photo().unwrap();
        let decoded = image::load_from_memory(&stored.image.data).unwrap();
        let (w, h) = decoded.dimensions();
        assert_eq!(w.max(h), 512);

        // The persisted document carries the normalized bytes too.
        let reloaded = CatalogStore::load(store).await;
        assert_eq!(reloaded.user_photo().unwrap(), stored);
    }

    #[tokio::test]
    async fn undecodable_user_photo_is_stored_as_received() {
        let catalog = empty_store().await;
        let raw = ImagePayload::new(vec![9, 9, 9], "image/jpeg");

        catalog.set_user_photo(raw.clone()).await.unwrap();

        assert_eq!(catalog.user_photo().unwrap().image, raw);
    }

    #[tokio::test]
    async fn malformed_persisted_state_loads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.seed(CLOSET_KEY, json!({"definitely": "not a list"}));
        store.seed(USER_PHOTO_KEY, json!(42));

        let catalog = CatalogStore::load(store).await;
        assert!(catalog.is_empty());
        assert!(catalog.user_photo().is_none());
    }
}
