//! Applying the remaining properties onto a created item

use tracing::debug;

use crate::error::Result;
use crate::item::ListItem;
use crate::properties::ItemProperties;
use crate::store::LibraryStore;

/// Assign every property onto `item` under its own key shape, then commit
pub fn apply_metadata(
    store: &dyn LibraryStore,
    mut item: ListItem,
    properties: &ItemProperties,
) -> Result<ListItem> {
    for (key, value) in properties.iter() {
        item.set(key, value.clone());
    }
    debug!(path = %item.path, fields = properties.len(), "committing item");
    Ok(store.commit(&item)?)
}

/// Like [`apply_metadata`], but a missing item or property bag is a no-op
pub fn apply_metadata_optional(
    store: &dyn LibraryStore,
    item: Option<ListItem>,
    properties: Option<&ItemProperties>,
) -> Result<Option<ListItem>> {
    match (item, properties) {
        (Some(item), Some(properties)) => apply_metadata(store, item, properties).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::item::ItemKind;
    use crate::properties::{FieldId, PropertyKey, PropertyValue};
    use crate::store::{MemoryStore, OperationKind};
    use uuid::Uuid;

    fn folder_item() -> (MemoryStore, ListItem) {
        let store = MemoryStore::new();
        let library = Collection::document_library("Docs", "/Docs");
        store.add_collection(library.clone()).unwrap();
        let item = store
            .add_item(&library.id, "/Docs", ItemKind::Folder, "Mike")
            .unwrap();
        (store, item)
    }

    #[test]
    fn test_applies_both_key_shapes() {
        let (store, item) = folder_item();
        let owner = FieldId(Uuid::new_v4());
        let properties = ItemProperties::new()
            .with("Title", "This is the title")
            .with(owner, 42i64);

        let committed = apply_metadata(&store, item, &properties).unwrap();
        assert_eq!(
            committed.get(&PropertyKey::from("Title")),
            Some(&PropertyValue::Text("This is the title".to_string()))
        );
        assert_eq!(committed.get(&owner.into()), Some(&PropertyValue::Integer(42)));
        assert_eq!(store.item("/Docs/Mike").unwrap().fields, committed.fields);
        assert_eq!(store.count(OperationKind::Commit), 1);
    }

    #[test]
    fn test_missing_inputs_are_a_no_op() {
        let (store, item) = folder_item();
        let properties = ItemProperties::new().with("Title", "x");

        assert!(apply_metadata_optional(&store, None, Some(&properties)).unwrap().is_none());
        assert!(apply_metadata_optional(&store, Some(item), None).unwrap().is_none());
        assert_eq!(store.count(OperationKind::Commit), 0);
    }
}
