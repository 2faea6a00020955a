use crate::{
    CatalogStore, ClipEntry, DEFAULT_CATALOG_KEY, KeyValueStore, MemoError, MemoryStore,
    PlayableHandle, SourceLocator,
};

use std::sync::Arc;

fn clip(name: &str, label: &str) -> ClipEntry {
    let source = SourceLocator::new(format!("file:///recordings/{name}.m4a"));
    ClipEntry::new(name, label, source.clone(), Some(PlayableHandle::new(source)))
}

#[allow(clippy::unwrap_used)]
async fn catalog_with(names: &[&str]) -> (CatalogStore<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mut catalog = CatalogStore::new(Arc::clone(&store), DEFAULT_CATALOG_KEY);
    for name in names {
        catalog.append(clip(name, "0:05")).await.unwrap();
    }
    (catalog, store)
}

/// WHAT: Missing document loads as an empty catalog
/// WHY: First launch is not an error
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_empty_store_when_loading_then_catalog_empty() {
    // Given: A store with nothing saved
    let mut catalog = CatalogStore::new(MemoryStore::new(), DEFAULT_CATALOG_KEY);

    // When: Loading
    let count = catalog.load().await.unwrap();

    // Then: Nothing loaded and no error
    assert_eq!(count, 0);
    assert!(catalog.is_empty());
}

/// WHAT: Malformed document leaves an empty catalog and reports the error
/// WHY: A corrupt save must never crash startup
#[tokio::test]
async fn given_malformed_document_when_loading_then_empty_with_serialization_error() {
    // Given: Garbage under the catalog key
    let store = MemoryStore::with_value(DEFAULT_CATALOG_KEY, "{not json");
    let mut catalog = CatalogStore::new(store, DEFAULT_CATALOG_KEY);

    // When: Loading
    let result = catalog.load().await;

    // Then: Serialization error, catalog empty
    assert!(matches!(result, Err(MemoError::Serialization { .. })));
    assert!(catalog.is_empty());
}

/// WHAT: Append grows the catalog by one and persists the whole list
/// WHY: Every mutation is mirrored to storage
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_catalog_when_appending_then_last_entry_matches_and_persisted() {
    // Given: A catalog with two clips
    let (mut catalog, store) = catalog_with(&["first", "second"]).await;
    let entry = clip("third", "1:05");

    // When: Appending a third
    catalog.append(entry.clone()).await.unwrap();

    // Then: Length is three, last is the new entry, document holds all three
    let view = catalog.snapshot();
    assert_eq!(view.clips.len(), 3);
    assert_eq!(view.clips.last(), Some(&entry));

    let document = store.get(DEFAULT_CATALOG_KEY).await.unwrap().unwrap();
    let saved: Vec<ClipEntry> = serde_json::from_str(&document).unwrap();
    assert_eq!(saved, view.clips);
}

/// WHAT: Persisted document never contains the playable handle
/// WHY: Handles are process-local resources
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_with_handle_when_persisted_then_document_has_only_durable_fields() {
    // Given/When: A catalog with one clip
    let (_catalog, store) = catalog_with(&["memo"]).await;

    // Then: Document has name, label and source only
    let document = store.get(DEFAULT_CATALOG_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&document).unwrap();
    let object = value[0].as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["name"], "memo");
    assert_eq!(object["duration_label"], "0:05");
    assert_eq!(object["source"], "file:///recordings/memo.m4a");
}

/// WHAT: Delete removes one entry and keeps the order of the rest
/// WHY: Deletion is positional
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_four_clips_when_deleting_second_then_rest_keep_order() {
    // Given: Four clips
    let (mut catalog, _store) = catalog_with(&["a", "b", "c", "d"]).await;
    let before = catalog.snapshot().clips;

    // When: Deleting index 1
    catalog.delete(1).await.unwrap();

    // Then: catalog == before[0:1] + before[2:]
    let mut expected = before[..1].to_vec();
    expected.extend_from_slice(&before[2..]);
    assert_eq!(catalog.snapshot().clips, expected);
}

/// WHAT: Rename changes only the name at the target index
/// WHY: Labels and sources are immutable
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_clips_when_renaming_middle_then_only_its_name_changes() {
    // Given: Three clips
    let (mut catalog, _store) = catalog_with(&["a", "b", "c"]).await;
    let before = catalog.snapshot().clips;

    // When: Renaming index 1
    catalog.rename(1, "groceries".to_string()).await.unwrap();

    // Then: Only clips[1].name differs
    let after = catalog.snapshot().clips;
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].name, "groceries");
    assert_eq!(after[1].duration_label, before[1].duration_label);
    assert_eq!(after[1].source, before[1].source);
}

/// WHAT: Out-of-range rename and delete fault without side effects
/// WHY: Contract violations must be visible and must not touch storage
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_out_of_range_index_when_mutating_then_fault_and_nothing_changes() {
    // Given: Two clips and the current saved document
    let (mut catalog, store) = catalog_with(&["a", "b"]).await;
    let before = catalog.snapshot();
    let saved_before = store.get(DEFAULT_CATALOG_KEY).await.unwrap();
    store.set_fail_writes(true);

    // When: Renaming and deleting index 2
    let renamed = catalog.rename(2, "nope".to_string()).await;
    let deleted = catalog.delete(2).await;

    // Then: Both fault; no write was attempted (writes would have failed)
    assert!(matches!(
        renamed,
        Err(MemoError::IndexOutOfRange { index: 2, len: 2, .. })
    ));
    assert!(matches!(deleted, Err(MemoError::IndexOutOfRange { .. })));
    assert!(renamed.is_err_and(|e| e.is_fault()));
    assert_eq!(catalog.snapshot(), before);
    assert_eq!(store.get(DEFAULT_CATALOG_KEY).await.unwrap(), saved_before);
}

/// WHAT: Catalog survives a restart
/// WHY: Loading reproduces the list modulo playable handles
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_mutations_when_restarting_then_load_reproduces_catalog() {
    // Given: Appends, a rename and a delete
    let (mut catalog, store) = catalog_with(&["a", "b", "c"]).await;
    catalog.rename(2, "renamed".to_string()).await.unwrap();
    catalog.delete(0).await.unwrap();
    let before = catalog.snapshot().clips;
    drop(catalog);

    // When: A fresh catalog loads from the same store
    let mut reloaded = CatalogStore::new(store, DEFAULT_CATALOG_KEY);
    let count = reloaded.load().await.unwrap();

    // Then: Same entries, no live handles
    let after = reloaded.snapshot().clips;
    assert_eq!(count, 2);
    assert_eq!(after, before);
    assert!(after.iter().all(|c| c.playable.is_none()));
}

/// WHAT: Failed write keeps the in-memory mutation and reports the error
/// WHY: Memory is updated before the write; the next write catches storage up
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_store_when_appending_then_storage_error_and_entry_kept() {
    // Given: A store that rejects writes
    let (mut catalog, store) = catalog_with(&["a"]).await;
    store.set_fail_writes(true);

    // When: Appending
    let result = catalog.append(clip("b", "0:10")).await;

    // Then: Storage error, recoverable, entry in memory
    assert!(matches!(result, Err(MemoError::Storage { .. })));
    assert!(result.is_err_and(|e| !e.is_fault()));
    assert_eq!(catalog.len(), 2);

    // And: Next successful write persists both
    store.set_fail_writes(false);
    catalog.rename(0, "a2".to_string()).await.unwrap();
    let document = store.get(DEFAULT_CATALOG_KEY).await.unwrap().unwrap();
    let saved: Vec<ClipEntry> = serde_json::from_str(&document).unwrap();
    assert_eq!(saved.len(), 2);
}

/// WHAT: Rename clears the editing cursor
/// WHY: Saving a name ends the edit
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_in_edit_when_renamed_then_cursor_cleared() {
    // Given: Clip 1 in edit
    let (mut catalog, _store) = catalog_with(&["a", "b"]).await;
    catalog.begin_edit(1).unwrap();
    assert_eq!(catalog.editing(), Some(1));

    // When: Renaming it
    catalog.rename(1, "b2".to_string()).await.unwrap();

    // Then: No entry is in edit
    assert_eq!(catalog.editing(), None);
}

/// WHAT: Deleting before the cursor shifts it; deleting the cursor clears it
/// WHY: The cursor is positional and must keep pointing at the same clip
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_cursor_when_deleting_entries_then_cursor_follows_its_clip() {
    // Given: Clip "c" in edit
    let (mut catalog, _store) = catalog_with(&["a", "b", "c"]).await;
    catalog.begin_edit(2).unwrap();

    // When: Deleting an earlier clip
    catalog.delete(0).await.unwrap();

    // Then: Cursor moved with "c"
    assert_eq!(catalog.editing(), Some(1));
    assert_eq!(catalog.snapshot().clips[1].name, "c");

    // When: Deleting "c" itself
    catalog.delete(1).await.unwrap();

    // Then: Cursor cleared
    assert_eq!(catalog.editing(), None);
}

/// WHAT: Out-of-range begin_edit faults
/// WHY: The cursor must always point at an existing clip
#[tokio::test]
async fn given_empty_catalog_when_beginning_edit_then_index_out_of_range() {
    let mut catalog = CatalogStore::new(MemoryStore::new(), DEFAULT_CATALOG_KEY);

    let result = catalog.begin_edit(0);

    assert!(matches!(result, Err(MemoError::IndexOutOfRange { .. })));
    assert_eq!(catalog.editing(), None);
}

/// WHAT: Subscribers are notified of mutations
/// WHY: The presentation layer re-renders from change notifications
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_subscriber_when_appending_then_change_observed() {
    // Given: A subscribed receiver
    let (mut catalog, _store) = catalog_with(&[]).await;
    let mut rx = catalog.subscribe();

    // When: Appending
    catalog.append(clip("a", "0:01")).await.unwrap();

    // Then: The receiver sees the new list
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().clips.len(), 1);
}
