//! Whole-store behavior: the list screen and the edit path sharing one
//! stored snapshot.

use rand::distributions::Alphanumeric;
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

use crate::datastore::{
    snapshot, ErrorKind, KeyValueStorage, MemoryStorage, RecordingDiagnostics, SaveOutcome,
    StorageError, StoreSettings, TaskEditor, TaskStore, DEFAULT_SNAPSHOT_KEY,
};
use crate::model::{default_tasks, IdPolicy, Task, TaskCollection, TaskId};

const KEY: &str = DEFAULT_SNAPSHOT_KEY;

/// Storage whose writes wait for a permit, announcing each arrival first.
struct GatedStorage {
    inner: MemoryStorage,
    gate: Arc<Semaphore>,
    arrived: Arc<Notify>,
}

impl GatedStorage {
    fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
            arrived: Arc::new(Notify::new()),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStorage for GatedStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.arrived.notify_one();
        self.gate
            .acquire()
            .await
            .map_err(|err| StorageError::Unavailable(err.to_string()))?
            .forget();
        self.inner.set(key, value).await
    }
}

fn task(id: TaskId, title: &str) -> Task {
    Task::new(id, title)
}

fn seeded(tasks: Vec<Task>) -> MemoryStorage {
    let collection = TaskCollection::from(tasks);
    MemoryStorage::with_value(KEY, snapshot::encode(&collection).unwrap())
}

fn stored(storage: &MemoryStorage) -> Option<TaskCollection> {
    storage
        .raw(KEY)
        .and_then(|bytes| snapshot::decode(&bytes).unwrap())
}

fn store_on<S: KeyValueStorage>(storage: Arc<S>, id_policy: IdPolicy) -> TaskStore<S> {
    let settings = StoreSettings {
        id_policy,
        ..StoreSettings::default()
    };
    TaskStore::new(storage, settings, Arc::new(RecordingDiagnostics::new()))
}

fn editor_on<S: KeyValueStorage>(storage: Arc<S>) -> TaskEditor<S> {
    TaskEditor::new(storage, KEY, Arc::new(RecordingDiagnostics::new()))
}

fn random_collection(len: usize) -> TaskCollection {
    let mut rng = thread_rng();
    let mut ids: Vec<TaskId> = (1..=(len as TaskId * 3)).collect();
    ids.shuffle(&mut rng);
    ids.into_iter()
        .take(len)
        .map(|id| {
            let title_len = rng.gen_range(0..40);
            let mut title: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(title_len)
                .map(char::from)
                .collect();
            if rng.gen_bool(0.3) {
                title.push_str(" \"quoted\" \\ ünïcödé ✓\n");
            }
            Task {
                id,
                title,
                completed: rng.gen_bool(0.5),
            }
        })
        .collect()
}

#[test]
fn test_snapshot_round_trip() {
    for len in [0, 1, 2, 17, 180] {
        let tasks = random_collection(len);
        let bytes = snapshot::encode(&tasks).unwrap();
        assert_eq!(snapshot::decode(&bytes).unwrap(), Some(tasks));
    }
}

#[tokio::test]
async fn test_add_keeps_ids_unique_with_max_policy() {
    for _ in 0..20 {
        let storage = seeded(random_collection(12).into());
        let mut store = store_on(Arc::new(storage), IdPolicy::MaxPlusOne);
        store.initialize().await;

        store.add("fresh");

        let ids: HashSet<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), store.tasks().len());
    }
}

#[tokio::test]
async fn test_add_with_first_policy_uses_first_element() {
    for _ in 0..20 {
        let initial = random_collection(12);
        let first = initial.as_slice()[0].id;
        let mut store = store_on(Arc::new(seeded(initial.into())), IdPolicy::FirstPlusOne);
        store.initialize().await;

        assert_eq!(store.add("fresh"), Some(first + 1));
    }
}

#[tokio::test]
async fn test_first_policy_is_unique_on_descending_lists() {
    let initial = TaskCollection::from(random_collection(12).display_order());
    let mut store = store_on(Arc::new(seeded(initial.into())), IdPolicy::FirstPlusOne);
    store.initialize().await;

    store.add("fresh");

    let ids: HashSet<TaskId> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), store.tasks().len());
}

#[tokio::test]
async fn test_delete_missing_id_leaves_collection() {
    let storage = seeded(vec![task(1, "a"), task(2, "b")]);
    let mut store = store_on(Arc::new(storage.clone()), IdPolicy::MaxPlusOne);
    store.initialize().await;
    let before = store.tasks().clone();

    store.delete(3);
    store.flush().await;

    assert_eq!(store.tasks(), &before);
    assert_eq!(stored(&storage), Some(before));
}

#[tokio::test]
async fn test_toggle_twice_restores() {
    let storage = seeded(vec![task(1, "a"), task(2, "b")]);
    let mut store = store_on(Arc::new(storage), IdPolicy::MaxPlusOne);
    store.initialize().await;
    let before = store.tasks().clone();

    store.toggle_completed(2);
    assert!(store.tasks().find(2).unwrap().completed);
    store.toggle_completed(2);

    assert_eq!(store.tasks(), &before);
}

#[tokio::test]
async fn test_initialize_fallbacks() {
    let blobs: [(Option<&[u8]>, bool); 5] = [
        (None, false),
        (Some(&b""[..]), false),
        (Some(&b"[]"[..]), false),
        (Some(&b"null"[..]), false),
        (Some(&b"<html>not a snapshot</html>"[..]), true),
    ];
    for (blob, malformed) in blobs {
        let storage = match blob {
            Some(bytes) => MemoryStorage::with_value(KEY, bytes.to_vec()),
            None => MemoryStorage::new(),
        };
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let mut store = TaskStore::new(
            Arc::new(storage.clone()),
            StoreSettings::default(),
            diagnostics.clone(),
        );

        store.initialize().await;
        store.flush().await;

        assert_eq!(store.tasks(), &default_tasks());
        assert_eq!(diagnostics.count(ErrorKind::Parse), usize::from(malformed));
        assert_eq!(storage.writes(), usize::from(!malformed));
        if let Some(bytes) = blob.filter(|_| malformed) {
            assert_eq!(storage.raw(KEY), Some(bytes.to_vec()));
        }
    }
}

#[tokio::test]
async fn test_add_to_empty_store() {
    // GIVEN
    let storage = MemoryStorage::with_value(KEY, b"[]".to_vec());
    let mut store = store_on(Arc::new(storage.clone()), IdPolicy::MaxPlusOne);
    store.initialize().await;
    for id in default_tasks().iter().map(|t| t.id) {
        store.delete(id);
    }
    assert!(store.tasks().is_empty());

    // WHEN
    store.add("Buy milk");
    store.flush().await;

    // THEN
    let expected = TaskCollection::from(vec![task(1, "Buy milk")]);
    assert_eq!(store.tasks(), &expected);
    assert_eq!(storage.raw(KEY), Some(snapshot::encode(&expected).unwrap()));
}

#[tokio::test]
async fn test_new_id_depends_on_policy() {
    for (policy, expected) in [(IdPolicy::FirstPlusOne, 3), (IdPolicy::MaxPlusOne, 6)] {
        let storage = seeded(vec![task(2, "two"), task(5, "five")]);
        let mut store = store_on(Arc::new(storage), policy);
        store.initialize().await;

        assert_eq!(store.add("X"), Some(expected));
    }

    let storage = seeded(vec![task(5, "five"), task(2, "two")]);
    let mut store = store_on(Arc::new(storage), IdPolicy::FirstPlusOne);
    store.initialize().await;
    assert_eq!(store.add("X"), Some(6));
}

#[tokio::test]
async fn test_toggle_missing_id_is_silent() {
    let storage = seeded(vec![task(1, "a"), task(2, "b"), task(3, "c")]);
    let mut store = store_on(Arc::new(storage), IdPolicy::MaxPlusOne);
    store.initialize().await;
    let before = store.tasks().clone();

    store.toggle_completed(999);

    assert_eq!(store.tasks(), &before);
}

#[tokio::test]
async fn test_save_after_delete_on_empty_snapshot_resurrects_only_edited_task() {
    // GIVEN: the edit view holds task 1, then the list screen deletes every task
    let storage = seeded(vec![task(1, "a")]);
    let editor = editor_on(Arc::new(storage.clone()));
    let mut edited = editor.load_one("1").await.unwrap();
    edited.title = "a, edited".to_string();

    let mut store = store_on(Arc::new(storage.clone()), IdPolicy::MaxPlusOne);
    store.initialize().await;
    store.delete(1);
    store.flush().await;
    assert_eq!(stored(&storage), Some(TaskCollection::new()));

    // WHEN
    let outcome = editor.save_one(edited.clone()).await;

    // THEN: the deleted task comes back as the only stored task
    assert_eq!(outcome, SaveOutcome::Seeded);
    assert_eq!(stored(&storage), Some(TaskCollection::from(vec![edited])));
}

#[tokio::test]
async fn test_save_after_delete_on_populated_snapshot_keeps_others() {
    // GIVEN
    let storage = seeded(vec![task(1, "a"), task(2, "b"), task(3, "c")]);
    let editor = editor_on(Arc::new(storage.clone()));
    let edited = editor.load_one("2").await.unwrap();

    let mut store = store_on(Arc::new(storage.clone()), IdPolicy::MaxPlusOne);
    store.initialize().await;
    store.delete(2);
    store.flush().await;

    // WHEN
    let outcome = editor.save_one(edited).await;

    // THEN: the deletion stands and the others are untouched
    assert_eq!(outcome, SaveOutcome::Unmatched);
    assert_eq!(
        stored(&storage),
        Some(TaskCollection::from(vec![task(1, "a"), task(3, "c")]))
    );
}

#[tokio::test]
async fn test_stale_list_overwrites_saved_edit_unless_reloaded() {
    // GIVEN: the edit path renames task 1 behind the list screen's back
    let storage = seeded(vec![task(1, "a"), task(2, "b")]);
    let mut store = store_on(Arc::new(storage.clone()), IdPolicy::MaxPlusOne);
    store.initialize().await;
    let editor = editor_on(Arc::new(storage.clone()));
    let mut edited = editor.load_one("1").await.unwrap();
    edited.title = "a, edited".to_string();
    assert_eq!(editor.save_one(edited.clone()).await, SaveOutcome::Replaced);

    // WHEN: the list screen mutates from its stale copy
    store.toggle_completed(2);
    store.flush().await;

    // THEN: the edit is lost from storage
    let after = stored(&storage).unwrap();
    assert_eq!(after.find(1).unwrap().title, "a");

    // reconciling first keeps both changes
    assert_eq!(editor.save_one(edited.clone()).await, SaveOutcome::Replaced);
    assert!(store.reload().await);
    store.toggle_completed(2);
    store.flush().await;

    let after = stored(&storage).unwrap();
    assert_eq!(after.find(1), Some(&edited));
    assert!(!after.find(2).unwrap().completed);
}

#[tokio::test]
async fn test_in_flight_list_write_overwrites_edit() {
    // GIVEN
    let storage = seeded(vec![task(1, "a"), task(2, "b")]);
    let gated = Arc::new(GatedStorage::new(storage.clone()));
    let mut store = store_on(gated.clone(), IdPolicy::MaxPlusOne);
    store.initialize().await;
    let editor = editor_on(Arc::new(storage.clone()));
    let mut edited = editor.load_one("2").await.unwrap();
    edited.title = "b, edited".to_string();

    // WHEN: the list write is held while the edit path saves
    store.add("c");
    gated.arrived.notified().await;
    assert_eq!(editor.save_one(edited).await, SaveOutcome::Replaced);
    gated.gate.add_permits(1);
    store.flush().await;

    // THEN: last writer wins
    assert_eq!(
        stored(&storage),
        Some(TaskCollection::from(vec![task(1, "a"), task(2, "b"), task(3, "c")]))
    );
}

#[tokio::test]
async fn test_edit_read_before_list_write_overwrites_list() {
    // GIVEN
    let storage = seeded(vec![task(1, "a"), task(2, "b")]);
    let mut store = store_on(Arc::new(storage.clone()), IdPolicy::MaxPlusOne);
    store.initialize().await;
    let gated = Arc::new(GatedStorage::new(storage.clone()));
    let editor = editor_on(gated.clone());
    let mut edited = editor.load_one("2").await.unwrap();
    edited.title = "b, edited".to_string();

    // WHEN: the edit path has read the snapshot and waits to write it back
    let save = tokio::spawn(async move { editor.save_one(edited).await });
    gated.arrived.notified().await;
    store.add("c");
    store.flush().await;
    gated.gate.add_permits(1);
    let outcome = save.await.unwrap();

    // THEN: the list screen's new task is gone from storage but not from memory
    assert_eq!(outcome, SaveOutcome::Replaced);
    let after = stored(&storage).unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after.find(2).unwrap().title, "b, edited");
    assert!(after.find(3).is_none());
    assert!(store.tasks().find(3).is_some());
}

#[tokio::test]
async fn test_concurrent_edits_of_distinct_tasks_through_futures() {
    // each save re-reads, so sequential completion keeps both edits
    let storage = seeded(vec![task(1, "a"), task(2, "b")]);
    let first = editor_on(Arc::new(storage.clone()));
    let second = editor_on(Arc::new(storage.clone()));

    let (one, two) = futures::join!(
        first.save_one(task(1, "a2")),
        second.save_one(task(2, "b2"))
    );

    assert_eq!(one, SaveOutcome::Replaced);
    assert_eq!(two, SaveOutcome::Replaced);
    assert_eq!(
        stored(&storage),
        Some(TaskCollection::from(vec![task(1, "a2"), task(2, "b2")]))
    );
}
