use nostrdrive_core::store::StoreResult;
use nostrdrive_core::{
    Address, Coordinate, DriveError, EventStore, FolderEntry, FolderService, KindValidator,
    MemoryEventStore, NewFolder, Record, FOLDER_KIND,
};
use std::cell::Cell;

const OWNER: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Memory store that counts reads and publishes.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryEventStore,
    reads: Cell<usize>,
    publishes: Cell<usize>,
    reject_publishes: Cell<bool>,
}

impl RecordingStore {
    fn interactions(&self) -> usize {
        self.reads.get() + self.publishes.get()
    }
}

impl EventStore for RecordingStore {
    fn get_latest_by_coordinate(&self, coordinate: &Coordinate) -> StoreResult<Option<Record>> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get_latest_by_coordinate(coordinate)
    }

    fn get_by_id(&self, record_id: &str) -> StoreResult<Option<Record>> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get_by_id(record_id)
    }

    fn publish(&self, record: &Record) -> StoreResult<bool> {
        self.publishes.set(self.publishes.get() + 1);
        if self.reject_publishes.get() {
            return Ok(false);
        }
        self.inner.publish(record)
    }
}

fn clock() -> i64 {
    1_700_000_000
}

fn setup() -> FolderService<RecordingStore> {
    FolderService::new(RecordingStore::default()).with_clock(clock)
}

fn owner() -> Address {
    Address::new(OWNER)
}

fn member(kind: u32, identifier: &str) -> Coordinate {
    Coordinate::new(kind, OWNER, identifier).unwrap()
}

fn create_folder(service: &FolderService<RecordingStore>, identifier: &str) -> Coordinate {
    service
        .create(&owner(), NewFolder::new(identifier))
        .unwrap()
        .coordinate()
        .clone()
}

/// Publishes a folder record directly, bypassing service validation.
fn publish_raw_folder(service: &FolderService<RecordingStore>, tags: Vec<Vec<String>>) {
    let record = Record::new(FOLDER_KIND, OWNER, 1_600_000_000, tags);
    assert!(service.store().inner.publish(&record).unwrap());
}

fn tag(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn create_publishes_first_version() {
    let service = setup();
    let request = NewFolder {
        title: Some("Docs".into()),
        entries: vec![FolderEntry::new(member(30023, "a"))],
        ..NewFolder::new("docs")
    };

    let folder = service.create(&owner(), request).unwrap();
    assert_eq!(folder.coordinate().kind(), FOLDER_KIND);
    assert_eq!(folder.record_id(), None);
    assert_eq!(folder.created_at(), clock());
    assert_eq!(service.store().publishes.get(), 1);

    let fetched = service.get(folder.coordinate()).unwrap();
    assert_eq!(fetched.title(), Some("Docs"));
    assert_eq!(fetched.entry_coordinates(), vec![member(30023, "a")]);
    assert!(fetched.record_id().is_some());
}

#[test]
fn create_validates_before_publishing() {
    let service = setup();

    let err = service.create(&owner(), NewFolder::new("  ")).unwrap_err();
    assert!(matches!(err, DriveError::Validation(_)));

    let blank_title = NewFolder {
        title: Some(" ".into()),
        ..NewFolder::new("docs")
    };
    assert!(matches!(
        service.create(&owner(), blank_title).unwrap_err(),
        DriveError::Validation(_)
    ));

    let duplicate = NewFolder {
        entries: vec![
            FolderEntry::new(member(30023, "a")),
            FolderEntry::new(member(30023, "a")),
        ],
        ..NewFolder::new("docs")
    };
    assert!(matches!(
        service.create(&owner(), duplicate).unwrap_err(),
        DriveError::DuplicateEntry(_)
    ));

    let err = service
        .create(&Address::new("nothex"), NewFolder::new("docs"))
        .unwrap_err();
    assert!(matches!(err, DriveError::InvalidValue(_)));
    assert_eq!(service.store().interactions(), 0);
}

#[test]
fn get_rejects_non_folder_coordinate_without_store_access() {
    let service = setup();
    let err = service.get(&member(30042, "main")).unwrap_err();
    assert!(matches!(err, DriveError::Validation(_)));
    assert_eq!(service.store().interactions(), 0);
}

#[test]
fn get_missing_folder_is_not_found() {
    let service = setup();
    let err = service.get(&member(FOLDER_KIND, "missing")).unwrap_err();
    assert!(matches!(err, DriveError::NotFound(_)));
}

#[test]
fn add_entry_rejects_duplicates() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    service
        .add_entry(&folder, FolderEntry::new(member(30023, "a")))
        .unwrap();

    let err = service
        .add_entry(&folder, FolderEntry::new(member(30023, "a")))
        .unwrap_err();
    assert!(matches!(err, DriveError::DuplicateEntry(c) if c == member(30023, "a")));
    assert_eq!(service.get(&folder).unwrap().len(), 1);
}

#[test]
fn add_entry_checks_kind_before_any_store_interaction() {
    let service = setup();
    let folder = member(FOLDER_KIND, "docs");

    let err = service
        .add_entry(&folder, FolderEntry::new(member(30045, "nested")))
        .unwrap_err();
    assert!(matches!(err, DriveError::InvalidKind(ref e) if e.kind == 30045));
    assert_eq!(service.store().interactions(), 0);
}

#[test]
fn nesting_validator_admits_folders() {
    let service = FolderService::with_kinds(
        RecordingStore::default(),
        KindValidator::with_folder_nesting(),
    )
    .with_clock(clock);
    let folder = service
        .create(&owner(), NewFolder::new("docs"))
        .unwrap()
        .coordinate()
        .clone();
    let updated = service
        .add_entry(&folder, FolderEntry::new(member(FOLDER_KIND, "nested")))
        .unwrap();
    assert_eq!(updated.len(), 1);
}

#[test]
fn remove_absent_entry_publishes_nothing() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    let before = service.store().publishes.get();

    let unchanged = service
        .remove_entry(&folder, &member(30023, "absent"))
        .unwrap();
    assert!(unchanged.is_empty());
    assert_eq!(service.store().publishes.get(), before);
}

#[test]
fn remove_entry_publishes_new_version() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    service
        .add_entry(&folder, FolderEntry::new(member(30023, "a")))
        .unwrap();
    service
        .add_entry(&folder, FolderEntry::new(member(30024, "b")))
        .unwrap();

    let updated = service.remove_entry(&folder, &member(30023, "a")).unwrap();
    assert_eq!(updated.entry_coordinates(), vec![member(30024, "b")]);
    assert_eq!(
        service.get(&folder).unwrap().entry_coordinates(),
        vec![member(30024, "b")]
    );
}

#[test]
fn reorder_requires_exact_permutation() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    let first = member(30023, "a");
    let second = member(30024, "b");
    service
        .set_entries(
            &folder,
            vec![FolderEntry::new(first.clone()), FolderEntry::new(second.clone())],
        )
        .unwrap();

    let err = service
        .reorder_entries(&folder, std::slice::from_ref(&second))
        .unwrap_err();
    assert!(matches!(err, DriveError::Validation(_)));

    let err = service
        .reorder_entries(&folder, &[second.clone(), member(30023, "other")])
        .unwrap_err();
    assert!(matches!(err, DriveError::Validation(_)));

    let err = service
        .reorder_entries(&folder, &[second.clone(), second.clone()])
        .unwrap_err();
    assert!(matches!(err, DriveError::Validation(_)));

    let reordered = service
        .reorder_entries(&folder, &[second.clone(), first.clone()])
        .unwrap();
    assert_eq!(reordered.position_of(&second), Some(0));
    assert_eq!(reordered.position_of(&first), Some(1));
    assert_eq!(service.get(&folder).unwrap().position_of(&second), Some(0));
}

#[test]
fn move_entry_between_folders() {
    let service = setup();
    let source = create_folder(&service, "source");
    let destination = create_folder(&service, "destination");
    let entry = FolderEntry::with_all_hints(
        member(30023, "post"),
        Some("wss://relay.example".into()),
        None,
        None,
    );
    service.add_entry(&source, entry.clone()).unwrap();

    let moved = service
        .move_entry(&member(30023, "post"), &source, &destination)
        .unwrap();
    assert!(moved.source.is_empty());
    assert_eq!(moved.destination.entries(), &[entry.clone()]);

    assert!(service.get(&source).unwrap().is_empty());
    assert_eq!(service.get(&destination).unwrap().entries(), &[entry]);
}

#[test]
fn move_absent_entry_publishes_nothing() {
    let service = setup();
    let source = create_folder(&service, "source");
    let destination = create_folder(&service, "destination");
    let before = service.store().publishes.get();

    let err = service
        .move_entry(&member(30023, "absent"), &source, &destination)
        .unwrap_err();
    assert!(matches!(err, DriveError::NotFound(_)));
    assert_eq!(service.store().publishes.get(), before);
}

#[test]
fn move_absent_member_of_unlisted_kind_is_not_found() {
    let service = setup();
    let source = create_folder(&service, "source");
    let destination = create_folder(&service, "destination");
    let before = service.store().publishes.get();

    let err = service
        .move_entry(&member(FOLDER_KIND, "nested"), &source, &destination)
        .unwrap_err();
    assert!(matches!(err, DriveError::NotFound(_)));
    assert_eq!(service.store().publishes.get(), before);
}

#[test]
fn move_entry_carries_stored_member_outside_allow_list() {
    let service = setup();
    let nested = member(FOLDER_KIND, "nested");
    publish_raw_folder(
        &service,
        vec![
            tag(&["d", "source"]),
            tag(&["a", &nested.to_string(), "", ""]),
        ],
    );
    let source = member(FOLDER_KIND, "source");
    let destination = create_folder(&service, "destination");
    assert!(service.get(&source).unwrap().has_entry(&nested));

    let moved = service.move_entry(&nested, &source, &destination).unwrap();
    assert!(moved.source.is_empty());
    assert!(moved.destination.has_entry(&nested));
    assert!(service.get(&destination).unwrap().has_entry(&nested));
    assert!(!service.get(&source).unwrap().has_entry(&nested));
}

#[test]
fn move_into_folder_holding_member_publishes_nothing() {
    let service = setup();
    let source = create_folder(&service, "source");
    let destination = create_folder(&service, "destination");
    let post = member(30023, "post");
    service
        .add_entry(&source, FolderEntry::new(post.clone()))
        .unwrap();
    service
        .add_entry(&destination, FolderEntry::new(post.clone()))
        .unwrap();
    let before = service.store().publishes.get();

    let err = service.move_entry(&post, &source, &destination).unwrap_err();
    assert!(matches!(err, DriveError::DuplicateEntry(_)));
    assert_eq!(service.store().publishes.get(), before);

    let err = service.move_entry(&post, &source, &source).unwrap_err();
    assert!(matches!(err, DriveError::Validation(_)));
}

#[test]
fn metadata_edits_keep_archived_marker() {
    let service = setup();
    let folder = create_folder(&service, "docs");

    service.archive(&folder).unwrap();
    service
        .set_description(&folder, Some("Old docs".into()))
        .unwrap();
    let renamed = service.set_title(&folder, Some("Archive".into())).unwrap();
    assert!(renamed.is_archived());

    let fetched = service.get(&folder).unwrap();
    assert!(fetched.is_archived());
    assert_eq!(fetched.title(), Some("Archive"));
    assert_eq!(fetched.description(), Some("Old docs"));
}

#[test]
fn update_entry_hints_merges_into_existing_entry() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    let post = member(30023, "post");
    service
        .add_entry(
            &folder,
            FolderEntry::with_all_hints(post.clone(), Some("wss://one".into()), None, None),
        )
        .unwrap();

    let updated = service
        .update_entry_hints(&folder, &post, None, Some("rec7".into()), Some("Post".into()))
        .unwrap();
    let entry = updated.entry(&post).unwrap();
    assert_eq!(entry.relay_hint(), Some("wss://one"));
    assert_eq!(entry.last_seen_record_id(), Some("rec7"));
    assert_eq!(entry.name_hint(), Some("Post"));

    let err = service
        .update_entry_hints(&folder, &member(30023, "absent"), None, None, None)
        .unwrap_err();
    assert!(matches!(err, DriveError::NotFound(_)));
}

#[test]
fn resolve_entries_pairs_entries_with_latest_records() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    let missing = member(30023, "missing");
    let article = member(30023, "article");
    service
        .store()
        .publish(&Record::new(
            30023,
            OWNER,
            5,
            vec![vec!["d".to_string(), "article".to_string()]],
        ))
        .unwrap();
    service
        .set_entries(
            &folder,
            vec![FolderEntry::new(missing.clone()), FolderEntry::new(article.clone())],
        )
        .unwrap();

    let resolved = service.resolve_entries(&folder).unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].entry.coordinate(), &missing);
    assert!(resolved[0].record.is_none());
    assert_eq!(resolved[1].record.as_ref().unwrap().created_at, 5);
}

#[test]
fn get_many_follows_input_order_and_skips_missing() {
    let service = setup();
    let first = create_folder(&service, "first");
    let second = create_folder(&service, "second");

    let folders = service
        .get_many(&[second.clone(), member(FOLDER_KIND, "missing"), first.clone()])
        .unwrap();
    let identifiers: Vec<&str> = folders.iter().map(|folder| folder.identifier()).collect();
    assert_eq!(identifiers, vec!["second", "first"]);
}

#[test]
fn get_by_id_returns_that_version_only_for_folders() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    let first_version = service.get(&folder).unwrap();
    let record_id = first_version.record_id().unwrap().to_string();
    service.set_title(&folder, Some("Later".into())).unwrap();

    let fetched = service.get_by_id(&record_id).unwrap();
    assert_eq!(fetched.title(), None);

    let article = Record::new(
        30023,
        OWNER,
        1,
        vec![vec!["d".to_string(), "post".to_string()]],
    );
    service.store().publish(&article).unwrap();
    let article_id = service.store().inner.records().last().unwrap().id.clone().unwrap();
    assert!(matches!(
        service.get_by_id(&article_id).unwrap_err(),
        DriveError::NotFound(_)
    ));
    assert!(matches!(
        service.get_by_id("missing").unwrap_err(),
        DriveError::NotFound(_)
    ));
}

#[test]
fn new_versions_never_sort_behind_previous() {
    fn early_clock() -> i64 {
        10
    }
    let store = MemoryEventStore::new();
    let later = FolderService::new(&store).with_clock(clock);
    let folder = later
        .create(&owner(), NewFolder::new("docs"))
        .unwrap()
        .coordinate()
        .clone();

    let early = FolderService::new(&store).with_clock(early_clock);
    let updated = early.set_title(&folder, Some("Skewed".into())).unwrap();
    assert_eq!(updated.created_at(), clock());
    assert_eq!(later.get(&folder).unwrap().title(), Some("Skewed"));
}

#[test]
fn update_publishes_caller_edited_folder() {
    let service = setup();
    let folder = create_folder(&service, "docs");
    let mut edited = service.get(&folder).unwrap();
    edited.set_title(Some("Edited".into()));
    edited.set_entries(vec![
        FolderEntry::new(member(30023, "a")),
        FolderEntry::new(member(30023, "a")),
    ]);
    assert!(matches!(
        service.update(&edited).unwrap_err(),
        DriveError::DuplicateEntry(_)
    ));

    edited.set_entries(vec![FolderEntry::new(member(30023, "a"))]);
    let published = service.update(&edited).unwrap();
    assert_eq!(published.record_id(), None);
    assert_eq!(service.get(&folder).unwrap().title(), Some("Edited"));
}

#[test]
fn update_trusts_values_carried_over_from_stored_version() {
    let service = setup();
    let nested = member(FOLDER_KIND, "nested");
    publish_raw_folder(
        &service,
        vec![
            tag(&["d", "docs"]),
            tag(&["title", ""]),
            tag(&["a", &nested.to_string(), "", ""]),
        ],
    );
    let coordinate = member(FOLDER_KIND, "docs");

    let mut folder = service.get(&coordinate).unwrap();
    assert_eq!(folder.title(), Some(""));
    folder.set_description(Some("kept".into()));
    service.update(&folder).unwrap();
    let fetched = service.get(&coordinate).unwrap();
    assert_eq!(fetched.description(), Some("kept"));
    assert!(fetched.has_entry(&nested));

    let mut retitled = fetched.clone();
    retitled.set_title(Some("  ".into()));
    assert!(matches!(
        service.update(&retitled).unwrap_err(),
        DriveError::Validation(_)
    ));

    let mut grown = fetched;
    grown
        .add_entry(FolderEntry::new(member(FOLDER_KIND, "other")))
        .unwrap();
    assert!(matches!(
        service.update(&grown).unwrap_err(),
        DriveError::InvalidKind(ref e) if e.kind == FOLDER_KIND
    ));
}

#[test]
fn rejected_publish_is_reported() {
    let service = setup();
    service.store().reject_publishes.set(true);
    let err = service.create(&owner(), NewFolder::new("docs")).unwrap_err();
    assert!(matches!(err, DriveError::PublishRejected(c) if c.identifier() == "docs"));
}
