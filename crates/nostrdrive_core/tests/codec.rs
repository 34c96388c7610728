use nostrdrive_core::{
    decode_drive, decode_folder, encode_drive, encode_folder, CodecError, Coordinate, Drive,
    Folder, FolderEntry, Record, DRIVE_KIND, FOLDER_KIND,
};

const OWNER: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

fn coordinate(kind: u32, identifier: &str) -> Coordinate {
    Coordinate::new(kind, OWNER, identifier).unwrap()
}

fn tag(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn sample_folder() -> Folder {
    let entries = vec![
        FolderEntry::new(coordinate(30023, "one")),
        FolderEntry::with_all_hints(
            coordinate(30024, "two"),
            Some("wss://relay.example".into()),
            Some("rec2".into()),
            None,
        ),
        FolderEntry::with_all_hints(coordinate(31922, "three"), None, None, Some("Three".into())),
    ];
    let mut folder = Folder::with_entries(coordinate(FOLDER_KIND, "docs"), entries).unwrap();
    folder.set_title(Some("Docs".into()));
    folder.set_created_at(1_700_000_000);
    folder
}

#[test]
fn folder_round_trips_in_order() {
    let folder = sample_folder();
    let record = encode_folder(&folder);

    assert_eq!(record.id, None);
    assert_eq!(record.kind, FOLDER_KIND);
    assert_eq!(record.owner, OWNER);
    assert_eq!(record.content, "");
    assert_eq!(record.tags[0], tag(&["d", "docs"]));

    let decoded = decode_folder(&record).unwrap();
    assert_eq!(decoded.coordinate(), folder.coordinate());
    assert_eq!(decoded.title(), Some("Docs"));
    assert_eq!(decoded.description(), None);
    assert_eq!(decoded.entries(), folder.entries());
    assert_eq!(decoded.created_at(), 1_700_000_000);
}

#[test]
fn folder_tags_follow_canonical_layout() {
    let mut folder = sample_folder();
    folder.set_description(Some("All docs".into()));
    folder.archive();
    let record = encode_folder(&folder);

    let one = coordinate(30023, "one").to_string();
    let two = coordinate(30024, "two").to_string();
    let three = coordinate(31922, "three").to_string();
    assert_eq!(
        record.tags,
        vec![
            tag(&["d", "docs"]),
            tag(&["title", "Docs"]),
            tag(&["description", "All docs"]),
            tag(&["a", &one, "", ""]),
            tag(&["a", &two, "wss://relay.example", "rec2"]),
            tag(&["a", &three, "", "", "Three"]),
            tag(&["status", "archived"]),
        ]
    );
}

#[test]
fn empty_title_is_distinct_from_absent_title() {
    let mut folder = Folder::new(coordinate(FOLDER_KIND, "docs")).unwrap();
    folder.set_title(Some(String::new()));
    let decoded = decode_folder(&encode_folder(&folder)).unwrap();
    assert_eq!(decoded.title(), Some(""));
    assert_eq!(decoded.description(), None);
}

#[test]
fn malformed_address_tags_are_skipped() {
    let good = coordinate(30023, "good").to_string();
    let record = Record::new(
        FOLDER_KIND,
        OWNER,
        1,
        vec![
            tag(&["d", "docs"]),
            tag(&["a", &good, "", ""]),
            tag(&["a", "not-a-coordinate", "", ""]),
            tag(&["a"]),
            tag(&["p", OWNER]),
        ],
    );
    let folder = decode_folder(&record).unwrap();
    assert_eq!(folder.len(), 1);
    assert_eq!(folder.entries()[0].coordinate().to_string(), good);
}

#[test]
fn decode_reads_envelope_metadata() {
    let mut record = encode_folder(&sample_folder());
    record.id = Some("rec-9".into());
    record.created_at = 42;
    let folder = decode_folder(&record).unwrap();
    assert_eq!(folder.record_id(), Some("rec-9"));
    assert_eq!(folder.created_at(), 42);
    assert!(!folder.is_archived());
}

#[test]
fn decode_rejects_wrong_kind_and_missing_identifier() {
    let drive_record = Record::new(DRIVE_KIND, OWNER, 1, vec![tag(&["d", "main"])]);
    assert_eq!(
        decode_folder(&drive_record).unwrap_err(),
        CodecError::KindMismatch {
            expected: FOLDER_KIND,
            actual: DRIVE_KIND
        }
    );

    let no_identifier = Record::new(FOLDER_KIND, OWNER, 1, vec![tag(&["title", "x"])]);
    assert_eq!(
        decode_folder(&no_identifier).unwrap_err(),
        CodecError::MissingIdentifier
    );
    let bare_identifier = Record::new(FOLDER_KIND, OWNER, 1, vec![tag(&["d"])]);
    assert_eq!(
        decode_folder(&bare_identifier).unwrap_err(),
        CodecError::MissingIdentifier
    );

    let bad_owner = Record::new(FOLDER_KIND, "nothex", 1, vec![tag(&["d", "docs"])]);
    assert!(matches!(
        decode_folder(&bad_owner).unwrap_err(),
        CodecError::InvalidCoordinate(_)
    ));
}

#[test]
fn drive_round_trips_roots() {
    let roots = vec![coordinate(FOLDER_KIND, "a"), coordinate(FOLDER_KIND, "b")];
    let mut drive = Drive::new(coordinate(DRIVE_KIND, "main"), roots.clone()).unwrap();
    drive.set_description(Some("Main drive".into()));
    drive.archive();

    let record = encode_drive(&drive);
    assert_eq!(record.kind, DRIVE_KIND);
    assert_eq!(record.tags[2], tag(&["a", &roots[0].to_string()]));

    let decoded = decode_drive(&record).unwrap();
    assert_eq!(decoded.roots(), roots.as_slice());
    assert_eq!(decoded.description(), Some("Main drive"));
    assert!(decoded.is_archived());
}

#[test]
fn drive_decode_skips_non_folder_roots() {
    let folder_root = coordinate(FOLDER_KIND, "a").to_string();
    let article = coordinate(30023, "post").to_string();
    let record = Record::new(
        DRIVE_KIND,
        OWNER,
        1,
        vec![
            tag(&["d", "main"]),
            tag(&["a", &article]),
            tag(&["a", &folder_root]),
            tag(&["a", "garbage"]),
        ],
    );
    let drive = decode_drive(&record).unwrap();
    assert_eq!(drive.roots().len(), 1);
    assert_eq!(drive.roots()[0].to_string(), folder_root);
}

#[test]
fn other_status_values_do_not_archive() {
    let record = Record::new(
        FOLDER_KIND,
        OWNER,
        1,
        vec![tag(&["d", "docs"]), tag(&["status", "draft"])],
    );
    assert!(!decode_folder(&record).unwrap().is_archived());
}
