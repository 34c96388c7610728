//! Folder record shaping.

use super::{
    address_tags, archived_tag, decode_header, encode_header, optional_slot, tag, CodecResult,
    TAG_ADDRESS,
};
use crate::model::entry::FolderEntry;
use crate::model::folder::Folder;
use crate::model::FOLDER_KIND;
use crate::store::{Record, Tag};

/// Encodes `folder` as an unpublished record (`id = None`).
///
/// Tag order: `d`, `title`?, `description`?, one `a` per entry, `status`?.
pub fn encode_folder(folder: &Folder) -> Record {
    let mut tags = encode_header(folder.identifier(), folder.title(), folder.description());
    tags.extend(folder.entries().iter().map(entry_tag));
    if folder.is_archived() {
        tags.push(archived_tag());
    }
    Record::new(FOLDER_KIND, folder.owner(), folder.created_at(), tags)
}

/// Decodes a folder record.
///
/// Entries keep tag order. Unparsable `a` tags are skipped and duplicate
/// members are kept as published.
///
/// # Errors
/// - `KindMismatch` when `record` is not a folder record.
/// - `MissingIdentifier` when the `d` tag is absent or has no value.
/// - `InvalidCoordinate` when the envelope owner is not a valid key.
pub fn decode_folder(record: &Record) -> CodecResult<Folder> {
    let header = decode_header(record, FOLDER_KIND)?;
    let entries = address_tags(record)
        .map(|(coordinate, tag)| {
            FolderEntry::with_all_hints(
                coordinate,
                optional_slot(tag, 2),
                optional_slot(tag, 3),
                optional_slot(tag, 4),
            )
        })
        .collect();

    let mut folder = Folder::with_entries(header.coordinate, entries)?;
    folder.set_title(header.title);
    folder.set_description(header.description);
    folder.set_record_id(record.id.clone());
    folder.set_created_at(record.created_at);
    if header.archived {
        folder.archive();
    }
    Ok(folder)
}

fn entry_tag(entry: &FolderEntry) -> Tag {
    let coordinate = entry.coordinate().to_string();
    let mut values = vec![
        coordinate.as_str(),
        entry.relay_hint().unwrap_or(""),
        entry.last_seen_record_id().unwrap_or(""),
    ];
    if let Some(name) = entry.name_hint() {
        values.push(name);
    }
    tag(TAG_ADDRESS, values)
}

#[cfg(test)]
mod tests {
    use super::entry_tag;
    use crate::model::coordinate::Coordinate;
    use crate::model::entry::FolderEntry;

    fn member() -> Coordinate {
        Coordinate::new(30023, "ab".repeat(32), "post").unwrap()
    }

    #[test]
    fn entry_tag_always_carries_relay_and_last_seen_slots() {
        let tag = entry_tag(&FolderEntry::new(member()));
        assert_eq!(tag.len(), 4);
        assert_eq!(tag[0], "a");
        assert_eq!(tag[2], "");
        assert_eq!(tag[3], "");
    }

    #[test]
    fn entry_tag_appends_name_slot_only_when_present() {
        let entry = FolderEntry::with_all_hints(
            member(),
            Some("wss://relay.example".into()),
            None,
            Some("Post".into()),
        );
        let tag = entry_tag(&entry);
        assert_eq!(tag.len(), 5);
        assert_eq!(tag[2], "wss://relay.example");
        assert_eq!(tag[4], "Post");
    }
}
