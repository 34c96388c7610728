//! Drive record shaping.

use super::{
    address_tags, archived_tag, decode_header, encode_header, tag, CodecResult, TAG_ADDRESS,
};
use crate::model::drive::Drive;
use crate::model::{DRIVE_KIND, FOLDER_KIND};
use crate::store::Record;

/// Encodes `drive` as an unpublished record (`id = None`).
///
/// Roots are emitted as bare `["a", coordinate]` tags in root order.
pub fn encode_drive(drive: &Drive) -> Record {
    let mut tags = encode_header(drive.identifier(), drive.title(), drive.description());
    tags.extend(
        drive
            .roots()
            .iter()
            .map(|root| tag(TAG_ADDRESS, [root.to_string().as_str()])),
    );
    if drive.is_archived() {
        tags.push(archived_tag());
    }
    Record::new(DRIVE_KIND, drive.owner(), drive.created_at(), tags)
}

/// Decodes a drive record.
///
/// Root tags that do not parse, or that name something other than a
/// folder, are skipped.
pub fn decode_drive(record: &Record) -> CodecResult<Drive> {
    let header = decode_header(record, DRIVE_KIND)?;
    let roots = address_tags(record)
        .map(|(coordinate, _)| coordinate)
        .filter(|coordinate| coordinate.kind() == FOLDER_KIND)
        .collect();

    let mut drive = Drive::new(header.coordinate, roots)?;
    drive.set_title(header.title);
    drive.set_description(header.description);
    drive.set_record_id(record.id.clone());
    drive.set_created_at(record.created_at);
    if header.archived {
        drive.archive();
    }
    Ok(drive)
}
