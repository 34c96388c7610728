//! Folder member kind allow-list.

use crate::model::FOLDER_KIND;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Curated publication index.
pub const KIND_INDEX: u32 = 30_040;
/// AsciiDoc content section.
pub const KIND_ASCIIDOC: u32 = 30_041;
/// Markdown draft.
pub const KIND_MARKDOWN_DRAFT: u32 = 30_024;
/// Markdown long-form article.
pub const KIND_MARKDOWN_ARTICLE: u32 = 30_023;
/// Calendar.
pub const KIND_CALENDAR: u32 = 31_924;
/// Time-based calendar event.
pub const KIND_CALENDAR_TIME_EVENT: u32 = 31_923;
/// Date-based calendar event.
pub const KIND_CALENDAR_DATE_EVENT: u32 = 31_922;

const STANDARD_MEMBER_KINDS: &[u32] = &[
    KIND_INDEX,
    KIND_ASCIIDOC,
    KIND_MARKDOWN_DRAFT,
    KIND_MARKDOWN_ARTICLE,
    KIND_CALENDAR,
    KIND_CALENDAR_TIME_EVENT,
    KIND_CALENDAR_DATE_EVENT,
];

/// Returns the default member kinds (no folder nesting).
pub fn standard_member_kinds() -> &'static [u32] {
    STANDARD_MEMBER_KINDS
}

/// Member kind rejected by the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindError {
    pub kind: u32,
    pub allowed: Vec<u32>,
}

impl Display for KindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let allowed = self
            .allowed
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "kind {} is not allowed, allowed kinds are: {allowed}",
            self.kind
        )
    }
}

impl Error for KindError {}

/// Allow-list of record kinds permitted as folder members.
///
/// [`KindValidator::standard`] and [`KindValidator::with_folder_nesting`]
/// are the stock variants; [`KindValidator::new`] takes any list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindValidator {
    allowed: Vec<u32>,
}

impl KindValidator {
    /// Creates a validator over `allowed`, keeping first-seen order and
    /// dropping repeats.
    pub fn new(allowed: impl IntoIterator<Item = u32>) -> Self {
        let mut kinds = Vec::new();
        for kind in allowed {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Self { allowed: kinds }
    }

    /// Document, article, index and calendar kinds.
    pub fn standard() -> Self {
        Self::new(STANDARD_MEMBER_KINDS.iter().copied())
    }

    /// Standard kinds plus folders, which allows nested folders.
    pub fn with_folder_nesting() -> Self {
        Self::new(
            STANDARD_MEMBER_KINDS
                .iter()
                .copied()
                .chain(std::iter::once(FOLDER_KIND)),
        )
    }

    pub fn is_allowed(&self, kind: u32) -> bool {
        self.allowed.contains(&kind)
    }

    /// # Errors
    /// - `KindError` when `kind` is not allow-listed.
    pub fn validate(&self, kind: u32) -> Result<(), KindError> {
        if self.is_allowed(kind) {
            return Ok(());
        }
        Err(KindError {
            kind,
            allowed: self.allowed.clone(),
        })
    }

    /// Snapshot of the allow-list in configured order.
    pub fn allowed_kinds(&self) -> Vec<u32> {
        self.allowed.clone()
    }

    pub fn allows_folder_nesting(&self) -> bool {
        self.is_allowed(FOLDER_KIND)
    }
}

impl Default for KindValidator {
    fn default() -> Self {
        Self::standard()
    }
}
