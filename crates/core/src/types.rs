/// Server-side primary key of a collection entity.
pub type EntityId = i64;

/// Server-assigned identifier of a bookmark row. Required to delete it.
pub type BookmarkId = i64;
