//! Collection rows as delivered by the collection gateway.

use serde::{Deserialize, Serialize};

use crate::types::{BookmarkId, EntityId};

/// The dictionary section an entity belongs to.
///
/// The kind is needed to re-create a bookmark, since the bookmark service
/// keys bookmarks by `(kind, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Item,
    Monster,
    Npc,
    Quest,
    Map,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Item,
        EntityKind::Monster,
        EntityKind::Npc,
        EntityKind::Quest,
        EntityKind::Map,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Monster => "monster",
            EntityKind::Npc => "npc",
            EntityKind::Quest => "quest",
            EntityKind::Map => "map",
        }
    }
}

/// One row in a collection screen.
///
/// `bookmark_id` is `Some` iff the signed-in user has bookmarked the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntity {
    pub id: EntityId,
    pub bookmark_id: Option<BookmarkId>,
    pub name: String,
    pub image_url: String,
    pub level: Option<i32>,
    pub kind: EntityKind,
}

impl ListEntity {
    pub fn new(id: EntityId, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            bookmark_id: None,
            name: name.into(),
            image_url: String::new(),
            level: None,
            kind,
        }
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_bookmark(mut self, bookmark_id: BookmarkId) -> Self {
        self.bookmark_id = Some(bookmark_id);
        self
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmark_id.is_some()
    }
}

/// One page of a collection plus the server-side total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PagedResult {
    pub contents: Vec<ListEntity>,
    pub total_elements: u64,
}
