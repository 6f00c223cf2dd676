//! In-process catalog implementing both gateways.
//!
//! [`InMemoryCatalog`] holds a fixed list of entities plus the current user's
//! bookmarks. It answers page queries the way the collection service does
//! (keyword, level range, job/category filters, sort, offset paging) and
//! keeps bookmark ids server-assigned and monotonically increasing.
//!
//! Failures can be queued with [`InMemoryCatalog::fail_next_fetch`] and
//! [`InMemoryCatalog::fail_next_mutation`]; each queued error is returned by
//! exactly one subsequent call.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use codex_core::{
    BookmarkId, EntityId, EntityKind, ListEntity, NetworkError, PageQuery, PagedResult,
    SortOrder,
};
use tokio::sync::RwLock;

use crate::traits::{BookmarkGateway, BookmarkIntent, CollectionGateway};

/// First id handed out when the seed data carries no bookmarks.
const FIRST_BOOKMARK_ID: BookmarkId = 900;

/// One catalog row plus the attributes the filter sheet can select on.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub entity: ListEntity,
    pub job_id: Option<i64>,
    pub category_id: Option<i64>,
}

impl CatalogEntry {
    pub fn new(entity: ListEntity) -> Self {
        Self {
            entity,
            job_id: None,
            category_id: None,
        }
    }

    pub fn with_job(mut self, job_id: i64) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct BookmarkRecord {
    bookmark_id: BookmarkId,
    /// Creation order, used by [`SortOrder::RecentlyBookmarked`].
    seq: u64,
}

#[derive(Debug, Default)]
struct CatalogData {
    entries: Vec<CatalogEntry>,
    bookmarks: HashMap<EntityId, BookmarkRecord>,
    next_bookmark_id: BookmarkId,
    next_seq: u64,
    failing_fetches: VecDeque<NetworkError>,
    failing_mutations: VecDeque<NetworkError>,
}

impl CatalogData {
    fn bookmark_of(&self, id: EntityId) -> Option<BookmarkId> {
        self.bookmarks.get(&id).map(|b| b.bookmark_id)
    }

    fn record_bookmark(&mut self, entity_id: EntityId, bookmark_id: BookmarkId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.bookmarks
            .insert(entity_id, BookmarkRecord { bookmark_id, seq });
        self.next_bookmark_id = self.next_bookmark_id.max(bookmark_id + 1);
    }

    fn matches(&self, entry: &CatalogEntry, query: &PageQuery, bookmarked_only: bool) -> bool {
        let entity = &entry.entity;
        if bookmarked_only && !self.bookmarks.contains_key(&entity.id) {
            return false;
        }
        if let Some(keyword) = &query.keyword {
            if !entity
                .name
                .to_lowercase()
                .contains(&keyword.to_lowercase())
            {
                return false;
            }
        }
        if let Some(min) = query.min_level {
            if entity.level.map_or(true, |level| level < min) {
                return false;
            }
        }
        if let Some(max) = query.max_level {
            if entity.level.map_or(true, |level| level > max) {
                return false;
            }
        }
        if !query.job_ids.is_empty()
            && !entry.job_id.is_some_and(|job| query.job_ids.contains(&job))
        {
            return false;
        }
        if !query.category_ids.is_empty()
            && !entry
                .category_id
                .is_some_and(|category| query.category_ids.contains(&category))
        {
            return false;
        }
        true
    }

    fn compare(&self, a: &ListEntity, b: &ListEntity, query: &PageQuery) -> CmpOrdering {
        match query.sort {
            None => CmpOrdering::Equal,
            Some(SortOrder::Relevance) => {
                let starts = |e: &ListEntity| match &query.keyword {
                    Some(k) => e.name.to_lowercase().starts_with(&k.to_lowercase()),
                    None => false,
                };
                starts(b).cmp(&starts(a))
            }
            Some(SortOrder::NameAsc) => a.name.cmp(&b.name),
            Some(SortOrder::NameDesc) => b.name.cmp(&a.name),
            Some(SortOrder::LevelAsc) => cmp_level(a.level, b.level, false),
            Some(SortOrder::LevelDesc) => cmp_level(a.level, b.level, true),
            Some(SortOrder::RecentlyBookmarked) => {
                let seq = |e: &ListEntity| self.bookmarks.get(&e.id).map(|r| r.seq);
                seq(b).cmp(&seq(a))
            }
        }
        .then_with(|| a.id.cmp(&b.id))
    }

    fn page(&self, query: &PageQuery, bookmarked_only: bool) -> PagedResult {
        let mut matching: Vec<ListEntity> = self
            .entries
            .iter()
            .filter(|entry| self.matches(entry, query, bookmarked_only))
            .map(|entry| ListEntity {
                bookmark_id: self.bookmark_of(entry.entity.id),
                ..entry.entity.clone()
            })
            .collect();

        if query.sort.is_some() {
            matching.sort_by(|a, b| self.compare(a, b, query));
        }

        let total_elements = matching.len() as u64;
        let contents = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();

        PagedResult {
            contents,
            total_elements,
        }
    }
}

/// Unknown levels sort last in both directions.
fn cmp_level(a: Option<i32>, b: Option<i32>, descending: bool) -> CmpOrdering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

/// In-memory collection and bookmark service.
///
/// Designed to be wrapped in `Arc` and handed to several stores at once.
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
    fetch_count: AtomicUsize,
    mutation_count: AtomicUsize,
}

impl InMemoryCatalog {
    /// Build a catalog from seed entries.
    ///
    /// Entities seeded with a `bookmark_id` start out bookmarked.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut data = CatalogData {
            next_bookmark_id: FIRST_BOOKMARK_ID,
            ..Default::default()
        };
        for entry in &entries {
            if let Some(bookmark_id) = entry.entity.bookmark_id {
                data.record_bookmark(entry.entity.id, bookmark_id);
            }
        }
        data.entries = entries;

        Self {
            data: RwLock::new(data),
            fetch_count: AtomicUsize::new(0),
            mutation_count: AtomicUsize::new(0),
        }
    }

    /// A catalog of `count` synthetic entities with ids `1..=count`.
    ///
    /// Kinds cycle through [`EntityKind::ALL`]; levels, jobs and categories
    /// are derived from the id so that filters have something to select.
    pub fn generated(count: usize) -> Self {
        let entries = (1..=count as EntityId)
            .map(|id| {
                let kind = EntityKind::ALL[(id as usize - 1) % EntityKind::ALL.len()];
                let entity = ListEntity::new(id, format!("{} {id:03}", kind.as_str()), kind)
                    .with_level(((id * 7) % 200) as i32 + 1)
                    .with_image_url(format!("https://cdn.example.com/{}/{id}.png", kind.as_str()));
                CatalogEntry::new(entity)
                    .with_job(id % 5)
                    .with_category(id % 3)
            })
            .collect();
        Self::new(entries)
    }

    /// Add an entity at the front of the catalog, shifting every later page.
    pub async fn insert_front(&self, entry: CatalogEntry) {
        let mut data = self.data.write().await;
        if let Some(bookmark_id) = entry.entity.bookmark_id {
            data.record_bookmark(entry.entity.id, bookmark_id);
        }
        data.entries.insert(0, entry);
    }

    /// Make the next `fetch` fail with `error`.
    pub async fn fail_next_fetch(&self, error: NetworkError) {
        self.data.write().await.failing_fetches.push_back(error);
    }

    /// Make the next `set_bookmark` fail with `error`.
    pub async fn fail_next_mutation(&self, error: NetworkError) {
        self.data.write().await.failing_mutations.push_back(error);
    }

    /// Current bookmark id of an entity.
    pub async fn bookmark_of(&self, entity_id: EntityId) -> Option<BookmarkId> {
        self.data.read().await.bookmark_of(entity_id)
    }

    /// The stored entity with its current bookmark id.
    pub async fn entity(&self, entity_id: EntityId) -> Option<ListEntity> {
        let data = self.data.read().await;
        data.entries
            .iter()
            .find(|entry| entry.entity.id == entity_id)
            .map(|entry| ListEntity {
                bookmark_id: data.bookmark_of(entity_id),
                ..entry.entity.clone()
            })
    }

    /// Number of `fetch` calls served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Number of `set_bookmark` calls served so far, including failed ones.
    pub fn mutation_count(&self) -> usize {
        self.mutation_count.load(Ordering::SeqCst)
    }

    /// A collection gateway over the bookmarked entities only.
    pub fn bookmarked(self: &Arc<Self>) -> BookmarkedView {
        BookmarkedView {
            catalog: Arc::clone(self),
        }
    }

    async fn query(&self, query: &PageQuery, bookmarked_only: bool) -> Result<PagedResult, NetworkError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let mut data = self.data.write().await;
        if let Some(error) = data.failing_fetches.pop_front() {
            tracing::debug!(page = query.page, error = %error, "Injected fetch failure");
            return Err(error);
        }
        query
            .validate()
            .map_err(|e| NetworkError::new(400, e.to_string()))?;

        Ok(data.page(query, bookmarked_only))
    }
}

#[async_trait]
impl CollectionGateway for InMemoryCatalog {
    async fn fetch(&self, query: &PageQuery) -> Result<PagedResult, NetworkError> {
        self.query(query, false).await
    }
}

#[async_trait]
impl BookmarkGateway for InMemoryCatalog {
    async fn set_bookmark(
        &self,
        entity_id: EntityId,
        intent: BookmarkIntent,
    ) -> Result<Option<BookmarkId>, NetworkError> {
        self.mutation_count.fetch_add(1, Ordering::SeqCst);

        let mut data = self.data.write().await;
        if let Some(error) = data.failing_mutations.pop_front() {
            tracing::debug!(entity_id, error = %error, "Injected bookmark failure");
            return Err(error);
        }

        let entry = data
            .entries
            .iter()
            .find(|e| e.entity.id == entity_id)
            .ok_or_else(|| NetworkError::new(404, format!("entity {entity_id} not found")))?;
        if entry.entity.kind != intent.kind() {
            return Err(NetworkError::new(
                400,
                format!(
                    "entity {entity_id} is a {}, not a {}",
                    entry.entity.kind.as_str(),
                    intent.kind().as_str()
                ),
            ));
        }

        match intent {
            BookmarkIntent::Set { .. } => {
                if data.bookmarks.contains_key(&entity_id) {
                    return Err(NetworkError::new(
                        409,
                        format!("entity {entity_id} is already bookmarked"),
                    ));
                }
                let bookmark_id = data.next_bookmark_id;
                data.record_bookmark(entity_id, bookmark_id);
                Ok(Some(bookmark_id))
            }
            BookmarkIntent::Delete { bookmark_id, .. } => match data.bookmark_of(entity_id) {
                Some(current) if current == bookmark_id => {
                    data.bookmarks.remove(&entity_id);
                    Ok(None)
                }
                _ => Err(NetworkError::new(
                    404,
                    format!("bookmark {bookmark_id} not found"),
                )),
            },
        }
    }
}

/// Collection gateway listing only bookmarked entities (the bookmark screen).
pub struct BookmarkedView {
    catalog: Arc<InMemoryCatalog>,
}

#[async_trait]
impl CollectionGateway for BookmarkedView {
    async fn fetch(&self, query: &PageQuery) -> Result<PagedResult, NetworkError> {
        self.catalog.query(query, true).await
    }
}
