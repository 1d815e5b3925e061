// Workspace - owns one managed record list per dashboard page

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::framework::page::PageDefinition;
use crate::framework::record_list::ManagedRecordList;
use crate::infrastructure::id_generator::RecordIdGenerator;
use crate::schemas;

/// Registry of page collections, in sidebar order.
///
/// Each collection sits behind its own lock, so a mutation of one page
/// is a single atomic step and never blocks other pages.
pub struct Workspace {
    pages: Vec<Arc<PageDefinition>>,
    lists: HashMap<&'static str, RwLock<ManagedRecordList>>,
}

impl Workspace {
    pub fn new(definitions: Vec<PageDefinition>, ids: Arc<RecordIdGenerator>) -> AppResult<Self> {
        let mut pages = Vec::with_capacity(definitions.len());
        let mut lists = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            if lists.contains_key(definition.slug) {
                return Err(AppError::ConfigurationError(format!(
                    "duplicate page slug '{}'",
                    definition.slug
                )));
            }
            let list = definition.instantiate(ids.clone())?;
            lists.insert(definition.slug, RwLock::new(list));
            pages.push(Arc::new(definition));
        }

        info!("Workspace ready with {} pages", pages.len());
        Ok(Self { pages, lists })
    }

    /// Every page module shipped with the dashboard.
    pub fn with_default_pages(ids: Arc<RecordIdGenerator>) -> AppResult<Self> {
        Self::new(schemas::all_pages(), ids)
    }

    pub fn pages(&self) -> &[Arc<PageDefinition>] {
        &self.pages
    }

    pub fn page(&self, slug: &str) -> AppResult<Arc<PageDefinition>> {
        self.pages
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| unknown_page(slug))
    }

    pub fn list(&self, slug: &str) -> AppResult<&RwLock<ManagedRecordList>> {
        self.lists.get(slug).ok_or_else(|| unknown_page(slug))
    }

    /// Restore a page's seed data, as if it had been freshly opened.
    pub async fn reset(&self, slug: &str) -> AppResult<()> {
        self.list(slug)?.write().await.reset();
        Ok(())
    }
}

fn unknown_page(slug: &str) -> AppError {
    AppError::NotFound(format!("Page '{}' not found", slug))
}
