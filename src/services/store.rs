use crate::core::pager::{Page, PageRequest, ResultPager};
use crate::core::predicate::Predicate;
use crate::models::{Estate, NewEstate};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when reading or writing listings
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Listing persistence as the HTTP layer sees it
///
/// Every implementation returns pages in the listing order
/// (`year, month, day, time` ascending).
#[async_trait]
pub trait EstateRepository: Send + Sync {
    /// Listings satisfying every constraint of `predicate`
    async fn find(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<Estate>, StoreError>;

    /// Listings created by one user
    async fn find_by_user(&self, user_id: i32, page: PageRequest) -> Result<Page<Estate>, StoreError>;

    /// Store a new listing and return it with its assigned id
    async fn insert(&self, estate: NewEstate) -> Result<Estate, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Process-local listing store
///
/// Evaluates predicates in memory; used by tests and benchmarks.
pub struct InMemoryEstates {
    estates: RwLock<Vec<Estate>>,
    pager: ResultPager,
}

impl InMemoryEstates {
    pub fn new(estates: Vec<Estate>) -> Self {
        Self {
            estates: RwLock::new(estates),
            // Callers hand in an already-capped PageRequest
            pager: ResultPager::new(usize::MAX, usize::MAX),
        }
    }

    pub async fn len(&self) -> usize {
        self.estates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.estates.read().await.is_empty()
    }
}

impl Default for InMemoryEstates {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl EstateRepository for InMemoryEstates {
    async fn find(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<Estate>, StoreError> {
        let candidates: Vec<Estate> = self
            .estates
            .read()
            .await
            .iter()
            .filter(|estate| predicate.matches(estate))
            .cloned()
            .collect();

        Ok(self.pager.paginate(candidates, page))
    }

    async fn find_by_user(&self, user_id: i32, page: PageRequest) -> Result<Page<Estate>, StoreError> {
        let candidates: Vec<Estate> = self
            .estates
            .read()
            .await
            .iter()
            .filter(|estate| estate.user_id == Some(user_id))
            .cloned()
            .collect();

        Ok(self.pager.paginate(candidates, page))
    }

    async fn insert(&self, estate: NewEstate) -> Result<Estate, StoreError> {
        let mut estates = self.estates.write().await;
        let next_id = estates.iter().map(|e| e.estate_id).max().unwrap_or(0) + 1;
        let estate = estate.into_estate(next_id);
        estates.push(estate.clone());
        Ok(estate)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
