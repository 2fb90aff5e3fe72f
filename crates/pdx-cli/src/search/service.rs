//! The query/cache/retry service.
//!
//! Coordinates the pieces the rest of the crate plugs together: validation
//! before any network call, the short-TTL result cache with new-search
//! invalidation, retry with linear backoff, and the count strategy that
//! degrades to a probe when the external database cannot answer "how many
//! total" inside its statement-timeout budget.

use std::sync::{Arc, Mutex};

use pdx_common::types::{PageRequest, ProteinRecord};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cache::{cache_key, QueryCache};
use crate::db::proteins::ProteinStore;
use crate::db::{DbError, DbResult};
use crate::retry::RetryPolicy;

use super::{SearchFilter, SearchPage, SequenceQuery, ValidationError};

/// Errors surfaced by search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Input rejected before any database call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database failure that survived the retry policy
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Search service over a [`ProteinStore`].
///
/// Owns the result cache explicitly (no global state); a clone of the inner
/// store is handed to the background count task, everything else runs
/// sequentially on the caller's task.
pub struct SearchService<S: ProteinStore> {
    store: Arc<S>,
    cache: QueryCache<SearchPage>,
    retry: RetryPolicy,
    count_retry: RetryPolicy,
    /// Signature of the most recent search, for new-search invalidation
    last_signature: Mutex<Option<String>>,
}

/// What a search run queries for: a filter set or a sequence term.
enum Target<'a> {
    Filter(&'a SearchFilter),
    Sequence(&'a SequenceQuery),
}

impl Target<'_> {
    async fn count<S: ProteinStore>(&self, store: &S) -> DbResult<i64> {
        match self {
            Target::Filter(filter) => store.count_filtered(filter).await,
            Target::Sequence(query) => store.count_by_sequence(query).await,
        }
    }

    async fn fetch<S: ProteinStore>(
        &self,
        store: &S,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ProteinRecord>> {
        match self {
            Target::Filter(filter) => store.fetch_filtered(filter, limit, offset).await,
            Target::Sequence(query) => store.fetch_by_sequence(query, limit, offset).await,
        }
    }
}

impl<S: ProteinStore> SearchService<S> {
    pub fn new(store: S) -> Self {
        Self::with_parts(
            store,
            QueryCache::new(),
            RetryPolicy::foreground(),
            RetryPolicy::background_count(),
        )
    }

    /// Construct with explicit collaborators (tests inject a manual clock
    /// and tight retry delays here).
    pub fn with_parts(
        store: S,
        cache: QueryCache<SearchPage>,
        retry: RetryPolicy,
        count_retry: RetryPolicy,
    ) -> Self {
        Self {
            store: Arc::new(store),
            cache,
            retry,
            count_retry,
            last_signature: Mutex::new(None),
        }
    }

    /// Filtered listing search: page size 50, ordered by id ascending.
    pub async fn search(
        &self,
        filter: &SearchFilter,
        page: i64,
    ) -> Result<SearchPage, SearchError> {
        filter.validate()?;
        let request = PageRequest::listing(page);
        self.run_cached(Target::Filter(filter), &filter.signature(), request)
            .await
    }

    /// Sequence search: page size 20; the truncation flag from contains-mode
    /// normalization is carried onto the page.
    pub async fn sequence_search(
        &self,
        query: &SequenceQuery,
        page: i64,
    ) -> Result<SearchPage, SearchError> {
        let request = PageRequest::sequence(page);
        let page = self
            .run_cached(Target::Sequence(query), &query.signature(), request)
            .await?;
        Ok(page.with_truncated(query.truncated))
    }

    /// Fetch one protein by id, retried like any other query. Zero rows is
    /// `None`, not an error.
    pub async fn fetch_protein(&self, id: i64) -> Result<Option<ProteinRecord>, SearchError> {
        let store = self.store.as_ref();
        let record = self.retry.run(|| store.fetch_by_id(id)).await?;
        Ok(record)
    }

    /// Filtered search that returns the data page immediately and resolves
    /// the total count in the background with the more patient retry policy.
    ///
    /// The page reports `has_more` from a probe row; the receiver yields
    /// `Some(total)` once the count lands, or `None` if it never does.
    /// Deferred pages bypass the cache so a later [`Self::search`] for the
    /// same key still gets an exact count.
    pub async fn search_deferred_count(
        &self,
        filter: &SearchFilter,
        page: i64,
    ) -> Result<(SearchPage, oneshot::Receiver<Option<i64>>), SearchError> {
        filter.validate()?;
        let request = PageRequest::listing(page);
        self.note_new_search(&filter.signature(), request.page);

        let data_page = self.probe_page(&Target::Filter(filter), request).await?;

        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let count_filter = filter.clone();
        let count_retry = self.count_retry;
        tokio::spawn(async move {
            let total = count_retry
                .run(|| store.count_filtered(&count_filter))
                .await;
            if let Err(ref err) = total {
                warn!(error = %err, "Background count never resolved");
            }
            let _ = tx.send(total.ok());
        });

        Ok((data_page, rx))
    }

    /// Drop all cached pages (user reset their filters).
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn run_cached(
        &self,
        target: Target<'_>,
        signature: &str,
        request: PageRequest,
    ) -> Result<SearchPage, SearchError> {
        self.note_new_search(signature, request.page);

        let key = cache_key(signature, request.page);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let page = self.execute(&target, request).await?;
        self.cache.insert(key, page.clone());
        Ok(page)
    }

    /// Count-then-fetch with the degradation path from the count strategy.
    async fn execute(
        &self,
        target: &Target<'_>,
        request: PageRequest,
    ) -> Result<SearchPage, SearchError> {
        let store = self.store.as_ref();

        match self.retry.run(|| target.count(store)).await {
            // Nothing matches; skip the data query entirely
            Ok(0) => {
                debug!(page = request.page, "Count is zero, skipping data query");
                Ok(SearchPage::counted(Vec::new(), request, 0))
            }
            Ok(total) => {
                let records = self
                    .retry
                    .run(|| target.fetch(store, request.page_size, request.offset()))
                    .await?;
                info!(
                    total = total,
                    rows = records.len(),
                    page = request.page,
                    "Search resolved with exact count"
                );
                Ok(SearchPage::counted(records, request, total))
            }
            Err(err) if err.is_statement_timeout() => {
                warn!(page = request.page, "Count timed out, probing instead");
                self.probe_page(target, request).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch `page_size + 1` rows and report `has_more` instead of a total.
    async fn probe_page(
        &self,
        target: &Target<'_>,
        request: PageRequest,
    ) -> Result<SearchPage, SearchError> {
        let store = self.store.as_ref();
        let mut records = self
            .retry
            .run(|| target.fetch(store, request.page_size + 1, request.offset()))
            .await?;

        let has_more = records.len() as i64 > request.page_size;
        records.truncate(request.page_size as usize);
        Ok(SearchPage::probed(records, request, has_more))
    }

    /// A page-1 search with a different signature than the previous search
    /// starts a new result line; the whole cache is cleared so stale pages
    /// from the abandoned line cannot leak into it.
    fn note_new_search(&self, signature: &str, page: i64) {
        let mut last = match self.last_signature.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if page == 1 && last.as_deref() != Some(signature) {
            self.cache.clear();
        }
        *last = Some(signature.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::test_support::{statement_timeout, transient};
    use crate::search::{CountOutcome, MatchMode};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// How the fake store's count queries behave.
    #[derive(Clone, Copy)]
    enum CountBehavior {
        Ok,
        Timeout,
        AlwaysFail,
    }

    struct FakeStore {
        records: Vec<ProteinRecord>,
        count_behavior: CountBehavior,
        fetch_calls: AtomicU32,
        count_calls: AtomicU32,
    }

    impl FakeStore {
        fn with_records(n: i64) -> Self {
            let records = (1..=n)
                .map(|id| ProteinRecord {
                    id,
                    accession: format!("P{:05}", id),
                    name: format!("Protein kinase {}", id),
                    organism: "Homo sapiens".to_string(),
                    domains: Some("PF03245(27...149)".to_string()),
                    sequence: "MALWMRLLPL".to_string(),
                    length: 10,
                })
                .collect();
            Self {
                records,
                count_behavior: CountBehavior::Ok,
                fetch_calls: AtomicU32::new(0),
                count_calls: AtomicU32::new(0),
            }
        }

        fn count_behavior(mut self, behavior: CountBehavior) -> Self {
            self.count_behavior = behavior;
            self
        }

        fn window(&self, limit: i64, offset: i64) -> Vec<ProteinRecord> {
            self.records
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect()
        }

        fn do_count(&self) -> DbResult<i64> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            match self.count_behavior {
                CountBehavior::Ok => Ok(self.records.len() as i64),
                CountBehavior::Timeout => Err(statement_timeout()),
                CountBehavior::AlwaysFail => Err(transient()),
            }
        }
    }

    #[async_trait]
    impl ProteinStore for FakeStore {
        async fn fetch_filtered(
            &self,
            _filter: &SearchFilter,
            limit: i64,
            offset: i64,
        ) -> DbResult<Vec<ProteinRecord>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.window(limit, offset))
        }

        async fn count_filtered(&self, _filter: &SearchFilter) -> DbResult<i64> {
            self.do_count()
        }

        async fn fetch_by_sequence(
            &self,
            _query: &SequenceQuery,
            limit: i64,
            offset: i64,
        ) -> DbResult<Vec<ProteinRecord>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.window(limit, offset))
        }

        async fn count_by_sequence(&self, _query: &SequenceQuery) -> DbResult<i64> {
            self.do_count()
        }

        async fn fetch_by_id(&self, id: i64) -> DbResult<Option<ProteinRecord>> {
            Ok(self.records.iter().find(|r| r.id == id).cloned())
        }
    }

    fn service(store: FakeStore) -> SearchService<FakeStore> {
        SearchService::with_parts(
            store,
            QueryCache::with_clock(
                ChronoDuration::minutes(5),
                Arc::new(crate::cache::SystemClock),
            ),
            RetryPolicy::new(3, Duration::from_millis(1)),
            RetryPolicy::new(5, Duration::from_millis(1)),
        )
    }

    fn kinase_filter() -> SearchFilter {
        SearchFilter::new(Some("kinase".to_string()), None, None)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_filter_makes_no_store_calls() {
        let svc = service(FakeStore::with_records(10));

        let err = svc.search(&SearchFilter::default(), 1).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Validation(ValidationError::EmptyFilter)
        ));
        assert_eq!(svc.store.count_calls.load(Ordering::SeqCst), 0);
        assert_eq!(svc.store.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_filter_names_the_field() {
        let svc = service(FakeStore::with_records(10));
        let filter = SearchFilter::new(None, Some("hu".to_string()), None);

        let err = svc.search(&filter, 1).await.unwrap_err();
        assert!(err.to_string().contains("organism"));
        assert_eq!(svc.store.count_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_count_and_page_math() {
        let svc = service(FakeStore::with_records(125));

        let page = svc.search(&kinase_filter(), 1).await.unwrap();
        assert_eq!(page.records.len(), 50);
        assert_eq!(page.page_size, 50);
        assert_eq!(
            page.count,
            CountOutcome::Exact {
                total: 125,
                total_pages: 3
            }
        );

        // Last page holds the remainder, never zero rows
        let last = svc.search(&kinase_filter(), 3).await.unwrap();
        assert_eq!(last.records.len(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_count_skips_data_query() {
        let svc = service(FakeStore::with_records(0));

        let page = svc.search(&kinase_filter(), 1).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(
            page.count,
            CountOutcome::Exact {
                total: 0,
                total_pages: 0
            }
        );
        assert_eq!(svc.store.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_timeout_degrades_to_probe() {
        let svc = service(FakeStore::with_records(60).count_behavior(CountBehavior::Timeout));

        let page = svc.search(&kinase_filter(), 1).await.unwrap();
        assert_eq!(page.records.len(), 50);
        assert_eq!(page.count, CountOutcome::Degraded { has_more: true });

        // Count is attempted once; timeout is never blindly retried
        assert_eq!(svc.store.count_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_on_final_page_reports_no_more() {
        let svc = service(FakeStore::with_records(60).count_behavior(CountBehavior::Timeout));

        let page = svc.search(&kinase_filter(), 2).await.unwrap();
        assert_eq!(page.records.len(), 10);
        assert_eq!(page.count, CountOutcome::Degraded { has_more: false });
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_search_hits_cache() {
        let svc = service(FakeStore::with_records(60));

        svc.search(&kinase_filter(), 1).await.unwrap();
        svc.search(&kinase_filter(), 1).await.unwrap();

        assert_eq!(svc.store.fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.store.count_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_page_one_search_clears_cache() {
        let svc = service(FakeStore::with_records(60));
        let insulin = SearchFilter::new(Some("insulin".to_string()), None, None);

        svc.search(&kinase_filter(), 1).await.unwrap();
        svc.search(&insulin, 1).await.unwrap();

        // The kinase pages must be gone, so this is a fresh fetch
        svc.search(&kinase_filter(), 1).await.unwrap();
        assert_eq!(svc.store.fetch_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_page_does_not_clear_cache() {
        let svc = service(FakeStore::with_records(125));

        svc.search(&kinase_filter(), 1).await.unwrap();
        svc.search(&kinase_filter(), 2).await.unwrap();
        svc.search(&kinase_filter(), 1).await.unwrap();

        // Page 1 stayed cached across the page-2 fetch
        assert_eq!(svc.store.fetch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_truncation_flag_propagates() {
        let svc = service(FakeStore::with_records(5));
        let long = "M".repeat(150);
        let query = SequenceQuery::new(&long, MatchMode::Contains).unwrap();

        let page = svc.sequence_search(&query, 1).await.unwrap();
        assert!(page.truncated);
        assert_eq!(page.page_size, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_prefix_page_size() {
        let svc = service(FakeStore::with_records(30));
        let query = SequenceQuery::new("MALW", MatchMode::Prefix).unwrap();

        let page = svc.sequence_search(&query, 1).await.unwrap();
        assert_eq!(page.records.len(), 20);
        assert!(!page.truncated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_count_resolves_total() {
        let svc = service(FakeStore::with_records(60));

        let (page, rx) = svc
            .search_deferred_count(&kinase_filter(), 1)
            .await
            .unwrap();
        assert_eq!(page.records.len(), 50);
        assert_eq!(page.count, CountOutcome::Degraded { has_more: true });

        assert_eq!(rx.await.unwrap(), Some(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_count_yields_none_when_exhausted() {
        let svc =
            service(FakeStore::with_records(10).count_behavior(CountBehavior::AlwaysFail));

        let (_, rx) = svc
            .search_deferred_count(&kinase_filter(), 1)
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cache_forces_fresh_fetch() {
        let svc = service(FakeStore::with_records(10));

        svc.search(&kinase_filter(), 1).await.unwrap();
        svc.clear_cache();
        svc.search(&kinase_filter(), 1).await.unwrap();

        assert_eq!(svc.store.fetch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_protein_detail() {
        let svc = service(FakeStore::with_records(10));

        let found = svc.fetch_protein(7).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(7));

        // Zero rows is an empty result, not an error
        assert!(svc.fetch_protein(999).await.unwrap().is_none());
    }
}
