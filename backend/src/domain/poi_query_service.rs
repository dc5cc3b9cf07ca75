//! Read-side POI service: listing, ranked search and best match.

use std::sync::Arc;

use async_trait::async_trait;

use super::ports::{PoiListRequest, PoiQuery, PoiRepository, PoiRepositoryError};
use super::ranking::{DEFAULT_SUGGESTION_LIMIT, ScoredMatch, find_best_match, rank_suggestions};
use super::{Error, PointOfInterest};

/// Upper bound applied to caller-supplied suggestion limits.
pub const MAX_SUGGESTION_LIMIT: usize = 100;

/// Domain service implementing [`PoiQuery`] over a [`PoiRepository`].
#[derive(Clone)]
pub struct PoiQueryService<R> {
    repository: Arc<R>,
}

impl<R> PoiQueryService<R> {
    /// Create a service reading from `repository`.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: PoiRepository> PoiQueryService<R> {
    async fn load(&self) -> Result<Vec<PointOfInterest>, Error> {
        self.repository.list_all().await.map_err(map_repository_error)
    }
}

#[async_trait]
impl<R: PoiRepository> PoiQuery for PoiQueryService<R> {
    async fn list(&self, request: PoiListRequest) -> Result<Vec<PointOfInterest>, Error> {
        let pois = self.load().await?;
        let filter = request
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        let limit = request.limit.unwrap_or(usize::MAX);
        Ok(pois
            .into_iter()
            .filter(|poi| {
                filter
                    .as_deref()
                    .is_none_or(|term| poi.name().to_lowercase().contains(term))
            })
            .take(limit)
            .collect())
    }

    async fn search(&self, term: &str, limit: Option<usize>) -> Result<Vec<ScoredMatch>, Error> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
            .min(MAX_SUGGESTION_LIMIT);
        let pois = self.load().await?;
        Ok(rank_suggestions(&pois, term, limit))
    }

    async fn best_match(&self, term: &str) -> Result<Option<PointOfInterest>, Error> {
        if term.trim().is_empty() {
            return Ok(None);
        }
        let pois = self.load().await?;
        Ok(find_best_match(&pois, term).cloned())
    }
}

fn map_repository_error(error: PoiRepositoryError) -> Error {
    Error::storage_failure(error.to_string())
}

#[cfg(test)]
mod tests {
    //! Listing, search and best-match behaviour over stored POIs.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixturePoiRepository, MockPoiRepository};
    use crate::test_support::poi_store::{InMemoryPoiStore, StoreCall};
    use rstest::rstest;

    fn fixture_service() -> PoiQueryService<FixturePoiRepository> {
        PoiQueryService::new(Arc::new(FixturePoiRepository))
    }

    fn names(pois: &[PointOfInterest]) -> Vec<&str> {
        pois.iter().map(PointOfInterest::name).collect()
    }

    #[tokio::test]
    async fn list_returns_every_poi_in_id_order() {
        let pois = fixture_service()
            .list(PoiListRequest::default())
            .await
            .expect("list");
        assert_eq!(
            names(&pois),
            ["Seoul Station", "Gangnam Station", "Coffee Bean Gangnam"]
        );
    }

    #[rstest]
    #[case(Some("gangnam"), None, vec!["Gangnam Station", "Coffee Bean Gangnam"])]
    #[case(Some("  STATION "), Some(1), vec!["Seoul Station"])]
    #[case(Some("   "), Some(2), vec!["Seoul Station", "Gangnam Station"])]
    #[case(Some("busan"), None, vec![])]
    #[tokio::test]
    async fn list_filters_and_truncates(
        #[case] filter: Option<&str>,
        #[case] limit: Option<usize>,
        #[case] expected: Vec<&str>,
    ) {
        let request = PoiListRequest {
            filter: filter.map(str::to_owned),
            limit,
        };
        let pois = fixture_service().list(request).await.expect("list");
        assert_eq!(names(&pois), expected);
    }

    #[rstest]
    #[case("gang", vec!["Gangnam Station", "Coffee Bean Gangnam"])]
    #[case("station", vec!["Gangnam Station", "Seoul Station"])]
    #[case("seoul station", vec!["Seoul Station"])]
    #[case("busan", vec![])]
    #[tokio::test]
    async fn search_ranks_suggestions(#[case] term: &str, #[case] expected: Vec<&str>) {
        let matches = fixture_service().search(term, None).await.expect("search");
        let actual: Vec<&str> = matches.iter().map(|m| m.poi.name()).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn blank_search_skips_storage() {
        let store = InMemoryPoiStore::with_named(&[("Seoul Station", 37.5, 126.9)]);
        let service = PoiQueryService::new(Arc::new(store.clone()));

        let matches = service.search("   ", None).await.expect("search");

        assert!(matches.is_empty());
        assert!(!store.journal().contains(&StoreCall::ListAll));
    }

    #[rstest]
    #[case(None, DEFAULT_SUGGESTION_LIMIT)]
    #[case(Some(3), 3)]
    #[case(Some(0), 0)]
    #[case(Some(10_000), MAX_SUGGESTION_LIMIT)]
    #[tokio::test]
    async fn search_limit_defaults_and_clamps(
        #[case] limit: Option<usize>,
        #[case] expected: usize,
    ) {
        let rows: Vec<(String, f64, f64)> = (0..150)
            .map(|index| (format!("Cafe {index}"), 37.0, 127.0))
            .collect();
        let named: Vec<(&str, f64, f64)> = rows
            .iter()
            .map(|(name, lat, lon)| (name.as_str(), *lat, *lon))
            .collect();
        let service = PoiQueryService::new(Arc::new(InMemoryPoiStore::with_named(&named)));

        let matches = service.search("cafe", limit).await.expect("search");

        assert_eq!(matches.len(), expected);
    }

    #[rstest]
    #[case("gangnam station", Some("Gangnam Station"))]
    #[case("coffee", Some("Coffee Bean Gangnam"))]
    #[case("busan", None)]
    #[case("", None)]
    #[tokio::test]
    async fn best_match_picks_highest_score(#[case] term: &str, #[case] expected: Option<&str>) {
        let best = fixture_service().best_match(term).await.expect("best match");
        assert_eq!(best.as_ref().map(PointOfInterest::name), expected);
    }

    #[tokio::test]
    async fn repository_failure_is_a_storage_failure() {
        let mut repository = MockPoiRepository::new();
        repository
            .expect_list_all()
            .times(1)
            .return_once(|| Err(PoiRepositoryError::query("relation \"pois\" does not exist")));
        let service = PoiQueryService::new(Arc::new(repository));

        let error = service
            .list(PoiListRequest::default())
            .await
            .expect_err("list fails");

        assert_eq!(error.code(), ErrorCode::StorageFailure);
        assert_eq!(
            error.message(),
            "poi storage query failed: relation \"pois\" does not exist"
        );
    }
}
