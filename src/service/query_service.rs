//! The dual-source query service.
//!
//! Source-selection policy, applied per request:
//!
//! 1. `force_rpc` skips the indexer entirely.
//! 2. No indexer configured: serve from RPC.
//! 3. Indexer query fails: swap to RPC once; an RPC failure after the
//!    swap surfaces as the error.
//! 4. Indexer succeeds but returns an empty collection view (listings,
//!    offers, user listings, user NFTs): probe RPC once to compensate
//!    for indexing lag; a non-empty RPC result wins, otherwise the
//!    empty indexer result stands. Activity and the all-NFTs view skip
//!    this probe: empty is a meaningful answer there.
//!
//! There is never more than one fallback swap per request.

use crate::config::GatewayConfig;
use crate::domain::event::{
    ACTIVITY_EVENTS, ACTIVITY_PREFIXES, LISTING_LIFECYCLE_EVENTS, MINT_EVENT,
    OFFER_CLOSE_EVENTS, OFFER_CREATE_EVENT, OWNERSHIP_EVENTS,
};
use crate::domain::{
    ActivityItem, DataSource, EventRow, ListingInfo, NftDetails, NftWithListing, OfferInfo,
    projector,
};
use crate::error::GatewayError;
use crate::persistence::{EventFilter, EventSource};
use crate::rpc::ChainSource;

/// A response body tagged with the backend that produced it.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    /// The payload.
    pub data: T,
    /// Which backend answered.
    pub source: DataSource,
}

impl<T> Sourced<T> {
    const fn indexer(data: T) -> Self {
        Self {
            data,
            source: DataSource::Indexer,
        }
    }

    const fn rpc(data: T) -> Self {
        Self {
            data,
            source: DataSource::Rpc,
        }
    }
}

/// Read-side query service over an optional event indexer and a chain
/// node.
///
/// Generic over its two sources so the selection policy is testable
/// against in-memory fakes.
#[derive(Debug)]
pub struct QueryService<E, C> {
    indexer: Option<E>,
    chain: C,
    config: GatewayConfig,
}

impl<E, C> QueryService<E, C>
where
    E: EventSource,
    C: ChainSource,
{
    /// Creates the service. `indexer` is `None` when no indexer
    /// database is configured.
    pub const fn new(indexer: Option<E>, chain: C, config: GatewayConfig) -> Self {
        Self {
            indexer,
            chain,
            config,
        }
    }

    /// Whether an indexer adapter is configured.
    pub const fn indexer_configured(&self) -> bool {
        self.indexer.is_some()
    }

    /// The active configuration.
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn addresses(&self, asset_contract: Option<&str>) -> Vec<String> {
        match asset_contract {
            Some(contract) if !contract.is_empty() => {
                let mut addresses = vec![contract.to_string()];
                if !self.config.marketplace_contract.is_empty() {
                    addresses.push(self.config.marketplace_contract.clone());
                }
                addresses
            }
            _ => self.config.contract_addresses(),
        }
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<Vec<EventRow>, GatewayError> {
        match &self.indexer {
            Some(store) => store.fetch(filter).await,
            None => Err(GatewayError::IndexerUnavailable),
        }
    }

    fn log_swap(capability: &str, error: &GatewayError) {
        match error {
            GatewayError::IndexerUnavailable => {
                tracing::debug!(capability, "indexer not configured, using rpc");
            }
            _ => {
                tracing::warn!(capability, %error, "indexer query failed, falling back to rpc");
            }
        }
    }

    /// The activity feed.
    ///
    /// # Errors
    ///
    /// Returns the RPC error when both sources fail (or `force_rpc` was
    /// set and the chain query fails).
    pub async fn activity(
        &self,
        limit: usize,
        offset: usize,
        force_rpc: bool,
        asset_contract: Option<&str>,
    ) -> Result<Sourced<Vec<ActivityItem>>, GatewayError> {
        if !force_rpc {
            match self.indexer_activity(limit, offset, asset_contract).await {
                Ok(items) => return Ok(Sourced::indexer(items)),
                Err(error) => Self::log_swap("activity", &error),
            }
        }
        let items = self.chain.activity(limit, offset, asset_contract).await?;
        Ok(Sourced::rpc(items))
    }

    async fn indexer_activity(
        &self,
        limit: usize,
        offset: usize,
        asset_contract: Option<&str>,
    ) -> Result<Vec<ActivityItem>, GatewayError> {
        // Fetch enough rows to cover the requested page; ordering and
        // the offset/limit window are reapplied by the projector.
        let window = i64::try_from(limit.saturating_add(offset))
            .map_err(|_| GatewayError::InvalidRequest("page out of range".to_string()))?;
        let filter = EventFilter::for_contracts(self.addresses(asset_contract))
            .names(ACTIVITY_EVENTS)
            .prefixes(ACTIVITY_PREFIXES)
            .page(window, 0);
        let rows = self.fetch(&filter).await?;
        Ok(projector::project_activity(
            &rows,
            &self.config.default_denom,
            limit,
            offset,
        ))
    }

    /// All active listings.
    ///
    /// # Errors
    ///
    /// Returns the RPC error when both sources fail.
    pub async fn listings(
        &self,
        force_rpc: bool,
        asset_contract: Option<&str>,
    ) -> Result<Sourced<Vec<ListingInfo>>, GatewayError> {
        if !force_rpc {
            match self.indexer_listings(asset_contract).await {
                Ok(listings) if !listings.is_empty() => {
                    return Ok(Sourced::indexer(listings));
                }
                Ok(listings) => {
                    return Ok(self
                        .probe_rpc_for_empty("listings", listings, self.chain.listings(asset_contract))
                        .await);
                }
                Err(error) => Self::log_swap("listings", &error),
            }
        }
        let listings = self.chain.listings(asset_contract).await?;
        Ok(Sourced::rpc(listings))
    }

    async fn indexer_listings(
        &self,
        asset_contract: Option<&str>,
    ) -> Result<Vec<ListingInfo>, GatewayError> {
        let filter = EventFilter::for_contracts(self.addresses(asset_contract))
            .names(LISTING_LIFECYCLE_EVENTS);
        let rows = self.fetch(&filter).await?;
        Ok(projector::project_listings(
            &rows,
            &self.config.default_denom,
        ))
    }

    /// An empty indexer result may mean "nothing exists" or "not yet
    /// indexed". Probe RPC once; non-empty wins, and an RPC failure
    /// leaves the empty indexer answer standing.
    async fn probe_rpc_for_empty<T>(
        &self,
        capability: &str,
        empty: Vec<T>,
        probe: impl Future<Output = Result<Vec<T>, GatewayError>>,
    ) -> Sourced<Vec<T>> {
        match probe.await {
            Ok(data) if !data.is_empty() => Sourced::rpc(data),
            Ok(_) => Sourced::indexer(empty),
            Err(error) => {
                tracing::debug!(capability, %error, "rpc probe failed, keeping empty indexer result");
                Sourced::indexer(empty)
            }
        }
    }

    /// Open offers for one token.
    ///
    /// The chain exposes no offer query, so the RPC path reports an
    /// empty list; for this capability `source: "rpc"` means "unknown".
    ///
    /// # Errors
    ///
    /// Returns the RPC error when both sources fail.
    pub async fn offers(
        &self,
        token_id: &str,
        force_rpc: bool,
    ) -> Result<Sourced<Vec<OfferInfo>>, GatewayError> {
        if !force_rpc {
            match self.indexer_offers(token_id).await {
                Ok(offers) if !offers.is_empty() => return Ok(Sourced::indexer(offers)),
                Ok(offers) => {
                    return Ok(self
                        .probe_rpc_for_empty("offers", offers, self.chain.offers(token_id))
                        .await);
                }
                Err(error) => Self::log_swap("offers", &error),
            }
        }
        let offers = self.chain.offers(token_id).await?;
        Ok(Sourced::rpc(offers))
    }

    async fn indexer_offers(&self, token_id: &str) -> Result<Vec<OfferInfo>, GatewayError> {
        // Closure events carry only the offer id, so the token filter
        // is applied by the projector, not the row query.
        let mut names = vec![OFFER_CREATE_EVENT];
        names.extend_from_slice(OFFER_CLOSE_EVENTS);
        let filter = EventFilter::for_contracts(self.addresses(None)).names(&names);
        let rows = self.fetch(&filter).await?;
        Ok(projector::project_open_offers(
            &rows,
            Some(token_id),
            &self.config.default_denom,
        ))
    }

    /// Details for one token.
    ///
    /// # Errors
    ///
    /// [`GatewayError::TokenNotFound`] when neither source knows the
    /// token; the RPC error when both sources fail.
    pub async fn nft(
        &self,
        token_id: &str,
        force_rpc: bool,
        asset_contract: Option<&str>,
    ) -> Result<Sourced<NftDetails>, GatewayError> {
        if !force_rpc {
            match self.indexer_nft(token_id).await {
                Ok(Some(details)) => return Ok(Sourced::indexer(details)),
                // Unknown to the indexer: the token may simply not be
                // indexed yet, so ask the chain before giving up.
                Ok(None) => {
                    tracing::debug!(token_id, "token not indexed, checking chain");
                }
                Err(error) => Self::log_swap("nft", &error),
            }
        }
        match self.chain.nft(token_id, asset_contract).await? {
            Some(details) => Ok(Sourced::rpc(details)),
            None => Err(GatewayError::TokenNotFound(token_id.to_string())),
        }
    }

    async fn indexer_nft(&self, token_id: &str) -> Result<Option<NftDetails>, GatewayError> {
        let addresses = self.addresses(None);
        let mints = self
            .fetch(
                &EventFilter::for_contracts(addresses.clone())
                    .names(&[MINT_EVENT])
                    .token(token_id),
            )
            .await?;
        let ownership = self
            .fetch(
                &EventFilter::for_contracts(addresses)
                    .names(OWNERSHIP_EVENTS)
                    .token(token_id),
            )
            .await?;
        Ok(projector::project_nft_details(&mints, &ownership, token_id))
    }

    /// All minted tokens with listing status.
    ///
    /// `offset` only applies to the indexer path; the chain's
    /// `all_tokens` query has no stable cursor to skip into.
    ///
    /// # Errors
    ///
    /// Returns the RPC error when both sources fail.
    pub async fn all_nfts(
        &self,
        limit: usize,
        offset: usize,
        force_rpc: bool,
        asset_contract: Option<&str>,
    ) -> Result<Sourced<Vec<NftWithListing>>, GatewayError> {
        if !force_rpc {
            match self.indexer_nfts(limit, offset, asset_contract).await {
                Ok(nfts) => return Ok(Sourced::indexer(nfts)),
                Err(error) => Self::log_swap("nfts", &error),
            }
        }
        let nfts = self.chain.all_nfts(limit, asset_contract).await?;
        Ok(Sourced::rpc(nfts))
    }

    async fn indexer_nfts(
        &self,
        limit: usize,
        offset: usize,
        asset_contract: Option<&str>,
    ) -> Result<Vec<NftWithListing>, GatewayError> {
        let addresses = self.addresses(asset_contract);
        let mints = self
            .fetch(&EventFilter::for_contracts(addresses.clone()).names(&[MINT_EVENT]))
            .await?;
        let ownership = self
            .fetch(&EventFilter::for_contracts(addresses.clone()).names(OWNERSHIP_EVENTS))
            .await?;
        let lifecycle = self
            .fetch(&EventFilter::for_contracts(addresses).names(LISTING_LIFECYCLE_EVENTS))
            .await?;
        let nfts = projector::project_nfts(
            &mints,
            &ownership,
            &lifecycle,
            &self.config.default_denom,
        );
        Ok(nfts.into_iter().skip(offset).take(limit).collect())
    }

    /// A user's active listings.
    ///
    /// # Errors
    ///
    /// Returns the RPC error when both sources fail.
    pub async fn user_listings(
        &self,
        address: &str,
        force_rpc: bool,
        asset_contract: Option<&str>,
    ) -> Result<Sourced<Vec<ListingInfo>>, GatewayError> {
        if !force_rpc {
            match self.indexer_user_listings(address, asset_contract).await {
                Ok(listings) if !listings.is_empty() => {
                    return Ok(Sourced::indexer(listings));
                }
                Ok(listings) => {
                    return Ok(self
                        .probe_rpc_for_empty(
                            "user_listings",
                            listings,
                            self.chain.user_listings(address, asset_contract),
                        )
                        .await);
                }
                Err(error) => Self::log_swap("user_listings", &error),
            }
        }
        let listings = self.chain.user_listings(address, asset_contract).await?;
        Ok(Sourced::rpc(listings))
    }

    async fn indexer_user_listings(
        &self,
        address: &str,
        asset_contract: Option<&str>,
    ) -> Result<Vec<ListingInfo>, GatewayError> {
        let addresses = self.addresses(asset_contract);
        let lifecycle = self
            .fetch(&EventFilter::for_contracts(addresses.clone()).names(LISTING_LIFECYCLE_EVENTS))
            .await?;
        let mints = self
            .fetch(&EventFilter::for_contracts(addresses).names(&[MINT_EVENT]))
            .await?;
        Ok(projector::project_user_listings(
            &lifecycle,
            &mints,
            address,
            &self.config.default_denom,
        ))
    }

    /// A user's owned tokens.
    ///
    /// # Errors
    ///
    /// Returns the RPC error when both sources fail.
    pub async fn user_nfts(
        &self,
        address: &str,
        force_rpc: bool,
        asset_contract: Option<&str>,
    ) -> Result<Sourced<Vec<NftDetails>>, GatewayError> {
        if !force_rpc {
            match self.indexer_user_nfts(address, asset_contract).await {
                Ok(nfts) if !nfts.is_empty() => return Ok(Sourced::indexer(nfts)),
                Ok(nfts) => {
                    return Ok(self
                        .probe_rpc_for_empty(
                            "user_nfts",
                            nfts,
                            self.chain.user_nfts(address, asset_contract),
                        )
                        .await);
                }
                Err(error) => Self::log_swap("user_nfts", &error),
            }
        }
        let nfts = self.chain.user_nfts(address, asset_contract).await?;
        Ok(Sourced::rpc(nfts))
    }

    async fn indexer_user_nfts(
        &self,
        address: &str,
        asset_contract: Option<&str>,
    ) -> Result<Vec<NftDetails>, GatewayError> {
        let addresses = self.addresses(asset_contract);
        let mints = self
            .fetch(&EventFilter::for_contracts(addresses.clone()).names(&[MINT_EVENT]))
            .await?;
        let ownership = self
            .fetch(&EventFilter::for_contracts(addresses).names(OWNERSHIP_EVENTS))
            .await?;
        Ok(projector::project_user_nfts(&mints, &ownership, address))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::domain::ActivityKind;

    fn config() -> GatewayConfig {
        GatewayConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            indexer_db_url: None,
            database_max_connections: 10,
            database_min_connections: 2,
            database_connect_timeout_secs: 5,
            rpc_endpoint: "http://localhost:26657".to_string(),
            asset_contract: "xion1asset".to_string(),
            marketplace_contract: "xion1market".to_string(),
            default_denom: "uxion".to_string(),
            avg_block_time_ms: 6_000,
            rpc_query_limit: 100,
        }
    }

    /// In-memory event log applying the filter's name predicate.
    struct FakeStore {
        rows: Vec<EventRow>,
        fail: bool,
    }

    impl EventSource for FakeStore {
        async fn fetch(&self, filter: &EventFilter) -> Result<Vec<EventRow>, GatewayError> {
            if self.fail {
                return Err(GatewayError::Database("connection refused".to_string()));
            }
            let mut rows: Vec<EventRow> = self
                .rows
                .iter()
                .filter(|row| filter.addresses.contains(&row.address))
                .filter(|row| filter.matches_name(&row.name))
                .filter(|row| {
                    filter.token_id.as_ref().is_none_or(|token| {
                        row.data.get("token_id").and_then(serde_json::Value::as_str)
                            == Some(token.as_str())
                    })
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.recency().cmp(&a.recency()));
            Ok(rows)
        }
    }

    /// Canned chain node counting how often it is queried.
    #[derive(Default)]
    struct FakeChain {
        listings: Vec<ListingInfo>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeChain {
        fn tap(&self) -> Result<(), GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GatewayError::Rpc("node down".to_string()));
            }
            Ok(())
        }
    }

    impl ChainSource for FakeChain {
        async fn activity(
            &self,
            _limit: usize,
            _offset: usize,
            _asset_contract: Option<&str>,
        ) -> Result<Vec<ActivityItem>, GatewayError> {
            self.tap()?;
            Ok(vec![ActivityItem {
                id: "TX1-mint-9".to_string(),
                kind: ActivityKind::Mint,
                token_id: "9".to_string(),
                from: None,
                to: Some("alice".to_string()),
                price: None,
                denom: None,
                timestamp: 1,
                tx_hash: Some("TX1".to_string()),
                block_height: Some(1),
                description: None,
            }])
        }

        async fn listings(
            &self,
            _asset_contract: Option<&str>,
        ) -> Result<Vec<ListingInfo>, GatewayError> {
            self.tap()?;
            Ok(self.listings.clone())
        }

        async fn offers(&self, _token_id: &str) -> Result<Vec<OfferInfo>, GatewayError> {
            self.tap()?;
            Ok(Vec::new())
        }

        async fn nft(
            &self,
            token_id: &str,
            _asset_contract: Option<&str>,
        ) -> Result<Option<NftDetails>, GatewayError> {
            self.tap()?;
            if token_id == "9" {
                Ok(Some(NftDetails::placeholder("9", "alice")))
            } else {
                Ok(None)
            }
        }

        async fn all_nfts(
            &self,
            _limit: usize,
            _asset_contract: Option<&str>,
        ) -> Result<Vec<NftWithListing>, GatewayError> {
            self.tap()?;
            Ok(Vec::new())
        }

        async fn user_listings(
            &self,
            _address: &str,
            _asset_contract: Option<&str>,
        ) -> Result<Vec<ListingInfo>, GatewayError> {
            self.tap()?;
            Ok(self.listings.clone())
        }

        async fn user_nfts(
            &self,
            _address: &str,
            _asset_contract: Option<&str>,
        ) -> Result<Vec<NftDetails>, GatewayError> {
            self.tap()?;
            Ok(Vec::new())
        }
    }

    fn row(id: i64, time: i64, name: &str, data: serde_json::Value) -> EventRow {
        EventRow {
            id,
            address: "xion1market".to_string(),
            name: name.to_string(),
            block_height: time / 1000,
            block_time_ms: time,
            tx_hash: format!("TX{id}"),
            data,
        }
    }

    fn chain_listing(token: &str) -> ListingInfo {
        ListingInfo {
            token_id: token.to_string(),
            seller: "carol".to_string(),
            price: "777".to_string(),
            denom: "uxion".to_string(),
            listed_at: 0,
            tx_hash: None,
            name: None,
            image: None,
        }
    }

    fn service(
        store: Option<FakeStore>,
        chain: FakeChain,
    ) -> QueryService<FakeStore, FakeChain> {
        QueryService::new(store, chain, config())
    }

    #[tokio::test]
    async fn healthy_indexer_answers_with_indexer_source() {
        let store = FakeStore {
            rows: vec![row(
                1,
                1000,
                "marketplace/list-item",
                json!({"token_id": "1", "seller": "alice", "price": "100"}),
            )],
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.listings(false, None).await else {
            panic!("listings should succeed");
        };
        assert_eq!(result.source, DataSource::Indexer);
        assert_eq!(result.data.len(), 1);
        assert_eq!(svc.chain.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_indexer_swaps_to_rpc_once() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: true,
        };
        let chain = FakeChain {
            listings: vec![chain_listing("5")],
            ..FakeChain::default()
        };
        let svc = service(Some(store), chain);

        let Ok(result) = svc.listings(false, None).await else {
            panic!("fallback should succeed");
        };
        assert_eq!(result.source, DataSource::Rpc);
        assert_eq!(result.data.len(), 1);
        assert_eq!(svc.chain.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_indexer_result_is_probed_against_rpc() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let chain = FakeChain {
            listings: vec![chain_listing("5")],
            ..FakeChain::default()
        };
        let svc = service(Some(store), chain);

        let Ok(result) = svc.listings(false, None).await else {
            panic!("listings should succeed");
        };
        assert_eq!(result.source, DataSource::Rpc);
        assert_eq!(result.data.len(), 1);
    }

    #[tokio::test]
    async fn empty_everywhere_stays_an_indexer_answer() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.listings(false, None).await else {
            panic!("listings should succeed");
        };
        assert_eq!(result.source, DataSource::Indexer);
        assert!(result.data.is_empty());
    }

    #[tokio::test]
    async fn failed_probe_keeps_the_empty_indexer_answer() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let chain = FakeChain {
            fail: true,
            ..FakeChain::default()
        };
        let svc = service(Some(store), chain);

        let Ok(result) = svc.listings(false, None).await else {
            panic!("empty indexer answer should stand");
        };
        assert_eq!(result.source, DataSource::Indexer);
        assert!(result.data.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_indexer_serves_from_rpc() {
        let chain = FakeChain {
            listings: vec![chain_listing("5")],
            ..FakeChain::default()
        };
        let svc = service(None, chain);

        let Ok(result) = svc.listings(false, None).await else {
            panic!("rpc should answer");
        };
        assert_eq!(result.source, DataSource::Rpc);
        assert!(!svc.indexer_configured());
    }

    #[tokio::test]
    async fn both_sources_failing_surfaces_the_rpc_error() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: true,
        };
        let chain = FakeChain {
            fail: true,
            ..FakeChain::default()
        };
        let svc = service(Some(store), chain);

        let Err(error) = svc.listings(false, None).await else {
            panic!("both sources down should error");
        };
        assert!(matches!(error, GatewayError::Rpc(_)));
    }

    #[tokio::test]
    async fn force_rpc_skips_a_healthy_indexer() {
        let store = FakeStore {
            rows: vec![row(
                1,
                1000,
                "marketplace/list-item",
                json!({"token_id": "1", "seller": "alice", "price": "100"}),
            )],
            fail: false,
        };
        let chain = FakeChain {
            listings: vec![chain_listing("5")],
            ..FakeChain::default()
        };
        let svc = service(Some(store), chain);

        let Ok(result) = svc.listings(true, None).await else {
            panic!("forced rpc should succeed");
        };
        assert_eq!(result.source, DataSource::Rpc);
        let Some(listing) = result.data.first() else {
            panic!("expected the chain listing");
        };
        assert_eq!(listing.token_id, "5");
    }

    #[tokio::test]
    async fn activity_falls_back_without_an_empty_probe() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.activity(10, 0, false, None).await else {
            panic!("activity should succeed");
        };
        // Empty activity is a valid indexer answer; no probe happens.
        assert_eq!(result.source, DataSource::Indexer);
        assert!(result.data.is_empty());
        assert_eq!(svc.chain.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn nft_unknown_to_indexer_is_resolved_via_chain() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.nft("9", false, None).await else {
            panic!("chain knows token 9");
        };
        assert_eq!(result.source, DataSource::Rpc);
        assert_eq!(result.data.token_id, "9");
    }

    #[tokio::test]
    async fn nft_unknown_everywhere_is_not_found() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Err(error) = svc.nft("404", false, None).await else {
            panic!("unknown token should 404");
        };
        assert!(matches!(error, GatewayError::TokenNotFound(_)));
    }

    #[tokio::test]
    async fn indexed_nft_is_served_without_touching_the_chain() {
        let store = FakeStore {
            rows: vec![row(
                1,
                1000,
                "asset/mint",
                json!({"token_id": "1", "owner": "alice"}),
            )],
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.nft("1", false, None).await else {
            panic!("indexed token should resolve");
        };
        assert_eq!(result.source, DataSource::Indexer);
        assert_eq!(result.data.owner, "alice");
        assert_eq!(svc.chain.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mint_then_list_produces_one_sourced_listing() {
        let store = FakeStore {
            rows: vec![
                row(1, 1000, "asset/mint", json!({"token_id": "1", "owner": "alice"})),
                row(
                    2,
                    2000,
                    "marketplace/list-item",
                    json!({"token_id": "1", "seller": "alice", "price": "1000000", "denom": "uxion"}),
                ),
            ],
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.listings(false, None).await else {
            panic!("listings should succeed");
        };
        assert_eq!(result.source, DataSource::Indexer);
        let Some(listing) = result.data.first() else {
            panic!("expected one listing");
        };
        assert_eq!(listing.token_id, "1");
        assert_eq!(listing.seller, "alice");
        assert_eq!(listing.price, "1000000");
        assert_eq!(listing.denom, "uxion");
    }

    #[tokio::test]
    async fn buy_clears_the_listing_and_moves_ownership() {
        let store = FakeStore {
            rows: vec![
                row(1, 1000, "asset/mint", json!({"token_id": "1", "owner": "alice"})),
                row(
                    2,
                    2000,
                    "marketplace/list-item",
                    json!({"token_id": "1", "seller": "alice", "price": "1000000"}),
                ),
                row(3, 3000, "marketplace/buy", json!({"token_id": "1", "buyer": "bob"})),
            ],
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(listings) = svc.listings(false, None).await else {
            panic!("listings should succeed");
        };
        assert!(listings.data.is_empty());

        let Ok(nft) = svc.nft("1", false, None).await else {
            panic!("token 1 should resolve");
        };
        assert_eq!(nft.source, DataSource::Indexer);
        assert_eq!(nft.data.owner, "bob");
    }

    #[tokio::test]
    async fn user_nfts_probe_rpc_when_indexer_is_empty() {
        let store = FakeStore {
            rows: Vec::new(),
            fail: false,
        };
        let svc = service(Some(store), FakeChain::default());

        let Ok(result) = svc.user_nfts("alice", false, None).await else {
            panic!("user nfts should succeed");
        };
        // The probe ran (one chain call) but came back empty, so the
        // indexer answer stands.
        assert_eq!(result.source, DataSource::Indexer);
        assert_eq!(svc.chain.calls.load(Ordering::SeqCst), 1);
    }
}
