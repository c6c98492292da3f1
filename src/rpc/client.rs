//! Chain-node client over Tendermint JSON-RPC.
//!
//! Smart-contract state is read through `abci_query` against the
//! `/cosmwasm.wasm.v1.Query/SmartContractState` path: the query message
//! is JSON wrapped in a protobuf request, hex-encoded on the wire; the
//! response value comes back base64-encoded protobuf wrapping JSON.
//! Raw transactions come from `tx_search`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use cosmrs::proto::cosmwasm::wasm::v1::{
    QuerySmartContractStateRequest, QuerySmartContractStateResponse,
};
use cosmrs::proto::traits::Message;
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::json;

use super::ChainSource;
use super::tx_events::{self, TxSearchResult};
use crate::config::GatewayConfig;
use crate::domain::payload::NftExtension;
use crate::domain::{ActivityItem, ListingInfo, NftDetails, NftWithListing, OfferInfo, RawPrice};
use crate::error::GatewayError;

/// Client for a single chain node, shared across requests.
///
/// One `reqwest::Client` is built at startup; there is no per-request
/// connection teardown.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    endpoint: String,
    asset_contract: String,
    default_denom: String,
    avg_block_time_ms: i64,
    query_limit: u32,
}

/// `tokens` / `all_tokens` contract query response.
#[derive(Debug, Default, Deserialize)]
struct TokensResponse {
    #[serde(default)]
    tokens: Vec<String>,
}

/// `owner_of` contract query response.
#[derive(Debug, Deserialize)]
struct OwnerOfResponse {
    owner: String,
}

/// `nft_info` contract query response.
#[derive(Debug, Default, Deserialize)]
struct NftInfoResponse {
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    extension: Option<NftExtension>,
}

/// One entry of the `get_all_listings` contract query response.
#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    token_id: Option<String>,
    #[serde(default)]
    seller: Option<String>,
    #[serde(default)]
    price: Option<RawPrice>,
}

impl RawListing {
    fn token_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.token_id.as_deref())
    }
}

impl ChainClient {
    /// Creates a client for the configured RPC endpoint.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.rpc_endpoint.clone(),
            asset_contract: config.asset_contract.clone(),
            default_denom: config.default_denom.clone(),
            avg_block_time_ms: config.avg_block_time_ms,
            query_limit: config.rpc_query_limit,
        }
    }

    fn contract<'a>(&'a self, override_contract: Option<&'a str>) -> Result<&'a str, GatewayError> {
        let contract = override_contract.unwrap_or(&self.asset_contract);
        if contract.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "no asset contract configured".to_string(),
            ));
        }
        Ok(contract)
    }

    /// Block timestamps are not available from `tx_search`, so they are
    /// approximated as `now − height × avg_block_time_ms`. This is a
    /// known precision loss: RPC-sourced activity timestamps are not
    /// comparable in absolute terms to indexer-sourced ones.
    fn approx_timestamp(&self, block_height: i64) -> i64 {
        Utc::now()
            .timestamp_millis()
            .saturating_sub(block_height.saturating_mul(self.avg_block_time_ms))
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response: serde_json::Value = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Rpc(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Rpc(e.to_string()))?;

        if let Some(error) = response.get("error") {
            return Err(GatewayError::Rpc(format!("{method} failed: {error}")));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| GatewayError::Rpc(format!("{method}: missing result")))
    }

    /// Executes a CosmWasm smart-contract query and deserializes the
    /// JSON result.
    async fn smart_query<T: serde::de::DeserializeOwned>(
        &self,
        contract: &str,
        msg: &serde_json::Value,
    ) -> Result<T, GatewayError> {
        let request = QuerySmartContractStateRequest {
            address: contract.to_string(),
            query_data: serde_json::to_vec(msg)
                .map_err(|e| GatewayError::Internal(e.to_string()))?,
        };
        let params = json!({
            "path": "/cosmwasm.wasm.v1.Query/SmartContractState",
            "data": hex::encode(request.encode_to_vec()),
            "prove": false,
        });
        let result = self.rpc_call("abci_query", params).await?;

        let response = result
            .get("response")
            .ok_or_else(|| GatewayError::Rpc("abci_query: missing response".to_string()))?;
        let code = response
            .get("code")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if code != 0 {
            let log = response
                .get("log")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            return Err(GatewayError::Rpc(format!(
                "contract query failed (code {code}): {log}"
            )));
        }
        let value = response
            .get("value")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| GatewayError::Rpc("abci_query: missing value".to_string()))?;
        let raw = BASE64
            .decode(value)
            .map_err(|e| GatewayError::Rpc(format!("invalid abci value: {e}")))?;
        let decoded = QuerySmartContractStateResponse::decode(raw.as_slice())
            .map_err(|e| GatewayError::Rpc(format!("invalid abci response: {e}")))?;
        serde_json::from_slice(&decoded.data)
            .map_err(|e| GatewayError::Rpc(format!("unexpected contract response: {e}")))
    }

    async fn all_listings(&self, contract: &str) -> Result<Vec<RawListing>, GatewayError> {
        self.smart_query(
            contract,
            &json!({
                "extension": {
                    "msg": {
                        "get_all_listings": { "limit": self.query_limit }
                    }
                }
            }),
        )
        .await
    }

    async fn nft_details(&self, contract: &str, token_id: &str) -> Result<NftDetails, GatewayError> {
        // The query messages must outlive both futures in the join.
        let info_msg = json!({"nft_info": {"token_id": token_id}});
        let owner_msg = json!({"owner_of": {"token_id": token_id}});
        let (info, owner) = futures_util::join!(
            self.smart_query::<NftInfoResponse>(contract, &info_msg),
            self.smart_query::<OwnerOfResponse>(contract, &owner_msg),
        );
        let info = info?;
        let extension = info.extension.unwrap_or_default();
        Ok(NftDetails {
            token_id: token_id.to_string(),
            name: extension
                .name
                .unwrap_or_else(|| format!("Token #{token_id}")),
            description: extension.description,
            image: extension.image,
            owner: owner.map(|o| o.owner).unwrap_or_default(),
            token_uri: info.token_uri,
            minted_at: None,
            mint_tx_hash: None,
        })
    }

    fn listing_info(&self, listing: &RawListing) -> Option<ListingInfo> {
        let token_id = listing.token_id()?;
        let coin = listing
            .price
            .as_ref()
            .map(|p| p.normalize(&self.default_denom));
        Some(ListingInfo {
            token_id: token_id.to_string(),
            seller: listing.seller.clone().unwrap_or_default(),
            price: coin.as_ref().map(|c| c.amount.clone()).unwrap_or_default(),
            denom: coin
                .map(|c| c.denom)
                .unwrap_or_else(|| self.default_denom.clone()),
            listed_at: Utc::now().timestamp_millis(),
            tx_hash: None,
            name: None,
            image: None,
        })
    }
}

impl ChainSource for ChainClient {
    async fn activity(
        &self,
        limit: usize,
        _offset: usize,
        asset_contract: Option<&str>,
    ) -> Result<Vec<ActivityItem>, GatewayError> {
        let contract = self.contract(asset_contract)?;
        let params = json!({
            "query": format!("wasm._contract_address='{contract}'"),
            "prove": false,
            "page": "1",
            "per_page": self.query_limit.to_string(),
            "order_by": "desc",
        });
        let result = self.rpc_call("tx_search", params).await?;
        let search: TxSearchResult = serde_json::from_value(result)
            .map_err(|e| GatewayError::Rpc(format!("unexpected tx_search response: {e}")))?;

        let mut items: Vec<ActivityItem> = search
            .txs
            .iter()
            .take(limit)
            .flat_map(|tx| {
                let height = tx.height.parse::<i64>().unwrap_or_default();
                tx_events::parse_transaction(
                    tx,
                    contract,
                    self.approx_timestamp(height),
                    &self.default_denom,
                )
            })
            .collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(limit);
        Ok(items)
    }

    async fn listings(&self, asset_contract: Option<&str>) -> Result<Vec<ListingInfo>, GatewayError> {
        let contract = self.contract(asset_contract)?;
        let listings = self.all_listings(contract).await?;
        Ok(listings
            .iter()
            .filter_map(|l| self.listing_info(l))
            .collect())
    }

    async fn offers(&self, token_id: &str) -> Result<Vec<OfferInfo>, GatewayError> {
        // The contract exposes no list-all-offers query; offers can only
        // be derived from the event log.
        tracing::debug!(token_id, "offers are not queryable over rpc");
        Ok(Vec::new())
    }

    async fn nft(
        &self,
        token_id: &str,
        asset_contract: Option<&str>,
    ) -> Result<Option<NftDetails>, GatewayError> {
        let contract = self.contract(asset_contract)?;
        match self.nft_details(contract, token_id).await {
            Ok(details) => Ok(Some(details)),
            Err(error) => {
                // A contract query error for an unknown token and a
                // transient node failure are indistinguishable here;
                // both resolve to "not found" as the original behavior.
                tracing::warn!(token_id, %error, "nft query failed");
                Ok(None)
            }
        }
    }

    async fn all_nfts(
        &self,
        limit: usize,
        asset_contract: Option<&str>,
    ) -> Result<Vec<NftWithListing>, GatewayError> {
        let contract = self.contract(asset_contract)?;
        let tokens: TokensResponse = self
            .smart_query(contract, &json!({"all_tokens": {"limit": limit}}))
            .await?;

        // Listing status is best-effort; a failed listings query leaves
        // every token unlisted rather than failing the view.
        let listings: Vec<ListingInfo> = match self.all_listings(contract).await {
            Ok(raw) => raw.iter().filter_map(|l| self.listing_info(l)).collect(),
            Err(error) => {
                tracing::warn!(%error, "listings query failed, continuing without status");
                Vec::new()
            }
        };

        let fetches = tokens.tokens.iter().map(|token_id| async move {
            match self.nft_details(contract, token_id).await {
                Ok(details) => details,
                Err(error) => {
                    tracing::warn!(token_id, %error, "token detail fetch failed");
                    NftDetails::placeholder(token_id, "")
                }
            }
        });
        let details = join_all(fetches).await;

        Ok(details
            .into_iter()
            .map(|nft| {
                let listing = listings.iter().find(|l| l.token_id == nft.token_id);
                NftWithListing {
                    is_listed: listing.is_some(),
                    price: listing.map(|l| l.price.clone()),
                    denom: listing.map(|l| l.denom.clone()),
                    listed_at: listing.map(|l| l.listed_at),
                    nft,
                }
            })
            .collect())
    }

    async fn user_listings(
        &self,
        address: &str,
        asset_contract: Option<&str>,
    ) -> Result<Vec<ListingInfo>, GatewayError> {
        let contract = self.contract(asset_contract)?;
        let owned: TokensResponse = self
            .smart_query(
                contract,
                &json!({"tokens": {"owner": address, "limit": self.query_limit}}),
            )
            .await?;
        let raw = self.all_listings(contract).await?;

        let user_listings: Vec<ListingInfo> = raw
            .iter()
            .filter(|l| l.token_id().is_some_and(|id| owned.tokens.iter().any(|t| t == id)))
            .filter_map(|l| self.listing_info(l))
            .collect();

        // Enrich with metadata; a failing nft_info keeps the default name.
        let enriched = user_listings.into_iter().map(|mut listing| async move {
            match self
                .smart_query::<NftInfoResponse>(
                    contract,
                    &json!({"nft_info": {"token_id": listing.token_id}}),
                )
                .await
            {
                Ok(info) => {
                    let extension = info.extension.unwrap_or_default();
                    listing.name = Some(
                        extension
                            .name
                            .unwrap_or_else(|| format!("Token #{}", listing.token_id)),
                    );
                    listing.image = extension.image;
                }
                Err(_) => {
                    listing.name = Some(format!("Token #{}", listing.token_id));
                }
            }
            listing
        });
        Ok(join_all(enriched).await)
    }

    async fn user_nfts(
        &self,
        address: &str,
        asset_contract: Option<&str>,
    ) -> Result<Vec<NftDetails>, GatewayError> {
        let contract = self.contract(asset_contract)?;
        let owned: TokensResponse = self
            .smart_query(
                contract,
                &json!({"tokens": {"owner": address, "limit": self.query_limit}}),
            )
            .await?;

        let fetches = owned.tokens.iter().map(|token_id| async move {
            match self
                .smart_query::<NftInfoResponse>(
                    contract,
                    &json!({"nft_info": {"token_id": token_id}}),
                )
                .await
            {
                Ok(info) => {
                    let extension = info.extension.unwrap_or_default();
                    NftDetails {
                        token_id: token_id.clone(),
                        name: extension
                            .name
                            .unwrap_or_else(|| format!("Token #{token_id}")),
                        description: extension.description,
                        image: extension.image,
                        owner: address.to_string(),
                        token_uri: info.token_uri,
                        minted_at: None,
                        mint_tx_hash: None,
                    }
                }
                Err(error) => {
                    tracing::warn!(token_id, %error, "token detail fetch failed");
                    NftDetails::placeholder(token_id, address)
                }
            }
        });
        Ok(join_all(fetches).await)
    }
}
