//! Chain query collaborator.
//!
//! The chain-query verifier only needs one thing from a chain node: look up
//! a transaction by id and report its confirmation depth and outputs.
//! [`JsonRpcChainClient`] does that against a bitcoind-compatible JSON-RPC
//! endpoint using verbose `getrawtransaction`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChainRpcError, ChainRpcResult};

/// HTTP timeout for each JSON-RPC call made by [`JsonRpcChainClient`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// bitcoind error code for an unknown transaction.
const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

/// One transaction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainOutput {
    /// Output value in whole coins (the chain's native fractional unit).
    pub value: f64,
    /// Destination addresses of the output script.
    pub addresses: Vec<String>,
}

impl ChainOutput {
    /// Create an output paying `value` coins to one address.
    pub fn to_address(address: impl Into<String>, value: f64) -> Self {
        Self {
            value,
            addresses: vec![address.into()],
        }
    }

    /// Check whether this output pays `address`.
    pub fn pays(&self, address: &str) -> bool {
        self.addresses.iter().any(|a| a == address)
    }
}

/// Transaction as reported by the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainTransaction {
    /// Confirmation depth; zero while unconfirmed.
    pub confirmations: u64,
    /// Outputs in index order.
    pub outputs: Vec<ChainOutput>,
}

/// Trait for looking up transactions on a chain.
///
/// Implementations must not retry internally; retry is a client-visible
/// re-challenge.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Look up a transaction by id.
    ///
    /// Returns `Ok(None)` if the chain has no such transaction.
    async fn get_transaction(&self, tx_id: &str) -> ChainRpcResult<Option<ChainTransaction>>;
}

/// Credentials for a JSON-RPC endpoint.
#[derive(Debug, Clone, Default)]
pub struct RpcAuth {
    pub user: String,
    pub password: Option<String>,
}

/// Client for a bitcoind-compatible JSON-RPC endpoint.
///
/// Each call is bounded by a 30 second HTTP timeout. That timeout belongs to
/// this client only; `ChainQueryVerifier` adds none of its own and otherwise
/// runs under the caller's request timeout.
#[derive(Clone)]
pub struct JsonRpcChainClient {
    /// HTTP client
    client: Client,
    /// Endpoint URL
    url: String,
    /// Optional basic auth
    auth: Option<RpcAuth>,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: (&'a str, bool),
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<RawTransaction>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RawTransaction {
    #[serde(default)]
    confirmations: u64,
    #[serde(default)]
    vout: Vec<RawOutput>,
}

#[derive(Deserialize)]
struct RawOutput {
    value: f64,
    #[serde(rename = "scriptPubKey", default)]
    script_pub_key: RawScript,
}

#[derive(Deserialize, Default)]
struct RawScript {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    addresses: Vec<String>,
}

impl From<RawTransaction> for ChainTransaction {
    fn from(raw: RawTransaction) -> Self {
        let outputs = raw
            .vout
            .into_iter()
            .map(|out| {
                let mut addresses = out.script_pub_key.addresses;
                if let Some(address) = out.script_pub_key.address {
                    if !addresses.contains(&address) {
                        addresses.push(address);
                    }
                }
                ChainOutput {
                    value: out.value,
                    addresses,
                }
            })
            .collect();

        Self {
            confirmations: raw.confirmations,
            outputs,
        }
    }
}

impl JsonRpcChainClient {
    /// Create a new client for the endpoint at `url`.
    pub fn new(url: &str, auth: Option<RpcAuth>) -> ChainRpcResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ChainRpcError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            auth,
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn decode(status: reqwest::StatusCode, body: &str) -> ChainRpcResult<Option<ChainTransaction>> {
        // bitcoind answers RPC errors with HTTP 500 and a JSON body, so the
        // body is inspected before the status.
        let response: RpcResponse = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) if status.is_success() => {
                return Err(ChainRpcError::InvalidResponse(e.to_string()))
            }
            Err(_) => {
                return Err(ChainRpcError::Http {
                    status: status.as_u16(),
                    body: body.to_string(),
                })
            }
        };

        match (response.result, response.error) {
            (_, Some(err)) if err.code == RPC_INVALID_ADDRESS_OR_KEY => Ok(None),
            (_, Some(err)) => Err(ChainRpcError::Rpc {
                code: err.code,
                message: err.message,
            }),
            (Some(raw), None) => Ok(Some(raw.into())),
            (None, None) => Ok(None),
        }
    }
}

#[async_trait]
impl ChainRpc for JsonRpcChainClient {
    async fn get_transaction(&self, tx_id: &str) -> ChainRpcResult<Option<ChainTransaction>> {
        debug!(url = %self.url, tx_id = %tx_id, "Querying chain for transaction");

        let request = RpcRequest {
            jsonrpc: "1.0",
            id: "path402",
            method: "getrawtransaction",
            params: (tx_id, true),
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(auth) = &self.auth {
            builder = builder.basic_auth(&auth.user, auth.password.as_ref());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Self::decode(status, &body)
    }
}
