//! Request and output types exchanged with the rollup node.
//!
//! # Responsibilities
//! - Model the `finish` response envelope (advance or inspect request)
//! - Model the four output kinds a handler can emit
//! - Collect outputs per request in an [`Outbox`] for later flushing

use alloy::primitives::{hex, U256};
use serde::{Deserialize, Serialize, Serializer};

use crate::rollups::hex::str_to_hex;

/// Input metadata attached to every advance request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub chain_id: u64,
    pub app_contract: String,
    pub msg_sender: String,
    pub input_index: u64,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub prev_randao: String,
}

/// A state-changing input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub metadata: Metadata,
    pub payload: String,
}

/// A read-only query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectRequest {
    pub payload: String,
}

/// Anything carrying a hex payload that routes can be resolved against.
pub trait RollupInput {
    fn payload(&self) -> &str;
}

impl RollupInput for AdvanceRequest {
    fn payload(&self) -> &str {
        &self.payload
    }
}

impl RollupInput for InspectRequest {
    fn payload(&self) -> &str {
        &self.payload
    }
}

/// Request handed out by the node in response to `finish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollupRequest {
    Advance(AdvanceRequest),
    Inspect(InspectRequest),
}

impl RollupRequest {
    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RollupRequest::Advance(_) => "advance",
            RollupRequest::Inspect(_) => "inspect",
        }
    }
}

/// Raw `finish` response body: `{"request_type": ..., "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinishEnvelope {
    pub request_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FinishEnvelope {
    /// Convert into a typed request. Unknown request types yield `Ok(None)`.
    pub fn into_request(self) -> Result<Option<RollupRequest>, serde_json::Error> {
        match self.request_type.as_str() {
            "advance_state" => Ok(Some(RollupRequest::Advance(serde_json::from_value(
                self.data,
            )?))),
            "inspect_state" => Ok(Some(RollupRequest::Inspect(serde_json::from_value(
                self.data,
            )?))),
            _ => Ok(None),
        }
    }
}

/// Status reported to the node for the previous request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishStatus {
    Accept,
    Reject,
}

impl FinishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishStatus::Accept => "accept",
            FinishStatus::Reject => "reject",
        }
    }
}

/// Body of the `finish` call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Finish {
    pub status: FinishStatus,
}

/// Verifiable output recorded on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub payload: String,
}

/// Executable call emitted for later execution on the base layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voucher {
    pub destination: String,
    pub payload: String,
    #[serde(serialize_with = "serialize_word")]
    pub value: U256,
}

/// Diagnostic output; not verifiable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub payload: String,
}

/// Signals an unrecoverable error to the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    pub payload: String,
}

fn serialize_word<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode_prefixed(value.to_be_bytes::<32>()))
}

/// One output awaiting delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Notice(Notice),
    Voucher(Voucher),
    Report(Report),
    Exception(Exception),
}

impl Output {
    /// Node endpoint the output is posted to. Also used as a metrics label.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Output::Notice(_) => "notice",
            Output::Voucher(_) => "voucher",
            Output::Report(_) => "report",
            Output::Exception(_) => "exception",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Output::Notice(n) => serde_json::to_value(n),
            Output::Voucher(v) => serde_json::to_value(v),
            Output::Report(r) => serde_json::to_value(r),
            Output::Exception(e) => serde_json::to_value(e),
        }
    }
}

/// Outputs emitted by a handler while processing one request.
///
/// Outputs are buffered in emission order and flushed by the runner once
/// the handler returns.
#[derive(Debug, Default)]
pub struct Outbox {
    outputs: Vec<Output>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&mut self, payload: impl Into<String>) {
        self.outputs.push(Output::Notice(Notice {
            payload: payload.into(),
        }));
    }

    pub fn voucher(&mut self, voucher: Voucher) {
        self.outputs.push(Output::Voucher(voucher));
    }

    pub fn report(&mut self, payload: impl Into<String>) {
        self.outputs.push(Output::Report(Report {
            payload: payload.into(),
        }));
    }

    /// Report plain text; it is hex encoded before sending.
    pub fn report_text(&mut self, text: &str) {
        self.report(str_to_hex(text));
    }

    pub fn exception(&mut self, payload: impl Into<String>) {
        self.outputs.push(Output::Exception(Exception {
            payload: payload.into(),
        }));
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn into_outputs(self) -> Vec<Output> {
        self.outputs
    }
}
