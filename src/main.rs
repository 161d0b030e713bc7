//! Rollups handler
//!
//! Developer tools for route headers and ABI payloads, plus an echo
//! application that runs against a rollup node.
//!
//! # Architecture Overview
//!
//! ```text
//!   rollup node                         rollups-handler
//!  ┌───────────┐   POST /finish    ┌─────────────┐    ┌────────────────┐
//!  │           │◀──────────────────│   runner    │───▶│ dispatch table │
//!  │  inputs   │──── request ─────▶│             │    │  fixed address │
//!  │           │                   │             │    │  known address │
//!  │  outputs  │◀── notice/report ─│   outbox    │◀───│  matchers      │
//!  └───────────┘                   └─────────────┘    │  catch-all     │
//!                                                     └───────┬────────┘
//!                                                             ▼
//!                                                      codec (abi, header)
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use rollups_handler::abi::{value_from_json, value_to_json};
use rollups_handler::codec::{route_header, voucher_selector, Codec};
use rollups_handler::config::{load_or_default, RollupsConfig};
use rollups_handler::lifecycle::{spawn_signal_listener, Shutdown};
use rollups_handler::observability::{init_logging, metrics};
use rollups_handler::rollups::assets::{decode_erc20_deposit, decode_erc721_deposit, decode_ether_deposit};
use rollups_handler::rollups::{AdvanceRequest, InspectRequest, KnownAddresses, NetworkAddresses, Outbox};
use rollups_handler::routing::{ConfigurationError, DispatchTable, HandlerError, HandlerResult};
use rollups_handler::transport::HttpTransport;
use rollups_handler::{RunError, Runner};

#[derive(Parser)]
#[command(name = "rollups-handler")]
#[command(about = "ABI payload tools and echo runner for rollup applications", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overrides the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route header of namespace, method and field types
    Header {
        namespace: String,
        method: String,
        fields: Vec<String>,
    },
    /// Print the function selector of method and field types
    Selector { method: String, fields: Vec<String> },
    /// Encode a JSON array or object into a hex payload
    Encode {
        #[command(flatten)]
        codec: CodecArgs,
        /// Values as JSON, e.g. '["0x..", "1000"]'
        values: String,
    },
    /// Decode a hex payload into JSON
    Decode {
        #[command(flatten)]
        codec: CodecArgs,
        payload: String,
    },
    /// Run the echo application against the rollup node
    Run,
}

#[derive(clap::Args)]
struct CodecArgs {
    /// Field type, repeat per field (e.g. -f "uint256 amount" -f address)
    #[arg(short, long = "field")]
    fields: Vec<String>,

    /// Use the packed layout
    #[arg(long)]
    packed: bool,

    /// Prefix a route header, given as namespace:method
    #[arg(long, conflicts_with = "selector")]
    route: Option<String>,

    /// Prefix the function selector of this method
    #[arg(long)]
    selector: Option<String>,
}

impl CodecArgs {
    fn build(&self) -> Result<Codec, Box<dyn Error>> {
        if let Some(method) = &self.selector {
            if self.packed {
                return Err("selector codecs always use the standard layout".into());
            }
            return Ok(Codec::voucher(method, &self.fields)?);
        }
        let codec = match (&self.route, self.packed) {
            (Some(route), packed) => {
                let (namespace, method) = route
                    .split_once(':')
                    .ok_or("route must be given as namespace:method")?;
                if packed {
                    Codec::packed_with_route(namespace, method, &self.fields)?
                } else {
                    Codec::with_route(namespace, method, &self.fields)?
                }
            }
            (None, true) => Codec::packed(&self.fields)?,
            (None, false) => Codec::new(&self.fields)?,
        };
        Ok(codec)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Header {
            namespace,
            method,
            fields,
        } => println!("{}", route_header(&namespace, &method, &fields)?),
        Commands::Selector { method, fields } => println!("{}", voucher_selector(&method, &fields)?),
        Commands::Encode { codec, values } => {
            let codec = codec.build()?;
            let json: serde_json::Value = serde_json::from_str(&values)?;
            let value = value_from_json(&json, codec.descriptor())?;
            println!("{}", rollups_handler::rollups::hex::bytes_to_hex(codec.encode_value(&value)?));
        }
        Commands::Decode { codec, payload } => {
            let codec = codec.build()?;
            let decoded = codec.decode(&payload)?;
            let json = value_to_json(&rollups_handler::abi::AbiValue::Tuple(decoded.into_fields()));
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Run => {
            let config = load_or_default(cli.config.as_deref())?;
            run(config, cli.log_level).await?;
        }
    }

    Ok(())
}

async fn run(config: RollupsConfig, log_level: Option<String>) -> Result<(), Box<dyn Error>> {
    init_logging(log_level.as_deref().unwrap_or(&config.observability.log_level));
    tracing::info!("rollups-handler v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let transport = HttpTransport::from_config(&config.server, config.retries.clone())?;
    tracing::info!(
        url = transport.base_url(),
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    let table = echo_table(&config.network)?;
    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    spawn_signal_listener(shutdown.clone());

    match Runner::new(table, transport).run(receiver).await {
        Ok(()) | Err(RunError::Cancelled) => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Echo application: advance payloads come back as notices, inspect
/// payloads as reports, and portal deposits are summarized in a report.
fn echo_table(network: &NetworkAddresses) -> Result<DispatchTable, ConfigurationError> {
    let mut builder = DispatchTable::builder();
    builder
        .handle_advance(|req: &AdvanceRequest, out: &mut Outbox| -> HandlerResult {
            out.notice(req.payload.clone());
            Ok(())
        })?
        .handle_inspect(|req: &InspectRequest, out: &mut Outbox| -> HandlerResult {
            out.report(req.payload.clone());
            Ok(())
        })?;

    if !network.is_empty() {
        let portals = network.clone();
        builder
            .known_addresses(KnownAddresses::from(network))?
            .handle_rollups_fixed_addresses(move |req: &AdvanceRequest, out: &mut Outbox| -> HandlerResult {
                let summary = describe_portal_input(&portals, req)?;
                tracing::info!(summary = %summary, "Portal input");
                out.report_text(&summary);
                Ok(())
            })?;
    }

    Ok(builder.build())
}

fn describe_portal_input(network: &NetworkAddresses, req: &AdvanceRequest) -> Result<String, HandlerError> {
    let sender = req.metadata.msg_sender.as_str();
    let is = |address: &str| !address.is_empty() && address.eq_ignore_ascii_case(sender);

    let summary = if is(&network.ether_portal) {
        let deposit = decode_ether_deposit(&req.payload)?;
        format!("ether deposit of {} wei from {}", deposit.amount, deposit.depositor)
    } else if is(&network.erc20_portal) {
        let deposit = decode_erc20_deposit(&req.payload)?;
        format!(
            "erc20 deposit of {} of token {} from {}",
            deposit.amount, deposit.token, deposit.depositor
        )
    } else if is(&network.erc721_portal) {
        let deposit = decode_erc721_deposit(&req.payload)?;
        format!(
            "erc721 deposit of token {} id {} from {}",
            deposit.token, deposit.token_id, deposit.depositor
        )
    } else {
        format!("input from framework contract {}", sender)
    };
    Ok(summary)
}
