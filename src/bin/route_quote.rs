use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use solroute::application::{SwapRequest, SwapRouter};
use solroute::domain::routing::RouteQuote;
use solroute::infrastructure::api::{FilePoolListSource, HttpPoolListClient, PoolListSource};
use solroute::infrastructure::rpc::SolanaChainSource;
use solroute::shared::config::RouterConfig;
use solroute::shared::math::Percent;
use solroute::shared::types::TokenAmount;

#[derive(Parser, Debug)]
#[command(version, about = "Best-route swap quoter for Raydium liquidity pools")]
struct Args {
    /// Input token mint address
    #[arg(long)]
    input_mint: String,

    /// Output token mint address
    #[arg(long)]
    output_mint: String,

    /// Input amount in raw base units
    #[arg(long)]
    amount: u64,

    /// Decimals of the input mint
    #[arg(long)]
    input_decimals: u8,

    /// Slippage tolerance in basis points (overrides config)
    #[arg(long)]
    slippage_bps: Option<u64>,

    /// RPC endpoint URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Read the pool list from a saved liquidity file instead of the API
    #[arg(long)]
    pool_list_file: Option<String>,

    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// Print the quote as a single JSON document
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput {
    route_type: &'static str,
    hops: Vec<HopOutput>,
    amount_in: String,
    amount_out: String,
    min_amount_out: String,
    execution_price: Option<String>,
    price_impact: String,
    fees: Vec<String>,
    expiration_seconds: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HopOutput {
    pool: String,
    version: u8,
    input_mint: String,
    output_mint: String,
    amount_in: String,
    amount_out: String,
}

impl QuoteOutput {
    fn from_quote(quote: &RouteQuote) -> Self {
        let places = quote.amount_out.decimals as usize;
        Self {
            route_type: quote.route_type.as_str(),
            hops: quote
                .routes
                .iter()
                .map(|leg| HopOutput {
                    pool: leg.pool_id.to_string(),
                    version: leg.version.number(),
                    input_mint: leg.input_mint.to_string(),
                    output_mint: leg.output_mint.to_string(),
                    amount_in: leg.amount_in.amount.to_string(),
                    amount_out: leg.amount_out.amount.to_string(),
                })
                .collect(),
            amount_in: quote.amount_in.amount.to_string(),
            amount_out: quote.amount_out.amount.to_string(),
            min_amount_out: quote.min_amount_out.amount.to_string(),
            execution_price: quote
                .execution_price
                .as_ref()
                .map(|price| price.to_decimal_string(places)),
            price_impact: quote.price_impact.to_decimal_string(6),
            fees: quote.fees.iter().map(|fee| fee.amount.to_string()).collect(),
            expiration_seconds: quote.expiration_seconds,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // Configuration priority: CLI args > config file > defaults
    let mut cfg = match &args.config {
        Some(path) => RouterConfig::from_file(path)?,
        None => RouterConfig::default(),
    };
    if let Some(rpc_url) = args.rpc_url {
        cfg.rpc.url = rpc_url;
    }
    if let Some(slippage_bps) = args.slippage_bps {
        cfg.trade.slippage_bps = slippage_bps;
    }

    let input_mint = Pubkey::from_str(&args.input_mint).context("parse input mint")?;
    let output_mint = Pubkey::from_str(&args.output_mint).context("parse output mint")?;

    let pools: Box<dyn PoolListSource> = match &args.pool_list_file {
        Some(path) => Box::new(FilePoolListSource::new(path.clone())),
        None => Box::new(HttpPoolListClient::new(&cfg.api)?),
    };
    let chain = Box::new(SolanaChainSource::new(&cfg.rpc));
    let router = SwapRouter::new(pools, chain);

    let request = SwapRequest::new(
        TokenAmount::from_raw_u64(input_mint, args.amount, args.input_decimals),
        output_mint,
        Percent::from_bps(cfg.trade.slippage_bps),
    );
    let quote = router.best_route(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&QuoteOutput::from_quote(&quote))?);
        return Ok(());
    }

    if quote.is_empty() {
        println!("no route available for {} -> {}", input_mint, output_mint);
        return Ok(());
    }
    println!("route type:   {} ({} hop)", quote.route_type.as_str(), quote.routes.len());
    for leg in &quote.routes {
        println!(
            "  pool {} (v{}): {} {} -> {} {}",
            leg.pool_id,
            leg.version.number(),
            leg.amount_in.amount,
            leg.input_mint,
            leg.amount_out.amount,
            leg.output_mint,
        );
    }
    println!("amount in:    {} ({})", quote.amount_in.amount, quote.amount_in.to_ui_string());
    println!("amount out:   {} ({})", quote.amount_out.amount, quote.amount_out.to_ui_string());
    println!(
        "min out:      {} ({})",
        quote.min_amount_out.amount,
        quote.min_amount_out.to_ui_string()
    );
    if let Some(price) = &quote.execution_price {
        println!(
            "exec price:   {}",
            price.to_decimal_string(quote.amount_out.decimals as usize)
        );
    }
    println!("price impact: {}", quote.price_impact.to_decimal_string(6));
    for fee in &quote.fees {
        println!("fee:          {} ({})", fee.amount, fee.mint);
    }
    if let Some(seconds) = quote.expiration_seconds {
        println!("valid for:    {}s (fee schedule change pending)", seconds);
    }
    Ok(())
}
