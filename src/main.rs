use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use ethers::providers::{Http, Provider};
use num_bigint::BigUint;
use swap_quotes::{
    amount, build_provider, gas, Config, HttpTransport, ProviderKind, QuoteError, QuoteProvider,
    QuoteRequest, QuoteResult, ReqwestTransport, Result, SwapCallData,
};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "quotes")]
#[command(about = "Swap quotes and call data from DEX aggregators", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(short, long, global = true)]
    json: bool,
}

#[derive(clap::Args)]
struct SwapArgs {
    /// Provider: 0x or 1inch
    #[arg(long, default_value = "0x")]
    provider: String,

    /// Chain id
    #[arg(long, default_value_t = 137)]
    chain: u64,

    /// Token sold
    src: String,

    /// Token bought
    dst: String,

    /// Amount in base units, or human units when --decimals is set
    amount: String,

    /// Decimals of the fixed side, enables human amounts like 1.5
    #[arg(long)]
    decimals: Option<u8>,

    /// Fix the output amount instead of the input
    #[arg(long)]
    exact_out: bool,

    /// Disable upstream balance and allowance simulation
    #[arg(long)]
    skip_validation: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List tokens a provider supports on a chain
    Tokens {
        #[arg(long, default_value = "1inch")]
        provider: String,

        #[arg(long, default_value_t = 137)]
        chain: u64,

        /// Maximum rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Price a swap
    Quote {
        #[command(flatten)]
        args: SwapArgs,

        /// Taker address
        #[arg(long)]
        from: Option<String>,
    },

    /// Fetch executable swap call data
    Swap {
        #[command(flatten)]
        args: SwapArgs,

        /// Wallet executing the swap
        #[arg(long)]
        from: String,

        /// Slippage in provider units
        #[arg(long, default_value_t = 1)]
        slippage: u8,

        /// Referrer forwarded upstream
        #[arg(long)]
        referrer: Option<String>,
    },

    /// Current gas price of the RPC chain
    GasPrice {
        /// Also fetch the EIP-1559 priority fee
        #[arg(long)]
        eip1559: bool,
    },

    /// Estimate gas for a call
    EstimateGas {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Call data, hex or text
        #[arg(long, default_value = "")]
        data: String,

        /// Native value in wei
        #[arg(long, default_value = "0")]
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!("\nSee .env.example for the supported variables.");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Tokens { provider, chain, limit } => {
            handle_tokens(&config, &provider, chain, limit, cli.json).await
        }
        Commands::Quote { args, from } => handle_quote(&config, &args, from, cli.json).await,
        Commands::Swap {
            args,
            from,
            slippage,
            referrer,
        } => handle_swap(&config, &args, from, slippage, referrer, cli.json).await,
        Commands::GasPrice { eip1559 } => handle_gas_price(&config, eip1559, cli.json).await,
        Commands::EstimateGas { from, to, data, value } => {
            handle_estimate_gas(&config, &from, &to, &data, &value, cli.json).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn make_provider(config: &Config, name: &str) -> Result<Arc<dyn QuoteProvider>> {
    let kind: ProviderKind = name.parse()?;
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(config.http_timeout)?);
    Ok(build_provider(kind, config, transport))
}

fn rpc_client(config: &Config) -> Result<Provider<Http>> {
    Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| QuoteError::RpcError(format!("Failed to create provider: {}", e)))
}

fn parse_cli_amount(raw: &str, decimals: Option<u8>) -> Result<BigUint> {
    match decimals {
        Some(decimals) => amount::parse_units(raw, decimals),
        None => amount::parse_amount(raw).ok_or_else(|| QuoteError::InvalidAmount(raw.to_string())),
    }
}

fn build_request(args: &SwapArgs) -> Result<QuoteRequest> {
    let amount = parse_cli_amount(&args.amount, args.decimals)?;
    Ok(QuoteRequest::new(
        args.chain,
        args.src.to_lowercase(),
        args.dst.to_lowercase(),
        amount,
    )
    .with_skip_validation(args.skip_validation))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| QuoteError::Other(anyhow::anyhow!("JSON error: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

fn header(title: &str) {
    println!("\n{}", "━".repeat(60).bright_cyan());
    println!("  {}", title.bright_cyan().bold());
    println!("{}", "━".repeat(60).bright_cyan());
    println!();
}

async fn handle_tokens(
    config: &Config,
    provider_name: &str,
    chain: u64,
    limit: usize,
    json_output: bool,
) -> Result<()> {
    let provider = make_provider(config, provider_name)?;
    let mut tokens = provider.fetch_supported_tokens(chain).await?;
    tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    if json_output {
        return print_json(&tokens);
    }

    header(&format!("{} tokens on chain {} - {}", provider.name(), chain, tokens.len()));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Symbol".bright_white().bold().to_string(),
        "Name".bright_white().bold().to_string(),
        "Decimals".bright_white().bold().to_string(),
        "Address".bright_white().bold().to_string(),
    ]);

    for token in tokens.iter().take(limit) {
        table.add_row(vec![
            token.symbol.bright_cyan().to_string(),
            token.name.clone(),
            token.decimals.to_string(),
            token.address.bright_black().to_string(),
        ]);
    }
    println!("{}", table);

    if tokens.len() > limit {
        println!("\n  {} and {} more tokens", "...".bright_black(), (tokens.len() - limit).to_string().bright_yellow());
    }
    println!();
    Ok(())
}

async fn handle_quote(
    config: &Config,
    args: &SwapArgs,
    from: Option<String>,
    json_output: bool,
) -> Result<()> {
    let provider = make_provider(config, &args.provider)?;
    let mut req = build_request(args)?;
    if let Some(from) = from {
        req = req.with_from(from.to_lowercase());
    }

    info!("Requesting {} quote from {}", if args.exact_out { "exact-out" } else { "exact-in" }, provider.name());

    let quote = if args.exact_out {
        provider.fetch_exact_out_quote(&req).await?
    } else {
        provider.fetch_exact_in_quote(&req).await?
    };

    if json_output {
        let output = serde_json::json!({
            "provider": provider.name(),
            "chain_id": quote.chain_id,
            "src": quote.src,
            "dst": quote.dst,
            "from_amount": quote.from_amount.to_string(),
            "to_amount": quote.to_amount.to_string(),
            "gas": quote.gas.as_ref().map(|g| g.to_string()),
            "gas_price": quote.gas_price.as_ref().map(|g| g.to_string()),
        });
        return print_json(&output);
    }

    print_quote(provider.name(), &quote, args.exact_out);
    Ok(())
}

async fn handle_swap(
    config: &Config,
    args: &SwapArgs,
    from: String,
    slippage: u8,
    referrer: Option<String>,
    json_output: bool,
) -> Result<()> {
    let provider = make_provider(config, &args.provider)?;
    let req = build_request(args)?
        .with_from(from.to_lowercase())
        .with_slippage(slippage)
        .with_referrer(referrer.unwrap_or_default());

    let call = if args.exact_out {
        provider.fetch_exact_out_swap_call_data(&req).await?
    } else {
        provider.fetch_exact_in_swap_call_data(&req).await?
    };

    if json_output {
        return print_json(&call);
    }

    print_call_data(provider.name(), &call);
    Ok(())
}

async fn handle_gas_price(config: &Config, eip1559: bool, json_output: bool) -> Result<()> {
    let client = rpc_client(config)?;

    if eip1559 {
        let (base_fee, priority_fee) = gas::estimate_eip1559_fees(&client).await?;
        if json_output {
            return print_json(&serde_json::json!({
                "base_fee": base_fee.to_string(),
                "priority_fee": priority_fee.to_string(),
            }));
        }
        header("EIP-1559 Fees");
        println!("  {} {} gwei", "Base fee:".bright_white().bold(), amount::format_units(&base_fee, 9).bright_yellow());
        println!("  {} {} gwei", "Priority fee:".bright_white().bold(), amount::format_units(&priority_fee, 9).bright_yellow());
        println!();
        return Ok(());
    }

    let gas_price = gas::estimate_gas_price(&client).await?;
    if json_output {
        return print_json(&serde_json::json!({ "gas_price": gas_price.to_string() }));
    }
    header("Gas Price");
    println!("  {} {} gwei", "Gas price:".bright_white().bold(), amount::format_units(&gas_price, 9).bright_yellow());
    println!();
    Ok(())
}

async fn handle_estimate_gas(
    config: &Config,
    from: &str,
    to: &str,
    data: &str,
    value: &str,
    json_output: bool,
) -> Result<()> {
    let client = rpc_client(config)?;
    let value = parse_cli_amount(value, None)?;
    let limit = gas::estimate_gas_limit(&client, from, to, data, &value).await?;

    if json_output {
        return print_json(&serde_json::json!({ "gas_limit": limit }));
    }
    header("Gas Estimate");
    println!("  {} {}", "Gas limit:".bright_white().bold(), limit.to_string().bright_yellow().bold());
    println!();
    Ok(())
}

fn print_quote(provider: &str, quote: &QuoteResult, exact_out: bool) {
    println!();
    println!("{}", "━".repeat(60).bright_green());
    println!("  {} {}", "Quote from".bright_green().bold(), provider.bright_white().bold());
    println!("{}", "━".repeat(60).bright_green());
    println!();

    let (fixed_label, quoted_label) = if exact_out {
        ("Output:", "Input needed:")
    } else {
        ("Input:", "Output:")
    };

    println!("  {} {} {}", fixed_label.bright_white().bold(), quote.from_amount.to_string().bright_cyan().bold(), quote.src.bright_black());
    println!("  {} {} {}", quoted_label.bright_white().bold(), quote.to_amount.to_string().bright_green().bold(), quote.dst.bright_black());
    println!();

    let gas = quote.gas.as_ref().map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
    let gas_price = quote
        .gas_price
        .as_ref()
        .map(|p| format!("{} gwei", amount::format_units(p, 9)))
        .unwrap_or_else(|| "-".to_string());

    println!("  {} {}", "Gas Estimate:".bright_white().bold(), gas.bright_yellow());
    println!("  {} {}", "Gas Price:".bright_white().bold(), gas_price.bright_yellow());
    println!();
}

fn print_call_data(provider: &str, call: &SwapCallData) {
    header(&format!("Swap call data from {}", provider));

    let data = call.data();
    let preview = if data.len() > 66 {
        format!("{}…", data.chars().take(66).collect::<String>())
    } else {
        data.to_string()
    };

    println!("  {} {}", "To:".bright_white().bold(), call.to().bright_cyan());
    println!("  {} {}", "Value:".bright_white().bold(), call.value().bright_yellow());
    println!("  {} {} ({} bytes)", "Data:".bright_white().bold(), preview.bright_black(), data.len().saturating_sub(2) / 2);

    if let Some(res) = call.as_zerox() {
        println!("  {} {}", "Guaranteed price:".bright_white().bold(), res.guaranteed_price.bright_green());
        for order in &res.orders {
            println!("    {} {} {} -> {}", "•".bright_cyan(), order.source.bright_white(), order.fill.input, order.fill.output);
        }
    }
    if let Some(res) = call.as_oneinch() {
        println!("  {} {}", "To amount:".bright_white().bold(), res.to_amount.bright_green());
        println!("  {} {}", "Gas price:".bright_white().bold(), res.tx.gas_price.bright_yellow());
    }
    println!();
}
