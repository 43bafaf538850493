//! Pricing CLI
//!
//! Command-line interface for the Pricing API.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use pricing_client::PricingClient;
use pricing_types::{
    ConvertResponse, CurrencyCode, CurrencyStatus, PricedItem, UpsertCurrencyRequest,
};

#[derive(Parser)]
#[command(name = "pricing")]
#[command(author, version, about = "Pricing API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Pricing API
    #[arg(long, env = "PRICING_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Admin token for the admin endpoints
    #[arg(long, env = "PRICING_ADMIN_TOKEN")]
    admin_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// List the currencies conversions support
    Currencies,
    /// Convert an amount between currencies
    Convert {
        amount: f64,
        /// Source currency
        #[arg(long, default_value = "SSP")]
        from: String,
        /// Target currency; the server's display currency when omitted
        #[arg(long)]
        to: Option<String>,
    },
    /// Total a cart in one currency
    CartTotal {
        /// Cart line as PRICE[:CURRENCY[:QUANTITY]], repeatable
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<PricedItem>,
        /// Target currency; the server's display currency when omitted
        #[arg(long)]
        currency: Option<String>,
    },
    /// Currency table administration
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// List every stored currency
    List,
    /// Show one stored currency
    Get { code: String },
    /// Create or update a currency
    Upsert {
        code: String,
        #[arg(long)]
        name: String,
        /// Units of this currency per one unit of the base currency
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Activate or deactivate a currency
    Status {
        code: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Force the server to refetch rates
    Refresh,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for CurrencyStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => CurrencyStatus::Active,
            StatusArg::Inactive => CurrencyStatus::Inactive,
        }
    }
}

fn parse_code(s: &str) -> Result<CurrencyCode> {
    CurrencyCode::new(s).map_err(|e| anyhow::anyhow!("Invalid currency {:?}: {}", s, e))
}

/// Parses `PRICE[:CURRENCY[:QUANTITY]]`; a missing currency means the base
/// currency and a missing quantity means one.
fn parse_item(s: &str) -> Result<PricedItem, String> {
    let mut parts = s.split(':');
    let price = parts
        .next()
        .unwrap_or_default()
        .parse::<f64>()
        .map_err(|e| format!("invalid price in {:?}: {}", s, e))?;
    let currency = match parts.next().filter(|c| !c.is_empty()) {
        Some(code) => Some(CurrencyCode::new(code).map_err(|e| e.to_string())?),
        None => None,
    };
    let quantity = match parts.next() {
        Some(q) => q
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity in {:?}: {}", s, e))?,
        None => 1,
    };
    if parts.next().is_some() {
        return Err(format!("expected PRICE[:CURRENCY[:QUANTITY]], got {:?}", s));
    }
    Ok(PricedItem {
        price,
        currency,
        quantity,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = PricingClient::new(&cli.api_url);
    if let Some(token) = cli.admin_token {
        client = client.with_admin_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currencies => {
            let currencies = client.currencies().await?;
            println!("{}", serde_json::to_string_pretty(&currencies)?);
        }

        Commands::Convert { amount, from, to } => {
            let from = parse_code(&from)?;
            let to = to.as_deref().map(parse_code).transpose()?;
            let resp = client.convert(amount, &from, to.as_ref()).await?;
            if !resp.converted {
                eprintln!(
                    "warning: no rate for {} -> {}, amount left unconverted",
                    resp.from, resp.to
                );
            }
            println!("{}", render_conversion(&resp)?);
        }

        Commands::CartTotal { items, currency } => {
            let currency = currency.as_deref().map(parse_code).transpose()?;
            let total = client.cart_total(items, currency).await?;
            println!("{}", serde_json::to_string_pretty(&total)?);
        }

        Commands::Admin { action } => match action {
            AdminCommands::List => {
                let currencies = client.list_currencies().await?;
                println!("{}", serde_json::to_string_pretty(&currencies)?);
            }
            AdminCommands::Get { code } => {
                let currency = client.get_currency(&parse_code(&code)?).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            AdminCommands::Upsert {
                code,
                name,
                rate,
                symbol,
                status,
            } => {
                let req = UpsertCurrencyRequest {
                    name,
                    symbol,
                    rate,
                    status: status.map(Into::into),
                };
                let currency = client.upsert_currency(&parse_code(&code)?, &req).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            AdminCommands::Status { code, status } => {
                let currency = client
                    .set_currency_status(&parse_code(&code)?, status.into())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            AdminCommands::Refresh => {
                let resp = client.refresh_rates().await?;
                println!("{}", serde_json::to_string_pretty(&resp)?);
            }
        },
    }

    Ok(())
}

/// Pretty JSON for a conversion, including the `converted` flag and the
/// display string.
fn render_conversion(resp: &ConvertResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(resp)?)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_item_full() {
        let item = parse_item("15000:usd:3").unwrap();
        assert_eq!(item.price, 15000.0);
        assert_eq!(item.currency.unwrap().as_str(), "USD");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_parse_item_defaults() {
        let item = parse_item("250").unwrap();
        assert!(item.currency.is_none());
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_parse_item_rejects_garbage() {
        assert!(parse_item("abc").is_err());
        assert!(parse_item("10:USD:-1").is_err());
        assert!(parse_item("10:USD:1:extra").is_err());
    }

    #[test]
    fn test_render_conversion_is_json() {
        let resp = ConvertResponse {
            amount: 500.0,
            from: CurrencyCode::new("SSP").unwrap(),
            to: CurrencyCode::new("EUR").unwrap(),
            converted_amount: 500.0,
            converted: false,
            rate: None,
            formatted: "SSP 500".to_string(),
        };

        let rendered = render_conversion(&resp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert!(rendered.contains('\n'));
        assert_eq!(value["converted"], false);
        assert_eq!(value["converted_amount"], 500.0);
        assert_eq!(value["formatted"], "SSP 500");
        assert!(value.get("rate").is_none());
    }
}
