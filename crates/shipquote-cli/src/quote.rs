use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shipquote_core::{CartLine, DeliveryMode, Destination, PostalCode, QuoteSet, ServiceLevel};
use shipquote_engine::{QuoteEngine, RateCard};
use shipquote_postal::PostalClient;

/// Either a bare array of lines or `{ "items": [...] }`, the shape the
/// estimation endpoint accepts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CartFile {
    Lines(Vec<CartLine>),
    Wrapped { items: Vec<CartLine> },
}

impl CartFile {
    fn into_lines(self) -> Vec<CartLine> {
        match self {
            CartFile::Lines(lines) | CartFile::Wrapped { items: lines } => lines,
        }
    }
}

#[derive(Debug, Serialize)]
struct QuoteOutput<'a> {
    #[serde(flatten)]
    quote: &'a QuoteSet,
    warnings: &'a [String],
}

pub(crate) fn parse_cart(content: &str) -> anyhow::Result<Vec<CartLine>> {
    let cart: CartFile = serde_json::from_str(content).context("cart is not valid JSON")?;
    Ok(cart.into_lines())
}

/// Quote a cart file and print the result.
///
/// Postal resolution is best effort: failures become warnings on stderr.
///
/// # Errors
///
/// Returns an error if the cart cannot be read or parsed, or the mode is unknown.
pub(crate) async fn run_quote(
    cart_path: &Path,
    mode: &str,
    postal_code: Option<&str>,
    card: RateCard,
    json: bool,
) -> anyhow::Result<()> {
    let mode: DeliveryMode = mode.parse()?;
    let content = std::fs::read_to_string(cart_path)
        .with_context(|| format!("failed to read cart {}", cart_path.display()))?;
    let lines = parse_cart(&content)?;

    let mut warnings = Vec::new();
    let destination = match postal_code {
        Some(raw) => resolve_destination(raw).await.unwrap_or_else(|warning| {
            warnings.push(warning);
            None
        }),
        None => None,
    };

    let quote = QuoteEngine::new(card).quote(&lines, mode, destination);

    if json {
        let output = QuoteOutput {
            quote: &quote,
            warnings: &warnings,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for warning in &warnings {
            eprintln!("warning: {warning}");
        }
        print!("{}", render_quote(&quote));
    }
    Ok(())
}

async fn resolve_destination(raw: &str) -> Result<Option<Destination>, String> {
    let postal_code = PostalCode::parse(raw).map_err(|e| e.to_string())?;
    let config = shipquote_core::load_app_config().map_err(|e| e.to_string())?;
    let client = PostalClient::with_base_url(
        &config.postal_base_url,
        Duration::from_millis(config.postal_timeout_ms),
        config.postal_max_retries,
    )
    .map_err(|e| e.to_string())?;

    match client.resolve(&postal_code).await {
        Ok(destination) => Ok(Some(destination)),
        Err(e) => {
            tracing::warn!(%postal_code, error = %e, "postal lookup failed");
            Err(format!("could not resolve postal code {postal_code}"))
        }
    }
}

pub(crate) fn render_quote(quote: &QuoteSet) -> String {
    let mut lines = vec![format!("Mode:        {}", quote.mode)];
    if quote.mode != DeliveryMode::Pickup {
        lines.push(format!(
            "Weight:      {} ({} g)",
            quote.weight_label, quote.total_grams
        ));
    }
    if let Some(destination) = &quote.destination {
        lines.push(format!(
            "Destination: {} ({})",
            destination.label(),
            destination.postal_code
        ));
    }
    lines.push(String::new());
    lines.push(format!("{:<10}{:>10}  LEAD TIME", "SERVICE", "PRICE"));
    for service in [ServiceLevel::Economy, ServiceLevel::Express] {
        let q = quote.service(service);
        lines.push(format!(
            "{:<10}{:>10}  {} day(s)",
            service.carrier_name(),
            format!("R$ {:.2}", q.price),
            q.lead_time_days
        ));
    }
    lines.push(String::new());
    lines.push(match quote.line_item() {
        Some(item) => format!("Charge:      {} R$ {:.2}", item.title, item.unit_price),
        None => "Charge:      none".to_string(),
    });

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
