use clap::Parser;
use tracing::{error, info, warn, Instrument};

use storefront_cart::app_system::{setup_tracing, StorefrontConfig, StorefrontSystem};
use storefront_cart::catalog::{CatalogQuery, SortKey, DEFAULT_MAX_PRICE};
use storefront_cart::domain::{ArtworkId, NewLineItem};

/// Browse the storefront catalog and drive the cart from the command line.
#[derive(Debug, Parser)]
#[command(name = "storefront", version)]
struct Cli {
    /// Case-insensitive text matched against title, description and artist.
    #[arg(long, default_value = "")]
    search: String,

    /// newest, priceAsc or priceDesc.
    #[arg(long, default_value_t = SortKey::Newest)]
    sort: SortKey,

    #[arg(long, default_value_t = 0.0)]
    min_price: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_PRICE)]
    max_price: f64,

    /// Artwork ids to put in the cart.
    #[arg(long, value_delimiter = ',')]
    add: Vec<ArtworkId>,

    /// Place an order for the cart (requires a persisted customer session).
    #[arg(long)]
    checkout: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env().map_err(|e| e.to_string())?;
    info!(api_url = %config.api_url, "Starting storefront client");
    let system = StorefrontSystem::from_config(&config).map_err(|e| e.to_string())?;

    let query = CatalogQuery {
        search: cli.search,
        sort: cli.sort,
        min_price: cli.min_price,
        max_price: cli.max_price,
    };
    let artworks = system.browse(&query).await.map_err(|e| e.to_string())?;
    for artwork in &artworks {
        info!(
            artwork_id = artwork.artwork_id,
            title = %artwork.title,
            price = artwork.price,
            "Artwork"
        );
    }

    let span = tracing::info_span!("fill_cart");
    async {
        for id in &cli.add {
            match artworks.iter().find(|a| a.artwork_id == *id) {
                Some(artwork) => match system.cart_client.add(NewLineItem::from(artwork)).await {
                    Ok(cart) => info!(artwork_id = id, total = cart.total(), "Added to cart"),
                    Err(e) => error!(error = %e, "Add failed"),
                },
                None => warn!(artwork_id = id, "Artwork not in the current view, skipping"),
            }
        }
    }
    .instrument(span)
    .await;

    if system.session.current().is_customer() {
        if cli.checkout {
            match system.cart_client.checkout().await {
                Ok(order) => info!(
                    order_id = order.order_id,
                    total = order.total_amount,
                    "Order placed"
                ),
                Err(e) => error!(error = %e, "Checkout failed"),
            }
        } else {
            match system.cart_client.sync_cart().await {
                Ok(outcome) => info!(outcome = ?outcome, "Cart synchronized"),
                Err(e) => error!(error = %e, "Sync failed"),
            }
        }
    } else if cli.checkout {
        warn!("Checkout needs a customer session, see STOREFRONT_SESSION_FILE");
    }

    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Storefront client finished");
    Ok(())
}
