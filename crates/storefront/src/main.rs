//! Scripted storefront session against the wall clock.
//!
//! Adds a few products, adjusts quantities through row controls, hands the
//! order off to the messaging link, then runs the simulated checkout.

use std::time::Duration;

use anyhow::Context;

use cafecart_storefront::{
    HandoffOutcome, LoggingCheckoutTransport, LoggingLinkOpener, Storefront, StorefrontConfig,
    SubmitOutcome, SystemClock,
};

const CATALOG: [(&str, &str, &str); 3] = [
    ("espresso", "Espresso", "8.50"),
    ("latte", "Latte", "12.00"),
    ("pao-de-queijo", "Pão de queijo", "6.90"),
];

fn main() -> anyhow::Result<()> {
    cafecart_observability::init_pretty();

    let config = StorefrontConfig::from_env().context("invalid storefront configuration")?;
    let mut storefront = Storefront::new(
        &config,
        SystemClock,
        LoggingCheckoutTransport,
        LoggingLinkOpener::default(),
    )
    .context("failed to build storefront")?;

    for (id, name, price) in CATALOG {
        storefront
            .add_from_attributes(id, name, price)
            .with_context(|| format!("catalog entry {id} is malformed"))?;
    }
    storefront.add_from_attributes("espresso", "Espresso", "8.50")?;

    // Rows are rebuilt on every render, so controls are re-read each time.
    if let Some(control) = storefront.view().rows().get(2).map(|r| r.decrement.clone()) {
        storefront.press(&control)?;
    }

    println!("{}", storefront.view().to_html());
    println!("items: {}  total: {}", storefront.view().badge.count, storefront.view().total_label);

    if let HandoffOutcome::Opened { url } = storefront.submit_handoff() {
        println!("handoff: {url}");
    }

    match storefront.submit_checkout()? {
        SubmitOutcome::Started(id) => println!("checkout {id} pending"),
        other => anyhow::bail!("checkout did not start: {other:?}"),
    }
    while storefront.poll()?.is_none() {
        std::thread::sleep(Duration::from_millis(50));
    }

    println!("{}", storefront.view().to_html());
    Ok(())
}
