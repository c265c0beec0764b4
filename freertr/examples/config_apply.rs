//! Push an interface description, showing the commands first.
//!
//! Runs a dry run, prints the commands it would send, then applies them
//! and saves the configuration.
//!
//! # Usage
//!
//! ```bash
//! FREERTR_NET_PASSWORD=secret cargo run --example config_apply -- rtr1 ethernet1 "uplink to core"
//! ```

use std::env;

use freertr::{ConfigRequest, ProviderConfig, ResponseCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let (Some(host), Some(interface), Some(description)) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: config_apply <HOST> <INTERFACE> <DESCRIPTION>");
        std::process::exit(1);
    };

    let provider = ProviderConfig {
        host: Some(host.clone()),
        ..Default::default()
    }
    .with_env_fallback();

    let mut driver = provider.into_builder()?.build()?;
    driver.open().await?;

    let mut request = ConfigRequest::lines([format!("description {}", description)])
        .parents([format!("interface {}", interface)]);
    request.host = Some(host);
    request.dry_run = true;

    // One cache for both passes, so the running config is read once
    let mut cache = ResponseCache::new();

    let preview = freertr::apply_config(&mut driver, &mut cache, &request).await?;
    if !preview.changed {
        println!("Nothing to do.");
        driver.close().await?;
        return Ok(());
    }

    println!("Commands:");
    for command in &preview.commands {
        println!("  {}", command);
    }

    request.dry_run = false;
    request.save = true;
    let outcome = freertr::apply_config(&mut driver, &mut cache, &request).await?;
    println!("Applied {} commands, saved: {}", outcome.commands.len(), outcome.saved);

    driver.close().await?;
    Ok(())
}
