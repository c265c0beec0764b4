//! Gather facts from a FreeRTR router and print them as JSON.
//!
//! Credentials not given on the command line are read from the
//! `FREERTR_NET_*` environment variables.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example gather_facts -- --host 10.0.0.1 --user admin --password secret
//!
//! # Only interfaces and routing
//! cargo run --example gather_facts -- --host 10.0.0.1 --subset interfaces --subset routing
//! ```

use std::env;

use freertr::ProviderConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug to see every command and its timing
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let provider = ProviderConfig {
        host: Some(args.host.clone()),
        port: args.port,
        username: args.user,
        password: args.password,
        ..Default::default()
    }
    .with_env_fallback();

    println!("Connecting to {}:{}...", args.host, provider.port());
    let mut driver = provider.into_builder()?.build()?;
    driver.open().await?;

    let facts = freertr::gather_facts(&mut driver, &args.subsets).await?;
    println!("{}", serde_json::to_string_pretty(&facts)?);

    driver.close().await?;
    Ok(())
}

struct Args {
    host: String,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    subsets: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = Self {
            host: "localhost".to_string(),
            port: None,
            user: None,
            password: None,
            subsets: vec![],
        };

        let mut iter = env::args().skip(1);
        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "--host" | "-h" => args.host = iter.next().unwrap_or(args.host),
                "--port" | "-p" => args.port = iter.next().and_then(|p| p.parse().ok()),
                "--user" | "-u" => args.user = iter.next(),
                "--password" | "-P" => args.password = iter.next(),
                "--subset" | "-s" => args.subsets.extend(iter.next()),
                "--help" => {
                    println!(
                        "usage: gather_facts --host <HOST> [--port <PORT>] [--user <USER>] \
                         [--password <PASS>] [--subset <NAME>]..."
                    );
                    std::process::exit(0);
                }
                other => eprintln!("Unknown argument: {}", other),
            }
        }

        args
    }
}
