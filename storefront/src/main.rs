//! Storefront command-line shell.
//!
//! ```text
//! storefront                              connect and print the session
//! storefront list                         same as above
//! storefront buy <index>                  buy one copy of an album
//! storefront add <title> <price> <qty>    add an album (owner only), price in ether
//! ```
//!
//! The session snapshot is printed to stdout as JSON; a short summary goes to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use shared::{format_ether_display, truncate_address, ItemForm};
use storefront::app::{SessionState, Storefront};
use storefront::config::init_config;
use storefront::core::error::{AppError, Result};
use storefront::core::service::WalletProvider;
use storefront::services::rpc::JsonRpcWallet;

const USAGE: &str = "usage: storefront [list | buy <index> | add <title> <price> <quantity>]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Buy(u64),
    Add(ItemForm),
}

fn parse_args(args: &[String]) -> std::result::Result<Command, String> {
    match args {
        [] => Ok(Command::List),
        [cmd] if cmd == "list" => Ok(Command::List),
        [cmd, index] if cmd == "buy" => index
            .parse()
            .map(Command::Buy)
            .map_err(|_| format!("Invalid album index {:?}", index)),
        [cmd, title, price, quantity] if cmd == "add" => Ok(Command::Add(ItemForm::new(
            title.as_str(),
            price.as_str(),
            quantity.as_str(),
        ))),
        _ => Err(USAGE.to_string()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _log_guard = storefront::debug::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Storefront command failed");
            eprintln!("Error: {}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args).map_err(AppError::Validation)?;

    let config = init_config()?;
    tracing::info!(
        rpc_url = %config.rpc_url,
        chain_id = %config.expected_chain_id,
        contract = %config.contract_address,
        "Storefront starting"
    );

    let wallet = JsonRpcWallet::new(config.rpc_url.clone()).with_receipt_poll(config.receipt_poll_interval);
    let provider: Arc<dyn WalletProvider> = Arc::new(wallet);
    let storefront = Arc::new(Storefront::from_config(Some(provider), config));
    let pump = storefront.spawn_event_pump();

    storefront.connect().await?;

    match command {
        Command::List => {}
        Command::Buy(index) => {
            let receipt = storefront.buy(index).await?;
            eprintln!("Purchase confirmed in {}", receipt.transaction_hash);
        }
        Command::Add(form) => {
            storefront.set_form(form.clone());
            let receipt = storefront.add_item(form).await?;
            eprintln!("Album added in {}", receipt.transaction_hash);
        }
    }

    let session = storefront.session();
    print_summary(&session);
    match serde_json::to_string_pretty(session.as_ref()) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "Failed to serialize session"),
    }

    if let Some(pump) = pump {
        pump.abort();
    }
    Ok(())
}

fn print_summary(session: &SessionState) {
    if let Some(account) = session.account {
        let balance = session.balance.map(format_ether_display).unwrap_or_else(|| "?".to_string());
        let role = if session.is_owner { " (owner)" } else { "" };
        eprintln!("{}{}  {} ETH", truncate_address(&account.to_string()), role, balance);
    }

    for item in &session.items {
        let stock = if item.in_stock() {
            format!("{} left", item.quantity_available)
        } else {
            "sold out".to_string()
        };
        eprintln!(
            "  #{:<3} {:<32} {:>12} ETH  {}",
            item.index,
            item.title,
            format_ether_display(item.unit_price),
            stock
        );
    }
}
