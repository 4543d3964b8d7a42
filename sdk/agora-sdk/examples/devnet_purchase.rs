// Example: end-to-end purchase of a paid listing on devnet
//
// This example demonstrates how to:
// 1. Attach a wallet session over a local keypair
// 2. Gate a paid item and observe the Locked state
// 3. Run the purchase flow against a devnet RPC node
//
// Expects AGORA_RPC_URL and AGORA_PLATFORM_WALLET in the environment and a
// funded keypair at ~/.config/solana/id.json.

use agora_ledger::{LedgerConfig, MemoryCatalog, MemoryStore, PurchaseLedger};
use agora_sdk::{
    AccessGate, GateState, KeypairWallet, PurchaseConfig, PurchaseFlow, RpcConnection,
    WalletSession,
};
use agora_state::{ItemKind, MarketplaceItem};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = PurchaseConfig::from_env();
    let connection = Arc::new(
        RpcConnection::new(config.require_rpc_url()?)
            .with_poll_interval(config.confirm_poll_interval),
    );

    // 1. Wallet session over a local keypair (the CLI equivalent of an
    //    injected browser wallet).
    let home = std::env::var("HOME")?;
    let keypair = read_keypair_file(format!("{home}/.config/solana/id.json"))
        .map_err(|err| anyhow::anyhow!("keypair: {err}"))?;
    let wallet = Arc::new(KeypairWallet::new(keypair));
    let session = WalletSession::attach(wallet, connection.clone());
    session.auto_connect_if_trusted().await;
    session.refresh_balance(None).await;
    println!("Buyer: {:?} ({} lamports)", session.address(), session.balance_lamports());

    // 2. A paid listing. In the real deployment this comes from the
    //    marketplace CRUD; the in-memory catalog stands in for it here.
    let item = MarketplaceItem {
        id: "demo-agent".to_string(),
        kind: ItemKind::Agent,
        name: "Demo trading agent".to_string(),
        price_lamports: LAMPORTS_PER_SOL / 100,
        is_free: false,
        seller_wallet: Pubkey::new_unique(),
        seller_user_id: "seller-1".to_string(),
        owner_user_id: "seller-1".to_string(),
    };

    let ledger = Arc::new(PurchaseLedger::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryCatalog::new(vec![item.clone()])),
        connection.clone(),
        LedgerConfig {
            rpc_url: config.rpc_url.clone(),
            platform_wallet: config.platform_wallet,
            ..LedgerConfig::default()
        },
    ));

    // 3. Gate, purchase, re-gate.
    let mut gate = AccessGate::new(ledger.clone(), item.clone(), Some("buyer-1".to_string()));
    println!("Gate before purchase: {:?}", gate.resolve().await?);

    if gate.state() == GateState::Locked {
        let flow = PurchaseFlow::new(connection, ledger, config);
        let outcome = flow.run(&session, &item, "buyer-1").await?;
        println!(
            "Paid {} lamports, signature {} (read path confirmed: {})",
            outcome.record.amount_lamports, outcome.signature, outcome.read_path_confirmed
        );
        println!("Gate after purchase: {:?}", gate.resolve().await?);
    }

    Ok(())
}
