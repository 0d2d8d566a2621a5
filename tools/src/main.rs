//! ledger-runner: headless host for the scar ledger.
//!
//! Usage:
//!   ledger-runner --config ledger.json
//!   ledger-runner --data data.json --badges "Scar 1,Scar 2,Scar 3"
//!
//! Reads one JSON request per line on stdin:
//!   {"invoker": {"id": 1, "name": "mod", "is_admin": true},
//!    "command": {"cmd": "record_violation", "member": 42, "reason": "spam"}}
//! and writes one JSON reply per line on stdout. Platform side effects
//! (badges, notices) go to an in-process platform and the log.

use anyhow::{Context, Result};
use scar_ledger_core::{
    clock::SystemClock,
    config::LedgerConfig,
    platform::{ChatPlatform, MemoryPlatform},
    AdminCommand, AdminDesk, CommandReply, Invoker, LedgerStore,
};
use std::{env, path::Path, sync::Arc};
use tokio::{
    io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::{mpsc, watch},
};

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum IpcRequest {
    Quit { quit: bool },
    Command { invoker: Invoker, command: AdminCommand },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = arg_value(&args, "--config");
    let mut config = LedgerConfig::load(config_path.map(Path::new))?;
    if let Some(data) = arg_value(&args, "--data") {
        config.data_file = data.to_string();
    }
    let badges = arg_value(&args, "--badges").unwrap_or("Scar 1,Scar 2,Scar 3");

    log::info!("ledger-runner starting");
    log::info!("  data file:  {}", config.data_file);
    log::info!("  reminders:  every {}s", config.reminder_interval_secs);

    // A corrupt ledger is fatal: refuse to run rather than lose history.
    let store = LedgerStore::open(&config.data_file)
        .with_context(|| format!("Cannot open ledger {}", config.data_file))?;
    let store = Arc::new(store);

    let platform: Arc<dyn ChatPlatform> =
        Arc::new(MemoryPlatform::new(badges.split(',').map(str::trim)));
    let desk = Arc::new(AdminDesk::new(store, platform, Arc::new(SystemClock), config.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Arc::new(desk.reminder_scheduler());
    let reminders = tokio::spawn(scheduler.run(config.reminder_interval(), shutdown_rx));

    run_ipc_loop(desk).await?;

    let _ = shutdown_tx.send(true);
    let _ = reminders.await;
    log::info!("ledger-runner stopped");
    Ok(())
}

async fn run_ipc_loop(desk: Arc<AdminDesk>) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(line) = reply_rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: IpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                let _ = reply_tx.send(format!("{err_json}\n"));
                continue;
            }
        };

        match request {
            IpcRequest::Quit { quit: true } => break,
            IpcRequest::Quit { .. } => continue,
            IpcRequest::Command { invoker, command } => {
                // Commands run concurrently; replies come back as they finish.
                let desk = desk.clone();
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let reply = desk.execute_isolated(invoker, command).await;
                    let _ = reply_tx.send(encode_reply(&reply));
                });
            }
        }
    }

    drop(reply_tx);
    let _ = writer.await;
    Ok(())
}

fn encode_reply(reply: &CommandReply) -> String {
    match serde_json::to_string(reply) {
        Ok(json) => format!("{json}\n"),
        Err(e) => {
            log::error!("Cannot encode reply: {e}");
            format!("{}\n", serde_json::json!({ "error": "internal error" }))
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
