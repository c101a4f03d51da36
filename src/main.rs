//! Taskspace Entry Point
//!
//! Opens the configured database, signs in the identity named by
//! `TASKSPACE_USER` / `TASKSPACE_ORG` and prints the sidebar.

use std::path::PathBuf;
use std::sync::Arc;

use taskspace_lib::auth::Identity;
use taskspace_ui::{InProcessBackend, SyncConfig, SyncDriver};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("taskspace.json"));

    let state = match taskspace_lib::start(&config_path).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let identity = match (std::env::var("TASKSPACE_USER"), std::env::var("TASKSPACE_ORG")) {
        (Ok(user), Ok(org)) => Some(Identity::new(&user, &org)),
        _ => None,
    };

    let backend = Arc::new(InProcessBackend::new(Arc::new(state), identity));
    let mut driver = SyncDriver::new(backend, SyncConfig::default());
    if let Err(e) = driver.connect().await {
        log::error!(target: "taskspace", "Failed to load workspace: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    for entry in driver.sidebar.view() {
        let marker = if driver.ui.is_space_open(entry.space.id) { "-" } else { "+" };
        println!("{} {} ({})", marker, entry.space.name, entry.space.color);
        for list in entry.lists {
            println!("    {}", list.name);
        }
    }
}
