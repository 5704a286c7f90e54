//! Interactive location settings screen backed by JSON files
//!
//! Usage: cargo run --example location_settings [data-dir]

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use geoperms::cli::Console;
use geoperms::logging::init_logging;
use geoperms::{
    Command, InMemoryGeolocationPermissions, JsonFileLocationPermissionsRepository,
    JsonSettingsDataStore, LocationPermissionType, LocationPermissionsViewModel,
    SiteLocationPermissionListener,
};

/// How long to wait for the repository feed after a change
const FEED_SETTLE: Duration = Duration::from_millis(200);

#[tokio::main]
async fn main() -> Result<()> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("geoperms-data"));

    init_logging(data_dir.join("logs"))?;

    let repository = Arc::new(JsonFileLocationPermissionsRepository::in_dir(&data_dir)?);
    let settings = Arc::new(JsonSettingsDataStore::in_dir(&data_dir)?);
    let geolocation = Arc::new(InMemoryGeolocationPermissions::new());

    let vm = LocationPermissionsViewModel::new(repository, settings, geolocation);
    let commands = vm.commands();
    let mut view_state = vm.subscribe_view_state();
    let console = Console::new();

    console.print_banner();
    console.print_view_state(&vm.view_state());

    loop {
        let input = console.read_input()?;
        let mut parts = input.split_whitespace();
        let action = parts.next().unwrap_or("");
        let domain = parts.next();

        let pending = match (action, domain) {
            ("exit" | "quit", _) => break,
            ("", _) => continue,
            ("list", _) => None,
            ("on", _) => {
                vm.on_location_permission_toggled(true)?;
                None
            }
            ("off", _) => {
                vm.on_location_permission_toggled(false)?;
                None
            }
            ("allow", Some(domain)) => {
                vm.on_site_location_permission_selected(domain, LocationPermissionType::AllowAlways);
                Some(())
            }
            ("deny", Some(domain)) => {
                vm.on_site_location_permission_selected(domain, LocationPermissionType::DenyAlways);
                Some(())
            }
            ("delete", Some(domain)) => {
                let entity = vm
                    .view_state()
                    .location_permission_entities
                    .into_iter()
                    .find(|e| e.domain == domain);
                match entity {
                    Some(entity) => {
                        vm.on_delete_requested(entity);
                        match commands.try_take() {
                            Some(command) if console.confirm(&command)? => {
                                let Command::ConfirmDeleteLocationPermission(entity) = command;
                                vm.delete(&entity)
                                    .await
                                    .map_err(|e| anyhow!("delete task failed: {}", e))?;
                                Some(())
                            }
                            _ => None,
                        }
                    }
                    None => {
                        console.print_error(&format!("No permission stored for {}", domain));
                        continue;
                    }
                }
            }
            _ => {
                console.print_system("Unknown command");
                continue;
            }
        };

        if pending.is_some() {
            let _ = tokio::time::timeout(FEED_SETTLE, view_state.changed()).await;
        }
        let _ = view_state.borrow_and_update();

        console.print_separator();
        console.print_view_state(&vm.view_state());
    }

    vm.dispose();
    console.print_system("Goodbye!");
    Ok(())
}
