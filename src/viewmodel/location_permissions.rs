//! View-model for the location permissions settings screen
//!
//! Mirrors the repository's grant list and the app-wide toggle into a single
//! [`ViewState`], and forwards user intents to the repository, the settings
//! store and the platform geolocation store.

use futures::Stream;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::live_event::SingleLiveEvent;
use super::state::{Command, ViewState};
use crate::core::GeopermsResult;
use crate::geolocation::GeolocationPermissions;
use crate::permissions::{
    LocationPermissionEntity, LocationPermissionType, LocationPermissionsRepository,
    PermissionsFeed,
};
use crate::settings::SettingsDataStore;

/// Receives the choice made in the per-site permission dialog
pub trait SiteLocationPermissionListener {
    fn on_site_location_permission_selected(&self, domain: &str, permission: LocationPermissionType);
}

/// Live link between the upstream feed and the view state
struct FeedSubscription {
    cancel: CancellationToken,
    /// Cleared under lock on release so a racing forward cannot publish afterwards
    attached: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl FeedSubscription {
    fn spawn(
        runtime: &Handle,
        mut feed: PermissionsFeed,
        view_state: Arc<watch::Sender<ViewState>>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let attached = Arc::new(Mutex::new(true));

        let task = {
            let cancel = cancel.clone();
            let attached = Arc::clone(&attached);
            runtime.spawn(async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        changed = feed.changed() => {
                            if changed.is_err() {
                                tracing::debug!("Location permissions feed closed");
                                break;
                            }
                            let entities = feed.borrow_and_update().clone();
                            let attached = attached.lock().unwrap_or_else(PoisonError::into_inner);
                            if !*attached {
                                break;
                            }
                            tracing::debug!("Location permissions changed: {} entries", entities.len());
                            view_state.send_modify(|state| {
                                state.location_permission_entities = entities;
                            });
                        }
                    }
                }
            })
        };

        Self {
            cancel,
            attached,
            task,
        }
    }

    fn release(self) {
        *self.attached.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.cancel.cancel();
        drop(self.task);
    }
}

/// Coordinates the location permissions screen
pub struct LocationPermissionsViewModel {
    repository: Arc<dyn LocationPermissionsRepository>,
    settings: Arc<dyn SettingsDataStore>,
    geolocation: Arc<dyn GeolocationPermissions>,
    /// Runtime used for repository and platform work
    background: Handle,
    view_state: Arc<watch::Sender<ViewState>>,
    command: Arc<SingleLiveEvent<Command>>,
    subscription: Mutex<Option<FeedSubscription>>,
}

impl LocationPermissionsViewModel {
    /// Create the view-model and subscribe to the repository
    ///
    /// Must be called from within a tokio runtime; the feed subscription and
    /// background work run on that same runtime.
    pub fn new(
        repository: Arc<dyn LocationPermissionsRepository>,
        settings: Arc<dyn SettingsDataStore>,
        geolocation: Arc<dyn GeolocationPermissions>,
    ) -> Self {
        Self::with_background(repository, settings, geolocation, Handle::current())
    }

    /// Create the view-model on a dedicated runtime
    ///
    /// The feed subscription and all background work run on `background`, so
    /// this may be called from a thread outside any runtime.
    pub fn with_background(
        repository: Arc<dyn LocationPermissionsRepository>,
        settings: Arc<dyn SettingsDataStore>,
        geolocation: Arc<dyn GeolocationPermissions>,
        background: Handle,
    ) -> Self {
        let mut feed = repository.location_permissions_feed();
        let initial = ViewState {
            location_permission_enabled: settings.app_location_permission(),
            location_permission_entities: feed.borrow_and_update().clone(),
        };
        tracing::info!(
            "Location permissions view-model created (enabled: {}, entries: {})",
            initial.location_permission_enabled,
            initial.location_permission_entities.len()
        );

        let (tx, _rx) = watch::channel(initial);
        let view_state = Arc::new(tx);
        let subscription = FeedSubscription::spawn(&background, feed, Arc::clone(&view_state));

        Self {
            repository,
            settings,
            geolocation,
            background,
            view_state,
            command: Arc::new(SingleLiveEvent::new()),
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Current snapshot
    pub fn view_state(&self) -> ViewState {
        self.view_state.borrow().clone()
    }

    /// Receiver holding the latest snapshot and notified on every change
    pub fn subscribe_view_state(&self) -> watch::Receiver<ViewState> {
        self.view_state.subscribe()
    }

    /// Stream yielding the current snapshot, then every later one
    ///
    /// Ends once the view-model is dropped.
    pub fn view_state_stream(&self) -> impl Stream<Item = ViewState> + Send + 'static {
        let mut rx = self.view_state.subscribe();
        async_stream::stream! {
            loop {
                let state = rx.borrow_and_update().clone();
                yield state;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// One-shot commands for the UI
    pub fn commands(&self) -> Arc<SingleLiveEvent<Command>> {
        Arc::clone(&self.command)
    }

    /// Stop mirroring the repository feed
    ///
    /// Safe to call more than once; only the first call has an effect.
    /// Background work already started keeps running.
    pub fn dispose(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.release();
            tracing::info!("Location permissions view-model disposed");
        }
    }

    /// Whether the feed subscription is still live
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Ask the UI to confirm removal of `entity`
    pub fn on_delete_requested(&self, entity: LocationPermissionEntity) {
        tracing::debug!("Delete requested for {}", entity.domain);
        self.command
            .emit(Command::ConfirmDeleteLocationPermission(entity));
    }

    /// Remove the grant from the repository, then from the platform store
    ///
    /// The view state updates once the repository feed reports the removal.
    /// A failed repository removal skips the platform clear; neither step is
    /// rolled back.
    pub fn delete(&self, entity: &LocationPermissionEntity) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let geolocation = Arc::clone(&self.geolocation);
        let domain = entity.domain.clone();

        self.background.spawn(async move {
            if let Err(e) = repository.remove_location_permission(&domain).await {
                tracing::error!("Failed to remove location permission for {}: {}", domain, e);
                return;
            }
            if let Err(e) = geolocation.clear(&domain).await {
                tracing::error!(
                    "Removed location permission for {} but failed to clear the platform grant: {}",
                    domain,
                    e
                );
                return;
            }
            tracing::info!("Deleted location permission for {}", domain);
        })
    }

    /// Persist the app-wide toggle and reflect it in the view state
    ///
    /// The view state is left untouched if the settings store rejects the write.
    pub fn on_location_permission_toggled(&self, enabled: bool) -> GeopermsResult<()> {
        self.settings.set_app_location_permission(enabled)?;
        self.view_state.send_modify(|state| {
            state.location_permission_enabled = enabled;
        });
        tracing::info!("App location permission set to {}", enabled);
        Ok(())
    }

    /// Store the decision for a site
    ///
    /// The view state updates once the repository feed reports the new list.
    pub fn set_site_permission(
        &self,
        domain: &str,
        permission: LocationPermissionType,
    ) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let domain = domain.to_string();

        self.background.spawn(async move {
            if let Err(e) = repository.save_location_permission(&domain, permission).await {
                tracing::error!("Failed to save location permission for {}: {}", domain, e);
            }
        })
    }
}

impl SiteLocationPermissionListener for LocationPermissionsViewModel {
    fn on_site_location_permission_selected(&self, domain: &str, permission: LocationPermissionType) {
        let _ = self.set_site_permission(domain, permission);
    }
}

impl Drop for LocationPermissionsViewModel {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::InMemoryGeolocationPermissions;
    use crate::permissions::InMemoryLocationPermissionsRepository;
    use crate::settings::InMemorySettingsDataStore;

    fn view_model(enabled: bool) -> (Arc<InMemoryLocationPermissionsRepository>, LocationPermissionsViewModel) {
        let repository = Arc::new(InMemoryLocationPermissionsRepository::new());
        let vm = LocationPermissionsViewModel::new(
            repository.clone(),
            Arc::new(InMemorySettingsDataStore::new(enabled)),
            Arc::new(InMemoryGeolocationPermissions::new()),
        );
        (repository, vm)
    }

    #[tokio::test]
    async fn test_initial_state_uses_settings() {
        let (_repository, vm) = view_model(true);

        let state = vm.view_state();
        assert!(state.location_permission_enabled);
        assert!(state.location_permission_entities.is_empty());
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let (_repository, vm) = view_model(false);
        assert!(vm.is_subscribed());

        vm.dispose();
        vm.dispose();
        assert!(!vm.is_subscribed());
    }

    #[tokio::test]
    async fn test_site_permission_reaches_view_state() {
        let (_repository, vm) = view_model(false);
        let mut rx = vm.subscribe_view_state();

        vm.on_site_location_permission_selected("example.com", LocationPermissionType::AllowAlways);

        let state = rx
            .wait_for(|s| !s.location_permission_entities.is_empty())
            .await
            .unwrap()
            .clone();
        assert_eq!(
            state.location_permission_entities,
            vec![LocationPermissionEntity::new("example.com", LocationPermissionType::AllowAlways)]
        );
    }
}
