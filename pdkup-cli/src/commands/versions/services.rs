//! Concrete implementations of the service traits.
//!
//! These wrap the pdkup library entry points, adapting them to the trait
//! interfaces used by handlers.

use std::io::{self, BufRead, Write};
use std::path::Path;

use pdkup::family::Family;
use pdkup::store::{
    disable, enable, install_from_archive, BuildConfig, Builder, ContainerBuilder, FetchProgress,
    HttpReleaseClient, InstalledVersion, Installer, PdkRoot, ReleaseClient, StoreResult,
    VersionDescriptor, VersionStore,
};

use super::traits::{Output, UserInteraction, VersionService};

// ============================================================================
// Console Output Implementation
// ============================================================================

/// Standard console output implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    /// Create a new console output.
    pub fn new() -> Self {
        Self
    }
}

impl Output for ConsoleOutput {
    fn println(&self, message: &str) {
        println!("{}", message);
    }

    fn print(&self, message: &str) {
        print!("{}", message);
        io::stdout().flush().ok();
    }
}

// ============================================================================
// Console User Interaction Implementation
// ============================================================================

/// Standard console user interaction implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleInteraction;

impl ConsoleInteraction {
    /// Create a new console interaction.
    pub fn new() -> Self {
        Self
    }
}

impl UserInteraction for ConsoleInteraction {
    fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N]: ", message);
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }

        let input = input.trim().to_lowercase();
        input == "y" || input == "yes"
    }
}

// ============================================================================
// Default Version Service Implementation
// ============================================================================

/// Default implementation of the version service.
///
/// This wraps the actual pdkup store, installer, and builder.
#[derive(Default)]
pub struct DefaultVersionService {
    client: HttpReleaseClient,
}

impl DefaultVersionService {
    /// Create a new default version service.
    pub fn new() -> Self {
        Self {
            client: HttpReleaseClient::new(),
        }
    }
}

impl VersionService for DefaultVersionService {
    fn create_store(&self, pdk_root: &Path) -> VersionStore {
        VersionStore::new(PdkRoot::at(pdk_root))
    }

    fn list_remote(&self, family: &Family) -> StoreResult<Vec<VersionDescriptor>> {
        self.client.list(family)
    }

    fn install(
        &self,
        store: &VersionStore,
        family: &Family,
        token: &str,
        expected_digest: Option<&str>,
        on_progress: Option<FetchProgress>,
    ) -> StoreResult<()> {
        Installer::new(&self.client, store)
            .ensure_present(family, token, expected_digest, on_progress)
            .map(|_| ())
    }

    fn install_and_activate(
        &self,
        store: &VersionStore,
        family: &Family,
        token: &str,
        expected_digest: Option<&str>,
        on_progress: Option<FetchProgress>,
    ) -> StoreResult<()> {
        Installer::new(&self.client, store)
            .ensure_active(family, token, expected_digest, on_progress)
            .map(|_| ())
    }

    fn activate(&self, store: &VersionStore, family: &Family, token: &str) -> StoreResult<()> {
        enable(store, family, token)
    }

    fn deactivate(&self, store: &VersionStore, family: &Family) -> StoreResult<()> {
        disable(store, family)
    }

    fn remove(&self, store: &VersionStore, family: &Family, token: &str) -> StoreResult<()> {
        store.remove(family, token)
    }

    fn list_installed(
        &self,
        store: &VersionStore,
        family: &Family,
    ) -> StoreResult<Vec<InstalledVersion>> {
        store.list_installed(family)
    }

    fn build_and_install(
        &self,
        store: &VersionStore,
        family: &Family,
        token: &str,
        config: BuildConfig,
    ) -> StoreResult<()> {
        let archive = ContainerBuilder::new(config).build(family, token)?;
        install_from_archive(store, family, token, &archive).map(|_| ())
    }
}
