//! Common test utilities shared by the integration tests

#![allow(dead_code)]

use settings_registry::infra::storage::{MemoryBackend, MemoryStoreProvider};
use settings_registry::{AppIdentity, Scope, SettingRegistry, StoreLocation};

pub const ORGANIZATION: &str = "Kitware";
pub const APPLICATION: &str = "Viewer";

pub fn identity() -> AppIdentity {
    AppIdentity::new(ORGANIZATION, APPLICATION)
}

/// Fresh in-memory provider with its own backend
pub fn memory_provider() -> MemoryStoreProvider {
    MemoryStoreProvider::new(MemoryBackend::new(), identity())
}

/// Registry over `provider`'s backend; the provider stays usable for inspection
pub fn registry_over(provider: &MemoryStoreProvider) -> SettingRegistry {
    SettingRegistry::new(provider.clone())
}

pub fn location(scope: Scope) -> StoreLocation {
    StoreLocation::resolve(scope, &identity())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}
