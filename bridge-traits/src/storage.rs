//! Key-value settings storage abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// Opaque string key-value store.
///
/// Backed by AsyncStorage/UserDefaults/SharedPreferences on mobile and by a
/// SQLite table on desktop (`bridge-desktop`). The account service keeps the
/// signed-in user here as a JSON string under the `"user"` key.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_user(store: &dyn SettingsStore, json: &str) -> Result<()> {
///     store.set_string("user", json).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value, replacing any previous value for `key`.
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value; `Ok(None)` when the key is absent.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>>;

    async fn clear_all(&self) -> Result<()>;
}
