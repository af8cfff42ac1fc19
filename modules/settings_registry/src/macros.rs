//! Typed accessor generation

/// Generate typed getter/setter pairs backed by a [`SettingRegistry`] field
///
/// Used inside an `impl` block of a type holding a registry:
///
/// ```
/// use settings_registry::infra::storage::{MemoryBackend, MemoryStoreProvider};
/// use settings_registry::{setting_accessors, AppIdentity, SettingRegistry};
///
/// const KEY_FONT_SIZE: &str = "editor/fontSize";
///
/// struct EditorSettings {
///     registry: SettingRegistry,
/// }
///
/// impl EditorSettings {
///     setting_accessors!(registry {
///         KEY_FONT_SIZE => font_size, set_font_size: u32,
///     });
/// }
///
/// let provider = MemoryStoreProvider::new(MemoryBackend::new(), AppIdentity::new("Acme", "Editor"));
/// let mut registry = SettingRegistry::new(provider);
/// registry.declare_default(KEY_FONT_SIZE, 13).unwrap();
///
/// let mut settings = EditorSettings { registry };
/// settings.set_font_size(15).unwrap();
/// assert_eq!(settings.font_size(), 15);
/// ```
///
/// [`SettingRegistry`]: crate::SettingRegistry
#[macro_export]
macro_rules! setting_accessors {
    ($registry:ident { $( $key:expr => $get:ident, $set:ident : $ty:ty ),* $(,)? }) => {
        $(
            pub fn $get(&self) -> $ty {
                self.$registry.value_as::<$ty>($key)
            }

            pub fn $set(&mut self, value: $ty) -> ::std::result::Result<(), $crate::SettingsError> {
                self.$registry.set_value_from($key, value)
            }
        )*
    };
}
