//! Environment variable overrides for Settings.
//!
//! Kept in its own test binary: it mutates the process environment.

use staticfs_gen::config::Settings;
use staticfs_gen::domain::EntryOrder;

#[test]
fn given_staticfs_env_vars_when_load_then_override_file_layers() {
    std::env::set_var("STATICFS_EMIT__ROOT_SYMBOL", "env_root");
    std::env::set_var("STATICFS_EMIT__ORDER", "sorted");
    std::env::set_var("STATICFS_EMIT__INCLUDES", "vfs.h,shell.h");

    let settings = Settings::load_layers(None, None);

    std::env::remove_var("STATICFS_EMIT__ROOT_SYMBOL");
    std::env::remove_var("STATICFS_EMIT__ORDER");
    std::env::remove_var("STATICFS_EMIT__INCLUDES");

    let settings = settings.expect("load settings");
    assert_eq!(settings.emit.root_symbol, "env_root");
    assert_eq!(settings.emit.order, EntryOrder::Sorted);
    assert_eq!(
        settings.emit.includes,
        vec!["vfs.h".to_string(), "shell.h".to_string()]
    );
}
