use std::path::Path;

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
///
/// Falls back to the input unchanged when a variable is undefined.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// `-` names standard input/output rather than a file.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tilde_when_expanding_then_uses_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        assert_eq!(expand_env_vars("~/gen.toml"), format!("{home}/gen.toml"));
    }

    #[test]
    fn given_undefined_variable_when_expanding_then_returns_input() {
        assert_eq!(
            expand_env_vars("$STATICFS_SURELY_UNDEFINED/x"),
            "$STATICFS_SURELY_UNDEFINED/x"
        );
    }

    #[test]
    fn given_dash_when_checking_stdio_then_true() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("out.c")));
    }
}
