/// Environment variable names read when building a
/// [`ShipperConfig`](crate::config::ShipperConfig) from the process
/// environment.
///
/// These are purely helpers; the shipper itself never touches the
/// environment after construction.

/// Deployment tag stamped on every entry; `debug` entries are only
/// emitted when it equals `development`.
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";

/// Externally reachable address of this server.
pub const SERVER_IP_ENV: &str = "SERVER_IP";

/// Host name reported in entries.
pub const HOSTNAME_ENV: &str = "HOSTNAME";

/// Files consulted, in order, when `$HOSTNAME` is not exported.
/// `/proc/sys/kernel/hostname` holds the same value `gethostname(2)`
/// returns on Linux, including containers without `/etc/hostname`.
const HOSTNAME_FILES: &[&str] = &["/proc/sys/kernel/hostname", "/etc/hostname"];

/// Resolve the machine host name: `$HOSTNAME`, then the files in
/// [`HOSTNAME_FILES`], then `"unknown"`.
///
/// Interactive shells usually set `HOSTNAME` without exporting it, and
/// neither file exists on macOS, so outside Linux the result is often
/// `"unknown"`. Set the name explicitly with
/// [`ShipperConfig::with_hostname`](crate::config::ShipperConfig::with_hostname)
/// where that matters.
pub fn hostname() -> String {
    resolve_hostname(std::env::var(HOSTNAME_ENV).ok(), HOSTNAME_FILES)
}

fn resolve_hostname(from_env: Option<String>, files: &[&str]) -> String {
    from_env
        .into_iter()
        .chain(files.iter().filter_map(|path| std::fs::read_to_string(path).ok()))
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_never_empty() {
        assert!(!hostname().is_empty());
    }

    #[test]
    fn exported_hostname_wins() {
        assert_eq!(resolve_hostname(Some(" web-3\n".into()), HOSTNAME_FILES), "web-3");
    }

    #[test]
    fn blank_variable_falls_through_to_files() {
        let path = std::env::temp_dir().join(format!("log-shipper-hostname-{}", std::process::id()));
        std::fs::write(&path, "db-1\n").unwrap();
        let path = path.to_str().unwrap().to_string();

        assert_eq!(resolve_hostname(Some("  ".into()), &["/nonexistent/hostname", path.as_str()]), "db-1");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn nothing_resolvable_is_unknown() {
        assert_eq!(resolve_hostname(None, &["/nonexistent/hostname"]), "unknown");
    }
}
