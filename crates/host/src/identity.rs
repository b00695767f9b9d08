use sysinfo::System;
use vigil_core::HostIdentity;

const UNKNOWN: &str = "unknown";

/// Environment variables consulted for the user name, in order.
const USER_VARS: [&str; 2] = ["USER", "USERNAME"];

/// Who and what this machine is: the hostname and the current user.
///
/// Either field falls back to `"unknown"`.
pub fn current_identity() -> HostIdentity {
    resolve_identity(System::host_name(), |var| std::env::var(var).ok())
}

fn resolve_identity(
    hostname: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> HostIdentity {
    let present = |value: &String| !value.trim().is_empty();
    HostIdentity {
        hostname: hostname
            .filter(present)
            .unwrap_or_else(|| UNKNOWN.to_owned()),
        username: USER_VARS
            .iter()
            .find_map(|var| env(var).filter(present))
            .unwrap_or_else(|| UNKNOWN.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_hostname_and_user() {
        let identity = resolve_identity(Some("desk-01".into()), |var| {
            (var == "USER").then(|| "alice".to_owned())
        });
        assert_eq!(identity.hostname, "desk-01");
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn falls_back_to_username_variable() {
        let identity = resolve_identity(None, |var| {
            (var == "USERNAME").then(|| "bob".to_owned())
        });
        assert_eq!(identity.hostname, UNKNOWN);
        assert_eq!(identity.username, "bob");
    }

    #[test]
    fn blank_values_are_unknown() {
        let identity = resolve_identity(Some("  ".into()), |_| Some(String::new()));
        assert_eq!(identity, HostIdentity::default());
    }

    #[test]
    fn current_identity_is_never_empty() {
        let identity = current_identity();
        assert!(!identity.hostname.is_empty());
        assert!(!identity.username.is_empty());
    }
}
