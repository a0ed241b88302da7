//! Selection policies applied to search results.
//!
//! The registry's search is a substring match, so every name-based lookup
//! narrows the results to exact name matches locally before selecting.

use crate::semver::Version;
use crate::types::{ServerJson, ServerResponse};

/// Keep the entries whose name is exactly `name`, in server order.
pub fn exact_matches(entries: Vec<ServerResponse>, name: &str) -> Vec<ServerResponse> {
    entries
        .into_iter()
        .filter(|entry| entry.server.name == name)
        .collect()
}

/// Pick the highest semantic version among active entries.
///
/// Entries that are not active (including those without registry metadata)
/// and entries whose version does not parse are skipped. On equal versions
/// the first entry in server order wins.
pub fn latest_active(entries: Vec<ServerResponse>) -> Option<ServerJson> {
    let mut best: Option<(Version, ServerJson)> = None;

    for entry in entries {
        if !entry.is_active() {
            tracing::trace!(
                name = %entry.server.name,
                version = %entry.server.version,
                status = ?entry.status(),
                "skipping inactive version"
            );
            continue;
        }
        let version = match Version::parse(&entry.server.version) {
            Ok(version) => version,
            Err(e) => {
                tracing::trace!(
                    name = %entry.server.name,
                    error = %e,
                    "skipping unparsable version"
                );
                continue;
            }
        };
        let newer = best.as_ref().is_none_or(|(current, _)| version > *current);
        if newer {
            best = Some((version, entry.server));
        }
    }

    best.map(|(_, server)| server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RegistryExtensions, ResponseMeta, ServerStatus};

    fn entry(name: &str, version: &str, status: Option<ServerStatus>) -> ServerResponse {
        ServerResponse {
            server: ServerJson {
                name: name.to_string(),
                version: version.to_string(),
                ..Default::default()
            },
            meta: ResponseMeta {
                official: status.map(|status| RegistryExtensions {
                    status,
                    ..Default::default()
                }),
            },
        }
    }

    fn active(name: &str, version: &str) -> ServerResponse {
        entry(name, version, Some(ServerStatus::Active))
    }

    fn versions(entries: &[ServerResponse]) -> Vec<&str> {
        entries.iter().map(|e| e.server.version.as_str()).collect()
    }

    #[test]
    fn test_exact_matches_drops_near_names() {
        let entries = vec![
            active("test-server-alpha", "1.0.0"),
            active("test-server", "2.0.0"),
            active("test-server", "1.5.0"),
            active("test-server-beta", "3.0.0"),
            active("Test-Server", "4.0.0"),
        ];
        let matched = exact_matches(entries, "test-server");
        assert_eq!(versions(&matched), vec!["2.0.0", "1.5.0"]);
    }

    #[test]
    fn test_latest_active_skips_deprecated() {
        let entries = vec![
            active("s", "1.0.0"),
            entry("s", "2.0.0", Some(ServerStatus::Deprecated)),
            active("s", "1.5.0"),
        ];
        assert_eq!(latest_active(entries).unwrap().version, "1.5.0");
    }

    #[test]
    fn test_latest_active_none_when_nothing_active() {
        let entries = vec![
            entry("s", "1.0.0", Some(ServerStatus::Deprecated)),
            entry("s", "2.0.0", Some(ServerStatus::Deleted)),
            entry("s", "3.0.0", None),
            entry("s", "4.0.0", Some(ServerStatus::Other)),
        ];
        assert!(latest_active(entries).is_none());
        assert!(latest_active(Vec::new()).is_none());
    }

    #[test]
    fn test_latest_active_skips_invalid_versions() {
        let entries = vec![
            active("s", "invalid"),
            active("s", "1.0.0"),
            active("s", "not-semver"),
            active("s", "9.9"),
        ];
        assert_eq!(latest_active(entries).unwrap().version, "1.0.0");
    }

    #[test]
    fn test_latest_active_uses_semver_not_lexical_order() {
        let entries = vec![
            active("s", "1.9.0"),
            active("s", "1.10.0"),
            active("s", "1.10.0-rc.1"),
        ];
        assert_eq!(latest_active(entries).unwrap().version, "1.10.0");
    }

    #[test]
    fn test_latest_active_first_wins_on_tie() {
        let mut first = active("s", "2.0.0+build.1");
        first.server.description = "first".to_string();
        let mut second = active("s", "2.0.0+build.2");
        second.server.description = "second".to_string();

        let picked = latest_active(vec![active("s", "1.0.0"), first, second]).unwrap();
        assert_eq!(picked.description, "first");
    }
}
