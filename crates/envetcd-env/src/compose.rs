//! Child environment composition.

use envetcd_types::EnvMap;
use std::ffi::OsString;

/// `NAME=VALUE` pairs handed to the child, applied in order.
pub type EnvList = Vec<(OsString, OsString)>;

/// Combine the inherited environment with the resolved mapping.
///
/// With `clean_env` the inherited environment is dropped. Mapping entries
/// come last, so applying the list in order lets them win over inherited
/// variables of the same name.
pub fn compose<I, K, V>(mapping: &EnvMap, clean_env: bool, parent_env: I) -> EnvList
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut env: EnvList = if clean_env {
        Vec::new()
    } else {
        parent_env
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    };

    env.extend(
        mapping
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v))),
    );
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    /// Collapse the list the way a process environment would: last value wins.
    fn effective(env: &EnvList) -> BTreeMap<OsString, OsString> {
        env.iter().cloned().collect()
    }

    fn mapping() -> EnvMap {
        [("FOO", "from-etcd"), ("ETCD_PEERS", "http://127.0.0.1:4001")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_inherits_parent_and_overrides() {
        let parent = vec![("FOO", "inherited"), ("PATH", "/usr/bin")];
        let env = compose(&mapping(), false, parent);

        assert_eq!(env.len(), 4);
        let effective = effective(&env);
        assert_eq!(effective[&OsString::from("FOO")], OsString::from("from-etcd"));
        assert_eq!(effective[&OsString::from("PATH")], OsString::from("/usr/bin"));
    }

    #[test]
    fn test_clean_env_is_exactly_the_mapping() {
        let parent = vec![("HOME", "/root"), ("PATH", "/usr/bin")];
        let env = compose(&mapping(), true, parent);

        let names: BTreeSet<_> = env.iter().map(|(k, _)| k.clone()).collect();
        let expected: BTreeSet<_> = mapping().keys().map(OsString::from).collect();
        assert_eq!(names, expected);
    }
}
