//! Precedence tiers.

use envetcd_types::Config;
use std::fmt;

/// The four tiers, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierName {
    /// `{prefix}/global`
    Global,
    /// `{prefix}/system/{system}`
    System,
    /// `{prefix}/service/{service}`
    Service,
    /// `{prefix}/host/{hostname}`
    Host,
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierName::Global => write!(f, "global"),
            TierName::System => write!(f, "system"),
            TierName::Service => write!(f, "service"),
            TierName::Host => write!(f, "host"),
        }
    }
}

/// One tier directory to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    /// Which tier this is
    pub name: TierName,
    /// Absolute directory in the store
    pub directory: String,
    /// Whether the configuration selects this tier
    pub enabled: bool,
}

impl Tier {
    fn new(name: TierName, directory: String, enabled: bool) -> Self {
        Self {
            name,
            directory,
            enabled,
        }
    }

    /// Expand the tier templates against `config`, in precedence order.
    pub fn plan(config: &Config) -> [Tier; 4] {
        let root = config.prefix.trim_end_matches('/');
        [
            Tier::new(TierName::Global, format!("{}/global", root), true),
            Tier::new(
                TierName::System,
                format!("{}/system/{}", root, config.system),
                !config.system.is_empty(),
            ),
            Tier::new(
                TierName::Service,
                format!("{}/service/{}", root, config.service),
                !config.service.is_empty(),
            ),
            Tier::new(
                TierName::Host,
                format!("{}/host/{}", root, config.hostname),
                !config.hostname.is_empty(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_directories() {
        let config = Config {
            system: "s1".to_string(),
            service: "s1-svc".to_string(),
            hostname: "h1".to_string(),
            ..Default::default()
        };

        let dirs: Vec<_> = Tier::plan(&config)
            .into_iter()
            .map(|t| (t.name, t.directory, t.enabled))
            .collect();
        assert_eq!(
            dirs,
            vec![
                (TierName::Global, "/config/global".to_string(), true),
                (TierName::System, "/config/system/s1".to_string(), true),
                (TierName::Service, "/config/service/s1-svc".to_string(), true),
                (TierName::Host, "/config/host/h1".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_plan_disables_empty_selectors() {
        let enabled: Vec<_> = Tier::plan(&Config::default())
            .iter()
            .map(|t| t.enabled)
            .collect();
        assert_eq!(enabled, vec![true, false, false, false]);
    }

    #[test]
    fn test_plan_root_prefix() {
        let config = Config {
            prefix: "/".to_string(),
            ..Default::default()
        };
        assert_eq!(Tier::plan(&config)[0].directory, "/global");
    }
}
