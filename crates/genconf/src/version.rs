//! What this build is and which documents it can validate

use genconf_core::schema::Keyword;
use genconf_core::types::{
    ConditionKind, EventPluginConfig, InputPluginConfig, OutputPluginConfig, SchemaKind,
};
use genconf_core::SchemaRegistry;
use serde::Serialize;
use std::fmt;

type Names = &'static [&'static str];

/// Build stamp plus the schema and plugin listings shown by `genconf version`
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<&'static str>,
    /// Document kinds accepted by `--schema`
    pub schemas: Names,
    /// Embedded schema files, by stem
    pub schema_files: Vec<&'static str>,
    pub input_plugins: Names,
    pub event_plugins: Names,
    pub output_plugins: Names,
    pub conditions: Names,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GENCONF_COMMIT"),
            build_date: option_env!("GENCONF_BUILD_DATE"),
            profile: option_env!("GENCONF_PROFILE"),
            schemas: SchemaKind::NAMES,
            schema_files: SchemaRegistry::global().families(),
            input_plugins: InputPluginConfig::NAMES,
            event_plugins: EventPluginConfig::NAMES,
            output_plugins: OutputPluginConfig::NAMES,
            conditions: ConditionKind::NAMES,
        }
    }

    /// Labelled listings printed under the banner
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(date) = self.build_date {
            rows.push(("Build date", date.to_string()));
        }
        rows.push(("Schemas", self.schemas.join(", ")));
        rows.push(("Schema files", self.schema_files.join(", ")));
        rows.push(("Input plugins", self.input_plugins.join(", ")));
        rows.push(("Event plugins", self.event_plugins.join(", ")));
        rows.push(("Output plugins", self.output_plugins.join(", ")));
        rows.push(("Conditions", self.conditions.len().to_string()));
        rows
    }
}

/// `genconf 0.3.0 (1a2b3c4, debug)`
impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "genconf {}", self.version)?;
        let stamp: Vec<&str> = self.commit.into_iter().chain(self.profile).collect();
        if !stamp.is_empty() {
            write!(f, " ({})", stamp.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_version_is_semver() {
        let info = VersionInfo::current();
        assert!(
            semver::Version::parse(info.version).is_ok(),
            "got: {}",
            info.version
        );
    }

    #[test]
    fn test_banner_includes_stamp() {
        let info = VersionInfo {
            version: "1.2.3",
            commit: Some("abc1234"),
            profile: Some("release"),
            ..VersionInfo::current()
        };
        assert_eq!(info.to_string(), "genconf 1.2.3 (abc1234, release)");

        let bare = VersionInfo {
            commit: None,
            profile: None,
            ..info
        };
        assert_eq!(bare.to_string(), "genconf 1.2.3");
    }

    #[test]
    fn test_listings_cover_embedded_schemas() {
        let info = VersionInfo::current();
        assert_eq!(
            info.schema_files,
            vec!["condition", "event", "generator", "input", "output"]
        );

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["schemas"][0], "generator");
        assert_eq!(json["event_plugins"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["output_plugins"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["conditions"].as_array().map(Vec::len), Some(20));
    }

    #[test]
    fn test_rows_are_labelled() {
        let info = VersionInfo {
            build_date: None,
            ..VersionInfo::current()
        };
        let labels: Vec<&str> = info.rows().iter().map(|(label, _)| *label).collect();
        assert_eq!(labels[0], "Schemas");
        assert!(labels.contains(&"Schema files"));
    }
}
