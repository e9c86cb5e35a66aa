//! Findings: unverified pointers to offers discovered in a project.

use std::path::PathBuf;

use lzero_core::{BrokerUrl, OfferId, PublicLicenseFamily};
use serde::Serialize;

/// Package metadata a strategy could learn about the artifact, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageMeta {
    /// Split an npm-style `@scope/name` into scope and name.
    pub fn npm(full_name: Option<&str>, version: Option<&str>) -> Self {
        let (scope, name) = match full_name {
            Some(full) => match full.strip_prefix('@').and_then(|s| s.split_once('/')) {
                Some((scope, name)) => (Some(scope.to_string()), Some(name.to_string())),
                None => (None, Some(full.to_string())),
            },
            None => (None, None),
        };
        Self {
            scope,
            name,
            version: version.map(str::to_string),
        }
    }
}

/// One `licensezero.json` offer entry found in the project.
///
/// Ephemeral: produced per run and never persisted. Identity is
/// [`Finding::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Strategy that reported the finding (`npm`, `cargo`, ...).
    pub ecosystem: &'static str,
    /// Directory holding the `licensezero.json`.
    pub path: PathBuf,
    #[serde(flatten)]
    pub package: PackageMeta,
    pub broker: BrokerUrl,
    #[serde(rename = "offerID")]
    pub offer_id: OfferId,
    /// Public license identifier declared by the artifact.
    pub public: String,
}

impl Finding {
    pub fn key(&self) -> (BrokerUrl, OfferId) {
        (self.broker.clone(), self.offer_id)
    }

    pub fn public_family(&self) -> PublicLicenseFamily {
        PublicLicenseFamily::classify(&self.public)
    }

    /// Human-readable label: `@scope/name@version`, falling back to the
    /// directory.
    pub fn label(&self) -> String {
        match (&self.package.scope, &self.package.name, &self.package.version) {
            (scope, Some(name), version) => {
                let mut label = match scope {
                    Some(scope) => format!("@{scope}/{name}"),
                    None => name.clone(),
                };
                if let Some(version) = version {
                    label.push('@');
                    label.push_str(version);
                }
                label
            }
            _ => self.path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npm_scoped_names_split() {
        let meta = PackageMeta::npm(Some("@licensezero/demo"), Some("1.2.3"));
        assert_eq!(meta.scope.as_deref(), Some("licensezero"));
        assert_eq!(meta.name.as_deref(), Some("demo"));

        let plain = PackageMeta::npm(Some("left-pad"), None);
        assert_eq!(plain.scope, None);
        assert_eq!(plain.name.as_deref(), Some("left-pad"));
    }

    #[test]
    fn label_prefers_package_name() {
        let finding = Finding {
            ecosystem: "npm",
            path: PathBuf::from("/work/node_modules/@licensezero/demo"),
            package: PackageMeta::npm(Some("@licensezero/demo"), Some("1.2.3")),
            broker: BrokerUrl::parse("https://broker.example").unwrap(),
            offer_id: OfferId::parse("186d34a9-c8f7-414c-91bc-a34b4553b91d").unwrap(),
            public: "Parity-7.0.0".into(),
        };
        assert_eq!(finding.label(), "@licensezero/demo@1.2.3");

        let bare = Finding {
            package: PackageMeta::default(),
            ..finding
        };
        assert_eq!(bare.label(), "/work/node_modules/@licensezero/demo");
    }
}
