//! Settings file (ts-settings.json) data structures
//!
//! Every reference is resolved at load time: a schedule naming a package
//! version or template that does not exist aborts the run before any target
//! is touched.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::domain::{Credential, Package, Target, Template, WorkItem};
use crate::error::{FleetError, Result, config};

/// Settings file looked up when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "./ts-settings.json";

/// Root of the settings file.
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(alias = "Schedules")]
    pub schedules: Vec<ScheduleConfig>,

    /// Package records keyed by version
    #[serde(alias = "Packages", default)]
    pub packages: HashMap<String, Package>,

    /// Declarations keyed by template name, kept as written
    #[serde(alias = "Templates", default)]
    pub templates: HashMap<String, Box<RawValue>>,
}

/// A group of targets sharing credential, package version and template.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(alias = "Targets", default)]
    pub targets: Vec<String>,

    /// `user:password`
    #[serde(alias = "Credential", default)]
    pub credential: String,

    /// Template key; empty means no declaration is deployed
    #[serde(alias = "Template", default)]
    pub template: String,

    /// Package key
    #[serde(alias = "Version", default)]
    pub version: String,
}

impl Settings {
    /// Read and parse the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let shown = path.display().to_string();
        if !path.is_file() {
            return Err(config::not_found(shown));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| config::read_failed(&shown, e.to_string()))?;
        let settings = Self::from_json(&content).map_err(|e| match e {
            FleetError::ConfigParseFailed { reason, .. } => config::parse_failed(&shown, reason),
            other => other,
        })?;

        tracing::debug!(
            path = %shown,
            schedules = settings.schedules.len(),
            packages = settings.packages.len(),
            templates = settings.templates.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve every schedule into one work item per listed target address.
    ///
    /// Addresses are taken as listed: an address appearing twice yields two
    /// items. Items from the same schedule share the package record and the
    /// template bytes.
    pub fn expand(&self) -> Result<Vec<WorkItem>> {
        let mut items = Vec::new();

        for (index, schedule) in self.schedules.iter().enumerate() {
            if schedule.credential.is_empty() {
                return Err(config::invalid(format!(
                    "schedule {index} has an empty credential"
                )));
            }

            let package = self.package(index, &schedule.version)?;
            let template = self.template(index, &schedule.template)?;
            let credential = Credential::basic(&schedule.credential);

            items.extend(schedule.targets.iter().map(|address| {
                WorkItem::new(
                    Target::new(address.as_str(), credential.clone()),
                    Arc::clone(&package),
                    template.clone(),
                )
            }));
        }

        Ok(items)
    }

    fn package(&self, schedule: usize, version: &str) -> Result<Arc<Package>> {
        let record = self
            .packages
            .get(version)
            .ok_or_else(|| FleetError::PackageNotFound {
                schedule,
                version: version.to_string(),
            })?;

        Ok(Arc::new(Package {
            version: version.to_string(),
            ..record.clone()
        }))
    }

    fn template(&self, schedule: usize, name: &str) -> Result<Option<Template>> {
        if name.is_empty() {
            return Ok(None);
        }
        let raw = self
            .templates
            .get(name)
            .ok_or_else(|| FleetError::TemplateNotFound {
                schedule,
                name: name.to_string(),
            })?;
        Ok(Some(Template::new(raw.get().as_bytes())))
    }
}
