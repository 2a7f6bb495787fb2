// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::path::Path;
use serde::{Serialize, Deserialize};
use figment::{Figment, Error, providers::{Format, Json, Toml, Yaml, Env, Serialized}};

use crate::constant::ENV_PREFIX;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
#[derive(Default)]
pub struct AppConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
}


#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[allow(unused)]
pub struct ControllerConfig {
    /// Whether fields populated by the remote cluster (present only on the live
    /// object) are ignored when deciding to resync
    #[serde(default)]
    pub ignore_additions: bool,
    /// Requeue delay after a reconcile failure
    #[serde(default)]
    pub requeue_secs: u64,
    /// Requeue delay after a deletion was blocked by a live subscription
    #[serde(default)]
    pub blocked_requeue_secs: u64,
    /// Upper bound for the initial subscription cache sync
    #[serde(default)]
    pub cache_sync_timeout_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            ignore_additions: true,
            requeue_secs: 30,
            blocked_requeue_secs: 10,
            cache_sync_timeout_secs: 30,
        }
    }
}

pub struct AppConfigBuilder {
    figment: Figment,
}

impl AppConfigBuilder {
    pub fn with_file(&mut self, path: &str) -> &mut Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        self.figment = match extension {
            "json" => self.figment.clone().merge(Json::file(path)),
            "yaml" | "yml" => self.figment.clone().merge(Yaml::file(path)),
            "toml" => self.figment.clone().merge(Toml::file(path)),
            _ => self.figment.clone(),
        };
        self
    }

    pub fn with_env(&mut self) -> &mut Self {
        self.figment = self.figment.clone().merge(Env::prefixed(&format!("{}__", ENV_PREFIX)).split("__"));
        self
    }

    pub fn with_override_option<T: Serialize>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.figment = self.figment.clone().merge(Serialized::default(key, value));
        }
        self
    }

    pub fn build(&self) -> Result<AppConfig, Error> {
        self.figment.extract()
    }
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        AppConfigBuilder {
            figment: Figment::from(Serialized::defaults(AppConfig::default()))
        }
    }
}
