use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::instance::Instance;
use crate::instance::JumpHostSet;
use crate::instance::Resource;

/// On-disk layout of an inventory file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct InventoryFile {
    #[serde(default)]
    jump_host: JumpHostSet,

    #[serde(default)]
    resources: Vec<Resource>,
}

/// Instances and jump hosts declared in a TOML inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    instances: Vec<Instance>,
    jump_hosts: JumpHostSet,
}

impl Inventory {
    /// Reads an inventory file.
    ///
    /// # Errors
    ///
    /// - If the file can't be read
    /// - If the contents aren't a valid inventory
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| Error::ReadInventory {
                    path: path.to_owned(),
                    source,
                })?;
        let inventory = Self::from_str(&contents)?;
        debug!(
            path = %path.display(),
            instances = inventory.instances.len(),
            jump_hosts = inventory.jump_hosts.jump_hosts().len(),
            "loaded inventory"
        );
        Ok(inventory)
    }

    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[must_use]
    pub fn jump_hosts(&self) -> &JumpHostSet {
        &self.jump_hosts
    }

    /// Instances matching every term, in declaration order.
    #[must_use]
    pub fn filter<S: AsRef<str>>(&self, terms: &[S]) -> Vec<Instance> {
        self.instances
            .iter()
            .filter(|instance| instance.matches(terms))
            .cloned()
            .collect()
    }
}

impl FromStr for Inventory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let file: InventoryFile = toml::from_str(s)?;
        Ok(Self {
            instances: Resource::flatten(file.resources),
            jump_hosts: file.jump_host,
        })
    }
}
