use std::fmt;

use bon::Builder;
use serde::Deserialize;
use serde::Serialize;

/// A remote compute instance as discovered from the inventory.
///
/// Addressing accessors treat blank strings the same as missing values.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "kebab-case")]
pub struct Instance {
    id: String,

    #[builder(default)]
    #[serde(default)]
    name: String,

    /// Free-form location tag, such as a region or zone.
    #[builder(default)]
    #[serde(default)]
    location: String,

    #[builder(default)]
    #[serde(default)]
    state: String,

    launch_date: Option<String>,

    private_address: Option<String>,

    public_address: Option<String>,

    /// Explicit override preferred over both addresses.
    hostname: Option<String>,
}

/// Accessors
impl Instance {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    #[must_use]
    pub fn launch_date(&self) -> Option<&str> {
        non_blank(self.launch_date.as_deref())
    }

    #[must_use]
    pub fn private_address(&self) -> Option<&str> {
        non_blank(self.private_address.as_deref())
    }

    #[must_use]
    pub fn public_address(&self) -> Option<&str> {
        non_blank(self.public_address.as_deref())
    }

    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        non_blank(self.hostname.as_deref())
    }
}

impl Instance {
    /// True if there is no address of any kind to connect to.
    #[must_use]
    pub fn is_unaddressable(&self) -> bool {
        self.private_address().is_none()
            && self.public_address().is_none()
            && self.hostname().is_none()
    }

    /// Best address for display: hostname override, then public, then private.
    #[must_use]
    pub fn display_address(&self) -> &str {
        self.hostname()
            .or_else(|| self.public_address())
            .or_else(|| self.private_address())
            .unwrap_or_default()
    }

    /// Whether every term is a case-insensitive substring of the id, name or
    /// location.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        let haystacks = [
            self.id.to_lowercase(),
            self.name.to_lowercase(),
            self.location.to_lowercase(),
        ];
        terms.iter().all(|term| {
            let term = term.as_ref().to_lowercase();
            haystacks.iter().any(|hay| hay.contains(&term))
        })
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|x| !x.trim().is_empty())
}

/// Either a single instance or a named group of them, as declared in the
/// inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resource {
    Collection {
        name: String,
        instances: Vec<Instance>,
    },
    Single(Instance),
}

impl Resource {
    /// Flattens resources into instances, keeping declaration order.
    pub fn flatten(resources: impl IntoIterator<Item = Resource>) -> Vec<Instance> {
        resources
            .into_iter()
            .flat_map(|resource| match resource {
                Resource::Single(instance) => vec![instance],
                Resource::Collection { instances, .. } => instances,
            })
            .collect()
    }
}

/// Instances allowed to relay connections, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JumpHostSet {
    #[serde(default)]
    jump_hosts: Vec<Instance>,

    /// Regions that jump host discovery is restricted to.
    #[serde(default)]
    regions: Vec<String>,
}

impl JumpHostSet {
    #[must_use]
    pub fn new(jump_hosts: Vec<Instance>) -> Self {
        Self {
            jump_hosts,
            regions: Vec::new(),
        }
    }

    #[must_use]
    pub fn jump_hosts(&self) -> &[Instance] {
        &self.jump_hosts
    }

    #[must_use]
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jump_hosts.is_empty()
    }
}
