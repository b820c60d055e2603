use reqwest::Url;
use serde::Deserialize;
use smallvec::{smallvec, SmallVec};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Placeholder substituted with the queried IP in a source URL template.
pub const IP_PLACEHOLDER: &str = "{ip}";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SourceConfigError {
    #[error("no sources are specified")]
    NoSources,
    #[error("source name must not be empty")]
    EmptyName,
    #[error(r#"source "{0}" is specified more than once"#)]
    DuplicateName(String),
    #[error(r#"URL template of source "{name}" must contain exactly one "{{ip}}" placeholder, found {found}"#)]
    Placeholder { name: String, found: usize },
    #[error(r#"URL template of source "{name}" is not a valid http(s) URL: "{template}""#)]
    InvalidUrl { name: String, template: String },
}

/// Shape of the JSON document a source answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SchemaKind {
    /// ip-api.com style: `status`, `query`, `regionName`, `lat`/`lon`, network flags
    #[serde(alias = "a", alias = "ip-api", alias = "ipapi.com")]
    A,
    /// ipapi.co style: `error`, `ip`, `country_name`, `latitude`/`longitude`, no network flags
    #[serde(alias = "b", alias = "ipapi", alias = "ipapi.co")]
    B,
}

/// Fallback tier, primary sources are always tried before backup ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Tier {
    #[serde(alias = "primary")]
    Primary,
    #[serde(alias = "backup")]
    Backup,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SourceSpecConfig")]
pub struct SourceSpec {
    pub name: String,
    pub url_template: String,
    pub schema: SchemaKind,
    pub tier: Tier,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceSpecConfig {
    name: String,
    #[serde(alias = "url")]
    url_template: String,
    schema: SchemaKind,
    #[serde(default = "SourceSpecConfig::default_tier")]
    tier: Tier,
}

impl SourceSpecConfig {
    fn default_tier() -> Tier {
        Tier::Primary
    }
}

impl TryFrom<SourceSpecConfig> for SourceSpec {
    type Error = SourceConfigError;

    fn try_from(value: SourceSpecConfig) -> Result<Self, Self::Error> {
        let SourceSpecConfig {
            name,
            url_template,
            schema,
            tier,
        } = value;
        Self::new(name, url_template, schema, tier)
    }
}

impl SourceSpec {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        schema: SchemaKind,
        tier: Tier,
    ) -> Result<Self, SourceConfigError> {
        let name: String = name.into();
        let name = name.trim().to_owned();
        let url_template: String = url_template.into();
        if name.is_empty() {
            return Err(SourceConfigError::EmptyName);
        }
        let found = url_template.matches(IP_PLACEHOLDER).count();
        if found != 1 {
            return Err(SourceConfigError::Placeholder { name, found });
        }
        let spec = Self {
            name,
            url_template,
            schema,
            tier,
        };
        match Url::parse(&spec.url("8.8.8.8")) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(spec),
            _ => Err(SourceConfigError::InvalidUrl {
                name: spec.name,
                template: spec.url_template,
            }),
        }
    }

    /// Request URL for `ip`, which is substituted verbatim and may be empty.
    pub fn url(&self, ip: &str) -> String {
        self.url_template.replacen(IP_PLACEHOLDER, ip, 1)
    }
}

/// Ordered, immutable list of sources, cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<SourceSpec>")]
pub struct SourceRegistry(Arc<SmallVec<[SourceSpec; 2]>>);

impl TryFrom<Vec<SourceSpec>> for SourceRegistry {
    type Error = SourceConfigError;

    fn try_from(mut sources: Vec<SourceSpec>) -> Result<Self, Self::Error> {
        if sources.is_empty() {
            return Err(SourceConfigError::NoSources);
        }
        let mut names = HashSet::with_capacity(sources.len());
        for source in &sources {
            if !names.insert(source.name.as_str()) {
                return Err(SourceConfigError::DuplicateName(source.name.clone()));
            }
        }
        // Stable: keeps the configured order inside a tier
        sources.sort_by_key(|source| source.tier);
        Ok(Self(Arc::new(sources.into_iter().collect())))
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self(Arc::new(smallvec![
            SourceSpec {
                name: "ip-api.com".into(),
                url_template: "http://ip-api.com/json/{ip}?fields=66846719".into(),
                schema: SchemaKind::A,
                tier: Tier::Primary,
            },
            SourceSpec {
                name: "ipapi.co".into(),
                url_template: "https://ipapi.co/{ip}/json/".into(),
                schema: SchemaKind::B,
                tier: Tier::Backup,
            },
        ]))
    }
}

impl SourceRegistry {
    pub fn iter(&self) -> std::slice::Iter<'_, SourceSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a SourceRegistry {
    type Item = &'a SourceSpec;
    type IntoIter = std::slice::Iter<'a, SourceSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
