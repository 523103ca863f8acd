//! Registry keys derived from ad content
//!
//! Each ad type has its own derivation rule. Derivation is pure and fails
//! when a required attribute is missing, which is normal for partial query
//! ads and for malformed updates.
//!
//! ## Addresses
//!
//! Contact addresses arrive in "sinful" form, `<host:port?params>`. Only the
//! host part takes part in the key so that a daemon restarting on a new port
//! keeps its identity.

use std::fmt;
use thiserror::Error;

use crate::ad::Ad;
use crate::ad_type::{AdKind, AdType};
use crate::attrs;

/// Identity of an ad within its registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdKey {
    /// Daemon or resource name
    pub name: String,
    /// Host address, or a type-specific secondary component; may be empty
    pub ip_addr: String,
}

impl AdKey {
    /// Create a key from its two components
    pub fn new(name: impl Into<String>, ip_addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip_addr: ip_addr.into(),
        }
    }

    /// Derive the key of `ad` for a registry of kind `kind`
    pub fn derive(kind: &AdKind, ad: &Ad) -> Result<Self, KeyError> {
        match kind {
            AdKind::Builtin(t) => Self::derive_builtin(*t, ad),
            AdKind::Generic(_) => generic_key(ad),
        }
    }

    /// Derive the key of `ad` for a built-in registry
    pub fn derive_builtin(ad_type: AdType, ad: &Ad) -> Result<Self, KeyError> {
        match ad_type {
            AdType::Startd | AdType::StartdPrivate => {
                let name = name_or_machine(ad)?;
                let ip = address_of(ad, Some(attrs::STARTD_IP_ADDR))?;
                Ok(AdKey::new(name, ip))
            }
            AdType::Schedd | AdType::Submittor => {
                let mut name = required(ad, attrs::NAME)?;
                if let Some(schedd) = ad.lookup_string(attrs::SCHEDD_NAME) {
                    name.push_str(&schedd);
                }
                let ip = address_of(ad, Some(attrs::SCHEDD_IP_ADDR))?;
                Ok(AdKey::new(name, ip))
            }
            AdType::License | AdType::Had | AdType::XferService | AdType::LeaseManager => {
                let name = required(ad, attrs::NAME)?;
                let ip = address_of(ad, None)?;
                Ok(AdKey::new(name, ip))
            }
            AdType::Master => Ok(AdKey::new(name_or_machine(ad)?, "")),
            AdType::CkptServer => Ok(AdKey::new(required(ad, attrs::MACHINE)?, "")),
            AdType::Collector => {
                let name = name_or_machine(ad)?;
                let ip = address_of(ad, Some(attrs::COLLECTOR_IP_ADDR))?;
                Ok(AdKey::new(name, ip))
            }
            AdType::Storage => Ok(AdKey::new(required(ad, attrs::NAME)?, "")),
            AdType::Accounting => {
                let mut name = required(ad, attrs::NAME)?;
                if let Some(negotiator) = ad.lookup_string(attrs::NEGOTIATOR_NAME) {
                    name.push('@');
                    name.push_str(&negotiator);
                }
                Ok(AdKey::new(name, ""))
            }
            AdType::Negotiator => {
                let name = name_or_machine(ad)?;
                let ip = address_of(ad, Some(attrs::NEGOTIATOR_IP_ADDR))?;
                Ok(AdKey::new(name, ip))
            }
            AdType::Grid => {
                let name = required(ad, attrs::HASH_NAME)?;
                let schedd = required(ad, attrs::SCHEDD_NAME)?;
                let owner = required(ad, attrs::OWNER)?;
                Ok(AdKey::new(name, format!("{}/{}", schedd, owner)))
            }
        }
    }
}

impl fmt::Display for AdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "< {} , {} >", self.name, self.ip_addr)
    }
}

/// Why a key could not be derived
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// A required attribute is absent or not a string
    #[error("missing attribute '{0}'")]
    MissingAttribute(&'static str),
    /// Neither of two alternative attributes is present
    #[error("missing both '{0}' and '{1}'")]
    MissingEither(&'static str, &'static str),
    /// An address attribute is present but has no host part
    #[error("malformed address '{0}'")]
    MalformedAddress(String),
}

fn required(ad: &Ad, attr: &'static str) -> Result<String, KeyError> {
    ad.lookup_string(attr)
        .ok_or(KeyError::MissingAttribute(attr))
}

fn name_or_machine(ad: &Ad) -> Result<String, KeyError> {
    ad.lookup_string(attrs::NAME)
        .or_else(|| ad.lookup_string(attrs::MACHINE))
        .ok_or(KeyError::MissingEither(attrs::NAME, attrs::MACHINE))
}

/// Host of the self-reported address if present, else of `MyAddress`
fn address_of(ad: &Ad, preferred: Option<&'static str>) -> Result<String, KeyError> {
    let raw = match preferred {
        Some(attr) => ad
            .lookup_string(attr)
            .or_else(|| ad.lookup_string(attrs::MY_ADDRESS))
            .ok_or(KeyError::MissingEither(attr, attrs::MY_ADDRESS))?,
        None => required(ad, attrs::MY_ADDRESS)?,
    };
    sinful_host(&raw)
        .map(str::to_string)
        .ok_or(KeyError::MalformedAddress(raw))
}

fn generic_key(ad: &Ad) -> Result<AdKey, KeyError> {
    let name = required(ad, attrs::NAME)?;
    let ip = match ad.lookup_string(attrs::MY_ADDRESS) {
        Some(raw) => sinful_host(&raw)
            .map(str::to_string)
            .ok_or(KeyError::MalformedAddress(raw))?,
        None => String::new(),
    };
    Ok(AdKey::new(name, ip))
}

/// Extract the host from a sinful string
///
/// Accepts `<host:port?params>`, `<[v6]:port>` and bare `host:port` or
/// `host`. Returns `None` when no host remains.
///
/// ```
/// use adcollector_core::key::sinful_host;
///
/// assert_eq!(sinful_host("<10.0.0.7:9618?sock=collector>"), Some("10.0.0.7"));
/// assert_eq!(sinful_host("<[::1]:9618>"), Some("::1"));
/// assert_eq!(sinful_host("node7.example.org"), Some("node7.example.org"));
/// assert_eq!(sinful_host("<:9618>"), None);
/// ```
pub fn sinful_host(addr: &str) -> Option<&str> {
    let trimmed = addr.trim();
    let inner = trimmed
        .strip_prefix('<')
        .map(|s| s.strip_suffix('>').unwrap_or(s))
        .unwrap_or(trimmed);
    let inner = inner.split('?').next().unwrap_or("");

    let host = if let Some(rest) = inner.strip_prefix('[') {
        rest.split(']').next().unwrap_or("")
    } else {
        inner.split(':').next().unwrap_or("")
    };
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
