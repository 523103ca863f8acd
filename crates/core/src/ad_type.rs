//! Ad types and the commands that carry them
//!
//! Every built-in ad type owns exactly one registry. Types observed at run
//! time that are not built in are "generic" and get a registry of their own
//! on first use.
//!
//! | AdType | Stats label | Key address | Forward-filtered |
//! |--------|-------------|-------------|------------------|
//! | Startd | Start | StartdIpAddr / MyAddress | yes |
//! | StartdPrivate | StartdPvt | StartdIpAddr / MyAddress | yes |
//! | Schedd | Schedd | ScheddIpAddr / MyAddress | no |
//! | Submittor | Submittor | ScheddIpAddr / MyAddress | yes |
//! | Negotiator | Negotiator | NegotiatorIpAddr / MyAddress | no |
//! | LeaseManager | LeaseManager | MyAddress | no |
//!
//! The remaining types are listed in [`AdType::ALL`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attrs;

/// The fifteen built-in ad types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdType {
    /// Public execute-node ad
    Startd,
    /// Private execute-node ad, never exposed to statistics
    StartdPrivate,
    /// Submit node
    Schedd,
    /// Per-user submitter summary published by a submit node
    Submittor,
    /// License server
    License,
    /// Per-host master daemon
    Master,
    /// Checkpoint server
    CkptServer,
    /// Another collector
    Collector,
    /// Storage service
    Storage,
    /// Accounting record published by a negotiator
    Accounting,
    /// Negotiator
    Negotiator,
    /// High-availability daemon
    Had,
    /// Grid resource
    Grid,
    /// Transfer service
    XferService,
    /// Lease manager, always a singleton
    LeaseManager,
}

impl AdType {
    /// All built-in types in declaration order
    pub const ALL: [AdType; 15] = [
        AdType::Startd,
        AdType::StartdPrivate,
        AdType::Schedd,
        AdType::Submittor,
        AdType::License,
        AdType::Master,
        AdType::CkptServer,
        AdType::Collector,
        AdType::Storage,
        AdType::Accounting,
        AdType::Negotiator,
        AdType::Had,
        AdType::Grid,
        AdType::XferService,
        AdType::LeaseManager,
    ];

    /// Order used by whole-collector walks
    ///
    /// Private startd ads are never visited by an "any type" walk.
    pub const WALK_ORDER: [AdType; 14] = [
        AdType::Accounting,
        AdType::Storage,
        AdType::CkptServer,
        AdType::License,
        AdType::Collector,
        AdType::Startd,
        AdType::Schedd,
        AdType::Master,
        AdType::Submittor,
        AdType::Negotiator,
        AdType::Had,
        AdType::Grid,
        AdType::XferService,
        AdType::LeaseManager,
    ];

    /// Label reported to the statistics sink and used in log output
    pub const fn label(&self) -> &'static str {
        match self {
            AdType::Startd => "Start",
            AdType::StartdPrivate => "StartdPvt",
            AdType::Schedd => "Schedd",
            AdType::Submittor => "Submittor",
            AdType::License => "License",
            AdType::Master => "Master",
            AdType::CkptServer => "CkptSrvr",
            AdType::Collector => "Collector",
            AdType::Storage => "Storage",
            AdType::Accounting => "Accounting",
            AdType::Negotiator => "Negotiator",
            AdType::Had => "HAD",
            AdType::Grid => "Grid",
            AdType::XferService => "XferService",
            AdType::LeaseManager => "LeaseManager",
        }
    }

    /// Parse a label produced by [`AdType::label`]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }

    /// Private ads are stored but never reported to statistics
    pub const fn is_private(&self) -> bool {
        matches!(self, AdType::StartdPrivate)
    }

    /// Types whose updates go through the forwarding filter
    pub const fn is_forward_filtered(&self) -> bool {
        matches!(
            self,
            AdType::Startd | AdType::StartdPrivate | AdType::Submittor
        )
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A built-in type or a generic type name taken from an ad's `MyType`
///
/// Generic type names are matched exactly, including case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdKind {
    /// One of the fixed registries
    Builtin(AdType),
    /// A registry created on demand for this type name
    Generic(String),
}

impl AdKind {
    /// Shorthand for a generic kind
    pub fn generic(name: impl Into<String>) -> Self {
        AdKind::Generic(name.into())
    }

    /// The built-in type, if any
    pub fn as_builtin(&self) -> Option<AdType> {
        match self {
            AdKind::Builtin(t) => Some(*t),
            AdKind::Generic(_) => None,
        }
    }

    /// Label used for statistics and log output
    pub fn label(&self) -> &str {
        match self {
            AdKind::Builtin(t) => t.label(),
            AdKind::Generic(name) => name,
        }
    }
}

impl From<AdType> for AdKind {
    fn from(t: AdType) -> Self {
        AdKind::Builtin(t)
    }
}

impl fmt::Display for AdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which registries a walk or an on-demand sweep covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkScope {
    /// A single registry
    Type(AdKind),
    /// Every generic registry, in no particular order
    AllGeneric,
    /// Every built-in registry except private startd ads, then every generic one
    Any,
}

impl From<AdType> for WalkScope {
    fn from(t: AdType) -> Self {
        WalkScope::Type(AdKind::Builtin(t))
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Inbound command, identified on the wire by an integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Replace or insert an execute-node ad
    UpdateStartd,
    /// Same as `UpdateStartd`; the acknowledgement is the transport's concern
    UpdateStartdWithAck,
    /// Merge attributes into an existing execute-node ad
    MergeStartd,
    /// Submit node update
    UpdateSchedd,
    /// Submitter update
    UpdateSubmittor,
    /// License server update
    UpdateLicense,
    /// Master update
    UpdateMaster,
    /// Checkpoint server update
    UpdateCkptServer,
    /// Collector update
    UpdateCollector,
    /// Storage update
    UpdateStorage,
    /// Accounting update
    UpdateAccounting,
    /// Negotiator update
    UpdateNegotiator,
    /// High-availability daemon update
    UpdateHad,
    /// Grid resource update
    UpdateGrid,
    /// Update of a type named by the ad's own `MyType`
    UpdateGeneric,
    /// Transfer service update
    UpdateXferService,
    /// Lease manager update
    UpdateLeaseManager,
    /// A recognised query command, handled above the engine
    Query(i32),
    /// A recognised invalidation command, handled above the engine
    Invalidate(i32),
    /// Anything else
    Unknown(i32),
}

const UPDATE_CODES: [(i32, Command); 17] = [
    (0, Command::UpdateStartd),
    (1, Command::UpdateSchedd),
    (2, Command::UpdateMaster),
    (4, Command::UpdateCkptServer),
    (11, Command::UpdateSubmittor),
    (19, Command::UpdateCollector),
    (42, Command::UpdateLicense),
    (45, Command::UpdateStorage),
    (49, Command::UpdateNegotiator),
    (55, Command::UpdateHad),
    (58, Command::UpdateGeneric),
    (60, Command::UpdateStartdWithAck),
    (61, Command::UpdateXferService),
    (64, Command::UpdateLeaseManager),
    (67, Command::MergeStartd),
    (70, Command::UpdateGrid),
    (77, Command::UpdateAccounting),
];

const QUERY_CODES: [i32; 17] = [5, 6, 7, 9, 10, 12, 20, 43, 46, 48, 50, 56, 62, 65, 71, 74, 78];

const INVALIDATE_CODES: [i32; 15] = [13, 14, 15, 17, 18, 21, 44, 47, 51, 57, 59, 63, 66, 72, 79];

impl Command {
    /// Decode a wire code; unrecognised codes become [`Command::Unknown`]
    pub fn from_code(code: i32) -> Self {
        if let Some((_, cmd)) = UPDATE_CODES.iter().find(|(c, _)| *c == code) {
            return *cmd;
        }
        if QUERY_CODES.contains(&code) {
            Command::Query(code)
        } else if INVALIDATE_CODES.contains(&code) {
            Command::Invalidate(code)
        } else {
            Command::Unknown(code)
        }
    }

    /// Wire code of this command
    pub fn code(&self) -> i32 {
        match self {
            Command::Query(code) | Command::Invalidate(code) | Command::Unknown(code) => *code,
            cmd => UPDATE_CODES
                .iter()
                .find(|(_, c)| c == cmd)
                .map(|(code, _)| *code)
                .unwrap_or(-1),
        }
    }

    /// Built-in registry an update or merge is applied to
    ///
    /// `None` for generic updates (the type comes from the ad) and for
    /// commands the engine does not apply.
    pub fn ad_type(&self) -> Option<AdType> {
        Some(match self {
            Command::UpdateStartd | Command::UpdateStartdWithAck | Command::MergeStartd => {
                AdType::Startd
            }
            Command::UpdateSchedd => AdType::Schedd,
            Command::UpdateSubmittor => AdType::Submittor,
            Command::UpdateLicense => AdType::License,
            Command::UpdateMaster => AdType::Master,
            Command::UpdateCkptServer => AdType::CkptServer,
            Command::UpdateCollector => AdType::Collector,
            Command::UpdateStorage => AdType::Storage,
            Command::UpdateAccounting => AdType::Accounting,
            Command::UpdateNegotiator => AdType::Negotiator,
            Command::UpdateHad => AdType::Had,
            Command::UpdateGrid => AdType::Grid,
            Command::UpdateXferService => AdType::XferService,
            Command::UpdateLeaseManager => AdType::LeaseManager,
            Command::UpdateGeneric
            | Command::Query(_)
            | Command::Invalidate(_)
            | Command::Unknown(_) => return None,
        })
    }

    /// Whether the engine applies this command itself
    pub fn is_update(&self) -> bool {
        !matches!(
            self,
            Command::Query(_) | Command::Invalidate(_) | Command::Unknown(_)
        )
    }

    /// Whether this command merges into an existing ad rather than replacing it
    pub fn is_merge(&self) -> bool {
        matches!(self, Command::MergeStartd)
    }

    /// Whether the sender follows the public ad with a private one
    pub fn carries_private_ad(&self) -> bool {
        matches!(self, Command::UpdateStartd | Command::UpdateStartdWithAck)
    }

    /// Self-reported IP attribute that must agree with `MyAddress`
    pub fn self_ip_attr(&self) -> Option<&'static str> {
        match self {
            Command::UpdateStartd | Command::UpdateStartdWithAck | Command::MergeStartd => {
                Some(attrs::STARTD_IP_ADDR)
            }
            Command::UpdateSchedd | Command::UpdateSubmittor => Some(attrs::SCHEDD_IP_ADDR),
            Command::UpdateMaster => Some(attrs::MASTER_IP_ADDR),
            Command::UpdateNegotiator => Some(attrs::NEGOTIATOR_IP_ADDR),
            Command::UpdateCollector => Some(attrs::COLLECTOR_IP_ADDR),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Query(code) => write!(f, "Query({})", code),
            Command::Invalidate(code) => write!(f, "Invalidate({})", code),
            Command::Unknown(code) => write!(f, "Unknown({})", code),
            other => write!(f, "{:?}", other),
        }
    }
}
