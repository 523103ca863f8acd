//! Well-known attribute names

/// Receipt timestamp, seconds since the Unix epoch
pub const LAST_HEARD_FROM: &str = "LastHeardFrom";
/// Per-ad lifetime override, seconds
pub const CLASSAD_LIFETIME: &str = "ClassAdLifetime";
/// Time this ad was last forwarded downstream
pub const LAST_FORWARDED: &str = "LastForwarded";
/// Whether the latest update should be forwarded downstream
pub const SHOULD_FORWARD: &str = "ShouldForward";
/// Contact address of the advertising daemon
pub const MY_ADDRESS: &str = "MyAddress";
/// Type discriminator
pub const MY_TYPE: &str = "MyType";
/// Type of ad this ad is meant to match against
pub const TARGET_TYPE: &str = "TargetType";
/// Daemon name
pub const NAME: &str = "Name";
/// Host name
pub const MACHINE: &str = "Machine";
/// Identity established by the transport's authentication
pub const AUTHENTICATED_IDENTITY: &str = "AuthenticatedIdentity";
/// Authentication method used by the transport
pub const AUTHENTICATION_METHOD: &str = "AuthenticationMethod";
/// Constraint expression
pub const REQUIREMENTS: &str = "Requirements";

/// Self-reported address of an execute node
pub const STARTD_IP_ADDR: &str = "StartdIpAddr";
/// Self-reported address of a submit node
pub const SCHEDD_IP_ADDR: &str = "ScheddIpAddr";
/// Self-reported address of a master
pub const MASTER_IP_ADDR: &str = "MasterIpAddr";
/// Self-reported address of a negotiator
pub const NEGOTIATOR_IP_ADDR: &str = "NegotiatorIpAddr";
/// Self-reported address of a collector
pub const COLLECTOR_IP_ADDR: &str = "CollectorIpAddr";

/// Submit node a submitter or grid ad belongs to
pub const SCHEDD_NAME: &str = "ScheddName";
/// Negotiator an accounting ad belongs to
pub const NEGOTIATOR_NAME: &str = "NegotiatorName";
/// Grid resource hash
pub const HASH_NAME: &str = "HashName";
/// Owning user
pub const OWNER: &str = "Owner";

/// `MyType` stamped on execute-node ads, public and private alike
pub const STARTD_ADTYPE: &str = "Machine";

/// Attributes an incoming merge may never overwrite
pub const MERGE_PROTECTED: [&str; 3] = [AUTHENTICATED_IDENTITY, MY_TYPE, TARGET_TYPE];

/// Forward watch list used when none is configured
pub const DEFAULT_FORWARD_WATCH_LIST: [&str; 8] = [
    "State",
    "Cpus",
    "Memory",
    "IdleJobs",
    "ClaimId",
    "Capability",
    "ClaimIdList",
    "ChildClaimIds",
];
