//! Transport collaborator
//!
//! The engine never touches sockets. A transport hands it ads through
//! [`AdSource`] and reports who is on the other end.

use adcollector_core::{Ad, Error, Result};
use std::collections::VecDeque;
use std::time::Duration;

/// Identity established by the transport's authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity {
    /// Fully qualified user, e.g. `condor@pool.example.org`
    pub user: String,
    /// Method that established it
    pub method: String,
}

/// Source of ads for one inbound command
pub trait AdSource {
    /// Read the next ad, waiting at most `timeout`
    ///
    /// `Ok(None)` means the peer sent nothing in time.
    fn read_ad(&mut self, timeout: Duration) -> Result<Option<Ad>>;

    /// Authenticated identity of the peer, if any
    fn authenticated_identity(&self) -> Option<PeerIdentity>;

    /// Printable peer address for log output
    fn peer(&self) -> String;
}

/// In-memory source that replays a fixed sequence of reads
///
/// ```
/// use std::time::Duration;
/// use adcollector_core::Ad;
/// use adcollector_engine::transport::{AdSource, QueuedSource};
///
/// let mut source = QueuedSource::new("<10.0.0.1:9618>").with_ad(Ad::with_type("Machine"));
/// assert!(source.read_ad(Duration::from_secs(1)).unwrap().is_some());
/// assert!(source.read_ad(Duration::from_secs(1)).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct QueuedSource {
    peer: String,
    identity: Option<PeerIdentity>,
    reads: VecDeque<Result<Option<Ad>>>,
    timeouts: Vec<Duration>,
}

impl QueuedSource {
    /// Create an empty source for `peer`
    pub fn new(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            ..Self::default()
        }
    }

    /// Queue an ad
    pub fn with_ad(mut self, ad: Ad) -> Self {
        self.reads.push_back(Ok(Some(ad)));
        self
    }

    /// Queue a read that times out
    pub fn with_timeout(mut self) -> Self {
        self.reads.push_back(Ok(None));
        self
    }

    /// Queue a failing read
    pub fn with_failure(mut self, msg: &str) -> Self {
        self.reads.push_back(Err(Error::transport(msg)));
        self
    }

    /// Report `user` authenticated by `method`
    pub fn authenticated(mut self, user: &str, method: &str) -> Self {
        self.identity = Some(PeerIdentity {
            user: user.to_string(),
            method: method.to_string(),
        });
        self
    }

    /// Timeouts passed to each `read_ad` call so far
    pub fn timeouts(&self) -> &[Duration] {
        &self.timeouts
    }

    /// Reads not yet consumed
    pub fn pending(&self) -> usize {
        self.reads.len()
    }
}

impl AdSource for QueuedSource {
    fn read_ad(&mut self, timeout: Duration) -> Result<Option<Ad>> {
        self.timeouts.push(timeout);
        self.reads.pop_front().unwrap_or(Ok(None))
    }

    fn authenticated_identity(&self) -> Option<PeerIdentity> {
        self.identity.clone()
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}
