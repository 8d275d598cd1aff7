//! Cluster specification.
//!
//! A [`ClusterSpec`] is the only input of a generation run. Node ids are the
//! 1-based positions of the IPs in the input list; the list is never sorted,
//! so reordering the input yields a different cluster.

use crate::error::ClusterSpecError;
use std::net::Ipv4Addr;

/// 1-based node identifier within a cluster.
pub type NodeId = u64;

/// IP assigned to every node when no IP list is given.
pub const DEFAULT_NODE_IP: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Largest node count; more nodes than this cannot all get a port on one host.
pub const MAX_NODES: usize = u16::MAX as usize;

/// Validated, immutable description of the cluster to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSpec {
    count: usize,
    ips: Vec<Ipv4Addr>,
}

impl ClusterSpec {
    /// Build a spec from a node count and the raw IP strings.
    ///
    /// An empty `ips` slice places every node on [`DEFAULT_NODE_IP`].
    /// Surrounding whitespace of each entry is ignored, so `"a, b"` split on
    /// commas parses; the remaining text must be a dotted-quad IPv4 address.
    ///
    /// # Errors
    ///
    /// - [`ClusterSpecError::ZeroCount`] if `count == 0`
    /// - [`ClusterSpecError::TooManyNodes`] if `count > MAX_NODES`
    /// - [`ClusterSpecError::IpCountMismatch`] if `ips` is non-empty and its
    ///   length differs from `count`
    /// - [`ClusterSpecError::InvalidIp`] if an entry is not an IPv4 address
    pub fn new<S: AsRef<str>>(count: usize, ips: &[S]) -> Result<Self, ClusterSpecError> {
        if count == 0 {
            return Err(ClusterSpecError::ZeroCount);
        }
        if count > MAX_NODES {
            return Err(ClusterSpecError::TooManyNodes {
                count,
                max: MAX_NODES,
            });
        }

        if ips.is_empty() {
            return Ok(Self {
                count,
                ips: vec![DEFAULT_NODE_IP; count],
            });
        }

        if ips.len() != count {
            return Err(ClusterSpecError::IpCountMismatch {
                expected: count,
                actual: ips.len(),
            });
        }

        let parsed = ips
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let raw = raw.as_ref();
                raw.trim()
                    .parse::<Ipv4Addr>()
                    .map_err(|_| ClusterSpecError::InvalidIp {
                        position: i + 1,
                        value: raw.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { count, ips: parsed })
    }

    /// Single-host spec: `count` nodes all on [`DEFAULT_NODE_IP`].
    pub fn local(count: usize) -> Result<Self, ClusterSpecError> {
        Self::new::<&str>(count, &[])
    }

    /// Number of nodes.
    pub fn count(&self) -> usize {
        self.count
    }

    /// IPs in node id order.
    pub fn ips(&self) -> &[Ipv4Addr] {
        &self.ips
    }

    /// IP of the node with the given 1-based id.
    pub fn ip_of(&self, id: NodeId) -> Option<Ipv4Addr> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.ips.get(index).copied()
    }

    /// Iterate `(id, ip)` pairs in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Ipv4Addr)> + '_ {
        self.ips
            .iter()
            .enumerate()
            .map(|(i, ip)| (i as NodeId + 1, *ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ip_list_defaults_to_localhost() {
        let spec = ClusterSpec::local(4).unwrap();
        assert_eq!(spec.count(), 4);
        assert!(spec.ips().iter().all(|ip| *ip == DEFAULT_NODE_IP));
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = ClusterSpec::new(0, &["1.2.3.4"]).unwrap_err();
        assert_eq!(err, ClusterSpecError::ZeroCount);
    }

    #[test]
    fn test_huge_count_rejected() {
        let err = ClusterSpec::local(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            ClusterSpecError::TooManyNodes {
                count: usize::MAX,
                max: MAX_NODES
            }
        );
        assert!(ClusterSpec::local(MAX_NODES + 1).is_err());
        assert_eq!(ClusterSpec::local(MAX_NODES).unwrap().count(), MAX_NODES);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let spec = ClusterSpec::new(2, &[" 10.0.0.1", "10.0.0.2 "]).unwrap();
        assert_eq!(spec.ip_of(1), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(spec.ip_of(2), Some(Ipv4Addr::new(10, 0, 0, 2)));

        // Inner whitespace is still an error
        assert!(ClusterSpec::new(1, &["10.0. 0.1"]).is_err());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = ClusterSpec::new(4, &["1.2.3.4", "1.2.3.5"]).unwrap_err();
        assert_eq!(
            err,
            ClusterSpecError::IpCountMismatch {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_invalid_ip_rejected_with_position() {
        let err = ClusterSpec::new(2, &["not-an-ip", "1.2.3.4"]).unwrap_err();
        assert!(matches!(err, ClusterSpecError::InvalidIp { position: 1, .. }));

        // IPv6 is not accepted
        let err = ClusterSpec::new(2, &["1.2.3.4", "::1"]).unwrap_err();
        assert!(matches!(err, ClusterSpecError::InvalidIp { position: 2, .. }));
    }

    #[test]
    fn test_input_order_preserved() {
        let spec = ClusterSpec::new(3, &["10.0.0.3", "10.0.0.1", "10.0.0.2"]).unwrap();
        let ids: Vec<_> = spec.nodes().collect();
        assert_eq!(ids[0], (1, Ipv4Addr::new(10, 0, 0, 3)));
        assert_eq!(ids[1], (2, Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(ids[2], (3, Ipv4Addr::new(10, 0, 0, 2)));
    }

    #[test]
    fn test_ip_of_bounds() {
        let spec = ClusterSpec::new(2, &["10.0.0.1", "10.0.0.2"]).unwrap();
        assert_eq!(spec.ip_of(1), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(spec.ip_of(2), Some(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(spec.ip_of(0), None);
        assert_eq!(spec.ip_of(3), None);
    }
}
