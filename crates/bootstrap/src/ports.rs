//! Port assignment
//!
//! Nodes sharing a host get consecutive ports: the k-th node seen with a
//! given IP (k counted from 1, in input order) listens on `base + k`.

use crate::error::{BootstrapError, Result};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Port for the `occurrence`-th node on a host.
pub fn port_for(base_port: u16, occurrence: u32) -> Result<u16> {
    u32::from(base_port)
        .checked_add(occurrence)
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| BootstrapError::InvalidInput {
            field: "base-port",
            reason: format!("port {base_port} + {occurrence} exceeds 65535"),
        })
}

/// Per-IP occurrence counter.
#[derive(Debug, Clone)]
pub struct PortAllocator {
    base_port: u16,
    occurrences: HashMap<Ipv4Addr, u32>,
}

impl PortAllocator {
    /// Create an allocator starting at `base_port`.
    pub fn new(base_port: u16) -> Self {
        Self {
            base_port,
            occurrences: HashMap::new(),
        }
    }

    /// Assign the next port for `ip`.
    pub fn allocate(&mut self, ip: Ipv4Addr) -> Result<u16> {
        let occurrence = self.occurrences.entry(ip).or_insert(0);
        *occurrence += 1;
        port_for(self.base_port, *occurrence)
    }

    /// Assign ports to a whole IP list, in order.
    pub fn allocate_all(base_port: u16, ips: &[Ipv4Addr]) -> Result<Vec<u16>> {
        let mut allocator = Self::new(base_port);
        ips.iter().map(|ip| allocator.allocate(*ip)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    #[test]
    fn test_single_host() {
        let ports = PortAllocator::allocate_all(4000, &[Ipv4Addr::LOCALHOST; 4]).unwrap();
        assert_eq!(ports, vec![4001, 4002, 4003, 4004]);
    }

    #[test]
    fn test_interleaved_hosts() {
        let ports = PortAllocator::allocate_all(4000, &[A, B, A]).unwrap();
        assert_eq!(ports, vec![4001, 4001, 4002]);
    }

    #[test]
    fn test_overflow_is_invalid_input() {
        let err = PortAllocator::allocate_all(65534, &[A, A, A]).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidInput { field: "base-port", .. }));
        assert_eq!(port_for(65534, 1).unwrap(), 65535);
    }
}
