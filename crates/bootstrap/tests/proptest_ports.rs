//! Property-based tests for port assignment

use permctl::{port_for, PortAllocator};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

fn ip_list() -> impl Strategy<Value = Vec<Ipv4Addr>> {
    // A small pool so hosts repeat
    prop::collection::vec((0u8..4).prop_map(|last| Ipv4Addr::new(10, 0, 0, last)), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the k-th occurrence of an IP gets base + k
    #[test]
    fn prop_port_is_base_plus_occurrence(base in 0u16..60000, ips in ip_list()) {
        let ports = PortAllocator::allocate_all(base, &ips).unwrap();

        let mut seen: HashMap<Ipv4Addr, u16> = HashMap::new();
        for (ip, port) in ips.iter().zip(&ports) {
            let occurrence = seen.entry(*ip).or_insert(0);
            *occurrence += 1;
            prop_assert_eq!(*port, base + *occurrence);
        }
    }

    /// Property: no two nodes share an (ip, port) pair
    #[test]
    fn prop_endpoints_are_unique(base in 0u16..60000, ips in ip_list()) {
        let ports = PortAllocator::allocate_all(base, &ips).unwrap();

        let endpoints: HashSet<_> = ips.iter().zip(&ports).collect();
        prop_assert_eq!(endpoints.len(), ips.len());
    }

    /// Property: overflow is an error, never a wrapped port
    #[test]
    fn prop_overflow_rejected(base in 65500u16..=u16::MAX, occurrence in 1u32..1000) {
        let result = port_for(base, occurrence);
        if u32::from(base) + occurrence > u32::from(u16::MAX) {
            prop_assert!(result.is_err());
        } else {
            prop_assert_eq!(u32::from(result.unwrap()), u32::from(base) + occurrence);
        }
    }
}
