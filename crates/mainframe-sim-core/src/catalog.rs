//! Fixed catalogs: address spaces, services, and the discrete sets LPARs are
//! provisioned from.
//!
//! Every label value the simulator emits comes from these tables, so series
//! cardinality is bounded by `lpars × (ADDRESS_SPACES + SERVICES)`.

use serde::Serialize;

/// Bytes per GiB.
pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Memory sizes an LPAR can be provisioned with, in GiB.
pub const MEMORY_TIERS_GIB: [u64; 5] = [32, 48, 64, 96, 128];

/// MIPS ratings an LPAR can be provisioned with.
pub const MIPS_CAPACITIES: [u32; 4] = [8000, 10000, 12000, 16000];

/// Histogram buckets for transaction response time, in seconds.
pub const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0,
];

/// A named subsystem within an LPAR whose CPU and RSS shares are derived each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressSpace {
    /// CICS region.
    Dfhsip,
    /// DB2 database services.
    Dbm1,
    /// DB2 system services.
    Mstr,
    Tcpip,
    Vtam,
    Jes2,
    Smf,
    Rmf,
    /// IMS control region.
    Imsctl,
    /// MQ queue manager.
    Mqm,
}

impl AddressSpace {
    pub const ALL: [AddressSpace; 10] = [
        Self::Dfhsip,
        Self::Dbm1,
        Self::Mstr,
        Self::Tcpip,
        Self::Vtam,
        Self::Jes2,
        Self::Smf,
        Self::Rmf,
        Self::Imsctl,
        Self::Mqm,
    ];

    /// Label value as it appears on the exposition endpoint.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dfhsip => "DFHSIP",
            Self::Dbm1 => "DBM1",
            Self::Mstr => "MSTR",
            Self::Tcpip => "TCPIP",
            Self::Vtam => "VTAM",
            Self::Jes2 => "JES2",
            Self::Smf => "SMF",
            Self::Rmf => "RMF",
            Self::Imsctl => "IMSCTL",
            Self::Mqm => "MQM",
        }
    }
}

impl std::fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A transaction-processing subsystem with its own latency profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Service {
    Cics,
    Db2,
    Ims,
    Mq,
}

impl Service {
    pub const ALL: [Service; 4] = [Self::Cics, Self::Db2, Self::Ims, Self::Mq];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cics => "CICS",
            Self::Db2 => "DB2",
            Self::Ims => "IMS",
            Self::Mq => "MQ",
        }
    }

    /// Transactions per interval unit before CPU scaling and noise.
    pub fn base_rate(self) -> f64 {
        match self {
            Self::Cics => 250.0,
            Self::Db2 | Self::Ims | Self::Mq => 160.0,
        }
    }

    /// Log-normal `(mu, sigma)` of the response time in seconds.
    pub fn latency_profile(self) -> (f64, f64) {
        match self {
            Self::Cics => (-3.2, 0.55),
            Self::Db2 => (-2.8, 0.60),
            Self::Ims => (-3.0, 0.55),
            Self::Mq => (-3.4, 0.50),
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_space_names_unique() {
        let mut names: Vec<&str> = AddressSpace::ALL.iter().map(|a| a.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AddressSpace::ALL.len());
    }

    #[test]
    fn test_service_catalog() {
        let names: Vec<&str> = Service::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["CICS", "DB2", "IMS", "MQ"]);
        assert_eq!(Service::Cics.base_rate(), 250.0);
        assert_eq!(Service::Mq.base_rate(), 160.0);
    }

    #[test]
    fn test_latency_buckets_strictly_increasing() {
        assert!(LATENCY_BUCKETS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(AddressSpace::Imsctl.to_string(), "IMSCTL");
        assert_eq!(Service::Db2.to_string(), "DB2");
    }
}
