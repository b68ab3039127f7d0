use std::net::Ipv4Addr;

/// Addresses that never count as findings.
pub const DEFAULT_ALLOW: [Ipv4Addr; 2] = [Ipv4Addr::LOCALHOST, Ipv4Addr::UNSPECIFIED];

/// Directory names that are never descended into.
pub const DEFAULT_SKIP_DIRS: [&str; 3] = [".git", "target", "node_modules"];

/// What to ignore during an audit.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub allow: Vec<Ipv4Addr>,
    pub skip_dirs: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            allow: DEFAULT_ALLOW.to_vec(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AuditConfig {
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    pub fn is_allowed(&self, addr: &Ipv4Addr) -> bool {
        self.allow.contains(addr)
    }

    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == name)
    }
}

/// Builder for [`AuditConfig`]. Additions extend the defaults.
#[derive(Default)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    pub fn with_allow(mut self, addr: Ipv4Addr) -> Self {
        if !self.config.allow.contains(&addr) {
            self.config.allow.push(addr);
        }
        self
    }

    pub fn with_skip_dir(mut self, name: impl Into<String>) -> Self {
        self.config.skip_dirs.push(name.into());
        self
    }

    pub fn build(self) -> AuditConfig {
        self.config
    }
}
