//! Built-in control catalog and incident archetypes

use chrono::{DateTime, Duration, Utc};

use crate::model::{ComplianceStatus, Control, RiskLevel, Standard};

/// Incident archetype with a default severity and candidate control pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentArchetype {
    FailedPasswordAudit,
    FirewallMisconfiguration,
    AssetDiscoveryGap,
    PolicyViolation,
    UnauthorizedAccess,
    EncryptionKeyExposure,
}

impl IncidentArchetype {
    /// All archetypes, used for uniform random selection
    pub const ALL: [IncidentArchetype; 6] = [
        IncidentArchetype::FailedPasswordAudit,
        IncidentArchetype::FirewallMisconfiguration,
        IncidentArchetype::AssetDiscoveryGap,
        IncidentArchetype::PolicyViolation,
        IncidentArchetype::UnauthorizedAccess,
        IncidentArchetype::EncryptionKeyExposure,
    ];

    /// Short code carried in incident titles
    pub fn code(&self) -> &'static str {
        match self {
            Self::FailedPasswordAudit => "SEC-001",
            Self::FirewallMisconfiguration => "SEC-002",
            Self::AssetDiscoveryGap => "SEC-003",
            Self::PolicyViolation => "SEC-004",
            Self::UnauthorizedAccess => "SEC-005",
            Self::EncryptionKeyExposure => "SEC-006",
        }
    }

    /// Human-readable incident title
    pub fn title(&self) -> &'static str {
        match self {
            Self::FailedPasswordAudit => "Failed Password Audit",
            Self::FirewallMisconfiguration => "Firewall Misconfiguration",
            Self::AssetDiscoveryGap => "Asset Discovery Gap",
            Self::PolicyViolation => "Policy Violation",
            Self::UnauthorizedAccess => "Unauthorized Access Detected",
            Self::EncryptionKeyExposure => "Encryption Key Exposure",
        }
    }

    /// Default severity when the caller does not override it
    pub fn default_severity(&self) -> RiskLevel {
        match self {
            Self::FailedPasswordAudit => RiskLevel::High,
            Self::FirewallMisconfiguration => RiskLevel::Critical,
            Self::AssetDiscoveryGap => RiskLevel::Medium,
            Self::PolicyViolation => RiskLevel::High,
            Self::UnauthorizedAccess => RiskLevel::Critical,
            Self::EncryptionKeyExposure => RiskLevel::Critical,
        }
    }

    /// Controls this archetype can plausibly hit
    pub fn candidate_controls(&self) -> &'static [&'static str] {
        match self {
            Self::FailedPasswordAudit => &["PCI.2.1"],
            Self::FirewallMisconfiguration => &["PCI.1.1"],
            Self::AssetDiscoveryGap => &["A.8.1.1"],
            Self::PolicyViolation => &["A.5.1.1"],
            Self::UnauthorizedAccess => &["A.6.1.1"],
            Self::EncryptionKeyExposure => &["PCI.3.4"],
        }
    }
}

impl std::str::FromStr for IncidentArchetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failed_password_audit" => Ok(Self::FailedPasswordAudit),
            "firewall_misconfiguration" => Ok(Self::FirewallMisconfiguration),
            "asset_discovery_gap" => Ok(Self::AssetDiscoveryGap),
            "policy_violation" => Ok(Self::PolicyViolation),
            "unauthorized_access" => Ok(Self::UnauthorizedAccess),
            "encryption_key_exposure" => Ok(Self::EncryptionKeyExposure),
            other => Err(other.to_string()),
        }
    }
}

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    standard: Standard,
    status: ComplianceStatus,
    risk: RiskLevel,
    team: &'static str,
    automation: f64,
    drift: f64,
    reviewed_days_ago: i64,
    next_review_in_days: i64,
    incident_count: u32,
}

const SEEDS: [Seed; 6] = [
    Seed {
        id: "A.5.1.1",
        title: "Information Security Policy",
        description: "Information security policy defined and approved by management",
        standard: Standard::Iso27001,
        status: ComplianceStatus::Compliant,
        risk: RiskLevel::High,
        team: "Security Team",
        automation: 0.3,
        drift: 0.1,
        reviewed_days_ago: 30,
        next_review_in_days: 180,
        incident_count: 0,
    },
    Seed {
        id: "A.6.1.1",
        title: "Information Security Roles and Responsibilities",
        description: "Security roles and responsibilities defined and allocated",
        standard: Standard::Iso27001,
        status: ComplianceStatus::InProgress,
        risk: RiskLevel::High,
        team: "HR & Security",
        automation: 0.2,
        drift: 0.15,
        reviewed_days_ago: 15,
        next_review_in_days: 120,
        incident_count: 0,
    },
    Seed {
        id: "A.8.1.1",
        title: "Asset Management Policy",
        description: "Assets associated with information processing facilities identified",
        standard: Standard::Iso27001,
        status: ComplianceStatus::Compliant,
        risk: RiskLevel::Medium,
        team: "IT Operations",
        automation: 0.8,
        drift: 0.2,
        reviewed_days_ago: 5,
        // Already past its review date, so overdue alerts fire in the
        // default catalog.
        next_review_in_days: -30,
        incident_count: 0,
    },
    Seed {
        id: "PCI.1.1",
        title: "Firewall Configuration Standards",
        description: "Firewall and router configuration standards established",
        standard: Standard::PciDss,
        status: ComplianceStatus::Compliant,
        risk: RiskLevel::Critical,
        team: "Network Security",
        automation: 0.7,
        drift: 0.3,
        reviewed_days_ago: 20,
        next_review_in_days: 90,
        incident_count: 0,
    },
    Seed {
        id: "PCI.2.1",
        title: "Change Default Passwords",
        description: "Vendor-supplied defaults changed for passwords and security parameters",
        standard: Standard::PciDss,
        status: ComplianceStatus::NonCompliant,
        risk: RiskLevel::High,
        team: "System Administration",
        automation: 0.9,
        drift: 0.05,
        reviewed_days_ago: 3,
        next_review_in_days: 60,
        incident_count: 2,
    },
    Seed {
        id: "PCI.3.4",
        title: "Cryptographic Key Management",
        description: "Cryptographic keys protected against disclosure and misuse",
        standard: Standard::PciDss,
        status: ComplianceStatus::InProgress,
        risk: RiskLevel::Critical,
        team: "Cryptography Team",
        automation: 0.4,
        drift: 0.25,
        reviewed_days_ago: 10,
        next_review_in_days: 90,
        incident_count: 0,
    },
];

fn build(seed: &Seed, now: DateTime<Utc>) -> Control {
    Control {
        control_id: seed.id.to_string(),
        title: seed.title.to_string(),
        description: seed.description.to_string(),
        standard: seed.standard,
        status: seed.status,
        risk_level: seed.risk,
        automation_level: seed.automation,
        drift_factor: seed.drift,
        responsible_team: seed.team.to_string(),
        last_review_date: now - Duration::days(seed.reviewed_days_ago),
        next_review_date: (now + Duration::days(seed.next_review_in_days)).date_naive(),
        incident_count: seed.incident_count,
        notes: String::new(),
    }
}

/// Built-in ISO 27001 / PCI DSS catalog with realistic starting posture
pub fn builtin_controls(now: DateTime<Utc>) -> Vec<Control> {
    SEEDS.iter().map(|s| build(s, now)).collect()
}

/// Same catalog with every control reset to not-assessed
pub fn unassessed_controls(now: DateTime<Utc>) -> Vec<Control> {
    SEEDS
        .iter()
        .map(|s| {
            let mut control = build(s, now);
            control.status = ComplianceStatus::NotAssessed;
            control.incident_count = 0;
            control.drift_factor = 0.0;
            control
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_splits_evenly_across_standards() {
        let controls = builtin_controls(Utc::now());
        assert_eq!(controls.len(), 6);
        let iso = controls.iter().filter(|c| c.standard == Standard::Iso27001).count();
        assert_eq!(iso, 3);
    }

    #[test]
    fn archetype_pools_reference_catalog_controls() {
        let controls = builtin_controls(Utc::now());
        for archetype in IncidentArchetype::ALL {
            for id in archetype.candidate_controls() {
                assert!(
                    controls.iter().any(|c| c.control_id == *id),
                    "{id} missing from catalog"
                );
            }
        }
    }

    #[test]
    fn unassessed_catalog_is_clean() {
        for control in unassessed_controls(Utc::now()) {
            assert_eq!(control.status, ComplianceStatus::NotAssessed);
            assert_eq!(control.incident_count, 0);
            assert_eq!(control.drift_factor, 0.0);
        }
    }

    #[test]
    fn archetype_parses_from_wire_name() {
        let parsed: IncidentArchetype = "policy_violation".parse().unwrap();
        assert_eq!(parsed, IncidentArchetype::PolicyViolation);
        assert!("ransomware".parse::<IncidentArchetype>().is_err());
    }
}
