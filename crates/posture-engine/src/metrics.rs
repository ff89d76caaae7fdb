//! Pure metric derivation over registry snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Alert, ComplianceStatus, Control, Incident, RiskLevel, Standard};

/// Per-standard compliance rollup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardSummary {
    pub standard: Standard,
    pub total_controls: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub in_progress: usize,
    pub not_assessed: usize,
    /// Rounded to one decimal; 0.0 when the standard has no controls
    pub compliance_percentage: f64,
}

/// High-risk control currently out of compliance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighRiskIssue {
    pub control_id: String,
    pub title: String,
    pub risk_level: RiskLevel,
    pub responsible_team: String,
}

/// Full compliance summary report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub report_date: DateTime<Utc>,
    pub total_controls: usize,
    pub iso27001: StandardSummary,
    pub pci_dss: StandardSummary,
    pub high_risk_non_compliant: Vec<HighRiskIssue>,
}

/// Counts over the fixed {critical, high, medium, low} bucket order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskHistogram {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskHistogram {
    fn bump(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

/// Risk histograms for all controls and for the non-compliant subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub total_by_risk: RiskHistogram,
    pub non_compliant_by_risk: RiskHistogram,
}

/// Trend scalars over the current snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    /// Incidents ever created
    pub total_incidents: usize,
    /// Weighted sum over non-compliant controls (critical=4 .. low=1)
    pub total_risk_score: u32,
    /// Mean automation level, as a percentage
    pub average_automation: f64,
    /// Mean drift factor, as a percentage
    pub drift_risk_factor: f64,
    pub active_alerts: usize,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rollup for one standard; empty standards yield 0%, not an error
pub fn standard_summary(controls: &[Control], standard: Standard) -> StandardSummary {
    let of_standard: Vec<&Control> = controls.iter().filter(|c| c.standard == standard).collect();
    let total = of_standard.len();
    let count = |status: ComplianceStatus| of_standard.iter().filter(|c| c.status == status).count();

    let compliant = count(ComplianceStatus::Compliant);
    let percentage = if total > 0 {
        round1(compliant as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    StandardSummary {
        standard,
        total_controls: total,
        compliant,
        non_compliant: count(ComplianceStatus::NonCompliant),
        in_progress: count(ComplianceStatus::InProgress),
        not_assessed: count(ComplianceStatus::NotAssessed),
        compliance_percentage: percentage,
    }
}

/// Controls with critical/high risk that are currently non-compliant
pub fn high_risk_non_compliant(controls: &[Control]) -> Vec<HighRiskIssue> {
    controls
        .iter()
        .filter(|c| c.status == ComplianceStatus::NonCompliant && c.is_high_risk())
        .map(|c| HighRiskIssue {
            control_id: c.control_id.clone(),
            title: c.title.clone(),
            risk_level: c.risk_level,
            responsible_team: c.responsible_team.clone(),
        })
        .collect()
}

/// Full summary across both standards
pub fn compliance_summary(controls: &[Control], now: DateTime<Utc>) -> ComplianceSummary {
    ComplianceSummary {
        report_date: now,
        total_controls: controls.len(),
        iso27001: standard_summary(controls, Standard::Iso27001),
        pci_dss: standard_summary(controls, Standard::PciDss),
        high_risk_non_compliant: high_risk_non_compliant(controls),
    }
}

/// Histogram of all controls and of non-compliant controls by risk level
pub fn risk_assessment(controls: &[Control]) -> RiskAssessment {
    let mut total_by_risk = RiskHistogram::default();
    let mut non_compliant_by_risk = RiskHistogram::default();

    for control in controls {
        total_by_risk.bump(control.risk_level);
        if control.status == ComplianceStatus::NonCompliant {
            non_compliant_by_risk.bump(control.risk_level);
        }
    }

    RiskAssessment {
        total_by_risk,
        non_compliant_by_risk,
    }
}

/// Trend scalars; deterministic over the snapshot, no hidden state
pub fn trends(controls: &[Control], incidents: &[Incident], alerts: &[Alert]) -> TrendReport {
    let total_risk_score = controls
        .iter()
        .filter(|c| c.status == ComplianceStatus::NonCompliant)
        .map(|c| c.risk_level.weight())
        .sum();

    let (average_automation, drift_risk_factor) = if controls.is_empty() {
        (0.0, 0.0)
    } else {
        let n = controls.len() as f64;
        let automation: f64 = controls.iter().map(|c| c.automation_level).sum();
        let drift: f64 = controls.iter().map(|c| c.drift_factor).sum();
        (round1(automation / n * 100.0), round1(drift / n * 100.0))
    };

    TrendReport {
        total_incidents: incidents.len(),
        total_risk_score,
        average_automation,
        drift_risk_factor,
        active_alerts: alerts.iter().filter(|a| !a.acknowledged).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn summary_counts_builtin_catalog() {
        let controls = catalog::builtin_controls(Utc::now());
        let summary = compliance_summary(&controls, Utc::now());

        assert_eq!(summary.total_controls, 6);
        assert_eq!(summary.iso27001.total_controls, 3);
        assert_eq!(summary.iso27001.compliant, 2);
        // 2 of 3 compliant
        assert_eq!(summary.iso27001.compliance_percentage, 66.7);
        assert_eq!(summary.pci_dss.compliant, 1);
        assert_eq!(summary.pci_dss.compliance_percentage, 33.3);
    }

    #[test]
    fn empty_standard_yields_zero_percent() {
        let summary = standard_summary(&[], Standard::Iso27001);
        assert_eq!(summary.total_controls, 0);
        assert_eq!(summary.compliance_percentage, 0.0);
    }

    #[test]
    fn unassessed_catalog_scores_zero() {
        let controls = catalog::unassessed_controls(Utc::now());
        let summary = compliance_summary(&controls, Utc::now());
        assert_eq!(summary.iso27001.compliance_percentage, 0.0);
        assert_eq!(summary.pci_dss.compliance_percentage, 0.0);
        assert_eq!(summary.iso27001.not_assessed, 3);
    }

    #[test]
    fn high_risk_issues_only_include_non_compliant() {
        let controls = catalog::builtin_controls(Utc::now());
        let issues = high_risk_non_compliant(&controls);
        // Only PCI.2.1 starts non-compliant, and it is high risk
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].control_id, "PCI.2.1");
    }

    #[test]
    fn histograms_bucket_by_risk() {
        let controls = catalog::builtin_controls(Utc::now());
        let assessment = risk_assessment(&controls);
        assert_eq!(assessment.total_by_risk.critical, 2);
        assert_eq!(assessment.total_by_risk.high, 3);
        assert_eq!(assessment.total_by_risk.medium, 1);
        assert_eq!(assessment.total_by_risk.low, 0);
        assert_eq!(assessment.non_compliant_by_risk.high, 1);
        assert_eq!(assessment.non_compliant_by_risk.critical, 0);
    }

    #[test]
    fn risk_score_weighs_non_compliant_only() {
        let controls = catalog::builtin_controls(Utc::now());
        let report = trends(&controls, &[], &[]);
        // PCI.2.1 (high, weight 3) is the only non-compliant control
        assert_eq!(report.total_risk_score, 3);
        assert_eq!(report.total_incidents, 0);
    }

    #[test]
    fn trends_on_empty_registry_are_zero() {
        let report = trends(&[], &[], &[]);
        assert_eq!(report.average_automation, 0.0);
        assert_eq!(report.drift_risk_factor, 0.0);
        assert_eq!(report.total_risk_score, 0);
    }
}
