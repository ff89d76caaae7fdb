//! Append-only status transition log (tamper-evident)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::{ComplianceStatus, TransitionCause};

/// One status transition, chained to its predecessor by hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub control_id: String,
    pub old_status: ComplianceStatus,
    pub new_status: ComplianceStatus,
    pub cause: TransitionCause,
    pub actor: String,
    pub note: String,
    pub prev_hash: String,
    pub hash: String,
}

impl AuditEntry {
    fn compute_hash(&self, prev_hash: &str) -> String {
        let data = format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.timestamp, self.control_id, self.old_status, self.new_status,
            self.cause, self.actor, self.note, prev_hash
        );
        hex::encode(Sha256::digest(data.as_bytes()))
    }
}

/// Chain verification outcome
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityResult {
    pub valid: bool,
    pub checked_count: usize,
    pub error: Option<String>,
}

/// Hash-chained audit log; entries are never mutated or trimmed
#[derive(Debug, Clone)]
pub struct AuditChain {
    entries: Vec<AuditEntry>,
    last_hash: String,
}

impl AuditChain {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_hash: "genesis".into(),
        }
    }

    /// Append a transition record
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        control_id: &str,
        old_status: ComplianceStatus,
        new_status: ComplianceStatus,
        cause: TransitionCause,
        actor: &str,
        note: &str,
    ) {
        let mut entry = AuditEntry {
            timestamp,
            control_id: control_id.to_string(),
            old_status,
            new_status,
            cause,
            actor: actor.to_string(),
            note: note.to_string(),
            prev_hash: self.last_hash.clone(),
            hash: String::new(),
        };
        entry.hash = entry.compute_hash(&self.last_hash);
        self.last_hash = entry.hash.clone();
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the chain and verify every link
    pub fn verify_integrity(&self) -> IntegrityResult {
        let mut prev_hash = "genesis".to_string();
        let mut checked = 0;

        for entry in &self.entries {
            if entry.prev_hash != prev_hash {
                return IntegrityResult {
                    valid: false,
                    checked_count: checked,
                    error: Some(format!("chain broken at {}", entry.control_id)),
                };
            }
            if entry.compute_hash(&prev_hash) != entry.hash {
                return IntegrityResult {
                    valid: false,
                    checked_count: checked,
                    error: Some(format!("hash mismatch at {}", entry.control_id)),
                };
            }
            prev_hash = entry.hash.clone();
            checked += 1;
        }

        IntegrityResult {
            valid: true,
            checked_count: checked,
            error: None,
        }
    }
}

impl Default for AuditChain {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_sample(chain: &mut AuditChain, control_id: &str) {
        chain.record(
            Utc::now(),
            control_id,
            ComplianceStatus::Compliant,
            ComplianceStatus::NonCompliant,
            TransitionCause::Incident,
            "simulator",
            "test",
        );
    }

    #[test]
    fn entries_chain_by_hash() {
        let mut chain = AuditChain::new();
        record_sample(&mut chain, "PCI.1.1");
        record_sample(&mut chain, "A.5.1.1");

        assert_eq!(chain.entries()[0].prev_hash, "genesis");
        assert_eq!(chain.entries()[1].prev_hash, chain.entries()[0].hash);

        let result = chain.verify_integrity();
        assert!(result.valid);
        assert_eq!(result.checked_count, 2);
    }

    #[test]
    fn tampering_breaks_verification() {
        let mut chain = AuditChain::new();
        record_sample(&mut chain, "PCI.1.1");
        record_sample(&mut chain, "A.5.1.1");

        chain.entries[0].note = "rewritten".into();
        let result = chain.verify_integrity();
        assert!(!result.valid);
        assert_eq!(result.checked_count, 0);
    }
}
