//! Audit trail for boundary crossings

use crate::domain::errors::PhiDetectedError;
use crate::domain::ids::CaseId;
use crate::domain::packet::DeidentifiedPacket;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Boundary event recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    PacketBuilt,
    FirewallPassed,
    FirewallBlocked,
    TemplateReceived,
    ReinsertionCompleted,
}

impl AuditEvent {
    fn as_str(&self) -> &'static str {
        match self {
            Self::PacketBuilt => "packet_built",
            Self::FirewallPassed => "firewall_passed",
            Self::FirewallBlocked => "firewall_blocked",
            Self::TemplateReceived => "template_received",
            Self::ReinsertionCompleted => "reinsertion_completed",
        }
    }
}

/// Audit log entry
///
/// Carries identifiers, key paths, counts and a digest. Never a value.
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_id: Option<String>,
    event: AuditEvent,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    /// SHA-256 of the serialized packet (never the packet itself)
    #[serde(skip_serializing_if = "Option::is_none")]
    packet_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unfilled_count: Option<usize>,
}

impl AuditLogEntry {
    fn new(event: AuditEvent, case_id: Option<&CaseId>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            case_id: case_id.map(|c| c.to_string()),
            event,
            outcome: "ok",
            reason: None,
            path: None,
            packet_sha256: None,
            unfilled_count: None,
        }
    }
}

/// Audit logger for boundary operations
pub struct BoundaryAuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl BoundaryAuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Logger that records nothing
    pub fn disabled() -> Self {
        Self {
            log_path: PathBuf::new(),
            json_format: true,
            enabled: false,
        }
    }

    /// A packet was built for `case_id`
    pub fn log_packet_built(&self, packet: &DeidentifiedPacket) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut entry = AuditLogEntry::new(AuditEvent::PacketBuilt, Some(&packet.case_id));
        entry.packet_sha256 = Some(packet_digest(packet)?);
        self.write_entry(&entry)
    }

    /// The firewall cleared the packet for sending
    pub fn log_firewall_passed(&self, packet: &DeidentifiedPacket) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut entry = AuditLogEntry::new(AuditEvent::FirewallPassed, Some(&packet.case_id));
        entry.packet_sha256 = Some(packet_digest(packet)?);
        self.write_entry(&entry)
    }

    /// The firewall stopped a payload
    pub fn log_firewall_blocked(
        &self,
        case_id: Option<&CaseId>,
        error: &PhiDetectedError,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut entry = AuditLogEntry::new(AuditEvent::FirewallBlocked, case_id);
        entry.outcome = "blocked";
        entry.reason = Some(error.kind.label().to_string());
        entry.path = Some(error.path.clone());
        self.write_entry(&entry)
    }

    /// A template came back with `placeholder_count` distinct placeholders
    pub fn log_template_received(&self, case_id: &CaseId, placeholder_count: usize) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut entry = AuditLogEntry::new(AuditEvent::TemplateReceived, Some(case_id));
        entry.unfilled_count = Some(placeholder_count);
        self.write_entry(&entry)
    }

    /// Reinsertion finished with `unfilled_count` placeholders left
    pub fn log_reinsertion_completed(&self, case_id: &CaseId, unfilled_count: usize) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut entry = AuditLogEntry::new(AuditEvent::ReinsertionCompleted, Some(case_id));
        if unfilled_count > 0 {
            entry.outcome = "needs_review";
        }
        entry.unfilled_count = Some(unfilled_count);
        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Case: {} | Event: {} | Outcome: {}{}",
                entry.timestamp,
                entry.case_id.as_deref().unwrap_or("-"),
                entry.event.as_str(),
                entry.outcome,
                entry
                    .path
                    .as_deref()
                    .map(|p| format!(" | Path: {p}"))
                    .unwrap_or_default(),
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// SHA-256 hex digest of the packet's JSON serialization
pub fn packet_digest(packet: &DeidentifiedPacket) -> Result<String> {
    let bytes = serde_json::to_vec(packet).context("Failed to serialize packet for digest")?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::deidentifier::{Deidentifier, DeidentifyOptions};
    use crate::domain::errors::ViolationKind;
    use crate::domain::record::{LocalClinicalRecord, Patient};
    use tempfile::tempdir;

    fn packet() -> DeidentifiedPacket {
        let record = LocalClinicalRecord {
            patient: Some(Patient {
                full_name: Some("Jane Doe".to_string()),
                dob: Some("1968-04-12".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        Deidentifier::default().deidentify("fac-1", &record, &DeidentifyOptions::default())
    }

    #[test]
    fn test_events_written_as_json_lines() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("boundary.log");
        let logger = BoundaryAuditLogger::new(log_path.clone(), true, true).unwrap();
        let packet = packet();

        logger.log_packet_built(&packet).unwrap();
        logger.log_firewall_passed(&packet).unwrap();
        logger.log_reinsertion_completed(&packet.case_id, 2).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "packet_built");
        assert_eq!(lines[0]["packet_sha256"].as_str().unwrap().len(), 64);
        assert_eq!(lines[2]["outcome"], "needs_review");
        assert_eq!(lines[2]["unfilled_count"], 2);
        assert!(!content.contains("Jane Doe"));
    }

    #[test]
    fn test_blocked_entry_has_path_only() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("boundary.log");
        let logger = BoundaryAuditLogger::new(log_path.clone(), false, true).unwrap();

        let error = PhiDetectedError::new(ViolationKind::BlockedKey, "request.member_id");
        logger.log_firewall_blocked(None, &error).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Event: firewall_blocked"));
        assert!(content.contains("Path: request.member_id"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("boundary.log");
        let logger = BoundaryAuditLogger::new(log_path.clone(), true, false).unwrap();
        logger.log_packet_built(&packet()).unwrap();
        assert!(!log_path.exists());
    }

    #[test]
    fn test_packet_digest_is_stable() {
        let packet = packet();
        assert_eq!(packet_digest(&packet).unwrap(), packet_digest(&packet).unwrap());
    }
}
