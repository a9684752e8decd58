use serde::{Deserialize, Serialize};

use crate::models::claim::ClaimPacket;

/// Flat view of one service line, suitable for a grid or CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLineRow {
    /// 1-based position in the packet.
    pub line: usize,
    pub cpt_hcpcs: String,
    pub units: i64,
    pub modifiers: String,
    pub dx_pointer: String,
}

pub fn claim_lines_table(packet: &ClaimPacket) -> Vec<ClaimLineRow> {
    packet
        .claim
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| ClaimLineRow {
            line: idx + 1,
            cpt_hcpcs: line.cpt_hcpcs.clone(),
            units: line.units,
            modifiers: line.modifiers.join(","),
            dx_pointer: line
                .diagnosis_pointer
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect()
}
