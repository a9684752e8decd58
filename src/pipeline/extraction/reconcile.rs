//! Field-level reconciliation of two independently extracted packets.
//!
//! The primary packet (model output) wins wherever it holds a genuine value.
//! The secondary packet (pattern output) only backfills what the primary left
//! empty. Lists are taken whole from one side, never combined.

use crate::models::claim::ClaimPacket;

/// Merge `secondary` into `primary` and return the reconciled packet.
///
/// `meta` is the one exception to primary precedence: the maps are unioned and
/// the secondary's entries overwrite on key collision.
pub fn reconcile(primary: ClaimPacket, secondary: ClaimPacket) -> ClaimPacket {
    let mut merged = primary;
    let ClaimPacket {
        patient,
        providers,
        claim,
        meta,
    } = secondary;

    if merged.patient.has_placeholder_name() && !patient.name.trim().is_empty() {
        merged.patient.name = patient.name;
    }
    backfill(&mut merged.patient.dob, patient.dob);
    backfill(&mut merged.patient.member_id, patient.member_id);
    backfill(&mut merged.patient.insurance, patient.insurance);

    backfill(&mut merged.providers.billing_npi, providers.billing_npi);
    backfill(&mut merged.providers.rendering_npi, providers.rendering_npi);
    backfill(
        &mut merged.providers.ordering_provider_name,
        providers.ordering_provider_name,
    );
    backfill(
        &mut merged.providers.referring_provider_id,
        providers.referring_provider_id,
    );

    backfill(&mut merged.claim.date_of_service, claim.date_of_service);
    backfill(&mut merged.claim.place_of_service, claim.place_of_service);
    backfill_list(&mut merged.claim.diagnoses, claim.diagnoses);
    backfill_list(&mut merged.claim.lines, claim.lines);

    merged.meta.extend(meta);
    merged
}

fn is_absent(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn backfill(target: &mut Option<String>, fallback: Option<String>) {
    if is_absent(target) && !is_absent(&fallback) {
        *target = fallback;
    }
}

fn backfill_list<T>(target: &mut Vec<T>, fallback: Vec<T>) {
    if target.is_empty() && !fallback.is_empty() {
        *target = fallback;
    }
}
