//! Promotion - turning a raw medicine record into a valid name.
//!
//! A promotion reads the raw list under its write lock, creates the valid name,
//! and only then marks the raw records as consumed. If the raw list cannot be
//! saved, the new valid name is deleted again.

use super::{
    names::{merge_units, name_key, normalize_name},
    valid_name::{self, ValidNameView},
};
use crate::{
    entities::ValidName,
    errors::{Error, Result},
    storage::RawMedicineStore,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use tracing::{error, info};

/// Which raw name to promote, and how
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionRequest {
    /// Raw name to promote, matched ignoring case
    #[serde(default)]
    pub oldname: String,
    /// Corrected spelling for the valid name
    #[serde(default)]
    pub newname: Option<String>,
    /// Units to add to those found on the raw records
    #[serde(default)]
    pub units: Vec<String>,
}

/// Promotes every raw record named `request.oldname` into one valid name.
///
/// The valid name gets the corrected name if one is given (otherwise the raw
/// name), the union of the raw units and the requested units, no categories and
/// no image. The matched raw records are marked `edited`.
///
/// # Errors
/// Returns an error if:
/// - `oldname` is blank ([`Error::Validation`])
/// - no raw record has that name ([`Error::RawMedicineNotFound`])
/// - a matching raw record was already promoted ([`Error::AlreadyValidated`])
/// - a valid name with the target name exists ([`Error::DuplicateName`])
/// - the database or the raw store fails
pub async fn promote(
    db: &DatabaseConnection,
    raw: &RawMedicineStore,
    request: PromotionRequest,
) -> Result<ValidNameView> {
    let old_name =
        normalize_name(&request.oldname).ok_or_else(|| Error::validation("oldname is required"))?;
    let key = name_key(&old_name);

    let mut batch = raw.begin().await?;

    let matched: Vec<usize> = batch
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| name_key(&record.name) == key)
        .map(|(index, _)| index)
        .collect();
    let Some(&first) = matched.first() else {
        return Err(Error::RawMedicineNotFound { name: old_name });
    };
    if matched.iter().any(|&index| batch.records[index].edited) {
        return Err(Error::AlreadyValidated { name: old_name });
    }

    let raw_units: Vec<String> = matched
        .iter()
        .flat_map(|&index| batch.records[index].units.iter().cloned())
        .collect();
    let units = merge_units(&raw_units, &request.units);

    let raw_name = batch.records[first].name.trim().to_string();
    let target = request
        .newname
        .as_deref()
        .and_then(normalize_name)
        .unwrap_or_else(|| raw_name.clone());

    let created = valid_name::insert_valid_name(db, target.clone(), units).await?;

    let corrected = (target != raw_name).then_some(target);
    for &index in &matched {
        let record = &mut batch.records[index];
        record.edited = true;
        record.correctedname.clone_from(&corrected);
    }

    if let Err(e) = batch.commit().await {
        error!(
            "Failed to save raw medicines after promoting {}: {}",
            raw_name, e
        );
        if let Err(undo) = ValidName::delete_by_id(created.id).exec(db).await {
            error!(
                "Failed to roll back valid name {} (id {}): {}",
                created.name, created.id, undo
            );
        }
        return Err(e);
    }

    info!(
        "Promoted {} raw record(s) named {} to valid name {} (id {})",
        matched.len(),
        raw_name,
        created.name,
        created.id
    );
    Ok(ValidNameView::from_parts(created, Vec::new()))
}
