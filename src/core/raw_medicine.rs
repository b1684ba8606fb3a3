//! Raw medicine listing, grouping, and bulk replacement.

use super::{
    names::{merge_units, name_key, normalize_name},
    valid_name::{self, ValidNameView},
};
use crate::{
    entities::ValidName,
    errors::{Error, Result},
    storage::{RawMedicine, RawMedicineStore},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Raw records sharing a name (ignoring case) that still await promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingGroup {
    /// Name as first seen in the raw list
    pub name: String,
    /// Union of the group's units
    pub units: Vec<String>,
    /// Number of raw records in the group
    pub records: usize,
}

/// Returns the raw list, or only the records not yet promoted.
pub async fn list_raw_medicines(
    raw: &RawMedicineStore,
    pending_only: bool,
) -> Result<Vec<RawMedicine>> {
    let mut records = raw.load().await?;
    if pending_only {
        records.retain(|record| !record.edited);
    }
    Ok(records)
}

/// Groups unpromoted raw records by name, skipping names that are already valid names.
///
/// Groups keep the order in which their names first appear in the raw list.
pub async fn pending_groups(
    db: &DatabaseConnection,
    raw: &RawMedicineStore,
) -> Result<Vec<PendingGroup>> {
    let valid: HashSet<String> = ValidName::find()
        .all(db)
        .await?
        .into_iter()
        .map(|model| model.name_key)
        .collect();

    let mut groups: Vec<PendingGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in raw.load().await? {
        let key = name_key(&record.name);
        if record.edited || key.is_empty() || valid.contains(&key) {
            continue;
        }
        match index.get(&key) {
            Some(&at) => {
                let group = &mut groups[at];
                group.units = merge_units(&group.units, &record.units);
                group.records += 1;
            }
            None => {
                index.insert(key, groups.len());
                groups.push(PendingGroup {
                    name: record.name.trim().to_string(),
                    units: record.units,
                    records: 1,
                });
            }
        }
    }
    Ok(groups)
}

/// Replaces the whole raw list.
///
/// Every record flagged `edited` whose target name (its `correctedname`, else its
/// `name`) is not yet a valid name gets one, carrying the record's units.
/// Returns the full valid name list afterwards.
pub async fn replace_raw_medicines(
    db: &DatabaseConnection,
    raw: &RawMedicineStore,
    records: Vec<RawMedicine>,
) -> Result<Vec<ValidNameView>> {
    let mut batch = raw.begin().await?;

    for record in records.iter().filter(|record| record.edited) {
        let target = record
            .correctedname
            .as_deref()
            .and_then(normalize_name)
            .or_else(|| normalize_name(&record.name));
        let Some(target) = target else {
            continue;
        };

        match valid_name::insert_valid_name(db, target, record.units.clone()).await {
            Ok(created) => info!("Created valid name {} from edited raw record", created.name),
            Err(Error::DuplicateName { name }) => debug!("Valid name {} already exists", name),
            Err(e) => return Err(e),
        }
    }

    batch.records = records;
    let count = batch.records.len();
    batch.commit().await?;
    info!("Replaced raw medicine list ({} records)", count);

    valid_name::list_valid_names(db, None).await
}
