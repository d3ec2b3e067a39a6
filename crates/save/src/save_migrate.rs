// ---------------------------------------------------------------------------
// Save migration logic
// ---------------------------------------------------------------------------
//
// Concrete migration steps plus `migrate_save_with_report()`, used by the
// load pipeline right after a record is decoded.

use bevy::prelude::*;

use crate::save_error::SaveError;
use crate::save_migrate_registry::{MigrationRegistry, MigrationReport, MigrationStep};
use crate::save_types::{SaveRecord, CURRENT_SAVE_VERSION};

pub(crate) fn build_migration_registry() -> MigrationRegistry {
    let steps = vec![
        // v0 -> v1: unversioned records; fields already match the v1 layout.
        MigrationStep {
            from_version: 0,
            description: "Unversioned record -> v1 baseline",
            migrate_fn: |_record| {},
        },
        // v1 -> v2: extension map introduced; repair out-of-range values
        // that older builds could write.
        MigrationStep {
            from_version: 1,
            description: "Clamp player stats to maxima, truncate mismatched parallel arrays",
            migrate_fn: clamp_and_truncate,
        },
    ];
    MigrationRegistry::new(steps, CURRENT_SAVE_VERSION)
}

fn clamp_and_truncate(record: &mut SaveRecord) {
    let status = &mut record.status;
    status.health = status.health.clamp(0, status.max_health.max(0));
    status.energy = status.energy.clamp(0.0, status.max_energy.max(0.0));

    let currency = &mut record.currency;
    currency.currency = currency.currency.clamp(0, currency.max_currency.max(0));

    let progression = &mut record.progression;
    let len = progression.len();
    progression.ids.truncate(len);
    progression.serialized_states.truncate(len);

    let inventory = &mut record.inventory;
    let len = inventory.item_names.len().min(inventory.item_counts.len());
    inventory.item_names.truncate(len);
    inventory.item_counts.truncate(len);
}

/// Migrate a record to `CURRENT_SAVE_VERSION`, logging every applied step.
pub fn migrate_save_with_report(record: &mut SaveRecord) -> Result<MigrationReport, SaveError> {
    let report = build_migration_registry().migrate(record)?;
    if report.steps_applied > 0 {
        info!(
            "Migrated save from v{} to v{} ({} steps applied)",
            report.original_version, report.final_version, report.steps_applied,
        );
        for desc in &report.step_descriptions {
            info!("  - {desc}");
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_clamps_overfull_stats() {
        let mut record = SaveRecord {
            version: 1,
            ..SaveRecord::default()
        };
        record.status.health = 250;
        record.status.energy = -5.0;
        record.currency.currency = 9_000;

        migrate_save_with_report(&mut record).unwrap();

        assert_eq!(record.status.health, record.status.max_health);
        assert_eq!(record.status.energy, 0.0);
        assert_eq!(record.currency.currency, record.currency.max_currency);
    }

    #[test]
    fn test_v1_truncates_mismatched_arrays() {
        let mut record = SaveRecord {
            version: 1,
            ..SaveRecord::default()
        };
        record.progression.ids = vec![1, 2, 3];
        record.progression.serialized_states = vec!["a".to_string()];
        record.inventory.item_names = vec!["Berry".to_string()];
        record.inventory.item_counts = vec![3, 4];

        migrate_save_with_report(&mut record).unwrap();

        assert_eq!(record.progression.ids, vec![1]);
        assert!(!record.progression.is_mismatched());
        assert_eq!(record.inventory.item_counts, vec![3]);
    }

    #[test]
    fn test_current_version_untouched() {
        let mut record = SaveRecord::default();
        record.progression.ids = vec![1, 2];
        record.progression.serialized_states = vec!["a".to_string()];

        let report = migrate_save_with_report(&mut record).unwrap();

        assert_eq!(report.steps_applied, 0);
        assert_eq!(record.progression.ids.len(), 2);
    }
}
