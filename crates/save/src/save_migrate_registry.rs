// ---------------------------------------------------------------------------
// Save migration registry: structured, validated migration chain
// ---------------------------------------------------------------------------
//
// Each migration step is a function `fn(&mut SaveRecord)` that transforms a
// record from version N to version N+1. The registry validates at
// construction time that the chain is contiguous (no gaps, no duplicates).

use std::collections::HashSet;

use crate::save_error::SaveError;
use crate::save_types::SaveRecord;

/// A single migration step: transforms a record from `from_version` to `from_version + 1`.
pub(crate) struct MigrationStep {
    pub from_version: u32,
    pub description: &'static str,
    pub migrate_fn: fn(&mut SaveRecord),
}

/// Result of running the migration chain on a record.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub original_version: u32,
    pub final_version: u32,
    pub steps_applied: u32,
    /// Descriptions of each applied step, in order.
    pub step_descriptions: Vec<&'static str>,
}

/// Registry holding an ordered, validated chain of migration steps.
pub(crate) struct MigrationRegistry {
    steps: Vec<MigrationStep>,
    current_version: u32,
}

impl MigrationRegistry {
    /// Build a registry from a list of migration steps.
    ///
    /// # Panics
    ///
    /// Panics if the chain has duplicate source versions or does not cover
    /// every transition from v0 to `current_version`.
    pub fn new(mut steps: Vec<MigrationStep>, current_version: u32) -> Self {
        let mut seen = HashSet::new();
        if let Some(dup) = steps.iter().find(|s| !seen.insert(s.from_version)) {
            panic!("Duplicate migration step for version {}", dup.from_version);
        }
        if let Some(gap) = (0..current_version).find(|v| !seen.contains(v)) {
            panic!(
                "Missing migration step from v{gap} to v{}; chain must reach v{current_version}",
                gap + 1
            );
        }

        steps.sort_by_key(|s| s.from_version);
        steps.truncate(current_version as usize);

        Self {
            steps,
            current_version,
        }
    }

    /// Bring a record from its version up to `current_version`.
    ///
    /// # Errors
    ///
    /// `SaveError::VersionMismatch` if the record was written by a newer
    /// build.
    pub fn migrate(&self, record: &mut SaveRecord) -> Result<MigrationReport, SaveError> {
        let original_version = record.version;
        if original_version > self.current_version {
            return Err(SaveError::VersionMismatch {
                expected_max: self.current_version,
                found: original_version,
            });
        }

        // Steps are sorted and contiguous from v0, so step N upgrades vN.
        let pending = &self.steps[original_version as usize..];
        for step in pending {
            (step.migrate_fn)(record);
            record.version = step.from_version + 1;
        }

        Ok(MigrationReport {
            original_version,
            final_version: record.version,
            steps_applied: pending.len() as u32,
            step_descriptions: pending.iter().map(|s| s.description).collect(),
        })
    }

    #[cfg(test)]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_migrate::build_migration_registry;
    use crate::save_types::CURRENT_SAVE_VERSION;

    fn record_at(version: u32) -> SaveRecord {
        SaveRecord {
            version,
            ..SaveRecord::default()
        }
    }

    #[test]
    fn test_registry_step_count_matches_current_version() {
        let registry = build_migration_registry();
        assert_eq!(registry.step_count() as u32, CURRENT_SAVE_VERSION);
    }

    #[test]
    fn test_registry_rejects_future_version() {
        let registry = build_migration_registry();
        let mut record = record_at(CURRENT_SAVE_VERSION + 1);
        assert!(matches!(
            registry.migrate(&mut record),
            Err(SaveError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_registry_noop_for_current_version() {
        let registry = build_migration_registry();
        let mut record = record_at(CURRENT_SAVE_VERSION);
        let report = registry.migrate(&mut record).unwrap();
        assert_eq!(report.steps_applied, 0);
        assert!(report.step_descriptions.is_empty());
    }

    #[test]
    fn test_registry_migrates_from_v0() {
        let registry = build_migration_registry();
        let mut record = record_at(0);
        let report = registry.migrate(&mut record).unwrap();
        assert_eq!(report.original_version, 0);
        assert_eq!(report.final_version, CURRENT_SAVE_VERSION);
        assert_eq!(report.steps_applied, CURRENT_SAVE_VERSION);
        assert_eq!(record.version, CURRENT_SAVE_VERSION);
    }

    #[test]
    #[should_panic(expected = "Duplicate migration step")]
    fn test_registry_rejects_duplicate_steps() {
        let steps = vec![
            MigrationStep {
                from_version: 0,
                description: "a",
                migrate_fn: |_| {},
            },
            MigrationStep {
                from_version: 0,
                description: "b",
                migrate_fn: |_| {},
            },
        ];
        MigrationRegistry::new(steps, 1);
    }

    #[test]
    #[should_panic(expected = "Missing migration step")]
    fn test_registry_rejects_gaps() {
        let steps = vec![MigrationStep {
            from_version: 1,
            description: "v1 -> v2",
            migrate_fn: |_| {},
        }];
        MigrationRegistry::new(steps, 2);
    }
}
