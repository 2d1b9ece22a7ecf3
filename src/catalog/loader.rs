//! Load catalog overrides from TOML files

use std::fs;
use std::path::Path;

use crate::catalog::schema::{ActionOverride, CatalogFile};
use crate::catalog::{ActionCatalog, ActionId};
use crate::core::error::CatalogError;
use crate::timing::to_base_units;

impl ActionCatalog {
    /// Build a catalog from the built-in defaults plus a TOML override file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build a catalog from the built-in defaults plus override TOML text
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Self::builtin();
        for (name, overrides) in &file.actions {
            let id = ActionId::from_name(name)
                .ok_or_else(|| CatalogError::UnknownAction(name.clone()))?;
            catalog.apply_override(id, overrides)?;
        }
        Ok(catalog)
    }

    fn apply_override(
        &mut self,
        id: ActionId,
        overrides: &ActionOverride,
    ) -> Result<(), CatalogError> {
        // Built-in entries cover every id, so the lookup cannot miss.
        let mut def = self
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownAction(id.name().to_string()))?;

        if let Some(ms) = overrides.duration_ms {
            def.duration = to_base_units(ms)?;
        }
        if let Some(cost) = overrides.stamina_cost {
            def.stamina_cost = cost;
        }
        if let Some(factor) = overrides.damage_factor {
            def.damage_factor = factor;
        }
        if let Some(cancellable) = overrides.cancellable_commit {
            def.cancellable_commit = cancellable;
        }
        if let Some(penalty) = overrides.cancel_penalty {
            def.cancel_penalty = penalty;
        }
        if let Some(restore) = overrides.stamina_restore {
            def.stamina_restore = restore;
        }
        if let Some(restore) = overrides.guard_restore {
            def.guard_restore = restore;
        }

        self.insert(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_merge_onto_builtin() {
        let catalog = ActionCatalog::from_toml(
            r#"
            [actions.quick_attack]
            duration_ms = 700
            stamina_cost = 12

            [actions.block]
            stamina_cost = 8
            "#,
        )
        .unwrap();

        let quick = catalog.get(ActionId::QuickAttack).unwrap();
        assert_eq!(quick.duration, 70);
        assert_eq!(quick.stamina_cost, 12);
        // Untouched fields keep their defaults
        assert!(quick.cancellable_commit);

        let block = catalog.get(ActionId::Block).unwrap();
        assert_eq!(block.stamina_cost, 8);
        assert_eq!(block.duration, 100);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = ActionCatalog::from_toml(
            r#"
            [actions.spinning_backfist]
            stamina_cost = 1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownAction(_)));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = ActionCatalog::from_toml(
            r#"
            [actions.evade]
            duration_ms = 5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::ZeroDuration(ActionId::Evade)));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = ActionCatalog::from_toml(
            r#"
            [actions.evade]
            duration_ms = -100
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Timing(_)));
    }
}
