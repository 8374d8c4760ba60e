use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::SheetError;
use crate::models::module::ModuleKind;
use crate::models::sheet::{Sheet, SheetCollection};
use crate::models::user::Principal;
use crate::stores::sheet_store::SheetStore;

/// Id and name of a sheet, as listed on `GET /api/fiches`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub id: u32,
    #[serde(rename = "nom")]
    pub name: String,
}

/// Sheet operations scoped to the connected principal.
///
/// Every call takes the principal explicitly. Without one the call fails
/// with `NotAuthenticated` before touching any collection. Another user's
/// sheet id is reported exactly like a missing one.
pub struct SheetService {
    store: Arc<SheetStore>,
}

impl SheetService {
    pub fn new(store: Arc<SheetStore>) -> Self {
        Self { store }
    }

    pub fn list(&self, principal: Option<&Principal>) -> Result<Vec<SheetSummary>, SheetError> {
        let owner = owner_of(principal)?;
        let summaries = self.store.read(owner, |sheets| {
            sheets
                .sheets()
                .iter()
                .map(|sheet| SheetSummary {
                    id: sheet.id,
                    name: sheet.name.clone(),
                })
                .collect()
        })?;
        Ok(summaries)
    }

    pub fn create(
        &self,
        principal: Option<&Principal>,
        name: &str,
    ) -> Result<SheetSummary, SheetError> {
        let owner = owner_of(principal)?;
        if name.is_empty() {
            return Err(SheetError::invalid("Nom requis"));
        }

        let summary = self.store.mutate(owner, |sheets| {
            let sheet = sheets.create(name);
            Ok::<_, SheetError>(SheetSummary {
                id: sheet.id,
                name: sheet.name.clone(),
            })
        })?;

        info!(user_id = owner, sheet_id = summary.id, "Sheet created");
        Ok(summary)
    }

    pub fn get(&self, principal: Option<&Principal>, id: u32) -> Result<Sheet, SheetError> {
        let owner = owner_of(principal)?;
        self.store
            .read(owner, |sheets| sheets.get(id).cloned())?
            .ok_or_else(SheetError::sheet_not_found)
    }

    pub fn delete(&self, principal: Option<&Principal>, id: u32) -> Result<(), SheetError> {
        let owner = owner_of(principal)?;
        self.store.mutate(owner, |sheets: &mut SheetCollection| {
            if sheets.delete(id) {
                Ok(())
            } else {
                Err(SheetError::sheet_not_found())
            }
        })?;

        info!(user_id = owner, sheet_id = id, "Sheet deleted");
        Ok(())
    }

    pub fn set_portrait(
        &self,
        principal: Option<&Principal>,
        id: u32,
        image: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            sheet.set_portrait_image(image);
            Ok(())
        })
    }

    pub fn set_biography(
        &self,
        principal: Option<&Principal>,
        id: u32,
        text: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            sheet.set_biography_text(text);
            Ok(())
        })
    }

    /// Returns the id given to the new statistic.
    pub fn add_statistic(
        &self,
        principal: Option<&Principal>,
        id: u32,
        name: &str,
        value: i32,
    ) -> Result<u32, SheetError> {
        self.with_sheet(principal, id, |sheet| Ok(sheet.statistics.add(name, value)))
    }

    pub fn update_statistic(
        &self,
        principal: Option<&Principal>,
        id: u32,
        stat_id: u32,
        name: &str,
        value: i32,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            found(sheet.statistics.update(stat_id, name, value), STAT_NOT_FOUND)
        })
    }

    pub fn remove_statistic(
        &self,
        principal: Option<&Principal>,
        id: u32,
        stat_id: u32,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            found(sheet.statistics.remove(stat_id), STAT_NOT_FOUND)
        })
    }

    pub fn add_skill(
        &self,
        principal: Option<&Principal>,
        id: u32,
        name: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            sheet.skills.add(name);
            Ok(())
        })
    }

    pub fn rename_skill(
        &self,
        principal: Option<&Principal>,
        id: u32,
        old: &str,
        new: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            found(sheet.skills.rename(old, new), SKILL_NOT_FOUND)
        })
    }

    pub fn remove_skill(
        &self,
        principal: Option<&Principal>,
        id: u32,
        name: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            found(sheet.skills.remove(name), SKILL_NOT_FOUND)
        })
    }

    pub fn add_equipment(
        &self,
        principal: Option<&Principal>,
        id: u32,
        name: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            sheet.equipment.add(name);
            Ok(())
        })
    }

    pub fn rename_equipment(
        &self,
        principal: Option<&Principal>,
        id: u32,
        old: &str,
        new: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            found(sheet.equipment.rename(old, new), EQUIPMENT_NOT_FOUND)
        })
    }

    pub fn remove_equipment(
        &self,
        principal: Option<&Principal>,
        id: u32,
        name: &str,
    ) -> Result<(), SheetError> {
        self.with_sheet(principal, id, |sheet| {
            found(sheet.equipment.remove(name), EQUIPMENT_NOT_FOUND)
        })
    }

    /// `module` is matched case-insensitively against the five module names.
    pub fn set_module_position(
        &self,
        principal: Option<&Principal>,
        id: u32,
        module: &str,
        x: i32,
        y: i32,
    ) -> Result<(), SheetError> {
        let kind = module_kind(module)?;
        self.with_sheet(principal, id, |sheet| {
            sheet.set_module_position(kind, x, y);
            Ok(())
        })
    }

    pub fn set_module_size(
        &self,
        principal: Option<&Principal>,
        id: u32,
        module: &str,
        width: i32,
        height: i32,
    ) -> Result<(), SheetError> {
        let kind = module_kind(module)?;
        self.with_sheet(principal, id, |sheet| {
            sheet.set_module_size(kind, width, height);
            Ok(())
        })
    }

    /// Apply `f` to one of the principal's sheets and persist on success.
    fn with_sheet<T>(
        &self,
        principal: Option<&Principal>,
        id: u32,
        f: impl FnOnce(&mut Sheet) -> Result<T, SheetError>,
    ) -> Result<T, SheetError> {
        let owner = owner_of(principal)?;
        let value = self.store.mutate(owner, |sheets| {
            let sheet = sheets.get_mut(id).ok_or_else(SheetError::sheet_not_found)?;
            f(sheet)
        })?;

        debug!(user_id = owner, sheet_id = id, "Sheet updated");
        Ok(value)
    }
}

const STAT_NOT_FOUND: &str = "Statistique non trouvee";
const SKILL_NOT_FOUND: &str = "Competence non trouvee";
const EQUIPMENT_NOT_FOUND: &str = "Equipement non trouve";

fn owner_of(principal: Option<&Principal>) -> Result<u32, SheetError> {
    principal
        .map(|principal| principal.id)
        .ok_or(SheetError::NotAuthenticated)
}

fn module_kind(name: &str) -> Result<ModuleKind, SheetError> {
    ModuleKind::from_name(name).ok_or_else(|| SheetError::UnknownModule(name.to_string()))
}

fn found(hit: bool, what: &str) -> Result<(), SheetError> {
    if hit {
        Ok(())
    } else {
        Err(SheetError::NotFound(what.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::module::{Layout, Statistic};
    use crate::persistence::sheet_file::SheetFile;
    use tempfile::TempDir;

    fn service_in(temp_dir: &TempDir) -> SheetService {
        SheetService::new(Arc::new(SheetStore::new(SheetFile::new(temp_dir.path()))))
    }

    fn alice() -> Principal {
        Principal {
            id: 1,
            name: "Alice".to_string(),
        }
    }

    fn bob() -> Principal {
        Principal {
            id: 2,
            name: "Bob".to_string(),
        }
    }

    #[test]
    fn test_unauthenticated_calls_fail_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);

        assert!(matches!(service.list(None), Err(SheetError::NotAuthenticated)));
        assert!(matches!(service.create(None, "Hero"), Err(SheetError::NotAuthenticated)));
        assert!(matches!(service.get(None, 1), Err(SheetError::NotAuthenticated)));
        assert!(matches!(service.delete(None, 1), Err(SheetError::NotAuthenticated)));
        assert!(matches!(
            service.add_statistic(None, 1, "Force", 18),
            Err(SheetError::NotAuthenticated)
        ));
        assert!(matches!(
            service.set_module_position(None, 1, "portrait", 1, 1),
            Err(SheetError::NotAuthenticated)
        ));

        assert!(service.store.is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();

        let first = service.create(Some(&p), "Hero").unwrap();
        let second = service.create(Some(&p), "Villain").unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let listed = service.list(Some(&p)).unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[test]
    fn test_create_requires_name() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let result = service.create(Some(&alice()), "");
        assert!(matches!(result, Err(SheetError::InvalidInput(_))));
    }

    #[test]
    fn test_delete_middle_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();
        for name in ["A", "B", "C"] {
            service.create(Some(&p), name).unwrap();
        }

        service.delete(Some(&p), 2).unwrap();
        let ids: Vec<u32> = service.list(Some(&p)).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let next = service.create(Some(&p), "D").unwrap();
        assert_eq!(next.id, 3);

        assert!(matches!(service.delete(Some(&p), 2), Err(SheetError::NotFound(_))));
    }

    #[test]
    fn test_other_users_sheets_are_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let sheet = service.create(Some(&alice()), "Hero").unwrap();

        assert!(matches!(
            service.get(Some(&bob()), sheet.id),
            Err(SheetError::NotFound(_))
        ));
        assert!(matches!(
            service.set_portrait(Some(&bob()), sheet.id, "x.png"),
            Err(SheetError::NotFound(_))
        ));
        assert!(service.get(Some(&alice()), sheet.id).unwrap().portrait.image_path.is_empty());
    }

    #[test]
    fn test_portrait_and_biography() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();
        service.create(Some(&p), "Hero").unwrap();

        service.set_portrait(Some(&p), 1, "hero.png").unwrap();
        service.set_biography(Some(&p), 1, "Born in a small village").unwrap();

        let sheet = service.get(Some(&p), 1).unwrap();
        assert_eq!(sheet.portrait.image_path, "hero.png");
        assert_eq!(sheet.biography.text, "Born in a small village");
        assert!(matches!(
            service.set_biography(Some(&p), 9, "x"),
            Err(SheetError::NotFound(_))
        ));
    }

    #[test]
    fn test_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();
        service.create(Some(&p), "Hero").unwrap();

        assert_eq!(service.add_statistic(Some(&p), 1, "Force", 18).unwrap(), 1);
        assert_eq!(service.add_statistic(Some(&p), 1, "Agilite", 12).unwrap(), 2);
        service.update_statistic(Some(&p), 1, 2, "Dexterite", 14).unwrap();
        service.remove_statistic(Some(&p), 1, 1).unwrap();

        let sheet = service.get(Some(&p), 1).unwrap();
        assert_eq!(
            sheet.statistics.entries(),
            &[Statistic {
                id: 2,
                name: "Dexterite".to_string(),
                value: 14
            }]
        );
        assert!(matches!(
            service.update_statistic(Some(&p), 1, 7, "X", 1),
            Err(SheetError::NotFound(_))
        ));
        assert!(matches!(
            service.remove_statistic(Some(&p), 1, 1),
            Err(SheetError::NotFound(_))
        ));
    }

    #[test]
    fn test_skills_and_equipment() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();
        service.create(Some(&p), "Hero").unwrap();

        service.add_skill(Some(&p), 1, "Crochetage").unwrap();
        service.add_skill(Some(&p), 1, "Crochetage").unwrap();
        service.rename_skill(Some(&p), 1, "Crochetage", "Discretion").unwrap();
        service.add_equipment(Some(&p), 1, "Epee").unwrap();
        service.add_equipment(Some(&p), 1, "Bouclier").unwrap();
        service.remove_equipment(Some(&p), 1, "Epee").unwrap();
        service.rename_equipment(Some(&p), 1, "Bouclier", "Grand bouclier").unwrap();

        let sheet = service.get(Some(&p), 1).unwrap();
        assert_eq!(sheet.skills.items(), &["Discretion", "Crochetage"]);
        assert_eq!(sheet.equipment.items(), &["Grand bouclier"]);

        assert!(matches!(
            service.remove_skill(Some(&p), 1, "Vol"),
            Err(SheetError::NotFound(_))
        ));
        assert!(matches!(
            service.rename_equipment(Some(&p), 1, "Epee", "Hache"),
            Err(SheetError::NotFound(_))
        ));
        service.remove_skill(Some(&p), 1, "Crochetage").unwrap();
        assert_eq!(service.get(Some(&p), 1).unwrap().skills.items(), &["Discretion"]);
    }

    #[test]
    fn test_module_position_changes_only_that_module() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();
        service.create(Some(&p), "Hero").unwrap();
        let before = service.get(Some(&p), 1).unwrap();

        service.set_module_position(Some(&p), 1, "Portrait", 50, 60).unwrap();

        let after = service.get(Some(&p), 1).unwrap();
        assert_eq!(after.portrait.layout, Layout::new(50, 60, 200, 200));
        for kind in [
            ModuleKind::Biography,
            ModuleKind::Statistics,
            ModuleKind::Skills,
            ModuleKind::Equipment,
        ] {
            assert_eq!(after.layout(kind), before.layout(kind));
        }
    }

    #[test]
    fn test_unknown_module_leaves_state() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        let p = alice();
        service.create(Some(&p), "Hero").unwrap();
        let before = service.get(Some(&p), 1).unwrap();

        assert!(matches!(
            service.set_module_size(Some(&p), 1, "inventaire", 10, 10),
            Err(SheetError::UnknownModule(_))
        ));
        assert_eq!(service.get(Some(&p), 1).unwrap(), before);
    }

    #[test]
    fn test_module_size_on_missing_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_in(&temp_dir);
        assert!(matches!(
            service.set_module_size(Some(&alice()), 4, "equipement", 10, 10),
            Err(SheetError::NotFound(_))
        ));
    }

    #[test]
    fn test_statistic_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let p = alice();
        {
            let service = service_in(&temp_dir);
            service.create(Some(&p), "Hero").unwrap();
            service.add_statistic(Some(&p), 1, "Force", 18).unwrap();
        }

        let reloaded = service_in(&temp_dir);
        let sheet = reloaded.get(Some(&p), 1).unwrap();
        assert_eq!(sheet.name, "Hero");
        assert_eq!(
            sheet.statistics.entries(),
            &[Statistic {
                id: 1,
                name: "Force".to_string(),
                value: 18
            }]
        );
    }

    #[test]
    fn test_multiline_text_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let p = alice();
        {
            let service = service_in(&temp_dir);
            service.create(Some(&p), "Hero").unwrap();
            service.create(Some(&p), "Mage\nFICHE").unwrap();
            service.set_biography(Some(&p), 1, "Ligne un\nLigne deux").unwrap();
            service.add_skill(Some(&p), 2, "Feu\r\nGlace").unwrap();
        }

        let reloaded = service_in(&temp_dir);
        let names: Vec<String> = reloaded
            .list(Some(&p))
            .unwrap()
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, vec!["Hero".to_string(), "Mage\nFICHE".to_string()]);
        assert_eq!(
            reloaded.get(Some(&p), 1).unwrap().biography.text,
            "Ligne un\nLigne deux"
        );
        assert_eq!(reloaded.get(Some(&p), 2).unwrap().skills.items(), &["Feu\r\nGlace"]);
    }
}
