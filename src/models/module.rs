use serde::Serialize;

/// Position and size of a module on the sheet canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    #[serde(rename = "posX")]
    pub x: i32,
    #[serde(rename = "posY")]
    pub y: i32,
    #[serde(rename = "largeur")]
    pub width: i32,
    #[serde(rename = "hauteur")]
    pub height: i32,
}

impl Layout {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }
}

/// The five module kinds every sheet carries exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Portrait,
    Biography,
    Statistics,
    Skills,
    Equipment,
}

impl ModuleKind {
    /// Resolve a client-supplied module name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "portrait" => Some(ModuleKind::Portrait),
            "biographie" => Some(ModuleKind::Biography),
            "statistiques" => Some(ModuleKind::Statistics),
            "competence" => Some(ModuleKind::Skills),
            "equipement" => Some(ModuleKind::Equipment),
            _ => None,
        }
    }

    /// Layout given to a freshly created sheet. Existing saved layouts depend on these values.
    pub fn default_layout(self) -> Layout {
        match self {
            ModuleKind::Portrait => Layout::new(0, 0, 200, 200),
            ModuleKind::Biography => Layout::new(0, 200, 400, 200),
            ModuleKind::Statistics => Layout::new(200, 0, 300, 200),
            ModuleKind::Skills => Layout::new(0, 400, 300, 200),
            ModuleKind::Equipment => Layout::new(300, 400, 300, 200),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portrait {
    pub layout: Layout,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Biography {
    pub layout: Layout,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistic {
    pub id: u32,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "valeur")]
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticBlock {
    pub layout: Layout,
    entries: Vec<Statistic>,
}

impl StatisticBlock {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Statistic] {
        &self.entries
    }

    /// Append a statistic and return its id.
    ///
    /// Ids are `count + 1`, so after a removal a new entry can take the id of
    /// an entry that still exists. Lookups resolve to the first match.
    pub fn add(&mut self, name: impl Into<String>, value: i32) -> u32 {
        let id = self.entries.len() as u32 + 1;
        self.entries.push(Statistic {
            id,
            name: name.into(),
            value,
        });
        id
    }

    /// Re-insert a statistic read back from storage, keeping its id.
    pub fn restore(&mut self, stat: Statistic) {
        self.entries.push(stat);
    }

    pub fn update(&mut self, id: u32, name: impl Into<String>, value: i32) -> bool {
        match self.entries.iter_mut().find(|stat| stat.id == id) {
            Some(stat) => {
                stat.name = name.into();
                stat.value = value;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|stat| stat.id != id);
        self.entries.len() != before
    }
}

/// Ordered list of free-text entries (skills, equipment). Duplicates allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct TextList {
    pub layout: Layout,
    items: Vec<String>,
}

impl TextList {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn add(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Rename the first entry equal to `old`.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.items.iter_mut().find(|item| item.as_str() == old) {
            Some(item) => {
                *item = new.into();
                true
            }
            None => false,
        }
    }

    /// Remove the first entry equal to `item`.
    pub fn remove(&mut self, item: &str) -> bool {
        match self.items.iter().position(|existing| existing == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(ModuleKind::from_name("Portrait"), Some(ModuleKind::Portrait));
        assert_eq!(ModuleKind::from_name("BIOGRAPHIE"), Some(ModuleKind::Biography));
        assert_eq!(ModuleKind::from_name("statistiques"), Some(ModuleKind::Statistics));
        assert_eq!(ModuleKind::from_name("Competence"), Some(ModuleKind::Skills));
        assert_eq!(ModuleKind::from_name("equipement"), Some(ModuleKind::Equipment));
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(ModuleKind::from_name("competences"), None);
        assert_eq!(ModuleKind::from_name("inventaire"), None);
        assert_eq!(ModuleKind::from_name(""), None);
    }

    #[test]
    fn test_statistic_ids_are_count_based() {
        let mut block = StatisticBlock::new(ModuleKind::Statistics.default_layout());
        assert_eq!(block.add("Force", 18), 1);
        assert_eq!(block.add("Agilite", 14), 2);
        assert_eq!(block.add("Intelligence", 10), 3);

        assert!(block.remove(1));
        // Two entries left, so the next id is 3 again.
        assert_eq!(block.add("Charisme", 8), 3);
        let ids: Vec<u32> = block.entries().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 3]);
    }

    #[test]
    fn test_statistic_update_and_remove_missing() {
        let mut block = StatisticBlock::new(ModuleKind::Statistics.default_layout());
        block.add("Force", 18);
        assert!(block.update(1, "Force", 20));
        assert_eq!(block.entries()[0].value, 20);
        assert!(!block.update(9, "X", 1));
        assert!(!block.remove(9));
        assert_eq!(block.entries().len(), 1);
    }

    #[test]
    fn test_text_list_first_match_semantics() {
        let mut list = TextList::new(ModuleKind::Skills.default_layout());
        list.add("Furtivite");
        list.add("Combat");
        list.add("Furtivite");

        assert!(list.rename("Furtivite", "Discretion"));
        assert_eq!(list.items(), ["Discretion", "Combat", "Furtivite"]);

        assert!(list.remove("Furtivite"));
        assert_eq!(list.items(), ["Discretion", "Combat"]);

        assert!(!list.remove("Absent"));
        assert!(!list.rename("Absent", "X"));
    }

    #[test]
    fn test_layout_mutators() {
        let mut layout = ModuleKind::Portrait.default_layout();
        layout.move_to(50, 60);
        layout.resize(250, 260);
        assert_eq!(layout, Layout::new(50, 60, 250, 260));
    }
}
