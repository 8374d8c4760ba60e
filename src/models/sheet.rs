use crate::models::module::{Biography, Layout, ModuleKind, Portrait, StatisticBlock, TextList};

/// A character sheet. Always carries exactly one module of each kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub id: u32,
    pub name: String,
    pub portrait: Portrait,
    pub biography: Biography,
    pub statistics: StatisticBlock,
    pub skills: TextList,
    pub equipment: TextList,
}

impl Sheet {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            portrait: Portrait {
                layout: ModuleKind::Portrait.default_layout(),
                image_path: String::new(),
            },
            biography: Biography {
                layout: ModuleKind::Biography.default_layout(),
                text: String::new(),
            },
            statistics: StatisticBlock::new(ModuleKind::Statistics.default_layout()),
            skills: TextList::new(ModuleKind::Skills.default_layout()),
            equipment: TextList::new(ModuleKind::Equipment.default_layout()),
        }
    }

    pub fn set_portrait_image(&mut self, path: impl Into<String>) {
        self.portrait.image_path = path.into();
    }

    pub fn set_biography_text(&mut self, text: impl Into<String>) {
        self.biography.text = text.into();
    }

    pub fn layout(&self, kind: ModuleKind) -> &Layout {
        match kind {
            ModuleKind::Portrait => &self.portrait.layout,
            ModuleKind::Biography => &self.biography.layout,
            ModuleKind::Statistics => &self.statistics.layout,
            ModuleKind::Skills => &self.skills.layout,
            ModuleKind::Equipment => &self.equipment.layout,
        }
    }

    fn layout_mut(&mut self, kind: ModuleKind) -> &mut Layout {
        match kind {
            ModuleKind::Portrait => &mut self.portrait.layout,
            ModuleKind::Biography => &mut self.biography.layout,
            ModuleKind::Statistics => &mut self.statistics.layout,
            ModuleKind::Skills => &mut self.skills.layout,
            ModuleKind::Equipment => &mut self.equipment.layout,
        }
    }

    pub fn set_module_position(&mut self, kind: ModuleKind, x: i32, y: i32) {
        self.layout_mut(kind).move_to(x, y);
    }

    pub fn set_module_size(&mut self, kind: ModuleKind, width: i32, height: i32) {
        self.layout_mut(kind).resize(width, height);
    }
}

/// All sheets owned by one user, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetCollection {
    sheets: Vec<Sheet>,
}

impl SheetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Create a sheet with id `count + 1`.
    ///
    /// Ids are not reserved: deleting sheet 2 of {1, 2, 3} and creating a new
    /// sheet yields a second sheet with id 3. Lookups return the first match.
    pub fn create(&mut self, name: impl Into<String>) -> &Sheet {
        let id = self.sheets.len() as u32 + 1;
        self.sheets.push(Sheet::new(id, name));
        &self.sheets[self.sheets.len() - 1]
    }

    pub fn get(&self, id: u32) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|sheet| sheet.id == id)
    }

    pub fn delete(&mut self, id: u32) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|sheet| sheet.id != id);
        self.sheets.len() != before
    }
}
