use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::models::module::{Layout, Statistic};
use crate::models::sheet::{Sheet, SheetCollection};

const SEPARATOR: &str = "---";

/// One line of a sheet file.
///
/// Fields are separated by `;`, and a value containing `;` is cut at the
/// first `;` when read back. Line breaks and backslashes in text are written
/// as `\n`, `\r` and `\\` so every record stays on one line.
#[derive(Debug, Clone, PartialEq)]
enum SheetRecord {
    Sheet { id: u32, name: String },
    Portrait { layout: Layout, image_path: String },
    Biography { layout: Layout, text: String },
    Statistics { layout: Layout },
    Stat(Statistic),
    Skills { layout: Layout },
    Skill(String),
    Equipment { layout: Layout },
    Item(String),
}

impl SheetRecord {
    fn to_line(&self) -> String {
        match self {
            SheetRecord::Sheet { id, name } => format!("FICHE;{};{}", id, escape(name)),
            SheetRecord::Portrait { layout, image_path } => {
                format!("PORTRAIT;{};{}", layout_fields(layout), escape(image_path))
            }
            SheetRecord::Biography { layout, text } => {
                format!("BIOGRAPHIE;{};{}", layout_fields(layout), escape(text))
            }
            SheetRecord::Statistics { layout } => format!("STATISTIQUES;{}", layout_fields(layout)),
            SheetRecord::Stat(stat) => {
                format!("STAT;{};{};{}", stat.id, escape(&stat.name), stat.value)
            }
            SheetRecord::Skills { layout } => format!("COMPETENCES;{}", layout_fields(layout)),
            SheetRecord::Skill(name) => format!("COMP;{}", escape(name)),
            SheetRecord::Equipment { layout } => format!("EQUIPEMENTS;{}", layout_fields(layout)),
            SheetRecord::Item(name) => format!("EQUIP;{}", escape(name)),
        }
    }

    /// Parse a line. Unknown tags yield `Ok(None)`.
    fn from_line(line: &str) -> Result<Option<Self>> {
        let parts: Vec<&str> = line.split(';').collect();

        let record = match parts[0] {
            "FICHE" => SheetRecord::Sheet {
                id: parse_int(&parts, 1, "sheet id")?,
                name: unescape(field(&parts, 2, "sheet name")?),
            },
            "PORTRAIT" => SheetRecord::Portrait {
                layout: parse_layout(&parts)?,
                image_path: unescape(parts.get(5).copied().unwrap_or_default()),
            },
            "BIOGRAPHIE" => SheetRecord::Biography {
                layout: parse_layout(&parts)?,
                text: unescape(parts.get(5).copied().unwrap_or_default()),
            },
            "STATISTIQUES" => SheetRecord::Statistics {
                layout: parse_layout(&parts)?,
            },
            "STAT" => SheetRecord::Stat(Statistic {
                id: parse_int(&parts, 1, "statistic id")?,
                name: unescape(field(&parts, 2, "statistic name")?),
                value: parse_int(&parts, 3, "statistic value")?,
            }),
            "COMPETENCES" => SheetRecord::Skills {
                layout: parse_layout(&parts)?,
            },
            "COMP" => SheetRecord::Skill(unescape(field(&parts, 1, "skill")?)),
            "EQUIPEMENTS" => SheetRecord::Equipment {
                layout: parse_layout(&parts)?,
            },
            "EQUIP" => SheetRecord::Item(unescape(field(&parts, 1, "equipment")?)),
            _ => return Ok(None),
        };

        Ok(Some(record))
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of `escape`. Unknown escapes are kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn layout_fields(layout: &Layout) -> String {
    format!("{};{};{};{}", layout.x, layout.y, layout.width, layout.height)
}

fn field<'a>(parts: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    match parts.get(index) {
        Some(value) => Ok(value),
        None => bail!("Missing {}", what),
    }
}

fn parse_int<T: std::str::FromStr>(parts: &[&str], index: usize, what: &str) -> Result<T> {
    let raw = field(parts, index, what)?;
    match raw.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => bail!("Invalid {}: '{}'", what, raw),
    }
}

fn parse_layout(parts: &[&str]) -> Result<Layout> {
    Ok(Layout::new(
        parse_int(parts, 1, "x")?,
        parse_int(parts, 2, "y")?,
        parse_int(parts, 3, "width")?,
        parse_int(parts, 4, "height")?,
    ))
}

fn sheet_records(sheet: &Sheet) -> Vec<SheetRecord> {
    let mut records = Vec::with_capacity(
        6 + sheet.statistics.entries().len() + sheet.skills.items().len() + sheet.equipment.items().len(),
    );

    records.push(SheetRecord::Sheet {
        id: sheet.id,
        name: sheet.name.clone(),
    });
    records.push(SheetRecord::Portrait {
        layout: sheet.portrait.layout,
        image_path: sheet.portrait.image_path.clone(),
    });
    records.push(SheetRecord::Biography {
        layout: sheet.biography.layout,
        text: sheet.biography.text.clone(),
    });

    records.push(SheetRecord::Statistics {
        layout: sheet.statistics.layout,
    });
    records.extend(sheet.statistics.entries().iter().cloned().map(SheetRecord::Stat));

    records.push(SheetRecord::Skills {
        layout: sheet.skills.layout,
    });
    records.extend(sheet.skills.items().iter().cloned().map(SheetRecord::Skill));

    records.push(SheetRecord::Equipment {
        layout: sheet.equipment.layout,
    });
    records.extend(sheet.equipment.items().iter().cloned().map(SheetRecord::Item));

    records
}

/// Serialize a collection to the sheet file text format.
pub fn encode(sheets: &SheetCollection) -> String {
    let mut out = String::new();
    for sheet in sheets.sheets() {
        for record in sheet_records(sheet) {
            out.push_str(&record.to_line());
            out.push('\n');
        }
        out.push_str(SEPARATOR);
        out.push('\n');
    }
    out
}

/// Rebuilds sheets line by line.
///
/// A cursor points at the sheet being filled; it is cleared by `---`, and
/// lines other than `FICHE` that arrive while it is clear are ignored.
#[derive(Default)]
struct SheetDecoder {
    sheets: Vec<Sheet>,
    current: Option<usize>,
}

impl SheetDecoder {
    fn feed(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches('\r');

        if line == SEPARATOR {
            self.current = None;
            return Ok(());
        }

        let is_sheet_header = line.split(';').next() == Some("FICHE");
        if self.current.is_none() && !is_sheet_header {
            return Ok(());
        }

        let record = match SheetRecord::from_line(line)? {
            Some(record) => record,
            None => return Ok(()),
        };

        if let SheetRecord::Sheet { id, name } = record {
            self.sheets.push(Sheet::new(id, name));
            self.current = Some(self.sheets.len() - 1);
            return Ok(());
        }

        let Some(index) = self.current else {
            return Ok(());
        };
        let sheet = &mut self.sheets[index];

        match record {
            SheetRecord::Sheet { .. } => {}
            SheetRecord::Portrait { layout, image_path } => {
                sheet.portrait.layout = layout;
                sheet.set_portrait_image(image_path);
            }
            SheetRecord::Biography { layout, text } => {
                sheet.biography.layout = layout;
                sheet.set_biography_text(text);
            }
            SheetRecord::Statistics { layout } => sheet.statistics.layout = layout,
            SheetRecord::Stat(stat) => sheet.statistics.restore(stat),
            SheetRecord::Skills { layout } => sheet.skills.layout = layout,
            SheetRecord::Skill(name) => sheet.skills.add(name),
            SheetRecord::Equipment { layout } => sheet.equipment.layout = layout,
            SheetRecord::Item(name) => sheet.equipment.add(name),
        }

        Ok(())
    }

    fn finish(self) -> SheetCollection {
        SheetCollection::from_sheets(self.sheets)
    }
}

/// Parse the sheet file text format.
pub fn decode(text: &str) -> Result<SheetCollection> {
    let mut decoder = SheetDecoder::default();
    for (line_num, line) in text.lines().enumerate() {
        decoder
            .feed(line)
            .with_context(|| format!("Malformed sheet record on line {}", line_num + 1))?;
    }
    Ok(decoder.finish())
}

/// Per-user sheet files under a data directory.
#[derive(Debug, Clone)]
pub struct SheetFile {
    dir: PathBuf,
}

impl SheetFile {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, user_id: u32) -> PathBuf {
        self.dir.join(format!("fiches_{}.txt", user_id))
    }

    /// Truncate and rewrite the user's file. A crash mid-write leaves a partial file.
    pub fn save(&self, user_id: u32, sheets: &SheetCollection) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;

        let path = self.path_for(user_id);
        let file = File::create(&path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(encode(sheets).as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }

    /// Read the user's sheets. A missing file is an empty collection.
    pub fn load(&self, user_id: u32) -> Result<SheetCollection> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(SheetCollection::new());
        }

        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut decoder = SheetDecoder::default();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result
                .with_context(|| format!("Failed to read line from {}", path.display()))?;
            decoder.feed(&line).with_context(|| {
                format!("Malformed sheet record in {} on line {}", path.display(), line_num + 1)
            })?;
        }

        Ok(decoder.finish())
    }
}
