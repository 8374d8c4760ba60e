use serde::{Deserialize, Serialize};

use crate::models::module::{Layout, Statistic};

#[derive(Deserialize, Default)]
pub struct CredentialsBody {
    pub nom: Option<String>,
    pub motdepasse: Option<String>,
}

/// Body carrying a single `nom`: sheet creation, skill and equipment add/remove.
#[derive(Deserialize, Default)]
pub struct NameBody {
    pub nom: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct StatisticBody {
    pub nom: Option<String>,
    pub valeur: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct PortraitBody {
    pub image: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct BiographyBody {
    pub texte: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct RenameBody {
    pub ancien: Option<String>,
    pub nouveau: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ModulePositionBody {
    pub module: Option<String>,
    #[serde(rename = "posX")]
    pub pos_x: Option<i32>,
    #[serde(rename = "posY")]
    pub pos_y: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct ModuleSizeBody {
    pub module: Option<String>,
    pub largeur: Option<i32>,
    pub hauteur: Option<i32>,
}

#[derive(Serialize)]
pub struct SuccessResponse<'a> {
    pub succes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<&'a str>,
}

#[derive(Serialize)]
pub struct ErrorResponse<'a> {
    pub erreur: &'a str,
}

#[derive(Serialize)]
pub struct SessionResponse<'a> {
    pub connecte: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<&'a str>,
}

#[derive(Serialize)]
pub struct PortraitView<'a> {
    pub image: &'a str,
    #[serde(flatten)]
    pub layout: &'a Layout,
}

#[derive(Serialize)]
pub struct BiographyView<'a> {
    pub texte: &'a str,
    #[serde(flatten)]
    pub layout: &'a Layout,
}

/// A list module: its layout followed by its entries.
#[derive(Serialize)]
pub struct ListView<'a, T> {
    #[serde(flatten)]
    pub layout: &'a Layout,
    pub liste: &'a [T],
}

#[derive(Serialize)]
pub struct SheetDetail<'a> {
    pub id: u32,
    pub nom: &'a str,
    pub portrait: PortraitView<'a>,
    pub biographie: BiographyView<'a>,
    pub statistiques: ListView<'a, Statistic>,
    pub competences: ListView<'a, String>,
    pub equipements: ListView<'a, String>,
}
