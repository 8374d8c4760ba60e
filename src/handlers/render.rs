// JSON bodies returned by the routes

use serde::Serialize;
use tracing::error;

use crate::models::api::{
    BiographyView, ErrorResponse, ListView, PortraitView, SessionResponse, SheetDetail,
    SuccessResponse,
};
use crate::models::module::ModuleKind;
use crate::models::sheet::Sheet;
use crate::models::user::Principal;
use crate::services::sheets::SheetSummary;

const ENCODE_FAILURE: &str = r#"{"erreur":"Erreur interne"}"#;

fn encode<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode response body");
        ENCODE_FAILURE.to_string()
    })
}

pub fn success() -> String {
    encode(&SuccessResponse {
        succes: true,
        id: None,
        nom: None,
    })
}

pub fn success_with_id(id: u32) -> String {
    encode(&SuccessResponse {
        succes: true,
        id: Some(id),
        nom: None,
    })
}

pub fn success_with_id_name(id: u32, name: &str) -> String {
    encode(&SuccessResponse {
        succes: true,
        id: Some(id),
        nom: Some(name),
    })
}

pub fn error_body(message: &str) -> String {
    encode(&ErrorResponse { erreur: message })
}

pub fn connected(principal: &Principal) -> String {
    encode(&SessionResponse {
        connecte: true,
        id: Some(principal.id),
        nom: Some(&principal.name),
    })
}

pub fn disconnected() -> String {
    encode(&SessionResponse {
        connecte: false,
        id: None,
        nom: None,
    })
}

pub fn sheet_list(summaries: &[SheetSummary]) -> String {
    encode(summaries)
}

/// Full sheet, modules included
pub fn sheet_detail(sheet: &Sheet) -> String {
    encode(&SheetDetail {
        id: sheet.id,
        nom: &sheet.name,
        portrait: PortraitView {
            image: &sheet.portrait.image_path,
            layout: sheet.layout(ModuleKind::Portrait),
        },
        biographie: BiographyView {
            texte: &sheet.biography.text,
            layout: sheet.layout(ModuleKind::Biography),
        },
        statistiques: ListView {
            layout: sheet.layout(ModuleKind::Statistics),
            liste: sheet.statistics.entries(),
        },
        competences: ListView {
            layout: sheet.layout(ModuleKind::Skills),
            liste: sheet.skills.items(),
        },
        equipements: ListView {
            layout: sheet.layout(ModuleKind::Equipment),
            liste: sheet.equipment.items(),
        },
    })
}
