use http::{Method, StatusCode};
use std::sync::Arc;

use crate::core::error::{error_reply, SheetError};
use crate::core::routes::{method_not_allowed, Route};
use crate::handlers::{body::parse_body, fallback::fallback, render};
use crate::models::api::{
    BiographyBody, ModulePositionBody, ModuleSizeBody, NameBody, PortraitBody, RenameBody,
    StatisticBody,
};
use crate::models::user::Principal;
use crate::net::response::Reply;
use crate::services::sheets::SheetService;
use crate::stores::session::SessionSlot;

const PREFIX: &str = "/api/fiches";

const STAT_REQUIRED: &str = "nom et valeur requis";
const NAME_REQUIRED: &str = "nom requis";
const RENAME_REQUIRED: &str = "ancien et nouveau requis";

/// Everything under `/api/fiches`. Requires a connected user.
pub struct SheetRoute {
    session: Arc<SessionSlot>,
    sheets: Arc<SheetService>,
}

/// What an `/api/fiches/{id}/...` path points at
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    Collection,
    Sheet(&'a str),
    Portrait(&'a str),
    Biography(&'a str),
    Statistics(&'a str),
    Statistic(&'a str, &'a str),
    Skills(&'a str),
    Equipment(&'a str),
    ModulePosition(&'a str),
    ModuleSize(&'a str),
    Unknown,
}

impl<'a> Target<'a> {
    fn parse(path: &'a str) -> Self {
        let rest = match path.strip_prefix(PREFIX) {
            Some("") => return Target::Collection,
            Some(rest) => rest,
            None => return Target::Unknown,
        };
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let rest = if rest.len() > 1 { rest.trim_end_matches('/') } else { rest };
        let segments: Vec<&str> = rest.split('/').collect();

        match segments[..] {
            [id] => Target::Sheet(id),
            [id, "portrait"] => Target::Portrait(id),
            [id, "biographie"] => Target::Biography(id),
            [id, "statistiques"] => Target::Statistics(id),
            [id, "statistiques", stat] => Target::Statistic(id, stat),
            [id, "competences"] => Target::Skills(id),
            [id, "equipements"] => Target::Equipment(id),
            [id, "module", "position"] => Target::ModulePosition(id),
            [id, "module", "taille"] => Target::ModuleSize(id),
            _ => Target::Unknown,
        }
    }
}

fn parse_id(raw: &str) -> Result<u32, SheetError> {
    raw.parse().map_err(|_| SheetError::invalid("ID invalide"))
}

fn required<T>(value: Option<T>, message: &str) -> Result<T, SheetError> {
    value.ok_or_else(|| SheetError::invalid(message))
}

impl SheetRoute {
    pub fn new(session: Arc<SessionSlot>, sheets: Arc<SheetService>) -> Self {
        Self { session, sheets }
    }

    fn dispatch(
        &self,
        principal: &Principal,
        method: &Method,
        target: Target<'_>,
        body: &str,
    ) -> Result<Reply, SheetError> {
        let p = Some(principal);
        let sheets = &self.sheets;

        let reply = match target {
            Target::Collection => match *method {
                Method::GET => Reply::ok(render::sheet_list(&sheets.list(p)?)),
                Method::POST => {
                    let NameBody { nom } = parse_body(body);
                    let created = sheets.create(p, &nom.unwrap_or_default())?;
                    Reply::created(render::success_with_id_name(created.id, &created.name))
                }
                _ => method_not_allowed(),
            },

            Target::Sheet(id) => {
                let id = parse_id(id)?;
                match *method {
                    Method::GET => Reply::ok(render::sheet_detail(&sheets.get(p, id)?)),
                    Method::DELETE => {
                        sheets.delete(p, id)?;
                        Reply::ok(render::success())
                    }
                    _ => method_not_allowed(),
                }
            }

            Target::Portrait(id) => {
                let id = parse_id(id)?;
                if *method != Method::PUT {
                    return Ok(method_not_allowed());
                }
                let PortraitBody { image } = parse_body(body);
                sheets.set_portrait(p, id, &image.unwrap_or_default())?;
                Reply::ok(render::success())
            }

            Target::Biography(id) => {
                let id = parse_id(id)?;
                if *method != Method::PUT {
                    return Ok(method_not_allowed());
                }
                let BiographyBody { texte } = parse_body(body);
                sheets.set_biography(p, id, &texte.unwrap_or_default())?;
                Reply::ok(render::success())
            }

            Target::Statistics(id) => {
                let id = parse_id(id)?;
                if *method != Method::POST {
                    return Ok(method_not_allowed());
                }
                let StatisticBody { nom, valeur } = parse_body(body);
                let name = required(nom, STAT_REQUIRED)?;
                let value = required(valeur, STAT_REQUIRED)?;
                let stat_id = sheets.add_statistic(p, id, &name, value)?;
                Reply::created(render::success_with_id(stat_id))
            }

            Target::Statistic(id, stat_id) => {
                let id = parse_id(id)?;
                let stat_id = parse_id(stat_id)?;
                match *method {
                    Method::PUT => {
                        let StatisticBody { nom, valeur } = parse_body(body);
                        let name = required(nom, STAT_REQUIRED)?;
                        let value = required(valeur, STAT_REQUIRED)?;
                        sheets.update_statistic(p, id, stat_id, &name, value)?;
                        Reply::ok(render::success())
                    }
                    Method::DELETE => {
                        sheets.remove_statistic(p, id, stat_id)?;
                        Reply::ok(render::success())
                    }
                    _ => method_not_allowed(),
                }
            }

            Target::Skills(id) => {
                let id = parse_id(id)?;
                match *method {
                    Method::POST => {
                        let NameBody { nom } = parse_body(body);
                        sheets.add_skill(p, id, &required(nom, NAME_REQUIRED)?)?;
                        Reply::created(render::success())
                    }
                    Method::PUT => {
                        let RenameBody { ancien, nouveau } = parse_body(body);
                        let old = required(ancien, RENAME_REQUIRED)?;
                        let new = required(nouveau, RENAME_REQUIRED)?;
                        sheets.rename_skill(p, id, &old, &new)?;
                        Reply::ok(render::success())
                    }
                    Method::DELETE => {
                        let NameBody { nom } = parse_body(body);
                        sheets.remove_skill(p, id, &required(nom, NAME_REQUIRED)?)?;
                        Reply::ok(render::success())
                    }
                    _ => method_not_allowed(),
                }
            }

            Target::Equipment(id) => {
                let id = parse_id(id)?;
                match *method {
                    Method::POST => {
                        let NameBody { nom } = parse_body(body);
                        sheets.add_equipment(p, id, &required(nom, NAME_REQUIRED)?)?;
                        Reply::created(render::success())
                    }
                    Method::PUT => {
                        let RenameBody { ancien, nouveau } = parse_body(body);
                        let old = required(ancien, RENAME_REQUIRED)?;
                        let new = required(nouveau, RENAME_REQUIRED)?;
                        sheets.rename_equipment(p, id, &old, &new)?;
                        Reply::ok(render::success())
                    }
                    Method::DELETE => {
                        let NameBody { nom } = parse_body(body);
                        sheets.remove_equipment(p, id, &required(nom, NAME_REQUIRED)?)?;
                        Reply::ok(render::success())
                    }
                    _ => method_not_allowed(),
                }
            }

            Target::ModulePosition(id) => {
                let id = parse_id(id)?;
                if *method != Method::PUT {
                    return Ok(method_not_allowed());
                }
                const REQUIRED: &str = "module, posX, posY requis";
                let ModulePositionBody { module, pos_x, pos_y } = parse_body(body);
                let module = required(module, REQUIRED)?;
                let x = required(pos_x, REQUIRED)?;
                let y = required(pos_y, REQUIRED)?;
                sheets.set_module_position(p, id, &module, x, y)?;
                Reply::ok(render::success())
            }

            Target::ModuleSize(id) => {
                let id = parse_id(id)?;
                if *method != Method::PUT {
                    return Ok(method_not_allowed());
                }
                const REQUIRED: &str = "module, largeur, hauteur requis";
                let ModuleSizeBody {
                    module,
                    largeur,
                    hauteur,
                } = parse_body(body);
                let module = required(module, REQUIRED)?;
                let width = required(largeur, REQUIRED)?;
                let height = required(hauteur, REQUIRED)?;
                sheets.set_module_size(p, id, &module, width, height)?;
                Reply::ok(render::success())
            }

            Target::Unknown => fallback(),
        };

        Ok(reply)
    }
}

impl Route for SheetRoute {
    fn matches(&self, path: &str) -> bool {
        path == PREFIX || path.starts_with("/api/fiches/")
    }

    fn handle(&self, method: &Method, path: &str, body: &str) -> Reply {
        // Checked before anything else, including the id
        let Some(principal) = self.session.current() else {
            return error_reply(StatusCode::UNAUTHORIZED, "Non connecte");
        };

        self.dispatch(&principal, method, Target::parse(path), body)
            .unwrap_or_else(SheetError::into_reply)
    }
}
