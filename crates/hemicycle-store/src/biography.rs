//! Biography store backed by per-actor and per-organ JSON files.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hemicycle_core::shape;
use hemicycle_core::{Biography, OrganRef};
use serde_json::Value;
use tracing::debug;

use crate::files::read_json;

/// Reads `<actor_dir>/<id>.json` and `<organ_dir>/<id>.json`.
///
/// Actor files are read once per deputy by the table itself. Organ files are
/// hit for every group of every vote, so their results (misses included) are
/// memoised.
pub struct DirBiography {
    actor_dir: PathBuf,
    organ_dir: PathBuf,
    organs: RefCell<HashMap<String, Option<OrganRef>>>,
}

impl DirBiography {
    pub fn new(actor_dir: impl Into<PathBuf>, organ_dir: impl Into<PathBuf>) -> Self {
        Self {
            actor_dir: actor_dir.into(),
            organ_dir: organ_dir.into(),
            organs: RefCell::new(HashMap::new()),
        }
    }

    /// Standard `all_actors/{acteur,organe}` layout under a data directory.
    pub fn under(data_dir: &Path) -> Self {
        Self::new(
            data_dir.join(hemicycle_core::legislature::ACTOR_DIR),
            data_dir.join(hemicycle_core::legislature::ORGAN_DIR),
        )
    }

    fn load(dir: &Path, id: &str) -> Option<Value> {
        if !is_plain_id(id) {
            debug!(id, "refusing identifier with path components");
            return None;
        }
        let path = dir.join(format!("{id}.json"));
        match read_json(&path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                debug!(id, error = %e, "biography lookup failed");
                None
            }
        }
    }
}

impl Biography for DirBiography {
    fn deputy_name(&self, actor_id: &str) -> Option<String> {
        let doc = Self::load(&self.actor_dir, actor_id)?;
        actor_name(&doc)
    }

    fn organ(&self, organ_id: &str) -> Option<OrganRef> {
        if let Some(cached) = self.organs.borrow().get(organ_id) {
            return cached.clone();
        }
        let organ = Self::load(&self.organ_dir, organ_id).and_then(|doc| organ_ref(organ_id, &doc));
        self.organs
            .borrow_mut()
            .insert(organ_id.to_string(), organ.clone());
        organ
    }
}

/// `"<nom> <prenom>"` from an `acteur` document.
pub fn actor_name(doc: &Value) -> Option<String> {
    let ident = shape::object_at(doc, &["acteur", "etatCivil", "ident"])?;
    let nom = shape::text(ident.get("nom"))?;
    let prenom = shape::text(ident.get("prenom"))?;
    Some(format!("{nom} {prenom}"))
}

/// Group identity from an `organe` document.
pub fn organ_ref(id: &str, doc: &Value) -> Option<OrganRef> {
    let organe = shape::object_at(doc, &["organe"])?;
    Some(OrganRef {
        id: id.to_string(),
        name: shape::text(organe.get("libelle")),
        name_from: shape::text(organe.get("libelleEdition")),
        name_short: shape::text(organe.get("libelleAbrege")),
        color: shape::text(organe.get("couleurAssociee")),
    })
}

fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && !id.contains("..")
}
