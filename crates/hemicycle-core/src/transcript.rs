//! Speech extraction from plenary transcripts (comptes rendus).

use serde_json::Value;

use crate::shape::{self, Shape};

/// Actor ids in transcripts are bare digits; biographies use the `PA` form.
pub const ACTOR_PREFIX: &str = "PA";

/// One paragraph attributed to one speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speech {
    pub actor_id: String,
    pub text: String,
}

/// All attributed paragraphs of a transcript, in document order.
///
/// A paragraph with several speakers yields one [`Speech`] per speaker.
pub fn speeches(doc: &Value) -> Vec<Speech> {
    let Some(contenu) = shape::object_at(doc, &["contenu"]) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for point in Shape::of(contenu.get("point")).objects() {
        for para in Shape::of(point.get("paragraphe")).objects() {
            let Some(orateurs) = shape::object_at(para, &["orateurs"]) else {
                continue;
            };
            let speakers = Shape::of(orateurs.get("orateur")).objects();
            if speakers.is_empty() {
                continue;
            }
            let text = paragraph_text(para.get("texte"));
            for orateur in speakers {
                if let Some(id) = shape::text(orateur.get("id")) {
                    out.push(Speech {
                        actor_id: format!("{ACTOR_PREFIX}{}", id.trim()),
                        text: text.clone(),
                    });
                }
            }
        }
    }
    out
}

/// `texte` is usually a string; mixed-content paragraphs carry it under `#text`.
fn paragraph_text(texte: Option<&Value>) -> String {
    match texte {
        Some(Value::String(s)) => s.clone(),
        Some(obj @ Value::Object(_)) => obj
            .get("#text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}
