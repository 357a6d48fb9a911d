use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rusttype::Font;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tracing::warn;

use crate::config::{project_root, CardConfig};

use super::GenError;

static FONT_CACHE: Lazy<Mutex<HashMap<String, Arc<Font<'static>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub fn fonts_dir() -> PathBuf {
    if let Ok(p) = std::env::var("FONTS_DIR") {
        return PathBuf::from(p);
    }
    project_root().join("app").join("assets").join("fonts")
}

pub fn load_font_cached(name: &str) -> Result<Arc<Font<'static>>, GenError> {
    if let Some(f) = FONT_CACHE.lock().get(name) {
        return Ok(Arc::clone(f));
    }

    let bytes = std::fs::read(fonts_dir().join(name))
        .map_err(|e| GenError::Internal(format!("failed to read font {name}: {e}")))?;
    let f = Font::try_from_vec(bytes)
        .ok_or_else(|| GenError::Internal(format!("failed to parse font {name}")))?;

    let f = Arc::new(f);
    FONT_CACHE.lock().insert(name.to_string(), Arc::clone(&f));
    Ok(f)
}

/// The loaded font faces, resolved by weight.
///
/// A face that fails to load is warned about and skipped; requests for its
/// weight are served by the nearest loaded one, so rendering proceeds with
/// whatever is available. Construction fails only with nothing to draw with.
pub struct FontSet {
    faces: Vec<(u16, Arc<Font<'static>>)>,
}

impl FontSet {
    pub fn load(cfg: &CardConfig) -> Result<Self, GenError> {
        let mut faces = Vec::new();
        for face in &cfg.fonts {
            match load_font_cached(&face.file) {
                Ok(f) => faces.push((face.weight, f)),
                Err(e) => {
                    warn!(file = %face.file, weight = face.weight, "skipping font face: {e}")
                }
            }
        }
        if faces.is_empty() {
            return Err(GenError::Internal("no usable font faces loaded".into()));
        }
        faces.sort_by_key(|(w, _)| *w);
        Ok(Self { faces })
    }

    /// Exact weight if loaded, otherwise the closest loaded weight.
    pub fn select(&self, weight: u16) -> &Font<'static> {
        let weights: Vec<u16> = self.faces.iter().map(|(w, _)| *w).collect();
        let idx = nearest_weight(&weights, weight);
        &self.faces[idx].1
    }
}

fn nearest_weight(weights: &[u16], requested: u16) -> usize {
    let mut best = 0;
    for (i, w) in weights.iter().enumerate() {
        let d = (*w as i32 - requested as i32).abs();
        let best_d = (weights[best] as i32 - requested as i32).abs();
        if d < best_d {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::nearest_weight;

    #[test]
    fn exact_weight_preferred() {
        assert_eq!(nearest_weight(&[800, 900], 900), 1);
        assert_eq!(nearest_weight(&[800, 900], 800), 0);
    }

    #[test]
    fn missing_weight_maps_to_closest() {
        assert_eq!(nearest_weight(&[800, 900], 700), 0);
        assert_eq!(nearest_weight(&[400, 900], 800), 1);
    }

    #[test]
    fn ties_keep_the_lighter_face() {
        assert_eq!(nearest_weight(&[800, 900], 850), 0);
    }
}
