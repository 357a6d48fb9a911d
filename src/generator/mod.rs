pub mod card;
pub mod fit;
pub mod normalize;

mod font_cache;

pub use font_cache::FontSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("image: {0}")]
    Image(String),
    #[error("internal: {0}")]
    Internal(String),
}
