mod handler;
mod model;

pub use handler::{sonnet, translate};
pub use model::{
    Generation, SonnetRequest, SonnetResponse, TranslateRequest, TranslateResponse,
};
