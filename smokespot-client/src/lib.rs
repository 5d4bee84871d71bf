mod controller;
pub use controller::{Notice, ThreadController};

mod error;
pub use error::{Error, ValidationError};

mod form;
pub use form::CommentForm;

mod render;
pub use render::{render, Row, RowAction, INDENT_UNIT_PX, MAX_RENDER_LEVEL, MAX_REPLY_LEVEL};

mod store;
pub use store::{CommentStore, HttpStore};

mod e2e;

pub mod api {
    pub use smokespot_api::*;
}
