use std::path::PathBuf;

use thiserror::Error;

use crate::model::Rect;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A region reaches past the right or top edge of the page.
    #[error(
        "layout violation: region [{:.3}, {:.3}, {:.3}, {:.3}] exceeds the page (right={:.3}, top={:.3})",
        rect.left, rect.bottom, rect.width, rect.height, rect.right(), rect.top()
    )]
    LayoutViolation { rect: Rect },

    #[error("missing asset {}: {reason}", path.display())]
    MissingAsset { path: PathBuf, reason: String },

    #[error("invalid report spec: {0}")]
    InvalidSpec(String),

    #[error("region #{0} does not belong to this canvas")]
    UnknownRegion(usize),

    #[error("the page has already been exported")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
