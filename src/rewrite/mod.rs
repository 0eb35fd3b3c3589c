//! Reference rewriting passes applied to the document before it is segmented.

mod css;
mod document;
mod links;

pub use css::{CssReferenceRewriter, CssRewrite};
pub use document::{DocumentAssetScanner, ScanReport};
pub use links::{LinkRegistry, PageLinkRewriter, page_route_name};
