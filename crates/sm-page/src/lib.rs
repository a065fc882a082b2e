//! Card page generation.
//!
//! Paragraphs become one card per (chapter, article) pair, followed by a
//! closing references card. The rendered page carries a table of contents
//! whose `a.toc-article` entries point at `#<card index>`.

mod model;
mod render;

pub use model::Card;
pub use model::CardKind;
pub use model::Line;
pub use model::PageConfig;
pub use model::Paragraph;
pub use model::Reference;
pub use model::ViewModel;
pub use model::parse_paragraphs;
pub use render::escape_attribute;
pub use render::escape_text;
pub use render::render_page;
pub use render::translate_toggle_id;
