/// Window layout
///
/// Pure view functions; all state lives in `state::session::Session`
/// and the editor contents owned by the application.

pub mod header;
pub mod input_panel;
pub mod output_panel;
