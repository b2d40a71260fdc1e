//! Copy-on-write overlays over committed state.
//!
//! An overlay records tentative additions, removals and value changes on top
//! of a read-only base. The base is only ever borrowed; dropping the overlay
//! discards every pending change. Overlays implement the same read traits as
//! the base, so lookups see the pending state.

mod field;
mod model;
mod object;

pub use field::OverlayField;
pub use model::OverlayModel;
pub use object::OverlayObject;
