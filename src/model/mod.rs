mod blend_mode;
mod effect;
mod flags;
mod frame;
mod hitbox;
mod move_list;
mod sequence;

pub use blend_mode::*;
pub use effect::*;
pub use flags::*;
pub use frame::*;
pub use hitbox::*;
pub use move_list::*;
pub use sequence::*;
