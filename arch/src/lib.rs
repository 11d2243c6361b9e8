pub mod asm;
pub mod comp;
pub mod dest;
pub mod layout;

pub use asm::{Addr, Asm};
pub use comp::Comp;
pub use dest::Dest;
pub use layout::{Cell, LayoutError, MemoryLayout};
