//! Frame types consumed by the engine and their file I/O.
pub mod io;
pub mod traits;
pub mod u8;

pub use self::traits::ImageView;
pub use self::u8::ImageU8;
