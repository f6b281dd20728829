pub mod codec;
pub mod error;
pub mod text;
pub mod value;

pub use codec::Codec;
pub use error::{CodecError, ErrorKind};
pub use value::Value;
