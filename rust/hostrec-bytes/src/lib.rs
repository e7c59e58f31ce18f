//! Growable random-access byte buffer used by the hostrec codecs, with a
//! read/write cursor, big-endian primitive access and bulk transfer to and
//! from blocking byte streams.

pub mod buffer;

pub use buffer::ByteBuffer;
