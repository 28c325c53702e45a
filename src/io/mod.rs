//! Little-endian binary IO with the Neo varint encoding.

mod binary_writer;
mod memory_reader;

pub use binary_writer::BinaryWriter;
pub use memory_reader::MemoryReader;
