//! Output buffer primitives shared by the anyjson encoders.

mod writer;

pub use writer::Writer;
