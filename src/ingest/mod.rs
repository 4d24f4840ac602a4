//! External configuration ingestion: file decoders, environment variable
//! import, and command-line overrides, in the priority order the runner
//! applies them (file < environment < command line).

pub mod cmdline;
pub mod decode;
pub mod env;

pub use decode::{Decoder, DecoderRegistry, JsonDecoder, PropertiesDecoder};
pub use env::EnvOptions;
