//! Built-in pipeline phases.
//!
//! Every non-empty batch runs these in order:
//!
//! - [`MarshalPhase`] - writes the flag file and builds the invocation
//! - [`InvokePhase`] - runs the compiler and triages its output
//! - [`MaterializePhase`] - reads the outputs back as artifacts

mod invoke;
mod marshal;
mod materialize;

pub use invoke::{InvokePhase, classify};
pub use marshal::{
    COMPILER, FLAG_FILE_NAME, JAVA, MODULE_MAP_PATTERN, MarshalPhase, build_flag, expand_glob,
    flag_file_body, flags_to_args, plan_layout, write_flag_file,
};
pub use materialize::{MaterializePhase, materialize_output, source_mapping_comment};
