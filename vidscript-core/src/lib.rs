//! Vidscript Core - compiles video-editing directives into FFmpeg arguments
//!
//! Directive text such as `trim from 10 to 20` or `crop 100px from left` is
//! turned into an FFmpeg argument list by a pure pipeline:
//! - Tokenizer splitting text into comments, quoted strings and words
//! - Data-driven pattern matcher producing typed command nodes
//! - Crop optimizer merging every crop into one net crop
//! - Filter builders and a stage-ordered argument assembler
//!
//! An optional media descriptor (resolution, duration) makes filter
//! arithmetic literal instead of symbolic.

pub mod compiler;
pub mod crop;
pub mod descriptor;
pub mod error;
pub mod ffmpeg_command;
pub mod filters;
pub mod formats;
pub mod matcher;
pub mod node;
pub mod patterns;
pub mod timecode;
pub mod tokenizer;

// Re-export commonly used types at the crate root
pub use compiler::{CompileOutput, DirectiveCompiler};
pub use descriptor::{MediaDescriptor, Resolution};
pub use error::{CompileError, DirectiveError};
pub use formats::ContainerFormat;
pub use matcher::{ParseResult, parse};
pub use node::CommandNode;
pub use tokenizer::{Token, tokenize};

use clap::ValueEnum;

/// How compiled arguments are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A single shell-quoted `ffmpeg` command line
    #[default]
    Shell,
    /// One argument per line
    Lines,
    /// Arguments, nodes and diagnostics as JSON
    Json,
}

impl OutputFormat {
    pub fn name(&self) -> &str {
        match self {
            OutputFormat::Shell => "shell",
            OutputFormat::Lines => "lines",
            OutputFormat::Json => "json",
        }
    }
}
