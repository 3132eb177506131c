use serde::Serialize;
use std::path::Path;

use crate::OutputFormat;
use crate::crop::optimize_crops;
use crate::descriptor::MediaDescriptor;
use crate::error::{DirectiveError, Result};
use crate::ffmpeg_command::{FFmpegCommand, ProcessedArgument, command_line};
use crate::filters::build_fragments;
use crate::matcher::{ParseResult, parse};
use crate::node::CommandNode;

/// Stands in for the source file when no input was chosen
pub const INPUT_PLACEHOLDER: &str = "<input>";

/// Result of compiling one directive buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileOutput {
    /// FFmpeg arguments, program name excluded
    pub args: Vec<String>,
    /// The ordered argument groups `args` was serialized from
    pub arguments: Vec<ProcessedArgument>,
    pub commands: Vec<CommandNode>,
    pub errors: Vec<DirectiveError>,
    pub warnings: Vec<String>,
    /// Canonical echo of every directive that parsed
    pub parsed: Vec<String>,
}

impl CompileOutput {
    /// Shell-quoted `ffmpeg ...` line
    pub fn command_line(&self) -> String {
        command_line(&self.args)
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Shell => Ok(self.command_line()),
            OutputFormat::Lines => Ok(self.args.join("\n")),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

/// Compiles directive text into FFmpeg arguments.
///
/// Every call to [`DirectiveCompiler::compile`] works on fresh state, so one
/// compiler can be reused for any number of buffers.
#[derive(Debug, Clone, Default)]
pub struct DirectiveCompiler {
    descriptor: Option<MediaDescriptor>,
    input: Option<String>,
    output: Option<String>,
    overwrite: bool,
}

impl DirectiveCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(mut self, descriptor: MediaDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Source file; takes precedence over an `input` directive
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = Some(path.as_ref().display().to_string());
        self
    }

    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().display().to_string());
        self
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    /// Compile a directive buffer.
    ///
    /// Per-directive problems are reported in the output next to whatever did
    /// parse. An `Err` means the compile was aborted and nothing is usable.
    pub fn compile(&self, text: &str) -> Result<CompileOutput> {
        let descriptor = self.descriptor.as_ref();
        let ParseResult {
            commands,
            mut errors,
            parsed,
            locations,
        } = parse(text);

        let mut nodes = Vec::with_capacity(commands.len());
        let mut echoes = Vec::with_capacity(parsed.len());
        let mut input_path: Option<Option<String>> = None;

        for ((node, echo), location) in commands.into_iter().zip(parsed).zip(locations) {
            if let CommandNode::Input(input) = &node {
                if input_path.is_some() {
                    errors.push(DirectiveError::DuplicateInput { location });
                    continue;
                }
                input_path = Some(input.path.clone());
            }
            nodes.push(node);
            echoes.push(echo);
        }
        errors.sort_by_key(DirectiveError::location);

        let mut warnings = Vec::new();
        let source = match (&self.input, input_path.flatten()) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => path,
            (None, None) => {
                warnings.push(format!(
                    "No input file chosen; using placeholder {}",
                    INPUT_PLACEHOLDER
                ));
                INPUT_PLACEHOLDER.to_string()
            }
        };

        let optimized = optimize_crops(nodes.clone(), descriptor)?;

        let mut cmd = FFmpegCommand::new(source);
        if self.overwrite {
            cmd = cmd.overwrite();
        }
        for node in &optimized {
            log::debug!("Building {} fragments", node.kind_name());
            for fragment in build_fragments(node, descriptor, &mut warnings) {
                cmd = cmd.fragment(fragment);
            }
        }
        if let Some(ref output) = self.output {
            cmd = cmd.output(output.as_str());
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }
        log::info!(
            "Compiled {} directives ({} errors, {} warnings)",
            echoes.len(),
            errors.len(),
            warnings.len()
        );

        Ok(CompileOutput {
            args: cmd.build(),
            arguments: cmd.processed_arguments(),
            commands: nodes,
            errors,
            warnings,
            parsed: echoes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Resolution;
    use pretty_assertions::assert_eq;

    fn hd() -> MediaDescriptor {
        MediaDescriptor::default().with_resolution(Resolution {
            width: 1920,
            height: 1080,
        })
    }

    #[test]
    fn test_compile_full_buffer() {
        let text = "input clip.mp4\ntrim from 0:10 to 0:20\nscale to 1280x720 ignore aspect ratio\ncompress video\nconvert to mkv";
        let output = DirectiveCompiler::new().compile(text).unwrap();
        assert!(output.errors.is_empty());
        assert_eq!(
            output.args,
            vec![
                "-ss",
                "0:10",
                "-to",
                "0:20",
                "-i",
                "clip.mp4",
                "-vf",
                "scale=1280:720",
                "-f",
                "matroska",
                "-c:v",
                "libx264",
                "-crf",
                "28",
            ]
        );
    }

    #[test]
    fn test_second_input_is_rejected() {
        let output = DirectiveCompiler::new()
            .compile("input a.mp4\ninput b.mp4")
            .unwrap();
        assert_eq!(
            output.error_messages(),
            vec!["Only one input command is allowed"]
        );
        assert_eq!(output.parsed, vec!["input a.mp4"]);
        assert!(output.args.contains(&"a.mp4".to_string()));
        assert!(!output.args.contains(&"b.mp4".to_string()));
    }

    #[test]
    fn test_errors_are_in_source_order() {
        let output = DirectiveCompiler::new()
            .compile("input a.mp4
input b.mp4
blur everything")
            .unwrap();
        assert_eq!(
            output.error_messages(),
            vec!["Only one input command is allowed", "Unknown command: blur"]
        );
        let lines: Vec<_> = output.errors.iter().map(|e| e.location().line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn test_input_override_and_placeholder() {
        let output = DirectiveCompiler::new()
            .input("override.mov")
            .compile("input clip.mp4")
            .unwrap();
        assert_eq!(output.args, vec!["-i", "override.mov"]);

        let output = DirectiveCompiler::new().compile("input /").unwrap();
        assert_eq!(output.args, vec!["-i", INPUT_PLACEHOLDER]);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_overwrite_and_output() {
        let output = DirectiveCompiler::new()
            .input("in.mp4")
            .output("out.mp4")
            .overwrite(true)
            .compile("compress audio")
            .unwrap();
        assert_eq!(
            output.command_line(),
            "ffmpeg -i in.mp4 -y -c:a aac -b:a 128k out.mp4"
        );
    }

    #[test]
    fn test_crops_merge_with_descriptor() {
        let output = DirectiveCompiler::new()
            .descriptor(hd())
            .input("in.mp4")
            .compile("crop 100px from left\ncrop 50px from right")
            .unwrap();
        assert_eq!(output.args, vec!["-i", "in.mp4", "-vf", "crop=1770:1080:100:0"]);
    }

    #[test]
    fn test_crop_overflow_aborts() {
        let result = DirectiveCompiler::new()
            .descriptor(hd())
            .compile("crop 1000px from left; crop 920px from right; compress video");
        assert!(result.is_err());
    }

    #[test]
    fn test_compile_is_repeatable() {
        let compiler = DirectiveCompiler::new().descriptor(hd());
        let text = "crop 10px from each\nbogus\nfade in for 2s\nremove_frames every 4";
        let first = compiler.compile(text).unwrap();
        let second = compiler.compile(text).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.errors.len(), 1);
    }

    #[test]
    fn test_render_formats() {
        let output = DirectiveCompiler::new()
            .input("in.mp4")
            .compile("remove_frames every 3")
            .unwrap();
        assert_eq!(
            output.render(OutputFormat::Lines).unwrap(),
            "-i\nin.mp4\n-vf\ndecimate=cycle=3"
        );
        let json: serde_json::Value =
            serde_json::from_str(&output.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["args"][3], "decimate=cycle=3");
        assert_eq!(json["commands"][0]["type"], "deduplicate");
    }
}
