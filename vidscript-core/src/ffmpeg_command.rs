use serde::Serialize;

/// Where an argument ends up in the final command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Before `-i`
    Input,
    Global,
    VideoFilter,
    AudioFilter,
    Output,
}

/// Ordering key of an argument; lower stages are emitted first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    InputTiming,
    Global,
    VideoFilter,
    AudioFilter,
    OutputFormat,
    OutputCodec,
}

impl Stage {
    pub fn weight(&self) -> u8 {
        match self {
            Stage::InputTiming => 0,
            Stage::Global => 1,
            Stage::VideoFilter => 2,
            Stage::AudioFilter => 3,
            Stage::OutputFormat => 4,
            Stage::OutputCodec => 5,
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            Stage::InputTiming => Destination::Input,
            Stage::Global => Destination::Global,
            Stage::VideoFilter => Destination::VideoFilter,
            Stage::AudioFilter => Destination::AudioFilter,
            Stage::OutputFormat | Stage::OutputCodec => Destination::Output,
        }
    }
}

/// What a filter builder produces for one command node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Raw arguments placed before `-i`
    InputTiming(Vec<String>),
    Global(Vec<String>),
    /// One filter-graph expression, without trailing comma
    VideoFilter(String),
    /// A second video stream from a source filter (e.g. `movie=...`)
    /// composited onto the chain built so far by `placement`
    /// (e.g. `overlay=x:y`)
    VideoOverlay { source: String, placement: String },
    AudioFilter(String),
    Output { stage: Stage, values: Vec<String> },
}

/// A serialized argument group together with its ordering stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedArgument {
    pub destination: Destination,
    pub stage: Stage,
    pub values: Vec<String>,
}

impl ProcessedArgument {
    fn new(stage: Stage, values: Vec<String>) -> Self {
        Self {
            destination: stage.destination(),
            stage,
            values,
        }
    }
}

#[derive(Debug, Clone)]
enum VideoStep {
    Filter(String),
    Overlay { source: String, placement: String },
}

/// Serialize the video steps as one `-vf` graph.
///
/// Without overlays this is a plain `,`-joined chain. Each overlay closes the
/// chain so far under a `[baseN]` label, its source gets its own chain
/// labelled `[wmN]`, and the chain continues from `[baseN][wmN]<placement>`.
fn video_graph(steps: &[VideoStep]) -> String {
    let mut chains = Vec::new();
    let mut head = String::new();
    let mut links: Vec<String> = Vec::new();
    let mut overlays = 0;

    for step in steps {
        match step {
            VideoStep::Filter(filter) => links.push(filter.clone()),
            VideoStep::Overlay { source, placement } => {
                let base = if links.is_empty() {
                    "[in]".to_string()
                } else {
                    let label = format!("[base{}]", overlays);
                    let input = if head.is_empty() { "[in]" } else { head.as_str() };
                    chains.push(format!("{}{}{}", input, links.join(","), label));
                    label
                };
                let stream = format!("[wm{}]", overlays);
                chains.push(format!("{}{}", source, stream));
                head = format!("{}{}", base, stream);
                links = vec![placement.clone()];
                overlays += 1;
            }
        }
    }

    chains.push(format!("{}{}", head, links.join(",")));
    chains.join(";")
}

/// FFmpeg argument assembler with fluent interface
#[derive(Debug, Clone)]
pub struct FFmpegCommand {
    source: String,
    output: Option<String>,
    arguments: Vec<ProcessedArgument>,
    video_filters: Vec<VideoStep>,
    audio_filters: Vec<String>,
}

impl FFmpegCommand {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output: None,
            arguments: Vec::new(),
            video_filters: Vec::new(),
            audio_filters: Vec::new(),
        }
    }

    /// Set the output file, emitted last
    pub fn output(mut self, path: impl Into<String>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Enable overwrite without asking
    pub fn overwrite(self) -> Self {
        self.fragment(Fragment::Global(vec!["-y".to_string()]))
    }

    /// Add a video filter
    pub fn video_filter(mut self, filter: &str) -> Self {
        self.video_filters.push(VideoStep::Filter(filter.to_string()));
        self
    }

    /// Add an audio filter
    pub fn audio_filter(mut self, filter: &str) -> Self {
        self.audio_filters.push(filter.to_string());
        self
    }

    pub fn fragment(mut self, fragment: Fragment) -> Self {
        match fragment {
            Fragment::VideoFilter(filter) => self.video_filters.push(VideoStep::Filter(filter)),
            Fragment::VideoOverlay { source, placement } => self
                .video_filters
                .push(VideoStep::Overlay { source, placement }),
            Fragment::AudioFilter(filter) => self.audio_filters.push(filter),
            Fragment::InputTiming(values) => self
                .arguments
                .push(ProcessedArgument::new(Stage::InputTiming, values)),
            Fragment::Global(values) => self
                .arguments
                .push(ProcessedArgument::new(Stage::Global, values)),
            Fragment::Output { stage, values } => {
                self.arguments.push(ProcessedArgument::new(stage, values))
            }
        }
        self
    }

    /// All argument groups, filters combined into one `-vf` and one `-af`,
    /// sorted by stage weight. Groups of equal weight keep insertion order.
    pub fn processed_arguments(&self) -> Vec<ProcessedArgument> {
        let mut arguments = self.arguments.clone();

        if !self.video_filters.is_empty() {
            arguments.push(ProcessedArgument::new(
                Stage::VideoFilter,
                vec!["-vf".to_string(), video_graph(&self.video_filters)],
            ));
        }

        if !self.audio_filters.is_empty() {
            arguments.push(ProcessedArgument::new(
                Stage::AudioFilter,
                vec!["-af".to_string(), self.audio_filters.join(",")],
            ));
        }

        arguments.sort_by_key(|a| a.stage.weight());
        arguments
    }

    /// Build the argument list: input timing, `-i <source>`, everything
    /// else, then the output file if one was set
    pub fn build(&self) -> Vec<String> {
        let (pre_input, rest): (Vec<_>, Vec<_>) = self
            .processed_arguments()
            .into_iter()
            .partition(|a| a.stage == Stage::InputTiming);

        let mut args: Vec<String> = pre_input.into_iter().flat_map(|a| a.values).collect();
        args.push("-i".to_string());
        args.push(self.source.clone());
        args.extend(rest.into_iter().flat_map(|a| a.values));

        if let Some(ref output) = self.output {
            args.push(output.clone());
        }

        args
    }
}

/// Quote an argument for a POSIX shell when it needs it
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Render an argument list as one `ffmpeg` command line
pub fn command_line(args: &[String]) -> String {
    std::iter::once("ffmpeg".to_string())
        .chain(args.iter().map(|a| shell_quote(a)))
        .collect::<Vec<_>>()
        .join(" ")
}
