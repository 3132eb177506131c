//! The command pattern table.
//!
//! Each pattern describes the token shape of one directive relative to its
//! keyword (position 0), a semantic validator over the bound parameters and a
//! constructor for the typed node. The table is built once and never mutated.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::formats::ContainerFormat;
use crate::node::*;
use crate::timecode::parse_seconds;

const TIME_TOKEN: &str = r"^[0-9:.]+$";
const QUOTED_TOKEN: &str = r#"^"[^"]*"$"#;
const POSITION_TOKEN: &str = r"^(top-left|top-right|bottom-left|bottom-right|center)$";

const INPUT_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "mov", "avi", "webm", "flv", "wmv", "m4v", "mpg", "mpeg", "ts", "gif", "mp3",
    "wav", "aac", "flac", "ogg", "m4a", "opus", "srt", "ass", "vtt",
];
const IMAGE_EXTENSIONS: &[&str] = &[".png\"", ".jpeg\"", ".jpg\""];
const SUBTITLE_EXTENSIONS: &[&str] = &[".srt\"", ".ass\""];

static REGISTRY: LazyLock<PatternRegistry> = LazyLock::new(PatternRegistry::builtin);

/// The shared, immutable pattern table
pub fn registry() -> &'static PatternRegistry {
    &REGISTRY
}

/// What a token at a given position has to look like
#[derive(Debug, Clone)]
pub enum TokenMatcher {
    /// Don't care
    Any,
    Literal(&'static str),
    Regex(Regex),
}

impl TokenMatcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TokenMatcher::Any => true,
            TokenMatcher::Literal(expected) => *expected == text,
            TokenMatcher::Regex(re) => re.is_match(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpectedToken {
    pub position: usize,
    pub matcher: TokenMatcher,
    pub param: Option<&'static str>,
    pub optional: bool,
    /// Bound to `param` when an optional token is absent
    pub default: Option<&'static str>,
}

impl ExpectedToken {
    fn literal(position: usize, text: &'static str) -> Self {
        Self {
            position,
            matcher: TokenMatcher::Literal(text),
            param: None,
            optional: false,
            default: None,
        }
    }

    fn regex(position: usize, pattern: &str, param: &'static str) -> Self {
        Self {
            position,
            // Only called with the constant patterns in this module
            matcher: TokenMatcher::Regex(Regex::new(pattern).expect("pattern regex is valid")),
            param: Some(param),
            optional: false,
            default: None,
        }
    }

    fn any(position: usize, param: &'static str) -> Self {
        Self {
            position,
            matcher: TokenMatcher::Any,
            param: Some(param),
            optional: false,
            default: None,
        }
    }

    fn optional(mut self, default: &'static str) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }
}

/// Parameters bound by a successful token match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<&'static str, String>);

impl Params {
    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    /// Bound value, or an empty string when the parameter is missing
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// Rejected, optionally with a reason
    Invalid(Option<String>),
}

impl Validation {
    fn reject(reason: impl Into<String>) -> Self {
        Validation::Invalid(Some(reason.into()))
    }

    fn check(ok: bool, reason: impl Into<String>) -> Self {
        if ok {
            Validation::Valid
        } else {
            Validation::reject(reason)
        }
    }
}

pub struct CommandPattern {
    pub name: &'static str,
    pub usage: &'static str,
    pub expected_tokens: Vec<ExpectedToken>,
    pub validate: fn(&Params) -> Validation,
    /// Only returns `None` for parameters `validate` rejects
    pub create_node: fn(&Params) -> Option<CommandNode>,
}

impl CommandPattern {
    /// Highest declared position, optional entries included
    pub fn max_position(&self) -> usize {
        self.expected_tokens
            .iter()
            .map(|t| t.position)
            .max()
            .unwrap_or(0)
    }

    /// Highest position a directive must supply
    pub fn max_required(&self) -> usize {
        self.expected_tokens
            .iter()
            .filter(|t| !t.optional)
            .map(|t| t.position)
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for CommandPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPattern")
            .field("name", &self.name)
            .field("expected_tokens", &self.expected_tokens)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CommandPattern>,
}

impl PatternRegistry {
    pub fn get(&self, name: &str) -> Option<&CommandPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    pub fn is_command(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandPattern> {
        self.patterns.iter()
    }

    fn builtin() -> Self {
        Self {
            patterns: vec![
                trim_pattern(),
                convert_pattern(),
                compress_pattern(),
                scale_pattern(),
                crop_pattern(),
                fade_pattern(),
                burn_pattern(),
                add_text_pattern(),
                remove_frames_pattern(),
                input_pattern(),
            ],
        }
    }
}

fn unquote(text: &str) -> String {
    text.trim_matches('"').to_string()
}

fn ends_with_any(text: &str, suffixes: &[&str]) -> bool {
    let lower = text.to_lowercase();
    suffixes.iter().any(|s| lower.ends_with(s))
}

fn trim_pattern() -> CommandPattern {
    CommandPattern {
        name: "trim",
        usage: "trim from <start> to <end>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "trim"),
            ExpectedToken::literal(1, "from"),
            ExpectedToken::regex(2, TIME_TOKEN, "start"),
            ExpectedToken::literal(3, "to"),
            ExpectedToken::regex(4, TIME_TOKEN, "end"),
        ],
        validate: |params| {
            match (parse_seconds(params.get("start")), parse_seconds(params.get("end"))) {
                (Some(start), Some(end)) => {
                    Validation::check(end > start, "end time must be after start time")
                }
                _ => Validation::reject("times must be SS, MM:SS or HH:MM:SS"),
            }
        },
        create_node: |params| {
            Some(CommandNode::Trim(TrimParams {
                start: params.get("start").to_string(),
                end: params.get("end").to_string(),
            }))
        },
    }
}

fn convert_pattern() -> CommandPattern {
    CommandPattern {
        name: "convert",
        usage: "convert to <format>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "convert"),
            ExpectedToken::literal(1, "to"),
            ExpectedToken::any(2, "format"),
        ],
        validate: |params| {
            Validation::check(
                ContainerFormat::from_name(params.get("format")).is_some(),
                "unsupported output format",
            )
        },
        create_node: |params| {
            let format = ContainerFormat::from_name(params.get("format"))?;
            Some(CommandNode::Convert(ConvertParams { format }))
        },
    }
}

fn compress_pattern() -> CommandPattern {
    CommandPattern {
        name: "compress",
        usage: "compress <video|audio>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "compress"),
            ExpectedToken::regex(1, r"^(video|audio)$", "target"),
        ],
        validate: |_| Validation::Valid,
        create_node: |params| {
            let target = match params.get("target") {
                "video" => CompressTarget::Video,
                "audio" => CompressTarget::Audio,
                _ => return None,
            };
            Some(CommandNode::Compress(CompressParams { target }))
        },
    }
}

fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once('x')?;
    let width: u32 = w.parse().ok()?;
    let height: u32 = h.parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

fn scale_pattern() -> CommandPattern {
    CommandPattern {
        name: "scale",
        usage: "scale to <W>x<H> <preserve|ignore> aspect ratio",
        expected_tokens: vec![
            ExpectedToken::literal(0, "scale"),
            ExpectedToken::literal(1, "to"),
            ExpectedToken::regex(2, r"^\d+x\d+$", "dimensions"),
            ExpectedToken::regex(3, r"^(preserve|ignore)$", "aspect"),
            ExpectedToken::literal(4, "aspect"),
            ExpectedToken::literal(5, "ratio"),
        ],
        validate: |params| {
            Validation::check(
                parse_dimensions(params.get("dimensions")).is_some(),
                "dimensions must be positive integers",
            )
        },
        create_node: |params| {
            let (width, height) = parse_dimensions(params.get("dimensions"))?;
            let aspect_ratio = match params.get("aspect") {
                "preserve" => AspectRatio::Preserve,
                _ => AspectRatio::Ignore,
            };
            Some(CommandNode::Scale(ScaleParams {
                width,
                height,
                aspect_ratio,
            }))
        },
    }
}

fn parse_pixels(value: &str) -> Option<u32> {
    value.strip_suffix("px").unwrap_or(value).parse().ok()
}

fn crop_pattern() -> CommandPattern {
    CommandPattern {
        name: "crop",
        usage: "crop <N>px from <top|bottom|left|right|width|height|each>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "crop"),
            ExpectedToken::regex(1, r"^\d+px$", "size"),
            ExpectedToken::literal(2, "from"),
            ExpectedToken::regex(3, r"^(top|bottom|left|right|width|height|each)$", "side"),
        ],
        validate: |params| {
            Validation::check(
                parse_pixels(params.get("size")).is_some(),
                "crop size is out of range",
            )
        },
        create_node: |params| {
            Some(CommandNode::Crop(CropParams {
                size: parse_pixels(params.get("size"))?,
                side: CropSide::from_name(params.get("side"))?,
            }))
        },
    }
}

fn parse_fade_duration(value: &str) -> Option<f64> {
    let seconds: f64 = value.strip_suffix('s')?.parse().ok()?;
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

fn fade_pattern() -> CommandPattern {
    CommandPattern {
        name: "fade",
        usage: "fade <in|out|in/out> for <N>s (N > 0)",
        expected_tokens: vec![
            ExpectedToken::literal(0, "fade"),
            ExpectedToken::regex(1, r"^(in|out|in/out)$", "direction"),
            ExpectedToken::literal(2, "for"),
            ExpectedToken::regex(3, r"^\d+(\.\d+)?s$", "duration"),
        ],
        validate: |params| {
            Validation::check(
                parse_fade_duration(params.get("duration")).is_some(),
                "fade duration must be a finite number greater than zero",
            )
        },
        create_node: |params| {
            let direction = match params.get("direction") {
                "in" => FadeDirection::In,
                "out" => FadeDirection::Out,
                "in/out" => FadeDirection::InOut,
                _ => return None,
            };
            Some(CommandNode::Fade(FadeParams {
                direction,
                duration: parse_fade_duration(params.get("duration"))?,
            }))
        },
    }
}

fn burn_pattern() -> CommandPattern {
    CommandPattern {
        name: "burn",
        usage: "burn <text|image|subtitles> \"<content>\" at <position>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "burn"),
            ExpectedToken::regex(1, r"^(text|image|subtitles)$", "kind"),
            ExpectedToken::regex(2, QUOTED_TOKEN, "content"),
            ExpectedToken::literal(3, "at"),
            ExpectedToken::regex(4, POSITION_TOKEN, "position"),
        ],
        validate: |params| {
            let content = params.get("content");
            match params.get("kind") {
                "subtitles" => Validation::check(
                    ends_with_any(content, SUBTITLE_EXTENSIONS),
                    "subtitles must be an .srt or .ass file",
                ),
                "image" => Validation::check(
                    ends_with_any(content, IMAGE_EXTENSIONS),
                    "image must be a .png, .jpeg or .jpg file",
                ),
                _ => Validation::Valid,
            }
        },
        create_node: |params| {
            let kind = match params.get("kind") {
                "text" => OverlayKind::Text,
                "image" => OverlayKind::Image,
                "subtitles" => OverlayKind::Subtitles,
                _ => return None,
            };
            Some(CommandNode::ContentOverlay(ContentOverlayParams {
                kind,
                content: unquote(params.get("content")),
                position: Position::from_name(params.get("position"))?,
            }))
        },
    }
}

fn add_text_pattern() -> CommandPattern {
    CommandPattern {
        name: "add_text",
        usage: "add_text \"<text>\" at <position> [left|center|right] [<N>px]",
        expected_tokens: vec![
            ExpectedToken::literal(0, "add_text"),
            ExpectedToken::regex(1, QUOTED_TOKEN, "text"),
            ExpectedToken::literal(2, "at"),
            ExpectedToken::regex(3, POSITION_TOKEN, "position"),
            ExpectedToken::regex(4, r"^(left|center|right)$", "alignment").optional("left"),
            ExpectedToken::regex(5, r"^\d+(px)?$", "margin").optional("0"),
        ],
        validate: |params| {
            Validation::check(
                parse_pixels(params.get("margin")).is_some(),
                "margin is out of range",
            )
        },
        create_node: |params| {
            let alignment = match params.get("alignment") {
                "center" => TextAlignment::Center,
                "right" => TextAlignment::Right,
                _ => TextAlignment::Left,
            };
            Some(CommandNode::TextOverlay(TextOverlayParams {
                text: unquote(params.get("text")),
                position: Position::from_name(params.get("position"))?,
                alignment,
                margin: parse_pixels(params.get("margin"))?,
            }))
        },
    }
}

fn parse_cycle(value: &str) -> Option<u32> {
    value.parse().ok().filter(|n| (2..=30).contains(n))
}

fn remove_frames_pattern() -> CommandPattern {
    CommandPattern {
        name: "remove_frames",
        usage: "remove_frames every <N>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "remove_frames"),
            ExpectedToken::literal(1, "every"),
            ExpectedToken::any(2, "cycle"),
        ],
        validate: |params| {
            Validation::check(
                parse_cycle(params.get("cycle")).is_some(),
                "cycle must be an integer between 2 and 30",
            )
        },
        create_node: |params| {
            Some(CommandNode::Deduplicate(DeduplicateParams {
                cycle: parse_cycle(params.get("cycle"))?,
            }))
        },
    }
}

fn input_path(value: &str) -> Option<Option<String>> {
    if value == "/" {
        return Some(None);
    }
    let path = unquote(value);
    let (_, extension) = path.rsplit_once('.')?;
    let extension = extension.to_lowercase();
    INPUT_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(Some(path))
}

fn input_pattern() -> CommandPattern {
    CommandPattern {
        name: "input",
        usage: "input <file|\"quoted file\"|/>",
        expected_tokens: vec![
            ExpectedToken::literal(0, "input"),
            ExpectedToken::any(1, "path"),
        ],
        validate: |params| {
            Validation::check(
                input_path(params.get("path")).is_some(),
                "unsupported input file extension",
            )
        },
        create_node: |params| {
            Some(CommandNode::Input(InputParams {
                path: input_path(params.get("path"))?,
            }))
        },
    }
}
