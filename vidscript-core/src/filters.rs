//! Per-node filter builders.
//!
//! Each builder maps one command node to the fragments of a single
//! destination. Builders are pure; anything they cannot express exactly is
//! reported through `warnings`.

use crate::crop::CropAccumulator;
use crate::descriptor::{MediaDescriptor, Resolution};
use crate::ffmpeg_command::{Fragment, Stage};
use crate::node::*;

/// Distance from the frame edge for `burn` overlays
const BURN_MARGIN: u32 = 10;
const FONT_SIZE: u32 = 24;

/// Build the fragments for one node
pub fn build_fragments(
    node: &CommandNode,
    descriptor: Option<&MediaDescriptor>,
    warnings: &mut Vec<String>,
) -> Vec<Fragment> {
    let resolution = descriptor.and_then(|d| d.resolution);

    match node {
        CommandNode::Trim(trim) => vec![
            Fragment::InputTiming(vec!["-ss".to_string(), trim.start.clone()]),
            Fragment::InputTiming(vec!["-to".to_string(), trim.end.clone()]),
        ],
        CommandNode::Convert(convert) => vec![Fragment::Output {
            stage: Stage::OutputFormat,
            values: vec!["-f".to_string(), convert.format.muxer().to_string()],
        }],
        CommandNode::Compress(compress) => vec![compress_fragment(compress.target)],
        CommandNode::Scale(scale) => vec![Fragment::VideoFilter(scale_filter(scale))],
        CommandNode::Crop(crop) => vec![Fragment::VideoFilter(crop_filter(crop, resolution))],
        CommandNode::OptimizedCrop(crop) => {
            vec![Fragment::VideoFilter(optimized_crop_filter(crop, resolution))]
        }
        CommandNode::Fade(fade) => {
            let duration = descriptor.and_then(|d| d.duration);
            fade_filter(fade, duration, warnings)
                .map(Fragment::VideoFilter)
                .into_iter()
                .collect()
        }
        CommandNode::TextOverlay(text) => vec![Fragment::VideoFilter(text_overlay_filter(text))],
        CommandNode::ContentOverlay(overlay) => vec![content_overlay_fragment(overlay)],
        CommandNode::Deduplicate(dedup) => {
            vec![Fragment::VideoFilter(format!("decimate=cycle={}", dedup.cycle))]
        }
        // Consumed by the compiler, never compiled to an argument
        CommandNode::Input(_) | CommandNode::Comment(_) => Vec::new(),
    }
}

fn compress_fragment(target: CompressTarget) -> Fragment {
    let values: &[&str] = match target {
        CompressTarget::Video => &["-c:v", "libx264", "-crf", "28"],
        CompressTarget::Audio => &["-c:a", "aac", "-b:a", "128k"],
    };
    Fragment::Output {
        stage: Stage::OutputCodec,
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

fn scale_filter(scale: &ScaleParams) -> String {
    match scale.aspect_ratio {
        AspectRatio::Preserve => format!(
            "scale={}:{}:force_original_aspect_ratio=decrease",
            scale.width, scale.height
        ),
        AspectRatio::Ignore => format!("scale={}:{}", scale.width, scale.height),
    }
}

fn crop_filter(crop: &CropParams, resolution: Option<Resolution>) -> String {
    if crop.size == 0 {
        return "cropdetect".to_string();
    }
    let mut edges = CropAccumulator::default();
    edges.add(crop);
    edges_filter(&edges, resolution)
}

fn optimized_crop_filter(crop: &OptimizedCropParams, resolution: Option<Resolution>) -> String {
    let edges = CropAccumulator {
        left: crop.left,
        right: crop.right,
        top: crop.top,
        bottom: crop.bottom,
        detect: crop.detect,
    };
    if edges.is_zero() {
        return "cropdetect".to_string();
    }
    // Detection runs on the uncropped frame, ahead of the net crop
    if edges.detect {
        return format!("cropdetect,{}", edges_filter(&edges, resolution));
    }
    edges_filter(&edges, resolution)
}

/// `crop=w:h:x:y` from per-edge totals, literal when the frame size is known
fn edges_filter(edges: &CropAccumulator, resolution: Option<Resolution>) -> String {
    let horizontal = edges.left.saturating_add(edges.right);
    let vertical = edges.top.saturating_add(edges.bottom);

    let (width, height) = match resolution {
        Some(r) => (
            r.width.saturating_sub(horizontal).to_string(),
            r.height.saturating_sub(vertical).to_string(),
        ),
        None => (
            symbolic_dimension("iw", horizontal),
            symbolic_dimension("ih", vertical),
        ),
    };

    format!("crop={}:{}:{}:{}", width, height, edges.left, edges.top)
}

fn symbolic_dimension(symbol: &str, minus: u32) -> String {
    if minus == 0 {
        symbol.to_string()
    } else {
        format!("{}-{}", symbol, minus)
    }
}

/// Seconds with at most millisecond precision and no trailing zeros
fn format_seconds(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn fade_filter(
    fade: &FadeParams,
    media_duration: Option<f64>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let length = format_seconds(fade.duration);

    if let Some(total) = media_duration
        && fade.duration > total
    {
        warnings.push(format!(
            "fade duration {}s exceeds media duration {}s",
            length,
            format_seconds(total)
        ));
    }

    let fade_in = format!("fade=t=in:st=0:d={}", length);
    let fade_out = media_duration.map(|total| {
        format!(
            "fade=t=out:st={}:d={}",
            format_seconds((total - fade.duration).max(0.0)),
            length
        )
    });

    match (fade.direction, fade_out) {
        (FadeDirection::In, _) => Some(fade_in),
        (FadeDirection::Out, Some(out)) => Some(out),
        (FadeDirection::InOut, Some(out)) => Some(format!("{},{}", fade_in, out)),
        (FadeDirection::Out, None) => {
            warnings.push(format!(
                "fade out for {}s needs the media duration; skipped",
                length
            ));
            None
        }
        (FadeDirection::InOut, None) => {
            warnings.push(format!(
                "fade out for {}s needs the media duration; only the fade in was applied",
                length
            ));
            Some(fade_in)
        }
    }
}

/// Quote a value for a filter-graph option
fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn edge_offset(axis: &str, margin: u32) -> String {
    if margin == 0 {
        axis.to_string()
    } else {
        format!("{}-{}", axis, margin)
    }
}

/// x/y expressions placing an item of size (`item_w`, `item_h`) inside a
/// frame of size (`frame_w`, `frame_h`)
fn place(
    position: Position,
    margin: u32,
    (frame_w, frame_h): (&str, &str),
    (item_w, item_h): (&str, &str),
) -> (String, String) {
    let near = margin.to_string();
    let far_x = edge_offset(&format!("{}-{}", frame_w, item_w), margin);
    let far_y = edge_offset(&format!("{}-{}", frame_h, item_h), margin);

    match position {
        Position::TopLeft => (near.clone(), near),
        Position::TopRight => (far_x, near),
        Position::BottomLeft => (near, far_y),
        Position::BottomRight => (far_x, far_y),
        Position::Center => (
            format!("({}-{})/2", frame_w, item_w),
            format!("({}-{})/2", frame_h, item_h),
        ),
    }
}

fn drawtext(text: &str, position: Position, margin: u32) -> String {
    let (x, y) = place(position, margin, ("w", "h"), ("tw", "th"));
    format!(
        "drawtext=text={}:x={}:y={}:fontsize={}:fontcolor=white",
        quote_filter_value(text),
        x,
        y,
        FONT_SIZE
    )
}

fn text_overlay_filter(text: &TextOverlayParams) -> String {
    let align = match text.alignment {
        TextAlignment::Left => "L",
        TextAlignment::Center => "C",
        TextAlignment::Right => "R",
    };
    format!(
        "{}:text_align={}",
        drawtext(&text.text, text.position, text.margin),
        align
    )
}

/// ASS numpad alignment for a subtitle position
fn subtitle_alignment(position: Position) -> u8 {
    match position {
        Position::BottomLeft => 1,
        Position::BottomRight => 3,
        Position::Center => 5,
        Position::TopLeft => 7,
        Position::TopRight => 9,
    }
}

fn content_overlay_fragment(overlay: &ContentOverlayParams) -> Fragment {
    match overlay.kind {
        OverlayKind::Text => {
            Fragment::VideoFilter(drawtext(&overlay.content, overlay.position, BURN_MARGIN))
        }
        OverlayKind::Subtitles => Fragment::VideoFilter(format!(
            "subtitles=f={}:force_style='Alignment={}'",
            quote_filter_value(&overlay.content),
            subtitle_alignment(overlay.position)
        )),
        OverlayKind::Image => {
            let (x, y) = place(overlay.position, BURN_MARGIN, ("W", "H"), ("w", "h"));
            Fragment::VideoOverlay {
                source: format!("movie={}", quote_filter_value(&overlay.content)),
                placement: format!("overlay={}:{}", x, y),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::ContainerFormat;
    use pretty_assertions::assert_eq;

    fn hd() -> MediaDescriptor {
        MediaDescriptor::default()
            .with_resolution(Resolution {
                width: 1920,
                height: 1080,
            })
            .with_duration(60.0)
    }

    fn build(node: CommandNode, descriptor: Option<&MediaDescriptor>) -> Vec<Fragment> {
        let mut warnings = Vec::new();
        build_fragments(&node, descriptor, &mut warnings)
    }

    fn video(filter: &str) -> Vec<Fragment> {
        vec![Fragment::VideoFilter(filter.to_string())]
    }

    #[test]
    fn test_trim_is_input_timing() {
        let node = CommandNode::Trim(TrimParams {
            start: "1:30".to_string(),
            end: "3:45".to_string(),
        });
        assert_eq!(
            build(node, None),
            vec![
                Fragment::InputTiming(vec!["-ss".to_string(), "1:30".to_string()]),
                Fragment::InputTiming(vec!["-to".to_string(), "3:45".to_string()]),
            ]
        );
    }

    #[test]
    fn test_convert_and_compress_are_output_args() {
        let convert = CommandNode::Convert(ConvertParams {
            format: ContainerFormat::Mkv,
        });
        assert_eq!(
            build(convert, None),
            vec![Fragment::Output {
                stage: Stage::OutputFormat,
                values: vec!["-f".to_string(), "matroska".to_string()],
            }]
        );

        let compress = CommandNode::Compress(CompressParams {
            target: CompressTarget::Audio,
        });
        match &build(compress, None)[..] {
            [Fragment::Output { stage, values }] => {
                assert_eq!(*stage, Stage::OutputCodec);
                assert_eq!(values[0], "-c:a");
            }
            other => panic!("unexpected fragments: {other:?}"),
        }
    }

    #[test]
    fn test_scale_filters() {
        let preserve = CommandNode::Scale(ScaleParams {
            width: 1280,
            height: 720,
            aspect_ratio: AspectRatio::Preserve,
        });
        assert_eq!(
            build(preserve, None),
            video("scale=1280:720:force_original_aspect_ratio=decrease")
        );

        let ignore = CommandNode::Scale(ScaleParams {
            width: 640,
            height: 480,
            aspect_ratio: AspectRatio::Ignore,
        });
        assert_eq!(build(ignore, None), video("scale=640:480"));
    }

    #[test]
    fn test_crop_with_known_resolution() {
        let cases = [
            (CropSide::Left, "crop=1820:1080:100:0"),
            (CropSide::Right, "crop=1820:1080:0:0"),
            (CropSide::Top, "crop=1920:980:0:100"),
            (CropSide::Bottom, "crop=1920:980:0:0"),
            (CropSide::Width, "crop=1720:1080:100:0"),
            (CropSide::Height, "crop=1920:880:0:100"),
            (CropSide::Each, "crop=1720:880:100:100"),
        ];
        for (side, expected) in cases {
            let node = CommandNode::Crop(CropParams { size: 100, side });
            assert_eq!(build(node, Some(&hd())), video(expected), "{side:?}");
        }
    }

    #[test]
    fn test_crop_without_resolution_is_symbolic() {
        let node = CommandNode::Crop(CropParams {
            size: 40,
            side: CropSide::Each,
        });
        assert_eq!(build(node, None), video("crop=iw-80:ih-80:40:40"));

        let node = CommandNode::Crop(CropParams {
            size: 40,
            side: CropSide::Left,
        });
        assert_eq!(build(node, None), video("crop=iw-40:ih:40:0"));
    }

    #[test]
    fn test_zero_crop_detects_borders() {
        let node = CommandNode::Crop(CropParams {
            size: 0,
            side: CropSide::Each,
        });
        assert_eq!(build(node.clone(), None), video("cropdetect"));
        assert_eq!(build(node, Some(&hd())), video("cropdetect"));
    }

    #[test]
    fn test_optimized_crop() {
        let node = CommandNode::OptimizedCrop(OptimizedCropParams {
            left: 100,
            right: 50,
            top: 0,
            bottom: 0,
            detect: false,
        });
        assert_eq!(
            build(node.clone(), Some(&hd())),
            video("crop=1770:1080:100:0")
        );
        assert_eq!(build(node, None), video("crop=iw-150:ih:100:0"));
    }

    #[test]
    fn test_optimized_crop_keeps_border_detection() {
        let node = CommandNode::OptimizedCrop(OptimizedCropParams {
            left: 100,
            right: 0,
            top: 0,
            bottom: 0,
            detect: true,
        });
        assert_eq!(
            build(node, Some(&hd())),
            video("cropdetect,crop=1820:1080:100:0")
        );

        let only_detect = CommandNode::OptimizedCrop(OptimizedCropParams {
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
            detect: true,
        });
        assert_eq!(build(only_detect, None), video("cropdetect"));
    }

    #[test]
    fn test_fade_in_out() {
        let node = CommandNode::Fade(FadeParams {
            direction: FadeDirection::InOut,
            duration: 1.5,
        });
        assert_eq!(
            build(node, Some(&hd())),
            video("fade=t=in:st=0:d=1.5,fade=t=out:st=58.5:d=1.5")
        );
    }

    #[test]
    fn test_fade_out_without_duration_warns() {
        let node = CommandNode::Fade(FadeParams {
            direction: FadeDirection::Out,
            duration: 2.0,
        });
        let mut warnings = Vec::new();
        assert!(build_fragments(&node, None, &mut warnings).is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_fade_longer_than_media_warns() {
        let node = CommandNode::Fade(FadeParams {
            direction: FadeDirection::In,
            duration: 90.0,
        });
        let mut warnings = Vec::new();
        let fragments = build_fragments(&node, Some(&hd()), &mut warnings);
        assert_eq!(fragments, video("fade=t=in:st=0:d=90"));
        assert_eq!(warnings, vec!["fade duration 90s exceeds media duration 60s"]);
    }

    #[test]
    fn test_text_overlay() {
        let node = CommandNode::TextOverlay(TextOverlayParams {
            text: "It's live".to_string(),
            position: Position::BottomRight,
            alignment: TextAlignment::Center,
            margin: 20,
        });
        assert_eq!(
            build(node, None),
            video(
                r"drawtext=text='It'\''s live':x=w-tw-20:y=h-th-20:fontsize=24:fontcolor=white:text_align=C"
            )
        );
    }

    #[test]
    fn test_content_overlays() {
        let subs = CommandNode::ContentOverlay(ContentOverlayParams {
            kind: OverlayKind::Subtitles,
            content: "subs.srt".to_string(),
            position: Position::TopLeft,
        });
        assert_eq!(
            build(subs, None),
            video("subtitles=f='subs.srt':force_style='Alignment=7'")
        );

        let image = CommandNode::ContentOverlay(ContentOverlayParams {
            kind: OverlayKind::Image,
            content: "logo.png".to_string(),
            position: Position::TopRight,
        });
        assert_eq!(
            build(image, None),
            vec![Fragment::VideoOverlay {
                source: "movie='logo.png'".to_string(),
                placement: "overlay=W-w-10:10".to_string(),
            }]
        );

        let text = CommandNode::ContentOverlay(ContentOverlayParams {
            kind: OverlayKind::Text,
            content: "Hello".to_string(),
            position: Position::Center,
        });
        assert_eq!(
            build(text, None),
            video("drawtext=text='Hello':x=(w-tw)/2:y=(h-th)/2:fontsize=24:fontcolor=white")
        );
    }

    #[test]
    fn test_inert_nodes_produce_nothing() {
        let input = CommandNode::Input(InputParams {
            path: Some("a.mp4".to_string()),
        });
        let comment = CommandNode::Comment(CommentParams {
            text: "# note".to_string(),
        });
        assert!(build(input, None).is_empty());
        assert!(build(comment, None).is_empty());
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(2.0), "2");
        assert_eq!(format_seconds(10.3 - 1.1), "9.2");
        assert_eq!(format_seconds(0.125), "0.125");
    }
}
