use serde::Serialize;

/// Output containers accepted by `convert to <fmt>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Mkv,
    Mov,
    Avi,
    Webm,
    Flv,
    Gif,
    Mp3,
    Wav,
    Aac,
    Flac,
    Ogg,
    M4a,
}

impl ContainerFormat {
    pub const ALL: [ContainerFormat; 13] = [
        ContainerFormat::Mp4,
        ContainerFormat::Mkv,
        ContainerFormat::Mov,
        ContainerFormat::Avi,
        ContainerFormat::Webm,
        ContainerFormat::Flv,
        ContainerFormat::Gif,
        ContainerFormat::Mp3,
        ContainerFormat::Wav,
        ContainerFormat::Aac,
        ContainerFormat::Flac,
        ContainerFormat::Ogg,
        ContainerFormat::M4a,
    ];

    /// Name used in directives
    pub fn name(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mkv => "mkv",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Avi => "avi",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Flv => "flv",
            ContainerFormat::Gif => "gif",
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::Wav => "wav",
            ContainerFormat::Aac => "aac",
            ContainerFormat::Flac => "flac",
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::M4a => "m4a",
        }
    }

    /// Get format from the name used in directives
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }

    /// Name of the FFmpeg muxer passed to `-f`
    pub fn muxer(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mkv => "matroska",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Avi => "avi",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Flv => "flv",
            ContainerFormat::Gif => "gif",
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::Wav => "wav",
            ContainerFormat::Aac => "adts",
            ContainerFormat::Flac => "flac",
            ContainerFormat::Ogg => "ogg",
            // m4a is an mp4 container restricted to audio
            ContainerFormat::M4a => "ipod",
        }
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(
            self,
            ContainerFormat::Mp3
                | ContainerFormat::Wav
                | ContainerFormat::Aac
                | ContainerFormat::Flac
                | ContainerFormat::Ogg
                | ContainerFormat::M4a
        )
    }

    /// Get description of the format
    pub fn description(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "MPEG-4 Part 14, the most widely playable video container",
            ContainerFormat::Mkv => "Matroska, flexible container for any codec",
            ContainerFormat::Mov => "QuickTime movie",
            ContainerFormat::Avi => "Audio Video Interleave (legacy)",
            ContainerFormat::Webm => "WebM for browsers (VP8/VP9/AV1)",
            ContainerFormat::Flv => "Flash video (legacy streaming)",
            ContainerFormat::Gif => "Animated GIF, no audio",
            ContainerFormat::Mp3 => "MP3 audio",
            ContainerFormat::Wav => "Uncompressed WAV audio",
            ContainerFormat::Aac => "Raw AAC audio (ADTS)",
            ContainerFormat::Flac => "Lossless FLAC audio",
            ContainerFormat::Ogg => "Ogg audio",
            ContainerFormat::M4a => "AAC audio in an MPEG-4 container",
        }
    }
}
