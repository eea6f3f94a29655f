use tracing::warn;

use super::builder::Call;
use crate::station::{AutodjFormat, FrontendType};

const SAMPLE_RATE: u32 = 44100;

/// Pick the encoder for a mount. Shoutcast 2 has no Vorbis support, so Ogg mounts
/// there fall back to MP3.
pub fn encoder_for(format: AutodjFormat, bitrate: u32, frontend: FrontendType) -> Call {
    match (format, frontend) {
        (AutodjFormat::Aac, _) => aac(bitrate),
        (AutodjFormat::Ogg, FrontendType::Shoutcast2) => {
            warn!("Ogg mounts aren't supported by Shoutcast 2, encoding as MP3 instead");
            mp3(bitrate)
        }
        (AutodjFormat::Ogg, _) => vorbis(bitrate),
        (AutodjFormat::Mp3, _) => mp3(bitrate),
    }
}

/// HE-AAC v2, stereo, ADTS framing.
fn aac(bitrate: u32) -> Call {
    Call::new("%fdkaac")
        .named("channels", 2u32)
        .named("samplerate", SAMPLE_RATE)
        .named("bitrate", bitrate)
        .named("afterburner", true)
        .named("aot", "mpeg4_he_aac_v2")
        .named("transmux", "adts")
        .named("sbr_mode", true)
}

fn vorbis(bitrate: u32) -> Call {
    Call::new("%vorbis.cbr")
        .named("samplerate", SAMPLE_RATE)
        .named("channels", 2u32)
        .named("bitrate", bitrate)
}

fn mp3(bitrate: u32) -> Call {
    Call::new("%mp3.cbr")
        .named("samplerate", SAMPLE_RATE)
        .named("stereo", true)
        .named("bitrate", bitrate)
}
