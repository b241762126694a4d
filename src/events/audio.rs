use bevy_ecs::message::Message;
use std::path::PathBuf;

/// Commands sent *to* the audio thread
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Start the looping music voice on `path`, replacing the current track.
    PlayMusic { address: String, path: PathBuf, vol: f32 },
    StopMusic,
    VolumeMusic { vol: f32 },
    /// Play a one-shot clip on pool voice `voice`.
    PlaySfx {
        voice: usize,
        address: String,
        path: PathBuf,
        vol: f32,
    },
    /// Apply a volume to every pool voice.
    VolumeSfx { vol: f32 },
    Shutdown,
}

/// Events sent *back* from the audio thread
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AudioMessage {
    MusicStarted { address: String },
    MusicStopped,
    MusicLoadFailed { address: String, error: String },
    SfxStarted { voice: usize },
    SfxFinished { voice: usize },
    SfxLoadFailed { voice: usize, address: String, error: String },
}
