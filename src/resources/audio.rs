//! Audio resources: the voice bookkeeping of the [`AudioPlayer`] and the
//! bridge to the background audio thread.
//!
//! The player owns one persistent looping music voice and a growable pool of
//! one-shot voices. A one-shot request reuses the first idle voice, or grows
//! the pool when every voice is busy; the pool is never trimmed. Playback
//! itself happens on the audio thread: the player queues [`AudioCmd`]s that
//! [`forward_audio_cmds`](crate::systems::audio::forward_audio_cmds) hands to
//! the thread, and voices become idle again when the thread reports
//! [`AudioMessage::SfxFinished`].
//!
//! Use [`setup_audio`] once during initialization to spawn the audio thread
//! and insert the [`AudioBridge`] and `Messages<AudioMessage>` resources. Call
//! [`shutdown_audio`] during teardown to gracefully stop the thread.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::resources::address::Address;
use crate::resources::assetcache::AssetCache;
use crate::resources::assetloader::AssetKind;
use crate::systems::audio::audio_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info};

pub const DEFAULT_VOLUME: f32 = 0.5;

/// Which device the audio thread drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBackend {
    /// No output; one-shots finish on the next pump.
    Null,
    #[cfg(feature = "raylib")]
    Raylib,
}

/// Shared bridge between the ECS world and the audio thread.
///
/// This resource is created by [`setup_audio`]. Systems can send commands via
/// [`AudioBridge::tx_cmd`] and poll for events via [`AudioBridge::rx_msg`].
#[derive(Resource)]
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (ECS -> audio thread).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (audio thread -> ECS).
    pub rx_msg: Receiver<AudioMessage>,
    /// Join handle for the background audio thread.
    pub handle: std::thread::JoinHandle<()>,
}

/// Spawn the audio thread and register bridge resources.
pub fn setup_audio(world: &mut World, backend: AudioBackend) {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let (tx_msg, rx_msg) = unbounded::<AudioMessage>();

    let handle = std::thread::spawn(move || audio_thread(rx_cmd, tx_msg, backend));

    world.insert_resource(AudioBridge {
        tx_cmd,
        rx_msg,
        handle,
    });
    world.insert_resource(Messages::<AudioMessage>::default());
}

/// Gracefully request shutdown of the audio thread and join it.
///
/// If the bridge resource exists, sends [`AudioCmd::Shutdown`], waits for the
/// thread to exit, and removes the resource from the world.
pub fn shutdown_audio(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<AudioBridge>() {
        let _ = bridge.tx_cmd.send(AudioCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusicVoice {
    pub clip: Option<Address>,
    pub playing: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SfxVoice {
    pub clip: Option<Address>,
    pub busy: bool,
}

#[derive(Resource, Debug)]
pub struct AudioPlayer {
    music: MusicVoice,
    voices: Vec<SfxVoice>,
    music_volume: f32,
    sfx_volume: f32,
    outbox: Vec<AudioCmd>,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME, DEFAULT_VOLUME)
    }
}

impl AudioPlayer {
    pub fn new(music_volume: f32, sfx_volume: f32) -> Self {
        info!("[AudioPlayer] Initialized");
        AudioPlayer {
            music: MusicVoice::default(),
            voices: Vec::new(),
            music_volume: music_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            outbox: Vec::new(),
        }
    }

    /// Start looping music from a cached clip. A missing clip is logged and
    /// leaves the current track untouched.
    pub fn play_music(&mut self, cache: &mut AssetCache, address: &Address) -> bool {
        let Some(asset) = cache.load(address, AssetKind::Audio) else {
            error!("[AudioPlayer] BGM not found: {}", address);
            return false;
        };
        let Some(clip) = asset.as_audio() else {
            return false;
        };
        self.outbox.push(AudioCmd::PlayMusic {
            address: address.to_string(),
            path: clip.path.clone(),
            vol: self.music_volume,
        });
        self.music = MusicVoice {
            clip: Some(address.clone()),
            playing: true,
        };
        info!("[AudioPlayer] Playing BGM: {}", address);
        true
    }

    pub fn stop_music(&mut self) {
        if self.music.playing {
            self.outbox.push(AudioCmd::StopMusic);
            self.music.playing = false;
        }
    }

    /// Play a one-shot clip. Returns the pool voice it was assigned to.
    pub fn play_sfx(&mut self, cache: &mut AssetCache, address: &Address) -> Option<usize> {
        let Some(asset) = cache.load(address, AssetKind::Audio) else {
            error!("[AudioPlayer] SFX not found: {}", address);
            return None;
        };
        let clip = asset.as_audio()?;
        let voice = self.available_voice();
        self.voices[voice] = SfxVoice {
            clip: Some(address.clone()),
            busy: true,
        };
        self.outbox.push(AudioCmd::PlaySfx {
            voice,
            address: address.to_string(),
            path: clip.path.clone(),
            vol: self.sfx_volume,
        });
        debug!("[AudioPlayer] Playing SFX: {} on voice {}", address, voice);
        Some(voice)
    }

    fn available_voice(&mut self) -> usize {
        if let Some(idle) = self.voices.iter().position(|v| !v.busy) {
            return idle;
        }
        self.voices.push(SfxVoice::default());
        debug!("[AudioPlayer] SFX pool grown to {}", self.voices.len());
        self.voices.len() - 1
    }

    /// Mark a pool voice idle again.
    pub fn voice_finished(&mut self, voice: usize) {
        if let Some(v) = self.voices.get_mut(voice) {
            v.busy = false;
        }
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
        self.outbox.push(AudioCmd::VolumeMusic {
            vol: self.music_volume,
        });
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
        self.outbox.push(AudioCmd::VolumeSfx {
            vol: self.sfx_volume,
        });
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    pub fn sfx_volume(&self) -> f32 {
        self.sfx_volume
    }

    pub fn music(&self) -> &MusicVoice {
        &self.music
    }

    pub fn voices(&self) -> &[SfxVoice] {
        &self.voices
    }

    pub fn sfx_voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Take the queued commands for the audio thread.
    pub fn drain_commands(&mut self) -> Vec<AudioCmd> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::assetloader::{Asset, AssetError, AssetLoader, AudioClip};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Clips;

    impl AssetLoader for Clips {
        fn load(&self, address: &Address, _kind: AssetKind) -> Result<Asset, AssetError> {
            if address.name() == "missing" {
                return Err(AssetError::NotFound(address.clone()));
            }
            Ok(Asset::Audio(AudioClip {
                address: address.clone(),
                path: PathBuf::from(format!("/clips/{}.ogg", address.name())),
            }))
        }
    }

    fn setup() -> (AssetCache, AudioPlayer) {
        (AssetCache::new(Arc::new(Clips)), AudioPlayer::default())
    }

    #[test]
    fn busy_voices_grow_the_pool() {
        let (mut cache, mut player) = setup();
        let click: Address = "audio_sfx/click".into();
        assert_eq!(player.play_sfx(&mut cache, &click), Some(0));
        assert_eq!(player.play_sfx(&mut cache, &click), Some(1));
        assert_eq!(player.play_sfx(&mut cache, &click), Some(2));
        assert_eq!(player.sfx_voice_count(), 3);
    }

    #[test]
    fn first_idle_voice_is_reused() {
        let (mut cache, mut player) = setup();
        let click: Address = "audio_sfx/click".into();
        player.play_sfx(&mut cache, &click);
        player.play_sfx(&mut cache, &click);
        player.voice_finished(0);
        assert_eq!(player.play_sfx(&mut cache, &click), Some(0));
        assert_eq!(player.sfx_voice_count(), 2);
    }

    #[test]
    fn missing_clip_plays_nothing() {
        let (mut cache, mut player) = setup();
        assert_eq!(player.play_sfx(&mut cache, &"audio_sfx/missing".into()), None);
        assert!(!player.play_music(&mut cache, &"audio_bgm/missing".into()));
        assert!(player.drain_commands().is_empty());
        assert_eq!(player.sfx_voice_count(), 0);
    }

    #[test]
    fn volumes_are_clamped_and_sent() {
        let (_cache, mut player) = setup();
        player.set_music_volume(2.0);
        player.set_sfx_volume(-1.0);
        assert_eq!(player.music_volume(), 1.0);
        assert_eq!(player.sfx_volume(), 0.0);
        assert_eq!(
            player.drain_commands(),
            vec![AudioCmd::VolumeMusic { vol: 1.0 }, AudioCmd::VolumeSfx { vol: 0.0 }]
        );
    }

    #[test]
    fn music_replaces_and_stops() {
        let (mut cache, mut player) = setup();
        assert!(player.play_music(&mut cache, &"audio_bgm/main".into()));
        assert!(player.music().playing);
        player.stop_music();
        player.stop_music();
        let cmds = player.drain_commands();
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], AudioCmd::PlayMusic { .. }));
        assert_eq!(cmds[1], AudioCmd::StopMusic);
    }
}
