//! Audio thread and the systems that bridge it with the ECS world.
//!
//! - [`audio_thread`] runs on its own OS thread, owns the audio device, and
//!   processes [`AudioCmd`] messages, emitting [`AudioMessage`] responses.
//! - [`forward_audio_cmds`] hands the commands queued by the
//!   [`AudioPlayer`] to the thread.
//! - [`poll_audio_messages`] non-blockingly drains the thread's replies into
//!   the ECS message queue, and [`update_bevy_audio_messages`] advances it.
//! - [`sync_audio_voices`] marks pool voices idle when their one-shot ends.
//!
//! Device calls stay on the audio thread; the main thread only talks to it
//! through crossbeam channels.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::resources::audio::{AudioBackend, AudioBridge, AudioPlayer};
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};
use std::path::Path;

/// Output device driven by the audio thread.
pub trait AudioDevice {
    /// Replace the music voice with a looping track.
    fn play_music(&mut self, address: &str, path: &Path, vol: f32) -> Result<(), String>;
    fn stop_music(&mut self);
    fn set_music_volume(&mut self, vol: f32);
    fn play_sfx(&mut self, voice: usize, address: &str, path: &Path, vol: f32) -> Result<(), String>;
    fn set_sfx_volume(&mut self, vol: f32);
    /// Keep streams fed and return the voices whose one-shot ended.
    fn pump(&mut self) -> Vec<usize>;
}

/// Device with no output. One-shots finish on the next pump.
#[derive(Debug, Default)]
pub struct NullAudioDevice {
    music: Option<String>,
    started: Vec<usize>,
}

impl AudioDevice for NullAudioDevice {
    fn play_music(&mut self, address: &str, _path: &Path, _vol: f32) -> Result<(), String> {
        self.music = Some(address.to_string());
        Ok(())
    }

    fn stop_music(&mut self) {
        self.music = None;
    }

    fn set_music_volume(&mut self, _vol: f32) {}

    fn play_sfx(&mut self, voice: usize, _address: &str, _path: &Path, _vol: f32) -> Result<(), String> {
        self.started.push(voice);
        Ok(())
    }

    fn set_sfx_volume(&mut self, _vol: f32) {}

    fn pump(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.started)
    }
}

/// Apply one command to the device. Returns `false` on shutdown.
pub fn handle_audio_cmd<D: AudioDevice>(
    device: &mut D,
    cmd: AudioCmd,
    tx_evt: &Sender<AudioMessage>,
) -> bool {
    match cmd {
        AudioCmd::PlayMusic { address, path, vol } => {
            match device.play_music(&address, &path, vol) {
                Ok(()) => {
                    info!("[audio] music start address='{}'", address);
                    let _ = tx_evt.send(AudioMessage::MusicStarted { address });
                }
                Err(error) => {
                    error!(
                        "[audio] music load failed address='{}' path='{}' error='{}'",
                        address,
                        path.display(),
                        error
                    );
                    let _ = tx_evt.send(AudioMessage::MusicLoadFailed { address, error });
                }
            }
        }
        AudioCmd::StopMusic => {
            device.stop_music();
            let _ = tx_evt.send(AudioMessage::MusicStopped);
        }
        AudioCmd::VolumeMusic { vol } => device.set_music_volume(vol),
        AudioCmd::PlaySfx {
            voice,
            address,
            path,
            vol,
        } => match device.play_sfx(voice, &address, &path, vol) {
            Ok(()) => {
                debug!("[audio] sfx play voice={} address='{}'", voice, address);
                let _ = tx_evt.send(AudioMessage::SfxStarted { voice });
            }
            Err(error) => {
                error!(
                    "[audio] sfx load failed voice={} address='{}' error='{}'",
                    voice, address, error
                );
                let _ = tx_evt.send(AudioMessage::SfxLoadFailed {
                    voice,
                    address,
                    error,
                });
            }
        },
        AudioCmd::VolumeSfx { vol } => device.set_sfx_volume(vol),
        AudioCmd::Shutdown => {
            info!("[audio] shutdown requested");
            device.stop_music();
            return false;
        }
    }
    true
}

fn run_device<D: AudioDevice>(device: &mut D, rx_cmd: &Receiver<AudioCmd>, tx_evt: &Sender<AudioMessage>) {
    'run: loop {
        // 1) Drain commands
        for cmd in rx_cmd.try_iter() {
            if !handle_audio_cmd(device, cmd, tx_evt) {
                break 'run;
            }
        }
        // 2) Pump streams + report finished one-shots
        for voice in device.pump() {
            let _ = tx_evt.send(AudioMessage::SfxFinished { voice });
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}

/// Entry point of the dedicated audio thread.
///
/// Creates the device for `backend`, then loops: drain commands, pump the
/// device, sleep briefly. Returns after [`AudioCmd::Shutdown`] or when the
/// command channel disconnects.
pub fn audio_thread(rx_cmd: Receiver<AudioCmd>, tx_evt: Sender<AudioMessage>, backend: AudioBackend) {
    info!(
        "[audio] thread starting (id={:?}, backend={:?})",
        std::thread::current().id(),
        backend
    );
    match backend {
        AudioBackend::Null => run_device(&mut NullAudioDevice::default(), &rx_cmd, &tx_evt),
        #[cfg(feature = "raylib")]
        AudioBackend::Raylib => match raylib::core::audio::RaylibAudio::init_audio_device() {
            Ok(audio) => {
                let mut device = raylib_device::RaylibAudioDevice::new(&audio);
                run_device(&mut device, &rx_cmd, &tx_evt);
            }
            Err(e) => {
                warn!("[audio] device init failed, falling back to silence: {}", e);
                run_device(&mut NullAudioDevice::default(), &rx_cmd, &tx_evt);
            }
        },
    }
    info!("[audio] thread exiting (id={:?})", std::thread::current().id());
}

/// Hand queued player commands to the audio thread.
pub fn forward_audio_cmds(bridge: Res<AudioBridge>, mut player: ResMut<AudioPlayer>) {
    for cmd in player.drain_commands() {
        // ignore send error on shutdown
        let _ = bridge.tx_cmd.send(cmd);
    }
}

/// Drain any pending events from the audio thread into the ECS
/// [`Messages<AudioMessage>`] mailbox.
pub fn poll_audio_messages(bridge: Res<AudioBridge>, mut writer: MessageWriter<AudioMessage>) {
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Advance the ECS message queue for [`AudioMessage`].
pub fn update_bevy_audio_messages(mut msgs: ResMut<Messages<AudioMessage>>) {
    msgs.update();
}

/// Release pool voices whose one-shot has ended or failed to start.
pub fn sync_audio_voices(mut reader: MessageReader<AudioMessage>, mut player: ResMut<AudioPlayer>) {
    for msg in reader.read() {
        match msg {
            AudioMessage::SfxFinished { voice } | AudioMessage::SfxLoadFailed { voice, .. } => {
                player.voice_finished(*voice)
            }
            _ => {}
        }
    }
}

#[cfg(feature = "raylib")]
mod raylib_device {
    use super::AudioDevice;
    use raylib::core::audio::{Music, RaylibAudio, Sound};
    use rustc_hash::FxHashSet;
    use std::path::Path;

    pub struct RaylibAudioDevice<'a> {
        audio: &'a RaylibAudio,
        music: Option<Music<'a>>,
        voices: Vec<Option<(String, Sound<'a>)>>,
        playing: FxHashSet<usize>,
        sfx_vol: f32,
    }

    impl<'a> RaylibAudioDevice<'a> {
        pub fn new(audio: &'a RaylibAudio) -> Self {
            RaylibAudioDevice {
                audio,
                music: None,
                voices: Vec::new(),
                playing: FxHashSet::default(),
                sfx_vol: 1.0,
            }
        }
    }

    impl<'a> AudioDevice for RaylibAudioDevice<'a> {
        fn play_music(&mut self, _address: &str, path: &Path, vol: f32) -> Result<(), String> {
            let audio: &'a RaylibAudio = self.audio;
            let music = audio
                .new_music(&path.to_string_lossy())
                .map_err(|e| e.to_string())?;
            music.set_volume(vol);
            music.play_stream();
            self.music = Some(music);
            Ok(())
        }

        fn stop_music(&mut self) {
            if let Some(music) = self.music.take() {
                music.stop_stream();
            }
        }

        fn set_music_volume(&mut self, vol: f32) {
            if let Some(music) = &self.music {
                music.set_volume(vol);
            }
        }

        fn play_sfx(&mut self, voice: usize, address: &str, path: &Path, vol: f32) -> Result<(), String> {
            if self.voices.len() <= voice {
                self.voices.resize_with(voice + 1, || None);
            }
            let reuse = matches!(&self.voices[voice], Some((loaded, _)) if loaded == address);
            if !reuse {
                let audio: &'a RaylibAudio = self.audio;
                let sound = audio
                    .new_sound(&path.to_string_lossy())
                    .map_err(|e| e.to_string())?;
                self.voices[voice] = Some((address.to_string(), sound));
            }
            if let Some((_, sound)) = &self.voices[voice] {
                sound.set_volume(vol);
                sound.play();
                self.playing.insert(voice);
            }
            Ok(())
        }

        fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_vol = vol;
            for (_, sound) in self.voices.iter().flatten() {
                sound.set_volume(vol);
            }
        }

        fn pump(&mut self) -> Vec<usize> {
            if let Some(music) = &self.music {
                if music.is_stream_playing() {
                    music.update_stream();
                } else if music.get_time_played() >= music.get_time_length() - 0.01 {
                    // Looping voice: restart when the track runs out.
                    music.seek_stream(0.0);
                    music.play_stream();
                }
            }
            let ended: Vec<usize> = self
                .playing
                .iter()
                .copied()
                .filter(|v| {
                    self.voices
                        .get(*v)
                        .and_then(|s| s.as_ref())
                        .map(|(_, sound)| !sound.is_playing())
                        .unwrap_or(true)
                })
                .collect();
            for v in &ended {
                self.playing.remove(v);
            }
            ended
        }
    }
}
