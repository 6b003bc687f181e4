use crate::error::AudioError;
use std::process::{Child, Command, Stdio};

pub(crate) const LABEL_PLAYING: &str = "♪ music on";
pub(crate) const LABEL_PAUSED: &str = "♪ music off";

pub(crate) trait Playback {
    fn is_paused(&mut self) -> bool;
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
}

/// Plays music by running an external command; pausing stops the process.
pub(crate) struct CommandPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandPlayer {
    pub(crate) fn parse(command: &str) -> Result<Self, AudioError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(AudioError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            child: None,
        })
    }
}

impl Playback for CommandPlayer {
    fn is_paused(&mut self) -> bool {
        match self.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => false,
            Some(_) => {
                // player exited on its own
                self.child = None;
                true
            }
            None => true,
        }
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AudioError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        log::debug!("music started: pid {}", child.id());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.pause();
    }
}

/// Music button: flips playback and keeps a two-state label.
pub(crate) struct AudioToggle<P: Playback> {
    player: P,
    label: &'static str,
}

impl<P: Playback> AudioToggle<P> {
    pub(crate) fn new(player: P) -> Self {
        Self {
            player,
            label: LABEL_PAUSED,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        self.label
    }

    pub(crate) fn toggle(&mut self) {
        if self.player.is_paused() {
            // a failed start is not fatal; the page just stays quiet
            if let Err(e) = self.player.play() {
                log::debug!("music did not start: {e}");
            }
            self.label = LABEL_PLAYING;
        } else {
            self.player.pause();
            self.label = LABEL_PAUSED;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakePlayer {
        playing: bool,
        plays: u32,
        pauses: u32,
        refuse: bool,
    }

    impl Playback for FakePlayer {
        fn is_paused(&mut self) -> bool {
            !self.playing
        }

        fn play(&mut self) -> Result<(), AudioError> {
            self.plays += 1;
            if self.refuse {
                return Err(AudioError::EmptyCommand);
            }
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.pauses += 1;
            self.playing = false;
        }
    }

    #[test]
    fn double_toggle_returns_to_start() {
        let mut a = AudioToggle::new(FakePlayer::default());
        let original = a.label();
        a.toggle();
        assert!(a.player.playing);
        assert_eq!(a.label(), LABEL_PLAYING);
        a.toggle();
        assert!(!a.player.playing);
        assert_eq!(a.label(), original);
        assert_eq!((a.player.plays, a.player.pauses), (1, 1));
    }

    #[test]
    fn rejected_playback_is_ignored() {
        let mut a = AudioToggle::new(FakePlayer {
            refuse: true,
            ..FakePlayer::default()
        });
        a.toggle();
        assert_eq!(a.player.plays, 1);
        assert!(!a.player.playing);
        // next press tries again rather than pausing
        a.toggle();
        assert_eq!(a.player.plays, 2);
        assert_eq!(a.player.pauses, 0);
    }

    #[test]
    fn parses_command_line() {
        let p = CommandPlayer::parse("mpv --loop song.ogg").unwrap();
        assert_eq!(p.program, "mpv");
        assert_eq!(p.args, vec!["--loop", "song.ogg"]);
        assert!(matches!(
            CommandPlayer::parse("   "),
            Err(AudioError::EmptyCommand)
        ));
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let mut p = CommandPlayer::parse("definitely-not-a-real-player-binary").unwrap();
        assert!(p.is_paused());
        assert!(matches!(p.play(), Err(AudioError::Spawn { .. })));
        assert!(p.is_paused());
    }
}
