use std::fmt::Display;

use fxhash::FxHashSet;

/// Sound cues the game asks the host to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Pointer passes a segment boundary
    Click,
    /// Wheel stops, and again when the count-up ends
    Landing,
    /// Loops while the balance counts up
    Countup,
}

impl Sound {
    /// Asset name the host registered the sound under.
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Click => "wheel-click",
            Sound::Landing => "wheel-landing",
            Sound::Countup => "credits-rollup",
        }
    }

    pub fn all() -> [Sound; 3] {
        [Sound::Click, Sound::Landing, Sound::Countup]
    }
}

impl Display for Sound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub trait SoundBoard {
    fn play(&mut self, sound: Sound, looped: bool);
    fn stop(&mut self, sound: Sound);
}

/// Sound board that tracks which assets exist and what is playing. Playing a
/// sound that was never registered is silently skipped.
#[derive(Default, Debug)]
pub struct Jukebox {
    registered: FxHashSet<&'static str>,
    playing: FxHashSet<Sound>,
    /// Every sound actually started, in order
    history: Vec<Sound>,
}

impl Jukebox {
    pub fn new() -> Jukebox {
        Jukebox::default()
    }

    /// A jukebox with every game sound registered.
    pub fn with_all() -> Jukebox {
        let mut jukebox = Jukebox::new();
        for sound in Sound::all() {
            jukebox.register(sound.name());
        }
        jukebox
    }

    pub fn register(&mut self, name: &'static str) {
        self.registered.insert(name);
    }

    pub fn is_playing(&self, sound: Sound) -> bool {
        self.playing.contains(&sound)
    }

    pub fn history(&self) -> &[Sound] {
        &self.history
    }

    pub fn count(&self, sound: Sound) -> usize {
        self.history.iter().filter(|&&s| s == sound).count()
    }
}

impl SoundBoard for Jukebox {
    fn play(&mut self, sound: Sound, looped: bool) {
        if !self.registered.contains(sound.name()) {
            log::debug!("No sound registered as {}; skipping", sound);
            return;
        }
        log::trace!("Playing {} (looped: {})", sound, looped);
        if looped {
            self.playing.insert(sound);
        }
        self.history.push(sound);
    }

    fn stop(&mut self, sound: Sound) {
        self.playing.remove(&sound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_sounds_are_ignored() {
        let mut jukebox = Jukebox::new();
        jukebox.register(Sound::Click.name());
        jukebox.play(Sound::Landing, false);
        jukebox.play(Sound::Click, false);
        assert_eq!(jukebox.history(), &[Sound::Click]);
    }

    #[test]
    fn looped_sounds_play_until_stopped() {
        let mut jukebox = Jukebox::with_all();
        jukebox.play(Sound::Countup, true);
        assert!(jukebox.is_playing(Sound::Countup));
        jukebox.stop(Sound::Countup);
        assert!(!jukebox.is_playing(Sound::Countup));
        assert_eq!(jukebox.count(Sound::Countup), 1);
    }
}
