use log::debug;

/// Rate assumed for clips that do not declare one.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Converts wall-clock seconds into clip ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    duration: f32,
    ticks_per_second: f32,
    speed: f32,
}

impl AnimationClock {
    pub fn new(duration: f32, ticks_per_second: f32, speed: f32) -> Self {
        let ticks_per_second = if ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            debug!(
                "Clip has no tick rate, using {} ticks/s",
                DEFAULT_TICKS_PER_SECOND
            );
            DEFAULT_TICKS_PER_SECOND
        };
        Self {
            duration,
            ticks_per_second,
            speed,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Unwrapped ticks elapsed after `seconds` of wall time.
    pub fn ticks(&self, seconds: f32) -> f32 {
        seconds * self.ticks_per_second * self.speed
    }

    /// Clip time at `wall_seconds`, wrapped into `[0, duration)`.
    pub fn anim_time(&self, wall_seconds: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.ticks(wall_seconds).rem_euclid(self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Once { start: f32 },
    Repeat { start: f32 },
    /// Forward, then backward, then forward again.
    PingPong { start: f32 },
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Repeat { start: 0.0 }
    }
}

impl PlaybackState {
    /// Clip time for `wall_seconds`, or `None` when nothing should be posed.
    ///
    /// A `Once` playback past the end of the clip switches to `Stopped`.
    pub fn anim_time(&mut self, clock: &AnimationClock, wall_seconds: f32) -> Option<f32> {
        match *self {
            PlaybackState::Stopped => None,
            PlaybackState::Once { start } => {
                let ticks = clock.ticks((wall_seconds - start).max(0.0));
                if ticks > clock.duration() {
                    *self = PlaybackState::Stopped;
                    return None;
                }
                Some(ticks)
            }
            PlaybackState::Repeat { start } => Some(clock.anim_time(wall_seconds - start)),
            PlaybackState::PingPong { start } => {
                let length = clock.duration();
                if length <= 0.0 {
                    return Some(0.0);
                }
                let progress = clock
                    .ticks(wall_seconds - start)
                    .rem_euclid(2.0 * length);
                if progress > length {
                    Some(2.0 * length - progress)
                } else {
                    Some(progress)
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::*;

    #[test_case(0.0, 0.0 ; "start")]
    #[test_case(1.0, 25.0 ; "one second")]
    #[test_case(4.5, 12.5 ; "wrapped")]
    #[test_case(-1.0, 75.0 ; "before start")]
    fn repeat_wraps_modulo_duration(wall: f32, expected: f32) {
        let clock = AnimationClock::new(100.0, 0.0, 1.0);
        assert!((clock.anim_time(wall) - expected).abs() < 1e-3);
    }

    #[test]
    fn speed_scales_ticks() {
        let clock = AnimationClock::new(10.0, 1.0, 4.0);
        assert!((clock.anim_time(2.0) - 8.0).abs() < 1e-6);
        assert!((clock.anim_time(3.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn empty_clip_stays_at_zero() {
        let clock = AnimationClock::new(0.0, 30.0, 1.0);
        assert_eq!(clock.anim_time(12.0), 0.0);
    }

    #[test_case(0.5, Some(0.5) ; "forward")]
    #[test_case(1.5, Some(0.5) ; "backward")]
    #[test_case(2.25, Some(0.25) ; "forward again")]
    fn ping_pong_reverses(wall: f32, expected: Option<f32>) {
        let clock = AnimationClock::new(1.0, 1.0, 1.0);
        let mut state = PlaybackState::PingPong { start: 0.0 };
        assert_eq!(state.anim_time(&clock, wall), expected);
    }

    #[test]
    fn once_stops_after_the_end() {
        let clock = AnimationClock::new(2.0, 1.0, 1.0);
        let mut state = PlaybackState::Once { start: 1.0 };
        assert_eq!(state.anim_time(&clock, 2.0), Some(1.0));
        assert_eq!(state.anim_time(&clock, 3.5), None);
        assert_eq!(state, PlaybackState::Stopped);
        assert_eq!(state.anim_time(&clock, 1.5), None);
    }
}
