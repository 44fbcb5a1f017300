//! Keyframe tracks and their interpolated lookup.
//!
//! A track holds the time-ordered keys of one transform component of one
//! bone. Sampling treats the track as cyclic: a time before the first key
//! blends from the last key back into the first one.

use std::{fmt::Debug, marker::PhantomData};

use glam::{Quat, Vec3};
use skeletal_asset::animation::AnimationKeyFrame;

pub type Keyframe<T> = AnimationKeyFrame<T>;

/// One transform component a track can animate.
pub trait Channel {
    type Value: Debug + Clone + Copy + PartialEq;

    /// Value of the component when the track carries no animation.
    const IDENTITY: Self::Value;

    fn interpolate(from: Self::Value, to: Self::Value, t: f32) -> Self::Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation;

impl Channel for Translation {
    type Value = Vec3;
    const IDENTITY: Vec3 = Vec3::ZERO;

    fn interpolate(from: Vec3, to: Vec3, t: f32) -> Vec3 {
        from.lerp(to, t)
    }
}

impl Channel for Scale {
    type Value = Vec3;
    const IDENTITY: Vec3 = Vec3::ONE;

    fn interpolate(from: Vec3, to: Vec3, t: f32) -> Vec3 {
        from.lerp(to, t)
    }
}

impl Channel for Rotation {
    type Value = Quat;
    const IDENTITY: Quat = Quat::IDENTITY;

    fn interpolate(from: Quat, to: Quat, t: f32) -> Quat {
        // q and -q are the same rotation; pick the one on from's hemisphere
        let to = if from.dot(to) < 0.0 { -to } else { to };
        from.slerp(to, t).normalize()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<C: Channel> {
    keys: Vec<Keyframe<C::Value>>,
    _channel: PhantomData<C>,
}

pub type TranslationTrack = KeyframeTrack<Translation>;
pub type ScaleTrack = KeyframeTrack<Scale>;
pub type RotationTrack = KeyframeTrack<Rotation>;

impl<C: Channel> Default for KeyframeTrack<C> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            _channel: PhantomData,
        }
    }
}

impl<C: Channel> FromIterator<Keyframe<C::Value>> for KeyframeTrack<C> {
    fn from_iter<I: IntoIterator<Item = Keyframe<C::Value>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<C: Channel> KeyframeTrack<C> {
    /// Keys are kept in the given order.
    pub fn new(keys: Vec<Keyframe<C::Value>>) -> Self {
        Self {
            keys,
            _channel: PhantomData,
        }
    }

    pub fn keys(&self) -> &[Keyframe<C::Value>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A track with at most one key does not animate its component.
    pub fn is_animated(&self) -> bool {
        self.keys.len() > 1
    }

    pub fn is_strictly_ordered(&self) -> bool {
        self.keys.windows(2).all(|pair| pair[0].time < pair[1].time)
    }

    /// Keys bracketing `time` and the blend fraction between them.
    ///
    /// `next` is the first key strictly later than `time`. When that is the
    /// first key, the segment wraps: the last key is placed one period
    /// earlier (the period being the last key's time), i.e. at time zero.
    /// Times at or past the last key hold the last key.
    fn segment(&self, time: f32) -> (usize, usize, f32) {
        let last = self.keys.len() - 1;
        let next = self.keys.partition_point(|key| key.time <= time);
        if next > last {
            return (last, last, 0.0);
        }

        let (prev, prev_time) = if next == 0 {
            (last, 0.0)
        } else {
            (next - 1, self.keys[next - 1].time)
        };
        let span = self.keys[next].time - prev_time;
        let t = if span > 0.0 {
            ((time - prev_time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (prev, next, t)
    }

    pub fn sample(&self, time: f32) -> C::Value {
        if !self.is_animated() {
            return C::IDENTITY;
        }
        let (prev, next, t) = self.segment(time);
        if t == 0.0 {
            return self.keys[prev].value;
        }
        C::interpolate(self.keys[prev].value, self.keys[next].value, t)
    }
}
