//! Hand landmarks in pixel space.

use std::{fmt, str::FromStr};

use nalgebra::{Point2, Rotation2, Vector2};
use thiserror::Error;

use crate::image::{draw, Color, Image};

/// Number of landmarks per hand.
pub const NUM_LANDMARKS: usize = 21;

/// Names for the hand pose landmarks.
///
/// The discriminant of every variant is the landmark's index in engine output and in
/// [`Hand::landmarks`]. These indices are fixed.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **IP**: Interphalangeal joint, the thumb's only joint between MCP and tip.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LandmarkIdx {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl LandmarkIdx {
    /// All landmarks, in index order.
    pub const ALL: [Self; NUM_LANDMARKS] = {
        use LandmarkIdx::*;
        [
            Wrist,
            ThumbCmc,
            ThumbMcp,
            ThumbIp,
            ThumbTip,
            IndexFingerMcp,
            IndexFingerPip,
            IndexFingerDip,
            IndexFingerTip,
            MiddleFingerMcp,
            MiddleFingerPip,
            MiddleFingerDip,
            MiddleFingerTip,
            RingFingerMcp,
            RingFingerPip,
            RingFingerDip,
            RingFingerTip,
            PinkyMcp,
            PinkyPip,
            PinkyDip,
            PinkyTip,
        ]
    };

    /// The landmarks on the tip of each finger, from thumb to pinky.
    pub const TIPS: [Self; 5] = [
        Self::ThumbTip,
        Self::IndexFingerTip,
        Self::MiddleFingerTip,
        Self::RingFingerTip,
        Self::PinkyTip,
    ];

    /// Returns the landmark with the given index, or [`None`] if `index` is 21 or higher.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the conventional upper-case name of this landmark (eg. `INDEX_FINGER_TIP`).
    pub fn name(self) -> &'static str {
        use LandmarkIdx::*;
        match self {
            Wrist => "WRIST",
            ThumbCmc => "THUMB_CMC",
            ThumbMcp => "THUMB_MCP",
            ThumbIp => "THUMB_IP",
            ThumbTip => "THUMB_TIP",
            IndexFingerMcp => "INDEX_FINGER_MCP",
            IndexFingerPip => "INDEX_FINGER_PIP",
            IndexFingerDip => "INDEX_FINGER_DIP",
            IndexFingerTip => "INDEX_FINGER_TIP",
            MiddleFingerMcp => "MIDDLE_FINGER_MCP",
            MiddleFingerPip => "MIDDLE_FINGER_PIP",
            MiddleFingerDip => "MIDDLE_FINGER_DIP",
            MiddleFingerTip => "MIDDLE_FINGER_TIP",
            RingFingerMcp => "RING_FINGER_MCP",
            RingFingerPip => "RING_FINGER_PIP",
            RingFingerDip => "RING_FINGER_DIP",
            RingFingerTip => "RING_FINGER_TIP",
            PinkyMcp => "PINKY_MCP",
            PinkyPip => "PINKY_PIP",
            PinkyDip => "PINKY_DIP",
            PinkyTip => "PINKY_TIP",
        }
    }
}

const PALM_LANDMARKS: &[LandmarkIdx] = {
    use LandmarkIdx::*;
    &[
        Wrist,
        ThumbCmc,
        IndexFingerMcp,
        MiddleFingerMcp,
        RingFingerMcp,
        PinkyMcp,
    ]
};

/// Pairs of landmarks connected by the hand skeleton.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Surround the palm:
        (Wrist, ThumbCmc),
        (ThumbCmc, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// Whether a hand is a left or a right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Returns the opposite hand.
    ///
    /// Mirroring an image turns left hands into right hands and vice versa.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Handedness`] from a string fails.
#[derive(Debug, Error)]
#[error("invalid handedness label '{0}' (expected 'Left' or 'Right')")]
pub struct ParseHandednessError(String);

/// Parses the labels used by hand pose engines (`Left`, `Right`, case-insensitive).
impl FromStr for Handedness {
    type Err = ParseHandednessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("left") {
            Ok(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Self::Right)
        } else {
            Err(ParseHandednessError(s.to_string()))
        }
    }
}

/// A hand landmark in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub idx: LandmarkIdx,
    /// X coordinate in pixels. May lie outside of the image.
    pub x: i32,
    /// Y coordinate in pixels. May lie outside of the image.
    pub y: i32,
    /// Relative depth as reported by the engine.
    pub z: f32,
    /// Handedness of the hand this landmark belongs to.
    pub handedness: Handedness,
}

impl Landmark {
    #[inline]
    pub fn index(&self) -> usize {
        self.idx.index()
    }

    #[inline]
    pub fn pixel(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Drops depth and handedness.
    pub fn position(&self) -> Position {
        Position {
            idx: self.idx,
            x: self.x,
            y: self.y,
        }
    }
}

/// A landmark's 2D pixel position, without depth or handedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub idx: LandmarkIdx,
    pub x: i32,
    pub y: i32,
}

/// A detected hand: 21 landmarks in pixel space, in [`LandmarkIdx`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    index: usize,
    handedness: Handedness,
    landmarks: [Landmark; NUM_LANDMARKS],
}

impl Hand {
    pub(crate) fn new(
        index: usize,
        handedness: Handedness,
        landmarks: [Landmark; NUM_LANDMARKS],
    ) -> Self {
        Self {
            index,
            handedness,
            landmarks,
        }
    }

    /// Returns the position of this hand in the engine's output for the current frame.
    ///
    /// Hands are not tracked across frames: hand 0 of one frame is not necessarily hand 0 of the
    /// next.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    #[inline]
    pub fn landmarks(&self) -> &[Landmark; NUM_LANDMARKS] {
        &self.landmarks
    }

    #[inline]
    pub fn landmark(&self, idx: LandmarkIdx) -> &Landmark {
        &self.landmarks[idx.index()]
    }

    #[inline]
    pub fn wrist(&self) -> &Landmark {
        self.landmark(LandmarkIdx::Wrist)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.landmarks.iter()
    }

    /// Returns the pixel position of every landmark.
    pub fn positions(&self) -> Vec<Position> {
        self.iter().map(Landmark::position).collect()
    }

    /// Computes the center position of the hand's palm by averaging some of the landmarks.
    pub fn palm_center(&self) -> (f32, f32) {
        let mut pos = (0.0, 0.0);
        for lm in PALM_LANDMARKS {
            let (x, y) = self.landmark(*lm).pixel();
            pos.0 += x as f32;
            pos.1 += y as f32;
        }

        let count = PALM_LANDMARKS.len() as f32;
        (pos.0 / count, pos.1 / count)
    }

    /// Computes the clockwise rotation of the palm compared to an upright position.
    ///
    /// A rotation of 0° means that fingers are pointed upwards.
    pub fn rotation_radians(&self) -> f32 {
        let (x, y) = self.landmark(LandmarkIdx::MiddleFingerMcp).pixel();
        let finger = Point2::new(x as f32, y as f32);
        let (x, y) = self.wrist().pixel();
        let wrist = Point2::new(x as f32, y as f32);

        let rel = wrist - finger;
        Rotation2::rotation_between(&Vector2::y(), &rel).angle()
    }

    /// Draws the hand skeleton, landmark markers and handedness label onto `target`.
    pub fn draw(&self, target: &mut Image) {
        for (a, b) in CONNECTIVITY {
            let (ax, ay) = self.landmark(*a).pixel();
            let (bx, by) = self.landmark(*b).pixel();
            draw::line(target, ax, ay, bx, by)
                .color(Color::GREEN)
                .stroke_width(2);
        }
        for lm in self.iter() {
            draw::circle(target, lm.x, lm.y)
                .radius(3)
                .color(Color::RED);
        }

        let (x, y) = self.wrist().pixel();
        draw::text(target, x, y.saturating_add(10), self.handedness.as_str())
            .color(Color::WHITE)
            .align_top();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn hand_at(points: impl Fn(LandmarkIdx) -> (i32, i32)) -> Hand {
        let landmarks = LandmarkIdx::ALL.map(|idx| {
            let (x, y) = points(idx);
            Landmark {
                idx,
                x,
                y,
                z: 0.0,
                handedness: Handedness::Left,
            }
        });
        Hand::new(0, Handedness::Left, landmarks)
    }

    #[test]
    fn anatomical_table() {
        for (i, idx) in LandmarkIdx::ALL.iter().enumerate() {
            assert_eq!(idx.index(), i);
            assert_eq!(LandmarkIdx::from_index(i), Some(*idx));
        }
        assert_eq!(LandmarkIdx::from_index(21), None);

        assert_eq!(LandmarkIdx::Wrist.index(), 0);
        assert_eq!(LandmarkIdx::ThumbCmc.index(), 1);
        assert_eq!(LandmarkIdx::ThumbIp.index(), 3);
        assert_eq!(LandmarkIdx::ThumbTip.index(), 4);
        assert_eq!(LandmarkIdx::IndexFingerMcp.index(), 5);
        assert_eq!(LandmarkIdx::IndexFingerTip.index(), 8);
        assert_eq!(LandmarkIdx::MiddleFingerMcp.index(), 9);
        assert_eq!(LandmarkIdx::MiddleFingerTip.index(), 12);
        assert_eq!(LandmarkIdx::RingFingerMcp.index(), 13);
        assert_eq!(LandmarkIdx::RingFingerTip.index(), 16);
        assert_eq!(LandmarkIdx::PinkyMcp.index(), 17);
        assert_eq!(LandmarkIdx::PinkyTip.index(), 20);
        assert_eq!(LandmarkIdx::TIPS.map(LandmarkIdx::index), [4, 8, 12, 16, 20]);
        assert_eq!(LandmarkIdx::PinkyDip.name(), "PINKY_DIP");
    }

    #[test]
    fn connectivity_is_a_tree_plus_palm() {
        // Six edges around the palm, three bones per finger.
        assert_eq!(CONNECTIVITY.len(), 21);
        for idx in LandmarkIdx::ALL {
            assert!(CONNECTIVITY.iter().any(|(a, b)| *a == idx || *b == idx));
        }
    }

    #[test]
    fn handedness() {
        assert_eq!(Handedness::Left.mirrored(), Handedness::Right);
        assert_eq!(Handedness::Right.mirrored(), Handedness::Left);
        assert_eq!(Handedness::Right.to_string(), "Right");
        assert_eq!("Left".parse::<Handedness>().unwrap(), Handedness::Left);
        assert_eq!("right".parse::<Handedness>().unwrap(), Handedness::Right);
        assert!("Both".parse::<Handedness>().is_err());
    }

    #[test]
    fn rotation() {
        // Fingers pointing up.
        let upright = hand_at(|idx| match idx {
            LandmarkIdx::Wrist => (100, 200),
            _ => (100, 100),
        });
        assert_relative_eq!(upright.rotation_radians(), 0.0, epsilon = 1e-5);

        // Fingers pointing right.
        let right = hand_at(|idx| match idx {
            LandmarkIdx::Wrist => (0, 100),
            _ => (100, 100),
        });
        assert_relative_eq!(
            right.rotation_radians().abs(),
            std::f32::consts::FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn palm_center_and_positions() {
        let hand = hand_at(|idx| (idx.index() as i32 * 10, 5));
        // Wrist, thumb CMC and the four finger MCPs: (0 + 10 + 50 + 90 + 130 + 170) / 6
        assert_eq!(hand.palm_center(), (75.0, 5.0));

        let positions = hand.positions();
        assert_eq!(positions.len(), NUM_LANDMARKS);
        assert_eq!(
            positions[8],
            Position {
                idx: LandmarkIdx::IndexFingerTip,
                x: 80,
                y: 5
            }
        );
    }

    #[test]
    fn draw_marks_landmarks() {
        let hand = hand_at(|idx| (10 + idx.index() as i32 * 4, 20));
        let mut image = Image::new(120, 60);
        hand.draw(&mut image);
        assert_eq!(image.get(10, 20), Color::RED);
        assert_eq!(image.get(90, 20), Color::RED);
        assert_eq!(image.get(119, 59), Color::NULL);
    }
}
