//! Conversion of raw engine output to pixel-space hands.

use crate::{resolution::Resolution, Error};

use super::{
    engine::{RawHand, RawLandmark},
    landmark::{Hand, Handedness, Landmark, LandmarkIdx, NUM_LANDMARKS},
};

/// Converts one raw hand to pixel coordinates in an image of size `resolution`.
///
/// Every landmark is labeled with `handedness`, and its normalized coordinates are scaled by the
/// image size and rounded to the nearest pixel. Depth is passed through unchanged. Coordinates
/// outside of the image are *not* clamped.
///
/// Returns an error if `raw` doesn't have exactly 21 landmarks or has non-finite coordinates (see
/// [`raw_landmarks`]).
pub fn normalize(
    raw: &RawHand,
    resolution: Resolution,
    handedness: Handedness,
    hand_index: usize,
) -> Result<Hand, Error> {
    let landmarks = raw_landmarks(raw, hand_index)?;
    Ok(normalize_landmarks(landmarks, resolution, handedness, hand_index))
}

/// Like [`normalize`], but for landmarks that are already known to be complete.
pub fn normalize_landmarks(
    landmarks: &[RawLandmark; NUM_LANDMARKS],
    resolution: Resolution,
    handedness: Handedness,
    hand_index: usize,
) -> Hand {
    let landmarks = LandmarkIdx::ALL.map(|idx| {
        let RawLandmark { x, y, z } = landmarks[idx.index()];
        let (x, y) = resolution.to_pixel(x, y);
        Landmark {
            idx,
            x,
            y,
            z,
            handedness,
        }
    });

    Hand::new(hand_index, handedness, landmarks)
}

/// Returns the landmarks of `raw` as a fixed-size array.
///
/// Returns [`Error::MalformedDetection`] (reporting `hand_index` as the offending hand) if `raw`
/// doesn't have exactly 21 landmarks, and [`Error::NonFiniteLandmark`] if any coordinate is NaN or
/// infinite.
pub fn raw_landmarks(
    raw: &RawHand,
    hand_index: usize,
) -> Result<&[RawLandmark; NUM_LANDMARKS], Error> {
    let landmarks: &[RawLandmark; NUM_LANDMARKS] = raw
        .landmarks
        .as_slice()
        .try_into()
        .map_err(|_| Error::MalformedDetection {
            hand: hand_index,
            landmarks: raw.landmarks.len(),
        })?;

    if let Some(landmark) = LandmarkIdx::ALL
        .into_iter()
        .find(|idx| !landmarks[idx.index()].is_finite())
    {
        return Err(Error::NonFiniteLandmark {
            hand: hand_index,
            landmark,
        });
    }

    Ok(landmarks)
}
