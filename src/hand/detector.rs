//! The [`HandDetector`] facade.

use crate::{
    image::{draw, Color, Image},
    resolution::Resolution,
    timer::{FpsEstimator, Timer},
    Error,
};

use super::{
    config::DetectorConfig,
    engine::{HandEngine, RawLandmark},
    landmark::{Hand, Handedness, Position, NUM_LANDMARKS},
    normalize,
};

/// Options for [`HandDetector::find_hands_with`].
#[derive(Debug, Clone, Copy)]
pub struct FindOptions {
    draw: bool,
    mirror_labels: bool,
}

/// By default, hands are drawn and their labels are mirrored.
impl Default for FindOptions {
    fn default() -> Self {
        Self {
            draw: true,
            mirror_labels: true,
        }
    }
}

impl FindOptions {
    /// Selects whether the detected hands are drawn onto the returned image.
    #[inline]
    pub fn draw(mut self, draw: bool) -> Self {
        self.draw = draw;
        self
    }

    /// Selects whether left and right hand labels are swapped.
    ///
    /// Enable this when the frames are displayed mirrored (like a selfie camera) but were passed
    /// to the detector unmirrored, so that the labels match what the user sees.
    #[inline]
    pub fn mirror_labels(mut self, mirror_labels: bool) -> Self {
        self.mirror_labels = mirror_labels;
        self
    }
}

/// Hand detection result cached between [`HandDetector::find_hands`] and
/// [`HandDetector::find_positions`].
#[derive(Debug, Clone)]
struct Detection {
    hands: Vec<DetectedHand>,
}

#[derive(Debug, Clone)]
struct DetectedHand {
    landmarks: [RawLandmark; NUM_LANDMARKS],
    /// Label to report, with mirroring already applied.
    handedness: Handedness,
}

impl DetectedHand {
    fn normalize(&self, resolution: Resolution, index: usize) -> Hand {
        normalize::normalize_landmarks(&self.landmarks, resolution, self.handedness, index)
    }
}

/// Finds hands in frames and converts them to pixel coordinates.
///
/// Usage follows the frame loop of a video application: call [`HandDetector::find_hands`] with
/// every new frame, then query the hands it found with [`HandDetector::find_positions`] (or
/// [`HandDetector::find_position`] for a single hand). The result of the most recent
/// `find_hands` call is kept until the next one replaces it.
///
/// The detector is meant to be driven from a single thread. It can be moved to another thread as
/// a whole, but `find_hands` takes `&mut self`, so there is no concurrent access to the cached
/// result.
pub struct HandDetector<E> {
    engine: E,
    config: DetectorConfig,
    detection: Option<Detection>,
    fps: FpsEstimator,
    t_convert: Timer,
    t_detect: Timer,
}

impl<E: HandEngine> HandDetector<E> {
    /// Creates a hand detector that uses `engine` to find hands.
    ///
    /// Returns an error if `config` is invalid (see [`DetectorConfig::validate`]) or if the engine
    /// rejects it.
    pub fn new(mut engine: E, config: DetectorConfig) -> Result<Self, Error> {
        config.validate()?;
        engine.configure(&config).map_err(Error::Engine)?;
        log::debug!("created hand detector: {:?}", config);

        Ok(Self {
            engine,
            config,
            detection: None,
            fps: FpsEstimator::new(),
            t_convert: Timer::new("convert"),
            t_detect: Timer::new("detect"),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Finds hands in `image` using the default [`FindOptions`] (draw hands, mirror labels).
    ///
    /// See [`HandDetector::find_hands_with`].
    pub fn find_hands(&mut self, image: &Image) -> Result<Image, Error> {
        self.find_hands_with(image, FindOptions::default())
    }

    /// Runs the hand engine on `image` and remembers the hands it finds.
    ///
    /// Returns a copy of `image`. If [`FindOptions::draw`] is enabled, the skeleton and label of
    /// every detected hand are drawn onto the copy; if no hands were found, it is identical to
    /// `image`.
    ///
    /// Finding no hands is not an error. If the engine fails or returns malformed data, the error
    /// is returned and the detector forgets the previous frame's hands, so that a subsequent
    /// [`HandDetector::find_positions`] returns nothing instead of outdated positions.
    pub fn find_hands_with(&mut self, image: &Image, options: FindOptions) -> Result<Image, Error> {
        self.detection = None;

        if image.resolution().is_empty() {
            return Err(Error::EmptyImage);
        }

        let frame = self.t_convert.time(|| image.to_rgb8());
        let mut raw = self
            .t_detect
            .time(|| self.engine.detect(&frame))
            .map_err(|e| {
                log::warn!("hand engine failed on {} frame: {}", image.resolution(), e);
                Error::Engine(e)
            })?;
        log::trace!("engine output: {:?}", raw);

        if raw.len() > self.config.max_hands {
            log::warn!(
                "engine reported {} hands, but at most {} were requested; ignoring the rest",
                raw.len(),
                self.config.max_hands,
            );
            raw.truncate(self.config.max_hands);
        }

        let hands = raw
            .iter()
            .enumerate()
            .map(|(index, hand)| {
                let mut handedness = hand.handedness_or_default();
                if options.mirror_labels {
                    handedness = handedness.mirrored();
                }
                Ok::<_, Error>(DetectedHand {
                    landmarks: *normalize::raw_landmarks(hand, index)?,
                    handedness,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut output = image.clone();
        if options.draw {
            for (index, hand) in hands.iter().enumerate() {
                hand.normalize(image.resolution(), index).draw(&mut output);
            }
        }

        self.detection = Some(Detection { hands });
        Ok(output)
    }

    /// Returns every hand found by the last call to [`HandDetector::find_hands`], in the pixel
    /// coordinates of `image`.
    ///
    /// `image` is only used for its size; it should be the frame passed to `find_hands` (or one
    /// of the same size).
    ///
    /// Returns an empty list if no hands were found, or if `find_hands` hasn't been called yet.
    pub fn find_positions(&self, image: &Image) -> Vec<Hand> {
        let resolution = image.resolution();
        self.detected_hands()
            .iter()
            .enumerate()
            .map(|(index, hand)| hand.normalize(resolution, index))
            .collect()
    }

    /// Returns hand number `hand_index` from the last call to [`HandDetector::find_hands`].
    ///
    /// Returns [`None`] if fewer hands were found.
    pub fn find_hand(&self, image: &Image, hand_index: usize) -> Option<Hand> {
        self.detected_hands()
            .get(hand_index)
            .map(|hand| hand.normalize(image.resolution(), hand_index))
    }

    /// Returns the landmark positions of a single hand, without depth and handedness.
    ///
    /// Returns an empty list if `hand_index` is out of range.
    pub fn find_position(&self, image: &Image, hand_index: usize) -> Vec<Position> {
        self.find_hand(image, hand_index)
            .map(|hand| hand.positions())
            .unwrap_or_default()
    }

    /// Like [`HandDetector::find_position`], but also draws a filled circle of the given `radius`
    /// at every landmark of the hand.
    pub fn mark_position(&self, image: &mut Image, hand_index: usize, radius: u32) -> Vec<Position> {
        let positions = self.find_position(image, hand_index);
        for pos in &positions {
            draw::circle(image, pos.x, pos.y)
                .radius(radius)
                .color(Color::MAGENTA);
        }
        positions
    }

    /// Returns the number of hands found by the last call to [`HandDetector::find_hands`].
    pub fn num_hands(&self) -> usize {
        self.detected_hands().len()
    }

    fn detected_hands(&self) -> &[DetectedHand] {
        self.detection
            .as_ref()
            .map_or(&[], |detection| &detection.hands)
    }

    /// Updates the detector's frame rate estimate and returns it.
    ///
    /// Call this once per processed frame. See [`FpsEstimator::update`].
    pub fn update_fps(&mut self) -> f32 {
        self.fps.update()
    }

    /// Returns the frame rate computed by the last call to [`HandDetector::update_fps`].
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Draws the current frame rate estimate onto `image`.
    pub fn display_fps(&self, image: &mut Image) {
        draw::fps(image, self.fps.fps());
    }

    /// Returns the timers measuring color conversion and engine inference.
    ///
    /// Displaying a timer resets it, so logging them once per second gives per-second averages.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_convert, &self.t_detect].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        hand::{
            engine::{RawHand, RawLandmark},
            landmark::LandmarkIdx,
        },
        test::{raw_hand, ScriptedEngine},
    };

    use super::*;

    fn centered(handedness: Handedness) -> RawHand {
        raw_hand(handedness, |_| RawLandmark::new(0.5, 0.5, 0.0))
    }

    #[test]
    fn configures_engine() {
        let config = DetectorConfig::default().max_hands(1).static_image_mode(true);
        let detector = HandDetector::new(ScriptedEngine::new(), config.clone()).unwrap();
        assert_eq!(detector.engine().config.as_ref(), Some(&config));
        assert_eq!(detector.config(), &config);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = DetectorConfig::default().min_tracking_confidence(2.0);
        assert!(matches!(
            HandDetector::new(ScriptedEngine::new(), config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn nothing_before_find_hands() {
        let detector = HandDetector::new(ScriptedEngine::new(), DetectorConfig::default()).unwrap();
        let image = Image::new(64, 48);
        assert!(detector.find_positions(&image).is_empty());
        assert!(detector.find_position(&image, 0).is_empty());
        assert!(detector.find_hand(&image, 0).is_none());
        assert_eq!(detector.num_hands(), 0);
    }

    #[test]
    fn passes_rgb_frame_to_engine() {
        let mut detector =
            HandDetector::new(ScriptedEngine::new(), DetectorConfig::default()).unwrap();
        detector.find_hands(&Image::new(64, 48)).unwrap();
        assert_eq!(detector.engine().frames, [(64, 48)]);
    }

    #[test]
    fn mirrors_labels() {
        let engine = ScriptedEngine::new()
            .then(vec![centered(Handedness::Right)])
            .then(vec![centered(Handedness::Right)]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let image = Image::new(64, 48);

        detector.find_hands(&image).unwrap();
        assert_eq!(
            detector.find_positions(&image)[0].handedness(),
            Handedness::Left
        );

        detector
            .find_hands_with(&image, FindOptions::default().mirror_labels(false))
            .unwrap();
        assert_eq!(
            detector.find_positions(&image)[0].handedness(),
            Handedness::Right
        );
    }

    #[test]
    fn missing_handedness_defaults_to_right() {
        let hand = RawHand {
            handedness: None,
            ..centered(Handedness::Left)
        };
        let engine = ScriptedEngine::new().then(vec![hand]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let image = Image::new(64, 48);
        detector
            .find_hands_with(&image, FindOptions::default().mirror_labels(false))
            .unwrap();
        assert_eq!(
            detector.find_hand(&image, 0).unwrap().handedness(),
            Handedness::Right
        );
    }

    #[test]
    fn truncates_to_max_hands() {
        let engine = ScriptedEngine::new().then(vec![
            centered(Handedness::Left),
            centered(Handedness::Right),
            centered(Handedness::Left),
        ]);
        let config = DetectorConfig::default().max_hands(2);
        let mut detector = HandDetector::new(engine, config).unwrap();
        let image = Image::new(64, 48);
        detector.find_hands(&image).unwrap();
        assert_eq!(detector.num_hands(), 2);
        assert_eq!(detector.find_positions(&image).len(), 2);
    }

    #[test]
    fn engine_failure_clears_cache() {
        let engine = ScriptedEngine::new()
            .then(vec![centered(Handedness::Left)])
            .then_fail("model crashed");
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let image = Image::new(64, 48);

        detector.find_hands(&image).unwrap();
        assert_eq!(detector.num_hands(), 1);

        let err = detector.find_hands(&image).unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert!(err.to_string().contains("model crashed"));
        assert!(detector.find_positions(&image).is_empty());

        // The next frame works again.
        detector.find_hands(&image).unwrap();
        assert!(detector.find_positions(&image).is_empty());
    }

    #[test]
    fn malformed_output_is_rejected() {
        let mut short = centered(Handedness::Left);
        short.landmarks.truncate(5);
        let engine = ScriptedEngine::new()
            .then(vec![centered(Handedness::Left)])
            .then(vec![centered(Handedness::Left), short]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let image = Image::new(64, 48);

        detector.find_hands(&image).unwrap();
        assert!(matches!(
            detector.find_hands(&image),
            Err(Error::MalformedDetection {
                hand: 1,
                landmarks: 5
            })
        ));
        assert_eq!(detector.num_hands(), 0);
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut detector =
            HandDetector::new(ScriptedEngine::new(), DetectorConfig::default()).unwrap();
        assert!(matches!(
            detector.find_hands(&Image::new(0, 0)),
            Err(Error::EmptyImage)
        ));
        assert!(detector.engine().frames.is_empty());
    }

    #[test]
    fn draws_hands_far_out_of_frame() {
        let far = |v: f32| {
            raw_hand(Handedness::Left, |idx| match idx {
                LandmarkIdx::Wrist => RawLandmark::new(-v, v, 0.0),
                _ => RawLandmark::new(0.5, 0.5, 0.0),
            })
        };
        let engine = ScriptedEngine::new()
            .then(vec![far(8.0)])
            .then(vec![far(1e30)]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let image = Image::new(1280, 720);

        let annotated = detector.find_hands(&image).unwrap();
        assert_eq!(
            detector.find_hand(&image, 0).unwrap().wrist().pixel(),
            (-10240, 5760)
        );
        // The other landmarks are still drawn.
        assert_eq!(annotated.get(640, 360), Color::RED);

        detector.find_hands(&image).unwrap();
        assert_eq!(
            detector.find_hand(&image, 0).unwrap().wrist().pixel(),
            (i32::MIN, i32::MAX)
        );
    }

    #[test]
    fn non_finite_output_is_rejected() {
        let hand = raw_hand(Handedness::Left, |idx| match idx {
            LandmarkIdx::Wrist => RawLandmark::new(f32::NAN, f32::NAN, 0.0),
            _ => RawLandmark::new(0.5, 0.5, 0.0),
        });
        let engine = ScriptedEngine::new()
            .then(vec![centered(Handedness::Left)])
            .then(vec![hand]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let image = Image::new(64, 48);

        detector.find_hands(&image).unwrap();
        assert!(matches!(
            detector.find_hands_with(&image, FindOptions::default().draw(false)),
            Err(Error::NonFiniteLandmark {
                hand: 0,
                landmark: LandmarkIdx::Wrist
            })
        ));
        assert!(detector.find_positions(&image).is_empty());
    }

    #[test]
    fn mark_position_with_huge_radius() {
        let engine = ScriptedEngine::new().then(vec![centered(Handedness::Left)]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let mut image = Image::new(16, 12);
        detector
            .find_hands_with(&image, FindOptions::default().draw(false))
            .unwrap();

        detector.mark_position(&mut image, 0, u32::MAX);
        assert_eq!(image.get(0, 0), Color::MAGENTA);
        assert_eq!(image.get(15, 11), Color::MAGENTA);
    }

    #[test]
    fn draws_only_when_requested() {
        let hand = raw_hand(Handedness::Left, |idx| {
            RawLandmark::new(0.1 + idx.index() as f32 * 0.04, 0.5, 0.0)
        });
        let engine = ScriptedEngine::new().then(vec![hand.clone()]).then(vec![hand]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let mut image = Image::new(100, 50);
        image.clear(Color::BLACK);

        let annotated = detector.find_hands(&image).unwrap();
        assert!(annotated != image);
        let wrist = detector.find_hand(&image, 0).unwrap().wrist().pixel();
        assert_eq!(wrist, (10, 25));
        assert_eq!(annotated.get(10, 25), Color::RED);
        assert_eq!(image.get(10, 25), Color::BLACK);

        let plain = detector
            .find_hands_with(&image, FindOptions::default().draw(false))
            .unwrap();
        assert!(plain == image);
    }

    #[test]
    fn no_hands_returns_unchanged_copy() {
        let mut detector =
            HandDetector::new(ScriptedEngine::new(), DetectorConfig::default()).unwrap();
        let mut image = Image::new(32, 32);
        image.clear(Color::BLUE);
        let output = detector.find_hands(&image).unwrap();
        assert!(output == image);
        assert!(detector.find_positions(&image).is_empty());
    }

    #[test]
    fn mark_position_draws_circles() {
        let hand = raw_hand(Handedness::Left, |idx| match idx {
            LandmarkIdx::Wrist => RawLandmark::new(0.25, 0.25, 0.0),
            _ => RawLandmark::new(0.75, 0.75, 0.0),
        });
        let engine = ScriptedEngine::new().then(vec![hand]);
        let mut detector = HandDetector::new(engine, DetectorConfig::default()).unwrap();
        let mut image = Image::new(40, 40);
        detector
            .find_hands_with(&image, FindOptions::default().draw(false))
            .unwrap();

        let positions = detector.mark_position(&mut image, 0, 2);
        assert_eq!(positions.len(), NUM_LANDMARKS);
        assert_eq!(image.get(10, 10), Color::MAGENTA);
        assert_eq!(image.get(30, 30), Color::MAGENTA);
        assert_eq!(image.get(20, 20), Color::NULL);

        assert!(detector.mark_position(&mut image, 1, 2).is_empty());
    }

    #[test]
    fn fps_counter() {
        let mut detector =
            HandDetector::new(ScriptedEngine::new(), DetectorConfig::default()).unwrap();
        assert_eq!(detector.update_fps(), 0.0);
        assert_eq!(detector.fps(), 0.0);

        let mut image = Image::new(120, 40);
        detector.display_fps(&mut image);
        assert!(image.data().chunks_exact(4).any(|pix| pix == [0, 255, 0, 255]));
    }

    #[test]
    fn timers_record_engine_calls() {
        let mut detector =
            HandDetector::new(ScriptedEngine::new(), DetectorConfig::default()).unwrap();
        detector.find_hands(&Image::new(8, 8)).unwrap();
        let names = detector.timers().map(Timer::name).collect::<Vec<_>>();
        assert_eq!(names, ["convert", "detect"]);
        assert!(detector.timers().all(|t| t.average().is_some()));
    }
}
