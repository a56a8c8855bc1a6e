//! Drawing primitives for visualizing hands.
//!
//! Every function returns a guard that performs the drawing when dropped, so the defaults can be
//! tweaked with builder-style method calls:
//!
//! ```
//! # use handtrack::image::{draw, Color, Image};
//! let mut image = Image::new(64, 64);
//! draw::circle(&mut image, 10, 10).radius(3).color(Color::MAGENTA);
//! draw::line(&mut image, 0, 0, 63, 63).stroke_width(2);
//! ```

use std::{borrow::Cow, convert::Infallible};

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{self, Text, TextStyleBuilder},
};

use crate::image::{Color, Image};

/// Guard returned by [`circle`]; draws the circle when dropped and allows customization.
pub struct DrawCircle<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    radius: u32,
    color: Color,
    filled: bool,
}

impl DrawCircle<'_> {
    /// Sets the circle's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the circle's radius in pixels.
    ///
    /// The default radius is 5. A radius of 0 draws a single pixel.
    pub fn radius(&mut self, radius: u32) -> &mut Self {
        self.radius = radius;
        self
    }

    /// Draws only the outline of the circle instead of filling it.
    pub fn outline(&mut self) -> &mut Self {
        self.filled = false;
        self
    }
}

impl Drop for DrawCircle<'_> {
    fn drop(&mut self) {
        // Beyond `width + height`, a larger radius only matters for circles whose center is far
        // outside of the image.
        let (width, height) = (self.image.width(), self.image.height());
        let radius = self.radius.min(width.saturating_add(height));
        let r = i64::from(radius);
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        if x < -r || y < -r || x >= i64::from(width) + r || y >= i64::from(height) + r {
            return;
        }

        let style = if self.filled {
            PrimitiveStyle::with_fill(self.color)
        } else {
            PrimitiveStyle::with_stroke(self.color, 1)
        };
        let diameter = radius.saturating_mul(2).saturating_add(1);
        match Circle::with_center(Point::new(self.x, self.y), diameter)
            .into_styled(style)
            .draw(&mut Target(&mut *self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`line`]; draws the line when dropped and allows customization.
pub struct DrawLine<'a> {
    image: &'a mut Image,
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
    color: Color,
    stroke_width: u32,
}

impl DrawLine<'_> {
    /// Sets the line's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the line's stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawLine<'_> {
    fn drop(&mut self) {
        let margin = self.stroke_width.min(MAX_CLIP_MARGIN) as i32 + 1;
        let image_box = Rectangle::new(
            Point::zero(),
            Size::new(self.image.width(), self.image.height()),
        );
        let Some((start, end)) = clip_line(
            Point::new(self.start_x, self.start_y),
            Point::new(self.end_x, self.end_y),
            image_box.offset(margin),
        ) else {
            return;
        };
        match Line::new(start, end)
            .into_styled(PrimitiveStyle::with_stroke(self.color, self.stroke_width))
            .draw(&mut Target(&mut *self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`text`] and [`fps`]; draws the text when dropped and allows customization.
pub struct DrawText<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    text: Cow<'a, str>,
    color: Color,
    alignment: text::Alignment,
    baseline: text::Baseline,
}

impl DrawText<'_> {
    /// Sets the text color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Moves the text's anchor point to `(x, y)`.
    pub fn position(&mut self, x: i32, y: i32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Aligns the top of the text with the `y` coordinate.
    pub fn align_top(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Top;
        self
    }

    /// Aligns the bottom of the text with the `y` coordinate.
    pub fn align_bottom(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Bottom;
        self
    }

    /// Aligns the left side of the text with the `x` coordinate.
    pub fn align_left(&mut self) -> &mut Self {
        self.alignment = text::Alignment::Left;
        self
    }

    /// Aligns the right side of the text with the `x` coordinate.
    pub fn align_right(&mut self) -> &mut Self {
        self.alignment = text::Alignment::Right;
        self
    }
}

impl Drop for DrawText<'_> {
    fn drop(&mut self) {
        // The anchor may be anywhere relative to the text, so keep it within one text extent of
        // the image.
        let font_size = FONT_10X20.character_size;
        let chars = i64::try_from(self.text.chars().count()).unwrap_or(i64::MAX);
        let extent_x = chars.saturating_mul(font_size.width.into());
        let extent_y = i64::from(font_size.height);
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        if x.saturating_add(extent_x) < 0
            || y + extent_y < 0
            || x.saturating_sub(extent_x) > i64::from(self.image.width())
            || y - extent_y > i64::from(self.image.height())
        {
            return;
        }

        // FIXME: e-g's fonts lack some common glyphs
        let character_style = MonoTextStyle::new(&FONT_10X20, self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(self.baseline)
            .build();
        match Text::with_text_style(
            &self.text,
            Point::new(self.x, self.y),
            character_style,
            text_style,
        )
        .draw(&mut Target(&mut *self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draws a filled circle centered on `(x, y)` onto an image.
///
/// This is used to mark hand landmarks.
pub fn circle(image: &mut Image, x: i32, y: i32) -> DrawCircle<'_> {
    DrawCircle {
        image,
        x,
        y,
        radius: 5,
        color: Color::MAGENTA,
        filled: true,
    }
}

/// Draws a line onto an image.
///
/// The end points may lie arbitrarily far outside of the image; only the visible part is drawn.
pub fn line(
    image: &mut Image,
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
) -> DrawLine<'_> {
    DrawLine {
        image,
        start_x,
        start_y,
        end_x,
        end_y,
        color: Color::from_rgb8(0, 0, 255),
        stroke_width: 1,
    }
}

/// Draws a text string onto an image.
///
/// By default, the text is drawn centered horizontally and vertically around `x` and `y`.
pub fn text<'a>(image: &'a mut Image, x: i32, y: i32, text: &'a str) -> DrawText<'a> {
    DrawText {
        image,
        x,
        y,
        text: Cow::Borrowed(text),
        color: Color::from_rgb8(255, 0, 0),
        alignment: text::Alignment::Center,
        baseline: text::Baseline::Middle,
    }
}

/// Draws a frame rate counter (`FPS: 30`) near the top left corner of an image.
///
/// The value is rounded to the nearest integer.
pub fn fps(image: &mut Image, fps: f32) -> DrawText<'_> {
    DrawText {
        image,
        x: 10,
        y: 30,
        text: Cow::Owned(format!("FPS: {}", fps.round() as i64)),
        color: Color::GREEN,
        alignment: text::Alignment::Left,
        baseline: text::Baseline::Bottom,
    }
}

/// Upper bound for the margin around the image that lines are clipped to.
const MAX_CLIP_MARGIN: u32 = 256;

/// Clips the line from `start` to `end` to `bounds` (Liang-Barsky).
///
/// Returns `None` if no part of the line lies inside of `bounds`.
fn clip_line(start: Point, end: Point, bounds: Rectangle) -> Option<(Point, Point)> {
    let bottom_right = bounds.bottom_right()?;
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let (dx, dy) = (f64::from(end.x) - x0, f64::from(end.y) - y0);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - f64::from(bounds.top_left.x)),
        (dx, f64::from(bottom_right.x) - x0),
        (-dy, y0 - f64::from(bounds.top_left.y)),
        (dy, f64::from(bottom_right.y) - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| Point::new((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = (self.0.width(), self.0.height());

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && (point.x as u32) < self.0.width()
                && point.y >= 0
                && (point.y as u32) < self.0.height()
            {
                self.0.set(point.x as _, point.y as _, color);
            }
        }

        Ok(())
    }
}
