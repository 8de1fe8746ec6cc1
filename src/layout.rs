//! Page layout calculations

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_mm(215.9),
            height: Length::from_mm(279.4),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// The same paper turned on its side
    pub fn landscape(&self) -> Self {
        if self.width.mm() >= self.height.mm() {
            return *self;
        }
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn width_pt(&self) -> f32 {
        self.width.pt() as f32
    }

    pub fn height_pt(&self) -> f32 {
        self.height.pt() as f32
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::letter()
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// Standard 1-inch margins on all sides
    pub fn standard() -> Self {
        Self::uniform(Length::from_inches(1.0))
    }

    /// Narrow margins (0.5 inches)
    pub fn narrow() -> Self {
        Self::uniform(Length::from_inches(0.5))
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::standard()
    }
}

/// Page orientation used for a table section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Portrait,
    Landscape,
    /// Landscape only for tables too wide for a portrait page
    #[default]
    Auto,
}

/// The printable rectangle of a page, in points, origin at bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentArea {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl ContentArea {
    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// Calculate the body area of a page
///
/// The body sits inside the margins. When the footer band reaches above the
/// bottom margin, the body starts above the footer instead.
pub fn content_area(page: &PageDimensions, margins: &Margins, footer_height: f32) -> ContentArea {
    let left = margins.left.pt() as f32;
    let right = page.width_pt() - margins.right.pt() as f32;
    let top = page.height_pt() - margins.top.pt() as f32;
    let bottom = (margins.bottom.pt() as f32).max(footer_height);

    ContentArea {
        left,
        bottom,
        width: (right - left).max(0.0),
        height: (top - bottom).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let len = Length::from_inches(1.0);
        assert!((len.mm() - 25.4).abs() < 0.01);
        assert!((len.pt() - 72.0).abs() < 0.01);
        assert!((Length::from_pt(72.0).mm() - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_letter_size() {
        let letter = PageDimensions::letter();
        assert!((letter.width_pt() - 612.0).abs() < 0.1);
        assert!((letter.height_pt() - 792.0).abs() < 0.1);
    }

    #[test]
    fn test_landscape_swaps_once() {
        let landscape = PageDimensions::a4().landscape();
        assert_eq!(landscape.width.mm(), 297.0);
        assert_eq!(landscape.height.mm(), 210.0);
        assert_eq!(landscape.landscape(), landscape);
    }

    #[test]
    fn test_content_area_standard_margins() {
        let area = content_area(&PageDimensions::letter(), &Margins::standard(), 0.0);
        assert!((area.left - 72.0).abs() < 0.1);
        assert!((area.bottom - 72.0).abs() < 0.1);
        assert!((area.width - 468.0).abs() < 0.1);
        assert!((area.height - 648.0).abs() < 0.1);
        assert!((area.top() - 720.0).abs() < 0.1);
    }

    #[test]
    fn test_content_area_tall_footer() {
        let area = content_area(&PageDimensions::letter(), &Margins::narrow(), 60.0);
        assert_eq!(area.bottom, 60.0);
        assert!((area.top() - 756.0).abs() < 0.1);
    }

    #[test]
    fn test_standard_margins() {
        let margins = Margins::standard();
        assert_eq!(margins.top.mm(), 25.4);
        assert_eq!(margins.bottom.mm(), 25.4);
        assert_eq!(margins.left.mm(), 25.4);
        assert_eq!(margins.right.mm(), 25.4);
    }
}
