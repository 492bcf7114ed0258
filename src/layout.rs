//! Layout primitives - rectangles in character cells

/// Rectangle bounds in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Get right edge x-coordinate (exclusive)
    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Get bottom edge y-coordinate (exclusive)
    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if rectangle covers no cells
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if point is inside rectangle
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle covering both `self` and `other`
    ///
    /// Empty rectangles are ignored so an unset popover does not stretch
    /// the hit area to the origin.
    pub fn union(&self, other: Rect) -> Rect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return other;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Split horizontally into top and bottom
    pub fn split_horizontal(&self, top_height: u16) -> (Rect, Rect) {
        let top_height = top_height.min(self.height);
        let top = Rect::new(self.x, self.y, self.width, top_height);
        let bottom = Rect::new(
            self.x,
            self.y.saturating_add(top_height),
            self.width,
            self.height - top_height,
        );
        (top, bottom)
    }

    /// Split vertically into left and right
    pub fn split_vertical(&self, left_width: u16) -> (Rect, Rect) {
        let left_width = left_width.min(self.width);
        let left = Rect::new(self.x, self.y, left_width, self.height);
        let right = Rect::new(
            self.x.saturating_add(left_width),
            self.y,
            self.width - left_width,
            self.height,
        );
        (left, right)
    }

    /// Single row at `offset` rows from the top
    pub fn row(&self, offset: u16) -> Rect {
        Rect::new(self.x, self.y.saturating_add(offset), self.width, 1)
    }

    /// Rectangle of `height` rows stacked directly below this one
    pub fn below(&self, width: u16, height: u16) -> Rect {
        Rect::new(self.x, self.bottom(), width, height)
    }

    /// Rectangle of `height` rows stacked directly above this one
    ///
    /// Clipped at row 0 when there is not enough room.
    pub fn above(&self, width: u16, height: u16) -> Rect {
        let height = height.min(self.y);
        Rect::new(self.x, self.y - height, width, height)
    }
}
