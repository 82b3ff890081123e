use crate::*;

/// How big cells are drawn in content units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellGeometry {
    pub cell_size: f32,
    pub padding: f32,
    pub canvas_padding: f32,
}

impl Default for CellGeometry {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            padding: CELL_PADDING,
            canvas_padding: CANVAS_PADDING,
        }
    }
}

/// Pan and zoom state of a board shown in a viewport, resolves pointer positions to cells.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardView {
    board_size: Coord2,
    geometry: CellGeometry,
    viewport: Rect,
    transform: ViewTransform,
}

impl BoardView {
    /// View with the whole board fitted into `viewport`.
    pub fn new(board_size: Coord2, viewport: Rect) -> Self {
        Self::with_geometry(board_size, viewport, CellGeometry::default())
    }

    pub fn with_geometry(board_size: Coord2, viewport: Rect, geometry: CellGeometry) -> Self {
        let mut view = Self {
            board_size,
            geometry,
            viewport,
            transform: ViewTransform::IDENTITY,
        };
        view.refit(viewport);
        view
    }

    pub fn board_size(&self) -> Coord2 {
        self.board_size
    }

    pub fn geometry(&self) -> CellGeometry {
        self.geometry
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    /// Grid plus its canvas margin, in content units.
    pub fn content_size(&self) -> Size {
        let CellGeometry {
            cell_size,
            canvas_padding,
            ..
        } = self.geometry;
        Size::new(
            f32::from(self.board_size.0) * cell_size + 2.0 * canvas_padding,
            f32::from(self.board_size.1) * cell_size + 2.0 * canvas_padding,
        )
    }

    /// Resets pan and zoom to the best fit for `viewport`.
    pub fn refit(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.transform = fit_initial(self.content_size(), viewport, MIN_SCALE);
        log::debug!("Fitted {:?} board at scale {}", self.board_size, self.transform.scale);
    }

    /// Drags the board by a screen-space delta, non-finite deltas are ignored.
    pub fn pan(&mut self, screen_dx: f32, screen_dy: f32) {
        if !screen_dx.is_finite() || !screen_dy.is_finite() {
            log::debug!("Ignoring pan by ({screen_dx}, {screen_dy})");
            return;
        }
        let scale = self.transform.scale;
        self.transform.pan_by(screen_dx / scale, screen_dy / scale);
    }

    /// Zooms about `pivot` within the scale limits, returns the factor actually applied.
    pub fn zoom(&mut self, factor: f32, pivot: Point) -> f32 {
        if !pivot.x.is_finite() || !pivot.y.is_finite() {
            log::debug!("Ignoring zoom about {pivot:?}");
            return 1.0;
        }
        let factor = clamp_zoom(factor, self.transform.scale, MIN_SCALE, MAX_SCALE);
        if factor != 1.0 {
            self.transform.zoom_about(factor, pivot);
        }
        factor
    }

    /// Wheel zoom, scrolling down zooms out.
    pub fn scroll(&mut self, delta_y: f32, pivot: Point) -> f32 {
        if delta_y > 0.0 {
            self.zoom(ZOOM_OUT_STEP, pivot)
        } else if delta_y < 0.0 {
            self.zoom(ZOOM_IN_STEP, pivot)
        } else {
            1.0
        }
    }

    fn grid_transform(&self) -> ViewTransform {
        let mut grid = self.transform;
        grid.pan_by(self.geometry.canvas_padding, self.geometry.canvas_padding);
        grid
    }

    /// Board cell under the screen point, if any.
    pub fn cell_at(&self, point: Point, require_inside_border: bool) -> Option<Coord2> {
        let (column, row) = self.grid_transform().cell_from_screen_point(
            point,
            self.geometry.cell_size,
            self.geometry.padding,
            require_inside_border,
        )?;
        let x = Coord::try_from(column).ok()?;
        let y = Coord::try_from(row).ok()?;
        (x < self.board_size.0 && y < self.board_size.1).then_some((x, y))
    }

    /// Screen position of the top-left corner of a cell.
    pub fn cell_origin(&self, (x, y): Coord2) -> Point {
        let size = self.geometry.cell_size;
        self.grid_transform()
            .apply(Point::new(f32::from(x) * size, f32::from(y) * size))
    }
}
