//! Drag-resize handles for embedded images.
//!
//! Each resizable image gets nine affordance nodes inside its wrapper: four
//! edge strips, four corner dots, and a settings button. Corner drags keep
//! the aspect ratio (the axis that moved further wins); edge drags move only
//! their own axis. Handles are tagged with the id of the image they belong
//! to, so re-attachment tears down exactly its own prior set.

use tracing::debug;
use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::dom::NodeId;
use crate::editor::Editor;

/// Smallest allowed rendered dimension, px.
pub const MIN_IMAGE_SIZE: f64 = 50.0;

/// Affordance nodes per image: 4 edges + 4 corners + 1 settings button.
pub const HANDLE_SET_SIZE: usize = 9;

/// Fallback rendered size when an image carries no explicit dimensions.
const DEFAULT_WIDTH: f64 = 480.0;
const DEFAULT_HEIGHT: f64 = 360.0;

/// Which handle a drag started on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
    Top,
    Right,
    Bottom,
    Left,
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl HandleKind {
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::NorthWest | Self::NorthEast | Self::SouthEast | Self::SouthWest
        )
    }

    /// Growth direction per axis: which way the pointer moves to enlarge.
    fn direction(self) -> (f64, f64) {
        match self {
            Self::Top => (0.0, -1.0),
            Self::Right => (1.0, 0.0),
            Self::Bottom => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::NorthWest => (-1.0, -1.0),
            Self::NorthEast => (1.0, -1.0),
            Self::SouthEast => (1.0, 1.0),
            Self::SouthWest => (-1.0, 1.0),
        }
    }

    fn class_suffix(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::NorthWest => "nw",
            Self::NorthEast => "ne",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }

    fn cursor(self) -> &'static str {
        match self {
            Self::Top | Self::Bottom => "ns-resize",
            Self::Left | Self::Right => "ew-resize",
            Self::NorthWest | Self::SouthEast => "nwse-resize",
            Self::NorthEast | Self::SouthWest => "nesw-resize",
        }
    }

    const ALL: [HandleKind; 8] = [
        Self::Top,
        Self::Right,
        Self::Bottom,
        Self::Left,
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthEast,
        Self::SouthWest,
    ];
}

/// An in-progress drag.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DragSession {
    image: NodeId,
    kind: HandleKind,
    start_width: f64,
    start_height: f64,
    start_x: f64,
    start_y: f64,
    /// height / width at drag start.
    aspect: f64,
}

/// Resize bookkeeping owned by the editor.
#[derive(Default)]
pub(crate) struct ResizeState {
    pub(crate) session: Option<DragSession>,
    /// While a drag is live, native HTML5 drag events are suppressed so the
    /// browser does not start an image drag instead of a resize.
    pub(crate) native_drag_suppressed: bool,
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Set up resize affordances on an image: create the handle set, then
    /// bind the drag handlers unless this image is already bound.
    pub fn initialize_image(&mut self, image: NodeId) {
        self.ensure_handles(image);
        if self.surface.attr(image, "data-rte-bound").is_none() {
            self.surface.set_attr(image, "data-rte-bound", "true");
        }
    }

    /// Create the nine-affordance handle set inside the image's wrapper,
    /// tearing down any prior set belonging to this image first. The image
    /// is wrapped on the fly if it arrived without a container (pasted
    /// content).
    pub fn ensure_handles(&mut self, image: NodeId) {
        let container = self.image_container(image);

        // Tear down by identifier, not by bare class: unrelated elements
        // sharing a handle class must survive.
        let marker = image_marker(image);
        let stale: Vec<NodeId> = self
            .surface
            .children(container)
            .iter()
            .copied()
            .filter(|&c| self.surface.attr(c, "data-rte-for") == Some(marker.as_str()))
            .collect();
        for node in stale {
            self.surface.detach(node);
        }

        for kind in HandleKind::ALL {
            let shape = if kind.is_corner() { "corner" } else { "edge" };
            let handle = self.surface.create_element("span");
            self.surface.set_attr(
                handle,
                "class",
                &format!("rte-handle rte-handle-{} rte-handle-{}", shape, kind.class_suffix()),
            );
            self.surface.set_attr(handle, "data-rte-for", &marker);
            self.surface.set_attr(handle, "contenteditable", "false");
            self.surface.set_attr(handle, "draggable", "false");
            self.surface.set_style(handle, "position", "absolute");
            self.surface.set_style(handle, "cursor", kind.cursor());
            self.surface.append_child(container, handle);
        }

        let settings = self.surface.create_element("span");
        self.surface.set_attr(settings, "class", "rte-settings");
        self.surface.set_attr(settings, "data-rte-for", &marker);
        self.surface.set_attr(settings, "contenteditable", "false");
        self.surface.set_attr(settings, "draggable", "false");
        self.surface.set_style(settings, "position", "absolute");
        self.surface.set_style(settings, "cursor", "pointer");
        self.surface.append_child(container, settings);
    }

    /// Count of editing affordances currently attached for an image.
    pub fn handle_count(&self, image: NodeId) -> usize {
        let Some(container) = self.surface.parent(image) else {
            return 0;
        };
        self.surface
            .children(container)
            .iter()
            .filter(|&&c| {
                self.surface.has_class(c, "rte-handle") || self.surface.has_class(c, "rte-settings")
            })
            .count()
    }

    /// Begin a drag on one of the image's handles.
    pub fn begin_drag(&mut self, image: NodeId, kind: HandleKind, pointer_x: f64, pointer_y: f64) {
        if !self.config.active {
            return;
        }
        let (width, height) = self.image_dimensions(image);
        self.resize.session = Some(DragSession {
            image,
            kind,
            start_width: width,
            start_height: height,
            start_x: pointer_x,
            start_y: pointer_y,
            aspect: height / width,
        });
        self.resize.native_drag_suppressed = true;
        debug!(?kind, width, height, "resize drag started");
    }

    /// Update the image's dimensions for the current pointer position.
    pub fn drag_to(&mut self, pointer_x: f64, pointer_y: f64) {
        let Some(session) = self.resize.session else {
            return;
        };
        let (width, height) = session.resolve(pointer_x, pointer_y);
        self.apply_image_size(session.image, width, height);
    }

    /// Finish the drag: clear suppression state and run the content
    /// pipeline, since inline size changes do not raise input events of
    /// their own.
    pub fn end_drag(&mut self, now: Instant) {
        if self.resize.session.take().is_none() {
            return;
        }
        self.resize.native_drag_suppressed = false;
        self.handle_input(now);
    }

    pub fn is_native_drag_suppressed(&self) -> bool {
        self.resize.native_drag_suppressed
    }

    /// Current rendered size: inline style, then width/height attributes,
    /// then the embed default.
    pub(crate) fn image_dimensions(&self, image: NodeId) -> (f64, f64) {
        let width = self
            .dimension_of(image, "width")
            .unwrap_or(DEFAULT_WIDTH)
            .max(1.0);
        let height = self
            .dimension_of(image, "height")
            .unwrap_or(DEFAULT_HEIGHT)
            .max(1.0);
        (width, height)
    }

    fn dimension_of(&self, image: NodeId, prop: &str) -> Option<f64> {
        if let Some(value) = self.surface.style(image, prop) {
            if let Ok(px) = value.trim_end_matches("px").trim().parse::<f64>() {
                return Some(px);
            }
        }
        self.surface.attr(image, prop)?.trim().parse::<f64>().ok()
    }

    pub(crate) fn apply_image_size(&mut self, image: NodeId, width: f64, height: f64) {
        self.surface
            .set_style(image, "width", &format!("{}px", width.round()));
        self.surface
            .set_style(image, "height", &format!("{}px", height.round()));
    }

    /// The image's wrapper element, created on demand for bare images.
    pub(crate) fn image_container(&mut self, image: NodeId) -> NodeId {
        if let Some(parent) = self.surface.parent(image) {
            if self.surface.has_class(parent, "rte-image") {
                return parent;
            }
        }
        let wrapper = self.surface.create_element("span");
        self.surface.set_attr(wrapper, "class", "rte-image");
        self.surface.set_attr(wrapper, "contenteditable", "false");
        self.surface.set_attr(wrapper, "draggable", "false");
        self.surface.set_style(wrapper, "position", "relative");
        self.surface.set_style(wrapper, "display", "inline-block");
        if self.surface.parent(image).is_some() {
            self.surface.insert_before(image, wrapper);
        } else {
            let root = self.surface.root();
            self.surface.append_child(root, wrapper);
        }
        self.surface.append_child(wrapper, image);
        wrapper
    }
}

impl DragSession {
    /// New (width, height) for a pointer position.
    ///
    /// Corners: the axis with the larger absolute delta dominates and the
    /// other dimension follows the aspect ratio; ties go to horizontal.
    /// Edges: only the matching axis changes.
    fn resolve(&self, pointer_x: f64, pointer_y: f64) -> (f64, f64) {
        let (dir_x, dir_y) = self.kind.direction();
        let dx = pointer_x - self.start_x;
        let dy = pointer_y - self.start_y;

        if self.kind.is_corner() {
            if dy.abs() > dx.abs() {
                let height = (self.start_height + dy * dir_y).max(MIN_IMAGE_SIZE);
                let width = (height / self.aspect).max(MIN_IMAGE_SIZE);
                (width, height)
            } else {
                let width = (self.start_width + dx * dir_x).max(MIN_IMAGE_SIZE);
                let height = (width * self.aspect).max(MIN_IMAGE_SIZE);
                (width, height)
            }
        } else if dir_x != 0.0 {
            let width = (self.start_width + dx * dir_x).max(MIN_IMAGE_SIZE);
            (width, self.start_height)
        } else {
            let height = (self.start_height + dy * dir_y).max(MIN_IMAGE_SIZE);
            (self.start_width, height)
        }
    }
}

/// Stable per-image marker used to tag the handles belonging to it.
fn image_marker(image: NodeId) -> String {
    format!("img-{}", image.index())
}

#[cfg(test)]
mod tests {
    use fundry_editor_html::HtmlPipeline;
    use web_time::Instant;

    use super::*;

    type TestEditor = Editor<HtmlPipeline>;

    fn make_editor_with_image() -> (TestEditor, NodeId) {
        let mut editor = Editor::new(HtmlPipeline);
        editor
            .surface
            .set_html("<span class=\"rte-image\"><img src=\"/i.png\" class=\"resizable\" width=\"200\" height=\"100\"></span>");
        let image = editor.surface.find_by_tag("img")[0];
        (editor, image)
    }

    #[test]
    fn test_initialize_creates_nine_affordances() {
        let (mut editor, image) = make_editor_with_image();
        editor.initialize_image(image);
        assert_eq!(editor.handle_count(image), HANDLE_SET_SIZE);
        assert_eq!(editor.surface.attr(image, "data-rte-bound"), Some("true"));
    }

    #[test]
    fn test_reinitialize_does_not_duplicate() {
        let (mut editor, image) = make_editor_with_image();
        editor.initialize_image(image);
        editor.initialize_image(image);
        assert_eq!(editor.handle_count(image), HANDLE_SET_SIZE);
    }

    #[test]
    fn test_corner_drag_preserves_aspect() {
        let (mut editor, image) = make_editor_with_image();
        editor.initialize_image(image);
        editor.begin_drag(image, HandleKind::SouthEast, 300.0, 300.0);
        assert!(editor.is_native_drag_suppressed());

        // Horizontal moved further: width drives, height follows 1:2 aspect.
        editor.drag_to(400.0, 310.0);
        assert_eq!(editor.surface.style(image, "width"), Some("300px"));
        assert_eq!(editor.surface.style(image, "height"), Some("150px"));
    }

    #[test]
    fn test_corner_drag_vertical_dominant() {
        let (mut editor, image) = make_editor_with_image();
        editor.begin_drag(image, HandleKind::SouthEast, 0.0, 0.0);
        editor.drag_to(10.0, 60.0);
        // height 100 + 60 = 160; width follows: 160 / 0.5 = 320.
        assert_eq!(editor.surface.style(image, "height"), Some("160px"));
        assert_eq!(editor.surface.style(image, "width"), Some("320px"));
    }

    #[test]
    fn test_tie_goes_to_horizontal() {
        let (mut editor, image) = make_editor_with_image();
        editor.begin_drag(image, HandleKind::SouthEast, 0.0, 0.0);
        editor.drag_to(40.0, 40.0);
        assert_eq!(editor.surface.style(image, "width"), Some("240px"));
        assert_eq!(editor.surface.style(image, "height"), Some("120px"));
    }

    #[test]
    fn test_edge_drag_changes_one_axis() {
        let (mut editor, image) = make_editor_with_image();
        editor.begin_drag(image, HandleKind::Right, 0.0, 0.0);
        editor.drag_to(50.0, 80.0);
        assert_eq!(editor.surface.style(image, "width"), Some("250px"));
        assert_eq!(editor.surface.style(image, "height"), Some("100px"));
    }

    #[test]
    fn test_left_edge_grows_leftward() {
        let (mut editor, image) = make_editor_with_image();
        editor.begin_drag(image, HandleKind::Left, 100.0, 0.0);
        editor.drag_to(60.0, 0.0);
        assert_eq!(editor.surface.style(image, "width"), Some("240px"));
    }

    #[test]
    fn test_minimum_size_clamp() {
        let (mut editor, image) = make_editor_with_image();
        editor.begin_drag(image, HandleKind::Right, 0.0, 0.0);
        editor.drag_to(-500.0, 0.0);
        assert_eq!(editor.surface.style(image, "width"), Some("50px"));
    }

    #[test]
    fn test_end_drag_clears_state_and_notifies() {
        let (mut editor, image) = make_editor_with_image();
        editor.begin_drag(image, HandleKind::Right, 0.0, 0.0);
        editor.drag_to(50.0, 0.0);
        editor.end_drag(Instant::now());
        assert!(!editor.is_native_drag_suppressed());
        assert!(editor.resize.session.is_none());
        // Pipeline picked the resize up for delivery.
        assert!(
            editor
                .pipeline
                .last_delivered
                .as_deref()
                .is_some_and(|c| c.contains("width: 250px"))
        );
    }

    #[test]
    fn test_bare_image_gets_wrapped() {
        let mut editor = Editor::new(HtmlPipeline);
        editor.surface.set_html("<img src=\"/i.png\" class=\"resizable\">");
        let image = editor.surface.find_by_tag("img")[0];
        editor.initialize_image(image);
        let wrapper = editor.surface.parent(image).expect("image has wrapper");
        assert!(editor.surface.has_class(wrapper, "rte-image"));
        assert_eq!(editor.handle_count(image), HANDLE_SET_SIZE);
    }
}
