//! Image upload, embedding, and media settings.
//!
//! A selected file is validated before any network work, uploaded through
//! the host's upload capability, and embedded as a resizable image inside a
//! non-editable wrapper. Edit-area placeholder blocks flank the wrapper so
//! the cursor can land next to the image.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::dom::NodeId;
use crate::editor::Editor;
use crate::selection::insert_node_at;

/// Upload size ceiling.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted MIME subtypes for image uploads.
pub const ALLOWED_SUBTYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Destination category passed to the upload capability.
pub const UPLOAD_CATEGORY: &str = "editor";

/// A file picked by the user, as reported by the host.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub name: String,
    /// Full MIME type, e.g. `image/png`.
    pub mime: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

/// Upload endpoint response. Different deployments return the URL in
/// different places; see [`UploadResponse::resolve_url`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub variants: Option<UploadVariants>,
    #[serde(default)]
    pub data: Option<UploadData>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadVariants {
    #[serde(default)]
    pub gallery: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadData {
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

impl UploadResponse {
    /// The embeddable URL: gallery variant, then the generic field, then
    /// the nested original. First non-empty wins.
    pub fn resolve_url(&self) -> Option<&str> {
        [
            self.variants.as_ref().and_then(|v| v.gallery.as_deref()),
            self.url.as_deref(),
            self.data.as_ref().and_then(|d| d.original.as_deref()),
        ]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("upload rejected by server: {0}")]
    Rejected(String),
}

/// Host-provided upload capability.
pub trait Uploader {
    fn upload(&mut self, file: &FileUpload, category: &str) -> Result<UploadResponse, UploadError>;
}

/// Values shown in the media settings dialog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaSettings {
    pub src: String,
    pub alt: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Validate and upload a file, then embed the resulting image. Returns
    /// the embedded image node, or `None` if validation or upload failed
    /// (an alert is queued in that case).
    pub fn upload_image(
        &mut self,
        uploader: &mut dyn Uploader,
        file: &FileUpload,
        now: Instant,
    ) -> Option<NodeId> {
        if !self.config.active {
            return None;
        }
        let subtype = file
            .mime
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !ALLOWED_SUBTYPES.contains(&subtype.as_str()) {
            self.push_alert(format!(
                "Unsupported file type. Allowed image types: {}.",
                ALLOWED_SUBTYPES.join(", ")
            ));
            return None;
        }
        if file.size > MAX_UPLOAD_BYTES {
            self.push_alert("Image is too large. The maximum upload size is 10MB.");
            return None;
        }

        let response = match uploader.upload(file, UPLOAD_CATEGORY) {
            Ok(response) => response,
            Err(err) => {
                warn!(file = %file.name, %err, "image upload failed");
                self.push_alert(format!("Image upload failed: {err}"));
                return None;
            }
        };
        let Some(url) = response.resolve_url().map(str::to_owned) else {
            self.push_alert("The upload did not return an image URL.");
            return None;
        };
        debug!(file = %file.name, url = %url, "image uploaded");
        Some(self.embed_image(&url, now))
    }

    /// Embed an image by URL: a wrapper span holding the image, with native
    /// drag and text selection disabled on both.
    pub fn embed_image(&mut self, url: &str, now: Instant) -> NodeId {
        let wrapper = self.surface.create_element("span");
        self.surface.set_attr(wrapper, "class", "rte-image");
        self.surface.set_attr(wrapper, "contenteditable", "false");
        self.surface.set_attr(wrapper, "draggable", "false");
        self.surface.set_style(wrapper, "position", "relative");
        self.surface.set_style(wrapper, "display", "inline-block");

        let image = self.surface.create_element("img");
        self.surface.set_attr(image, "src", url);
        self.surface.set_attr(image, "draggable", "false");
        for prop in [
            "user-select",
            "-webkit-user-select",
            "-moz-user-select",
            "-ms-user-select",
            "-webkit-user-drag",
        ] {
            self.surface.set_style(image, prop, "none");
        }
        self.surface.append_child(wrapper, image);

        let at = self.caret_or_end();
        insert_node_at(&mut self.surface, at, wrapper);
        self.handle_input(now);
        image
    }

    /// The image finished loading: mark it resizable, attach the handle
    /// set, and make sure edit-area placeholders flank the wrapper.
    pub fn image_loaded(&mut self, image: NodeId, now: Instant) {
        self.surface.add_class(image, "resizable");
        self.initialize_image(image);
        self.ensure_edit_areas(image);
        self.handle_input(now);
    }

    /// The image failed to load. The broken node stays in the surface so
    /// the user can delete or fix it.
    pub fn image_load_failed(&mut self, url: &str) {
        warn!(url = %url, "embedded image failed to load");
        self.push_alert("The image could not be loaded. Check the URL or try uploading again.");
    }

    /// Empty placeholder blocks before and after the image wrapper, so the
    /// cursor can be placed adjacent to the image. Inserted only when the
    /// matching sibling is not already one.
    fn ensure_edit_areas(&mut self, image: NodeId) {
        let container = self.image_container(image);
        let needs_before = !self
            .surface
            .prev_sibling(container)
            .is_some_and(|s| self.surface.has_class(s, "image-edit-area"));
        if needs_before {
            let area = self.make_edit_area();
            self.surface.insert_before(container, area);
        }
        let needs_after = !self
            .surface
            .next_sibling(container)
            .is_some_and(|s| self.surface.has_class(s, "image-edit-area"));
        if needs_after {
            let area = self.make_edit_area();
            self.surface.insert_after(container, area);
        }
    }

    fn make_edit_area(&mut self) -> NodeId {
        let area = self.surface.create_element("div");
        self.surface.set_attr(area, "class", "image-edit-area");
        let line = self.surface.create_element("br");
        self.surface.append_child(area, line);
        area
    }

    // === Media settings dialog ===

    /// Open the settings dialog for an image (double-click). While the
    /// dialog is open the pipeline will not rewrite the surface under it.
    pub fn open_media_settings(&mut self, image: NodeId) -> MediaSettings {
        self.media_dialog_open = true;
        let (width, height) = self.image_dimensions(image);
        MediaSettings {
            src: self.surface.attr(image, "src").unwrap_or_default().to_string(),
            alt: self.surface.attr(image, "alt").unwrap_or_default().to_string(),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Apply dialog values to the image and close the dialog.
    pub fn apply_media_settings(&mut self, image: NodeId, settings: &MediaSettings, now: Instant) {
        if !settings.src.is_empty() {
            self.surface.set_attr(image, "src", &settings.src);
        }
        if settings.alt.is_empty() {
            self.surface.remove_attr(image, "alt");
        } else {
            self.surface.set_attr(image, "alt", &settings.alt);
        }
        if let (Some(width), Some(height)) = (settings.width, settings.height) {
            self.apply_image_size(image, width, height);
        }
        self.media_dialog_open = false;
        self.handle_input(now);
    }

    pub fn close_media_settings(&mut self) {
        self.media_dialog_open = false;
    }

    pub fn is_media_dialog_open(&self) -> bool {
        self.media_dialog_open
    }

    // === Hover tooltip ===

    /// Show an informational tooltip with the image's current dimensions.
    pub fn show_media_tooltip(&mut self, image: NodeId) {
        self.hide_media_tooltip(image);
        let container = self.image_container(image);
        let (width, height) = self.image_dimensions(image);
        let tooltip = self.surface.create_element("span");
        self.surface.set_attr(tooltip, "class", "rte-tooltip");
        self.surface.set_attr(tooltip, "contenteditable", "false");
        self.surface.set_style(tooltip, "position", "absolute");
        let label = self
            .surface
            .create_text(&format!("{} x {} (double-click to edit)", width.round(), height.round()));
        self.surface.append_child(tooltip, label);
        self.surface.append_child(container, tooltip);
    }

    /// Remove the tooltip, if present.
    pub fn hide_media_tooltip(&mut self, image: NodeId) {
        let container = self.image_container(image);
        let tooltips: Vec<NodeId> = self
            .surface
            .children(container)
            .iter()
            .copied()
            .filter(|&c| self.surface.has_class(c, "rte-tooltip"))
            .collect();
        for tooltip in tooltips {
            self.surface.detach(tooltip);
        }
    }
}
