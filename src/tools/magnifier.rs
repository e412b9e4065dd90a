//! Pointer-following zoom lens over the background image.
//!
//! The tool only maintains a [`MagnifierState`]; drawing the lens is the
//! [`MagnifierView`]'s job. Pointer moves are coalesced: each move stores the
//! latest position and at most one frame callback is pending, so the view is
//! updated at most once per display frame no matter how fast the pointer moves.

use super::{Lifecycle, Subscriptions, Tool, ToolContext};
use crate::draw::{Color, SELECTION_BLUE};
use crate::error::OverlayError;
use crate::input::{FrameId, ToolKind, WheelDelta};
use crate::scene::{PointerEvent, SurfaceEvent};
use crate::util;
use kurbo::Point;
use serde::Serialize;

const MIN_ZOOM: f64 = 1.5;
const MAX_ZOOM: f64 = 5.0;
const ZOOM_STEP: f64 = 0.1;

/// Lens appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnifierOptions {
    pub zoom_level: f64,
    pub radius: f64,
    pub border_width: f64,
    pub border_color: Color,
}

impl Default for MagnifierOptions {
    fn default() -> Self {
        Self {
            zoom_level: 2.0,
            radius: 100.0,
            border_width: 2.0,
            border_color: SELECTION_BLUE,
        }
    }
}

/// State consumed by the lens view.
///
/// Serialized with camelCase keys so hosts can forward it to a web view
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnifierState {
    pub show: bool,
    pub x: f64,
    pub y: f64,
    pub zoom_level: f64,
    pub radius: f64,
    pub border_width: f64,
    /// `#RRGGBB`
    pub border_color: String,
    pub background_image_url: String,
    pub bg_left: f64,
    pub bg_top: f64,
    pub bg_scale: f64,
    pub original_image_width: f64,
    pub original_image_height: f64,
}

impl MagnifierState {
    fn new(options: &MagnifierOptions) -> Self {
        Self {
            show: false,
            x: 0.0,
            y: 0.0,
            zoom_level: options.zoom_level,
            radius: options.radius,
            border_width: options.border_width,
            border_color: options.border_color.to_hex(),
            background_image_url: String::new(),
            bg_left: 0.0,
            bg_top: 0.0,
            bg_scale: 1.0,
            original_image_width: 0.0,
            original_image_height: 0.0,
        }
    }

    /// JSON snapshot of the state.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Visual lens component driven by [`MagnifierTool`].
pub trait MagnifierView {
    /// Creates the lens; called on activation.
    fn mount(&mut self, state: &MagnifierState) -> Result<(), OverlayError>;

    /// Pushes a new state to the mounted lens.
    fn update(&mut self, state: &MagnifierState);

    /// Tears the lens down; called on deactivation.
    fn unmount(&mut self) -> Result<(), OverlayError>;
}

/// View for hosts without a lens component; logs state changes.
#[derive(Debug, Default)]
pub struct HeadlessView;

impl MagnifierView for HeadlessView {
    fn mount(&mut self, _state: &MagnifierState) -> Result<(), OverlayError> {
        log::debug!("Magnifier mounted (headless)");
        Ok(())
    }

    fn update(&mut self, state: &MagnifierState) {
        log::trace!(
            "Magnifier at ({:.0}, {:.0}) zoom {} shown {}",
            state.x,
            state.y,
            state.zoom_level,
            state.show
        );
    }

    fn unmount(&mut self) -> Result<(), OverlayError> {
        log::debug!("Magnifier unmounted (headless)");
        Ok(())
    }
}

/// Zoomed preview that follows the pointer.
pub struct MagnifierTool {
    lifecycle: Lifecycle,
    options: MagnifierOptions,
    shortcut: Option<String>,
    state: MagnifierState,
    view: Box<dyn MagnifierView>,
    mounted: bool,
    pointer: Subscriptions,
    pending_frame: Option<FrameId>,
    latest: Option<Point>,
}

impl std::fmt::Debug for MagnifierTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagnifierTool")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("mounted", &self.mounted)
            .field("pending_frame", &self.pending_frame)
            .finish_non_exhaustive()
    }
}

impl MagnifierTool {
    pub fn new(
        options: MagnifierOptions,
        shortcut: Option<String>,
        view: Box<dyn MagnifierView>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            state: MagnifierState::new(&options),
            options,
            shortcut,
            view,
            mounted: false,
            pointer: Subscriptions::default(),
            pending_frame: None,
            latest: None,
        }
    }

    pub fn state(&self) -> &MagnifierState {
        &self.state
    }

    pub fn config(&self) -> MagnifierOptions {
        MagnifierOptions {
            zoom_level: self.state.zoom_level,
            ..self.options
        }
    }

    /// Applies new lens settings and pushes them to a mounted view.
    pub fn set_config(&mut self, options: MagnifierOptions) {
        self.options = options;
        self.state.zoom_level = options.zoom_level.clamp(MIN_ZOOM, MAX_ZOOM);
        self.state.radius = options.radius;
        self.state.border_width = options.border_width;
        self.state.border_color = options.border_color.to_hex();
        self.push();
    }

    /// Frame callback awaiting delivery, if any.
    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    fn push(&mut self) {
        if self.mounted {
            self.view.update(&self.state);
        }
    }

    /// Copies placement of the first image primitive into the state.
    fn cache_background(&mut self, ctx: &ToolContext<'_>) {
        let image = ctx
            .scene
            .find_first(|p| p.as_image().is_some())
            .and_then(|id| ctx.scene.get(id))
            .and_then(|p| p.as_image());

        match image {
            Some(image) => {
                self.state.background_image_url = image.asset.url.clone();
                self.state.bg_left = image.left;
                self.state.bg_top = image.top;
                self.state.bg_scale = image.scale;
                self.state.original_image_width = image.asset.width;
                self.state.original_image_height = image.asset.height;
            }
            None => log::debug!("No background image attached; magnifier has nothing to show"),
        }
    }

    fn cancel_pending(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(frame) = self.pending_frame.take() {
            ctx.host.cancel_frame(frame);
        }
        self.latest = None;
    }
}

impl Tool for MagnifierTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Magnifier
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn shortcut_key(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    fn handles_wheel(&self) -> bool {
        true
    }

    fn on_activate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.cache_background(ctx);
        self.state.show = false;
        self.view.mount(&self.state)?;
        self.mounted = true;

        self.pointer.on(ctx.scene, ToolKind::Magnifier, SurfaceEvent::Move);
        self.pointer.on(ctx.scene, ToolKind::Magnifier, SurfaceEvent::Out);
        Ok(())
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.cancel_pending(ctx);
        self.pointer.release(ctx.scene);
        self.state.show = false;

        if self.mounted {
            self.mounted = false;
            self.view.unmount()?;
        }
        Ok(())
    }

    fn on_pointer(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> Result<(), OverlayError> {
        match event.event {
            SurfaceEvent::Move => {
                self.latest = Some(event.point);
                if self.pending_frame.is_none() {
                    self.pending_frame = Some(ctx.host.request_frame());
                }
            }
            SurfaceEvent::Out => {
                self.cancel_pending(ctx);
                self.state.show = false;
                self.push();
            }
            _ => {}
        }
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &mut ToolContext<'_>, frame: FrameId) -> Result<(), OverlayError> {
        if self.pending_frame != Some(frame) {
            return Ok(());
        }
        self.pending_frame = None;

        if let Some(point) = self.latest.take() {
            self.state.show = true;
            self.state.x = point.x;
            self.state.y = point.y;
            self.push();
        }
        Ok(())
    }

    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, delta: WheelDelta) {
        let zoom = util::wheel_step(
            self.state.zoom_level,
            delta.delta_y,
            ZOOM_STEP,
            MIN_ZOOM,
            MAX_ZOOM,
        );
        self.state.zoom_level = util::round_to_tenth(zoom);
        self.push();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::LoadedAsset;
    use crate::input::LocalHost;
    use crate::scene::{ImagePrimitive, Primitive, PrimitiveKind, Scene};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl MagnifierView for Recorder {
        fn mount(&mut self, _state: &MagnifierState) -> Result<(), OverlayError> {
            self.0.borrow_mut().push("mount".into());
            Ok(())
        }

        fn update(&mut self, state: &MagnifierState) {
            self.0
                .borrow_mut()
                .push(format!("update {} {} {}", state.x, state.y, state.show));
        }

        fn unmount(&mut self) -> Result<(), OverlayError> {
            self.0.borrow_mut().push("unmount".into());
            Ok(())
        }
    }

    fn scene_with_image() -> Scene {
        let mut scene = Scene::new(1000.0, 500.0);
        scene
            .add(Primitive::new(PrimitiveKind::Image(ImagePrimitive {
                asset: LoadedAsset::new("file:///tmp/shot.png", 800.0, 600.0),
                left: 166.0,
                top: 0.0,
                scale: 0.8,
            })))
            .unwrap();
        scene
    }

    fn tool(recorder: &Recorder) -> MagnifierTool {
        MagnifierTool::new(
            MagnifierOptions::default(),
            Some("4".into()),
            Box::new(recorder.clone()),
        )
    }

    #[test]
    fn moves_coalesce_into_one_update_per_frame() {
        let recorder = Recorder::default();
        let mut magnifier = tool(&recorder);
        let mut scene = scene_with_image();
        let mut host = LocalHost::new();
        let mut ctx = ToolContext {
            scene: &mut scene,
            host: &mut host,
            mask: None,
        };
        magnifier.activate(&mut ctx).unwrap();

        for x in [10.0, 20.0, 30.0] {
            magnifier
                .on_pointer(&mut ctx, &PointerEvent::moved(Point::new(x, 5.0)))
                .unwrap();
        }
        let frame = magnifier.pending_frame().expect("frame requested");
        magnifier.on_frame(&mut ctx, frame).unwrap();

        assert_eq!(
            *recorder.0.borrow(),
            vec!["mount".to_string(), "update 30 5 true".to_string()]
        );
        assert_eq!(magnifier.state().background_image_url, "file:///tmp/shot.png");
        assert_eq!(magnifier.state().bg_scale, 0.8);
    }

    #[test]
    fn deactivate_cancels_pending_frame_and_unmounts() {
        let recorder = Recorder::default();
        let mut magnifier = tool(&recorder);
        let mut scene = scene_with_image();
        let mut host = LocalHost::new();
        let mut ctx = ToolContext {
            scene: &mut scene,
            host: &mut host,
            mask: None,
        };
        magnifier.activate(&mut ctx).unwrap();
        magnifier
            .on_pointer(&mut ctx, &PointerEvent::moved(Point::new(1.0, 1.0)))
            .unwrap();
        let frame = magnifier.pending_frame().unwrap();

        magnifier.deactivate(&mut ctx).unwrap();
        // A late callback after teardown changes nothing
        magnifier.on_frame(&mut ctx, frame).unwrap();
        drop(ctx);

        assert_eq!(host.pending_frames(), 0);
        assert_eq!(scene.subscription_count(ToolKind::Magnifier), 0);
        assert_eq!(
            *recorder.0.borrow(),
            vec!["mount".to_string(), "unmount".to_string()]
        );
    }

    #[test]
    fn pointer_out_hides_lens() {
        let recorder = Recorder::default();
        let mut magnifier = tool(&recorder);
        let mut scene = scene_with_image();
        let mut host = LocalHost::new();
        let mut ctx = ToolContext {
            scene: &mut scene,
            host: &mut host,
            mask: None,
        };
        magnifier.activate(&mut ctx).unwrap();
        magnifier
            .on_pointer(&mut ctx, &PointerEvent::moved(Point::new(1.0, 1.0)))
            .unwrap();
        let frame = magnifier.pending_frame().unwrap();
        magnifier.on_frame(&mut ctx, frame).unwrap();
        magnifier
            .on_pointer(&mut ctx, &PointerEvent::out(Point::new(1.0, 1.0)))
            .unwrap();

        assert!(!magnifier.state().show);
        assert_eq!(recorder.0.borrow().last().unwrap(), "update 1 1 false");
    }

    #[test]
    fn wheel_zoom_is_clamped_and_rounded() {
        let mut magnifier = tool(&Recorder::default());
        let mut scene = Scene::new(10.0, 10.0);
        let mut host = LocalHost::new();
        let mut ctx = ToolContext {
            scene: &mut scene,
            host: &mut host,
            mask: None,
        };

        magnifier.on_wheel(&mut ctx, WheelDelta::UP);
        assert_eq!(magnifier.state().zoom_level, 2.1);
        for _ in 0..50 {
            magnifier.on_wheel(&mut ctx, WheelDelta::UP);
        }
        assert_eq!(magnifier.state().zoom_level, 5.0);
        for _ in 0..50 {
            magnifier.on_wheel(&mut ctx, WheelDelta::DOWN);
        }
        assert_eq!(magnifier.state().zoom_level, 1.5);
    }

    #[test]
    fn state_serializes_with_camel_case_keys() {
        let magnifier = tool(&Recorder::default());
        let json = magnifier.state().to_json().unwrap();
        assert!(json.contains("\"zoomLevel\":2.0"));
        assert!(json.contains("\"borderColor\":\"#409EFF\""));
        assert!(json.contains("\"originalImageWidth\""));
    }

    #[test]
    fn failing_host_leaves_tool_inactive() {
        let mut magnifier = tool(&Recorder::default());
        let mut scene = Scene::new(10.0, 10.0);
        let mut host = LocalHost::new();
        host.fail_attach(true);
        let mut ctx = ToolContext {
            scene: &mut scene,
            host: &mut host,
            mask: None,
        };

        assert!(magnifier.activate(&mut ctx).is_err());
        assert!(!magnifier.is_active());
        drop(ctx);
        assert_eq!(scene.subscription_count(ToolKind::Magnifier), 0);
        assert_eq!(host.pending_frames(), 0);
    }
}
