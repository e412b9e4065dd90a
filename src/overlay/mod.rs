//! Tool coordinator.
//!
//! [`Overlay`] owns the scene, the injected event host, the session mask, one
//! instance of every tool and the active-tool slot. All input reaches tools
//! through it:
//!
//! - pointer events are resolved against the scene (hit testing and handle
//!   manipulation) and delivered to the tools subscribed to them, followed by
//!   any geometry notifications the manipulation produced
//! - key presses go through the shortcut dispatcher and become tool switches
//! - wheel notifications reach tools that hold a wheel listener
//! - frame callbacks reach the active tool
//!
//! Switching is exclusive: the previous tool is fully deactivated (every
//! subscription released) before the next one is activated.

use crate::asset::{AssetLoader, LoadedAsset};
use crate::config::Config;
use crate::error::OverlayError;
use crate::input::{EventHost, FrameId, KeyPress, ShortcutDispatcher, ToolKind, WheelDelta};
use crate::scene::{
    GroupPrimitive, ImagePrimitive, ObjectId, PointerEvent, Primitive, PrimitiveKind,
    RectPrimitive, Scene, SurfaceEvent,
};
use crate::tools::{
    ArrowTool, CropTool, HeadlessView, MagnifierTool, MagnifierView, MaskOverlay, MaskTool,
    RectTool, Tool, ToolContext,
};
use crate::util;
use kurbo::Affine;


/// Owns the rendering surface, the mask overlay and the one active tool.
pub struct Overlay<H: EventHost> {
    config: Config,
    host: H,
    scene: Scene,
    mask: Option<MaskOverlay>,
    background: Option<ObjectId>,
    selection_tool: ToolKind,
    active: Option<ToolKind>,
    shortcuts: ShortcutDispatcher<ToolKind>,
    crop: CropTool,
    mask_select: MaskTool,
    rect: RectTool,
    arrow: ArrowTool,
    magnifier: MagnifierTool,
    disposed: bool,
}

impl<H: EventHost> Overlay<H> {
    /// Creates a session over a `width` × `height` viewport with a headless
    /// magnifier view.
    pub fn new(config: Config, width: f64, height: f64, host: H) -> Result<Self, OverlayError> {
        Self::with_view(config, width, height, host, Box::new(HeadlessView))
    }

    /// Creates a session whose magnifier drives `view`.
    ///
    /// Shortcuts are validated, registered and the keyboard listener attached
    /// before this returns.
    pub fn with_view(
        config: Config,
        width: f64,
        height: f64,
        host: H,
        view: Box<dyn MagnifierView>,
    ) -> Result<Self, OverlayError> {
        let selection_tool = config.selection.style.tool();
        config.shortcuts.build_tool_map(selection_tool)?;

        let key = |tool: ToolKind| config.shortcuts.key_for(tool).map(str::to_string);
        let selection = config.selection.options();

        let mut overlay = Self {
            crop: CropTool::new(selection, key(ToolKind::CropSelect)),
            mask_select: MaskTool::new(selection, key(ToolKind::MaskSelect)),
            rect: RectTool::new(config.rectangle.options(), key(ToolKind::Rectangle)),
            arrow: ArrowTool::new(config.arrow.options(), key(ToolKind::Arrow)),
            magnifier: MagnifierTool::new(config.magnifier.options(), key(ToolKind::Magnifier), view),
            scene: Scene::new(width, height),
            host,
            mask: None,
            background: None,
            selection_tool,
            active: None,
            shortcuts: ShortcutDispatcher::new(),
            disposed: false,
            config,
        };

        for tool in [
            selection_tool,
            ToolKind::Rectangle,
            ToolKind::Arrow,
            ToolKind::Magnifier,
        ] {
            overlay.register_shortcut(tool);
        }
        overlay.shortcuts.start_listening(&mut overlay.host)?;

        log::info!(
            "Overlay session {}x{} using {} selection",
            width,
            height,
            selection_tool.label()
        );
        Ok(overlay)
    }

    /// Runs `f` with the tool for `kind` and a context over this session.
    fn with_tool<R>(
        &mut self,
        kind: ToolKind,
        f: impl FnOnce(&mut dyn Tool, &mut ToolContext<'_>) -> R,
    ) -> R {
        let Self {
            scene,
            host,
            mask,
            crop,
            mask_select,
            rect,
            arrow,
            magnifier,
            ..
        } = self;

        let tool: &mut dyn Tool = match kind {
            ToolKind::CropSelect => crop,
            ToolKind::MaskSelect => mask_select,
            ToolKind::Rectangle => rect,
            ToolKind::Arrow => arrow,
            ToolKind::Magnifier => magnifier,
        };
        let mut ctx = ToolContext {
            scene,
            host,
            mask: *mask,
        };
        f(tool, &mut ctx)
    }

    fn tool(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::CropSelect => &self.crop,
            ToolKind::MaskSelect => &self.mask_select,
            ToolKind::Rectangle => &self.rect,
            ToolKind::Arrow => &self.arrow,
            ToolKind::Magnifier => &self.magnifier,
        }
    }

    // ------------------------------------------------------------------
    // Tool switching
    // ------------------------------------------------------------------

    /// Binds the tool's shortcut key, if it declares one, to a switch to it.
    /// A key already bound to another tool is rebound.
    pub fn register_shortcut(&mut self, kind: ToolKind) {
        let Some(key) = self.tool(kind).shortcut_key().map(str::to_string) else {
            return;
        };
        log::debug!("Shortcut '{}' switches to the {} tool", key, kind.label());
        self.shortcuts.register(key, move || kind);
    }

    /// Makes `kind` the single active tool.
    ///
    /// Switching to the already active tool does nothing. Otherwise the current
    /// tool is deactivated first; a teardown error there is logged and the
    /// switch proceeds, since the outgoing tool has released its subscriptions
    /// by the time the error is reported.
    pub fn switch_to(&mut self, kind: ToolKind) -> Result<(), OverlayError> {
        if self.disposed {
            return Err(OverlayError::Disposed);
        }
        if self.active == Some(kind) {
            return Ok(());
        }

        if let Some(previous) = self.active {
            if let Err(err) = self.deactivate_tool(previous) {
                log::error!("Deactivating {} tool failed: {}", previous.label(), err);
            }
        }

        self.with_tool(kind, |tool, ctx| tool.activate(ctx))?;
        self.active = Some(kind);
        log::info!("Switched to {} tool", kind.label());
        Ok(())
    }

    /// Deactivates `kind`, clearing the active slot only if it still holds
    /// that tool. Deactivating an inactive tool is a no-op.
    pub fn deactivate_tool(&mut self, kind: ToolKind) -> Result<(), OverlayError> {
        let result = self.with_tool(kind, |tool, ctx| tool.deactivate(ctx));
        if self.active == Some(kind) {
            self.active = None;
        }
        result
    }

    // ------------------------------------------------------------------
    // Background and mask
    // ------------------------------------------------------------------

    /// Loads the screenshot, then attaches it (see [`Overlay::attach_background`]).
    pub async fn load_background_asset(
        &mut self,
        url: &str,
        loader: &dyn AssetLoader,
    ) -> Result<ObjectId, OverlayError> {
        log::debug!("Loading background asset {}", url);
        let asset = loader.load(url).await?;
        self.attach_background(asset)
    }

    /// Places a loaded screenshot and starts the session on it.
    ///
    /// The image is scaled to fit the viewport (aspect preserved), centered
    /// and made non-interactive, then the scene is marked for redraw. Only
    /// after that is the mask overlay created and the default selection tool
    /// activated. A previously attached background is replaced in place.
    pub fn attach_background(&mut self, asset: LoadedAsset) -> Result<ObjectId, OverlayError> {
        if self.disposed {
            return Err(OverlayError::Disposed);
        }

        let placement = util::fit_to_viewport(
            asset.width,
            asset.height,
            self.scene.width(),
            self.scene.height(),
        );
        log::info!(
            "Attaching {}x{} background at scale {:.3}",
            asset.width,
            asset.height,
            placement.scale
        );

        let image = Primitive::new(PrimitiveKind::Image(ImagePrimitive {
            asset,
            left: placement.left,
            top: placement.top,
            scale: placement.scale,
        }));

        let id = match self.background.take() {
            Some(previous) if self.scene.contains(previous) => {
                self.scene.remove(previous)?;
                self.scene.add_at(0, image)?
            }
            _ => self.scene.add(image)?,
        };
        self.background = Some(id);
        self.scene.request_render();

        if self.mask.is_none() {
            self.create_mask_overlay()?;
        }
        self.switch_to(self.selection_tool)?;
        Ok(id)
    }

    /// Builds the session's mask primitive over the full viewport, directly
    /// above the background and below any selection decorations.
    ///
    /// A crop session gets a dimming group (children in the group's local
    /// plane); a mask session gets a single dimming rectangle that the
    /// selection clips. An existing overlay is replaced and the current
    /// selection, if any, is mirrored into the new one.
    pub fn create_mask_overlay(&mut self) -> Result<MaskOverlay, OverlayError> {
        if let Some(existing) = self.mask.take() {
            let id = match existing {
                MaskOverlay::Hole { group } => group,
                MaskOverlay::Clip { overlay } => overlay,
            };
            if self.scene.contains(id) {
                self.scene.remove(id)?;
            }
        }

        let viewport = self.scene.viewport();
        let dim = self.config.overlay.fill();
        let index = self
            .background
            .and_then(|id| self.scene.index_of(id))
            .map_or(0, |index| index + 1);

        let mask = match self.selection_tool {
            ToolKind::MaskSelect => {
                let overlay = self.scene.add_at(
                    index,
                    Primitive::new(PrimitiveKind::Rect(RectPrimitive::new(viewport).with_fill(dim))),
                )?;
                MaskOverlay::Clip { overlay }
            }
            _ => {
                let group = self.scene.add_at(
                    index,
                    Primitive::new(PrimitiveKind::Group(GroupPrimitive::new(Affine::IDENTITY))),
                )?;
                self.scene.add_to_group(
                    group,
                    Primitive::new(PrimitiveKind::Rect(RectPrimitive::new(viewport).with_fill(dim))),
                )?;
                MaskOverlay::Hole { group }
            }
        };

        self.mask = Some(mask);
        self.scene.request_render();
        log::debug!("Mask overlay created: {:?}", mask);
        self.resync_selection()?;
        Ok(mask)
    }

    // ------------------------------------------------------------------
    // Input routing
    // ------------------------------------------------------------------

    /// Resolves a pointer event against the scene and delivers it to the
    /// subscribed tools, then delivers any geometry notifications it caused.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), OverlayError> {
        if self.disposed {
            return Ok(());
        }

        let mut event = event;
        event.target = match event.event {
            SurfaceEvent::Down if event.is_primary() => self.scene.begin_manipulation(event.point),
            SurfaceEvent::Down => self.scene.hit_test(event.point),
            SurfaceEvent::Move => {
                self.scene.continue_manipulation(event.point);
                self.scene.hit_test(event.point)
            }
            SurfaceEvent::Up => {
                self.scene.end_manipulation();
                self.scene.hit_test(event.point)
            }
            SurfaceEvent::Out => None,
        };

        let mut delivered = Ok(());
        for owner in self.scene.subscribers(event.event) {
            delivered = self.with_tool(owner, |tool, ctx| tool.on_pointer(ctx, &event));
            if delivered.is_err() {
                break;
            }
        }
        // Notifications queued by this event never outlive it
        let notified = self.deliver_notifications();
        delivered.and(notified)
    }

    fn deliver_notifications(&mut self) -> Result<(), OverlayError> {
        for (object, event) in self.scene.take_notifications() {
            for owner in self.scene.object_subscribers(object, event) {
                self.with_tool(owner, |tool, ctx| tool.on_object_event(ctx, object, event))?;
            }
        }
        Ok(())
    }

    /// Feeds a key press to the shortcut dispatcher. Returns whether it
    /// switched tools.
    pub fn handle_key(&mut self, press: KeyPress) -> Result<bool, OverlayError> {
        match self.shortcuts.dispatch(&press) {
            Some(kind) => {
                self.switch_to(kind)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delivers a wheel notification to every tool holding a wheel listener.
    pub fn handle_wheel(&mut self, delta: WheelDelta) {
        for kind in ToolKind::ALL {
            if self.tool(kind).lifecycle().has_wheel_listener() {
                self.with_tool(kind, |tool, ctx| tool.on_wheel(ctx, delta));
            }
        }
    }

    /// Delivers a display-frame callback to the active tool.
    pub fn handle_frame(&mut self, frame: FrameId) -> Result<(), OverlayError> {
        match self.active {
            Some(kind) => self.with_tool(kind, |tool, ctx| tool.on_frame(ctx, frame)),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Tears the session down. Every step runs even if an earlier one fails;
    /// failures are logged. Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        if let Err(err) = self.shortcuts.stop_listening(&mut self.host) {
            log::error!("Stopping shortcut listener failed: {}", err);
        }

        if let Some(kind) = self.active {
            if let Err(err) = self.deactivate_tool(kind) {
                log::error!("Deactivating {} tool during dispose failed: {}", kind.label(), err);
            }
        }
        self.active = None;

        self.scene.dispose();
        self.mask = None;
        self.background = None;
        self.disposed = true;
        log::info!("Overlay session disposed");
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for hosts that reposition the overlay group.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.active
    }

    /// Whether the tool itself reports being active.
    pub fn is_tool_active(&self, kind: ToolKind) -> bool {
        self.tool(kind).is_active()
    }

    /// The selection tool this session was configured with.
    pub fn selection_tool(&self) -> ToolKind {
        self.selection_tool
    }

    pub fn mask_overlay(&self) -> Option<MaskOverlay> {
        self.mask
    }

    pub fn background(&self) -> Option<ObjectId> {
        self.background
    }

    pub fn crop(&self) -> &CropTool {
        &self.crop
    }

    pub fn mask_tool(&self) -> &MaskTool {
        &self.mask_select
    }

    pub fn rect_tool(&self) -> &RectTool {
        &self.rect
    }

    pub fn rect_tool_mut(&mut self) -> &mut RectTool {
        &mut self.rect
    }

    pub fn arrow_tool(&self) -> &ArrowTool {
        &self.arrow
    }

    pub fn arrow_tool_mut(&mut self) -> &mut ArrowTool {
        &mut self.arrow
    }

    pub fn magnifier(&self) -> &MagnifierTool {
        &self.magnifier
    }

    pub fn magnifier_mut(&mut self) -> &mut MagnifierTool {
        &mut self.magnifier
    }

    /// Bounds of the session's current selection in scene coordinates.
    pub fn selection_bounds(&self) -> Option<kurbo::Rect> {
        match self.selection_tool {
            ToolKind::MaskSelect => self.mask_select.selection_bounds(&self.scene),
            _ => self.crop.selection_bounds(&self.scene),
        }
    }

    /// Re-derives the mask from the current selection, if there is one.
    fn resync_selection(&mut self) -> Result<(), OverlayError> {
        let Self {
            scene,
            host,
            mask,
            crop,
            mask_select,
            selection_tool,
            ..
        } = self;
        let mut ctx = ToolContext {
            scene,
            host,
            mask: *mask,
        };
        match selection_tool {
            ToolKind::MaskSelect => mask_select.resync(&mut ctx),
            _ => crop.resync(&mut ctx),
        }
    }

    /// Removes the current selection and its mask contribution.
    pub fn clear_selection(&mut self) -> Result<(), OverlayError> {
        match self.selection_tool {
            ToolKind::MaskSelect => {
                let Self {
                    scene,
                    host,
                    mask,
                    mask_select,
                    ..
                } = self;
                mask_select.clear(&mut ToolContext {
                    scene,
                    host,
                    mask: *mask,
                })
            }
            _ => {
                let Self {
                    scene,
                    host,
                    mask,
                    crop,
                    ..
                } = self;
                crop.clear(&mut ToolContext {
                    scene,
                    host,
                    mask: *mask,
                })
            }
        }
    }

    /// Consumes the scene's redraw request.
    pub fn take_redraw(&mut self) -> bool {
        self.scene.take_render_request()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
