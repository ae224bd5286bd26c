//! Render traversal for scenes
//!
//! One pass walks the item list under the scene lock, applies each item's
//! transform on the graphics stack and lets the item's source draw. Items
//! whose source has been removed are dropped from the scene as the pass
//! reaches them.

use crate::item::SceneItem;
use crate::scene::{Scene, SceneInner};
use crate::transform::{GraphicsContext, MatrixStack};
use glam::Mat4;

impl SceneInner {
    /// Walk the items in paint order, calling `draw` with each item's
    /// transform pushed.
    pub(crate) fn traverse(
        &self,
        gfx: &mut dyn GraphicsContext,
        draw: &mut dyn FnMut(&SceneItem, &mut dyn GraphicsContext),
    ) {
        self.walk(|item| {
            if item.source().is_removed() {
                log::debug!("dropping removed source '{}' from scene", item.name());
                self.remove_item(item);
                return true;
            }

            let t = item.transform();
            gfx.push_matrix();
            gfx.translate(t.origin.x, t.origin.y);
            gfx.scale(t.scale.x, t.scale.y);
            gfx.rotate((-t.rot).to_radians());
            gfx.translate(-t.pos.x, -t.pos.y);

            draw(item, gfx);

            gfx.pop_matrix();
            true
        });
    }
}

impl Scene {
    /// Draw every item through the given graphics backend
    pub fn render(&self, gfx: &mut dyn GraphicsContext) {
        self.inner()
            .traverse(gfx, &mut |item, gfx| item.source().video_render(gfx));
    }
}

/// A draw recorded for a single scene item
#[derive(Debug, Clone)]
pub struct RenderCommand {
    /// Name of the source that would draw
    pub source_name: String,

    /// Transform in effect while it draws
    pub transform: Mat4,

    /// The item's visibility flag; the traversal itself doesn't consult it
    pub visible: bool,
}

impl RenderCommand {
    fn record(item: &SceneItem, gfx: &dyn GraphicsContext) -> Self {
        Self {
            source_name: item.name().to_string(),
            transform: gfx.current(),
            visible: item.visible(),
        }
    }
}

/// Run a render pass and return the draws it would issue, in paint order
///
/// Sources are not asked to draw, but removed sources are still dropped
/// from the scene.
pub fn render_scene(scene: &Scene) -> Vec<RenderCommand> {
    render_scene_filtered(scene, |_| true)
}

/// Like [`render_scene`], keeping only items that pass the filter
pub fn render_scene_filtered<F>(scene: &Scene, mut filter: F) -> Vec<RenderCommand>
where
    F: FnMut(&SceneItem) -> bool,
{
    let mut commands = Vec::new();
    let mut stack = MatrixStack::new();

    scene.inner().traverse(&mut stack, &mut |item, gfx| {
        if filter(item) {
            commands.push(RenderCommand::record(item, gfx));
        }
    });

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Source, SourceRef};
    use glam::{Vec2, Vec3};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Probe {
        name: String,
        removed: AtomicBool,
        draws: Mutex<Vec<Mat4>>,
    }

    impl Probe {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                ..Default::default()
            })
        }
    }

    impl Source for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_removed(&self) -> bool {
            self.removed.load(Ordering::SeqCst)
        }

        fn video_render(&self, gfx: &mut dyn GraphicsContext) {
            self.draws.lock().push(gfx.current());
        }
    }

    fn as_source(probe: &Arc<Probe>) -> SourceRef {
        probe.clone()
    }

    #[test]
    fn test_render_in_paint_order() {
        let scene = Scene::new("main");
        scene.add(as_source(&Probe::new("a")));
        scene.add(as_source(&Probe::new("b")));
        scene.add(as_source(&Probe::new("c")));

        let names: Vec<_> = render_scene(&scene)
            .into_iter()
            .map(|cmd| cmd.source_name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_render_applies_item_transform() {
        let scene = Scene::new("main");
        let probe = Probe::new("cam");
        let item = scene.add(as_source(&probe)).unwrap();
        item.set_pos(Vec2::new(100.0, 50.0));
        item.set_scale(Vec2::new(2.0, 2.0));
        item.set_rot(15.0);

        let mut stack = MatrixStack::new();
        scene.render(&mut stack);

        let draws = probe.draws.lock();
        assert_eq!(draws.len(), 1);
        assert!(draws[0].abs_diff_eq(item.transform().matrix(), 1e-5));
        // stack is balanced after the pass
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), Mat4::IDENTITY);
    }

    #[test]
    fn test_render_drops_removed_sources() {
        let scene = Scene::new("main");
        let a = Probe::new("a");
        let b = Probe::new("b");
        let c = Probe::new("c");
        scene.add(as_source(&a));
        let item_b = scene.add(as_source(&b)).unwrap();
        scene.add(as_source(&c));

        b.removed.store(true, Ordering::SeqCst);

        let mut stack = MatrixStack::new();
        scene.render(&mut stack);

        assert_eq!(a.draws.lock().len(), 1);
        assert_eq!(b.draws.lock().len(), 0);
        assert_eq!(c.draws.lock().len(), 1);
        assert_eq!(scene.item_count(), 2);
        assert!(item_b.is_removed());
        assert!(item_b.scene().is_none());
        assert!(scene.is_consistent());
    }

    #[test]
    fn test_render_drops_consecutive_removed_sources() {
        let scene = Scene::new("main");
        let probes: Vec<_> = (0..4).map(|i| Probe::new(&format!("p{i}"))).collect();
        for probe in &probes {
            scene.add(as_source(probe));
        }
        probes[1].removed.store(true, Ordering::SeqCst);
        probes[2].removed.store(true, Ordering::SeqCst);

        let names: Vec<_> = render_scene(&scene)
            .into_iter()
            .map(|cmd| cmd.source_name)
            .collect();
        assert_eq!(names, ["p0", "p3"]);
        assert_eq!(scene.item_count(), 2);
    }

    #[test]
    fn test_render_scene_filtered() {
        let scene = Scene::new("main");
        scene.add(as_source(&Probe::new("shown")));
        let hidden = scene.add(as_source(&Probe::new("hidden"))).unwrap();
        hidden.set_visible(false);

        let commands = render_scene_filtered(&scene, |item| item.visible());
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].source_name, "shown");

        // the unfiltered pass still reports hidden items
        let commands = render_scene(&scene);
        assert_eq!(commands.len(), 2);
        assert!(!commands[1].visible);
    }

    #[test]
    fn test_nested_scene_render() {
        let outer = Scene::new("outer");
        let inner = Scene::new("inner");
        let probe = Probe::new("cam");
        let cam = inner.add(as_source(&probe)).unwrap();
        cam.set_pos(Vec2::new(10.0, 0.0));

        let nested = outer.add(inner.as_source()).unwrap();
        nested.set_origin(Vec2::new(5.0, 0.0));

        let mut stack = MatrixStack::new();
        outer.render(&mut stack);

        let draws = probe.draws.lock();
        assert_eq!(draws.len(), 1);
        let p = draws[0].transform_point3(Vec3::new(10.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_removed_nested_scene_is_dropped() {
        let outer = Scene::new("outer");
        let inner = Scene::new("inner");
        outer.add(inner.as_source());

        inner.mark_removed();
        let mut stack = MatrixStack::new();
        outer.render(&mut stack);

        assert!(outer.is_empty());
    }
}
