// Plotting a resolved series into a 3D scene

use crate::compiler::compile_params;
use crate::ir::ResolvedSeries;
use crate::layout::SceneLayout;
use crate::scene::{RenderObject, Renderer, Scene, SceneObject};
use anyhow::Result;

/// Draw `series` into `scene`, creating its renderer object on first use and
/// updating it in place afterwards.
///
/// Hidden series only clear the visible flag on their existing object. A
/// series with no drawable points is a no-op. Renderer failures are returned
/// unchanged.
pub fn plot<R: Renderer>(
    scene: &mut Scene<R>,
    layout: &SceneLayout,
    series: &ResolvedSeries,
) -> Result<()> {
    let uid = series.uid.as_str();

    if !series.visible.is_visible() {
        if let Some(object) = scene.registry.get_mut(uid) {
            object.visible = false;
        }
        tracing::debug!(uid, "series hidden");
        scene.update(layout, Some(uid));
        return Ok(());
    }

    let Some(mut params) = compile_params(series, layout) else {
        tracing::debug!(uid, "no drawable points, leaving scene untouched");
        return Ok(());
    };

    match scene.registry.get_mut(uid) {
        Some(object) => {
            tracing::debug!(uid, "updating renderer object");
            params.pick_ids = Some(object.pick_ids);
            object.handle.update(&params)?;
            object.visible = true;
        }
        None => {
            let pick_ids = scene.registry.next_picking_ids();
            params.pick_ids = Some(pick_ids);
            let handle = scene.renderer_mut().create_scatter_line(&params)?;
            let group_id = scene.registry.current_group_id();
            tracing::debug!(uid, ?pick_ids, group_id, "created renderer object");

            scene.registry.upsert(SceneObject {
                handle,
                uid: uid.to_string(),
                visible: true,
                group_id,
                trace_type: series.trace_type.clone(),
                pick_ids,
            });
        }
    }

    scene.update(layout, Some(uid));
    Ok(())
}
