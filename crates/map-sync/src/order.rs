//! Fixed relative draw order of managed layers.

use ocean_common::{LayerId, LayerOrder, LayerSpec};
use tracing::debug;

use crate::error::MapResult;
use crate::renderer::MapRenderer;

/// Keeps managed layers attached and stacked in [`LayerOrder`].
///
/// Renderers put newly added layers on top, so after every mutation the
/// whole order is re-asserted by moving each attached managed layer to the
/// top in canonical sequence. Layers outside the order are left alone and
/// end up below the managed ones.
#[derive(Debug, Clone, Default)]
pub struct LayerOrderer {
    order: LayerOrder,
}

impl LayerOrderer {
    pub fn new(order: LayerOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &LayerOrder {
        &self.order
    }

    /// Add `layer` if no layer with its id is attached, then re-assert the order.
    pub fn ensure_layer<R: MapRenderer + ?Sized>(
        &self,
        map: &mut R,
        layer: LayerSpec,
    ) -> MapResult<()> {
        if !map.has_layer(&layer.id) {
            map.add_layer(layer)?;
        }
        self.reassert(map)
    }

    /// Re-apply the canonical order to all attached managed layers.
    ///
    /// No renderer call is made when the order already holds.
    pub fn reassert<R: MapRenderer + ?Sized>(&self, map: &mut R) -> MapResult<()> {
        let stack = map.layer_ids();
        if self.is_ordered(&stack) {
            return Ok(());
        }

        debug!(layers = stack.len(), "Re-asserting layer order");
        for id in self.order.iter() {
            if map.has_layer(id) {
                map.move_layer(id, None)?;
            }
        }
        Ok(())
    }

    /// Managed layers form the top of `stack` in canonical relative order.
    pub fn is_ordered(&self, stack: &[LayerId]) -> bool {
        let managed: Vec<usize> = stack
            .iter()
            .filter_map(|id| self.order.position(id))
            .collect();

        let on_top = stack[stack.len() - managed.len()..]
            .iter()
            .all(|id| self.order.contains(id));

        on_top && managed.windows(2).all(|w| w[0] < w[1])
    }
}
