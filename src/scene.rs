//! The renderable scene graph: the arena-of-indices redesign called for by
//! spec §9 ("replacing the runtime-typed collections and callbacks").
//!
//! The teacher's widget layer is a dynamically-typed array of boxed
//! component structs wired together with `Rc<RefCell<_>>` parent/child
//! links (`framebuffer/render_tree.rs`, `framebuffer/inheritance.rs`).
//! Per §1's scope cut, none of that survives here: a renderable is reduced
//! to exactly the contract spec §1 names — a rect, a z-order key, a
//! visibility flag, and a `paint(buffer, region)` operation — held in a
//! flat arena and referenced by stable integer ids from the hit grid, not
//! by pointer.

use crate::cell_buffer::CellBuffer;
use crate::geometry::Rect;
use crate::hit_grid::HitGrid;

/// The only legal way a renderable places cells: given the destination
/// buffer (already scissored to the renderable's rect) and that rect,
/// write whatever cells it wants to show.
pub type PaintFn = Box<dyn FnMut(&mut CellBuffer, Rect) + Send>;

/// One node in the scene. Parent/child links are arena indices, not
/// pointers, so there is no cycle to worry about freeing.
pub struct Renderable {
    pub rect: Rect,
    pub z_index: i32,
    pub visible: bool,
    /// When true, `cached` (if present) is blitted via `draw_frame_buffer`
    /// instead of calling `paint` (§4.3 composite step, step 2).
    pub buffered: bool,
    pub cached: Option<CellBuffer>,
    insertion_order: u32,
    parent: Option<u32>,
    children: Vec<u32>,
    paint: PaintFn,
}

/// A stable reference to a renderable; doubles as its hit-grid id.
/// `0` is reserved to mean "no renderable" so it matches [`crate::hit_grid::NONE`].
pub type NodeId = u32;

pub struct Scene {
    nodes: Vec<Option<Renderable>>,
    roots: Vec<NodeId>,
    next_insertion_order: u32,
}

impl Scene {
    pub fn new() -> Self {
        // Slot 0 is never allocated, reserving id 0 as "no renderable" to
        // match the hit grid's empty-cell sentinel.
        Self { nodes: vec![None], roots: Vec::new(), next_insertion_order: 0 }
    }

    fn alloc(&mut self, renderable: Renderable) -> NodeId {
        self.nodes.push(Some(renderable));
        (self.nodes.len() - 1) as NodeId
    }

    /// Insert a new renderable. `parent = None` makes it a scene root.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        rect: Rect,
        z_index: i32,
        paint: PaintFn,
    ) -> NodeId {
        let insertion_order = self.next_insertion_order;
        self.next_insertion_order += 1;

        let id = self.alloc(Renderable {
            rect,
            z_index,
            visible: true,
            buffered: false,
            cached: None,
            insertion_order,
            parent,
            children: Vec::new(),
            paint,
        });

        match parent {
            Some(p) => {
                if let Some(Some(parent_node)) = self.nodes.get_mut(p as usize) {
                    parent_node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Detach and drop a renderable and its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        let children = self.get(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.remove(child);
        }
        if let Some(Some(node)) = self.nodes.get(id as usize) {
            match node.parent {
                Some(p) => {
                    if let Some(Some(parent_node)) = self.nodes.get_mut(p as usize) {
                        parent_node.children.retain(|&c| c != id);
                    }
                }
                None => self.roots.retain(|&r| r != id),
            }
        }
        if let Some(slot) = self.nodes.get_mut(id as usize) {
            *slot = None;
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Renderable> {
        self.nodes.get(id as usize).and_then(|n| n.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Renderable> {
        self.nodes.get_mut(id as usize).and_then(|n| n.as_mut())
    }

    /// Walk `id` and its ancestors up to the root, innermost first.
    /// Used by keyboard/mouse dispatch (§4.4) to bubble an event up when
    /// the hit renderable (or the focused one) doesn't handle it.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else { break };
            chain.push(node_id);
            current = node.parent;
        }
        chain
    }

    /// Composite the whole scene into `next`: pre-order walk, `(z_index
    /// asc, insertion_order asc)` sibling order, scissor-per-node, write
    /// the hit grid (§4.3 composite step).
    pub fn composite(&mut self, next: &mut CellBuffer, hit_grid: &mut HitGrid) {
        let roots = self.sorted(&self.roots.clone());
        for id in roots {
            self.composite_node(id, next, hit_grid);
        }
    }

    /// Sort a sibling list by `(z_index asc, insertion_order asc)`.
    fn sorted(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut ids = ids.to_vec();
        ids.sort_by_key(|&id| {
            let n = self.get(id).expect("sibling id must exist");
            (n.z_index, n.insertion_order)
        });
        ids
    }

    fn composite_node(&mut self, id: NodeId, next: &mut CellBuffer, hit_grid: &mut HitGrid) {
        let Some(mut node) = self.nodes[id as usize].take() else { return };

        if node.visible && !node.rect.is_empty() {
            next.push_scissor(node.rect.x, node.rect.y, node.rect.width, node.rect.height);

            if node.buffered {
                if let Some(cached) = &node.cached {
                    next.draw_frame_buffer(node.rect.x, node.rect.y, cached, 0, 0, cached.width(), cached.height());
                } else {
                    (node.paint)(next, node.rect);
                }
            } else {
                (node.paint)(next, node.rect);
            }

            next.pop_scissor();
            hit_grid.add(node.rect, id);

            let children = self.sorted(&node.children);
            for child in children {
                self.composite_node(child, next, hit_grid);
            }
        }

        self.nodes[id as usize] = Some(node);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn sorted_roots(scene: &Scene) -> Vec<NodeId> {
        let mut roots = scene.roots.clone();
        roots.sort_by_key(|&id| {
            let n = scene.get(id).unwrap();
            (n.z_index, n.insertion_order)
        });
        roots
    }

    #[test]
    fn paints_into_hit_grid() {
        let mut scene = Scene::new();
        scene.insert(
            None,
            Rect::new(2, 2, 3, 2),
            0,
            Box::new(|buf, rect| {
                buf.fill_rect(rect.x, rect.y, rect.width, rect.height, Color::RED);
            }),
        );

        let mut next = CellBuffer::new("next", 10, 10);
        let mut hit_grid = HitGrid::new(10, 10);
        scene.composite(&mut next, &mut hit_grid);

        assert_eq!(hit_grid.check_hit(2, 2), 1);
        assert_eq!(next.get(2, 2).unwrap().bg, Color::RED);
    }

    #[test]
    fn later_sibling_paints_on_top_by_z_order() {
        let mut scene = Scene::new();
        let low = scene.insert(None, Rect::new(0, 0, 3, 1), 0, Box::new(|_, _| {}));
        let high = scene.insert(None, Rect::new(0, 0, 3, 1), 1, Box::new(|_, _| {}));

        assert_eq!(sorted_roots(&scene), vec![low, high]);
    }

    #[test]
    fn ancestors_walks_up_to_root() {
        let mut scene = Scene::new();
        let root = scene.insert(None, Rect::new(0, 0, 10, 10), 0, Box::new(|_, _| {}));
        let child = scene.insert(Some(root), Rect::new(1, 1, 5, 5), 0, Box::new(|_, _| {}));
        let grandchild = scene.insert(Some(child), Rect::new(2, 2, 2, 2), 0, Box::new(|_, _| {}));

        assert_eq!(scene.ancestors(grandchild), vec![grandchild, child, root]);
    }

    #[test]
    fn invisible_node_does_not_paint() {
        let mut scene = Scene::new();
        let id = scene.insert(
            None,
            Rect::new(0, 0, 3, 1),
            0,
            Box::new(|buf, rect| buf.fill_rect(rect.x, rect.y, rect.width, rect.height, Color::RED)),
        );
        scene.get_mut(id).unwrap().visible = false;

        let mut next = CellBuffer::new("next", 10, 10);
        let mut hit_grid = HitGrid::new(10, 10);
        scene.composite(&mut next, &mut hit_grid);

        assert_eq!(hit_grid.check_hit(0, 0), 0);
    }
}
