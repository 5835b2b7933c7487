use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::config::{Align, LayoutConfig};
use crate::model::{FlowGraph, Rect, StageId};

use super::{LayoutError, LayoutStrategy, Placement};

/// Generic column-based flow layout: nodes ordered into columns by graph
/// topology, vertical extent proportional to summed incident flow,
/// horizontal band chosen by the align policy. The vertical extent is
/// compressed by `flow_scale` and centered in the canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalFlowLayout;

impl LayoutStrategy for ProportionalFlowLayout {
    fn place(
        &self,
        graph: &FlowGraph,
        config: &LayoutConfig,
        canvas: (f32, f32),
    ) -> Result<Placement, LayoutError> {
        let (canvas_w, canvas_h) = canvas;
        if canvas_w <= config.node_width || canvas_h <= 0.0 {
            return Err(LayoutError::DegenerateCanvas {
                width: canvas_w as i64,
                height: canvas_h as i64,
            });
        }

        let node_count = graph.nodes.len();
        let mut id_to_idx: HashMap<StageId, usize> = HashMap::new();
        for (idx, node) in graph.nodes.iter().enumerate() {
            id_to_idx.insert(node.id, idx);
        }

        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut indegree: Vec<usize> = vec![0; node_count];
        let mut in_total: Vec<f32> = vec![0.0; node_count];
        let mut out_total: Vec<f32> = vec![0.0; node_count];

        #[derive(Clone, Copy)]
        struct EdgeData {
            from_idx: usize,
            to_idx: usize,
            value: f32,
        }

        let mut edges: Vec<EdgeData> = Vec::with_capacity(graph.links.len());
        for link in &graph.links {
            let (Some(&from_idx), Some(&to_idx)) =
                (id_to_idx.get(&link.source), id_to_idx.get(&link.target))
            else {
                continue;
            };
            let value = link.value.max(0.0) as f32;
            let edge_idx = edges.len();
            edges.push(EdgeData {
                from_idx,
                to_idx,
                value,
            });
            outgoing[from_idx].push(edge_idx);
            incoming[to_idx].push(edge_idx);
            indegree[to_idx] += 1;
            out_total[from_idx] += value;
            in_total[to_idx] += value;
        }

        // Kahn's algorithm; a leftover indegree means a cycle.
        let mut indegree_work = indegree.clone();
        let mut queue: VecDeque<usize> = indegree_work
            .iter()
            .enumerate()
            .filter_map(|(idx, deg)| (*deg == 0).then_some(idx))
            .collect();
        let mut topo = Vec::with_capacity(node_count);
        while let Some(node_idx) = queue.pop_front() {
            topo.push(node_idx);
            for &edge_idx in &outgoing[node_idx] {
                let to_idx = edges[edge_idx].to_idx;
                indegree_work[to_idx] -= 1;
                if indegree_work[to_idx] == 0 {
                    queue.push_back(to_idx);
                }
            }
        }
        if topo.len() != node_count {
            let stage = indegree_work
                .iter()
                .position(|deg| *deg > 0)
                .map(|idx| graph.nodes[idx].id.as_str())
                .unwrap_or("unknown");
            return Err(LayoutError::CyclicTopology { stage });
        }

        // Longest path from any source / to any sink.
        let mut depth = vec![0usize; node_count];
        for &node_idx in &topo {
            for &edge_idx in &outgoing[node_idx] {
                let to_idx = edges[edge_idx].to_idx;
                depth[to_idx] = depth[to_idx].max(depth[node_idx] + 1);
            }
        }
        let mut height = vec![0usize; node_count];
        for &node_idx in topo.iter().rev() {
            for &edge_idx in &outgoing[node_idx] {
                let to_idx = edges[edge_idx].to_idx;
                height[node_idx] = height[node_idx].max(height[to_idx] + 1);
            }
        }
        let max_depth = depth.iter().copied().max().unwrap_or(0);

        let column: Vec<usize> = (0..node_count)
            .map(|idx| match config.align {
                Align::Left => depth[idx],
                Align::Right => max_depth - height[idx],
                Align::Justify => {
                    if outgoing[idx].is_empty() {
                        max_depth
                    } else {
                        depth[idx]
                    }
                }
                Align::Center => {
                    if !incoming[idx].is_empty() {
                        depth[idx]
                    } else if !outgoing[idx].is_empty() {
                        outgoing[idx]
                            .iter()
                            .map(|&edge_idx| depth[edges[edge_idx].to_idx])
                            .min()
                            .unwrap_or(1)
                            .saturating_sub(1)
                    } else {
                        0
                    }
                }
            })
            .collect();
        let max_column = column.iter().copied().max().unwrap_or(0);

        let mut totals = vec![0.0f32; node_count];
        for idx in 0..node_count {
            let total = in_total[idx].max(out_total[idx]);
            totals[idx] = if total > 0.0 { total } else { 1.0 };
        }

        let flow_scale = config.effective_flow_scale();
        let usable_h = canvas_h * flow_scale;

        let mut column_nodes: Vec<Vec<usize>> = vec![Vec::new(); max_column + 1];
        for idx in 0..node_count {
            column_nodes[column[idx]].push(idx);
        }

        // Value scale: the tightest column dictates pixels-per-kilotonne.
        let mut scale = f32::INFINITY;
        for nodes_in_column in &column_nodes {
            if nodes_in_column.is_empty() {
                continue;
            }
            let gaps = (nodes_in_column.len() - 1) as f32 * config.node_padding;
            let available = (usable_h - gaps).max(usable_h * 0.1);
            let column_total: f32 = nodes_in_column.iter().map(|&idx| totals[idx]).sum();
            if column_total > 0.0 {
                scale = scale.min(available / column_total);
            }
        }
        if !scale.is_finite() {
            scale = 1.0;
        }

        let mut rects = BTreeMap::new();
        for (col, nodes_in_column) in column_nodes.iter().enumerate() {
            if nodes_in_column.is_empty() {
                continue;
            }
            let x = if max_column > 0 {
                col as f32 * (canvas_w - config.node_width) / max_column as f32
            } else {
                (canvas_w - config.node_width) / 2.0
            };
            let gaps = (nodes_in_column.len() - 1) as f32 * config.node_padding;
            let stack_height: f32 =
                nodes_in_column.iter().map(|&idx| totals[idx] * scale).sum::<f32>() + gaps;
            // symmetric top/bottom margin
            let mut y = ((canvas_h - stack_height) / 2.0).max(0.0);
            for &idx in nodes_in_column {
                let node_height = totals[idx] * scale;
                rects.insert(
                    graph.nodes[idx].id,
                    Rect::new(x, y, x + config.node_width, y + node_height),
                );
                y += node_height + config.node_padding;
            }
        }

        Ok(Placement { rects, scale })
    }
}
