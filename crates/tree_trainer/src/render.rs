//! Tree figure rendering
//!
//! Draws the fitted tree as boxes joined by edges, one box per node, using
//! the plotters SVG backend. The figure lives in memory until `save` is
//! called. Box fill is the predicted class's color, more opaque the purer
//! the node.

use animal_tree_core::{DecisionTree, Node};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::config::RenderConfig;
use crate::errors::{PipelineError, Result};

/// Rendered tree diagram
#[derive(Debug, Clone)]
pub struct Figure {
    svg: String,
    width: u32,
    height: u32,
    node_count: usize,
}

impl Figure {
    /// SVG document text
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of node boxes drawn
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Write the figure as an SVG file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.svg)?;
        info!("Figure saved to: {}", path.display());
        Ok(())
    }
}

/// Box center of every node, in pixels
struct Layout {
    centers: Vec<(i32, i32)>,
    width: u32,
    height: u32,
}

fn render_err<E: std::fmt::Display>(err: E) -> PipelineError {
    PipelineError::Render(err.to_string())
}

/// Lay nodes out with leaves in left-to-right slots and parents centered
/// over their children
fn layout(model: &DecisionTree, config: &RenderConfig) -> Layout {
    let mut slots = vec![(0.0, 0); model.nodes.len()];
    let mut leaves = 0;

    // Pre-order walk, left first: leaves get slots and every node its depth
    let mut visited = Vec::with_capacity(model.nodes.len());
    let mut stack = if model.nodes.is_empty() { vec![] } else { vec![(0usize, 0usize)] };
    while let Some((idx, depth)) = stack.pop() {
        let node = &model.nodes[idx];
        visited.push(idx);
        if node.is_leaf() {
            slots[idx] = (leaves as f64, depth);
            leaves += 1;
        } else {
            slots[idx].1 = depth;
            stack.push((node.right as usize, depth + 1));
            stack.push((node.left as usize, depth + 1));
        }
    }

    // Children are placed before their parent in reverse pre-order
    for &idx in visited.iter().rev() {
        let node = &model.nodes[idx];
        if !node.is_leaf() {
            slots[idx].0 = (slots[node.left as usize].0 + slots[node.right as usize].0) / 2.0;
        }
    }
    let levels = model.depth() + 1;

    let column = (config.node_width + config.horizontal_gap) as f64;
    let row = (config.node_height + config.level_gap) as f64;
    let margin = config.margin as f64;

    let centers = slots
        .iter()
        .map(|&(slot, depth)| {
            let x = margin + slot * column + config.node_width as f64 / 2.0;
            let y = margin + depth as f64 * row + config.node_height as f64 / 2.0;
            (x.round() as i32, y.round() as i32)
        })
        .collect();

    let width = 2 * config.margin
        + leaves.max(1) as u32 * (config.node_width + config.horizontal_gap)
        - config.horizontal_gap;
    let height = 2 * config.margin
        + levels as u32 * (config.node_height + config.level_gap)
        - config.level_gap;

    Layout {
        centers,
        width,
        height,
    }
}

/// Evenly spaced hue per class
fn class_color(class_idx: usize, n_classes: usize) -> HSLColor {
    let hue = class_idx as f64 / n_classes.max(1) as f64;
    HSLColor(hue, 0.65, 0.55)
}

/// Fill opacity: 0 when the two leading classes tie, 1 when pure
fn fill_alpha(node: &Node) -> f64 {
    if node.n_samples == 0 {
        return 0.0;
    }
    let total = node.n_samples as f64;
    let mut shares: Vec<f64> = node.value.iter().map(|&c| c as f64 / total).collect();
    shares.sort_by(|a, b| b.total_cmp(a));

    let first = shares.first().copied().unwrap_or(0.0);
    let second = shares.get(1).copied().unwrap_or(0.0);
    if second >= 1.0 {
        return 0.0;
    }
    ((first - second) / (1.0 - second)).clamp(0.0, 1.0)
}

fn format_value(value: &[usize]) -> String {
    let parts: Vec<String> = value.iter().map(usize::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Text lines shown inside a node's box
pub fn node_lines(model: &DecisionTree, node: &Node, precision: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(5);
    if !node.is_leaf() {
        let feature = model
            .feature_names
            .get(node.feature_idx as usize)
            .map(String::as_str)
            .unwrap_or("?");
        lines.push(format!("{} <= {:.*}", feature, precision, node.threshold));
    }
    lines.push(format!("{} = {:.*}", model.criterion, precision, node.impurity));
    lines.push(format!("samples = {}", node.n_samples));
    lines.push(format!("value = {}", format_value(&node.value)));
    if let Some(class) = model.classes.get(node.predicted_class()) {
        lines.push(format!("class = {}", class));
    }
    lines
}

/// Draw the tree into an in-memory SVG figure
pub fn render_tree(model: &DecisionTree, config: &RenderConfig) -> Result<Figure> {
    model.validate()?;

    let layout = layout(model, config);
    let half_w = config.node_width as i32 / 2;
    let half_h = config.node_height as i32 / 2;
    let line_height = (config.font_size * 1.3).round() as i32;
    let n_classes = model.classes.len();

    let text_style = TextStyle::from(("sans-serif", config.font_size).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (layout.width, layout.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        // Edges first so boxes paint over them
        for node in model.nodes.iter().filter(|n| !n.is_leaf()) {
            let (px, py) = layout.centers[node.id as usize];
            for child in [node.left, node.right] {
                let (cx, cy) = layout.centers[child as usize];
                root.draw(&PathElement::new(
                    vec![(px, py + half_h), (cx, cy - half_h)],
                    BLACK.stroke_width(1),
                ))
                .map_err(render_err)?;
            }
        }

        for node in &model.nodes {
            let (x, y) = layout.centers[node.id as usize];
            let corners = [(x - half_w, y - half_h), (x + half_w, y + half_h)];

            let fill = class_color(node.predicted_class(), n_classes).mix(fill_alpha(node));
            root.draw(&Rectangle::new(corners, fill.filled()))
                .map_err(render_err)?;
            root.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))
                .map_err(render_err)?;

            let lines = node_lines(model, node, config.precision);
            let top = y - (lines.len() as i32 - 1) * line_height / 2;
            for (i, line) in lines.iter().enumerate() {
                root.draw(&Text::new(
                    line.as_str(),
                    (x, top + i as i32 * line_height),
                    text_style.clone(),
                ))
                .map_err(render_err)?;
            }
        }

        root.present().map_err(render_err)?;
    }

    info!(
        "Rendered tree figure: {} nodes, {}x{} px",
        model.node_count(),
        layout.width,
        layout.height
    );

    Ok(Figure {
        svg,
        width: layout.width,
        height: layout.height,
        node_count: model.node_count(),
    })
}

/// Indented plain-text rendering of the tree
///
/// ```text
/// |--- legs <= 3.000
/// |   |--- class: bird
/// |--- legs >  3.000
/// |   |--- class: mammal
/// ```
pub fn export_text(model: &DecisionTree, precision: usize) -> String {
    enum Step {
        Visit(usize, usize),
        Line(String),
    }

    let mut out = String::new();
    let mut stack = if model.nodes.is_empty() { vec![] } else { vec![Step::Visit(0, 0)] };
    while let Some(step) = stack.pop() {
        let (idx, depth) = match step {
            Step::Visit(idx, depth) => (idx, depth),
            Step::Line(line) => {
                out.push_str(&line);
                continue;
            }
        };
        let node = &model.nodes[idx];
        let indent = "|   ".repeat(depth);

        if node.is_leaf() {
            let class = model
                .classes
                .get(node.predicted_class())
                .map(String::as_str)
                .unwrap_or("?");
            let _ = writeln!(out, "{}|--- class: {}", indent, class);
            continue;
        }

        let feature = model
            .feature_names
            .get(node.feature_idx as usize)
            .map(String::as_str)
            .unwrap_or("?");
        let _ = writeln!(out, "{}|--- {} <= {:.*}", indent, feature, precision, node.threshold);
        // Popped in reverse: left subtree, the `>` line, then the right subtree
        stack.push(Step::Visit(node.right as usize, depth + 1));
        stack.push(Step::Line(format!(
            "{}|--- {} >  {:.*}\n",
            indent, feature, precision, node.threshold
        )));
        stack.push(Step::Visit(node.left as usize, depth + 1));
    }
    out
}
