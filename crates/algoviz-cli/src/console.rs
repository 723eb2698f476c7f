//! Text rendering of step events.

use std::io::{self, Write};

use algoviz_player::RenderObserver;
use algoviz_steps::{ArrayState, StepEvent, VisualElement};
use tracing::warn;

/// Writes narration and state changes as lines of text.
///
/// For sorting runs, give it the starting array with [`with_array`] and every
/// swap or move prints the bars after the change.
///
/// [`with_array`]: ConsoleObserver::with_array
pub struct ConsoleObserver<W: Write + Send> {
    out: W,
    array: Option<ArrayState>,
    show_steps: bool,
    error: Option<io::Error>,
}

impl ConsoleObserver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            array: None,
            show_steps: false,
            error: None,
        }
    }

    /// Track and draw this array as events arrive.
    pub fn with_array(&mut self, array: ArrayState) -> &mut Self {
        self.array = Some(array);
        self
    }

    /// Stop tracking an array.
    pub fn clear_array(&mut self) -> &mut Self {
        self.array = None;
        self
    }

    /// Also print events that are not narration.
    pub fn set_show_steps(&mut self, show_steps: bool) {
        self.show_steps = show_steps;
    }

    pub fn array(&self) -> Option<&ArrayState> {
        self.array.as_ref()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// The first write error since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{text}") {
            self.error = Some(e);
        }
    }
}

/// One-line description of a non-narration event.
pub fn describe(event: &StepEvent) -> String {
    match event {
        StepEvent::Compare { i, j } => format!("compare [{i}] and [{j}]"),
        StepEvent::Swap { i, j } => format!("swap [{i}] and [{j}]"),
        StepEvent::Move { index, value } => format!("write {value} to [{index}]"),
        StepEvent::Visit { element } => format!("visit {}", element_label(element)),
        StepEvent::MarkVisited { element } => format!("done with {}", element_label(element)),
        StepEvent::UpdateDistance { node, distance } => {
            format!("distance of node {node} is now {distance}")
        }
        StepEvent::InsertAt {
            parent,
            is_left,
            value,
        } => match parent {
            Some(parent) => format!(
                "attach {value} as {} child of node #{}",
                if *is_left { "left" } else { "right" },
                parent.0
            ),
            None => format!("attach {value} as root"),
        },
        StepEvent::SetValue { node, value } => format!("node #{} takes value {value}", node.0),
        StepEvent::DeleteNode { node } => format!("remove node #{}", node.0),
        StepEvent::Message { text } => text.clone(),
        StepEvent::PlacePoint { point, position } => {
            format!("point {point} at ({:.2}, {:.2})", position.x, position.y)
        }
        StepEvent::AssignCluster { point, cluster } => {
            format!("point {point} joins cluster {cluster}")
        }
        StepEvent::MoveCentroid { cluster, position } => format!(
            "centroid {cluster} moves to ({:.2}, {:.2})",
            position.x, position.y
        ),
        StepEvent::FitLine {
            iteration,
            slope,
            intercept,
            loss,
        } => format!("iteration {iteration}: y = {slope:.3}x + {intercept:.3}, loss {loss:.4}"),
        StepEvent::SplitNode {
            node,
            feature,
            threshold,
        } => format!("node {node} splits on {feature} > {threshold}"),
        StepEvent::LeafNode { node, label } => format!("node {node} predicts {label}"),
        StepEvent::Activate {
            layer,
            neuron,
            value,
        } => format!("layer {layer} neuron {neuron} = {value:.3}"),
        StepEvent::Vote { tree, label } => format!("tree {tree} votes {label}"),
    }
}

fn element_label(element: &VisualElement) -> String {
    match element {
        VisualElement::ArraySlot(index) => format!("slot {index}"),
        VisualElement::GraphNode(index) => format!("node {index}"),
        VisualElement::TreeNode(id) => format!("tree node #{}", id.0),
    }
}

/// Bars as text, one `#` per unit of height.
pub fn render_bars(array: &ArrayState) -> String {
    array
        .values()
        .iter()
        .map(|&value| format!("{:>3} {}", value, "#".repeat(value.max(0) as usize)))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<W: Write + Send> RenderObserver for ConsoleObserver<W> {
    fn on_step_event(&mut self, event: &StepEvent) {
        if let Some(text) = event.text() {
            let text = format!("» {text}");
            self.line(&text);
            return;
        }

        if self.show_steps {
            let text = format!("  {}", describe(event));
            self.line(&text);
        }

        if !matches!(event, StepEvent::Swap { .. } | StepEvent::Move { .. }) {
            return;
        }
        let Some(array) = self.array.as_mut() else {
            return;
        };
        match array.apply(event) {
            Ok(()) => {
                let bars = render_bars(array);
                self.line(&bars);
                self.line("");
            }
            Err(e) => {
                warn!(error = %e, "Array view out of sync, dropping it");
                self.array = None;
            }
        }
    }

    fn on_complete(&mut self) {
        self.line("» Visualization complete");
        if let Err(e) = self.out.flush() {
            self.error.get_or_insert(e);
        }
    }
}
