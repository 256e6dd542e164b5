use std::collections::BTreeMap;

use color_eyre::eyre::{eyre, Result};
use eframe::{run_native, App, CreationContext, NativeOptions};
use egui::Color32;
use egui_graphs::{
    DefaultGraphView, Graph, SettingsInteraction, SettingsNavigation, SettingsStyle,
};
use petgraph::{graph::EdgeIndex, graph::NodeIndex, prelude::StableGraph};

use crate::fa::FA;

struct Visualizer {
    graph: Graph,
}

impl Visualizer {
    fn new(_: &CreationContext<'_>, graph: Graph) -> Self {
        Visualizer { graph }
    }
}

impl App for Visualizer {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let navigation_settings = &SettingsNavigation::new()
                .with_zoom_and_pan_enabled(true)
                .with_fit_to_screen_enabled(true);
            let interactive_settings = &SettingsInteraction::new()
                .with_dragging_enabled(true)
                .with_node_clicking_enabled(true)
                .with_node_selection_enabled(true)
                .with_node_selection_multi_enabled(true)
                .with_edge_clicking_enabled(true)
                .with_edge_selection_enabled(true)
                .with_edge_selection_multi_enabled(true);
            let style_settings = &SettingsStyle::default().with_labels_always(true);
            ui.add(
                &mut DefaultGraphView::new(&mut self.graph)
                    .with_styles(style_settings)
                    .with_interactions(interactive_settings)
                    .with_navigations(navigation_settings),
            );
        });
    }
}

/// All symbols leading from one state to another joined into one label, keyed by
/// (source, target). The symbols of a label are in sorted order.
fn edge_labels<T: FA>(fa: &T) -> BTreeMap<(usize, usize), String> {
    let mut labels: BTreeMap<(usize, usize), String> = BTreeMap::new();

    for state_idx in 0..fa.get_num_states() {
        for (symbol, target) in fa.get_state_transitions(state_idx) {
            labels
                .entry((state_idx, target))
                .and_modify(|label| {
                    label.push_str(", ");
                    label.push(symbol);
                })
                .or_insert_with(|| symbol.to_string());
        }
    }

    labels
}

fn generate_stable_graph<T: FA>(fa: &T) -> Graph {
    let mut stable_graph = StableGraph::new();

    let num_states = fa.get_num_states();

    let start_node_color = Color32::from_rgb(20, 67, 130);
    let accept_node_color = Color32::from_rgb(20, 130, 90);

    // Add all nodes

    for _state_idx in 0..num_states {
        stable_graph.add_node(());
    }

    // One edge per pair of states, labelled later with every symbol between them

    let labels = edge_labels(fa);

    let mut edge_map: Vec<(EdgeIndex, &String)> = Vec::with_capacity(labels.len());

    for ((source, target), label) in &labels {
        let edge_idx =
            stable_graph.add_edge(NodeIndex::new(*source), NodeIndex::new(*target), ());
        edge_map.push((edge_idx, label));
    }

    let mut graph = Graph::from(&stable_graph);

    for accept_state in fa.get_acceptor_states().iter_ones() {
        if let Some(accept_node) = graph.node_mut(NodeIndex::new(accept_state)) {
            accept_node.set_color(accept_node_color);
        }
    }

    if let Some(start_node) = graph.node_mut(NodeIndex::new(fa.get_start_state())) {
        start_node.set_color(start_node_color);
    }

    for state_idx in 0..num_states {
        if let Some(node) = graph.node_mut(NodeIndex::new(state_idx)) {
            node.set_label(format!("State {}", state_idx));
        }
    }

    for (edge_idx, label) in edge_map {
        if let Some(edge) = graph.edge_mut(edge_idx) {
            edge.set_label(label.clone());
        }
    }

    graph
}

/// Opens an interactive window showing the finite automata provided
pub fn visualize<T: FA>(fa: &T) -> Result<()> {
    let graph = generate_stable_graph(fa);
    run_native(
        "finite automata visualizer",
        NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(Visualizer::new(cc, graph)))),
    )
    .map_err(|err| eyre!("Failed to open the visualizer window: {}", err))
}
