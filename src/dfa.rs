/* Build a DFA straight from a regex with Brzozowski's derivatives. Every state stands for one
 * simplified derivative of the pattern, and the transition on a symbol leads to the state of
 * the derivative with respect to that symbol. */

use crate::fa::FA;
use crate::regex::{RegExError, Regex};
use bitvec::prelude::*;
use color_eyre::eyre::{eyre, Report, Result};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::process::Command;

#[derive(Debug)]
pub struct DFA {
    states: Vec<DFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    alphabet: BTreeSet<char>,
    regex: Regex,
}

#[derive(Debug, Clone)]
pub struct DFAState {
    id: usize,
    regex: Regex,
    transitions: BTreeMap<char, usize>,
}

#[derive(Serialize)]
struct DFASummary {
    regex: String,
    start_state: usize,
    alphabet: Vec<char>,
    states: Vec<StateSummary>,
}

#[derive(Serialize)]
struct StateSummary {
    id: usize,
    regex: String,
    accepting: bool,
    transitions: BTreeMap<String, usize>,
}

impl FA for DFA {
    fn show_fa(&self, file_name: &str) -> Result<()> {
        let dot = self.to_dot(&self.regex)?;

        // Write dot to file
        let dot_filename = format!("{}.dot", file_name);
        let mut dot_file = File::create(&dot_filename)?;
        dot_file.write_all(dot.as_bytes())?;

        let output = Command::new("dot")
            .args(["-Tjpg", &dot_filename, "-o", &format!("{}.jpg", file_name)])
            .output()?;

        if !output.status.success() {
            return Err(eyre!(
                "Graphviz failed to render {}: {}",
                dot_filename,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        log::info!("DFA visualization saved as {}.jpg", file_name);
        Ok(())
    }

    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }

    fn get_state_transitions(&self, state_id: usize) -> Vec<(char, usize)> {
        match self.states.get(state_id) {
            Some(state) => state
                .transitions
                .iter()
                .map(|(symbol, target)| (*symbol, *target))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl DFAState {
    fn new(id: usize, regex: Regex) -> Self {
        DFAState {
            id,
            regex,
            transitions: BTreeMap::new(),
        }
    }

    /// Record a transition on the symbol unless the state already has one
    fn add_transition(&mut self, symbol: char, target: usize) {
        self.transitions.entry(symbol).or_insert(target);
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    /// The simplified derivative this state stands for
    pub fn get_regex(&self) -> &Regex {
        &self.regex
    }

    pub fn get_transitions(&self) -> &BTreeMap<char, usize> {
        &self.transitions
    }

    pub fn next_state(&self, symbol: char) -> Option<usize> {
        self.transitions.get(&symbol).copied()
    }
}

impl DFA {
    fn new(regex: &Regex) -> Self {
        DFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            alphabet: regex.alphabet(),
            regex: regex.clone(),
        }
    }

    fn add_state(&mut self, regex: Regex) -> usize {
        let state_id = self.states.len();
        self.accept_states.push(regex.is_nullable());
        self.states.push(DFAState::new(state_id, regex));
        state_id
    }

    /// Returns a reference to the DFA state whose id is provided
    pub fn get_state(&self, id: usize) -> Option<&DFAState> {
        self.states.get(id)
    }

    /// Returns all states of the DFA, ordered by id
    pub fn get_states(&self) -> &[DFAState] {
        &self.states
    }

    /// The pattern the DFA was built from, before simplification
    pub fn get_regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_accepting(&self, state_id: usize) -> bool {
        state_id < self.accept_states.len() && self.accept_states[state_id]
    }

    /// Returns true if the whole input is in the language of the DFA
    pub fn run(&self, input: &str) -> bool {
        self.run_from(self.start_state, input)
    }

    /// Walk the DFA from the given state. A symbol without a transition rejects the input
    /// right away.
    pub fn run_from(&self, state_id: usize, input: &str) -> bool {
        let mut current = state_id;

        for ch in input.chars() {
            let next = self
                .states
                .get(current)
                .and_then(|state| state.next_state(ch));
            match next {
                Some(next) => current = next,
                None => return false,
            }
        }

        self.is_accepting(current)
    }

    /// Find the state for an expression, comparing simplified expressions by their keys
    pub fn find_state(&self, regex: &Regex) -> Option<usize> {
        let key = regex.simplify().canonical_key();
        self.states
            .iter()
            .find(|state| state.regex.canonical_key() == key)
            .map(|state| state.id)
    }

    /// Describe the DFA as a Graphviz digraph. The start arrow points at the state of
    /// `start_regex`, which must be equivalent to one of the states after simplification.
    pub fn to_dot(&self, start_regex: &Regex) -> Result<String> {
        let start_state = match self.find_state(start_regex) {
            Some(state_id) => state_id,
            None => {
                let err = Report::new(RegExError::StartStateNotFoundError(start_regex.to_string()));
                return Err(err);
            }
        };

        let mut graph: DiGraph<usize, char> = DiGraph::with_capacity(self.states.len(), 0);

        for state in &self.states {
            graph.add_node(state.id);
        }

        for state in &self.states {
            for (symbol, target) in &state.transitions {
                graph.add_edge(NodeIndex::new(state.id), NodeIndex::new(*target), *symbol);
            }
        }

        let mut dot = String::new();
        writeln!(dot, "digraph DFA {{")?;
        writeln!(dot, "    rankdir=LR;")?;
        writeln!(dot, "    node [shape = circle];")?;
        writeln!(dot, "    start [shape = point];")?;
        writeln!(dot, "    start -> {};", start_state)?;
        // Node and edge lines only, the graph header is written above
        write!(
            dot,
            "{}",
            Dot::with_attr_getters(
                &graph,
                &[Config::GraphContentOnly],
                &|_, _| String::new(),
                &|_, (index, _)| {
                    if self.is_accepting(index.index()) {
                        "shape = doublecircle ".to_string()
                    } else {
                        String::new()
                    }
                },
            )
        )?;
        writeln!(dot, "}}")?;

        Ok(dot)
    }

    /// Summarize the states and transitions of the DFA as pretty printed JSON
    pub fn to_json(&self) -> Result<String> {
        let summary = DFASummary {
            regex: self.regex.to_string(),
            start_state: self.start_state,
            alphabet: self.alphabet.iter().copied().collect(),
            states: self
                .states
                .iter()
                .map(|state| StateSummary {
                    id: state.id,
                    regex: state.regex.to_string(),
                    accepting: self.is_accepting(state.id),
                    transitions: state
                        .transitions
                        .iter()
                        .map(|(symbol, target)| (symbol.to_string(), *target))
                        .collect(),
                })
                .collect(),
        };

        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

/// Everything that only lives while one DFA is being built
struct DFABuilder {
    dfa: DFA,
    state_ids: HashMap<String, usize>,
    work_list: VecDeque<usize>,
}

impl DFABuilder {
    fn new(regex: &Regex) -> Self {
        DFABuilder {
            dfa: DFA::new(regex),
            state_ids: HashMap::new(),
            work_list: VecDeque::new(),
        }
    }

    /// Returns the state for a simplified expression, creating and queueing it if this is the
    /// first time it is seen.
    fn get_or_create_state(&mut self, regex: Regex) -> usize {
        let key = regex.canonical_key();

        if let Some(&state_id) = self.state_ids.get(&key) {
            return state_id;
        }

        log::debug!("Creating state {} for {}", self.dfa.states.len(), regex);

        let state_id = self.dfa.add_state(regex);
        self.state_ids.insert(key, state_id);
        self.work_list.push_back(state_id);
        state_id
    }

    fn build(mut self) -> DFA {
        let alphabet: Vec<char> = self.dfa.alphabet.iter().copied().collect();

        let start_state = self.get_or_create_state(self.dfa.regex.simplify());
        self.dfa.start_state = start_state;

        while let Some(state_id) = self.work_list.pop_front() {
            for symbol in &alphabet {
                let next_regex = self.dfa.states[state_id].regex.derivative(*symbol);
                let target = self.get_or_create_state(next_regex);
                self.dfa.states[state_id].add_transition(*symbol, target);
            }
        }

        log::info!(
            "Built DFA with {} states over {} symbols for {}",
            self.dfa.states.len(),
            alphabet.len(),
            self.dfa.regex
        );

        self.dfa
    }
}

/// Build the DFA of a regex with the derivative construction. A regex that is just the empty
/// set or the empty string is rejected.
pub fn construct_dfa(regex: &Regex) -> Result<DFA> {
    if matches!(regex, Regex::EmptySet | Regex::Epsilon) {
        let err = Report::new(RegExError::InvalidBuildInputError(regex.to_string()));
        return Err(err);
    }

    Ok(DFABuilder::new(regex).build())
}
