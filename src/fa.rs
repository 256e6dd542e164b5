use bitvec::prelude::BitVec;
use color_eyre::eyre::Result;
use std::collections::BTreeSet;

pub trait FA {
    /// Save the automaton as a Graphviz description and render it to a jpg next to it
    fn show_fa(&self, file_name: &str) -> Result<()>;
    fn get_num_states(&self) -> usize;
    fn get_start_state(&self) -> usize;
    fn get_alphabet(&self) -> &BTreeSet<char>;
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    /// Outgoing transitions of a state as (symbol, target) pairs, ordered by symbol
    fn get_state_transitions(&self, state_id: usize) -> Vec<(char, usize)>;
}
