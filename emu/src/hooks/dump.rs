use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;

use crate::model::State;
use crate::program::Program;

use super::Hook;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to open dump config `{0}`: {1}")]
    Open(String, std::io::Error),

    #[error("Failed to parse dump config `{0}`: {1}")]
    Parse(String, serde_yaml::Error),
}

#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

/// PC of the instruction after which to dump -> what to dump.
#[derive(Debug, Default, Serialize, Deserialize)]
struct List(HashMap<u16, Config>);

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    stack: bool,
    #[serde(default)]
    ram: Vec<u16>,
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, DumpError> {
        let list = match &file {
            Some(fname) => {
                let f = File::open(fname).map_err(|e| DumpError::Open(fname.clone(), e))?;
                serde_yaml::from_reader(BufReader::new(f))
                    .map_err(|e| DumpError::Parse(fname.clone(), e))?
            }
            None => List::default(),
        };
        Ok(Self { file, all, list })
    }

    fn get(&self, pc: u16) -> Option<&Config> {
        self.list.0.get(&pc)
    }
}

impl Hook for Dump {
    fn init(&mut self, state: State) -> State {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
        state
    }

    fn exec(&mut self, _time: u64, addr: u16, _program: &Program, state: State) -> State {
        if let Some(cfg) = self.get(addr) {
            print_reg(&state);
            if cfg.stack {
                print_stack(&state);
            }
            print_ram(&state, &cfg.ram);
        } else if self.all {
            print_reg(&state);
        }
        state
    }
}

pub fn print_reg(state: &State) {
    let layout = state.ram.layout();
    println!(" +-----------+-----------+-----------+");
    println!(
        " | pc: {:0>4X} |  a: {:0>4X} |  d: {:0>4X} |",
        state.pc(),
        state.a(),
        state.d()
    );
    let cells: Vec<String> = layout
        .cells()
        .iter()
        .map(|cell| format!("{:>4}: {:0>4X}", cell.name, state.ram.get(cell.addr)))
        .collect();
    for row in cells.chunks(3) {
        println!(" | {:<9} |", row.join(" | "));
    }
    println!(" +-----------+-----------+-----------+");
}

pub fn print_stack(state: &State) {
    let base = state.ram.layout().stack_base;
    for (i, val) in state.ram.stack().iter().enumerate() {
        println!(" | {:0>4X} : {:0>4X}                      |", base as usize + i, val);
    }
    println!(" +-----------------------------------+");
}

fn print_ram(state: &State, addrs: &[u16]) {
    for addr in addrs {
        println!(
            " | {:0>4X} : {:0>4X}                      |",
            addr,
            state.ram.get(*addr)
        );
    }
    println!(" +-----------------------------------+");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let list: List = serde_yaml::from_str("3: { stack: true }\n7: { ram: [256, 300] }\n").unwrap();
        assert!(list.0[&3].stack);
        assert!(list.0[&3].ram.is_empty());
        assert_eq!(list.0[&7].ram, [256, 300]);
    }
}
