use crate::types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dump input at line {line}: {reason}\n  {text}")]
    MalformedInput { line: usize, text: String, reason: String },

    #[error("Type not found: {0:#010x}")]
    TypeNotFound(Address),

    #[error("Unresolvable cyclic type chain through {0:#010x}")]
    CyclicType(Address),

    #[error("Type {0:#010x} has neither a byte size nor an underlying type")]
    UnsizedType(Address),

    #[error("Member '{name}' at {loc:#010x} has no type reference")]
    UntypedMember { name: String, loc: Address },

    #[error("Failed to run {program}: {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_status(.code))]
    ToolFailed { program: String, code: Option<i32>, stderr: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
