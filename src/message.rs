use std::fmt;
use std::net::SocketAddr;

use rosc::OscType;

use crate::error::OscError;

/// Kind tag of a message argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Int32,
    Float32,
    String,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Int32 => write!(f, "int32"),
            ArgType::Float32 => write!(f, "float32"),
            ArgType::String => write!(f, "string"),
        }
    }
}

/// A single OSC argument. The enum variant is the type tag, so tag and value
/// can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Int32(i32),
    Float32(f32),
    String(String),
}

impl Argument {
    pub fn arg_type(&self) -> ArgType {
        match self {
            Argument::Int32(_) => ArgType::Int32,
            Argument::Float32(_) => ArgType::Float32,
            Argument::String(_) => ArgType::String,
        }
    }

    /// Overwrite the value in place. The kind is fixed at construction;
    /// assigning a value of a different kind is a `TypeMismatch` error.
    pub fn set(&mut self, value: Argument) -> Result<(), OscError> {
        if self.arg_type() != value.arg_type() {
            return Err(OscError::TypeMismatch {
                expected: self.arg_type(),
                actual: value.arg_type(),
            });
        }
        *self = value;
        Ok(())
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Int32(v) => write!(f, "{}", v),
            Argument::Float32(v) => write!(f, "{}", v),
            Argument::String(s) => write!(f, "{}", s),
        }
    }
}

/// A decoded OSC message: address pattern, the remote endpoint it arrived
/// from, and its arguments in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub address: String,
    pub remote_host: String,
    pub remote_port: u16,
    args: Vec<Argument>,
}

impl Message {
    pub fn new(address: &str) -> Self {
        Message {
            address: address.to_string(),
            ..Message::default()
        }
    }

    /// Build a Message from a wire-decoded `rosc` message and the peer it
    /// came from. Fails on any argument kind outside the supported set; the
    /// caller is expected to drop the whole packet in that case.
    pub fn from_decoded(decoded: rosc::OscMessage, peer: SocketAddr) -> Result<Self, OscError> {
        let mut message = Message::new(&decoded.addr);
        message.remote_host = peer.ip().to_string();
        message.remote_port = peer.port();
        for arg in decoded.args {
            match arg {
                OscType::Int(v) => message.add_int_arg(v),
                OscType::Float(v) => message.add_float_arg(v),
                OscType::String(s) => message.args.push(Argument::String(s)),
                other => {
                    return Err(OscError::UnknownArgumentKind {
                        type_tag: osc_type_name(&other),
                    })
                }
            }
        }
        Ok(message)
    }

    pub fn add_int_arg(&mut self, value: i32) {
        self.args.push(Argument::Int32(value));
    }

    pub fn add_float_arg(&mut self, value: f32) {
        self.args.push(Argument::Float32(value));
    }

    pub fn add_string_arg(&mut self, value: &str) {
        self.args.push(Argument::String(value.to_string()));
    }

    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    fn arg(&self, index: usize) -> Result<&Argument, OscError> {
        self.args.get(index).ok_or(OscError::OutOfBounds {
            index,
            len: self.args.len(),
        })
    }

    pub fn arg_type(&self, index: usize) -> Result<ArgType, OscError> {
        Ok(self.arg(index)?.arg_type())
    }

    /// Read argument `index` as an int32. With `coerce`, a stored float is
    /// truncated toward zero.
    pub fn arg_as_int32(&self, index: usize, coerce: bool) -> Result<i32, OscError> {
        match self.arg(index)? {
            Argument::Int32(v) => Ok(*v),
            Argument::Float32(v) if coerce => Ok(*v as i32),
            other => Err(OscError::TypeMismatch {
                expected: ArgType::Int32,
                actual: other.arg_type(),
            }),
        }
    }

    /// Read argument `index` as a float. With `coerce`, a stored int32 is
    /// widened.
    pub fn arg_as_float(&self, index: usize, coerce: bool) -> Result<f32, OscError> {
        match self.arg(index)? {
            Argument::Float32(v) => Ok(*v),
            Argument::Int32(v) if coerce => Ok(*v as f32),
            other => Err(OscError::TypeMismatch {
                expected: ArgType::Float32,
                actual: other.arg_type(),
            }),
        }
    }

    /// Read argument `index` as a string. With `coerce`, numeric arguments
    /// are formatted as decimal text.
    pub fn arg_as_string(&self, index: usize, coerce: bool) -> Result<String, OscError> {
        match self.arg(index)? {
            Argument::String(s) => Ok(s.clone()),
            Argument::Int32(v) if coerce => Ok(v.to_string()),
            Argument::Float32(v) if coerce => Ok(v.to_string()),
            other => Err(OscError::TypeMismatch {
                expected: ArgType::String,
                actual: other.arg_type(),
            }),
        }
    }

    /// Deep copy from `other`: existing arguments are dropped first, then
    /// each source argument is rebuilt by kind. Address and remote endpoint
    /// are taken over verbatim.
    pub fn copy_from(&mut self, other: &Message) {
        self.args.clear();
        self.address = other.address.clone();
        self.remote_host = other.remote_host.clone();
        self.remote_port = other.remote_port;
        for arg in &other.args {
            match arg {
                Argument::Int32(v) => self.add_int_arg(*v),
                Argument::Float32(v) => self.add_float_arg(*v),
                Argument::String(s) => self.add_string_arg(s),
            }
        }
    }

    /// Drop all arguments and reset the address to empty.
    pub fn clear(&mut self) {
        self.args.clear();
        self.address.clear();
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Human-readable name of an `rosc` argument kind, for log lines and the
/// `UnknownArgumentKind` error.
fn osc_type_name(value: &OscType) -> &'static str {
    match value {
        OscType::Int(_) => "int32",
        OscType::Float(_) => "float32",
        OscType::String(_) => "string",
        OscType::Blob(_) => "blob",
        OscType::Time(_) => "timetag",
        OscType::Long(_) => "int64",
        OscType::Double(_) => "double",
        OscType::Char(_) => "char",
        OscType::Color(_) => "color",
        OscType::Midi(_) => "midi",
        OscType::Bool(_) => "bool",
        OscType::Array(_) => "array",
        OscType::Nil => "nil",
        OscType::Inf => "infinitum",
    }
}
