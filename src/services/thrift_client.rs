// ThriftHive client over a buffered TCP transport with the binary protocol
//
// HiveServer (v1) exposes `execute`, `fetchAll` and `getSchema` on the
// `ThriftHive` service. Only those three calls are implemented here.
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TMessageIdentifier, TMessageType, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::transport::{
    ReadHalf, TBufferedReadTransport, TBufferedWriteTransport, TIoChannel, TTcpChannel, WriteHalf,
};
use tracing::{debug, info};

use crate::error::{HiveError, HiveResult};
use crate::services::session::{not_open, Connector, HiveService};

type InputProtocol = TBinaryInputProtocol<TBufferedReadTransport<ReadHalf<TTcpChannel>>>;
type OutputProtocol = TBinaryOutputProtocol<TBufferedWriteTransport<WriteHalf<TTcpChannel>>>;

const SUCCESS_FIELD: i16 = 0;
const SERVER_EXCEPTION_FIELD: i16 = 1;
/// Upper bound on capacity reserved from a list length sent by the server
const MAX_PREALLOCATED_ROWS: i32 = 1024;

/// Opens `ThriftHiveClient` transports
#[derive(Debug, Clone, Copy, Default)]
pub struct ThriftConnector;

impl Connector for ThriftConnector {
    type Service = ThriftHiveClient;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> HiveResult<ThriftHiveClient> {
        ThriftHiveClient::connect(host, port, timeout)
    }
}

/// `HiveServerException` as sent by the engine
#[derive(Debug, Default)]
struct ServerException {
    message: String,
    error_code: i32,
    sql_state: Option<String>,
}

impl From<ServerException> for HiveError {
    fn from(e: ServerException) -> Self {
        HiveError::Query {
            statement: String::new(),
            message: e.message,
            error_code: e.error_code,
            sql_state: e.sql_state,
        }
    }
}

/// Blocking ThriftHive client bound to one TCP connection
pub struct ThriftHiveClient {
    input: InputProtocol,
    output: OutputProtocol,
    /// Handle kept for shutdown; the channel halves own clones of the socket
    stream: TcpStream,
    sequence: i32,
    open: bool,
}

impl ThriftHiveClient {
    /// Connect within `timeout`. Calls made afterwards have no timeout.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> HiveResult<Self> {
        let address = format!("{}:{}", host, port);
        let connection_error = |message: String| HiveError::Connection {
            address: address.clone(),
            message,
        };

        let candidates = (host, port)
            .to_socket_addrs()
            .map_err(|e| connection_error(format!("failed to resolve host: {}", e)))?;

        let mut last_error = None;
        let mut stream = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }

        let stream = stream.ok_or_else(|| {
            connection_error(match last_error {
                Some(e) => format!("failed to connect within {:?}: {}", timeout, e),
                None => "host resolved to no addresses".to_string(),
            })
        })?;
        let _ = stream.set_nodelay(true);

        let control = stream
            .try_clone()
            .map_err(|e| connection_error(format!("failed to clone socket: {}", e)))?;
        let (read_half, write_half) = TTcpChannel::with_stream(stream)
            .split()
            .map_err(|e| connection_error(format!("failed to split channel: {}", e)))?;

        info!("Connected to HiveServer at {}", address);

        Ok(Self {
            input: TBinaryInputProtocol::new(TBufferedReadTransport::new(read_half), true),
            output: TBinaryOutputProtocol::new(TBufferedWriteTransport::new(write_half), true),
            stream: control,
            sequence: 0,
            open: true,
        })
    }

    /// Write one call message whose argument struct is produced by `write_args`
    fn send_call<F>(&mut self, name: &str, write_args: F) -> thrift::Result<i32>
    where
        F: FnOnce(&mut OutputProtocol) -> thrift::Result<()>,
    {
        self.sequence = self.sequence.wrapping_add(1);
        let sequence = self.sequence;

        self.output.write_message_begin(&TMessageIdentifier::new(
            name,
            TMessageType::Call,
            sequence,
        ))?;
        self.output
            .write_struct_begin(&TStructIdentifier::new(format!("{}_args", name)))?;
        write_args(&mut self.output)?;
        self.output.write_field_stop()?;
        self.output.write_struct_end()?;
        self.output.write_message_end()?;
        self.output.flush()?;

        Ok(sequence)
    }

    /// Read the reply to `name`, returning the success field if the call has one
    fn receive_reply<T, F>(&mut self, name: &str, sequence: i32, mut read_success: F) -> HiveResult<Option<T>>
    where
        F: FnMut(&mut InputProtocol) -> thrift::Result<T>,
    {
        let message = self.input.read_message_begin()?;

        if message.message_type == TMessageType::Exception {
            let remote = thrift::Error::read_application_error_from_in_protocol(&mut self.input)?;
            self.input.read_message_end()?;
            return Err(thrift::Error::Application(remote).into());
        }
        if message.message_type != TMessageType::Reply {
            return Err(HiveError::Protocol(format!(
                "expected reply to {}, got {:?}",
                name, message.message_type
            )));
        }
        if message.name != name || message.sequence_number != sequence {
            return Err(HiveError::Protocol(format!(
                "reply mismatch: expected {}#{}, got {}#{}",
                name, sequence, message.name, message.sequence_number
            )));
        }

        let mut success = None;
        let mut exception = None;

        self.input.read_struct_begin()?;
        loop {
            let field = self.input.read_field_begin()?;
            if field.field_type == TType::Stop {
                break;
            }
            match (field.id, field.field_type) {
                (Some(SUCCESS_FIELD), _) => success = Some(read_success(&mut self.input)?),
                (Some(SERVER_EXCEPTION_FIELD), TType::Struct) => {
                    exception = Some(read_server_exception(&mut self.input)?)
                }
                (_, field_type) => self.input.skip(field_type)?,
            }
            self.input.read_field_end()?;
        }
        self.input.read_struct_end()?;
        self.input.read_message_end()?;

        if let Some(e) = exception {
            return Err(e.into());
        }
        Ok(success)
    }

    fn ensure_open(&self) -> HiveResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(not_open("ThriftHive transport is closed"))
        }
    }
}

impl HiveService for ThriftHiveClient {
    fn execute(&mut self, statement: &str) -> HiveResult<()> {
        self.ensure_open()?;
        debug!("ThriftHive.execute: {}", statement);

        let sequence = self.send_call("execute", |output| {
            output.write_field_begin(&TFieldIdentifier::new("query", TType::String, 1i16))?;
            output.write_string(statement)?;
            output.write_field_end()
        })?;
        self.receive_reply::<(), _>("execute", sequence, |input| input.skip(TType::Void))?;
        Ok(())
    }

    fn fetch_all(&mut self) -> HiveResult<Vec<String>> {
        self.ensure_open()?;

        let sequence = self.send_call("fetchAll", |_| Ok(()))?;
        self.receive_reply("fetchAll", sequence, read_string_list)?
            .ok_or_else(|| HiveError::Protocol("fetchAll returned no result".to_string()))
    }

    fn get_schema(&mut self) -> HiveResult<Vec<String>> {
        self.ensure_open()?;

        let sequence = self.send_call("getSchema", |_| Ok(()))?;
        self.receive_reply("getSchema", sequence, read_schema_field_names)?
            .ok_or_else(|| HiveError::Protocol("getSchema returned no result".to_string()))
    }

    fn close(&mut self) -> HiveResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.stream
            .shutdown(Shutdown::Both)
            .map_err(|e| not_open(&format!("shutdown failed: {}", e)))
    }

    fn is_open(&self) -> bool {
        self.open && self.stream.peer_addr().is_ok()
    }
}

fn read_string_list(input: &mut InputProtocol) -> thrift::Result<Vec<String>> {
    let list = input.read_list_begin()?;
    let mut values = Vec::with_capacity(list.size.clamp(0, MAX_PREALLOCATED_ROWS) as usize);
    for _ in 0..list.size {
        values.push(input.read_string()?);
    }
    input.read_list_end()?;
    Ok(values)
}

/// Read a `Schema` struct, keeping only the field names of `fieldSchemas`
fn read_schema_field_names(input: &mut InputProtocol) -> thrift::Result<Vec<String>> {
    let mut names = Vec::new();

    input.read_struct_begin()?;
    loop {
        let field = input.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::List) => {
                let list = input.read_list_begin()?;
                for _ in 0..list.size {
                    names.push(read_field_schema_name(input)?);
                }
                input.read_list_end()?;
            }
            (_, field_type) => input.skip(field_type)?,
        }
        input.read_field_end()?;
    }
    input.read_struct_end()?;

    Ok(names)
}

/// Read a `FieldSchema` struct (name, type, comment) and return its name
fn read_field_schema_name(input: &mut InputProtocol) -> thrift::Result<String> {
    let mut name = String::new();

    input.read_struct_begin()?;
    loop {
        let field = input.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::String) => name = input.read_string()?,
            (_, field_type) => input.skip(field_type)?,
        }
        input.read_field_end()?;
    }
    input.read_struct_end()?;

    Ok(name)
}

fn read_server_exception(input: &mut InputProtocol) -> thrift::Result<ServerException> {
    let mut exception = ServerException::default();

    input.read_struct_begin()?;
    loop {
        let field = input.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::String) => exception.message = input.read_string()?,
            (Some(2), TType::I32) => exception.error_code = input.read_i32()?,
            (Some(3), TType::String) => exception.sql_state = Some(input.read_string()?),
            (_, field_type) => input.skip(field_type)?,
        }
        input.read_field_end()?;
    }
    input.read_struct_end()?;

    Ok(exception)
}
